//! Backtest and history window configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Backtest environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestEnvConfig {
    /// Draws loaded for a prediction round
    pub history_limit: usize,
    /// Draws used to train before the first scored round
    pub min_training_rounds: usize,
    /// Scored rounds requested on top of the training window
    pub test_size: usize,
    /// Feed backtest scores back into registry weights
    pub auto_weight_update: bool,
}

impl Default for BacktestEnvConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            min_training_rounds: 30,
            test_size: 100,
            auto_weight_update: false,
        }
    }
}

impl BacktestEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            history_limit: Self::parse_usize("HISTORY_LIMIT", defaults.history_limit)?,
            min_training_rounds: Self::parse_usize(
                "MIN_TRAINING_ROUNDS",
                defaults.min_training_rounds,
            )?,
            test_size: Self::parse_usize("BACKTEST_TEST_SIZE", defaults.test_size)?,
            auto_weight_update: env::var("AUTO_WEIGHT_UPDATE")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .context("Failed to parse AUTO_WEIGHT_UPDATE")?,
        })
    }

    /// Draws needed to score `test_size` rounds.
    pub fn window(&self) -> usize {
        self.min_training_rounds + self.test_size
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtest_config_defaults() {
        let config = BacktestEnvConfig::from_env().expect("Should parse with defaults");
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.min_training_rounds, 30);
        assert_eq!(config.window(), 130);
        assert!(!config.auto_weight_update);
    }
}
