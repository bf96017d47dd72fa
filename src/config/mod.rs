//! Configuration module for drawcast.
//!
//! Structured configuration loaded from environment variables (and a `.env`
//! file when present), organized by concern: Algorithms, Backtest, Storage.

mod algorithm_config;
mod backtest_config;
mod storage_config;

pub use algorithm_config::AlgorithmEnvConfig;
pub use backtest_config::BacktestEnvConfig;
pub use storage_config::StorageEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub algorithms: AlgorithmEnvConfig,
    pub backtest: BacktestEnvConfig,
    pub storage: StorageEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let algorithms =
            AlgorithmEnvConfig::from_env().context("Failed to load algorithm config")?;
        let backtest = BacktestEnvConfig::from_env().context("Failed to load backtest config")?;
        let storage = StorageEnvConfig::from_env();

        Ok(Self {
            algorithms,
            backtest,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::VotingPolicy;

    #[test]
    fn test_config_from_env_defaults() {
        let config = Config::from_env().expect("Should parse with defaults");
        assert_eq!(config.backtest.min_training_rounds, 30);
        assert_eq!(config.algorithms.frequency_weight, 1.0);
        assert_eq!(config.algorithms.voting_policy, VotingPolicy::Weighted);
    }
}
