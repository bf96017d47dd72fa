//! Algorithm configuration parsing from environment variables.
//!
//! Voting weights, analyzer windows and the set of algorithms the
//! registry is seeded with.

use crate::application::algorithms::HotColdAnalyzer;
use crate::domain::prediction::{AlgorithmKind, VotingPolicy};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Algorithm environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmEnvConfig {
    pub enabled_algorithms: Vec<AlgorithmKind>,

    // Voting weights
    pub frequency_weight: f64,
    pub hot_cold_weight: f64,
    pub pattern_weight: f64,
    pub random_weight: f64,

    // Hot/cold windows
    pub hot_window: usize,
    pub cold_window: usize,

    /// Fixed seed for reproducible random picks
    pub random_seed: Option<u64>,
    pub voting_policy: VotingPolicy,
}

impl Default for AlgorithmEnvConfig {
    fn default() -> Self {
        Self {
            enabled_algorithms: vec![
                AlgorithmKind::Frequency,
                AlgorithmKind::HotCold,
                AlgorithmKind::Pattern,
            ],
            frequency_weight: 1.0,
            hot_cold_weight: 1.2,
            pattern_weight: 0.8,
            random_weight: 0.1,
            hot_window: 20,
            cold_window: 15,
            random_seed: None,
            voting_policy: VotingPolicy::Weighted,
        }
    }
}

impl AlgorithmEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let enabled_algorithms = match env::var("ENABLED_ALGORITHMS") {
            Ok(raw) => Self::parse_algorithms(&raw).context("Failed to parse ENABLED_ALGORITHMS")?,
            Err(_) => defaults.enabled_algorithms,
        };

        let random_seed = match env::var("RANDOM_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Failed to parse RANDOM_SEED")?,
            ),
            _ => None,
        };

        let voting_policy_str = env::var("VOTING_POLICY").unwrap_or_else(|_| "weighted".to_string());
        let voting_policy = VotingPolicy::from_str(&voting_policy_str)?;

        Ok(Self {
            enabled_algorithms,
            frequency_weight: Self::parse_weight("FREQUENCY_WEIGHT", defaults.frequency_weight)?,
            hot_cold_weight: Self::parse_weight("HOT_COLD_WEIGHT", defaults.hot_cold_weight)?,
            pattern_weight: Self::parse_weight("PATTERN_WEIGHT", defaults.pattern_weight)?,
            random_weight: Self::parse_weight("RANDOM_WEIGHT", defaults.random_weight)?,
            hot_window: Self::parse_window("HOT_WINDOW", defaults.hot_window)?,
            cold_window: Self::parse_window("COLD_WINDOW", defaults.cold_window)?,
            random_seed,
            voting_policy,
        })
    }

    /// Configured voting weight for an algorithm kind.
    pub fn weight_for(&self, kind: AlgorithmKind) -> f64 {
        match kind {
            AlgorithmKind::Frequency => self.frequency_weight,
            AlgorithmKind::HotCold => self.hot_cold_weight,
            AlgorithmKind::Pattern => self.pattern_weight,
            AlgorithmKind::Random => self.random_weight,
        }
    }

    /// Comma-separated algorithm names; duplicates are collapsed, order kept.
    pub fn parse_algorithms(raw: &str) -> Result<Vec<AlgorithmKind>> {
        let mut kinds = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind = AlgorithmKind::from_str(part)?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            anyhow::bail!("at least one algorithm must be enabled");
        }
        Ok(kinds)
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_window(key: &str, default: usize) -> Result<usize> {
        Self::checked_window(key, Self::parse_usize(key, default)?)
    }

    /// Hot/cold windows shorter than the analyzer minimum are a config error.
    fn checked_window(key: &str, window: usize) -> Result<usize> {
        if window < HotColdAnalyzer::MIN_WINDOW {
            anyhow::bail!(
                "{} must be at least {}, got {}",
                key,
                HotColdAnalyzer::MIN_WINDOW,
                window
            );
        }
        Ok(window)
    }

    fn parse_weight(key: &str, default: f64) -> Result<f64> {
        let weight = env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))?;
        if !weight.is_finite() || weight < 0.0 {
            anyhow::bail!("{} must be a non-negative number, got {}", key, weight);
        }
        Ok(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_config_defaults() {
        let config = AlgorithmEnvConfig::from_env().expect("Should parse with defaults");
        assert_eq!(config.enabled_algorithms.len(), 3);
        assert_eq!(config.hot_window, 20);
        assert_eq!(config.cold_window, 15);
        assert_eq!(config.voting_policy, VotingPolicy::Weighted);
        assert_eq!(config.weight_for(AlgorithmKind::HotCold), 1.2);
    }

    #[test]
    fn test_parse_algorithms() {
        let kinds =
            AlgorithmEnvConfig::parse_algorithms("random, frequency_analysis,random").unwrap();
        assert_eq!(kinds, vec![AlgorithmKind::Random, AlgorithmKind::Frequency]);
        assert!(AlgorithmEnvConfig::parse_algorithms(" , ").is_err());
        assert!(AlgorithmEnvConfig::parse_algorithms("frequency,lstm").is_err());
    }

    #[test]
    fn test_short_window_rejected() {
        let err = AlgorithmEnvConfig::checked_window("HOT_WINDOW", 3).unwrap_err();
        assert_eq!(err.to_string(), "HOT_WINDOW must be at least 5, got 3");
        assert_eq!(AlgorithmEnvConfig::checked_window("COLD_WINDOW", 5).unwrap(), 5);
    }
}
