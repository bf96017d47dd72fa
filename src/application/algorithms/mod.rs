mod frequency;
mod hot_cold;
mod pattern;
mod random;
pub mod registry;

pub use frequency::FrequencyAnalyzer;
pub use hot_cold::HotColdAnalyzer;
pub use pattern::PatternAnalyzer;
pub use random::RandomAnalyzer;
pub use registry::AlgorithmRegistry;

use crate::config::AlgorithmEnvConfig;
use crate::domain::cancellation::CancelFlag;
use crate::domain::errors::AlgorithmError;
use crate::domain::lottery::{Draw, GameRange};
use crate::domain::prediction::{AlgorithmKind, Prediction};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::error;

/// Everything an algorithm may look at when predicting one round.
#[derive(Debug, Clone)]
pub struct PredictionContext<'a> {
    pub range: GameRange,
    /// Draws ascending by sequence index; nothing after the target round
    pub history: &'a [Draw],
    pub cancel: CancelFlag,
}

impl<'a> PredictionContext<'a> {
    pub fn new(range: GameRange, history: &'a [Draw]) -> Self {
        Self {
            range,
            history,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sequence index of the round being predicted
    pub fn target_index(&self) -> u32 {
        self.history
            .last()
            .map(|d| d.sequence_index().saturating_add(1))
            .unwrap_or(1)
    }
}

/// A prediction heuristic usable by the ensemble and the backtester.
pub trait PredictionAlgorithm: Send + Sync {
    fn name(&self) -> &str;

    /// Draws required before `predict` will run
    fn min_history(&self) -> usize;

    fn validate(&self, history: &[Draw]) -> Result<(), AlgorithmError> {
        if history.len() < self.min_history() {
            return Err(AlgorithmError::InsufficientData {
                algorithm: self.name().to_string(),
                required: self.min_history(),
                got: history.len(),
            });
        }
        Ok(())
    }

    /// Stateless analyzers have nothing to fit.
    fn train(&self, _history: &[Draw]) -> Result<(), AlgorithmError> {
        Ok(())
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError>;

    fn weight(&self) -> f64;

    fn set_weight(&self, weight: f64) -> Result<(), AlgorithmError>;
}

impl std::fmt::Debug for dyn PredictionAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionAlgorithm")
            .field("name", &self.name())
            .field("min_history", &self.min_history())
            .finish()
    }
}

pub struct AlgorithmFactory;

impl AlgorithmFactory {
    pub fn create(kind: AlgorithmKind, config: &AlgorithmEnvConfig) -> Arc<dyn PredictionAlgorithm> {
        let weight = config.weight_for(kind);
        match kind {
            AlgorithmKind::Frequency => Arc::new(FrequencyAnalyzer::new(weight)),
            AlgorithmKind::HotCold => Arc::new(HotColdAnalyzer::with_windows(
                weight,
                config.hot_window,
                config.cold_window,
            )),
            AlgorithmKind::Pattern => Arc::new(PatternAnalyzer::new(weight)),
            AlgorithmKind::Random => match config.random_seed {
                Some(seed) => Arc::new(RandomAnalyzer::seeded(weight, seed)),
                None => Arc::new(RandomAnalyzer::new(weight)),
            },
        }
    }
}

/// Common prologue of every `predict`: cancellation, then history size.
pub(crate) fn check_ready(
    algorithm: &dyn PredictionAlgorithm,
    ctx: &PredictionContext<'_>,
) -> Result<(), AlgorithmError> {
    if ctx.cancel.is_cancelled() {
        return Err(AlgorithmError::Cancelled {
            algorithm: algorithm.name().to_string(),
        });
    }
    algorithm.validate(ctx.history)
}

pub(crate) fn checked_weight(weight: f64) -> Result<f64, AlgorithmError> {
    if weight < 0.0 || weight.is_nan() {
        return Err(AlgorithmError::NegativeWeight { weight });
    }
    Ok(weight)
}

pub(crate) fn read_settings<'a, T>(lock: &'a RwLock<T>, owner: &str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("{}: settings lock poisoned during read, recovering", owner);
            poisoned.into_inner()
        }
    }
}

pub(crate) fn write_settings<'a, T>(lock: &'a RwLock<T>, owner: &str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("{}: settings lock poisoned during write, recovering", owner);
            poisoned.into_inner()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::cycling_draws;
    use super::*;
    use crate::domain::lottery::GameType;

    #[test]
    fn test_factory_builds_every_kind() {
        let config = AlgorithmEnvConfig::default();
        for kind in AlgorithmKind::all() {
            let algorithm = AlgorithmFactory::create(kind, &config);
            assert_eq!(algorithm.name(), kind.id());
            assert_eq!(algorithm.weight(), config.weight_for(kind));
        }
    }

    #[test]
    fn test_target_index_follows_history() {
        let draws = cycling_draws(12);
        let ctx = PredictionContext::new(GameType::Mega645.range(), &draws);
        assert_eq!(ctx.target_index(), 13);

        let empty = PredictionContext::new(GameType::Mega645.range(), &[]);
        assert_eq!(empty.target_index(), 1);
    }

    #[test]
    fn test_cancelled_context_is_rejected() {
        let draws = cycling_draws(20);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let ctx = PredictionContext::new(GameType::Mega645.range(), &draws).with_cancel(cancel);
        let algorithm = FrequencyAnalyzer::new(1.0);
        assert!(matches!(
            algorithm.predict(&ctx),
            Err(AlgorithmError::Cancelled { .. })
        ));
    }
}
