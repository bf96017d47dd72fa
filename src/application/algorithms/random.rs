use super::{
    PredictionAlgorithm, PredictionContext, check_ready, checked_weight, read_settings,
    write_settings,
};
use crate::domain::errors::AlgorithmError;
use crate::domain::lottery::{NUMBER_COUNT, NumberSet};
use crate::domain::prediction::Prediction;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use std::sync::{Mutex, RwLock};
use tracing::error;

const NAME: &str = "random_analysis";
const CONFIDENCE: f64 = 0.1;

/// Uniform baseline: six distinct values drawn without replacement.
#[derive(Debug)]
pub struct RandomAnalyzer {
    weight: RwLock<f64>,
    rng: Mutex<StdRng>,
    seed: Option<u64>,
}

impl RandomAnalyzer {
    pub fn new(weight: f64) -> Self {
        Self {
            weight: RwLock::new(weight),
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
            seed: None,
        }
    }

    /// Same seed, same sequence of predictions.
    pub fn seeded(weight: f64, seed: u64) -> Self {
        Self {
            weight: RwLock::new(weight),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            seed: Some(seed),
        }
    }
}

impl PredictionAlgorithm for RandomAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn min_history(&self) -> usize {
        0
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError> {
        check_ready(self, ctx)?;

        let range = ctx.range;
        let picked: Vec<u8> = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("RandomAnalyzer: rng lock poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            sample(&mut *rng, range.size(), NUMBER_COUNT)
                .into_iter()
                .map(|offset| range.min() + offset as u8)
                .collect()
        };

        let numbers = NumberSet::new(&picked, range).map_err(|e| AlgorithmError::Prediction {
            algorithm: NAME.to_string(),
            reason: e.to_string(),
        })?;

        let mut prediction = Prediction::new(NAME, numbers, CONFIDENCE, ctx.target_index())
            .with_metadata("total_draws_used", ctx.history.len())
            .with_metadata("type", "random");
        if let Some(seed) = self.seed {
            prediction = prediction.with_metadata("seed", seed);
        }
        Ok(prediction)
    }

    fn weight(&self) -> f64 {
        *read_settings(&self.weight, NAME)
    }

    fn set_weight(&self, weight: f64) -> Result<(), AlgorithmError> {
        *write_settings(&self.weight, NAME) = checked_weight(weight)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lottery::GameType;

    #[test]
    fn test_works_without_history() {
        let ctx = PredictionContext::new(GameType::Power655.range(), &[]);
        let prediction = RandomAnalyzer::new(0.1).predict(&ctx).unwrap();
        assert_eq!(prediction.numbers.len(), 6);
        assert!(prediction.numbers.iter().all(|v| (1..=55).contains(&v)));
        assert_eq!(prediction.confidence, 0.1);
        assert_eq!(prediction.produced_for_index, 1);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let ctx = PredictionContext::new(GameType::Mega645.range(), &[]);
        let a = RandomAnalyzer::seeded(0.1, 42);
        let b = RandomAnalyzer::seeded(0.1, 42);
        for _ in 0..5 {
            assert_eq!(
                a.predict(&ctx).unwrap().numbers,
                b.predict(&ctx).unwrap().numbers
            );
        }
    }
}
