use super::{
    PredictionAlgorithm, PredictionContext, check_ready, checked_weight, read_settings,
    write_settings,
};
use crate::domain::errors::AlgorithmError;
use crate::domain::lottery::{NUMBER_COUNT, NumberSet};
use crate::domain::prediction::Prediction;
use std::sync::RwLock;
use tracing::debug;

const NAME: &str = "frequency_analysis";

#[derive(Debug, Clone)]
struct FrequencySettings {
    weight: f64,
    min_draws: usize,
}

/// Frequency Analyzer
///
/// Picks the values drawn most often relative to a uniform expectation.
/// - score = observed count / expected count per value
/// - ties: raw count, then lower value
/// - confidence = mean selected score / 2, clamped to [0.1, 1.0]
#[derive(Debug)]
pub struct FrequencyAnalyzer {
    settings: RwLock<FrequencySettings>,
}

impl FrequencyAnalyzer {
    pub const DEFAULT_MIN_DRAWS: usize = 8;

    pub fn new(weight: f64) -> Self {
        Self {
            settings: RwLock::new(FrequencySettings {
                weight,
                min_draws: Self::DEFAULT_MIN_DRAWS,
            }),
        }
    }

    pub fn min_draws(&self) -> usize {
        read_settings(&self.settings, NAME).min_draws
    }

    pub fn set_min_draws(&self, min_draws: usize) -> Result<(), AlgorithmError> {
        if min_draws < 1 {
            return Err(AlgorithmError::InvalidParameter {
                parameter: "min_draws",
                min: 1,
                value: min_draws,
            });
        }
        write_settings(&self.settings, NAME).min_draws = min_draws;
        Ok(())
    }
}

impl PredictionAlgorithm for FrequencyAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn min_history(&self) -> usize {
        self.min_draws()
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError> {
        check_ready(self, ctx)?;

        let range = ctx.range;
        let mut counts = vec![0usize; range.size()];
        let mut total_observed = 0usize;
        for draw in ctx.history {
            for value in draw.numbers().iter() {
                if range.contains(value) {
                    counts[range.offset(value)] += 1;
                    total_observed += 1;
                }
            }
        }

        let expected = total_observed as f64 / (range.size() * ctx.history.len()) as f64;
        if expected <= 0.0 {
            return Err(AlgorithmError::Prediction {
                algorithm: NAME.to_string(),
                reason: "history contains no values inside the game range".to_string(),
            });
        }

        let mut scored: Vec<(u8, usize, f64)> = range
            .values()
            .map(|value| {
                let count = counts[range.offset(value)];
                (value, count, count as f64 / expected)
            })
            .collect();
        scored.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(NUMBER_COUNT);

        let picked: Vec<u8> = scored.iter().map(|(value, _, _)| *value).collect();
        let numbers = NumberSet::new(&picked, range).map_err(|e| AlgorithmError::Prediction {
            algorithm: NAME.to_string(),
            reason: e.to_string(),
        })?;

        let mean_score = scored.iter().map(|(_, _, score)| score).sum::<f64>() / scored.len() as f64;
        let confidence = (mean_score / 2.0).clamp(0.1, 1.0);

        debug!(
            "FrequencyAnalyzer: {} from {} draws (expected {:.3}, confidence {:.2})",
            numbers,
            ctx.history.len(),
            expected,
            confidence
        );

        Ok(Prediction::new(NAME, numbers, confidence, ctx.target_index())
            .with_metadata("total_draws_used", ctx.history.len())
            .with_metadata("expected_frequency", format!("{:.4}", expected)))
    }

    fn weight(&self) -> f64 {
        read_settings(&self.settings, NAME).weight
    }

    fn set_weight(&self, weight: f64) -> Result<(), AlgorithmError> {
        write_settings(&self.settings, NAME).weight = checked_weight(weight)?;
        Ok(())
    }
}
