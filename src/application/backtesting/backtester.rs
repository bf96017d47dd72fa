use crate::application::algorithms::{PredictionAlgorithm, PredictionContext};
use crate::domain::cancellation::CancelFlag;
use crate::domain::errors::BacktestError;
use crate::domain::lottery::{Draw, GameRange};
use crate::domain::prediction::{BacktestResult, PredictionMatch};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Walk-forward backtester.
///
/// Round `i` trains and predicts on `history[..i]` only and is scored
/// against `history[i]`. The first `min_training_rounds` draws are never
/// scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backtester {
    min_training_rounds: usize,
}

impl Default for Backtester {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_TRAINING_ROUNDS)
    }
}

impl Backtester {
    pub const DEFAULT_MIN_TRAINING_ROUNDS: usize = 30;

    pub fn new(min_training_rounds: usize) -> Self {
        Self {
            min_training_rounds,
        }
    }

    pub fn min_training_rounds(&self) -> usize {
        self.min_training_rounds
    }

    pub fn run(
        &self,
        algorithm: &dyn PredictionAlgorithm,
        range: GameRange,
        history: &[Draw],
    ) -> Result<BacktestResult, BacktestError> {
        self.run_with_cancel(algorithm, range, history, &CancelFlag::new())
    }

    /// Like `run`, aborting with `Cancelled` once `cancel` is raised.
    /// The flag is checked before every round, so a run whose last round
    /// already finished returns its result.
    pub fn run_with_cancel(
        &self,
        algorithm: &dyn PredictionAlgorithm,
        range: GameRange,
        history: &[Draw],
        cancel: &CancelFlag,
    ) -> Result<BacktestResult, BacktestError> {
        if history.len() <= self.min_training_rounds {
            return Err(BacktestError::InsufficientHistory {
                required: self.min_training_rounds,
                got: history.len(),
            });
        }

        let started = Instant::now();
        let name = algorithm.name().to_string();
        let mut result = BacktestResult::new(name.clone());

        info!(
            "Backtester: {} over {} draws ({} training, {} rounds)",
            name,
            history.len(),
            self.min_training_rounds,
            history.len() - self.min_training_rounds
        );

        for i in self.min_training_rounds..history.len() {
            if cancel.is_cancelled() {
                warn!("Backtester: {} cancelled at round {}", name, i);
                return Err(BacktestError::Cancelled {
                    algorithm: name,
                    completed_rounds: i - self.min_training_rounds,
                });
            }

            let training = &history[..i];
            if let Err(e) = algorithm.train(training) {
                warn!("Backtester: training {} failed at round {}: {}", name, i, e);
                result.record_skip();
                continue;
            }

            let ctx = PredictionContext::new(range, training).with_cancel(cancel.clone());
            let prediction = match algorithm.predict(&ctx) {
                Ok(prediction) => prediction,
                Err(e) => {
                    debug!("Backtester: {} skipped round {}: {}", name, i, e);
                    result.record_skip();
                    continue;
                }
            };

            let actual = &history[i];
            result.record(PredictionMatch {
                round_index: i,
                sequence_index: actual.sequence_index(),
                predicted: prediction.numbers,
                actual: *actual.numbers(),
                match_count: prediction.numbers.match_count(actual.numbers()),
                confidence: prediction.confidence,
            });
        }

        result.finalize(started.elapsed().as_millis() as u64);
        info!(
            "Backtester: {} scored {} rounds (6: {}, 4: {}, 3: {}, skipped {}) in {}ms",
            name,
            result.total_rounds,
            result.exact_matches,
            result.four_matches,
            result.three_matches,
            result.skipped_rounds,
            result.execution_time_ms
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::algorithms::test_support::cycling_draws;
    use crate::application::algorithms::{FrequencyAnalyzer, HotColdAnalyzer};
    use crate::domain::errors::AlgorithmError;
    use crate::domain::lottery::GameType;
    use crate::domain::prediction::Prediction;
    use std::sync::Mutex;

    /// Records the history length it was asked to predict from.
    struct Recorder {
        seen: Mutex<Vec<usize>>,
        cancel_after: Option<(usize, CancelFlag)>,
    }

    impl PredictionAlgorithm for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn min_history(&self) -> usize {
            0
        }

        fn predict(&self, ctx: &PredictionContext<'_>) -> Result<Prediction, AlgorithmError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(ctx.history.len());
            if let Some((after, flag)) = &self.cancel_after {
                if seen.len() == *after {
                    flag.cancel();
                }
            }
            let last = ctx.history.last().unwrap();
            Ok(Prediction::new("recorder", *last.numbers(), 0.4, ctx.target_index()))
        }

        fn weight(&self) -> f64 {
            1.0
        }

        fn set_weight(&self, _weight: f64) -> Result<(), AlgorithmError> {
            Ok(())
        }
    }

    #[test]
    fn test_requires_more_than_training_rounds() {
        let draws = cycling_draws(30);
        let err = Backtester::default()
            .run(&FrequencyAnalyzer::new(1.0), GameType::Mega645.range(), &draws)
            .unwrap_err();
        assert_eq!(
            err,
            BacktestError::InsufficientHistory {
                required: 30,
                got: 30
            }
        );
    }

    #[test]
    fn test_rounds_see_only_the_past() {
        let draws = cycling_draws(40);
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
            cancel_after: None,
        };
        let result = Backtester::new(30)
            .run(&recorder, GameType::Mega645.range(), &draws)
            .unwrap();

        assert_eq!(result.total_rounds, 10);
        assert_eq!(*recorder.seen.lock().unwrap(), (30..40).collect::<Vec<_>>());
        assert_eq!(result.matches[0].round_index, 30);
        assert_eq!(result.matches[0].sequence_index, 31);
        assert!((result.average_confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_failed_predictions_are_skipped() {
        // HotCold needs 50 draws: rounds 30..49 are skipped, 50..59 scored
        let draws = cycling_draws(60);
        let result = Backtester::new(30)
            .run(&HotColdAnalyzer::new(1.2), GameType::Mega645.range(), &draws)
            .unwrap();
        assert_eq!(result.skipped_rounds, 20);
        assert_eq!(result.total_rounds, 10);
    }

    #[test]
    fn test_cancellation_aborts_between_rounds() {
        let draws = cycling_draws(50);
        let flag = CancelFlag::new();
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
            cancel_after: Some((3, flag.clone())),
        };
        let err = Backtester::new(30)
            .run_with_cancel(&recorder, GameType::Mega645.range(), &draws, &flag)
            .unwrap_err();
        assert_eq!(
            err,
            BacktestError::Cancelled {
                algorithm: "recorder".to_string(),
                completed_rounds: 3
            }
        );
        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_flag_raised_in_last_round_keeps_result() {
        let draws = cycling_draws(40);
        let flag = CancelFlag::new();
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
            cancel_after: Some((10, flag.clone())),
        };
        let result = Backtester::new(30)
            .run_with_cancel(&recorder, GameType::Mega645.range(), &draws, &flag)
            .unwrap();

        assert!(flag.is_cancelled());
        assert_eq!(result.total_rounds, 10);
        assert_eq!(result.matches.len(), 10);
    }
}
