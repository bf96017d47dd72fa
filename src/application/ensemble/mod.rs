pub mod voting;

use crate::application::algorithms::{AlgorithmRegistry, PredictionContext};
use crate::domain::errors::{AlgorithmError, EnsembleError};
use crate::domain::lottery::{Draw, GameRange, NUMBER_COUNT};
use crate::domain::prediction::{AlgorithmContribution, EnsembleResult, Prediction, VotingPolicy};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use voting::Ballot;

const MIN_WEIGHT: f64 = 0.1;
const MAX_WEIGHT: f64 = 2.0;

/// Ensemble
///
/// Fans a prediction round out over every registered algorithm and
/// reduces the survivors to one set by the active voting policy.
/// - algorithms that reject the history or fail are skipped
/// - weights come from a single registry snapshot per round
pub struct Ensemble {
    registry: Arc<AlgorithmRegistry>,
    voting_policy: RwLock<VotingPolicy>,
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble")
            .field("algorithms", &self.registry.count())
            .field("voting_policy", &self.voting_policy())
            .finish()
    }
}

impl Ensemble {
    pub fn new(registry: Arc<AlgorithmRegistry>, voting_policy: VotingPolicy) -> Self {
        Self {
            registry,
            voting_policy: RwLock::new(voting_policy),
        }
    }

    pub fn registry(&self) -> &Arc<AlgorithmRegistry> {
        &self.registry
    }

    pub fn voting_policy(&self) -> VotingPolicy {
        match self.voting_policy.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                error!("Ensemble: voting policy lock poisoned, recovering");
                *poisoned.into_inner()
            }
        }
    }

    pub fn set_voting_policy(&self, policy: VotingPolicy) {
        match self.voting_policy.write() {
            Ok(mut guard) => *guard = policy,
            Err(poisoned) => {
                error!("Ensemble: voting policy lock poisoned, recovering");
                *poisoned.into_inner() = policy;
            }
        }
    }

    pub fn generate_predictions(
        &self,
        range: GameRange,
        history: &[Draw],
    ) -> Result<EnsembleResult, EnsembleError> {
        self.generate(&PredictionContext::new(range, history))
    }

    /// One ensemble round over the context's history.
    pub fn generate(&self, ctx: &PredictionContext<'_>) -> Result<EnsembleResult, EnsembleError> {
        let snapshot = self.registry.snapshot();
        if snapshot.is_empty() {
            return Err(EnsembleError::NoAlgorithms);
        }

        let mut survivors: Vec<(Prediction, f64)> = Vec::with_capacity(snapshot.len());
        for entry in &snapshot {
            if ctx.cancel.is_cancelled() {
                return Err(EnsembleError::Cancelled);
            }

            let algorithm = &entry.algorithm;
            if let Err(e) = algorithm.validate(ctx.history) {
                debug!("Ensemble: skipping {}: {}", algorithm.name(), e);
                continue;
            }

            match algorithm.predict(ctx) {
                Ok(prediction) => survivors.push((prediction, entry.weight)),
                Err(AlgorithmError::Cancelled { .. }) => return Err(EnsembleError::Cancelled),
                Err(e) => warn!("Ensemble: {} failed, skipping: {}", algorithm.name(), e),
            }
        }

        if survivors.is_empty() {
            return Err(EnsembleError::NoValidPredictions {
                attempted: snapshot.len(),
                skipped: snapshot.len(),
            });
        }

        let policy = self.voting_policy();
        let ballots: Vec<Ballot<'_>> = survivors
            .iter()
            .map(|(prediction, weight)| Ballot {
                prediction,
                weight: *weight,
            })
            .collect();
        let final_numbers = voting::vote(policy, &ballots, ctx.range)?;

        let contributions: Vec<AlgorithmContribution> = survivors
            .iter()
            .map(|(prediction, weight)| AlgorithmContribution {
                algorithm_id: prediction.algorithm_id.clone(),
                weight: *weight,
                match_count_against_final: final_numbers.match_count(&prediction.numbers),
                confidence: prediction.confidence,
            })
            .collect();

        let predictions: Vec<Prediction> = survivors.into_iter().map(|(p, _)| p).collect();
        let consensus_score = Self::consensus_score(&predictions);

        info!(
            "Ensemble: {} from {}/{} algorithms (policy {}, consensus {:.2})",
            final_numbers,
            predictions.len(),
            snapshot.len(),
            policy,
            consensus_score
        );

        Ok(EnsembleResult {
            id: Uuid::new_v4(),
            final_numbers,
            voting_policy: policy,
            contributions,
            predictions,
            consensus_score,
            generated_at: Utc::now(),
        })
    }

    /// Mean pairwise overlap; 1.0 when there is nothing to disagree with.
    pub fn consensus_score(predictions: &[Prediction]) -> f64 {
        if predictions.len() < 2 {
            return 1.0;
        }

        let mut total = 0.0;
        let mut comparisons = 0usize;
        for (i, a) in predictions.iter().enumerate() {
            for b in &predictions[i + 1..] {
                total += a.numbers.match_count(&b.numbers) as f64 / NUMBER_COUNT as f64;
                comparisons += 1;
            }
        }
        total / comparisons as f64
    }

    /// Highest match count against the final set, then higher confidence.
    pub fn best_algorithm(contributions: &[AlgorithmContribution]) -> Option<&AlgorithmContribution> {
        let mut best: Option<&AlgorithmContribution> = None;
        for candidate in contributions {
            best = match best {
                Some(current)
                    if candidate.match_count_against_final < current.match_count_against_final
                        || (candidate.match_count_against_final
                            == current.match_count_against_final
                            && candidate.confidence <= current.confidence) =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best
    }

    /// Write performance scores into the registry as weights clamped to
    /// [0.1, 2.0], in name order. Stops at the first unknown algorithm;
    /// earlier updates stay applied.
    pub fn update_weights(&self, scores: &BTreeMap<String, f64>) -> Result<(), EnsembleError> {
        for (name, score) in scores {
            let weight = if score.is_nan() {
                MIN_WEIGHT
            } else {
                score.clamp(MIN_WEIGHT, MAX_WEIGHT)
            };
            if let Err(e) = self.registry.update_weight(name, weight) {
                warn!("Ensemble: cannot update weight: {}", e);
                return Err(e.into());
            }
            debug!("Ensemble: weight for {} set to {:.2}", name, weight);
        }
        Ok(())
    }
}
