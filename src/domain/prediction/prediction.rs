use super::voting_policy::VotingPolicy;
use crate::domain::lottery::NumberSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single algorithm's pick for the next draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub algorithm_id: String,
    pub numbers: NumberSet,
    /// Always within [0, 1]
    pub confidence: f64,
    /// Sequence index of the draw this prediction targets
    pub produced_for_index: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Prediction {
    pub fn new(
        algorithm_id: impl Into<String>,
        numbers: NumberSet,
        confidence: f64,
        produced_for_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            algorithm_id: algorithm_id.into(),
            numbers,
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
            produced_for_index,
            generated_at: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// How one algorithm's prediction relates to the final ensemble pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmContribution {
    pub algorithm_id: String,
    pub weight: f64,
    pub match_count_against_final: usize,
    pub confidence: f64,
}

/// Output of one ensemble round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub id: Uuid,
    pub final_numbers: NumberSet,
    pub voting_policy: VotingPolicy,
    pub contributions: Vec<AlgorithmContribution>,
    pub predictions: Vec<Prediction>,
    /// Mean pairwise agreement between the surviving predictions
    pub consensus_score: f64,
    pub generated_at: DateTime<Utc>,
}

impl std::fmt::Display for EnsembleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ensemble {} (policy: {}, algorithms: {}, consensus: {:.2})",
            self.final_numbers,
            self.voting_policy,
            self.predictions.len(),
            self.consensus_score
        )
    }
}
