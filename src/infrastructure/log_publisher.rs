//! Stdout publisher for ensemble results
//!
//! Emits each result as one structured JSON log line. Stands in for an
//! outbound channel (notification service, webhook) that is not wired up.

use crate::domain::lottery::GameType;
use crate::domain::ports::PredictionPublisher;
use crate::domain::prediction::EnsembleResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct PublishedPrediction<'a> {
    game: GameType,
    numbers: Vec<u8>,
    voting_policy: &'a str,
    consensus_score: f64,
    algorithms: Vec<&'a str>,
    generated_at: String,
}

#[derive(Debug, Default)]
pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PredictionPublisher for LogPublisher {
    async fn publish(&self, game: GameType, result: &EnsembleResult) -> Result<()> {
        let payload = PublishedPrediction {
            game,
            numbers: result.final_numbers.as_slice().to_vec(),
            voting_policy: result.voting_policy.as_str(),
            consensus_score: result.consensus_score,
            algorithms: result
                .contributions
                .iter()
                .map(|c| c.algorithm_id.as_str())
                .collect(),
            generated_at: result.generated_at.to_rfc3339(),
        };
        let json = serde_json::to_string(&payload).context("Failed to serialize prediction")?;
        info!(target: "prediction", "{}", json);
        Ok(())
    }
}
