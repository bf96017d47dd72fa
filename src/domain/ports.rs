use crate::domain::lottery::{Draw, GameType};
use crate::domain::prediction::EnsembleResult;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Where historical draws come from (results site, CSV export, generator).
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// The most recent `limit` draws, ascending by sequence index.
    async fn fetch_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>>;

    /// Draws observed within `[from, to]`, ascending by sequence index.
    async fn fetch_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>>;
}

/// Downstream consumer of ensemble results.
#[async_trait]
pub trait PredictionPublisher: Send + Sync {
    async fn publish(&self, game: GameType, result: &EnsembleResult) -> Result<()>;
}
