//! Repository abstractions for draws, predictions and backtest outcomes.
//!
//! Every repository is scoped by `GameType`. The JSON file store in
//! `infrastructure::persistence` is the production implementation; the
//! in-memory versions back tests.
//!
//! ```rust,no_run
//! use drawcast::domain::lottery::GameType;
//! use drawcast::domain::repositories::DrawRepository;
//! use drawcast::infrastructure::InMemoryDrawRepository;
//!
//! # async {
//! let repo = InMemoryDrawRepository::new();
//! let latest = repo.find_latest(GameType::Mega645, 50).await;
//! # };
//! ```

use crate::domain::lottery::{Draw, GameType};
use crate::domain::prediction::{AlgorithmStats, BacktestResult, EnsembleResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Historical draws, unique per (game, sequence index)
#[async_trait]
pub trait DrawRepository: Send + Sync {
    /// Insert or replace draws by sequence index. Returns how many were new.
    async fn save_batch(&self, draws: &[Draw]) -> Result<usize>;

    /// The most recent `limit` draws, ascending by sequence index
    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>>;

    /// Draws observed within `[from, to]`, ascending by sequence index
    async fn find_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>>;

    async fn count(&self, game: GameType) -> Result<usize>;

    /// Highest stored sequence index, if any
    async fn latest_index(&self, game: GameType) -> Result<Option<u32>>;
}

/// Ensemble results, newest last
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn save(&self, game: GameType, result: &EnsembleResult) -> Result<()>;

    /// Most recent results first
    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<EnsembleResult>>;
}

#[async_trait]
pub trait BacktestRepository: Send + Sync {
    async fn save(&self, game: GameType, result: &BacktestResult) -> Result<()>;

    /// Most recent results first
    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<BacktestResult>>;

    /// Most recent results first
    async fn find_by_algorithm(
        &self,
        game: GameType,
        algorithm_id: &str,
    ) -> Result<Vec<BacktestResult>>;
}

/// One stats record per (game, algorithm), replaced on save
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn save(&self, stats: &AlgorithmStats) -> Result<()>;

    async fn find(&self, game: GameType, algorithm_id: &str) -> Result<Option<AlgorithmStats>>;

    async fn find_all(&self, game: GameType) -> Result<Vec<AlgorithmStats>>;
}
