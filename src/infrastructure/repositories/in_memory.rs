//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementations of the repository traits defined
//! in `domain::repositories`, keyed by game. Data is lost on restart; they
//! back tests and throwaway runs such as `--synthetic` demos.

use super::query;
use crate::domain::lottery::{Draw, GameType};
use crate::domain::prediction::{AlgorithmStats, BacktestResult, EnsembleResult};
use crate::domain::repositories::{
    BacktestRepository, DrawRepository, PredictionRepository, StatsRepository,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type ByGame<T> = Arc<RwLock<HashMap<GameType, Vec<T>>>>;

/// In-memory implementation of DrawRepository
#[derive(Default)]
pub struct InMemoryDrawRepository {
    draws: ByGame<Draw>,
}

impl InMemoryDrawRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrawRepository for InMemoryDrawRepository {
    async fn save_batch(&self, draws: &[Draw]) -> Result<usize> {
        let mut by_game = self.draws.write().await;
        let mut inserted = 0;
        for game in GameType::all() {
            let batch: Vec<Draw> = draws.iter().filter(|d| d.game() == game).cloned().collect();
            if !batch.is_empty() {
                inserted += query::merge_draws(by_game.entry(game).or_default(), &batch);
            }
        }
        Ok(inserted)
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>> {
        let by_game = self.draws.read().await;
        Ok(by_game
            .get(&game)
            .map(|stored| query::latest_draws(stored, limit))
            .unwrap_or_default())
    }

    async fn find_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>> {
        let by_game = self.draws.read().await;
        Ok(by_game
            .get(&game)
            .map(|stored| query::draws_between(stored, from, to))
            .unwrap_or_default())
    }

    async fn count(&self, game: GameType) -> Result<usize> {
        Ok(self.draws.read().await.get(&game).map_or(0, Vec::len))
    }

    async fn latest_index(&self, game: GameType) -> Result<Option<u32>> {
        Ok(self
            .draws
            .read()
            .await
            .get(&game)
            .and_then(|stored| stored.last())
            .map(|d| d.sequence_index()))
    }
}

/// In-memory implementation of PredictionRepository
#[derive(Default)]
pub struct InMemoryPredictionRepository {
    results: ByGame<EnsembleResult>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn save(&self, game: GameType, result: &EnsembleResult) -> Result<()> {
        self.results
            .write()
            .await
            .entry(game)
            .or_default()
            .push(result.clone());
        Ok(())
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<EnsembleResult>> {
        let by_game = self.results.read().await;
        Ok(by_game
            .get(&game)
            .map(|stored| query::latest_predictions(stored, limit))
            .unwrap_or_default())
    }
}

/// In-memory implementation of BacktestRepository
#[derive(Default)]
pub struct InMemoryBacktestRepository {
    results: ByGame<BacktestResult>,
}

impl InMemoryBacktestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BacktestRepository for InMemoryBacktestRepository {
    async fn save(&self, game: GameType, result: &BacktestResult) -> Result<()> {
        self.results
            .write()
            .await
            .entry(game)
            .or_default()
            .push(result.clone());
        Ok(())
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<BacktestResult>> {
        let by_game = self.results.read().await;
        Ok(by_game
            .get(&game)
            .map(|stored| query::latest_backtests(stored, limit))
            .unwrap_or_default())
    }

    async fn find_by_algorithm(
        &self,
        game: GameType,
        algorithm_id: &str,
    ) -> Result<Vec<BacktestResult>> {
        let by_game = self.results.read().await;
        Ok(by_game
            .get(&game)
            .map(|stored| query::backtests_for(stored, algorithm_id))
            .unwrap_or_default())
    }
}

/// In-memory implementation of StatsRepository
#[derive(Default)]
pub struct InMemoryStatsRepository {
    stats: ByGame<AlgorithmStats>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn save(&self, stats: &AlgorithmStats) -> Result<()> {
        let mut by_game = self.stats.write().await;
        query::upsert_stats(by_game.entry(stats.game).or_default(), stats);
        Ok(())
    }

    async fn find(&self, game: GameType, algorithm_id: &str) -> Result<Option<AlgorithmStats>> {
        Ok(self
            .stats
            .read()
            .await
            .get(&game)
            .and_then(|stored| stored.iter().find(|s| s.algorithm_id == algorithm_id))
            .cloned())
    }

    async fn find_all(&self, game: GameType) -> Result<Vec<AlgorithmStats>> {
        Ok(self
            .stats
            .read()
            .await
            .get(&game)
            .cloned()
            .unwrap_or_default())
    }
}
