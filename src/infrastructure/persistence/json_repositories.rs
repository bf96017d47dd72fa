use super::json_store::{Collection, JsonStore};
use crate::domain::lottery::{Draw, GameType};
use crate::domain::prediction::{AlgorithmStats, BacktestResult, EnsembleResult};
use crate::domain::repositories::{
    BacktestRepository, DrawRepository, PredictionRepository, StatsRepository,
};
use crate::infrastructure::repositories::query;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub struct JsonDrawRepository {
    store: Arc<JsonStore>,
}

impl JsonDrawRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DrawRepository for JsonDrawRepository {
    async fn save_batch(&self, draws: &[Draw]) -> Result<usize> {
        let mut inserted = 0;
        for game in GameType::all() {
            let batch: Vec<Draw> = draws.iter().filter(|d| d.game() == game).cloned().collect();
            if batch.is_empty() {
                continue;
            }
            inserted += self
                .store
                .update(game, Collection::Draws, |stored: &mut Vec<Draw>| {
                    query::merge_draws(stored, &batch)
                })
                .await?;
        }
        info!("JsonDrawRepository: saved {} draws ({} new)", draws.len(), inserted);
        Ok(inserted)
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>> {
        let stored: Vec<Draw> = self.store.load(game, Collection::Draws).await?;
        Ok(query::latest_draws(&stored, limit))
    }

    async fn find_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>> {
        let stored: Vec<Draw> = self.store.load(game, Collection::Draws).await?;
        Ok(query::draws_between(&stored, from, to))
    }

    async fn count(&self, game: GameType) -> Result<usize> {
        let stored: Vec<Draw> = self.store.load(game, Collection::Draws).await?;
        Ok(stored.len())
    }

    async fn latest_index(&self, game: GameType) -> Result<Option<u32>> {
        let stored: Vec<Draw> = self.store.load(game, Collection::Draws).await?;
        Ok(stored.last().map(|d| d.sequence_index()))
    }
}

pub struct JsonPredictionRepository {
    store: Arc<JsonStore>,
}

impl JsonPredictionRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PredictionRepository for JsonPredictionRepository {
    async fn save(&self, game: GameType, result: &EnsembleResult) -> Result<()> {
        let result = result.clone();
        self.store
            .update(game, Collection::Predictions, move |stored: &mut Vec<EnsembleResult>| {
                stored.push(result)
            })
            .await
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<EnsembleResult>> {
        let stored: Vec<EnsembleResult> = self.store.load(game, Collection::Predictions).await?;
        Ok(query::latest_predictions(&stored, limit))
    }
}

pub struct JsonBacktestRepository {
    store: Arc<JsonStore>,
}

impl JsonBacktestRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BacktestRepository for JsonBacktestRepository {
    async fn save(&self, game: GameType, result: &BacktestResult) -> Result<()> {
        let result = result.clone();
        self.store
            .update(game, Collection::Backtests, move |stored: &mut Vec<BacktestResult>| {
                stored.push(result)
            })
            .await
    }

    async fn find_latest(&self, game: GameType, limit: usize) -> Result<Vec<BacktestResult>> {
        let stored: Vec<BacktestResult> = self.store.load(game, Collection::Backtests).await?;
        Ok(query::latest_backtests(&stored, limit))
    }

    async fn find_by_algorithm(
        &self,
        game: GameType,
        algorithm_id: &str,
    ) -> Result<Vec<BacktestResult>> {
        let stored: Vec<BacktestResult> = self.store.load(game, Collection::Backtests).await?;
        Ok(query::backtests_for(&stored, algorithm_id))
    }
}

pub struct JsonStatsRepository {
    store: Arc<JsonStore>,
}

impl JsonStatsRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StatsRepository for JsonStatsRepository {
    async fn save(&self, stats: &AlgorithmStats) -> Result<()> {
        let stats = stats.clone();
        self.store
            .update(stats.game, Collection::Stats, move |stored: &mut Vec<AlgorithmStats>| {
                query::upsert_stats(stored, &stats)
            })
            .await
    }

    async fn find(&self, game: GameType, algorithm_id: &str) -> Result<Option<AlgorithmStats>> {
        let stored: Vec<AlgorithmStats> = self.store.load(game, Collection::Stats).await?;
        Ok(stored.into_iter().find(|s| s.algorithm_id == algorithm_id))
    }

    async fn find_all(&self, game: GameType) -> Result<Vec<AlgorithmStats>> {
        self.store.load(game, Collection::Stats).await
    }
}
