use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::StorageEnvConfig;
use crate::domain::repositories::{
    BacktestRepository, DrawRepository, PredictionRepository, StatsRepository,
};
use crate::infrastructure::persistence::{
    JsonBacktestRepository, JsonDrawRepository, JsonPredictionRepository, JsonStatsRepository,
    JsonStore,
};
use crate::infrastructure::repositories::{
    InMemoryBacktestRepository, InMemoryDrawRepository, InMemoryPredictionRepository,
    InMemoryStatsRepository,
};

#[derive(Clone)]
pub struct PersistenceHandle {
    pub draw_repository: Arc<dyn DrawRepository>,
    pub prediction_repository: Arc<dyn PredictionRepository>,
    pub backtest_repository: Arc<dyn BacktestRepository>,
    pub stats_repository: Arc<dyn StatsRepository>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    /// JSON documents under the configured data directory.
    pub async fn init(config: &StorageEnvConfig) -> Result<PersistenceHandle> {
        info!("Initializing JSON store at {}", config.data_dir.display());
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

        let store = Arc::new(JsonStore::new(config.data_dir.clone()));
        Ok(PersistenceHandle {
            draw_repository: Arc::new(JsonDrawRepository::new(store.clone())),
            prediction_repository: Arc::new(JsonPredictionRepository::new(store.clone())),
            backtest_repository: Arc::new(JsonBacktestRepository::new(store.clone())),
            stats_repository: Arc::new(JsonStatsRepository::new(store)),
        })
    }

    /// Nothing survives the process.
    pub fn in_memory() -> PersistenceHandle {
        PersistenceHandle {
            draw_repository: Arc::new(InMemoryDrawRepository::new()),
            prediction_repository: Arc::new(InMemoryPredictionRepository::new()),
            backtest_repository: Arc::new(InMemoryBacktestRepository::new()),
            stats_repository: Arc::new(InMemoryStatsRepository::new()),
        }
    }
}
