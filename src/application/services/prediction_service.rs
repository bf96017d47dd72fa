use super::history_service::HistoryService;
use crate::application::ensemble::Ensemble;
use crate::domain::lottery::{Draw, GameType};
use crate::domain::ports::PredictionPublisher;
use crate::domain::prediction::EnsembleResult;
use crate::domain::repositories::PredictionRepository;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A finished prediction run.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub result: EnsembleResult,
    pub draws_used: usize,
    pub duration: Duration,
}

impl PredictionOutcome {
    pub fn algorithms_used(&self) -> usize {
        self.result.predictions.len()
    }
}

/// Prediction workflow: history, ensemble round, store, publish.
pub struct PredictionService {
    ensemble: Arc<Ensemble>,
    history: Arc<HistoryService>,
    predictions: Arc<dyn PredictionRepository>,
    publisher: Option<Arc<dyn PredictionPublisher>>,
    history_limit: usize,
}

impl PredictionService {
    pub fn new(
        ensemble: Arc<Ensemble>,
        history: Arc<HistoryService>,
        predictions: Arc<dyn PredictionRepository>,
        history_limit: usize,
    ) -> Self {
        Self {
            ensemble,
            history,
            predictions,
            publisher: None,
            history_limit,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn PredictionPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Fewest draws any registered algorithm can work with (at least one).
    pub fn min_history(&self) -> usize {
        self.ensemble
            .registry()
            .get_all()
            .iter()
            .map(|a| a.min_history())
            .min()
            .unwrap_or(0)
            .max(1)
    }

    pub async fn predict(&self, game: GameType) -> Result<PredictionOutcome> {
        let started = Instant::now();
        info!("PredictionService: starting {} prediction", game);

        let draws = self.history.load_latest(game, self.history_limit).await?;
        self.run(game, &draws, started).await
    }

    /// Prediction over a caller-supplied history.
    pub async fn predict_from(&self, game: GameType, draws: &[Draw]) -> Result<PredictionOutcome> {
        self.run(game, draws, Instant::now()).await
    }

    async fn run(&self, game: GameType, draws: &[Draw], started: Instant) -> Result<PredictionOutcome> {
        let required = self.min_history();
        if draws.len() < required {
            anyhow::bail!(
                "Insufficient historical data: need at least {} draws, got {}",
                required,
                draws.len()
            );
        }

        let result = self
            .ensemble
            .generate_predictions(game.range(), draws)
            .context("Ensemble prediction failed")?;

        if let Err(e) = self.predictions.save(game, &result).await {
            warn!("PredictionService: failed to save prediction {}: {:#}", result.id, e);
        }

        match &self.publisher {
            Some(publisher) => {
                if let Err(e) = publisher.publish(game, &result).await {
                    warn!("PredictionService: failed to publish prediction {}: {:#}", result.id, e);
                }
            }
            None => info!("PredictionService: no publisher configured, skipping publish"),
        }

        let outcome = PredictionOutcome {
            result,
            draws_used: draws.len(),
            duration: started.elapsed(),
        };
        info!(
            "PredictionService: {} prediction {} done in {:?}",
            game, outcome.result.id, outcome.duration
        );
        Ok(outcome)
    }
}
