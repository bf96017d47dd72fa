use super::history_service::{BacktestWindow, HistoryService};
use crate::application::algorithms::registry::WeightedAlgorithm;
use crate::application::backtesting::{BacktestReport, Backtester};
use crate::application::ensemble::Ensemble;
use crate::domain::cancellation::CancelFlag;
use crate::domain::errors::BacktestError;
use crate::domain::lottery::GameType;
use crate::domain::prediction::{AlgorithmStats, BacktestResult};
use crate::domain::repositories::{BacktestRepository, StatsRepository};
use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// What to backtest. An empty `algorithms` list means every registered one.
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub game: GameType,
    pub window: BacktestWindow,
    pub algorithms: Vec<String>,
}

impl BacktestRequest {
    pub fn new(game: GameType, window: BacktestWindow) -> Self {
        Self {
            game,
            window,
            algorithms: Vec::new(),
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<String>) -> Self {
        self.algorithms = algorithms;
        self
    }
}

/// Backtest workflow over the registered algorithms.
///
/// Algorithms are backtested in parallel on the rayon pool, off the async
/// runtime. Each result and its derived stats are stored; storage failures
/// are logged and do not fail the run.
pub struct BacktestService {
    ensemble: Arc<Ensemble>,
    history: Arc<HistoryService>,
    backtests: Arc<dyn BacktestRepository>,
    stats: Arc<dyn StatsRepository>,
    backtester: Backtester,
    auto_weight_update: bool,
}

impl BacktestService {
    pub fn new(
        ensemble: Arc<Ensemble>,
        history: Arc<HistoryService>,
        backtests: Arc<dyn BacktestRepository>,
        stats: Arc<dyn StatsRepository>,
        backtester: Backtester,
    ) -> Self {
        Self {
            ensemble,
            history,
            backtests,
            stats,
            backtester,
            auto_weight_update: false,
        }
    }

    /// Feed each algorithm's overall score back into the ensemble weights.
    pub fn with_auto_weight_update(mut self, enabled: bool) -> Self {
        self.auto_weight_update = enabled;
        self
    }

    pub async fn run(&self, request: BacktestRequest) -> Result<BacktestReport> {
        self.run_with_cancel(request, CancelFlag::new()).await
    }

    pub async fn run_with_cancel(
        &self,
        request: BacktestRequest,
        cancel: CancelFlag,
    ) -> Result<BacktestReport> {
        let started = Instant::now();
        let game = request.game;
        info!(
            "BacktestService: {} over {} (training {})",
            game,
            request.window,
            self.backtester.min_training_rounds()
        );

        let draws = self
            .history
            .load_window(game, request.window)
            .await
            .context("Failed to get test draws")?;
        let total_draws = draws.len();

        let selected = self.select(&request.algorithms);
        if selected.is_empty() {
            anyhow::bail!("No registered algorithm matches {:?}", request.algorithms);
        }

        let backtester = self.backtester;
        let range = game.range();
        let outcomes: Vec<(WeightedAlgorithm, Result<BacktestResult, BacktestError>)> =
            tokio::task::spawn_blocking(move || {
                selected
                    .into_par_iter()
                    .map(|entry| {
                        let outcome = backtester.run_with_cancel(
                            entry.algorithm.as_ref(),
                            range,
                            &draws,
                            &cancel,
                        );
                        (entry, outcome)
                    })
                    .collect()
            })
            .await
            .context("Backtest worker failed")?;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut stats = Vec::with_capacity(outcomes.len());
        for (entry, outcome) in outcomes {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    warn!("BacktestService: {} failed: {}", entry.algorithm.name(), e);
                    continue;
                }
            };

            if let Err(e) = self.backtests.save(game, &result).await {
                warn!("BacktestService: failed to save {} result: {:#}", result.algorithm_id, e);
            }
            let algorithm_stats = AlgorithmStats::from_backtest(game, &result, entry.weight);
            if let Err(e) = self.stats.save(&algorithm_stats).await {
                warn!("BacktestService: failed to save {} stats: {:#}", result.algorithm_id, e);
            }

            results.push(result);
            stats.push(algorithm_stats);
        }

        if results.is_empty() {
            anyhow::bail!("No backtest results generated for {}", game);
        }

        if self.auto_weight_update {
            self.apply_scores(&stats);
        }

        let report = BacktestReport {
            game,
            test_period: request.window.describe(),
            total_draws,
            results,
            stats,
            duration_ms: started.elapsed().as_millis() as u64,
            generated_at: Utc::now(),
        };
        info!(
            "BacktestService: {} algorithms tested in {}ms",
            report.results.len(),
            report.duration_ms
        );
        Ok(report)
    }

    fn select(&self, requested: &[String]) -> Vec<WeightedAlgorithm> {
        let snapshot = self.ensemble.registry().snapshot();
        if requested.is_empty() {
            return snapshot;
        }

        for name in requested {
            if !snapshot.iter().any(|e| e.algorithm.name() == name) {
                warn!("BacktestService: {} is not registered, ignoring", name);
            }
        }
        snapshot
            .into_iter()
            .filter(|e| requested.iter().any(|name| name == e.algorithm.name()))
            .collect()
    }

    fn apply_scores(&self, stats: &[AlgorithmStats]) {
        let scores: BTreeMap<String, f64> = stats
            .iter()
            .map(|s| (s.algorithm_id.clone(), s.overall_score()))
            .collect();
        match self.ensemble.update_weights(&scores) {
            Ok(()) => info!("BacktestService: updated {} ensemble weights", scores.len()),
            Err(e) => warn!("BacktestService: weight update stopped: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::algorithms::{
        AlgorithmRegistry, FrequencyAnalyzer, HotColdAnalyzer, PatternAnalyzer,
    };
    use crate::domain::prediction::VotingPolicy;
    use crate::infrastructure::repositories::{
        InMemoryBacktestRepository, InMemoryDrawRepository, InMemoryStatsRepository,
    };
    use crate::infrastructure::sources::SyntheticDrawSource;

    struct Fixture {
        service: BacktestService,
        ensemble: Arc<Ensemble>,
        backtests: Arc<InMemoryBacktestRepository>,
        stats: Arc<InMemoryStatsRepository>,
    }

    fn fixture(draw_count: usize) -> Fixture {
        let registry = Arc::new(AlgorithmRegistry::new());
        registry
            .register(Arc::new(FrequencyAnalyzer::new(1.0)), 1.0)
            .unwrap();
        registry
            .register(Arc::new(HotColdAnalyzer::new(1.2)), 1.2)
            .unwrap();
        registry
            .register(Arc::new(PatternAnalyzer::new(0.8)), 0.8)
            .unwrap();
        let ensemble = Arc::new(Ensemble::new(registry, VotingPolicy::Weighted));
        let history = Arc::new(HistoryService::new(
            Arc::new(SyntheticDrawSource::new(draw_count, 11)),
            Arc::new(InMemoryDrawRepository::new()),
        ));
        let backtests = Arc::new(InMemoryBacktestRepository::new());
        let stats = Arc::new(InMemoryStatsRepository::new());
        let service = BacktestService::new(
            ensemble.clone(),
            history,
            backtests.clone(),
            stats.clone(),
            Backtester::new(30),
        );
        Fixture {
            service,
            ensemble,
            backtests,
            stats,
        }
    }

    #[tokio::test]
    async fn test_requested_algorithms_only() {
        let f = fixture(80);
        let request = BacktestRequest::new(GameType::Mega645, BacktestWindow::LastDraws(80))
            .with_algorithms(vec!["frequency_analysis".to_string(), "ghost".to_string()]);

        let report = f.service.run(request).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].algorithm_id, "frequency_analysis");
        assert_eq!(report.results[0].total_rounds, 50);
        assert_eq!(report.test_period, "Last 80 draws");

        let saved = f
            .backtests
            .find_by_algorithm(GameType::Mega645, "frequency_analysis")
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
        let stats = f
            .stats
            .find(GameType::Mega645, "frequency_analysis")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.weight, 1.0);
    }

    #[tokio::test]
    async fn test_all_registered_by_default() {
        let f = fixture(60);
        let report = f
            .service
            .run(BacktestRequest::new(
                GameType::Mega645,
                BacktestWindow::LastDraws(60),
            ))
            .await
            .unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.stats.len(), 3);
    }

    #[tokio::test]
    async fn test_too_little_history_fails() {
        let f = fixture(20);
        let err = f
            .service
            .run(BacktestRequest::new(
                GameType::Mega645,
                BacktestWindow::LastDraws(20),
            ))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No backtest results"));
    }

    #[tokio::test]
    async fn test_cancelled_run_has_no_results() {
        let f = fixture(60);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let request = BacktestRequest::new(GameType::Mega645, BacktestWindow::LastDraws(60));
        assert!(f.service.run_with_cancel(request, cancel).await.is_err());
        assert!(
            f.backtests
                .find_latest(GameType::Mega645, 10)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_auto_weight_update_clamps_scores() {
        let f = fixture(60);
        let service = f.service.with_auto_weight_update(true);
        service
            .run(BacktestRequest::new(
                GameType::Mega645,
                BacktestWindow::LastDraws(60),
            ))
            .await
            .unwrap();

        for name in f.ensemble.registry().names() {
            let weight = f.ensemble.registry().weight(&name).unwrap();
            assert!((0.1..=2.0).contains(&weight), "{} weight {}", name, weight);
        }
    }
}
