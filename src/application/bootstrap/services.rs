use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::application::algorithms::{AlgorithmFactory, AlgorithmRegistry};
use crate::application::backtesting::Backtester;
use crate::application::bootstrap::persistence::PersistenceHandle;
use crate::application::ensemble::Ensemble;
use crate::application::services::{BacktestService, HistoryService, PredictionService};
use crate::config::{AlgorithmEnvConfig, Config};
use crate::domain::ports::{DrawSource, PredictionPublisher};

pub struct ServicesHandle {
    pub registry: Arc<AlgorithmRegistry>,
    pub ensemble: Arc<Ensemble>,
    pub history: Arc<HistoryService>,
    pub prediction_service: PredictionService,
    pub backtest_service: BacktestService,
}

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    pub fn init(
        config: &Config,
        persistence: &PersistenceHandle,
        source: Arc<dyn DrawSource>,
        publisher: Option<Arc<dyn PredictionPublisher>>,
    ) -> Result<ServicesHandle> {
        // 1. Algorithms and ensemble
        let registry = Self::build_registry(&config.algorithms)?;
        let ensemble = Arc::new(Ensemble::new(
            registry.clone(),
            config.algorithms.voting_policy,
        ));

        // 2. History access
        let history = Arc::new(HistoryService::new(
            source,
            persistence.draw_repository.clone(),
        ));

        // 3. Use cases
        let mut prediction_service = PredictionService::new(
            ensemble.clone(),
            history.clone(),
            persistence.prediction_repository.clone(),
            config.backtest.history_limit,
        );
        if let Some(publisher) = publisher {
            prediction_service = prediction_service.with_publisher(publisher);
        }

        let backtest_service = BacktestService::new(
            ensemble.clone(),
            history.clone(),
            persistence.backtest_repository.clone(),
            persistence.stats_repository.clone(),
            Backtester::new(config.backtest.min_training_rounds),
        )
        .with_auto_weight_update(config.backtest.auto_weight_update);

        Ok(ServicesHandle {
            registry,
            ensemble,
            history,
            prediction_service,
            backtest_service,
        })
    }

    /// One analyzer per enabled kind, at its configured weight.
    pub fn build_registry(config: &AlgorithmEnvConfig) -> Result<Arc<AlgorithmRegistry>> {
        let registry = Arc::new(AlgorithmRegistry::new());
        for &kind in &config.enabled_algorithms {
            let algorithm = AlgorithmFactory::create(kind, config);
            registry
                .register(algorithm, config.weight_for(kind))
                .with_context(|| format!("Failed to register {}", kind))?;
        }
        info!(
            "Registered {} algorithms: {}",
            registry.count(),
            registry.names().join(", ")
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bootstrap::persistence::PersistenceBootstrap;
    use crate::domain::prediction::AlgorithmKind;
    use crate::infrastructure::sources::SyntheticDrawSource;

    #[test]
    fn test_default_registry() {
        let registry = ServicesBootstrap::build_registry(&AlgorithmEnvConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec!["frequency_analysis", "hot_cold_analysis", "pattern_analysis"]
        );
        assert_eq!(registry.weight("hot_cold_analysis").unwrap(), 1.2);
    }

    #[test]
    fn test_seeded_random_registered() {
        let config = AlgorithmEnvConfig {
            enabled_algorithms: vec![AlgorithmKind::Random],
            random_seed: Some(5),
            ..AlgorithmEnvConfig::default()
        };
        let registry = ServicesBootstrap::build_registry(&config).unwrap();
        assert_eq!(registry.weight("random_analysis").unwrap(), 0.1);
    }

    #[tokio::test]
    async fn test_services_share_one_registry() {
        let persistence = PersistenceBootstrap::in_memory();
        let services = ServicesBootstrap::init(
            &Config::default(),
            &persistence,
            Arc::new(SyntheticDrawSource::new(10, 1)),
            None,
        )
        .unwrap();
        assert!(Arc::ptr_eq(&services.registry, services.ensemble.registry()));
    }
}
