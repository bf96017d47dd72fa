use drawcast::application::algorithms::{
    AlgorithmRegistry, FrequencyAnalyzer, HotColdAnalyzer, PatternAnalyzer, RandomAnalyzer,
};
use drawcast::application::ensemble::Ensemble;
use drawcast::domain::errors::EnsembleError;
use drawcast::domain::lottery::GameType;
use drawcast::domain::prediction::VotingPolicy;
use drawcast::infrastructure::sources::generate_draws;
use std::sync::Arc;

fn standard_ensemble(policy: VotingPolicy) -> Ensemble {
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
    Ensemble::new(registry, policy)
}

#[test]
fn test_ensemble_over_synthetic_history() {
    let draws = generate_draws(GameType::Mega645, 150, 42).unwrap();
    let ensemble = standard_ensemble(VotingPolicy::Weighted);

    let result = ensemble
        .generate_predictions(GameType::Mega645.range(), &draws)
        .unwrap();

    assert_eq!(result.final_numbers.len(), 6);
    assert!(result.final_numbers.iter().all(|n| (1..=45).contains(&n)));
    assert_eq!(result.contributions.len(), result.predictions.len());
    assert_eq!(result.predictions.len(), 3);
    assert_eq!(result.voting_policy.as_str(), "weighted");
    assert!((0.0..=1.0).contains(&result.consensus_score));

    for prediction in &result.predictions {
        assert_eq!(prediction.produced_for_index, 151);
    }
}

#[test]
fn test_every_policy_yields_a_valid_set() {
    let draws = generate_draws(GameType::Power655, 150, 3).unwrap();
    for policy in [
        VotingPolicy::Weighted,
        VotingPolicy::Majority,
        VotingPolicy::ConfidenceWeighted,
    ] {
        let result = standard_ensemble(policy)
            .generate_predictions(GameType::Power655.range(), &draws)
            .unwrap();
        assert_eq!(result.voting_policy, policy);
        assert!(result.final_numbers.iter().all(|n| (1..=55).contains(&n)));
    }
}

#[test]
fn test_short_history_skips_demanding_algorithms() {
    // Frequency needs 8 draws, hot/cold 50, pattern 100
    let draws = generate_draws(GameType::Mega645, 60, 8).unwrap();
    let result = standard_ensemble(VotingPolicy::Weighted)
        .generate_predictions(GameType::Mega645.range(), &draws)
        .unwrap();

    let used: Vec<&str> = result
        .contributions
        .iter()
        .map(|c| c.algorithm_id.as_str())
        .collect();
    assert_eq!(used, vec!["frequency_analysis", "hot_cold_analysis"]);
}

#[test]
fn test_no_algorithm_can_run() {
    let draws = generate_draws(GameType::Mega645, 5, 8).unwrap();
    let err = standard_ensemble(VotingPolicy::Weighted)
        .generate_predictions(GameType::Mega645.range(), &draws)
        .unwrap_err();
    assert!(matches!(err, EnsembleError::NoValidPredictions { attempted: 3, .. }));
}

#[test]
fn test_random_baseline_runs_on_empty_history() {
    let registry = Arc::new(AlgorithmRegistry::new());
    registry
        .register(Arc::new(RandomAnalyzer::seeded(0.1, 99)), 0.1)
        .unwrap();
    let ensemble = Ensemble::new(registry, VotingPolicy::Majority);

    let result = ensemble
        .generate_predictions(GameType::Mega645.range(), &[])
        .unwrap();
    assert_eq!(result.final_numbers, result.predictions[0].numbers);
    assert_eq!(result.consensus_score, 1.0);
}
