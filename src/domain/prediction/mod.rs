// Prediction and scoring records
pub mod algorithm_kind;
pub mod algorithm_stats;
pub mod backtest_result;
pub mod prediction;
pub mod voting_policy;

pub use algorithm_kind::AlgorithmKind;
pub use algorithm_stats::AlgorithmStats;
pub use backtest_result::{BacktestResult, MatchClass, PredictionMatch};
pub use prediction::{AlgorithmContribution, EnsembleResult, Prediction};
pub use voting_policy::VotingPolicy;
