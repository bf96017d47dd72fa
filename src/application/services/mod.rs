// Use-case services wiring the core to sources and repositories
pub mod backtest_service;
pub mod history_service;
pub mod prediction_service;

pub use backtest_service::{BacktestRequest, BacktestService};
pub use history_service::{BacktestWindow, HistoryService};
pub use prediction_service::{PredictionOutcome, PredictionService};
