// Walk-forward engine
pub mod backtester;

// Summary tables and JSON reports
pub mod reporting;

pub use backtester::Backtester;
pub use reporting::{BacktestReport, ReportRow};
