// Lottery value types (games, number sets, draws)
pub mod lottery;

// Predictions, ensemble output and backtest records
pub mod prediction;

// Cooperative cancellation
pub mod cancellation;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
