// Prediction algorithms and their registry
pub mod algorithms;

// Multi-algorithm voting
pub mod ensemble;

// Walk-forward evaluation and reports
pub mod backtesting;

// Use cases
pub mod services;

// Wiring
pub mod bootstrap;
