use thiserror::Error;

/// Why a raw list of values was rejected as a `NumberSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSetReason {
    WrongCount,
    OutOfRange,
    Duplicate,
}

impl std::fmt::Display for InvalidSetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidSetReason::WrongCount => write!(f, "wrong count"),
            InvalidSetReason::OutOfRange => write!(f, "out of range"),
            InvalidSetReason::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// Construction failure for a `NumberSet`. Input is never truncated or corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid number set ({reason}): {detail}")]
pub struct InvalidSetError {
    pub reason: InvalidSetReason,
    pub detail: String,
}

impl InvalidSetError {
    pub fn new(reason: InvalidSetReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Errors raised while building lottery value types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    InvalidSet(#[from] InvalidSetError),

    #[error("Invalid game range: min {min} must be below max {max} with room for {pick} numbers")]
    InvalidRange { min: u8, max: u8, pick: usize },

    #[error("Draw sequence index must be positive, got {index}")]
    NonPositiveIndex { index: u32 },

    #[error("Unknown game type: {value}")]
    UnknownGame { value: String },

    #[error("Negative {field} on draw #{index}: {value}")]
    NegativeAmount {
        field: &'static str,
        index: u32,
        value: f64,
    },
}

/// Errors raised by a single prediction algorithm
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgorithmError {
    #[error("{algorithm} needs at least {required} draws, got {got}")]
    InsufficientData {
        algorithm: String,
        required: usize,
        got: usize,
    },

    #[error("Training failed for {algorithm}: {reason}")]
    Training { algorithm: String, reason: String },

    #[error("Prediction failed for {algorithm}: {reason}")]
    Prediction { algorithm: String, reason: String },

    #[error("Weight cannot be negative, got {weight}")]
    NegativeWeight { weight: f64 },

    #[error("{parameter} must be at least {min}, got {value}")]
    InvalidParameter {
        parameter: &'static str,
        min: usize,
        value: usize,
    },

    #[error("Prediction cancelled for {algorithm}")]
    Cancelled { algorithm: String },
}

/// Registry bookkeeping errors (caller / programmer errors)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Algorithm {name} already registered")]
    Duplicate { name: String },

    #[error("Algorithm {name} not found")]
    NotFound { name: String },

    #[error("Weight for {name} cannot be negative, got {weight}")]
    NegativeWeight { name: String, weight: f64 },

    #[error("Algorithm {name} rejected its weight: {source}")]
    WeightRejected {
        name: String,
        #[source]
        source: AlgorithmError,
    },
}

/// Round-level ensemble failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnsembleError {
    #[error("No algorithms registered in the ensemble")]
    NoAlgorithms,

    #[error("No valid predictions generated ({skipped} of {attempted} algorithms skipped)")]
    NoValidPredictions { attempted: usize, skipped: usize },

    #[error("Ensemble round cancelled")]
    Cancelled,

    #[error("Voting produced an invalid set: {0}")]
    Voting(#[from] InvalidSetError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Walk-forward backtest failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    #[error("Not enough draws for backtesting: need more than {required}, got {got}")]
    InsufficientHistory { required: usize, got: usize },

    #[error("Backtest of {algorithm} cancelled after {completed_rounds} rounds")]
    Cancelled {
        algorithm: String,
        completed_rounds: usize,
    },
}
