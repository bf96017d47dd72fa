pub mod in_memory;
pub mod query;

pub use in_memory::{
    InMemoryBacktestRepository, InMemoryDrawRepository, InMemoryPredictionRepository,
    InMemoryStatsRepository,
};
