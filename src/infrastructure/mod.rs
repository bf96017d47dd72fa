pub mod log_publisher;
pub mod persistence;
pub mod repositories;
pub mod sources;

pub use log_publisher::LogPublisher;
pub use persistence::{
    JsonBacktestRepository, JsonDrawRepository, JsonPredictionRepository, JsonStatsRepository,
    JsonStore,
};
pub use repositories::{
    InMemoryBacktestRepository, InMemoryDrawRepository, InMemoryPredictionRepository,
    InMemoryStatsRepository,
};
pub use sources::{CsvDrawSource, SyntheticDrawSource};
