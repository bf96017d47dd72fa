// JSON file store, one directory per game
pub mod json_repositories;
pub mod json_store;

pub use json_repositories::{
    JsonBacktestRepository, JsonDrawRepository, JsonPredictionRepository, JsonStatsRepository,
};
pub use json_store::{Collection, JsonStore};
