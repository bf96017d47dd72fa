use std::env;
use std::path::PathBuf;

/// Where the JSON stores live
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEnvConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StorageEnvConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("DRAWCAST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
        }
    }
}
