use crate::domain::lottery::GameType;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Document kinds kept per game directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Draws,
    Predictions,
    Backtests,
    Stats,
}

impl Collection {
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Draws => "draws.json",
            Collection::Predictions => "predictions.json",
            Collection::Backtests => "backtests.json",
            Collection::Stats => "stats.json",
        }
    }
}

/// JSON documents under `<root>/<GAME>/<collection>.json`.
///
/// Writes go to a temp file first and are renamed into place. A single
/// mutex serializes read-modify-write cycles within the process.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, game: GameType, collection: Collection) -> PathBuf {
        self.root.join(game.code()).join(collection.file_name())
    }

    /// Missing files read as an empty collection.
    pub async fn load<T>(&self, game: GameType, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let path = self.path(game, collection);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub async fn save<T>(&self, game: GameType, collection: Collection, items: &[T]) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let path = self.path(game, collection);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(items)
            .with_context(|| format!("Failed to serialize {}", collection.file_name()))?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to rename into {}", path.display()))?;

        debug!("JsonStore: wrote {} items to {}", items.len(), path.display());
        Ok(())
    }

    /// Load, apply `change`, save, all under the write lock.
    pub async fn update<T, R, F>(&self, game: GameType, collection: Collection, change: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce(&mut Vec<T>) -> R + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<T> = self.load(game, collection).await?;
        let outcome = change(&mut items);
        self.save(game, collection, &items).await?;
        Ok(outcome)
    }
}
