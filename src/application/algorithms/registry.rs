use super::PredictionAlgorithm;
use crate::domain::errors::RegistryError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};

struct Entry {
    algorithm: Arc<dyn PredictionAlgorithm>,
    weight: f64,
}

/// Registered algorithm with the voting weight it had when the snapshot was taken.
#[derive(Debug, Clone)]
pub struct WeightedAlgorithm {
    pub algorithm: Arc<dyn PredictionAlgorithm>,
    pub weight: f64,
}

/// Active algorithms and their voting weights.
///
/// Entries are keyed and iterated by name. Every mutation takes the write
/// lock, so readers always see a consistent set.
#[derive(Default)]
pub struct AlgorithmRegistry {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.names())
            .finish()
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Entry>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("AlgorithmRegistry: lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Entry>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("AlgorithmRegistry: lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn checked_weight(name: &str, weight: f64) -> Result<f64, RegistryError> {
        if weight < 0.0 || weight.is_nan() {
            return Err(RegistryError::NegativeWeight {
                name: name.to_string(),
                weight,
            });
        }
        Ok(weight)
    }

    fn apply_weight(
        name: &str,
        algorithm: &dyn PredictionAlgorithm,
        weight: f64,
    ) -> Result<(), RegistryError> {
        algorithm
            .set_weight(weight)
            .map_err(|source| RegistryError::WeightRejected {
                name: name.to_string(),
                source,
            })
    }

    /// Add a new algorithm. Nothing changes on failure.
    pub fn register(
        &self,
        algorithm: Arc<dyn PredictionAlgorithm>,
        weight: f64,
    ) -> Result<(), RegistryError> {
        let name = algorithm.name().to_string();
        let weight = Self::checked_weight(&name, weight)?;

        let mut entries = self.write();
        if entries.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        Self::apply_weight(&name, algorithm.as_ref(), weight)?;
        info!("AlgorithmRegistry: registered {} (weight {:.2})", name, weight);
        entries.insert(name, Entry { algorithm, weight });
        Ok(())
    }

    /// Add or replace an algorithm by name.
    pub fn register_or_update(
        &self,
        algorithm: Arc<dyn PredictionAlgorithm>,
        weight: f64,
    ) -> Result<(), RegistryError> {
        let name = algorithm.name().to_string();
        let weight = Self::checked_weight(&name, weight)?;
        Self::apply_weight(&name, algorithm.as_ref(), weight)?;

        let replaced = self
            .write()
            .insert(name.clone(), Entry { algorithm, weight })
            .is_some();
        info!(
            "AlgorithmRegistry: {} {} (weight {:.2})",
            if replaced { "updated" } else { "registered" },
            name,
            weight
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn PredictionAlgorithm>, RegistryError> {
        self.read()
            .get(name)
            .map(|entry| Arc::clone(&entry.algorithm))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// All algorithms, ordered by name.
    pub fn get_all(&self) -> Vec<Arc<dyn PredictionAlgorithm>> {
        self.read()
            .values()
            .map(|entry| Arc::clone(&entry.algorithm))
            .collect()
    }

    /// Algorithms with their weights, taken under a single lock acquisition.
    pub fn snapshot(&self) -> Vec<WeightedAlgorithm> {
        self.read()
            .values()
            .map(|entry| WeightedAlgorithm {
                algorithm: Arc::clone(&entry.algorithm),
                weight: entry.weight,
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn weight(&self, name: &str) -> Result<f64, RegistryError> {
        self.read()
            .get(name)
            .map(|entry| entry.weight)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn update_weight(&self, name: &str, weight: f64) -> Result<(), RegistryError> {
        let weight = Self::checked_weight(name, weight)?;
        let mut entries = self.write();
        let entry = entries.get_mut(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        Self::apply_weight(name, entry.algorithm.as_ref(), weight)?;
        entry.weight = weight;
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        match self.write().remove(name) {
            Some(_) => {
                info!("AlgorithmRegistry: unregistered {}", name);
                Ok(())
            }
            None => Err(RegistryError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
