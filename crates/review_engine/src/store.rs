//! String key-value persistence for decisions and review timers.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use review_logging::review_debug;
use thiserror::Error;

use crate::persist::{write_atomically, PersistError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] PersistError),
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] ron::Error),
    /// `origin` names the file or key that failed to parse.
    #[error("failed to read {origin}: {message}")]
    Deserialize { origin: String, message: String },
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(PersistError::Io(err))
    }
}

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Applies several writes at once; `None` removes the key.
    fn merge(&mut self, entries: Vec<(String, Option<String>)>) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn merge(&mut self, entries: Vec<(String, Option<String>)>) -> Result<(), StoreError> {
        apply(&mut self.entries, entries);
        Ok(())
    }
}

/// Store kept in one RON file. Every write reads the file, applies the
/// change and replaces the file atomically. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct RonFileStore {
    path: PathBuf,
}

impl RonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        ron::from_str(&content).map_err(|err| StoreError::Deserialize {
            origin: self.path.display().to_string(),
            message: err.to_string(),
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = ron::ser::to_string_pretty(entries, ron::ser::PrettyConfig::default())?;
        write_atomically(&self.path, content.as_bytes())?;
        review_debug!("saved {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.merge(vec![(key.to_string(), Some(value))])
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.merge(vec![(key.to_string(), None)])
    }

    fn merge(&mut self, entries: Vec<(String, Option<String>)>) -> Result<(), StoreError> {
        let mut current = self.load()?;
        apply(&mut current, entries);
        self.save(&current)
    }
}

fn apply(target: &mut BTreeMap<String, String>, entries: Vec<(String, Option<String>)>) {
    for (key, value) in entries {
        match value {
            Some(value) => {
                target.insert(key, value);
            }
            None => {
                target.remove(&key);
            }
        }
    }
}
