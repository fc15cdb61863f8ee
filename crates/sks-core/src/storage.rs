//! Durable key-value storage for session state.
//!
//! Mirrors the browser's local storage contract: string keys, string values,
//! synchronous best-effort writes. `FileStorage` keeps everything in
//! `<base>/storage.json` with restricted permissions (0600).

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};

use crate::config::paths;

/// Key-value store the session is persisted into.
pub trait Storage: Send + Sync {
    /// Reads a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn remove_item(&self, key: &str) -> Result<()>;
}

type Items = BTreeMap<String, String>;

/// JSON-file backed storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default location under `SKS_HOME`.
    pub fn default_location() -> Self {
        Self::new(paths::storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all items. A missing file is empty; a corrupt file is treated as
    /// empty too so a damaged store never blocks startup.
    fn load(&self) -> Result<Items> {
        if !self.path.exists() {
            return Ok(Items::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage from {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(items) => Ok(items),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "storage file is corrupt, treating as empty"
                );
                Ok(Items::new())
            }
        }
    }

    fn save(&self, items: &Items) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(items).context("Failed to serialize storage")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<Items>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with the given items.
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let items = items
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            items: Mutex::new(items),
        }
    }

    fn items(&self) -> MutexGuard<'_, Items> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }
}
