//! Registry — the persisted ID -> relative path table (`.github/ids.json`)

use crate::error::{IdsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::io;
use std::path::Path;

/// ID -> path mapping. Keys are kept sorted so the saved file diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or overwrite an entry, returning the previous path if any
    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.entries.insert(id.into(), path.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl FromIterator<(String, String)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Load the registry from `path`, creating its parent directory if needed.
/// A missing file yields an empty registry and a warning.
pub fn load_registry(path: &Path) -> Result<Registry> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| IdsError::io(parent, e))?;
        }
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("[IDS] {} not found. Creating new ID file...", path.display());
            return Ok(Registry::new());
        }
        Err(e) => return Err(IdsError::io(path, e)),
    };

    let registry: Registry = serde_json::from_str(&raw).map_err(|e| IdsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!("[IDS] Loaded {} IDs from {}", registry.len(), path.display());
    Ok(registry)
}

/// Overwrite `path` with the full registry as indented JSON
pub fn save_registry(path: &Path, registry: &Registry) -> Result<()> {
    let mut json = serde_json::to_string_pretty(registry).map_err(|e| IdsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    json.push('\n');

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| IdsError::io(parent, e))?;
        }
    }
    fs::write(path, json).map_err(|e| IdsError::io(path, e))
}
