//! Kubeconfig sync entries
//!
//! The surrounding application watches a set of filesystem paths for kubeconfig
//! files. Entries are keyed by path and carry a settings map that this crate
//! treats as opaque.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Per-path settings, owned by the application
pub type SyncEntrySettings = serde_json::Map<String, serde_json::Value>;

/// Something that records kubeconfig sync entries
pub trait SyncEntryStore {
    /// Set the entries for `paths` to empty settings
    ///
    /// Paths that are already present have their settings reset. Returns the
    /// paths that were not present before, in input order.
    fn add_sync_entries(&mut self, paths: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// All recorded entries
    fn sync_entries(&self) -> &IndexMap<String, SyncEntrySettings>;
}

/// Preferences document holding the sync entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPreferences {
    #[serde(default)]
    pub sync_kubeconfig_entries: IndexMap<String, SyncEntrySettings>,
}

impl SyncPreferences {
    fn add(&mut self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut added = Vec::new();
        for path in paths {
            let key = path.to_string_lossy().to_string();
            let previous = self
                .sync_kubeconfig_entries
                .insert(key, SyncEntrySettings::new());
            if previous.is_none() {
                added.push(path.clone());
            }
        }
        added
    }
}

/// YAML-file backed sync entry store
#[derive(Debug)]
pub struct FileSyncStore {
    path: PathBuf,
    preferences: SyncPreferences,
}

impl FileSyncStore {
    /// Open the store at the default location
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_path()?)
    }

    /// Open the store at a specific path, starting empty if the file is absent
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let preferences = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                SyncPreferences::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        } else {
            SyncPreferences::default()
        };

        Ok(Self { path, preferences })
    }

    /// Default preferences path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartdeck").join("preferences.yaml"))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(&self.preferences)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SyncEntryStore for FileSyncStore {
    fn add_sync_entries(&mut self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let added = self.preferences.add(paths);
        self.save()?;
        tracing::debug!(
            count = paths.len(),
            new = added.len(),
            "set kubeconfig sync entries"
        );
        Ok(added)
    }

    fn sync_entries(&self) -> &IndexMap<String, SyncEntrySettings> {
        &self.preferences.sync_kubeconfig_entries
    }
}
