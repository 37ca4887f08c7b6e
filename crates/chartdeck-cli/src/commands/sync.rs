//! Kubeconfig sync entry commands

use chartdeck_core::{FileSyncStore, SyncEntryStore};
use std::path::{Path, PathBuf};

use crate::display;
use crate::error::Result;

fn open_store(preferences: Option<&Path>) -> Result<FileSyncStore> {
    Ok(match preferences {
        Some(path) => FileSyncStore::open_at(path)?,
        None => FileSyncStore::open()?,
    })
}

/// Add paths to the watched kubeconfig entries
pub fn add(preferences: Option<&Path>, paths: &[PathBuf]) -> Result<()> {
    let mut store = open_store(preferences)?;

    let paths: Vec<PathBuf> = paths
        .iter()
        .map(std::path::absolute)
        .collect::<std::io::Result<_>>()?;
    let added = store.add_sync_entries(&paths)?;

    for path in &paths {
        if added.contains(path) {
            display::success(&format!("Watching {}", path.display()));
        } else {
            println!("Already watching {}", path.display());
        }
    }
    Ok(())
}

/// Print the watched paths
pub fn list(preferences: Option<&Path>) -> Result<()> {
    let store = open_store(preferences)?;

    if store.sync_entries().is_empty() {
        println!("No kubeconfig sync entries.");
        return Ok(());
    }
    for path in store.sync_entries().keys() {
        println!("{}", path);
    }
    Ok(())
}
