//! chartdeck core - shared types for the chart catalog and release layers
//!
//! This crate provides the foundational pieces used throughout chartdeck:
//! - `Values`: chart and release values documents
//! - `version`: loose semantic-version coercion and descending ordering
//! - `sync`: kubeconfig sync entries kept in the user preferences file

pub mod error;
pub mod sync;
pub mod values;
pub mod version;

pub use error::{CoreError, Result};
pub use sync::{FileSyncStore, SyncEntrySettings, SyncEntryStore, SyncPreferences};
pub use values::Values;
pub use version::{NormalizedVersion, compare_descending, normalize, sorted_descending};
