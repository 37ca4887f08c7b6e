//! Chartdeck repository management
//!
//! This crate keeps a local view of Helm chart repositories:
//!
//! - **Repository config**: Helm's `repositories.yaml`, read and written as-is
//! - **Index cache**: one `<name>-index.yaml` per repository, fetched once
//!   through a pluggable [`IndexSource`]
//! - **Catalog**: charts grouped by name, newest version first, with charts
//!   whose newest version is deprecated left out of listings
//! - **Chart content**: readme and default values read from chart archives
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chartdeck_repo::{
//!     ArchiveContentSource, CacheSettings, FileIndexSource, RepositoryIndexCache, list_catalog,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = CacheSettings::from_env()?;
//! let content = Arc::new(ArchiveContentSource::new(&settings.repository_cache));
//! let cache = RepositoryIndexCache::new(settings, Arc::new(FileIndexSource));
//!
//! for (repo, charts) in list_catalog(&cache, content.clone()).await? {
//!     println!("{}: {} charts", repo, charts.len());
//! }
//!
//! let detail = cache.catalog("stable", content).await?.get_chart("nginx", "").await?;
//! println!("{}", detail.readme);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod index;
pub mod source;

// Re-exports for convenience
pub use cache::{CacheSettings, RepositoryIndexCache};
pub use catalog::{
    Catalog, ChartCatalog, ChartDetail, ChartGroups, exclude_deprecated_groups, list_catalog,
    sort_groups_by_version,
};
pub use config::{Repository, RepositoryConfig, RepositoryType, validate_repository_name};
pub use content::{ArchiveContentSource, ChartContentSource};
pub use error::{RepoError, Result};
pub use index::{ChartVersion, IndexDependency, Maintainer, RepositoryIndex};
pub use source::{ChainedSource, FileIndexSource, IndexSource};
