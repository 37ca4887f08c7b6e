//! CLI commands

pub mod repo;
pub mod search;
pub mod show;
pub mod sync;

use std::sync::Arc;

use chartdeck_repo::{
    ArchiveContentSource, CacheSettings, ChartContentSource, FileIndexSource,
    RepositoryIndexCache,
};

/// Index cache and content source for a set of settings
///
/// Only `file` repositories can be fetched; remote indexes must already be
/// in the cache directory.
pub fn open_cache(settings: CacheSettings) -> (RepositoryIndexCache, Arc<dyn ChartContentSource>) {
    let content: Arc<dyn ChartContentSource> =
        Arc::new(ArchiveContentSource::new(&settings.repository_cache));
    let cache = RepositoryIndexCache::new(settings, Arc::new(FileIndexSource));
    (cache, content)
}
