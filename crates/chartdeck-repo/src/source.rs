//! Index sources
//!
//! Fetching an index over the network is somebody else's job; the cache only
//! needs raw index bytes for a repository. Remote-capable sources are injected
//! by the application.

use async_trait::async_trait;

use crate::config::{Repository, RepositoryType};
use crate::error::{RepoError, Result};

/// Something that can produce the `index.yaml` bytes of a repository
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetch the raw index for `repo`
    async fn fetch_index(&self, repo: &Repository) -> Result<Vec<u8>>;
}

/// Serves `file://` and absolute-path repositories from disk
#[derive(Debug, Clone, Default)]
pub struct FileIndexSource;

#[async_trait]
impl IndexSource for FileIndexSource {
    async fn fetch_index(&self, repo: &Repository) -> Result<Vec<u8>> {
        let root = repo.file_root().ok_or_else(|| RepoError::NoIndexSource {
            name: repo.name.clone(),
            repo_type: repo.repo_type().unwrap_or_default(),
        })?;

        let path = root.join("index.yaml");
        if !path.exists() {
            return Err(RepoError::IndexNotFound {
                url: path.display().to_string(),
            });
        }

        Ok(std::fs::read(&path)?)
    }
}

/// Tries each source in order, returning the first success
///
/// `NoIndexSource` from one source falls through to the next; any other error
/// is returned immediately.
pub struct ChainedSource {
    sources: Vec<Box<dyn IndexSource>>,
}

impl ChainedSource {
    pub fn new(sources: Vec<Box<dyn IndexSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl IndexSource for ChainedSource {
    async fn fetch_index(&self, repo: &Repository) -> Result<Vec<u8>> {
        for source in &self.sources {
            match source.fetch_index(repo).await {
                Err(RepoError::NoIndexSource { .. }) => continue,
                other => return other,
            }
        }

        Err(RepoError::NoIndexSource {
            name: repo.name.clone(),
            repo_type: repo.repo_type().unwrap_or_default(),
        })
    }
}
