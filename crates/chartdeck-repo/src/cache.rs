//! Local repository index cache
//!
//! Mirrors Helm's on-disk layout: the repository list lives in
//! `repositories.yaml` and every repository's index is cached as
//! `<cache dir>/<name>-index.yaml`. Indexes that are missing or unreadable are
//! fetched through an [`IndexSource`] during initialization.
//!
//! Initialization happens once per cache instance, no matter how many tasks
//! ask for it concurrently. Index files are written to a temp file in the cache
//! directory and renamed into place, so other processes sharing the directory
//! never read a partial index.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::catalog::ChartCatalog;
use crate::config::{Repository, RepositoryConfig};
use crate::content::ChartContentSource;
use crate::error::{RepoError, Result};
use crate::index::RepositoryIndex;
use crate::source::IndexSource;

/// Environment variable overriding the repository config path
pub const REPOSITORY_CONFIG_ENV: &str = "HELM_REPOSITORY_CONFIG";

/// Environment variable overriding the repository cache directory
pub const REPOSITORY_CACHE_ENV: &str = "HELM_REPOSITORY_CACHE";

/// Where the repository list and cached indexes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Path of `repositories.yaml`
    pub repository_config: PathBuf,
    /// Directory holding `<name>-index.yaml` files and cached archives
    pub repository_cache: PathBuf,
}

impl CacheSettings {
    pub fn new(repository_config: impl Into<PathBuf>, repository_cache: impl Into<PathBuf>) -> Self {
        Self {
            repository_config: repository_config.into(),
            repository_cache: repository_cache.into(),
        }
    }

    /// Resolve settings from the Helm environment variables, falling back to
    /// the platform config and cache directories
    pub fn from_env() -> Result<Self> {
        let repository_config = match std::env::var_os(REPOSITORY_CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => dirs::config_dir()
                .ok_or_else(|| RepoError::InvalidConfig {
                    message: "Could not determine config directory".to_string(),
                })?
                .join("helm")
                .join("repositories.yaml"),
        };

        let repository_cache = match std::env::var_os(REPOSITORY_CACHE_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => dirs::cache_dir()
                .ok_or_else(|| RepoError::InvalidConfig {
                    message: "Could not determine cache directory".to_string(),
                })?
                .join("helm")
                .join("repository"),
        };

        Ok(Self {
            repository_config,
            repository_cache,
        })
    }

    /// Cached index location for a repository
    pub fn index_path(&self, name: &str) -> PathBuf {
        self.repository_cache.join(format!("{}-index.yaml", name))
    }
}

/// Cache of repository indexes, initialized lazily and at most once
pub struct RepositoryIndexCache {
    settings: CacheSettings,
    source: Arc<dyn IndexSource>,
    init_lock: Mutex<()>,
    snapshot: RwLock<Option<Arc<Vec<Repository>>>>,
}

impl RepositoryIndexCache {
    pub fn new(settings: CacheSettings, source: Arc<dyn IndexSource>) -> Self {
        Self {
            settings,
            source,
            init_lock: Mutex::new(()),
            snapshot: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Whether `initialize` has completed
    pub async fn is_initialized(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    /// Load the repository list and make sure every index is cached
    ///
    /// Idempotent. Concurrent callers wait for the first one and then return.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized().await {
            return Ok(());
        }

        let _guard = self.init_lock.lock().await;
        if self.is_initialized().await {
            return Ok(());
        }

        let repositories = self.sync(false).await?;
        *self.snapshot.write().await = Some(Arc::new(repositories));
        Ok(())
    }

    /// Re-fetch every index and reload the repository list
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        let repositories = self.sync(true).await?;
        *self.snapshot.write().await = Some(Arc::new(repositories));
        Ok(())
    }

    /// Known repositories, in config order
    pub async fn list_repositories(&self) -> Result<Arc<Vec<Repository>>> {
        self.snapshot
            .read()
            .await
            .clone()
            .ok_or(RepoError::NotInitialized)
    }

    /// Look up one repository by name
    pub async fn get_repository(&self, name: &str) -> Result<Repository> {
        let repositories = self.list_repositories().await?;
        repositories
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    /// Read the cached index of one repository
    pub async fn load_index(&self, name: &str) -> Result<RepositoryIndex> {
        let repo = self.get_repository(name).await?;
        read_index(&repo.cache_location)
    }

    /// Build a catalog view over the cached index of one repository
    pub async fn catalog(
        &self,
        name: &str,
        content: Arc<dyn ChartContentSource>,
    ) -> Result<ChartCatalog> {
        let repo = self.get_repository(name).await?;
        let index = read_index(&repo.cache_location)?;
        Ok(ChartCatalog::new(repo, index, content))
    }

    /// Load the config and fetch indexes that are missing, unreadable, or all
    /// of them when `force` is set
    ///
    /// A repository whose index cannot be fetched stays in the list. A corrupt
    /// cached index that could not be replaced is removed.
    async fn sync(&self, force: bool) -> Result<Vec<Repository>> {
        std::fs::create_dir_all(&self.settings.repository_cache)?;
        let config = RepositoryConfig::load_or_default(&self.settings.repository_config)?;

        let mut repositories = Vec::with_capacity(config.repositories.len());
        for mut repo in config.repositories {
            let path = self.settings.index_path(&repo.name);

            let (needs_fetch, unreadable) = match read_index(&path) {
                Ok(_) => (force, false),
                Err(RepoError::IndexNotFound { .. }) => (true, false),
                Err(e) => {
                    tracing::warn!(repo = %repo.name, "cached index is unreadable, fetching again: {}", e);
                    (true, true)
                }
            };

            if needs_fetch {
                if let Err(e) = self.fetch_and_store(&repo, &path).await {
                    tracing::warn!(repo = %repo.name, "failed to fetch index: {}", e);
                    // A readable stale index is still useful, a corrupt one is not
                    if unreadable {
                        if let Err(e) = std::fs::remove_file(&path) {
                            tracing::warn!(repo = %repo.name, "failed to remove corrupt index: {}", e);
                        }
                    }
                }
            }

            repo.cache_location = path;
            repositories.push(repo);
        }

        Ok(repositories)
    }

    async fn fetch_and_store(&self, repo: &Repository, path: &Path) -> Result<()> {
        let bytes = self.source.fetch_index(repo).await?;
        let index = RepositoryIndex::from_bytes(&bytes)?;
        write_atomically(path, &bytes)?;

        tracing::info!(
            repo = %repo.name,
            charts = index.entries.len(),
            path = %path.display(),
            "cached repository index"
        );
        Ok(())
    }
}

fn read_index(path: &Path) -> Result<RepositoryIndex> {
    if !path.exists() {
        return Err(RepoError::IndexNotFound {
            url: path.display().to_string(),
        });
    }
    let bytes = std::fs::read(path)?;
    RepositoryIndex::from_bytes(&bytes)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| RepoError::InvalidConfig {
        message: format!("Cache path has no parent directory: {}", path.display()),
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
