//! Chart content (readme and default values)
//!
//! Index entries only describe a chart. The readme and `values.yaml` live in
//! the chart archive, so they are read from a `.tgz` resolved from the entry's
//! URLs or from the local archive cache.

use async_trait::async_trait;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::config::Repository;
use crate::error::{RepoError, Result};
use crate::index::ChartVersion;

/// Readme file names, matched case-insensitively in this order
const README_NAMES: &[&str] = &["readme.md", "readme.txt", "readme"];

const VALUES_NAME: &str = "values.yaml";

/// Provides the documents bundled with a chart version
#[async_trait]
pub trait ChartContentSource: Send + Sync {
    /// Readme of the chart, `None` if it has none
    async fn readme(&self, repo: &Repository, entry: &ChartVersion) -> Result<Option<String>>;

    /// Raw default values document, `None` if the chart has none
    async fn values(&self, repo: &Repository, entry: &ChartVersion) -> Result<Option<String>>;
}

/// Reads chart content out of gzipped chart archives on disk
#[derive(Debug, Clone)]
pub struct ArchiveContentSource {
    chart_cache: PathBuf,
}

impl ArchiveContentSource {
    /// `chart_cache` holds downloaded archives as `<repo>/<chart>-<version>.tgz`
    pub fn new(chart_cache: impl Into<PathBuf>) -> Self {
        Self {
            chart_cache: chart_cache.into(),
        }
    }

    /// Find the archive for `entry`
    pub fn resolve_archive(&self, repo: &Repository, entry: &ChartVersion) -> Result<PathBuf> {
        let from_urls = entry
            .urls
            .iter()
            .filter_map(|url| local_archive_path(repo, url));

        let cached = self
            .chart_cache
            .join(&repo.name)
            .join(format!("{}-{}.tgz", entry.name, entry.version));

        from_urls
            .chain(std::iter::once(cached))
            .find(|path| path.is_file())
            .ok_or_else(|| RepoError::ArchiveNotFound {
                name: entry.name.clone(),
                version: entry.version.clone(),
                repo: repo.name.clone(),
            })
    }

    fn read_member(
        &self,
        repo: &Repository,
        entry: &ChartVersion,
        names: &[&str],
    ) -> Result<Option<String>> {
        let path = self.resolve_archive(repo, entry)?;
        let data = std::fs::read(&path)?;

        if let Some(expected) = entry.digest.as_deref().filter(|d| !d.trim().is_empty()) {
            let actual = sha256_digest(&data);
            if !digest_matches(expected, &actual) {
                return Err(RepoError::IntegrityCheckFailed {
                    name: format!("{}-{}", entry.name, entry.version),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        read_chart_file(&data, names)
    }
}

#[async_trait]
impl ChartContentSource for ArchiveContentSource {
    async fn readme(&self, repo: &Repository, entry: &ChartVersion) -> Result<Option<String>> {
        self.read_member(repo, entry, README_NAMES)
    }

    async fn values(&self, repo: &Repository, entry: &ChartVersion) -> Result<Option<String>> {
        self.read_member(repo, entry, &[VALUES_NAME])
    }
}

/// Map an index URL to a local path, if it points at one
fn local_archive_path(repo: &Repository, url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.starts_with('/') {
        return Some(PathBuf::from(url));
    }
    if url.contains("://") {
        return None;
    }
    repo.file_root().map(|root| root.join(url))
}

fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn digest_matches(expected: &str, actual: &str) -> bool {
    let normalize = |d: &str| {
        let d = d.trim().to_lowercase();
        d.strip_prefix("sha256:").map(str::to_string).unwrap_or(d)
    };
    normalize(expected) == normalize(actual)
}

/// Read the first top-level chart file whose name matches one of `names`
///
/// Charts are packaged as `<chart>/<file>`; only files directly under the
/// chart directory are considered. The earliest name in `names` wins.
fn read_chart_file(archive_bytes: &[u8], names: &[&str]) -> Result<Option<String>> {
    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let mut found: Option<(usize, String)> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(rank) = chart_file_rank(&path, names) else {
            continue;
        };
        if found.as_ref().is_some_and(|(best, _)| *best <= rank) {
            continue;
        }

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        found = Some((rank, String::from_utf8_lossy(&bytes).into_owned()));
        if rank == 0 {
            break;
        }
    }

    Ok(found.map(|(_, content)| content))
}

fn chart_file_rank(path: &Path, names: &[&str]) -> Option<usize> {
    let mut components = path.components();
    let _chart_dir = components.next()?;
    let file = components.next()?;
    if components.next().is_some() {
        return None;
    }

    let file = file.as_os_str().to_string_lossy().to_lowercase();
    names.iter().position(|name| *name == file)
}
