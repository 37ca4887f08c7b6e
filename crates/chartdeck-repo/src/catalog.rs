//! Chart catalog
//!
//! A read-only view over one repository's index. Listings group versions by
//! chart, newest first, and hide charts whose newest version is deprecated.
//! Those charts can still be fetched by name.

use chartdeck_core::{Values, sorted_descending};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::cache::RepositoryIndexCache;
use crate::config::Repository;
use crate::content::ChartContentSource;
use crate::error::{RepoError, Result};
use crate::index::{ChartVersion, RepositoryIndex};

/// Chart name to versions, for one repository
pub type ChartGroups = IndexMap<String, Vec<ChartVersion>>;

/// Repository name to its chart groups
pub type Catalog = IndexMap<String, ChartGroups>;

/// A chart's versions together with the readme of the selected version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDetail {
    pub readme: String,
    pub versions: Vec<ChartVersion>,
}

/// Sort every group by descending version
pub fn sort_groups_by_version(groups: &ChartGroups) -> ChartGroups {
    groups
        .iter()
        .map(|(name, versions)| {
            (
                name.clone(),
                sorted_descending(versions, |v| v.version.as_str()),
            )
        })
        .collect()
}

/// Drop groups that are empty or whose first entry is deprecated
///
/// Only the first entry is checked, so groups must already be sorted.
pub fn exclude_deprecated_groups(groups: &ChartGroups) -> ChartGroups {
    groups
        .iter()
        .filter(|(_, versions)| versions.first().is_some_and(|top| !top.deprecated))
        .map(|(name, versions)| (name.clone(), versions.clone()))
        .collect()
}

/// Catalog view of a single repository
pub struct ChartCatalog {
    repository: Repository,
    index: RepositoryIndex,
    content: Arc<dyn ChartContentSource>,
}

impl ChartCatalog {
    pub fn new(
        repository: Repository,
        index: RepositoryIndex,
        content: Arc<dyn ChartContentSource>,
    ) -> Self {
        Self {
            repository,
            index,
            content,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Installable charts, each with versions newest first
    pub fn list_chart_groups(&self) -> ChartGroups {
        exclude_deprecated_groups(&sort_groups_by_version(&self.index.entries))
    }

    /// All versions of `chart` plus the readme of `version`
    ///
    /// An empty `version` selects the newest one. Deprecated charts are
    /// returned like any other.
    pub async fn get_chart(&self, chart: &str, version: &str) -> Result<ChartDetail> {
        let versions = self.sorted_versions(chart)?;
        let selected = self.select(chart, &versions, version)?;
        let readme = self
            .content
            .readme(&self.repository, selected)
            .await?
            .unwrap_or_default();

        Ok(ChartDetail {
            readme,
            versions,
        })
    }

    /// Readme of one chart version, empty if the chart has none
    pub async fn get_readme(&self, chart: &str, version: &str) -> Result<String> {
        let versions = self.sorted_versions(chart)?;
        let selected = self.select(chart, &versions, version)?;
        Ok(self
            .content
            .readme(&self.repository, selected)
            .await?
            .unwrap_or_default())
    }

    /// Default values of one chart version, empty if the chart has none
    pub async fn get_values(&self, chart: &str, version: &str) -> Result<Values> {
        let versions = self.sorted_versions(chart)?;
        let selected = self.select(chart, &versions, version)?;
        match self.content.values(&self.repository, selected).await? {
            Some(raw) => Ok(Values::from_yaml(&raw)?),
            None => Ok(Values::new()),
        }
    }

    fn sorted_versions(&self, chart: &str) -> Result<Vec<ChartVersion>> {
        match self.index.get(chart) {
            Some(versions) if !versions.is_empty() => {
                Ok(sorted_descending(versions, |v| v.version.as_str()))
            }
            _ => Err(RepoError::ChartNotFound {
                name: chart.to_string(),
                repo: self.repository.name.clone(),
            }),
        }
    }

    fn select<'a>(
        &self,
        chart: &str,
        versions: &'a [ChartVersion],
        version: &str,
    ) -> Result<&'a ChartVersion> {
        let found = if version.is_empty() {
            versions.first()
        } else {
            versions.iter().find(|v| v.version == version)
        };

        found.ok_or_else(|| RepoError::VersionNotFound {
            name: chart.to_string(),
            version: version.to_string(),
            repo: self.repository.name.clone(),
        })
    }
}

/// Listing of every configured repository, in config order
///
/// Initializes the cache first. Repositories without a cached index are
/// skipped.
pub async fn list_catalog(
    cache: &RepositoryIndexCache,
    content: Arc<dyn ChartContentSource>,
) -> Result<Catalog> {
    cache.initialize().await?;

    let repositories = cache.list_repositories().await?;
    let views = futures::future::join_all(
        repositories
            .iter()
            .map(|repo| cache.catalog(&repo.name, content.clone())),
    )
    .await;

    let mut catalog = Catalog::new();
    for (repo, view) in repositories.iter().zip(views) {
        match view {
            Ok(view) => {
                catalog.insert(repo.name.clone(), view.list_chart_groups());
            }
            Err(RepoError::IndexNotFound { .. }) => {
                tracing::warn!(repo = %repo.name, "no cached index, skipping");
            }
            Err(e @ RepoError::IndexParseError { .. }) => {
                tracing::warn!(repo = %repo.name, "unreadable cached index, skipping: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(catalog)
}
