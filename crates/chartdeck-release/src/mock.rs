//! In-memory packaging engine
//!
//! Keeps releases in memory with Helm's revision semantics, so release
//! operations can be exercised without a cluster or the Helm binary. Each
//! kubeconfig path stands for its own cluster.

use async_trait::async_trait;
use chartdeck_core::Values;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{EngineResult, InstallRequest, PackagingEngine, UpgradeRequest};
use crate::error::EngineError;
use crate::release::{
    DeleteOutcome, InstallOutcome, ReleaseDetail, ReleaseRevision, ReleaseStatus, ReleaseSummary,
    UpgradeOutcome,
};

/// (kubeconfig, namespace, name)
type ReleaseKey = (PathBuf, String, String);

/// One stored revision of a release
#[derive(Debug, Clone)]
struct StoredRevision {
    revision: u32,
    updated: DateTime<Utc>,
    status: ReleaseStatus,
    chart_ref: String,
    chart_version: Option<String>,
    values: Values,
    description: String,
}

impl StoredRevision {
    /// `<chart>-<version>`, or just the chart name when no version was pinned
    fn chart(&self) -> String {
        let name = self.chart_ref.rsplit('/').next().unwrap_or(&self.chart_ref);
        match &self.chart_version {
            Some(version) => format!("{}-{}", name, version),
            None => name.to_string(),
        }
    }

    fn to_revision(&self) -> ReleaseRevision {
        ReleaseRevision {
            revision: self.revision,
            updated: self.updated,
            status: self.status,
            chart: self.chart(),
            app_version: String::new(),
            description: self.description.clone(),
        }
    }
}

/// Counts of engine calls, for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub installs: usize,
    pub lists: usize,
    pub gets: usize,
    pub upgrades: usize,
    pub deletes: usize,
    pub rollbacks: usize,
}

impl OperationCounts {
    pub fn total(&self) -> usize {
        self.installs + self.lists + self.gets + self.upgrades + self.deletes + self.rollbacks
    }
}

/// Packaging engine that keeps releases in memory
#[derive(Clone, Default)]
pub struct InMemoryEngine {
    /// Revisions per release, oldest first
    releases: Arc<RwLock<HashMap<ReleaseKey, Vec<StoredRevision>>>>,
    operations: Arc<RwLock<OperationCounts>>,
    last_kubeconfig: Arc<RwLock<Option<PathBuf>>>,
    fail_next: Arc<RwLock<Option<String>>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get operation counts for assertions
    pub async fn operation_counts(&self) -> OperationCounts {
        self.operations.read().await.clone()
    }

    /// Kubeconfig passed to the most recent call
    pub async fn last_kubeconfig(&self) -> Option<PathBuf> {
        self.last_kubeconfig.read().await.clone()
    }

    /// Make the next call fail with `message`
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.write().await = Some(message.into());
    }

    /// Number of releases currently installed, across all clusters
    pub async fn release_count(&self) -> usize {
        self.releases.read().await.len()
    }

    async fn record(
        &self,
        kubeconfig: &Path,
        count: impl FnOnce(&mut OperationCounts),
    ) -> EngineResult<()> {
        count(&mut *self.operations.write().await);
        *self.last_kubeconfig.write().await = Some(kubeconfig.to_path_buf());

        match self.fail_next.write().await.take() {
            Some(message) => Err(EngineError::Failed(message)),
            None => Ok(()),
        }
    }
}

fn key(kubeconfig: &Path, name: &str, namespace: &str) -> ReleaseKey {
    (kubeconfig.to_path_buf(), namespace.to_string(), name.to_string())
}

fn not_found(name: &str, namespace: &str) -> EngineError {
    EngineError::ReleaseNotFound {
        name: name.to_string(),
        namespace: namespace.to_string(),
    }
}

/// Mark the current revision superseded and append `next`
fn push_revision(history: &mut Vec<StoredRevision>, mut next: StoredRevision) -> u32 {
    let revision = history.last().map(|r| r.revision).unwrap_or(0) + 1;
    if let Some(current) = history.last_mut() {
        current.status = ReleaseStatus::Superseded;
    }
    next.revision = revision;
    history.push(next);
    revision
}

#[async_trait]
impl PackagingEngine for InMemoryEngine {
    async fn install(
        &self,
        kubeconfig: &Path,
        request: InstallRequest,
    ) -> EngineResult<InstallOutcome> {
        self.record(kubeconfig, |ops| ops.installs += 1).await?;

        let mut releases = self.releases.write().await;
        let key = key(kubeconfig, &request.release_name, &request.namespace);
        if releases.contains_key(&key) {
            return Err(EngineError::Failed(
                "INSTALLATION FAILED: cannot re-use a name that is still in use".to_string(),
            ));
        }

        releases.insert(
            key,
            vec![StoredRevision {
                revision: 1,
                updated: Utc::now(),
                status: ReleaseStatus::Deployed,
                chart_ref: request.chart,
                chart_version: request.version,
                values: request.values,
                description: "Install complete".to_string(),
            }],
        );

        Ok(InstallOutcome {
            name: request.release_name,
            namespace: request.namespace,
            revision: 1,
            status: ReleaseStatus::Deployed,
            notes: String::new(),
        })
    }

    async fn list_releases(
        &self,
        kubeconfig: &Path,
        namespace: Option<&str>,
    ) -> EngineResult<Vec<ReleaseSummary>> {
        self.record(kubeconfig, |ops| ops.lists += 1).await?;

        let releases = self.releases.read().await;
        let mut summaries: Vec<ReleaseSummary> = releases
            .iter()
            .filter(|((cluster, ns, _), _)| {
                cluster.as_path() == kubeconfig && namespace.is_none_or(|n| n == ns.as_str())
            })
            .filter_map(|((_, ns, name), history)| {
                history.last().map(|current| ReleaseSummary {
                    name: name.clone(),
                    namespace: ns.clone(),
                    revision: current.revision,
                    updated: current.updated,
                    status: current.status,
                    chart: current.chart(),
                    app_version: String::new(),
                })
            })
            .collect();

        summaries.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        Ok(summaries)
    }

    async fn get_release(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<ReleaseDetail> {
        self.record(kubeconfig, |ops| ops.gets += 1).await?;

        let releases = self.releases.read().await;
        let current = releases
            .get(&key(kubeconfig, name, namespace))
            .and_then(|history| history.last())
            .ok_or_else(|| not_found(name, namespace))?;

        Ok(ReleaseDetail {
            name: name.to_string(),
            namespace: namespace.to_string(),
            revision: current.revision,
            updated: current.updated,
            status: current.status,
            chart: current.chart(),
            app_version: String::new(),
            values: current.values.clone(),
            manifest: String::new(),
            notes: String::new(),
            description: current.description.clone(),
        })
    }

    async fn get_values(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<Values> {
        self.record(kubeconfig, |ops| ops.gets += 1).await?;

        let releases = self.releases.read().await;
        releases
            .get(&key(kubeconfig, name, namespace))
            .and_then(|history| history.last())
            .map(|current| current.values.clone())
            .ok_or_else(|| not_found(name, namespace))
    }

    async fn get_history(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<Vec<ReleaseRevision>> {
        self.record(kubeconfig, |ops| ops.gets += 1).await?;

        let releases = self.releases.read().await;
        releases
            .get(&key(kubeconfig, name, namespace))
            .map(|history| history.iter().map(StoredRevision::to_revision).collect())
            .ok_or_else(|| not_found(name, namespace))
    }

    async fn upgrade(
        &self,
        kubeconfig: &Path,
        request: UpgradeRequest,
    ) -> EngineResult<UpgradeOutcome> {
        self.record(kubeconfig, |ops| ops.upgrades += 1).await?;

        let mut releases = self.releases.write().await;
        let history = releases
            .get_mut(&key(kubeconfig, &request.release_name, &request.namespace))
            .ok_or_else(|| not_found(&request.release_name, &request.namespace))?;

        let revision = push_revision(
            history,
            StoredRevision {
                revision: 0,
                updated: Utc::now(),
                status: ReleaseStatus::Deployed,
                chart_ref: request.chart,
                chart_version: request.version,
                values: request.values,
                description: "Upgrade complete".to_string(),
            },
        );

        Ok(UpgradeOutcome {
            name: request.release_name,
            namespace: request.namespace,
            revision,
            status: ReleaseStatus::Deployed,
            notes: String::new(),
        })
    }

    async fn delete(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<DeleteOutcome> {
        self.record(kubeconfig, |ops| ops.deletes += 1).await?;

        let mut releases = self.releases.write().await;
        releases
            .remove(&key(kubeconfig, name, namespace))
            .ok_or_else(|| not_found(name, namespace))?;

        Ok(DeleteOutcome {
            name: name.to_string(),
            message: format!("release \"{}\" uninstalled", name),
        })
    }

    async fn rollback(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
        revision: u32,
    ) -> EngineResult<String> {
        self.record(kubeconfig, |ops| ops.rollbacks += 1).await?;

        let mut releases = self.releases.write().await;
        let history = releases
            .get_mut(&key(kubeconfig, name, namespace))
            .ok_or_else(|| not_found(name, namespace))?;

        let target = history
            .iter()
            .find(|r| r.revision == revision)
            .cloned()
            .ok_or_else(|| EngineError::RevisionNotFound {
                name: name.to_string(),
                revision,
            })?;

        push_revision(
            history,
            StoredRevision {
                updated: Utc::now(),
                status: ReleaseStatus::Deployed,
                description: format!("Rollback to {}", revision),
                ..target
            },
        );

        Ok("Rollback was a success! Happy Helming!".to_string())
    }
}
