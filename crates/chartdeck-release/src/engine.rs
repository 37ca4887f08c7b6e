//! Packaging engine boundary
//!
//! The engine is whatever actually installs charts on a cluster, usually the
//! Helm binary. Every call gets the resolved kubeconfig path; the engine never
//! sees a live connection.

use async_trait::async_trait;
use chartdeck_core::Values;
use std::path::Path;

use crate::error::EngineError;
use crate::release::{
    DeleteOutcome, InstallOutcome, ReleaseDetail, ReleaseRevision, ReleaseSummary,
    UpgradeOutcome,
};

/// Result type for engine calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Arguments of an install
#[derive(Debug, Clone, PartialEq)]
pub struct InstallRequest {
    /// Chart reference, e.g. `bitnami/nginx`
    pub chart: String,
    /// `None` installs the latest version
    pub version: Option<String>,
    pub release_name: String,
    pub namespace: String,
    pub values: Values,
}

/// Arguments of an upgrade
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeRequest {
    pub release_name: String,
    pub namespace: String,
    pub chart: String,
    /// `None` upgrades to the latest version
    pub version: Option<String>,
    pub values: Values,
}

/// Release lifecycle operations delegated to a packaging tool
#[async_trait]
pub trait PackagingEngine: Send + Sync {
    async fn install(&self, kubeconfig: &Path, request: InstallRequest)
    -> EngineResult<InstallOutcome>;

    /// Releases in `namespace`, or in every namespace when `None`
    async fn list_releases(
        &self,
        kubeconfig: &Path,
        namespace: Option<&str>,
    ) -> EngineResult<Vec<ReleaseSummary>>;

    async fn get_release(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<ReleaseDetail>;

    /// User-supplied values of the current revision
    async fn get_values(&self, kubeconfig: &Path, name: &str, namespace: &str)
    -> EngineResult<Values>;

    async fn get_history(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
    ) -> EngineResult<Vec<ReleaseRevision>>;

    async fn upgrade(&self, kubeconfig: &Path, request: UpgradeRequest)
    -> EngineResult<UpgradeOutcome>;

    async fn delete(&self, kubeconfig: &Path, name: &str, namespace: &str)
    -> EngineResult<DeleteOutcome>;

    /// Roll back to `revision`, returning the engine's output
    async fn rollback(
        &self,
        kubeconfig: &Path,
        name: &str,
        namespace: &str,
        revision: u32,
    ) -> EngineResult<String>;
}
