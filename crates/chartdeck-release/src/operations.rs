//! Release operations facade
//!
//! Each call resolves the cluster's kubeconfig, checks its arguments,
//! delegates exactly once to the packaging engine and maps the outcome to a
//! [`ReleaseError`]. Nothing is cached or retried here.

use chartdeck_core::Values;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cluster::ClusterConnection;
use crate::engine::{InstallRequest, PackagingEngine, UpgradeRequest};
use crate::error::{EngineError, ReleaseError, Result};
use crate::release::{
    DeleteOutcome, InstallOutcome, ReleaseDetail, ReleaseRevision, ReleaseSummary,
    RollbackOutcome, UpgradeOutcome,
};

/// Longest release name Helm accepts
pub const MAX_RELEASE_NAME_LEN: usize = 53;

static RELEASE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("release name pattern is valid")
});

/// Install, inspect, upgrade, roll back and delete releases on a cluster
#[derive(Clone)]
pub struct ReleaseOperations {
    engine: Arc<dyn PackagingEngine>,
}

impl ReleaseOperations {
    pub fn new(engine: Arc<dyn PackagingEngine>) -> Self {
        Self { engine }
    }

    /// Install `chart` as a new release
    ///
    /// An empty `version` installs the latest chart version.
    pub async fn install<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        chart: &str,
        values: Values,
        release_name: &str,
        namespace: &str,
        version: &str,
    ) -> Result<InstallOutcome> {
        validate_release_name(release_name)?;
        validate_namespace(namespace)?;
        validate_chart(chart)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = release_name, namespace, chart, "install release");

        let request = InstallRequest {
            chart: chart.to_string(),
            version: non_blank(version),
            release_name: release_name.to_string(),
            namespace: namespace.to_string(),
            values,
        };

        self.engine
            .install(&kubeconfig, request)
            .await
            .map_err(|e| ReleaseError::InstallFailed {
                name: release_name.to_string(),
                namespace: namespace.to_string(),
                message: e.to_string(),
            })
    }

    /// Releases in `namespace`; a blank namespace lists every namespace
    pub async fn list_releases<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        namespace: Option<&str>,
    ) -> Result<Vec<ReleaseSummary>> {
        let namespace = namespace.filter(|ns| !ns.trim().is_empty());
        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(namespace = namespace.unwrap_or("<all>"), "list releases");

        Ok(self.engine.list_releases(&kubeconfig, namespace).await?)
    }

    pub async fn get_release<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<ReleaseDetail> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, "fetch release");

        self.engine
            .get_release(&kubeconfig, name, namespace)
            .await
            .map_err(|e| not_found_or_engine(e, name, namespace))
    }

    /// User-supplied values of the current revision
    pub async fn get_release_values<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<Values> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, "fetch release values");

        self.engine
            .get_values(&kubeconfig, name, namespace)
            .await
            .map_err(|e| not_found_or_engine(e, name, namespace))
    }

    /// Revisions in the order the engine reports them
    pub async fn get_release_history<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<Vec<ReleaseRevision>> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, "fetch release history");

        self.engine
            .get_history(&kubeconfig, name, namespace)
            .await
            .map_err(|e| not_found_or_engine(e, name, namespace))
    }

    /// Upgrade a release to `chart`, latest version when `version` is empty
    pub async fn update_release<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
        chart: &str,
        values: Values,
        version: &str,
    ) -> Result<UpgradeOutcome> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;
        validate_chart(chart)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, chart, "upgrade release");

        let request = UpgradeRequest {
            release_name: name.to_string(),
            namespace: namespace.to_string(),
            chart: chart.to_string(),
            version: non_blank(version),
            values,
        };

        self.engine
            .upgrade(&kubeconfig, request)
            .await
            .map_err(|e| ReleaseError::UpgradeFailed {
                name: name.to_string(),
                namespace: namespace.to_string(),
                message: e.to_string(),
            })
    }

    pub async fn delete_release<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<DeleteOutcome> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, "delete release");

        self.engine
            .delete(&kubeconfig, name, namespace)
            .await
            .map_err(|e| not_found_or_engine(e, name, namespace))
    }

    /// Roll back to `revision`; the engine decides whether it exists
    pub async fn rollback<C: ClusterConnection + ?Sized>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
        revision: u32,
    ) -> Result<RollbackOutcome> {
        validate_release_name(name)?;
        validate_namespace(namespace)?;

        let kubeconfig = kubeconfig_of(cluster);
        tracing::debug!(release = name, namespace, revision, "rollback release");

        let message = self
            .engine
            .rollback(&kubeconfig, name, namespace, revision)
            .await
            .map_err(|e| ReleaseError::RollbackFailed {
                name: name.to_string(),
                namespace: namespace.to_string(),
                revision,
                message: e.to_string(),
            })?;

        Ok(RollbackOutcome { message })
    }
}

fn kubeconfig_of<C: ClusterConnection + ?Sized>(cluster: &C) -> PathBuf {
    cluster.proxy_kubeconfig_path()
}

fn not_found_or_engine(err: EngineError, name: &str, namespace: &str) -> ReleaseError {
    if err.is_release_not_found() {
        ReleaseError::ReleaseNotFound {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    } else {
        ReleaseError::Engine(err)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Check a release name the way Helm does
pub fn validate_release_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "must not be empty".to_string()
    } else if name.len() > MAX_RELEASE_NAME_LEN {
        format!(
            "'{}' is longer than {} characters",
            name, MAX_RELEASE_NAME_LEN
        )
    } else if !RELEASE_NAME_PATTERN.is_match(name) {
        format!(
            "'{}' must consist of lower case alphanumeric characters, '-' or '.', and start and end with an alphanumeric character",
            name
        )
    } else {
        return Ok(());
    };

    Err(ReleaseError::InvalidArgument {
        field: "release name",
        reason,
    })
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.trim().is_empty() {
        return Err(ReleaseError::InvalidArgument {
            field: "namespace",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_chart(chart: &str) -> Result<()> {
    if chart.trim().is_empty() {
        return Err(ReleaseError::InvalidArgument {
            field: "chart",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_names() {
        assert!(validate_release_name("web").is_ok());
        assert!(validate_release_name("my-app.v2").is_ok());
        assert!(validate_release_name(&"a".repeat(MAX_RELEASE_NAME_LEN)).is_ok());

        for bad in ["", "Web", "-web", "web-", "my_app", "a..b"] {
            assert!(
                matches!(
                    validate_release_name(bad),
                    Err(ReleaseError::InvalidArgument { field: "release name", .. })
                ),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_release_name(&"a".repeat(MAX_RELEASE_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank("1.2.3"), Some("1.2.3".to_string()));
    }

    #[test]
    fn test_not_found_mapping() {
        let err = not_found_or_engine(
            EngineError::ReleaseNotFound {
                name: "web".into(),
                namespace: "prod".into(),
            },
            "web",
            "prod",
        );
        assert!(err.is_not_found());

        let err = not_found_or_engine(EngineError::Failed("boom".into()), "web", "prod");
        assert!(matches!(err, ReleaseError::Engine(EngineError::Failed(ref m)) if m == "boom"));
    }
}
