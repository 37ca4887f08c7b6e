//! Release model
//!
//! Field names and status strings follow Helm's JSON output so results can be
//! handed to a UI unchanged.

use chartdeck_core::Values;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Release status as reported by the packaging engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStatus {
    #[default]
    Unknown,
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl ReleaseStatus {
    /// Status name as Helm prints it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Deployed => "deployed",
            Self::Uninstalled => "uninstalled",
            Self::Superseded => "superseded",
            Self::Failed => "failed",
            Self::Uninstalling => "uninstalling",
            Self::PendingInstall => "pending-install",
            Self::PendingUpgrade => "pending-upgrade",
            Self::PendingRollback => "pending-rollback",
        }
    }

    /// Whether an operation is still running for this release
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::PendingInstall | Self::PendingUpgrade | Self::PendingRollback | Self::Uninstalling
        )
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a release listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub updated: DateTime<Utc>,
    pub status: ReleaseStatus,
    /// Chart reference as `<name>-<version>`
    pub chart: String,
    #[serde(default)]
    pub app_version: String,
}

/// The current revision of a release with its values and rendered output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub updated: DateTime<Utc>,
    pub status: ReleaseStatus,
    pub chart: String,
    #[serde(default)]
    pub app_version: String,
    /// User-supplied values
    #[serde(default)]
    pub values: Values,
    /// Rendered manifest
    #[serde(default)]
    pub manifest: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub description: String,
}

/// One entry of a release history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRevision {
    pub revision: u32,
    pub updated: DateTime<Utc>,
    pub status: ReleaseStatus,
    pub chart: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallOutcome {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOutcome {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub name: String,
    /// Engine output, e.g. `release "web" uninstalled`
    pub message: String,
}

/// Result of a rollback: the engine's output and nothing else
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackOutcome {
    pub message: String,
}
