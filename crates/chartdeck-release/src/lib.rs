//! Chartdeck release operations
//!
//! This crate drives the lifecycle of chart releases on a cluster:
//! - **Facade**: [`ReleaseOperations`] validates arguments, resolves the
//!   cluster's kubeconfig and maps engine failures to typed errors
//! - **Engine boundary**: [`PackagingEngine`] is implemented by whatever runs
//!   the packaging tool; the facade never touches the cluster itself
//! - **In-memory engine**: [`InMemoryEngine`] mimics Helm's revision handling
//!   for tests and embedding
//!
//! ## Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use chartdeck_core::Values;
//! use chartdeck_release::{InMemoryEngine, ReleaseOperations};
//!
//! # async fn example() -> chartdeck_release::Result<()> {
//! let ops = ReleaseOperations::new(Arc::new(InMemoryEngine::new()));
//! let cluster = PathBuf::from("/tmp/proxy-kubeconfig");
//!
//! ops.install(&cluster, "bitnami/nginx", Values::new(), "web", "default", "")
//!     .await?;
//! let history = ops.get_release_history(&cluster, "web", "default").await?;
//! assert_eq!(history.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod engine;
pub mod error;
pub mod mock;
pub mod operations;
pub mod release;

pub use cluster::ClusterConnection;
pub use engine::{EngineResult, InstallRequest, PackagingEngine, UpgradeRequest};
pub use error::{EngineError, ReleaseError, Result};
pub use mock::{InMemoryEngine, OperationCounts};
pub use operations::{MAX_RELEASE_NAME_LEN, ReleaseOperations, validate_release_name};
pub use release::{
    DeleteOutcome, InstallOutcome, ReleaseDetail, ReleaseRevision, ReleaseStatus, ReleaseSummary,
    RollbackOutcome, UpgradeOutcome,
};
