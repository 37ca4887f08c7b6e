//! Cluster handle
//!
//! Release operations never talk to a cluster directly. They only need the
//! path of a kubeconfig that routes through the application's proxy, which
//! the packaging engine then uses.

use std::path::{Path, PathBuf};

/// A cluster that can hand out its proxy kubeconfig path
pub trait ClusterConnection: Send + Sync {
    /// Path of the kubeconfig the packaging engine should use
    fn proxy_kubeconfig_path(&self) -> PathBuf;
}

impl ClusterConnection for Path {
    fn proxy_kubeconfig_path(&self) -> PathBuf {
        self.to_path_buf()
    }
}

impl ClusterConnection for PathBuf {
    fn proxy_kubeconfig_path(&self) -> PathBuf {
        self.clone()
    }
}

impl<T: ClusterConnection + ?Sized> ClusterConnection for &T {
    fn proxy_kubeconfig_path(&self) -> PathBuf {
        (**self).proxy_kubeconfig_path()
    }
}
