//! Repository configuration management
//!
//! Reads and writes Helm's `repositories.yaml`, so the repositories a user
//! added with `helm repo add` show up here unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// Repository configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Generation timestamp, kept as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,

    /// Configured repositories
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            generated: None,
            repositories: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Load configuration from a path, or an empty configuration if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.repositories.retain(|repo| match validate_repository_name(&repo.name) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping repository: {}", e);
                false
            }
        });
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a repository by name
    pub fn get(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Add a repository
    pub fn add(&mut self, repo: Repository) -> Result<()> {
        if self.get(&repo.name).is_some() {
            return Err(RepoError::RepositoryAlreadyExists {
                name: repo.name.clone(),
            });
        }
        self.repositories.push(repo);
        Ok(())
    }

    /// Remove a repository by name
    pub fn remove(&mut self, name: &str) -> Result<Repository> {
        let idx = self
            .repositories
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })?;
        Ok(self.repositories.remove(idx))
    }

    /// List all repository names
    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Repository definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique name for this repository
    pub name: String,

    /// Repository URL (HTTP(S), OCI or file)
    pub url: String,

    #[serde(rename = "caFile", default)]
    pub ca_file: String,

    #[serde(rename = "certFile", default)]
    pub cert_file: String,

    #[serde(rename = "keyFile", default)]
    pub key_file: String,

    #[serde(default)]
    pub insecure_skip_tls_verify: bool,

    #[serde(default)]
    pub pass_credentials_all: bool,

    /// Where the cached index for this repository lives, set by the index cache
    #[serde(skip)]
    pub cache_location: PathBuf,

    /// Fields this crate does not interpret (credentials, future keys)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Repository {
    /// Create a new repository from URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        validate_repository_name(&name)?;
        RepositoryType::detect(&url)?;

        Ok(Self {
            name,
            url,
            ca_file: String::new(),
            cert_file: String::new(),
            key_file: String::new(),
            insecure_skip_tls_verify: false,
            pass_credentials_all: false,
            cache_location: PathBuf::new(),
            extra: BTreeMap::new(),
        })
    }

    /// Repository type, detected from the URL scheme
    pub fn repo_type(&self) -> Result<RepositoryType> {
        RepositoryType::detect(&self.url)
    }

    /// Root directory of a file repository
    pub fn file_root(&self) -> Option<PathBuf> {
        match self.repo_type() {
            Ok(RepositoryType::File) => Some(PathBuf::from(
                self.url.strip_prefix("file://").unwrap_or(&self.url),
            )),
            _ => None,
        }
    }
}

/// Names become cache file names, so they must stay inside the cache directory
pub fn validate_repository_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains(['/', '\\']) {
        "must not contain path separators"
    } else if name.contains("..") {
        "must not contain '..'"
    } else {
        return Ok(());
    };

    Err(RepoError::InvalidRepositoryName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Repository type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Traditional HTTP repository with index.yaml
    #[default]
    Http,

    /// OCI-compliant registry
    Oci,

    /// Local filesystem
    File,
}

impl RepositoryType {
    /// Auto-detect repository type from URL
    pub fn detect(url: &str) -> Result<Self> {
        if url.starts_with("oci://") {
            Ok(RepositoryType::Oci)
        } else if url.starts_with("file://") || url.starts_with('/') {
            Ok(RepositoryType::File)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(RepositoryType::Http)
        } else {
            Err(RepoError::InvalidRepositoryUrl {
                url: url.to_string(),
                reason: "URL must start with http://, https://, oci://, file://, or /".to_string(),
            })
        }
    }
}

impl std::fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Oci => write!(f, "oci"),
            Self::File => write!(f, "file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELM_REPOSITORIES: &str = r#"
apiVersion: ""
generated: "0001-01-01T00:00:00Z"
repositories:
- caFile: ""
  certFile: ""
  insecure_skip_tls_verify: false
  keyFile: ""
  name: bitnami
  pass_credentials_all: false
  password: ""
  url: https://charts.bitnami.com/bitnami
  username: ""
- name: local
  url: file:///srv/charts
"#;

    #[test]
    fn test_repository_type_detection() {
        assert_eq!(
            RepositoryType::detect("https://charts.bitnami.com/bitnami").unwrap(),
            RepositoryType::Http
        );
        assert_eq!(
            RepositoryType::detect("oci://ghcr.io/myorg/charts").unwrap(),
            RepositoryType::Oci
        );
        assert_eq!(
            RepositoryType::detect("file:///path/to/repo").unwrap(),
            RepositoryType::File
        );
        assert_eq!(
            RepositoryType::detect("/absolute/path").unwrap(),
            RepositoryType::File
        );

        assert!(RepositoryType::detect("invalid").is_err());
    }

    #[test]
    fn test_repository_new() {
        let repo = Repository::new("bitnami", "https://charts.bitnami.com/bitnami/").unwrap();
        assert_eq!(repo.name, "bitnami");
        assert_eq!(repo.repo_type().unwrap(), RepositoryType::Http);
        assert!(repo.file_root().is_none());
    }

    #[test]
    fn test_repository_names_stay_in_cache_dir() {
        for bad in ["", " ", "../escaped", "a/b", "a\\b", "..", "x..y"] {
            assert!(
                matches!(
                    Repository::new(bad, "https://example.com"),
                    Err(RepoError::InvalidRepositoryName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
        assert!(Repository::new("my-repo.v2", "https://example.com").is_ok());
    }

    #[test]
    fn test_load_skips_unsafe_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("repositories.yaml");
        std::fs::write(
            &path,
            "repositories:\n- name: ../escaped\n  url: https://example.com\n- name: good\n  url: https://example.com\n",
        )
        .unwrap();

        let config = RepositoryConfig::load_from(&path).unwrap();
        assert_eq!(config.names(), vec!["good"]);
    }

    #[test]
    fn test_file_root() {
        let repo = Repository::new("local", "file:///srv/charts").unwrap();
        assert_eq!(repo.file_root(), Some(PathBuf::from("/srv/charts")));

        let repo = Repository::new("local", "/srv/charts").unwrap();
        assert_eq!(repo.file_root(), Some(PathBuf::from("/srv/charts")));
    }

    #[test]
    fn test_parse_helm_repositories_file() {
        let config: RepositoryConfig = serde_yaml::from_str(HELM_REPOSITORIES).unwrap();
        assert_eq!(config.names(), vec!["bitnami", "local"]);

        let bitnami = config.get("bitnami").unwrap();
        assert!(!bitnami.insecure_skip_tls_verify);
        // Credentials are carried but not interpreted
        assert!(bitnami.extra.contains_key("username"));
        assert!(bitnami.extra.contains_key("password"));
    }

    #[test]
    fn test_config_add_remove() {
        let mut config = RepositoryConfig::default();

        let repo = Repository::new("test", "https://example.com").unwrap();
        config.add(repo).unwrap();

        assert!(config.get("test").is_some());
        assert!(matches!(
            config.add(Repository::new("test", "https://other.com").unwrap()),
            Err(RepoError::RepositoryAlreadyExists { .. })
        ));

        let removed = config.remove("test").unwrap();
        assert_eq!(removed.name, "test");
        assert!(config.get("test").is_none());
        assert!(matches!(
            config.remove("test"),
            Err(RepoError::RepositoryNotFound { .. })
        ));
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("helm").join("repositories.yaml");

        let mut config: RepositoryConfig = serde_yaml::from_str(HELM_REPOSITORIES).unwrap();
        config
            .add(Repository::new("jetstack", "https://charts.jetstack.io").unwrap())
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = RepositoryConfig::load_from(&path).unwrap();
        assert_eq!(loaded.names(), vec!["bitnami", "local", "jetstack"]);
        assert!(loaded.get("bitnami").unwrap().extra.contains_key("username"));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RepositoryConfig::load_or_default(&dir.path().join("nope.yaml")).unwrap();
        assert!(config.repositories.is_empty());
    }
}
