//! Integration tests for CLI commands

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, Header};
use tempfile::TempDir;

const INDEX: &str = r#"
apiVersion: v1
entries:
  nginx:
    - name: nginx
      version: 1.2.0
      description: NGINX web server
      urls: [nginx-1.2.0.tgz]
    - name: nginx
      version: 1.10.0
      appVersion: 1.25.0
      description: NGINX web server
      urls: [nginx-1.10.0.tgz]
  redis:
    - name: redis
      version: 2.0.0
      deprecated: true
    - name: redis
      version: 1.0.0
"#;

/// Temp workspace with a file repository and isolated Helm paths
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let charts = dir.path().join("charts");
        std::fs::create_dir_all(&charts).unwrap();
        std::fs::write(charts.join("index.yaml"), INDEX).unwrap();
        write_chart(
            &charts,
            "nginx",
            "1.10.0",
            &[
                ("README.md", "# NGINX chart\n"),
                ("values.yaml", "replicaCount: 2\n"),
            ],
        );
        Self { dir }
    }

    fn charts(&self) -> PathBuf {
        self.dir.path().join("charts")
    }

    fn chartdeck(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_chartdeck"))
            .args(args)
            .env("HELM_REPOSITORY_CONFIG", self.dir.path().join("repositories.yaml"))
            .env("HELM_REPOSITORY_CACHE", self.dir.path().join("cache"))
            .env("CHARTDECK_PREFERENCES", self.dir.path().join("preferences.yaml"))
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute chartdeck")
    }

    fn add_local_repo(&self) {
        let charts = self.charts();
        let output = self.chartdeck(&["repo", "add", "local", charts.to_str().unwrap()]);
        assert!(output.status.success(), "repo add failed: {:?}", output);
    }
}

fn write_chart(dir: &Path, name: &str, version: &str, files: &[(&str, &str)]) {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (file, content) in files {
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", name, file), content.as_bytes())
            .unwrap();
    }
    let bytes = builder.into_inner().unwrap().finish().unwrap();
    std::fs::write(dir.join(format!("{}-{}.tgz", name, version)), bytes).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

mod repo_command {
    use super::*;

    #[test]
    fn test_add_list_remove() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["repo", "list"]);
        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("local"));
        assert!(out.contains("file"));

        let output = ws.chartdeck(&["repo", "remove", "local"]);
        assert!(output.status.success());

        let output = ws.chartdeck(&["repo", "list"]);
        assert!(stdout(&output).contains("No repositories configured"));
    }

    #[test]
    fn test_duplicate_add_is_usage_error() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let charts = ws.charts();
        let output = ws.chartdeck(&["repo", "add", "local", charts.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_invalid_url_is_usage_error() {
        let ws = Workspace::new();
        let output = ws.chartdeck(&["repo", "add", "bad", "ftp://example.com"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_name_outside_cache_dir_is_usage_error() {
        let ws = Workspace::new();
        let charts = ws.charts();
        let output = ws.chartdeck(&["repo", "add", "../escaped", charts.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(64));
        assert!(!ws.dir.path().join("repositories.yaml").exists());
    }

    #[test]
    fn test_update_caches_index() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["repo", "update"]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Update Complete"));
        assert!(ws.dir.path().join("cache").join("local-index.yaml").exists());
    }
}

mod search_command {
    use super::*;

    #[test]
    fn test_search_json_hides_deprecated() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["search", "--json"]);
        assert!(output.status.success());

        let json: serde_json::Value =
            serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
        let results = json.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "local/nginx");
        assert_eq!(results[0]["version"], "1.10.0");
    }

    #[test]
    fn test_search_unknown_repo() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["search", "--repo", "nope"]);
        assert_eq!(output.status.code(), Some(3));
    }
}

mod show_command {
    use super::*;

    #[test]
    fn test_show_chart_json() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["show", "chart", "local/nginx", "--json"]);
        assert!(output.status.success(), "{:?}", output);

        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["readme"], "# NGINX chart\n");
        assert_eq!(json["versions"][0]["version"], "1.10.0");
        assert_eq!(json["versions"][1]["version"], "1.2.0");
    }

    #[test]
    fn test_show_values_and_readme() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["show", "values", "local/nginx"]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("replicaCount: 2"));

        let output = ws.chartdeck(&["show", "readme", "local/nginx", "--version", "1.10.0"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output), "# NGINX chart\n");
    }

    #[test]
    fn test_show_missing_version() {
        let ws = Workspace::new();
        ws.add_local_repo();

        let output = ws.chartdeck(&["show", "chart", "local/nginx", "--version", "9.9.9"]);
        assert_eq!(output.status.code(), Some(3));

        let output = ws.chartdeck(&["show", "chart", "nginx"]);
        assert_eq!(output.status.code(), Some(64));
    }
}

mod sync_command {
    use super::*;

    #[test]
    fn test_sync_add_and_list() {
        let ws = Workspace::new();
        let kube = ws.dir.path().join("kube");

        let output = ws.chartdeck(&["sync", "add", kube.to_str().unwrap()]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Watching"));

        let output = ws.chartdeck(&["sync", "add", kube.to_str().unwrap()]);
        assert!(stdout(&output).contains("Already watching"));

        let output = ws.chartdeck(&["sync", "list"]);
        assert!(stdout(&output).contains(kube.to_str().unwrap()));
    }
}
