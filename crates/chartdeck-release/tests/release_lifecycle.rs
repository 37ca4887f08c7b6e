//! Release lifecycle through the operations facade and the in-memory engine

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chartdeck_core::Values;
use chartdeck_release::{
    ClusterConnection, InMemoryEngine, ReleaseError, ReleaseOperations, ReleaseStatus,
};

/// A cluster whose proxy kubeconfig lives under a per-cluster directory
struct TestCluster {
    id: &'static str,
}

impl ClusterConnection for TestCluster {
    fn proxy_kubeconfig_path(&self) -> PathBuf {
        Path::new("/run/chartdeck/proxy").join(self.id).join("kubeconfig")
    }
}

fn setup() -> (InMemoryEngine, ReleaseOperations, TestCluster) {
    let engine = InMemoryEngine::new();
    let ops = ReleaseOperations::new(Arc::new(engine.clone()));
    (engine, ops, TestCluster { id: "dev" })
}

fn values(yaml: &str) -> Values {
    Values::from_yaml(yaml).unwrap()
}

async fn install_web(ops: &ReleaseOperations, cluster: &TestCluster) {
    ops.install(
        cluster,
        "bitnami/nginx",
        values("replicaCount: 1\n"),
        "web",
        "default",
        "15.0.0",
    )
    .await
    .unwrap();
}

mod install {
    use super::*;

    #[tokio::test]
    async fn install_then_inspect() {
        let (engine, ops, cluster) = setup();

        let outcome = ops
            .install(
                &cluster,
                "bitnami/nginx",
                values("replicaCount: 3\n"),
                "web",
                "default",
                "",
            )
            .await
            .unwrap();
        assert_eq!(outcome.revision, 1);
        assert_eq!(outcome.status, ReleaseStatus::Deployed);

        let detail = ops.get_release(&cluster, "web", "default").await.unwrap();
        assert_eq!(detail.chart, "nginx");

        let vals = ops.get_release_values(&cluster, "web", "default").await.unwrap();
        assert_eq!(vals.get("replicaCount"), Some(&serde_json::json!(3)));

        assert_eq!(
            engine.last_kubeconfig().await,
            Some(PathBuf::from("/run/chartdeck/proxy/dev/kubeconfig"))
        );
    }

    #[tokio::test]
    async fn name_collision_is_install_failed() {
        let (_engine, ops, cluster) = setup();
        install_web(&ops, &cluster).await;

        let err = ops
            .install(&cluster, "bitnami/nginx", Values::new(), "web", "default", "")
            .await
            .unwrap_err();
        match err {
            ReleaseError::InstallFailed { name, message, .. } => {
                assert_eq!(name, "web");
                assert!(message.contains("still in use"));
            }
            other => panic!("expected InstallFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn engine_message_is_preserved() {
        let (engine, ops, cluster) = setup();
        engine.fail_next("Kubernetes cluster unreachable").await;

        let err = ops
            .install(&cluster, "bitnami/nginx", Values::new(), "web", "default", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::InstallFailed { .. }));
        assert_eq!(err.message(), "Kubernetes cluster unreachable");
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_engine() {
        let (engine, ops, cluster) = setup();

        let cases = [
            ("", "default", "bitnami/nginx"),
            ("Web_App", "default", "bitnami/nginx"),
            ("web", "", "bitnami/nginx"),
            ("web", "default", " "),
        ];
        for (name, namespace, chart) in cases {
            let err = ops
                .install(&cluster, chart, Values::new(), name, namespace, "")
                .await
                .unwrap_err();
            assert!(
                matches!(err, ReleaseError::InvalidArgument { .. }),
                "{name:?}/{namespace:?}/{chart:?} gave {err:?}"
            );
        }

        let long_name = "a".repeat(54);
        assert!(matches!(
            ops.get_release(&cluster, &long_name, "default").await,
            Err(ReleaseError::InvalidArgument { .. })
        ));

        assert_eq!(engine.operation_counts().await.total(), 0);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn upgrade_appends_revision() {
        let (_engine, ops, cluster) = setup();
        install_web(&ops, &cluster).await;

        let outcome = ops
            .update_release(
                &cluster,
                "web",
                "default",
                "bitnami/nginx",
                values("replicaCount: 2\n"),
                "15.1.0",
            )
            .await
            .unwrap();
        assert_eq!(outcome.revision, 2);

        let history = ops
            .get_release_history(&cluster, "web", "default")
            .await
            .unwrap();
        let revisions: Vec<u32> = history.iter().map(|r| r.revision).collect();
        assert_eq!(revisions, vec![1, 2]);
        assert_eq!(history[0].status, ReleaseStatus::Superseded);
        assert_eq!(history[1].chart, "nginx-15.1.0");
    }

    #[tokio::test]
    async fn upgrade_of_missing_release_is_upgrade_failed() {
        let (_engine, ops, cluster) = setup();

        let err = ops
            .update_release(&cluster, "ghost", "default", "bitnami/nginx", Values::new(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::UpgradeFailed { .. }));
    }

    #[tokio::test]
    async fn rollback_to_missing_revision_fails() {
        let (_engine, ops, cluster) = setup();
        install_web(&ops, &cluster).await;
        ops.update_release(
            &cluster,
            "web",
            "default",
            "bitnami/nginx",
            Values::new(),
            "16.0.0",
        )
        .await
        .unwrap();

        let err = ops.rollback(&cluster, "web", "default", 3).await.unwrap_err();
        match err {
            ReleaseError::RollbackFailed { revision, .. } => assert_eq!(revision, 3),
            other => panic!("expected RollbackFailed, got {other:?}"),
        }

        for revision in [1, 2] {
            let outcome = ops
                .rollback(&cluster, "web", "default", revision)
                .await
                .unwrap();
            assert!(!outcome.message.is_empty());
        }

        let history = ops
            .get_release_history(&cluster, "web", "default")
            .await
            .unwrap();
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn rollback_of_missing_release_fails() {
        let (_engine, ops, cluster) = setup();

        let err = ops.rollback(&cluster, "ghost", "default", 1).await.unwrap_err();
        assert!(matches!(err, ReleaseError::RollbackFailed { .. }));
    }

    #[tokio::test]
    async fn delete_twice_fails_the_second_time() {
        let (engine, ops, cluster) = setup();
        install_web(&ops, &cluster).await;

        let outcome = ops.delete_release(&cluster, "web", "default").await.unwrap();
        assert_eq!(outcome.name, "web");
        assert_eq!(engine.release_count().await, 0);

        let err = ops
            .delete_release(&cluster, "web", "default")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

mod lookups {
    use super::*;

    #[tokio::test]
    async fn missing_release_is_not_found() {
        let (_engine, ops, cluster) = setup();

        let err = ops
            .get_release_history(&cluster, "ghost", "default")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::ReleaseNotFound { ref name, ref namespace }
                if name == "ghost" && namespace == "default"
        ));

        assert!(ops
            .get_release(&cluster, "ghost", "default")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(ops
            .get_release_values(&cluster, "ghost", "default")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn list_by_namespace_or_all() {
        let (_engine, ops, cluster) = setup();
        install_web(&ops, &cluster).await;
        ops.install(&cluster, "bitnami/redis", Values::new(), "cache", "infra", "")
            .await
            .unwrap();

        let all = ops.list_releases(&cluster, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let blank = ops.list_releases(&cluster, Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 2);

        let infra = ops.list_releases(&cluster, Some("infra")).await.unwrap();
        assert_eq!(infra.len(), 1);
        assert_eq!(infra[0].name, "cache");
    }

    #[tokio::test]
    async fn each_call_resolves_its_cluster() {
        let (engine, ops, dev) = setup();
        let prod = TestCluster { id: "prod" };

        install_web(&ops, &dev).await;

        let err = ops.get_release(&prod, "web", "default").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            engine.last_kubeconfig().await,
            Some(PathBuf::from("/run/chartdeck/proxy/prod/kubeconfig"))
        );

        assert!(ops.get_release(&dev, "web", "default").await.is_ok());
        assert!(ops.list_releases(&prod, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn facade_is_cloneable_and_stateless() {
        let (engine, ops, cluster) = setup();
        let copy = ops.clone();

        install_web(&ops, &cluster).await;
        copy.get_release(&cluster, "web", "default").await.unwrap();
        copy.get_release(&cluster, "web", "default").await.unwrap();

        let counts = engine.operation_counts().await;
        assert_eq!(counts.installs, 1);
        assert_eq!(counts.gets, 2);
    }
}
