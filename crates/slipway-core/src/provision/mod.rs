//! Provisioning orchestrator.
//!
//! Drives one project's resources onto the cluster in dependency order,
//! reporting every step through a progress channel:
//!
//! 1. Ensure the target namespace (soft-fail: lacking create rights never
//!    aborts the run)
//! 2. Build the deployable image if requested (soft-fail: a prior image may
//!    still be usable)
//! 3. Apply resources in `ResourceSet` order; stateful-store resources go
//!    first and the run waits for the store to reach running phase (plus a
//!    settle delay) before anything app-related
//! 4. Wait for the app workload, fetch a log tail, emit the terminal
//!    `success`
//!
//! Apply failures and readiness timeouts are fatal and end the stream with
//! one `error` event. A disconnected observer stops the run before the next
//! step; an external call already in flight is never interrupted.

use crate::cluster::{ClusterClient, NamespaceOutcome, WorkloadPhase};
use crate::config::{ClusterConfig, RetryPolicy};
use crate::error::{Error, Result};
use crate::generator::resource_set;
use crate::image::ImageBuilder;
use crate::metadata::MetadataStore;
use crate::progress::{DeploySummary, ProgressEvent, ProgressSender};
use crate::types::ResourceKind;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lines of workload log fetched after a successful run.
const LOG_TAIL_LINES: u32 = 25;

/// Orchestrates provisioning runs. Cheap to clone; one instance serves any
/// number of concurrent runs for different projects.
#[derive(Clone)]
pub struct Provisioner {
    store: MetadataStore,
    cluster: Arc<dyn ClusterClient>,
    builder: Arc<dyn ImageBuilder>,
    cluster_config: ClusterConfig,
    retry: RetryPolicy,
}

impl Provisioner {
    pub fn new(
        store: MetadataStore,
        cluster: Arc<dyn ClusterClient>,
        builder: Arc<dyn ImageBuilder>,
        cluster_config: ClusterConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            cluster,
            builder,
            cluster_config,
            retry,
        }
    }

    /// Start a provisioning run and return its ordered event stream. The
    /// stream ends after the terminal `error` or `success` event.
    pub fn provision(&self, name: &str) -> mpsc::UnboundedReceiver<ProgressEvent> {
        let (mut progress, rx) = ProgressSender::channel();
        let this = self.clone();
        let name = name.to_string();

        tokio::spawn(async move {
            if let Err(e) = this.drive(&name, &mut progress).await {
                warn!("Provisioning '{}' failed: {}", name, e);
                progress.error(e.to_string());
            }
        });

        rx
    }

    async fn drive(&self, name: &str, progress: &mut ProgressSender) -> Result<()> {
        let record = self.store.get(name)?;
        let namespace = record
            .namespace
            .clone()
            .unwrap_or_else(|| self.cluster_config.default_namespace.clone());

        if !progress.log(format!("Provisioning '{name}' in namespace '{namespace}'")) {
            return Ok(());
        }

        // Namespace creation is best-effort: a service account without
        // namespace-create rights must still be able to deploy into an
        // existing namespace.
        if self.cluster_config.create_namespace {
            match self.cluster.ensure_namespace(&namespace).await {
                Ok(NamespaceOutcome::Created) => {
                    progress.log(format!("Created namespace '{namespace}'"));
                }
                Ok(NamespaceOutcome::AlreadyExists) => {
                    debug!("Namespace '{}' already exists", namespace);
                }
                Ok(NamespaceOutcome::Forbidden { message }) => {
                    warn!("Not allowed to create namespace '{}': {}", namespace, message);
                    progress.log(format!(
                        "No permission to create namespace '{namespace}', continuing"
                    ));
                }
                Err(e) => {
                    warn!("Could not ensure namespace '{}': {}", namespace, e);
                    progress.log(format!("Could not ensure namespace '{namespace}', continuing"));
                }
            }
        }

        // Image build is the one optional step whose failure is non-fatal: a
        // usable image may remain from a prior run.
        if record.build_image {
            let tag = format!("{name}:latest");
            if !progress.log(format!("Building image '{tag}'")) {
                return Ok(());
            }
            match self.builder.build(&self.store.project_dir(name), &tag).await {
                Ok(()) => {
                    progress.log(format!("Built image '{tag}'"));
                }
                Err(e) => {
                    warn!("Image build failed for '{}': {}", name, e);
                    progress.log(format!(
                        "Image build failed, continuing with existing image: {e}"
                    ));
                }
            }
        }

        let project_dir = self.store.project_dir(name);
        for resource in &resource_set(&record) {
            if !progress.log(format!("Applying {} '{}'", resource.kind, resource.name)) {
                debug!("Observer disconnected; stopping before {}", resource.kind);
                return Ok(());
            }

            let manifest = project_dir.join(&resource.manifest);
            self.cluster
                .apply_manifest(&namespace, &manifest)
                .await
                .map_err(|e| Error::provisioning(resource.kind.to_string(), e.to_string()))?;

            // The store must accept connections before anything app-related
            // is applied; the app expects store connectivity at startup.
            if resource.kind == ResourceKind::StatefulWorkload {
                if !progress.log(format!("Waiting for stateful store '{}'", resource.name)) {
                    return Ok(());
                }
                self.wait_ready(&namespace, &resource.name).await?;
                progress.log(format!(
                    "Stateful store '{}' is running, settling before app rollout",
                    resource.name
                ));
                tokio::time::sleep(self.retry.settle()).await;
            }
        }

        if !progress.log(format!("Waiting for workload '{name}'")) {
            return Ok(());
        }
        self.wait_ready(&namespace, name).await?;

        // Diagnostic tail only; failing to fetch logs never fails the run.
        match self.cluster.tail_logs(&namespace, name, LOG_TAIL_LINES).await {
            Ok(tail) if !tail.trim().is_empty() => {
                progress.log(format!("Recent logs:\n{}", tail.trim_end()));
            }
            Ok(_) => {}
            Err(e) => debug!("Could not fetch log tail for '{}': {}", name, e),
        }

        info!("Provisioned '{}' in namespace '{}'", name, namespace);
        progress.success(DeploySummary {
            name: name.to_string(),
            namespace,
            port: record.port,
        });
        Ok(())
    }

    /// Poll a workload's phase until it reaches running, bounded by the
    /// retry policy. Exhausting the bound is a timeout, reported distinctly
    /// from an apply failure.
    async fn wait_ready(&self, namespace: &str, app: &str) -> Result<()> {
        for attempt in 1..=self.retry.max_attempts {
            match self.cluster.workload_phase(namespace, app).await {
                Ok(WorkloadPhase::Running) => {
                    debug!("'{}' running after {} attempts", app, attempt);
                    return Ok(());
                }
                Ok(phase) => debug!(
                    "'{}' phase {:?} (attempt {}/{})",
                    app, phase, attempt, self.retry.max_attempts
                ),
                Err(e) => warn!(
                    "Phase check for '{}' failed (attempt {}/{}): {}",
                    app, attempt, self.retry.max_attempts, e
                ),
            }
            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.interval()).await;
            }
        }

        Err(Error::Timeout {
            resource: app.to_string(),
            attempts: self.retry.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::MockCluster;
    use crate::types::{
        LifecycleStage, PersistenceMode, ProjectRecord, RECORD_SCHEMA_VERSION,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    struct MockBuilder {
        fail: bool,
        builds: Mutex<Vec<String>>,
    }

    impl MockBuilder {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                builds: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageBuilder for MockBuilder {
        async fn build(&self, _project_dir: &Path, tag: &str) -> crate::error::Result<()> {
            self.builds.lock().unwrap().push(tag.to_string());
            if self.fail {
                return Err(Error::command_failed("docker build", "no daemon"));
            }
            Ok(())
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            interval_secs: 0,
            settle_secs: 0,
        }
    }

    fn record(name: &str, persistence: PersistenceMode, build_image: bool) -> ProjectRecord {
        ProjectRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            name: name.to_string(),
            namespace: Some("team-a".to_string()),
            owner: "alice".to_string(),
            description: "test".to_string(),
            stage: LifecycleStage::Created,
            created_at: Utc::now(),
            port: 8080,
            runtime_version: "21".to_string(),
            persistence,
            build_image,
        }
    }

    fn provisioner(
        dir: &TempDir,
        cluster: Arc<MockCluster>,
        builder: Arc<MockBuilder>,
        retry: RetryPolicy,
    ) -> Provisioner {
        Provisioner::new(
            MetadataStore::new(dir.path()),
            cluster,
            builder,
            ClusterConfig::default(),
            retry,
        )
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    fn applies(calls: &[String]) -> Vec<String> {
        calls
            .iter()
            .filter(|c| c.starts_with("apply "))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_stateless_project_applies_two_resources() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        cluster.script_phases("user-service", vec![WorkloadPhase::Running]);
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(3));
        p.store.put(&record("user-service", PersistenceMode::None, false)).unwrap();

        let events = collect(p.provision("user-service")).await;

        assert!(matches!(events.last(), Some(ProgressEvent::Success(_))));
        let applies = applies(&cluster.call_log());
        assert_eq!(applies.len(), 2);
        assert!(applies[0].ends_with("k8s/deployment.yml"));
        assert!(applies[1].ends_with("k8s/service.yml"));
    }

    #[tokio::test]
    async fn test_stateful_resources_apply_before_app_resources() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        cluster.script_phases(
            "orders-svc-store",
            vec![WorkloadPhase::Pending, WorkloadPhase::Running],
        );
        cluster.script_phases("orders-svc", vec![WorkloadPhase::Running]);
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(5));
        p.store
            .put(&record("orders-svc", PersistenceMode::StatefulStore, false))
            .unwrap();

        let events = collect(p.provision("orders-svc")).await;
        assert!(matches!(events.last(), Some(ProgressEvent::Success(_))));

        let applies = applies(&cluster.call_log());
        assert_eq!(applies.len(), 5);
        assert!(applies[0].ends_with("k8s/store-credentials.yml"));
        assert!(applies[1].ends_with("k8s/store-service.yml"));
        assert!(applies[2].ends_with("k8s/store-deployment.yml"));
        assert!(applies[3].ends_with("k8s/deployment.yml"));
        assert!(applies[4].ends_with("k8s/service.yml"));

        // The store must be observed running before the app workload is applied.
        let calls = cluster.call_log();
        let store_ready = calls
            .iter()
            .position(|c| c == "phase orders-svc-store")
            .unwrap();
        let app_apply = calls
            .iter()
            .position(|c| c.ends_with("k8s/deployment.yml"))
            .unwrap();
        assert!(store_ready < app_apply);
    }

    #[tokio::test]
    async fn test_apply_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let mut cluster = MockCluster::new();
        cluster.failing_applies.insert("k8s/deployment.yml".to_string());
        let cluster = Arc::new(cluster);
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(3));
        p.store.put(&record("bad-app", PersistenceMode::None, false)).unwrap();

        let events = collect(p.provision("bad-app")).await;

        match events.last() {
            Some(ProgressEvent::Error(msg)) => {
                assert!(msg.contains("app workload"), "{msg}");
            }
            other => panic!("expected error event, got {other:?}"),
        }
        // The endpoint is never applied after the workload apply fails.
        assert_eq!(applies(&cluster.call_log()).len(), 1);
    }

    #[tokio::test]
    async fn test_readiness_timeout_is_reported_distinctly() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        cluster.script_phases("stuck-app", vec![WorkloadPhase::Pending]);
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(3));
        p.store.put(&record("stuck-app", PersistenceMode::None, false)).unwrap();

        let events = collect(p.provision("stuck-app")).await;

        match events.last() {
            Some(ProgressEvent::Error(msg)) => {
                assert!(msg.contains("Timed out"), "{msg}");
                assert!(msg.contains("3 attempts"), "{msg}");
            }
            other => panic!("expected error event, got {other:?}"),
        }
        assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Success(_))));

        // Bounded: exactly max_attempts phase checks.
        let checks = cluster
            .call_log()
            .iter()
            .filter(|c| *c == "phase stuck-app")
            .count();
        assert_eq!(checks, 3);
    }

    #[tokio::test]
    async fn test_image_build_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        cluster.script_phases("resilient", vec![WorkloadPhase::Running]);
        let builder = Arc::new(MockBuilder::new(true));
        let p = provisioner(&dir, cluster.clone(), builder.clone(), fast_retry(3));
        p.store.put(&record("resilient", PersistenceMode::None, true)).unwrap();

        let events = collect(p.provision("resilient")).await;

        assert_eq!(builder.builds.lock().unwrap().as_slice(), ["resilient:latest"]);
        assert!(matches!(events.last(), Some(ProgressEvent::Success(_))));
    }

    #[tokio::test]
    async fn test_missing_record_emits_error() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(3));

        let events = collect(p.provision("ghost")).await;

        match events.last() {
            Some(ProgressEvent::Error(msg)) => assert!(msg.contains("ghost")),
            other => panic!("expected error event, got {other:?}"),
        }
        // Nothing was applied before the failure.
        assert!(applies(&cluster.call_log()).is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_observer_stops_next_step() {
        let dir = tempdir().unwrap();
        let cluster = Arc::new(MockCluster::new());
        cluster.script_phases("quiet", vec![WorkloadPhase::Running]);
        let builder = Arc::new(MockBuilder::new(false));
        let p = provisioner(&dir, cluster.clone(), builder, fast_retry(3));
        p.store.put(&record("quiet", PersistenceMode::None, false)).unwrap();

        // Drop the receiver immediately; the run should stop early instead
        // of driving the cluster to completion.
        let rx = p.provision("quiet");
        drop(rx);

        // Give the spawned task a chance to observe the closed channel.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(applies(&cluster.call_log()).is_empty());
    }
}
