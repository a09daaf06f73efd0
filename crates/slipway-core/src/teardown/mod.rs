//! Teardown orchestrator.
//!
//! Reverses provisioning across three independent backing systems: the
//! cluster, the repository host and the local filesystem. Every delete is
//! idempotent (absent is success, not failure) and every subsystem is
//! attempted regardless of what happened to its siblings; the aggregate
//! [`CleanupResult`] reports each outcome individually.

use crate::cluster::ClusterClient;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::lifecycle::IdLocks;
use crate::metadata::MetadataStore;
use crate::repohost::RepoHostClient;
use crate::types::{CleanupOutcome, CleanupResult, DeleteStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates teardown runs.
#[derive(Clone)]
pub struct Teardown {
    store: MetadataStore,
    cluster: Arc<dyn ClusterClient>,
    /// `None` when the repository host integration is disabled; the hosted
    /// repository is then reported as skipped.
    repo_host: Option<Arc<dyn RepoHostClient>>,
    cluster_config: ClusterConfig,
    locks: Arc<IdLocks>,
}

impl Teardown {
    pub fn new(
        store: MetadataStore,
        cluster: Arc<dyn ClusterClient>,
        repo_host: Option<Arc<dyn RepoHostClient>>,
        cluster_config: ClusterConfig,
        locks: Arc<IdLocks>,
    ) -> Self {
        Self {
            store,
            cluster,
            repo_host,
            cluster_config,
            locks,
        }
    }

    /// Tear down one project. Never fails as a whole: each subsystem's
    /// outcome is captured in the result, and a missing metadata record only
    /// means the configured default namespace is used.
    pub async fn teardown(&self, name: &str) -> CleanupResult {
        let _guard = self.locks.acquire(name).await;

        let namespace = match self.store.get(name) {
            Ok(record) => record
                .namespace
                .unwrap_or_else(|| self.cluster_config.default_namespace.clone()),
            Err(_) => {
                debug!(
                    "No record for '{}', using default namespace '{}'",
                    name, self.cluster_config.default_namespace
                );
                self.cluster_config.default_namespace.clone()
            }
        };

        info!("Tearing down '{}' in namespace '{}'", name, namespace);

        let store_name = format!("{name}-store");
        let credential_name = format!("{name}-store-credentials");

        let hosted_repository = match &self.repo_host {
            Some(host) => outcome(host.delete_repo(name).await),
            None => CleanupOutcome::Skipped,
        };

        let app_workload =
            outcome(self.cluster.delete_resource(&namespace, "deployment", name).await);
        let app_endpoint =
            outcome(self.cluster.delete_resource(&namespace, "service", name).await);
        let stateful_workload = outcome(
            self.cluster
                .delete_resource(&namespace, "deployment", &store_name)
                .await,
        );
        let stateful_endpoint = outcome(
            self.cluster
                .delete_resource(&namespace, "service", &store_name)
                .await,
        );
        let credential = outcome(
            self.cluster
                .delete_resource(&namespace, "secret", &credential_name)
                .await,
        );
        let volume_claim =
            outcome(self.cluster.delete_volume_claims(&namespace, &store_name).await);
        let local_artifacts = self.remove_local_artifacts(name);

        let result = CleanupResult {
            project: name.to_string(),
            namespace,
            hosted_repository,
            app_workload,
            app_endpoint,
            stateful_workload,
            stateful_endpoint,
            credential,
            volume_claim,
            local_artifacts,
        };

        if result.has_failures() {
            warn!("Teardown of '{}' finished with failures: {:?}", name, result);
        } else {
            info!("Teardown of '{}' complete", name);
        }
        result
    }

    /// Tear down every locally known project. One project's failures never
    /// stop the remaining projects from being processed.
    pub async fn teardown_all(&self) -> Result<Vec<CleanupResult>> {
        let records = self.store.list()?;
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            results.push(self.teardown(&record.name).await);
        }
        Ok(results)
    }

    fn remove_local_artifacts(&self, name: &str) -> CleanupOutcome {
        let dir = self.store.project_dir(name);
        if !dir.exists() {
            return CleanupOutcome::AlreadyAbsent;
        }
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!("Removed local artifacts at {:?}", dir);
                CleanupOutcome::Deleted
            }
            Err(e) => CleanupOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Collapse an idempotent delete result into a reportable outcome.
fn outcome(result: Result<DeleteStatus>) -> CleanupOutcome {
    match result {
        Ok(status) => status.into(),
        Err(e) => CleanupOutcome::Failed {
            error: e.to_string(),
        },
    }
}
