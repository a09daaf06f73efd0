//! Cluster client abstraction.
//!
//! The orchestrators never shell out or parse tool output themselves; they
//! talk to a [`ClusterClient`] that returns structured results. The
//! production implementation wraps `kubectl` (see [`kubectl`]); tests use
//! in-memory fakes.

mod kubectl;
#[cfg(test)]
pub(crate) mod mock;

pub use kubectl::Kubectl;

use crate::error::Result;
use crate::types::DeleteStatus;
use async_trait::async_trait;
use std::path::Path;

/// Observed phase of a workload's pods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// No pods matched the selector (yet).
    Missing,
    /// The cluster reported a phase this client does not model.
    Unknown,
}

impl WorkloadPhase {
    /// Parse a phase string as reported by the cluster.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "" => Self::Missing,
            _ => Self::Unknown,
        }
    }
}

/// Result of ensuring a namespace exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceOutcome {
    Created,
    AlreadyExists,
    /// The caller lacks namespace-create rights. Provisioning treats this as
    /// a soft failure and continues.
    Forbidden { message: String },
}

/// Typed client for the container orchestration cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create the namespace if it does not exist. Idempotent.
    async fn ensure_namespace(&self, namespace: &str) -> Result<NamespaceOutcome>;

    /// Apply a declarative resource manifest in the given namespace.
    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()>;

    /// Delete a named resource. Deleting an absent resource is success,
    /// reported as `AlreadyAbsent`.
    async fn delete_resource(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<DeleteStatus>;

    /// Delete all volume claims matching an app label. Idempotent like
    /// `delete_resource`; no matches is `AlreadyAbsent`.
    async fn delete_volume_claims(&self, namespace: &str, app: &str) -> Result<DeleteStatus>;

    /// Phase of the pods selected by an app label.
    async fn workload_phase(&self, namespace: &str, app: &str) -> Result<WorkloadPhase>;

    /// Fetch the last `lines` log lines of the pods selected by an app label.
    async fn tail_logs(&self, namespace: &str, app: &str, lines: u32) -> Result<String>;
}
