//! In-memory cluster client for orchestrator tests.

use super::{ClusterClient, NamespaceOutcome, WorkloadPhase};
use crate::error::{Error, Result};
use crate::types::DeleteStatus;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

/// Scripted fake cluster. Records every call in order and answers from
/// per-test configuration.
#[derive(Default)]
pub struct MockCluster {
    /// Ordered log of calls, e.g. `apply k8s/deployment.yml`.
    pub calls: Mutex<Vec<String>>,
    /// Manifest suffixes whose apply fails.
    pub failing_applies: HashSet<String>,
    /// `kind/name` pairs that are absent on delete.
    pub absent_on_delete: HashSet<String>,
    /// `kind/name` pairs whose delete fails outright.
    pub failing_deletes: HashSet<String>,
    /// Scripted phase sequences per app label; the last entry repeats.
    pub phases: Mutex<HashMap<String, Vec<WorkloadPhase>>>,
    /// Namespace-creation outcome.
    pub namespace_outcome: Option<NamespaceOutcome>,
    /// Whether volume claims exist to delete.
    pub volume_claims_absent: bool,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Script the phases an app reports across successive polls.
    pub fn script_phases(&self, app: &str, phases: Vec<WorkloadPhase>) {
        self.phases.lock().unwrap().insert(app.to_string(), phases);
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn ensure_namespace(&self, namespace: &str) -> Result<NamespaceOutcome> {
        self.record(format!("ensure-namespace {namespace}"));
        Ok(self
            .namespace_outcome
            .clone()
            .unwrap_or(NamespaceOutcome::AlreadyExists))
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()> {
        let manifest = manifest.to_string_lossy().to_string();
        self.record(format!("apply {manifest}"));
        if self
            .failing_applies
            .iter()
            .any(|suffix| manifest.ends_with(suffix))
        {
            return Err(Error::command_failed(
                format!("kubectl apply -f {manifest}"),
                format!("error validating manifest in namespace {namespace}"),
            ));
        }
        Ok(())
    }

    async fn delete_resource(
        &self,
        _namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<DeleteStatus> {
        let key = format!("{kind}/{name}");
        self.record(format!("delete {key}"));
        if self.failing_deletes.contains(&key) {
            return Err(Error::command_failed(
                format!("kubectl delete {kind} {name}"),
                "connection refused",
            ));
        }
        if self.absent_on_delete.contains(&key) {
            return Ok(DeleteStatus::AlreadyAbsent);
        }
        Ok(DeleteStatus::Deleted)
    }

    async fn delete_volume_claims(&self, _namespace: &str, app: &str) -> Result<DeleteStatus> {
        self.record(format!("delete-volume-claims {app}"));
        if self.volume_claims_absent {
            return Ok(DeleteStatus::AlreadyAbsent);
        }
        Ok(DeleteStatus::Deleted)
    }

    async fn workload_phase(&self, _namespace: &str, app: &str) -> Result<WorkloadPhase> {
        self.record(format!("phase {app}"));
        let mut phases = self.phases.lock().unwrap();
        match phases.get_mut(app) {
            Some(seq) if seq.len() > 1 => Ok(seq.remove(0)),
            Some(seq) => Ok(seq[0]),
            None => Ok(WorkloadPhase::Missing),
        }
    }

    async fn tail_logs(&self, _namespace: &str, app: &str, _lines: u32) -> Result<String> {
        self.record(format!("logs {app}"));
        Ok(format!("{app} started\n"))
    }
}
