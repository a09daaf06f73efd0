//! `kubectl`-backed cluster client.
//!
//! Shells out to `kubectl` and converts its exit status and stderr into the
//! structured results of [`ClusterClient`]. All output classification lives
//! here so callers never see tool text.

use super::{ClusterClient, NamespaceOutcome, WorkloadPhase};
use crate::error::{Error, Result};
use crate::types::DeleteStatus;
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Cluster client shelling out to `kubectl`.
#[derive(Debug, Clone, Default)]
pub struct Kubectl;

impl Kubectl {
    pub fn new() -> Self {
        Self
    }

    /// Check that `kubectl` is installed and on PATH.
    pub fn check() -> Result<()> {
        match which::which("kubectl") {
            Ok(path) => {
                debug!("Found kubectl at: {:?}", path);
                Ok(())
            }
            Err(_) => Err(Error::ToolNotFound {
                tool: "kubectl".to_string(),
            }),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("kubectl {}", args.join(" "));
        let output = Command::new("kubectl").args(args).output().await?;
        Ok(output)
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[async_trait]
impl ClusterClient for Kubectl {
    async fn ensure_namespace(&self, namespace: &str) -> Result<NamespaceOutcome> {
        let output = self.run(&["create", "namespace", namespace]).await?;

        if output.status.success() {
            return Ok(NamespaceOutcome::Created);
        }

        let stderr = stderr_of(&output);
        if stderr.contains("AlreadyExists") || stderr.contains("already exists") {
            return Ok(NamespaceOutcome::AlreadyExists);
        }
        if stderr.contains("Forbidden") || stderr.contains("forbidden") {
            return Ok(NamespaceOutcome::Forbidden {
                message: stderr.trim().to_string(),
            });
        }

        Err(Error::command_failed(
            format!("kubectl create namespace {namespace}"),
            stderr,
        ))
    }

    async fn apply_manifest(&self, namespace: &str, manifest: &Path) -> Result<()> {
        let manifest_str = manifest.to_string_lossy();
        let output = self
            .run(&["--namespace", namespace, "apply", "-f", &manifest_str])
            .await?;

        if !output.status.success() {
            return Err(Error::command_failed(
                format!("kubectl apply -f {manifest_str}"),
                stderr_of(&output),
            ));
        }
        Ok(())
    }

    async fn delete_resource(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<DeleteStatus> {
        let output = self
            .run(&["--namespace", namespace, "delete", kind, name])
            .await?;

        if output.status.success() {
            debug!("Deleted {}/{} in namespace {}", kind, name, namespace);
            return Ok(DeleteStatus::Deleted);
        }

        let stderr = stderr_of(&output);
        if stderr.contains("NotFound") || stderr.contains("not found") {
            return Ok(DeleteStatus::AlreadyAbsent);
        }

        Err(Error::command_failed(
            format!("kubectl delete {kind} {name}"),
            stderr,
        ))
    }

    async fn delete_volume_claims(&self, namespace: &str, app: &str) -> Result<DeleteStatus> {
        let selector = format!("app={app}");
        let output = self
            .run(&[
                "--namespace",
                namespace,
                "delete",
                "persistentvolumeclaim",
                "--selector",
                &selector,
            ])
            .await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if stderr.contains("NotFound") || stderr.contains("not found") {
                return Ok(DeleteStatus::AlreadyAbsent);
            }
            return Err(Error::command_failed(
                format!("kubectl delete persistentvolumeclaim --selector {selector}"),
                stderr,
            ));
        }

        // kubectl exits 0 with "No resources found" on stdout when the
        // selector matched nothing.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("No resources found") || stdout.trim().is_empty() {
            return Ok(DeleteStatus::AlreadyAbsent);
        }
        Ok(DeleteStatus::Deleted)
    }

    async fn workload_phase(&self, namespace: &str, app: &str) -> Result<WorkloadPhase> {
        let selector = format!("app={app}");
        let output = self
            .run(&[
                "--namespace",
                namespace,
                "get",
                "pods",
                "--selector",
                &selector,
                "-o",
                "jsonpath={.items[0].status.phase}",
            ])
            .await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            // An empty selection makes the jsonpath index fail; that is
            // "no pods yet", not an error.
            if stderr.contains("array index out of bounds")
                || stderr.contains("is not found")
                || stderr.contains("NotFound")
            {
                return Ok(WorkloadPhase::Missing);
            }
            return Err(Error::command_failed(
                format!("kubectl get pods --selector {selector}"),
                stderr,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(WorkloadPhase::parse(&stdout))
    }

    async fn tail_logs(&self, namespace: &str, app: &str, lines: u32) -> Result<String> {
        let selector = format!("app={app}");
        let tail = lines.to_string();
        let output = self
            .run(&[
                "--namespace",
                namespace,
                "logs",
                "--selector",
                &selector,
                "--tail",
                &tail,
            ])
            .await?;

        if !output.status.success() {
            return Err(Error::command_failed(
                format!("kubectl logs --selector {selector}"),
                stderr_of(&output),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
