//! Image build client.
//!
//! Building a deployable image is the one optional provisioning step whose
//! failure is non-fatal (a usable image may remain from a prior run), so the
//! trait reports failure as an error the orchestrator downgrades to a log
//! line.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// Typed client for building a project's deployable image.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Build an image tagged `tag` from the project directory.
    async fn build(&self, project_dir: &Path, tag: &str) -> Result<()>;
}

/// Image builder shelling out to `docker build`.
#[derive(Debug, Clone, Default)]
pub struct DockerBuilder;

impl DockerBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Check that `docker` is installed and on PATH.
    pub fn check() -> Result<()> {
        match which::which("docker") {
            Ok(path) => {
                debug!("Found docker at: {:?}", path);
                Ok(())
            }
            Err(_) => Err(Error::ToolNotFound {
                tool: "docker".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ImageBuilder for DockerBuilder {
    async fn build(&self, project_dir: &Path, tag: &str) -> Result<()> {
        let dir = project_dir.to_string_lossy();
        debug!("docker build -t {} {}", tag, dir);

        let output = tokio::process::Command::new("docker")
            .args(["build", "-t", tag, &dir])
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::command_failed(
                format!("docker build -t {tag}"),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        info!("Built image {}", tag);
        Ok(())
    }
}
