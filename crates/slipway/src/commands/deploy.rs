//! `slipway deploy` - provision a project, printing the progress stream.

use anyhow::Result;
use colored::Colorize;
use slipway_core::image::DockerBuilder;
use slipway_core::provision::Provisioner;
use slipway_core::ProgressEvent;
use std::sync::Arc;

use crate::commands::Runtime;

pub async fn execute(name: &str, runtime: Runtime) -> Result<()> {
    println!("{}", format!("Deploying '{}'...", name).cyan());

    let provisioner = Provisioner::new(
        runtime.store,
        runtime.cluster,
        Arc::new(DockerBuilder::new()),
        runtime.config.cluster.clone(),
        runtime.config.retry,
    );

    let mut rx = provisioner.provision(name);
    let mut failed = false;
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Log(message) => println!("  {}", message),
            ProgressEvent::Error(message) => {
                println!("{}", format!("✗ {}", message).red());
                failed = true;
            }
            ProgressEvent::Success(summary) => {
                println!(
                    "{}",
                    format!(
                        "✓ '{}' deployed in namespace '{}' on port {}",
                        summary.name, summary.namespace, summary.port
                    )
                    .green()
                );
            }
        }
    }

    if failed {
        anyhow::bail!("deployment of '{name}' failed");
    }
    Ok(())
}
