//! `slipway new` - scaffold a project.

use anyhow::{bail, Result};
use colored::Colorize;
use slipway_core::generator::Scaffold;
use slipway_core::lifecycle::Lifecycle;
use slipway_core::types::{CreateProjectRequest, PersistenceMode};
use std::sync::Arc;

use crate::cli::NewCommand;
use crate::commands::Runtime;

fn parse_persistence(value: &str) -> Result<PersistenceMode> {
    match value {
        "none" => Ok(PersistenceMode::None),
        "stateful-store" => Ok(PersistenceMode::StatefulStore),
        other => bail!("unknown persistence mode '{other}'; expected 'none' or 'stateful-store'"),
    }
}

pub async fn execute(cmd: NewCommand, runtime: Runtime) -> Result<()> {
    let persistence = parse_persistence(&cmd.persistence)?;

    let request = CreateProjectRequest {
        name: cmd.name.clone(),
        description: cmd.description,
        owner: cmd.owner,
        port: cmd.port,
        runtime_version: cmd.runtime,
        persistence,
        namespace: cmd.namespace,
        build_image: cmd.build_image,
        skip_repository: cmd.skip_repository,
    };

    println!("{}", format!("Creating project '{}'...", cmd.name).cyan());

    let lifecycle = Lifecycle::new(
        runtime.store,
        Arc::new(Scaffold::new()),
        runtime.repo_host,
        runtime.locks,
    );
    let response = lifecycle.create(request).await?;

    println!("{}", "✓ Project created".green());
    println!("  Files:");
    for file in &response.files {
        println!("    {}", file);
    }
    if let Some(url) = &response.repository_url {
        println!("  Repository: {}", url);
    }
    println!();
    println!("  Next steps:");
    for step in &response.next_steps {
        println!("    {}", step);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_persistence() {
        assert_eq!(parse_persistence("none").unwrap(), PersistenceMode::None);
        assert_eq!(
            parse_persistence("stateful-store").unwrap(),
            PersistenceMode::StatefulStore
        );
        assert!(parse_persistence("postgres").is_err());
    }
}
