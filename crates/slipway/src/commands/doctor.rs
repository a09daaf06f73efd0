//! `slipway doctor` - environment diagnostics.

use anyhow::Result;
use colored::Colorize;
use slipway_core::cluster::Kubectl;
use slipway_core::image::DockerBuilder;
use slipway_core::Config;

use crate::commands::Runtime;

pub async fn execute(runtime: Runtime) -> Result<()> {
    println!("{}", "Slipway diagnostics".cyan());

    match Kubectl::check() {
        Ok(()) => println!("  {} kubectl found", "✓".green()),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    match DockerBuilder::check() {
        Ok(()) => println!("  {} docker found", "✓".green()),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    println!("  Config file: {:?}", Config::config_path());
    println!("  Projects directory: {:?}", runtime.config.paths.projects_dir);
    println!(
        "  Repository host integration: {}",
        if runtime.config.repo_host.enabled {
            "enabled".to_string()
        } else {
            "disabled".to_string()
        }
    );

    let projects = runtime.store.list()?;
    println!("  Known projects: {}", projects.len());
    for record in projects {
        println!(
            "    {} (namespace {}, persistence {:?})",
            record.name,
            record.namespace.as_deref().unwrap_or("default"),
            record.persistence
        );
    }

    Ok(())
}
