//! `slipway down` - tear down one project or all of them.

use anyhow::{bail, Result};
use colored::Colorize;
use slipway_core::teardown::Teardown;
use slipway_core::types::{CleanupOutcome, CleanupResult};

use crate::cli::DownCommand;
use crate::commands::Runtime;

pub async fn execute(cmd: DownCommand, runtime: Runtime) -> Result<()> {
    let teardown = Teardown::new(
        runtime.store,
        runtime.cluster,
        runtime.repo_host,
        runtime.config.cluster.clone(),
        runtime.locks,
    );

    let results = match (&cmd.name, cmd.all) {
        (Some(name), false) => vec![teardown.teardown(name).await],
        (None, true) => teardown.teardown_all().await?,
        (Some(_), true) => bail!("pass either a project name or --all, not both"),
        (None, false) => bail!("pass a project name or --all"),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            print_result(result);
        }
    }

    if results.iter().any(CleanupResult::has_failures) {
        bail!("teardown finished with failures");
    }
    Ok(())
}

fn print_result(result: &CleanupResult) {
    println!(
        "{}",
        format!(
            "Teardown of '{}' (namespace '{}'):",
            result.project, result.namespace
        )
        .cyan()
    );
    print_outcome("hosted repository", &result.hosted_repository);
    print_outcome("app workload", &result.app_workload);
    print_outcome("app endpoint", &result.app_endpoint);
    print_outcome("stateful workload", &result.stateful_workload);
    print_outcome("stateful endpoint", &result.stateful_endpoint);
    print_outcome("credential", &result.credential);
    print_outcome("volume claim", &result.volume_claim);
    print_outcome("local artifacts", &result.local_artifacts);
}

fn print_outcome(label: &str, outcome: &CleanupOutcome) {
    match outcome {
        CleanupOutcome::Deleted => println!("  {} {}: deleted", "✓".green(), label),
        CleanupOutcome::AlreadyAbsent => {
            println!("  {} {}: already absent", "→".yellow(), label)
        }
        CleanupOutcome::Skipped => println!("  {} {}: skipped", "→".yellow(), label),
        CleanupOutcome::Failed { error } => {
            println!("  {} {}: {}", "✗".red(), label, error)
        }
    }
}
