//! slipway - Scaffolding and deployment lifecycle CLI
//!
//! Scaffold application projects and drive their lifecycle (create, deploy,
//! tear down) against a cluster, an optional stateful store and a
//! repository host.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Runtime;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("slipway=warn".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration and build the shared wiring
    let config = slipway_core::Config::load()?;
    let runtime = Runtime::from_config(config)?;

    // Execute command
    match cli.command {
        Commands::New(cmd) => commands::new::execute(cmd, runtime).await,
        Commands::Deploy { name } => commands::deploy::execute(&name, runtime).await,
        Commands::Down(cmd) => commands::down::execute(cmd, runtime).await,
        Commands::Doctor => commands::doctor::execute(runtime).await,
        Commands::Version => {
            println!("slipway {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
