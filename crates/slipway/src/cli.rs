//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Slipway CLI
///
/// Scaffold application projects and drive their deployment lifecycle.
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new project
    New(NewCommand),

    /// Deploy a project to the cluster, streaming progress
    Deploy {
        /// Project name
        name: String,
    },

    /// Tear down a project (or all projects)
    Down(DownCommand),

    /// Run diagnostics
    Doctor,

    /// Show version
    Version,
}

#[derive(Args, Debug)]
pub struct NewCommand {
    /// Project name (DNS label: lowercase alphanumerics and hyphens)
    pub name: String,

    /// Short human description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Owner recorded in the project metadata
    #[arg(short, long, default_value = "unknown")]
    pub owner: String,

    /// Port the application listens on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Language/runtime version tag
    #[arg(long, default_value = "21")]
    pub runtime: String,

    /// Persistence mode: "none" or "stateful-store"
    #[arg(long, default_value = "none")]
    pub persistence: String,

    /// Target namespace (validated; defaults to the configured namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Build a deployable image during provisioning
    #[arg(long)]
    pub build_image: bool,

    /// Do not create a hosted repository even when the integration is enabled
    #[arg(long)]
    pub skip_repository: bool,
}

#[derive(Args, Debug)]
pub struct DownCommand {
    /// Project name (omit with --all)
    pub name: Option<String>,

    /// Tear down every known project
    #[arg(long)]
    pub all: bool,

    /// Print the cleanup report as JSON
    #[arg(long)]
    pub json: bool,
}
