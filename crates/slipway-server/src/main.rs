//! slipway-server - Slipway backend server
//!
//! Project creation, deployment progress streaming and teardown over HTTP.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("slipway_server=info".parse()?))
        .init();

    info!("slipway-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let server_config = config::ServerConfig::load()?;
    let core_config = slipway_core::Config::load()?;
    core_config.ensure_dirs()?;
    info!("Projects directory: {:?}", core_config.paths.projects_dir);

    let state = state::AppState::new(core_config)?;
    let router = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(server_config.bind).await?;
    info!("Listening on {}", server_config.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}
