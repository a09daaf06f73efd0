//! Application state.

use slipway_core::cluster::{ClusterClient, Kubectl};
use slipway_core::generator::Scaffold;
use slipway_core::image::DockerBuilder;
use slipway_core::lifecycle::{IdLocks, Lifecycle};
use slipway_core::provision::Provisioner;
use slipway_core::repohost::{GitHub, RepoHostClient};
use slipway_core::teardown::Teardown;
use slipway_core::{Config, MetadataStore};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Orchestrator configuration
    pub config: Arc<Config>,
    /// Metadata store (used directly for existence checks)
    pub store: MetadataStore,
    /// Project creation flow
    pub lifecycle: Lifecycle,
    /// Provisioning orchestrator
    pub provisioner: Provisioner,
    /// Teardown orchestrator
    pub teardown: Teardown,
}

impl AppState {
    /// Create new application state wired against the production clients.
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = MetadataStore::new(config.paths.projects_dir.clone());
        let locks = Arc::new(IdLocks::default());
        let cluster: Arc<dyn ClusterClient> = Arc::new(Kubectl::new());

        let repo_host: Option<Arc<dyn RepoHostClient>> = if config.repo_host.enabled {
            Some(Arc::new(GitHub::new(&config.repo_host)?))
        } else {
            None
        };

        let lifecycle = Lifecycle::new(
            store.clone(),
            Arc::new(Scaffold::new()),
            repo_host.clone(),
            locks.clone(),
        );
        let provisioner = Provisioner::new(
            store.clone(),
            cluster.clone(),
            Arc::new(DockerBuilder::new()),
            config.cluster.clone(),
            config.retry,
        );
        let teardown = Teardown::new(
            store.clone(),
            cluster,
            repo_host,
            config.cluster.clone(),
            locks,
        );

        Ok(Arc::new(Self {
            config: Arc::new(config),
            store,
            lifecycle,
            provisioner,
            teardown,
        }))
    }
}
