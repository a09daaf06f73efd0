//! Command implementations.

pub mod deploy;
pub mod doctor;
pub mod down;
pub mod new;

use slipway_core::cluster::{ClusterClient, Kubectl};
use slipway_core::lifecycle::IdLocks;
use slipway_core::repohost::{GitHub, RepoHostClient};
use slipway_core::{Config, MetadataStore};
use std::sync::Arc;

/// Shared wiring for commands: the store, locks and external clients built
/// once from the loaded configuration.
pub(crate) struct Runtime {
    pub config: Config,
    pub store: MetadataStore,
    pub locks: Arc<IdLocks>,
    pub cluster: Arc<dyn ClusterClient>,
    pub repo_host: Option<Arc<dyn RepoHostClient>>,
}

impl Runtime {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.ensure_dirs()?;

        let repo_host: Option<Arc<dyn RepoHostClient>> = if config.repo_host.enabled {
            Some(Arc::new(GitHub::new(&config.repo_host)?))
        } else {
            None
        };

        Ok(Self {
            store: MetadataStore::new(config.paths.projects_dir.clone()),
            locks: Arc::new(IdLocks::default()),
            cluster: Arc::new(Kubectl::new()),
            repo_host,
            config,
        })
    }
}
