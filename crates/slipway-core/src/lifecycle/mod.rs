//! Project creation flow and per-identifier locking.
//!
//! Creation order is fixed: validate, lock, conflict-check, generate,
//! persist the metadata record, then (optionally) create the hosted
//! repository. Validation and conflict detection happen before any side
//! effect.

use crate::conflict::ConflictGuard;
use crate::error::{Error, Result};
use crate::generator::ProjectGenerator;
use crate::metadata::MetadataStore;
use crate::repohost::RepoHostClient;
use crate::types::{
    CreateProjectRequest, CreateProjectResponse, LifecycleStage, ProjectRecord,
    RECORD_SCHEMA_VERSION,
};
use crate::validate::{validate_namespace, validate_project_name};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Keyed async locks. Two lifecycle operations on the same identifier are
/// serialized; operations on different identifiers run concurrently.
#[derive(Default)]
pub struct IdLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdLocks {
    /// Acquire the lock for one identifier, waiting if another operation on
    /// the same identifier holds it.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Drives project creation.
pub struct Lifecycle {
    store: MetadataStore,
    generator: Arc<dyn ProjectGenerator>,
    repo_host: Option<Arc<dyn RepoHostClient>>,
    locks: Arc<IdLocks>,
}

impl Lifecycle {
    pub fn new(
        store: MetadataStore,
        generator: Arc<dyn ProjectGenerator>,
        repo_host: Option<Arc<dyn RepoHostClient>>,
        locks: Arc<IdLocks>,
    ) -> Self {
        Self {
            store,
            generator,
            repo_host,
            locks,
        }
    }

    /// Create a new project: conflict-checked scaffold plus a durable
    /// metadata record. Returns the file manifest and the literal next-step
    /// commands.
    pub async fn create(&self, req: CreateProjectRequest) -> Result<CreateProjectResponse> {
        validate_project_name(&req.name)?;
        if let Some(namespace) = &req.namespace {
            validate_namespace(namespace)?;
        }

        let _guard = self.locks.acquire(&req.name).await;

        let conflict_guard = ConflictGuard::new(self.repo_host.clone(), self.store.clone());
        if let Some(kind) = conflict_guard.check(&req.name).await? {
            return Err(Error::Conflict {
                name: req.name,
                kind,
            });
        }

        let record = ProjectRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            name: req.name.clone(),
            namespace: req.namespace.clone(),
            owner: req.owner.clone(),
            description: req.description.clone(),
            stage: LifecycleStage::Created,
            created_at: chrono::Utc::now(),
            port: req.port,
            runtime_version: req.runtime_version.clone(),
            persistence: req.persistence,
            build_image: req.build_image,
        };

        let project_dir = self.store.project_dir(&req.name);
        let generated = self.generator.generate(&record, &project_dir)?;
        self.store.put(&record)?;
        info!("Created project '{}' at {:?}", req.name, project_dir);

        // Repository creation is best-effort once the local project exists:
        // the scaffold is already usable, and teardown cleans up either way.
        let repository_url = match &self.repo_host {
            Some(host) if !req.skip_repository => {
                match host.create_repo(&req.name, &req.description).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!("Could not create hosted repository for '{}': {}", req.name, e);
                        None
                    }
                }
            }
            _ => {
                debug!("Skipping hosted repository for '{}'", req.name);
                None
            }
        };

        let next_steps = vec![
            format!("cd {}", project_dir.display()),
            format!("slipway deploy {}", req.name),
            format!("slipway down {}", req.name),
        ];

        Ok(CreateProjectResponse {
            success: true,
            name: record.name,
            files: generated.files,
            repository_url,
            next_steps,
        })
    }

    /// The metadata store this lifecycle writes to.
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }
}
