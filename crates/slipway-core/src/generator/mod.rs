//! Project generation.
//!
//! The generator is an external collaborator from the orchestrator's point
//! of view: it produces source artifacts and declarative resource manifests,
//! and the orchestrator treats those files as opaque things to apply. The
//! built-in [`Scaffold`] renders a deliberately minimal skeleton; richer
//! template packs implement [`ProjectGenerator`] themselves.

use crate::error::Result;
use crate::types::{PersistenceMode, ProjectRecord, Resource, ResourceKind, ResourceSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Output of generating a project: the files written (relative paths) and
/// the ordered resource set to provision.
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub files: Vec<String>,
    pub resources: ResourceSet,
}

/// Produces a project's source artifacts and resource manifests.
pub trait ProjectGenerator: Send + Sync {
    /// Generate the project into `dir`. `dir` is created if absent.
    fn generate(&self, record: &ProjectRecord, dir: &Path) -> Result<GeneratedProject>;
}

/// Build the ordered resource set for a project. Ordering is a hard
/// invariant: stateful-store resources (credential, endpoint, workload)
/// come before app resources, because the app expects store connectivity
/// at startup.
pub fn resource_set(record: &ProjectRecord) -> ResourceSet {
    let name = &record.name;
    let mut resources = Vec::new();

    if record.persistence == PersistenceMode::StatefulStore {
        resources.push(Resource {
            kind: ResourceKind::Credential,
            name: format!("{name}-store-credentials"),
            manifest: "k8s/store-credentials.yml".to_string(),
        });
        resources.push(Resource {
            kind: ResourceKind::StatefulEndpoint,
            name: format!("{name}-store"),
            manifest: "k8s/store-service.yml".to_string(),
        });
        resources.push(Resource {
            kind: ResourceKind::StatefulWorkload,
            name: format!("{name}-store"),
            manifest: "k8s/store-deployment.yml".to_string(),
        });
    }

    resources.push(Resource {
        kind: ResourceKind::AppWorkload,
        name: name.clone(),
        manifest: "k8s/deployment.yml".to_string(),
    });
    resources.push(Resource {
        kind: ResourceKind::AppEndpoint,
        name: name.clone(),
        manifest: "k8s/service.yml".to_string(),
    });

    resources
}

/// The cluster-side resource kind string for a resource, as the cluster
/// client expects it.
pub fn cluster_kind(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Credential => "secret",
        ResourceKind::StatefulEndpoint | ResourceKind::AppEndpoint => "service",
        ResourceKind::StatefulWorkload | ResourceKind::AppWorkload => "deployment",
    }
}

/// Minimal built-in generator.
#[derive(Debug, Clone, Default)]
pub struct Scaffold;

impl Scaffold {
    pub fn new() -> Self {
        Self
    }

    fn write(
        &self,
        dir: &Path,
        relative: &str,
        content: String,
        files: &mut Vec<String>,
    ) -> Result<()> {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        files.push(relative.to_string());
        Ok(())
    }
}

impl ProjectGenerator for Scaffold {
    fn generate(&self, record: &ProjectRecord, dir: &Path) -> Result<GeneratedProject> {
        fs::create_dir_all(dir)?;
        let mut files = Vec::new();
        let resources = resource_set(record);

        self.write(dir, "README.md", templates::readme(record), &mut files)?;
        self.write(dir, "Dockerfile", templates::dockerfile(record), &mut files)?;

        for resource in &resources {
            let manifest = match resource.kind {
                ResourceKind::Credential => templates::store_credentials(record, &resource.name),
                ResourceKind::StatefulEndpoint => templates::store_service(record, &resource.name),
                ResourceKind::StatefulWorkload => {
                    templates::store_deployment(record, &resource.name)
                }
                ResourceKind::AppWorkload => templates::app_deployment(record),
                ResourceKind::AppEndpoint => templates::app_service(record),
            };
            self.write(dir, &resource.manifest, manifest, &mut files)?;
        }

        debug!("Generated {} files for '{}' in {:?}", files.len(), record.name, dir);
        Ok(GeneratedProject { files, resources })
    }
}

/// Text templates for the built-in scaffold. Kept apart from the
/// orchestration logic so swapping in a real template pack touches nothing
/// else.
mod templates {
    use crate::types::{PersistenceMode, ProjectRecord};

    pub fn readme(record: &ProjectRecord) -> String {
        format!(
            "# {}\n\n{}\n\nGenerated by slipway. Runtime version {}, port {}.\n",
            record.name, record.description, record.runtime_version, record.port
        )
    }

    pub fn dockerfile(record: &ProjectRecord) -> String {
        format!(
            "FROM eclipse-temurin:{version}-jre\nCOPY target/app.jar /app.jar\nEXPOSE {port}\nENTRYPOINT [\"java\", \"-jar\", \"/app.jar\"]\n",
            version = record.runtime_version,
            port = record.port
        )
    }

    pub fn app_deployment(record: &ProjectRecord) -> String {
        let store_env = if record.persistence == PersistenceMode::StatefulStore {
            format!(
                "\n            - name: STORE_HOST\n              value: {name}-store\n            - name: STORE_CREDENTIALS\n              valueFrom:\n                secretKeyRef:\n                  name: {name}-store-credentials\n                  key: password",
                name = record.name
            )
        } else {
            String::new()
        };
        format!(
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {name}\n  labels:\n    app: {name}\nspec:\n  replicas: 1\n  selector:\n    matchLabels:\n      app: {name}\n  template:\n    metadata:\n      labels:\n        app: {name}\n    spec:\n      containers:\n        - name: {name}\n          image: {name}:latest\n          ports:\n            - containerPort: {port}\n          env:\n            - name: SERVER_PORT\n              value: \"{port}\"{store_env}\n",
            name = record.name,
            port = record.port,
            store_env = store_env
        )
    }

    pub fn app_service(record: &ProjectRecord) -> String {
        format!(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: {name}\n  labels:\n    app: {name}\nspec:\n  selector:\n    app: {name}\n  ports:\n    - port: {port}\n      targetPort: {port}\n",
            name = record.name,
            port = record.port
        )
    }

    pub fn store_credentials(record: &ProjectRecord, secret_name: &str) -> String {
        format!(
            "apiVersion: v1\nkind: Secret\nmetadata:\n  name: {secret_name}\n  labels:\n    app: {name}-store\ntype: Opaque\nstringData:\n  username: {name}\n  password: changeme\n",
            name = record.name,
            secret_name = secret_name
        )
    }

    pub fn store_service(record: &ProjectRecord, service_name: &str) -> String {
        format!(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: {service_name}\n  labels:\n    app: {name}-store\nspec:\n  selector:\n    app: {name}-store\n  ports:\n    - port: 5432\n      targetPort: 5432\n",
            name = record.name,
            service_name = service_name
        )
    }

    pub fn store_deployment(record: &ProjectRecord, workload_name: &str) -> String {
        format!(
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {workload_name}\n  labels:\n    app: {name}-store\nspec:\n  replicas: 1\n  selector:\n    matchLabels:\n      app: {name}-store\n  template:\n    metadata:\n      labels:\n        app: {name}-store\n    spec:\n      containers:\n        - name: store\n          image: postgres:16\n          ports:\n            - containerPort: 5432\n          envFrom:\n            - secretRef:\n                name: {name}-store-credentials\n          volumeMounts:\n            - name: data\n              mountPath: /var/lib/postgresql/data\n      volumes:\n        - name: data\n          persistentVolumeClaim:\n            claimName: {name}-store-data\n",
            name = record.name,
            workload_name = workload_name
        )
    }
}
