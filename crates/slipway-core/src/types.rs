//! Shared types for slipway-core.
//!
//! These types are used by the metadata store, the orchestrators and the
//! HTTP/CLI layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current metadata schema version. Bump when adding fields to
/// [`ProjectRecord`]; new fields must carry `#[serde(default)]` so older
/// records keep deserializing.
pub const RECORD_SCHEMA_VERSION: u32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// How a project persists data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceMode {
    /// No backing store; only the application workload is provisioned.
    #[default]
    None,
    /// A stateful store (database workload, endpoint, credential and volume)
    /// is provisioned before the application.
    StatefulStore,
}

/// Lifecycle stage recorded at creation time. Informational only; no code
/// path branches on it (the record is write-once).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleStage {
    #[default]
    Created,
    Deployed,
    TornDown,
}

/// Persisted per-project record. The single source of truth for where a
/// project's resources went; provisioning and teardown consult it instead of
/// re-deriving placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Unique, DNS-label-safe project name.
    pub name: String,
    /// Target namespace, if one was supplied at creation.
    pub namespace: Option<String>,
    pub owner: String,
    pub description: String,
    pub stage: LifecycleStage,
    pub created_at: DateTime<Utc>,
    pub port: u16,
    pub runtime_version: String,
    pub persistence: PersistenceMode,
    /// Whether provisioning should build a deployable image first.
    #[serde(default)]
    pub build_image: bool,
}

fn default_schema_version() -> u32 {
    RECORD_SCHEMA_VERSION
}

/// Why a creation request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// The name already exists on the repository host.
    HostedRepository,
    /// The name already exists as a local project directory.
    LocalDirectory,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostedRepository => write!(f, "hosted-repository"),
            Self::LocalDirectory => write!(f, "local-directory"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resources
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a declarative cluster resource produced by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Credential,
    StatefulEndpoint,
    StatefulWorkload,
    AppWorkload,
    AppEndpoint,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential => write!(f, "credential"),
            Self::StatefulEndpoint => write!(f, "stateful endpoint"),
            Self::StatefulWorkload => write!(f, "stateful workload"),
            Self::AppWorkload => write!(f, "app workload"),
            Self::AppEndpoint => write!(f, "app endpoint"),
        }
    }
}

/// One named, typed resource description. The manifest is opaque to the
/// orchestrator; it only knows the file to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    /// Cluster-side object name.
    pub name: String,
    /// Manifest file path, relative to the project directory.
    pub manifest: String,
}

/// Ordered list of resources. Order is a hard invariant: stateful resources
/// (credential, endpoint, workload) come before app resources, and the
/// provisioner waits for stateful readiness in between.
pub type ResourceSet = Vec<Resource>;

// ─────────────────────────────────────────────────────────────────────────────
// Cleanup
// ─────────────────────────────────────────────────────────────────────────────

/// Result of one idempotent delete against an external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The object existed and was deleted.
    Deleted,
    /// The object was already gone.
    AlreadyAbsent,
}

impl From<DeleteStatus> for CleanupOutcome {
    fn from(status: DeleteStatus) -> Self {
        match status {
            DeleteStatus::Deleted => CleanupOutcome::Deleted,
            DeleteStatus::AlreadyAbsent => CleanupOutcome::AlreadyAbsent,
        }
    }
}

/// Outcome of one subsystem's delete during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CleanupOutcome {
    /// The resource existed and was deleted.
    Deleted,
    /// The resource was already gone. This is success, not failure.
    AlreadyAbsent,
    /// The subsystem was not attempted (e.g. repository host disabled).
    Skipped,
    /// The delete call itself failed.
    Failed { error: String },
}

impl CleanupOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-subsystem teardown report. Never a bare success/failure boolean: one
/// subsystem failing does not stop the others, and the caller sees each
/// outcome individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub project: String,
    pub namespace: String,
    pub hosted_repository: CleanupOutcome,
    pub app_workload: CleanupOutcome,
    pub app_endpoint: CleanupOutcome,
    pub stateful_workload: CleanupOutcome,
    pub stateful_endpoint: CleanupOutcome,
    pub credential: CleanupOutcome,
    pub volume_claim: CleanupOutcome,
    pub local_artifacts: CleanupOutcome,
}

impl CleanupResult {
    /// True if any subsystem delete failed outright.
    pub fn has_failures(&self) -> bool {
        self.outcomes().iter().any(|o| o.is_failure())
    }

    fn outcomes(&self) -> [&CleanupOutcome; 8] {
        [
            &self.hosted_repository,
            &self.app_workload,
            &self.app_endpoint,
            &self.stateful_workload,
            &self.stateful_endpoint,
            &self.credential,
            &self.volume_claim,
            &self.local_artifacts,
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Types (for creating projects)
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name; must match the DNS label pattern.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    /// Port the application listens on.
    pub port: u16,
    /// Language/runtime version tag (e.g. "21", "3.12").
    pub runtime_version: String,
    #[serde(default)]
    pub persistence: PersistenceMode,
    /// Optional target namespace. Honored when supplied, then validated.
    pub namespace: Option<String>,
    /// Build a deployable image during provisioning.
    #[serde(default)]
    pub build_image: bool,
    /// Skip creating a repository on the host even when the integration is
    /// enabled.
    #[serde(default)]
    pub skip_repository: bool,
}

/// Result of creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    pub success: bool,
    pub name: String,
    /// Files written under the project directory, relative paths.
    pub files: Vec<String>,
    /// URL of the hosted repository, when one was created.
    pub repository_url: Option<String>,
    /// Literal commands the user should run next, in order.
    pub next_steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_mode_wire_format() {
        let json = serde_json::to_string(&PersistenceMode::StatefulStore).unwrap();
        assert_eq!(json, "\"stateful-store\"");
        let json = serde_json::to_string(&PersistenceMode::None).unwrap();
        assert_eq!(json, "\"none\"");
    }

    #[test]
    fn test_conflict_kind_wire_format() {
        let json = serde_json::to_string(&ConflictKind::HostedRepository).unwrap();
        assert_eq!(json, "\"hosted-repository\"");
        let json = serde_json::to_string(&ConflictKind::LocalDirectory).unwrap();
        assert_eq!(json, "\"local-directory\"");
    }

    #[test]
    fn test_cleanup_outcome_failure_detection() {
        assert!(!CleanupOutcome::Deleted.is_failure());
        assert!(!CleanupOutcome::AlreadyAbsent.is_failure());
        assert!(!CleanupOutcome::Skipped.is_failure());
        assert!(
            CleanupOutcome::Failed {
                error: "boom".to_string()
            }
            .is_failure()
        );
    }

    #[test]
    fn test_project_record_round_trip() {
        let record = ProjectRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            name: "user-service".to_string(),
            namespace: Some("team-a".to_string()),
            owner: "alice".to_string(),
            description: "demo".to_string(),
            stage: LifecycleStage::Created,
            created_at: Utc::now(),
            port: 8080,
            runtime_version: "21".to_string(),
            persistence: PersistenceMode::None,
            build_image: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ProjectRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "user-service");
        assert_eq!(back.persistence, PersistenceMode::None);
    }

    #[test]
    fn test_project_record_missing_schema_version_defaults() {
        // Records written before the schema_version field existed must still load.
        let json = r#"{
            "name": "legacy",
            "namespace": null,
            "owner": "bob",
            "description": "",
            "stage": "created",
            "created_at": "2024-01-01T00:00:00Z",
            "port": 8080,
            "runtime_version": "17",
            "persistence": "none"
        }"#;
        let record: ProjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.schema_version, RECORD_SCHEMA_VERSION);
    }
}
