//! Conflict guard.
//!
//! Checks whether a requested project name is already taken before any side
//! effect happens. The remote check runs first because it is authoritative
//! across restarts; the local check only catches state from the current
//! machine. No side effects.

use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::repohost::RepoHostClient;
use crate::types::ConflictKind;
use std::sync::Arc;
use tracing::debug;

/// Pre-creation conflict check.
pub struct ConflictGuard {
    /// `None` when the repository host integration is disabled; only then is
    /// the remote check skipped.
    repo_host: Option<Arc<dyn RepoHostClient>>,
    store: MetadataStore,
}

impl ConflictGuard {
    pub fn new(repo_host: Option<Arc<dyn RepoHostClient>>, store: MetadataStore) -> Self {
        Self { repo_host, store }
    }

    /// Check a candidate name. `Ok(None)` means clear. A remote-check
    /// failure surfaces as an error when the integration is enabled: an
    /// ambiguous remote state must never be treated as "clear".
    pub async fn check(&self, name: &str) -> Result<Option<ConflictKind>> {
        if let Some(host) = &self.repo_host {
            if host.repo_exists(name).await? {
                debug!("Conflict for '{}': repository already hosted", name);
                return Ok(Some(ConflictKind::HostedRepository));
            }
        }

        if self.store.project_dir_exists(name) {
            debug!("Conflict for '{}': local directory exists", name);
            return Ok(Some(ConflictKind::LocalDirectory));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::DeleteStatus;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct StubHost {
        exists: bool,
        fail: bool,
    }

    #[async_trait]
    impl RepoHostClient for StubHost {
        async fn repo_exists(&self, _name: &str) -> Result<bool> {
            if self.fail {
                return Err(Error::RepoHost("connection refused".to_string()));
            }
            Ok(self.exists)
        }

        async fn create_repo(&self, _name: &str, _description: &str) -> Result<String> {
            unreachable!("conflict guard never creates repositories")
        }

        async fn delete_repo(&self, _name: &str) -> Result<DeleteStatus> {
            unreachable!("conflict guard never deletes repositories")
        }
    }

    #[tokio::test]
    async fn test_clear_when_nothing_exists() {
        let dir = tempdir().unwrap();
        let guard = ConflictGuard::new(
            Some(Arc::new(StubHost {
                exists: false,
                fail: false,
            })),
            MetadataStore::new(dir.path()),
        );

        assert_eq!(guard.check("fresh").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remote_conflict_wins_over_local() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("taken")).unwrap();
        let guard = ConflictGuard::new(
            Some(Arc::new(StubHost {
                exists: true,
                fail: false,
            })),
            MetadataStore::new(dir.path()),
        );

        // Both exist; the remote kind is reported because it is checked first.
        assert_eq!(
            guard.check("taken").await.unwrap(),
            Some(ConflictKind::HostedRepository)
        );
    }

    #[tokio::test]
    async fn test_local_conflict() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("local-only")).unwrap();
        let guard = ConflictGuard::new(
            Some(Arc::new(StubHost {
                exists: false,
                fail: false,
            })),
            MetadataStore::new(dir.path()),
        );

        assert_eq!(
            guard.check("local-only").await.unwrap(),
            Some(ConflictKind::LocalDirectory)
        );
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces_when_enabled() {
        let dir = tempdir().unwrap();
        let guard = ConflictGuard::new(
            Some(Arc::new(StubHost {
                exists: false,
                fail: true,
            })),
            MetadataStore::new(dir.path()),
        );

        assert!(guard.check("whatever").await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_integration_skips_remote_check() {
        let dir = tempdir().unwrap();
        let guard = ConflictGuard::new(None, MetadataStore::new(dir.path()));

        // No remote client at all: only the local check runs.
        assert_eq!(guard.check("fresh").await.unwrap(), None);
    }
}
