//! Repository facade
//!
//! The single entry point used by all consumers. Routes each call to the
//! local or remote store based on the session injected at construction, and
//! publishes a change event after every successful mutation.
//!
//! Routing is all-or-nothing per call: a `get_all` never mixes records from
//! both backends, and a failing remote is surfaced as `BackendUnavailable`
//! instead of silently falling back to local - masking where the data lives
//! causes worse bugs than an error does.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::bus::{ChangeBus, ChangeOrigin};
use crate::error::{RepoError, RepoResult};
use crate::migration::MigrationCoordinator;
use crate::models::Project;
use crate::store::ProjectStore;

/// Presence of an authenticated session, injected by the session provider
///
/// An explicit value rather than an ambient global, so routing stays
/// testable without mocking shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No authenticated user; all calls target the local store
    Anonymous,
    /// Authenticated user; all calls target the remote store
    Authenticated,
}

/// Facade over the local and remote project stores
pub struct Repository {
    local: Arc<dyn ProjectStore>,
    remote: Option<Arc<dyn ProjectStore>>,
    session: Session,
    bus: ChangeBus,
}

impl Repository {
    /// Create a repository with explicit routing state
    ///
    /// `remote` may be absent for anonymous use; an authenticated session
    /// without a remote store fails per call with `BackendUnavailable`.
    pub fn new(
        local: Arc<dyn ProjectStore>,
        remote: Option<Arc<dyn ProjectStore>>,
        session: Session,
        bus: ChangeBus,
    ) -> Self {
        Self {
            local,
            remote,
            session,
            bus,
        }
    }

    /// The change bus mutations publish on
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// The session this repository routes by
    pub fn session(&self) -> Session {
        self.session
    }

    /// The store the current session routes to
    fn active(&self) -> RepoResult<&dyn ProjectStore> {
        match self.session {
            Session::Anonymous => Ok(self.local.as_ref()),
            Session::Authenticated => self.remote.as_deref().ok_or_else(|| {
                RepoError::backend("authenticated session but no remote store configured")
            }),
        }
    }

    /// Fetch every project from the active backend, in adapter order
    ///
    /// Sort policy lives in the caller; see `models::sort_newest_first`.
    pub async fn get_all(&self) -> RepoResult<Vec<Project>> {
        self.active()?.get_all().await
    }

    /// Fetch one project, `NotFound` if absent
    pub async fn get(&self, id: Uuid) -> RepoResult<Project> {
        self.active()?.get(id).await
    }

    /// Upsert a project: insert if the id is new, else replace whole-record
    ///
    /// Stamps `updated_at` (never below the incoming value) and rejects
    /// blank titles. Returns the record as stored.
    pub async fn save(&self, mut project: Project) -> RepoResult<Project> {
        if project.title.trim().is_empty() {
            return Err(RepoError::Validation(
                "Project title must not be empty".into(),
            ));
        }

        project.touch();
        self.active()?.put(&project).await?;
        debug!("Saved project {}", project.id);
        self.bus.publish(ChangeOrigin::InProcess);
        Ok(project)
    }

    /// Delete by id; deleting an absent id succeeds
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.active()?.delete(id).await?;
        debug!("Deleted project {}", id);
        self.bus.publish(ChangeOrigin::InProcess);
        Ok(())
    }

    /// Remove every project in the active backend
    pub async fn clear(&self) -> RepoResult<()> {
        self.active()?.clear().await?;
        debug!("Cleared active project store");
        self.bus.publish(ChangeOrigin::InProcess);
        Ok(())
    }

    /// Copy local records into the remote store, returning the count moved
    ///
    /// Safe to invoke at any time without precondition checks; with no
    /// remote configured it is a no-op returning 0.
    pub async fn migrate_from_local(&self) -> RepoResult<usize> {
        match &self.remote {
            Some(remote) => {
                let coordinator = MigrationCoordinator::new(
                    Arc::clone(&self.local),
                    Arc::clone(remote),
                    self.bus.clone(),
                );
                coordinator.migrate_from_local().await
            }
            None => Ok(0),
        }
    }
}
