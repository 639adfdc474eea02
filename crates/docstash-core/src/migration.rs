//! Local-to-remote migration
//!
//! One-shot, opportunistic copy of local records into the remote store once
//! a session becomes authenticated. Runs as an independent background step
//! that may interleave with ordinary reads and writes; a transient window
//! where an id is visible in one backend but not yet the other is expected
//! and self-heals on the next reconciliation pass.

use std::sync::Arc;

use tracing::{info, warn};

use crate::bus::{ChangeBus, ChangeOrigin};
use crate::error::RepoResult;
use crate::store::ProjectStore;

/// Copies records from a source store into a target store, id-preserving
pub struct MigrationCoordinator {
    source: Arc<dyn ProjectStore>,
    target: Arc<dyn ProjectStore>,
    bus: ChangeBus,
}

impl MigrationCoordinator {
    pub fn new(
        source: Arc<dyn ProjectStore>,
        target: Arc<dyn ProjectStore>,
        bus: ChangeBus,
    ) -> Self {
        Self {
            source,
            target,
            bus,
        }
    }

    /// Migrate every source record absent from the target
    ///
    /// Per record: check existence in the target by id; if absent, insert a
    /// verbatim copy (identical id, content, and timestamps); if present,
    /// skip. Returns the number actually inserted.
    ///
    /// - Idempotent: a second run with no new source records returns 0.
    /// - Partial-failure tolerant: one record failing is logged and skipped,
    ///   the rest of the batch is still attempted, and the failed record
    ///   stays eligible next run.
    /// - Non-destructive: the source is never mutated or deleted.
    pub async fn migrate_from_local(&self) -> RepoResult<usize> {
        // If the source itself cannot be enumerated there is nothing to
        // isolate - nothing has been copied yet, so the error is the result.
        let records = self.source.get_all().await?;
        let total = records.len();
        let mut migrated = 0;

        for project in records {
            match self.target.exists(project.id).await {
                Ok(true) => continue,
                Ok(false) => match self.target.put(&project).await {
                    Ok(()) => migrated += 1,
                    Err(e) => {
                        warn!("Failed to migrate project {}: {}", project.id, e);
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to check remote existence of project {}: {}",
                        project.id, e
                    );
                }
            }
        }

        info!("Migrated {} of {} local projects", migrated, total);
        if migrated > 0 {
            self.bus.publish(ChangeOrigin::InProcess);
        }
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RepoError, RepoResult};
    use crate::models::{DocumentKind, Project};
    use crate::store::LocalStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn store(dir: &TempDir) -> Arc<LocalStore> {
        Arc::new(LocalStore::new(dir.path().join("projects.json")))
    }

    /// Store double whose `put` fails once for one specific id
    struct FlakyStore {
        inner: Arc<LocalStore>,
        failing_id: Uuid,
        tripped: AtomicBool,
    }

    #[async_trait]
    impl ProjectStore for FlakyStore {
        async fn get_all(&self) -> RepoResult<Vec<Project>> {
            self.inner.get_all().await
        }

        async fn get(&self, id: Uuid) -> RepoResult<Project> {
            self.inner.get(id).await
        }

        async fn put(&self, project: &Project) -> RepoResult<()> {
            if project.id == self.failing_id && !self.tripped.swap(true, Ordering::SeqCst) {
                return Err(RepoError::backend("simulated insert failure"));
            }
            self.inner.put(project).await
        }

        async fn delete(&self, id: Uuid) -> RepoResult<()> {
            self.inner.delete(id).await
        }

        async fn clear(&self) -> RepoResult<()> {
            self.inner.clear().await
        }

        async fn exists(&self, id: Uuid) -> RepoResult<bool> {
            self.inner.exists(id).await
        }
    }

    #[tokio::test]
    async fn test_migrates_all_absent_records() {
        let (src_dir, dst_dir) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let source = store(&src_dir);
        let target = store(&dst_dir);

        let a = Project::new("A", DocumentKind::Prd);
        let b = Project::new("B", DocumentKind::Specs);
        source.put(&a).await.unwrap();
        source.put(&b).await.unwrap();

        let coordinator =
            MigrationCoordinator::new(source.clone(), target.clone(), ChangeBus::new());
        assert_eq!(coordinator.migrate_from_local().await.unwrap(), 2);

        // Verbatim copies: identical ids and timestamps, never regenerated
        let copied = target.get(a.id).await.unwrap();
        assert_eq!(copied, a);
        assert!(target.exists(b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let (src_dir, dst_dir) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let source = store(&src_dir);
        let target = store(&dst_dir);

        source
            .put(&Project::new("Once", DocumentKind::Prd))
            .await
            .unwrap();

        let coordinator =
            MigrationCoordinator::new(source.clone(), target.clone(), ChangeBus::new());
        assert_eq!(coordinator.migrate_from_local().await.unwrap(), 1);
        assert_eq!(coordinator.migrate_from_local().await.unwrap(), 0);

        // No duplicate remote ids
        assert_eq!(target.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_recovery() {
        let (src_dir, dst_dir) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let source = store(&src_dir);

        let first = Project::new("First", DocumentKind::Prd);
        let second = Project::new("Second", DocumentKind::Prd);
        let third = Project::new("Third", DocumentKind::Prd);
        source.put(&first).await.unwrap();
        source.put(&second).await.unwrap();
        source.put(&third).await.unwrap();

        // Target fails inserting the second record, once
        let target = Arc::new(FlakyStore {
            inner: store(&dst_dir),
            failing_id: second.id,
            tripped: AtomicBool::new(false),
        });

        let coordinator =
            MigrationCoordinator::new(source.clone(), target.clone(), ChangeBus::new());

        // First pass: the failure does not abort the batch
        assert_eq!(coordinator.migrate_from_local().await.unwrap(), 2);
        assert!(target.exists(first.id).await.unwrap());
        assert!(!target.exists(second.id).await.unwrap());
        assert!(target.exists(third.id).await.unwrap());

        // Second pass migrates exactly the previously-failed record
        assert_eq!(coordinator.migrate_from_local().await.unwrap(), 1);
        assert_eq!(target.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_source_is_never_mutated() {
        let (src_dir, dst_dir) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let source = store(&src_dir);
        let target = store(&dst_dir);

        let project = Project::new("Durable", DocumentKind::UserStories);
        source.put(&project).await.unwrap();
        let before = source.get_all().await.unwrap();

        let coordinator =
            MigrationCoordinator::new(source.clone(), target.clone(), ChangeBus::new());
        coordinator.migrate_from_local().await.unwrap();

        assert_eq!(source.get_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_publishes_once_only_when_something_moved() {
        let (src_dir, dst_dir) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let source = store(&src_dir);
        let target = store(&dst_dir);
        source
            .put(&Project::new("Mover", DocumentKind::Prd))
            .await
            .unwrap();

        let bus = ChangeBus::new();
        let mut sub = bus.subscribe();
        let coordinator = MigrationCoordinator::new(source.clone(), target.clone(), bus.clone());

        coordinator.migrate_from_local().await.unwrap();
        assert!(sub.recv().await.is_some());

        // Second run moves nothing and stays silent
        coordinator.migrate_from_local().await.unwrap();
        bus.publish(ChangeOrigin::Reconciler); // sentinel
        assert_eq!(sub.recv().await.unwrap().origin, ChangeOrigin::Reconciler);
    }
}
