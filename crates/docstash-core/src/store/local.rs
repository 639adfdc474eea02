//! Local project store
//!
//! Persists the entire collection under one file (`projects.json` in the
//! data directory), the device-local equivalent of a single namespaced
//! key-value entry. Every mutation is read-modify-write over the whole
//! collection, committed with an atomic write (temp file, fsync, rename).
//!
//! There is no cross-process locking: if two processes write concurrently,
//! the last write physically committed wins. The change bus and the polling
//! reconciler compensate by driving frequent re-reads.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{RepoError, RepoResult};
use crate::models::Project;
use crate::store::ProjectStore;

/// Fingerprint of the last write this process performed
///
/// Shared with the file watcher so it can tell foreign writes (another
/// process touched the collection file) apart from our own.
#[derive(Clone, Debug, Default)]
pub struct WriteStamp(Arc<AtomicU64>);

impl WriteStamp {
    /// Record the fingerprint of bytes we just committed
    fn record(&self, fingerprint: u64) {
        self.0.store(fingerprint, Ordering::SeqCst);
    }

    /// Whether the given fingerprint matches our last write
    pub fn matches(&self, fingerprint: u64) -> bool {
        self.0.load(Ordering::SeqCst) == fingerprint
    }
}

/// Hash file contents for own-write detection
pub fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Device-local store holding the whole collection in one file
pub struct LocalStore {
    path: PathBuf,
    stamp: WriteStamp,
}

impl LocalStore {
    /// Create a store backed by the given collection file
    ///
    /// The file is created lazily on first write; a missing file reads as
    /// the empty collection.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stamp: WriteStamp::default(),
        }
    }

    /// Path of the collection file (watched for cross-process changes)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle to this store's own-write fingerprint
    pub fn stamp(&self) -> WriteStamp {
        self.stamp.clone()
    }

    /// Read the full collection from disk
    async fn read_collection(&self) -> RepoResult<Vec<Project>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // Created lazily: a missing file is the empty collection
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RepoError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| RepoError::InvalidFormat {
            path: self.path.clone(),
            details: e.to_string(),
        })
    }

    /// Write the full collection back to disk atomically
    async fn write_collection(&self, projects: &[Project]) -> RepoResult<()> {
        let bytes = serde_json::to_vec_pretty(projects)?;
        atomic_write(&self.path, &bytes).await?;
        self.stamp.record(fingerprint(&bytes));
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for LocalStore {
    async fn get_all(&self) -> RepoResult<Vec<Project>> {
        self.read_collection().await
    }

    async fn get(&self, id: Uuid) -> RepoResult<Project> {
        self.read_collection()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound { id })
    }

    async fn put(&self, project: &Project) -> RepoResult<()> {
        let mut projects = self.read_collection().await?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.push(project.clone()),
        }
        self.write_collection(&projects).await
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let mut projects = self.read_collection().await?;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            // Absent id: successful no-op, skip the rewrite
            return Ok(());
        }
        self.write_collection(&projects).await
    }

    async fn clear(&self) -> RepoResult<()> {
        self.write_collection(&[]).await
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.read_collection().await?.iter().any(|p| p.id == id))
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
async fn atomic_write(path: &Path, data: &[u8]) -> RepoResult<()> {
    let write_err = |source| RepoError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file = tokio::fs::File::create(&temp_path).await.map_err(write_err)?;
    file.write_all(data).await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;

    tokio::fs::rename(&temp_path, path).await.map_err(write_err)
}
