//! Storage layer
//!
//! Two adapters behind one seam:
//!
//! - **Local**: the whole project collection serialized into a single file,
//!   rewritten on every mutation.
//! - **Remote**: an authenticated per-user HTTP collection, one addressable
//!   record per project id.
//!
//! The repository facade, the migration coordinator, and test doubles all
//! talk through [`ProjectStore`]. Adapters never stamp timestamps - `put` is
//! a verbatim upsert, which is what lets migration copy records without
//! touching `updated_at`.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepoResult;
use crate::models::Project;

/// Uniform CRUD contract over a project backend
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Fetch every project, in no guaranteed order
    async fn get_all(&self) -> RepoResult<Vec<Project>>;

    /// Fetch one project by id, `NotFound` if absent
    async fn get(&self, id: Uuid) -> RepoResult<Project>;

    /// Insert or replace a project verbatim (no timestamp stamping)
    async fn put(&self, project: &Project) -> RepoResult<()>;

    /// Delete by id; deleting an absent id is a successful no-op
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// Remove every project in this backend
    async fn clear(&self) -> RepoResult<()>;

    /// Whether a project with this id exists, without fetching its body
    async fn exists(&self, id: Uuid) -> RepoResult<bool>;
}

pub use local::{LocalStore, WriteStamp};
pub use remote::RemoteStore;
