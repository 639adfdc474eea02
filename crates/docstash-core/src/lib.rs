//! docstash core library
//!
//! Persistence and synchronization layer for documentation projects, kept
//! consistent across a device-local store and an optional authenticated
//! remote store, and across multiple concurrently running consumers.
//!
//! # Architecture
//!
//! - **Local store**: the whole collection in one file, rewritten atomically
//!   per mutation; last physical write wins across processes.
//! - **Remote store**: per-user HTTP collection, one record per project id.
//! - **Repository**: the single facade; routes by the injected session and
//!   publishes a change event after every successful mutation.
//! - **Migration**: idempotent, id-preserving copy of local records into the
//!   remote once a session is authenticated.
//! - **Change bus + watcher + reconciler**: in-process publishes,
//!   cross-process file watching, and a fixed-interval polling safety net
//!   keep every live view converging on the latest persisted state.
//!
//! # Quick Start
//!
//! ```text
//! let local = Arc::new(LocalStore::new(config.projects_path()));
//! let repo = Repository::new(local, None, Session::Anonymous, ChangeBus::new());
//!
//! let project = repo.save(Project::new("Checkout flow", DocumentKind::Prd)).await?;
//! let mut projects = repo.get_all().await?;
//! sort_newest_first(&mut projects);
//! ```
//!
//! # Modules
//!
//! - `repository`: facade and session routing (main entry point)
//! - `models`: Project, Document, and display helpers
//! - `store`: the `ProjectStore` seam and both adapters
//! - `migration`: local-to-remote migration coordinator
//! - `bus`: change notification publish-subscribe
//! - `watcher`: cross-process file change signal
//! - `reconciler`: polling safety net
//! - `config`: application configuration

pub mod bus;
pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod reconciler;
pub mod repository;
pub mod store;
pub mod watcher;

pub use bus::{ChangeBus, ChangeEvent, ChangeOrigin, ChangeSubscription};
pub use config::Config;
pub use error::{RepoError, RepoResult};
pub use migration::MigrationCoordinator;
pub use models::{format_date, sort_newest_first, Document, DocumentKind, Project};
pub use reconciler::{spawn_reconciler, ReconcilerHandle};
pub use repository::{Repository, Session};
pub use store::{LocalStore, ProjectStore, RemoteStore};
pub use watcher::{spawn_watcher, WatcherHandle};
