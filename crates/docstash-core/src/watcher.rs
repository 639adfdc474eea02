//! Collection file watcher
//!
//! The cross-context half of the change bus: watches the local collection
//! file and publishes `CrossContext` when another process modifies it.
//! Writes performed by this process are suppressed by comparing the file's
//! content fingerprint against the local store's recorded last write.
//!
//! Watches the parent directory rather than the file itself, because the
//! store commits via temp-file rename and the watched inode would otherwise
//! go stale after the first write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bus::{ChangeBus, ChangeOrigin};
use crate::store::local::{fingerprint, WriteStamp};

/// Handle to a running file watcher task
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the watcher and wait for the task to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn a background task publishing `CrossContext` on foreign file changes
pub fn spawn_watcher(path: PathBuf, stamp: WriteStamp, bus: ChangeBus) -> Result<WatcherHandle> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let file_name = path.file_name().map(|n| n.to_os_string());

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref());
                    if ours {
                        let _ = event_tx.send(());
                    }
                }
                _ => {}
            },
            Err(e) => warn!("Watch error: {}", e),
        }
    })
    .context("Failed to create file watcher")?;

    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create watched directory {:?}", dir))?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {:?}", dir))?;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        // Keep the notify watcher alive for the lifetime of the task
        let _watcher = watcher;

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    match event {
                        Some(()) => {
                            // Coalesce bursts (temp write + rename fire together)
                            while event_rx.try_recv().is_ok() {}

                            if is_foreign_change(&path, &stamp) {
                                debug!("Collection file changed by another process");
                                bus.publish(ChangeOrigin::CrossContext);
                            }
                        }
                        None => break,
                    }
                }
                res = shutdown_rx.changed() => {
                    // A dropped handle closes the channel; stop either way
                    if res.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });

    Ok(WatcherHandle {
        shutdown: shutdown_tx,
        task,
    })
}

/// Whether the file's current contents differ from our own last write
fn is_foreign_change(path: &Path, stamp: &WriteStamp) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => !stamp.matches(fingerprint(&bytes)),
        // Removed or unreadable: something else touched it
        Err(_) => true,
    }
}
