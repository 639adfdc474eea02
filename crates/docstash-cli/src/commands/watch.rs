//! Watch command handler
//!
//! A live view over the collection: subscribes to the change bus, runs the
//! file watcher and the polling reconciler, and reprints whenever the
//! observed collection actually changes. Runs until Ctrl-C.

use anyhow::{Context, Result};

use docstash_core::{
    format_date, sort_newest_first, spawn_reconciler, spawn_watcher, ChangeOrigin, Config, Project,
};

use crate::output::Output;
use crate::App;

pub async fn run(app: &App, config: &Config, output: &Output) -> Result<()> {
    let bus = app.repo.bus().clone();

    let watcher = spawn_watcher(
        app.local.path().to_path_buf(),
        app.local.stamp(),
        bus.clone(),
    )
    .context("Failed to start file watcher")?;
    let reconciler = spawn_reconciler(config.poll_interval(), bus.clone());

    let mut sub = bus.subscribe();
    let mut last: Option<Vec<Project>> = None;
    refresh(app, output, &mut last, None).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = sub.recv() => {
                match event {
                    Some(event) => refresh(app, output, &mut last, Some(event.origin)).await,
                    None => break,
                }
            }
        }
    }

    // Drop the subscription first: nothing delivered past this point is
    // ever applied to the view.
    drop(sub);
    reconciler.shutdown().await;
    watcher.shutdown().await;
    Ok(())
}

/// Re-fetch and reprint, skipping refreshes where nothing changed
///
/// The reconciler fires unconditionally, so unchanged refreshes are the
/// common case; comparing against the last printed snapshot keeps the
/// output readable.
async fn refresh(
    app: &App,
    output: &Output,
    last: &mut Option<Vec<Project>>,
    origin: Option<ChangeOrigin>,
) {
    let mut projects = match app.repo.get_all().await {
        Ok(projects) => projects,
        Err(e) => {
            output.error(&format!("Refresh failed: {}", e));
            return;
        }
    };
    sort_newest_first(&mut projects);

    if last.as_ref() == Some(&projects) {
        return;
    }

    if !output.is_quiet() && !output.is_json() {
        let origin = match origin {
            Some(ChangeOrigin::InProcess) => "this process",
            Some(ChangeOrigin::CrossContext) => "another process",
            Some(ChangeOrigin::Reconciler) => "reconciler",
            None => "initial",
        };
        println!();
        println!(
            "── {} ({}) ──",
            format_date(chrono::Utc::now()),
            origin
        );
    }
    output.print_projects(&projects);
    *last = Some(projects);
}
