//! Migrate command handler

use anyhow::{Context, Result};

use crate::output::{Output, OutputFormat};
use crate::App;

/// Copy local projects into the remote store
///
/// Safe to run repeatedly: already-migrated records are skipped and a
/// record that failed last time is picked up on the next run.
pub async fn run(app: &App, output: &Output) -> Result<()> {
    let count = app
        .repo
        .migrate_from_local()
        .await
        .context("Migration failed")?;

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "migrated": count }));
        }
        OutputFormat::Quiet => {
            println!("{}", count);
        }
        OutputFormat::Human => {
            if count == 0 {
                println!("Nothing to migrate.");
            } else {
                output.success(&format!("Migrated {} project(s) to the remote store", count));
            }
        }
    }
    Ok(())
}
