//! Project command handlers

use anyhow::{Context, Result};
use uuid::Uuid;

use docstash_core::{sort_newest_first, DocumentKind, Project};

use crate::output::Output;
use crate::App;

/// Create a new project
pub async fn create(
    app: &App,
    title: String,
    description: Option<String>,
    kind: DocumentKind,
    output: &Output,
) -> Result<()> {
    let mut project = Project::new(title, kind);
    if let Some(desc) = description {
        project.set_description(desc);
    }

    let saved = app
        .repo
        .save(project)
        .await
        .context("Failed to create project")?;

    output.success(&format!("Created project: {}", saved.id));
    output.print_project(&saved);
    Ok(())
}

/// List all projects, newest first
pub async fn list(app: &App, output: &Output) -> Result<()> {
    let mut projects = app.repo.get_all().await?;
    sort_newest_first(&mut projects);
    output.print_projects(&projects);
    Ok(())
}

/// Show a single project
///
/// A missing project is not fatal: report it and fall back to the list,
/// the CLI's safe default view.
pub async fn show(app: &App, id: String, output: &Output) -> Result<()> {
    let uuid = parse_project_id(&id)?;

    match app.repo.get(uuid).await {
        Ok(project) => {
            output.print_project(&project);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            output.error(&format!("Project not found: {}", id));
            list(app, output).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a project by id
///
/// Deletes are idempotent and best-effort: a backend failure is reported
/// without aborting, since the next reconciliation converges anyway.
pub async fn delete(app: &App, id: String, output: &Output) -> Result<()> {
    let uuid = parse_project_id(&id)?;

    match app.repo.delete(uuid).await {
        Ok(()) => output.success(&format!("Deleted project: {}", id)),
        Err(e) => {
            tracing::error!("Failed to delete project {}: {}", id, e);
            output.error(&format!("Failed to delete project: {}", e));
        }
    }
    Ok(())
}

/// Remove every project in the active backend
pub async fn clear(app: &App, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() && !confirm("Remove ALL projects?")? {
        output.error("Aborted.");
        return Ok(());
    }

    match app.repo.clear().await {
        Ok(()) => output.success("Removed all projects"),
        Err(e) => {
            tracing::error!("Failed to clear projects: {}", e);
            output.error(&format!("Failed to clear projects: {}", e));
        }
    }
    Ok(())
}

/// Parse a project id argument
fn parse_project_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid project ID: {}", id))
}

/// Ask a yes/no question on stdin
fn confirm(question: &str) -> Result<bool> {
    use std::io::{self, Write};

    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}
