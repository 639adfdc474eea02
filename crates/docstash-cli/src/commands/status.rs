//! Status command handler

use anyhow::Result;

use docstash_core::{Config, Session};

use crate::output::{Output, OutputFormat};
use crate::App;

/// Show backend routing and storage status
pub async fn show(app: &App, config: &Config, output: &Output) -> Result<()> {
    let backend = match app.repo.session() {
        Session::Anonymous => "local",
        Session::Authenticated => "remote",
    };

    // Count is best-effort; an unreachable remote should not kill status
    let count = app.repo.get_all().await.map(|p| p.len());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": backend,
                    "remote_url": config.remote_url,
                    "authenticated": config.auth_token.is_some(),
                    "projects_path": config.projects_path(),
                    "poll_interval_ms": config.poll_interval_ms,
                    "project_count": count.ok(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", backend);
        }
        OutputFormat::Human => {
            println!("docstash Status");
            println!("===============");
            println!();
            println!("Routing:");
            println!("  Active backend: {}", backend);
            if let Some(ref url) = config.remote_url {
                println!("  Remote URL:     {}", url);
            }
            println!();
            println!("Storage:");
            println!("  Collection file: {}", config.projects_path().display());
            println!("  Poll interval:   {}ms", config.poll_interval_ms);
            println!();
            match count {
                Ok(n) => println!("{} project(s)", n),
                Err(e) => output.error(&format!("Could not count projects: {}", e)),
            }
        }
    }
    Ok(())
}
