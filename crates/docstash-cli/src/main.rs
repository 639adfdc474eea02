//! docstash CLI
//!
//! Command-line interface for docstash - documentation project management
//! with a local-first store and optional authenticated remote.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docstash_core::{
    ChangeBus, Config, DocumentKind, LocalStore, ProjectStore, RemoteStore, Repository, Session,
};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "docstash")]
#[command(about = "docstash - Local-first documentation project management")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    #[command(alias = "add")]
    Create {
        /// Project title
        title: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// Document kind (prd, design-prompt, user-stories, specs)
        #[arg(short, long, default_value = "prd")]
        kind: DocumentKind,
    },
    /// List all projects, newest first
    #[command(alias = "ls")]
    List,
    /// Show project details
    Show {
        /// Project ID
        id: String,
    },
    /// Delete a project
    #[command(alias = "rm")]
    Delete {
        /// Project ID
        id: String,
    },
    /// Remove all projects in the active backend
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Copy local projects into the remote store
    Migrate,
    /// Watch the collection and reprint on every change
    Watch,
    /// Show backend routing and storage status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, remote_url, auth_token, poll_interval_ms)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Wiring shared by every command that touches the stores
pub struct App {
    pub local: Arc<LocalStore>,
    pub repo: Repository,
}

impl App {
    /// Build stores and facade from configuration
    ///
    /// A present auth token means the external session provider handed us an
    /// authenticated session; repository calls then route to the remote.
    fn from_config(config: &Config) -> Self {
        let local = Arc::new(LocalStore::new(config.projects_path()));

        let session = if config.auth_token.is_some() {
            Session::Authenticated
        } else {
            Session::Anonymous
        };

        // A remote without a token could only fail auth, so it needs both
        let remote: Option<Arc<dyn ProjectStore>> =
            match (&config.remote_url, &config.auth_token) {
                (Some(url), Some(token)) => Some(Arc::new(RemoteStore::new(
                    url.clone(),
                    token.clone(),
                )) as Arc<dyn ProjectStore>),
                _ => None,
            };

        let repo = Repository::new(local.clone(), remote, session, ChangeBus::new());
        Self { local, repo }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the stores
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load()?;
    let app = App::from_config(&config);

    match cli.command {
        Commands::Create {
            title,
            description,
            kind,
        } => commands::project::create(&app, title, description, kind, &output).await,
        Commands::List => commands::project::list(&app, &output).await,
        Commands::Show { id } => commands::project::show(&app, id, &output).await,
        Commands::Delete { id } => commands::project::delete(&app, id, &output).await,
        Commands::Clear { yes } => commands::project::clear(&app, yes, &output).await,
        Commands::Migrate => commands::migrate::run(&app, &output).await,
        Commands::Watch => commands::watch::run(&app, &config, &output).await,
        Commands::Status => commands::status::show(&app, &config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(temp_dir: &tempfile::TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            remote_url: None,
            auth_token: None,
            poll_interval_ms: 1000,
        }
    }

    #[tokio::test]
    async fn test_remote_url_without_token_stays_local() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.remote_url = Some("https://api.example.com".to_string());

        let app = App::from_config(&config);
        assert_eq!(app.repo.session(), Session::Anonymous);
        // No remote store is wired, so there is nowhere to migrate to
        assert_eq!(app.repo.migrate_from_local().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_token_without_remote_url_has_no_remote() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.auth_token = Some("token-123".to_string());

        let app = App::from_config(&config);
        assert_eq!(app.repo.session(), Session::Authenticated);
        // Authenticated routing with no remote surfaces as unavailable
        assert!(app.repo.get_all().await.is_err());
    }
}
