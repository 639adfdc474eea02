//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use docstash_core::{format_date, Project};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single project with its documents
    pub fn print_project(&self, project: &Project) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", project.id);
                println!("Title:       {}", project.title);
                if !project.description.is_empty() {
                    println!("Description: {}", project.description);
                }
                println!("Kind:        {}", project.kind);
                println!("Created:     {}", format_date(project.created_at));
                println!("Updated:     {}", format_date(project.updated_at));

                if !project.documents.is_empty() {
                    println!();
                    println!("── Documents ({}) ──", project.documents.len());
                    for doc in &project.documents {
                        println!(
                            "[{}] {} - {}",
                            format_date(doc.generated_at),
                            doc.kind,
                            truncate(&doc.content, 60)
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(project).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", project.id);
            }
        }
    }

    /// Print a list of projects
    pub fn print_projects(&self, projects: &[Project]) {
        match self.format {
            OutputFormat::Human => {
                if projects.is_empty() {
                    println!("No projects found.");
                    return;
                }
                for project in projects {
                    let docs_indicator = if project.documents.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", project.documents.len())
                    };
                    println!(
                        "{} | {}{} | {} | {}",
                        &project.id.to_string()[..8],
                        truncate(&project.title, 35),
                        docs_indicator,
                        project.kind,
                        format_date(project.updated_at)
                    );
                }
                println!("\n{} project(s)", projects.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(projects).unwrap());
            }
            OutputFormat::Quiet => {
                for project in projects {
                    println!("{}", project.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a non-fatal error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("✗ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "error", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// Truncate a string to a maximum width, collapsing newlines
fn truncate(s: &str, max: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
