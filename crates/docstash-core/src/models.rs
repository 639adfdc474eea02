//! Data models for docstash
//!
//! Defines the core data structures: Project and its generated Documents.
//! Projects are persisted whole-record; there is no partial-field patch API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of documentation a project (or a single document) holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Product requirements document
    Prd,
    /// Design prompt
    DesignPrompt,
    /// User stories
    UserStories,
    /// Technical specifications
    Specs,
}

impl DocumentKind {
    /// All known kinds, for CLI help text
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Prd,
        DocumentKind::DesignPrompt,
        DocumentKind::UserStories,
        DocumentKind::Specs,
    ];
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Prd => "prd",
            DocumentKind::DesignPrompt => "design-prompt",
            DocumentKind::UserStories => "user-stories",
            DocumentKind::Specs => "specs",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prd" => Ok(DocumentKind::Prd),
            "design-prompt" | "design_prompt" => Ok(DocumentKind::DesignPrompt),
            "user-stories" | "user_stories" => Ok(DocumentKind::UserStories),
            "specs" => Ok(DocumentKind::Specs),
            other => Err(format!(
                "Unknown document kind '{}'. Expected one of: prd, design-prompt, user-stories, specs",
                other
            )),
        }
    }
}

/// A generated content artifact attached to a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: Uuid,
    /// What kind of document this is
    pub kind: DocumentKind,
    /// The generated content
    pub content: String,
    /// When this document was generated
    pub generated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with the given kind and content
    pub fn new(kind: DocumentKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            generated_at: Utc::now(),
        }
    }
}

/// A documentation project - the unit of persistence
///
/// `documents` is ordered: insertion order is generation order and is
/// preserved verbatim through every read/write cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier, stable across local and remote backends
    pub id: Uuid,
    /// Display title, never persisted empty
    pub title: String,
    /// Optional longer description, may be empty
    #[serde(default)]
    pub description: String,
    /// Primary document kind for this project
    pub kind: DocumentKind,
    /// Generated documents, in generation order
    #[serde(default)]
    pub documents: Vec<Document>,
    /// When this project was created
    pub created_at: DateTime<Utc>,
    /// When this project was last updated (monotonically non-decreasing)
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a fresh id and initial timestamps
    pub fn new(title: impl Into<String>, kind: DocumentKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            kind,
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a project with a specific id (for loading from storage)
    pub fn with_id(id: Uuid, title: impl Into<String>, kind: DocumentKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            kind,
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Update the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    /// Append a generated document, preserving generation order
    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
        self.touch();
    }

    /// Advance `updated_at` to now, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

/// Format a timestamp for display
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Sort projects newest-first by `updated_at`
///
/// Adapters return no guaranteed order; this is the caller-side sort policy.
pub fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
