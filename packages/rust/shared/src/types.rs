//! Core domain types for the bock content tree.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The document extension recognized as an article (without the dot).
pub const DOCUMENT_EXTENSION: &str = "md";

/// Length of the abbreviated revision identifier.
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Root node
// ---------------------------------------------------------------------------

/// The synthetic root every hierarchy and tree starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootNode {
    pub name: &'static str,
    pub uri: &'static str,
}

/// The one canonical root representation shared by the hierarchy deriver,
/// the tree builder, and the output writer.
pub const ROOT: RootNode = RootNode {
    name: "ROOT",
    uri: "/ROOT",
};

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// Whether an entity is a folder or an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Folder,
    Article,
}

/// One breadcrumb step from the root to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub uri: String,
}

impl HierarchyNode {
    /// The synthetic root breadcrumb.
    pub fn root() -> Self {
        Self {
            name: ROOT.name.to_string(),
            kind: EntityKind::Folder,
            uri: ROOT.uri.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Revisions
// ---------------------------------------------------------------------------

/// One historical version of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub author_email: String,
    pub author_name: String,
    pub date: DateTime<Utc>,
    pub id: String,
    pub short_id: String,
    pub subject: String,
    pub content: String,
}

/// The reconstructed edit history of a single article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleHistory {
    /// Timestamp of the oldest revision.
    pub created: DateTime<Utc>,
    /// Timestamp of the newest revision.
    pub modified: DateTime<Utc>,
    /// Revisions, newest first.
    pub revisions: Vec<Revision>,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A node of the content tree (`tree.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub title: String,
    pub relative_path: String,
    pub uri: String,
    pub size_in_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub is_folder: bool,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// The synthetic root folder node.
    pub fn root() -> Self {
        Self {
            name: ROOT.name.to_string(),
            title: "Root".to_string(),
            relative_path: String::new(),
            uri: ROOT.uri.to_string(),
            size_in_bytes: 0,
            modified: None,
            is_folder: true,
            children: Vec::new(),
        }
    }

    /// Find a direct child by exact name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Count the articles beneath this node.
    pub fn article_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| if c.is_folder { c.article_count() } else { 1 })
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Rendered entities
// ---------------------------------------------------------------------------

/// A materialized article, ready for rendering and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub uri: String,
    pub hierarchy: Vec<HierarchyNode>,
    pub size_in_bytes: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub html: String,
    pub source: String,
    pub untracked: bool,
    pub revisions: Vec<Revision>,
    /// Absolute source path; never serialized.
    #[serde(skip)]
    pub path: PathBuf,
}

/// Direct children of a folder, one level deep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderChildren {
    pub articles: Vec<HierarchyNode>,
    pub folders: Vec<HierarchyNode>,
}

/// A materialized folder page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub title: String,
    pub uri: String,
    pub hierarchy: Vec<HierarchyNode>,
    pub children: FolderChildren,
    pub readme: String,
    #[serde(skip)]
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Run metadata
// ---------------------------------------------------------------------------

/// Aggregate counters for one generation run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    pub article_count: usize,
    pub folder_count: usize,
    pub revision_count: usize,
    pub untracked_count: usize,
    pub is_repository: bool,
    pub generate_database: bool,
    pub generate_json: bool,
    pub generate_raw: bool,
    pub generate_revisions: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunMeta {
    /// Elapsed time rounded to milliseconds below one second, seconds above.
    pub fn elapsed_rounded(&self) -> Duration {
        round_duration(self.elapsed)
    }
}

fn round_duration(d: Duration) -> Duration {
    if d.as_millis() >= 1000 {
        Duration::from_secs((d.as_millis() as u64 + 500) / 1000)
    } else {
        Duration::from_millis((d.as_micros() as u64 + 500) / 1000)
    }
}
