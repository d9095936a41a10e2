//! Article revision history from version control.
//!
//! This crate provides:
//! - [`VersionControl`]: the log/status capability the extractor consumes
//! - [`extract_history`]: reduce a path's log into an [`ArticleHistory`]
//! - [`git::GitRepository`]: the git-backed implementation

pub mod git;

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use bock_shared::{ArticleHistory, BockError, Result, Revision, SHORT_ID_LEN};

pub use git::GitRepository;

/// One commit touching a path, as reported by the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub when: DateTime<Utc>,
    pub subject: String,
    /// File content as of this commit; `None` if it could not be read.
    pub content: Option<String>,
}

/// Read-only view of a version-controlled article root.
pub trait VersionControl: Send + Sync {
    /// Whether the working tree reports `relative_path` as untracked.
    fn is_untracked(&self, relative_path: &str) -> bool;

    /// Every commit touching `relative_path`, in log order.
    fn log_for_path(&self, relative_path: &str) -> Result<Vec<CommitRecord>>;
}

/// Reconstruct the edit history of one article.
///
/// Fails with [`BockError::Untracked`] both when the working tree reports the
/// file as untracked (no log lookup is made) and when the log has no usable
/// entry for it.
#[instrument(skip_all, fields(path = %article_path.display()))]
pub fn extract_history(
    article_path: &Path,
    root: &Path,
    vcs: &dyn VersionControl,
) -> Result<ArticleHistory> {
    let relative = bock_content::relative_path(article_path, root);

    if vcs.is_untracked(&relative) {
        return Err(BockError::Untracked(relative));
    }

    let mut seen = HashSet::new();
    let mut revisions = Vec::new();

    for record in vcs.log_for_path(&relative)? {
        if !seen.insert(record.id.clone()) {
            continue;
        }

        let Some(content) = record.content else {
            warn!(commit = %record.id, path = %relative, "could not read file contents, skipping revision");
            continue;
        };

        revisions.push(Revision {
            author_email: record.author_email,
            author_name: record.author_name,
            date: record.when,
            short_id: record.id.chars().take(SHORT_ID_LEN).collect(),
            id: record.id,
            subject: record.subject,
            content,
        });
    }

    // Stable: equal timestamps keep log order.
    revisions.sort_by(|a, b| b.date.cmp(&a.date));

    let (Some(newest), Some(oldest)) = (revisions.first(), revisions.last()) else {
        return Err(BockError::Untracked(relative));
    };

    debug!(revisions = revisions.len(), "history extracted");

    Ok(ArticleHistory {
        created: oldest.date,
        modified: newest.date,
        revisions,
    })
}
