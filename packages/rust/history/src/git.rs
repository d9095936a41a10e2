//! Git-backed [`VersionControl`].
//!
//! `git2::Repository` is not `Sync`, so the handle stores only the repository
//! location and opens a fresh repository per log lookup. That lets concurrent
//! article tasks read history without contending on a shared lock.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use git2::{ErrorCode, Oid, Repository, Sort, Status, StatusOptions};
use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use bock_shared::{BockError, Result};

use crate::{CommitRecord, VersionControl};

/// A git repository rooted at the article root.
pub struct GitRepository {
    /// Where history is read from: the root itself or a private clone.
    repo_dir: PathBuf,
    /// Root-relative paths the working tree reports as untracked.
    untracked: HashSet<String>,
    /// Keeps the private clone alive for the lifetime of the handle.
    _clone: Option<TempDir>,
}

impl GitRepository {
    /// Open the repository at `root`.
    ///
    /// With `on_disk` false, history is read from a throwaway bare clone so
    /// that the working repository is never touched during the run. Working
    /// tree status always comes from `root`.
    #[instrument(skip_all, fields(root = %root.display(), on_disk))]
    pub fn open(root: &Path, on_disk: bool) -> Result<Self> {
        let repo = Repository::open(root).map_err(|e| BockError::NotARepository {
            path: root.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let untracked = scan_status(&repo)?;

        let (repo_dir, clone) = if on_disk {
            (root.to_path_buf(), None)
        } else {
            let dir = TempDir::new().map_err(|e| BockError::Git(e.to_string()))?;
            let source = root.to_string_lossy();
            git2::build::RepoBuilder::new()
                .bare(true)
                .clone(&source, dir.path())
                .map_err(git_error)?;
            debug!(clone = %dir.path().display(), "cloned repository");
            (dir.path().to_path_buf(), Some(dir))
        };

        Ok(Self {
            repo_dir,
            untracked,
            _clone: clone,
        })
    }

    /// Number of untracked files in the working tree.
    pub fn untracked_count(&self) -> usize {
        self.untracked.len()
    }
}

impl VersionControl for GitRepository {
    fn is_untracked(&self, relative_path: &str) -> bool {
        self.untracked.contains(relative_path)
    }

    fn log_for_path(&self, relative_path: &str) -> Result<Vec<CommitRecord>> {
        let repo = Repository::open(&self.repo_dir).map_err(git_error)?;

        // A repository without commits has no history for anything.
        match repo.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(git_error(e)),
        }

        let mut walk = repo.revwalk().map_err(git_error)?;
        walk.push_head().map_err(git_error)?;
        walk.set_sorting(Sort::TIME).map_err(git_error)?;

        let path = Path::new(relative_path);
        let mut records = Vec::new();

        for oid in walk {
            let oid = oid.map_err(git_error)?;
            match inspect_commit(&repo, oid, path) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!(commit = %oid, path = relative_path, error = %e, "unreadable commit, skipping");
                }
            }
        }

        Ok(records)
    }
}

/// The log record for `oid` if it changed `path`, `None` if it did not.
///
/// A parent whose tree cannot be read counts as a change, so one missing
/// object only costs the commit that owns it.
fn inspect_commit(repo: &Repository, oid: Oid, path: &Path) -> Result<Option<CommitRecord>> {
    let commit = repo.find_commit(oid).map_err(git_error)?;

    let Some(blob) = blob_id_at(&commit, path)? else {
        return Ok(None);
    };

    let unchanged = commit.parent_count() > 0
        && commit
            .parents()
            .all(|parent| matches!(blob_id_at(&parent, path), Ok(Some(id)) if id == blob));
    if unchanged {
        return Ok(None);
    }

    let author = commit.author();
    let Some(when) = Utc.timestamp_opt(author.when().seconds(), 0).single() else {
        warn!(commit = %oid, "commit time out of range, skipping");
        return Ok(None);
    };

    // Non UTF-8 bytes are replaced rather than losing the revision.
    let content = repo
        .find_blob(blob)
        .ok()
        .map(|b| String::from_utf8_lossy(b.content()).into_owned());

    Ok(Some(CommitRecord {
        id: oid.to_string(),
        author_name: author.name().unwrap_or_default().to_string(),
        author_email: author.email().unwrap_or_default().to_string(),
        when,
        subject: commit.summary().unwrap_or_default().to_string(),
        content,
    }))
}

/// Collect untracked paths and warn when the working tree has other changes.
fn scan_status(repo: &Repository) -> Result<HashSet<String>> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut options)).map_err(git_error)?;

    let mut untracked = HashSet::new();
    let mut dirty = 0usize;

    for entry in statuses.iter() {
        let status = entry.status();
        let Some(path) = entry.path() else { continue };

        if status.is_wt_new() {
            untracked.insert(path.to_string());
        } else if status != Status::CURRENT && !status.is_ignored() {
            dirty += 1;
        }
    }

    if dirty > 0 {
        warn!(
            changed = dirty,
            "working tree has uncommitted changes, history reflects committed content only"
        );
    }

    Ok(untracked)
}

fn blob_id_at(commit: &git2::Commit<'_>, path: &Path) -> Result<Option<Oid>> {
    let tree = commit.tree().map_err(git_error)?;
    match tree.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(git_error(e)),
    }
}

fn git_error(e: git2::Error) -> BockError {
    BockError::Git(e.message().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
