//! Article/folder classification over the article root.
//!
//! A valid article is a non-directory whose name carries the document
//! extension, that lives under no dot-prefixed segment, and that no ignore
//! rule matches. Folders are derived from valid articles only.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};
use walkdir::{DirEntry, WalkDir};

use bock_shared::{BockError, Result};

use crate::uri::{has_document_extension, segments};

/// Folder names that never contain articles (assets, scripts, vendored deps).
static IGNORED_FOLDERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(__assets|_assets|\.circleci|\.git|css|img|js|node_modules)$")
        .expect("valid ignored-folders regex")
});

/// The reserved home page is rendered separately, never as a regular article.
static IGNORED_FILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Home\.md$").expect("valid ignored-files regex"));

/// Ignore rules applied to each root-relative path segment.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    extra: Vec<Regex>,
}

impl IgnoreRules {
    /// Build rules from the built-in list plus user-supplied patterns.
    pub fn new(extra_patterns: &[String]) -> Result<Self> {
        let extra = extra_patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| BockError::config(format!("invalid ignore pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { extra })
    }

    fn ignores_folder(&self, name: &str) -> bool {
        name.starts_with('.')
            || IGNORED_FOLDERS.is_match(name)
            || self.extra.iter().any(|r| r.is_match(name))
    }

    fn ignores_file(&self, name: &str) -> bool {
        name.starts_with('.')
            || IGNORED_FILES.is_match(name)
            || self.extra.iter().any(|r| r.is_match(name))
    }

    /// Whether a root-relative file path (as segments) is a valid article.
    pub fn is_article(&self, segments: &[String]) -> bool {
        let Some((file, folders)) = segments.split_last() else {
            return false;
        };

        has_document_extension(file)
            && !self.ignores_file(file)
            && !folders.iter().any(|f| self.ignores_folder(f))
    }
}

/// Output of classifying an article root.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Absolute article paths in traversal order.
    pub articles: Vec<PathBuf>,
    /// Absolute folder paths with at least one article beneath them.
    pub folders: BTreeSet<PathBuf>,
}

/// Walk `root` and classify every entry into articles and folders.
///
/// Any traversal error discards the partial result and fails the walk.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn classify(root: &Path, rules: &IgnoreRules) -> Result<Classification> {
    let mut result = Classification::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_pruned(e, rules));

    for entry in walker {
        let entry = entry.map_err(|e| BockError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !rules.is_article(&segments(path, root)) {
            continue;
        }

        debug!(path = %path.display(), "article");
        add_ancestors(&mut result.folders, path, root);
        result.articles.push(path.to_path_buf());
    }

    info!(
        articles = result.articles.len(),
        folders = result.folders.len(),
        "classification complete"
    );

    Ok(result)
}

/// Skip whole subtrees that can never contain a valid article.
fn is_pruned(entry: &DirEntry, rules: &IgnoreRules) -> bool {
    entry.file_type().is_dir() && rules.ignores_folder(&entry.file_name().to_string_lossy())
}

/// Record every folder from the article's parent up to and including the root.
fn add_ancestors(folders: &mut BTreeSet<PathBuf>, article: &Path, root: &Path) {
    let mut dir = article.parent();
    while let Some(d) = dir {
        folders.insert(d.to_path_buf());
        if d == root {
            break;
        }
        dir = d.parent();
    }
}
