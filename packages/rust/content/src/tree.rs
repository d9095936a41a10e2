//! Content tree builder.
//!
//! Folds the flat list of classified articles into a nested folder/article
//! hierarchy that maps to `tree.json`. The tree is built once per run and is
//! read-only afterwards.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use bock_shared::{BockError, Result, TreeNode};

use crate::uri::{relative_path, title, uri};

/// Build the tree entity for one article from its filesystem metadata.
pub fn article_entity(path: &Path, root: &Path) -> Result<TreeNode> {
    let meta = std::fs::metadata(path).map_err(|e| BockError::io(path, e))?;
    let modified = meta.modified().ok().map(DateTime::<Utc>::from);

    Ok(TreeNode {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        title: title(path),
        relative_path: relative_path(path, root),
        uri: uri(path, root),
        size_in_bytes: meta.len(),
        modified,
        is_folder: false,
        children: Vec::new(),
    })
}

/// Build the content tree from article entities, in the order supplied.
///
/// Intermediate folders are created on demand. A name that appears twice at
/// the same level (folder or article) is a [`BockError::Conflict`].
#[instrument(skip_all, fields(article_count = articles.len()))]
pub fn build_tree(articles: &[TreeNode]) -> Result<TreeNode> {
    let mut root = TreeNode::root();

    for article in articles {
        let segments: Vec<&str> = article
            .relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let Some((leaf, folders)) = segments.split_last() else {
            return Err(BockError::conflict(format!(
                "article '{}' has an empty relative path",
                article.name
            )));
        };

        let mut node = &mut root;
        let mut relative = String::new();

        for segment in folders {
            if !relative.is_empty() {
                relative.push('/');
            }
            relative.push_str(segment);

            let index = match node.children.iter().position(|c| c.name == *segment) {
                Some(i) if node.children[i].is_folder => i,
                Some(_) => {
                    return Err(BockError::conflict(format!(
                        "folder '{relative}' collides with an article of the same name"
                    )));
                }
                None => {
                    node.children.push(folder_node(segment, &relative));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }

        if node.child(leaf).is_some() {
            return Err(BockError::conflict(format!(
                "'{}' appears twice in the content tree",
                article.relative_path
            )));
        }
        node.children.push(article.clone());
    }

    debug!(articles = root.article_count(), "content tree built");

    Ok(root)
}

/// Find a node by its root-relative path. The empty path is the root.
pub fn find_node<'a>(root: &'a TreeNode, relative: &str) -> Option<&'a TreeNode> {
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .try_fold(root, |node, segment| node.child(segment))
}

fn folder_node(name: &str, relative: &str) -> TreeNode {
    TreeNode {
        name: name.to_string(),
        title: name.to_string(),
        relative_path: relative.to_string(),
        uri: uri(Path::new(relative), Path::new("")),
        size_in_bytes: 0,
        modified: None,
        is_folder: true,
        children: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
