//! Per-entity work: materialize one article or folder and write its outputs.
//!
//! Everything here is blocking (file reads, history traversal, rendering,
//! file writes) and runs on the blocking pool. Storage writes stay on the
//! async side in the pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use bock_content::{find_node, hierarchy, make_id, relative_path, title, uri};
use bock_history::{VersionControl, extract_history};
use bock_render::{Page, Renderer};
use bock_shared::{
    Article, BockError, EntityKind, Folder, FolderChildren, GenerateConfig, HierarchyNode, Result,
    TreeNode,
};

use crate::writer::OutputWriter;

/// Optional per-folder summary document.
pub(crate) const README_NAME: &str = "README.md";

/// Read-only state shared by every entity task of a run.
pub(crate) struct RunContext {
    pub root: PathBuf,
    pub config: GenerateConfig,
    pub renderer: Renderer,
    pub writer: OutputWriter,
    pub tree: TreeNode,
    /// Present only when revision generation is enabled.
    pub vcs: Option<Arc<dyn VersionControl>>,
}

/// What one finished entity contributes to the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntityOutcome {
    pub kind: EntityKind,
    pub uri: String,
    pub revisions: usize,
    pub untracked: bool,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// Read, date, and render one article.
///
/// A missing history is not an error: the article falls back to its file
/// modification time and is marked untracked.
pub(crate) fn build_article(ctx: &RunContext, path: &Path) -> Result<Article> {
    let source = std::fs::read_to_string(path).map_err(|e| BockError::io(path, e))?;
    let meta = std::fs::metadata(path).map_err(|e| BockError::io(path, e))?;
    let mtime: DateTime<Utc> = meta
        .modified()
        .map(DateTime::from)
        .map_err(|e| BockError::io(path, e))?;

    let (created, modified, revisions, untracked) = match &ctx.vcs {
        Some(vcs) => match extract_history(path, &ctx.root, vcs.as_ref()) {
            Ok(history) => (history.created, history.modified, history.revisions, false),
            Err(e) if e.is_untracked() => {
                debug!(path = %path.display(), "no history, using file time");
                (mtime, mtime, Vec::new(), true)
            }
            Err(e) => return Err(e),
        },
        None => (mtime, mtime, Vec::new(), false),
    };

    let html = ctx.renderer.render_document(&source);

    Ok(Article {
        id: make_id(path),
        title: title(path),
        uri: uri(path, &ctx.root),
        hierarchy: hierarchy(path, &ctx.root),
        size_in_bytes: meta.len(),
        created,
        modified,
        html,
        source,
        untracked,
        revisions,
        path: path.to_path_buf(),
    })
}

/// Write an article's page set. Returns the number of revisions written.
pub(crate) fn write_article(ctx: &RunContext, article: &Article) -> Result<usize> {
    let config = &ctx.config;
    let renderer = &ctx.renderer;
    let writer = &ctx.writer;
    let uri = article.uri.as_str();

    writer.write_entity(
        uri,
        "index.html",
        renderer.render_page(&Page::Article(article)).as_bytes(),
    )?;

    if config.generate_raw {
        writer.write_entity(
            uri,
            "raw/index.html",
            renderer.render_page(&Page::ArticleRaw(article)).as_bytes(),
        )?;
    }

    if config.generate_json {
        writer.write_entity_json(uri, "index.json", article)?;
    }

    if !config.generate_revisions || article.revisions.is_empty() {
        return Ok(0);
    }

    writer.write_entity(
        uri,
        "revisions/index.html",
        renderer.render_page(&Page::RevisionList(article)).as_bytes(),
    )?;

    for revision in &article.revisions {
        let base = format!("revisions/{}", revision.short_id);
        let html = renderer.render_document(&revision.content);

        writer.write_entity(
            uri,
            &format!("{base}/index.html"),
            renderer
                .render_page(&Page::Revision {
                    article,
                    revision,
                    html: &html,
                })
                .as_bytes(),
        )?;

        if config.generate_raw {
            writer.write_entity(
                uri,
                &format!("{base}/raw/index.html"),
                renderer
                    .render_page(&Page::RevisionRaw { article, revision })
                    .as_bytes(),
            )?;
        }

        if config.generate_json {
            writer.write_entity_json(uri, &format!("{base}/index.json"), revision)?;
        }
    }

    Ok(article.revisions.len())
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Materialize one folder from the content tree, one level of children deep.
pub(crate) fn build_folder(ctx: &RunContext, path: &Path) -> Result<Folder> {
    let relative = relative_path(path, &ctx.root);
    let node = find_node(&ctx.tree, &relative).ok_or_else(|| {
        BockError::conflict(format!("folder '{relative}' is missing from the content tree"))
    })?;

    let mut children = FolderChildren::default();
    for child in &node.children {
        let entry = HierarchyNode {
            name: child.title.clone(),
            kind: if child.is_folder {
                EntityKind::Folder
            } else {
                EntityKind::Article
            },
            uri: child.uri.clone(),
        };
        if child.is_folder {
            children.folders.push(entry);
        } else {
            children.articles.push(entry);
        }
    }

    let readme_path = path.join(README_NAME);
    let readme = match std::fs::read_to_string(&readme_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(BockError::io(&readme_path, e)),
    };

    Ok(Folder {
        id: make_id(path),
        title: node.title.clone(),
        uri: uri(path, &ctx.root),
        hierarchy: hierarchy(path, &ctx.root),
        children,
        readme,
        path: path.to_path_buf(),
    })
}

pub(crate) fn write_folder(ctx: &RunContext, folder: &Folder) -> Result<()> {
    let readme_html = if folder.readme.is_empty() {
        String::new()
    } else {
        ctx.renderer.render_document(&folder.readme)
    };

    ctx.writer.write_entity(
        &folder.uri,
        "index.html",
        ctx.renderer
            .render_page(&Page::Folder {
                folder,
                readme_html: &readme_html,
            })
            .as_bytes(),
    )?;

    if ctx.config.generate_json {
        ctx.writer
            .write_entity_json(&folder.uri, "index.json", folder)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

/// Shown when the article root has no home document.
const HOME_PLACEHOLDER: &str = "(You need to make a `Home.md` here!)\n";

/// Render the home document, or a placeholder if the root has none.
///
/// The home page is written like an article but is neither counted nor
/// indexed.
pub(crate) fn write_home(ctx: &RunContext, path: &Path) -> Result<()> {
    let article = if path.is_file() {
        build_article(ctx, path)?
    } else {
        warn!(path = %path.display(), "no home document, rendering a placeholder");
        let mtime: DateTime<Utc> = std::fs::metadata(&ctx.root)
            .and_then(|m| m.modified())
            .map(DateTime::from)
            .map_err(|e| BockError::io(&ctx.root, e))?;

        Article {
            id: make_id(path),
            title: title(path),
            uri: uri(path, &ctx.root),
            hierarchy: hierarchy(path, &ctx.root),
            size_in_bytes: HOME_PLACEHOLDER.len() as u64,
            created: mtime,
            modified: mtime,
            html: ctx.renderer.render_document(HOME_PLACEHOLDER),
            source: HOME_PLACEHOLDER.to_string(),
            untracked: ctx.vcs.is_some(),
            revisions: Vec::new(),
            path: path.to_path_buf(),
        }
    };

    write_article(ctx, &article)?;
    Ok(())
}
