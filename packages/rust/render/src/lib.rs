//! Markdown and page rendering.
//!
//! A [`Renderer`] is built once per run and shared by every entity task. It
//! holds only immutable configuration, so `&Renderer` is safe to use from any
//! number of threads at once.

mod pages;

use pulldown_cmark::{Options, Parser, html};
use tracing::trace;

use bock_shared::{Article, Folder, Revision, TreeNode};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options fixed for the lifetime of a [`Renderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Link article pages to their raw-source page.
    pub link_raw: bool,
}

/// A named page template together with its context.
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    Article(&'a Article),
    ArticleRaw(&'a Article),
    Revision {
        article: &'a Article,
        revision: &'a Revision,
        html: &'a str,
    },
    RevisionRaw {
        article: &'a Article,
        revision: &'a Revision,
    },
    RevisionList(&'a Article),
    Folder {
        folder: &'a Folder,
        readme_html: &'a str,
    },
    Index,
    NotFound,
    Archive(&'a TreeNode),
    /// `(uri, title)` pairs, already sorted.
    Random(&'a [(String, String)]),
}

impl Page<'_> {
    /// Template name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Page::Article(_) => "article",
            Page::ArticleRaw(_) => "article-raw",
            Page::Revision { .. } => "revision",
            Page::RevisionRaw { .. } => "revision-raw",
            Page::RevisionList(_) => "revision-list",
            Page::Folder { .. } => "folder",
            Page::Index => "index",
            Page::NotFound => "not-found",
            Page::Archive(_) => "archive",
            Page::Random(_) => "random",
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Stateless markdown + page renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    markdown: Options,
    options: RenderOptions,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        let mut markdown = Options::empty();
        markdown.insert(Options::ENABLE_TABLES);
        markdown.insert(Options::ENABLE_FOOTNOTES);
        markdown.insert(Options::ENABLE_STRIKETHROUGH);
        markdown.insert(Options::ENABLE_TASKLISTS);
        markdown.insert(Options::ENABLE_SMART_PUNCTUATION);
        markdown.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { markdown, options }
    }

    /// Convert a markdown document to an HTML fragment.
    pub fn render_document(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.markdown);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Render a complete HTML page.
    pub fn render_page(&self, page: &Page<'_>) -> String {
        trace!(template = page.name(), "rendering page");

        let markup = match *page {
            Page::Article(article) => pages::article(article, self.options.link_raw),
            Page::ArticleRaw(article) => pages::article_raw(article),
            Page::Revision {
                article,
                revision,
                html,
            } => pages::revision(article, revision, html),
            Page::RevisionRaw { article, revision } => pages::revision_raw(article, revision),
            Page::RevisionList(article) => pages::revision_list(article),
            Page::Folder {
                folder,
                readme_html,
            } => pages::folder(folder, readme_html),
            Page::Index => pages::index(),
            Page::NotFound => pages::not_found(),
            Page::Archive(tree) => pages::archive(tree),
            Page::Random(list) => pages::random(list),
        };

        markup.into_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
