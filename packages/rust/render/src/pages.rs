//! Page templates.

use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use bock_shared::{Article, Folder, HierarchyNode, Revision, TreeNode};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Picks one of the listed articles client-side; the list itself is static.
const RANDOM_SCRIPT: &str = r##"(function () {
  var links = document.querySelectorAll("#articles a");
  if (links.length > 0) {
    window.location.replace(links[Math.floor(Math.random() * links.length)].href);
  }
})();"##;

fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn layout(kind: &str, title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/assets/bock.css";
            }
            body data-type=(kind) {
                header {
                    a href="/" { "bock" }
                    nav {
                        a href="/Home" { "Home" }
                        " "
                        a href="/archive" { "Archive" }
                        " "
                        a href="/random" { "Random" }
                    }
                }
                main { (body) }
                footer { "bock " (VERSION) }
            }
        }
    }
}

fn breadcrumbs(hierarchy: &[HierarchyNode]) -> Markup {
    html! {
        nav.breadcrumbs {
            ol {
                @for node in hierarchy {
                    li { a href=(node.uri) { (node.name) } }
                }
            }
        }
    }
}

pub(crate) fn article(article: &Article, link_raw: bool) -> Markup {
    let body = html! {
        (breadcrumbs(&article.hierarchy))
        article {
            h1 { (article.title) }
            (PreEscaped(&article.html))
        }
        aside.meta {
            dl {
                dt { "Modified" } dd { (date(&article.modified)) }
                dt { "Created" } dd { (date(&article.created)) }
                dt { "Size" } dd { (article.size_in_bytes) " bytes" }
            }
            @if article.untracked {
                p.untracked { "This article is untracked and has no revision history." }
            }
            ul {
                @if link_raw {
                    li { a href={ (article.uri) "/raw" } { "Source" } }
                }
                @if !article.revisions.is_empty() {
                    li {
                        a href={ (article.uri) "/revisions" } {
                            (article.revisions.len()) " revisions"
                        }
                    }
                }
            }
        }
    };
    layout("article", &article.title, body)
}

pub(crate) fn article_raw(article: &Article) -> Markup {
    let body = html! {
        (breadcrumbs(&article.hierarchy))
        h1 { (article.title) }
        pre.source { code { (article.source) } }
    };
    layout("raw", &article.title, body)
}

pub(crate) fn revision(article: &Article, revision: &Revision, rendered: &str) -> Markup {
    let body = html! {
        (breadcrumbs(&article.hierarchy))
        (revision_header(article, revision))
        article { (PreEscaped(rendered)) }
    };
    layout("revision", &article.title, body)
}

pub(crate) fn revision_raw(article: &Article, revision: &Revision) -> Markup {
    let body = html! {
        (breadcrumbs(&article.hierarchy))
        (revision_header(article, revision))
        pre.source { code { (revision.content) } }
    };
    layout("revision-raw", &article.title, body)
}

fn revision_header(article: &Article, revision: &Revision) -> Markup {
    html! {
        header.revision {
            h1 { (article.title) }
            p {
                code { (revision.short_id) } " "
                (revision.subject)
            }
            p {
                (revision.author_name) " <" (revision.author_email) "> "
                time { (date(&revision.date)) }
            }
            p {
                a href={ (article.uri) "/revisions" } { "All revisions" }
                " "
                a href=(article.uri) { "Current version" }
            }
        }
    }
}

pub(crate) fn revision_list(article: &Article) -> Markup {
    let body = html! {
        (breadcrumbs(&article.hierarchy))
        h1 { "Revisions of " (article.title) }
        table.revisions {
            thead { tr { th { "Commit" } th { "Subject" } th { "Author" } th { "Date" } } }
            tbody {
                @for rev in &article.revisions {
                    tr {
                        td {
                            a href={ (article.uri) "/revisions/" (rev.short_id) } {
                                code { (rev.short_id) }
                            }
                        }
                        td { (rev.subject) }
                        td { (rev.author_name) }
                        td { (date(&rev.date)) }
                    }
                }
            }
        }
    };
    layout("revision-list", &article.title, body)
}

pub(crate) fn folder(folder: &Folder, readme_html: &str) -> Markup {
    let body = html! {
        (breadcrumbs(&folder.hierarchy))
        h1 { (folder.title) }
        @if !folder.children.folders.is_empty() {
            section.folders {
                h2 { "Folders" }
                ul {
                    @for child in &folder.children.folders {
                        li { a href=(child.uri) { (child.name) } }
                    }
                }
            }
        }
        @if !folder.children.articles.is_empty() {
            section.articles {
                h2 { "Articles" }
                ul {
                    @for child in &folder.children.articles {
                        li { a href=(child.uri) { (child.name) } }
                    }
                }
            }
        }
        @if !readme_html.is_empty() {
            section.readme { (PreEscaped(readme_html)) }
        }
    };
    layout("folder", &folder.title, body)
}

pub(crate) fn index() -> Markup {
    let body = html! {
        h1 { "bock" }
        p {
            "Start at the " a href="/Home" { "home page" }
            ", browse the " a href="/archive" { "archive" }
            " or open a " a href="/random" { "random article" } "."
        }
    };
    layout("index", "bock", body)
}

pub(crate) fn not_found() -> Markup {
    let body = html! {
        h1 { "Not found" }
        p { "Nothing lives at this address. Try the " a href="/archive" { "archive" } "." }
    };
    layout("not-found", "Not found", body)
}

fn tree_list(node: &TreeNode) -> Markup {
    html! {
        ul {
            @for child in &node.children {
                li {
                    @if child.is_folder {
                        a.folder href=(child.uri) { (child.title) }
                        (tree_list(child))
                    } @else {
                        a href=(child.uri) { (child.title) }
                    }
                }
            }
        }
    }
}

pub(crate) fn archive(tree: &TreeNode) -> Markup {
    let body = html! {
        h1 { "Archive" }
        p { (tree.article_count()) " articles" }
        (tree_list(tree))
    };
    layout("archive", "Archive", body)
}

pub(crate) fn random(list: &[(String, String)]) -> Markup {
    let body = html! {
        h1 { "Random article" }
        ul id="articles" {
            @for (uri, title) in list {
                li { a href=(uri) { (title) } }
            }
        }
        script { (PreEscaped(RANDOM_SCRIPT)) }
    };
    layout("random", "Random article", body)
}
