//! Fixed top-level pages and repository assets.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, instrument};

use bock_content::Classification;
use bock_render::Page;
use bock_shared::{BockError, DATABASE_NAME, Result, TreeNode};

use crate::entities::{RunContext, write_home};

/// Home document at the article root.
pub(crate) const HOME_DOCUMENT: &str = "Home.md";

/// Asset folder at the article root, copied verbatim.
pub(crate) const ASSET_FOLDER: &str = "__assets";

/// Output URIs and files owned by the fixed pages, never by an entity.
const RESERVED_URIS: &[&str] = &[
    "/Home",
    "/archive",
    "/random",
    "/assets",
    "/index.html",
    "/404.html",
    "/tree.json",
];

/// Write every page that does not belong to a single entity.
#[instrument(skip_all)]
pub(crate) fn write_fixed_pages(ctx: &RunContext) -> Result<()> {
    let renderer = &ctx.renderer;
    let writer = &ctx.writer;

    writer.write("index.html", renderer.render_page(&Page::Index).as_bytes())?;
    writer.write("404.html", renderer.render_page(&Page::NotFound).as_bytes())?;
    writer.write(
        "archive/index.html",
        renderer.render_page(&Page::Archive(&ctx.tree)).as_bytes(),
    )?;

    let list = article_list(&ctx.tree);
    writer.write(
        "random/index.html",
        renderer.render_page(&Page::Random(&list)).as_bytes(),
    )?;

    writer.write_json("tree.json", &ctx.tree)?;

    write_home(ctx, &ctx.root.join(HOME_DOCUMENT))?;

    let assets = ctx.root.join(ASSET_FOLDER);
    if assets.is_dir() {
        let copied = writer.copy_tree(&assets, "assets")?;
        info!(copied, "copied repository assets");
    } else {
        info!("no {ASSET_FOLDER} folder in article root, skipping assets");
    }

    Ok(())
}

/// Every article in the tree as `(uri, title)`, sorted by URI.
pub(crate) fn article_list(tree: &TreeNode) -> Vec<(String, String)> {
    fn collect(node: &TreeNode, out: &mut Vec<(String, String)>) {
        for child in &node.children {
            if child.is_folder {
                collect(child, out);
            } else {
                out.push((child.uri.clone(), child.title.clone()));
            }
        }
    }

    let mut list = Vec::new();
    collect(tree, &mut list);
    list.sort();
    list
}

/// Fail if two entities, or an entity and a fixed page, share an output URI.
pub(crate) fn check_output_uris(classification: &Classification, root: &Path) -> Result<()> {
    let mut seen: HashSet<String> = RESERVED_URIS.iter().map(|u| u.to_string()).collect();
    seen.insert(format!("/{DATABASE_NAME}"));

    let paths = classification
        .articles
        .iter()
        .chain(classification.folders.iter());

    for path in paths {
        let uri = bock_content::uri(path, root);
        if !seen.insert(uri.clone()) {
            return Err(BockError::conflict(format!(
                "output '{uri}' is claimed by more than one entity ('{}')",
                path.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn classification(root: &Path, articles: &[&str], folders: &[&str]) -> Classification {
        Classification {
            articles: articles.iter().map(|a| root.join(a)).collect(),
            folders: folders
                .iter()
                .map(|f| root.join(f))
                .collect::<BTreeSet<PathBuf>>(),
        }
    }

    #[test]
    fn distinct_entities_pass() {
        let root = Path::new("/wiki");
        let c = classification(root, &["a.md", "x/b.md"], &["", "x"]);
        check_output_uris(&c, root).unwrap();
    }

    #[test]
    fn space_and_underscore_collide() {
        let root = Path::new("/wiki");
        let c = classification(root, &["a b.md", "a_b.md"], &[""]);
        let err = check_output_uris(&c, root).unwrap_err();
        assert!(matches!(err, BockError::Conflict { .. }));
    }

    #[test]
    fn article_and_folder_collide() {
        let root = Path::new("/wiki");
        let c = classification(root, &["Notes.md", "Notes/a.md"], &["", "Notes"]);
        assert!(check_output_uris(&c, root).is_err());
    }

    #[test]
    fn fixed_pages_are_reserved() {
        let root = Path::new("/wiki");
        for name in ["archive.md", "random.md", "ROOT.md", "tree.json.md"] {
            let c = classification(root, &[name], &[""]);
            assert!(check_output_uris(&c, root).is_err(), "{name} should collide");
        }
    }

    #[test]
    fn article_list_is_sorted() {
        let mut tree = TreeNode::root();
        for (name, uri) in [("b.md", "/b"), ("a.md", "/a")] {
            tree.children.push(TreeNode {
                name: name.into(),
                title: name.trim_end_matches(".md").into(),
                relative_path: name.into(),
                uri: uri.into(),
                size_in_bytes: 0,
                modified: None,
                is_folder: false,
                children: vec![],
            });
        }
        let list = article_list(&tree);
        assert_eq!(list[0], ("/a".to_string(), "a".to_string()));
        assert_eq!(list[1].0, "/b");
    }
}
