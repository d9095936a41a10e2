//! Pure path → identifier derivations.
//!
//! Every function here is a pure function of its inputs: no I/O, no failure
//! modes. An empty path after stripping the root is the synthetic [`ROOT`].

use std::path::{Component, Path};

use uuid::Uuid;

use bock_shared::{DOCUMENT_EXTENSION, EntityKind, HierarchyNode, ROOT};

/// Root-relative path segments of `path`, without separators.
pub fn segments(path: &Path, root: &Path) -> Vec<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// `path` minus the `root` prefix, `/`-separated, never with a leading separator.
pub fn relative_path(path: &Path, root: &Path) -> String {
    segments(path, root).join("/")
}

/// Whether a file name carries the document extension.
pub fn has_document_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

/// Strip the document extension from a single segment, if present.
fn strip_document_extension(segment: &str) -> &str {
    if has_document_extension(segment) {
        &segment[..segment.len() - DOCUMENT_EXTENSION.len() - 1]
    } else {
        segment
    }
}

fn uri_segment(segment: &str) -> String {
    strip_document_extension(segment).replace(' ', "_")
}

/// Canonical output URI for an article or folder path.
///
/// `"/wiki/Tech Notes/Linux/setup.md"` under `"/wiki"` becomes
/// `"/Tech_Notes/Linux/setup"`. The root itself becomes [`ROOT`]'s URI.
pub fn uri(path: &Path, root: &Path) -> String {
    let segments = segments(path, root);
    if segments.is_empty() {
        return ROOT.uri.to_string();
    }

    let mut uri = String::new();
    for segment in &segments {
        uri.push('/');
        uri.push_str(&uri_segment(segment));
    }
    uri
}

/// Breadcrumbs from the synthetic root down to `path`, one per segment.
pub fn hierarchy(path: &Path, root: &Path) -> Vec<HierarchyNode> {
    let segments = segments(path, root);
    let mut nodes = Vec::with_capacity(segments.len() + 1);
    nodes.push(HierarchyNode::root());

    let mut uri = String::new();
    for segment in &segments {
        uri.push('/');
        uri.push_str(&uri_segment(segment));

        let kind = if has_document_extension(segment) {
            EntityKind::Article
        } else {
            EntityKind::Folder
        };

        nodes.push(HierarchyNode {
            name: strip_document_extension(segment).to_string(),
            kind,
            uri: uri.clone(),
        });
    }

    nodes
}

/// Human-readable title: the file name without the document extension.
pub fn title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    strip_document_extension(&name).to_string()
}

/// Deterministic identifier for an absolute path (UUID v5, URL namespace).
pub fn make_id(path: &Path) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, path.to_string_lossy().as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_DIR: &str = "/srv/wiki";

    fn p(rel: &str) -> std::path::PathBuf {
        Path::new(ROOT_DIR).join(rel)
    }

    #[test]
    fn uri_strips_root_spaces_and_extension() {
        let root = Path::new(ROOT_DIR);
        assert_eq!(
            uri(&p("Tech Notes/Linux/Getting started.md"), root),
            "/Tech_Notes/Linux/Getting_started"
        );
        assert_eq!(uri(&p("Tech Notes"), root), "/Tech_Notes");
        assert_eq!(uri(root, root), "/ROOT");
    }

    #[test]
    fn uri_never_contains_spaces_or_extension() {
        let root = Path::new(ROOT_DIR);
        for rel in [
            "a.md",
            "a b/c d.md",
            "deep/er/than/that/file name.md",
            "x/y z",
            "release notes/v1.2/changes.md",
        ] {
            let u = uri(&p(rel), root);
            assert!(!u.contains(' '), "{u} contains a space");
            assert!(!u.ends_with(".md"), "{u} kept its extension");
        }
    }

    #[test]
    fn dotted_folders_keep_their_dots() {
        let root = Path::new(ROOT_DIR);
        assert_eq!(uri(&p("release/v1.2"), root), "/release/v1.2");
        assert_eq!(uri(&p("release/v1.2/notes.md"), root), "/release/v1.2/notes");
    }

    #[test]
    fn relative_path_has_no_leading_separator() {
        let root = Path::new(ROOT_DIR);
        assert_eq!(relative_path(&p("a b/c.md"), root), "a b/c.md");
        assert_eq!(relative_path(root, root), "");
    }

    #[test]
    fn hierarchy_starts_at_root_and_classifies_leaf() {
        let root = Path::new(ROOT_DIR);
        let nodes = hierarchy(&p("Tech Notes/Linux/setup.md"), root);

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0], HierarchyNode::root());
        assert_eq!(nodes[1].name, "Tech Notes");
        assert_eq!(nodes[1].uri, "/Tech_Notes");
        assert_eq!(nodes[1].kind, EntityKind::Folder);
        assert_eq!(nodes[2].uri, "/Tech_Notes/Linux");
        assert_eq!(nodes[3].name, "setup");
        assert_eq!(nodes[3].kind, EntityKind::Article);
        assert_eq!(nodes[3].uri, uri(&p("Tech Notes/Linux/setup.md"), root));
    }

    #[test]
    fn hierarchy_of_root_is_only_root() {
        let root = Path::new(ROOT_DIR);
        assert_eq!(hierarchy(root, root), vec![HierarchyNode::root()]);
    }

    #[test]
    fn ids_are_stable_and_distinct() {
        let a = make_id(&p("a.md"));
        assert_eq!(a, make_id(&p("a.md")));
        assert_ne!(a, make_id(&p("b.md")));
    }

    #[test]
    fn title_drops_document_extension_only() {
        assert_eq!(title(&p("Notes/My Article.md")), "My Article");
        assert_eq!(title(&p("Notes/v1.2")), "v1.2");
    }
}
