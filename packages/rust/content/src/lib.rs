//! Content tree assembly: classification, path derivations, and the tree.
//!
//! This crate provides:
//! - [`classify`]: walk the article root into articles and folders
//! - [`uri`]: pure path → URI / breadcrumb / id derivations
//! - [`tree`]: fold classified articles into the nested content tree

pub mod classify;
pub mod tree;
pub mod uri;

pub use classify::{Classification, IgnoreRules, classify};
pub use tree::{article_entity, build_tree, find_node};
pub use uri::{has_document_extension, hierarchy, make_id, relative_path, title, uri};
