//! Shared types, error model, and configuration for bock.
//!
//! This crate is the foundation depended on by all other bock crates.
//! It provides:
//! - [`BockError`]: the unified error type and its exit codes
//! - Domain types ([`TreeNode`], [`Article`], [`Revision`], [`ROOT`], ...)
//! - Configuration ([`AppConfig`], [`GenerateConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, DATABASE_NAME, GenerateConfig, GenerateDefaults, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{BockError, Result};
pub use types::{
    Article, ArticleHistory, DOCUMENT_EXTENSION, EntityKind, Folder, FolderChildren,
    HierarchyNode, ROOT, Revision, RootNode, RunMeta, SHORT_ID_LEN, TreeNode,
};
