//! Error types for bock.
//!
//! Library crates use [`BockError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` and maps each variant to a process
//! exit status through [`BockError::exit_code`].

use std::path::PathBuf;

/// Exit status when the article root is missing, unreadable, or not a folder.
pub const EXIT_BAD_ARTICLE_ROOT: i32 = 10;
/// Exit status for any database open/initialize/write failure.
pub const EXIT_DATABASE_ERROR: i32 = 11;
/// Exit status for filesystem failures while writing output.
pub const EXIT_GENERAL_IO_ERROR: i32 = 12;
/// Exit status when no article root was supplied at all.
pub const EXIT_NO_ARTICLE_ROOT: i32 = 13;
/// Exit status when the output folder is missing or cannot be created.
pub const EXIT_NO_OUTPUT_FOLDER: i32 = 14;
/// Exit status when revisions are requested but the root is not a repository.
pub const EXIT_NOT_A_GIT_REPO: i32 = 15;
/// Exit status when classification finds nothing to render.
pub const EXIT_NO_ARTICLES_TO_RENDER: i32 = 16;
/// Exit status when the article root cannot be walked.
pub const EXIT_COULD_NOT_LIST_ENTITIES: i32 = 17;
/// Exit status when a page cannot be rendered.
pub const EXIT_RENDER_ERROR: i32 = 18;
/// Exit status when two entities claim the same name or output path.
pub const EXIT_CONTENT_CONFLICT: i32 = 19;
/// Exit status for configuration problems.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Top-level error type for all bock operations.
#[derive(Debug, thiserror::Error)]
pub enum BockError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// No article root was given.
    #[error("no article root was given")]
    MissingArticleRoot,

    /// The article root does not exist or is not a folder.
    #[error("article root {0:?} is not a folder or does not exist")]
    BadArticleRoot(PathBuf),

    /// The output folder could not be created.
    #[error("could not create output folder {path:?}: {source}")]
    OutputFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Revisions were requested but the article root is not a repository.
    #[error("{path:?} does not appear to be a git repository: {message}")]
    NotARepository { path: PathBuf, message: String },

    /// The article root could not be traversed.
    #[error("could not walk {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Classification found zero valid articles.
    #[error("could not find any articles to render under {0:?}")]
    NoArticles(PathBuf),

    /// The article has no version-control history (untracked or never logged).
    #[error("{0} is untracked")]
    Untracked(String),

    /// Version-control lookup error.
    #[error("git error: {0}")]
    Git(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Markdown or template rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two entities claim the same tree slot or output path.
    #[error("content conflict: {message}")]
    Conflict { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BockError>;

impl BockError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a conflict error from any displayable message.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only affects a single entity's history.
    pub fn is_untracked(&self) -> bool {
        matches!(self, Self::Untracked(_))
    }

    /// Process exit status for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => EXIT_CONFIG_ERROR,
            Self::MissingArticleRoot => EXIT_NO_ARTICLE_ROOT,
            Self::BadArticleRoot(_) => EXIT_BAD_ARTICLE_ROOT,
            Self::OutputFolder { .. } => EXIT_NO_OUTPUT_FOLDER,
            Self::NotARepository { .. } | Self::Git(_) | Self::Untracked(_) => EXIT_NOT_A_GIT_REPO,
            Self::Walk { .. } => EXIT_COULD_NOT_LIST_ENTITIES,
            Self::NoArticles(_) => EXIT_NO_ARTICLES_TO_RENDER,
            Self::Storage(_) => EXIT_DATABASE_ERROR,
            Self::Render(_) => EXIT_RENDER_ERROR,
            Self::Io { .. } => EXIT_GENERAL_IO_ERROR,
            Self::Conflict { .. } => EXIT_CONTENT_CONFLICT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BockError::config("concurrency must be a number");
        assert_eq!(err.to_string(), "config error: concurrency must be a number");

        let err = BockError::Untracked("Notes/draft.md".into());
        assert_eq!(err.to_string(), "Notes/draft.md is untracked");
        assert!(err.is_untracked());
    }

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let errors = [
            BockError::config("x"),
            BockError::MissingArticleRoot,
            BockError::BadArticleRoot("/nope".into()),
            BockError::OutputFolder {
                path: "/out".into(),
                source: std::io::Error::other("denied"),
            },
            BockError::NotARepository {
                path: "/wiki".into(),
                message: "no .git".into(),
            },
            BockError::Walk {
                path: "/wiki".into(),
                message: "denied".into(),
            },
            BockError::NoArticles("/wiki".into()),
            BockError::Storage("locked".into()),
            BockError::Render("bad template".into()),
            BockError::io("/out/a", std::io::Error::other("full")),
            BockError::conflict("a/b"),
        ];

        let mut codes: Vec<i32> = errors.iter().map(BockError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(BockError::Storage("x".into()).exit_code(), EXIT_DATABASE_ERROR);
    }
}
