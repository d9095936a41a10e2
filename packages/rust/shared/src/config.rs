//! Application configuration for bock.
//!
//! User config lives at `~/.bock/bock.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BockError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bock.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bock";

/// Name of the search database written to the output folder.
pub const DATABASE_NAME: &str = "articles.db";

// ---------------------------------------------------------------------------
// Config structs (matching bock.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output toggles and runtime knobs.
    #[serde(default)]
    pub generate: GenerateDefaults,

    /// Content classification settings.
    #[serde(default)]
    pub content: ContentConfig,
}

/// `[generate]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDefaults {
    /// Write `raw/index.html` source pages.
    #[serde(default)]
    pub raw: bool,

    /// Write `index.json` structured output.
    #[serde(default)]
    pub json: bool,

    /// Build revision pages from git history.
    #[serde(default = "default_true")]
    pub revisions: bool,

    /// Build the SQLite full-text search database.
    #[serde(default = "default_true")]
    pub database: bool,

    /// Read history from the repository on disk instead of a private clone.
    #[serde(default)]
    pub on_disk_repository: bool,

    /// Maximum concurrently processed entities (0 = unbounded).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GenerateDefaults {
    fn default() -> Self {
        Self {
            raw: false,
            json: false,
            revisions: true,
            database: true,
            on_disk_repository: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(4)
}

/// `[content]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Extra regex patterns; a path segment matching any of them is ignored.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generate config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime generation configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Folder holding the markdown sources.
    pub article_root: PathBuf,
    /// Folder the site is written to.
    pub output_folder: PathBuf,
    pub generate_raw: bool,
    pub generate_json: bool,
    pub generate_revisions: bool,
    pub generate_database: bool,
    pub use_on_disk_repository: bool,
    /// Maximum concurrently processed entities (0 = unbounded).
    pub concurrency: usize,
    /// Extra ignore patterns applied per path segment.
    pub ignore_patterns: Vec<String>,
}

impl GenerateConfig {
    /// Build a runtime config from the file defaults and the two required paths.
    pub fn new(config: &AppConfig, article_root: PathBuf, output_folder: PathBuf) -> Self {
        Self {
            article_root,
            output_folder,
            generate_raw: config.generate.raw,
            generate_json: config.generate.json,
            generate_revisions: config.generate.revisions,
            generate_database: config.generate.database,
            use_on_disk_repository: config.generate.on_disk_repository,
            concurrency: config.generate.concurrency,
            ignore_patterns: config.content.ignore_patterns.clone(),
        }
    }

    /// Path of the search database inside the output folder.
    pub fn database_path(&self) -> PathBuf {
        self.output_folder.join(DATABASE_NAME)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bock/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| BockError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bock/bock.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BockError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BockError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BockError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| BockError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BockError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
