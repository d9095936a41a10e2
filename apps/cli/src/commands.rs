//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bock_core::ProgressReporter;
use bock_shared::{AppConfig, GenerateConfig, RunMeta, config_file_path, init_config, load_config};
use bock_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// bock: turn a git-tracked folder of markdown into a static wiki.
#[derive(Parser)]
#[command(
    name = "bock",
    version,
    about = "Render a git-tracked folder of markdown articles into a static wiki with revision history.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the site from an article root.
    Build(BuildArgs),

    /// Query the search database of a generated site.
    Search {
        /// Path to the generated `articles.db`.
        #[arg(long)]
        db: PathBuf,

        /// FTS5 query string.
        query: String,

        /// Maximum number of results.
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags of `bock build`. Each toggle overrides the config file.
#[derive(clap::Args)]
pub(crate) struct BuildArgs {
    /// Folder holding the markdown articles (must be a git repository
    /// unless revisions are disabled).
    #[arg(short = 'a', long, env = "BOCK_ARTICLE_ROOT")]
    pub article_root: Option<PathBuf>,

    /// Folder the site is written to.
    #[arg(short, long, env = "BOCK_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also write `raw/index.html` source pages.
    #[arg(long)]
    pub raw: bool,

    /// Also write `index.json` structured output.
    #[arg(long)]
    pub json: bool,

    /// Skip revision pages and git history entirely.
    #[arg(long)]
    pub no_revisions: bool,

    /// Skip the search database.
    #[arg(long)]
    pub no_database: bool,

    /// Read history from the repository on disk instead of a private clone.
    #[arg(long)]
    pub on_disk: bool,

    /// Maximum concurrently processed entities (0 = unbounded).
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write the default config to ~/.bock/bock.toml.
    Init,
    /// Print the resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bock=info",
        1 => "bock=debug",
        _ => "bock=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => cmd_build(args).await,
        Command::Search { db, query, limit } => cmd_search(&db, &query, limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_build(args: BuildArgs) -> Result<()> {
    let config = load_config()?;
    let generate = build_config(&config, args);

    info!(
        root = %generate.article_root.display(),
        output = %generate.output_folder.display(),
        raw = generate.generate_raw,
        json = generate.generate_json,
        revisions = generate.generate_revisions,
        database = generate.generate_database,
        "building site"
    );

    let reporter = CliProgress::new();
    let meta = bock_core::generate(&generate, &reporter).await;
    reporter.finish();
    let meta = meta?;

    println!("{}", summary(&meta));
    Ok(())
}

/// Merge CLI flags over the config file. Flags only ever switch a default.
fn build_config(config: &AppConfig, args: BuildArgs) -> GenerateConfig {
    let mut generate = GenerateConfig::new(
        config,
        args.article_root.unwrap_or_default(),
        args.output.unwrap_or_default(),
    );

    generate.generate_raw |= args.raw;
    generate.generate_json |= args.json;
    if args.no_revisions {
        generate.generate_revisions = false;
    }
    if args.no_database {
        generate.generate_database = false;
    }
    generate.use_on_disk_repository |= args.on_disk;
    if let Some(concurrency) = args.concurrency {
        generate.concurrency = concurrency;
    }

    generate
}

fn summary(meta: &RunMeta) -> String {
    let mut line = format!(
        "Rendered {} articles and {} folders",
        meta.article_count, meta.folder_count
    );
    if meta.generate_revisions {
        line.push_str(&format!(
            " ({} revisions, {} untracked)",
            meta.revision_count, meta.untracked_count
        ));
    }
    line.push_str(&format!(" in {:?}", meta.elapsed_rounded()));
    line
}

async fn cmd_search(db: &Path, query: &str, limit: u32) -> Result<()> {
    info!(db = %db.display(), query, limit, "searching");

    let storage = Storage::open_readonly(db).await?;
    let results = storage.search(query, limit).await?;

    if results.is_empty() {
        println!("No matches for '{query}'.");
        return Ok(());
    }

    let width = results.iter().map(|r| r.uri.len()).max().unwrap_or(0);
    for result in &results {
        println!("{:<width$}  {}", result.uri, result.title);
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# {}", path.display());
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner during setup phases, switching to a bar once entities are planned.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn entities_planned(&self, total: usize) {
        self.bar.set_style(bar_style());
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn entity_done(&self, uri: &str, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
        self.bar.set_message(uri.to_string());
    }

    fn done(&self, _meta: &RunMeta) {
        self.bar.finish_and_clear();
    }
}
