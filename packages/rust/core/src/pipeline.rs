//! End-to-end `build` pipeline: article root → classify → tree → pages + index.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, instrument, warn};

use bock_content::{IgnoreRules, article_entity, build_tree, classify};
use bock_history::{GitRepository, VersionControl};
use bock_render::{RenderOptions, Renderer};
use bock_shared::{BockError, EntityKind, GenerateConfig, Result, RunMeta};
use bock_storage::{ArticleRow, Storage};

use crate::entities::{
    EntityOutcome, RunContext, build_article, build_folder, write_article, write_folder,
};
use crate::pages::{check_output_uris, write_fixed_pages};
use crate::writer::OutputWriter;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the number of entity tasks is known.
    fn entities_planned(&self, total: usize);
    /// Called as each entity finishes, in completion order.
    fn entity_done(&self, uri: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, meta: &RunMeta);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn entities_planned(&self, _total: usize) {}
    fn entity_done(&self, _uri: &str, _current: usize, _total: usize) {}
    fn done(&self, _meta: &RunMeta) {}
}

/// Run the full `build` pipeline against the git repository at the article root.
///
/// 1. Validate the article root and create the output folder
/// 2. Open the repository (only when revisions are generated)
/// 3. Classify, build the tree, check output paths
/// 4. Write fixed pages, then one task per entity
/// 5. Commit the search index, or roll it back on any failure
#[instrument(skip_all, fields(root = %config.article_root.display(), output = %config.output_folder.display()))]
pub async fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<RunMeta> {
    let root = validate_root(&config.article_root)?;
    prepare_output(&config.output_folder)?;

    let vcs = if config.generate_revisions {
        progress.phase("Opening repository");
        let repo_root = root.clone();
        let on_disk = config.use_on_disk_repository;
        let repo = tokio::task::spawn_blocking(move || GitRepository::open(&repo_root, on_disk))
            .await
            .map_err(join_error)??;
        info!(untracked = repo.untracked_count(), "opened repository");
        Some(Arc::new(repo) as Arc<dyn VersionControl>)
    } else {
        None
    };

    run(config, root, vcs, progress).await
}

/// Run the pipeline with an explicit version-control capability.
///
/// `vcs` is ignored when revision generation is disabled.
pub async fn generate_with(
    config: &GenerateConfig,
    vcs: Option<Arc<dyn VersionControl>>,
    progress: &dyn ProgressReporter,
) -> Result<RunMeta> {
    let root = validate_root(&config.article_root)?;
    prepare_output(&config.output_folder)?;
    let vcs = vcs.filter(|_| config.generate_revisions);
    run(config, root, vcs, progress).await
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(BockError::MissingArticleRoot);
    }
    let canonical = root
        .canonicalize()
        .map_err(|_| BockError::BadArticleRoot(root.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(BockError::BadArticleRoot(root.to_path_buf()));
    }
    Ok(canonical)
}

fn prepare_output(output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        return Err(BockError::OutputFolder {
            path: output.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no output folder specified",
            ),
        });
    }
    std::fs::create_dir_all(output).map_err(|e| BockError::OutputFolder {
        path: output.to_path_buf(),
        source: e,
    })
}

async fn run(
    config: &GenerateConfig,
    root: PathBuf,
    vcs: Option<Arc<dyn VersionControl>>,
    progress: &dyn ProgressReporter,
) -> Result<RunMeta> {
    let start = Instant::now();
    info!(root = %root.display(), revisions = vcs.is_some(), "starting build");

    // --- Phase 1: Classification ---
    progress.phase("Classifying articles");
    let rules = IgnoreRules::new(&config.ignore_patterns)?;
    let walk_root = root.clone();
    let classification = tokio::task::spawn_blocking(move || classify(&walk_root, &rules))
        .await
        .map_err(join_error)??;

    if classification.articles.is_empty() {
        return Err(BockError::NoArticles(root));
    }

    // --- Phase 2: Content tree ---
    progress.phase("Building content tree");
    let entities = classification
        .articles
        .iter()
        .map(|path| article_entity(path, &root))
        .collect::<Result<Vec<_>>>()?;
    let tree = build_tree(&entities)?;
    check_output_uris(&classification, &root)?;

    // --- Phase 3: Search index ---
    let storage = if config.generate_database {
        progress.phase("Initializing search index");
        let storage = Storage::create(&config.database_path()).await?;
        storage.begin().await?;
        Some(Arc::new(storage))
    } else {
        None
    };

    let ctx = Arc::new(RunContext {
        root: root.clone(),
        config: config.clone(),
        renderer: Renderer::new(RenderOptions {
            link_raw: config.generate_raw,
        }),
        writer: OutputWriter::new(&config.output_folder),
        tree,
        vcs,
    });

    // --- Phase 4: Pages ---
    let written = write_everything(&ctx, storage.clone(), &classification, progress).await;

    let outcomes = match (written, &storage) {
        (Ok(outcomes), Some(storage)) => {
            storage.commit().await?;
            outcomes
        }
        (Ok(outcomes), None) => outcomes,
        (Err(e), Some(storage)) => {
            if let Err(rollback) = storage.rollback().await {
                warn!(error = %rollback, "search index rollback failed");
            }
            return Err(e);
        }
        (Err(e), None) => return Err(e),
    };

    let mut meta = RunMeta {
        is_repository: ctx.vcs.is_some(),
        generate_database: config.generate_database,
        generate_json: config.generate_json,
        generate_raw: config.generate_raw,
        generate_revisions: config.generate_revisions,
        ..RunMeta::default()
    };
    for outcome in &outcomes {
        match outcome.kind {
            EntityKind::Article => meta.article_count += 1,
            EntityKind::Folder => meta.folder_count += 1,
        }
        meta.revision_count += outcome.revisions;
        if outcome.untracked {
            meta.untracked_count += 1;
        }
    }
    meta.elapsed = start.elapsed();

    progress.done(&meta);

    info!(
        articles = meta.article_count,
        folders = meta.folder_count,
        revisions = meta.revision_count,
        untracked = meta.untracked_count,
        files = ctx.writer.written_count(),
        elapsed_ms = meta.elapsed.as_millis(),
        "build complete"
    );

    Ok(meta)
}

async fn write_everything(
    ctx: &Arc<RunContext>,
    storage: Option<Arc<Storage>>,
    classification: &bock_content::Classification,
    progress: &dyn ProgressReporter,
) -> Result<Vec<EntityOutcome>> {
    progress.phase("Writing fixed pages");
    let fixed = ctx.clone();
    tokio::task::spawn_blocking(move || write_fixed_pages(&fixed))
        .await
        .map_err(join_error)??;

    progress.phase("Writing articles and folders");
    process_entities(ctx, storage, classification, progress).await
}

// ---------------------------------------------------------------------------
// Entity fan-out
// ---------------------------------------------------------------------------

/// Spawn one task per entity and fold their outcomes.
///
/// The first fatal error sets the halt flag: tasks that have not started yet
/// do no work, in-flight tasks are drained, and that error is returned.
async fn process_entities(
    ctx: &Arc<RunContext>,
    storage: Option<Arc<Storage>>,
    classification: &bock_content::Classification,
    progress: &dyn ProgressReporter,
) -> Result<Vec<EntityOutcome>> {
    let total = classification.articles.len() + classification.folders.len();
    progress.entities_planned(total);

    let permits = match ctx.config.concurrency {
        0 => Semaphore::MAX_PERMITS,
        n => n,
    };
    let semaphore = Arc::new(Semaphore::new(permits));
    let halted = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();

    let articles = classification
        .articles
        .iter()
        .map(|p| (EntityKind::Article, p.clone()));
    let folders = classification
        .folders
        .iter()
        .map(|p| (EntityKind::Folder, p.clone()));

    for (kind, path) in articles.chain(folders) {
        let ctx = ctx.clone();
        let storage = storage.clone();
        let sem = semaphore.clone();
        let halted = halted.clone();

        tasks.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore closed");
            if halted.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let outcome = match kind {
                EntityKind::Article => process_article(ctx, storage, path).await,
                EntityKind::Folder => process_folder(ctx, path).await,
            };
            if outcome.is_err() {
                halted.store(true, Ordering::SeqCst);
            }
            outcome.map(Some)
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    let mut first_error: Option<BockError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(join_error).and_then(|r| r) {
            Ok(Some(outcome)) => {
                progress.entity_done(&outcome.uri, outcomes.len() + 1, total);
                outcomes.push(outcome);
            }
            Ok(None) => {}
            Err(e) => {
                halted.store(true, Ordering::SeqCst);
                if first_error.is_none() {
                    error!(error = %e, "entity failed, halting");
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}

async fn process_article(
    ctx: Arc<RunContext>,
    storage: Option<Arc<Storage>>,
    path: PathBuf,
) -> Result<EntityOutcome> {
    let (article, revisions) = tokio::task::spawn_blocking(move || {
        let article = build_article(&ctx, &path)?;
        let revisions = write_article(&ctx, &article)?;
        Ok::<_, BockError>((article, revisions))
    })
    .await
    .map_err(join_error)??;

    if let Some(storage) = storage {
        storage
            .insert_article(&ArticleRow {
                id: article.id.clone(),
                content: article.source.clone(),
                created: article.created,
                modified: article.modified,
                title: article.title.clone(),
                uri: article.uri.clone(),
            })
            .await?;
    }

    Ok(EntityOutcome {
        kind: EntityKind::Article,
        uri: article.uri,
        revisions,
        untracked: article.untracked,
    })
}

async fn process_folder(ctx: Arc<RunContext>, path: PathBuf) -> Result<EntityOutcome> {
    tokio::task::spawn_blocking(move || {
        let folder = build_folder(&ctx, &path)?;
        write_folder(&ctx, &folder)?;
        Ok::<_, BockError>(EntityOutcome {
            kind: EntityKind::Folder,
            uri: folder.uri,
            revisions: 0,
            untracked: false,
        })
    })
    .await
    .map_err(join_error)?
}

/// A panicking or cancelled task is a fatal render failure.
fn join_error(e: JoinError) -> BockError {
    if e.is_panic() {
        BockError::Render(format!("task panicked: {e}"))
    } else {
        BockError::Render(format!("task cancelled: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use bock_history::CommitRecord;

    /// In-memory log keyed by root-relative path.
    #[derive(Default)]
    struct FakeVcs {
        logs: HashMap<String, Vec<CommitRecord>>,
        untracked: Vec<String>,
        fail: bool,
    }

    impl VersionControl for FakeVcs {
        fn is_untracked(&self, relative_path: &str) -> bool {
            self.untracked.iter().any(|p| p == relative_path)
        }

        fn log_for_path(&self, relative_path: &str) -> Result<Vec<CommitRecord>> {
            if self.fail {
                return Err(BockError::Git("object database is corrupt".into()));
            }
            Ok(self.logs.get(relative_path).cloned().unwrap_or_default())
        }
    }

    fn commit(id: &str, secs: i64, content: &str) -> CommitRecord {
        CommitRecord {
            id: id.into(),
            author_name: "Ada".into(),
            author_email: "ada@example.com".into(),
            when: Utc.timestamp_opt(secs, 0).unwrap(),
            subject: format!("edit {id}"),
            content: Some(content.into()),
        }
    }

    fn touch(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    /// Article root with two articles, a hidden one, home, and assets.
    fn wiki() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "Notes/Linux/setup.md", "# Setup\n\nInstall zsh.\n");
        touch(root, "Notes/Linux/.hidden/secret.md", "# Secret\n");
        touch(root, "Notes/README.md", "Notes about things.\n");
        touch(root, "Home.md", "# Welcome\n");
        touch(root, "__assets/bock.css", "body {}\n");
        dir
    }

    fn tracked_vcs() -> FakeVcs {
        let mut vcs = FakeVcs::default();
        vcs.logs.insert(
            "Notes/Linux/setup.md".into(),
            vec![
                commit("cccccccc11111111", 300, "# Setup\n\nInstall zsh.\n"),
                commit("bbbbbbbb22222222", 200, "# Setup\n\nInstall bash.\n"),
                commit("aaaaaaaa33333333", 100, "# Setup\n"),
            ],
        );
        vcs
    }

    fn config(root: &Path, out: &Path) -> GenerateConfig {
        GenerateConfig {
            article_root: root.to_path_buf(),
            output_folder: out.to_path_buf(),
            generate_raw: true,
            generate_json: true,
            generate_revisions: true,
            generate_database: true,
            use_on_disk_repository: true,
            concurrency: 4,
            ignore_patterns: vec![],
        }
    }

    fn snapshot(out: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        walkdir::WalkDir::new(out)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| !e.file_name().to_string_lossy().starts_with("articles.db"))
            .map(|e| {
                let rel = e.path().strip_prefix(out).unwrap().to_path_buf();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[derive(Default)]
    struct RecordingProgress {
        done: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn entities_planned(&self, _total: usize) {}
        fn entity_done(&self, uri: &str, _current: usize, _total: usize) {
            self.done.lock().unwrap().push(uri.to_string());
        }
        fn done(&self, _meta: &RunMeta) {}
    }

    #[tokio::test]
    async fn full_build_writes_the_output_layout() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());
        let progress = RecordingProgress::default();

        let meta = generate_with(&cfg, Some(Arc::new(tracked_vcs())), &progress)
            .await
            .unwrap();

        assert_eq!(meta.article_count, 2);
        assert_eq!(meta.folder_count, 3);
        assert_eq!(meta.revision_count, 3);
        assert_eq!(meta.untracked_count, 1);
        assert!(meta.is_repository);

        let o = out.path();
        for file in [
            "index.html",
            "404.html",
            "archive/index.html",
            "random/index.html",
            "tree.json",
            "Home/index.html",
            "assets/bock.css",
            "ROOT/index.html",
            "Notes/index.html",
            "Notes/Linux/index.html",
            "Notes/Linux/setup/index.html",
            "Notes/Linux/setup/raw/index.html",
            "Notes/Linux/setup/index.json",
            "Notes/Linux/setup/revisions/index.html",
            "Notes/Linux/setup/revisions/cccccccc/index.html",
            "Notes/Linux/setup/revisions/aaaaaaaa/raw/index.html",
            "Notes/Linux/setup/revisions/bbbbbbbb/index.json",
            "Notes/README/index.html",
        ] {
            assert!(o.join(file).is_file(), "missing {file}");
        }
        assert!(!o.join("Notes/Linux/.hidden").exists());

        let done = progress.done.lock().unwrap();
        assert_eq!(done.len(), 5);
        assert!(done.contains(&"/ROOT".to_string()));
    }

    #[tokio::test]
    async fn history_feeds_article_json() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(
            &std::fs::read(out.path().join("Notes/Linux/setup/index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["untracked"], false);
        assert_eq!(json["revisions"].as_array().unwrap().len(), 3);
        assert_eq!(json["revisions"][0]["shortId"], "cccccccc");
        assert_eq!(json["modified"], "1970-01-01T00:05:00Z");
        assert_eq!(json["created"], "1970-01-01T00:01:40Z");
        assert_eq!(json["hierarchy"][0]["name"], "ROOT");
    }

    #[tokio::test]
    async fn untracked_article_still_renders() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let o = out.path();
        assert!(o.join("Notes/README/index.html").is_file());
        assert!(!o.join("Notes/README/revisions").exists());

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(o.join("Notes/README/index.json")).unwrap())
                .unwrap();
        assert_eq!(json["untracked"], true);
        assert!(json["revisions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn folder_pages_list_direct_children_only() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out.path().join("Notes/index.json")).unwrap())
                .unwrap();
        let folders = json["children"]["folders"].as_array().unwrap();
        let articles = json["children"]["articles"].as_array().unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0]["uri"], "/Notes/Linux");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["uri"], "/Notes/README");
        assert_eq!(json["readme"], "Notes about things.\n");
    }

    #[tokio::test]
    async fn search_index_holds_every_article() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        let meta = generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let storage = Storage::open_readonly(&cfg.database_path()).await.unwrap();
        assert_eq!(
            storage.count_articles().await.unwrap(),
            meta.article_count as u64
        );
        let hits = storage.search("zsh", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "/Notes/Linux/setup");
    }

    #[tokio::test]
    async fn second_run_is_byte_identical() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();
        let first = snapshot(out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();
        let second = snapshot(out.path());

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn revisions_disabled_marks_nothing_untracked() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let mut cfg = config(root.path(), out.path());
        cfg.generate_revisions = false;
        cfg.concurrency = 0;

        let meta = generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(meta.revision_count, 0);
        assert_eq!(meta.untracked_count, 0);
        assert!(!meta.is_repository);
        assert!(!out.path().join("Notes/Linux/setup/revisions").exists());
    }

    #[tokio::test]
    async fn optional_outputs_follow_config() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let mut cfg = config(root.path(), out.path());
        cfg.generate_raw = false;
        cfg.generate_json = false;
        cfg.generate_database = false;

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let o = out.path();
        assert!(o.join("Notes/Linux/setup/index.html").is_file());
        assert!(!o.join("Notes/Linux/setup/raw").exists());
        assert!(!o.join("Notes/Linux/setup/index.json").exists());
        assert!(!o.join("Notes/index.json").exists());
        assert!(!cfg.database_path().exists());
    }

    #[tokio::test]
    async fn missing_home_gets_a_placeholder() {
        let root = wiki();
        std::fs::remove_file(root.path().join("Home.md")).unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();

        let home = std::fs::read_to_string(out.path().join("Home/index.html")).unwrap();
        assert!(home.contains("Home.md"));
        assert!(!root.path().join("Home.md").exists());
    }

    #[tokio::test]
    async fn empty_root_halts_before_writing() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "image.png", "x");
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        let err = generate_with(&cfg, None, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, BockError::NoArticles(_)));
        assert!(!out.path().join("index.html").exists());
        assert!(!cfg.database_path().exists());
    }

    #[tokio::test]
    async fn bad_roots_are_rejected() {
        let out = tempfile::tempdir().unwrap();

        let cfg = config(Path::new(""), out.path());
        let err = generate_with(&cfg, None, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, BockError::MissingArticleRoot));

        let cfg = config(&out.path().join("missing"), out.path());
        let err = generate_with(&cfg, None, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, BockError::BadArticleRoot(_)));
    }

    #[tokio::test]
    async fn colliding_uris_are_a_conflict() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "a b.md", "one");
        touch(root.path(), "a_b.md", "two");
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());

        let err = generate_with(&cfg, None, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, BockError::Conflict { .. }));
    }

    #[tokio::test]
    async fn fatal_history_error_rolls_back_the_index() {
        let root = wiki();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(root.path(), out.path());
        let vcs = FakeVcs {
            fail: true,
            ..FakeVcs::default()
        };

        let err = generate_with(&cfg, Some(Arc::new(vcs)), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, BockError::Git(_)));

        let storage = Storage::open_readonly(&cfg.database_path()).await.unwrap();
        assert_eq!(storage.count_articles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn entity_outputs_are_disjoint() {
        let root = wiki();
        touch(root.path(), "Notes/Linux/shell.md", "# Shell\n");
        touch(root.path(), "Other/page.md", "# Page\n");
        let out = tempfile::tempdir().unwrap();
        let mut cfg = config(root.path(), out.path());
        cfg.concurrency = 0;

        // The writer refuses a second write to any path, so a clean run
        // means every task wrote a disjoint set of files.
        let meta = generate_with(&cfg, Some(Arc::new(tracked_vcs())), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(meta.article_count, 4);
        assert_eq!(meta.folder_count, 4);
    }
}
