//! libSQL storage for the article search index.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one row per
//! article plus an FTS5 mirror kept in sync by triggers.
//!
//! **Access rules:**
//! - Generation: read-write via [`Storage::create`], one transaction per run
//! - Search: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use bock_shared::{BockError, Result};

/// A row of the `articles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub id: String,
    /// Markdown source, indexed for search.
    pub content: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub title: String,
    pub uri: String,
}

/// A search result from FTS5.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub uri: String,
    pub title: String,
    /// FTS5 rank score (lower is better).
    pub score: f64,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    /// Serializes statement execution on the shared connection.
    write_lock: Mutex<()>,
    readonly: bool,
}

impl Storage {
    /// Create a fresh database at `path`, replacing any previous one.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BockError::io(parent, e))?;
        }

        for stale in [
            path.to_path_buf(),
            path.with_extension("db-wal"),
            path.with_extension("db-shm"),
        ] {
            match std::fs::remove_file(&stale) {
                Ok(()) => debug!(path = %stale.display(), "removed previous database file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(BockError::io(&stale, e)),
            }
        }

        let storage = Self::connect(path, false).await?;
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BockError::Storage(format!(
                "database not found: {}",
                path.display()
            )));
        }
        Self::connect(path, true).await
    }

    async fn connect(path: &Path, readonly: bool) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| BockError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| BockError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            write_lock: Mutex::new(()),
            readonly,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        BockError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(BockError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Run transaction
    // -----------------------------------------------------------------------

    /// Open the run transaction.
    pub async fn begin(&self) -> Result<()> {
        self.batch("BEGIN").await
    }

    /// Commit the run transaction.
    pub async fn commit(&self) -> Result<()> {
        self.batch("COMMIT").await
    }

    /// Discard everything written since [`Storage::begin`].
    pub async fn rollback(&self) -> Result<()> {
        self.batch("ROLLBACK").await
    }

    async fn batch(&self, sql: &str) -> Result<()> {
        self.check_writable()?;
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute_batch(sql)
            .await
            .map_err(|e| BockError::Storage(format!("{sql} failed: {e}")))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Article operations
    // -----------------------------------------------------------------------

    /// Insert one article row. Calls from concurrent tasks are serialized.
    pub async fn insert_article(&self, row: &ArticleRow) -> Result<()> {
        self.check_writable()?;
        let created = row.created.to_rfc3339();
        let modified = row.modified.to_rfc3339();

        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "INSERT INTO articles (id, content, created, modified, title, uri)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id.as_str(),
                    row.content.as_str(),
                    created.as_str(),
                    modified.as_str(),
                    row.title.as_str(),
                    row.uri.as_str()
                ],
            )
            .await
            .map_err(|e| BockError::Storage(format!("insert {}: {e}", row.uri)))?;
        Ok(())
    }

    /// Number of article rows.
    pub async fn count_articles(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM articles", params![])
            .await
            .map_err(|e| BockError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n.max(0) as u64)
                .map_err(|e| BockError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(BockError::Storage(e.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // FTS search
    // -----------------------------------------------------------------------

    /// Full-text search across article titles, sources, and URIs.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
        let mut rows = self
            .conn
            .query(
                "SELECT articles.uri, articles.title, articles_fts.rank
                 FROM articles_fts
                 JOIN articles ON articles.rowid = articles_fts.rowid
                 WHERE articles_fts MATCH ?1
                 ORDER BY articles_fts.rank
                 LIMIT ?2",
                params![query, limit],
            )
            .await
            .map_err(|e| BockError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| BockError::Storage(format!("search '{query}': {e}")))?
        {
            let column = |e: libsql::Error| BockError::Storage(e.to_string());
            results.push(SearchResult {
                uri: row.get(0).map_err(column)?,
                title: row.get(1).map_err(column)?,
                score: row.get(2).map_err(column)?,
            });
        }
        Ok(results)
    }
}
