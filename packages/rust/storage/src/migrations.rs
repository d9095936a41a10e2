//! SQL migration definitions for the article search database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: articles, FTS5 mirror",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per rendered article
CREATE TABLE IF NOT EXISTS articles (
    id       TEXT NOT NULL UNIQUE,
    content  TEXT NOT NULL,
    created  TEXT NOT NULL,
    modified TEXT NOT NULL,
    title    TEXT NOT NULL,
    uri      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_uri ON articles(uri);

-- Full-text search mirror over articles
CREATE VIRTUAL TABLE IF NOT EXISTS articles_fts USING fts5(
    title,
    content,
    uri,
    content=articles,
    content_rowid=rowid
);

-- Triggers to keep FTS in sync with the articles table
CREATE TRIGGER IF NOT EXISTS articles_fts_insert AFTER INSERT ON articles BEGIN
    INSERT INTO articles_fts(rowid, title, content, uri)
    VALUES (new.rowid, new.title, new.content, new.uri);
END;

CREATE TRIGGER IF NOT EXISTS articles_fts_delete AFTER DELETE ON articles BEGIN
    INSERT INTO articles_fts(articles_fts, rowid, title, content, uri)
    VALUES ('delete', old.rowid, old.title, old.content, old.uri);
END;

CREATE TRIGGER IF NOT EXISTS articles_fts_update AFTER UPDATE ON articles BEGIN
    INSERT INTO articles_fts(articles_fts, rowid, title, content, uri)
    VALUES ('delete', old.rowid, old.title, old.content, old.uri);
    INSERT INTO articles_fts(rowid, title, content, uri)
    VALUES (new.rowid, new.title, new.content, new.uri);
END;

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
