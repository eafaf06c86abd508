//! SQLite persistence layer.
//!
//! Owns the connection pool, the schema and all SQL. Queries are grouped by
//! table into submodules; callers above this layer never see SQL strings.
//!
//! Dates are stored exactly as received (`DD/MM/YYYY` text). Queries that
//! need calendar order rearrange the column into `YYYY-MM-DD` on the fly,
//! see [`articles::DATE_KEY`].

pub mod articles;
pub mod publishers;
pub mod weeks;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::NewsError;

pub type Pool = SqlitePool;

/// One `CREATE` statement per entry; executed in order at startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS articles (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        display_date  TEXT,
        title         TEXT NOT NULL DEFAULT '',
        body          TEXT,
        link          TEXT NOT NULL DEFAULT '',
        author        TEXT,
        publisher     TEXT NOT NULL DEFAULT '',
        topic         TEXT,
        sentiment     TEXT,
        relevance     TEXT,
        raw_score     INTEGER NOT NULL DEFAULT 0,
        derived_score INTEGER NOT NULL DEFAULT 0,
        strategic     INTEGER NOT NULL DEFAULT 0,
        category      TEXT,
        subcategory   TEXT,
        cycle         INTEGER
    )",
    // Archived rows keep their original id, so no AUTOINCREMENT here.
    "CREATE TABLE IF NOT EXISTS trashed_articles (
        id            INTEGER PRIMARY KEY,
        display_date  TEXT,
        title         TEXT NOT NULL DEFAULT '',
        body          TEXT,
        link          TEXT NOT NULL DEFAULT '',
        author        TEXT,
        publisher     TEXT NOT NULL DEFAULT '',
        topic         TEXT,
        sentiment     TEXT,
        relevance     TEXT,
        raw_score     INTEGER NOT NULL DEFAULT 0,
        derived_score INTEGER NOT NULL DEFAULT 0,
        strategic     INTEGER NOT NULL DEFAULT 0,
        category      TEXT,
        subcategory   TEXT,
        cycle         INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS publishers (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT NOT NULL,
        points   INTEGER NOT NULL DEFAULT 0,
        reach    TEXT NOT NULL,
        priority TEXT NOT NULL,
        url      TEXT
    )",
    "CREATE TABLE IF NOT EXISTS trashed_publishers (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT NOT NULL,
        points   INTEGER NOT NULL DEFAULT 0,
        reach    TEXT NOT NULL,
        priority TEXT NOT NULL,
        url      TEXT
    )",
    "CREATE TABLE IF NOT EXISTS strategic_weeks (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        start_date  TEXT NOT NULL,
        end_date    TEXT NOT NULL,
        cycle       INTEGER NOT NULL,
        category    TEXT,
        subcategory TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_articles_relevance ON articles (relevance)",
    "CREATE INDEX IF NOT EXISTS idx_articles_sentiment ON articles (sentiment)",
    "CREATE INDEX IF NOT EXISTS idx_articles_publisher ON articles (publisher)",
    "CREATE INDEX IF NOT EXISTS idx_articles_date ON articles (display_date)",
];

/// Open (creating if needed) the database at `database_url` and apply the
/// schema. The URL uses the `sqlite://path/to.db` form.
pub async fn open(database_url: &str) -> Result<Pool, NewsError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&pool).await?;

    init_schema(&pool).await?;
    info!(url = database_url, "database ready");
    Ok(pool)
}

/// In-memory database for tests. Capped at one connection: each new
/// connection to `sqlite::memory:` would otherwise get its own empty
/// database.
pub async fn open_in_memory() -> Result<Pool, NewsError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

async fn init_schema(pool: &Pool) -> Result<(), NewsError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
