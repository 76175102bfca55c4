use super::model::StoredRecord;
use crate::model::{PersistOutcome, Record};
use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// For file-backed SQLite URLs, expand a leading `~/` and ensure the parent
/// directory exists. Non-sqlite and in-memory URLs pass through untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = url["sqlite:".len()..].trim_start_matches("//");
    let (path_part, query_part) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match path_part.strip_prefix("~/") {
        Some(tail) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), tail),
            Err(_) => path_part.to_string(),
        },
        None => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = format!("sqlite://{}", expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Insert one record, classifying a unique-violation on `source_id` as a
/// [`PersistOutcome::Duplicate`] rather than an error. The existing row is
/// left untouched.
#[instrument(skip_all)]
pub async fn insert_record(pool: &Pool, record: &Record) -> Result<PersistOutcome> {
    let res = sqlx::query(
        "INSERT INTO records (record_id, source_id, created_at, text, author, language) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(record.record_id.to_string())
    .bind(record.source_id)
    .bind(record.created_at)
    .bind(&record.text)
    .bind(&record.author)
    .bind(&record.language)
    .execute(pool)
    .await;

    match res {
        Ok(_) => Ok(PersistOutcome::Inserted),
        Err(sqlx::Error::Database(db_err))
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Ok(PersistOutcome::Duplicate)
        }
        Err(err) => Err(err).context("failed to insert record"),
    }
}

#[instrument(skip_all)]
pub async fn count_records(pool: &Pool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[instrument(skip_all)]
pub async fn record_by_source_id(pool: &Pool, source_id: i64) -> Result<Option<StoredRecord>> {
    let row = sqlx::query(
        "SELECT record_id, source_id, created_at, text, author, language \
         FROM records WHERE source_id = ?",
    )
    .bind(source_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_record))
}

/// Records committed for one author display name, in insertion order.
#[instrument(skip_all)]
pub async fn records_by_author(pool: &Pool, author: &str) -> Result<Vec<StoredRecord>> {
    let rows = sqlx::query(
        "SELECT record_id, source_id, created_at, text, author, language \
         FROM records WHERE author = ? ORDER BY rowid",
    )
    .bind(author)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_to_record).collect())
}

#[instrument(skip_all)]
pub async fn distinct_authors(pool: &Pool) -> Result<Vec<String>> {
    let authors = sqlx::query_scalar("SELECT DISTINCT author FROM records ORDER BY author")
        .fetch_all(pool)
        .await?;
    Ok(authors)
}

fn row_to_record(row: SqliteRow) -> StoredRecord {
    StoredRecord {
        record_id: row.get("record_id"),
        source_id: row.get("source_id"),
        created_at: row.get("created_at"),
        text: row.get("text"),
        author: row.get("author"),
        language: row.get("language"),
    }
}
