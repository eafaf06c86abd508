//! Publisher queries.
//!
//! The table is small; name lookups load the list and match on trimmed
//! names in Rust, the same comparison the leaderboards use. Nothing here
//! enforces name uniqueness. Duplicate handling lives in the service layer.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::Pool;
use crate::types::{NewsError, Publisher};

fn publisher_from_row(row: &SqliteRow) -> Publisher {
    Publisher {
        id: row.get("id"),
        name: row.get("name"),
        points: row.get("points"),
        reach: row.get("reach"),
        priority: row.get("priority"),
        url: row.get("url"),
    }
}

pub async fn list(pool: &Pool) -> Result<Vec<Publisher>, NewsError> {
    let rows = sqlx::query("SELECT * FROM publishers ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(publisher_from_row).collect())
}

pub async fn find_by_id(pool: &Pool, id: i64) -> Result<Option<Publisher>, NewsError> {
    let row = sqlx::query("SELECT * FROM publishers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(publisher_from_row))
}

/// First publisher whose trimmed name equals the trimmed input.
pub async fn find_by_trimmed_name(
    pool: &Pool,
    name: &str,
) -> Result<Option<Publisher>, NewsError> {
    let wanted = name.trim();
    let publishers = list(pool).await?;
    Ok(publishers.into_iter().find(|p| p.name.trim() == wanted))
}

/// Insert a new publisher (the id on `publisher` is ignored) and return the
/// stored row.
pub async fn insert(pool: &Pool, publisher: &Publisher) -> Result<Publisher, NewsError> {
    let row = sqlx::query(
        "INSERT INTO publishers (name, points, reach, priority, url) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&publisher.name)
    .bind(publisher.points)
    .bind(&publisher.reach)
    .bind(&publisher.priority)
    .bind(&publisher.url)
    .fetch_one(pool)
    .await?;
    Ok(publisher_from_row(&row))
}

/// Overwrite the row with the merged state prepared by the caller.
pub async fn update(pool: &Pool, publisher: &Publisher) -> Result<(), NewsError> {
    sqlx::query(
        "UPDATE publishers SET name = ?, points = ?, reach = ?, priority = ?, url = ? \
         WHERE id = ?",
    )
    .bind(&publisher.name)
    .bind(publisher.points)
    .bind(&publisher.reach)
    .bind(&publisher.priority)
    .bind(&publisher.url)
    .bind(publisher.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<Option<Publisher>, NewsError> {
    let row = sqlx::query("SELECT * FROM publishers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.as_ref().map(publisher_from_row))
}

/// Copy a publisher into the archive table under a fresh archival id.
pub async fn archive_publisher_tx(
    tx: &mut Transaction<'_, Sqlite>,
    publisher: &Publisher,
) -> Result<(), NewsError> {
    sqlx::query(
        "INSERT INTO trashed_publishers (name, points, reach, priority, url) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&publisher.name)
    .bind(publisher.points)
    .bind(&publisher.reach)
    .bind(&publisher.priority)
    .bind(&publisher.url)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<u64, NewsError> {
    let result = sqlx::query("DELETE FROM publishers WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
