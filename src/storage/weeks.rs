//! Strategic week queries.
//!
//! Plain CRUD. Overlap validation needs every row anyway, so it happens in
//! the service layer over [`list`].

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Pool;
use crate::types::{NewsError, StrategicWeek};

fn week_from_row(row: &SqliteRow) -> StrategicWeek {
    StrategicWeek {
        id: row.get("id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        cycle: row.get("cycle"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
    }
}

pub async fn list(pool: &Pool) -> Result<Vec<StrategicWeek>, NewsError> {
    let rows = sqlx::query("SELECT * FROM strategic_weeks ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(week_from_row).collect())
}

pub async fn find_by_id(pool: &Pool, id: i64) -> Result<Option<StrategicWeek>, NewsError> {
    let row = sqlx::query("SELECT * FROM strategic_weeks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(week_from_row))
}

/// Insert a new week (the id on `week` is ignored) and return the stored
/// row.
pub async fn insert(pool: &Pool, week: &StrategicWeek) -> Result<StrategicWeek, NewsError> {
    let row = sqlx::query(
        "INSERT INTO strategic_weeks (start_date, end_date, cycle, category, subcategory) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&week.start_date)
    .bind(&week.end_date)
    .bind(week.cycle)
    .bind(&week.category)
    .bind(&week.subcategory)
    .fetch_one(pool)
    .await?;
    Ok(week_from_row(&row))
}

/// Overwrite the row with the merged state prepared by the caller.
pub async fn update(pool: &Pool, week: &StrategicWeek) -> Result<(), NewsError> {
    sqlx::query(
        "UPDATE strategic_weeks SET start_date = ?, end_date = ?, cycle = ?, category = ?, \
         subcategory = ? WHERE id = ?",
    )
    .bind(&week.start_date)
    .bind(&week.end_date)
    .bind(week.cycle)
    .bind(&week.category)
    .bind(&week.subcategory)
    .bind(week.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &Pool, id: i64) -> Result<u64, NewsError> {
    let result = sqlx::query("DELETE FROM strategic_weeks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_in_memory;

    fn week(start: &str, end: &str, cycle: i64) -> StrategicWeek {
        StrategicWeek {
            id: 0,
            start_date: start.to_string(),
            end_date: end.to_string(),
            cycle,
            category: Some("Health".to_string()),
            subcategory: None,
        }
    }

    #[tokio::test]
    async fn test_insert_list_and_find() {
        let pool = open_in_memory().await.unwrap();
        let a = insert(&pool, &week("01/01/2025", "07/01/2025", 1)).await.unwrap();
        let b = insert(&pool, &week("08/01/2025", "14/01/2025", 2)).await.unwrap();

        let all = list(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);

        let found = find_by_id(&pool, b.id).await.unwrap().unwrap();
        assert_eq!(found.cycle, 2);
        assert_eq!(found.category.as_deref(), Some("Health"));
        assert!(find_by_id(&pool, b.id + 50).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_overwrites_row() {
        let pool = open_in_memory().await.unwrap();
        let mut stored = insert(&pool, &week("01/01/2025", "07/01/2025", 1)).await.unwrap();
        stored.end_date = "09/01/2025".to_string();
        stored.category = None;
        update(&pool, &stored).await.unwrap();

        let found = find_by_id(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(found.end_date, "09/01/2025");
        assert_eq!(found.category, None);
    }

    #[tokio::test]
    async fn test_delete_reports_row_count() {
        let pool = open_in_memory().await.unwrap();
        let stored = insert(&pool, &week("01/01/2025", "07/01/2025", 1)).await.unwrap();
        assert_eq!(delete(&pool, stored.id).await.unwrap(), 1);
        assert_eq!(delete(&pool, stored.id).await.unwrap(), 0);
        assert!(list(&pool).await.unwrap().is_empty());
    }
}
