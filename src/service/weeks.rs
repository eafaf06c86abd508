//! Strategic-week registry workflows.
//!
//! A week is an inclusive date interval tagged with a cycle number and an
//! optional category. Intervals must not overlap. The check scans every
//! stored week, which is fine at registry scale; two racing writers can
//! still both pass it, a known limitation.

use serde::Deserialize;
use tracing::{info, instrument};

use crate::dates::DisplayDate;
use crate::storage::{self, Pool};
use crate::types::{NewsError, StrategicWeek};

/// Input for creating a week. Required fields are checked here rather than
/// at deserialization so the caller gets the domain error taxonomy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewWeek {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cycle: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeekUpdate {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cycle: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl WeekUpdate {
    fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.cycle.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
    }
}

pub async fn list(pool: &Pool) -> Result<Vec<StrategicWeek>, NewsError> {
    storage::weeks::list(pool).await
}

#[instrument(skip_all)]
pub async fn create(pool: &Pool, input: NewWeek) -> Result<StrategicWeek, NewsError> {
    let start_text = input.start_date.ok_or_else(|| required("start_date"))?;
    let end_text = input.end_date.ok_or_else(|| required("end_date"))?;
    let cycle = input.cycle.ok_or_else(|| required("cycle"))?;

    let (start, end) = parse_interval(&start_text, &end_text)?;
    check_overlap(pool, start, end, None).await?;

    let week = StrategicWeek {
        id: 0,
        start_date: start_text,
        end_date: end_text,
        cycle,
        category: input.category,
        subcategory: input.subcategory,
    };
    let stored = storage::weeks::insert(pool, &week).await?;
    info!(id = stored.id, start = %stored.start_date, end = %stored.end_date, "week created");
    Ok(stored)
}

/// The effective interval is provided-or-existing per field; it then runs
/// the same validation chain as create, with this week excluded from the
/// overlap scan.
#[instrument(skip_all)]
pub async fn update(pool: &Pool, id: i64, patch: WeekUpdate) -> Result<StrategicWeek, NewsError> {
    if patch.is_empty() {
        return Err(NewsError::Validation(
            "no updatable fields supplied".to_string(),
        ));
    }

    let mut week = storage::weeks::find_by_id(pool, id)
        .await?
        .ok_or_else(|| missing(id))?;

    if let Some(start) = patch.start_date {
        week.start_date = start;
    }
    if let Some(end) = patch.end_date {
        week.end_date = end;
    }
    if let Some(cycle) = patch.cycle {
        week.cycle = cycle;
    }
    if let Some(category) = patch.category {
        week.category = Some(category);
    }
    if let Some(subcategory) = patch.subcategory {
        week.subcategory = Some(subcategory);
    }

    let (start, end) = parse_interval(&week.start_date, &week.end_date)?;
    check_overlap(pool, start, end, Some(id)).await?;

    storage::weeks::update(pool, &week).await?;
    info!(id, "week updated");
    Ok(week)
}

#[instrument(skip_all)]
pub async fn delete(pool: &Pool, id: i64) -> Result<(), NewsError> {
    let deleted = storage::weeks::delete(pool, id).await?;
    if deleted == 0 {
        return Err(missing(id));
    }
    info!(id, "week deleted");
    Ok(())
}

fn parse_interval(start: &str, end: &str) -> Result<(DisplayDate, DisplayDate), NewsError> {
    let start = DisplayDate::parse(start).ok_or_else(|| NewsError::InvalidDate {
        field: "start_date",
        value: start.to_string(),
    })?;
    let end = DisplayDate::parse(end).ok_or_else(|| NewsError::InvalidDate {
        field: "end_date",
        value: end.to_string(),
    })?;
    if start > end {
        return Err(NewsError::Validation(
            "start date is after end date".to_string(),
        ));
    }
    Ok((start, end))
}

/// Inclusive-interval overlap scan over the stored weeks. Rows whose stored
/// dates no longer parse are skipped.
async fn check_overlap(
    pool: &Pool,
    start: DisplayDate,
    end: DisplayDate,
    exclude: Option<i64>,
) -> Result<(), NewsError> {
    for other in storage::weeks::list(pool).await? {
        if exclude == Some(other.id) {
            continue;
        }
        let (Some(other_start), Some(other_end)) = (
            DisplayDate::parse(&other.start_date),
            DisplayDate::parse(&other.end_date),
        ) else {
            continue;
        };
        if start <= other_end && end >= other_start {
            return Err(NewsError::Validation(format!(
                "week overlaps existing week {} to {}",
                other.start_date, other.end_date
            )));
        }
    }
    Ok(())
}

fn missing(id: i64) -> NewsError {
    NewsError::NotFound {
        entity: "week",
        key: id.to_string(),
    }
}

fn required(field: &str) -> NewsError {
    NewsError::Validation(format!("{field} is required"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_in_memory;

    fn week(start: &str, end: &str) -> NewWeek {
        NewWeek {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            cycle: Some(1),
            category: None,
            subcategory: None,
        }
    }

    // -- create tests --

    #[tokio::test]
    async fn test_create_disjoint_weeks() {
        let pool = open_in_memory().await.unwrap();
        create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();
        create(&pool, week("08/01/2025", "14/01/2025")).await.unwrap();
        assert_eq!(list(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_overlap() {
        let pool = open_in_memory().await.unwrap();
        create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();
        create(&pool, week("08/01/2025", "14/01/2025")).await.unwrap();

        let err = create(&pool, week("05/01/2025", "10/01/2025")).await.unwrap_err();
        match err {
            NewsError::Validation(message) => {
                assert!(message.contains("01/01/2025"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_boundaries_are_inclusive() {
        let pool = open_in_memory().await.unwrap();
        create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();

        // Sharing an endpoint counts as overlap.
        let err = create(&pool, week("07/01/2025", "09/01/2025")).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));

        create(&pool, week("08/01/2025", "09/01/2025")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let pool = open_in_memory().await.unwrap();

        let mut input = week("01/01/2025", "07/01/2025");
        input.cycle = None;
        let err = create(&pool, input).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));

        let err = create(&pool, week("2025-01-01", "07/01/2025")).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidDate { field: "start_date", .. }));

        let err = create(&pool, week("08/01/2025", "01/01/2025")).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    // -- update tests --

    #[tokio::test]
    async fn test_update_excludes_self_from_scan() {
        let pool = open_in_memory().await.unwrap();
        let stored = create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();

        // Shrinking within its own interval must not self-collide.
        let patch = WeekUpdate {
            end_date: Some("05/01/2025".to_string()),
            ..WeekUpdate::default()
        };
        let updated = update(&pool, stored.id, patch).await.unwrap();
        assert_eq!(updated.end_date, "05/01/2025");
    }

    #[tokio::test]
    async fn test_update_still_checks_other_weeks() {
        let pool = open_in_memory().await.unwrap();
        create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();
        let second = create(&pool, week("08/01/2025", "14/01/2025")).await.unwrap();

        let patch = WeekUpdate {
            start_date: Some("06/01/2025".to_string()),
            ..WeekUpdate::default()
        };
        let err = update(&pool, second.id, patch).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_empty_and_missing() {
        let pool = open_in_memory().await.unwrap();
        let stored = create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();

        let err = update(&pool, stored.id, WeekUpdate::default()).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));

        let patch = WeekUpdate {
            cycle: Some(2),
            ..WeekUpdate::default()
        };
        let err = update(&pool, stored.id + 40, patch).await.unwrap_err();
        assert!(matches!(err, NewsError::NotFound { .. }));
    }

    // -- delete tests --

    #[tokio::test]
    async fn test_delete_missing_week() {
        let pool = open_in_memory().await.unwrap();
        let stored = create(&pool, week("01/01/2025", "07/01/2025")).await.unwrap();
        delete(&pool, stored.id).await.unwrap();
        let err = delete(&pool, stored.id).await.unwrap_err();
        assert!(matches!(err, NewsError::NotFound { .. }));
    }
}
