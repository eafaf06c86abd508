//! API route handlers.
//!
//! Every handler extracts its inputs, delegates to one service function
//! and wraps the result in JSON. Errors bubble up as `NewsError`; the
//! status mapping lives on the error type's `IntoResponse`.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::ApiState;
use crate::engine::patch::ArticlePatch;
use crate::filter::{RawArticleQuery, RawWindowQuery};
use crate::service::articles::{self, NewArticle};
use crate::service::dashboard;
use crate::service::publishers::{self, NewPublisher, PublisherUpdate};
use crate::service::weeks::{self, NewWeek, WeekUpdate};
use crate::types::{
    Article, ArticlePage, MonthBucket, MonthSentiment, NewsError, Overview, Publisher,
    PublisherEntry, StrategicOverview, StrategicWeek,
};

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/dashboard
pub async fn get_overview(
    State(state): State<ApiState>,
    Query(raw): Query<RawWindowQuery>,
) -> Result<Json<Overview>, NewsError> {
    Ok(Json(dashboard::overview(&state.pool, &raw).await?))
}

/// GET /api/dashboard/months
pub async fn get_monthly_counts(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MonthBucket>>, NewsError> {
    Ok(Json(dashboard::monthly_counts(&state.pool).await?))
}

/// GET /api/dashboard/months/sentiment
pub async fn get_monthly_sentiment(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MonthSentiment>>, NewsError> {
    Ok(Json(dashboard::monthly_sentiment(&state.pool).await?))
}

/// GET /api/dashboard/strategic
pub async fn get_strategic_summary(
    State(state): State<ApiState>,
    Query(raw): Query<RawWindowQuery>,
) -> Result<Json<StrategicOverview>, NewsError> {
    Ok(Json(dashboard::strategic_summary(&state.pool, &raw).await?))
}

/// GET /api/dashboard/publishers/positive
pub async fn get_positive_leaderboard(
    State(state): State<ApiState>,
    Query(raw): Query<RawWindowQuery>,
) -> Result<Json<Vec<PublisherEntry>>, NewsError> {
    Ok(Json(dashboard::positive_leaderboard(&state.pool, &raw).await?))
}

/// GET /api/dashboard/publishers/negative
pub async fn get_negative_leaderboard(
    State(state): State<ApiState>,
    Query(raw): Query<RawWindowQuery>,
) -> Result<Json<Vec<PublisherEntry>>, NewsError> {
    Ok(Json(dashboard::negative_leaderboard(&state.pool, &raw).await?))
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// GET /api/articles
pub async fn get_articles(
    State(state): State<ApiState>,
    Query(raw): Query<RawArticleQuery>,
) -> Result<Json<ArticlePage>, NewsError> {
    Ok(Json(articles::browse(&state.pool, &raw).await?))
}

/// POST /api/articles
pub async fn post_article(
    State(state): State<ApiState>,
    Json(input): Json<NewArticle>,
) -> Result<(StatusCode, Json<Article>), NewsError> {
    let stored = articles::create_article(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// PATCH /api/articles/:id
pub async fn patch_article(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(patch): Json<ArticlePatch>,
) -> Result<Json<Article>, NewsError> {
    Ok(Json(articles::update_article(&state.pool, id, patch).await?))
}

/// POST /api/articles/trash/migrate
pub async fn migrate_trash(State(state): State<ApiState>) -> Result<Json<Value>, NewsError> {
    let moved = articles::migrate_trash(&state.pool).await?;
    Ok(Json(json!({ "moved": moved })))
}

/// GET /api/articles/dates/strategic
pub async fn get_strategic_dates(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, NewsError> {
    Ok(Json(articles::strategic_dates(&state.pool).await?))
}

/// GET /api/articles/dates/trash
pub async fn get_trash_dates(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, NewsError> {
    Ok(Json(articles::trash_dates(&state.pool).await?))
}

/// GET /api/articles/dates/support
pub async fn get_support_dates(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, NewsError> {
    Ok(Json(articles::support_dates(&state.pool).await?))
}

/// GET /api/articles/dates/useful
pub async fn get_useful_dates(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, NewsError> {
    Ok(Json(articles::useful_dates(&state.pool).await?))
}

/// GET /api/articles/dates/unclassified
pub async fn get_unclassified_dates(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, NewsError> {
    Ok(Json(articles::unclassified_dates(&state.pool).await?))
}

// ---------------------------------------------------------------------------
// Publishers
// ---------------------------------------------------------------------------

/// GET /api/publishers
pub async fn get_publishers(
    State(state): State<ApiState>,
) -> Result<Json<HashMap<String, Publisher>>, NewsError> {
    Ok(Json(publishers::list_map(&state.pool).await?))
}

/// GET /api/publishers/:key (key is a publisher name)
pub async fn get_publisher_by_name(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<Publisher>, NewsError> {
    Ok(Json(publishers::find_by_name(&state.pool, &key).await?))
}

/// POST /api/publishers
pub async fn post_publisher(
    State(state): State<ApiState>,
    Json(input): Json<NewPublisher>,
) -> Result<(StatusCode, Json<Publisher>), NewsError> {
    let stored = publishers::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// PATCH /api/publishers/:key (key is a numeric id)
pub async fn patch_publisher(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Json(patch): Json<PublisherUpdate>,
) -> Result<Json<Publisher>, NewsError> {
    let id = numeric_key(&key)?;
    Ok(Json(publishers::update(&state.pool, id, patch).await?))
}

/// DELETE /api/publishers/:key (key is a numeric id)
pub async fn delete_publisher(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<StatusCode, NewsError> {
    let id = numeric_key(&key)?;
    publishers::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Strategic weeks
// ---------------------------------------------------------------------------

/// GET /api/weeks
pub async fn get_weeks(
    State(state): State<ApiState>,
) -> Result<Json<Vec<StrategicWeek>>, NewsError> {
    Ok(Json(weeks::list(&state.pool).await?))
}

/// POST /api/weeks
pub async fn post_week(
    State(state): State<ApiState>,
    Json(input): Json<NewWeek>,
) -> Result<(StatusCode, Json<StrategicWeek>), NewsError> {
    let stored = weeks::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// PATCH /api/weeks/:id
pub async fn patch_week(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(patch): Json<WeekUpdate>,
) -> Result<Json<StrategicWeek>, NewsError> {
    Ok(Json(weeks::update(&state.pool, id, patch).await?))
}

/// DELETE /api/weeks/:id
pub async fn delete_week(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, NewsError> {
    weeks::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn numeric_key(key: &str) -> Result<i64, NewsError> {
    key.trim()
        .parse()
        .map_err(|_| NewsError::Validation(format!("numeric id expected (got '{key}')")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_in_memory;

    #[tokio::test]
    async fn test_health_returns_ok() {
        assert_eq!(health().await, StatusCode::OK);
    }

    #[test]
    fn test_numeric_key_parses_or_rejects() {
        assert_eq!(numeric_key("42").unwrap(), 42);
        assert_eq!(numeric_key(" 7 ").unwrap(), 7);
        assert!(matches!(
            numeric_key("Gazette").unwrap_err(),
            NewsError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_get_overview_on_empty_database() {
        let pool = open_in_memory().await.unwrap();
        let state = ApiState { pool };
        let Json(report) = get_overview(State(state), Query(RawWindowQuery::default()))
            .await
            .unwrap();
        assert_eq!(report.total, 0);
        assert!(report.daily.is_empty());
    }

    #[tokio::test]
    async fn test_post_article_returns_created() {
        let pool = open_in_memory().await.unwrap();
        let publisher = crate::types::Publisher {
            id: 0,
            name: "Gazette".to_string(),
            points: 5,
            reach: "Local".to_string(),
            priority: "Medium".to_string(),
            url: None,
        };
        crate::storage::publishers::insert(&pool, &publisher)
            .await
            .unwrap();
        let state = ApiState { pool };

        let input = NewArticle {
            date: "15/01/2025".to_string(),
            title: "Clinic opens".to_string(),
            body: None,
            link: "https://example.com/clinic".to_string(),
            author: None,
            publisher: "Gazette".to_string(),
            topic: None,
            sentiment: Some("Positive".to_string()),
            strategic: false,
        };
        let (status, Json(stored)) = post_article(State(state), Json(input)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stored.derived_score, 5);
    }
}
