//! Dashboard assembly.
//!
//! Every endpoint follows the same shape: resolve the optional date window,
//! fetch the matching row set, hand it to a reducer. The leaderboards add a
//! second aggregation pass plus the publisher point registry.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::aggregator;
use crate::engine::ranker::{self, LeaderboardView};
use crate::filter::{self, RawWindowQuery};
use crate::storage::{self, Pool};
use crate::types::{
    MonthBucket, MonthSentiment, NewsError, Overview, PublisherEntry, StrategicOverview,
};

/// Window totals and the per-day series over Useful, sentiment-classified
/// articles.
pub async fn overview(pool: &Pool, raw: &RawWindowQuery) -> Result<Overview, NewsError> {
    let window = filter::resolve_window(raw)?;
    let rows = storage::articles::useful_classified(pool, window).await?;
    debug!(rows = rows.len(), windowed = window.is_some(), "overview");
    Ok(aggregator::overview(&rows))
}

/// Per-month article counts over the full classified history.
pub async fn monthly_counts(pool: &Pool) -> Result<Vec<MonthBucket>, NewsError> {
    let rows = storage::articles::useful_classified(pool, None).await?;
    Ok(aggregator::monthly_counts(&rows))
}

/// Per-month sentiment breakdown over the full classified history.
pub async fn monthly_sentiment(pool: &Pool) -> Result<Vec<MonthSentiment>, NewsError> {
    let rows = storage::articles::useful_classified(pool, None).await?;
    Ok(aggregator::monthly_sentiment(&rows))
}

/// Window totals and the per-day category series over strategic articles.
pub async fn strategic_summary(
    pool: &Pool,
    raw: &RawWindowQuery,
) -> Result<StrategicOverview, NewsError> {
    let window = filter::resolve_window(raw)?;
    let rows = storage::articles::strategic_classified(pool, window).await?;
    Ok(aggregator::strategic_overview(&rows))
}

pub async fn positive_leaderboard(
    pool: &Pool,
    raw: &RawWindowQuery,
) -> Result<Vec<PublisherEntry>, NewsError> {
    leaderboard(pool, raw, LeaderboardView::Positive).await
}

pub async fn negative_leaderboard(
    pool: &Pool,
    raw: &RawWindowQuery,
) -> Result<Vec<PublisherEntry>, NewsError> {
    leaderboard(pool, raw, LeaderboardView::Negative).await
}

/// Two-pass leaderboard: count the view's target sentiment per publisher,
/// then fill in the other two sentiments for just those publishers, and
/// let the ranker score and order them.
async fn leaderboard(
    pool: &Pool,
    raw: &RawWindowQuery,
    view: LeaderboardView,
) -> Result<Vec<PublisherEntry>, NewsError> {
    let window = filter::resolve_window(raw)?;
    let primary = storage::articles::publisher_counts(pool, view.target(), window).await?;
    let names: Vec<String> = primary.iter().map(|(name, _)| name.clone()).collect();
    let secondary =
        storage::articles::publisher_sentiment_counts(pool, &names, &view.target().others(), window)
            .await?;
    let points = publisher_points(pool).await?;
    debug!(candidates = primary.len(), ?view, "leaderboard assembled");
    Ok(ranker::rank(view, &primary, &secondary, &points))
}

/// Point values keyed by trimmed publisher name. The first row wins when
/// two registry rows trim to the same name.
async fn publisher_points(pool: &Pool) -> Result<HashMap<String, i64>, NewsError> {
    let publishers = storage::publishers::list(pool).await?;
    let mut points = HashMap::new();
    for publisher in publishers {
        points
            .entry(publisher.name.trim().to_string())
            .or_insert(publisher.points);
    }
    Ok(points)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
