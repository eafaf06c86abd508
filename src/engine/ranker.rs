//! Leaderboard ranker — top-5 publishers by derived score.
//!
//! Works over the two aggregation passes the service layer runs: the
//! first pass counts the view's target sentiment per publisher, the
//! second fills in the other two classes for the same publishers under
//! the same date window. Point values come from an explicit name → points
//! table built once per request; a publisher missing from that table is
//! excluded outright.

use std::collections::HashMap;
use tracing::debug;

use crate::types::{PublisherEntry, Sentiment};

/// Which leaderboard is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardView {
    Positive,
    Negative,
}

impl LeaderboardView {
    /// The sentiment the first aggregation pass counts.
    pub fn target(&self) -> Sentiment {
        match self {
            LeaderboardView::Positive => Sentiment::Positive,
            LeaderboardView::Negative => Sentiment::Negative,
        }
    }
}

/// Rank publishers for one view.
///
/// `primary` holds (publisher, count-of-target-sentiment) rows in
/// first-encounter order; that order is the tie-break. `secondary` maps
/// (publisher, sentiment) to counts for the two remaining classes.
pub fn rank(
    view: LeaderboardView,
    primary: &[(String, i64)],
    secondary: &HashMap<(String, Sentiment), i64>,
    points: &HashMap<String, i64>,
) -> Vec<PublisherEntry> {
    let target = view.target();
    let mut entries: Vec<PublisherEntry> = Vec::with_capacity(primary.len());

    for (name, target_count) in primary {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(&point_value) = points.get(trimmed) else {
            // No registered point value; the publisher cannot be scored.
            continue;
        };

        let mut positive = 0i64;
        let mut negative = 0i64;
        let mut neutral = 0i64;
        match target {
            Sentiment::Positive => positive = *target_count,
            Sentiment::Negative => negative = *target_count,
            Sentiment::Neutral => neutral = *target_count,
        }
        for other in target.others() {
            let count = secondary
                .get(&(name.clone(), other))
                .copied()
                .unwrap_or(0);
            match other {
                Sentiment::Positive => positive = count,
                Sentiment::Negative => negative = count,
                Sentiment::Neutral => neutral = count,
            }
        }

        let quantity = positive + negative + neutral;
        entries.push(PublisherEntry {
            publisher: trimmed.to_string(),
            quantity,
            positive,
            negative,
            neutral,
            score: positive * point_value - negative * point_value,
            positive_pct: pct(positive, quantity),
            negative_pct: pct(negative, quantity),
            neutral_pct: pct(neutral, quantity),
        });
    }

    match view {
        LeaderboardView::Positive => {
            entries.sort_by(|a, b| b.score.cmp(&a.score));
        }
        LeaderboardView::Negative => {
            entries.retain(|e| e.score < 0);
            entries.sort_by(|a, b| a.score.cmp(&b.score));
        }
    }
    entries.truncate(5);

    debug!(view = ?view, entries = entries.len(), "ranked leaderboard");
    entries
}

/// Whole-number percentage with a `%` suffix; `"0%"` when the whole is 0.
fn pct(part: i64, whole: i64) -> String {
    if whole == 0 {
        return "0%".to_string();
    }
    let rounded = ((part as f64 / whole as f64) * 100.0).round() as i64;
    format!("{rounded}%")
}
