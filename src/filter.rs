//! Filter resolution: raw request parameters in, validated predicates out.
//!
//! Every date-bearing field is converted from the external `YYYY-MM-DD`
//! form to a [`DisplayDate`]; enum fields are checked against their
//! vocabulary; boolean flags are tri-state (absent / true / false) and
//! never error. Resolution fails fast on the first bad field, before any
//! storage work happens.

use serde::Deserialize;
use std::str::FromStr;

use crate::dates::{self, DisplayDate};
use crate::types::{NewsError, Relevance, Sentiment};

// ---------------------------------------------------------------------------
// Raw request shapes
// ---------------------------------------------------------------------------

/// Browse-query parameters exactly as they arrive at the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticleQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub relevance: Option<String>,
    pub sentiment: Option<String>,
    pub strategic: Option<String>,
    pub all: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
}

/// Dashboard window parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub force_recent: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved filter
// ---------------------------------------------------------------------------

/// Sentiment predicate. A blank request value means "explicitly
/// unclassified" and matches rows with null sentiment; an absent value
/// means no predicate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentFilter {
    #[default]
    Any,
    Unclassified,
    Is(Sentiment),
}

/// Normalized, validated predicate set for article queries.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub from: Option<DisplayDate>,
    pub to: Option<DisplayDate>,
    pub date: Option<DisplayDate>,
    pub before: Option<DisplayDate>,
    pub after: Option<DisplayDate>,
    pub relevance: Option<Relevance>,
    pub sentiment: SentimentFilter,
    pub strategic: Option<bool>,
    pub all: Option<bool>,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
}

impl ArticleFilter {
    /// Whether the "return everything, unpaginated" mode applies: the
    /// `all` flag only takes effect anchored to a strategic or relevance
    /// predicate; otherwise cursor pagination proceeds.
    pub fn wants_unpaginated(&self) -> bool {
        self.all == Some(true) && (self.strategic == Some(true) || self.relevance.is_some())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve raw browse parameters into an [`ArticleFilter`].
pub fn resolve(raw: &RawArticleQuery) -> Result<ArticleFilter, NewsError> {
    Ok(ArticleFilter {
        from: convert_date(raw.from.as_deref(), "from")?,
        to: convert_date(raw.to.as_deref(), "to")?,
        date: convert_date(raw.date.as_deref(), "date")?,
        before: convert_date(raw.before.as_deref(), "before")?,
        after: convert_date(raw.after.as_deref(), "after")?,
        relevance: convert_relevance(raw.relevance.as_deref())?,
        sentiment: convert_sentiment(raw.sentiment.as_deref())?,
        strategic: tri_state(raw.strategic.as_deref()),
        all: tri_state(raw.all.as_deref()),
        topic: non_blank(raw.topic.as_deref()),
        title: non_blank(raw.title.as_deref()),
        publisher: non_blank(raw.publisher.as_deref()),
    })
}

/// Resolve the dashboard date window against the process clock.
pub fn resolve_window(
    raw: &RawWindowQuery,
) -> Result<Option<(DisplayDate, DisplayDate)>, NewsError> {
    resolve_window_at(raw, DisplayDate::today())
}

/// Deterministic variant of [`resolve_window`] anchored at a given day:
/// `force_recent` wins with a 30-day window; two bounds are validated
/// against each other; a single bound is completed to a 30-day window or
/// extended to today; no bounds means no window.
pub fn resolve_window_at(
    raw: &RawWindowQuery,
    today: DisplayDate,
) -> Result<Option<(DisplayDate, DisplayDate)>, NewsError> {
    if tri_state(raw.force_recent.as_deref()) == Some(true) {
        return Ok(Some(dates::last_n_days_from(today.date(), 30)));
    }

    let from = convert_date(raw.from.as_deref(), "from")?;
    let to = convert_date(raw.to.as_deref(), "to")?;

    match (from, to) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(NewsError::Validation(
                    "start date is after end date".to_string(),
                ));
            }
            Ok(Some((from, to)))
        }
        (Some(from), None) => Ok(Some((from, today))),
        (None, Some(to)) => {
            let start = DisplayDate::from(to.date() - chrono::Duration::days(30));
            Ok(Some((start, to)))
        }
        (None, None) => Ok(None),
    }
}

/// Tri-state boolean: "true"/"false" (case-insensitive) convert, anything
/// else counts as absent. Never an error.
pub fn tri_state(raw: Option<&str>) -> Option<bool> {
    match raw.map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "true" => Some(true),
        Some(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn convert_date(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<DisplayDate>, NewsError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DisplayDate::from_iso(s)
            .map(Some)
            .ok_or_else(|| NewsError::InvalidDate {
                field,
                value: s.to_string(),
            }),
    }
}

// A blank or literal-"null" relevance means no predicate; contrast with
// sentiment, where a blank means explicitly unclassified.
fn convert_relevance(value: Option<&str>) -> Result<Option<Relevance>, NewsError> {
    match value.map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(s) => Relevance::from_str(s)
            .map(Some)
            .map_err(|_| NewsError::InvalidFilter {
                field: "relevance",
                value: s.to_string(),
            }),
    }
}

fn convert_sentiment(value: Option<&str>) -> Result<SentimentFilter, NewsError> {
    match value {
        None => Ok(SentimentFilter::Any),
        Some("") => Ok(SentimentFilter::Unclassified),
        Some(s) => Sentiment::from_str(s)
            .map(SentimentFilter::Is)
            .map_err(|_| NewsError::InvalidFilter {
                field: "sentiment",
                value: s.to_string(),
            }),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") => None,
        Some(s) => Some(s.to_string()),
    }
}
