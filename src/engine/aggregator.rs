//! Aggregator — sentiment totals, per-day, per-month and category series.
//!
//! The central reducer. Callers apply the policy pre-filters (Useful +
//! classified for the general dashboard, strategic + non-blank category
//! for the strategic one); this module only folds the rows it is given.
//! Day buckets are keyed canonically so that syntactic variants of the
//! same calendar date collapse together, and every output series is
//! sorted by calendar date, never by insertion order.

use std::collections::BTreeMap;
use tracing::debug;

use crate::dates;
use crate::types::{
    Article, DayBucket, MonthBucket, MonthSentiment, Overview, Sentiment, StrategicDay,
    StrategicOverview,
};

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Window totals plus the per-day series.
///
/// Rows without a display date count toward the totals but cannot be
/// placed in the daily series.
pub fn overview(articles: &[Article]) -> Overview {
    let mut positive = 0i64;
    let mut negative = 0i64;
    let mut neutral = 0i64;
    let mut buckets: BTreeMap<String, DayBucket> = BTreeMap::new();

    for article in articles {
        let sentiment = article.sentiment();
        match sentiment {
            Some(Sentiment::Positive) => positive += 1,
            Some(Sentiment::Negative) => negative += 1,
            Some(Sentiment::Neutral) => neutral += 1,
            None => {}
        }

        let Some(raw_date) = article.display_date.as_deref() else {
            continue;
        };
        let key = dates::day_key(raw_date);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| DayBucket {
            date: key,
            quantity: 0,
            score: 0,
            positive: 0,
            negative: 0,
            neutral: 0,
        });
        bucket.quantity += 1;
        bucket.score += article.derived_score;
        match sentiment {
            Some(Sentiment::Positive) => bucket.positive += 1,
            Some(Sentiment::Negative) => bucket.negative += 1,
            Some(Sentiment::Neutral) => bucket.neutral += 1,
            None => {}
        }
    }

    debug!(
        total = articles.len(),
        days = buckets.len(),
        "aggregated daily series"
    );

    Overview {
        total: articles.len() as i64,
        positive,
        negative,
        neutral,
        daily: buckets.into_values().collect(),
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// Per-month article counts, ascending chronological order. Months with
/// no qualifying article never appear; rows whose display date does not
/// parse are skipped.
pub fn monthly_counts(articles: &[Article]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for article in articles {
        let Some(key) = article.display_date.as_deref().and_then(dates::month_key) else {
            continue;
        };
        *months.entry(key).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|((_, month), quantity)| MonthBucket {
            label: dates::month_label(month).to_string(),
            quantity,
        })
        .collect()
}

/// Per-month sentiment counts, ascending chronological order.
pub fn monthly_sentiment(articles: &[Article]) -> Vec<MonthSentiment> {
    let mut months: BTreeMap<(i32, u32), (i64, i64, i64)> = BTreeMap::new();
    for article in articles {
        let Some(key) = article.display_date.as_deref().and_then(dates::month_key) else {
            continue;
        };
        let counts = months.entry(key).or_insert((0, 0, 0));
        match article.sentiment() {
            Some(Sentiment::Positive) => counts.0 += 1,
            Some(Sentiment::Negative) => counts.1 += 1,
            Some(Sentiment::Neutral) => counts.2 += 1,
            None => {}
        }
    }
    months
        .into_iter()
        .map(|((_, month), (positive, negative, neutral))| MonthSentiment {
            label: dates::month_label(month).to_string(),
            positive,
            negative,
            neutral,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Strategic series
// ---------------------------------------------------------------------------

/// Strategic totals plus the per-day category series.
///
/// Every row contributes to the totals and opens its day bucket; only
/// the four tracked categories increment a counter. Unknown category
/// strings are dropped silently — tolerated legacy data, not an error.
pub fn strategic_overview(articles: &[Article]) -> StrategicOverview {
    let mut score = 0i64;
    let mut buckets: BTreeMap<String, StrategicDay> = BTreeMap::new();

    for article in articles {
        score += article.derived_score;

        let Some(raw_date) = article.display_date.as_deref() else {
            continue;
        };
        let key = dates::day_key(raw_date);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| StrategicDay {
            date: key,
            infrastructure: 0,
            social: 0,
            education: 0,
            health: 0,
        });
        use crate::types::StrategicCategory::*;
        match article.strategic_category() {
            Some(Infrastructure) => bucket.infrastructure += 1,
            Some(Social) => bucket.social += 1,
            Some(Education) => bucket.education += 1,
            Some(Health) => bucket.health += 1,
            None => {}
        }
    }

    StrategicOverview {
        total: articles.len() as i64,
        score,
        daily: buckets.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::derived_score;
    use std::str::FromStr;

    fn make_article(id: i64, date: &str, sentiment: Option<&str>, raw_score: i64) -> Article {
        let derived = derived_score(
            sentiment.and_then(|s| Sentiment::from_str(s).ok()),
            raw_score,
        );
        Article {
            id,
            display_date: Some(date.to_string()),
            title: format!("article {id}"),
            body: None,
            link: format!("https://news.example.com/{id}"),
            author: None,
            publisher: "Daily Example".to_string(),
            topic: None,
            sentiment: sentiment.map(str::to_string),
            relevance: Some("Useful".to_string()),
            raw_score,
            derived_score: derived,
            strategic: false,
            category: None,
            subcategory: None,
            cycle: None,
        }
    }

    fn strategic_article(id: i64, date: &str, category: &str, raw_score: i64) -> Article {
        let mut article = make_article(id, date, Some("Positive"), raw_score);
        article.strategic = true;
        article.category = Some(category.to_string());
        article
    }

    // -- overview tests --

    #[test]
    fn test_overview_three_article_scenario() {
        let articles = vec![
            make_article(1, "10/01/2025", Some("Positive"), 10),
            make_article(2, "10/01/2025", Some("Negative"), 10),
            make_article(3, "11/01/2025", Some("Neutral"), 10),
        ];
        let report = overview(&articles);

        assert_eq!(report.total, 3);
        assert_eq!(report.positive, 1);
        assert_eq!(report.negative, 1);
        assert_eq!(report.neutral, 1);

        assert_eq!(report.daily.len(), 2);
        let first = &report.daily[0];
        assert_eq!(first.date, "2025-01-10");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.score, 0); // +10 and −10 cancel out
        assert_eq!(first.positive, 1);
        assert_eq!(first.negative, 1);
        assert_eq!(first.neutral, 0);

        let second = &report.daily[1];
        assert_eq!(second.date, "2025-01-11");
        assert_eq!(second.quantity, 1);
        assert_eq!(second.neutral, 1);
    }

    #[test]
    fn test_overview_trims_sentiment_whitespace() {
        let articles = vec![
            make_article(1, "10/01/2025", Some(" Positive "), 5),
            make_article(2, "10/01/2025", Some("Positive"), 5),
        ];
        let report = overview(&articles);
        assert_eq!(report.positive, 2);
        assert_eq!(report.daily[0].positive, 2);
    }

    #[test]
    fn test_overview_buckets_date_variants_together() {
        let articles = vec![
            make_article(1, "10/01/2025", Some("Positive"), 5),
            make_article(2, "10/1/2025", Some("Negative"), 5),
        ];
        let report = overview(&articles);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].date, "2025-01-10");
        assert_eq!(report.daily[0].quantity, 2);
    }

    #[test]
    fn test_overview_sorted_ascending_by_calendar_date() {
        let articles = vec![
            make_article(1, "02/02/2025", Some("Positive"), 1),
            make_article(2, "10/01/2025", Some("Positive"), 1),
            make_article(3, "25/12/2024", Some("Positive"), 1),
        ];
        let report = overview(&articles);
        let keys: Vec<&str> = report.daily.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(keys, vec!["2024-12-25", "2025-01-10", "2025-02-02"]);
    }

    #[test]
    fn test_overview_malformed_date_keeps_raw_key() {
        let articles = vec![make_article(1, "sometime soon", Some("Positive"), 3)];
        let report = overview(&articles);
        assert_eq!(report.daily[0].date, "sometime soon");
        assert_eq!(report.daily[0].quantity, 1);
    }

    #[test]
    fn test_overview_blank_sentiment_counts_total_only() {
        let articles = vec![
            make_article(1, "10/01/2025", Some(""), 5),
            make_article(2, "10/01/2025", None, 5),
        ];
        let report = overview(&articles);
        assert_eq!(report.total, 2);
        assert_eq!(report.positive + report.negative + report.neutral, 0);
        assert_eq!(report.daily[0].quantity, 2);
        assert_eq!(report.daily[0].score, 0);
    }

    #[test]
    fn test_overview_day_score_sums_derived_scores() {
        let articles = vec![
            make_article(1, "10/01/2025", Some("Positive"), 7),
            make_article(2, "10/01/2025", Some("Positive"), 3),
            make_article(3, "10/01/2025", Some("Negative"), 4),
        ];
        let report = overview(&articles);
        assert_eq!(report.daily[0].score, 7 + 3 - 4);
    }

    // -- monthly tests --

    #[test]
    fn test_monthly_counts_order_and_labels() {
        let articles = vec![
            make_article(1, "15/01/2025", Some("Positive"), 1),
            make_article(2, "20/12/2024", Some("Positive"), 1),
            make_article(3, "16/01/2025", Some("Negative"), 1),
            make_article(4, "whenever", Some("Positive"), 1),
        ];
        let months = monthly_counts(&articles);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].label, "December");
        assert_eq!(months[0].quantity, 1);
        assert_eq!(months[1].label, "January");
        assert_eq!(months[1].quantity, 2);
    }

    #[test]
    fn test_monthly_sentiment_counts() {
        let articles = vec![
            make_article(1, "15/01/2025", Some("Positive"), 1),
            make_article(2, "16/01/2025", Some("Negative"), 1),
            make_article(3, "17/01/2025", Some("Negative"), 1),
            make_article(4, "18/01/2025", Some("Neutral"), 1),
        ];
        let months = monthly_sentiment(&articles);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].label, "January");
        assert_eq!(months[0].positive, 1);
        assert_eq!(months[0].negative, 2);
        assert_eq!(months[0].neutral, 1);
    }

    // -- strategic tests --

    #[test]
    fn test_strategic_overview_counts_categories() {
        let articles = vec![
            strategic_article(1, "10/01/2025", "Infrastructure", 10),
            strategic_article(2, "10/01/2025", "Health", 5),
            strategic_article(3, "11/01/2025", "Education", 2),
        ];
        let report = strategic_overview(&articles);
        assert_eq!(report.total, 3);
        assert_eq!(report.score, 17);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[0].infrastructure, 1);
        assert_eq!(report.daily[0].health, 1);
        assert_eq!(report.daily[1].education, 1);
    }

    #[test]
    fn test_strategic_overview_drops_unknown_category_silently() {
        let articles = vec![
            strategic_article(1, "10/01/2025", "Sports", 10),
            strategic_article(2, "10/01/2025", "Social", 4),
        ];
        let report = strategic_overview(&articles);
        // The unknown row still counts toward totals and its day exists.
        assert_eq!(report.total, 2);
        assert_eq!(report.score, 14);
        let day = &report.daily[0];
        assert_eq!(day.social, 1);
        assert_eq!(
            day.infrastructure + day.education + day.health,
            0
        );
    }

    #[test]
    fn test_strategic_day_with_only_unknown_categories_is_all_zero() {
        let articles = vec![strategic_article(1, "12/01/2025", "Folklore", 1)];
        let report = strategic_overview(&articles);
        assert_eq!(report.daily.len(), 1);
        let day = &report.daily[0];
        assert_eq!(day.date, "2025-01-12");
        assert_eq!(
            day.infrastructure + day.social + day.education + day.health,
            0
        );
    }
}
