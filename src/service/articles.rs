//! Article workflows: browsing, posting, reclassification and trash
//! migration.
//!
//! Browsing picks one of three modes from the resolved filter. The
//! unpaginated mode returns every match at once; an explicit date returns
//! exactly that day; otherwise the date cursor walks the distinct-date
//! timeline one day per request.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::dates::DisplayDate;
use crate::engine::navigator;
use crate::engine::patch::ArticlePatch;
use crate::filter::{self, RawArticleQuery};
use crate::storage::articles::DateScope;
use crate::storage::{self, Pool};
use crate::types::{derived_score, Article, ArticlePage, NewsError, Relevance, Sentiment};

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

/// Resolve the raw query and run the matching browse mode.
pub async fn browse(pool: &Pool, raw: &RawArticleQuery) -> Result<ArticlePage, NewsError> {
    let filter = filter::resolve(raw)?;

    if filter.wants_unpaginated() {
        let items = storage::articles::find_all_filtered(pool, &filter).await?;
        let total = items.len() as i64;
        debug!(total, "unpaginated browse");
        return Ok(ArticlePage {
            items,
            total,
            date: None,
            has_next: false,
            has_previous: false,
        });
    }

    if let Some(date) = filter.date {
        let date_text = date.to_string();
        let items = storage::articles::find_for_date(pool, &filter, &date_text).await?;
        let total = items.len() as i64;
        return Ok(ArticlePage {
            items,
            total,
            date: Some(date_text),
            has_next: false,
            has_previous: false,
        });
    }

    let dates = storage::articles::distinct_dates(pool, &filter).await?;
    let resolved = navigator::resolve(&dates, filter.before, filter.after);
    let Some(date_text) = resolved.date else {
        return Ok(ArticlePage::empty());
    };
    let items = storage::articles::find_for_cursor(pool, &filter, &date_text).await?;
    let total = storage::articles::count_matching(pool, &filter).await?;
    debug!(date = %date_text, total, "cursor browse");
    Ok(ArticlePage {
        items,
        total,
        date: Some(date_text),
        has_next: resolved.has_next,
        has_previous: resolved.has_previous,
    })
}

// ---------------------------------------------------------------------------
// Posting
// ---------------------------------------------------------------------------

/// Input for the posting workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub link: String,
    #[serde(default)]
    pub author: Option<String>,
    pub publisher: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    pub strategic: bool,
}

/// Create one article. The publisher must already be registered: its point
/// value becomes the article's raw score, and the derived score follows
/// from that and the (optional) sentiment.
#[instrument(skip_all)]
pub async fn create_article(pool: &Pool, input: NewArticle) -> Result<Article, NewsError> {
    let date = DisplayDate::parse(&input.date).ok_or_else(|| NewsError::InvalidDate {
        field: "date",
        value: input.date.clone(),
    })?;

    let sentiment = match input.sentiment.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(value) => match Sentiment::classify(Some(value)) {
            Some(sentiment) => Some(sentiment),
            None => {
                return Err(NewsError::Validation(format!(
                    "sentiment must be one of Positive, Negative, Neutral (got '{value}')"
                )))
            }
        },
    };

    let publisher = storage::publishers::find_by_trimmed_name(pool, &input.publisher)
        .await?
        .ok_or_else(|| NewsError::NotFound {
            entity: "publisher",
            key: input.publisher.trim().to_string(),
        })?;

    let article = Article {
        id: 0,
        display_date: Some(date.to_string()),
        title: input.title,
        body: input.body,
        link: input.link,
        author: input.author,
        publisher: input.publisher,
        topic: input.topic,
        sentiment: sentiment.map(|s| s.as_str().to_string()),
        relevance: None,
        raw_score: publisher.points,
        derived_score: derived_score(sentiment, publisher.points),
        strategic: input.strategic,
        category: None,
        subcategory: None,
        cycle: None,
    };
    let stored = storage::articles::insert(pool, &article).await?;
    info!(id = stored.id, publisher = %stored.publisher, "article created");
    Ok(stored)
}

// ---------------------------------------------------------------------------
// Reclassification
// ---------------------------------------------------------------------------

/// Two-phase update: write the validated patch, then recompute the derived
/// score from whatever sentiment the row now carries. Both phases share one
/// transaction.
#[instrument(skip_all)]
pub async fn update_article(
    pool: &Pool,
    id: i64,
    patch: ArticlePatch,
) -> Result<Article, NewsError> {
    let patch = patch.resolve()?;

    let mut tx = pool.begin().await?;
    let article = storage::articles::find_by_id_tx(&mut tx, id)
        .await?
        .ok_or_else(|| missing_article(id))?;

    storage::articles::apply_patch_tx(&mut tx, &article, &patch).await?;

    let patched = storage::articles::find_by_id_tx(&mut tx, id)
        .await?
        .ok_or_else(|| missing_article(id))?;
    let score = derived_score(patched.sentiment(), patched.raw_score);
    storage::articles::set_derived_score_tx(&mut tx, id, score).await?;

    let updated = storage::articles::find_by_id_tx(&mut tx, id)
        .await?
        .ok_or_else(|| missing_article(id))?;
    tx.commit().await?;

    info!(id, derived = score, "article reclassified");
    Ok(updated)
}

fn missing_article(id: i64) -> NewsError {
    NewsError::NotFound {
        entity: "article",
        key: id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Trash migration
// ---------------------------------------------------------------------------

/// Move every article whose relevance is exactly `Trash` into the archive
/// table (ids preserved), then delete the originals. Returns how many rows
/// moved.
#[instrument(skip_all)]
pub async fn migrate_trash(pool: &Pool) -> Result<u64, NewsError> {
    let mut tx = pool.begin().await?;
    let candidates = storage::articles::trash_candidates_tx(&mut tx).await?;
    for article in &candidates {
        storage::articles::archive_article_tx(&mut tx, article).await?;
    }
    let moved = storage::articles::purge_trash_tx(&mut tx).await?;
    tx.commit().await?;

    info!(moved, "trash migrated");
    Ok(moved)
}

// ---------------------------------------------------------------------------
// Date listings
// ---------------------------------------------------------------------------

pub async fn strategic_dates(pool: &Pool) -> Result<Vec<String>, NewsError> {
    storage::articles::listing_dates(pool, DateScope::Strategic).await
}

pub async fn useful_dates(pool: &Pool) -> Result<Vec<String>, NewsError> {
    storage::articles::listing_dates(pool, DateScope::Relevance(Relevance::Useful)).await
}

pub async fn trash_dates(pool: &Pool) -> Result<Vec<String>, NewsError> {
    storage::articles::listing_dates(pool, DateScope::Relevance(Relevance::Trash)).await
}

pub async fn support_dates(pool: &Pool) -> Result<Vec<String>, NewsError> {
    storage::articles::listing_dates(pool, DateScope::Relevance(Relevance::Support)).await
}

pub async fn unclassified_dates(pool: &Pool) -> Result<Vec<String>, NewsError> {
    storage::articles::listing_dates(pool, DateScope::Unclassified).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::patch::Change;
    use crate::storage::open_in_memory;
    use crate::types::Publisher;

    async fn seed_article(
        pool: &Pool,
        date: Option<&str>,
        sentiment: Option<&str>,
        relevance: Option<&str>,
    ) -> Article {
        let mut article = Article::sample();
        article.display_date = date.map(str::to_string);
        article.sentiment = sentiment.map(str::to_string);
        article.relevance = relevance.map(str::to_string);
        storage::articles::insert(pool, &article).await.unwrap()
    }

    async fn seed_publisher(pool: &Pool, name: &str, points: i64) -> Publisher {
        let publisher = Publisher {
            id: 0,
            name: name.to_string(),
            points,
            reach: "Local".to_string(),
            priority: "Medium".to_string(),
            url: None,
        };
        storage::publishers::insert(pool, &publisher).await.unwrap()
    }

    fn query() -> RawArticleQuery {
        RawArticleQuery::default()
    }

    // -- browse tests --

    #[tokio::test]
    async fn test_browse_defaults_to_newest_date() {
        let pool = open_in_memory().await.unwrap();
        seed_article(&pool, Some("05/01/2025"), None, None).await;
        seed_article(&pool, Some("20/01/2025"), None, None).await;
        seed_article(&pool, Some("15/01/2025"), None, None).await;

        let page = browse(&pool, &query()).await.unwrap();
        assert_eq!(page.date.as_deref(), Some("20/01/2025"));
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_browse_before_cursor_lands_on_next_older_day() {
        let pool = open_in_memory().await.unwrap();
        for date in ["20/01/2025", "15/01/2025", "10/01/2025", "05/01/2025"] {
            seed_article(&pool, Some(date), None, None).await;
        }

        let raw = RawArticleQuery {
            before: Some("2025-01-15".to_string()),
            ..query()
        };
        let page = browse(&pool, &raw).await.unwrap();
        assert_eq!(page.date.as_deref(), Some("10/01/2025"));
        assert!(page.has_next);
        assert!(page.has_previous);
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_browse_explicit_date_disables_cursor() {
        let pool = open_in_memory().await.unwrap();
        seed_article(&pool, Some("15/01/2025"), None, None).await;
        seed_article(&pool, Some("15/01/2025"), None, None).await;
        seed_article(&pool, Some("20/01/2025"), None, None).await;

        let raw = RawArticleQuery {
            date: Some("2025-01-15".to_string()),
            ..query()
        };
        let page = browse(&pool, &raw).await.unwrap();
        assert_eq!(page.date.as_deref(), Some("15/01/2025"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn test_browse_all_mode_needs_anchor() {
        let pool = open_in_memory().await.unwrap();
        let mut strategic = Article::sample();
        strategic.strategic = true;
        strategic.display_date = Some("10/01/2025".to_string());
        storage::articles::insert(&pool, &strategic).await.unwrap();
        seed_article(&pool, Some("11/01/2025"), None, None).await;

        // all=true alone is ignored; the cursor still runs.
        let raw = RawArticleQuery {
            all: Some("true".to_string()),
            ..query()
        };
        let page = browse(&pool, &raw).await.unwrap();
        assert!(page.date.is_some());

        // Anchored by strategic=true it returns everything at once.
        let raw = RawArticleQuery {
            all: Some("true".to_string()),
            strategic: Some("true".to_string()),
            ..query()
        };
        let page = browse(&pool, &raw).await.unwrap();
        assert_eq!(page.date, None);
        assert_eq!(page.total, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn test_browse_empty_dataset() {
        let pool = open_in_memory().await.unwrap();
        let page = browse(&pool, &query()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.date, None);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    // -- posting tests --

    #[tokio::test]
    async fn test_create_article_takes_score_from_publisher() {
        let pool = open_in_memory().await.unwrap();
        seed_publisher(&pool, "Gazette", 7).await;

        let input = NewArticle {
            date: "15/01/2025".to_string(),
            title: "Clinic opens".to_string(),
            body: None,
            link: "https://example.com/clinic".to_string(),
            author: None,
            publisher: "Gazette".to_string(),
            topic: Some("Health".to_string()),
            sentiment: Some("Negative".to_string()),
            strategic: false,
        };
        let stored = create_article(&pool, input).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.raw_score, 7);
        assert_eq!(stored.derived_score, -7);
        assert_eq!(stored.relevance, None);
        assert_eq!(stored.cycle, None);
    }

    #[tokio::test]
    async fn test_create_article_unknown_publisher() {
        let pool = open_in_memory().await.unwrap();
        let input = NewArticle {
            date: "15/01/2025".to_string(),
            title: "t".to_string(),
            body: None,
            link: "l".to_string(),
            author: None,
            publisher: "Nobody".to_string(),
            topic: None,
            sentiment: None,
            strategic: false,
        };
        let err = create_article(&pool, input).await.unwrap_err();
        assert!(matches!(err, NewsError::NotFound { entity: "publisher", .. }));
    }

    #[tokio::test]
    async fn test_create_article_rejects_bad_date_and_sentiment() {
        let pool = open_in_memory().await.unwrap();
        seed_publisher(&pool, "Gazette", 1).await;

        let mut input = NewArticle {
            date: "2025-01-15".to_string(),
            title: "t".to_string(),
            body: None,
            link: "l".to_string(),
            author: None,
            publisher: "Gazette".to_string(),
            topic: None,
            sentiment: None,
            strategic: false,
        };
        let err = create_article(&pool, input.clone()).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidDate { field: "date", .. }));

        input.date = "5/1/2025".to_string();
        let err = create_article(&pool, input.clone()).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidDate { .. }));

        input.date = "15/01/2025".to_string();
        input.sentiment = Some("happy".to_string());
        let err = create_article(&pool, input).await.unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    // -- update tests --

    #[tokio::test]
    async fn test_update_recomputes_derived_score() {
        let pool = open_in_memory().await.unwrap();
        let mut article = Article::sample();
        article.raw_score = 10;
        article.derived_score = 10;
        let stored = storage::articles::insert(&pool, &article).await.unwrap();

        let patch = ArticlePatch {
            sentiment: Change::Set("Negative".to_string()),
            ..ArticlePatch::default()
        };
        let updated = update_article(&pool, stored.id, patch).await.unwrap();
        assert_eq!(updated.sentiment.as_deref(), Some("Negative"));
        assert_eq!(updated.derived_score, -10);
        // Fields outside the patch survive.
        assert_eq!(updated.relevance, stored.relevance);
    }

    #[tokio::test]
    async fn test_update_clearing_sentiment_zeroes_derived() {
        let pool = open_in_memory().await.unwrap();
        let mut article = Article::sample();
        article.raw_score = 10;
        article.derived_score = 10;
        let stored = storage::articles::insert(&pool, &article).await.unwrap();

        let patch = ArticlePatch {
            sentiment: Change::Clear,
            ..ArticlePatch::default()
        };
        let updated = update_article(&pool, stored.id, patch).await.unwrap();
        assert_eq!(updated.sentiment, None);
        assert_eq!(updated.derived_score, 0);
    }

    #[tokio::test]
    async fn test_update_strategic_false_wipes_subfields() {
        let pool = open_in_memory().await.unwrap();
        let mut article = Article::sample();
        article.strategic = true;
        article.category = Some("Health".to_string());
        article.subcategory = Some("Clinics".to_string());
        article.cycle = Some(3);
        let stored = storage::articles::insert(&pool, &article).await.unwrap();

        let patch = ArticlePatch {
            strategic: Change::Set(false),
            ..ArticlePatch::default()
        };
        let updated = update_article(&pool, stored.id, patch).await.unwrap();
        assert!(!updated.strategic);
        assert_eq!(updated.category, None);
        assert_eq!(updated.subcategory, None);
        assert_eq!(updated.cycle, None);
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let pool = open_in_memory().await.unwrap();
        let patch = ArticlePatch {
            topic: Change::Set("Health".to_string()),
            ..ArticlePatch::default()
        };
        let err = update_article(&pool, 99, patch).await.unwrap_err();
        assert!(matches!(err, NewsError::NotFound { entity: "article", .. }));
    }

    #[tokio::test]
    async fn test_update_empty_patch_rejected() {
        let pool = open_in_memory().await.unwrap();
        let stored = seed_article(&pool, Some("10/01/2025"), None, None).await;
        let err = update_article(&pool, stored.id, ArticlePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    // -- trash migration tests --

    #[tokio::test]
    async fn test_migrate_trash_moves_exact_matches_only() {
        let pool = open_in_memory().await.unwrap();
        let a = seed_article(&pool, Some("10/01/2025"), None, Some("Trash")).await;
        let b = seed_article(&pool, Some("11/01/2025"), None, Some("Trash")).await;
        seed_article(&pool, Some("12/01/2025"), None, Some("Useful")).await;
        seed_article(&pool, Some("13/01/2025"), None, Some("trash")).await;

        let moved = migrate_trash(&pool).await.unwrap();
        assert_eq!(moved, 2);
        assert!(storage::articles::find_by_id(&pool, a.id).await.unwrap().is_none());
        assert!(storage::articles::find_by_id(&pool, b.id).await.unwrap().is_none());

        let archived: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trashed_articles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(archived, 2);
        let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(live, 2);
    }

    #[tokio::test]
    async fn test_migrate_trash_empty_is_zero() {
        let pool = open_in_memory().await.unwrap();
        assert_eq!(migrate_trash(&pool).await.unwrap(), 0);
    }

    // -- listing tests --

    #[tokio::test]
    async fn test_date_listings_by_population() {
        let pool = open_in_memory().await.unwrap();
        seed_article(&pool, Some("10/01/2025"), None, Some("Useful")).await;
        seed_article(&pool, Some("12/01/2025"), None, Some("Useful")).await;
        seed_article(&pool, Some("11/01/2025"), None, Some("Support")).await;
        seed_article(&pool, Some("09/01/2025"), None, None).await;

        assert_eq!(useful_dates(&pool).await.unwrap(), vec!["12/01/2025", "10/01/2025"]);
        assert_eq!(support_dates(&pool).await.unwrap(), vec!["11/01/2025"]);
        assert_eq!(unclassified_dates(&pool).await.unwrap(), vec!["09/01/2025"]);
        assert!(trash_dates(&pool).await.unwrap().is_empty());
    }
}
