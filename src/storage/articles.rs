//! Article queries.
//!
//! Filters arrive as a resolved [`ArticleFilter`] and are turned into SQL
//! here: predicates collect into a clause list plus a text bind list, so
//! every query stays parameterized. Enum predicates compare against the
//! raw stored column, so only canonically-spelled rows match.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;

use super::Pool;
use crate::dates::DisplayDate;
use crate::engine::patch::{ArticlePatch, Change};
use crate::filter::{ArticleFilter, SentimentFilter};
use crate::types::{Article, NewsError, Relevance, Sentiment};

/// Rearranges the stored `DD/MM/YYYY` text into `YYYY-MM-DD` so SQL string
/// comparison follows calendar order. Null dates compare as null and drop
/// out of range predicates.
pub const DATE_KEY: &str =
    "substr(display_date, 7, 4) || '-' || substr(display_date, 4, 2) || '-' || substr(display_date, 1, 2)";

const BASE_SELECT: &str = "SELECT * FROM articles";

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn article_from_row(row: &SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        display_date: row.get("display_date"),
        title: row.get("title"),
        body: row.get("body"),
        link: row.get("link"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        topic: row.get("topic"),
        sentiment: row.get("sentiment"),
        relevance: row.get("relevance"),
        raw_score: row.get("raw_score"),
        derived_score: row.get("derived_score"),
        strategic: row.get("strategic"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        cycle: row.get("cycle"),
    }
}

// ---------------------------------------------------------------------------
// Predicate assembly
// ---------------------------------------------------------------------------

/// Non-date predicates from the filter.
fn push_filter_sql(filter: &ArticleFilter, clauses: &mut Vec<String>, binds: &mut Vec<String>) {
    if let Some(relevance) = filter.relevance {
        clauses.push("relevance = ?".into());
        binds.push(relevance.as_str().to_string());
    }
    match &filter.sentiment {
        SentimentFilter::Any => {}
        SentimentFilter::Unclassified => clauses.push("sentiment IS NULL".into()),
        SentimentFilter::Is(sentiment) => {
            clauses.push("sentiment = ?".into());
            binds.push(sentiment.as_str().to_string());
        }
    }
    if let Some(strategic) = filter.strategic {
        clauses.push(format!("strategic = {}", if strategic { 1 } else { 0 }));
    }
    if let Some(topic) = &filter.topic {
        clauses.push("LOWER(topic) = LOWER(?)".into());
        binds.push(topic.clone());
    }
    if let Some(title) = &filter.title {
        clauses.push("LOWER(title) LIKE '%' || LOWER(?) || '%'".into());
        binds.push(title.clone());
    }
    if let Some(publisher) = &filter.publisher {
        clauses.push("LOWER(publisher) = LOWER(?)".into());
        binds.push(publisher.clone());
    }
}

/// Calendar-range predicates over the rearranged date key.
fn push_range_sql(
    from: Option<DisplayDate>,
    to: Option<DisplayDate>,
    clauses: &mut Vec<String>,
    binds: &mut Vec<String>,
) {
    if let Some(from) = from {
        clauses.push(format!("{DATE_KEY} >= ?"));
        binds.push(from.iso_key());
    }
    if let Some(to) = to {
        clauses.push(format!("{DATE_KEY} <= ?"));
        binds.push(to.iso_key());
    }
}

fn where_clause(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

async fn fetch_articles(
    pool: &Pool,
    sql: &str,
    binds: Vec<String>,
) -> Result<Vec<Article>, NewsError> {
    let mut query = sqlx::query(sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(article_from_row).collect())
}

// ---------------------------------------------------------------------------
// Browse queries
// ---------------------------------------------------------------------------

/// Every row matching the filter (predicates plus date range), newest
/// calendar date first, ties broken by newest id.
pub async fn find_all_filtered(
    pool: &Pool,
    filter: &ArticleFilter,
) -> Result<Vec<Article>, NewsError> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    push_filter_sql(filter, &mut clauses, &mut binds);
    push_range_sql(filter.from, filter.to, &mut clauses, &mut binds);

    let sql = format!(
        "{BASE_SELECT}{} ORDER BY {DATE_KEY} DESC, id DESC",
        where_clause(&clauses)
    );
    let articles = fetch_articles(pool, &sql, binds).await?;
    debug!(rows = articles.len(), "unpaginated fetch");
    Ok(articles)
}

/// Rows on an explicitly requested date. The range predicates still apply
/// when given alongside the date.
pub async fn find_for_date(
    pool: &Pool,
    filter: &ArticleFilter,
    date: &str,
) -> Result<Vec<Article>, NewsError> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    push_filter_sql(filter, &mut clauses, &mut binds);
    push_range_sql(filter.from, filter.to, &mut clauses, &mut binds);
    clauses.push("display_date = ?".into());
    binds.push(date.to_string());

    let sql = format!("{BASE_SELECT}{} ORDER BY id DESC", where_clause(&clauses));
    fetch_articles(pool, &sql, binds).await
}

/// Rows on a cursor-resolved date. The date came out of [`distinct_dates`],
/// so the range predicates have already done their work and are skipped.
pub async fn find_for_cursor(
    pool: &Pool,
    filter: &ArticleFilter,
    date: &str,
) -> Result<Vec<Article>, NewsError> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    push_filter_sql(filter, &mut clauses, &mut binds);
    clauses.push("display_date = ?".into());
    binds.push(date.to_string());

    let sql = format!("{BASE_SELECT}{} ORDER BY id DESC", where_clause(&clauses));
    fetch_articles(pool, &sql, binds).await
}

/// Distinct non-null display dates matching the filter, newest first.
pub async fn distinct_dates(pool: &Pool, filter: &ArticleFilter) -> Result<Vec<String>, NewsError> {
    let mut clauses = vec!["display_date IS NOT NULL".to_string()];
    let mut binds = Vec::new();
    push_filter_sql(filter, &mut clauses, &mut binds);
    push_range_sql(filter.from, filter.to, &mut clauses, &mut binds);

    let sql = format!(
        "SELECT display_date FROM articles{} GROUP BY display_date ORDER BY {DATE_KEY} DESC",
        where_clause(&clauses)
    );
    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| row.get::<String, _>("display_date"))
        .collect())
}

/// Total row count over the filter and range, independent of any cursor.
pub async fn count_matching(pool: &Pool, filter: &ArticleFilter) -> Result<i64, NewsError> {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    push_filter_sql(filter, &mut clauses, &mut binds);
    push_range_sql(filter.from, filter.to, &mut clauses, &mut binds);

    let sql = format!("SELECT COUNT(*) FROM articles{}", where_clause(&clauses));
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for bind in binds {
        query = query.bind(bind);
    }
    Ok(query.fetch_one(pool).await?)
}

// ---------------------------------------------------------------------------
// Date listings
// ---------------------------------------------------------------------------

/// Which article population a date listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateScope {
    Strategic,
    Relevance(Relevance),
    Unclassified,
}

/// Distinct non-null display dates in the scope, newest first.
pub async fn listing_dates(pool: &Pool, scope: DateScope) -> Result<Vec<String>, NewsError> {
    let mut clauses = vec!["display_date IS NOT NULL".to_string()];
    let mut binds = Vec::new();
    match scope {
        DateScope::Strategic => clauses.push("strategic = 1".into()),
        DateScope::Relevance(relevance) => {
            clauses.push("relevance = ?".into());
            binds.push(relevance.as_str().to_string());
        }
        DateScope::Unclassified => clauses.push("relevance IS NULL".into()),
    }

    let sql = format!(
        "SELECT display_date FROM articles{} GROUP BY display_date ORDER BY {DATE_KEY} DESC",
        where_clause(&clauses)
    );
    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| row.get::<String, _>("display_date"))
        .collect())
}

// ---------------------------------------------------------------------------
// Dashboard row sets
// ---------------------------------------------------------------------------

/// Useful articles carrying one of the three sentiment labels, optionally
/// restricted to a date window.
pub async fn useful_classified(
    pool: &Pool,
    window: Option<(DisplayDate, DisplayDate)>,
) -> Result<Vec<Article>, NewsError> {
    let mut clauses = vec![
        "relevance = ?".to_string(),
        format!("sentiment IN ({})", placeholders(Sentiment::ALL.len())),
    ];
    let mut binds = vec![Relevance::Useful.as_str().to_string()];
    binds.extend(Sentiment::ALL.iter().map(|s| s.as_str().to_string()));
    if let Some((from, to)) = window {
        push_range_sql(Some(from), Some(to), &mut clauses, &mut binds);
    }

    let sql = format!("{BASE_SELECT}{}", where_clause(&clauses));
    fetch_articles(pool, &sql, binds).await
}

/// Strategic articles with an assigned category, optionally windowed.
pub async fn strategic_classified(
    pool: &Pool,
    window: Option<(DisplayDate, DisplayDate)>,
) -> Result<Vec<Article>, NewsError> {
    let mut clauses = vec![
        "strategic = 1".to_string(),
        "category IS NOT NULL".to_string(),
    ];
    let mut binds = Vec::new();
    if let Some((from, to)) = window {
        push_range_sql(Some(from), Some(to), &mut clauses, &mut binds);
    }

    let sql = format!("{BASE_SELECT}{}", where_clause(&clauses));
    fetch_articles(pool, &sql, binds).await
}

/// Per-publisher row counts for one sentiment. No ORDER BY: the scan order
/// decides leaderboard tie-breaks downstream, matching first-encountered
/// insertion order.
pub async fn publisher_counts(
    pool: &Pool,
    sentiment: Sentiment,
    window: Option<(DisplayDate, DisplayDate)>,
) -> Result<Vec<(String, i64)>, NewsError> {
    let mut clauses = vec!["sentiment = ?".to_string()];
    let mut binds = vec![sentiment.as_str().to_string()];
    if let Some((from, to)) = window {
        push_range_sql(Some(from), Some(to), &mut clauses, &mut binds);
    }

    let sql = format!(
        "SELECT publisher, COUNT(*) AS qty FROM articles{} GROUP BY publisher",
        where_clause(&clauses)
    );
    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| (row.get::<String, _>("publisher"), row.get::<i64, _>("qty")))
        .collect())
}

/// Row counts per (publisher, sentiment) pair for the named publishers,
/// restricted to the given sentiments.
pub async fn publisher_sentiment_counts(
    pool: &Pool,
    publishers: &[String],
    sentiments: &[Sentiment],
    window: Option<(DisplayDate, DisplayDate)>,
) -> Result<HashMap<(String, Sentiment), i64>, NewsError> {
    if publishers.is_empty() {
        return Ok(HashMap::new());
    }

    let mut clauses = vec![
        format!("publisher IN ({})", placeholders(publishers.len())),
        format!("sentiment IN ({})", placeholders(sentiments.len())),
    ];
    let mut binds: Vec<String> = publishers.to_vec();
    binds.extend(sentiments.iter().map(|s| s.as_str().to_string()));
    if let Some((from, to)) = window {
        push_range_sql(Some(from), Some(to), &mut clauses, &mut binds);
    }

    let sql = format!(
        "SELECT publisher, sentiment, COUNT(*) AS qty FROM articles{} GROUP BY publisher, sentiment",
        where_clause(&clauses)
    );
    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = query.bind(bind);
    }
    let rows = query.fetch_all(pool).await?;

    let mut counts = HashMap::new();
    for row in &rows {
        let label = row.get::<String, _>("sentiment");
        if let Some(sentiment) = Sentiment::classify(Some(&label)) {
            counts.insert(
                (row.get::<String, _>("publisher"), sentiment),
                row.get::<i64, _>("qty"),
            );
        }
    }
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Single-row access and writes
// ---------------------------------------------------------------------------

pub async fn find_by_id(pool: &Pool, id: i64) -> Result<Option<Article>, NewsError> {
    let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(article_from_row))
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<Option<Article>, NewsError> {
    let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.as_ref().map(article_from_row))
}

/// Insert a new article (the id on `article` is ignored) and return the
/// stored row.
pub async fn insert(pool: &Pool, article: &Article) -> Result<Article, NewsError> {
    let row = sqlx::query(
        "INSERT INTO articles (display_date, title, body, link, author, publisher, topic, \
         sentiment, relevance, raw_score, derived_score, strategic, category, subcategory, cycle) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&article.display_date)
    .bind(&article.title)
    .bind(&article.body)
    .bind(&article.link)
    .bind(&article.author)
    .bind(&article.publisher)
    .bind(&article.topic)
    .bind(&article.sentiment)
    .bind(&article.relevance)
    .bind(article.raw_score)
    .bind(article.derived_score)
    .bind(article.strategic)
    .bind(&article.category)
    .bind(&article.subcategory)
    .bind(article.cycle)
    .fetch_one(pool)
    .await?;
    Ok(article_from_row(&row))
}

/// Write the patch over the loaded row. Kept fields re-write their current
/// value, so the statement shape never varies.
pub async fn apply_patch_tx(
    tx: &mut Transaction<'_, Sqlite>,
    article: &Article,
    patch: &ArticlePatch,
) -> Result<(), NewsError> {
    let relevance = merge(&patch.relevance, article.relevance.clone());
    let topic = merge(&patch.topic, article.topic.clone());
    let sentiment = merge(&patch.sentiment, article.sentiment.clone());
    let strategic = match patch.strategic {
        Change::Keep => article.strategic,
        Change::Clear => false,
        Change::Set(value) => value,
    };
    let category = merge(&patch.category, article.category.clone());
    let subcategory = merge(&patch.subcategory, article.subcategory.clone());
    let cycle = match patch.cycle {
        Change::Keep => article.cycle,
        Change::Clear => None,
        Change::Set(value) => Some(value),
    };

    sqlx::query(
        "UPDATE articles SET relevance = ?, topic = ?, sentiment = ?, strategic = ?, \
         category = ?, subcategory = ?, cycle = ? WHERE id = ?",
    )
    .bind(relevance)
    .bind(topic)
    .bind(sentiment)
    .bind(strategic)
    .bind(category)
    .bind(subcategory)
    .bind(cycle)
    .bind(article.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn merge(change: &Change<String>, current: Option<String>) -> Option<String> {
    match change {
        Change::Keep => current,
        Change::Clear => None,
        Change::Set(value) => Some(value.clone()),
    }
}

pub async fn set_derived_score_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    score: i64,
) -> Result<(), NewsError> {
    sqlx::query("UPDATE articles SET derived_score = ? WHERE id = ?")
        .bind(score)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Trash migration
// ---------------------------------------------------------------------------

/// Rows whose relevance is exactly `Trash`.
pub async fn trash_candidates_tx(
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<Vec<Article>, NewsError> {
    let rows = sqlx::query("SELECT * FROM articles WHERE relevance = ?")
        .bind(Relevance::Trash.as_str())
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows.iter().map(article_from_row).collect())
}

/// Copy one article into the archive table, keeping its id.
pub async fn archive_article_tx(
    tx: &mut Transaction<'_, Sqlite>,
    article: &Article,
) -> Result<(), NewsError> {
    sqlx::query(
        "INSERT INTO trashed_articles (id, display_date, title, body, link, author, publisher, \
         topic, sentiment, relevance, raw_score, derived_score, strategic, category, subcategory, \
         cycle) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(article.id)
    .bind(&article.display_date)
    .bind(&article.title)
    .bind(&article.body)
    .bind(&article.link)
    .bind(&article.author)
    .bind(&article.publisher)
    .bind(&article.topic)
    .bind(&article.sentiment)
    .bind(&article.relevance)
    .bind(article.raw_score)
    .bind(article.derived_score)
    .bind(article.strategic)
    .bind(&article.category)
    .bind(&article.subcategory)
    .bind(article.cycle)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Delete every `Trash` row from the live table, returning how many went.
pub async fn purge_trash_tx(tx: &mut Transaction<'_, Sqlite>) -> Result<u64, NewsError> {
    let result = sqlx::query("DELETE FROM articles WHERE relevance = ?")
        .bind(Relevance::Trash.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
