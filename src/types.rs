//! Shared types for the newsdesk analytics engine.
//!
//! These types form the data model used across all modules: the stored
//! records (articles, publishers, strategic weeks), the classification
//! enums, the aggregation report shapes, and the domain error taxonomy.
//! Stored classification columns stay raw strings so that legacy rows
//! round-trip exactly; the enums here are the validated views over them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Sentiment classification of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All sentiment classes (useful for iteration).
    pub const ALL: &'static [Sentiment] =
        &[Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Canonical stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Classify a raw stored value: whitespace is trimmed, the comparison
    /// is exact. Blank, null and unknown values are all unclassified.
    pub fn classify(raw: Option<&str>) -> Option<Sentiment> {
        match raw.map(str::trim) {
            Some("Positive") => Some(Sentiment::Positive),
            Some("Negative") => Some(Sentiment::Negative),
            Some("Neutral") => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    /// The two classes other than this one, in a fixed order.
    pub fn others(&self) -> [Sentiment; 2] {
        match self {
            Sentiment::Positive => [Sentiment::Negative, Sentiment::Neutral],
            Sentiment::Negative => [Sentiment::Positive, Sentiment::Neutral],
            Sentiment::Neutral => [Sentiment::Positive, Sentiment::Negative],
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a string into a Sentiment (case-insensitive).
impl std::str::FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(anyhow::anyhow!("Unknown sentiment: {s}")),
        }
    }
}

/// Relevance classification of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relevance {
    Useful,
    Trash,
    Support,
}

impl Relevance {
    pub const ALL: &'static [Relevance] =
        &[Relevance::Useful, Relevance::Trash, Relevance::Support];

    /// Canonical stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::Useful => "Useful",
            Relevance::Trash => "Trash",
            Relevance::Support => "Support",
        }
    }

    /// Classify a raw stored value (trimmed, exact).
    pub fn classify(raw: Option<&str>) -> Option<Relevance> {
        match raw.map(str::trim) {
            Some("Useful") => Some(Relevance::Useful),
            Some("Trash") => Some(Relevance::Trash),
            Some("Support") => Some(Relevance::Support),
            _ => None,
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a string into a Relevance (case-insensitive).
impl std::str::FromStr for Relevance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "useful" => Ok(Relevance::Useful),
            "trash" => Ok(Relevance::Trash),
            "support" => Ok(Relevance::Support),
            _ => Err(anyhow::anyhow!("Unknown relevance class: {s}")),
        }
    }
}

/// Category buckets tracked by the strategic dashboard. Articles can carry
/// other category strings; anything outside these four is ignored by the
/// category series (tolerated, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategicCategory {
    Infrastructure,
    Social,
    Education,
    Health,
}

impl StrategicCategory {
    pub const ALL: &'static [StrategicCategory] = &[
        StrategicCategory::Infrastructure,
        StrategicCategory::Social,
        StrategicCategory::Education,
        StrategicCategory::Health,
    ];

    /// Canonical stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategicCategory::Infrastructure => "Infrastructure",
            StrategicCategory::Social => "Social",
            StrategicCategory::Education => "Education",
            StrategicCategory::Health => "Health",
        }
    }

    /// Classify a raw stored value (trimmed, exact); unknown values map to
    /// None and are dropped from the series.
    pub fn classify(raw: &str) -> Option<StrategicCategory> {
        match raw.trim() {
            "Infrastructure" => Some(StrategicCategory::Infrastructure),
            "Social" => Some(StrategicCategory::Social),
            "Education" => Some(StrategicCategory::Education),
            "Health" => Some(StrategicCategory::Health),
            _ => None,
        }
    }
}

impl fmt::Display for StrategicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a string into a StrategicCategory (case-insensitive).
impl std::str::FromStr for StrategicCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "infrastructure" => Ok(StrategicCategory::Infrastructure),
            "social" => Ok(StrategicCategory::Social),
            "education" => Ok(StrategicCategory::Education),
            "health" => Ok(StrategicCategory::Health),
            _ => Err(anyhow::anyhow!("Unknown strategic category: {s}")),
        }
    }
}

/// The fixed topic vocabulary accepted by the update workflow. The stored
/// topic column stays free text; this enum only validates new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Agriculture,
    Social,
    PublicSafety,
    Health,
    Politics,
    Environment,
    Infrastructure,
    Education,
    Economy,
    Culture,
}

impl Topic {
    pub const ALL: &'static [Topic] = &[
        Topic::Agriculture,
        Topic::Social,
        Topic::PublicSafety,
        Topic::Health,
        Topic::Politics,
        Topic::Environment,
        Topic::Infrastructure,
        Topic::Education,
        Topic::Economy,
        Topic::Culture,
    ];

    /// Canonical stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Agriculture => "Agriculture",
            Topic::Social => "Social",
            Topic::PublicSafety => "Public Safety",
            Topic::Health => "Health",
            Topic::Politics => "Politics",
            Topic::Environment => "Environment",
            Topic::Infrastructure => "Infrastructure",
            Topic::Education => "Education",
            Topic::Economy => "Economy",
            Topic::Culture => "Culture",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a string into a Topic (case-insensitive).
impl std::str::FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agriculture" => Ok(Topic::Agriculture),
            "social" => Ok(Topic::Social),
            "public safety" | "publicsafety" => Ok(Topic::PublicSafety),
            "health" => Ok(Topic::Health),
            "politics" => Ok(Topic::Politics),
            "environment" => Ok(Topic::Environment),
            "infrastructure" => Ok(Topic::Infrastructure),
            "education" => Ok(Topic::Education),
            "economy" => Ok(Topic::Economy),
            "culture" => Ok(Topic::Culture),
            _ => Err(anyhow::anyhow!("Unknown topic: {s}")),
        }
    }
}

/// Geographic reach of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reach {
    Regional,
    Local,
    National,
}

impl Reach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reach::Regional => "Regional",
            Reach::Local => "Local",
            Reach::National => "National",
        }
    }
}

impl fmt::Display for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Reach {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regional" => Ok(Reach::Regional),
            "local" => Ok(Reach::Local),
            "national" => Ok(Reach::National),
            _ => Err(anyhow::anyhow!("Unknown reach: {s}")),
        }
    }
}

/// Monitoring priority of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(anyhow::anyhow!("Unknown priority: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived score
// ---------------------------------------------------------------------------

/// The derived-score rule, applied wherever sentiment or raw score changes:
/// Positive keeps the raw score, Negative contributes its magnitude as a
/// penalty, Neutral and unclassified contribute nothing.
pub fn derived_score(sentiment: Option<Sentiment>, raw_score: i64) -> i64 {
    match sentiment {
        Some(Sentiment::Positive) => raw_score,
        Some(Sentiment::Negative) => -raw_score.abs(),
        Some(Sentiment::Neutral) | None => 0,
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// One classified news item as stored.
///
/// Classification columns (`sentiment`, `relevance`, `category`) and the
/// display date are kept as raw strings: source data is inconsistently
/// formatted and has to round-trip exactly. Accessors provide the
/// validated views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    /// Display date in `DD/MM/YYYY` textual form; may be absent or
    /// malformed on legacy rows.
    pub display_date: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub link: String,
    pub author: Option<String>,
    /// Publisher name; matches a `Publisher` by name, not by foreign key.
    pub publisher: String,
    pub topic: Option<String>,
    /// Raw sentiment value: "Positive" | "Negative" | "Neutral", possibly
    /// padded with whitespace, blank, or null.
    pub sentiment: Option<String>,
    /// Raw relevance value: "Useful" | "Trash" | "Support" or null.
    pub relevance: Option<String>,
    /// Point value inherited from the publisher at creation time.
    pub raw_score: i64,
    /// Signed score recomputed from sentiment and raw score.
    pub derived_score: i64,
    pub strategic: bool,
    /// Strategic category; non-null only while `strategic` is true.
    pub category: Option<String>,
    /// Free text, at most 250 chars; non-null only while `strategic` is true.
    pub subcategory: Option<String>,
    /// Strategic cycle number; non-null only while `strategic` is true.
    pub cycle: Option<i64>,
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {} ({} | {})",
            self.id,
            self.display_date.as_deref().unwrap_or("no date"),
            self.title,
            self.sentiment.as_deref().unwrap_or("unclassified"),
            self.relevance.as_deref().unwrap_or("unclassified"),
        )
    }
}

impl Article {
    /// Validated sentiment view over the raw stored value.
    pub fn sentiment(&self) -> Option<Sentiment> {
        Sentiment::classify(self.sentiment.as_deref())
    }

    /// Validated relevance view over the raw stored value.
    pub fn relevance(&self) -> Option<Relevance> {
        Relevance::classify(self.relevance.as_deref())
    }

    /// Strategic category bucket, if the stored category is one of the
    /// four tracked values.
    pub fn strategic_category(&self) -> Option<StrategicCategory> {
        self.category.as_deref().and_then(StrategicCategory::classify)
    }

    /// Recompute the derived score from the current sentiment and raw score.
    pub fn recompute_derived(&self) -> i64 {
        derived_score(self.sentiment(), self.raw_score)
    }

    /// Helper to build a test article with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Article {
            id: 1,
            display_date: Some("10/01/2025".to_string()),
            title: "Bridge repairs announced".to_string(),
            body: Some("The city announced repairs to the main bridge.".to_string()),
            link: "https://news.example.com/bridge".to_string(),
            author: Some("Staff".to_string()),
            publisher: "Daily Example".to_string(),
            topic: Some("Infrastructure".to_string()),
            sentiment: Some("Positive".to_string()),
            relevance: Some("Useful".to_string()),
            raw_score: 10,
            derived_score: 10,
            strategic: false,
            category: None,
            subcategory: None,
            cycle: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// A named news source with a fixed point value and classification.
///
/// Reach and priority are stored as text and validated at the registry
/// boundary, mirroring the tolerance applied to article columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    /// Point value inherited by articles created for this publisher.
    pub points: i64,
    pub reach: String,
    pub priority: String,
    pub url: Option<String>,
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} pts, {} / {})",
            self.name, self.points, self.reach, self.priority,
        )
    }
}

// ---------------------------------------------------------------------------
// Strategic week
// ---------------------------------------------------------------------------

/// A tracked date interval; no two weeks may overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicWeek {
    pub id: i64,
    /// Display form, `DD/MM/YYYY`.
    pub start_date: String,
    /// Display form, `DD/MM/YYYY`.
    pub end_date: String,
    pub cycle: i64,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl fmt::Display for StrategicWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "week #{} [{} – {}] cycle {}",
            self.id, self.start_date, self.end_date, self.cycle,
        )
    }
}

// ---------------------------------------------------------------------------
// Aggregation reports
// ---------------------------------------------------------------------------

/// Per-day accumulator produced by the aggregator. `date` is the canonical
/// `YYYY-MM-DD` key (or the raw display string when it does not parse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub quantity: i64,
    /// Summed derived score for the day.
    pub score: i64,
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
}

/// Per-month article count; `label` is the English month name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub label: String,
    pub quantity: i64,
}

/// Per-month sentiment counts; `label` is the English month name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSentiment {
    pub label: String,
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
}

/// Per-day strategic category counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicDay {
    pub date: String,
    pub infrastructure: i64,
    pub social: i64,
    pub education: i64,
    pub health: i64,
}

/// Dashboard overview: window totals plus the per-day series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub total: i64,
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
    pub daily: Vec<DayBucket>,
}

impl fmt::Display for Overview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} articles (+{} / -{} / ={}) over {} days",
            self.total,
            self.positive,
            self.negative,
            self.neutral,
            self.daily.len(),
        )
    }
}

/// Strategic dashboard: window totals plus the per-day category series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicOverview {
    pub total: i64,
    /// Summed derived score over the window.
    pub score: i64,
    pub daily: Vec<StrategicDay>,
}

/// One leaderboard row. Percentages are whole numbers with a `%` suffix,
/// computed against the publisher's own article count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherEntry {
    pub publisher: String,
    pub quantity: i64,
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
    /// (positive × points) − (negative × points).
    pub score: i64,
    pub positive_pct: String,
    pub negative_pct: String,
    pub neutral_pct: String,
}

impl fmt::Display for PublisherEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: score={} ({} articles, +{} / -{} / ={})",
            self.publisher, self.score, self.quantity, self.positive, self.negative, self.neutral,
        )
    }
}

/// One page of the date-cursor browsing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    /// Candidate population in cursor mode; rows shown in explicit-date
    /// and unpaginated modes.
    pub total: i64,
    /// The resolved display date, when paging by date.
    pub date: Option<String>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl ArticlePage {
    /// The empty page returned when no dates match a cursor query.
    pub fn empty() -> Self {
        ArticlePage {
            items: Vec::new(),
            total: 0,
            date: None,
            has_next: false,
            has_previous: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("Invalid date in '{field}': {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid value for '{field}': {value}")]
    InvalidFilter { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
