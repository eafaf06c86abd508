//! Publisher registry workflows.
//!
//! Publishers carry the point values the scoring rule multiplies, so the
//! registry is consulted by posting and by the leaderboards. Names are
//! compared trimmed everywhere.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::storage::{self, Pool};
use crate::types::{NewsError, Priority, Publisher, Reach};

/// Input for registering a publisher.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub points: i64,
    pub reach: String,
    pub priority: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublisherUpdate {
    pub points: Option<i64>,
    pub reach: Option<String>,
    pub priority: Option<String>,
    pub url: Option<String>,
}

/// All publishers keyed by name. The later row wins when two rows share a
/// name.
pub async fn list_map(pool: &Pool) -> Result<HashMap<String, Publisher>, NewsError> {
    let publishers = storage::publishers::list(pool).await?;
    Ok(publishers.into_iter().map(|p| (p.name.clone(), p)).collect())
}

pub async fn find_by_name(pool: &Pool, name: &str) -> Result<Publisher, NewsError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NewsError::Validation(
            "publisher name is required".to_string(),
        ));
    }
    storage::publishers::find_by_trimmed_name(pool, trimmed)
        .await?
        .ok_or_else(|| NewsError::NotFound {
            entity: "publisher",
            key: trimmed.to_string(),
        })
}

#[instrument(skip_all)]
pub async fn create(pool: &Pool, input: NewPublisher) -> Result<Publisher, NewsError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(NewsError::Validation(
            "publisher name is required".to_string(),
        ));
    }
    let reach = parse_reach(&input.reach)?;
    let priority = parse_priority(&input.priority)?;

    if storage::publishers::find_by_trimmed_name(pool, &name)
        .await?
        .is_some()
    {
        return Err(NewsError::Conflict(format!(
            "publisher '{name}' already exists"
        )));
    }

    let publisher = Publisher {
        id: 0,
        name,
        points: input.points,
        reach: reach.as_str().to_string(),
        priority: priority.as_str().to_string(),
        url: input.url,
    };
    let stored = storage::publishers::insert(pool, &publisher).await?;
    info!(id = stored.id, name = %stored.name, "publisher registered");
    Ok(stored)
}

#[instrument(skip_all)]
pub async fn update(pool: &Pool, id: i64, patch: PublisherUpdate) -> Result<Publisher, NewsError> {
    let mut publisher = storage::publishers::find_by_id(pool, id)
        .await?
        .ok_or_else(|| missing(id))?;

    if let Some(points) = patch.points {
        publisher.points = points;
    }
    if let Some(reach) = &patch.reach {
        publisher.reach = parse_reach(reach)?.as_str().to_string();
    }
    if let Some(priority) = &patch.priority {
        publisher.priority = parse_priority(priority)?.as_str().to_string();
    }
    if let Some(url) = patch.url {
        publisher.url = Some(url);
    }

    storage::publishers::update(pool, &publisher).await?;
    info!(id, "publisher updated");
    Ok(publisher)
}

/// Archive the publisher under a fresh id, then remove it, in one
/// transaction.
#[instrument(skip_all)]
pub async fn delete(pool: &Pool, id: i64) -> Result<(), NewsError> {
    let mut tx = pool.begin().await?;
    let publisher = storage::publishers::find_by_id_tx(&mut tx, id)
        .await?
        .ok_or_else(|| missing(id))?;
    storage::publishers::archive_publisher_tx(&mut tx, &publisher).await?;
    storage::publishers::delete_tx(&mut tx, id).await?;
    tx.commit().await?;

    info!(id, name = %publisher.name, "publisher archived and removed");
    Ok(())
}

fn missing(id: i64) -> NewsError {
    NewsError::NotFound {
        entity: "publisher",
        key: id.to_string(),
    }
}

fn parse_reach(value: &str) -> Result<Reach, NewsError> {
    value.parse().map_err(|_| {
        NewsError::Validation(format!(
            "reach must be one of Regional, Local, National (got '{value}')"
        ))
    })
}

fn parse_priority(value: &str) -> Result<Priority, NewsError> {
    value.parse().map_err(|_| {
        NewsError::Validation(format!(
            "priority must be one of Low, Medium, High (got '{value}')"
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
