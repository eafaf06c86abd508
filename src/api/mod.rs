//! HTTP boundary — Axum server over the service layer.
//!
//! Handlers stay thin: extract, call a service function, JSON out. Domain
//! errors map onto status codes here and nowhere else. CORS is permissive.

pub mod routes;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::storage::Pool;
use crate::types::NewsError;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub pool: Pool,
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        let status = match &self {
            NewsError::InvalidDate { .. }
            | NewsError::InvalidFilter { .. }
            | NewsError::Validation(_) => StatusCode::BAD_REQUEST,
            NewsError::NotFound { .. } => StatusCode::NOT_FOUND,
            NewsError::Conflict(_) => StatusCode::CONFLICT,
            NewsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Storage details stay out of response bodies.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            return (status, Json(json!({ "error": "internal error" }))).into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(pool: Pool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        // Dashboard
        .route("/api/dashboard", get(routes::get_overview))
        .route("/api/dashboard/months", get(routes::get_monthly_counts))
        .route(
            "/api/dashboard/months/sentiment",
            get(routes::get_monthly_sentiment),
        )
        .route("/api/dashboard/strategic", get(routes::get_strategic_summary))
        .route(
            "/api/dashboard/publishers/positive",
            get(routes::get_positive_leaderboard),
        )
        .route(
            "/api/dashboard/publishers/negative",
            get(routes::get_negative_leaderboard),
        )
        // Articles
        .route(
            "/api/articles",
            get(routes::get_articles).post(routes::post_article),
        )
        .route("/api/articles/:id", patch(routes::patch_article))
        .route("/api/articles/trash/migrate", post(routes::migrate_trash))
        .route("/api/articles/dates/strategic", get(routes::get_strategic_dates))
        .route("/api/articles/dates/trash", get(routes::get_trash_dates))
        .route("/api/articles/dates/support", get(routes::get_support_dates))
        .route("/api/articles/dates/useful", get(routes::get_useful_dates))
        .route(
            "/api/articles/dates/unclassified",
            get(routes::get_unclassified_dates),
        )
        // Publishers. GET takes a name, PATCH/DELETE take a numeric id, so
        // the shared segment stays a string and handlers parse as needed.
        .route(
            "/api/publishers",
            get(routes::get_publishers).post(routes::post_publisher),
        )
        .route(
            "/api/publishers/:key",
            get(routes::get_publisher_by_name)
                .patch(routes::patch_publisher)
                .delete(routes::delete_publisher),
        )
        // Strategic weeks
        .route("/api/weeks", get(routes::get_weeks).post(routes::post_week))
        .route(
            "/api/weeks/:id",
            patch(routes::patch_week).delete(routes::delete_week),
        )
        .layer(cors)
        .with_state(ApiState { pool })
}

/// Bind and serve until ctrl-c.
pub async fn serve(pool: Pool, host: &str, port: u16) -> Result<()> {
    let app = build_router(pool);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {addr}"))?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
