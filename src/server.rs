//! HTTP surface for the statistics service.
//!
//! The handlers only parse path segments and the bearer token; everything
//! else lives in [`StatsService`]. Statistics prefer degraded data over hard
//! failure, so the only error responses are 401 for a missing token and 500
//! for failures that escaped the aggregator.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::SqliteStorage;
use crate::github::GitHubClient;
use crate::stats::StatsService;

pub type Service = StatsService<GitHubClient, SqliteStorage>;

#[derive(Clone)]
pub struct AppState {
  pub service: Arc<Service>,
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/repos/:owner/:repo/stats", get(repo_stats))
    .route(
      "/api/repos/:owner/:repo/members/:username/stats",
      get(member_stats),
    )
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> impl IntoResponse {
  Json(json!({ "status": "ok" }))
}

async fn repo_stats(
  State(state): State<AppState>,
  Path((owner, repo)): Path<(String, String)>,
  headers: HeaderMap,
) -> Response {
  let Some(token) = bearer_token(&headers) else {
    return missing_token();
  };

  match state.service.repo_stats(&owner, &repo, &token).await {
    Ok(stats) => (StatusCode::OK, Json(json!({ "success": true, "data": stats }))).into_response(),
    Err(err) => internal_error(err),
  }
}

async fn member_stats(
  State(state): State<AppState>,
  Path((owner, repo, username)): Path<(String, String, String)>,
  headers: HeaderMap,
) -> Response {
  let Some(token) = bearer_token(&headers) else {
    return missing_token();
  };

  match state
    .service
    .member_stats(&owner, &repo, &username, &token)
    .await
  {
    Ok(stats) => (StatusCode::OK, Json(json!({ "success": true, "data": stats }))).into_response(),
    Err(err) => internal_error(err),
  }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let token = value
    .strip_prefix("Bearer ")
    .or_else(|| value.strip_prefix("bearer "))?
    .trim();
  (!token.is_empty()).then(|| token.to_string())
}

fn missing_token() -> Response {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "error": "GitHub token is required" })),
  )
    .into_response()
}

fn internal_error(err: color_eyre::Report) -> Response {
  tracing::error!("statistics request failed: {:?}", err);
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "success": false, "error": err.to_string() })),
  )
    .into_response()
}
