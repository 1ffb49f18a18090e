//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Parameters arrive
//! as query strings; the handlers validate them and translate cache results
//! into responses.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::{CacheConfig, TtlCache};
use crate::error::{ApiError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, KeyParams, SetParams, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so handlers share it through a plain Arc.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache engine
    pub cache: Arc<TtlCache<String>>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: TtlCache<String>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Must be called inside a Tokio runtime, since the cache spawns its sweeper.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(TtlCache::with_config(config.cache_config()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TtlCache::with_config(CacheConfig::default()))
    }
}

/// Handler for POST /set?key=..&value=..&duration=..
///
/// Stores a value for `duration` seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Query(params): Query<SetParams>,
) -> Result<(StatusCode, Json<SetResponse>)> {
    let command = params.validate()?;

    state
        .cache
        .set(command.key.clone(), command.value, command.ttl)
        .await;

    Ok((StatusCode::CREATED, Json(SetResponse::new(command.key))))
}

/// Handler for GET /get?key=..
///
/// Returns `{"value": ...}` or 404 for absent and expired keys.
pub async fn get_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParams>,
) -> Result<Json<GetResponse<String>>> {
    let key = params.require_key()?;

    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /delete?key=..
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParams>,
) -> Result<Json<DeleteResponse>> {
    let key = params.require_key()?;

    state.cache.delete(&key).await;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.cache.stats().snapshot();
    let total_entries = state.cache.len().await;

    Json(StatsResponse::new(snapshot, total_entries))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
