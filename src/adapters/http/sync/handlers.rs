//! HTTP handlers for sync endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::error::error_response;
use crate::application::{KeepAliveOptions, KeepAliveStream, RegenerationPipeline, SopCache};

use super::dto::{CacheReadyResponse, CacheStatsResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SyncHandlers {
    pipeline: Arc<RegenerationPipeline>,
    cache: Arc<SopCache>,
    keep_alive_interval: Duration,
}

impl SyncHandlers {
    pub fn new(
        pipeline: Arc<RegenerationPipeline>,
        cache: Arc<SopCache>,
        keep_alive_interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            cache,
            keep_alive_interval,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/sync/status - Sync-status listing for all active documents
pub async fn get_sync_status(State(handlers): State<SyncHandlers>) -> Response {
    match handlers.pipeline.list_sync_status().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/sync/regenerate - Regenerate all stale documents
///
/// Streamed behind a keep-alive wrapper: the batch can outlast proxy idle
/// timeouts, so filler bytes flow until the summary is ready. The status
/// code is fixed at 200; batch failures are encoded in the payload.
pub async fn regenerate_all(State(handlers): State<SyncHandlers>) -> Response {
    let pipeline = Arc::clone(&handlers.pipeline);
    KeepAliveStream::run(
        async move { pipeline.regenerate_all().await },
        KeepAliveOptions::new(handlers.keep_alive_interval),
    )
    .into_response()
}

/// POST /api/sync/regenerate/:sop_id - Regenerate a single document
pub async fn regenerate_one(
    State(handlers): State<SyncHandlers>,
    Path(sop_id): Path<String>,
) -> Response {
    match handlers.pipeline.regenerate_one(&sop_id).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sync/cache/stats - Cache accounting snapshot
pub async fn get_cache_stats(State(handlers): State<SyncHandlers>) -> Response {
    let stats = handlers.cache.stats().await;
    Json(CacheStatsResponse::from(stats)).into_response()
}

/// GET /api/sync/cache/ready - Cache readiness probe
pub async fn get_cache_ready(State(handlers): State<SyncHandlers>) -> Response {
    Json(CacheReadyResponse {
        ready: handlers.cache.is_ready(),
    })
    .into_response()
}
