//! HTTP routes for sync endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    get_cache_ready, get_cache_stats, get_sync_status, regenerate_all, regenerate_one,
    SyncHandlers,
};

/// Creates the sync router with all endpoints.
pub fn sync_routes(handlers: SyncHandlers) -> Router {
    Router::new()
        .route("/status", get(get_sync_status))
        .route("/regenerate", post(regenerate_all))
        .route("/regenerate/:sop_id", post(regenerate_one))
        .route("/cache/stats", get(get_cache_stats))
        .route("/cache/ready", get(get_cache_ready))
        .with_state(handlers)
}
