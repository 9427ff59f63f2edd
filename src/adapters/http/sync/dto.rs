//! HTTP DTOs for sync endpoints.
//!
//! These types decouple the HTTP API from application types where the shapes
//! differ; outcome and summary types already serialize in their wire form
//! and are returned directly.

use serde::Serialize;

use crate::application::CacheStats;

/// Cache accounting snapshot for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub total_sops: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Whole-percent hit rate; 0 before any access.
    pub hit_rate_percent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,
    pub memory_usage_mb: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate_percent: stats.hit_rate_percent(),
            total_sops: stats.total_sops,
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            last_refresh: stats.last_refresh.map(|ts| ts.to_rfc3339()),
            memory_usage_mb: stats.memory_usage_mb,
        }
    }
}

/// Cache readiness flag.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReadyResponse {
    pub ready: bool,
}
