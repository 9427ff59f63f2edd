//! SOP Portal server entrypoint.
//!
//! Wires the in-memory adapters into the sync and proposal services and
//! serves the HTTP API. Configuration comes from the environment with the
//! `SOP_PORTAL_` prefix (a `.env` file is honored when present).

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sop_portal::adapters::derivation::SinglePassEngine;
use sop_portal::adapters::http::proposal::{proposal_routes, ProposalHandlers};
use sop_portal::adapters::http::sync::{sync_routes, SyncHandlers};
use sop_portal::adapters::memory::{
    InMemoryDerivedArtifactStore, InMemoryProposalStore, InMemorySourceDocumentStore,
};
use sop_portal::application::{
    spawn_refresh_scheduler, ProposalService, RegenerationPipeline, SopCache,
};
use sop_portal::config::AppConfig;
use sop_portal::ports::{DerivationEngine, DerivedArtifactStore, SourceDocumentStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let sources: Arc<dyn SourceDocumentStore> = Arc::new(InMemorySourceDocumentStore::new());
    let artifacts: Arc<dyn DerivedArtifactStore> = Arc::new(InMemoryDerivedArtifactStore::new());
    let proposals = Arc::new(InMemoryProposalStore::new());
    let engine: Arc<dyn DerivationEngine> = Arc::new(SinglePassEngine::new());

    let cache = Arc::new(SopCache::new(
        Arc::clone(&artifacts),
        Arc::clone(&sources),
        config.sync.cache_ttl(),
    ));
    let pipeline = Arc::new(RegenerationPipeline::new(
        Arc::clone(&sources),
        Arc::clone(&artifacts),
        engine,
        Arc::clone(&cache),
    ));
    let proposal_service = Arc::new(ProposalService::new(proposals, Arc::clone(&sources)));

    let scheduler = spawn_refresh_scheduler(Arc::clone(&cache), config.sync.refresh_interval());

    let app = Router::new()
        .nest(
            "/api/sync",
            sync_routes(SyncHandlers::new(
                Arc::clone(&pipeline),
                Arc::clone(&cache),
                config.sync.keep_alive_interval(),
            )),
        )
        .nest(
            "/api/proposals",
            proposal_routes(ProposalHandlers::new(proposal_service)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr();
    info!(%addr, "starting sop-portal server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    scheduler.abort();
    Ok(())
}
