//! Sync endpoint area: regeneration, status listing, cache introspection.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::SyncHandlers;
pub use routes::sync_routes;
