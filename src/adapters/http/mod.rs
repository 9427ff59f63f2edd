//! HTTP adapters - axum handlers, DTOs, and routes.

pub mod error;
pub mod proposal;
pub mod sync;
