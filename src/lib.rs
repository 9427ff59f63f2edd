//! SOP Portal - Synchronization, caching, and change-control core.
//!
//! Keeps a derived artifact store consistent with a source-of-truth document
//! store, serves reads from a read-through cache, and mediates proposed edits
//! through an auditable approval state machine.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
