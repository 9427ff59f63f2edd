//! Proposal endpoint area: submission, review actions, archival.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ProposalHandlers;
pub use routes::proposal_routes;
