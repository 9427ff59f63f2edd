//! HTTP routes for proposal endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    act_on_proposal, archive_proposal, get_proposal, list_proposals, submit_proposal,
    ProposalHandlers,
};

/// Creates the proposal router with all endpoints.
pub fn proposal_routes(handlers: ProposalHandlers) -> Router {
    Router::new()
        .route("/", post(submit_proposal).get(list_proposals))
        .route("/:proposal_id", get(get_proposal))
        .route("/:proposal_id/actions", post(act_on_proposal))
        .route("/:proposal_id/archive", post(archive_proposal))
        .with_state(handlers)
}
