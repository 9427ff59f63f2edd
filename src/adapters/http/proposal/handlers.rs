//! HTTP handlers for proposal endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::adapters::http::error::{error_response, ErrorResponse};
use crate::application::ProposalService;
use crate::domain::proposal::ChangeProposal;

use super::dto::{
    ArchiveProposalRequest, ProposalAction, ProposalActionRequest, ProposalResponse,
    SubmitProposalRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ProposalHandlers {
    service: Arc<ProposalService>,
}

impl ProposalHandlers {
    pub fn new(service: Arc<ProposalService>) -> Self {
        Self { service }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/proposals - Submit a change proposal
pub async fn submit_proposal(
    State(handlers): State<ProposalHandlers>,
    Json(request): Json<SubmitProposalRequest>,
) -> Response {
    match handlers
        .service
        .submit(&request.target_sop_id, request.delta, &request.submitted_by)
        .await
    {
        Ok(proposal) => created(proposal),
        Err(e) => error_response(e),
    }
}

/// GET /api/proposals - List proposals, newest first
pub async fn list_proposals(State(handlers): State<ProposalHandlers>) -> Response {
    match handlers.service.list().await {
        Ok(proposals) => {
            let body: Vec<ProposalResponse> =
                proposals.into_iter().map(ProposalResponse::from).collect();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/proposals/:proposal_id - Fetch one proposal
pub async fn get_proposal(
    State(handlers): State<ProposalHandlers>,
    Path(proposal_id): Path<String>,
) -> Response {
    let proposal_id = match parse_proposal_id(&proposal_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.get(proposal_id).await {
        Ok(proposal) => ok(proposal),
        Err(e) => error_response(e),
    }
}

/// POST /api/proposals/:proposal_id/actions - Approve, reject, or review
pub async fn act_on_proposal(
    State(handlers): State<ProposalHandlers>,
    Path(proposal_id): Path<String>,
    Json(request): Json<ProposalActionRequest>,
) -> Response {
    let proposal_id = match parse_proposal_id(&proposal_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let result = match request.action {
        ProposalAction::Approve => {
            handlers
                .service
                .approve(proposal_id, &request.performed_by, request.comments)
                .await
        }
        ProposalAction::Reject => {
            let reason = request.reason.as_deref().unwrap_or_default();
            handlers
                .service
                .reject(proposal_id, &request.performed_by, reason)
                .await
        }
        ProposalAction::Review => {
            handlers
                .service
                .review(proposal_id, &request.performed_by, request.comments)
                .await
        }
    };

    match result {
        Ok(proposal) => ok(proposal),
        Err(e) => error_response(e),
    }
}

/// POST /api/proposals/:proposal_id/archive - Archive from any status
pub async fn archive_proposal(
    State(handlers): State<ProposalHandlers>,
    Path(proposal_id): Path<String>,
    Json(request): Json<ArchiveProposalRequest>,
) -> Response {
    let proposal_id = match parse_proposal_id(&proposal_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .service
        .archive(proposal_id, &request.performed_by, request.comments)
        .await
    {
        Ok(proposal) => ok(proposal),
        Err(e) => error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_proposal_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| {
        let body = ErrorResponse::bad_request("proposal_id must be a UUID");
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    })
}

fn ok(proposal: ChangeProposal) -> Response {
    Json(ProposalResponse::from(proposal)).into_response()
}

fn created(proposal: ChangeProposal) -> Response {
    (StatusCode::CREATED, Json(ProposalResponse::from(proposal))).into_response()
}
