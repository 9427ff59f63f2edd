//! HTTP DTOs for proposal endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::proposal::{ChangeProposal, ProposalStatus, ReviewEntry};
use crate::domain::sop::DocumentDelta;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to submit a new change proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitProposalRequest {
    pub target_sop_id: String,
    pub delta: DocumentDelta,
    pub submitted_by: String,
}

/// Review actions accepted by the actions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalAction {
    Approve,
    Reject,
    Review,
}

/// Request to act on a pending proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalActionRequest {
    pub action: ProposalAction,
    pub performed_by: String,
    #[serde(default)]
    pub comments: Option<String>,
    /// Mandatory for `reject`.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to archive a proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveProposalRequest {
    pub performed_by: String,
    #[serde(default)]
    pub comments: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Proposal view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalResponse {
    pub proposal_id: String,
    pub target_sop_id: String,
    pub delta: DocumentDelta,
    pub submitted_by: String,
    pub status: ProposalStatus,
    pub review_history: Vec<ReviewEntry>,
    pub created_at: String,
}

impl From<ChangeProposal> for ProposalResponse {
    fn from(proposal: ChangeProposal) -> Self {
        Self {
            proposal_id: proposal.proposal_id().to_string(),
            target_sop_id: proposal.target_sop_id().to_string(),
            delta: proposal.delta().clone(),
            submitted_by: proposal.submitted_by().to_string(),
            status: proposal.status(),
            review_history: proposal.review_history().to_vec(),
            created_at: proposal.created_at().to_rfc3339(),
        }
    }
}
