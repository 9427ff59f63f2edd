//! Change proposal aggregate - audited approval state machine over SOP edits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{PortalError, Timestamp};
use crate::domain::sop::DocumentDelta;

/// Lifecycle status of a change proposal.
///
/// `Pending` exits exactly once via approve or reject; `Archived` is
/// reachable from every status and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    Archived,
}

impl ProposalStatus {
    /// Returns true once the status can no longer leave via approve/reject.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

/// Action recorded in a proposal's review history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Submitted,
    Approved,
    Rejected,
    Reviewed,
    Archived,
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub action: ReviewAction,
    pub performed_by: String,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl ReviewEntry {
    fn new(action: ReviewAction, performed_by: impl Into<String>, comments: Option<String>) -> Self {
        Self {
            action,
            performed_by: performed_by.into(),
            timestamp: Timestamp::now(),
            comments,
        }
    }
}

/// Proposed edit to a source document, mediated through review.
///
/// # Invariants
///
/// - `review_history` never shrinks or reorders
/// - Once `status` leaves `Pending` via approve/reject it never returns
/// - `Archived` is reachable from any status and terminal
/// - Proposals are never physically deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    /// Unique identifier for this proposal.
    proposal_id: Uuid,

    /// The source document this proposal targets.
    target_sop_id: String,

    /// Proposed content changes.
    delta: DocumentDelta,

    /// Who submitted the proposal.
    submitted_by: String,

    /// Current review status.
    status: ProposalStatus,

    /// Append-only audit trail.
    review_history: Vec<ReviewEntry>,

    /// When the proposal was submitted.
    created_at: Timestamp,
}

impl ChangeProposal {
    /// Create a new pending proposal with a `Submitted` history entry.
    ///
    /// # Errors
    ///
    /// - `Validation` if the target is empty or the delta carries no changes
    pub fn new(
        target_sop_id: impl Into<String>,
        delta: DocumentDelta,
        submitted_by: impl Into<String>,
    ) -> Result<Self, PortalError> {
        let target_sop_id = target_sop_id.into();
        let submitted_by = submitted_by.into();
        if target_sop_id.trim().is_empty() {
            return Err(PortalError::validation("target_sop_id", "cannot be empty"));
        }
        if delta.is_empty() {
            return Err(PortalError::validation("delta", "carries no changes"));
        }

        Ok(Self {
            proposal_id: Uuid::new_v4(),
            target_sop_id,
            delta,
            submitted_by: submitted_by.clone(),
            status: ProposalStatus::Pending,
            review_history: vec![ReviewEntry::new(ReviewAction::Submitted, submitted_by, None)],
            created_at: Timestamp::now(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn proposal_id(&self) -> Uuid {
        self.proposal_id
    }

    pub fn target_sop_id(&self) -> &str {
        &self.target_sop_id
    }

    pub fn delta(&self) -> &DocumentDelta {
        &self.delta
    }

    pub fn submitted_by(&self) -> &str {
        &self.submitted_by
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn review_history(&self) -> &[ReviewEntry] {
        &self.review_history
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Approve the proposal.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the proposal is not pending
    pub fn approve(
        &mut self,
        performed_by: impl Into<String>,
        comments: Option<String>,
    ) -> Result<(), PortalError> {
        self.require_pending("approve")?;
        self.status = ProposalStatus::Approved;
        self.review_history
            .push(ReviewEntry::new(ReviewAction::Approved, performed_by, comments));
        Ok(())
    }

    /// Reject the proposal with a mandatory reason.
    ///
    /// # Errors
    ///
    /// - `Validation` if `reason` is empty
    /// - `Conflict` if the proposal is not pending
    pub fn reject(
        &mut self,
        performed_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), PortalError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(PortalError::validation("reason", "cannot be empty"));
        }
        self.require_pending("reject")?;
        self.status = ProposalStatus::Rejected;
        self.review_history
            .push(ReviewEntry::new(ReviewAction::Rejected, performed_by, Some(reason)));
        Ok(())
    }

    /// Archive the proposal. Permitted from any status, idempotent.
    ///
    /// Soft-delete semantics: the history is retained and this archive
    /// request is itself recorded.
    pub fn archive(&mut self, performed_by: impl Into<String>, comments: Option<String>) {
        self.status = ProposalStatus::Archived;
        self.review_history
            .push(ReviewEntry::new(ReviewAction::Archived, performed_by, comments));
    }

    /// Record a review without changing status. Permitted in any state.
    pub fn record_review(&mut self, performed_by: impl Into<String>, comments: Option<String>) {
        self.review_history
            .push(ReviewEntry::new(ReviewAction::Reviewed, performed_by, comments));
    }

    fn require_pending(&self, action: &str) -> Result<(), PortalError> {
        if self.status != ProposalStatus::Pending {
            return Err(PortalError::conflict(format!(
                "cannot {} proposal {}: status is {:?}, expected pending",
                action, self.proposal_id, self.status
            )));
        }
        Ok(())
    }
}
