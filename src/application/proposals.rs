//! Proposal service - audited review actions over change proposals.
//!
//! Every status or history change goes through the store's atomic
//! `transition`, which mutates the stored record under the store's write
//! lock: a review racing an approval can neither revert the committed status
//! nor drop the approval's history entry. The approval write-back to the
//! source store happens only after the transition is committed, so no lock
//! is held across collaborator calls.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::foundation::PortalError;
use crate::domain::proposal::ChangeProposal;
use crate::domain::sop::DocumentDelta;
use crate::ports::{ProposalStore, SourceDocumentStore};

/// Coordinates proposal transitions and the approval write-back.
pub struct ProposalService {
    proposals: Arc<dyn ProposalStore>,
    sources: Arc<dyn SourceDocumentStore>,
}

impl ProposalService {
    pub fn new(proposals: Arc<dyn ProposalStore>, sources: Arc<dyn SourceDocumentStore>) -> Self {
        Self { proposals, sources }
    }

    /// Submit a new proposal against an existing active document.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the target document does not exist or is inactive
    /// - `Validation` if the delta carries no changes
    pub async fn submit(
        &self,
        target_sop_id: &str,
        delta: DocumentDelta,
        submitted_by: &str,
    ) -> Result<ChangeProposal, PortalError> {
        self.sources
            .find_by_sop_id(target_sop_id)
            .await?
            .filter(|doc| doc.is_active())
            .ok_or_else(|| PortalError::document_not_found(target_sop_id))?;

        let proposal = ChangeProposal::new(target_sop_id, delta, submitted_by)?;
        self.proposals.insert(proposal.clone()).await?;
        info!(
            proposal_id = %proposal.proposal_id(),
            target_sop_id,
            submitted_by,
            "proposal submitted"
        );
        Ok(proposal)
    }

    /// Approve a pending proposal and write its delta into the target
    /// document, making that document stale for the next regeneration pass.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the proposal does not exist
    /// - `Conflict` if the stored status is no longer pending
    pub async fn approve(
        &self,
        proposal_id: Uuid,
        performed_by: &str,
        comments: Option<String>,
    ) -> Result<ChangeProposal, PortalError> {
        let by = performed_by.to_string();
        let proposal = self
            .proposals
            .transition(proposal_id, Box::new(move |p| p.approve(by, comments)))
            .await?;

        // Status is committed; the write-back runs outside any proposal lock.
        match self
            .sources
            .apply_delta(proposal.target_sop_id(), proposal.delta())
            .await
        {
            Ok(updated) => {
                info!(
                    proposal_id = %proposal_id,
                    target_sop_id = proposal.target_sop_id(),
                    new_version = updated.version(),
                    "proposal approved and applied"
                );
            }
            Err(error) => {
                // The approval stands; the document write must be surfaced.
                warn!(
                    proposal_id = %proposal_id,
                    target_sop_id = proposal.target_sop_id(),
                    %error,
                    "approved proposal could not be applied to source document"
                );
                return Err(error);
            }
        }

        Ok(proposal)
    }

    /// Reject a pending proposal with a mandatory reason.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the proposal does not exist
    /// - `Validation` if `reason` is empty
    /// - `Conflict` if the stored status is no longer pending
    pub async fn reject(
        &self,
        proposal_id: Uuid,
        performed_by: &str,
        reason: &str,
    ) -> Result<ChangeProposal, PortalError> {
        let by = performed_by.to_string();
        let reason = reason.to_string();
        let proposal = self
            .proposals
            .transition(proposal_id, Box::new(move |p| p.reject(by, reason)))
            .await?;
        info!(proposal_id = %proposal_id, performed_by, "proposal rejected");
        Ok(proposal)
    }

    /// Record a review comment without changing status.
    pub async fn review(
        &self,
        proposal_id: Uuid,
        performed_by: &str,
        comments: Option<String>,
    ) -> Result<ChangeProposal, PortalError> {
        let by = performed_by.to_string();
        self.proposals
            .transition(
                proposal_id,
                Box::new(move |p| {
                    p.record_review(by, comments);
                    Ok(())
                }),
            )
            .await
    }

    /// Archive a proposal from any status. Idempotent.
    pub async fn archive(
        &self,
        proposal_id: Uuid,
        performed_by: &str,
        comments: Option<String>,
    ) -> Result<ChangeProposal, PortalError> {
        let by = performed_by.to_string();
        let proposal = self
            .proposals
            .transition(
                proposal_id,
                Box::new(move |p| {
                    p.archive(by, comments);
                    Ok(())
                }),
            )
            .await?;
        info!(proposal_id = %proposal_id, performed_by, "proposal archived");
        Ok(proposal)
    }

    /// Fetch one proposal.
    pub async fn get(&self, proposal_id: Uuid) -> Result<ChangeProposal, PortalError> {
        self.proposals
            .find_by_id(proposal_id)
            .await?
            .ok_or_else(|| PortalError::proposal_not_found(proposal_id.to_string()))
    }

    /// List all proposals, newest first.
    pub async fn list(&self) -> Result<Vec<ChangeProposal>, PortalError> {
        self.proposals.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProposalStore, InMemorySourceDocumentStore};
    use crate::domain::proposal::{ProposalStatus, ReviewAction};
    use crate::domain::sop::SourceDocument;

    struct Fixture {
        sources: Arc<InMemorySourceDocumentStore>,
        service: ProposalService,
    }

    async fn fixture() -> Fixture {
        let sources = Arc::new(InMemorySourceDocumentStore::new());
        sources
            .seed([SourceDocument::new("SOP-1", 1, "Incident Response", "v1 body").unwrap()])
            .await;
        let proposals = Arc::new(InMemoryProposalStore::new());
        let service = ProposalService::new(proposals, sources.clone());
        Fixture { sources, service }
    }

    async fn submitted(fx: &Fixture) -> ChangeProposal {
        fx.service
            .submit("SOP-1", DocumentDelta::body("v2 body"), "bob")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn submit_against_unknown_document_is_not_found() {
        let fx = fixture().await;
        let result = fx
            .service
            .submit("SOP-X", DocumentDelta::body("x"), "bob")
            .await;
        assert!(matches!(result, Err(PortalError::NotFound { .. })));
    }

    #[tokio::test]
    async fn approve_applies_delta_and_bumps_source_version() {
        let fx = fixture().await;
        let proposal = submitted(&fx).await;

        let approved = fx
            .service
            .approve(proposal.proposal_id(), "alice", None)
            .await
            .unwrap();
        assert_eq!(approved.status(), ProposalStatus::Approved);

        let doc = fx.sources.find_by_sop_id("SOP-1").await.unwrap().unwrap();
        assert_eq!(doc.version(), 2);
        assert_eq!(doc.body(), "v2 body");
    }

    #[tokio::test]
    async fn approve_missing_proposal_is_not_found() {
        let fx = fixture().await;
        let result = fx.service.approve(Uuid::new_v4(), "alice", None).await;
        assert!(matches!(result, Err(PortalError::NotFound { .. })));
    }

    #[tokio::test]
    async fn reject_with_empty_reason_is_validation_error() {
        let fx = fixture().await;
        let proposal = submitted(&fx).await;

        let result = fx.service.reject(proposal.proposal_id(), "alice", "").await;
        assert!(matches!(result, Err(PortalError::Validation { .. })));

        // Status untouched.
        let stored = fx.service.get(proposal.proposal_id()).await.unwrap();
        assert_eq!(stored.status(), ProposalStatus::Pending);
    }

    #[tokio::test]
    async fn reject_with_reason_succeeds_without_touching_source() {
        let fx = fixture().await;
        let proposal = submitted(&fx).await;

        let rejected = fx
            .service
            .reject(proposal.proposal_id(), "alice", "needs rework")
            .await
            .unwrap();
        assert_eq!(rejected.status(), ProposalStatus::Rejected);

        let doc = fx.sources.find_by_sop_id("SOP-1").await.unwrap().unwrap();
        assert_eq!(doc.version(), 1);
    }

    #[tokio::test]
    async fn approve_after_reject_is_conflict_but_archive_succeeds() {
        let fx = fixture().await;
        let proposal = submitted(&fx).await;
        let id = proposal.proposal_id();

        fx.service.reject(id, "alice", "needs rework").await.unwrap();

        let result = fx.service.approve(id, "carol", None).await;
        assert!(matches!(result, Err(PortalError::Conflict { .. })));

        let archived = fx.service.archive(id, "carol", None).await.unwrap();
        assert_eq!(archived.status(), ProposalStatus::Archived);
    }

    #[tokio::test]
    async fn concurrent_transitions_produce_exactly_one_winner() {
        let fx = Arc::new(fixture().await);
        let proposal = submitted(&fx).await;
        let id = proposal.proposal_id();

        let approve = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move { fx.service.approve(id, "alice", None).await })
        };
        let reject = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move { fx.service.reject(id, "carol", "duplicate").await })
        };

        let results = [approve.await.unwrap(), reject.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(PortalError::Conflict { .. }))));

        // The stored history holds the submission plus exactly one decision.
        let stored = fx.service.get(id).await.unwrap();
        assert_eq!(stored.review_history().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_review_cannot_revert_a_committed_approval() {
        let fx = Arc::new(fixture().await);
        let proposal = submitted(&fx).await;
        let id = proposal.proposal_id();

        let approve = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move { fx.service.approve(id, "alice", None).await })
        };
        let review = {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move {
                fx.service
                    .review(id, "carol", Some("checked wording".to_string()))
                    .await
            })
        };

        approve.await.unwrap().unwrap();
        review.await.unwrap().unwrap();

        // Whatever the interleaving, the approval stays committed and both
        // history entries survive.
        let stored = fx.service.get(id).await.unwrap();
        assert_eq!(stored.status(), ProposalStatus::Approved);
        assert_eq!(stored.review_history().len(), 3);
        assert!(stored
            .review_history()
            .iter()
            .any(|e| e.action == ReviewAction::Approved));
        assert!(stored
            .review_history()
            .iter()
            .any(|e| e.action == ReviewAction::Reviewed));
    }

    #[tokio::test]
    async fn review_appends_history_without_status_change() {
        let fx = fixture().await;
        let proposal = submitted(&fx).await;

        let reviewed = fx
            .service
            .review(proposal.proposal_id(), "alice", Some("typo in step 3".to_string()))
            .await
            .unwrap();

        assert_eq!(reviewed.status(), ProposalStatus::Pending);
        assert_eq!(reviewed.review_history().len(), 2);
    }

    #[tokio::test]
    async fn list_includes_submitted_proposals() {
        let fx = fixture().await;
        submitted(&fx).await;
        submitted(&fx).await;

        let all = fx.service.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
