//! Proposal store port - persistence with atomic review transitions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::PortalError;
use crate::domain::proposal::ChangeProposal;

/// Mutation applied to the stored proposal record.
///
/// Runs against the stored record while the store holds its write lock, so
/// the mutation always sees the latest committed state.
pub type ProposalTransition =
    Box<dyn FnOnce(&mut ChangeProposal) -> Result<(), PortalError> + Send>;

/// Port for change proposal persistence.
///
/// # Contract
///
/// `transition` is the concurrency primitive: the mutation executes against
/// the stored record under the store's write lock, and the record is
/// replaced only when the mutation succeeds. Two simultaneous approve/reject
/// calls on the same pending proposal therefore produce exactly one winner
/// (the second mutation observes the committed status and refuses with
/// `Conflict`), and a concurrent review can never revert a committed status
/// or drop another caller's history entry.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Persist a newly submitted proposal.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the proposal id already exists.
    async fn insert(&self, proposal: ChangeProposal) -> Result<(), PortalError>;

    /// Find a proposal by id.
    async fn find_by_id(&self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, PortalError>;

    /// List all proposals, newest first.
    async fn list(&self) -> Result<Vec<ChangeProposal>, PortalError>;

    /// Apply `mutate` to the stored record atomically and return the
    /// committed result.
    ///
    /// On mutation failure the stored record is left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the proposal does not exist
    /// - Whatever the mutation itself returns (`Conflict` from a transition
    ///   attempted outside `Pending`, `Validation` from a bad input)
    async fn transition(
        &self,
        proposal_id: Uuid,
        mutate: ProposalTransition,
    ) -> Result<ChangeProposal, PortalError>;
}
