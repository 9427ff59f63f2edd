//! In-memory proposal store with atomic review transitions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::PortalError;
use crate::domain::proposal::ChangeProposal;
use crate::ports::{ProposalStore, ProposalTransition};

/// In-memory implementation of [`ProposalStore`].
///
/// Transitions mutate a copy of the stored record and commit it under one
/// write lock acquisition, so a failed mutation leaves the record untouched
/// and concurrent callers always mutate the latest committed state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProposalStore {
    proposals: Arc<RwLock<HashMap<Uuid, ChangeProposal>>>,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalStore for InMemoryProposalStore {
    async fn insert(&self, proposal: ChangeProposal) -> Result<(), PortalError> {
        let mut guard = self.proposals.write().await;
        if guard.contains_key(&proposal.proposal_id()) {
            return Err(PortalError::conflict(format!(
                "proposal {} already exists",
                proposal.proposal_id()
            )));
        }
        guard.insert(proposal.proposal_id(), proposal);
        Ok(())
    }

    async fn find_by_id(&self, proposal_id: Uuid) -> Result<Option<ChangeProposal>, PortalError> {
        Ok(self.proposals.read().await.get(&proposal_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ChangeProposal>, PortalError> {
        let guard = self.proposals.read().await;
        let mut all: Vec<ChangeProposal> = guard.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(all)
    }

    async fn transition(
        &self,
        proposal_id: Uuid,
        mutate: ProposalTransition,
    ) -> Result<ChangeProposal, PortalError> {
        let mut guard = self.proposals.write().await;
        let stored = guard
            .get_mut(&proposal_id)
            .ok_or_else(|| PortalError::proposal_not_found(proposal_id.to_string()))?;

        // Mutate a copy; commit only on success.
        let mut updated = stored.clone();
        mutate(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }
}
