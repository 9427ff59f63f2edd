//! In-memory source document store for testing and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::PortalError;
use crate::domain::sop::{DocumentDelta, SourceDocument};
use crate::ports::SourceDocumentStore;

/// In-memory implementation of [`SourceDocumentStore`].
///
/// Version bumps happen under the write lock, so `version`/`updated_at`
/// always move together.
#[derive(Debug, Default, Clone)]
pub struct InMemorySourceDocumentStore {
    documents: Arc<RwLock<HashMap<String, SourceDocument>>>,
}

impl InMemorySourceDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with documents, replacing any with the same key.
    pub async fn seed(&self, documents: impl IntoIterator<Item = SourceDocument>) {
        let mut guard = self.documents.write().await;
        for doc in documents {
            guard.insert(doc.sop_id().to_string(), doc);
        }
    }

    /// Deactivate a document. No-op if absent.
    pub async fn deactivate(&self, sop_id: &str) {
        let mut guard = self.documents.write().await;
        if let Some(doc) = guard.get_mut(sop_id) {
            doc.deactivate();
        }
    }
}

#[async_trait]
impl SourceDocumentStore for InMemorySourceDocumentStore {
    async fn list_active(&self) -> Result<Vec<SourceDocument>, PortalError> {
        let guard = self.documents.read().await;
        let mut active: Vec<SourceDocument> = guard
            .values()
            .filter(|doc| doc.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.phase()
                .cmp(&b.phase())
                .then_with(|| a.sop_id().cmp(b.sop_id()))
        });
        Ok(active)
    }

    async fn find_by_sop_id(&self, sop_id: &str) -> Result<Option<SourceDocument>, PortalError> {
        Ok(self.documents.read().await.get(sop_id).cloned())
    }

    async fn insert(&self, document: SourceDocument) -> Result<(), PortalError> {
        let mut guard = self.documents.write().await;
        if guard
            .get(document.sop_id())
            .is_some_and(|existing| existing.is_active())
        {
            return Err(PortalError::conflict(format!(
                "active document '{}' already exists",
                document.sop_id()
            )));
        }
        guard.insert(document.sop_id().to_string(), document);
        Ok(())
    }

    async fn apply_delta(
        &self,
        sop_id: &str,
        delta: &DocumentDelta,
    ) -> Result<SourceDocument, PortalError> {
        let mut guard = self.documents.write().await;
        let doc = guard
            .get_mut(sop_id)
            .ok_or_else(|| PortalError::document_not_found(sop_id))?;
        doc.apply_delta(delta)?;
        Ok(doc.clone())
    }
}
