//! Source document store port - the authoritative document collection.

use async_trait::async_trait;

use crate::domain::foundation::PortalError;
use crate::domain::sop::{DocumentDelta, SourceDocument};

/// Port for the authoritative, versioned document store.
///
/// # Contract
///
/// Implementations must:
/// - Keep at most one active document per `sop_id`
/// - Bump `version` and `updated_at` together on every content write
/// - Return active documents in deterministic order: `phase` ascending,
///   then `sop_id` ascending
///
/// The cache never sits in front of this store; staleness decisions always
/// read the authoritative record.
#[async_trait]
pub trait SourceDocumentStore: Send + Sync {
    /// List all active documents in `phase`/`sop_id` order.
    async fn list_active(&self) -> Result<Vec<SourceDocument>, PortalError>;

    /// Find a document by its business key.
    async fn find_by_sop_id(&self, sop_id: &str) -> Result<Option<SourceDocument>, PortalError>;

    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if an active document with the same `sop_id`
    /// already exists.
    async fn insert(&self, document: SourceDocument) -> Result<(), PortalError>;

    /// Apply a content delta, bumping `version` and `updated_at`.
    ///
    /// Returns the updated document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no document exists for `sop_id`.
    async fn apply_delta(
        &self,
        sop_id: &str,
        delta: &DocumentDelta,
    ) -> Result<SourceDocument, PortalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_document_store_is_object_safe() {
        fn check<T: SourceDocumentStore + ?Sized>() {}
        check::<dyn SourceDocumentStore>();
    }
}
