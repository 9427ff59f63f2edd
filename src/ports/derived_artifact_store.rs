//! Derived artifact store port - generated summaries per document.

use async_trait::async_trait;

use crate::domain::foundation::PortalError;
use crate::domain::sop::DerivedArtifact;

/// Port for the generated artifact store.
///
/// # Contract
///
/// Implementations must:
/// - Keep at most one artifact per `sop_id` (upsert overwrites)
/// - Never let `last_synced_at` decrease across writes for the same key
///
/// Artifacts are written only by the regeneration pipeline.
#[async_trait]
pub trait DerivedArtifactStore: Send + Sync {
    /// Find the artifact for a document, if one has been generated.
    async fn find_by_sop_id(&self, sop_id: &str) -> Result<Option<DerivedArtifact>, PortalError>;

    /// Insert or overwrite the artifact for its `sop_id`.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write would move `last_synced_at`
    /// backwards.
    async fn upsert(&self, artifact: DerivedArtifact) -> Result<(), PortalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_artifact_store_is_object_safe() {
        fn check<T: DerivedArtifactStore + ?Sized>() {}
        check::<dyn DerivedArtifactStore>();
    }
}
