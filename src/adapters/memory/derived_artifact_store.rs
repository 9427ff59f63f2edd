//! In-memory derived artifact store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::PortalError;
use crate::domain::sop::DerivedArtifact;
use crate::ports::DerivedArtifactStore;

/// In-memory implementation of [`DerivedArtifactStore`].
///
/// Enforces the non-decreasing `last_synced_at` invariant under the write
/// lock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDerivedArtifactStore {
    artifacts: Arc<RwLock<HashMap<String, DerivedArtifact>>>,
}

impl InMemoryDerivedArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

#[async_trait]
impl DerivedArtifactStore for InMemoryDerivedArtifactStore {
    async fn find_by_sop_id(&self, sop_id: &str) -> Result<Option<DerivedArtifact>, PortalError> {
        Ok(self.artifacts.read().await.get(sop_id).cloned())
    }

    async fn upsert(&self, artifact: DerivedArtifact) -> Result<(), PortalError> {
        let mut guard = self.artifacts.write().await;
        if let Some(existing) = guard.get(&artifact.sop_id) {
            if artifact.last_synced_at.is_before(&existing.last_synced_at) {
                return Err(PortalError::persistence(format!(
                    "refusing to move last_synced_at backwards for '{}'",
                    artifact.sop_id
                )));
            }
        }
        guard.insert(artifact.sop_id.clone(), artifact);
        Ok(())
    }
}
