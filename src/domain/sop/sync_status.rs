//! Staleness evaluation between a source document and its derived artifact.

use serde::{Deserialize, Serialize};

use super::{DerivedArtifact, SourceDocument};

/// Sync state of a derived artifact relative to its source. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No derived artifact exists yet.
    Missing,
    /// The source changed after the artifact was generated.
    Stale,
    /// The artifact is current.
    InSync,
}

impl SyncStatus {
    /// Evaluate the sync state for one document. Pure and total.
    ///
    /// Equal timestamps count as `InSync`: a derivation stamped at the same
    /// instant as the source edit is considered current.
    pub fn evaluate(source: &SourceDocument, derived: Option<&DerivedArtifact>) -> Self {
        match derived {
            None => SyncStatus::Missing,
            Some(artifact) => {
                if source.updated_at().is_after(&artifact.last_synced_at) {
                    SyncStatus::Stale
                } else {
                    SyncStatus::InSync
                }
            }
        }
    }

    /// Returns true if the document needs (re-)derivation.
    pub fn needs_regeneration(&self) -> bool {
        !matches!(self, SyncStatus::InSync)
    }
}
