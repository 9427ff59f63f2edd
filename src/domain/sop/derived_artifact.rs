//! Derived artifact entity - the agent-facing generated form of an SOP.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Generated summary/keywords for one source document.
///
/// # Invariants
///
/// - `last_synced_at` is non-decreasing across successive writes per `sop_id`
/// - Created and overwritten only by the regeneration pipeline
/// - May be absent even when its source document is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedArtifact {
    /// Source document this artifact belongs to.
    pub sop_id: String,

    /// The `SourceDocument::version` this artifact was generated from.
    pub source_version: u64,

    /// Generated title.
    pub title: String,

    /// Generated summary.
    pub summary: String,

    /// Generated keyword set. BTreeSet keeps serialization order stable.
    pub keywords: BTreeSet<String>,

    /// Generated body.
    pub body: String,

    /// When this artifact was generated.
    pub last_synced_at: Timestamp,
}

impl DerivedArtifact {
    /// Approximate in-memory footprint in bytes, used for cache stats.
    pub fn approx_size_bytes(&self) -> usize {
        self.sop_id.len()
            + self.title.len()
            + self.summary.len()
            + self.body.len()
            + self.keywords.iter().map(|k| k.len()).sum::<usize>()
    }
}
