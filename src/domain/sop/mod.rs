//! SOP document model: source documents, derived artifacts, staleness.

mod derived_artifact;
mod source_document;
mod sync_status;

pub use derived_artifact::DerivedArtifact;
pub use source_document::{DocumentDelta, SourceDocument};
pub use sync_status::SyncStatus;
