//! In-memory store adapters for testing and single-process deployments.

mod derived_artifact_store;
mod proposal_store;
mod source_document_store;

pub use derived_artifact_store::InMemoryDerivedArtifactStore;
pub use proposal_store::InMemoryProposalStore;
pub use source_document_store::InMemorySourceDocumentStore;
