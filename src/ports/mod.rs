//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! - `SourceDocumentStore` - authoritative, versioned documents
//! - `DerivedArtifactStore` - generated artifacts per document
//! - `DerivationEngine` - the external generation collaborator
//! - `ProposalStore` - change proposals with atomic review transitions

mod derivation_engine;
mod derived_artifact_store;
mod proposal_store;
mod source_document_store;

pub use derivation_engine::{DerivationEngine, DerivedContent};
pub use derived_artifact_store::DerivedArtifactStore;
pub use proposal_store::{ProposalStore, ProposalTransition};
pub use source_document_store::SourceDocumentStore;
