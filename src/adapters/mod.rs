//! Adapters - concrete implementations of the ports.

pub mod derivation;
pub mod http;
pub mod memory;

pub use derivation::{ScriptedEngine, SinglePassEngine};
pub use memory::{
    InMemoryDerivedArtifactStore, InMemoryProposalStore, InMemorySourceDocumentStore,
};
