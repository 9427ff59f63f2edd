//! Derivation engine port - external generator of agent-facing content.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::PortalError;
use crate::domain::sop::SourceDocument;

/// Content produced by one derivation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedContent {
    pub title: String,
    pub summary: String,
    pub keywords: BTreeSet<String>,
    pub body: String,
    /// Non-fatal notes the engine wants surfaced in the outcome.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Port for the derivation collaborator.
///
/// Which concrete strategy backs this (graph workflow or single-pass) is a
/// construction-time choice; the pipeline only sees this contract. Failures
/// are engine-specific and reported as `Derivation` errors; the pipeline
/// isolates them per document.
#[async_trait]
pub trait DerivationEngine: Send + Sync {
    /// Derive agent-facing content from one source document.
    async fn derive(&self, source: &SourceDocument) -> Result<DerivedContent, PortalError>;
}
