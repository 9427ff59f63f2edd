//! Regeneration pipeline - re-derives artifacts for stale or missing SOPs.
//!
//! Failure isolation is mandatory: one bad document never blocks the rest of
//! a batch. A keyed single-flight lock guarantees at most one concurrent
//! derivation per `sop_id`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::foundation::{PortalError, Timestamp};
use crate::domain::sop::{DerivedArtifact, SourceDocument, SyncStatus};
use crate::ports::{DerivationEngine, DerivedArtifactStore, SourceDocumentStore};

use super::cache::SopCache;
use super::single_flight::SingleFlight;

/// Per-document regeneration result.
#[derive(Debug, Clone, Serialize)]
pub struct RegenerationOutcome {
    pub sop_id: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RegenerationOutcome {
    fn in_sync(sop_id: impl Into<String>) -> Self {
        Self {
            sop_id: sop_id.into(),
            success: true,
            message: "already in sync".to_string(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn regenerated(sop_id: impl Into<String>, version: u64, warnings: Vec<String>) -> Self {
        Self {
            sop_id: sop_id.into(),
            success: true,
            message: format!("regenerated from source version {version}"),
            warnings,
            errors: Vec::new(),
        }
    }

    fn failed(sop_id: impl Into<String>, error: &PortalError) -> Self {
        Self {
            sop_id: sop_id.into(),
            success: false,
            message: "regeneration failed".to_string(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
        }
    }
}

/// Aggregate result of one batch pass.
#[derive(Debug, Clone, Serialize)]
pub struct RegenerationSummary {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub outcomes: Vec<RegenerationOutcome>,
}

impl RegenerationSummary {
    fn from_outcomes(outcomes: Vec<RegenerationOutcome>) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        Self {
            total_processed: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            outcomes,
        }
    }
}

/// Sync-status listing row for one active document.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusEntry {
    pub sop_id: String,
    pub title: String,
    pub version: u64,
    pub phase: u32,
    /// Source version the current artifact was generated from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<u64>,
    pub sync_status: SyncStatus,
}

/// Orchestrates re-derivation across active source documents.
pub struct RegenerationPipeline {
    sources: Arc<dyn SourceDocumentStore>,
    artifacts: Arc<dyn DerivedArtifactStore>,
    engine: Arc<dyn DerivationEngine>,
    cache: Arc<SopCache>,
    flights: SingleFlight,
}

impl RegenerationPipeline {
    pub fn new(
        sources: Arc<dyn SourceDocumentStore>,
        artifacts: Arc<dyn DerivedArtifactStore>,
        engine: Arc<dyn DerivationEngine>,
        cache: Arc<SopCache>,
    ) -> Self {
        Self {
            sources,
            artifacts,
            engine,
            cache,
            flights: SingleFlight::new(),
        }
    }

    /// Regenerate every active document that is stale or missing.
    ///
    /// Documents are processed in `phase`/`sop_id` order and outcomes are
    /// reported in that same order. Idempotent: a repeat run with no source
    /// edits invokes the engine zero times and leaves `last_synced_at`
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` only if the active document listing itself
    /// fails; per-document errors are captured into outcomes.
    pub async fn regenerate_all(&self) -> Result<RegenerationSummary, PortalError> {
        let documents = self.sources.list_active().await?;
        info!(total = documents.len(), "starting regeneration pass");

        let mut outcomes = Vec::with_capacity(documents.len());
        for document in &documents {
            outcomes.push(self.regenerate_document(document).await);
        }

        let summary = RegenerationSummary::from_outcomes(outcomes);
        info!(
            total = summary.total_processed,
            successful = summary.successful,
            failed = summary.failed,
            "regeneration pass finished"
        );
        Ok(summary)
    }

    /// Regenerate a single document by business key.
    ///
    /// Same single-flight and idempotence guarantees as the batch form.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no active document exists for `sop_id`.
    pub async fn regenerate_one(&self, sop_id: &str) -> Result<RegenerationOutcome, PortalError> {
        let document = self
            .sources
            .find_by_sop_id(sop_id)
            .await?
            .filter(|doc| doc.is_active())
            .ok_or_else(|| PortalError::document_not_found(sop_id))?;

        Ok(self.regenerate_document(&document).await)
    }

    /// Sync-status listing for every active document.
    pub async fn list_sync_status(&self) -> Result<Vec<SyncStatusEntry>, PortalError> {
        let documents = self.sources.list_active().await?;
        let mut entries = Vec::with_capacity(documents.len());
        for document in documents {
            let artifact = self.artifacts.find_by_sop_id(document.sop_id()).await?;
            entries.push(SyncStatusEntry {
                sop_id: document.sop_id().to_string(),
                title: document.title().to_string(),
                version: document.version(),
                phase: document.phase(),
                agent_version: artifact.as_ref().map(|a| a.source_version),
                sync_status: SyncStatus::evaluate(&document, artifact.as_ref()),
            });
        }
        Ok(entries)
    }

    /// Process one document under its single-flight lock.
    ///
    /// Staleness is evaluated after the lock is acquired, so a caller that
    /// waited behind a completed flight observes `InSync` instead of running
    /// a second derivation. All failures, including store failures, are
    /// captured into the outcome to preserve batch isolation.
    async fn regenerate_document(&self, document: &SourceDocument) -> RegenerationOutcome {
        let sop_id = document.sop_id();
        let _flight = self.flights.acquire(sop_id).await;

        // The lock wait may have overlapped a content edit or a completed
        // regeneration; re-read the authoritative record.
        let current = match self.sources.find_by_sop_id(sop_id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                return RegenerationOutcome::failed(sop_id, &PortalError::document_not_found(sop_id))
            }
            Err(error) => return RegenerationOutcome::failed(sop_id, &error),
        };

        let existing = match self.artifacts.find_by_sop_id(sop_id).await {
            Ok(existing) => existing,
            Err(error) => return RegenerationOutcome::failed(sop_id, &error),
        };

        if !SyncStatus::evaluate(&current, existing.as_ref()).needs_regeneration() {
            return RegenerationOutcome::in_sync(sop_id);
        }

        let content = match self.engine.derive(&current).await {
            Ok(content) => content,
            Err(error) => {
                warn!(sop_id, %error, "derivation failed");
                return RegenerationOutcome::failed(sop_id, &error);
            }
        };

        let artifact = DerivedArtifact {
            sop_id: sop_id.to_string(),
            source_version: current.version(),
            title: content.title,
            summary: content.summary,
            keywords: content.keywords,
            body: content.body,
            last_synced_at: Timestamp::now(),
        };

        if let Err(error) = self.artifacts.upsert(artifact.clone()).await {
            warn!(sop_id, %error, "artifact write failed");
            return RegenerationOutcome::failed(sop_id, &error);
        }
        self.cache.insert(artifact).await;

        RegenerationOutcome::regenerated(sop_id, current.version(), content.warnings)
    }
}
