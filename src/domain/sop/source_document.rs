//! Source document entity - the authoritative record for an SOP.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PortalError, Timestamp};

/// Authoritative, versioned record for a single SOP.
///
/// # Invariants
///
/// - At most one active document exists per `sop_id`
/// - `version` strictly increases on every content mutation
/// - `updated_at` is set exactly when `version` increases
/// - Documents are never hard-deleted, only deactivated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable business key, unique among active documents.
    sop_id: String,

    /// Monotonically increasing content version.
    version: u64,

    /// Ordering/grouping key for regeneration passes.
    phase: u32,

    /// Document title.
    title: String,

    /// Full document body.
    body: String,

    /// When the content last changed.
    updated_at: Timestamp,

    /// Soft-delete flag.
    is_active: bool,
}

impl SourceDocument {
    /// Create a new active document at version 1.
    ///
    /// # Errors
    ///
    /// - `Validation` if `sop_id` or `title` is empty
    pub fn new(
        sop_id: impl Into<String>,
        phase: u32,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, PortalError> {
        let sop_id = sop_id.into();
        let title = title.into();
        if sop_id.trim().is_empty() {
            return Err(PortalError::validation("sop_id", "cannot be empty"));
        }
        if title.trim().is_empty() {
            return Err(PortalError::validation("title", "cannot be empty"));
        }

        Ok(Self {
            sop_id,
            version: 1,
            phase,
            title,
            body: body.into(),
            updated_at: Timestamp::now(),
            is_active: true,
        })
    }

    /// Reconstitute a document from persistence (no validation).
    pub fn reconstitute(
        sop_id: String,
        version: u64,
        phase: u32,
        title: String,
        body: String,
        updated_at: Timestamp,
        is_active: bool,
    ) -> Self {
        Self {
            sop_id,
            version,
            phase,
            title,
            body,
            updated_at,
            is_active,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn sop_id(&self) -> &str {
        &self.sop_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a content delta, bumping `version` and `updated_at`.
    ///
    /// An empty delta is rejected: a version bump must correspond to an
    /// actual content change.
    ///
    /// # Errors
    ///
    /// - `Validation` if the delta carries no changes
    /// - `Conflict` if the document is inactive
    pub fn apply_delta(&mut self, delta: &DocumentDelta) -> Result<(), PortalError> {
        if !self.is_active {
            return Err(PortalError::conflict(format!(
                "document '{}' is inactive",
                self.sop_id
            )));
        }
        if delta.is_empty() {
            return Err(PortalError::validation("delta", "carries no changes"));
        }

        if let Some(title) = &delta.title {
            self.title = title.clone();
        }
        if let Some(body) = &delta.body {
            self.body = body.clone();
        }
        if let Some(phase) = delta.phase {
            self.phase = phase;
        }

        self.version += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Deactivate the document (soft delete).
    ///
    /// Not a content mutation: `version` and `updated_at` are untouched.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Proposed content changes to a source document.
///
/// `None` fields are left untouched when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
}

impl DocumentDelta {
    /// Delta that replaces only the body.
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.phase.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> SourceDocument {
        SourceDocument::new("SOP-1", 1, "Incident Response", "Call someone.").unwrap()
    }

    #[test]
    fn new_document_starts_at_version_one_and_active() {
        let doc = doc();
        assert_eq!(doc.version(), 1);
        assert!(doc.is_active());
        assert_eq!(doc.sop_id(), "SOP-1");
    }

    #[test]
    fn rejects_empty_sop_id() {
        let result = SourceDocument::new("  ", 1, "Title", "Body");
        assert!(matches!(result, Err(PortalError::Validation { .. })));
    }

    #[test]
    fn rejects_empty_title() {
        let result = SourceDocument::new("SOP-1", 1, "", "Body");
        assert!(matches!(result, Err(PortalError::Validation { .. })));
    }

    #[test]
    fn apply_delta_bumps_version_and_updated_at() {
        let mut doc = doc();
        let before = doc.updated_at();

        doc.apply_delta(&DocumentDelta::body("Call two people.")).unwrap();

        assert_eq!(doc.version(), 2);
        assert_eq!(doc.body(), "Call two people.");
        assert!(!doc.updated_at().is_before(&before));
    }

    #[test]
    fn apply_delta_updates_only_set_fields() {
        let mut doc = doc();
        doc.apply_delta(&DocumentDelta {
            title: Some("Incident Response v2".to_string()),
            body: None,
            phase: None,
        })
        .unwrap();

        assert_eq!(doc.title(), "Incident Response v2");
        assert_eq!(doc.body(), "Call someone.");
    }

    #[test]
    fn apply_empty_delta_is_rejected() {
        let mut doc = doc();
        let result = doc.apply_delta(&DocumentDelta::default());
        assert!(matches!(result, Err(PortalError::Validation { .. })));
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn apply_delta_to_inactive_document_is_a_conflict() {
        let mut doc = doc();
        doc.deactivate();

        let result = doc.apply_delta(&DocumentDelta::body("nope"));
        assert!(matches!(result, Err(PortalError::Conflict { .. })));
    }

    #[test]
    fn deactivate_does_not_bump_version() {
        let mut doc = doc();
        doc.deactivate();
        assert!(!doc.is_active());
        assert_eq!(doc.version(), 1);
    }
}
