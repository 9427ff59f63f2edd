//! Error taxonomy for the sync and change-control core.

use thiserror::Error;

/// Errors surfaced by the portal core.
///
/// Per-document derivation failures inside a regeneration batch are captured
/// into the outcome's `errors` instead of aborting the batch; every other
/// variant aborts only the single requested operation.
#[derive(Debug, Clone, Error)]
pub enum PortalError {
    /// A referenced document or proposal does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// A required field is missing or malformed.
    #[error("Field '{field}' is invalid: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A state transition was attempted from an invalid current state,
    /// or a single-flight collision was rejected.
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// The external derivation engine failed for one document.
    #[error("Derivation failed for '{sop_id}': {message}")]
    Derivation { sop_id: String, message: String },

    /// A backing store is unavailable or misbehaving.
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl PortalError {
    /// Creates a not-found error for a source document.
    pub fn document_not_found(sop_id: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity: "source document",
            id: sop_id.into(),
        }
    }

    /// Creates a not-found error for a change proposal.
    pub fn proposal_not_found(proposal_id: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity: "change proposal",
            id: proposal_id.into(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PortalError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        PortalError::Conflict {
            reason: reason.into(),
        }
    }

    /// Creates a derivation failure for one document.
    pub fn derivation(sop_id: impl Into<String>, message: impl Into<String>) -> Self {
        PortalError::Derivation {
            sop_id: sop_id.into(),
            message: message.into(),
        }
    }

    /// Creates a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        PortalError::Persistence {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::NotFound { .. } => "NOT_FOUND",
            PortalError::Validation { .. } => "VALIDATION_ERROR",
            PortalError::Conflict { .. } => "CONFLICT",
            PortalError::Derivation { .. } => "DERIVATION_FAILURE",
            PortalError::Persistence { .. } => "PERSISTENCE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_not_found_displays_entity_and_id() {
        let err = PortalError::document_not_found("SOP-9");
        assert_eq!(format!("{}", err), "source document 'SOP-9' not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn validation_displays_field_and_reason() {
        let err = PortalError::validation("reason", "cannot be empty");
        assert_eq!(
            format!("{}", err),
            "Field 'reason' is invalid: cannot be empty"
        );
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn conflict_displays_reason() {
        let err = PortalError::conflict("proposal is not pending");
        assert_eq!(format!("{}", err), "Conflict: proposal is not pending");
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn derivation_carries_sop_id() {
        let err = PortalError::derivation("SOP-1", "engine exploded");
        assert_eq!(
            format!("{}", err),
            "Derivation failed for 'SOP-1': engine exploded"
        );
        assert_eq!(err.code(), "DERIVATION_FAILURE");
    }

    #[test]
    fn persistence_code_is_stable() {
        assert_eq!(
            PortalError::persistence("store down").code(),
            "PERSISTENCE_ERROR"
        );
    }
}
