// Copyright 2025 Cowboy AI, LLC.

//! Error types for domain operations
//!
//! Two kinds of failures cross the domain boundary: field validation errors
//! raised while constructing or updating a value, and business-rule
//! violations raised when a structurally valid input is used in a state that
//! forbids it. Rule violations carry a stable machine-readable [`RuleCode`]
//! so calling layers never have to string-match error text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable machine-readable codes for business-rule violations.
///
/// These are the wire codes the application layer maps to user-facing
/// messages. They must never change once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCode {
    /// The operation is not allowed in the record's current lifecycle state
    EstadoInvalido,
    /// Owned entities may only be mutated while the record is a draft
    NoEditable,
    /// The signing party has already signed this record
    YaFirmado,
    /// The record has been voided; no further operations are allowed
    HesAnulada,
    /// Completion requirements are not satisfied
    NoCompletable,
}

impl RuleCode {
    /// The stable wire representation of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::EstadoInvalido => "ESTADO_INVALIDO",
            RuleCode::NoEditable => "NO_EDITABLE",
            RuleCode::YaFirmado => "YA_FIRMADO",
            RuleCode::HesAnulada => "HES_ANULADA",
            RuleCode::NoCompletable => "NO_COMPLETABLE",
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in domain operations
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// A single malformed input, tagged with the offending field
    #[error("Validation error on field `{field}`: {message}")]
    Validation {
        /// Name of the field that failed validation
        field: String,
        /// Why the value was rejected
        message: String,
    },

    /// A structurally valid input used in a state that forbids it
    #[error("Business rule violation [{code}]: {message}")]
    RuleViolation {
        /// Stable machine-readable code for the violated rule
        code: RuleCode,
        /// Human-readable description of the violation
        message: String,
    },

    /// Completion was attempted with requirements missing.
    ///
    /// Carries every missing requirement at once so a caller can present
    /// all gaps in a single round trip.
    #[error("Record cannot be completed: {} requirement(s) missing", .missing.len())]
    Incomplete {
        /// All missing-requirement messages, in checklist order
        missing: Vec<String>,
    },

    /// A submitted form failed validation against its template.
    ///
    /// Like [`DomainError::Incomplete`], every violation is collected and
    /// reported in one pass.
    #[error("Form validation failed: {} field error(s)", .errors.len())]
    FormInvalid {
        /// All field-level violations, in template field order
        errors: Vec<String>,
    },

    /// Invalid state transition
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state
        from: String,
        /// Attempted target state
        to: String,
    },

    /// Aggregate not found
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(String),

    /// Concurrency conflict
    #[error("Concurrency conflict: expected version {expected}, but found {actual}")]
    ConcurrencyConflict {
        /// Expected version
        expected: u64,
        /// Actual version
        actual: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl DomainError {
    /// Create a field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a business-rule violation with a stable code
    pub fn rule(code: RuleCode, message: impl Into<String>) -> Self {
        DomainError::RuleViolation {
            code,
            message: message.into(),
        }
    }

    /// Check if this is a field validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation { .. })
    }

    /// Check if this is a concurrency error
    pub fn is_concurrency_error(&self) -> bool {
        matches!(self, DomainError::ConcurrencyConflict { .. })
    }

    /// The machine-readable rule code, if this is a rule violation.
    ///
    /// [`DomainError::Incomplete`] reports [`RuleCode::NoCompletable`].
    pub fn rule_code(&self) -> Option<RuleCode> {
        match self {
            DomainError::RuleViolation { code, .. } => Some(*code),
            DomainError::Incomplete { .. } => Some(RuleCode::NoCompletable),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error creation and display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[DomainError] -->|Display| B[Error Message]
    ///     A -->|rule_code| C[Stable Code]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = DomainError::validation("nombre", "must be at least 2 characters");
        assert_eq!(
            err.to_string(),
            "Validation error on field `nombre`: must be at least 2 characters"
        );

        let err = DomainError::rule(RuleCode::YaFirmado, "client already signed");
        assert_eq!(
            err.to_string(),
            "Business rule violation [YA_FIRMADO]: client already signed"
        );

        let err = DomainError::Incomplete {
            missing: vec!["client signature".to_string(), "diagnosis".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Record cannot be completed: 2 requirement(s) missing"
        );

        let err = DomainError::InvalidStateTransition {
            from: "Completada".to_string(),
            to: "Borrador".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Completada to Borrador"
        );

        let err = DomainError::ConcurrencyConflict {
            expected: 5,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Concurrency conflict: expected version 5, but found 3"
        );

        let err = DomainError::AggregateNotFound("HES-2025-0001".to_string());
        assert_eq!(err.to_string(), "Aggregate not found: HES-2025-0001");
    }

    /// Test stable wire codes never drift
    #[test]
    fn test_rule_code_wire_values() {
        assert_eq!(RuleCode::EstadoInvalido.as_str(), "ESTADO_INVALIDO");
        assert_eq!(RuleCode::NoEditable.as_str(), "NO_EDITABLE");
        assert_eq!(RuleCode::YaFirmado.as_str(), "YA_FIRMADO");
        assert_eq!(RuleCode::HesAnulada.as_str(), "HES_ANULADA");
        assert_eq!(RuleCode::NoCompletable.as_str(), "NO_COMPLETABLE");
    }

    /// Test rule_code helper across variants
    #[test]
    fn test_rule_code_helper() {
        let err = DomainError::rule(RuleCode::NoEditable, "record is completed");
        assert_eq!(err.rule_code(), Some(RuleCode::NoEditable));

        // Incomplete maps to NO_COMPLETABLE without carrying the code inline
        let err = DomainError::Incomplete { missing: vec![] };
        assert_eq!(err.rule_code(), Some(RuleCode::NoCompletable));

        let err = DomainError::validation("motivo", "must not be empty");
        assert_eq!(err.rule_code(), None);
    }

    /// Test is_validation helper
    #[test]
    fn test_is_validation() {
        assert!(DomainError::validation("email", "missing @").is_validation());
        assert!(!DomainError::rule(RuleCode::HesAnulada, "voided").is_validation());
        assert!(!DomainError::Internal("oops".to_string()).is_validation());
    }

    /// Test all error variants can be cloned
    #[test]
    fn test_all_errors_clone() {
        let errors: Vec<DomainError> = vec![
            DomainError::validation("f", "m"),
            DomainError::rule(RuleCode::EstadoInvalido, "m"),
            DomainError::Incomplete {
                missing: vec!["x".to_string()],
            },
            DomainError::FormInvalid {
                errors: vec!["y".to_string()],
            },
            DomainError::InvalidStateTransition {
                from: "A".to_string(),
                to: "B".to_string(),
            },
            DomainError::AggregateNotFound("test".to_string()),
            DomainError::ConcurrencyConflict {
                expected: 1,
                actual: 2,
            },
            DomainError::Serialization("test".to_string()),
            DomainError::Internal("test".to_string()),
        ];

        for error in errors {
            let cloned = error.clone();
            assert_eq!(error.to_string(), cloned.to_string());
        }
    }

    /// Test serde_json error conversion
    #[test]
    fn test_serde_json_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
        let domain_err: DomainError = serde_err.into();

        match domain_err {
            DomainError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }
}
