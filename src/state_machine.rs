//! State machine for the HES lifecycle
//!
//! Aggregates enforce valid state transitions through a small enum-based
//! state machine: states are a closed enum, transitions are checked before
//! any mutation is applied, and absorbing states admit no exit.

use crate::errors::{DomainError, DomainResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for types that can be used as states in a state machine
pub trait State: Debug + Clone + PartialEq + Eq + Send + Sync {
    /// Get the name of this state for logging/debugging
    fn name(&self) -> &'static str;

    /// Check if this is an absorbing state (no transitions leave it)
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Transition rules for a state machine
pub trait StateTransitions: State {
    /// Check if a transition to the target state is valid
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Get all valid target states from this state
    fn valid_transitions(&self) -> Vec<Self>;

    /// Guard a transition, returning a typed error when it is not allowed
    fn ensure_transition_to(&self, target: &Self) -> DomainResult<()> {
        if self.is_terminal() || !self.can_transition_to(target) {
            return Err(DomainError::InvalidStateTransition {
                from: self.name().to_string(),
                to: target.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle states of an HES record
///
/// ```text
/// Borrador ──completar()──▶ Completada ──anular()──▶ Anulada
///     └───────────────anular()─────────────────────▶ Anulada
/// ```
///
/// `Anulada` is absorbing. `Completada` closes the record for edits and
/// signatures but can still be voided with a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoHes {
    /// Initial state - the record is being filled in
    Borrador,
    /// All requirements met and both parties signed
    Completada,
    /// Voided with a recorded reason; absorbing
    Anulada,
}

impl State for EstadoHes {
    fn name(&self) -> &'static str {
        match self {
            EstadoHes::Borrador => "Borrador",
            EstadoHes::Completada => "Completada",
            EstadoHes::Anulada => "Anulada",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, EstadoHes::Anulada)
    }
}

impl StateTransitions for EstadoHes {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (EstadoHes::Borrador, EstadoHes::Completada)
                | (EstadoHes::Borrador, EstadoHes::Anulada)
                | (EstadoHes::Completada, EstadoHes::Anulada)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            EstadoHes::Borrador => vec![EstadoHes::Completada, EstadoHes::Anulada],
            EstadoHes::Completada => vec![EstadoHes::Anulada],
            EstadoHes::Anulada => vec![],
        }
    }
}
