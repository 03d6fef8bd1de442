//! # Cermont Domain
//!
//! Domain core for the Cermont maintenance platform, built from classic
//! Domain-Driven Design blocks:
//! - **Entities**: Types with identity and lifecycle
//! - **Value Objects**: Immutable types defined by their attributes
//! - **Aggregates**: Consistency boundaries with root entities (the HES
//!   service-entry record)
//! - **Domain Events**: Things that happen in the domain, returned
//!   explicitly by aggregate mutations
//! - **Commands**: Requests to change state (return only acknowledgments)
//! - **State Machines**: Enum-based state management with controlled
//!   transitions
//! - **Form engine**: Dynamic templates with conditional visibility,
//!   calculated fields and JSON-schema generation
//!
//! ## Design Principles
//!
//! 1. **Type Safety**: Phantom-typed IDs and closed enums for compile-time
//!    guarantees
//! 2. **Explicit events**: Mutations return the events they emit; no hidden
//!    buffers
//! 3. **Derived state stays derived**: the risk level is recomputed, never
//!    accepted from callers
//! 4. **Trusting hydration**: reconstruction from storage bypasses
//!    creation-time validation and is clearly separated from it
//! 5. **No dynamic evaluation**: calculated-field formulas run through a
//!    constrained arithmetic parser

#![warn(missing_docs)]

mod cqrs;
mod entity;
mod errors;
mod events;
mod state_machine;

mod command_handlers;
pub mod forms;
pub mod hes;

// Re-export core types
pub use cqrs::{
    AggregateTransactionId, CausationId, Command, CommandAcknowledgment, CommandEnvelope,
    CommandId, CommandStatus, CorrelationId, EventId, MessageFactory, MessageIdentity,
};
pub use entity::{AggregateRoot, Entity, EntityId};
pub use errors::{DomainError, DomainResult, RuleCode};
pub use events::{DomainEvent, DomainEventEnvelope};
pub use state_machine::{EstadoHes, State, StateTransitions};

pub use command_handlers::{
    CommandHandler, EventPublisher, HesCommandHandler, HesRepository, InMemoryHesRepository,
    RecordingEventPublisher,
};

pub use forms::{
    aplicar_operador, es_visible, esquema_json, evaluar_formula, validar_dependencias,
    validar_envio, validar_formula, AccionCondicional, Campo, LogicaCondicional,
    OperadorComparacion, PlantillaFormulario, TipoCampo,
};
pub use hes::{
    evaluar_nivel_riesgo, ActualizarClienteInfo, ActualizarCondicionesEntrada,
    ActualizarDiagnostico, ActualizarRequerimientosSeguridad, Anulacion, AnularHes, ClienteInfo,
    CompletarHes, CondicionesEntrada, CrearHes, DiagnosticoPreliminar, EventoHes, FirmaDigital,
    FirmarHes, Hes, HesAnulada, HesCompletada, HesCreada, HesFirmada, HesSnapshot, NivelRiesgo,
    NumeroHes, Prioridad, RequerimientosSeguridad, RolFirmante, TipoServicio,
};

// Re-export common marker types
pub mod markers {
    //! Marker types for phantom type parameters
    pub use crate::entity::{
        CommandMarker, EventMarker, HesMarker, OrdenTrabajoMarker, PlantillaMarker,
    };
}
