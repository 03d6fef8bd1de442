// Copyright (c) 2025 - Cowboy AI, LLC.

//! Domain events
//!
//! Events represent facts that have occurred in the domain. They are immutable
//! and are published to external collaborators after the aggregate that
//! produced them has been persisted.

use crate::cqrs::{CausationId, CorrelationId, EventId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base trait for all domain events
///
/// # Examples
///
/// ```rust
/// use cermont_domain::DomainEvent;
/// use uuid::Uuid;
///
/// #[derive(Debug)]
/// struct OrdenCerrada {
///     orden_id: Uuid,
/// }
///
/// impl DomainEvent for OrdenCerrada {
///     fn aggregate_id(&self) -> Uuid {
///         self.orden_id
///     }
///
///     fn event_type(&self) -> &'static str {
///         "OrdenCerrada"
///     }
/// }
///
/// let event = OrdenCerrada { orden_id: Uuid::new_v4() };
/// assert_eq!(event.event_type(), "OrdenCerrada");
/// ```
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Get the aggregate ID this event relates to
    fn aggregate_id(&self) -> Uuid;

    /// Get the event type name
    fn event_type(&self) -> &'static str;

    /// Get the schema version
    fn version(&self) -> &'static str {
        "v1"
    }
}

/// Domain event envelope carrying identity and the inline payload.
///
/// The envelope is pure data: infrastructure decides how to route it (the
/// event bus keys on [`DomainEvent::event_type`]) and whether to persist the
/// payload elsewhere. The aggregate id is copied out of the event so it stays
/// addressable without deserializing the payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainEventEnvelope<E> {
    /// The event ID (UUID v7, time-ordered)
    pub event_id: EventId,

    /// Aggregate identifier copied from the event
    pub aggregate_id: Uuid,

    /// Correlation ID for tracking across services
    pub correlation_id: CorrelationId,

    /// ID of the message that caused this event
    pub causation_id: CausationId,

    /// Event type name, duplicated for routing without payload inspection
    pub event_type: String,

    /// The event payload
    pub payload: E,
}

impl<E: DomainEvent> DomainEventEnvelope<E> {
    /// Wrap an event with fresh identity, continuing the given correlation.
    pub fn wrap(event: E, correlation_id: CorrelationId, causation_id: CausationId) -> Self {
        Self {
            event_id: EventId::new(),
            aggregate_id: event.aggregate_id(),
            correlation_id,
            causation_id,
            event_type: event.event_type().to_string(),
            payload: event,
        }
    }
}
