// Copyright 2025 Cowboy AI, LLC.

//! # Command-side messaging types
//!
//! Commands represent requests to change state. Each command instance carries
//! a message identity (correlation and causation) so every event it produces
//! can be traced back to the request that caused it. Handlers return only
//! acknowledgments; data retrieval belongs to the read side, outside this
//! crate.

use crate::entity::{CommandMarker, EntityId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use uuid::Uuid;

/// Correlation ID for tracking related commands and events.
///
/// - Single: non-transactional; correlation == message_id
/// - Transaction: transactional; correlation == aggregate transaction id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value")]
pub enum CorrelationId {
    /// Non-transactional, correlation equals message_id
    Single(Uuid),
    /// Transactional, correlation equals aggregate transaction id
    Transaction(AggregateTransactionId),
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationId::Single(id) => write!(f, "correlation:{}", id),
            CorrelationId::Transaction(tx) => write!(f, "correlation:{}", tx.0),
        }
    }
}

/// Causation ID for tracking event causality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CausationId(pub Uuid);

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "causation:{}", self.0)
    }
}

/// Aggregate Transaction identifier (provides correlation IDs for transactions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AggregateTransactionId(pub Uuid);

impl From<AggregateTransactionId> for CorrelationId {
    fn from(tx: AggregateTransactionId) -> Self {
        CorrelationId::Transaction(tx)
    }
}

/// Message identity for tracking message metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MessageIdentity {
    /// Correlation across a whole command/event chain
    pub correlation_id: CorrelationId,
    /// The message that directly caused this one
    pub causation_id: CausationId,
    /// This message's own id
    pub message_id: Uuid,
}

/// Factory for creating message identities
pub struct MessageFactory;

impl MessageFactory {
    /// Create a non-transactional root identity:
    /// correlation == causation == message id
    pub fn create_root_command(id: Uuid) -> MessageIdentity {
        MessageIdentity {
            correlation_id: CorrelationId::Single(id),
            causation_id: CausationId(id),
            message_id: id,
        }
    }

    /// Create a transactional root identity (correlation comes from tx).
    /// Root causation references its own message_id (no prior cause).
    pub fn create_root_command_in_tx(id: Uuid, tx: AggregateTransactionId) -> MessageIdentity {
        MessageIdentity {
            correlation_id: tx.into(),
            causation_id: CausationId(id),
            message_id: id,
        }
    }

    /// Create an identity for a command caused by a prior message,
    /// continuing its correlation
    pub fn command_from_message(id: Uuid, parent: &MessageIdentity) -> MessageIdentity {
        MessageIdentity {
            correlation_id: parent.correlation_id,
            causation_id: CausationId(parent.message_id),
            message_id: id,
        }
    }
}

/// Status of command acceptance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CommandStatus {
    /// Command was accepted for processing
    Accepted,
    /// Command was rejected (e.g., validation failed)
    Rejected,
}

/// Acknowledgment returned when a command is submitted
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandAcknowledgment {
    /// The command ID that was acknowledged
    pub command_id: CommandId,
    /// Correlation ID (same as command ID for originating commands)
    pub correlation_id: CorrelationId,
    /// Status of command acceptance
    pub status: CommandStatus,
    /// Optional rejection reason
    pub reason: Option<String>,
}

/// A command that requests a state change
///
/// Commands are write operations that modify state. They are named with
/// imperative verbs (CrearHes, FirmarHes, AnularHes) and do NOT return data
/// directly - results come through event streams.
pub trait Command: Debug + Send + Sync {
    /// The aggregate type this command targets
    type Aggregate;

    /// Get the aggregate ID this command targets
    fn aggregate_id(&self) -> Option<EntityId<Self::Aggregate>>;
}

/// Type alias for command IDs
pub type CommandId = EntityId<CommandMarker>;

/// Event ID - UUID v7 for time-ordered event identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new EventId with UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command with metadata for tracking and auditing
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandEnvelope<C> {
    /// Unique identifier for this command instance
    pub id: CommandId,
    /// The actual command
    pub command: C,
    /// Who issued this command
    pub issued_by: String,
    /// Message identity (correlation and causation)
    pub identity: MessageIdentity,
}

impl<C: Command> CommandEnvelope<C> {
    /// Create a non-transactional (single morphism) command envelope.
    pub fn new(command: C, issued_by: String) -> Self {
        let id = CommandId::new();
        let identity = MessageFactory::create_root_command(*id.as_uuid());
        Self {
            id,
            command,
            issued_by,
            identity,
        }
    }

    /// Create a new command envelope within an aggregate transaction (correlation provided).
    pub fn new_in_tx(command: C, issued_by: String, tx: AggregateTransactionId) -> Self {
        let id = CommandId::new();
        let identity = MessageFactory::create_root_command_in_tx(*id.as_uuid(), tx);
        Self {
            id,
            command,
            issued_by,
            identity,
        }
    }

    /// Create a command caused by another message (continues correlation)
    pub fn from_message(command: C, issued_by: String, parent_identity: &MessageIdentity) -> Self {
        let id = CommandId::new();
        let identity = MessageFactory::command_from_message(*id.as_uuid(), parent_identity);
        Self {
            id,
            command,
            issued_by,
            identity,
        }
    }

    /// Get the correlation ID
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.identity.correlation_id
    }

    /// Get the causation ID
    pub fn causation_id(&self) -> &CausationId {
        &self.identity.causation_id
    }
}
