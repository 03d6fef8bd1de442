// Copyright 2025 Cowboy AI, LLC.

//! HES lifecycle events
//!
//! Immutable facts emitted by the aggregate's mutating methods and published
//! to the event bus after the aggregate has been persisted. The bus keys on
//! [`DomainEvent::event_type`].

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::numero::NumeroHes;
use super::value_objects::{NivelRiesgo, Prioridad, RolFirmante, TipoServicio};
use crate::events::DomainEvent;

/// A service entry was created in draft state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HesCreada {
    /// The aggregate's unique identifier
    pub hes_id: Uuid,
    /// The human-readable sequence number
    pub numero: NumeroHes,
    /// The work order this entry documents
    pub orden_trabajo_id: Uuid,
    /// Requested service kind
    pub tipo_servicio: TipoServicio,
    /// Scheduling priority
    pub prioridad: Prioridad,
    /// Risk level computed at creation
    pub nivel_riesgo: NivelRiesgo,
    /// Who created the record
    pub creado_por: String,
    /// When the record was created
    pub creada_en: DateTime<Utc>,
}

/// One of the two parties signed the entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HesFirmada {
    /// The aggregate's unique identifier
    pub hes_id: Uuid,
    /// The human-readable sequence number
    pub numero: NumeroHes,
    /// Which party signed
    pub rol: RolFirmante,
    /// The signer's recorded name
    pub nombre_firmante: String,
    /// When the signature was captured
    pub firmada_en: DateTime<Utc>,
}

/// All requirements were met and the entry was completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HesCompletada {
    /// The aggregate's unique identifier
    pub hes_id: Uuid,
    /// The human-readable sequence number
    pub numero: NumeroHes,
    /// The final derived risk level
    pub nivel_riesgo: NivelRiesgo,
    /// When the entry was completed
    pub completada_en: DateTime<Utc>,
}

/// The entry was voided with a reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HesAnulada {
    /// The aggregate's unique identifier
    pub hes_id: Uuid,
    /// The human-readable sequence number
    pub numero: NumeroHes,
    /// Why the entry was voided
    pub motivo: String,
    /// Who voided it
    pub anulado_por: String,
    /// When it was voided
    pub anulada_en: DateTime<Utc>,
}

impl DomainEvent for HesCreada {
    fn aggregate_id(&self) -> Uuid {
        self.hes_id
    }

    fn event_type(&self) -> &'static str {
        "HesCreada"
    }
}

impl DomainEvent for HesFirmada {
    fn aggregate_id(&self) -> Uuid {
        self.hes_id
    }

    fn event_type(&self) -> &'static str {
        "HesFirmada"
    }
}

impl DomainEvent for HesCompletada {
    fn aggregate_id(&self) -> Uuid {
        self.hes_id
    }

    fn event_type(&self) -> &'static str {
        "HesCompletada"
    }
}

impl DomainEvent for HesAnulada {
    fn aggregate_id(&self) -> Uuid {
        self.hes_id
    }

    fn event_type(&self) -> &'static str {
        "HesAnulada"
    }
}

/// Enum wrapper for all HES events
///
/// Mutating aggregate methods return these explicitly; there is no hidden
/// event buffer on the aggregate. The application layer publishes them after
/// a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum EventoHes {
    /// A service entry was created
    Creada(HesCreada),
    /// A party signed the entry
    Firmada(HesFirmada),
    /// The entry was completed
    Completada(HesCompletada),
    /// The entry was voided
    Anulada(HesAnulada),
}

impl DomainEvent for EventoHes {
    fn aggregate_id(&self) -> Uuid {
        match self {
            EventoHes::Creada(e) => e.aggregate_id(),
            EventoHes::Firmada(e) => e.aggregate_id(),
            EventoHes::Completada(e) => e.aggregate_id(),
            EventoHes::Anulada(e) => e.aggregate_id(),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            EventoHes::Creada(e) => e.event_type(),
            EventoHes::Firmada(e) => e.event_type(),
            EventoHes::Completada(e) => e.event_type(),
            EventoHes::Anulada(e) => e.event_type(),
        }
    }
}
