// Copyright 2025 Cowboy AI, LLC.

//! Commands targeting the HES aggregate
//!
//! Commands carry already-validated value objects and entities; the handler
//! loads the aggregate, applies the change, persists, and publishes the
//! events the aggregate returned.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{
    ClienteInfo, CondicionesEntrada, DiagnosticoPreliminar, FirmaDigital, RequerimientosSeguridad,
};
use super::value_objects::{Prioridad, RolFirmante, TipoServicio};
use crate::cqrs::Command;
use crate::entity::{EntityId, HesMarker};

/// Create a new service entry for a work order.
///
/// The sequence number is allocated by the handler, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrearHes {
    /// The work order the entry documents
    pub orden_trabajo_id: Uuid,
    /// Requested service kind
    pub tipo_servicio: TipoServicio,
    /// Scheduling priority
    pub prioridad: Prioridad,
    /// Who is creating the record
    pub creado_por: String,
}

impl Command for CrearHes {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        None // the aggregate does not exist yet
    }
}

/// Replace the client information on a draft entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActualizarClienteInfo {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// The replacement client information
    pub cliente: ClienteInfo,
}

impl Command for ActualizarClienteInfo {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Replace the entry conditions on a draft entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActualizarCondicionesEntrada {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// The replacement entry conditions
    pub condiciones: CondicionesEntrada,
}

impl Command for ActualizarCondicionesEntrada {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Replace the preliminary diagnosis on a draft entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActualizarDiagnostico {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// The replacement diagnosis
    pub diagnostico: DiagnosticoPreliminar,
}

impl Command for ActualizarDiagnostico {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Replace the safety requirements on a draft entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActualizarRequerimientosSeguridad {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// The replacement safety requirements
    pub seguridad: RequerimientosSeguridad,
}

impl Command for ActualizarRequerimientosSeguridad {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Capture a signature from one of the two parties
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FirmarHes {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// Which party is signing
    pub rol: RolFirmante,
    /// The captured signature
    pub firma: FirmaDigital,
}

impl Command for FirmarHes {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Complete a fully diligenced, doubly-signed entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompletarHes {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
}

impl Command for CompletarHes {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}

/// Void an entry with a reason
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnularHes {
    /// Target aggregate
    pub hes_id: EntityId<HesMarker>,
    /// Why the entry is being voided
    pub motivo: String,
    /// Who is voiding it
    pub anulado_por: String,
}

impl Command for AnularHes {
    type Aggregate = HesMarker;

    fn aggregate_id(&self) -> Option<EntityId<HesMarker>> {
        Some(self.hes_id)
    }
}
