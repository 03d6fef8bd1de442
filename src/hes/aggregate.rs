// Copyright 2025 Cowboy AI, LLC.

//! HES aggregate root
//!
//! All invariant-preserving mutations to a service entry pass through this
//! type. Mutating methods return the domain events they emit; nothing is
//! buffered on the aggregate, so the application layer decides when and in
//! what order events reach the bus.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{
    ClienteInfo, CondicionesEntrada, DiagnosticoPreliminar, FirmaDigital, RequerimientosSeguridad,
};
use super::events::{EventoHes, HesAnulada, HesCompletada, HesCreada, HesFirmada};
use super::numero::NumeroHes;
use super::riesgo::evaluar_nivel_riesgo;
use super::value_objects::{NivelRiesgo, Prioridad, RolFirmante, TipoServicio};
use crate::entity::{AggregateRoot, Entity, EntityId, HesMarker};
use crate::errors::{DomainError, DomainResult, RuleCode};
use crate::state_machine::{EstadoHes, State, StateTransitions};

/// Record of a voiding: who, why and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Anulacion {
    /// The non-empty reason given
    pub motivo: String,
    /// Who voided the record
    pub anulado_por: String,
    /// When it was voided
    pub anulada_en: DateTime<Utc>,
}

/// HES aggregate root - a service-entry record tied to one work order
///
/// Lifecycle: `Borrador` until completed or voided. Only drafts accept
/// entity mutations; signatures are accepted while the record is not voided;
/// completion demands every requirement plus both signatures.
#[derive(Debug, Clone)]
pub struct Hes {
    entity: Entity<HesMarker>,
    version: u64,
    numero: NumeroHes,
    orden_trabajo_id: Uuid,
    estado: EstadoHes,
    tipo_servicio: TipoServicio,
    prioridad: Prioridad,
    nivel_riesgo: NivelRiesgo,
    creado_por: String,
    creada_en: DateTime<Utc>,
    completada_en: Option<DateTime<Utc>>,
    anulacion: Option<Anulacion>,
    cliente_info: Option<ClienteInfo>,
    condiciones_entrada: Option<CondicionesEntrada>,
    diagnostico: Option<DiagnosticoPreliminar>,
    seguridad: Option<RequerimientosSeguridad>,
    firma_cliente: Option<FirmaDigital>,
    firma_tecnico: Option<FirmaDigital>,
}

impl Hes {
    /// Validating creation factory
    ///
    /// Seeds a draft with the lowest risk level, then immediately re-runs
    /// the risk evaluator so the initial level already reflects the service
    /// type. Returns the aggregate together with its creation event.
    pub fn crear(
        numero: NumeroHes,
        orden_trabajo_id: Uuid,
        tipo_servicio: TipoServicio,
        prioridad: Prioridad,
        creado_por: impl Into<String>,
    ) -> DomainResult<(Self, EventoHes)> {
        let creado_por = creado_por.into();
        if creado_por.trim().is_empty() {
            return Err(DomainError::validation("creado_por", "must not be empty"));
        }

        let mut hes = Self {
            entity: Entity::new(),
            version: 0,
            numero,
            orden_trabajo_id,
            estado: EstadoHes::Borrador,
            tipo_servicio,
            prioridad,
            nivel_riesgo: NivelRiesgo::Bajo,
            creado_por,
            creada_en: Utc::now(),
            completada_en: None,
            anulacion: None,
            cliente_info: None,
            condiciones_entrada: None,
            diagnostico: None,
            seguridad: None,
            firma_cliente: None,
            firma_tecnico: None,
        };
        hes.reevaluar_riesgo();

        let evento = EventoHes::Creada(HesCreada {
            hes_id: *hes.entity.id.as_uuid(),
            numero: hes.numero.clone(),
            orden_trabajo_id: hes.orden_trabajo_id,
            tipo_servicio: hes.tipo_servicio,
            prioridad: hes.prioridad,
            nivel_riesgo: hes.nivel_riesgo,
            creado_por: hes.creado_por.clone(),
            creada_en: hes.creada_en,
        });

        Ok((hes, evento))
    }

    /// Hydration factory: reconstruct from persisted state.
    ///
    /// Trusts that the snapshot was valid when written; runs no invariant
    /// checks and emits no event. This is the only path that accepts a
    /// caller-supplied risk level.
    pub fn desde_persistencia(snapshot: HesSnapshot) -> Self {
        Self {
            entity: Entity::with_id(EntityId::from_uuid(snapshot.id)),
            version: snapshot.version,
            numero: snapshot.numero,
            orden_trabajo_id: snapshot.orden_trabajo_id,
            estado: snapshot.estado,
            tipo_servicio: snapshot.tipo_servicio,
            prioridad: snapshot.prioridad,
            nivel_riesgo: snapshot.nivel_riesgo,
            creado_por: snapshot.creado_por,
            creada_en: snapshot.creada_en,
            completada_en: snapshot.completada_en,
            anulacion: snapshot.anulacion,
            cliente_info: snapshot.cliente_info,
            condiciones_entrada: snapshot.condiciones_entrada,
            diagnostico: snapshot.diagnostico,
            seguridad: snapshot.seguridad,
            firma_cliente: snapshot.firma_cliente,
            firma_tecnico: snapshot.firma_tecnico,
        }
    }

    /// Extract the persistable state of this aggregate
    pub fn snapshot(&self) -> HesSnapshot {
        HesSnapshot {
            id: *self.entity.id.as_uuid(),
            version: self.version,
            numero: self.numero.clone(),
            orden_trabajo_id: self.orden_trabajo_id,
            estado: self.estado,
            tipo_servicio: self.tipo_servicio,
            prioridad: self.prioridad,
            nivel_riesgo: self.nivel_riesgo,
            creado_por: self.creado_por.clone(),
            creada_en: self.creada_en,
            completada_en: self.completada_en,
            anulacion: self.anulacion.clone(),
            cliente_info: self.cliente_info.clone(),
            condiciones_entrada: self.condiciones_entrada.clone(),
            diagnostico: self.diagnostico.clone(),
            seguridad: self.seguridad.clone(),
            firma_cliente: self.firma_cliente.clone(),
            firma_tecnico: self.firma_tecnico.clone(),
        }
    }

    // -- mutations ---------------------------------------------------------

    /// Replace the client information (draft only)
    pub fn actualizar_cliente_info(&mut self, cliente: ClienteInfo) -> DomainResult<()> {
        self.asegurar_editable()?;
        self.cliente_info = Some(cliente);
        self.registrar_mutacion();
        Ok(())
    }

    /// Replace the entry conditions (draft only); re-evaluates risk
    pub fn actualizar_condiciones_entrada(
        &mut self,
        condiciones: CondicionesEntrada,
    ) -> DomainResult<()> {
        self.asegurar_editable()?;
        self.condiciones_entrada = Some(condiciones);
        self.reevaluar_riesgo();
        self.registrar_mutacion();
        Ok(())
    }

    /// Replace the preliminary diagnosis (draft only)
    pub fn actualizar_diagnostico(&mut self, diagnostico: DiagnosticoPreliminar) -> DomainResult<()> {
        self.asegurar_editable()?;
        self.diagnostico = Some(diagnostico);
        self.registrar_mutacion();
        Ok(())
    }

    /// Replace the safety requirements (draft only); re-evaluates risk
    pub fn actualizar_requerimientos_seguridad(
        &mut self,
        seguridad: RequerimientosSeguridad,
    ) -> DomainResult<()> {
        self.asegurar_editable()?;
        self.seguridad = Some(seguridad);
        self.reevaluar_riesgo();
        self.registrar_mutacion();
        Ok(())
    }

    /// Record the client's signature. Each party signs at most once.
    pub fn firmar_por_cliente(&mut self, firma: FirmaDigital) -> DomainResult<EventoHes> {
        self.asegurar_no_anulada()?;
        if self.firma_cliente.is_some() {
            return Err(DomainError::rule(
                RuleCode::YaFirmado,
                "the client has already signed this record",
            ));
        }
        let evento = self.evento_firma(&firma, RolFirmante::Cliente);
        self.firma_cliente = Some(firma);
        self.registrar_mutacion();
        Ok(evento)
    }

    /// Record the technician's signature. Each party signs at most once.
    pub fn firmar_por_tecnico(&mut self, firma: FirmaDigital) -> DomainResult<EventoHes> {
        self.asegurar_no_anulada()?;
        if self.firma_tecnico.is_some() {
            return Err(DomainError::rule(
                RuleCode::YaFirmado,
                "the technician has already signed this record",
            ));
        }
        let evento = self.evento_firma(&firma, RolFirmante::Tecnico);
        self.firma_tecnico = Some(firma);
        self.registrar_mutacion();
        Ok(evento)
    }

    /// Complete the entry.
    ///
    /// Fails with the FULL list of missing requirements, never just the
    /// first one, so the caller can present every gap at once.
    pub fn completar(&mut self) -> DomainResult<EventoHes> {
        self.asegurar_no_anulada()?;
        if self.estado == EstadoHes::Completada {
            return Err(DomainError::rule(
                RuleCode::EstadoInvalido,
                "the record is already completed",
            ));
        }

        let faltantes = self.faltantes_para_completar();
        if !faltantes.is_empty() {
            return Err(DomainError::Incomplete { missing: faltantes });
        }

        self.transicionar(EstadoHes::Completada)?;
        let ahora = Utc::now();
        self.completada_en = Some(ahora);
        self.registrar_mutacion();

        Ok(EventoHes::Completada(HesCompletada {
            hes_id: *self.entity.id.as_uuid(),
            numero: self.numero.clone(),
            nivel_riesgo: self.nivel_riesgo,
            completada_en: ahora,
        }))
    }

    /// Void the entry with a non-empty reason. One-way; voiding twice fails.
    pub fn anular(
        &mut self,
        motivo: impl Into<String>,
        anulado_por: impl Into<String>,
    ) -> DomainResult<EventoHes> {
        self.asegurar_no_anulada()?;
        let motivo = motivo.into();
        if motivo.trim().is_empty() {
            return Err(DomainError::validation("motivo", "must not be empty"));
        }

        self.transicionar(EstadoHes::Anulada)?;
        let anulacion = Anulacion {
            motivo,
            anulado_por: anulado_por.into(),
            anulada_en: Utc::now(),
        };
        let evento = EventoHes::Anulada(HesAnulada {
            hes_id: *self.entity.id.as_uuid(),
            numero: self.numero.clone(),
            motivo: anulacion.motivo.clone(),
            anulado_por: anulacion.anulado_por.clone(),
            anulada_en: anulacion.anulada_en,
        });
        self.anulacion = Some(anulacion);
        self.registrar_mutacion();
        Ok(evento)
    }

    /// Every requirement still missing for completion, in checklist order
    pub fn faltantes_para_completar(&self) -> Vec<String> {
        let mut faltantes = Vec::new();

        if self.cliente_info.is_none() {
            faltantes.push("Información del cliente requerida".to_string());
        }
        match &self.condiciones_entrada {
            None => faltantes.push("Condiciones de entrada requeridas".to_string()),
            Some(condiciones) => {
                if self.tipo_servicio.requiere_fotografias() && !condiciones.tiene_fotografias() {
                    faltantes.push(
                        "Se requiere al menos una fotografía de las condiciones de entrada"
                            .to_string(),
                    );
                }
            }
        }
        if self.diagnostico.is_none() {
            faltantes.push("Diagnóstico preliminar requerido".to_string());
        }
        match &self.seguridad {
            None => faltantes.push("Requerimientos de seguridad requeridos".to_string()),
            Some(seguridad) => {
                if !seguridad.esta_completo() {
                    faltantes.push(format!(
                        "Lista de verificación de seguridad incompleta ({:.0}%)",
                        seguridad.porcentaje_completado()
                    ));
                }
            }
        }
        if self.firma_cliente.is_none() {
            faltantes.push("Firma del cliente requerida".to_string());
        }
        if self.firma_tecnico.is_none() {
            faltantes.push("Firma del técnico requerida".to_string());
        }

        faltantes
    }

    // -- accessors ---------------------------------------------------------

    /// Human-readable sequence number
    pub fn numero(&self) -> &NumeroHes {
        &self.numero
    }

    /// The work order this entry documents
    pub fn orden_trabajo_id(&self) -> Uuid {
        self.orden_trabajo_id
    }

    /// Current lifecycle state
    pub fn estado(&self) -> EstadoHes {
        self.estado
    }

    /// Requested service kind
    pub fn tipo_servicio(&self) -> TipoServicio {
        self.tipo_servicio
    }

    /// Scheduling priority
    pub fn prioridad(&self) -> Prioridad {
        self.prioridad
    }

    /// Derived risk level (recomputed after every relevant mutation)
    pub fn nivel_riesgo(&self) -> NivelRiesgo {
        self.nivel_riesgo
    }

    /// Who created the record
    pub fn creado_por(&self) -> &str {
        &self.creado_por
    }

    /// When the record was created
    pub fn creada_en(&self) -> DateTime<Utc> {
        self.creada_en
    }

    /// When the record was completed, if it was
    pub fn completada_en(&self) -> Option<DateTime<Utc>> {
        self.completada_en
    }

    /// The voiding record, if the entry was voided
    pub fn anulacion(&self) -> Option<&Anulacion> {
        self.anulacion.as_ref()
    }

    /// Client information, once recorded
    pub fn cliente_info(&self) -> Option<&ClienteInfo> {
        self.cliente_info.as_ref()
    }

    /// Entry conditions, once recorded
    pub fn condiciones_entrada(&self) -> Option<&CondicionesEntrada> {
        self.condiciones_entrada.as_ref()
    }

    /// Preliminary diagnosis, once recorded
    pub fn diagnostico(&self) -> Option<&DiagnosticoPreliminar> {
        self.diagnostico.as_ref()
    }

    /// Safety requirements, once recorded
    pub fn requerimientos_seguridad(&self) -> Option<&RequerimientosSeguridad> {
        self.seguridad.as_ref()
    }

    /// The client's signature, once captured
    pub fn firma_cliente(&self) -> Option<&FirmaDigital> {
        self.firma_cliente.as_ref()
    }

    /// The technician's signature, once captured
    pub fn firma_tecnico(&self) -> Option<&FirmaDigital> {
        self.firma_tecnico.as_ref()
    }

    // -- internals ---------------------------------------------------------

    fn evento_firma(&self, firma: &FirmaDigital, rol: RolFirmante) -> EventoHes {
        EventoHes::Firmada(HesFirmada {
            hes_id: *self.entity.id.as_uuid(),
            numero: self.numero.clone(),
            rol,
            nombre_firmante: firma.nombre_firmante().to_string(),
            firmada_en: firma.capturada_en(),
        })
    }

    fn reevaluar_riesgo(&mut self) {
        self.nivel_riesgo = evaluar_nivel_riesgo(
            self.tipo_servicio,
            self.seguridad.as_ref(),
            self.condiciones_entrada.as_ref(),
        );
    }

    fn registrar_mutacion(&mut self) {
        self.entity.touch();
        self.version += 1;
    }

    fn asegurar_no_anulada(&self) -> DomainResult<()> {
        if self.estado == EstadoHes::Anulada {
            return Err(DomainError::rule(
                RuleCode::HesAnulada,
                "the record has been voided",
            ));
        }
        Ok(())
    }

    fn asegurar_editable(&self) -> DomainResult<()> {
        self.asegurar_no_anulada()?;
        if self.estado != EstadoHes::Borrador {
            return Err(DomainError::rule(
                RuleCode::NoEditable,
                format!("entities can only change in draft, not {}", self.estado.name()),
            ));
        }
        Ok(())
    }

    // The public guards run first, so a failure here means the transition
    // table and the guards have drifted apart.
    fn transicionar(&mut self, destino: EstadoHes) -> DomainResult<()> {
        self.estado.ensure_transition_to(&destino)?;
        self.estado = destino;
        Ok(())
    }
}

impl AggregateRoot for Hes {
    type Id = EntityId<HesMarker>;

    fn id(&self) -> Self::Id {
        self.entity.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}

/// Persisted form of an HES aggregate: plain fields, no behavior.
///
/// Written by `Hes::snapshot` and read back by `Hes::desde_persistencia`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HesSnapshot {
    /// Aggregate identity
    pub id: Uuid,
    /// Optimistic concurrency version
    pub version: u64,
    /// Sequence number
    pub numero: NumeroHes,
    /// Work-order reference
    pub orden_trabajo_id: Uuid,
    /// Lifecycle state as persisted
    pub estado: EstadoHes,
    /// Service kind
    pub tipo_servicio: TipoServicio,
    /// Priority
    pub prioridad: Prioridad,
    /// Risk level as persisted
    pub nivel_riesgo: NivelRiesgo,
    /// Creator identity
    pub creado_por: String,
    /// Creation timestamp
    pub creada_en: DateTime<Utc>,
    /// Completion timestamp, if completed
    pub completada_en: Option<DateTime<Utc>>,
    /// Voiding record, if voided
    pub anulacion: Option<Anulacion>,
    /// Client information
    pub cliente_info: Option<ClienteInfo>,
    /// Entry conditions
    pub condiciones_entrada: Option<CondicionesEntrada>,
    /// Preliminary diagnosis
    pub diagnostico: Option<DiagnosticoPreliminar>,
    /// Safety requirements
    pub seguridad: Option<RequerimientosSeguridad>,
    /// Client signature
    pub firma_cliente: Option<FirmaDigital>,
    /// Technician signature
    pub firma_tecnico: Option<FirmaDigital>,
}
