// Copyright 2025 Cowboy AI, LLC.

//! Command handlers for the HES aggregate
//!
//! Handlers process commands, validate business rules through the aggregate,
//! and emit events. They return only acknowledgments, not data - results
//! reach callers through the event stream. The repository and publisher are
//! async contracts; the domain itself stays synchronous and I/O-free.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::cqrs::{
    CommandAcknowledgment, CommandEnvelope, CommandStatus, CorrelationId,
};
use crate::entity::{AggregateRoot, EntityId, HesMarker};
use crate::errors::{DomainError, DomainResult};
use crate::hes::{
    ActualizarClienteInfo, ActualizarCondicionesEntrada, ActualizarDiagnostico,
    ActualizarRequerimientosSeguridad, AnularHes, CompletarHes, CrearHes, EventoHes, FirmarHes,
    Hes, HesSnapshot, NumeroHes, RolFirmante,
};

/// Handler for processing commands against one aggregate type
#[async_trait]
pub trait CommandHandler<C: crate::cqrs::Command> {
    /// Handle the command and return acknowledgment
    async fn handle(&mut self, envelope: CommandEnvelope<C>) -> CommandAcknowledgment;
}

/// Event publisher contract for handlers to emit events after save
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events in order, keyed downstream by event type
    async fn publish_events(
        &self,
        events: Vec<EventoHes>,
        correlation_id: CorrelationId,
    ) -> DomainResult<()>;
}

/// Mock event publisher for testing
#[derive(Clone, Default)]
pub struct RecordingEventPublisher {
    published: Arc<RwLock<Vec<(EventoHes, CorrelationId)>>>,
}

impl RecordingEventPublisher {
    /// Create a new recording publisher
    pub fn new() -> Self {
        Self::default()
    }

    /// All published events with their correlation, in publish order
    pub fn published_events(&self) -> Vec<(EventoHes, CorrelationId)> {
        self.published.read().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish_events(
        &self,
        events: Vec<EventoHes>,
        correlation_id: CorrelationId,
    ) -> DomainResult<()> {
        let mut published = self.published.write().unwrap();
        for event in events {
            published.push((event, correlation_id));
        }
        Ok(())
    }
}

/// Repository contract for loading and saving HES aggregates
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HesRepository: Send + Sync {
    /// Load an aggregate by ID
    async fn find_by_id(&self, id: EntityId<HesMarker>) -> DomainResult<Option<Hes>>;

    /// Upsert an aggregate; a stale version is a concurrency conflict
    async fn save(&self, hes: &Hes) -> DomainResult<()>;

    /// Highest allocated sequence for a calendar year, if any
    async fn find_last_numero_by_year(&self, anio: i32) -> DomainResult<Option<u32>>;

    /// Whether a sequence number is already taken
    async fn exists_by_numero(&self, numero: &NumeroHes) -> DomainResult<bool>;
}

/// In-memory repository for testing
///
/// Stores snapshots (exercising the hydration path on every load) and
/// enforces the optimistic version check on save.
#[derive(Default)]
pub struct InMemoryHesRepository {
    storage: Arc<RwLock<HashMap<Uuid, HesSnapshot>>>,
}

impl InMemoryHesRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HesRepository for InMemoryHesRepository {
    async fn find_by_id(&self, id: EntityId<HesMarker>) -> DomainResult<Option<Hes>> {
        let storage = self.storage.read().unwrap();
        Ok(storage
            .get(id.as_uuid())
            .cloned()
            .map(Hes::desde_persistencia))
    }

    async fn save(&self, hes: &Hes) -> DomainResult<()> {
        let snapshot = hes.snapshot();
        let mut storage = self.storage.write().unwrap();
        if let Some(existente) = storage.get(&snapshot.id) {
            // First save carries version 0; every later save must advance it
            if snapshot.version <= existente.version && snapshot.version != 0 {
                return Err(DomainError::ConcurrencyConflict {
                    expected: existente.version + 1,
                    actual: snapshot.version,
                });
            }
            if snapshot.version == 0 {
                return Err(DomainError::ConcurrencyConflict {
                    expected: existente.version + 1,
                    actual: 0,
                });
            }
        }
        storage.insert(snapshot.id, snapshot);
        Ok(())
    }

    async fn find_last_numero_by_year(&self, anio: i32) -> DomainResult<Option<u32>> {
        let storage = self.storage.read().unwrap();
        Ok(storage
            .values()
            .filter(|s| s.numero.anio() == anio)
            .map(|s| s.numero.secuencia())
            .max())
    }

    async fn exists_by_numero(&self, numero: &NumeroHes) -> DomainResult<bool> {
        let storage = self.storage.read().unwrap();
        Ok(storage.values().any(|s| &s.numero == numero))
    }
}

/// Use cases over the HES aggregate.
///
/// Each handling path loads, mutates through the aggregate, saves, and only
/// then publishes the events the aggregate returned.
pub struct HesCommandHandler<R: HesRepository, P: EventPublisher> {
    repository: Arc<R>,
    publisher: Arc<P>,
}

impl<R: HesRepository, P: EventPublisher> HesCommandHandler<R, P> {
    /// Create a handler over a repository and a publisher
    pub fn new(repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Allocate the next sequence number for the current calendar year
    async fn asignar_numero(&self) -> DomainResult<NumeroHes> {
        let anio = Utc::now().year();
        let numero = match self.repository.find_last_numero_by_year(anio).await? {
            Some(ultimo) => NumeroHes::new(anio, ultimo)?.siguiente()?,
            None => NumeroHes::primero_del_anio(anio)?,
        };
        if self.repository.exists_by_numero(&numero).await? {
            return Err(DomainError::Internal(format!(
                "sequence number {numero} is already allocated"
            )));
        }
        Ok(numero)
    }

    async fn cargar(&self, id: EntityId<HesMarker>) -> DomainResult<Hes> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::AggregateNotFound(id.to_string()))
    }

    /// Persist, then publish whatever the aggregate emitted
    async fn guardar_y_publicar(
        &self,
        hes: &Hes,
        eventos: Vec<EventoHes>,
        correlation_id: CorrelationId,
    ) -> DomainResult<()> {
        self.repository.save(hes).await?;
        if !eventos.is_empty() {
            self.publisher.publish_events(eventos, correlation_id).await?;
        }
        Ok(())
    }

    fn ack<C: crate::cqrs::Command>(
        envelope: &CommandEnvelope<C>,
        resultado: DomainResult<()>,
    ) -> CommandAcknowledgment {
        match resultado {
            Ok(()) => CommandAcknowledgment {
                command_id: envelope.id,
                correlation_id: *envelope.correlation_id(),
                status: CommandStatus::Accepted,
                reason: None,
            },
            Err(err) => {
                match err.rule_code() {
                    Some(code) => warn!(code = %code, error = %err, "command rejected"),
                    None => warn!(error = %err, "command rejected"),
                }
                CommandAcknowledgment {
                    command_id: envelope.id,
                    correlation_id: *envelope.correlation_id(),
                    status: CommandStatus::Rejected,
                    reason: Some(err.to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<CrearHes> for HesCommandHandler<R, P> {
    async fn handle(&mut self, envelope: CommandEnvelope<CrearHes>) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = &envelope.command;

        let resultado = async {
            let numero = self.asignar_numero().await?;
            let (hes, evento) = Hes::crear(
                numero,
                cmd.orden_trabajo_id,
                cmd.tipo_servicio,
                cmd.prioridad,
                cmd.creado_por.clone(),
            )?;
            self.guardar_y_publicar(&hes, vec![evento], correlation_id).await?;
            info!(numero = %hes.numero(), hes_id = %hes.id(), "service entry created");
            Ok(())
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<ActualizarClienteInfo>
    for HesCommandHandler<R, P>
{
    async fn handle(
        &mut self,
        envelope: CommandEnvelope<ActualizarClienteInfo>,
    ) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            hes.actualizar_cliente_info(cmd.cliente)?;
            self.guardar_y_publicar(&hes, vec![], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<ActualizarCondicionesEntrada>
    for HesCommandHandler<R, P>
{
    async fn handle(
        &mut self,
        envelope: CommandEnvelope<ActualizarCondicionesEntrada>,
    ) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            hes.actualizar_condiciones_entrada(cmd.condiciones)?;
            info!(hes_id = %hes.id(), nivel = %hes.nivel_riesgo(), "entry conditions updated");
            self.guardar_y_publicar(&hes, vec![], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<ActualizarDiagnostico>
    for HesCommandHandler<R, P>
{
    async fn handle(
        &mut self,
        envelope: CommandEnvelope<ActualizarDiagnostico>,
    ) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            hes.actualizar_diagnostico(cmd.diagnostico)?;
            self.guardar_y_publicar(&hes, vec![], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<ActualizarRequerimientosSeguridad>
    for HesCommandHandler<R, P>
{
    async fn handle(
        &mut self,
        envelope: CommandEnvelope<ActualizarRequerimientosSeguridad>,
    ) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            hes.actualizar_requerimientos_seguridad(cmd.seguridad)?;
            info!(hes_id = %hes.id(), nivel = %hes.nivel_riesgo(), "safety requirements updated");
            self.guardar_y_publicar(&hes, vec![], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<FirmarHes> for HesCommandHandler<R, P> {
    async fn handle(&mut self, envelope: CommandEnvelope<FirmarHes>) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            let evento = match cmd.rol {
                RolFirmante::Cliente => hes.firmar_por_cliente(cmd.firma)?,
                RolFirmante::Tecnico => hes.firmar_por_tecnico(cmd.firma)?,
            };
            info!(hes_id = %hes.id(), rol = %cmd.rol, "signature captured");
            self.guardar_y_publicar(&hes, vec![evento], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<CompletarHes> for HesCommandHandler<R, P> {
    async fn handle(&mut self, envelope: CommandEnvelope<CompletarHes>) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = &envelope.command;

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            let evento = hes.completar()?;
            info!(hes_id = %hes.id(), numero = %hes.numero(), "service entry completed");
            self.guardar_y_publicar(&hes, vec![evento], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}

#[async_trait]
impl<R: HesRepository, P: EventPublisher> CommandHandler<AnularHes> for HesCommandHandler<R, P> {
    async fn handle(&mut self, envelope: CommandEnvelope<AnularHes>) -> CommandAcknowledgment {
        let correlation_id = *envelope.correlation_id();
        let cmd = envelope.command.clone();

        let resultado = async {
            let mut hes = self.cargar(cmd.hes_id).await?;
            let evento = hes.anular(cmd.motivo, cmd.anulado_por)?;
            info!(hes_id = %hes.id(), "service entry voided");
            self.guardar_y_publicar(&hes, vec![evento], correlation_id).await
        }
        .await;

        Self::ack(&envelope, resultado)
    }
}
