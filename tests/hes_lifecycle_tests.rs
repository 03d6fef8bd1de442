//! End-to-end lifecycle tests for the HES aggregate and its handler

use indexmap::IndexMap;
use proptest::prelude::*;
use uuid::Uuid;

use cermont_domain::{
    evaluar_nivel_riesgo, AggregateRoot, ClienteInfo, CommandEnvelope, CommandHandler,
    CommandStatus, CompletarHes, CondicionesEntrada, CrearHes, DiagnosticoPreliminar, DomainError,
    EstadoHes, EventoHes, FirmaDigital, FirmarHes, Hes, HesCommandHandler, HesRepository,
    InMemoryHesRepository, NivelRiesgo, NumeroHes, Prioridad, RecordingEventPublisher,
    RequerimientosSeguridad, RolFirmante, TipoServicio,
};

const IMAGEN: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

fn firma(nombre: &str) -> FirmaDigital {
    FirmaDigital::new(IMAGEN, nombre, "CC 1020301234", None, None).unwrap()
}

fn checklist(pairs: &[(&str, bool)], altos: bool) -> RequerimientosSeguridad {
    let items: IndexMap<String, bool> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    RequerimientosSeguridad::new(items, altos).unwrap()
}

/// The reference scenario: an installation with an 80%-complete checklist
/// sits at MEDIO risk; completion first fails listing the signature gaps,
/// then succeeds once the checklist is full and both parties signed.
#[test]
fn installation_scenario_end_to_end() {
    let (mut hes, _) = Hes::crear(
        NumeroHes::new(2025, 1).unwrap(),
        Uuid::new_v4(),
        TipoServicio::Instalacion,
        Prioridad::Media,
        "tecnico-1",
    )
    .unwrap();

    hes.actualizar_cliente_info(
        ClienteInfo::new("Acme Ltda", "900123456-7", None, None, None).unwrap(),
    )
    .unwrap();
    // installation does not demand photographs
    hes.actualizar_condiciones_entrada(
        CondicionesEntrada::new("Sitio despejado, sin novedades", false, vec![]).unwrap(),
    )
    .unwrap();
    hes.actualizar_diagnostico(
        DiagnosticoPreliminar::new("Instalación de unidad nueva", None, false, None).unwrap(),
    )
    .unwrap();

    // 4 of 5 items checked: 80%
    hes.actualizar_requerimientos_seguridad(checklist(
        &[
            ("epp", true),
            ("bloqueo", true),
            ("ventilacion", true),
            ("permiso", true),
            ("senalizacion", false),
        ],
        false,
    ))
    .unwrap();

    // installation (1) + incomplete checklist (1) = 2 points
    assert_eq!(hes.nivel_riesgo(), NivelRiesgo::Medio);

    // completing now fails and the error names both missing signatures
    // alongside the incomplete checklist
    let err = hes.completar().unwrap_err();
    match err {
        DomainError::Incomplete { missing } => {
            assert_eq!(
                missing,
                vec![
                    "Lista de verificación de seguridad incompleta (80%)".to_string(),
                    "Firma del cliente requerida".to_string(),
                    "Firma del técnico requerida".to_string(),
                ]
            );
        }
        other => panic!("expected Incomplete, got {other:?}"),
    }

    // close the gaps
    hes.actualizar_requerimientos_seguridad(checklist(
        &[
            ("epp", true),
            ("bloqueo", true),
            ("ventilacion", true),
            ("permiso", true),
            ("senalizacion", true),
        ],
        false,
    ))
    .unwrap();
    hes.firmar_por_cliente(firma("Maria Gomez")).unwrap();
    hes.firmar_por_tecnico(firma("Carlos Ruiz")).unwrap();

    let evento = hes.completar().unwrap();
    assert_eq!(hes.estado(), EstadoHes::Completada);
    match evento {
        EventoHes::Completada(e) => assert_eq!(e.nivel_riesgo, NivelRiesgo::Medio),
        other => panic!("expected HesCompletada, got {other:?}"),
    }
}

/// Repository round trip: the loaded aggregate behaves like the saved one
#[tokio::test]
async fn repository_roundtrip_preserves_behavior() {
    let repository = InMemoryHesRepository::new();

    let (mut hes, _) = Hes::crear(
        NumeroHes::new(2025, 7).unwrap(),
        Uuid::new_v4(),
        TipoServicio::Reparacion,
        Prioridad::Urgente,
        "tecnico-1",
    )
    .unwrap();
    hes.firmar_por_cliente(firma("Maria Gomez")).unwrap();
    repository.save(&hes).await.unwrap();

    let mut cargada = repository.find_by_id(hes.id()).await.unwrap().unwrap();
    assert_eq!(cargada.numero(), hes.numero());
    assert_eq!(cargada.nivel_riesgo(), hes.nivel_riesgo());
    assert_eq!(cargada.version(), hes.version());

    // the duplicate-signature rule survives hydration
    let err = cargada.firmar_por_cliente(firma("Maria Gomez")).unwrap_err();
    assert_eq!(
        err.rule_code(),
        Some(cermont_domain::RuleCode::YaFirmado)
    );

    // numbering queries see the stored record
    assert_eq!(
        repository.find_last_numero_by_year(2025).await.unwrap(),
        Some(7)
    );
    assert!(repository
        .exists_by_numero(&NumeroHes::new(2025, 7).unwrap())
        .await
        .unwrap());
    assert_eq!(
        repository.find_last_numero_by_year(2024).await.unwrap(),
        None
    );
}

/// Handler path: signing twice through commands is rejected and publishes
/// nothing for the rejected attempt
#[tokio::test]
async fn handler_rejects_double_signature() {
    let repository = std::sync::Arc::new(InMemoryHesRepository::new());
    let publisher = std::sync::Arc::new(RecordingEventPublisher::new());
    let mut handler = HesCommandHandler::new(repository.clone(), publisher.clone());

    let ack = handler
        .handle(CommandEnvelope::new(
            CrearHes {
                orden_trabajo_id: Uuid::new_v4(),
                tipo_servicio: TipoServicio::Mantenimiento,
                prioridad: Prioridad::Baja,
                creado_por: "tecnico-1".to_string(),
            },
            "tecnico-1".to_string(),
        ))
        .await;
    assert_eq!(ack.status, CommandStatus::Accepted);

    let hes_id = match &publisher.published_events()[0].0 {
        EventoHes::Creada(e) => cermont_domain::EntityId::from_uuid(e.hes_id),
        other => panic!("expected HesCreada, got {other:?}"),
    };

    let primera = handler
        .handle(CommandEnvelope::new(
            FirmarHes {
                hes_id,
                rol: RolFirmante::Cliente,
                firma: firma("Maria Gomez"),
            },
            "tecnico-1".to_string(),
        ))
        .await;
    assert_eq!(primera.status, CommandStatus::Accepted);

    let segunda = handler
        .handle(CommandEnvelope::new(
            FirmarHes {
                hes_id,
                rol: RolFirmante::Cliente,
                firma: firma("Maria Gomez"),
            },
            "tecnico-1".to_string(),
        ))
        .await;
    assert_eq!(segunda.status, CommandStatus::Rejected);
    assert!(segunda.reason.unwrap().contains("YA_FIRMADO"));

    // exactly one creation and one signature reached the bus
    let tipos: Vec<String> = publisher
        .published_events()
        .iter()
        .map(|(e, _)| match e {
            EventoHes::Creada(_) => "creada".to_string(),
            EventoHes::Firmada(_) => "firmada".to_string(),
            EventoHes::Completada(_) => "completada".to_string(),
            EventoHes::Anulada(_) => "anulada".to_string(),
        })
        .collect();
    assert_eq!(tipos, vec!["creada", "firmada"]);

    // incomplete records cannot be completed through the handler either
    let ack = handler
        .handle(CommandEnvelope::new(
            CompletarHes { hes_id },
            "tecnico-1".to_string(),
        ))
        .await;
    assert_eq!(ack.status, CommandStatus::Rejected);
}

#[derive(Debug, Clone)]
enum Paso {
    Seguridad { completo: bool, altos: bool },
    Condiciones { danos: bool },
}

fn paso_strategy() -> impl Strategy<Value = Paso> {
    prop_oneof![
        (any::<bool>(), any::<bool>()).prop_map(|(completo, altos)| Paso::Seguridad {
            completo,
            altos
        }),
        any::<bool>().prop_map(|danos| Paso::Condiciones { danos }),
    ]
}

fn tipo_strategy() -> impl Strategy<Value = TipoServicio> {
    prop_oneof![
        Just(TipoServicio::Instalacion),
        Just(TipoServicio::Mantenimiento),
        Just(TipoServicio::Reparacion),
        Just(TipoServicio::Inspeccion),
    ]
}

proptest! {
    /// After any update sequence, the risk level is a pure function of the
    /// final state - history never leaks into the score.
    #[test]
    fn risk_level_is_pure_function_of_final_state(
        tipo in tipo_strategy(),
        pasos in prop::collection::vec(paso_strategy(), 0..12),
    ) {
        let (mut hes, _) = Hes::crear(
            NumeroHes::new(2025, 1).unwrap(),
            Uuid::new_v4(),
            tipo,
            Prioridad::Media,
            "tecnico-1",
        )
        .unwrap();

        for paso in &pasos {
            match paso {
                Paso::Seguridad { completo, altos } => {
                    hes.actualizar_requerimientos_seguridad(checklist(
                        &[("epp", true), ("bloqueo", *completo)],
                        *altos,
                    ))
                    .unwrap();
                }
                Paso::Condiciones { danos } => {
                    hes.actualizar_condiciones_entrada(
                        CondicionesEntrada::new("estado del sitio", *danos, vec![]).unwrap(),
                    )
                    .unwrap();
                }
            }
        }

        let esperado = evaluar_nivel_riesgo(
            tipo,
            hes.requerimientos_seguridad(),
            hes.condiciones_entrada(),
        );
        prop_assert_eq!(hes.nivel_riesgo(), esperado);
    }

    /// Voiding succeeds exactly once for any non-empty reason
    #[test]
    fn voiding_is_one_way(motivo in "[a-z ]{1,40}") {
        prop_assume!(!motivo.trim().is_empty());

        let (mut hes, _) = Hes::crear(
            NumeroHes::new(2025, 1).unwrap(),
            Uuid::new_v4(),
            TipoServicio::Mantenimiento,
            Prioridad::Media,
            "tecnico-1",
        )
        .unwrap();

        prop_assert!(hes.anular(motivo.clone(), "supervisor-1").is_ok());
        prop_assert!(hes.anular(motivo, "supervisor-1").is_err());
    }
}
