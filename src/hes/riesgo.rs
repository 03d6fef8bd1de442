// Copyright 2025 Cowboy AI, LLC.

//! Risk-level evaluation
//!
//! A pure scoring function over the service type, the safety requirements
//! and the entry conditions. The weights and thresholds are fixed platform
//! policy; the aggregate re-runs this after every relevant mutation, so the
//! resulting level is always a function of current state alone.

use super::entities::{CondicionesEntrada, RequerimientosSeguridad};
use super::value_objects::{NivelRiesgo, TipoServicio};

/// Compute the risk level for a service entry.
///
/// Scoring:
/// - service type: repair +2, installation +1
/// - safety requirements: high-risk flag +2, incomplete checklist +1
/// - entry conditions: visible damage +1
///
/// Level: score >= 5 critical, >= 3 high, >= 1 medium, else low.
pub fn evaluar_nivel_riesgo(
    tipo_servicio: TipoServicio,
    seguridad: Option<&RequerimientosSeguridad>,
    condiciones: Option<&CondicionesEntrada>,
) -> NivelRiesgo {
    let mut puntos = match tipo_servicio {
        TipoServicio::Reparacion => 2,
        TipoServicio::Instalacion => 1,
        TipoServicio::Mantenimiento | TipoServicio::Inspeccion => 0,
    };

    if let Some(seguridad) = seguridad {
        if seguridad.contiene_riesgos_altos() {
            puntos += 2;
        }
        if !seguridad.esta_completo() {
            puntos += 1;
        }
    }

    if let Some(condiciones) = condiciones {
        if condiciones.tiene_danos_visibles() {
            puntos += 1;
        }
    }

    match puntos {
        p if p >= 5 => NivelRiesgo::Critico,
        p if p >= 3 => NivelRiesgo::Alto,
        p if p >= 1 => NivelRiesgo::Medio,
        _ => NivelRiesgo::Bajo,
    }
}
