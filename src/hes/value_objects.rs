// Copyright 2025 Cowboy AI, LLC.

//! Value objects for the HES aggregate
//!
//! Closed enums with exhaustive matching; wire names are the
//! SCREAMING_SNAKE_CASE Spanish labels the rest of the platform stores.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of service the work order requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoServicio {
    /// New equipment installation
    Instalacion,
    /// Scheduled maintenance
    Mantenimiento,
    /// Corrective repair
    Reparacion,
    /// Inspection / assessment visit
    Inspeccion,
}

impl TipoServicio {
    /// Whether entry conditions must document the site with photographs.
    ///
    /// Repairs and inspections record pre-existing damage, so they cannot
    /// be completed without photographic evidence.
    pub fn requiere_fotografias(&self) -> bool {
        matches!(self, TipoServicio::Reparacion | TipoServicio::Inspeccion)
    }

    /// Name for logging/display
    pub fn name(&self) -> &'static str {
        match self {
            TipoServicio::Instalacion => "Instalacion",
            TipoServicio::Mantenimiento => "Mantenimiento",
            TipoServicio::Reparacion => "Reparacion",
            TipoServicio::Inspeccion => "Inspeccion",
        }
    }
}

impl fmt::Display for TipoServicio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scheduling priority of the work order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prioridad {
    /// Can wait for the next scheduled window
    Baja,
    /// Normal queue position
    Media,
    /// Ahead of normal work
    Alta,
    /// Immediate attention
    Urgente,
}

/// Derived risk classification of a service entry.
///
/// Never set directly by callers: the aggregate recomputes it from service
/// type, safety requirements and entry conditions after every relevant
/// mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NivelRiesgo {
    /// No risk factors present
    Bajo,
    /// At least one risk factor
    Medio,
    /// Accumulated risk factors
    Alto,
    /// Maximum classification
    Critico,
}

impl NivelRiesgo {
    /// Name for logging/display
    pub fn name(&self) -> &'static str {
        match self {
            NivelRiesgo::Bajo => "Bajo",
            NivelRiesgo::Medio => "Medio",
            NivelRiesgo::Alto => "Alto",
            NivelRiesgo::Critico => "Critico",
        }
    }
}

impl fmt::Display for NivelRiesgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which party produced a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RolFirmante {
    /// The client receiving the service
    Cliente,
    /// The technician performing it
    Tecnico,
}

impl RolFirmante {
    /// Name for logging/display
    pub fn name(&self) -> &'static str {
        match self {
            RolFirmante::Cliente => "Cliente",
            RolFirmante::Tecnico => "Tecnico",
        }
    }
}

impl fmt::Display for RolFirmante {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
