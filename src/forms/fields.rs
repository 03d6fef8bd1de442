// Copyright 2025 Cowboy AI, LLC.

//! Form-template field definitions
//!
//! A template owns an ordered set of named fields. Fields may declare
//! conditional visibility (show/hide based on another field's value) and
//! calculated values (an arithmetic formula over sibling fields). Templates
//! are validated as a whole before use: dangling targets, self-references
//! and dependency cycles are construction-time errors, not submit-time
//! surprises.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::calculation::validar_formula;
use super::conditional::validar_dependencias;
use crate::errors::{DomainError, DomainResult};

/// The value type of a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoCampo {
    /// Free text
    Texto,
    /// Numeric value
    Numero,
    /// Yes/no flag
    Booleano,
    /// Calendar date (ISO `YYYY-MM-DD`)
    Fecha,
    /// One value out of a closed option list
    Seleccion {
        /// The allowed options
        opciones: Vec<String>,
    },
    /// Derived from sibling fields through an arithmetic formula
    Calculado {
        /// Formula over sibling field names, e.g. `"cantidad * precio"`
        formula: String,
    },
}

/// Comparison operators available to conditional logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperadorComparacion {
    /// Values are equal
    Igual,
    /// Values differ
    Distinto,
    /// Actual > expected (numeric or lexicographic)
    MayorQue,
    /// Actual < expected
    MenorQue,
    /// Actual >= expected
    MayorOIgual,
    /// Actual <= expected
    MenorOIgual,
    /// String or array containment
    Contiene,
}

/// What a satisfied condition does to the declaring field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccionCondicional {
    /// Show the field when the condition holds
    Mostrar,
    /// Hide the field when the condition holds
    Ocultar,
}

/// A field's show/hide rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogicaCondicional {
    /// The sibling field whose value is inspected
    pub campo_objetivo: String,
    /// How to compare
    pub operador: OperadorComparacion,
    /// The expected value the comparison runs against
    pub valor_esperado: serde_json::Value,
    /// Whether a satisfied condition shows or hides the field
    pub accion: AccionCondicional,
}

/// One field of a form template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Campo {
    /// Machine name, unique within the template
    pub nombre: String,
    /// Human-facing label
    pub etiqueta: String,
    /// Value type
    pub tipo: TipoCampo,
    /// Whether a visible field must carry a value on submit
    pub requerido: bool,
    /// Optional show/hide rule
    pub logica_condicional: Option<LogicaCondicional>,
}

impl Campo {
    /// A plain field with no conditional logic
    pub fn nuevo(nombre: impl Into<String>, etiqueta: impl Into<String>, tipo: TipoCampo) -> Self {
        Self {
            nombre: nombre.into(),
            etiqueta: etiqueta.into(),
            tipo,
            requerido: false,
            logica_condicional: None,
        }
    }

    /// Mark the field required
    pub fn requerido(mut self) -> Self {
        self.requerido = true;
        self
    }

    /// Attach a show/hide rule
    pub fn con_logica(mut self, logica: LogicaCondicional) -> Self {
        self.logica_condicional = Some(logica);
        self
    }
}

/// An ordered, named set of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlantillaFormulario {
    /// Template name
    pub nombre: String,
    // Keyed by field name; insertion order is presentation order
    campos: IndexMap<String, Campo>,
}

impl PlantillaFormulario {
    /// Create an empty template
    pub fn nueva(nombre: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            campos: IndexMap::new(),
        }
    }

    /// Add a field, rejecting blank and duplicate names
    pub fn agregar_campo(&mut self, campo: Campo) -> DomainResult<()> {
        if campo.nombre.trim().is_empty() {
            return Err(DomainError::validation("campo.nombre", "must not be empty"));
        }
        if !campo
            .nombre
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::validation(
                "campo.nombre",
                format!("`{}` may only contain letters, digits and underscores", campo.nombre),
            ));
        }
        if self.campos.contains_key(&campo.nombre) {
            return Err(DomainError::validation(
                "campo.nombre",
                format!("duplicate field `{}`", campo.nombre),
            ));
        }
        self.campos.insert(campo.nombre.clone(), campo);
        Ok(())
    }

    /// Look up a field by name
    pub fn campo(&self, nombre: &str) -> Option<&Campo> {
        self.campos.get(nombre)
    }

    /// All fields in declaration order
    pub fn campos(&self) -> &IndexMap<String, Campo> {
        &self.campos
    }

    /// Validate the template as a whole before allowing use.
    ///
    /// Checks conditional-logic targets (existence, self-reference, cycles)
    /// and every calculated field's formula (charset, parentheses,
    /// references).
    pub fn validar(&self) -> DomainResult<()> {
        validar_dependencias(self)?;
        for campo in self.campos.values() {
            if let TipoCampo::Calculado { formula } = &campo.tipo {
                validar_formula(&campo.nombre, formula, self)?;
            }
        }
        Ok(())
    }
}
