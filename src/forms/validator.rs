// Copyright 2025 Cowboy AI, LLC.

//! Submitted-form validation
//!
//! Validates a data map against its template, honoring conditional
//! visibility: hidden fields are skipped entirely, visible required fields
//! must be present, and present values must match their field type.
//! Calculated fields are always computed here and never accepted from the
//! submitted input. All violations are collected and reported together.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::calculation::evaluar_formula;
use super::conditional::es_visible;
use super::fields::{PlantillaFormulario, TipoCampo};
use crate::errors::{DomainError, DomainResult};

/// Validate a submission and produce the canonical value map.
///
/// The output contains every visible field's value plus the computed value
/// of every visible calculated field. The template itself must already have
/// passed [`PlantillaFormulario::validar`].
pub fn validar_envio(
    plantilla: &PlantillaFormulario,
    datos: &Map<String, Value>,
) -> DomainResult<Map<String, Value>> {
    let mut errores: Vec<String> = Vec::new();
    let mut valores = Map::new();

    for (nombre, campo) in plantilla.campos() {
        if !es_visible(plantilla, nombre, datos) {
            continue;
        }

        if let TipoCampo::Calculado { formula } = &campo.tipo {
            match evaluar_formula(formula, datos) {
                Ok(valor) => {
                    valores.insert(nombre.clone(), Value::from(valor));
                }
                Err(err) => {
                    errores.push(format!("campo `{nombre}`: {err}"));
                }
            }
            continue;
        }

        let valor = datos.get(nombre).unwrap_or(&Value::Null);
        if valor.is_null() {
            if campo.requerido {
                errores.push(format!("campo `{nombre}`: required value is missing"));
            }
            continue;
        }

        match tipo_coincide(&campo.tipo, valor) {
            Ok(()) => {
                valores.insert(nombre.clone(), valor.clone());
            }
            Err(mensaje) => {
                errores.push(format!("campo `{nombre}`: {mensaje}"));
            }
        }
    }

    if errores.is_empty() {
        Ok(valores)
    } else {
        Err(DomainError::FormInvalid { errors: errores })
    }
}

fn tipo_coincide(tipo: &TipoCampo, valor: &Value) -> Result<(), String> {
    match tipo {
        TipoCampo::Texto => {
            if valor.is_string() {
                Ok(())
            } else {
                Err("expected a string".to_string())
            }
        }
        TipoCampo::Numero => {
            if valor.is_number() {
                Ok(())
            } else {
                Err("expected a number".to_string())
            }
        }
        TipoCampo::Booleano => {
            if valor.is_boolean() {
                Ok(())
            } else {
                Err("expected a boolean".to_string())
            }
        }
        TipoCampo::Fecha => match valor.as_str() {
            Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => Ok(()),
            _ => Err("expected an ISO date (YYYY-MM-DD)".to_string()),
        },
        TipoCampo::Seleccion { opciones } => match valor.as_str() {
            Some(s) if opciones.iter().any(|o| o == s) => Ok(()),
            Some(s) => Err(format!("`{s}` is not one of the allowed options")),
            None => Err("expected a string option".to_string()),
        },
        // handled before the type check
        TipoCampo::Calculado { .. } => Ok(()),
    }
}
