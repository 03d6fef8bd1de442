// Copyright 2025 Cowboy AI, LLC.

//! Conditional-logic evaluation for form templates
//!
//! Each field may declare one show/hide rule against a sibling field. The
//! rules form a directed graph (field -> its target) which must be acyclic;
//! validation runs a depth-first traversal with a fully-visited set and an
//! on-stack set, reporting the cycle path when one exists.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::fields::{AccionCondicional, OperadorComparacion, PlantillaFormulario};
use crate::errors::{DomainError, DomainResult};

/// Decide whether a field should be shown given the submitted data.
///
/// A field without a rule is always visible. A rule whose target is absent
/// from the data compares against JSON null.
pub fn es_visible(plantilla: &PlantillaFormulario, nombre: &str, datos: &Map<String, Value>) -> bool {
    let campo = match plantilla.campo(nombre) {
        Some(campo) => campo,
        None => return false,
    };
    let logica = match &campo.logica_condicional {
        Some(logica) => logica,
        None => return true,
    };

    let actual = datos.get(&logica.campo_objetivo).unwrap_or(&Value::Null);
    let se_cumple = aplicar_operador(logica.operador, actual, &logica.valor_esperado);

    match logica.accion {
        AccionCondicional::Mostrar => se_cumple,
        AccionCondicional::Ocultar => !se_cumple,
    }
}

/// Apply one comparison operator.
///
/// Numbers compare numerically (2 == 2.0); strings compare lexicographically
/// for the ordering operators; `Contiene` covers substring and array
/// membership. Everything else falls back to strict JSON equality for
/// (in)equality and false for orderings.
pub fn aplicar_operador(operador: OperadorComparacion, actual: &Value, esperado: &Value) -> bool {
    match operador {
        OperadorComparacion::Igual => valores_iguales(actual, esperado),
        OperadorComparacion::Distinto => !valores_iguales(actual, esperado),
        OperadorComparacion::MayorQue => comparar(actual, esperado).map(|o| o.is_gt()).unwrap_or(false),
        OperadorComparacion::MenorQue => comparar(actual, esperado).map(|o| o.is_lt()).unwrap_or(false),
        OperadorComparacion::MayorOIgual => comparar(actual, esperado).map(|o| o.is_ge()).unwrap_or(false),
        OperadorComparacion::MenorOIgual => comparar(actual, esperado).map(|o| o.is_le()).unwrap_or(false),
        OperadorComparacion::Contiene => match (actual, esperado) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::Array(items), needle) => items.iter().any(|item| valores_iguales(item, needle)),
            _ => false,
        },
    }
}

fn valores_iguales(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn comparar(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    None
}

/// Validate the conditional-dependency graph of a template.
///
/// Every target must exist, no field may target itself, and the
/// field -> target graph must be acyclic.
pub fn validar_dependencias(plantilla: &PlantillaFormulario) -> DomainResult<()> {
    // Existence and self-reference first, so cycle detection can assume
    // well-formed edges.
    for (nombre, campo) in plantilla.campos() {
        if let Some(logica) = &campo.logica_condicional {
            if plantilla.campo(&logica.campo_objetivo).is_none() {
                return Err(DomainError::validation(
                    format!("campos.{nombre}.logica_condicional"),
                    format!("target field `{}` does not exist", logica.campo_objetivo),
                ));
            }
            if logica.campo_objetivo == *nombre {
                return Err(DomainError::validation(
                    format!("campos.{nombre}.logica_condicional"),
                    "a field cannot target itself",
                ));
            }
        }
    }

    let mut visitados: HashSet<&str> = HashSet::new();
    let mut en_pila: HashSet<&str> = HashSet::new();

    for nombre in plantilla.campos().keys() {
        if !visitados.contains(nombre.as_str()) {
            visitar(plantilla, nombre, &mut visitados, &mut en_pila, &mut Vec::new())?;
        }
    }
    Ok(())
}

fn visitar<'a>(
    plantilla: &'a PlantillaFormulario,
    nombre: &'a str,
    visitados: &mut HashSet<&'a str>,
    en_pila: &mut HashSet<&'a str>,
    camino: &mut Vec<&'a str>,
) -> DomainResult<()> {
    if en_pila.contains(nombre) {
        camino.push(nombre);
        return Err(DomainError::validation(
            "logica_condicional",
            format!("dependency cycle: {}", camino.join(" -> ")),
        ));
    }
    if visitados.contains(nombre) {
        return Ok(());
    }

    en_pila.insert(nombre);
    camino.push(nombre);

    if let Some(campo) = plantilla.campo(nombre) {
        if let Some(logica) = &campo.logica_condicional {
            // Edge targets were checked before traversal
            let objetivo = plantilla.campo(&logica.campo_objetivo).map(|c| c.nombre.as_str());
            if let Some(objetivo) = objetivo {
                visitar(plantilla, objetivo, visitados, en_pila, camino)?;
            }
        }
    }

    camino.pop();
    en_pila.remove(nombre);
    visitados.insert(nombre);
    Ok(())
}
