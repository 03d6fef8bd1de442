// Copyright 2025 Cowboy AI, LLC.

//! JSON Schema generation for form templates
//!
//! Static wire types in this crate derive their schemas via `schemars`;
//! templates are data, so their submission schema is assembled dynamically.
//! The output is a draft-07 object schema suitable for front-end form
//! renderers and API validation layers.

use serde_json::{json, Map, Value};

use super::fields::{PlantillaFormulario, TipoCampo};

/// Build the draft-07 submission schema for a template.
///
/// Calculated fields are excluded: they are derived server-side and never
/// accepted as input. Fields with conditional logic are emitted as
/// properties but never listed in `required`, since their presence depends
/// on runtime data.
pub fn esquema_json(plantilla: &PlantillaFormulario) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for (nombre, campo) in plantilla.campos() {
        let propiedad = match &campo.tipo {
            TipoCampo::Texto => json!({ "type": "string", "title": campo.etiqueta }),
            TipoCampo::Numero => json!({ "type": "number", "title": campo.etiqueta }),
            TipoCampo::Booleano => json!({ "type": "boolean", "title": campo.etiqueta }),
            TipoCampo::Fecha => {
                json!({ "type": "string", "format": "date", "title": campo.etiqueta })
            }
            TipoCampo::Seleccion { opciones } => {
                json!({ "type": "string", "enum": opciones, "title": campo.etiqueta })
            }
            TipoCampo::Calculado { .. } => continue,
        };
        properties.insert(nombre.clone(), propiedad);

        if campo.requerido && campo.logica_condicional.is_none() {
            required.push(Value::String(nombre.clone()));
        }
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": plantilla.nombre,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}
