//! Dynamic form-template engine
//!
//! Templates are ordered sets of typed fields with two behaviors layered on
//! top: conditional visibility (show/hide rules over sibling fields, with
//! cycle-checked dependencies) and calculated values (arithmetic formulas
//! evaluated by a constrained parser). Submissions are validated against
//! the template with all violations reported at once, and each template can
//! emit a draft-07 JSON Schema for its submission shape.

pub mod calculation;
pub mod conditional;
pub mod fields;
pub mod schema;
pub mod validator;

pub use calculation::{evaluar_formula, validar_formula};
pub use conditional::{aplicar_operador, es_visible, validar_dependencias};
pub use fields::*;
pub use schema::esquema_json;
pub use validator::validar_envio;
