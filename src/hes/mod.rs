//! HES module: the service-entry aggregate and everything it owns
//!
//! An HES (Hoja de Entrada de Servicio) documents one work order's service
//! entry: client data, site conditions, preliminary diagnosis, safety
//! checklist and dual sign-off. The aggregate enforces the lifecycle
//! (draft, completed, voided), derives the risk level, and emits events
//! for every state change.

pub mod aggregate;
pub mod commands;
pub mod entities;
pub mod events;
pub mod numero;
pub mod riesgo;
pub mod value_objects;

pub use aggregate::*;
pub use commands::*;
pub use entities::*;
pub use events::*;
pub use numero::*;
pub use riesgo::*;
pub use value_objects::*;
