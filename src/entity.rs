//! Entity types with identity and lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::time::SystemTime;
use uuid::Uuid;

/// A generic entity with a typed ID
///
/// Entities are domain objects with identity that persists across time.
/// They have a lifecycle with creation and update timestamps.
///
/// # Examples
///
/// ```rust
/// use cermont_domain::{Entity, EntityId};
///
/// // Define a domain entity type
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// struct OrdenTrabajo;
///
/// // Create a new work-order entity
/// let orden = Entity::<OrdenTrabajo>::new();
/// assert_eq!(orden.created_at, orden.updated_at);
///
/// // Create with a specific ID
/// let id = EntityId::<OrdenTrabajo>::new();
/// let orden = Entity::with_id(id);
/// assert_eq!(orden.id, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity<T> {
    /// The unique identifier for this entity
    pub id: EntityId<T>,
    /// When this entity was created
    pub created_at: SystemTime,
    /// When this entity was last updated
    pub updated_at: SystemTime,
}

impl<T> Entity<T> {
    /// Create a new entity with a generated ID
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an entity with a specific ID
    pub fn with_id(id: EntityId<T>) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the entity's timestamp
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

impl<T> Default for Entity<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed entity ID using phantom types for type safety
///
/// These IDs are globally unique and persistent. The phantom type
/// parameter ensures that IDs for different entity types cannot be
/// mixed up at compile time.
///
/// # Examples
///
/// ```rust
/// use cermont_domain::EntityId;
///
/// struct Hes;
/// struct OrdenTrabajo;
///
/// let hes_id = EntityId::<Hes>::new();
/// let orden_id = EntityId::<OrdenTrabajo>::new();
///
/// // These are different types - won't compile if mixed up:
/// // let _: EntityId<Hes> = orden_id; // ERROR!
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            _phantom: PhantomData,
        }
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }

    /// Convert to a different entity ID type (use with caution)
    pub fn cast<U>(self) -> EntityId<U> {
        EntityId {
            id: self.id,
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

// Schema-wise an EntityId is just its UUID; the phantom parameter is
// compile-time only and must not leak into generated schemas.
impl<T> schemars::JsonSchema for EntityId<T> {
    fn schema_name() -> String {
        "EntityId".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Uuid as schemars::JsonSchema>::json_schema(gen)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> From<&EntityId<T>> for Uuid {
    fn from(id: &EntityId<T>) -> Self {
        id.id
    }
}

/// Marker trait for aggregate roots
///
/// Aggregate roots are the entry points for modifying aggregates.
/// All changes to entities within an aggregate must go through the root.
/// The version supports optimistic concurrency at the storage layer: a
/// repository rejects a save whose version does not advance the stored one.
pub trait AggregateRoot: Sized {
    /// The type of ID for this aggregate
    type Id: Copy + Eq + Send + Sync;

    /// Get the aggregate's ID
    fn id(&self) -> Self::Id;

    /// Get the aggregate's version for optimistic concurrency
    fn version(&self) -> u64;

    /// Increment the version
    fn increment_version(&mut self);
}

// Marker types for entity IDs

/// Marker for HES (service-entry record) aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HesMarker;

/// Marker for work-order references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrdenTrabajoMarker;

/// Marker for form-template entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlantillaMarker;

/// Marker for command entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandMarker;

/// Marker for event entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventMarker;
