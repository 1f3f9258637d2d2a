//! Ember ECS -- sparse-set Entity Component System for a single-threaded
//! simulation core.
//!
//! Entities are opaque positive integers handed out by an [`EntityManager`]
//! (`0` is reserved as the invalid sentinel). Each component type lives in
//! its own [`ComponentStore<T>`], created lazily by the [`World`] the first
//! time the type is added. Destroying an entity cascades through every store
//! immediately, so no query in the same frame can observe a destroyed
//! entity's components.
//!
//! [`EntityManager`]: entity::EntityManager
//! [`ComponentStore<T>`]: component::ComponentStore
//! [`World`]: world::World
//!
//! # Quick Start
//!
//! ```
//! use ember_ecs::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Debug, PartialEq)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add(entity, Position { x: 0.0, y: 0.0 }).unwrap();
//! world.add(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
//!
//! assert_eq!(world.with::<(Velocity, Position)>().count(), 1);
//! world.destroy_entity(entity).unwrap();
//! assert_eq!(world.with::<(Position,)>().count(), 0);
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod query;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
///
/// All three are caller contract violations. They are returned immediately
/// and never absorbed inside the ECS; use [`World::try_get`](world::World::try_get),
/// [`World::has`](world::World::has) or
/// [`World::is_entity_active`](world::World::is_entity_active) when absence is
/// an expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity already owns a component of this type.
    #[error("entity {entity} already has a {component} component")]
    DuplicateComponent {
        entity: entity::Entity,
        component: &'static str,
    },

    /// The entity owns no component of this type.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: entity::Entity,
        component: &'static str,
    },

    /// The entity is not active (destroyed, never allocated, or the sentinel).
    #[error("entity {entity} is not active")]
    InvalidEntity { entity: entity::Entity },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentStore, ErasedStore};
    pub use crate::entity::{ActiveEntities, Entity, EntityManager};
    pub use crate::query::{ComponentSet, QueryIter, With};
    pub use crate::world::World;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
