//! Typed component storage.
//!
//! Every component type gets exactly one [`ComponentStore<T>`], owned by the
//! [`World`](crate::world::World). A store is a sparse set: a sparse index
//! keyed by raw entity id points into densely packed `entities` / `components`
//! vectors, so iteration is a linear walk and removal is a swap-remove.
//!
//! The [`ErasedStore`] trait is the type-erased adapter the world uses for
//! operations that must touch every store regardless of its component type
//! (cascade removal, orphan sweeps, counts).

use std::any::Any;
use std::collections::HashSet;
use std::fmt;

use crate::entity::Entity;
use crate::EcsError;

/// Marker for types that can be stored as components.
///
/// Implemented for every `'static` type; a component is plain data and has
/// no behavioural dependency on any other component type.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Short, human-readable name of a component type for error messages.
pub(crate) fn component_name<T: Component>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Strip the module path but keep generic arguments intact.
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// Exclusive owner of all components of type `T`, keyed by entity.
///
/// At most one component of type `T` exists per entity.
pub struct ComponentStore<T> {
    /// Raw entity id -> index into `entities` / `components`.
    sparse: Vec<Option<u32>>,
    /// Owning entity per dense row.
    entities: Vec<Entity>,
    /// Component value per dense row.
    components: Vec<T>,
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            components: Vec::new(),
        }
    }

    #[inline]
    fn row(&self, entity: Entity) -> Option<usize> {
        self.sparse
            .get(entity.slot())
            .copied()
            .flatten()
            .map(|row| row as usize)
    }

    /// Insert `component` for `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponent`] if the entity already owns a `T`; the
    /// existing component is left untouched. [`EcsError::InvalidEntity`] for
    /// [`Entity::INVALID`].
    pub fn add(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        if !entity.is_valid() {
            return Err(EcsError::InvalidEntity { entity });
        }
        if self.has(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: component_name::<T>(),
            });
        }
        let slot = entity.slot();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.entities.len() as u32);
        self.entities.push(entity);
        self.components.push(component);
        Ok(())
    }

    /// Remove and return the component owned by `entity`, if any.
    pub fn take(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.sparse[entity.slot()] = None;
        self.entities.swap_remove(row);
        let value = self.components.swap_remove(row);
        // Patch the row of whichever entity was swapped into the hole.
        if let Some(&moved) = self.entities.get(row) {
            self.sparse[moved.slot()] = Some(row as u32);
        }
        Some(value)
    }

    /// Remove the component owned by `entity`. Returns whether one was present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        self.take(entity).is_some()
    }

    /// Borrow the component owned by `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity owns no `T`.
    pub fn get(&self, entity: Entity) -> Result<&T, EcsError> {
        self.try_get(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: component_name::<T>(),
        })
    }

    /// Mutably borrow the component owned by `entity`, for in-place edits.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity owns no `T`.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.try_get_mut(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: component_name::<T>(),
        })
    }

    /// Borrow the component owned by `entity`, or `None`.
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.row(entity).map(|row| &self.components[row])
    }

    /// Mutably borrow the component owned by `entity`, or `None`.
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.row(entity).map(move |row| &mut self.components[row])
    }

    /// Whether `entity` owns a `T`.
    #[inline]
    pub fn has(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    /// Lazily iterate the entities that currently own a `T`.
    pub fn entities_with_component(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    /// Dense slice of owning entities, in iteration order.
    pub(crate) fn dense_entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate `(entity, &component)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, &mut component)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Remove every component whose entity is not in `active`.
    ///
    /// Returns the number of components removed. This is a safety-net sweep;
    /// cascade removal on destroy is the primary deletion path.
    pub fn cleanup_orphans(&mut self, active: &HashSet<Entity>) -> usize {
        let orphans: Vec<Entity> = self
            .entities
            .iter()
            .copied()
            .filter(|e| !active.contains(e))
            .collect();
        for &entity in &orphans {
            self.remove(entity);
        }
        orphans.len()
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the store holds no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> fmt::Debug for ComponentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("component", &component_name::<T>())
            .field("len", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ErasedStore -- per-type adapter for cross-cutting operations
// ---------------------------------------------------------------------------

/// Type-erased view of a [`ComponentStore<T>`].
///
/// The world keeps one boxed adapter per registered component type and walks
/// the list directly for cascade deletion and orphan cleanup.
pub trait ErasedStore {
    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;
    /// Remove the entity's component, if present.
    fn remove_for_entity(&mut self, entity: Entity) -> bool;
    /// Remove components whose entity is not in `active`; returns the count.
    fn cleanup_orphans(&mut self, active: &HashSet<Entity>) -> usize;
    /// Number of stored components.
    fn count(&self) -> usize;
    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn component_name(&self) -> &'static str {
        component_name::<T>()
    }

    fn remove_for_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn cleanup_orphans(&mut self, active: &HashSet<Entity>) -> usize {
        ComponentStore::cleanup_orphans(self, active)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
