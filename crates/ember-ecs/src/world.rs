//! The [`World`] is the top-level container for the ECS. It owns the entity
//! manager and one [`ComponentStore`] per component type, created lazily the
//! first time a type is added.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::component::{component_name, Component, ComponentStore, ErasedStore};
use crate::entity::{ActiveEntities, Entity, EntityManager};
use crate::EcsError;

/// The top-level ECS container.
///
/// Invariant: a component is reachable through the world if and only if its
/// owning entity is active. [`destroy_entity`](Self::destroy_entity) removes
/// the entity's components from every store before returning.
pub struct World {
    /// Entity lifecycle.
    entities: EntityManager,
    /// One adapter per component type, in registration order.
    stores: Vec<Box<dyn ErasedStore>>,
    /// Component `TypeId` -> index into `stores`.
    store_index: HashMap<TypeId, usize>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.active_count())
            .field("store_count", &self.stores.len())
            .finish()
    }
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            stores: Vec::new(),
            store_index: HashMap::new(),
        }
    }

    // -- store registry -----------------------------------------------------

    /// The store for `T`, if any component of that type was ever added.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let idx = *self.store_index.get(&TypeId::of::<T>())?;
        self.stores[idx].as_any().downcast_ref::<ComponentStore<T>>()
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let idx = *self.store_index.get(&TypeId::of::<T>())?;
        self.stores[idx]
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// Find or create the store for `T`.
    fn store_or_insert<T: Component>(&mut self) -> &mut ComponentStore<T> {
        let idx = match self.store_index.get(&TypeId::of::<T>()) {
            Some(&idx) => idx,
            None => {
                let idx = self.stores.len();
                self.stores.push(Box::new(ComponentStore::<T>::new()));
                self.store_index.insert(TypeId::of::<T>(), idx);
                debug!(component = component_name::<T>(), "registered component store");
                idx
            }
        };
        self.stores[idx]
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .expect("component store registered under a mismatched TypeId")
    }

    /// Number of component stores created so far.
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Total number of components across every store.
    pub fn component_count(&self) -> usize {
        self.stores.iter().map(|s| s.count()).sum()
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Read-only access to the entity manager.
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Allocate a new active entity.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create_entity();
        trace!(%entity, "created entity");
        entity
    }

    /// Destroy an entity, removing its components from every store first.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is not active.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_entity_active(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        let mut removed = 0usize;
        for store in &mut self.stores {
            if store.remove_for_entity(entity) {
                removed += 1;
            }
        }
        self.entities.destroy_entity(entity)?;
        trace!(%entity, components = removed, "destroyed entity");
        Ok(())
    }

    /// Whether `entity` is active.
    pub fn is_entity_active(&self, entity: Entity) -> bool {
        self.entities.is_entity_active(entity)
    }

    /// Lazily iterate active entities.
    pub fn active_entities(&self) -> ActiveEntities<'_> {
        self.entities.active_entities()
    }

    /// Number of active entities.
    pub fn entity_count(&self) -> usize {
        self.entities.active_count()
    }

    // -- component access ---------------------------------------------------

    /// Attach `component` to an active entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is not active,
    /// [`EcsError::DuplicateComponent`] if it already owns a `T`.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        if !self.entities.is_entity_active(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        self.store_or_insert::<T>().add(entity, component)
    }

    /// Detach the entity's `T`. Returns whether one was present.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        self.store_mut::<T>().is_some_and(|s| s.remove(entity))
    }

    /// Borrow the entity's `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is not active,
    /// [`EcsError::MissingComponent`] if it owns no `T`.
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        if !self.entities.is_entity_active(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        match self.store::<T>() {
            Some(store) => store.get(entity),
            None => Err(EcsError::MissingComponent {
                entity,
                component: component_name::<T>(),
            }),
        }
    }

    /// Mutably borrow the entity's `T` for in-place edits.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        if !self.entities.is_entity_active(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        match self.store_mut::<T>() {
            Some(store) => store.get_mut(entity),
            None => Err(EcsError::MissingComponent {
                entity,
                component: component_name::<T>(),
            }),
        }
    }

    /// Borrow the entity's `T`, or `None` when absent or the entity is inactive.
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_entity_active(entity) {
            return None;
        }
        self.store::<T>()?.try_get(entity)
    }

    /// Mutable counterpart of [`try_get`](Self::try_get).
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_entity_active(entity) {
            return None;
        }
        self.store_mut::<T>()?.try_get_mut(entity)
    }

    /// Whether an active entity owns a `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    // -- cleanup ------------------------------------------------------------

    /// Sweep every store for components whose entity is no longer active.
    ///
    /// Cascade deletion in [`destroy_entity`](Self::destroy_entity) already
    /// keeps stores consistent; this pass catches anything that bypassed it.
    /// Returns the number of orphaned components removed.
    pub fn cleanup_destroyed_entities(&mut self) -> usize {
        let active: HashSet<Entity> = self.entities.active_entities().collect();
        let mut total = 0usize;
        for store in &mut self.stores {
            let removed = store.cleanup_orphans(&active);
            if removed > 0 {
                warn!(
                    component = store.component_name(),
                    removed, "orphan sweep removed components of inactive entities"
                );
            }
            total += removed;
        }
        debug!(stores = self.stores.len(), removed = total, "orphan sweep finished");
        total
    }

    /// Insert a component without the active-entity check.
    ///
    /// Only the orphan-sweep tests need to fabricate the inconsistent state
    /// that cascade deletion otherwise prevents.
    #[cfg(test)]
    pub(crate) fn insert_unchecked<T: Component>(&mut self, entity: Entity, component: T) {
        self.store_or_insert::<T>()
            .add(entity, component)
            .expect("insert_unchecked on an entity that already owns the component");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
