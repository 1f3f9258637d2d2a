//! Entity identifiers and lifecycle.
//!
//! An [`Entity`] is an opaque positive integer. The value `0` is reserved as
//! [`Entity::INVALID`] and is never handed out by the [`EntityManager`].
//! Destroyed identifiers are queued (FIFO) and reused by later allocations.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::EcsError;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An opaque entity identifier.
///
/// Entities carry no data. Identity plus the active flag held by the
/// [`EntityManager`] is all there is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    /// The reserved "no entity" sentinel. Never assigned to a live entity.
    pub const INVALID: Entity = Entity(0);

    /// Reconstruct an entity from its raw integer value.
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw integer value.
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// `false` only for [`Entity::INVALID`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityManager
// ---------------------------------------------------------------------------

/// Allocates, recycles and tracks the active set of [`Entity`] ids.
///
/// Recycled ids are kept in a FIFO queue so reuse is spread over time
/// rather than hammering the most recently freed slot.
#[derive(Debug)]
pub struct EntityManager {
    /// Active flag per raw id. Slot 0 is the invalid sentinel and stays `false`.
    alive: Vec<bool>,
    /// Destroyed ids waiting for reuse (FIFO).
    free_ids: VecDeque<u32>,
    /// Number of `true` entries in `alive`.
    active_count: usize,
}

impl EntityManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            alive: vec![false],
            free_ids: VecDeque::new(),
            active_count: 0,
        }
    }

    /// Allocate an entity and mark it active.
    ///
    /// Reuses the oldest destroyed id when one is queued, otherwise mints the
    /// next never-used id. Never returns [`Entity::INVALID`].
    pub fn create_entity(&mut self) -> Entity {
        let raw = match self.free_ids.pop_front() {
            Some(raw) => raw,
            None => {
                assert!(
                    self.alive.len() <= u32::MAX as usize,
                    "entity id space exhausted"
                );
                let raw = self.alive.len() as u32;
                self.alive.push(false);
                raw
            }
        };
        self.alive[raw as usize] = true;
        self.active_count += 1;
        Entity(raw)
    }

    /// Mark an active entity inactive and queue its id for reuse.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if `entity` is not currently active.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.is_entity_active(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        self.alive[entity.slot()] = false;
        self.active_count -= 1;
        self.free_ids.push_back(entity.0);
        Ok(())
    }

    /// Whether `entity` is currently active.
    #[inline]
    pub fn is_entity_active(&self, entity: Entity) -> bool {
        self.alive.get(entity.slot()).copied().unwrap_or(false)
    }

    /// Lazily iterate every active entity, each exactly once.
    ///
    /// Calling this again restarts the sequence. No ordering is promised.
    pub fn active_entities(&self) -> ActiveEntities<'_> {
        ActiveEntities {
            slots: self.alive.iter().enumerate(),
        }
    }

    /// Number of active entities.
    pub fn active_count(&self) -> usize {
        self.active_count
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`EntityManager::active_entities`].
#[derive(Debug, Clone)]
pub struct ActiveEntities<'a> {
    slots: std::iter::Enumerate<std::slice::Iter<'a, bool>>,
}

impl Iterator for ActiveEntities<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        self.slots
            .by_ref()
            .find(|(_, &alive)| alive)
            .map(|(raw, _)| Entity(raw as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
