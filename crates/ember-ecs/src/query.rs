//! Composite queries over one to three component types.
//!
//! A query walks the store of the *first* listed type and keeps the entities
//! that also own every other listed type. Cost and iteration order are
//! therefore driven by the first type: list the most selective type first.
//! Results are "every entity owning all listed types, each exactly once";
//! no particular order is promised.
//!
//! [`World::with`] yields bare entity ids, which is what systems use when
//! they need to mutate components afterwards. [`World::query`] yields
//! read-only component references alongside the id.
//!
//! ```
//! use ember_ecs::prelude::*;
//!
//! struct Pos(f32);
//! struct Vel(f32);
//!
//! let mut world = World::new();
//! let e = world.create_entity();
//! world.add(e, Pos(0.0)).unwrap();
//! world.add(e, Vel(2.0)).unwrap();
//!
//! let movers: Vec<Entity> = world.with::<(Vel, Pos)>().collect();
//! for entity in movers {
//!     let dx = world.get::<Vel>(entity).unwrap().0;
//!     world.get_mut::<Pos>(entity).unwrap().0 += dx;
//! }
//! assert_eq!(world.get::<Pos>(e).unwrap().0, 2.0);
//! ```

use std::marker::PhantomData;

use crate::component::Component;
use crate::entity::Entity;
use crate::world::World;

// ---------------------------------------------------------------------------
// ComponentSet -- a tuple of component types
// ---------------------------------------------------------------------------

/// A tuple of one to three component types usable in a query.
pub trait ComponentSet {
    /// Read-only references fetched per matching entity.
    type Refs<'w>;

    /// Owners of the first listed type, in that store's iteration order.
    fn driver(world: &World) -> &[Entity];

    /// Whether `entity` owns every type after the first.
    fn matches_rest(world: &World, entity: Entity) -> bool;

    /// Fetch references to every listed component of `entity`.
    fn fetch(world: &World, entity: Entity) -> Option<Self::Refs<'_>>;
}

fn driver_of<A: Component>(world: &World) -> &[Entity] {
    world
        .store::<A>()
        .map(|s| s.dense_entities())
        .unwrap_or(&[])
}

impl<A: Component> ComponentSet for (A,) {
    type Refs<'w> = (&'w A,);

    fn driver(world: &World) -> &[Entity] {
        driver_of::<A>(world)
    }

    fn matches_rest(_world: &World, _entity: Entity) -> bool {
        true
    }

    fn fetch(world: &World, entity: Entity) -> Option<Self::Refs<'_>> {
        Some((world.try_get::<A>(entity)?,))
    }
}

impl<A: Component, B: Component> ComponentSet for (A, B) {
    type Refs<'w> = (&'w A, &'w B);

    fn driver(world: &World) -> &[Entity] {
        driver_of::<A>(world)
    }

    fn matches_rest(world: &World, entity: Entity) -> bool {
        world.has::<B>(entity)
    }

    fn fetch(world: &World, entity: Entity) -> Option<Self::Refs<'_>> {
        Some((world.try_get::<A>(entity)?, world.try_get::<B>(entity)?))
    }
}

impl<A: Component, B: Component, C: Component> ComponentSet for (A, B, C) {
    type Refs<'w> = (&'w A, &'w B, &'w C);

    fn driver(world: &World) -> &[Entity] {
        driver_of::<A>(world)
    }

    fn matches_rest(world: &World, entity: Entity) -> bool {
        world.has::<B>(entity) && world.has::<C>(entity)
    }

    fn fetch(world: &World, entity: Entity) -> Option<Self::Refs<'_>> {
        Some((
            world.try_get::<A>(entity)?,
            world.try_get::<B>(entity)?,
            world.try_get::<C>(entity)?,
        ))
    }
}

// ---------------------------------------------------------------------------
// With -- entity ids only
// ---------------------------------------------------------------------------

/// Iterator over entities owning every type in `Q`.
pub struct With<'w, Q: ComponentSet> {
    world: &'w World,
    driver: std::slice::Iter<'w, Entity>,
    _marker: PhantomData<Q>,
}

impl<'w, Q: ComponentSet> Iterator for With<'w, Q> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let world = self.world;
        self.driver
            .by_ref()
            .copied()
            .find(|&entity| Q::matches_rest(world, entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.driver.size_hint().1)
    }
}

// ---------------------------------------------------------------------------
// QueryIter -- entity ids plus component references
// ---------------------------------------------------------------------------

/// Iterator yielding `(Entity, Q::Refs)` for every matching entity.
pub struct QueryIter<'w, Q: ComponentSet> {
    world: &'w World,
    driver: std::slice::Iter<'w, Entity>,
    _marker: PhantomData<Q>,
}

impl<'w, Q: ComponentSet> Iterator for QueryIter<'w, Q> {
    type Item = (Entity, Q::Refs<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let world = self.world;
        self.driver
            .by_ref()
            .find_map(|&entity| Q::fetch(world, entity).map(|refs| (entity, refs)))
    }
}

// ---------------------------------------------------------------------------
// World query methods
// ---------------------------------------------------------------------------

impl World {
    /// Entities owning every component type in `Q`.
    ///
    /// ```ignore
    /// for entity in world.with::<(PlayerControl, PhysicsBody)>() { .. }
    /// ```
    pub fn with<Q: ComponentSet>(&self) -> With<'_, Q> {
        With {
            world: self,
            driver: Q::driver(self).iter(),
            _marker: PhantomData,
        }
    }

    /// Entities owning every type in `Q`, with read-only references.
    ///
    /// ```ignore
    /// for (entity, (transform, sprite)) in world.query::<(Transform, Sprite)>() { .. }
    /// ```
    pub fn query<Q: ComponentSet>(&self) -> QueryIter<'_, Q> {
        QueryIter {
            world: self,
            driver: Q::driver(self).iter(),
            _marker: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
