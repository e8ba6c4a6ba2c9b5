//! # ECS World
//!
//! The central container for all entities and components.
//!
//! The world owns the entity table, the free-slot list, and one pool per
//! component type. It is the only way to reach component data: every typed
//! access resolves the component id through the world's own type table,
//! checks the handle's generation against the slot, and consults the slot's
//! mask before reading the pool. Only the first assign of a type in a world
//! touches the process-wide registry.

use std::any::TypeId;

use ahash::AHashMap;

use super::component::{component_id, Component, ComponentId, ComponentMask};
use super::entity::{EntityId, EntitySlot};
use super::pool::ComponentPool;
use super::query::{ComponentSet, Query, QueryIter};
use crate::config::{WorldConfig, MAX_COMPONENTS, MAX_ENTITIES, MAX_ENTITY_CEILING};
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all entity and component state.
///
/// # Capacity
///
/// The world has a fixed entity ceiling set at creation. Every component pool
/// is sized for it on first use and never resized, so component references
/// stay at a fixed address for the pool's lifetime.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(10_000);
///
/// let entity = world.new_entity();
/// world.assign(entity, Transform::at(1.0));
///
/// for entity in world.query::<(Transform,)>() {
///     println!("{:?}", world.get::<Transform>(entity));
/// }
/// ```
pub struct World {
    /// Entity table, one row per slot ever handed out.
    slots: Vec<EntitySlot>,
    /// Free slot indices, most recently destroyed last.
    free_indices: Vec<u32>,
    /// Component pools indexed by component id, created lazily.
    pools: Vec<Option<ComponentPool>>,
    /// Ids of the component types that have a pool in this world.
    type_ids: AHashMap<TypeId, ComponentId>,
    /// Number of currently live entities.
    alive_count: usize,
    /// Maximum number of slots.
    capacity: usize,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entities (e.g., `1_000_000`)
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds [`MAX_ENTITY_CEILING`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= MAX_ENTITY_CEILING,
            "Capacity cannot exceed {MAX_ENTITY_CEILING}"
        );

        Self::build(WorldConfig::new(capacity))
    }

    /// Creates a new world from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is rejected by
    /// [`WorldConfig::validate`].
    pub fn from_config(config: &WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(*config))
    }

    fn build(config: WorldConfig) -> Self {
        tracing::debug!(
            max_entities = config.max_entities,
            initial_entities = config.initial_entities,
            "creating world"
        );

        Self {
            slots: Vec::with_capacity(config.initial_entities),
            free_indices: Vec::new(),
            pools: Vec::with_capacity(MAX_COMPONENTS),
            type_ids: AHashMap::with_capacity(MAX_COMPONENTS),
            alive_count: 0,
            capacity: config.max_entities,
        }
    }

    /// Returns the maximum number of entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of slots in the entity table, live or free.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of free slots waiting to be recycled.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_indices.len()
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity, returning its handle.
    ///
    /// Reuses the most recently freed slot if there is one (keeping the
    /// generation bumped at destroy time), otherwise appends a slot with
    /// generation 0.
    ///
    /// # Returns
    ///
    /// The new handle, or [`EntityId::INVALID`] if the world is full.
    pub fn new_entity(&mut self) -> EntityId {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.id = EntityId::new(index, slot.id.generation());
            self.alive_count += 1;

            tracing::trace!(entity = %slot.id, "recycled entity slot");
            return slot.id;
        }

        if self.slots.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "entity capacity exhausted");
            return EntityId::INVALID;
        }

        // capacity <= MAX_ENTITY_CEILING < u32::MAX, always fits
        #[allow(clippy::cast_possible_truncation)]
        let id = EntityId::new(self.slots.len() as u32, 0);
        self.slots.push(EntitySlot::new(id));
        self.alive_count += 1;

        tracing::trace!(entity = %id, "created entity");
        id
    }

    /// Creates a new entity, reporting a full world as an error.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if every slot is live.
    pub fn try_new_entity(&mut self) -> EcsResult<EntityId> {
        if self.free_indices.is_empty() && self.slots.len() >= self.capacity {
            return Err(EcsError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(self.new_entity())
    }

    /// Destroys an entity, dropping its components and freeing its slot.
    ///
    /// The slot's generation is bumped, so `id` and every copy of it become
    /// stale.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if `id` was already stale.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(index) = self.fresh_index(id) else {
            tracing::warn!(entity = %id, "destroy of a stale entity handle ignored");
            return false;
        };

        let slot = &mut self.slots[index];
        for component in slot.mask.iter() {
            if let Some(pool) = self.pools[usize::from(component)].as_mut() {
                pool.destroy(index);
            }
        }

        slot.id = id.retired();
        slot.mask.clear();
        self.free_indices.push(id.index());
        self.alive_count -= 1;

        tracing::trace!(entity = %id, "destroyed entity");
        true
    }

    /// Checks if `id` refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.fresh_index(id).is_some()
    }

    /// Destroys every live entity. Slots, generations and pools are kept.
    pub fn clear(&mut self) {
        for pool in self.pools.iter_mut().flatten() {
            pool.clear();
        }

        // Reverse order so the lowest indices are recycled first
        for slot in self.slots.iter_mut().rev() {
            if slot.is_live() {
                self.free_indices.push(slot.id.index());
                slot.id = slot.id.retired();
                slot.mask.clear();
            }
        }

        tracing::debug!(destroyed = self.alive_count, "cleared world");
        self.alive_count = 0;
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `value` to an entity.
    ///
    /// An existing `T` on the entity is dropped and replaced.
    ///
    /// # Returns
    ///
    /// The stored component, or `None` if `id` is stale.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a new component type and the process already uses
    /// [`MAX_COMPONENTS`] types.
    pub fn assign<T: Component>(&mut self, id: EntityId, value: T) -> Option<&mut T> {
        let component = self.ensure_pool::<T>();
        let index = self.fresh_index(id)?;

        let stored = self.pools[usize::from(component)]
            .as_mut()?
            .construct(index, value)?;
        self.slots[index].mask.insert(component);
        Some(stored)
    }

    /// Attaches the value built by `init` to an entity.
    ///
    /// `init` is only called if `id` is live.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a new component type and the process already uses
    /// [`MAX_COMPONENTS`] types.
    pub fn assign_with<T, F>(&mut self, id: EntityId, init: F) -> Option<&mut T>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        let component = self.ensure_pool::<T>();
        let index = self.fresh_index(id)?;

        let stored = self.pools[usize::from(component)]
            .as_mut()?
            .construct_with(index, init)?;
        self.slots[index].mask.insert(component);
        Some(stored)
    }

    /// Attaches a default-constructed `T` to an entity.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a new component type and the process already uses
    /// [`MAX_COMPONENTS`] types.
    pub fn assign_default<T: Component + Default>(&mut self, id: EntityId) -> Option<&mut T> {
        self.assign_with(id, T::default)
    }

    /// Detaches and drops an entity's `T`.
    ///
    /// # Returns
    ///
    /// `true` if a component was removed, `false` if `id` is stale or the
    /// entity had no `T`.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> bool {
        let Some(index) = self.fresh_index(id) else {
            return false;
        };
        let Some(component) = self.local_id::<T>() else {
            return false;
        };

        let slot = &mut self.slots[index];
        if !slot.mask.contains(component) {
            return false;
        }
        slot.mask.remove(component);

        if let Some(pool) = self.pools[usize::from(component)].as_mut() {
            pool.destroy(index);
        }
        true
    }

    /// Gets an entity's `T`.
    ///
    /// # Returns
    ///
    /// `None` if `id` is stale or the entity has no `T`.
    #[must_use]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        let index = self.fresh_index(id)?;
        let component = self.local_id::<T>()?;
        if !self.slots[index].mask.contains(component) {
            return None;
        }

        self.pools.get(usize::from(component))?.as_ref()?.get(index)
    }

    /// Gets an entity's `T` mutably.
    ///
    /// # Returns
    ///
    /// `None` if `id` is stale or the entity has no `T`.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        let index = self.fresh_index(id)?;
        let component = self.local_id::<T>()?;
        if !self.slots[index].mask.contains(component) {
            return None;
        }

        self.pools.get_mut(usize::from(component))?.as_mut()?.get_mut(index)
    }

    /// Checks if an entity has a `T`.
    #[inline]
    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.get::<T>(id).is_some()
    }

    /// Returns the component mask of a live entity.
    #[must_use]
    pub fn mask_of(&self, id: EntityId) -> Option<ComponentMask> {
        self.fresh_index(id).map(|index| self.slots[index].mask)
    }

    // =========================================================================
    // Inspection & queries
    // =========================================================================

    /// Returns the entity table in slot order.
    ///
    /// Free slots are included and carry an invalid handle.
    #[inline]
    #[must_use]
    pub fn all_slots(&self) -> &[EntitySlot] {
        &self.slots
    }

    /// Returns the pool for a component id, if it has been created.
    #[must_use]
    pub fn pool(&self, component: ComponentId) -> Option<&ComponentPool> {
        self.pools.get(usize::from(component))?.as_ref()
    }

    /// Returns the pool for `T`, if it has been created.
    #[must_use]
    pub fn pool_of<T: Component>(&self) -> Option<&ComponentPool> {
        self.pool(self.local_id::<T>()?)
    }

    /// Iterates over every pool created so far, in component id order.
    pub fn pools(&self) -> impl Iterator<Item = &ComponentPool> {
        self.pools.iter().flatten()
    }

    /// Starts a scan for live entities carrying every type in `S`.
    ///
    /// `world.query::<()>()` yields every live entity.
    #[must_use]
    pub fn query<S: ComponentSet>(&self) -> QueryIter<'_> {
        Query::of::<S>().iter(self)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolves `id` to its slot index if the slot still holds exactly `id`.
    #[inline]
    fn fresh_index(&self, id: EntityId) -> Option<usize> {
        let index = id.index() as usize;
        let slot = self.slots.get(index)?;
        (slot.id == id).then_some(index)
    }

    /// Returns the id of `T` if this world has a pool for it.
    ///
    /// A type without a pool here is carried by no entity of this world.
    #[inline]
    fn local_id<T: Component>(&self) -> Option<ComponentId> {
        self.type_ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the id of `T`, creating its pool on first use.
    fn ensure_pool<T: Component>(&mut self) -> ComponentId {
        if let Some(component) = self.local_id::<T>() {
            return component;
        }

        let component = component_id::<T>();
        let position = usize::from(component);

        if self.pools.len() <= position {
            self.pools.resize_with(position + 1, || None);
        }

        if self.pools[position].is_none() {
            tracing::debug!(
                component = std::any::type_name::<T>(),
                id = component,
                stride = std::mem::size_of::<T>(),
                capacity = self.capacity,
                "creating component pool"
            );
            self.pools[position] = Some(ComponentPool::new::<T>(component, self.capacity));
        }
        self.type_ids.insert(TypeId::of::<T>(), component);

        component
    }
}

impl Default for World {
    /// Creates a world with [`MAX_ENTITIES`] capacity.
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}
