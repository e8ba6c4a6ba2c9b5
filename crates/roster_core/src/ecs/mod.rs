//! # Entity Component System
//!
//! A bitmask ECS with lazily created, fixed-capacity component pools.
//!
//! ## Design Philosophy
//!
//! - Entity handles are slot indices with generation counters
//! - Each component type owns one pool, addressed directly by slot index
//! - Presence is tracked by a 64-bit mask per slot
//! - Queries are linear scans over the slot masks

mod component;
mod entity;
mod pool;
mod query;
mod world;

pub use component::{
    component_id, component_info, lookup_component_id, registered_components,
    try_component_id, Component, ComponentId, ComponentInfo, ComponentMask,
};
pub use entity::{EntityId, EntitySlot};
pub use pool::ComponentPool;
pub use query::{ComponentSet, Query, QueryIter};
pub use world::World;
