//! # ROSTER Core
//!
//! In-memory entity component store:
//! - Generational entity handles with O(1) slot recycling
//! - One fixed-capacity, type-erased pool per component type
//! - Bulk iteration over every entity carrying a set of component types
//!
//! ## Architecture Rules
//!
//! 1. **O(1) component access** - Pools are addressed by entity slot index
//! 2. **No aliasing of stale handles** - Every handle is checked against the
//!    generation stored in its slot
//! 3. **Allocation-free iteration** - Queries scan the entity table in place
//!
//! ## Example
//!
//! ```rust
//! use roster_core::{Query, World};
//!
//! #[derive(Debug, PartialEq)]
//! struct Transform(f32);
//! struct Shape;
//!
//! let mut world = World::new(1_000);
//!
//! let e1 = world.new_entity();
//! world.assign(e1, Transform(1.0));
//!
//! let e2 = world.new_entity();
//! world.assign(e2, Transform(2.0));
//! world.assign(e2, Shape);
//!
//! let shaped: Vec<_> = Query::of::<(Transform, Shape)>().iter(&world).collect();
//! assert_eq!(shaped, vec![e2]);
//!
//! world.destroy_entity(e2);
//! assert_eq!(world.get::<Transform>(e2), None);
//! assert_eq!(world.query::<(Transform,)>().collect::<Vec<_>>(), vec![e1]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::{WorldConfig, MAX_COMPONENTS, MAX_ENTITIES, MAX_ENTITY_CEILING};
pub use ecs::{
    component_id, component_info, lookup_component_id, registered_components,
    try_component_id, Component, ComponentId, ComponentInfo, ComponentMask, ComponentPool,
    ComponentSet, EntityId, EntitySlot, Query, QueryIter, World,
};
pub use error::{EcsError, EcsResult};
