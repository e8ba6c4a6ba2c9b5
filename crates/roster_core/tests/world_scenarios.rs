//! # World Scenario Tests
//!
//! End-to-end checks of the store's guarantees:
//!
//! 1. **Generational exclusivity**: destroyed handles never reach live data
//! 2. **Slot recycling**: a destroyed index comes back with generation + 1
//! 3. **Masked queries**: creation order, superset matching, liveness first
//!
//! Run with: cargo test -p roster_core --test world_scenarios

use bytemuck::{Pod, Zeroable};
use roster_core::{EntityId, Query, World};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Vector {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Quaternion {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Transform {
    position: Vector,
    rotation: Quaternion,
    scale: Vector,
}

impl Transform {
    /// A transform whose position has every axis set to `v`.
    fn at(v: f32) -> Self {
        Self {
            position: Vector { x: v, y: v, z: v },
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Shape {
    sides: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Renderable {
    visible: bool,
}

/// Builds E1 (Transform), E2 (Transform, Shape), E3 (Transform, Shape, Renderable).
fn three_entities(world: &mut World) -> [EntityId; 3] {
    let e1 = world.new_entity();
    world.assign(e1, Transform::at(1.0)).unwrap();

    let e2 = world.new_entity();
    world.assign(e2, Transform::at(2.0)).unwrap();
    world.assign_default::<Shape>(e2).unwrap();

    let e3 = world.new_entity();
    world.assign(e3, Transform::at(3.0)).unwrap();
    world.assign(e3, Shape { sides: 4 }).unwrap();
    world.assign(e3, Renderable { visible: true }).unwrap();

    [e1, e2, e3]
}

fn position_x(world: &World, id: EntityId) -> Option<f32> {
    world.get::<Transform>(id).map(|t| t.position.x)
}

#[test]
fn verify_three_entity_scenario() {
    let mut world = World::new(1_000);
    let [e1, e2, e3] = three_entities(&mut world);

    let shaped: Vec<_> = Query::of::<(Transform, Shape)>().iter(&world).collect();
    assert_eq!(shaped, vec![e2, e3]);

    // Mutation through a query result is visible on a later fetch
    for &id in &shaped {
        world.get_mut::<Transform>(id).unwrap().position.x = 10.0;
    }
    assert_eq!(position_x(&world, e2), Some(10.0));
    assert_eq!(position_x(&world, e3), Some(10.0));
    assert_eq!(position_x(&world, e1), Some(1.0));

    assert!(world.destroy_entity(e2));
    let transforms: Vec<_> = world.query::<(Transform,)>().collect();
    assert_eq!(transforms, vec![e1, e3]);
}

#[test]
fn verify_remove_then_query() {
    let mut world = World::new(1_000);
    let [e1, e2, e3] = three_entities(&mut world);

    assert!(world.has::<Transform>(e1));

    world.destroy_entity(e2);
    assert!(world.remove::<Transform>(e3));

    let transforms: Vec<_> = world.query::<(Transform,)>().collect();
    assert_eq!(transforms, vec![e1]);

    // E3 keeps its other components
    assert!(world.has::<Shape>(e3));
    assert_eq!(world.get::<Renderable>(e3), Some(&Renderable { visible: true }));
    assert_eq!(world.query::<(Shape, Renderable)>().collect::<Vec<_>>(), vec![e3]);
}

#[test]
fn verify_generational_exclusivity() {
    let mut world = World::new(64);
    let [e1, e2, e3] = three_entities(&mut world);

    for id in [e1, e2, e3] {
        assert!(world.destroy_entity(id));

        assert!(world.get::<Transform>(id).is_none());
        assert!(world.get::<Shape>(id).is_none());
        assert!(world.get::<Renderable>(id).is_none());
        assert!(world.assign(id, Transform::at(9.0)).is_none());
        assert!(!world.has::<Transform>(id));
    }

    // Recycle every slot and give the new entities the same component types
    let fresh: Vec<_> = (0..3).map(|_| world.new_entity()).collect();
    for &id in &fresh {
        world.assign(id, Transform::at(5.0)).unwrap();
        world.assign_default::<Shape>(id).unwrap();
        world.assign_default::<Renderable>(id).unwrap();
    }

    for old in [e1, e2, e3] {
        assert!(world.get::<Transform>(old).is_none());
        assert!(world.get_mut::<Shape>(old).is_none());
        assert!(!world.remove::<Renderable>(old));
        assert!(!world.destroy_entity(old));
    }
    assert!(fresh.iter().all(|&id| world.has::<Renderable>(id)));
}

#[test]
fn verify_recycling_reuses_indices() {
    let mut world = World::new(16);
    let ids: Vec<_> = (0..5).map(|_| world.new_entity()).collect();

    for &destroyed in &ids {
        world.destroy_entity(destroyed);
        let recycled = world.new_entity();

        assert_eq!(recycled.index(), destroyed.index());
        assert_eq!(recycled.generation(), destroyed.generation() + 1);
    }

    // A fresh slot (generation 0) still sorts after the recycled ones
    let appended = world.new_entity();
    assert_eq!((appended.index(), appended.generation()), (5, 0));

    let in_query_order: Vec<_> = world.query::<()>().collect();
    let mut sorted = in_query_order.clone();
    sorted.reverse();
    sorted.sort();
    assert_eq!(sorted, in_query_order);
    assert_eq!(sorted.last(), Some(&appended));

    // Repeated cycles keep counting up
    let mut id = world.query::<()>().next().unwrap();
    for expected in 2..10 {
        world.destroy_entity(id);
        id = world.new_entity();
        assert_eq!(id.index(), 0);
        assert_eq!(id.generation(), expected);
    }
}

#[test]
fn verify_idempotent_re_iteration() {
    let mut world = World::new(256);
    for i in 0..200u32 {
        let id = world.new_entity();
        world.assign(id, Transform::at(i as f32)).unwrap();
        if i % 3 == 0 {
            world.assign_default::<Shape>(id).unwrap();
        }
        if i % 7 == 0 {
            world.destroy_entity(id);
        }
    }

    let query = Query::of::<(Transform, Shape)>();
    let first: Vec<_> = query.iter(&world).collect();
    let second: Vec<_> = query.iter(&world).collect();
    let third: Vec<_> = Query::all().with::<Shape>().with::<Transform>().iter(&world).collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(query.count(&world), first.len());
}

#[test]
fn verify_query_reflects_changes_between_runs() {
    let mut world = World::new(32);
    let [e1, e2, e3] = three_entities(&mut world);
    let query = Query::of::<(Shape,)>();

    assert_eq!(query.iter(&world).collect::<Vec<_>>(), vec![e2, e3]);

    world.assign_default::<Shape>(e1).unwrap();
    world.remove::<Shape>(e3);
    assert_eq!(query.iter(&world).collect::<Vec<_>>(), vec![e1, e2]);
}

#[test]
fn verify_empty_query_yields_all_live() {
    let mut world = World::new(32);
    let bare = world.new_entity();
    let [e1, e2, e3] = three_entities(&mut world);
    let doomed = world.new_entity();
    world.destroy_entity(doomed);

    let all: Vec<_> = Query::all().iter(&world).collect();
    assert_eq!(all, vec![bare, e1, e2, e3]);
    assert_eq!(world.query::<()>().count(), world.alive_count());
}

#[test]
fn verify_cursor_protocol_on_world() {
    let mut world = World::new(32);
    let [_, e2, e3] = three_entities(&mut world);

    let mut cursor = Query::of::<(Shape,)>().iter(&world);
    let mut seen = Vec::new();
    while cursor.has_next() {
        seen.push(cursor.current().unwrap());
        cursor.advance();
    }

    assert_eq!(seen, vec![e2, e3]);
    assert_eq!(cursor.position(), world.slot_count());
}

#[test]
fn verify_handles_are_plain_values() {
    let mut world = World::new(8);
    let id = world.new_entity();
    world.assign(id, Transform::at(1.0)).unwrap();

    let copy = EntityId::from_bits(id.to_bits());
    world.get_mut::<Transform>(copy).unwrap().scale = Vector { x: 2.0, y: 2.0, z: 2.0 };
    assert_eq!(world.get::<Transform>(id).unwrap().scale.x, 2.0);

    // Pod payloads can be viewed as raw bytes
    let bytes = bytemuck::bytes_of(world.get::<Transform>(id).unwrap());
    assert_eq!(bytes.len(), std::mem::size_of::<Transform>());
}
