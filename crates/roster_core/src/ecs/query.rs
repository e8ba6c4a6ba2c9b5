//! # Masked Queries
//!
//! A [`Query`] is a set of required component types. Running it against a
//! [`World`] yields, in ascending slot order, the handle of every live entity
//! whose mask contains all of them.
//!
//! ```rust,ignore
//! for entity in Query::of::<(Transform, Shape)>().iter(&world) {
//!     let transform = world.get::<Transform>(entity);
//! }
//! ```
//!
//! Building the mask and scanning the table are separate steps: a `Query`
//! is a small `Copy` value that can be kept and re-run, and every call to
//! [`Query::iter`] starts a fresh scan that reflects the current state of
//! the world. The iterator borrows the world, so the world cannot be mutated
//! while a traversal is in progress.

use std::iter::FusedIterator;

use super::component::{component_id, Component, ComponentId, ComponentMask};
use super::entity::{EntityId, EntitySlot};
use super::world::World;
use crate::config::MAX_COMPONENTS;
use crate::error::{EcsError, EcsResult};

/// A set of component types, expressed as a tuple.
///
/// Implemented for `()` (no requirement) and tuples of one to eight
/// component types. Use `(T,)` for a single type.
pub trait ComponentSet {
    /// Whether the set has no members.
    const IS_EMPTY: bool;

    /// Returns the mask of the set's component ids, registering new types.
    fn mask() -> ComponentMask;
}

impl ComponentSet for () {
    const IS_EMPTY: bool = true;

    #[inline]
    fn mask() -> ComponentMask {
        ComponentMask::empty()
    }
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            const IS_EMPTY: bool = false;

            #[inline]
            fn mask() -> ComponentMask {
                ComponentMask::empty()$(.with(component_id::<$name>()))+
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Required component types for a scan over the entity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    /// Component ids every match must carry.
    mask: ComponentMask,
    /// Match every live entity, regardless of its components.
    match_all: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl Query {
    /// A query matching every live entity.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            mask: ComponentMask::empty(),
            match_all: true,
        }
    }

    /// A query requiring every type of the set `S`.
    ///
    /// `Query::of::<()>()` is the same as [`Query::all`].
    #[must_use]
    pub fn of<S: ComponentSet>() -> Self {
        if S::IS_EMPTY {
            Self::all()
        } else {
            Self::from_mask(S::mask())
        }
    }

    /// A query requiring the component ids in `mask`.
    #[inline]
    #[must_use]
    pub const fn from_mask(mask: ComponentMask) -> Self {
        Self {
            mask,
            match_all: false,
        }
    }

    /// Adds `T` to the required types.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        Self::from_mask(self.mask.with(component_id::<T>()))
    }

    /// Adds the component id `id` to the required types.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentLimit`] if `id` is not below
    /// [`MAX_COMPONENTS`].
    #[inline]
    pub fn with_id(self, id: ComponentId) -> EcsResult<Self> {
        match self.mask.checked_with(id) {
            Some(mask) => Ok(Self::from_mask(mask)),
            None => Err(EcsError::ComponentLimit {
                limit: MAX_COMPONENTS,
            }),
        }
    }

    /// Returns the required component mask.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Checks if this query matches every live entity.
    #[inline]
    #[must_use]
    pub const fn is_match_all(&self) -> bool {
        self.match_all
    }

    /// Checks if a slot qualifies: it must hold a live entity, and carry
    /// every required component.
    #[inline]
    #[must_use]
    pub const fn matches(&self, slot: &EntitySlot) -> bool {
        slot.id.is_valid() && (self.match_all || slot.mask.contains_all(self.mask))
    }

    /// Starts a fresh scan of `world`.
    #[inline]
    #[must_use]
    pub fn iter<'w>(&self, world: &'w World) -> QueryIter<'w> {
        QueryIter::new(*self, world.all_slots())
    }

    /// Counts the entities of `world` matching this query.
    #[must_use]
    pub fn count(&self, world: &World) -> usize {
        world
            .all_slots()
            .iter()
            .filter(|slot| self.matches(slot))
            .count()
    }
}

/// Cursor over the entities matching a [`Query`].
///
/// Positioned on the first match when created. [`QueryIter::current`],
/// [`QueryIter::advance`] and [`QueryIter::has_next`] expose the cursor
/// directly; the [`Iterator`] implementation is built on them.
#[derive(Clone, Debug)]
pub struct QueryIter<'w> {
    query: Query,
    slots: &'w [EntitySlot],
    /// Index of the current match, `slots.len()` once exhausted.
    index: usize,
}

impl<'w> QueryIter<'w> {
    fn new(query: Query, slots: &'w [EntitySlot]) -> Self {
        let mut iter = Self {
            query,
            slots,
            index: 0,
        };
        iter.seek();
        iter
    }

    /// Moves forward to the first qualifying slot at or after `index`.
    #[inline]
    fn seek(&mut self) {
        while self.index < self.slots.len() && !self.query.matches(&self.slots[self.index]) {
            self.index += 1;
        }
    }

    /// Checks if the cursor is on a match.
    #[inline]
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index < self.slots.len()
    }

    /// Returns the handle stored at the current match.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<EntityId> {
        self.slots.get(self.index).map(|slot| slot.id)
    }

    /// Moves to the next match, or to the end.
    #[inline]
    pub fn advance(&mut self) {
        if self.has_next() {
            self.index += 1;
            self.seek();
        }
    }

    /// Returns the slot index of the cursor (the table length at the end).
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.index
    }

    /// Returns the query being run.
    #[inline]
    #[must_use]
    pub const fn query(&self) -> Query {
        self.query
    }
}

impl Iterator for QueryIter<'_> {
    type Item = EntityId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current()?;
        self.advance();
        Some(id)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.slots.len() - self.index;
        (usize::from(remaining > 0), Some(remaining))
    }
}

impl FusedIterator for QueryIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct Alpha;
    #[allow(dead_code)]
    struct Beta;

    fn slot(index: u32, mask: ComponentMask) -> EntitySlot {
        EntitySlot {
            id: EntityId::new(index, 0),
            mask,
        }
    }

    #[test]
    fn test_empty_set_matches_all() {
        let query = Query::of::<()>();
        assert!(query.is_match_all());
        assert_eq!(query, Query::all());
        assert_eq!(query, Query::default());
    }

    #[test]
    fn test_mask_from_set() {
        let alpha = component_id::<Alpha>();
        let beta = component_id::<Beta>();

        let query = Query::of::<(Alpha, Beta)>();
        assert!(!query.is_match_all());
        assert_eq!(query.mask(), ComponentMask::empty().with(alpha).with(beta));
        assert_eq!(Query::all().with::<Alpha>().with::<Beta>(), query);
    }

    #[test]
    fn test_with_id_rejects_out_of_range() {
        let query = Query::all().with_id(3).unwrap().with_id(63).unwrap();
        assert_eq!(query.mask(), ComponentMask::from_bits((1 << 3) | (1 << 63)));

        for id in [64, 65, 200, ComponentId::MAX] {
            assert_eq!(
                query.with_id(id),
                Err(EcsError::ComponentLimit { limit: MAX_COMPONENTS })
            );
        }
    }

    #[test]
    fn test_matches() {
        let query = Query::from_mask(ComponentMask::empty().with(1).with(2));

        assert!(query.matches(&slot(0, ComponentMask::from_bits(0b110))));
        assert!(query.matches(&slot(0, ComponentMask::from_bits(0b111))));
        assert!(!query.matches(&slot(0, ComponentMask::from_bits(0b010))));

        // A freed slot never matches, whatever its mask says
        let mut dead = slot(0, ComponentMask::from_bits(0b110));
        dead.id = EntityId::new(EntityId::INVALID_INDEX, 1);
        assert!(!query.matches(&dead));
        assert!(!Query::all().matches(&dead));

        // Match-all accepts entities without components
        assert!(Query::all().matches(&slot(0, ComponentMask::empty())));
    }

    #[test]
    fn test_cursor_protocol() {
        let slots = [
            slot(0, ComponentMask::from_bits(0b01)),
            slot(1, ComponentMask::from_bits(0b11)),
            slot(2, ComponentMask::from_bits(0b10)),
            slot(3, ComponentMask::from_bits(0b11)),
        ];
        let query = Query::from_mask(ComponentMask::from_bits(0b11));

        let mut iter = QueryIter::new(query, &slots);
        assert_eq!(iter.position(), 1);
        assert_eq!(iter.current(), Some(EntityId::new(1, 0)));

        iter.advance();
        assert_eq!(iter.position(), 3);
        assert!(iter.has_next());

        iter.advance();
        assert!(!iter.has_next());
        assert_eq!(iter.position(), slots.len());
        assert_eq!(iter.current(), None);

        // Advancing past the end stays at the end
        iter.advance();
        assert_eq!(iter.position(), slots.len());
    }

    #[test]
    fn test_iterator_over_slots() {
        let slots = [
            slot(0, ComponentMask::empty()),
            slot(1, ComponentMask::from_bits(0b1)),
        ];

        let all: Vec<_> = QueryIter::new(Query::all(), &slots).collect();
        assert_eq!(all, vec![EntityId::new(0, 0), EntityId::new(1, 0)]);

        let some: Vec<_> = QueryIter::new(Query::from_mask(ComponentMask::from_bits(0b1)), &slots)
            .collect();
        assert_eq!(some, vec![EntityId::new(1, 0)]);

        let mut none = QueryIter::new(Query::from_mask(ComponentMask::from_bits(0b10)), &[]);
        assert_eq!(none.size_hint(), (0, Some(0)));
        assert_eq!(none.next(), None);
    }
}
