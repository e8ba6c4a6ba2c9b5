//! # Entity Identity
//!
//! Entities are lightweight handles consisting of:
//! - A slot index into the entity table and every component pool
//! - A generation counter for safe slot reuse

use std::cmp::Ordering;
use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::component::ComponentMask;

/// Handle to an entity.
///
/// The handle is split into two parts:
/// - Lower 32 bits: Slot index
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// Handles are plain values. Copying one does not copy entity state.
///
/// Handles order by slot index, then generation, which is the order queries
/// yield them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Slot index marking a free (destroyed) slot.
    pub const INVALID_INDEX: u32 = u32::MAX;

    /// The invalid handle.
    pub const INVALID: Self = Self::new(Self::INVALID_INDEX, 0);

    /// Creates a handle from a slot index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-2, 2^32-1 is the sentinel)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks whether the index is not the free-slot sentinel.
    ///
    /// This says nothing about freshness: a valid handle may still refer to a
    /// slot that has since been recycled. Use [`World::is_alive`] for that.
    ///
    /// [`World::is_alive`]: crate::World::is_alive
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index() != Self::INVALID_INDEX
    }

    /// Returns the raw 64-bit encoding.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from its raw 64-bit encoding.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the handle the same slot gets after this one is destroyed:
    /// sentinel index, next generation.
    #[inline]
    #[must_use]
    pub(crate) const fn retired(self) -> Self {
        Self::new(Self::INVALID_INDEX, self.generation().wrapping_add(1))
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index()
            .cmp(&other.index())
            .then_with(|| self.generation().cmp(&other.generation()))
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}v{}", self.index(), self.generation())
        } else {
            f.write_str("invalid")
        }
    }
}

/// One row of the entity table.
///
/// Holds the slot's current handle (sentinel index while the slot is free)
/// and the mask of component types attached to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySlot {
    /// Current handle for this slot.
    pub id: EntityId,
    /// Component types currently attached.
    pub mask: ComponentMask,
}

impl EntitySlot {
    /// Creates a live slot with no components.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: ComponentMask::empty(),
        }
    }

    /// Checks if this slot currently holds a live entity.
    #[inline]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.id.is_valid()
    }
}
