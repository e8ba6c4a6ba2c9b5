//! # Component Pool
//!
//! Type-erased, fixed-stride storage for one component type.

// SAFETY: This module requires unsafe for the raw component arena.
// Every typed access checks the pool's `TypeId` and the slot's occupancy bit
// before touching memory.
#![allow(unsafe_code)]

//!
//! ## Layout
//!
//! ```text
//! index:     0        1        2        3
//! arena:  [ T      | ------ | T      | ------ | ... ]   stride = size_of::<T>()
//! occupied:  1        0        1        0
//! ```
//!
//! Slots are addressed directly by entity index, so the arena mirrors the
//! sparse pattern of entities that carry the component. The arena is sized
//! for the world's entity ceiling once and never reallocated.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::any::{type_name, TypeId};
use std::fmt;
use std::ptr::NonNull;

use super::component::{Component, ComponentId};

/// Drops the `T` stored at `ptr`.
///
/// # Safety
///
/// `ptr` must point to an initialized, properly aligned `T` that is not used
/// afterwards.
unsafe fn drop_erased<T>(ptr: *mut u8) {
    std::ptr::drop_in_place(ptr.cast::<T>());
}

/// Fixed-capacity arena for a single component type.
///
/// The pool owns raw memory plus an explicit per-slot occupancy bit, so it
/// knows which slots hold a constructed value. Values are dropped when they
/// are destroyed, overwritten, cleared, or when the pool itself is dropped.
pub struct ComponentPool {
    /// Id of the stored component type.
    component_id: ComponentId,
    /// Runtime type of the stored component.
    type_id: TypeId,
    /// Type name, for diagnostics.
    type_name: &'static str,
    /// Arena base pointer (dangling but aligned for zero-sized types).
    storage: NonNull<u8>,
    /// Layout of the arena allocation.
    layout: Layout,
    /// Bytes between consecutive slots.
    stride: usize,
    /// Number of slots.
    capacity: usize,
    /// Occupancy bitset: 1 = slot holds a value. 64 slots per word.
    occupied: Vec<u64>,
    /// Number of occupied slots.
    len: usize,
    /// Type-erased destructor, `None` for types without drop glue.
    drop_fn: Option<unsafe fn(*mut u8)>,
}

impl ComponentPool {
    /// Creates a pool for `T` with `capacity` slots.
    ///
    /// The arena is allocated but left uninitialized: no slot is occupied.
    ///
    /// # Panics
    ///
    /// Panics if `capacity * size_of::<T>()` overflows the address space.
    #[must_use]
    pub(crate) fn new<T: Component>(component_id: ComponentId, capacity: usize) -> Self {
        let layout = Layout::array::<T>(capacity).expect("component pool layout overflow");

        let storage = if layout.size() == 0 {
            NonNull::<T>::dangling().cast::<u8>()
        } else {
            // SAFETY: layout has a non-zero size
            let ptr = unsafe { alloc(layout) };
            match NonNull::new(ptr) {
                Some(ptr) => ptr,
                None => handle_alloc_error(layout),
            }
        };

        let drop_fn: Option<unsafe fn(*mut u8)> = if std::mem::needs_drop::<T>() {
            Some(drop_erased::<T>)
        } else {
            None
        };

        Self {
            component_id,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            storage,
            layout,
            stride: std::mem::size_of::<T>(),
            capacity,
            occupied: vec![0u64; capacity.div_ceil(64)],
            len: 0,
            drop_fn,
        }
    }

    /// Returns the id of the stored component type.
    #[inline]
    #[must_use]
    pub const fn component_id(&self) -> ComponentId {
        self.component_id
    }

    /// Returns the name of the stored component type.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the per-slot stride in bytes.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks if this pool stores values of type `T`.
    #[inline]
    #[must_use]
    pub fn holds<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Checks if the slot at `index` holds a value.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        (self.occupied[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Iterates over occupied slot indices in ascending order.
    pub fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| {
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let bit = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(word_idx * 64 + bit)
                })
            })
    }

    /// Constructs `value` in the slot at `index`.
    ///
    /// A value already stored there is dropped first.
    ///
    /// # Returns
    ///
    /// The stored value, or `None` if `index` is out of bounds or `T` is not
    /// this pool's type (the value is dropped in that case).
    pub(crate) fn construct<T: Component>(&mut self, index: usize, value: T) -> Option<&mut T> {
        if !self.holds::<T>() || index >= self.capacity {
            return None;
        }

        self.destroy(index);

        // SAFETY: index < capacity and the slot is unoccupied; the arena is
        // aligned for T and the stride is size_of::<T>()
        let slot = unsafe {
            let slot = self.slot_ptr(index).cast::<T>();
            slot.write(value);
            slot
        };
        self.occupied[index / 64] |= 1 << (index % 64);
        self.len += 1;

        // SAFETY: the slot was just initialized and is borrowed through &mut self
        Some(unsafe { &mut *slot })
    }

    /// Constructs the value returned by `init` in the slot at `index`.
    ///
    /// `init` is not called when the slot cannot be written.
    pub(crate) fn construct_with<T, F>(&mut self, index: usize, init: F) -> Option<&mut T>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        if !self.holds::<T>() || index >= self.capacity {
            return None;
        }
        self.construct(index, init())
    }

    /// Gets the value at `index`.
    ///
    /// # Returns
    ///
    /// `None` if the slot is unoccupied, out of bounds, or `T` is not this
    /// pool's type.
    #[inline]
    #[must_use]
    pub(crate) fn get<T: Component>(&self, index: usize) -> Option<&T> {
        if !self.holds::<T>() || !self.is_occupied(index) {
            return None;
        }

        // SAFETY: the slot is occupied by an initialized T
        Some(unsafe { &*self.slot_ptr(index).cast::<T>() })
    }

    /// Gets the value at `index` mutably.
    #[inline]
    pub(crate) fn get_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
        if !self.holds::<T>() || !self.is_occupied(index) {
            return None;
        }

        // SAFETY: the slot is occupied by an initialized T, borrowed through &mut self
        Some(unsafe { &mut *self.slot_ptr(index).cast::<T>() })
    }

    /// Drops the value at `index` and marks the slot unoccupied.
    ///
    /// # Returns
    ///
    /// `true` if a value was dropped.
    pub(crate) fn destroy(&mut self, index: usize) -> bool {
        if !self.is_occupied(index) {
            return false;
        }

        // Clear first so a panicking destructor cannot cause a double drop
        self.occupied[index / 64] &= !(1 << (index % 64));
        self.len -= 1;

        if let Some(drop_fn) = self.drop_fn {
            // SAFETY: the slot held an initialized value of the pool's type,
            // and it is no longer reachable
            unsafe { drop_fn(self.slot_ptr(index)) };
        }

        true
    }

    /// Drops every stored value. The arena is kept.
    pub(crate) fn clear(&mut self) {
        if self.drop_fn.is_none() {
            self.occupied.fill(0);
            self.len = 0;
            return;
        }

        let occupied: Vec<usize> = self.occupied_indices().collect();
        for index in occupied {
            self.destroy(index);
        }
    }

    /// Pointer to the first byte of the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be < capacity.
    #[inline]
    unsafe fn slot_ptr(&self, index: usize) -> *mut u8 {
        self.storage.as_ptr().add(index * self.stride)
    }
}

impl Drop for ComponentPool {
    fn drop(&mut self) {
        self.clear();

        if self.layout.size() > 0 {
            // SAFETY: the arena was allocated in `new` with this layout
            unsafe {
                dealloc(self.storage.as_ptr(), self.layout);
            }
        }
    }
}

impl fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("component_id", &self.component_id)
            .field("type_name", &self.type_name)
            .field("stride", &self.stride)
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

// SAFETY: pools are only created for `Component` types, which are Send + Sync,
// and the arena is owned exclusively by the pool
unsafe impl Send for ComponentPool {}
// SAFETY: shared access only hands out `&T` for Sync component types
unsafe impl Sync for ComponentPool {}
