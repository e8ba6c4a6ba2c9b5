//! # Component Types
//!
//! Components are plain data attached to entities. Any `Send + Sync + 'static`
//! type qualifies; there is nothing to implement.
//!
//! Each component type gets a small integer id the first time it is used,
//! process-wide. The id is both the bit position in every [`ComponentMask`]
//! and the index of the type's pool inside a world. Ids are handed out in
//! first-use order and never reused, so at most [`MAX_COMPONENTS`] distinct
//! types can be used by one process.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::config::MAX_COMPONENTS;
use crate::error::{EcsError, EcsResult};

/// Small integer identifying a component type (0-63).
pub type ComponentId = u8;

/// Marker trait for ECS components.
///
/// Blanket-implemented for every `Send + Sync + 'static` type.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
///
/// let id = component_id::<Position>();
/// ```
pub trait Component: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Component for T {}

// ============================================================================
// COMPONENT MASK
// ============================================================================

/// Fixed-width bit set of component ids.
///
/// Bit `i` is set when the component type with id `i` is present.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// Creates a mask with no bits set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a mask from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Checks if `id` has a bit in the mask.
    #[inline]
    #[must_use]
    pub const fn in_range(id: ComponentId) -> bool {
        (id as usize) < MAX_COMPONENTS
    }

    /// Returns a copy of this mask with `id` set.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENTS`].
    #[inline]
    #[must_use]
    pub const fn with(self, id: ComponentId) -> Self {
        assert!(Self::in_range(id), "component id out of mask range");
        Self(self.0 | (1 << id))
    }

    /// Returns a copy of this mask with `id` set, or `None` if `id` is not
    /// below [`MAX_COMPONENTS`].
    #[inline]
    #[must_use]
    pub const fn checked_with(self, id: ComponentId) -> Option<Self> {
        if Self::in_range(id) {
            Some(Self(self.0 | (1 << id)))
        } else {
            None
        }
    }

    /// Sets the bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENTS`].
    #[inline]
    pub fn insert(&mut self, id: ComponentId) {
        *self = self.with(id);
    }

    /// Clears the bit for `id`. Ids outside the mask are ignored.
    #[inline]
    pub fn remove(&mut self, id: ComponentId) {
        if Self::in_range(id) {
            self.0 &= !(1 << id);
        }
    }

    /// Checks if the bit for `id` is set. Ids outside the mask are never set.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentId) -> bool {
        Self::in_range(id) && (self.0 >> id) & 1 == 1
    }

    /// Checks if every bit of `other` is also set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns the number of bits set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the set ids in ascending order.
    #[inline]
    pub fn iter(self) -> impl Iterator<Item = ComponentId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            // Lowest set bit first
            let id = bits.trailing_zeros() as ComponentId;
            bits &= bits - 1;
            Some(id)
        })
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// # Panics
///
/// Panics if an id is not below [`MAX_COMPONENTS`].
impl FromIterator<ComponentId> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

// ============================================================================
// TYPE REGISTRY
// ============================================================================

/// Metadata recorded for each registered component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Assigned component id.
    pub id: ComponentId,
    /// Rust type name, for diagnostics.
    pub name: &'static str,
    /// Size of the type in bytes. This is the pool stride.
    pub size: usize,
    /// Alignment of the type in bytes.
    pub align: usize,
    /// Runtime type id.
    pub type_id: TypeId,
}

impl ComponentInfo {
    fn of<T: Component>(id: ComponentId) -> Self {
        Self {
            id,
            name: type_name::<T>(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Mapping between Rust component types and compact ids.
///
/// ## Invariants
/// - Every entry in `by_type` has a matching `by_id[id]`.
/// - `by_id.len()` never exceeds `MAX_COMPONENTS`.
struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    by_id: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    fn new() -> Self {
        Self {
            by_type: HashMap::with_capacity(MAX_COMPONENTS),
            by_id: Vec::with_capacity(MAX_COMPONENTS),
        }
    }

    fn get<T: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the id of `T`, assigning the next free id on first use.
    fn register<T: Component>(&mut self) -> EcsResult<ComponentId> {
        if let Some(id) = self.get::<T>() {
            return Ok(id);
        }

        if self.by_id.len() >= MAX_COMPONENTS {
            return Err(EcsError::ComponentLimit {
                limit: MAX_COMPONENTS,
            });
        }

        // Bounded by MAX_COMPONENTS (64), always fits
        #[allow(clippy::cast_possible_truncation)]
        let id = self.by_id.len() as ComponentId;
        let info = ComponentInfo::of::<T>(id);
        self.by_type.insert(info.type_id, id);
        self.by_id.push(info);

        tracing::debug!(
            component = info.name,
            id,
            size = info.size,
            align = info.align,
            "registered component type"
        );

        Ok(id)
    }
}

static REGISTRY: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<ComponentRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(ComponentRegistry::new()))
}

/// Returns the id of component type `T`, assigning one on first use.
///
/// # Errors
///
/// Returns [`EcsError::ComponentLimit`] if `T` is new and [`MAX_COMPONENTS`]
/// types are already registered.
pub fn try_component_id<T: Component>() -> EcsResult<ComponentId> {
    let registry = registry();

    // Fast path: already registered
    if let Some(id) = registry.read().get::<T>() {
        return Ok(id);
    }

    registry.write().register::<T>()
}

/// Returns the id of component type `T`, assigning one on first use.
///
/// # Panics
///
/// Panics if `T` is new and [`MAX_COMPONENTS`] types are already registered.
#[must_use]
pub fn component_id<T: Component>() -> ComponentId {
    match try_component_id::<T>() {
        Ok(id) => id,
        Err(err) => panic!("cannot register {}: {err}", type_name::<T>()),
    }
}

/// Returns the id of component type `T` if it has been used before.
///
/// Never assigns an id.
#[must_use]
pub fn lookup_component_id<T: Component>() -> Option<ComponentId> {
    registry().read().get::<T>()
}

/// Returns the metadata of the component type with the given id.
#[must_use]
pub fn component_info(id: ComponentId) -> Option<ComponentInfo> {
    registry().read().by_id.get(usize::from(id)).copied()
}

/// Returns the metadata of every registered component type, in id order.
#[must_use]
pub fn registered_components() -> Vec<ComponentInfo> {
    registry().read().by_id.clone()
}
