//! # World Configuration
//!
//! Capacity planning knobs for a [`World`](crate::World).
//!
//! The component type ceiling is fixed by the mask width and cannot be
//! configured. The entity ceiling is chosen per world: it sizes every
//! component pool, so it is read once at construction and never changes.
//!
//! ```toml
//! max_entities = 250000
//! initial_entities = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Maximum number of distinct component types per process.
///
/// Bounded by the width of [`ComponentMask`](crate::ComponentMask).
pub const MAX_COMPONENTS: usize = 64;

/// Default maximum number of entities per world.
pub const MAX_ENTITIES: usize = 1_000_000;

/// Largest entity ceiling a world accepts.
///
/// The top `u32` index is reserved as the "free slot" sentinel.
pub const MAX_ENTITY_CEILING: usize = u32::MAX as usize - 1;

/// Construction-time configuration of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Maximum number of entity slots. Also the capacity of every component pool.
    pub max_entities: usize,
    /// Number of entity slots to reserve up front.
    pub initial_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: MAX_ENTITIES,
            initial_entities: 0,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration with the given entity ceiling.
    #[must_use]
    pub const fn new(max_entities: usize) -> Self {
        Self {
            max_entities,
            initial_entities: 0,
        }
    }

    /// Sets the number of entity slots reserved at construction.
    #[must_use]
    pub const fn with_initial_entities(mut self, initial_entities: usize) -> Self {
        self.initial_entities = initial_entities;
        self
    }

    /// Checks that the configuration describes a world that can be built.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_entities` is zero or above
    /// [`MAX_ENTITY_CEILING`], or if `initial_entities` exceeds `max_entities`.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".into(),
            ));
        }
        if self.max_entities > MAX_ENTITY_CEILING {
            return Err(EcsError::InvalidConfig(format!(
                "max_entities {} exceeds the ceiling of {MAX_ENTITY_CEILING}",
                self.max_entities
            )));
        }
        if self.initial_entities > self.max_entities {
            return Err(EcsError::InvalidConfig(format!(
                "initial_entities {} exceeds max_entities {}",
                self.initial_entities, self.max_entities
            )));
        }
        Ok(())
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML, unknown keys or
    /// values rejected by [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or its
    /// contents are rejected by [`WorldConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EcsError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}
