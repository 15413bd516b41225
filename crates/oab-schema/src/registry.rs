//! # Converter Registry
//!
//! Maps a kind to the converter that handles it. Lookup walks the value's
//! lineage from most to least specific and returns the first hit, so a
//! converter for a parent kind also serves every descendant that has no
//! converter of its own.
//!
//! Registration is strict: a second converter for an already registered
//! kind is rejected rather than silently replacing the first.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::converters::{register_default_converters, Converter};
use crate::error::{BuildError, RegistryError};
use crate::fields::{KindId, SchemaValue};

/// Kind → converter table.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<KindId, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the full built-in converter set.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in set itself contains a duplicate kind.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        register_default_converters(&mut registry)?;
        Ok(registry)
    }

    /// Register `converter` under the kind it declares.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateConverter`] if the kind already
    /// has a converter.
    pub fn register(&mut self, converter: impl Converter + 'static) -> Result<(), RegistryError> {
        let kind = converter.converts();
        if self.converters.contains_key(&kind) {
            return Err(RegistryError::DuplicateConverter { kind });
        }
        tracing::trace!(%kind, "registered converter");
        self.converters.insert(kind, Arc::new(converter));
        Ok(())
    }

    /// The converter for the most specific kind in `value`'s lineage.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoConverterFound`] when no kind in the lineage
    /// is registered.
    pub fn lookup(&self, value: &dyn SchemaValue) -> Result<Arc<dyn Converter>, BuildError> {
        value
            .lineage()
            .iter()
            .find_map(|kind| self.converters.get(kind))
            .cloned()
            .ok_or(BuildError::NoConverterFound { kind: value.kind() })
    }

    /// The converter registered for exactly `kind`.
    pub fn get(&self, kind: KindId) -> Option<Arc<dyn Converter>> {
        self.converters.get(&kind).cloned()
    }

    /// Registered kinds, sorted by name.
    pub fn kinds(&self) -> Vec<KindId> {
        let mut kinds: Vec<KindId> = self.converters.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
