//! Catalog of introspected type descriptors.

use std::collections::BTreeMap;

use super::{Oid, TypeDescriptor, TypeKind};
use crate::error::{Error, Result};

/// Immutable-after-load map from type id to descriptor.
///
/// Iteration is in id order so that everything derived from a catalog is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<Oid, TypeDescriptor>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors, validating each one.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Result<Self> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    /// Add a descriptor (builder form).
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Result<Self> {
        self.insert(descriptor)?;
        Ok(self)
    }

    /// Add a descriptor.
    ///
    /// Fails if the descriptor is missing a kind-specific child or its id is
    /// already taken.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        descriptor.validate()?;
        if let Some(existing) = self.types.get(&descriptor.id) {
            return Err(Error::Configuration(format!(
                "type id {} is used by both {} and {}",
                descriptor.id,
                existing.display_name(),
                descriptor.display_name()
            )));
        }
        self.types.insert(descriptor.id, descriptor);
        Ok(())
    }

    /// Look up a descriptor.
    pub fn get(&self, id: Oid) -> Option<&TypeDescriptor> {
        self.types.get(&id)
    }

    /// Look up a descriptor that `referenced_by` depends on.
    pub fn require(&self, id: Oid, referenced_by: Option<&TypeDescriptor>) -> Result<&TypeDescriptor> {
        self.types.get(&id).ok_or_else(|| Error::MissingDescriptor {
            id,
            referenced_by: referenced_by
                .map(TypeDescriptor::display_name)
                .unwrap_or_else(|| "the caller".to_string()),
        })
    }

    /// Find a descriptor by namespace and name.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&TypeDescriptor> {
        self.types
            .values()
            .find(|d| d.namespace == namespace && d.name == name)
    }

    /// All descriptors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Composite descriptors in id order.
    pub fn composites(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.iter().filter(|d| d.kind == TypeKind::Composite)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
