//! Write-once registries filled during type resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::Oid;
use crate::codec::Codec;
use crate::schema::TypeRef;

/// Output type and optional input type resolved for one type id.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub output: TypeRef,
    pub input: Option<TypeRef>,
}

impl TypeEntry {
    /// An entry whose output and input are the same type.
    pub(crate) fn scalar(ty: &TypeRef) -> Self {
        TypeEntry {
            output: Arc::clone(ty),
            input: Some(Arc::clone(ty)),
        }
    }

    /// Check if both entries hold the same type instances.
    pub fn same(&self, other: &TypeEntry) -> bool {
        Arc::ptr_eq(&self.output, &other.output)
            && match (&self.input, &other.input) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Type id to resolved schema types. Entries are never replaced.
#[derive(Debug, Clone, Default)]
pub struct SchemaTypeRegistry {
    entries: BTreeMap<Oid, TypeEntry>,
}

impl SchemaTypeRegistry {
    /// Store `entry` unless `id` already has one; returns the stored entry.
    pub(crate) fn insert(&mut self, id: Oid, entry: TypeEntry) -> TypeEntry {
        self.entries.entry(id).or_insert(entry).clone()
    }

    pub fn get(&self, id: Oid) -> Option<&TypeEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: Oid) -> bool {
        self.entries.contains_key(&id)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Oid, &TypeEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Type id to codec. A missing entry means identity passthrough.
#[derive(Debug, Clone, Default)]
pub struct ConversionRegistry {
    codecs: BTreeMap<Oid, Codec>,
}

impl ConversionRegistry {
    /// Store `codec` unless `id` already has one.
    pub(crate) fn insert(&mut self, id: Oid, codec: Codec) {
        self.codecs.entry(id).or_insert(codec);
    }

    pub fn get(&self, id: Oid) -> Option<&Codec> {
        self.codecs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

/// An explicit mapping for one type id, taking precedence over every
/// resolution rule.
#[derive(Debug, Clone)]
pub struct TypeOverride {
    pub output: TypeRef,
    pub input: Option<TypeRef>,
    pub codec: Option<Codec>,
}

impl TypeOverride {
    /// Map to `output`, with no input type and identity conversion.
    pub fn new(output: TypeRef) -> Self {
        Self {
            output,
            input: None,
            codec: None,
        }
    }

    /// Map to a type usable both as output and input (scalars, enums).
    pub fn both(ty: TypeRef) -> Self {
        Self {
            input: Some(Arc::clone(&ty)),
            output: ty,
            codec: None,
        }
    }

    /// Set the input type.
    pub fn with_input(mut self, input: TypeRef) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the codec.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = Some(codec);
        self
    }
}

/// What to do when an override for the same id is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Fail with a configuration error.
    Fail,
    /// Keep the existing override and drop the new one.
    Yield,
}
