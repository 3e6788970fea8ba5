//! Type catalog consumed from introspection.
//!
//! Descriptors are read-only inputs: the bridge looks types up by id and never
//! mutates them.

mod builtins;
mod catalog;
mod descriptor;

pub use builtins::{builtin_types, oids};
pub use catalog::TypeCatalog;
pub use descriptor::{category, Attribute, Oid, QualifiedName, TypeDescriptor, TypeKind};
