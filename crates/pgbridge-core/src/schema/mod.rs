//! Schema type model.
//!
//! Types are shared through [`TypeRef`] handles. Objects get their fields
//! after registration, which lets a table type reference itself. The standard
//! scalars live in [`StandardScalars`] and [`print_types`] renders SDL.

mod printer;
mod scalars;
mod types;

pub use printer::print_types;
pub use scalars::StandardScalars;
pub use types::{
    AliasType, EnumType, EnumValue, Field, FieldResolver, InputField, InputObjectType, ObjectType,
    ScalarKind, ScalarType, SchemaType, TypeRef,
};
