//! Name derivation for schema types, fields, and enum members.

use std::fmt;

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToUpperCamelCase};

use crate::catalog::TypeDescriptor;

/// Deterministic name derivation used while building the schema.
///
/// Every method has a default except the type name of a database type, so a
/// host can override a single rule.
pub trait Naming: Send + Sync + fmt::Debug {
    /// Schema name for a database type.
    fn type_name(&self, descriptor: &TypeDescriptor) -> String;

    /// Member name for an already escaped enum label.
    fn enum_value_name(&self, escaped: &str) -> String {
        let core = escaped.trim_matches('_');
        if core.is_empty() {
            return escaped.to_string();
        }
        let start = escaped.len() - escaped.trim_start_matches('_').len();
        let end = escaped.len() - escaped.trim_end_matches('_').len();
        format!(
            "{}{}{}",
            &escaped[..start],
            core.to_shouty_snake_case(),
            &escaped[escaped.len() - end..]
        )
    }

    /// Input counterpart of an output type.
    fn input_type(&self, type_name: &str) -> String {
        format!("{}Input", type_name)
    }

    /// Bound object of ranges over `sub_type`.
    fn range_bound_type(&self, sub_type: &str) -> String {
        format!("{}RangeBound", sub_type)
    }

    /// Input counterpart of [`Naming::range_bound_type`].
    fn range_bound_input_type(&self, sub_type: &str) -> String {
        self.input_type(&self.range_bound_type(sub_type))
    }

    /// Range object over `sub_type`.
    fn range_type(&self, sub_type: &str) -> String {
        format!("{}Range", sub_type)
    }

    /// Input counterpart of [`Naming::range_type`].
    fn range_input_type(&self, sub_type: &str) -> String {
        self.input_type(&self.range_type(sub_type))
    }

    /// Object type for a table (composite) type.
    fn table_type(&self, descriptor: &TypeDescriptor) -> String {
        self.type_name(descriptor)
    }

    /// Field name for a table column.
    fn column_field(&self, column: &str) -> String {
        column.to_lower_camel_case()
    }
}

/// Default naming: `UpperCamelCase` types, `lowerCamelCase` fields,
/// `SHOUTY_SNAKE_CASE` enum members.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inflection;

impl Naming for Inflection {
    fn type_name(&self, descriptor: &TypeDescriptor) -> String {
        descriptor.name.to_upper_camel_case()
    }
}
