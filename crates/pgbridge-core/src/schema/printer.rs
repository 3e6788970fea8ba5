//! SDL rendering of schema types.

use std::fmt::Write;

use super::{SchemaType, TypeRef};

/// Render named types as SDL, sorted by name.
///
/// Aliases render as scalars named after the alias. Unnamed wrapper types are
/// skipped; they appear inline where they are used.
pub fn print_types<'a>(types: impl IntoIterator<Item = &'a TypeRef>) -> String {
    let mut named: Vec<&TypeRef> = types.into_iter().filter(|t| t.name().is_some()).collect();
    named.sort_by(|a, b| a.name().cmp(&b.name()));

    let mut out = String::new();
    for (i, ty) in named.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_type(&mut out, ty);
    }
    out
}

fn print_description(out: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let _ = writeln!(out, "{indent}\"\"\"{}\"\"\"", description.replace("\"\"\"", "\\\"\"\""));
    }
}

fn print_type(out: &mut String, ty: &SchemaType) {
    print_description(out, ty.description(), "");
    match ty {
        SchemaType::Scalar(scalar) => {
            let _ = writeln!(out, "scalar {}", scalar.name);
        }
        SchemaType::Alias(alias) => {
            let _ = writeln!(out, "scalar {}", alias.name);
        }
        SchemaType::Enum(enumeration) => {
            let _ = writeln!(out, "enum {} {{", enumeration.name);
            for value in &enumeration.values {
                let _ = writeln!(out, "  {}", value.name);
            }
            out.push_str("}\n");
        }
        SchemaType::Object(object) => {
            let _ = writeln!(out, "type {} {{", object.name);
            for field in object.fields() {
                print_description(out, field.description.as_deref(), "  ");
                let _ = writeln!(out, "  {}: {}", field.name, field.ty);
            }
            out.push_str("}\n");
        }
        SchemaType::InputObject(object) => {
            let _ = writeln!(out, "input {} {{", object.name);
            for field in object.fields() {
                print_description(out, field.description.as_deref(), "  ");
                let _ = writeln!(out, "  {}: {}", field.name, field.ty);
            }
            out.push_str("}\n");
        }
        SchemaType::List(_) | SchemaType::NonNull(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumType, EnumValue, Field, ObjectType};
    use std::sync::Arc;

    #[test]
    fn test_print_sorted_sdl() {
        let status = Arc::new(SchemaType::Enum(EnumType {
            name: "Status".into(),
            description: None,
            values: vec![EnumValue {
                name: "ACTIVE".into(),
                value: "active".into(),
            }],
        }));
        let user = Arc::new(SchemaType::Object(ObjectType::with_fields(
            "User",
            Some("A user.".into()),
            vec![Field::property("status", SchemaType::non_null(Arc::clone(&status)))],
        )));

        let sdl = print_types([&user, &status]);
        assert_eq!(
            sdl,
            "enum Status {\n  ACTIVE\n}\n\n\"\"\"A user.\"\"\"\ntype User {\n  status: Status!\n}\n"
        );
    }
}
