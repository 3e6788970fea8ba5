//! Built-in scalar types shared by every schema.

use std::sync::Arc;

use super::{ScalarKind, ScalarType, SchemaType, TypeRef};

fn scalar(name: &str, kind: ScalarKind, description: &str) -> TypeRef {
    Arc::new(SchemaType::Scalar(ScalarType {
        name: name.to_string(),
        description: Some(description.to_string()),
        kind,
    }))
}

/// The standard scalars, created once per schema so every reference to a
/// scalar shares one type.
#[derive(Debug, Clone)]
pub struct StandardScalars {
    pub boolean: TypeRef,
    pub int: TypeRef,
    pub float: TypeRef,
    pub string: TypeRef,
    pub id: TypeRef,
    pub big_int: TypeRef,
    pub big_float: TypeRef,
    pub json: TypeRef,
    pub uuid: TypeRef,
    pub date: TypeRef,
    pub datetime: TypeRef,
    pub time: TypeRef,
    pub internet_address: TypeRef,
    pub bit_string: TypeRef,
}

impl StandardScalars {
    /// Create the scalars. `legacy_names` selects `Json`/`Uuid` over `JSON`/`UUID`.
    pub fn new(legacy_names: bool) -> Self {
        let (json, uuid) = if legacy_names {
            ("Json", "Uuid")
        } else {
            ("JSON", "UUID")
        };
        Self {
            boolean: scalar("Boolean", ScalarKind::Boolean, "true or false"),
            int: scalar("Int", ScalarKind::Int, "A signed 32-bit integer."),
            float: scalar("Float", ScalarKind::Float, "A double-precision floating point number."),
            string: scalar("String", ScalarKind::String, "UTF-8 text."),
            id: scalar("ID", ScalarKind::String, "An opaque globally unique identifier."),
            big_int: scalar(
                "BigInt",
                ScalarKind::String,
                "A signed eight-byte integer, serialized as a string.",
            ),
            big_float: scalar(
                "BigFloat",
                ScalarKind::String,
                "An arbitrary-precision number, serialized as a string.",
            ),
            json: scalar(json, ScalarKind::Json, "A JSON value."),
            uuid: scalar(uuid, ScalarKind::String, "A universally unique identifier (RFC 4122)."),
            date: scalar("Date", ScalarKind::String, "A calendar date."),
            datetime: scalar("Datetime", ScalarKind::String, "A point in time, with time zone if known."),
            time: scalar("Time", ScalarKind::String, "A time of day."),
            internet_address: scalar("InternetAddress", ScalarKind::String, "An IPv4 or IPv6 host or network address."),
            bit_string: scalar("BitString", ScalarKind::String, "A string of 1s and 0s."),
        }
    }

    /// All scalars, in a fixed order.
    pub fn all(&self) -> [&TypeRef; 14] {
        [
            &self.boolean,
            &self.int,
            &self.float,
            &self.string,
            &self.id,
            &self.big_int,
            &self.big_float,
            &self.json,
            &self.uuid,
            &self.date,
            &self.datetime,
            &self.time,
            &self.internet_address,
            &self.bit_string,
        ]
    }
}
