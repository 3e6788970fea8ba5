//! Mappings for well-known catalog types.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::{OnConflict, TypeOverride};
use crate::builder::{Plugin, SchemaBuilder};
use crate::catalog::{oids, Oid, QualifiedName};
use crate::codec::{
    BigNumberCodec, BooleanCodec, Codec, FloatCodec, IntegerCodec, IntervalCodec, JsonCodec, MoneyCodec,
    PointCodec,
};
use crate::error::Result;
use crate::schema::{Field, InputField, InputObjectType, ObjectType, SchemaType, TypeRef};

/// Registers overrides for the built-in catalog primitives.
///
/// Every override yields to one registered earlier, so a plugin added before
/// this one can remap any of these types.
#[derive(Debug, Default)]
pub struct StandardTypesPlugin;

impl StandardTypesPlugin {
    pub fn new() -> Self {
        Self
    }
}

fn codec_type(id: Oid) -> QualifiedName {
    let name = match id {
        oids::BOOL => "bool",
        oids::INT2 => "int2",
        oids::INT4 => "int4",
        oids::INT8 => "int8",
        oids::FLOAT4 => "float4",
        oids::FLOAT8 => "float8",
        oids::NUMERIC => "numeric",
        oids::MONEY => "money",
        oids::JSON => "json",
        oids::JSONB => "jsonb",
        oids::INTERVAL => "interval",
        oids::POINT => "point",
        _ => "text",
    };
    QualifiedName::catalog(name)
}

fn interval_types(int: &TypeRef, float: &TypeRef) -> (TypeRef, TypeRef) {
    let components = [
        ("seconds", float, "A quantity of seconds, possibly fractional."),
        ("minutes", int, "A quantity of minutes."),
        ("hours", int, "A quantity of hours."),
        ("days", int, "A quantity of days."),
        ("months", int, "A quantity of months."),
        ("years", int, "A quantity of years."),
    ];
    let output = ObjectType::with_fields(
        "Interval",
        Some("A span of time; each component is added to the others.".to_string()),
        components
            .iter()
            .map(|(name, ty, doc)| Field::property(*name, Arc::clone(ty)).with_description(Some(doc.to_string())))
            .collect(),
    );
    let input = InputObjectType::with_fields(
        "IntervalInput",
        Some("A span of time; omitted components are zero.".to_string()),
        components
            .iter()
            .map(|(name, ty, doc)| InputField::new(*name, Arc::clone(ty)).with_description(Some(doc.to_string())))
            .collect(),
    );
    (Arc::new(SchemaType::Object(output)), Arc::new(SchemaType::InputObject(input)))
}

fn point_types(float: &TypeRef) -> (TypeRef, TypeRef) {
    let coordinate = SchemaType::non_null(Arc::clone(float));
    let output = ObjectType::with_fields(
        "Point",
        None,
        vec![
            Field::property("x", Arc::clone(&coordinate)),
            Field::property("y", Arc::clone(&coordinate)),
        ],
    );
    let input = InputObjectType::with_fields(
        "PointInput",
        None,
        vec![
            InputField::new("x", Arc::clone(&coordinate)),
            InputField::new("y", coordinate),
        ],
    );
    (Arc::new(SchemaType::Object(output)), Arc::new(SchemaType::InputObject(input)))
}

impl Plugin for StandardTypesPlugin {
    fn name(&self) -> &str {
        "StandardTypesPlugin"
    }

    fn build(&self, builder: &mut SchemaBuilder) -> Result<()> {
        let scalars = builder.bridge().scalars().clone();
        let cache = Arc::clone(builder.bridge().interval_cache());
        let structured_json = builder.config().use_structured_json;

        let (interval, interval_input) = interval_types(&scalars.int, &scalars.float);
        let (point, point_input) = point_types(&scalars.float);

        let mut overrides: Vec<(Oid, TypeOverride)> = Vec::new();
        let mut scalar = |ids: &[Oid], ty: &TypeRef, codec: fn(QualifiedName) -> Codec| {
            for &id in ids {
                overrides.push((id, TypeOverride::both(Arc::clone(ty)).with_codec(codec(codec_type(id)))));
            }
        };

        scalar(&[oids::BOOL], &scalars.boolean, |t| Codec::new(BooleanCodec::new(t)));
        scalar(&[oids::INT2, oids::INT4], &scalars.int, |t| Codec::new(IntegerCodec::new(t)));
        scalar(&[oids::FLOAT4, oids::FLOAT8], &scalars.float, |t| Codec::new(FloatCodec::new(t)));
        scalar(&[oids::INT8], &scalars.big_int, |t| Codec::new(BigNumberCodec::new(t)));
        scalar(&[oids::NUMERIC], &scalars.big_float, |t| Codec::new(BigNumberCodec::new(t)));
        scalar(&[oids::MONEY], &scalars.float, |t| Codec::new(MoneyCodec::new(t)));

        let text = [oids::TEXT, oids::VARCHAR, oids::BPCHAR, oids::NAME, oids::CHAR, oids::XML];
        for (ids, ty) in [
            (&text[..], &scalars.string),
            (&[oids::UUID][..], &scalars.uuid),
            (&[oids::DATE][..], &scalars.date),
            (&[oids::TIME, oids::TIMETZ][..], &scalars.time),
            (&[oids::TIMESTAMP, oids::TIMESTAMPTZ][..], &scalars.datetime),
            (&[oids::INET, oids::CIDR, oids::MACADDR][..], &scalars.internet_address),
            (&[oids::BIT, oids::VARBIT][..], &scalars.bit_string),
        ] {
            for &id in ids {
                overrides.push((id, TypeOverride::both(Arc::clone(ty))));
            }
        }

        for id in [oids::JSON, oids::JSONB] {
            let codec = Codec::new(JsonCodec::new(codec_type(id), structured_json));
            overrides.push((id, TypeOverride::both(Arc::clone(&scalars.json)).with_codec(codec)));
        }
        overrides.push((
            oids::INTERVAL,
            TypeOverride::new(interval)
                .with_input(interval_input)
                .with_codec(Codec::new(IntervalCodec::new(codec_type(oids::INTERVAL), cache))),
        ));
        overrides.push((
            oids::POINT,
            TypeOverride::new(point)
                .with_input(point_input)
                .with_codec(Codec::new(PointCodec::new(codec_type(oids::POINT)))),
        ));

        let mut registered = 0usize;
        for (id, mapping) in overrides {
            if builder.register_override(id, mapping, OnConflict::Yield)? {
                registered += 1;
            }
        }
        debug!(registered, "Registered standard type overrides");
        Ok(())
    }
}
