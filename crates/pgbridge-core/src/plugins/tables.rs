//! Object types for table (composite) types.

use std::sync::Arc;

use pgbridge_pipeline::{FieldScope, FieldScopeTracker, FieldSet};
use tracing::debug;

use crate::bridge::{OnConflict, TypeOverride};
use crate::builder::{InitContext, Plugin, SchemaBuilder, TypeSet, INIT_PHASE, OBJECT_FIELDS_PHASE};
use crate::error::{Error, Result};
use crate::schema::{Field, FieldResolver, InputField, InputObjectType, ObjectType, SchemaType};

/// Scope tag set on every field of a table type.
pub const TABLE_TYPE_TAG: &str = "isTableType";

/// Scope tag holding the database name of a column field.
pub const COLUMN_TAG: &str = "pgColumn";

/// Turns every composite type into an object type and an input object type.
///
/// The types are registered as overrides before any column is resolved, so
/// a table may reference itself (directly or through arrays). Fields are
/// attached during the init phase, and each table's fields then pass through
/// the object fields phase so other plugins can add to them.
#[derive(Debug, Default)]
pub struct TablesPlugin;

impl TablesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for TablesPlugin {
    fn name(&self) -> &str {
        "TablesPlugin"
    }

    fn build(&self, builder: &mut SchemaBuilder) -> Result<()> {
        let catalog = Arc::clone(builder.catalog());
        let naming = Arc::clone(builder.bridge().naming());
        for table in catalog.composites() {
            let name = naming.table_type(table);
            let output = Arc::new(SchemaType::Object(ObjectType::new(&name, table.description.clone())));
            let input = Arc::new(SchemaType::InputObject(InputObjectType::new(
                naming.input_type(&name),
                table.description.clone(),
            )));
            builder.register_override(table.id, TypeOverride::new(output).with_input(input), OnConflict::Fail)?;
        }

        builder
            .hooks_mut()
            .register(INIT_PHASE, "tables", |types: TypeSet, ctx: &InitContext| Ok(build_tables(types, ctx)?))?;
        Ok(())
    }
}

fn build_tables(mut types: TypeSet, ctx: &InitContext) -> Result<TypeSet> {
    let catalog = ctx.catalog()?;
    let bridge = ctx.bridge()?;
    let naming = Arc::clone(bridge.lock().naming());

    for table in catalog.composites() {
        let entry = bridge.lock().entry(table.id)?;
        let type_name = entry.output.to_string();
        let parent = FieldScope::new()
            .with_tag(TABLE_TYPE_TAG, true)
            .with_tag("pgType", table.display_name());
        let tracker = FieldScopeTracker::new(ctx.hooks(), type_name.clone(), parent);

        let mut fields = FieldSet::new(type_name.clone());
        let mut input_fields = Vec::new();
        for column in &table.attributes {
            let (column_entry, codec) = {
                let mut bridge = bridge.lock();
                let column_entry = bridge.entry(column.type_id)?;
                let codec = bridge.codec(column.type_id).map_err(|e| {
                    Error::Configuration(format!("column {} of {}: {}", column.name, table.display_name(), e))
                })?;
                (column_entry, codec)
            };
            let field_name = naming.column_field(&column.name);

            let ty = if column.not_null {
                SchemaType::non_null(Arc::clone(&column_entry.output))
            } else {
                Arc::clone(&column_entry.output)
            };
            let tags = FieldScope::new().with_tag(COLUMN_TAG, column.name.clone());
            let field = tracker.define_field(&field_name, tags, |field| {
                Ok(Field::new(
                    field.field_name(),
                    ty,
                    FieldResolver::Column {
                        column: column.name.clone(),
                        codec,
                    },
                )
                .with_description(column.description.clone()))
            })?;
            fields.insert(field)?;

            if let Some(input) = column_entry.input {
                input_fields.push(InputField::new(field_name, input).with_description(column.description.clone()));
            }
        }

        let object_context = ctx.object_context(table, type_name.clone(), tracker.parent_scope().clone());
        let fields = ctx.hooks().run(OBJECT_FIELDS_PHASE, fields, &object_context)?;
        debug!(table = %table.display_name(), type_name = %type_name, fields = fields.len(), "Built table type");

        if let SchemaType::Object(object) = &*entry.output {
            object.set_fields(fields.into_values())?;
        }
        if let Some(SchemaType::InputObject(object)) = entry.input.as_deref() {
            object.set_fields(input_fields)?;
        }
        types.push(entry.output);
    }
    Ok(types)
}
