//! Global node identifiers for table types.

use std::sync::Arc;

use pgbridge_pipeline::{BuildState, Extension, FieldScope, FieldScopeTracker, FieldSet};

use crate::builder::{keys, BuildContext, ObjectContext, Plugin, SchemaBuilder, BUILD_PHASE, OBJECT_FIELDS_PHASE};
use crate::error::Result;
use crate::node::NodeIdentity;
use crate::schema::{Field, FieldResolver, SchemaType};

/// Scope tag set on the node identifier field.
pub const NODE_ID_TAG: &str = "isNodeIdField";

/// Name of the node identifier field.
pub const NODE_ID_FIELD: &str = "nodeId";

/// Adds the [`NodeIdentity`] capability and a `nodeId` field to every table
/// type with a primary key.
#[derive(Debug, Default)]
pub struct NodePlugin {
    aliases: Vec<(String, String)>,
}

impl NodePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue identifiers for `type_name` under `alias`.
    pub fn with_alias(mut self, type_name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.push((type_name.into(), alias.into()));
        self
    }
}

impl Plugin for NodePlugin {
    fn name(&self) -> &str {
        "NodePlugin"
    }

    fn build(&self, builder: &mut SchemaBuilder) -> Result<()> {
        let aliases = self.aliases.clone();
        let hooks = builder.hooks_mut();

        hooks.register(BUILD_PHASE, "node_identity", move |state: BuildState, _: &BuildContext| {
            let identity = NodeIdentity::new();
            for (type_name, alias) in &aliases {
                identity.set_alias(type_name.clone(), alias.clone());
            }
            Ok(state.extend(
                Extension::new().with_shared(keys::NODE_IDENTITY, Arc::new(identity)),
                "NodePlugin",
            )?)
        })?;

        hooks.register(OBJECT_FIELDS_PHASE, "node_id", |fields: FieldSet<Field>, ctx: &ObjectContext| {
            Ok(add_node_id(fields, ctx)?)
        })?;
        Ok(())
    }
}

fn add_node_id(mut fields: FieldSet<Field>, ctx: &ObjectContext) -> Result<FieldSet<Field>> {
    let key_columns: Vec<String> = ctx.descriptor().primary_key().map(|a| a.name.clone()).collect();
    if key_columns.is_empty() {
        return Ok(fields);
    }

    let identity = ctx.state().require_shared::<NodeIdentity>(keys::NODE_IDENTITY)?;
    let id_type = SchemaType::non_null(Arc::clone(&ctx.bridge()?.lock().scalars().id));
    let tracker = FieldScopeTracker::new(ctx.hooks(), ctx.type_name(), ctx.scope().clone());

    let type_name = ctx.type_name().to_string();
    let field = tracker.define_field(NODE_ID_FIELD, FieldScope::new().with_tag(NODE_ID_TAG, true), |_| {
        Ok(Field::new(
            NODE_ID_FIELD,
            id_type,
            FieldResolver::NodeId {
                type_name,
                key_columns,
                identity,
            },
        )
        .with_description(Some("A globally unique identifier for this row.".to_string())))
    })?;
    fields.insert(field)?;
    Ok(fields)
}
