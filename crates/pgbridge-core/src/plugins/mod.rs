//! Standard plugins.

mod node;
mod standard_types;
mod tables;

pub use node::{NodePlugin, NODE_ID_FIELD, NODE_ID_TAG};
pub use standard_types::StandardTypesPlugin;
pub use tables::{TablesPlugin, COLUMN_TAG, TABLE_TYPE_TAG};
