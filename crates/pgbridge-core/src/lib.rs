//! Database type bridge and schema builder.
//!
//! This crate turns a relational type catalog into API schema types and
//! converts every value that crosses between the two:
//!
//! - [`catalog`] - Type descriptors from introspection
//! - [`bridge`] - Recursive type resolution with memoization and a depth guard
//! - [`codec`] - Value decode/encode pairs, including the interval cache
//! - [`schema`] - Schema type model and SDL printing
//! - [`sql`] - SQL fragments handed to the query compiler
//! - [`node`] - Opaque global node identifiers
//! - [`builder`] - Plugin-driven schema construction
//! - [`plugins`] - Standard types, tables, and node identifiers
//!
//! # Example
//!
//! ```
//! use pgbridge_core::catalog::{builtin_types, oids, TypeCatalog};
//! use pgbridge_core::plugins::StandardTypesPlugin;
//! use pgbridge_core::{BridgeConfig, SchemaBuilder};
//! use serde_json::json;
//!
//! let catalog = TypeCatalog::from_descriptors(builtin_types()).unwrap();
//! let schema = SchemaBuilder::new(catalog, BridgeConfig::default())
//!     .with_plugin(StandardTypesPlugin::new())
//!     .build()
//!     .unwrap();
//!
//! let point = schema.decode(oids::POINT, &json!("(1,3)")).unwrap();
//! assert_eq!(point, json!({"x": 1, "y": 3}));
//! ```

pub mod bridge;
pub mod builder;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod naming;
pub mod node;
pub mod plugins;
pub mod schema;
pub mod sql;

pub use bridge::{OnConflict, TypeBridge, TypeEntry, TypeOverride};
pub use builder::{Plugin, Schema, SchemaBuilder};
pub use config::BridgeConfig;
pub use error::{ConversionError, ConversionResult, Error, Result};
pub use naming::{Inflection, Naming};
pub use node::NodeIdentity;
pub use sql::{CompiledSql, SqlFragment};
