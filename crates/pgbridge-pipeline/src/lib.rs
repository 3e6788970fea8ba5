//! Composable schema-construction pipeline.
//!
//! This crate holds the machinery that lets independent contributors build one
//! shared schema description step by step, without knowing about databases:
//!
//! - [`state`] - Append-only capability container ([`BuildState`])
//! - [`hooks`] - Named, ordered hook phases ([`HookEngine`])
//! - [`scope`] - Field-private scope metadata ([`FieldScopeTracker`])
//! - [`error`] - Pipeline error types

pub mod error;
pub mod hooks;
pub mod scope;
pub mod state;

pub use error::{HookError, PipelineError, Result};
pub use hooks::HookEngine;
pub use scope::{FieldContext, FieldDefinition, FieldScope, FieldScopeTracker, FieldSet, FIELD_PHASE};
pub use state::{BuildState, Extension};
