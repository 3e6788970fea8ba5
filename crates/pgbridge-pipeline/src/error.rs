//! Pipeline error types.

use thiserror::Error;

/// Error type returned by hook handlers and field definition thunks.
///
/// Any error from any crate can abort a phase, so handlers return a boxed error
/// and the engine wraps it with the phase and hook that produced it.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while composing or running the build pipeline.
///
/// Every variant is fatal at build time: a schema whose pipeline failed must
/// never be served.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Two contributors introduced the same capability key.
    #[error("capability '{key}' added by '{label}' collides with the one added by '{existing_label}'")]
    DuplicateCapability {
        key: String,
        existing_label: String,
        label: String,
    },

    /// A required capability was never added to the build state.
    #[error("capability '{key}' is not present in the build state")]
    MissingCapability { key: String },

    /// A capability exists but holds a different type than requested.
    #[error("capability '{key}' is not a {expected}")]
    CapabilityType { key: String, expected: &'static str },

    /// A phase was registered with one artifact/context type and used with another.
    #[error(
        "phase '{phase}' is registered for artifact {registered_artifact} with context {registered_context}, \
         not artifact {artifact} with context {context}"
    )]
    PhaseType {
        phase: String,
        registered_artifact: &'static str,
        registered_context: &'static str,
        artifact: &'static str,
        context: &'static str,
    },

    /// A hook with this name is already registered for the phase.
    #[error("hook '{hook}' is already registered for phase '{phase}'")]
    DuplicateHook { phase: String, hook: String },

    /// A hook handler failed, aborting its phase.
    #[error("hook '{hook}' failed during phase '{phase}': {source}")]
    HookFailed {
        phase: String,
        hook: String,
        #[source]
        source: HookError,
    },

    /// A field definition thunk failed.
    #[error("failed to define field '{field}': {source}")]
    FieldDefinition {
        field: String,
        #[source]
        source: HookError,
    },

    /// Two fields with the same name were added to one field set.
    #[error("field '{field}' is defined more than once on '{owner}'")]
    DuplicateField { owner: String, field: String },
}
