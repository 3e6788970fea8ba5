//! Core error types.
//!
//! [`Error`] covers build-time failures, which always abort the schema build.
//! [`ConversionError`] covers serve-time value conversion failures, which only
//! affect the single field of the single request that triggered them.

use pgbridge_pipeline::PipelineError;
use thiserror::Error;

use crate::catalog::{Oid, TypeDescriptor, TypeKind};

/// Result alias for build-time operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for serve-time value conversions.
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

/// Build-time errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or malformed input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A second explicit mapping was registered for the same type.
    #[error("a type override for {type_name} is already registered")]
    DuplicateOverride { type_name: String },

    /// A descriptor references a type id that the catalog does not contain.
    #[error("type {id} referenced by {referenced_by} is missing from the catalog")]
    MissingDescriptor { id: Oid, referenced_by: String },

    /// Two enum variants escape to the same member name.
    #[error("enum {type_name}: variants {first:?} and {second:?} both map to member name {name}")]
    EnumNameCollision {
        type_name: String,
        name: String,
        first: String,
        second: String,
    },

    /// Two distinct schema types were given the same name.
    #[error("two different schema types are named {name}")]
    DuplicateTypeName { name: String },

    /// The type graph nested deeper than the configured limit.
    #[error("type graph too deep (limit {limit}) at {type_name} ({kind}); suspected cycle")]
    RecursionLimit {
        type_name: String,
        kind: TypeKind,
        limit: usize,
    },

    /// Resolving a specific descriptor failed.
    #[error("error resolving database type {type_name} ({kind}): {source}")]
    TypeResolution {
        type_name: String,
        kind: TypeKind,
        #[source]
        source: Box<Error>,
    },

    /// The hook pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl Error {
    /// Attach the descriptor being resolved to an error raised while resolving it.
    ///
    /// Errors that already name a type are passed through unchanged so the
    /// innermost offending type stays visible.
    pub(crate) fn resolving(self, descriptor: &TypeDescriptor) -> Error {
        match self {
            Error::RecursionLimit { .. } | Error::TypeResolution { .. } => self,
            other => Error::TypeResolution {
                type_name: descriptor.display_name(),
                kind: descriptor.kind,
                source: Box::new(other),
            },
        }
    }

    /// Check if this error, or the error it wraps, is a recursion-limit error.
    ///
    /// Looks through hook failures, so an error raised while a plugin was
    /// resolving types is still recognised.
    pub fn is_recursion_limit(&self) -> bool {
        match self {
            Error::RecursionLimit { .. } => true,
            Error::TypeResolution { source, .. } => source.is_recursion_limit(),
            Error::Pipeline(PipelineError::HookFailed { source, .. })
            | Error::Pipeline(PipelineError::FieldDefinition { source, .. }) => source
                .downcast_ref::<Error>()
                .is_some_and(Error::is_recursion_limit),
            _ => false,
        }
    }
}

/// Serve-time value conversion errors.
///
/// These are recoverable: the caller reports them as a field-level error of
/// the request being served.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// An array-typed value was not a sequence.
    #[error("expected a list value for array type {type_name}")]
    NotASequence { type_name: String },

    /// A range literal could not be parsed.
    #[error("malformed range literal {literal:?}: {reason}")]
    MalformedRange { literal: String, reason: String },

    /// An interval literal or structure could not be parsed.
    #[error("malformed interval {0:?}")]
    MalformedInterval(String),

    /// A point literal or structure could not be parsed.
    #[error("malformed point {0:?}")]
    MalformedPoint(String),

    /// A currency amount could not be parsed.
    #[error("malformed money amount {0:?}")]
    MalformedMoney(String),

    /// A numeric value could not be parsed.
    #[error("malformed number {0:?}")]
    MalformedNumber(String),

    /// A JSON document could not be parsed.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// A value had the wrong shape for its type.
    #[error("expected {expected}, found {found}")]
    UnexpectedShape { expected: &'static str, found: String },

    /// A node identifier could not be decoded.
    #[error("invalid node identifier: {0}")]
    InvalidNodeId(String),

    /// A row did not contain the column a field reads.
    #[error("row has no column {0:?}")]
    MissingColumn(String),

    /// No type with this id is known.
    #[error("unknown type {0}")]
    UnknownType(Oid),

    /// A conversion failed while resolving a specific field.
    #[error("field {field:?}: {source}")]
    InField {
        field: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Build an [`ConversionError::UnexpectedShape`] describing `found`.
    pub(crate) fn shape(expected: &'static str, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "a list",
            serde_json::Value::Object(_) => "an object",
        };
        ConversionError::UnexpectedShape {
            expected,
            found: found.to_string(),
        }
    }

    /// Attribute this error to a field.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        ConversionError::InField {
            field: field.into(),
            source: Box::new(self),
        }
    }
}
