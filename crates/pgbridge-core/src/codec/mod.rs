//! Value codecs.
//!
//! A codec is the decode/encode pair for one type id. `decode` turns a raw
//! stored value into the schema-shaped value; `encode` turns a schema value
//! into a [`SqlFragment`] for the query compiler. Codecs are pure and shared
//! across concurrent requests; the only shared state is the explicitly passed
//! [`IntervalCache`].

mod array;
mod interval;
mod json;
mod money;
mod point;
mod range;
mod scalar;

use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

pub use array::ArrayCodec;
pub use interval::{Interval, IntervalCache, IntervalCodec};
pub use json::JsonCodec;
pub use money::{parse_money, MoneyCodec};
pub use point::PointCodec;
pub use range::RangeCodec;
pub use scalar::{BigNumberCodec, BooleanCodec, FloatCodec, IntegerCodec};

/// Decode/encode pair for values of one type.
///
/// Implementations never see null: [`Codec`] maps null to null in both
/// directions before delegating.
pub trait ValueCodec: Send + Sync + fmt::Debug {
    /// Convert a raw stored value into its schema representation.
    fn decode(&self, value: &Value) -> ConversionResult<Value>;

    /// Convert a schema value into an SQL fragment that produces it.
    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment>;
}

/// Shared handle to a [`ValueCodec`].
#[derive(Clone)]
pub struct Codec(Arc<dyn ValueCodec>);

impl Codec {
    /// Wrap a codec.
    pub fn new(codec: impl ValueCodec + 'static) -> Self {
        Codec(Arc::new(codec))
    }

    /// The passthrough codec: values decode unchanged and encode as a cast to `ty`.
    pub fn identity(ty: QualifiedName) -> Self {
        Codec::new(IdentityCodec { ty })
    }

    /// Decode a raw value. Null decodes to null.
    pub fn decode(&self, value: &Value) -> ConversionResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            value => self.0.decode(value),
        }
    }

    /// Encode a schema value. Null encodes to SQL null.
    pub fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        match value {
            Value::Null => Ok(SqlFragment::Null),
            value => self.0.encode(value),
        }
    }

    /// Check if both handles share one codec instance.
    pub fn same(&self, other: &Codec) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Passthrough codec used when a type has no registered conversion.
#[derive(Debug)]
pub struct IdentityCodec {
    ty: QualifiedName,
}

impl ValueCodec for IdentityCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        Ok(value.clone())
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        Ok(SqlFragment::Value(value.clone()).cast(self.ty.clone()))
    }
}

/// A JSON number for `value`, integral when `value` has no fraction.
pub(crate) fn number_value(value: f64) -> ConversionResult<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Ok(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ConversionError::MalformedNumber(value.to_string()))
}

/// Read a finite number from a JSON number or numeric string.
pub(crate) fn as_f64(value: &Value) -> ConversionResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ConversionError::MalformedNumber(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| ConversionError::MalformedNumber(s.clone())),
        other => Err(ConversionError::shape("a number", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_passes_through_every_codec() {
        let codec = Codec::identity(QualifiedName::catalog("text"));
        assert_eq!(codec.decode(&Value::Null).unwrap(), Value::Null);
        assert_eq!(codec.encode(&Value::Null).unwrap(), SqlFragment::Null);
    }

    #[test]
    fn test_identity_encode_casts() {
        let codec = Codec::identity(QualifiedName::new("app", "email"));
        assert_eq!(codec.decode(&json!("a@b.c")).unwrap(), json!("a@b.c"));
        let compiled = codec.encode(&json!("a@b.c")).unwrap().compile();
        assert_eq!(compiled.text, "($1)::\"app\".\"email\"");
    }

    #[test]
    fn test_same_compares_instances() {
        let a = Codec::identity(QualifiedName::catalog("text"));
        let b = a.clone();
        let c = Codec::identity(QualifiedName::catalog("text"));
        assert!(a.same(&b));
        assert!(!a.same(&c));
    }

    #[test]
    fn test_number_value_prefers_integers() {
        assert_eq!(number_value(6.0).unwrap(), json!(6));
        assert_eq!(number_value(-1.5).unwrap(), json!(-1.5));
        assert!(number_value(f64::NAN).is_err());
    }
}
