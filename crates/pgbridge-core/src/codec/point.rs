//! Two-dimensional points.

use serde_json::{json, Value};

use super::{as_f64, number_value, ValueCodec};
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Codec for `point` values: `(x,y)` on the wire, `{x, y}` in the schema.
#[derive(Debug)]
pub struct PointCodec {
    constructor: QualifiedName,
}

impl PointCodec {
    pub fn new(constructor: QualifiedName) -> Self {
        Self { constructor }
    }

    fn coordinates(value: &Value) -> ConversionResult<(Value, Value)> {
        let malformed = || ConversionError::MalformedPoint(value.to_string());
        match value {
            Value::String(text) => {
                let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
                let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
                let parse = |part: &str| {
                    part.trim()
                        .parse::<f64>()
                        .map_err(|_| malformed())
                        .and_then(number_value)
                };
                Ok((parse(x)?, parse(y)?))
            }
            Value::Object(map) => {
                let x = map.get("x").ok_or_else(malformed)?;
                let y = map.get("y").ok_or_else(malformed)?;
                Ok((number_value(as_f64(x)?)?, number_value(as_f64(y)?)?))
            }
            other => Err(ConversionError::shape("a point", other)),
        }
    }
}

impl ValueCodec for PointCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        let (x, y) = Self::coordinates(value)?;
        Ok(json!({ "x": x, "y": y }))
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let (x, y) = Self::coordinates(value)?;
        Ok(SqlFragment::call(
            self.constructor.clone(),
            vec![SqlFragment::Value(x), SqlFragment::Value(y)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> PointCodec {
        PointCodec::new(QualifiedName::catalog("point"))
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(codec().decode(&json!("(1,3)")).unwrap(), json!({"x": 1, "y": 3}));
        assert_eq!(
            codec().decode(&json!("(-1.5, 2.25)")).unwrap(),
            json!({"x": -1.5, "y": 2.25})
        );
    }

    #[test]
    fn test_encode_constructor_call() {
        let compiled = codec().encode(&json!({"x": 1, "y": 3})).unwrap().compile();
        assert_eq!(compiled.text, "\"pg_catalog\".\"point\"($1, $2)");
        assert_eq!(compiled.params, vec![json!(1), json!(3)]);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            codec().decode(&json!("(1;3)")),
            Err(ConversionError::MalformedPoint(_))
        ));
        assert!(codec().encode(&json!({"x": 1})).is_err());
        assert!(codec().decode(&json!(true)).is_err());
    }
}
