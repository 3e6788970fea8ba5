//! JSON documents.

use serde_json::Value;

use super::ValueCodec;
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Codec for `json`/`jsonb` values.
///
/// In structured mode documents are exposed as JSON values; otherwise they are
/// exposed as their serialized text.
#[derive(Debug)]
pub struct JsonCodec {
    ty: QualifiedName,
    structured: bool,
}

impl JsonCodec {
    pub fn new(ty: QualifiedName, structured: bool) -> Self {
        Self { ty, structured }
    }
}

fn parse(text: &str) -> ConversionResult<Value> {
    serde_json::from_str(text).map_err(|e| ConversionError::MalformedJson(e.to_string()))
}

impl ValueCodec for JsonCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        match (self.structured, value) {
            (true, Value::String(text)) => parse(text),
            (true, other) => Ok(other.clone()),
            (false, Value::String(text)) => Ok(Value::String(text.clone())),
            (false, other) => Ok(Value::String(other.to_string())),
        }
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let text = match (self.structured, value) {
            (true, other) => other.to_string(),
            (false, Value::String(text)) => {
                parse(text)?;
                text.clone()
            }
            (false, other) => return Err(ConversionError::shape("a JSON string", other)),
        };
        Ok(SqlFragment::value(text).cast(self.ty.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_mode() {
        let codec = JsonCodec::new(QualifiedName::catalog("jsonb"), true);
        assert_eq!(codec.decode(&json!(r#"{"a":[1,2]}"#)).unwrap(), json!({"a": [1, 2]}));
        assert_eq!(codec.decode(&json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert!(matches!(
            codec.decode(&json!("{nope")),
            Err(ConversionError::MalformedJson(_))
        ));

        let compiled = codec.encode(&json!({"a": 1})).unwrap().compile();
        assert_eq!(compiled.params, vec![json!(r#"{"a":1}"#)]);
    }

    #[test]
    fn test_opaque_mode() {
        let codec = JsonCodec::new(QualifiedName::catalog("json"), false);
        assert_eq!(codec.decode(&json!(r#"{"a":1}"#)).unwrap(), json!(r#"{"a":1}"#));
        assert_eq!(codec.decode(&json!({"a": 1})).unwrap(), json!(r#"{"a":1}"#));

        assert!(codec.encode(&json!("[1, 2]")).is_ok());
        assert!(codec.encode(&json!("[1, 2")).is_err());
        assert!(codec.encode(&json!({"a": 1})).is_err());
    }
}
