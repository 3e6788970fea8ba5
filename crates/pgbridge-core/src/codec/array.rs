//! Arrays, synthesized from the element type's codec.

use serde_json::Value;

use super::{Codec, ValueCodec};
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Codec for an array type: applies the element codec to every element.
#[derive(Debug)]
pub struct ArrayCodec {
    type_name: String,
    item: Codec,
    element_type: QualifiedName,
}

impl ArrayCodec {
    /// `type_name` names the array type in errors.
    pub fn new(type_name: impl Into<String>, item: Codec, element_type: QualifiedName) -> Self {
        Self {
            type_name: type_name.into(),
            item,
            element_type,
        }
    }

    fn elements<'v>(&self, value: &'v Value) -> ConversionResult<&'v [Value]> {
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| ConversionError::NotASequence {
                type_name: self.type_name.clone(),
            })
    }
}

impl ValueCodec for ArrayCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        self.elements(value)?
            .iter()
            .map(|element| self.item.decode(element))
            .collect::<ConversionResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let elements = self
            .elements(value)?
            .iter()
            .map(|element| self.item.encode(element))
            .collect::<ConversionResult<Vec<_>>>()?;
        Ok(SqlFragment::Array {
            elements,
            element_type: self.element_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IntegerCodec;
    use serde_json::json;

    fn codec() -> ArrayCodec {
        let int4 = QualifiedName::catalog("int4");
        ArrayCodec::new(
            "pg_catalog._int4",
            Codec::new(IntegerCodec::new(int4.clone())),
            int4,
        )
    }

    #[test]
    fn test_decode_maps_elements() {
        assert_eq!(
            codec().decode(&json!(["1", null, 3])).unwrap(),
            json!([1, null, 3])
        );
    }

    #[test]
    fn test_non_sequence_names_type() {
        let err = codec().decode(&json!("{1,2}")).unwrap_err();
        assert_eq!(
            err,
            ConversionError::NotASequence {
                type_name: "pg_catalog._int4".into()
            }
        );
        assert!(err.to_string().contains("pg_catalog._int4"));
    }

    #[test]
    fn test_encode_array_literal() {
        let compiled = codec().encode(&json!([1, null])).unwrap().compile();
        assert_eq!(
            compiled.text,
            "array[($1)::\"pg_catalog\".\"int4\", null]::\"pg_catalog\".\"int4\"[]"
        );
    }
}
