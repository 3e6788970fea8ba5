//! Codecs for primitive numbers and booleans.

use serde_json::{Number, Value};

use super::ValueCodec;
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Integers that fit the schema's `Int`. Textual wire values are parsed.
#[derive(Debug)]
pub struct IntegerCodec {
    ty: QualifiedName,
}

impl IntegerCodec {
    pub fn new(ty: QualifiedName) -> Self {
        Self { ty }
    }

    fn parse(value: &Value) -> ConversionResult<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| ConversionError::MalformedNumber(n.to_string())),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| ConversionError::MalformedNumber(s.clone())),
            other => Err(ConversionError::shape("an integer", other)),
        }
    }
}

impl ValueCodec for IntegerCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        Self::parse(value).map(|n| Value::Number(n.into()))
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let n = Self::parse(value)?;
        Ok(SqlFragment::value(n).cast(self.ty.clone()))
    }
}

/// Floating point numbers. Textual wire values are parsed.
#[derive(Debug)]
pub struct FloatCodec {
    ty: QualifiedName,
}

impl FloatCodec {
    pub fn new(ty: QualifiedName) -> Self {
        Self { ty }
    }

    fn parse(value: &Value) -> ConversionResult<Number> {
        let f = super::as_f64(value)?;
        Number::from_f64(f).ok_or_else(|| ConversionError::MalformedNumber(f.to_string()))
    }
}

impl ValueCodec for FloatCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        Self::parse(value).map(Value::Number)
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        Ok(SqlFragment::Value(Value::Number(Self::parse(value)?)).cast(self.ty.clone()))
    }
}

/// Booleans, accepting the `t`/`f` text form.
#[derive(Debug)]
pub struct BooleanCodec {
    ty: QualifiedName,
}

impl BooleanCodec {
    pub fn new(ty: QualifiedName) -> Self {
        Self { ty }
    }

    fn parse(value: &Value) -> ConversionResult<bool> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.as_str() {
                "t" | "true" => Ok(true),
                "f" | "false" => Ok(false),
                _ => Err(ConversionError::shape("a boolean", value)),
            },
            other => Err(ConversionError::shape("a boolean", other)),
        }
    }
}

impl ValueCodec for BooleanCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        Self::parse(value).map(Value::Bool)
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        Ok(SqlFragment::value(Self::parse(value)?).cast(self.ty.clone()))
    }
}

/// Numbers whose range or precision exceeds the schema's numeric types.
///
/// Values are exposed as strings so nothing is rounded on the way out.
#[derive(Debug)]
pub struct BigNumberCodec {
    ty: QualifiedName,
}

impl BigNumberCodec {
    pub fn new(ty: QualifiedName) -> Self {
        Self { ty }
    }

    fn text(value: &Value) -> ConversionResult<String> {
        match value {
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) if looks_numeric(s) => Ok(s.clone()),
            Value::String(s) => Err(ConversionError::MalformedNumber(s.clone())),
            other => Err(ConversionError::shape("a number", other)),
        }
    }
}

fn looks_numeric(s: &str) -> bool {
    let s = s.trim();
    matches!(s, "NaN" | "Infinity" | "-Infinity")
        || (!s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
}

impl ValueCodec for BigNumberCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        Self::text(value).map(Value::String)
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        Ok(SqlFragment::value(Self::text(value)?).cast(self.ty.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_parses_text() {
        let codec = IntegerCodec::new(QualifiedName::catalog("int4"));
        assert_eq!(codec.decode(&json!("-10")).unwrap(), json!(-10));
        assert_eq!(codec.decode(&json!(52)).unwrap(), json!(52));
        assert!(matches!(
            codec.decode(&json!("ten")),
            Err(ConversionError::MalformedNumber(_))
        ));
        assert!(matches!(
            codec.decode(&json!([1])),
            Err(ConversionError::UnexpectedShape { .. })
        ));
    }

    #[test]
    fn test_float_parses_text() {
        let codec = FloatCodec::new(QualifiedName::catalog("float8"));
        assert_eq!(codec.decode(&json!("1.5")).unwrap(), json!(1.5));
        assert!(codec.decode(&json!("NaN")).is_err());
    }

    #[test]
    fn test_boolean_text_forms() {
        let codec = BooleanCodec::new(QualifiedName::catalog("bool"));
        assert_eq!(codec.decode(&json!("t")).unwrap(), json!(true));
        assert_eq!(codec.decode(&json!("f")).unwrap(), json!(false));
        assert_eq!(codec.decode(&json!(true)).unwrap(), json!(true));
        assert!(codec.decode(&json!("yes")).is_err());
    }

    #[test]
    fn test_big_numbers_become_strings() {
        let codec = BigNumberCodec::new(QualifiedName::catalog("int8"));
        assert_eq!(
            codec.decode(&json!(9007199254740993u64)).unwrap(),
            json!("9007199254740993")
        );
        assert_eq!(codec.decode(&json!("12.50")).unwrap(), json!("12.50"));
        assert!(codec.decode(&json!("12; drop")).is_err());

        let compiled = codec.encode(&json!("42")).unwrap().compile();
        assert_eq!(compiled.text, "($1)::\"pg_catalog\".\"int8\"");
        assert_eq!(compiled.params, vec![json!("42")]);
    }
}
