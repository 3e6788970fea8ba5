//! Ranges, synthesized from the subtype's codec.

use serde_json::{json, Map, Value};

use super::{Codec, ValueCodec};
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Codec for a range type.
///
/// The wire form is a range literal such as `[-10,52)`; the schema form is
/// `{start: {value, inclusive} | null, end: {value, inclusive} | null}` where a
/// null bound is unbounded. The literal `empty` decodes to null.
///
/// Bounds are split at the first comma outside double quotes, so a subtype
/// whose unquoted text contains a comma would be misparsed. Composite
/// subtypes are refused when the range type is resolved.
#[derive(Debug)]
pub struct RangeCodec {
    constructor: QualifiedName,
    sub: Codec,
}

impl RangeCodec {
    /// `constructor` is the range type, called as `constructor(start, end, flags)`.
    pub fn new(constructor: QualifiedName, sub: Codec) -> Self {
        Self { constructor, sub }
    }

    fn bound(&self, text: &str, inclusive: bool) -> ConversionResult<Value> {
        let value = self.sub.decode(&Value::String(unquote(text)))?;
        Ok(json!({ "value": value, "inclusive": inclusive }))
    }

    fn encode_bound(&self, bound: Option<&Value>, open: char, closed: char) -> ConversionResult<(SqlFragment, char)> {
        match checked_bound(bound)? {
            Some((value, inclusive)) => Ok((self.sub.encode(value)?, if inclusive { closed } else { open })),
            None => Ok((SqlFragment::Null, open)),
        }
    }
}

/// Validate one bound of the structured form: absent or null for unbounded,
/// else `{value, inclusive}` with a boolean flag.
fn checked_bound(bound: Option<&Value>) -> ConversionResult<Option<(&Value, bool)>> {
    let Some(bound) = bound.filter(|b| !b.is_null()) else {
        return Ok(None);
    };
    let malformed = |reason: &str| ConversionError::MalformedRange {
        literal: bound.to_string(),
        reason: reason.to_string(),
    };
    let fields = bound.as_object().ok_or_else(|| malformed("bound is not an object"))?;
    let value = fields.get("value").ok_or_else(|| malformed("bound has no value"))?;
    let inclusive = fields
        .get("inclusive")
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed("bound has no inclusive flag"))?;
    if let Some(extra) = fields.keys().find(|k| !matches!(k.as_str(), "value" | "inclusive")) {
        return Err(malformed(&format!("unexpected bound key '{extra}'")));
    }
    Ok(Some((value, inclusive)))
}

/// Re-check a range that is already in its structured form.
fn checked_structured(range: &Map<String, Value>) -> ConversionResult<Value> {
    if let Some(extra) = range.keys().find(|k| !matches!(k.as_str(), "start" | "end")) {
        return Err(ConversionError::MalformedRange {
            literal: Value::Object(range.clone()).to_string(),
            reason: format!("unexpected range key '{extra}'"),
        });
    }
    checked_bound(range.get("start"))?;
    checked_bound(range.get("end"))?;
    let side = |key: &str| range.get(key).cloned().unwrap_or(Value::Null);
    Ok(json!({ "start": side("start"), "end": side("end") }))
}

/// Byte offset of the first comma outside double quotes.
fn top_level_comma(text: &str) -> Option<usize> {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

/// Strip surrounding double quotes and undo backslash and doubled-quote escapes.
fn unquote(text: &str) -> String {
    let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) else {
        return text.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                out.push('"');
            }
            other => out.push(other),
        }
    }
    out
}

impl ValueCodec for RangeCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        let literal = match value {
            Value::String(literal) => literal.trim(),
            Value::Object(range) => return checked_structured(range),
            other => return Err(ConversionError::shape("a range", other)),
        };
        if literal.eq_ignore_ascii_case("empty") {
            return Ok(Value::Null);
        }

        let malformed = |reason: &str| ConversionError::MalformedRange {
            literal: literal.to_string(),
            reason: reason.to_string(),
        };
        let comma = top_level_comma(literal).ok_or_else(|| malformed("no separating comma"))?;
        let (start, end) = (&literal[..comma], &literal[comma + 1..]);

        let start_inclusive = match start.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(malformed("must start with '[' or '('")),
        };
        let end_inclusive = match end.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(malformed("must end with ']' or ')'")),
        };

        let mut range = Map::new();
        let start = if start.len() > 1 {
            self.bound(&start[1..], start_inclusive)?
        } else {
            Value::Null
        };
        let end = if end.len() > 1 {
            self.bound(&end[..end.len() - 1], end_inclusive)?
        } else {
            Value::Null
        };
        range.insert("start".into(), start);
        range.insert("end".into(), end);
        Ok(Value::Object(range))
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let range = value.as_object().ok_or_else(|| ConversionError::shape("a range", value))?;
        let (start, start_flag) = self.encode_bound(range.get("start"), '(', '[')?;
        let (end, end_flag) = self.encode_bound(range.get("end"), ')', ']')?;
        let flags: String = [start_flag, end_flag].into_iter().collect();
        Ok(SqlFragment::call(
            self.constructor.clone(),
            vec![start, end, SqlFragment::value(flags)],
        ))
    }
}
