//! Currency amounts with locale-dependent formatting.

use serde_json::Value;

use super::{as_f64, number_value, ValueCodec};
use crate::catalog::QualifiedName;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// Parse a formatted currency amount such as `$1,234.56`, `1.234,56 €`, or
/// `($12.00)`.
///
/// When both `.` and `,` occur, the one that comes last is the decimal mark.
/// When only one kind occurs, it is a group separator if it occurs more than
/// once or is followed by exactly three digits, and a decimal mark otherwise.
pub fn parse_money(text: &str) -> ConversionResult<f64> {
    let malformed = || ConversionError::MalformedMoney(text.to_string());
    let trimmed = text.trim();
    let negative = trimmed.contains('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let kept: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let last_dot = kept.rfind('.');
    let last_comma = kept.rfind(',');
    let decimal = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(at), None) | (None, Some(at)) => {
            let mark = kept.as_bytes()[at] as char;
            let repeated = kept.matches(mark).count() > 1;
            let grouped = kept.len() - at - 1 == 3;
            (!repeated && !grouped).then_some(mark)
        }
        (None, None) => None,
    };

    let normalized: String = kept
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == decimal => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect();
    let amount: f64 = normalized.parse().map_err(|_| malformed())?;
    Ok(if negative { -amount } else { amount })
}

/// Codec for `money` values.
///
/// Decodes to a number; encodes by casting a numeric literal to the currency
/// type so the server's locale never has to parse formatted text.
#[derive(Debug)]
pub struct MoneyCodec {
    ty: QualifiedName,
}

impl MoneyCodec {
    pub fn new(ty: QualifiedName) -> Self {
        Self { ty }
    }
}

impl ValueCodec for MoneyCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(text) => number_value(parse_money(text)?),
            other => Err(ConversionError::shape("a currency amount", other)),
        }
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let amount = number_value(as_f64(value)?)?;
        Ok(SqlFragment::Value(amount)
            .cast(QualifiedName::catalog("numeric"))
            .cast(self.ty.clone()))
    }
}
