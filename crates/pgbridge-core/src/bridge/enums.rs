//! Enum member names derived from raw database labels.

use std::collections::HashMap;

use crate::catalog::TypeDescriptor;
use crate::error::{Error, Result};
use crate::naming::Naming;
use crate::schema::EnumValue;

/// Member name for the empty label.
pub const EMPTY_MEMBER: &str = "_EMPTY_";

const SYMBOLS: &[(char, &str)] = &[
    ('!', "BANG"),
    ('"', "QUOTE"),
    ('#', "HASH"),
    ('$', "DOLLAR"),
    ('%', "PERCENT"),
    ('&', "AMPERSAND"),
    ('\'', "APOSTROPHE"),
    ('(', "LEFT_PARENTHESIS"),
    (')', "RIGHT_PARENTHESIS"),
    ('*', "ASTERISK"),
    ('+', "PLUS"),
    (',', "COMMA"),
    ('-', "MINUS"),
    ('.', "DOT"),
    ('/', "SLASH"),
    (':', "COLON"),
    (';', "SEMICOLON"),
    ('<', "LESS_THAN"),
    ('=', "EQUALS"),
    ('>', "GREATER_THAN"),
    ('?', "QUESTION"),
    ('@', "AT"),
    ('[', "LEFT_BRACKET"),
    ('\\', "BACKSLASH"),
    (']', "RIGHT_BRACKET"),
    ('^', "CARET"),
    ('_', "UNDERSCORE"),
    ('`', "BACKTICK"),
    ('{', "LEFT_BRACE"),
    ('|', "PIPE"),
    ('}', "RIGHT_BRACE"),
    ('~', "TILDE"),
];

fn symbol_token(c: char) -> String {
    SYMBOLS
        .iter()
        .find(|(symbol, _)| *symbol == c)
        .map(|(_, token)| token.to_string())
        .unwrap_or_else(|| format!("U{:04X}", c as u32))
}

/// Replace symbols in a raw label with name-safe tokens.
///
/// A label made only of symbols spells every symbol out, so `_` becomes
/// `UNDERSCORE` and `>=` becomes `GREATER_THAN_EQUALS`. Otherwise whitespace
/// separates words and other symbols become `_TOKEN_`, keeping `_` as is.
pub fn escape_label(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY_MEMBER.to_string();
    }
    if !raw.chars().any(char::is_alphanumeric) {
        return raw
            .chars()
            .map(|c| if c.is_whitespace() { "SPACE".to_string() } else { symbol_token(c) })
            .collect::<Vec<_>>()
            .join("_");
    }
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            escaped.push(c);
        } else if c.is_whitespace() {
            escaped.push('_');
        } else {
            escaped.push('_');
            escaped.push_str(&symbol_token(c));
            escaped.push('_');
        }
    }
    escaped
}

/// Derive the members of an enum, failing if two labels map to one name.
pub(crate) fn enum_members(descriptor: &TypeDescriptor, naming: &dyn Naming) -> Result<Vec<EnumValue>> {
    let labels = descriptor.enum_variants.as_deref().unwrap_or_default();
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(labels.len());
    let mut members = Vec::with_capacity(labels.len());

    for label in labels {
        let mut name = naming.enum_value_name(&escape_label(label));
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        if let Some(first) = seen.insert(name.clone(), label.as_str()) {
            return Err(Error::EnumNameCollision {
                type_name: descriptor.display_name(),
                name,
                first: first.to_string(),
                second: label.clone(),
            });
        }
        members.push(EnumValue {
            name,
            value: label.clone(),
        });
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Oid;
    use crate::naming::Inflection;

    fn members(labels: &[&str]) -> Result<Vec<String>> {
        let descriptor = TypeDescriptor::enumeration(Oid(9000), "app", "op", labels.iter().copied());
        Ok(enum_members(&descriptor, &Inflection)?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    #[test]
    fn test_escape_symbols() {
        assert_eq!(escape_label(""), "_EMPTY_");
        assert_eq!(escape_label(">"), "GREATER_THAN");
        assert_eq!(escape_label("_"), "UNDERSCORE");
        assert_eq!(escape_label(">="), "GREATER_THAN_EQUALS");
        assert_eq!(escape_label("a-b"), "a_MINUS_b");
        assert_eq!(escape_label("snake_case"), "snake_case");
    }

    #[test]
    fn test_member_names() {
        assert_eq!(
            members(&["", ">", "<", "in progress", "2fa", "*"]).unwrap(),
            vec!["_EMPTY_", "GREATER_THAN", "LESS_THAN", "IN_PROGRESS", "_2FA", "ASTERISK"]
        );
    }

    #[test]
    fn test_collision_is_fatal() {
        let err = members(&["in progress", "in_progress"]).unwrap_err();
        match err {
            Error::EnumNameCollision {
                name,
                first,
                second,
                ..
            } => {
                assert_eq!(name, "IN_PROGRESS");
                assert_eq!(first, "in progress");
                assert_eq!(second, "in_progress");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_case_only_difference_collides() {
        assert!(members(&["Active", "active"]).is_err());
    }
}
