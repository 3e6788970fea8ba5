//! Opaque global node identifiers.
//!
//! An identifier is the base64 encoding of the JSON array
//! `[type_alias, ...key_parts]`. Aliases let a schema type be renamed without
//! invalidating identifiers that clients already hold.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{ConversionError, ConversionResult};

/// Encode `alias` and key parts into an opaque identifier.
pub fn encode_node_id(alias: &str, key: &[Value]) -> String {
    let mut parts = Vec::with_capacity(key.len() + 1);
    parts.push(Value::String(alias.to_string()));
    parts.extend(key.iter().cloned());
    STANDARD.encode(Value::Array(parts).to_string())
}

/// Decode an identifier into its alias and key parts.
///
/// The payload must be a JSON array of at least two elements whose first
/// element is a string.
pub fn decode_node_id(opaque: &str) -> ConversionResult<(String, Vec<Value>)> {
    let invalid = |reason: &str| ConversionError::InvalidNodeId(reason.to_string());
    let bytes = STANDARD
        .decode(opaque.trim())
        .map_err(|_| invalid("not base64"))?;
    let payload: Value = serde_json::from_slice(&bytes).map_err(|_| invalid("payload is not JSON"))?;
    let Value::Array(mut parts) = payload else {
        return Err(invalid("payload is not an array"));
    };
    if parts.len() < 2 {
        return Err(invalid("payload has no key parts"));
    }
    let Value::String(alias) = parts.remove(0) else {
        return Err(invalid("type alias is not a string"));
    };
    Ok((alias, parts))
}

/// Node identifier codec with type aliasing.
///
/// Safe to share across requests; alias changes are visible to concurrent
/// readers immediately.
#[derive(Debug, Default)]
pub struct NodeIdentity {
    /// Type name to alias.
    aliases: DashMap<String, String>,
    /// Alias to type name.
    types: DashMap<String, String>,
}

impl NodeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue identifiers for `type_name` under `alias`, and map `alias` back
    /// to `type_name` when decoding.
    pub fn set_alias(&self, type_name: impl Into<String>, alias: impl Into<String>) {
        let (type_name, alias) = (type_name.into(), alias.into());
        if let Some(previous) = self.aliases.insert(type_name.clone(), alias.clone()) {
            self.types.remove(&previous);
        }
        self.types.insert(alias, type_name);
    }

    /// The alias identifiers of `type_name` carry; the name itself if unaliased.
    pub fn get_alias(&self, type_name: &str) -> String {
        self.aliases
            .get(type_name)
            .map(|alias| alias.value().clone())
            .unwrap_or_else(|| type_name.to_string())
    }

    /// The type an alias refers to; the alias itself if unknown.
    pub fn resolve_type(&self, alias: &str) -> String {
        self.types
            .get(alias)
            .map(|name| name.value().clone())
            .unwrap_or_else(|| alias.to_string())
    }

    /// Encode an identifier for a row of `type_name`.
    pub fn encode(&self, type_name: &str, key: &[Value]) -> String {
        encode_node_id(&self.get_alias(type_name), key)
    }

    /// Decode an identifier into the current type name and key parts.
    pub fn decode(&self, opaque: &str) -> ConversionResult<(String, Vec<Value>)> {
        let (alias, key) = decode_node_id(opaque)?;
        Ok((self.resolve_type(&alias), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_is_base64_json_array() {
        let id = encode_node_id("User", &[json!(1)]);
        assert_eq!(id, STANDARD.encode(r#"["User",1]"#));
        assert_eq!(decode_node_id(&id).unwrap(), ("User".to_string(), vec![json!(1)]));
    }

    #[test]
    fn test_composite_keys() {
        let id = encode_node_id("Membership", &[json!(7), json!("admin")]);
        let (alias, key) = decode_node_id(&id).unwrap();
        assert_eq!(alias, "Membership");
        assert_eq!(key, vec![json!(7), json!("admin")]);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        let cases = [
            "%%%".to_string(),
            STANDARD.encode("not json"),
            STANDARD.encode(r#"{"a":1}"#),
            STANDARD.encode(r#"["User"]"#),
            STANDARD.encode(r#"[1, 2]"#),
        ];
        for case in cases {
            assert!(
                matches!(decode_node_id(&case), Err(ConversionError::InvalidNodeId(_))),
                "{case:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_aliases_survive_renames() {
        let identity = NodeIdentity::new();
        let old_id = identity.encode("User", &[json!(1)]);

        identity.set_alias("Person", "User");
        let new_id = identity.encode("Person", &[json!(1)]);
        assert_eq!(old_id, new_id);
        assert_eq!(identity.decode(&old_id).unwrap().0, "Person");
        assert_eq!(identity.get_alias("Person"), "User");
        assert_eq!(identity.get_alias("Post"), "Post");
    }

    #[test]
    fn test_realias_drops_previous_mapping() {
        let identity = NodeIdentity::new();
        identity.set_alias("Person", "User");
        identity.set_alias("Person", "Member");
        assert_eq!(identity.resolve_type("Member"), "Person");
        assert_eq!(identity.resolve_type("User"), "User");
    }
}
