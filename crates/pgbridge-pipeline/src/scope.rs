//! Field-private scope metadata.
//!
//! When a producer defines a field it attaches a [`FieldScope`]: a small map of
//! tags describing where the field came from (which column, whether it is a
//! node identifier, ...). The scope is written once, merged over the ambient
//! scope of the owning type, and afterwards only reachable through that field's
//! own [`FieldContext`] and [`FieldDefinition`]. Sibling fields never observe
//! each other's tags because every field owns its own copy.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{HookError, PipelineError, Result};
use crate::hooks::HookEngine;

/// Phase run for every field defined through a [`FieldScopeTracker`].
pub const FIELD_PHASE: &str = "field";

/// Tags attached to one field or one composite type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldScope {
    tags: BTreeMap<String, Value>,
}

impl FieldScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Get a tag value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.tags.get(key)
    }

    /// Get a tag as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Check if a tag is present and truthy (not `null` or `false`).
    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(Value::Null) | Some(Value::Bool(false)))
    }

    /// Overlay `self` on top of `parent`; tags of `self` win on conflict.
    pub fn merged_over(&self, parent: &FieldScope) -> FieldScope {
        let mut tags = parent.tags.clone();
        tags.extend(self.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        FieldScope { tags }
    }

    /// Iterate over tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Context visible while one field is being defined and in the field phase.
#[derive(Debug, Clone)]
pub struct FieldContext {
    owner: String,
    field_name: String,
    scope: FieldScope,
}

impl FieldContext {
    /// Name of the type that owns the field.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Name of the field being defined.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The field's scope, merged over its owner's scope.
    pub fn scope(&self) -> &FieldScope {
        &self.scope
    }
}

/// A field value together with the scope it was defined under.
#[derive(Clone)]
pub struct FieldDefinition<S> {
    name: String,
    value: S,
    scope: FieldScope,
}

impl<S> FieldDefinition<S> {
    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field value produced by the thunk and the field phase.
    pub fn value(&self) -> &S {
        &self.value
    }

    /// This field's own scope.
    pub fn scope(&self) -> &FieldScope {
        &self.scope
    }

    /// Consume the definition, returning the field value.
    pub fn into_value(self) -> S {
        self.value
    }
}

impl<S: fmt::Debug> fmt::Debug for FieldDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Defines fields of one composite type, each with its own private scope.
pub struct FieldScopeTracker<'e> {
    hooks: &'e HookEngine,
    phase: String,
    owner: String,
    parent: FieldScope,
}

impl<'e> FieldScopeTracker<'e> {
    /// Create a tracker for the fields of `owner`, whose ambient scope is `parent`.
    pub fn new(hooks: &'e HookEngine, owner: impl Into<String>, parent: FieldScope) -> Self {
        Self {
            hooks,
            phase: FIELD_PHASE.to_string(),
            owner: owner.into(),
            parent,
        }
    }

    /// Run a different phase than [`FIELD_PHASE`] for each field.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// The ambient scope shared by every field of the owner.
    pub fn parent_scope(&self) -> &FieldScope {
        &self.parent
    }

    /// Define one field.
    ///
    /// The field's scope is `tags` merged over the owner's scope. `definition`
    /// receives the field's context and produces the field value, which is
    /// then folded through the field phase with the same context.
    pub fn define_field<S, F>(&self, name: &str, tags: FieldScope, definition: F) -> Result<FieldDefinition<S>>
    where
        S: 'static,
        F: FnOnce(&FieldContext) -> std::result::Result<S, HookError>,
    {
        let context = FieldContext {
            owner: self.owner.clone(),
            field_name: name.to_string(),
            scope: tags.merged_over(&self.parent),
        };

        let value = definition(&context).map_err(|source| PipelineError::FieldDefinition {
            field: format!("{}.{}", self.owner, name),
            source,
        })?;
        let value = self.hooks.run(&self.phase, value, &context)?;

        Ok(FieldDefinition {
            name: context.field_name,
            value,
            scope: context.scope,
        })
    }
}

/// Ordered set of field definitions of one composite type.
#[derive(Clone)]
pub struct FieldSet<S> {
    owner: String,
    fields: Vec<FieldDefinition<S>>,
}

impl<S> FieldSet<S> {
    /// Create an empty set for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field; names must be unique within the set.
    pub fn insert(&mut self, field: FieldDefinition<S>) -> Result<()> {
        if self.get(field.name()).is_some() {
            return Err(PipelineError::DuplicateField {
                owner: self.owner.clone(),
                field: field.name,
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDefinition<S>> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition<S>> {
        self.fields.iter()
    }

    /// The owner's name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the set, returning the field values in order.
    pub fn into_values(self) -> Vec<S> {
        self.fields.into_iter().map(FieldDefinition::into_value).collect()
    }
}

impl<S: fmt::Debug> fmt::Debug for FieldSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet")
            .field("owner", &self.owner)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_sibling_scopes_are_isolated() {
        let engine = HookEngine::new();
        let tracker = FieldScopeTracker::new(&engine, "User", FieldScope::new());

        let a = tracker
            .define_field("a", FieldScope::new().with_tag("isSpecialField", true), |_| Ok("A"))
            .unwrap();
        let b = tracker
            .define_field("b", FieldScope::new(), |ctx| {
                assert!(!ctx.scope().is_set("isSpecialField"));
                Ok("B")
            })
            .unwrap();

        assert!(a.scope().is_set("isSpecialField"));
        assert!(!b.scope().is_set("isSpecialField"));
        assert!(b.scope().get("isSpecialField").is_none());
    }

    #[test]
    fn test_child_tags_override_parent() {
        let engine = HookEngine::new();
        let parent = FieldScope::new()
            .with_tag("isTableType", true)
            .with_tag("origin", "table");
        let tracker = FieldScopeTracker::new(&engine, "User", parent);

        let field = tracker
            .define_field("id", FieldScope::new().with_tag("origin", "column"), |ctx| {
                Ok(ctx.scope().get_str("origin").map(str::to_string))
            })
            .unwrap();

        assert_eq!(field.value().as_deref(), Some("column"));
        assert!(field.scope().is_set("isTableType"));
        assert_eq!(field.scope().get_str("origin"), Some("column"));
    }

    #[test]
    fn test_field_phase_sees_only_own_scope() {
        let seen: Arc<Mutex<Vec<(String, bool)>>> = Arc::default();
        let mut engine = HookEngine::new();
        let record = Arc::clone(&seen);
        engine
            .register(FIELD_PHASE, "observe", move |value: u32, ctx: &FieldContext| {
                record
                    .lock()
                    .unwrap()
                    .push((ctx.field_name().to_string(), ctx.scope().is_set("isSpecialField")));
                Ok(value + 1)
            })
            .unwrap();

        let tracker = FieldScopeTracker::new(&engine, "Post", FieldScope::new());
        let a = tracker
            .define_field("a", FieldScope::new().with_tag("isSpecialField", true), |_| Ok(1u32))
            .unwrap();
        let b = tracker
            .define_field("b", FieldScope::new(), |_| Ok(10u32))
            .unwrap();

        assert_eq!(*a.value(), 2);
        assert_eq!(*b.value(), 11);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a".to_string(), true), ("b".to_string(), false)]
        );
    }

    #[test]
    fn test_thunk_failure_names_field() {
        let engine = HookEngine::new();
        let tracker = FieldScopeTracker::new(&engine, "User", FieldScope::new());
        let err = tracker
            .define_field::<u8, _>("broken", FieldScope::new(), |_| Err("no type".into()))
            .unwrap_err();
        assert!(err.to_string().contains("User.broken"));
    }

    #[test]
    fn test_field_set_rejects_duplicates() {
        let engine = HookEngine::new();
        let tracker = FieldScopeTracker::new(&engine, "User", FieldScope::new());
        let mut set = FieldSet::new("User");

        set.insert(tracker.define_field("id", FieldScope::new(), |_| Ok(1)).unwrap())
            .unwrap();
        let err = set
            .insert(tracker.define_field("id", FieldScope::new(), |_| Ok(2)).unwrap())
            .unwrap_err();

        assert!(matches!(err, PipelineError::DuplicateField { .. }));
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_values(), vec![1]);
    }

    #[test]
    fn test_truthiness() {
        let scope = FieldScope::new()
            .with_tag("yes", true)
            .with_tag("no", false)
            .with_tag("nothing", Value::Null)
            .with_tag("name", "id");
        assert!(scope.is_set("yes"));
        assert!(!scope.is_set("no"));
        assert!(!scope.is_set("nothing"));
        assert!(!scope.is_set("absent"));
        assert!(scope.is_set("name"));
    }
}
