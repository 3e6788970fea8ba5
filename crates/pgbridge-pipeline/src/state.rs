//! Append-only capability container shared by every schema contributor.
//!
//! A [`BuildState`] maps capability names to values. Contributors never mutate
//! a state in place: they call [`BuildState::extend`] with an [`Extension`] and
//! receive a new state that shares every untouched capability with the old one.
//! Introducing a key that already exists is a configuration error naming both
//! contributors, so no plugin can silently shadow another's capability.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{PipelineError, Result};

type Capability = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Entry {
    label: Arc<str>,
    value: Capability,
}

/// A batch of capabilities to add to a [`BuildState`].
#[derive(Default)]
pub struct Extension {
    additions: Vec<(String, Capability)>,
}

impl Extension {
    /// Create an empty extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability by value.
    pub fn with<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> Self {
        self.with_shared(key, Arc::new(value))
    }

    /// Add a capability that is already shared elsewhere.
    pub fn with_shared<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: Arc<T>) -> Self {
        let value: Capability = value;
        self.additions.push((key.into(), value));
        self
    }

    /// Number of capabilities in this extension.
    pub fn len(&self) -> usize {
        self.additions.len()
    }

    /// Check if the extension adds nothing.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty()
    }
}

/// Versioned, append-only map of named capabilities.
///
/// Cloning a state is cheap: capability values are reference counted and
/// shared between every version that contains them.
#[derive(Clone, Default)]
pub struct BuildState {
    entries: BTreeMap<String, Entry>,
    version: u64,
}

impl BuildState {
    /// Create an empty state at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a new state containing every capability of `self` plus `additions`.
    ///
    /// Fails with [`PipelineError::DuplicateCapability`] if any added key is
    /// already present, either in `self` or earlier in the same extension.
    pub fn extend(&self, additions: Extension, label: &str) -> Result<BuildState> {
        let label: Arc<str> = Arc::from(label);
        let mut entries = self.entries.clone();

        for (key, value) in additions.additions {
            if let Some(existing) = entries.get(&key) {
                return Err(PipelineError::DuplicateCapability {
                    key,
                    existing_label: existing.label.to_string(),
                    label: label.to_string(),
                });
            }
            trace!(key = %key, label = %label, "Adding capability");
            entries.insert(
                key,
                Entry {
                    label: Arc::clone(&label),
                    value,
                },
            );
        }

        Ok(BuildState {
            entries,
            version: self.version + 1,
        })
    }

    /// Get a capability by key, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.value.downcast_ref::<T>()
    }

    /// Get a shared handle to a capability by key, if present and of type `T`.
    pub fn get_shared<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = Arc::clone(&self.entries.get(key)?.value);
        value.downcast::<T>().ok()
    }

    /// Get a capability that must exist.
    pub fn require<T: Any + Send + Sync>(&self, key: &str) -> Result<&T> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| PipelineError::MissingCapability { key: key.to_string() })?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| PipelineError::CapabilityType {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Get a shared handle to a capability that must exist.
    pub fn require_shared<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| PipelineError::MissingCapability { key: key.to_string() })?;
        Arc::clone(&entry.value)
            .downcast::<T>()
            .map_err(|_| PipelineError::CapabilityType {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Check if a capability key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The label of the contributor that introduced `key`.
    pub fn label_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| &*entry.label)
    }

    /// All capability keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of successful extensions applied since the empty state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the state holds no capabilities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildState")
            .field("version", &self.version)
            .field(
                "capabilities",
                &self
                    .entries
                    .iter()
                    .map(|(key, entry)| (key.as_str(), &*entry.label))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_adds_capabilities() {
        let state = BuildState::new();
        let next = state
            .extend(Extension::new().with("pgSql", 42u32), "SqlPlugin")
            .unwrap();

        assert!(state.is_empty());
        assert_eq!(next.len(), 1);
        assert_eq!(next.get::<u32>("pgSql"), Some(&42));
        assert_eq!(next.label_of("pgSql"), Some("SqlPlugin"));
        assert_eq!(next.version(), 1);
    }

    #[test]
    fn test_extend_collision_names_both_labels() {
        let state = BuildState::new()
            .extend(Extension::new().with("pgSql", 1u32), "FirstPlugin")
            .unwrap();

        let err = state
            .extend(Extension::new().with("pgSql", 2u32), "SecondPlugin")
            .unwrap_err();

        match &err {
            PipelineError::DuplicateCapability {
                key,
                existing_label,
                label,
            } => {
                assert_eq!(key, "pgSql");
                assert_eq!(existing_label, "FirstPlugin");
                assert_eq!(label, "SecondPlugin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("FirstPlugin"));
        assert!(message.contains("SecondPlugin"));

        // The base state is untouched.
        assert_eq!(state.get::<u32>("pgSql"), Some(&1));
    }

    #[test]
    fn test_extend_collision_within_one_extension() {
        let err = BuildState::new()
            .extend(
                Extension::new().with("helper", 1u8).with("helper", 2u8),
                "Greedy",
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateCapability { .. }));
    }

    #[test]
    fn test_versions_share_values() {
        let shared = Arc::new(String::from("inflector"));
        let v1 = BuildState::new()
            .extend(Extension::new().with_shared("naming", Arc::clone(&shared)), "core")
            .unwrap();
        let v2 = v1
            .extend(Extension::new().with("extra", true), "plugin")
            .unwrap();

        let a = v1.get_shared::<String>("naming").unwrap();
        let b = v2.get_shared::<String>("naming").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &shared));
        assert!(!v1.contains("extra"));
        assert_eq!(v2.keys().collect::<Vec<_>>(), vec!["extra", "naming"]);
    }

    #[test]
    fn test_require_reports_missing_and_mistyped() {
        let state = BuildState::new()
            .extend(Extension::new().with("count", 3usize), "core")
            .unwrap();

        assert!(matches!(
            state.require::<usize>("missing"),
            Err(PipelineError::MissingCapability { .. })
        ));
        assert!(matches!(
            state.require::<String>("count"),
            Err(PipelineError::CapabilityType { .. })
        ));
        assert_eq!(*state.require::<usize>("count").unwrap(), 3);
        assert_eq!(*state.require_shared::<usize>("count").unwrap(), 3);
    }
}
