//! Bridge configuration.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default bound on type-graph nesting before resolution fails.
pub const DEFAULT_RECURSION_DEPTH_LIMIT: usize = 50;

/// Default number of parsed interval literals kept in the cache.
pub const DEFAULT_INTERVAL_CACHE_CAPACITY: usize = 500;

/// Options consumed by the type bridge and the standard plugins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Pass JSON values through as structured values instead of opaque strings.
    pub use_structured_json: bool,

    /// Use the legacy `Json`/`Uuid` scalar names instead of `JSON`/`UUID`.
    pub use_legacy_names: bool,

    /// Make the items of set-returning results non-null.
    pub forbid_null_in_setof_results: bool,

    /// Maximum nesting depth when resolving a type graph.
    pub recursion_depth_limit: usize,

    /// Capacity of the shared interval parse cache.
    pub interval_cache_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            use_structured_json: false,
            use_legacy_names: false,
            forbid_null_in_setof_results: false,
            recursion_depth_limit: DEFAULT_RECURSION_DEPTH_LIMIT,
            interval_cache_capacity: DEFAULT_INTERVAL_CACHE_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Create a configuration with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON object; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BridgeConfig = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid bridge configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set whether JSON values are structured.
    pub fn with_structured_json(mut self, enabled: bool) -> Self {
        self.use_structured_json = enabled;
        self
    }

    /// Set whether legacy scalar names are used.
    pub fn with_legacy_names(mut self, enabled: bool) -> Self {
        self.use_legacy_names = enabled;
        self
    }

    /// Set whether set-returning results forbid null items.
    pub fn with_forbid_null_in_setof_results(mut self, enabled: bool) -> Self {
        self.forbid_null_in_setof_results = enabled;
        self
    }

    /// Set the recursion depth limit.
    pub fn with_recursion_depth_limit(mut self, limit: usize) -> Self {
        self.recursion_depth_limit = limit;
        self
    }

    /// Set the interval cache capacity.
    pub fn with_interval_cache_capacity(mut self, capacity: usize) -> Self {
        self.interval_cache_capacity = capacity;
        self
    }

    /// Reject option values the bridge cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.recursion_depth_limit == 0 {
            return Err(Error::Configuration(
                "recursion_depth_limit must be at least 1".to_string(),
            ));
        }
        if self.interval_cache_capacity == 0 {
            return Err(Error::Configuration(
                "interval_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
