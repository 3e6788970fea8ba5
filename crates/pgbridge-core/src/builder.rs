//! Schema construction driven by plugins and hook phases.
//!
//! A build runs in fixed steps:
//!
//! 1. Every [`Plugin`] registers hooks and type overrides, in insertion order.
//! 2. The [`BUILD_PHASE`] folds the [`BuildState`] through its hooks, letting
//!    plugins contribute capabilities.
//! 3. The [`INIT_PHASE`] folds a [`TypeSet`] through its hooks; this is where
//!    object types and their fields are created. Hooks may run the nested
//!    [`OBJECT_FIELDS_PHASE`] and field phases while they work.
//! 4. The resulting types are checked and frozen into a [`Schema`].
//!
//! Any failure aborts the build; a partial schema is never returned.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use pgbridge_pipeline::{BuildState, Extension, FieldScope, HookEngine};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::bridge::{OnConflict, TypeBridge, TypeEntry, TypeOverride};
use crate::catalog::{Oid, TypeCatalog, TypeDescriptor};
use crate::codec::IntervalCache;
use crate::config::BridgeConfig;
use crate::error::{ConversionResult, Error, Result};
use crate::naming::Naming;
use crate::node::NodeIdentity;
use crate::schema::{print_types, SchemaType, TypeRef};
use crate::sql::SqlFragment;

/// Phase folding the [`BuildState`]; context is [`BuildContext`].
pub const BUILD_PHASE: &str = "build";

/// Phase folding the [`TypeSet`]; context is [`InitContext`].
pub const INIT_PHASE: &str = "init";

/// Phase folding the fields of one object type; context is [`ObjectContext`].
pub const OBJECT_FIELDS_PHASE: &str = "object_fields";

/// Well-known capability keys.
pub mod keys {
    /// `Arc<TypeCatalog>`.
    pub const CATALOG: &str = "pgCatalog";
    /// `BridgeConfig`.
    pub const CONFIG: &str = "pgBridgeConfig";
    /// `Arc<Mutex<TypeBridge>>`, see [`InitContext::bridge`](super::InitContext::bridge).
    pub const TYPE_BRIDGE: &str = "pgTypeBridge";
    /// `NodeIdentity`, added by the node plugin.
    pub const NODE_IDENTITY: &str = "nodeIdentity";
}

/// Label under which the builder's own capabilities are registered.
const BUILDER_LABEL: &str = "SchemaBuilder";

/// A contributor to schema construction.
pub trait Plugin: Send + Sync {
    /// Unique plugin name, used in error messages and hook names.
    fn name(&self) -> &str;

    /// Register hooks and overrides on the builder.
    fn build(&self, builder: &mut SchemaBuilder) -> Result<()>;
}

/// Context of the [`BUILD_PHASE`].
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub catalog: Arc<TypeCatalog>,
    pub config: BridgeConfig,
}

/// Context of the [`INIT_PHASE`].
pub struct InitContext {
    state: BuildState,
    hooks: Arc<HookEngine>,
}

impl InitContext {
    /// The build state produced by the build phase.
    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// The engine, for running nested phases.
    pub fn hooks(&self) -> &Arc<HookEngine> {
        &self.hooks
    }

    /// The shared type bridge.
    ///
    /// Hold the lock only around bridge calls; never across a nested phase.
    pub fn bridge(&self) -> Result<Arc<Mutex<TypeBridge>>> {
        Ok(self.state.require_shared::<Mutex<TypeBridge>>(keys::TYPE_BRIDGE)?)
    }

    /// The type catalog.
    pub fn catalog(&self) -> Result<Arc<TypeCatalog>> {
        Ok(self.state.require_shared::<TypeCatalog>(keys::CATALOG)?)
    }

    /// Context for the fields phase of one object type whose fields share
    /// the ambient `scope`.
    pub fn object_context(
        &self,
        descriptor: &TypeDescriptor,
        type_name: impl Into<String>,
        scope: FieldScope,
    ) -> ObjectContext {
        ObjectContext {
            descriptor: descriptor.clone(),
            type_name: type_name.into(),
            scope,
            state: self.state.clone(),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

/// Context of the [`OBJECT_FIELDS_PHASE`].
pub struct ObjectContext {
    descriptor: TypeDescriptor,
    type_name: String,
    scope: FieldScope,
    state: BuildState,
    hooks: Arc<HookEngine>,
}

impl ObjectContext {
    /// The composite type whose object is being built.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Schema name of the object.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Ambient scope of every field of the object. Fields added in the
    /// fields phase should be defined under it.
    pub fn scope(&self) -> &FieldScope {
        &self.scope
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn hooks(&self) -> &HookEngine {
        &self.hooks
    }

    /// The shared type bridge.
    pub fn bridge(&self) -> Result<Arc<Mutex<TypeBridge>>> {
        Ok(self.state.require_shared::<Mutex<TypeBridge>>(keys::TYPE_BRIDGE)?)
    }
}

/// Types contributed during the init phase, in contribution order.
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    types: Vec<TypeRef>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ty: TypeRef) {
        self.types.push(ty);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Collects plugins and builds a [`Schema`].
pub struct SchemaBuilder {
    catalog: Arc<TypeCatalog>,
    config: BridgeConfig,
    hooks: HookEngine,
    bridge: TypeBridge,
    plugins: Vec<Box<dyn Plugin>>,
}

impl SchemaBuilder {
    /// Create a builder over `catalog`.
    pub fn new(catalog: TypeCatalog, config: BridgeConfig) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            bridge: TypeBridge::new(Arc::clone(&catalog), config.clone()),
            catalog,
            config,
            hooks: HookEngine::new(),
            plugins: Vec::new(),
        }
    }

    /// Add a plugin. Plugins are applied in the order they are added.
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Use a different naming service.
    pub fn with_naming(mut self, naming: Arc<dyn Naming>) -> Self {
        self.bridge = self.bridge.with_naming(naming);
        self
    }

    /// Share an existing interval cache.
    pub fn with_interval_cache(mut self, cache: Arc<IntervalCache>) -> Self {
        self.bridge = self.bridge.with_interval_cache(cache);
        self
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The hook engine, for registering hooks.
    pub fn hooks_mut(&mut self) -> &mut HookEngine {
        &mut self.hooks
    }

    /// The type bridge, before any type is resolved.
    pub fn bridge(&self) -> &TypeBridge {
        &self.bridge
    }

    /// Register an explicit type mapping.
    pub fn register_override(&mut self, id: Oid, mapping: TypeOverride, on_conflict: OnConflict) -> Result<bool> {
        self.bridge.register_override(id, mapping, on_conflict)
    }

    /// Apply the plugins, run the build and init phases, and freeze the result.
    #[instrument(skip(self), fields(plugins = self.plugins.len()))]
    pub fn build(mut self) -> Result<Schema> {
        self.config.validate()?;

        let plugins = std::mem::take(&mut self.plugins);
        let mut names: Vec<&str> = Vec::with_capacity(plugins.len());
        for plugin in &plugins {
            let name = plugin.name();
            if names.contains(&name) {
                return Err(Error::Configuration(format!("plugin {} is added twice", name)));
            }
            names.push(name);
            debug!(plugin = name, "Applying plugin");
            plugin.build(&mut self)?;
        }

        let SchemaBuilder {
            catalog,
            config,
            hooks,
            bridge,
            ..
        } = self;
        let hooks = Arc::new(hooks);
        let bridge = Arc::new(Mutex::new(bridge));

        let state = BuildState::new().extend(
            Extension::new()
                .with_shared(keys::CATALOG, Arc::clone(&catalog))
                .with(keys::CONFIG, config.clone())
                .with_shared(keys::TYPE_BRIDGE, Arc::clone(&bridge)),
            BUILDER_LABEL,
        )?;
        let build_context = BuildContext { catalog, config };
        let state = hooks.run(BUILD_PHASE, state, &build_context)?;
        debug!(
            hooks = ?hooks.hook_names(BUILD_PHASE),
            capabilities = state.len(),
            version = state.version(),
            "Build phase complete"
        );

        let init = InitContext {
            state,
            hooks: Arc::clone(&hooks),
        };
        let contributed = hooks.run(INIT_PHASE, TypeSet::new(), &init)?;
        debug!(
            hooks = init.hooks.hook_count(INIT_PHASE),
            types = contributed.len(),
            "Init phase complete"
        );

        let frozen = bridge.lock().clone();
        let schema = Schema::assemble(frozen, &contributed, init.state)?;
        info!(
            types = schema.types.len(),
            resolved = schema.bridge.types().len(),
            codecs = schema.bridge.codecs().len(),
            "Schema built"
        );
        Ok(schema)
    }
}

/// A fully built schema, read-only and safe to share across requests.
pub struct Schema {
    bridge: Arc<TypeBridge>,
    types: BTreeMap<String, TypeRef>,
    state: BuildState,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("resolved", &self.bridge.types().len())
            .field("codecs", &self.bridge.codecs().len())
            .finish()
    }
}

impl Schema {
    fn assemble(bridge: TypeBridge, contributed: &TypeSet, state: BuildState) -> Result<Schema> {
        let mut types = BTreeMap::new();
        let roots = bridge
            .types()
            .iter()
            .flat_map(|(_, entry)| std::iter::once(&entry.output).chain(entry.input.as_ref()))
            .chain(contributed.iter());
        for root in roots {
            collect_named(root, &mut types)?;
        }
        Ok(Schema {
            bridge: Arc::new(bridge),
            types,
            state,
        })
    }

    /// Look up a named type.
    pub fn type_named(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    /// Names of all types, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Resolved types for a database type id.
    pub fn type_for(&self, id: Oid) -> Option<&TypeEntry> {
        self.bridge.types().get(id)
    }

    /// The frozen type bridge.
    pub fn bridge(&self) -> &TypeBridge {
        &self.bridge
    }

    /// The final build state.
    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// The node identity capability, if the node plugin was used.
    pub fn node_identity(&self) -> Option<Arc<NodeIdentity>> {
        self.state.get_shared::<NodeIdentity>(keys::NODE_IDENTITY)
    }

    /// Decode a raw stored value of type `id`.
    pub fn decode(&self, id: Oid, value: &Value) -> ConversionResult<Value> {
        self.bridge.decode(id, value)
    }

    /// Encode a schema value of type `id` for the query compiler.
    pub fn encode(&self, id: Oid, value: &Value) -> ConversionResult<SqlFragment> {
        self.bridge.encode(id, value)
    }

    /// Render every named type as SDL, sorted by name.
    pub fn print(&self) -> String {
        print_types(self.types.values())
    }
}

/// Record `ty` and every named type reachable from it, rejecting two distinct
/// types with one name.
fn collect_named(ty: &TypeRef, seen: &mut BTreeMap<String, TypeRef>) -> Result<()> {
    if let Some(name) = ty.name() {
        if let Some(existing) = seen.get(name) {
            if Arc::ptr_eq(existing, ty) {
                return Ok(());
            }
            return Err(Error::DuplicateTypeName { name: name.to_string() });
        }
        seen.insert(name.to_string(), Arc::clone(ty));
    }

    match &**ty {
        SchemaType::List(inner) | SchemaType::NonNull(inner) => collect_named(inner, seen),
        SchemaType::Alias(alias) => collect_named(&alias.delegate, seen),
        SchemaType::Object(object) => object
            .fields()
            .iter()
            .try_for_each(|field| collect_named(&field.ty, seen)),
        SchemaType::InputObject(object) => object
            .fields()
            .iter()
            .try_for_each(|field| collect_named(&field.ty, seen)),
        SchemaType::Scalar(_) | SchemaType::Enum(_) => Ok(()),
    }
}
