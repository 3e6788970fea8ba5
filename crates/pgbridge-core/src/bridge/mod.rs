//! Type bridge: database type descriptors to schema types and codecs.
//!
//! [`TypeBridge::resolve`] maps a type id to its schema output type (and
//! [`TypeBridge::resolve_input`] to its input type), recursing through
//! arrays, domains, and ranges. Each id is resolved once; later calls return
//! the same type instances. The codec for every resolved id is synthesized
//! alongside and served by [`TypeBridge::decode`] and [`TypeBridge::encode`].

mod depth;
mod enums;
mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::catalog::{category, Oid, TypeCatalog, TypeDescriptor, TypeKind};
use crate::codec::{ArrayCodec, BigNumberCodec, BooleanCodec, Codec, IntervalCache, RangeCodec};
use crate::config::BridgeConfig;
use crate::error::{ConversionError, ConversionResult, Error, Result};
use crate::naming::{Inflection, Naming};
use crate::schema::{
    AliasType, EnumType, Field, InputField, InputObjectType, ObjectType, SchemaType, StandardScalars,
    TypeRef,
};
use crate::sql::SqlFragment;

use depth::Depth;

pub use enums::{escape_label, EMPTY_MEMBER};
pub use registry::{ConversionRegistry, OnConflict, SchemaTypeRegistry, TypeEntry, TypeOverride};

/// Bound and range object types shared by all ranges over one subtype.
#[derive(Debug, Clone)]
struct RangeShape {
    output: TypeRef,
    input: Option<TypeRef>,
}

/// Resolves database types into schema types and value codecs.
///
/// Resolution takes `&mut self` and happens during the build; afterwards the
/// bridge is only read, so decode/encode need no locking.
#[derive(Debug, Clone)]
pub struct TypeBridge {
    catalog: Arc<TypeCatalog>,
    naming: Arc<dyn Naming>,
    config: BridgeConfig,
    scalars: StandardScalars,
    interval_cache: Arc<IntervalCache>,
    overrides: BTreeMap<Oid, TypeOverride>,
    types: SchemaTypeRegistry,
    codecs: ConversionRegistry,
    range_shapes: BTreeMap<String, RangeShape>,
    setof: BTreeMap<Oid, TypeRef>,
}

impl TypeBridge {
    /// Create a bridge over `catalog` with the default naming.
    pub fn new(catalog: Arc<TypeCatalog>, config: BridgeConfig) -> Self {
        Self {
            naming: Arc::new(Inflection),
            scalars: StandardScalars::new(config.use_legacy_names),
            interval_cache: Arc::new(IntervalCache::new(config.interval_cache_capacity)),
            catalog,
            config,
            overrides: BTreeMap::new(),
            types: SchemaTypeRegistry::default(),
            codecs: ConversionRegistry::default(),
            range_shapes: BTreeMap::new(),
            setof: BTreeMap::new(),
        }
    }

    /// Use a different naming service.
    pub fn with_naming(mut self, naming: Arc<dyn Naming>) -> Self {
        self.naming = naming;
        self
    }

    /// Share an existing interval cache.
    pub fn with_interval_cache(mut self, cache: Arc<IntervalCache>) -> Self {
        self.interval_cache = cache;
        self
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn naming(&self) -> &Arc<dyn Naming> {
        &self.naming
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn scalars(&self) -> &StandardScalars {
        &self.scalars
    }

    pub fn interval_cache(&self) -> &Arc<IntervalCache> {
        &self.interval_cache
    }

    /// Resolved types so far.
    pub fn types(&self) -> &SchemaTypeRegistry {
        &self.types
    }

    /// Synthesized and overridden codecs so far.
    pub fn codecs(&self) -> &ConversionRegistry {
        &self.codecs
    }

    /// Check if `id` has an explicit override.
    pub fn has_override(&self, id: Oid) -> bool {
        self.overrides.contains_key(&id)
    }

    /// Register an explicit mapping for `id`.
    ///
    /// Returns `Ok(false)` if an override already exists and `on_conflict` is
    /// [`OnConflict::Yield`]. An override registered after `id` was resolved
    /// could never apply and is rejected.
    pub fn register_override(&mut self, id: Oid, mapping: TypeOverride, on_conflict: OnConflict) -> Result<bool> {
        let type_name = self.display_name(id);
        if self.types.contains(id) {
            return Err(Error::Configuration(format!(
                "type {} was resolved before its override was registered",
                type_name
            )));
        }
        if self.overrides.contains_key(&id) {
            return match on_conflict {
                OnConflict::Fail => Err(Error::DuplicateOverride { type_name }),
                OnConflict::Yield => {
                    warn!(type_name = %type_name, "Type override yields to an existing one");
                    Ok(false)
                }
            };
        }
        trace!(type_name = %type_name, output = %mapping.output, "Registered type override");
        self.overrides.insert(id, mapping);
        Ok(true)
    }

    /// Resolve the output type for `id`.
    pub fn resolve(&mut self, id: Oid) -> Result<TypeRef> {
        Ok(self.entry(id)?.output)
    }

    /// Resolve the input type for `id`, if the type can be used as input.
    pub fn resolve_input(&mut self, id: Oid) -> Result<Option<TypeRef>> {
        Ok(self.entry(id)?.input)
    }

    /// Resolve both types for `id`.
    pub fn entry(&mut self, id: Oid) -> Result<TypeEntry> {
        self.resolve_at(id, None, Depth::root(self.config.recursion_depth_limit))
    }

    /// Output type of a set-returning result of `id`: a list whose items are
    /// non-null if the configuration forbids null items.
    pub fn setof_output(&mut self, id: Oid) -> Result<TypeRef> {
        if let Some(ty) = self.setof.get(&id) {
            return Ok(Arc::clone(ty));
        }
        let item = self.resolve(id)?;
        let item = if self.config.forbid_null_in_setof_results {
            SchemaType::non_null(item)
        } else {
            item
        };
        let ty = SchemaType::list(item);
        self.setof.insert(id, Arc::clone(&ty));
        Ok(ty)
    }

    /// Codec for `id`. Types without a registered codec pass values through.
    pub fn codec(&self, id: Oid) -> ConversionResult<Codec> {
        let registered = self
            .codecs
            .get(id)
            .or_else(|| self.overrides.get(&id).and_then(|o| o.codec.as_ref()));
        if let Some(codec) = registered {
            return Ok(codec.clone());
        }
        self.catalog
            .get(id)
            .map(|d| Codec::identity(d.qualified_name()))
            .ok_or(ConversionError::UnknownType(id))
    }

    /// Decode a raw stored value of type `id`.
    pub fn decode(&self, id: Oid, value: &Value) -> ConversionResult<Value> {
        self.codec(id)?.decode(value)
    }

    /// Encode a schema value of type `id` for the query compiler.
    pub fn encode(&self, id: Oid, value: &Value) -> ConversionResult<SqlFragment> {
        self.codec(id)?.encode(value)
    }

    fn display_name(&self, id: Oid) -> String {
        self.catalog
            .get(id)
            .map(TypeDescriptor::display_name)
            .unwrap_or_else(|| format!("type {}", id))
    }

    fn codec_or_identity(&self, descriptor: &TypeDescriptor) -> Codec {
        self.codecs
            .get(descriptor.id)
            .cloned()
            .unwrap_or_else(|| Codec::identity(descriptor.qualified_name()))
    }

    fn resolve_at(&mut self, id: Oid, referrer: Option<&TypeDescriptor>, depth: Depth) -> Result<TypeEntry> {
        if let Some(entry) = self.types.get(id) {
            return Ok(entry.clone());
        }

        let catalog = Arc::clone(&self.catalog);
        let descriptor = catalog.require(id, referrer)?;
        let depth = depth.enter(descriptor)?;
        debug!(
            type_name = %descriptor.display_name(),
            kind = %descriptor.kind,
            depth = depth.level(),
            "Resolving type"
        );

        let (entry, codec) = self
            .synthesize(descriptor, depth)
            .map_err(|e| e.resolving(descriptor))?;
        if let Some(codec) = codec {
            self.codecs.insert(id, codec);
        }
        Ok(self.types.insert(id, entry))
    }

    fn synthesize(&mut self, descriptor: &TypeDescriptor, depth: Depth) -> Result<(TypeEntry, Option<Codec>)> {
        if let Some(mapping) = self.overrides.get(&descriptor.id) {
            let entry = TypeEntry {
                output: Arc::clone(&mapping.output),
                input: mapping.input.clone(),
            };
            return Ok((entry, mapping.codec.clone()));
        }

        match descriptor.kind {
            TypeKind::Enum => Ok((self.enum_type(descriptor)?, None)),
            TypeKind::Range => self.range_type(descriptor, depth),
            TypeKind::Domain => self.domain_type(descriptor, depth),
            TypeKind::Array => self.array_type(descriptor, depth),
            TypeKind::Base | TypeKind::Composite => self.category_fallback(descriptor, depth),
        }
    }

    fn child(&self, descriptor: &TypeDescriptor, child: Option<Oid>, what: &str) -> Result<Oid> {
        child.ok_or_else(|| {
            Error::Configuration(format!("{} ({}) has no {}", descriptor.display_name(), descriptor.kind, what))
        })
    }

    fn enum_type(&self, descriptor: &TypeDescriptor) -> Result<TypeEntry> {
        let values = enums::enum_members(descriptor, self.naming.as_ref())?;
        let ty = Arc::new(SchemaType::Enum(EnumType {
            name: self.naming.type_name(descriptor),
            description: descriptor.description.clone(),
            values,
        }));
        Ok(TypeEntry {
            input: Some(Arc::clone(&ty)),
            output: ty,
        })
    }

    fn range_type(&mut self, descriptor: &TypeDescriptor, depth: Depth) -> Result<(TypeEntry, Option<Codec>)> {
        let sub_id = self.child(descriptor, descriptor.range_sub_type, "range subtype")?;
        let catalog = Arc::clone(&self.catalog);
        let sub_descriptor = catalog.require(sub_id, Some(descriptor))?;
        // Domains are transparent, so a domain over a composite is refused too.
        let mut base = sub_descriptor;
        let mut chain = depth;
        while base.kind == TypeKind::Domain {
            chain = chain.enter(base)?;
            let Some(base_id) = base.domain_base_type else { break };
            base = catalog.require(base_id, Some(base))?;
        }
        if base.kind == TypeKind::Composite {
            let subject = if base.id == sub_descriptor.id {
                format!("{} is a composite type", base.display_name())
            } else {
                format!("{} is a domain over composite type {}", sub_descriptor.display_name(), base.display_name())
            };
            return Err(Error::Configuration(format!(
                "range subtype {subject}, whose literals cannot be split into bounds"
            )));
        }

        let sub = self.resolve_at(sub_id, Some(descriptor), depth)?;
        let sub_name = sub
            .output
            .name()
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "range subtype {} resolves to unnamed type {}",
                    sub_descriptor.display_name(),
                    sub.output
                ))
            })?
            .to_string();

        let shape = match self.range_shapes.get(&sub_name) {
            Some(shape) => shape.clone(),
            None => {
                let shape = self.range_shape(&sub_name, &sub);
                self.range_shapes.insert(sub_name, shape.clone());
                shape
            }
        };

        let codec = Codec::new(RangeCodec::new(
            descriptor.qualified_name(),
            self.codec_or_identity(sub_descriptor),
        ));
        Ok((
            TypeEntry {
                output: shape.output,
                input: shape.input,
            },
            Some(codec),
        ))
    }

    fn range_shape(&self, sub_name: &str, sub: &TypeEntry) -> RangeShape {
        let inclusive = SchemaType::non_null(Arc::clone(&self.scalars.boolean));

        let bound = Arc::new(SchemaType::Object(ObjectType::with_fields(
            self.naming.range_bound_type(sub_name),
            Some("One end of a range.".to_string()),
            vec![
                Field::property("value", SchemaType::non_null(Arc::clone(&sub.output))),
                Field::property("inclusive", Arc::clone(&inclusive)),
            ],
        )));
        let output = Arc::new(SchemaType::Object(ObjectType::with_fields(
            self.naming.range_type(sub_name),
            Some(format!("A range of `{}`; a null bound is unbounded.", sub_name)),
            vec![
                Field::property("start", Arc::clone(&bound)),
                Field::property("end", bound),
            ],
        )));

        let input = sub.input.as_ref().map(|sub_input| {
            let bound_input = Arc::new(SchemaType::InputObject(InputObjectType::with_fields(
                self.naming.range_bound_input_type(sub_name),
                Some("One end of a range.".to_string()),
                vec![
                    InputField::new("value", SchemaType::non_null(Arc::clone(sub_input))),
                    InputField::new("inclusive", Arc::clone(&inclusive)),
                ],
            )));
            Arc::new(SchemaType::InputObject(InputObjectType::with_fields(
                self.naming.range_input_type(sub_name),
                Some(format!("A range of `{}`; a null bound is unbounded.", sub_name)),
                vec![
                    InputField::new("start", Arc::clone(&bound_input)),
                    InputField::new("end", bound_input),
                ],
            )))
        });

        RangeShape { output, input }
    }

    fn domain_type(&mut self, descriptor: &TypeDescriptor, depth: Depth) -> Result<(TypeEntry, Option<Codec>)> {
        let base_id = self.child(descriptor, descriptor.domain_base_type, "domain base type")?;
        let base = self.resolve_at(base_id, Some(descriptor), depth)?;
        let name = self.naming.type_name(descriptor);

        let alias = |name: String, delegate: &TypeRef| -> TypeRef {
            match **delegate {
                SchemaType::List(_) | SchemaType::NonNull(_) => Arc::clone(delegate),
                _ => Arc::new(SchemaType::Alias(AliasType {
                    name,
                    description: descriptor.description.clone(),
                    delegate: Arc::clone(delegate),
                })),
            }
        };

        let output = alias(name.clone(), &base.output);
        let input = base.input.as_ref().map(|base_input| {
            if Arc::ptr_eq(base_input, &base.output) {
                Arc::clone(&output)
            } else {
                alias(self.naming.input_type(&name), base_input)
            }
        });

        let catalog = Arc::clone(&self.catalog);
        let base_descriptor = catalog.require(base_id, Some(descriptor))?;
        Ok((TypeEntry { output, input }, Some(self.codec_or_identity(base_descriptor))))
    }

    fn array_type(&mut self, descriptor: &TypeDescriptor, depth: Depth) -> Result<(TypeEntry, Option<Codec>)> {
        let item_id = self.child(descriptor, descriptor.array_item_type, "array item type")?;
        let item = self.resolve_at(item_id, Some(descriptor), depth)?;

        let catalog = Arc::clone(&self.catalog);
        let item_descriptor = catalog.require(item_id, Some(descriptor))?;
        let codec = Codec::new(ArrayCodec::new(
            descriptor.display_name(),
            self.codec_or_identity(item_descriptor),
            item_descriptor.qualified_name(),
        ));
        Ok((
            TypeEntry {
                output: SchemaType::list(item.output),
                input: item.input.map(SchemaType::list),
            },
            Some(codec),
        ))
    }

    fn category_fallback(&mut self, descriptor: &TypeDescriptor, depth: Depth) -> Result<(TypeEntry, Option<Codec>)> {
        if descriptor.category == category::ARRAY && descriptor.array_item_type.is_some() {
            return self.array_type(descriptor, depth);
        }
        let ty = descriptor.qualified_name();
        let (scalar, codec) = match descriptor.category {
            category::BOOLEAN => (&self.scalars.boolean, Codec::new(BooleanCodec::new(ty))),
            // Numbers of unknown width are strings so no precision is lost.
            category::NUMERIC => (&self.scalars.big_float, Codec::new(BigNumberCodec::new(ty))),
            _ => (&self.scalars.string, Codec::identity(ty)),
        };
        Ok((TypeEntry::scalar(scalar), Some(codec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_types, oids, Attribute};
    use serde_json::json;

    fn bridge_with(extra: Vec<TypeDescriptor>) -> TypeBridge {
        let catalog = TypeCatalog::from_descriptors(builtin_types().into_iter().chain(extra)).unwrap();
        TypeBridge::new(Arc::new(catalog), BridgeConfig::default())
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut bridge = bridge_with(vec![]);
        let first = bridge.entry(oids::INT4_ARRAY).unwrap();
        let second = bridge.entry(oids::INT4_ARRAY).unwrap();
        assert!(first.same(&second));
        assert!(bridge.codec(oids::INT4_ARRAY).unwrap().same(&bridge.codec(oids::INT4_ARRAY).unwrap()));
    }

    #[test]
    fn test_category_fallback() {
        let mut bridge = bridge_with(vec![]);
        assert_eq!(bridge.resolve(oids::BOOL).unwrap().to_string(), "Boolean");
        assert_eq!(bridge.resolve(oids::INT8).unwrap().to_string(), "BigFloat");
        assert_eq!(bridge.resolve(oids::TEXT).unwrap().to_string(), "String");
        assert_eq!(bridge.decode(oids::INT8, &json!(12)).unwrap(), json!("12"));
        assert_eq!(bridge.decode(oids::BOOL, &json!("t")).unwrap(), json!(true));
    }

    #[test]
    fn test_base_with_array_category_routes_to_array() {
        let mut vector = TypeDescriptor::base(Oid(22), "pg_catalog", "int2vector", category::ARRAY);
        vector.array_item_type = Some(oids::INT2);
        let mut bridge = bridge_with(vec![vector]);
        assert_eq!(bridge.resolve(Oid(22)).unwrap().to_string(), "[BigFloat]");
        assert!(matches!(
            bridge.decode(Oid(22), &json!("1 2")),
            Err(ConversionError::NotASequence { .. })
        ));
    }

    #[test]
    fn test_override_precedence_and_conflicts() {
        let mut bridge = bridge_with(vec![]);
        let int = Arc::clone(&bridge.scalars().int);

        assert!(bridge
            .register_override(oids::INT4, TypeOverride::both(Arc::clone(&int)), OnConflict::Fail)
            .unwrap());
        assert!(!bridge
            .register_override(oids::INT4, TypeOverride::both(Arc::clone(&int)), OnConflict::Yield)
            .unwrap());
        assert!(matches!(
            bridge.register_override(oids::INT4, TypeOverride::both(Arc::clone(&int)), OnConflict::Fail),
            Err(Error::DuplicateOverride { .. })
        ));

        assert!(Arc::ptr_eq(&bridge.resolve(oids::INT4).unwrap(), &int));
        assert!(matches!(
            bridge.register_override(oids::TEXT, TypeOverride::new(int), OnConflict::Fail),
            Ok(true)
        ));
    }

    #[test]
    fn test_override_after_resolution_rejected() {
        let mut bridge = bridge_with(vec![]);
        bridge.resolve(oids::TEXT).unwrap();
        let string = Arc::clone(&bridge.scalars().string);
        assert!(matches!(
            bridge.register_override(oids::TEXT, TypeOverride::both(string), OnConflict::Fail),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_domain_is_transparent_alias() {
        let email = TypeDescriptor::domain(Oid(9001), "app", "email", oids::TEXT, category::STRING)
            .with_description("An email address");
        let mut bridge = bridge_with(vec![email]);

        let entry = bridge.entry(Oid(9001)).unwrap();
        assert_eq!(entry.output.name(), Some("Email"));
        assert_eq!(entry.output.description(), Some("An email address"));
        assert!(matches!(entry.output.unwrap_alias(), SchemaType::Scalar(_)));
        assert!(Arc::ptr_eq(entry.input.as_ref().unwrap(), &entry.output));
        assert!(bridge
            .codec(Oid(9001))
            .unwrap()
            .same(&bridge.codec(oids::TEXT).unwrap()));
    }

    #[test]
    fn test_domain_over_object_gets_input_alias() {
        let point = TypeDescriptor::domain(Oid(9002), "app", "location", oids::POINT, category::GEOMETRIC);
        let mut bridge = bridge_with(vec![point]);
        let object = Arc::new(SchemaType::Object(ObjectType::new("Point", None)));
        let input = Arc::new(SchemaType::InputObject(InputObjectType::new("PointInput", None)));
        bridge
            .register_override(
                oids::POINT,
                TypeOverride::new(object).with_input(input),
                OnConflict::Fail,
            )
            .unwrap();

        let entry = bridge.entry(Oid(9002)).unwrap();
        assert_eq!(entry.output.name(), Some("Location"));
        let input = entry.input.unwrap();
        assert_eq!(input.name(), Some("LocationInput"));
        assert!(matches!(input.unwrap_alias(), SchemaType::InputObject(_)));
    }

    #[test]
    fn test_domain_over_array_uses_list_directly() {
        let tags = TypeDescriptor::domain(Oid(9003), "app", "tags", oids::TEXT_ARRAY, category::ARRAY);
        let mut bridge = bridge_with(vec![tags]);
        let domain = bridge.resolve(Oid(9003)).unwrap();
        let array = bridge.resolve(oids::TEXT_ARRAY).unwrap();
        assert!(Arc::ptr_eq(&domain, &array));
    }

    #[test]
    fn test_ranges_share_shape_per_subtype() {
        let mut bridge = bridge_with(vec![TypeDescriptor::range(Oid(9004), "app", "floatrange", oids::FLOAT8)]);
        let numeric = bridge.entry(oids::NUMRANGE).unwrap();
        let float = bridge.entry(Oid(9004)).unwrap();
        let int8 = bridge.entry(oids::INT8RANGE).unwrap();

        assert_eq!(numeric.output.name(), Some("BigFloatRange"));
        assert!(numeric.same(&float));
        assert!(numeric.same(&int8));
        assert_eq!(numeric.input.unwrap().name(), Some("BigFloatRangeInput"));
        assert!(!bridge
            .codec(oids::NUMRANGE)
            .unwrap()
            .same(&bridge.codec(Oid(9004)).unwrap()));

        let bound = &numeric.output.fields()[0];
        assert_eq!(bound.ty.to_string(), "BigFloatRangeBound");
        assert_eq!(bound.ty.fields()[1].ty.to_string(), "Boolean!");
    }

    #[test]
    fn test_range_over_composite_refused() {
        let pair = TypeDescriptor::composite(Oid(9005), "app", "pair", vec![Attribute::new("a", oids::INT4)]);
        let range = TypeDescriptor::range(Oid(9006), "app", "pairrange", Oid(9005));
        let mut bridge = bridge_with(vec![pair, range]);

        let err = bridge.resolve(Oid(9006)).unwrap_err();
        assert!(matches!(err, Error::TypeResolution { .. }));
        assert!(err.to_string().contains("app.pairrange"));
    }

    #[test]
    fn test_range_over_domain_over_composite_refused() {
        let pair = TypeDescriptor::composite(Oid(9005), "app", "pair", vec![Attribute::new("a", oids::INT4)]);
        let inner = TypeDescriptor::domain(Oid(9007), "app", "pair_d", Oid(9005), category::COMPOSITE);
        let outer = TypeDescriptor::domain(Oid(9008), "app", "pair_dd", Oid(9007), category::COMPOSITE);
        let range = TypeDescriptor::range(Oid(9006), "app", "pairrange", Oid(9008));
        let mut bridge = bridge_with(vec![pair, inner, outer, range]);

        let err = bridge.resolve(Oid(9006)).unwrap_err();
        assert!(matches!(err, Error::TypeResolution { .. }));
        let message = err.to_string();
        assert!(message.contains("app.pairrange"));
        assert!(message.contains("domain over composite type app.pair"), "{message}");
        assert!(bridge.types().get(Oid(9006)).is_none());
    }

    #[test]
    fn test_range_over_domain_chain_bounded_by_depth_limit() {
        let mut descriptors = vec![TypeDescriptor::domain(Oid(9100), "app", "d0", oids::INT4, category::NUMERIC)];
        for n in 1..10u32 {
            descriptors.push(TypeDescriptor::domain(
                Oid(9100 + n),
                "app",
                format!("d{n}"),
                Oid(9100 + n - 1),
                category::NUMERIC,
            ));
        }
        descriptors.push(TypeDescriptor::range(Oid(9200), "app", "deeprange", Oid(9109)));
        let catalog = TypeCatalog::from_descriptors(builtin_types().into_iter().chain(descriptors)).unwrap();
        let mut bridge = TypeBridge::new(Arc::new(catalog), BridgeConfig::default().with_recursion_depth_limit(4));

        let err = bridge.resolve(Oid(9200)).unwrap_err();
        assert!(err.is_recursion_limit());
    }

    #[test]
    fn test_missing_child_names_referrer() {
        let broken = TypeDescriptor::array(Oid(9007), "app", "_ghost", Oid(424242));
        let mut bridge = bridge_with(vec![broken]);
        let err = bridge.resolve(Oid(9007)).unwrap_err();

        let Error::TypeResolution { type_name, kind, source } = err else {
            panic!("expected a resolution error");
        };
        assert_eq!(type_name, "app._ghost");
        assert_eq!(kind, TypeKind::Array);
        assert!(matches!(*source, Error::MissingDescriptor { id: Oid(424242), .. }));
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let broken = TypeDescriptor::array(Oid(9008), "app", "_ghost", Oid(424242));
        let mut bridge = bridge_with(vec![broken]);
        assert!(bridge.resolve(Oid(9008)).is_err());
        assert!(!bridge.types().contains(Oid(9008)));
        assert!(bridge.resolve(Oid(9008)).is_err());
    }

    #[test]
    fn test_unknown_type_codec() {
        let bridge = bridge_with(vec![]);
        assert_eq!(
            bridge.decode(Oid(1), &json!(1)).unwrap_err(),
            ConversionError::UnknownType(Oid(1))
        );
    }

    #[test]
    fn test_setof_output() {
        let mut bridge = bridge_with(vec![]);
        assert_eq!(bridge.setof_output(oids::TEXT).unwrap().to_string(), "[String]");

        let catalog = Arc::clone(bridge.catalog());
        let mut strict = TypeBridge::new(
            catalog,
            BridgeConfig::default().with_forbid_null_in_setof_results(true),
        );
        let first = strict.setof_output(oids::TEXT).unwrap();
        assert_eq!(first.to_string(), "[String!]");
        assert!(Arc::ptr_eq(&first, &strict.setof_output(oids::TEXT).unwrap()));
    }
}
