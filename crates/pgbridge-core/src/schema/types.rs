//! API-facing schema types.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::codec::Codec;
use crate::error::{ConversionError, ConversionResult, Error, Result};
use crate::node::NodeIdentity;

/// Shared handle to a schema type.
///
/// Type identity is pointer identity: two handles name the same type only if
/// [`Arc::ptr_eq`] holds.
pub type TypeRef = Arc<SchemaType>;

/// JSON representation of a scalar's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Int,
    Float,
    String,
    Json,
}

/// A leaf type.
#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub kind: ScalarKind,
}

/// One member of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Member name exposed in the schema.
    pub name: String,
    /// Raw database label.
    pub value: String,
}

/// An enumeration.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// The member exposed for a raw database label.
    pub fn member_for(&self, raw: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.value == raw)
    }
}

/// An output object.
///
/// Fields are attached once, after the type is registered, so that fields may
/// refer back to the object itself.
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    fields: OnceLock<Vec<Field>>,
}

impl ObjectType {
    /// Create an object whose fields are attached later.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            fields: OnceLock::new(),
        }
    }

    /// Create an object with its fields.
    pub fn with_fields(name: impl Into<String>, description: Option<String>, fields: Vec<Field>) -> Self {
        let object = Self::new(name, description);
        let _ = object.fields.set(fields);
        object
    }

    /// Attach the fields. Fails if fields were already attached.
    pub fn set_fields(&self, fields: Vec<Field>) -> Result<()> {
        self.fields
            .set(fields)
            .map_err(|_| Error::Configuration(format!("fields of {} are already defined", self.name)))
    }

    /// The fields, or an empty slice if none are attached yet.
    pub fn fields(&self) -> &[Field] {
        self.fields.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("fields", &self.fields())
            .finish()
    }
}

/// An input object.
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    fields: OnceLock<Vec<InputField>>,
}

impl InputObjectType {
    /// Create an input object whose fields are attached later.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            fields: OnceLock::new(),
        }
    }

    /// Create an input object with its fields.
    pub fn with_fields(name: impl Into<String>, description: Option<String>, fields: Vec<InputField>) -> Self {
        let object = Self::new(name, description);
        let _ = object.fields.set(fields);
        object
    }

    /// Attach the fields. Fails if fields were already attached.
    pub fn set_fields(&self, fields: Vec<InputField>) -> Result<()> {
        self.fields
            .set(fields)
            .map_err(|_| Error::Configuration(format!("fields of {} are already defined", self.name)))
    }

    /// The fields, or an empty slice if none are attached yet.
    pub fn fields(&self) -> &[InputField] {
        self.fields.get().map(Vec::as_slice).unwrap_or_default()
    }
}

impl fmt::Debug for InputObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputObjectType")
            .field("name", &self.name)
            .field("fields", &self.fields())
            .finish()
    }
}

/// A named type that behaves exactly like its delegate.
///
/// Shape-bearing queries (fields, list/non-null structure) forward to the
/// delegate; the name and description are the alias's own.
pub struct AliasType {
    pub name: String,
    pub description: Option<String>,
    pub delegate: TypeRef,
}

impl fmt::Debug for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasType")
            .field("name", &self.name)
            .field("delegate", &self.delegate.to_string())
            .finish()
    }
}

/// A schema type.
#[derive(Debug)]
pub enum SchemaType {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
    InputObject(InputObjectType),
    Alias(AliasType),
    List(TypeRef),
    NonNull(TypeRef),
}

impl SchemaType {
    /// `[inner]`.
    pub fn list(inner: TypeRef) -> TypeRef {
        Arc::new(SchemaType::List(inner))
    }

    /// `inner!`. Already non-null types are returned as is.
    pub fn non_null(inner: TypeRef) -> TypeRef {
        if matches!(*inner, SchemaType::NonNull(_)) {
            inner
        } else {
            Arc::new(SchemaType::NonNull(inner))
        }
    }

    /// Name of a named type; `None` for list and non-null wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaType::Scalar(t) => Some(&t.name),
            SchemaType::Enum(t) => Some(&t.name),
            SchemaType::Object(t) => Some(&t.name),
            SchemaType::InputObject(t) => Some(&t.name),
            SchemaType::Alias(t) => Some(&t.name),
            SchemaType::List(_) | SchemaType::NonNull(_) => None,
        }
    }

    /// Description of a named type.
    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaType::Scalar(t) => t.description.as_deref(),
            SchemaType::Enum(t) => t.description.as_deref(),
            SchemaType::Object(t) => t.description.as_deref(),
            SchemaType::InputObject(t) => t.description.as_deref(),
            SchemaType::Alias(t) => t.description.as_deref(),
            SchemaType::List(_) | SchemaType::NonNull(_) => None,
        }
    }

    /// Follow alias delegates to the type that defines the shape.
    pub fn unwrap_alias(&self) -> &SchemaType {
        match self {
            SchemaType::Alias(alias) => alias.delegate.unwrap_alias(),
            other => other,
        }
    }

    /// Output fields, looking through aliases.
    pub fn fields(&self) -> &[Field] {
        match self.unwrap_alias() {
            SchemaType::Object(object) => object.fields(),
            _ => &[],
        }
    }

    /// Input fields, looking through aliases.
    pub fn input_fields(&self) -> &[InputField] {
        match self.unwrap_alias() {
            SchemaType::InputObject(object) => object.fields(),
            _ => &[],
        }
    }

    /// Strip list and non-null wrappers.
    pub fn named(&self) -> &SchemaType {
        match self {
            SchemaType::List(inner) | SchemaType::NonNull(inner) => inner.named(),
            other => other,
        }
    }

    /// Check if this is a list, looking through aliases and non-null.
    pub fn is_list(&self) -> bool {
        match self.unwrap_alias() {
            SchemaType::List(_) => true,
            SchemaType::NonNull(inner) => inner.is_list(),
            _ => false,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::List(inner) => write!(f, "[{}]", inner),
            SchemaType::NonNull(inner) => write!(f, "{}!", inner),
            named => f.write_str(named.name().unwrap_or_default()),
        }
    }
}

/// How a field obtains its value from the parent value at serve time.
#[derive(Clone)]
pub enum FieldResolver {
    /// Read a key of an already decoded parent object.
    Property(String),
    /// Decode a stored column through the column type's codec.
    Column { column: String, codec: Codec },
    /// Build a node identifier from the parent row's primary key columns.
    NodeId {
        type_name: String,
        key_columns: Vec<String>,
        identity: Arc<NodeIdentity>,
    },
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldResolver::Property(key) => f.debug_tuple("Property").field(key).finish(),
            FieldResolver::Column { column, .. } => f.debug_struct("Column").field("column", column).finish(),
            FieldResolver::NodeId {
                type_name,
                key_columns,
                ..
            } => f
                .debug_struct("NodeId")
                .field("type_name", type_name)
                .field("key_columns", key_columns)
                .finish(),
        }
    }
}

/// A field of an output object.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub resolver: FieldResolver,
}

impl Field {
    /// A field that reads `name` from its parent value.
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        Self {
            resolver: FieldResolver::Property(name.clone()),
            name,
            description: None,
            ty,
        }
    }

    /// A field with an explicit resolver.
    pub fn new(name: impl Into<String>, ty: TypeRef, resolver: FieldResolver) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            resolver,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Produce this field's value from its parent.
    ///
    /// Failures name the field, so the caller can report them as a field-level
    /// error of the request being served.
    pub fn resolve(&self, parent: &Value) -> ConversionResult<Value> {
        self.resolve_inner(parent)
            .map_err(|e| e.in_field(self.name.clone()))
    }

    fn resolve_inner(&self, parent: &Value) -> ConversionResult<Value> {
        match &self.resolver {
            FieldResolver::Property(key) => Ok(parent.get(key).cloned().unwrap_or(Value::Null)),
            FieldResolver::Column { column, codec } => {
                let raw = parent
                    .get(column)
                    .ok_or_else(|| ConversionError::MissingColumn(column.clone()))?;
                codec.decode(raw)
            }
            FieldResolver::NodeId {
                type_name,
                key_columns,
                identity,
            } => {
                let key = key_columns
                    .iter()
                    .map(|column| {
                        parent
                            .get(column)
                            .cloned()
                            .ok_or_else(|| ConversionError::MissingColumn(column.clone()))
                    })
                    .collect::<ConversionResult<Vec<_>>>()?;
                Ok(Value::String(identity.encode(type_name, &key)))
            }
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("resolver", &self.resolver)
            .finish()
    }
}

/// A field of an input object.
#[derive(Clone)]
pub struct InputField {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
}

impl InputField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

impl fmt::Debug for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputField")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QualifiedName;
    use serde_json::json;

    fn scalar(name: &str) -> TypeRef {
        Arc::new(SchemaType::Scalar(ScalarType {
            name: name.to_string(),
            description: None,
            kind: ScalarKind::String,
        }))
    }

    #[test]
    fn test_display_wrappers() {
        let ty = SchemaType::non_null(SchemaType::list(SchemaType::non_null(scalar("Int"))));
        assert_eq!(ty.to_string(), "[Int!]!");
        assert!(ty.is_list());
        assert_eq!(ty.named().name(), Some("Int"));
    }

    #[test]
    fn test_non_null_is_not_doubled() {
        let ty = SchemaType::non_null(scalar("Int"));
        let again = SchemaType::non_null(Arc::clone(&ty));
        assert!(Arc::ptr_eq(&ty, &again));
    }

    #[test]
    fn test_alias_forwards_shape() {
        let point = Arc::new(SchemaType::Object(ObjectType::with_fields(
            "Point",
            None,
            vec![Field::property("x", scalar("Float"))],
        )));
        let alias = SchemaType::Alias(AliasType {
            name: "Location".into(),
            description: Some("a place".into()),
            delegate: Arc::clone(&point),
        });

        assert_eq!(alias.name(), Some("Location"));
        assert_eq!(alias.description(), Some("a place"));
        assert_eq!(alias.fields().len(), 1);
        assert!(matches!(alias.unwrap_alias(), SchemaType::Object(_)));
    }

    #[test]
    fn test_self_referencing_object() {
        let node = Arc::new(SchemaType::Object(ObjectType::new("Node", None)));
        let SchemaType::Object(object) = &*node else {
            unreachable!()
        };
        object
            .set_fields(vec![Field::property("parent", Arc::clone(&node))])
            .unwrap();

        assert!(Arc::ptr_eq(&node.fields()[0].ty, &node));
        assert!(object.set_fields(vec![]).is_err());
        assert!(format!("{:?}", node).contains("Node"));
    }

    #[test]
    fn test_column_resolver_names_field() {
        let codec = Codec::identity(QualifiedName::catalog("text"));
        let field = Field::new(
            "title",
            scalar("String"),
            FieldResolver::Column {
                column: "title".into(),
                codec,
            },
        );

        assert_eq!(field.resolve(&json!({"title": "hi"})).unwrap(), json!("hi"));
        let err = field.resolve(&json!({})).unwrap_err();
        assert_eq!(
            err,
            ConversionError::MissingColumn("title".into()).in_field("title")
        );
    }
}
