//! Type descriptors produced by catalog introspection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Object identifier of a database type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(pub u32);

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural kind of a database type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A base (scalar) type.
    Base,
    /// An array of another type.
    Array,
    /// A constrained alias over another type.
    Domain,
    /// An interval over a subtype.
    Range,
    /// An enumeration of labels.
    Enum,
    /// A row type with named attributes.
    Composite,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Base => "base",
            TypeKind::Array => "array",
            TypeKind::Domain => "domain",
            TypeKind::Range => "range",
            TypeKind::Enum => "enum",
            TypeKind::Composite => "composite",
        })
    }
}

/// Single-character type category codes.
pub mod category {
    /// Array types.
    pub const ARRAY: char = 'A';
    /// Boolean types.
    pub const BOOLEAN: char = 'B';
    /// Composite types.
    pub const COMPOSITE: char = 'C';
    /// Date/time types.
    pub const DATETIME: char = 'D';
    /// Enum types.
    pub const ENUM: char = 'E';
    /// Geometric types.
    pub const GEOMETRIC: char = 'G';
    /// Network address types.
    pub const NETWORK: char = 'I';
    /// Numeric types.
    pub const NUMERIC: char = 'N';
    /// Pseudo-types.
    pub const PSEUDO: char = 'P';
    /// Range types.
    pub const RANGE: char = 'R';
    /// String types.
    pub const STRING: char = 'S';
    /// Timespan types.
    pub const TIMESPAN: char = 'T';
    /// User-defined types.
    pub const USER: char = 'U';
    /// Bit-string types.
    pub const BITSTRING: char = 'V';
    /// Unknown type.
    pub const UNKNOWN: char = 'X';
}

/// Namespace-qualified type or function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Schema (namespace) name.
    pub namespace: String,
    /// Unqualified name.
    pub name: String,
}

impl QualifiedName {
    /// Create a qualified name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// A name in `pg_catalog`.
    pub fn catalog(name: impl Into<String>) -> Self {
        Self::new("pg_catalog", name)
    }

    /// Render as quoted SQL identifiers: `"namespace"."name"`.
    pub fn to_sql(&self) -> String {
        format!("{}.{}", quote_ident(&self.namespace), quote_ident(&self.name))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// One attribute (column) of a composite type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Type of the attribute's values.
    pub type_id: Oid,
    /// Whether the attribute rejects nulls.
    #[serde(default)]
    pub not_null: bool,
    /// Whether the attribute is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Attribute comment.
    #[serde(default)]
    pub description: Option<String>,
}

impl Attribute {
    /// Create a nullable attribute.
    pub fn new(name: impl Into<String>, type_id: Oid) -> Self {
        Self {
            name: name.into(),
            type_id,
            not_null: false,
            primary_key: false,
            description: None,
        }
    }

    /// Mark as not null.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark as part of the primary key (implies not null).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Introspected description of one database type.
///
/// Child types are referenced by id and looked up in a
/// [`TypeCatalog`](super::TypeCatalog), which keeps cyclic type graphs
/// representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type id.
    pub id: Oid,
    /// Unqualified type name.
    pub name: String,
    /// Namespace (schema) name.
    pub namespace: String,
    /// Structural kind.
    pub kind: TypeKind,
    /// Category code, see [`category`].
    pub category: char,
    /// Type comment.
    #[serde(default)]
    pub description: Option<String>,
    /// Element type of an array.
    #[serde(default)]
    pub array_item_type: Option<Oid>,
    /// Base type of a domain.
    #[serde(default)]
    pub domain_base_type: Option<Oid>,
    /// Subtype of a range.
    #[serde(default)]
    pub range_sub_type: Option<Oid>,
    /// Labels of an enum, in declaration order.
    #[serde(default)]
    pub enum_variants: Option<Vec<String>>,
    /// Attributes of a composite, in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl TypeDescriptor {
    fn new(id: Oid, namespace: impl Into<String>, name: impl Into<String>, kind: TypeKind, category: char) -> Self {
        Self {
            id,
            name: name.into(),
            namespace: namespace.into(),
            kind,
            category,
            description: None,
            array_item_type: None,
            domain_base_type: None,
            range_sub_type: None,
            enum_variants: None,
            attributes: Vec::new(),
        }
    }

    /// Create a base type descriptor.
    pub fn base(id: Oid, namespace: impl Into<String>, name: impl Into<String>, category: char) -> Self {
        Self::new(id, namespace, name, TypeKind::Base, category)
    }

    /// Create an array type descriptor.
    pub fn array(id: Oid, namespace: impl Into<String>, name: impl Into<String>, item: Oid) -> Self {
        let mut descriptor = Self::new(id, namespace, name, TypeKind::Array, category::ARRAY);
        descriptor.array_item_type = Some(item);
        descriptor
    }

    /// Create a domain type descriptor.
    pub fn domain(id: Oid, namespace: impl Into<String>, name: impl Into<String>, base: Oid, category: char) -> Self {
        let mut descriptor = Self::new(id, namespace, name, TypeKind::Domain, category);
        descriptor.domain_base_type = Some(base);
        descriptor
    }

    /// Create a range type descriptor.
    pub fn range(id: Oid, namespace: impl Into<String>, name: impl Into<String>, sub_type: Oid) -> Self {
        let mut descriptor = Self::new(id, namespace, name, TypeKind::Range, category::RANGE);
        descriptor.range_sub_type = Some(sub_type);
        descriptor
    }

    /// Create an enum type descriptor.
    pub fn enumeration<I, S>(id: Oid, namespace: impl Into<String>, name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut descriptor = Self::new(id, namespace, name, TypeKind::Enum, category::ENUM);
        descriptor.enum_variants = Some(variants.into_iter().map(Into::into).collect());
        descriptor
    }

    /// Create a composite type descriptor.
    pub fn composite(id: Oid, namespace: impl Into<String>, name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        let mut descriptor = Self::new(id, namespace, name, TypeKind::Composite, category::COMPOSITE);
        descriptor.attributes = attributes;
        descriptor
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The namespace-qualified name.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.namespace.clone(), self.name.clone())
    }

    /// `namespace.name`, for messages.
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Attributes that form the primary key, in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| attr.primary_key)
    }

    /// Check that kind-specific children are populated.
    pub fn validate(&self) -> Result<()> {
        let missing = match self.kind {
            TypeKind::Array if self.array_item_type.is_none() => Some("array item type"),
            TypeKind::Domain if self.domain_base_type.is_none() => Some("domain base type"),
            TypeKind::Range if self.range_sub_type.is_none() => Some("range subtype"),
            _ => None,
        };
        match missing {
            Some(what) => Err(Error::Configuration(format!(
                "{} ({}) has no {}",
                self.display_name(),
                self.kind,
                what
            ))),
            None => Ok(()),
        }
    }
}
