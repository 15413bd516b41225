//! # Schema Nodes and References
//!
//! The node types of the specification graph. A [`Schema`] is an inline
//! node; a [`Reference`] points at a named entry of
//! `components.schemas`. Wherever either may appear the model uses
//! [`RefOr`].
//!
//! ## Node Invariant
//!
//! Exactly one of the primitive fields (`type`/`format`), `items`, or
//! `properties` is meaningfully populated, according to the node's type.
//! The constructors are the only way to build a node, so the invariant
//! holds for every value produced by this crate.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Pointer prefix for schema references in an OpenAPI 3.0 document.
pub const REF_PREFIX: &str = "#/components/schemas/";

/// Primitive kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the specification graph.
///
/// An absent `type` means the node is untyped: the converter for the source
/// value could not be resolved, and the node accepts any value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<RefOr<Schema>>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, RefOr<Schema>>,
}

impl Schema {
    /// A primitive node with an optional format refinement.
    pub fn primitive(schema_type: SchemaType, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    /// An array node whose elements are described by `items`.
    pub fn array(items: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items.into())),
            ..Self::default()
        }
    }

    /// An object node. Properties serialize in insertion order.
    pub fn object(properties: IndexMap<String, RefOr<Schema>>) -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            properties,
            ..Self::default()
        }
    }

    /// An untyped placeholder node. Serializes as `{}`.
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn schema_type(&self) -> Option<SchemaType> {
        self.schema_type
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Element description, present only for arrays.
    pub fn items(&self) -> Option<&RefOr<Schema>> {
        self.items.as_deref()
    }

    /// Object properties; empty for every other type.
    pub fn properties(&self) -> &IndexMap<String, RefOr<Schema>> {
        &self.properties
    }

    /// Look up a single property by name.
    pub fn property(&self, name: &str) -> Option<&RefOr<Schema>> {
        self.properties.get(name)
    }

    /// Whether this node carries no type information at all.
    pub fn is_untyped(&self) -> bool {
        self.schema_type.is_none()
    }
}

/// A named pointer into `components.schemas`.
///
/// Only the target name is stored; the pointer string is derived on
/// serialization. Resolving the pointer is the consumer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawReference", into = "RawReference")]
pub struct Reference {
    name: String,
}

impl Reference {
    /// Reference the schema registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::EmptyReferenceName`] for an empty name.
    pub fn new(name: impl Into<String>) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyReferenceName);
        }
        Ok(Self { name })
    }

    /// Parse a `#/components/schemas/<name>` pointer.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidReference`] when the prefix is wrong or
    /// the name is missing.
    pub fn from_pointer(pointer: &str) -> Result<Self, SpecError> {
        match pointer.strip_prefix(REF_PREFIX) {
            Some(name) if !name.is_empty() => Ok(Self {
                name: name.to_string(),
            }),
            _ => Err(SpecError::InvalidReference(pointer.to_string())),
        }
    }

    /// Name of the referenced schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pointer expression, e.g. `#/components/schemas/User`.
    pub fn pointer(&self) -> String {
        format!("{REF_PREFIX}{}", self.name)
    }
}

#[derive(Serialize, Deserialize)]
struct RawReference {
    #[serde(rename = "$ref")]
    pointer: String,
}

impl TryFrom<RawReference> for Reference {
    type Error = SpecError;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        Reference::from_pointer(&raw.pointer)
    }
}

impl From<Reference> for RawReference {
    fn from(reference: Reference) -> Self {
        RawReference {
            pointer: reference.pointer(),
        }
    }
}

/// Either a [`Reference`] or an inline value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref(Reference),
    T(T),
}

impl RefOr<Schema> {
    /// Name of the referenced schema, if this is a reference.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Ref(reference) => Some(reference.name()),
            Self::T(_) => None,
        }
    }

    /// The inline schema, if this is not a reference.
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Self::Ref(_) => None,
            Self::T(schema) => Some(schema),
        }
    }
}

impl From<Schema> for RefOr<Schema> {
    fn from(schema: Schema) -> Self {
        Self::T(schema)
    }
}

impl From<Reference> for RefOr<Schema> {
    fn from(reference: Reference) -> Self {
        Self::Ref(reference)
    }
}
