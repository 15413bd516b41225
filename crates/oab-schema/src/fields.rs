//! # Field Kinds
//!
//! The value side of the converter contract. Every schema-bearing value
//! implements [`SchemaValue`], which exposes two things:
//!
//! - its **lineage**: the ordered list of kinds it belongs to, from most to
//!   least specific. `Email` is `[Email, String, Field]`. The converter
//!   registry walks this list, so a converter registered for `String` also
//!   handles `Email` unless an `Email` converter is registered.
//! - its **shape**: a tagged view of whatever nested values it carries,
//!   which structural converters use to recurse through the builder.
//!
//! Custom field types join the hierarchy by declaring their own lineage:
//!
//! ```
//! use oab_schema::fields::{kind, KindId, SchemaValue};
//!
//! #[derive(Debug)]
//! struct Password;
//!
//! impl SchemaValue for Password {
//!     fn lineage(&self) -> &'static [KindId] {
//!         const LINEAGE: &[KindId] = &[KindId::new("Password"), kind::STRING, kind::FIELD];
//!         LINEAGE
//!     }
//! }
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

use crate::class::{SchemaClass, SchemaInstance};

/// Static identity of a field or schema kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(&'static str);

impl KindId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.0)
    }
}

impl Serialize for KindId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Kinds of the built-in field types.
pub mod kind {
    use super::KindId;

    /// Root of every field lineage. No converter is registered for it.
    pub const FIELD: KindId = KindId::new("Field");
    pub const STRING: KindId = KindId::new("String");
    pub const EMAIL: KindId = KindId::new("Email");
    pub const URL: KindId = KindId::new("URL");
    pub const UUID: KindId = KindId::new("UUID");
    pub const BOOLEAN: KindId = KindId::new("Boolean");
    pub const NUMBER: KindId = KindId::new("Number");
    pub const INTEGER: KindId = KindId::new("Integer");
    pub const FLOAT: KindId = KindId::new("Float");
    pub const DECIMAL: KindId = KindId::new("Decimal");
    pub const DATE_TIME: KindId = KindId::new("DateTime");
    pub const DATE: KindId = KindId::new("Date");
    pub const TIME: KindId = KindId::new("Time");
    pub const MAPPING: KindId = KindId::new("Mapping");
    pub const DICT: KindId = KindId::new("Dict");
    pub const LIST: KindId = KindId::new("List");
    pub const NESTED: KindId = KindId::new("Nested");
    pub const RAW: KindId = KindId::new("Raw");
    /// A materialized declared schema.
    pub const SCHEMA: KindId = KindId::new("Schema");
    /// A declared schema class, not yet instantiated.
    pub const SCHEMA_CLASS: KindId = KindId::new("SchemaClass");
}

/// Nested values carried by a [`SchemaValue`].
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// No nested values.
    Scalar,
    /// A homogeneous list of `element`.
    List { element: &'a dyn SchemaValue },
    /// A nested schema value, optionally a collection of it.
    Nested {
        target: &'a dyn SchemaValue,
        many: bool,
    },
    /// A materialized declared schema.
    Instance(&'a SchemaInstance),
    /// A declared schema class.
    Class(&'a SchemaClass),
}

impl Shape<'_> {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::List { .. } => "list",
            Self::Nested { .. } => "nested",
            Self::Instance(_) => "schema instance",
            Self::Class(_) => "schema class",
        }
    }
}

/// A value the builder can convert into a specification node.
pub trait SchemaValue: fmt::Debug + Send + Sync {
    /// Kinds this value belongs to, most specific first. Must not be empty.
    fn lineage(&self) -> &'static [KindId];

    /// The most specific kind.
    fn kind(&self) -> KindId {
        self.lineage().first().copied().unwrap_or(kind::FIELD)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Scalar
    }
}

macro_rules! scalar_field {
    ($(#[$doc:meta])* $name:ident => [$($kind:expr),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl SchemaValue for $name {
            fn lineage(&self) -> &'static [KindId] {
                const LINEAGE: &[KindId] = &[$($kind),+];
                LINEAGE
            }
        }
    };
}

scalar_field!(
    /// Generic text.
    Str => [kind::STRING, kind::FIELD]
);
scalar_field!(Email => [kind::EMAIL, kind::STRING, kind::FIELD]);
scalar_field!(Url => [kind::URL, kind::STRING, kind::FIELD]);
scalar_field!(Uuid => [kind::UUID, kind::STRING, kind::FIELD]);
scalar_field!(Boolean => [kind::BOOLEAN, kind::FIELD]);
scalar_field!(
    /// Generic number; the parent of `Integer`, `Float` and `Decimal`.
    Number => [kind::NUMBER, kind::FIELD]
);
scalar_field!(Integer => [kind::INTEGER, kind::NUMBER, kind::FIELD]);
scalar_field!(Float => [kind::FLOAT, kind::NUMBER, kind::FIELD]);
scalar_field!(Decimal => [kind::DECIMAL, kind::NUMBER, kind::FIELD]);
scalar_field!(DateTime => [kind::DATE_TIME, kind::FIELD]);
scalar_field!(Date => [kind::DATE, kind::DATE_TIME, kind::FIELD]);
scalar_field!(Time => [kind::TIME, kind::FIELD]);
scalar_field!(
    /// Free-form mapping.
    Dict => [kind::DICT, kind::MAPPING, kind::FIELD]
);
scalar_field!(
    /// Unconstrained value. Deliberately has no converter in the default set.
    Raw => [kind::RAW, kind::FIELD]
);

/// A homogeneous list field.
#[derive(Debug)]
pub struct List {
    element: Box<dyn SchemaValue>,
}

impl List {
    pub fn new(element: impl SchemaValue + 'static) -> Self {
        Self::boxed(Box::new(element))
    }

    pub fn boxed(element: Box<dyn SchemaValue>) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &dyn SchemaValue {
        self.element.as_ref()
    }
}

impl SchemaValue for List {
    fn lineage(&self) -> &'static [KindId] {
        &[kind::LIST, kind::FIELD]
    }

    fn shape(&self) -> Shape<'_> {
        Shape::List {
            element: self.element.as_ref(),
        }
    }
}

/// A field holding another schema, usually a [`SchemaClass`].
#[derive(Debug)]
pub struct Nested {
    target: Box<dyn SchemaValue>,
    many: bool,
}

impl Nested {
    pub fn new(target: impl SchemaValue + 'static) -> Self {
        Self::boxed(Box::new(target))
    }

    pub fn boxed(target: Box<dyn SchemaValue>) -> Self {
        Self {
            target,
            many: false,
        }
    }

    /// Nest the declared schema `S`.
    pub fn of<S: crate::class::DeclaredSchema>() -> Self {
        Self::new(SchemaClass::of::<S>())
    }

    /// Mark this field as a collection of the nested schema.
    pub fn many(self) -> Self {
        self.with_many(true)
    }

    pub fn with_many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    pub fn target(&self) -> &dyn SchemaValue {
        self.target.as_ref()
    }

    pub fn is_many(&self) -> bool {
        self.many
    }
}

impl SchemaValue for Nested {
    fn lineage(&self) -> &'static [KindId] {
        &[kind::NESTED, kind::FIELD]
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Nested {
            target: self.target.as_ref(),
            many: self.many,
        }
    }
}
