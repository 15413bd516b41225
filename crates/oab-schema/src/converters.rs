//! # Converter Set
//!
//! One converter per recognized kind. Primitive kinds are table-driven
//! ([`PRIMITIVE_MAPPINGS`]); structural kinds (lists, nested fields,
//! declared schemas and schema classes) each have their own converter.
//!
//! Structural converters never call one another. Every nested value goes
//! back through [`Builder::process`], which owns dispatch, memoization and
//! diagnostics.

use indexmap::IndexMap;
use oab_core::{RefOr, Reference, Schema, SchemaType};

use crate::builder::Builder;
use crate::error::{BuildError, RegistryError};
use crate::fields::{kind, KindId, SchemaValue, Shape};
use crate::registry::ConverterRegistry;

/// Converts values of one kind into specification nodes.
pub trait Converter: Send + Sync {
    /// The kind this converter is registered under.
    fn converts(&self) -> KindId;

    /// Convert `value`, delegating nested values to `builder`.
    fn convert(
        &self,
        value: &dyn SchemaValue,
        builder: &mut Builder,
    ) -> Result<RefOr<Schema>, BuildError>;
}

/// A converter producing a fixed `(type, format)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveConverter {
    kind: KindId,
    schema_type: SchemaType,
    format: Option<&'static str>,
}

impl PrimitiveConverter {
    pub const fn new(kind: KindId, schema_type: SchemaType, format: Option<&'static str>) -> Self {
        Self {
            kind,
            schema_type,
            format,
        }
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    pub fn format(&self) -> Option<&'static str> {
        self.format
    }
}

impl Converter for PrimitiveConverter {
    fn converts(&self) -> KindId {
        self.kind
    }

    fn convert(&self, _value: &dyn SchemaValue, _builder: &mut Builder) -> Result<RefOr<Schema>, BuildError> {
        Ok(Schema::primitive(self.schema_type, self.format).into())
    }
}

/// Canonical primitive mappings.
pub const PRIMITIVE_MAPPINGS: &[PrimitiveConverter] = &[
    PrimitiveConverter::new(kind::EMAIL, SchemaType::String, Some("email")),
    PrimitiveConverter::new(kind::STRING, SchemaType::String, Some("string")),
    PrimitiveConverter::new(kind::UUID, SchemaType::String, Some("uuid")),
    PrimitiveConverter::new(kind::BOOLEAN, SchemaType::Boolean, Some("boolean")),
    PrimitiveConverter::new(kind::NUMBER, SchemaType::Number, None),
    PrimitiveConverter::new(kind::INTEGER, SchemaType::Integer, Some("int32")),
    PrimitiveConverter::new(kind::FLOAT, SchemaType::Number, None),
    PrimitiveConverter::new(kind::DECIMAL, SchemaType::Number, None),
    PrimitiveConverter::new(kind::DATE, SchemaType::String, Some("date")),
    PrimitiveConverter::new(kind::DATE_TIME, SchemaType::String, Some("date-time")),
    PrimitiveConverter::new(kind::TIME, SchemaType::String, Some("time")),
    PrimitiveConverter::new(kind::URL, SchemaType::String, Some("URL")),
    PrimitiveConverter::new(kind::DICT, SchemaType::Object, None),
];

fn shape_mismatch(value: &dyn SchemaValue, expected: &'static str) -> BuildError {
    BuildError::ShapeMismatch {
        kind: value.kind(),
        expected,
        actual: value.shape().label(),
    }
}

/// `List(element)` → `array` with `items` = the processed element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConverter;

impl Converter for ListConverter {
    fn converts(&self) -> KindId {
        kind::LIST
    }

    fn convert(&self, value: &dyn SchemaValue, builder: &mut Builder) -> Result<RefOr<Schema>, BuildError> {
        let Shape::List { element } = value.shape() else {
            return Err(shape_mismatch(value, "list"));
        };
        let items = builder.process(element, None)?;
        Ok(Schema::array(items).into())
    }
}

/// `Nested(target)` → the processed target, wrapped in an array when the
/// field is a collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedConverter;

impl Converter for NestedConverter {
    fn converts(&self) -> KindId {
        kind::NESTED
    }

    fn convert(&self, value: &dyn SchemaValue, builder: &mut Builder) -> Result<RefOr<Schema>, BuildError> {
        let Shape::Nested { target, many } = value.shape() else {
            return Err(shape_mismatch(value, "nested"));
        };
        let schema = builder.process(target, None)?;
        if many {
            Ok(Schema::array(schema).into())
        } else {
            Ok(schema)
        }
    }
}

/// A declared schema instance → an `object` component registered under the
/// class name, returned as a reference (or an array of it for `many`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter;

impl Converter for SchemaConverter {
    fn converts(&self) -> KindId {
        kind::SCHEMA
    }

    fn convert(&self, value: &dyn SchemaValue, builder: &mut Builder) -> Result<RefOr<Schema>, BuildError> {
        let Shape::Instance(instance) = value.shape() else {
            return Err(shape_mismatch(value, "schema instance"));
        };
        let class = instance.class();
        let reference = Reference::new(class.name())?;

        if builder.claim(class)? {
            let mut properties = IndexMap::new();
            for (key, field) in instance.fields().iter() {
                let path = format!("{}.{key}", class.name());
                properties.insert(key.to_string(), builder.process(field, Some(path.as_str()))?);
            }
            builder.define(class.name(), Schema::object(properties));
        }

        if instance.is_many() {
            Ok(Schema::array(reference).into())
        } else {
            Ok(reference.into())
        }
    }
}

/// A schema class → whatever a fresh instance of it converts to.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaClassConverter;

impl Converter for SchemaClassConverter {
    fn converts(&self) -> KindId {
        kind::SCHEMA_CLASS
    }

    fn convert(&self, value: &dyn SchemaValue, builder: &mut Builder) -> Result<RefOr<Schema>, BuildError> {
        let Shape::Class(class) = value.shape() else {
            return Err(shape_mismatch(value, "schema class"));
        };
        let instance = class.instantiate();
        builder.process(&instance, None)
    }
}

/// Register the full built-in converter set.
///
/// # Errors
///
/// Fails if any of the built-in kinds is already registered in `registry`.
pub fn register_default_converters(registry: &mut ConverterRegistry) -> Result<(), RegistryError> {
    for mapping in PRIMITIVE_MAPPINGS {
        registry.register(*mapping)?;
    }
    registry.register(ListConverter)?;
    registry.register(NestedConverter)?;
    registry.register(SchemaConverter)?;
    registry.register(SchemaClassConverter)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::fields::{
        Boolean, Date, DateTime, Decimal, Dict, Email, Float, Integer, List, Nested, Number, Str,
        Time, Url, Uuid,
    };

    fn builder() -> Builder {
        Builder::new(Arc::new(ConverterRegistry::with_defaults().unwrap()))
    }

    fn convert(value: &dyn SchemaValue) -> Schema {
        let mut builder = builder();
        builder
            .process(value, None)
            .unwrap()
            .as_schema()
            .cloned()
            .expect("inline schema")
    }

    #[test]
    fn primitive_mappings_are_exact() {
        let cases: Vec<(Box<dyn SchemaValue>, SchemaType, Option<&str>)> = vec![
            (Box::new(Email), SchemaType::String, Some("email")),
            (Box::new(Str), SchemaType::String, Some("string")),
            (Box::new(Uuid), SchemaType::String, Some("uuid")),
            (Box::new(Boolean), SchemaType::Boolean, Some("boolean")),
            (Box::new(Number), SchemaType::Number, None),
            (Box::new(Integer), SchemaType::Integer, Some("int32")),
            (Box::new(Float), SchemaType::Number, None),
            (Box::new(Decimal), SchemaType::Number, None),
            (Box::new(Date), SchemaType::String, Some("date")),
            (Box::new(DateTime), SchemaType::String, Some("date-time")),
            (Box::new(Time), SchemaType::String, Some("time")),
            (Box::new(Url), SchemaType::String, Some("URL")),
            (Box::new(Dict), SchemaType::Object, None),
        ];
        for (value, schema_type, format) in cases {
            let schema = convert(value.as_ref());
            assert_eq!(schema, Schema::primitive(schema_type, format), "{value:?}");
            // Same input kind, same shape.
            assert_eq!(convert(value.as_ref()), schema);
        }
    }

    #[test]
    fn dict_has_no_properties() {
        let schema = convert(&Dict);
        assert!(schema.properties().is_empty());
        assert!(schema.items().is_none());
    }

    #[test]
    fn list_wraps_processed_element() {
        let schema = convert(&List::new(Integer));
        assert_eq!(
            schema,
            Schema::array(Schema::primitive(SchemaType::Integer, Some("int32")))
        );
    }

    #[test]
    fn list_of_lists() {
        let schema = convert(&List::new(List::new(Boolean)));
        let inner = schema.items().and_then(RefOr::as_schema).unwrap();
        assert_eq!(inner.schema_type(), Some(SchemaType::Array));
    }

    #[test]
    fn nested_scalar_passes_through() {
        assert_eq!(convert(&Nested::new(Email)), convert(&Email));
        assert_eq!(
            convert(&Nested::new(Email).many()),
            Schema::array(convert(&Email))
        );
    }

    #[test]
    fn structural_converter_rejects_wrong_shape() {
        let mut builder = builder();
        let err = ListConverter.convert(&Str, &mut builder).unwrap_err();
        assert_eq!(
            err,
            BuildError::ShapeMismatch {
                kind: kind::STRING,
                expected: "list",
                actual: "scalar",
            }
        );
    }

    #[test]
    fn mapping_table_has_no_duplicate_kinds() {
        let mut registry = ConverterRegistry::new();
        for mapping in PRIMITIVE_MAPPINGS {
            registry.register(*mapping).unwrap();
        }
        assert_eq!(registry.len(), PRIMITIVE_MAPPINGS.len());
    }
}
