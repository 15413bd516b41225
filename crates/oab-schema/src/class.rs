//! # Declared Schemas
//!
//! A declared schema is a named, reusable set of fields. It appears in two
//! forms:
//!
//! - [`SchemaClass`]: the class itself. Cheap to clone and lazy: fields are
//!   only produced when the class is instantiated, which is what lets a
//!   schema nest itself.
//! - [`SchemaInstance`]: a materialized instance holding its declared
//!   [`Fields`] and a `many` flag.
//!
//! Each class carries an **origin** in addition to its name. The name keys
//! the component table; the origin identifies the declaration, so two
//! different declarations that derive the same name can be told apart.

use std::fmt;
use std::sync::Arc;

use crate::fields::{kind, KindId, SchemaValue, Shape};

/// Ordered, named field declarations of a schema.
#[derive(Debug, Default)]
pub struct Fields {
    entries: Vec<(String, Box<dyn SchemaValue>)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. A later declaration replaces an earlier one of the same
    /// name.
    pub fn field(mut self, name: impl Into<String>, value: impl SchemaValue + 'static) -> Self {
        self.push(name, Box::new(value));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Box<dyn SchemaValue>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn SchemaValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn SchemaValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A schema declared as a Rust type.
///
/// ```
/// use oab_schema::class::{DeclaredSchema, Fields};
/// use oab_schema::fields::{Email, Integer, Nested};
///
/// struct User;
///
/// impl DeclaredSchema for User {
///     fn declare_fields() -> Fields {
///         Fields::new()
///             .field("id", Integer)
///             .field("email", Email)
///             .field("friend", Nested::of::<User>())
///     }
/// }
///
/// assert_eq!(User::schema_name(), "User");
/// ```
pub trait DeclaredSchema: 'static {
    /// Name used in `components.schemas`. Defaults to the type's own name.
    fn schema_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn declare_fields() -> Fields;
}

/// `my_crate::api::UserSchema<T>` → `UserSchema`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

type FieldFactory = dyn Fn() -> Fields + Send + Sync;

/// A declared schema class.
#[derive(Clone)]
pub struct SchemaClass {
    name: Arc<str>,
    origin: Arc<str>,
    factory: Arc<FieldFactory>,
}

impl SchemaClass {
    /// The class of a [`DeclaredSchema`] type. The origin is the full type
    /// path.
    pub fn of<S: DeclaredSchema>() -> Self {
        let factory: Arc<FieldFactory> = Arc::new(S::declare_fields);
        Self {
            name: Arc::from(S::schema_name()),
            origin: Arc::from(std::any::type_name::<S>()),
            factory,
        }
    }

    /// A class declared at runtime.
    pub fn dynamic(
        name: impl Into<Arc<str>>,
        origin: impl Into<Arc<str>>,
        factory: impl Fn() -> Fields + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// A fresh single instance.
    pub fn instantiate(&self) -> SchemaInstance {
        SchemaInstance {
            class: self.clone(),
            fields: (self.factory)(),
            many: false,
        }
    }

    /// A fresh collection instance.
    pub fn instantiate_many(&self) -> SchemaInstance {
        self.instantiate().with_many(true)
    }
}

impl fmt::Debug for SchemaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaClass")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl SchemaValue for SchemaClass {
    fn lineage(&self) -> &'static [KindId] {
        &[kind::SCHEMA_CLASS]
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Class(self)
    }
}

/// A materialized declared schema.
#[derive(Debug)]
pub struct SchemaInstance {
    class: SchemaClass,
    fields: Fields,
    many: bool,
}

impl SchemaInstance {
    /// Instantiate the declared schema `S`.
    pub fn of<S: DeclaredSchema>() -> Self {
        SchemaClass::of::<S>().instantiate()
    }

    pub fn with_many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    pub fn class(&self) -> &SchemaClass {
        &self.class
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn is_many(&self) -> bool {
        self.many
    }
}

impl SchemaValue for SchemaInstance {
    fn lineage(&self) -> &'static [KindId] {
        &[kind::SCHEMA]
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Instance(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Integer, Nested, Str};

    struct Tag;

    impl DeclaredSchema for Tag {
        fn declare_fields() -> Fields {
            Fields::new().field("label", Str)
        }
    }

    struct Node;

    impl DeclaredSchema for Node {
        fn schema_name() -> &'static str {
            "TreeNode"
        }

        fn declare_fields() -> Fields {
            Fields::new()
                .field("value", Integer)
                .field("children", Nested::of::<Node>().many())
        }
    }

    #[test]
    fn default_name_is_short_type_name() {
        assert_eq!(Tag::schema_name(), "Tag");
        assert_eq!(short_type_name("a::b::Page<c::User>"), "Page");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn class_carries_name_and_origin() {
        let class = SchemaClass::of::<Node>();
        assert_eq!(class.name(), "TreeNode");
        assert!(class.origin().ends_with("Node"));
        assert_ne!(class.origin(), SchemaClass::of::<Tag>().origin());
    }

    #[test]
    fn self_nesting_class_instantiates_lazily() {
        let instance = SchemaClass::of::<Node>().instantiate();
        assert_eq!(instance.fields().len(), 2);
        assert!(!instance.is_many());
        assert_eq!(
            instance.fields().get("children").map(|v| v.kind()),
            Some(kind::NESTED)
        );
        assert!(SchemaClass::of::<Node>().instantiate_many().is_many());
    }

    #[test]
    fn later_field_declaration_replaces_earlier() {
        let fields = Fields::new()
            .field("a", Str)
            .field("b", Str)
            .field("a", Integer);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(fields.get("a").map(|v| v.kind()), Some(kind::INTEGER));
    }

    #[test]
    fn dynamic_class_uses_factory() {
        let class = SchemaClass::dynamic("Point", "test:Point", || {
            Fields::new().field("x", Integer).field("y", Integer)
        });
        assert_eq!(class.name(), "Point");
        assert_eq!(class.origin(), "test:Point");
        assert_eq!(class.instantiate().fields().len(), 2);
        assert_eq!(class.shape().label(), "schema class");
    }
}
