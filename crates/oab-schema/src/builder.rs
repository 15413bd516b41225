//! # Builder: Traversal Engine
//!
//! Drives one conversion pass. The builder owns the schema registry for the
//! pass (component name → definition) and is handed to every converter, so
//! nested values are always dispatched through [`Builder::process`].
//!
//! ## Termination
//!
//! A declared schema claims its component name *before* its fields are
//! processed. Any re-entrant reference to the same class during that
//! recursion, direct or transitive, finds the claim and resolves to a
//! [`Reference`] instead of recursing. Each class is therefore expanded at
//! most once per pass, which bounds the traversal without a depth limit.
//!
//! ## Partial failure
//!
//! Recoverable conversion errors ([`BuildError::is_recoverable`]) are caught
//! at the innermost `process` call: the value becomes an untyped node and a
//! [`Diagnostic`] is recorded. Name collisions abort the pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use oab_core::{RefOr, Reference, Schema};
use serde::Serialize;

use crate::class::SchemaClass;
use crate::error::BuildError;
use crate::fields::{KindId, SchemaValue, Shape};
use crate::registry::ConverterRegistry;

/// A non-fatal problem found during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Dotted location of the value, e.g. `User.avatar`.
    pub path: Option<String>,
    /// Most specific kind of the value that could not be converted.
    pub kind: KindId,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{path}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of a completed pass.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub schemas: BTreeMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-pass conversion context.
pub struct Builder {
    registry: Arc<ConverterRegistry>,
    schemas: BTreeMap<String, Schema>,
    origins: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
    path: Vec<String>,
}

impl Builder {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            schemas: BTreeMap::new(),
            origins: BTreeMap::new(),
            diagnostics: Vec::new(),
            path: Vec::new(),
        }
    }

    /// Convert `value`. `name` labels the value's location for diagnostics;
    /// unnamed values inherit the enclosing location.
    ///
    /// # Errors
    ///
    /// Only unrecoverable errors are returned; see the module docs.
    pub fn process(
        &mut self,
        value: &dyn SchemaValue,
        name: Option<&str>,
    ) -> Result<RefOr<Schema>, BuildError> {
        if let Some(name) = name {
            self.path.push(name.to_string());
        }
        let result = self.dispatch(value);
        let location = self.path.last().cloned();
        if name.is_some() {
            self.path.pop();
        }

        match result {
            Err(err) if err.is_recoverable() => {
                tracing::warn!(
                    kind = %value.kind(),
                    path = location.as_deref().unwrap_or("<root>"),
                    error = %err,
                    "degrading unconvertible value to an untyped schema"
                );
                self.diagnostics.push(Diagnostic {
                    path: location,
                    kind: value.kind(),
                    message: err.to_string(),
                });
                Ok(Schema::untyped().into())
            }
            other => other,
        }
    }

    fn dispatch(&mut self, value: &dyn SchemaValue) -> Result<RefOr<Schema>, BuildError> {
        if let Shape::Instance(instance) = value.shape() {
            if let Some(reference) = self.existing_reference(instance.class())? {
                tracing::trace!(schema = reference.name(), "reusing registered schema");
                return Ok(if instance.is_many() {
                    Schema::array(reference).into()
                } else {
                    reference.into()
                });
            }
        }

        let converter = self.registry.lookup(value)?;
        tracing::trace!(kind = %value.kind(), via = %converter.converts(), "converting");
        converter.convert(value, self)
    }

    /// A reference to `class` if its name is already registered by the same
    /// declaration.
    ///
    /// # Errors
    ///
    /// [`BuildError::NameCollision`] if a different declaration holds the
    /// name.
    pub fn existing_reference(&self, class: &SchemaClass) -> Result<Option<Reference>, BuildError> {
        match self.origins.get(class.name()) {
            None => Ok(None),
            Some(origin) if origin == class.origin() => Ok(Some(Reference::new(class.name())?)),
            Some(origin) => Err(BuildError::NameCollision {
                name: class.name().to_string(),
                existing: origin.clone(),
                incoming: class.origin().to_string(),
            }),
        }
    }

    /// Claim `class`'s component name, installing a placeholder definition.
    ///
    /// Returns `false` if the same declaration already holds the name, in
    /// which case the caller must not expand the class again.
    ///
    /// # Errors
    ///
    /// [`BuildError::NameCollision`] if a different declaration holds the
    /// name.
    pub fn claim(&mut self, class: &SchemaClass) -> Result<bool, BuildError> {
        if self.existing_reference(class)?.is_some() {
            return Ok(false);
        }
        tracing::debug!(schema = class.name(), origin = class.origin(), "registering schema");
        self.origins
            .insert(class.name().to_string(), class.origin().to_string());
        self.schemas
            .insert(class.name().to_string(), Schema::untyped());
        Ok(true)
    }

    /// Replace the placeholder for `name` with its definition.
    pub fn define(&mut self, name: &str, schema: Schema) {
        self.schemas.insert(name.to_string(), schema);
    }

    /// Definitions registered so far.
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish(self) -> BuildOutput {
        BuildOutput {
            schemas: self.schemas,
            diagnostics: self.diagnostics,
        }
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{DeclaredSchema, Fields, SchemaInstance};
    use crate::fields::{kind, Email, Integer, List, Nested, Raw, Str};
    use oab_core::SchemaType;

    fn builder() -> Builder {
        Builder::new(Arc::new(ConverterRegistry::with_defaults().unwrap()))
    }

    struct User;

    impl DeclaredSchema for User {
        fn declare_fields() -> Fields {
            Fields::new()
                .field("id", Integer)
                .field("email", Email)
                .field("friend", Nested::of::<User>())
        }
    }

    struct Profile;

    impl DeclaredSchema for Profile {
        fn declare_fields() -> Fields {
            Fields::new()
                .field("bio", Str)
                .field("avatar", Raw)
                .field("tags", List::new(Raw))
        }
    }

    struct Left;
    struct Right;

    impl DeclaredSchema for Left {
        fn declare_fields() -> Fields {
            Fields::new().field("right", Nested::of::<Right>())
        }
    }

    impl DeclaredSchema for Right {
        fn declare_fields() -> Fields {
            Fields::new().field("left", Nested::of::<Left>().many())
        }
    }

    #[test]
    fn self_reference_resolves_to_own_reference() {
        let mut builder = builder();
        let result = builder.process(&SchemaInstance::of::<User>(), None).unwrap();
        assert_eq!(result.reference_name(), Some("User"));

        let user = &builder.schemas()["User"];
        assert_eq!(user.schema_type(), Some(SchemaType::Object));
        assert_eq!(
            user.property("friend").and_then(RefOr::reference_name),
            Some("User")
        );
    }

    #[test]
    fn mutual_references_terminate() {
        let mut builder = builder();
        builder.process(&SchemaClass::of::<Left>(), None).unwrap();
        let output = builder.finish();
        assert_eq!(output.schemas.len(), 2);

        let right_left = output.schemas["Right"].property("left").unwrap();
        let items = right_left.as_schema().and_then(Schema::items).unwrap();
        assert_eq!(items.reference_name(), Some("Left"));
    }

    #[test]
    fn unsupported_fields_degrade_with_diagnostics() {
        let mut builder = builder();
        builder.process(&SchemaInstance::of::<Profile>(), None).unwrap();
        let output = builder.finish();

        let profile = &output.schemas["Profile"];
        assert_eq!(profile.properties().len(), 3);
        assert_eq!(
            profile.property("bio").and_then(RefOr::as_schema),
            Some(&Schema::primitive(SchemaType::String, Some("string")))
        );
        assert_eq!(
            profile.property("avatar").and_then(RefOr::as_schema),
            Some(&Schema::untyped())
        );
        let tags = profile.property("tags").and_then(RefOr::as_schema).unwrap();
        assert_eq!(tags.items().and_then(RefOr::as_schema), Some(&Schema::untyped()));

        assert_eq!(output.diagnostics.len(), 2);
        assert_eq!(output.diagnostics[0].path.as_deref(), Some("Profile.avatar"));
        assert_eq!(output.diagnostics[0].kind, kind::RAW);
        assert_eq!(output.diagnostics[1].path.as_deref(), Some("Profile.tags"));
    }

    #[test]
    fn unsupported_root_value_has_no_path() {
        let mut builder = builder();
        let result = builder.process(&Raw, None).unwrap();
        assert_eq!(result.as_schema(), Some(&Schema::untyped()));
        assert_eq!(builder.diagnostics()[0].path, None);
        assert!(builder.diagnostics()[0].to_string().contains("Raw"));
    }

    mod other {
        use crate::class::{DeclaredSchema, Fields};
        use crate::fields::Str;

        pub struct User;

        impl DeclaredSchema for User {
            fn declare_fields() -> Fields {
                Fields::new().field("handle", Str)
            }
        }
    }

    #[test]
    fn name_collision_aborts_the_pass() {
        let mut builder = builder();
        builder.process(&SchemaClass::of::<User>(), None).unwrap();
        let err = builder
            .process(&SchemaClass::of::<other::User>(), None)
            .unwrap_err();
        match err {
            BuildError::NameCollision {
                name,
                existing,
                incoming,
            } => {
                assert_eq!(name, "User");
                assert_ne!(existing, incoming);
                assert!(incoming.contains("other"));
            }
            other => panic!("expected a name collision, got {other:?}"),
        }
    }

    #[test]
    fn claim_is_idempotent_for_the_same_class() {
        let mut builder = builder();
        let class = SchemaClass::of::<User>();
        assert!(builder.claim(&class).unwrap());
        assert!(!builder.claim(&class).unwrap());
        assert!(builder.schemas()["User"].is_untyped());
    }
}
