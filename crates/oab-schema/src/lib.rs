//! # oab-schema: Schema Conversion Engine
//!
//! Turns schema declarations into specification nodes and assembles the
//! API document from documented routes.
//!
//! ## Pipeline
//!
//! 1. Values implement [`SchemaValue`]: built-in field kinds ([`fields`]) and
//!    declared schemas ([`class`]).
//! 2. A [`ConverterRegistry`] maps each kind to a [`Converter`]; lookup walks
//!    the value's lineage so parent converters serve descendants.
//! 3. A [`Builder`] drives one pass, memoizing declared schemas by name so
//!    shared and cyclic graphs are expanded once and referenced thereafter.
//! 4. [`routes::generate`] runs a pass over a [`RouteTable`] and produces a
//!    [`GeneratedDocument`]. Routes can also come from a YAML [`Manifest`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use oab_core::{HttpMethod, Info};
//! use oab_schema::class::{DeclaredSchema, Fields, SchemaClass};
//! use oab_schema::fields::{Email, Integer, Nested};
//! use oab_schema::{generate, ConverterRegistry, RouteDoc, RouteTable};
//!
//! struct User;
//!
//! impl DeclaredSchema for User {
//!     fn declare_fields() -> Fields {
//!         Fields::new()
//!             .field("id", Integer)
//!             .field("email", Email)
//!             .field("friend", Nested::of::<User>())
//!     }
//! }
//!
//! let mut routes = RouteTable::new();
//! routes
//!     .register(RouteDoc::get("/users/{user_id}").response(200, "A user", SchemaClass::of::<User>()))
//!     .unwrap();
//!
//! let registry = Arc::new(ConverterRegistry::with_defaults().unwrap());
//! let generated = generate(Info::new("Users", "1.0.0"), &routes, registry).unwrap();
//!
//! assert!(generated.document.schema("User").is_some());
//! assert!(generated.document.operation("/users/{user_id}", HttpMethod::Get).is_some());
//! ```

pub mod builder;
pub mod class;
pub mod converters;
pub mod error;
pub mod fields;
pub mod manifest;
pub mod registry;
pub mod routes;

pub use builder::{BuildOutput, Builder, Diagnostic};
pub use class::{DeclaredSchema, Fields, SchemaClass, SchemaInstance};
pub use converters::{register_default_converters, Converter, PrimitiveConverter, PRIMITIVE_MAPPINGS};
pub use error::{BuildError, ManifestError, RegistryError, RouteError};
pub use fields::{KindId, SchemaValue, Shape};
pub use manifest::Manifest;
pub use registry::ConverterRegistry;
pub use routes::{generate, generate_with_components, GeneratedDocument, RouteDoc, RouteTable};
