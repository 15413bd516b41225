//! # Declarative Manifests
//!
//! Schemas and documented routes declared in YAML (or JSON) instead of Rust
//! code. The CLI and the server use manifests to describe applications they
//! do not link against.
//!
//! ```yaml
//! info:
//!   title: Pet Store
//!   version: 1.0.0
//! schemas:
//!   Pet:
//!     fields:
//!       id: integer
//!       name: string
//!       tags: { list: string }
//!       parent: { nested: Pet }
//!       litter: { nested: Pet, many: true }
//! routes:
//!   - method: get
//!     path: /pets/{pet_id}
//!     responses:
//!       - status: 200
//!         description: The pet
//!         body: Pet
//!       - status: 404
//!         description: No such pet
//! ```
//!
//! Everything is validated at load time: unknown field kinds, references to
//! undeclared schemas, unknown methods, bad statuses and bad path templates
//! are all reported before any document is built. The `raw` kind is accepted
//! and degrades to an untyped node when built.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use oab_core::{HttpMethod, Info};
use serde::Deserialize;

use crate::class::{Fields, SchemaClass};
use crate::error::ManifestError;
use crate::fields::{
    Boolean, Date, DateTime, Decimal, Dict, Email, Float, Integer, List, Nested, Number, Raw,
    SchemaValue, Str, Time, Url, Uuid,
};
use crate::registry::ConverterRegistry;
use crate::routes::{generate_with_components, GeneratedDocument, RouteDoc, RouteTable};

type ScalarFactory = fn() -> Box<dyn SchemaValue>;

fn boxed<T: SchemaValue + Default + 'static>() -> Box<dyn SchemaValue> {
    Box::new(T::default())
}

/// Field kind names accepted in manifests.
const SCALAR_KINDS: &[(&str, ScalarFactory)] = &[
    ("string", boxed::<Str>),
    ("email", boxed::<Email>),
    ("url", boxed::<Url>),
    ("uuid", boxed::<Uuid>),
    ("boolean", boxed::<Boolean>),
    ("bool", boxed::<Boolean>),
    ("number", boxed::<Number>),
    ("integer", boxed::<Integer>),
    ("int", boxed::<Integer>),
    ("float", boxed::<Float>),
    ("decimal", boxed::<Decimal>),
    ("date", boxed::<Date>),
    ("datetime", boxed::<DateTime>),
    ("date-time", boxed::<DateTime>),
    ("time", boxed::<Time>),
    ("dict", boxed::<Dict>),
    ("raw", boxed::<Raw>),
];

fn scalar_factory(name: &str) -> Option<ScalarFactory> {
    let name = name.to_ascii_lowercase();
    SCALAR_KINDS
        .iter()
        .find(|(kind, _)| *kind == name)
        .map(|(_, factory)| *factory)
}

/// Names usable as scalar field kinds in a manifest.
pub fn scalar_kind_names() -> impl Iterator<Item = &'static str> {
    SCALAR_KINDS.iter().map(|(name, _)| *name)
}

// Wire format

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    info: Info,
    #[serde(default)]
    schemas: BTreeMap<String, RawSchema>,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    fields: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Kind(String),
    List {
        list: Box<FieldSpec>,
    },
    Nested {
        nested: String,
        #[serde(default)]
        many: bool,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BodySpec {
    Schema(String),
    Detailed {
        schema: String,
        #[serde(default)]
        many: bool,
    },
}

impl BodySpec {
    fn schema(&self) -> &str {
        match self {
            Self::Schema(schema) | Self::Detailed { schema, .. } => schema,
        }
    }

    fn many(&self) -> bool {
        matches!(self, Self::Detailed { many: true, .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StatusSpec {
    Code(u16),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoute {
    method: String,
    path: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    request: Option<BodySpec>,
    #[serde(default)]
    responses: Vec<RawResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResponse {
    status: StatusSpec,
    description: String,
    #[serde(default)]
    body: Option<BodySpec>,
}

// Validated form

#[derive(Debug, Clone)]
enum FieldDecl {
    Scalar(ScalarFactory),
    List(Box<FieldDecl>),
    Nested { schema: String, many: bool },
}

#[derive(Debug, Default)]
struct SchemaDecls {
    schemas: BTreeMap<String, Vec<(String, FieldDecl)>>,
}

impl SchemaDecls {
    fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    fn class(self: &Arc<Self>, name: &str) -> SchemaClass {
        let decls = Arc::clone(self);
        let owned = name.to_string();
        SchemaClass::dynamic(name, format!("manifest:{name}"), move || {
            decls.fields_of(&owned)
        })
    }

    fn fields_of(self: &Arc<Self>, name: &str) -> Fields {
        let mut fields = Fields::new();
        for (field, decl) in self.schemas.get(name).into_iter().flatten() {
            fields.push(field.clone(), self.value_of(decl));
        }
        fields
    }

    fn value_of(self: &Arc<Self>, decl: &FieldDecl) -> Box<dyn SchemaValue> {
        match decl {
            FieldDecl::Scalar(factory) => factory(),
            FieldDecl::List(element) => Box::new(List::boxed(self.value_of(element))),
            FieldDecl::Nested { schema, many } => {
                Box::new(Nested::new(self.class(schema)).with_many(*many))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    schema: String,
    many: bool,
}

impl From<&BodySpec> for Body {
    fn from(spec: &BodySpec) -> Self {
        Self {
            schema: spec.schema().to_string(),
            many: spec.many(),
        }
    }
}

#[derive(Debug, Clone)]
struct ResponseDecl {
    status: String,
    description: String,
    body: Option<Body>,
}

#[derive(Debug, Clone)]
struct RouteDecl {
    method: HttpMethod,
    path: String,
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    tags: Vec<String>,
    query: Option<String>,
    request: Option<Body>,
    responses: Vec<ResponseDecl>,
}

/// A loaded and validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    info: Info,
    schemas: Arc<SchemaDecls>,
    routes: Vec<RouteDecl>,
}

impl Manifest {
    /// Parse and validate a manifest from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Any [`ManifestError`] other than `Io`.
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_yaml::from_str(text)?;
        let schemas = Arc::new(resolve_schemas(&raw.schemas)?);
        let routes = raw
            .routes
            .iter()
            .map(|route| resolve_route(route, &schemas))
            .collect::<Result<Vec<_>, _>>()?;

        let manifest = Self {
            info: raw.info,
            schemas,
            routes,
        };
        // Surfaces duplicate operations and bad templates now.
        manifest.route_table()?;

        tracing::debug!(
            schemas = manifest.schemas.schemas.len(),
            routes = manifest.routes.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Read and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Io`] if the file cannot be read, otherwise as
    /// [`Manifest::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Declared schema names, sorted.
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.schemas.keys().map(String::as_str)
    }

    /// The class of the declared schema `name`.
    pub fn class(&self, name: &str) -> Option<SchemaClass> {
        self.schemas
            .contains(name)
            .then(|| self.schemas.class(name))
    }

    /// Classes of every declared schema.
    pub fn classes(&self) -> Vec<SchemaClass> {
        self.schemas
            .schemas
            .keys()
            .map(|name| self.schemas.class(name))
            .collect()
    }

    /// A fresh route table for the declared routes.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Route`] for duplicate operations or bad templates.
    pub fn route_table(&self) -> Result<RouteTable, ManifestError> {
        let mut table = RouteTable::new();
        for decl in &self.routes {
            table.register(self.route_doc(decl))?;
        }
        Ok(table)
    }

    /// Build the document: every declared route, plus every declared schema
    /// whether or not a route refers to it.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Route`] or [`ManifestError::Build`].
    pub fn generate(&self, registry: Arc<ConverterRegistry>) -> Result<GeneratedDocument, ManifestError> {
        let table = self.route_table()?;
        let generated =
            generate_with_components(self.info.clone(), &table, &self.classes(), registry)?;
        Ok(generated)
    }

    fn body_value(&self, body: &Body) -> Box<dyn SchemaValue> {
        let class = self.schemas.class(&body.schema);
        if body.many {
            Box::new(class.instantiate_many())
        } else {
            Box::new(class)
        }
    }

    fn route_doc(&self, decl: &RouteDecl) -> RouteDoc {
        let mut route = RouteDoc::new(decl.method, decl.path.clone());
        if let Some(summary) = &decl.summary {
            route = route.summary(summary.clone());
        }
        if let Some(description) = &decl.description {
            route = route.description(description.clone());
        }
        if let Some(operation_id) = &decl.operation_id {
            route = route.operation_id(operation_id.clone());
        }
        for tag in &decl.tags {
            route = route.tag(tag.clone());
        }
        if let Some(query) = &decl.query {
            route = route.query(self.schemas.class(query).instantiate());
        }
        if let Some(body) = &decl.request {
            route = route.request_boxed(self.body_value(body));
        }
        for response in &decl.responses {
            let schema = response.body.as_ref().map(|body| self.body_value(body));
            route = route.push_response(response.status.clone(), response.description.clone(), schema);
        }
        route
    }
}

fn resolve_schemas(raw: &BTreeMap<String, RawSchema>) -> Result<SchemaDecls, ManifestError> {
    let mut decls = SchemaDecls::default();
    for (schema, spec) in raw {
        if !is_component_name(schema) {
            return Err(ManifestError::InvalidSchemaName {
                name: schema.clone(),
            });
        }
        let mut fields = Vec::with_capacity(spec.fields.len());
        for (key, value) in &spec.fields {
            let field = match key.as_str() {
                Some(field) => field.to_string(),
                None => serde_yaml::to_string(key)?.trim().to_string(),
            };
            let field_spec: FieldSpec = serde_yaml::from_value(value.clone())?;
            let decl = resolve_field(schema, &field, &field_spec, raw)?;
            fields.push((field, decl));
        }
        decls.schemas.insert(schema.clone(), fields);
    }
    Ok(decls)
}

/// Component keys must match `^[A-Za-z0-9._-]+$`.
fn is_component_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn resolve_field(
    schema: &str,
    field: &str,
    spec: &FieldSpec,
    declared: &BTreeMap<String, RawSchema>,
) -> Result<FieldDecl, ManifestError> {
    match spec {
        FieldSpec::Kind(kind) => scalar_factory(kind).map(FieldDecl::Scalar).ok_or_else(|| {
            ManifestError::UnknownFieldKind {
                schema: schema.to_string(),
                field: field.to_string(),
                kind: kind.clone(),
            }
        }),
        FieldSpec::List { list } => Ok(FieldDecl::List(Box::new(resolve_field(
            schema, field, list, declared,
        )?))),
        FieldSpec::Nested { nested, many } => {
            if !declared.contains_key(nested) {
                return Err(ManifestError::UnknownSchema {
                    referenced_by: format!("schema {schema}, field {field}"),
                    name: nested.clone(),
                });
            }
            Ok(FieldDecl::Nested {
                schema: nested.clone(),
                many: *many,
            })
        }
    }
}

fn resolve_status(path: &str, status: &StatusSpec) -> Result<String, ManifestError> {
    let invalid = |status: String| ManifestError::InvalidStatus {
        path: path.to_string(),
        status,
    };
    match status {
        StatusSpec::Code(code) if (100..=599).contains(code) => Ok(code.to_string()),
        StatusSpec::Code(code) => Err(invalid(code.to_string())),
        StatusSpec::Text(text) if text.eq_ignore_ascii_case("default") => Ok("default".to_string()),
        StatusSpec::Text(text) => match text.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Ok(code.to_string()),
            _ => Err(invalid(text.clone())),
        },
    }
}

fn resolve_route(route: &RawRoute, schemas: &SchemaDecls) -> Result<RouteDecl, ManifestError> {
    let method = HttpMethod::parse(&route.method).ok_or_else(|| ManifestError::InvalidMethod {
        path: route.path.clone(),
        method: route.method.clone(),
    })?;
    let label = format!("route {method} {}", route.path);

    let check = |name: &str| {
        if schemas.contains(name) {
            Ok(())
        } else {
            Err(ManifestError::UnknownSchema {
                referenced_by: label.clone(),
                name: name.to_string(),
            })
        }
    };

    if let Some(query) = &route.query {
        check(query)?;
    }
    if let Some(request) = &route.request {
        check(request.schema())?;
    }

    let mut responses = Vec::with_capacity(route.responses.len());
    for response in &route.responses {
        if let Some(body) = &response.body {
            check(body.schema())?;
        }
        responses.push(ResponseDecl {
            status: resolve_status(&route.path, &response.status)?,
            description: response.description.clone(),
            body: response.body.as_ref().map(Body::from),
        });
    }

    Ok(RouteDecl {
        method,
        path: route.path.clone(),
        summary: route.summary.clone(),
        description: route.description.clone(),
        operation_id: route.operation_id.clone(),
        tags: route.tags.clone(),
        query: route.query.clone(),
        request: route.request.as_ref().map(Body::from),
        responses,
    })
}
