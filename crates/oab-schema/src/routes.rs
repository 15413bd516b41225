//! # Documented Routes
//!
//! The inbound interface from the hosting application: each documented
//! route names its method, path template, and the schema values describing
//! its request body, query string and responses. [`generate`] runs one
//! conversion pass over a [`RouteTable`] and assembles the document.
//!
//! ## Path templates
//!
//! Templates use OpenAPI syntax: `/users/{user_id}/pets/{pet_id}`. Every
//! `{name}` segment becomes a required path parameter. Templates are checked
//! at registration so that mistakes surface to the application author
//! instead of at request time.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use oab_core::{
    Document, HttpMethod, Info, Operation, Parameter, ParameterLocation, RefOr, RequestBody,
    Response, Schema, SchemaType,
};

use crate::builder::{Builder, Diagnostic};
use crate::class::{SchemaClass, SchemaInstance};
use crate::error::{BuildError, RouteError};
use crate::fields::SchemaValue;
use crate::registry::ConverterRegistry;

/// One documented response.
#[derive(Debug)]
pub struct ResponseDoc {
    status: String,
    description: String,
    schema: Option<Box<dyn SchemaValue>>,
}

impl ResponseDoc {
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> Option<&dyn SchemaValue> {
        self.schema.as_deref()
    }
}

/// A documented route.
#[derive(Debug)]
pub struct RouteDoc {
    method: HttpMethod,
    path: String,
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    tags: Vec<String>,
    request: Option<Box<dyn SchemaValue>>,
    query: Option<SchemaInstance>,
    responses: Vec<ResponseDoc>,
}

impl RouteDoc {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: None,
            description: None,
            operation_id: None,
            tags: Vec::new(),
            request: None,
            query: None,
            responses: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// JSON request body described by `schema`.
    pub fn request(self, schema: impl SchemaValue + 'static) -> Self {
        self.request_boxed(Box::new(schema))
    }

    pub fn request_boxed(mut self, schema: Box<dyn SchemaValue>) -> Self {
        self.request = Some(schema);
        self
    }

    /// Query parameters, one per declared field of `query`.
    pub fn query(mut self, query: SchemaInstance) -> Self {
        self.query = Some(query);
        self
    }

    /// JSON response for `status` described by `schema`.
    pub fn response(self, status: u16, description: impl Into<String>, schema: impl SchemaValue + 'static) -> Self {
        self.push_response(status.to_string(), description.into(), Some(Box::new(schema)))
    }

    /// Response for `status` without a body.
    pub fn empty_response(self, status: u16, description: impl Into<String>) -> Self {
        self.push_response(status.to_string(), description.into(), None)
    }

    /// Catch-all response, keyed `default`.
    pub fn default_response(self, description: impl Into<String>, schema: Option<Box<dyn SchemaValue>>) -> Self {
        self.push_response("default".to_string(), description.into(), schema)
    }

    pub(crate) fn push_response(
        mut self,
        status: String,
        description: String,
        schema: Option<Box<dyn SchemaValue>>,
    ) -> Self {
        self.responses.retain(|existing| existing.status != status);
        self.responses.push(ResponseDoc {
            status,
            description,
            schema,
        });
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn responses(&self) -> &[ResponseDoc] {
        &self.responses
    }

    /// Names of the `{name}` segments of the path template, in order.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPath`] for templates that do not start with `/`,
    /// have unbalanced braces, empty or repeated parameter names.
    pub fn path_parameters(&self) -> Result<Vec<String>, RouteError> {
        parse_path_template(&self.path)
    }

    fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

fn parse_path_template(path: &str) -> Result<Vec<String>, RouteError> {
    let invalid = |reason: &str| RouteError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find(|c: char| c == '{' || c == '}') {
        if rest[open..].starts_with('}') {
            return Err(invalid("unmatched '}'"));
        }
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unmatched '{'"))?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') || name.contains('/') {
            return Err(invalid("malformed parameter segment"));
        }
        if names.iter().any(|existing| existing == name) {
            return Err(invalid("repeated parameter name"));
        }
        names.push(name.to_string());
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// Registered routes, in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDoc>,
    keys: HashSet<(String, HttpMethod)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a documented route.
    ///
    /// # Errors
    ///
    /// [`RouteError::DuplicateOperation`] if the path and method are already
    /// registered; [`RouteError::InvalidPath`] for malformed templates.
    pub fn register(&mut self, route: RouteDoc) -> Result<&mut Self, RouteError> {
        route.path_parameters()?;
        let key = (route.path.clone(), route.method);
        if self.keys.contains(&key) {
            return Err(RouteError::DuplicateOperation {
                method: route.method,
                path: route.path,
            });
        }
        tracing::debug!(method = %route.method, path = %route.path, "registered documented route");
        self.keys.insert(key);
        self.routes.push(route);
        Ok(self)
    }

    pub fn routes(&self) -> &[RouteDoc] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Output of [`generate`].
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run one conversion pass over `routes` and assemble the document.
///
/// # Errors
///
/// Unrecoverable [`BuildError`]s, such as name collisions, abort the pass.
pub fn generate(
    info: Info,
    routes: &RouteTable,
    registry: Arc<ConverterRegistry>,
) -> Result<GeneratedDocument, BuildError> {
    generate_with_components(info, routes, &[], registry)
}

/// Like [`generate`], but also registers `components` whether or not any
/// route refers to them.
///
/// # Errors
///
/// Unrecoverable [`BuildError`]s abort the pass.
pub fn generate_with_components(
    info: Info,
    routes: &RouteTable,
    components: &[SchemaClass],
    registry: Arc<ConverterRegistry>,
) -> Result<GeneratedDocument, BuildError> {
    let mut builder = Builder::new(registry);
    let mut document = Document::new(info);

    for route in routes.routes() {
        let operation = build_operation(route, &mut builder)?;
        document
            .paths
            .entry(route.path.clone())
            .or_default()
            .insert(route.method, operation);
    }

    for class in components {
        builder.process(class, Some(class.name()))?;
    }

    let output = builder.finish();
    document.components.schemas = output.schemas;

    tracing::info!(
        paths = document.paths.len(),
        schemas = document.components.schemas.len(),
        diagnostics = output.diagnostics.len(),
        "generated API document"
    );

    Ok(GeneratedDocument {
        document,
        diagnostics: output.diagnostics,
    })
}

fn build_operation(route: &RouteDoc, builder: &mut Builder) -> Result<Operation, BuildError> {
    let label = route.label();
    let mut parameters = Vec::new();

    // Templates were validated at registration.
    for name in route.path_parameters().unwrap_or_default() {
        parameters.push(Parameter {
            name,
            location: ParameterLocation::Path,
            required: true,
            schema: Schema::primitive(SchemaType::String, None).into(),
        });
    }

    if let Some(query) = &route.query {
        for (name, field) in query.fields().iter() {
            let location = format!("{label} query.{name}");
            let schema = builder.process(field, Some(location.as_str()))?;
            parameters.push(Parameter {
                name: name.to_string(),
                location: ParameterLocation::Query,
                required: false,
                schema,
            });
        }
    }

    let request_body = match &route.request {
        Some(value) => {
            let location = format!("{label} request");
            Some(RequestBody::json(
                builder.process(value.as_ref(), Some(location.as_str()))?,
            ))
        }
        None => None,
    };

    let mut responses = BTreeMap::new();
    for response in &route.responses {
        let documented = match response.schema() {
            Some(value) => {
                let location = format!("{label} response {}", response.status);
                let schema: RefOr<Schema> = builder.process(value, Some(location.as_str()))?;
                Response::json(response.description.clone(), schema)
            }
            None => Response::empty(response.description.clone()),
        };
        responses.insert(response.status.clone(), documented);
    }

    Ok(Operation {
        summary: route.summary.clone(),
        description: route.description.clone(),
        operation_id: route.operation_id.clone(),
        tags: route.tags.clone(),
        parameters,
        request_body,
        responses,
    })
}
