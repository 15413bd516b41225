//! # OpenAPI Document Tree
//!
//! The top-level document served by the configuration endpoint: `info`,
//! route-derived `paths`, and the `components.schemas` definition table.
//! Everything is ordered (`BTreeMap`) so that serialization is
//! deterministic across builds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spec::{RefOr, Schema};

/// OpenAPI version emitted in every document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Media type used for request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The assembled API description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

impl Document {
    /// An empty document for the given API metadata.
    pub fn new(info: Info) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: BTreeMap::new(),
            components: Components::default(),
        }
    }

    /// Look up an operation by path template and method.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(&method))
    }

    /// Look up a named schema definition.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Reusable definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// HTTP method of an operation. Lowercase on the wire, as OpenAPI requires
/// for path item keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Parse a method name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Operations available on a single path, keyed by method.
pub type PathItem = BTreeMap<HttpMethod, Operation>;

/// A single documented operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: RefOr<Schema>,
}

/// A request body. Only JSON bodies are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

impl RequestBody {
    /// A required JSON body described by `schema`.
    pub fn json(schema: RefOr<Schema>) -> Self {
        Self {
            description: None,
            required: true,
            content: json_content(schema),
        }
    }
}

/// A response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// A response without a body.
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: BTreeMap::new(),
        }
    }

    /// A JSON response described by `schema`.
    pub fn json(description: impl Into<String>, schema: RefOr<Schema>) -> Self {
        Self {
            description: description.into(),
            content: json_content(schema),
        }
    }
}

/// Body description for one media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: RefOr<Schema>,
}

fn json_content(schema: RefOr<Schema>) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Reference, SchemaType};
    use serde_json::json;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("fetch"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn empty_document_shape() {
        let doc = Document::new(Info::new("Pets", "1.0.0"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "openapi": "3.0.3",
                "info": {"title": "Pets", "version": "1.0.0"},
                "paths": {},
                "components": {"schemas": {}}
            })
        );
    }

    #[test]
    fn operation_serializes_camel_case_and_lowercase_methods() {
        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            Response::json("A pet", Reference::new("Pet").unwrap().into()),
        );
        let operation = Operation {
            operation_id: Some("getPet".to_string()),
            parameters: vec![Parameter {
                name: "pet_id".to_string(),
                location: ParameterLocation::Path,
                required: true,
                schema: Schema::primitive(SchemaType::String, None).into(),
            }],
            request_body: Some(RequestBody::json(
                Schema::primitive(SchemaType::String, Some("string")).into(),
            )),
            responses,
            ..Operation::default()
        };
        let mut item = PathItem::new();
        item.insert(HttpMethod::Get, operation);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["get"]["operationId"], "getPet");
        assert_eq!(value["get"]["parameters"][0]["in"], "path");
        assert_eq!(value["get"]["requestBody"]["required"], true);
        assert_eq!(
            value["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert!(value["get"].get("tags").is_none());
    }

    #[test]
    fn document_lookup_helpers() {
        let mut doc = Document::new(Info::new("t", "v").with_description("d"));
        doc.components
            .schemas
            .insert("Pet".to_string(), Schema::object(Default::default()));
        let mut item = PathItem::new();
        item.insert(HttpMethod::Post, Operation::default());
        doc.paths.insert("/pets".to_string(), item);

        assert!(doc.schema("Pet").is_some());
        assert!(doc.operation("/pets", HttpMethod::Post).is_some());
        assert!(doc.operation("/pets", HttpMethod::Get).is_none());
        assert_eq!(doc.info.description.as_deref(), Some("d"));
    }
}
