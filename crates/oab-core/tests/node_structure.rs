//! Structural checks: every node the model can produce must satisfy the
//! shape rules an OpenAPI 3.0 consumer relies on. The rules are expressed as
//! a JSON Schema and checked with `jsonschema`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use oab_core::{Document, HttpMethod, Info, Operation, PathItem, Reference, Response, Schema, SchemaType};
use serde_json::{json, Value};

/// Shape rules for schema nodes: either a pure `$ref`, or a node whose
/// `items` only appear on arrays and `properties` only on objects.
fn node_rules() -> Value {
    json!({
        "definitions": {
            "node": {
                "oneOf": [
                    {
                        "type": "object",
                        "required": ["$ref"],
                        "properties": {
                            "$ref": {"type": "string", "pattern": "^#/components/schemas/.+$"}
                        },
                        "additionalProperties": false
                    },
                    {
                        "type": "object",
                        "not": {"required": ["$ref"]},
                        "properties": {
                            "type": {"enum": ["string", "number", "integer", "boolean", "array", "object"]},
                            "format": {"type": "string"},
                            "items": {"$ref": "#/definitions/node"},
                            "properties": {
                                "type": "object",
                                "additionalProperties": {"$ref": "#/definitions/node"}
                            }
                        },
                        "additionalProperties": false,
                        "allOf": [
                            {
                                "if": {"required": ["items"]},
                                "then": {"required": ["type"], "properties": {"type": {"const": "array"}}}
                            },
                            {
                                "if": {"required": ["properties"]},
                                "then": {"required": ["type"], "properties": {"type": {"const": "object"}}}
                            },
                            {
                                "if": {"required": ["type"], "properties": {"type": {"const": "array"}}},
                                "then": {"required": ["items"]}
                            }
                        ]
                    }
                ]
            }
        },
        "$ref": "#/definitions/node"
    })
}

fn assert_valid(node: &Value) {
    let validator = jsonschema::validator_for(&node_rules()).expect("rules compile");
    let errors: Vec<String> = validator.iter_errors(node).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "node {node} violates shape rules: {errors:?}");
}

fn sample_nodes() -> Vec<Schema> {
    let user = Reference::new("User").unwrap();
    let mut properties = IndexMap::new();
    properties.insert(
        "id".to_string(),
        Schema::primitive(SchemaType::Integer, Some("int32")).into(),
    );
    properties.insert("friend".to_string(), user.clone().into());
    properties.insert(
        "tags".to_string(),
        Schema::array(Schema::primitive(SchemaType::String, Some("string"))).into(),
    );
    properties.insert("blob".to_string(), Schema::untyped().into());

    vec![
        Schema::primitive(SchemaType::String, Some("email")),
        Schema::primitive(SchemaType::Number, None),
        Schema::primitive(SchemaType::Object, None),
        Schema::untyped(),
        Schema::array(user),
        Schema::array(Schema::array(Schema::primitive(SchemaType::Boolean, Some("boolean")))),
        Schema::object(properties),
    ]
}

#[test]
fn every_constructed_node_satisfies_shape_rules() {
    for schema in sample_nodes() {
        assert_valid(&serde_json::to_value(&schema).unwrap());
    }
}

#[test]
fn rules_reject_malformed_nodes() {
    let validator = jsonschema::validator_for(&node_rules()).unwrap();
    assert!(!validator.is_valid(&json!({"type": "string", "items": {"type": "string"}})));
    assert!(!validator.is_valid(&json!({"type": "array"})));
    assert!(!validator.is_valid(&json!({"$ref": "#/definitions/User"})));
}

#[test]
fn document_components_satisfy_shape_rules() {
    let mut doc = Document::new(Info::new("Shapes", "0.1.0"));
    for (i, schema) in sample_nodes().into_iter().enumerate() {
        doc.components.schemas.insert(format!("S{i}"), schema);
    }
    let mut responses = BTreeMap::new();
    responses.insert(
        "200".to_string(),
        Response::json("ok", Reference::new("S0").unwrap().into()),
    );
    let mut item = PathItem::new();
    item.insert(
        HttpMethod::Get,
        Operation {
            responses,
            ..Operation::default()
        },
    );
    doc.paths.insert("/shapes".to_string(), item);

    let value = serde_json::to_value(&doc).unwrap();
    for node in value["components"]["schemas"].as_object().unwrap().values() {
        assert_valid(node);
    }
    assert_valid(&value["paths"]["/shapes"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]);

    let parsed: Document = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, doc);
}
