#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Method;
use serde_json::json;
use specsmith::{
    ClassDef, CollectionKind, Parameter, Schema, SchemaRegistry, SpecOptions, TypeRef,
};

#[test]
fn array_property_wraps_items() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(
            model,
            "tags",
            Schema::collection_of(TypeRef::String, CollectionKind::Array),
        )
        .unwrap();

    assert_eq!(
        registry.get_json_schema(model).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "tags": { "items": { "type": "string" }, "type": "array" }
            }
        })
    );
}

#[test]
fn set_property_adds_unique_items() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(
            model,
            "ids",
            Schema::collection_of(TypeRef::Number, CollectionKind::Set),
        )
        .unwrap();

    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["ids"],
        json!({ "items": { "type": "number" }, "type": "array", "uniqueItems": true })
    );
}

#[test]
fn map_property_uses_additional_properties() {
    let mut registry = SchemaRegistry::new();
    let product = registry.define_class(ClassDef::new("Product"));
    registry
        .attach_schema(product, "title", Schema::of(TypeRef::String))
        .unwrap();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(
            model,
            "byName",
            Schema::collection_of(TypeRef::Model(product), CollectionKind::Map),
        )
        .unwrap();

    // Plain JSON Schema mode inlines the referenced model.
    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["byName"],
        json!({
            "additionalProperties": {
                "type": "object",
                "properties": { "title": { "type": "string" } }
            },
            "type": "object"
        })
    );
}

#[test]
fn contains_property_wraps_with_contains_keyword() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(model, "mustHave", Schema::contains(TypeRef::Number))
        .unwrap();

    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["mustHave"],
        json!({ "contains": { "type": "number" }, "type": "array" })
    );
}

#[test]
fn collection_bounds_attach_to_the_wrapper_not_the_items() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(
            model,
            "scores",
            Schema::collection_of(TypeRef::Number, CollectionKind::Array)
                .minimum(0.0)
                .min_items(1)
                .max_items(10),
        )
        .unwrap();

    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["scores"],
        json!({
            "items": { "minimum": 0.0, "type": "number" },
            "maxItems": 10,
            "minItems": 1,
            "type": "array"
        })
    );
}

#[test]
fn array_body_parameter_swagger2() {
    let mut registry = SchemaRegistry::new();
    let product = registry.define_class(ClassDef::new("Product"));
    registry
        .attach_schema(product, "title", Schema::of(TypeRef::String))
        .unwrap();

    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::POST, "/")
        .unwrap();
    registry
        .attach_parameter(
            ctrl,
            "method",
            Parameter::body().collection_of(TypeRef::Model(product), CollectionKind::Array),
        )
        .unwrap();

    let doc = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();

    assert_eq!(
        doc["paths"]["/"]["post"]["parameters"],
        json!([{
            "in": "body",
            "name": "body",
            "required": false,
            "schema": {
                "items": { "$ref": "#/definitions/Product" },
                "type": "array"
            }
        }])
    );
}

#[test]
fn map_body_parameter_swagger2() {
    let mut registry = SchemaRegistry::new();
    let product = registry.define_class(ClassDef::new("Product"));
    registry
        .attach_schema(product, "title", Schema::of(TypeRef::String))
        .unwrap();

    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::POST, "/")
        .unwrap();
    registry
        .attach_parameter(
            ctrl,
            "method",
            Parameter::body().collection_of(TypeRef::Model(product), CollectionKind::Map),
        )
        .unwrap();

    let doc = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();

    assert_eq!(
        doc["paths"]["/"]["post"]["parameters"][0]["schema"],
        json!({
            "additionalProperties": { "$ref": "#/definitions/Product" },
            "type": "object"
        })
    );
}

#[test]
fn array_query_parameter_flattens_in_swagger2() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::GET, "/")
        .unwrap();
    registry
        .attach_parameter(
            ctrl,
            "method",
            Parameter::new(specsmith::ParameterLocation::Query)
                .name("ids")
                .collection_of(TypeRef::String, CollectionKind::Array),
        )
        .unwrap();

    let doc = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();

    assert_eq!(
        doc["paths"]["/"]["get"]["parameters"],
        json!([{
            "in": "query",
            "name": "ids",
            "required": false,
            "items": { "type": "string" },
            "type": "array"
        }])
    );
}
