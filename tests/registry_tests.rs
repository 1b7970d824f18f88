#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Method;
use serde_json::json;
use specsmith::{ClassDef, Parameter, Response, Schema, SchemaRegistry, SpecOptions, TypeRef};


#[test]
fn inherited_properties_merge_base_first() {
    let mut registry = SchemaRegistry::new();
    let base = registry.define_class(ClassDef::new("Base"));
    registry
        .attach_schema(base, "id", Schema::of(TypeRef::String).required())
        .unwrap();
    registry
        .attach_schema(base, "createdAt", Schema::of(TypeRef::String).format("date-time"))
        .unwrap();

    let derived = registry.define_class(ClassDef::new("Derived").extends(base));
    registry
        .attach_schema(derived, "name", Schema::of(TypeRef::String))
        .unwrap();

    assert_eq!(
        registry.get_json_schema(derived).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "createdAt": { "format": "date-time", "type": "string" },
                "name": { "type": "string" }
            },
            "required": ["id"]
        })
    );
}

#[test]
fn ignored_property_is_excluded_from_documents() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(model, "visible", Schema::of(TypeRef::String))
        .unwrap();
    registry
        .attach_schema(model, "secret", Schema::of(TypeRef::String).ignored())
        .unwrap();

    let doc = registry.get_json_schema(model).unwrap();
    assert_eq!(doc["properties"]["secret"], json!(null));
    assert_eq!(doc["properties"]["visible"], json!({ "type": "string" }));
}

#[test]
fn self_referential_model_does_not_recurse_forever() {
    let mut registry = SchemaRegistry::new();
    let node = registry.define_class(ClassDef::new("TreeNode"));
    registry
        .attach_schema(node, "value", Schema::of(TypeRef::String))
        .unwrap();
    registry
        .attach_schema(
            node,
            "children",
            Schema::collection_of(TypeRef::Model(node), specsmith::CollectionKind::Array),
        )
        .unwrap();

    // Inline mode cuts the cycle; spec mode resolves it with a $ref.
    let inline = registry.get_json_schema(node).unwrap();
    assert_eq!(
        inline["properties"]["children"]["items"],
        json!({ "type": "object" })
    );

    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::POST, "/")
        .unwrap();
    registry
        .attach_parameter(ctrl, "method", Parameter::body().of(TypeRef::Model(node)))
        .unwrap();
    let doc = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();
    assert_eq!(
        doc["definitions"]["TreeNode"]["properties"]["children"]["items"],
        json!({ "$ref": "#/definitions/TreeNode" })
    );
}

#[test]
fn spec_compilation_is_cached_per_options() {
    tracing_util::init();
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::GET, "/")
        .unwrap();

    let first = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();
    let second = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.compilations(), 1);

    registry.get_spec(ctrl, &SpecOptions::openapi3()).unwrap();
    assert_eq!(registry.compilations(), 2);
}

#[test]
fn equivalent_option_values_share_a_cache_entry() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::GET, "/")
        .unwrap();

    registry
        .get_spec(ctrl, &SpecOptions::swagger2().root_path("/rest"))
        .unwrap();
    registry
        .get_spec(ctrl, &SpecOptions::swagger2().root_path("/rest"))
        .unwrap();
    assert_eq!(registry.compilations(), 1);
}

#[test]
fn metadata_store_roundtrip() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));

    registry
        .metadata_mut()
        .set(model, "description", json!("a model"));
    assert!(registry.metadata().has(model, "description"));
    assert_eq!(
        registry.metadata().get(model, "description"),
        Some(&json!("a model"))
    );
    assert!(!registry.metadata().has(model, "missing"));
}

#[test]
fn property_on_operation_member_is_rejected() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Test"));
    registry
        .attach_operation(ctrl, "test", Method::GET, "/")
        .unwrap();

    let err = registry
        .attach_schema(ctrl, "test", Schema::of(TypeRef::String))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Property cannot be used as method decorator on Test.test"
    );
}

#[test]
fn operation_on_property_member_is_rejected() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Test"));
    registry
        .attach_schema(ctrl, "test", Schema::of(TypeRef::String))
        .unwrap();

    let err = registry
        .attach_response(ctrl, "test", Response::new(200))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Returns cannot be used as property decorator on Test.test"
    );
}

#[test]
fn clear_resets_classes_and_cache() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::GET, "/")
        .unwrap();
    registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();
    assert_eq!(registry.compilations(), 1);

    registry.clear();
    assert_eq!(registry.compilations(), 0);
    assert!(registry.get_json_schema(ctrl).is_err());
}

#[test]
fn operation_with_several_mounts_gets_distinct_ids() {
    let mut registry = SchemaRegistry::new();
    let ctrl = registry.define_class(ClassDef::new("Controller"));
    registry
        .attach_operation(ctrl, "method", Method::GET, "/")
        .unwrap();
    registry
        .attach_operation(ctrl, "method", Method::GET, "/:id")
        .unwrap();

    let doc = registry.get_spec(ctrl, &SpecOptions::swagger2()).unwrap();
    assert_eq!(
        doc["paths"]["/"]["get"]["operationId"],
        json!("controllerMethod")
    );
    assert_eq!(
        doc["paths"]["/{id}"]["get"]["operationId"],
        json!("controllerMethodById")
    );
}

#[test]
fn schema_changes_propagate_to_later_compilations() {
    let mut registry = SchemaRegistry::new();
    let model = registry.define_class(ClassDef::new("Model"));
    registry
        .attach_schema(model, "prop", Schema::of(TypeRef::Number))
        .unwrap();
    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["prop"],
        json!({ "type": "number" })
    );

    // References resolve by lookup, so the edit shows up in the next pass.
    registry
        .attach_schema(model, "prop", Schema::of(TypeRef::String))
        .unwrap();
    assert_eq!(
        registry.get_json_schema(model).unwrap()["properties"]["prop"],
        json!({ "type": "string" })
    );
}
