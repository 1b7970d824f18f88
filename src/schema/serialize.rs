use crate::error::SchemaError;
use crate::ids::ClassId;
use crate::registry::SchemaRegistry;
use crate::schema::generics::BindingFrame;
use crate::schema::node::{CollectionKind, Schema, TypeRef};
use crate::spec::SpecType;
use serde_json::{json, Map, Value};

/// Serializes schema nodes into JSON Schema fragments for one compilation
/// pass, collecting every referenced model into `schemas`.
///
/// With a spec type set, referenced models register themselves under their
/// class name and are emitted as `$ref`s (`#/definitions/...` for Swagger 2,
/// `#/components/schemas/...` for OpenAPI 3). Without one (the plain
/// `get_json_schema` mode) model schemas are inlined and unresolved generic
/// slots render as `{"$ref": "<label>"}`.
pub(crate) struct SchemaCompiler<'r> {
    registry: &'r SchemaRegistry,
    spec: Option<SpecType>,
    pub(crate) schemas: Map<String, Value>,
    visiting: Vec<ClassId>,
}

impl<'r> SchemaCompiler<'r> {
    pub fn new(registry: &'r SchemaRegistry, spec: Option<SpecType>) -> Self {
        SchemaCompiler {
            registry,
            spec,
            schemas: Map::new(),
            visiting: Vec::new(),
        }
    }

    fn ref_prefix(&self) -> &'static str {
        match self.spec {
            Some(SpecType::OpenApi3) => "#/components/schemas/",
            _ => "#/definitions/",
        }
    }

    /// Object schema for a class: effective properties plus a `required`
    /// array for members explicitly marked required.
    pub fn class_schema(
        &mut self,
        class: ClassId,
        frame: &BindingFrame<'_>,
    ) -> Result<Value, SchemaError> {
        self.registry.class(class)?;
        let props = self.registry.properties(class, false);

        let mut properties = Map::new();
        let mut required: Vec<Value> = Vec::new();
        for (key, schema) in &props {
            properties.insert(key.clone(), self.member_schema(schema, frame)?);
            if schema.required {
                required.push(Value::String(key.clone()));
            }
        }

        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("object"));
        if !properties.is_empty() {
            obj.insert("properties".to_string(), Value::Object(properties));
        }
        if !required.is_empty() {
            obj.insert("required".to_string(), Value::Array(required));
        }
        Ok(Value::Object(obj))
    }

    /// Schema for one member node: the element schema wrapped in the member's
    /// collection shape, with collection-level bounds on the wrapper.
    pub fn member_schema(
        &mut self,
        schema: &Schema,
        frame: &BindingFrame<'_>,
    ) -> Result<Value, SchemaError> {
        let (value_constraints, collection_constraints) = schema.split_constraints();
        let item = self.type_schema(&schema.ty, &value_constraints, frame)?;

        let mut wrapper = match schema.collection {
            CollectionKind::None => return Ok(item),
            CollectionKind::Array => {
                let mut m = Map::new();
                m.insert("type".to_string(), json!("array"));
                m.insert("items".to_string(), item);
                m
            }
            CollectionKind::Contains => {
                let mut m = Map::new();
                m.insert("type".to_string(), json!("array"));
                m.insert("contains".to_string(), item);
                m
            }
            CollectionKind::Set => {
                let mut m = Map::new();
                m.insert("type".to_string(), json!("array"));
                m.insert("items".to_string(), item);
                m.insert("uniqueItems".to_string(), json!(true));
                m
            }
            CollectionKind::Map => {
                let mut m = Map::new();
                m.insert("type".to_string(), json!("object"));
                m.insert("additionalProperties".to_string(), item);
                m
            }
        };
        for (k, v) in collection_constraints {
            wrapper.insert(k, v);
        }
        Ok(Value::Object(wrapper))
    }

    /// Schema for a bare type reference with value-level constraints applied.
    pub fn type_schema(
        &mut self,
        ty: &TypeRef,
        constraints: &Map<String, Value>,
        frame: &BindingFrame<'_>,
    ) -> Result<Value, SchemaError> {
        match ty {
            TypeRef::String | TypeRef::Number | TypeRef::Integer | TypeRef::Boolean => {
                let mut obj = Map::new();
                if let Some(name) = ty.primitive_name() {
                    obj.insert("type".to_string(), json!(name));
                }
                for (k, v) in constraints {
                    obj.insert(k.clone(), v.clone());
                }
                Ok(Value::Object(obj))
            }
            TypeRef::Model(class) => self.model_ref(*class),
            TypeRef::Generic(label) => match frame.lookup(label) {
                Some((bound, rest)) => self.bound_schema(bound, rest, constraints),
                // Template serialized without a binding: keep the slot visible.
                None => Ok(json!({ "$ref": label })),
            },
        }
    }

    /// Schema for a type substituted into a generic slot. A bound model that
    /// still has deeper bindings to consume resolves inline with a fresh
    /// frame; anything else takes the ordinary path.
    fn bound_schema(
        &mut self,
        bound: &TypeRef,
        rest: &[Vec<TypeRef>],
        constraints: &Map<String, Value>,
    ) -> Result<Value, SchemaError> {
        if let TypeRef::Model(class) = bound {
            let meta = self.registry.class(*class)?;
            if !rest.is_empty() && !meta.generics.is_empty() {
                let labels = meta.generics.clone();
                let sub = BindingFrame::for_class(&labels, rest);
                return self.class_schema(*class, &sub);
            }
        }
        self.type_schema(bound, constraints, &BindingFrame::empty())
    }

    /// Register `class` under its name and return a `$ref` to it. In
    /// spec-less mode the schema is inlined instead.
    pub fn model_ref(&mut self, class: ClassId) -> Result<Value, SchemaError> {
        let name = self.registry.class(class)?.name.clone();

        if self.spec.is_none() {
            // Inline mode; guard self-referential models.
            if self.visiting.contains(&class) {
                return Ok(json!({"type": "object"}));
            }
            self.visiting.push(class);
            let schema = self.class_schema(class, &BindingFrame::empty());
            self.visiting.pop();
            return schema;
        }

        if !self.schemas.contains_key(&name) {
            // Placeholder first so a self-referential model sees itself
            // already registered and emits a $ref instead of recursing.
            self.schemas.insert(name.clone(), Value::Bool(false));
            let schema = self.class_schema(class, &BindingFrame::empty())?;
            self.schemas.insert(name.clone(), schema);
        }
        Ok(json!({ "$ref": format!("{}{}", self.ref_prefix(), name) }))
    }

    /// Resolve the generic template `class` against `levels` and inline the
    /// result, without registering anything under the class name. Responses
    /// with bindings use this; the leaf models bound inside still register
    /// themselves as usual.
    pub fn inline_resolved(
        &mut self,
        class: ClassId,
        levels: &[Vec<TypeRef>],
    ) -> Result<Value, SchemaError> {
        let labels = self.registry.class(class)?.generics.clone();
        let frame = BindingFrame::for_class(&labels, levels);
        self.class_schema(class, &frame)
    }

    /// Register the generic template `class` under its name with `levels`
    /// substituted, and return a `$ref` to the resolved schema. Used for body
    /// parameters of generic models; the shared template is never mutated;
    /// the resolved value lives only in this compilation's schema collection.
    pub fn resolved_model_ref(
        &mut self,
        class: ClassId,
        levels: &[Vec<TypeRef>],
    ) -> Result<Value, SchemaError> {
        let meta = self.registry.class(class)?;
        let name = meta.name.clone();
        let labels = meta.generics.clone();
        let frame = BindingFrame::for_class(&labels, levels);
        let resolved = self.class_schema(class, &frame)?;
        self.schemas.insert(name.clone(), resolved);
        Ok(json!({ "$ref": format!("{}{}", self.ref_prefix(), name) }))
    }
}
