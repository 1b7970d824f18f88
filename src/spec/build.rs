use crate::error::SchemaError;
use crate::operation::{BaseType, OperationStore, ParameterLocation, ParameterNode};
use crate::registry::{SchemaRegistry, META_CONSUMES, META_PRODUCES};
use crate::schema::generics::BindingFrame;
use crate::schema::node::{CollectionKind, TypeRef};
use crate::schema::serialize::SchemaCompiler;
use crate::spec::paths::{build_path, template_params, OperationIdFormatter};
use http::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Target document flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecType {
    /// Swagger 2.0: flat non-body parameters, `in: body` parameter,
    /// `definitions` at the root.
    #[default]
    Swagger2,
    /// OpenAPI 3.x: `schema`-wrapped parameters, `requestBody`,
    /// `components.schemas` at the root.
    OpenApi3,
}

/// Options for one spec compilation. Also the cache key: two option values
/// with the same serialized form share a cached document.
#[derive(Debug, Clone, Serialize)]
pub struct SpecOptions {
    pub spec: SpecType,
    pub root_path: String,
    pub operation_id_pattern: Option<String>,
}

impl Default for SpecOptions {
    fn default() -> Self {
        SpecOptions {
            spec: SpecType::default(),
            root_path: "/".to_string(),
            operation_id_pattern: None,
        }
    }
}

impl SpecOptions {
    pub fn swagger2() -> Self {
        SpecOptions::default()
    }

    pub fn openapi3() -> Self {
        SpecOptions {
            spec: SpecType::OpenApi3,
            ..Default::default()
        }
    }

    /// Prefix every operation path with `path`.
    pub fn root_path(mut self, path: &str) -> Self {
        self.root_path = path.to_string();
        self
    }

    /// Override the `operationId` pattern. `%c` is the class name, `%m` the
    /// method key; the substituted result is camel-cased.
    pub fn operation_id_pattern(mut self, pattern: &str) -> Self {
        self.operation_id_pattern = Some(pattern.to_string());
        self
    }

    pub(crate) fn cache_key(&self) -> String {
        // Serialization of a plain struct with string fields cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Compile the spec document for one controller class: every mounted
/// operation path serialized and merged under `paths`, with the schemas
/// referenced along the way collected at the root.
pub(crate) fn compile_spec(
    registry: &SchemaRegistry,
    class: crate::ids::ClassId,
    options: &SpecOptions,
) -> Result<Value, SchemaError> {
    let meta = registry.class(class)?;
    let class_name = meta.name.clone();
    let ctrl_path = meta.path.clone().unwrap_or_default();
    let class_consumes = registry.class_media_types(class, META_CONSUMES);
    let class_produces = registry.class_media_types(class, META_PRODUCES);

    let mut compiler = SchemaCompiler::new(registry, Some(options.spec));
    let mut ids = OperationIdFormatter::new(options.operation_id_pattern.as_deref());
    let mut paths: Map<String, Value> = Map::new();

    for op in registry.operations(class) {
        for (method, op_path) in &op.operation_paths {
            let full_path = build_path(&[options.root_path.as_str(), &ctrl_path, op_path]);
            let operation_id = ids.format(&class_name, &op.method_key, &full_path);
            let operation = serialize_operation(
                &mut compiler,
                op,
                &full_path,
                operation_id,
                options.spec,
                &class_consumes,
                &class_produces,
            )?;
            merge_operation(&mut paths, &full_path, method, operation);
        }
    }

    let mut doc = Map::new();
    doc.insert("paths".to_string(), Value::Object(paths));
    match options.spec {
        SpecType::Swagger2 => {
            doc.insert("definitions".to_string(), Value::Object(compiler.schemas));
        }
        SpecType::OpenApi3 => {
            doc.insert(
                "components".to_string(),
                json!({ "schemas": compiler.schemas }),
            );
        }
    }
    Ok(Value::Object(doc))
}

fn merge_operation(paths: &mut Map<String, Value>, path: &str, method: &Method, operation: Value) {
    let entry = paths
        .entry(path.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(item) = entry.as_object_mut() {
        item.insert(method.as_str().to_lowercase(), operation);
    }
}

#[allow(clippy::too_many_arguments)]
fn serialize_operation(
    compiler: &mut SchemaCompiler<'_>,
    op: &OperationStore,
    path: &str,
    operation_id: String,
    spec: SpecType,
    class_consumes: &[String],
    class_produces: &[String],
) -> Result<Value, SchemaError> {
    let mut obj = Map::new();
    obj.insert("operationId".to_string(), Value::String(operation_id));

    let mut parameters = path_parameters(compiler, op, path, spec)?;
    for node in &op.parameters {
        match node.location {
            ParameterLocation::Query | ParameterLocation::Header | ParameterLocation::Cookie => {
                let name = node.name.clone().unwrap_or_default();
                parameters.push(non_body_parameter(
                    compiler,
                    node,
                    &name,
                    node.schema.required,
                    spec,
                )?);
            }
            ParameterLocation::Path | ParameterLocation::Body => {}
        }
    }

    let body_nodes: Vec<&ParameterNode> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Body)
        .collect();
    if !body_nodes.is_empty() {
        let required = body_nodes.iter().any(|p| p.schema.required);
        let schema = merged_body_schema(compiler, &body_nodes)?;
        match spec {
            SpecType::Swagger2 => parameters.push(json!({
                "in": "body",
                "name": "body",
                "required": required,
                "schema": schema,
            })),
            SpecType::OpenApi3 => {
                let media = op
                    .consumes
                    .first()
                    .or_else(|| class_consumes.first())
                    .map(String::as_str)
                    .unwrap_or("application/json");
                obj.insert(
                    "requestBody".to_string(),
                    json!({
                        "content": { media: { "schema": schema } },
                        "required": required,
                    }),
                );
            }
        }
    }
    obj.insert("parameters".to_string(), Value::Array(parameters));

    let explicit_produces = if op.produces.is_empty() {
        class_produces
    } else {
        op.produces.as_slice()
    };
    let mut produces: Vec<String> = Vec::new();
    for media in explicit_produces {
        if !produces.contains(media) {
            produces.push(media.clone());
        }
    }

    let mut responses = Map::new();
    if op.responses.is_empty() {
        // An operation always documents at least a 200.
        responses.insert("200".to_string(), json!({ "description": "" }));
    } else {
        for (status, node) in &op.responses {
            let schema = response_schema(compiler, node)?;
            let media = node.media_type.as_deref().unwrap_or("*/*");
            match spec {
                SpecType::Swagger2 => {
                    responses.insert(
                        status.to_string(),
                        json!({ "description": node.description, "schema": schema }),
                    );
                    if media != "*/*" && !produces.iter().any(|m| m == media) {
                        produces.push(media.to_string());
                    }
                }
                SpecType::OpenApi3 => {
                    responses.insert(
                        status.to_string(),
                        json!({
                            "content": { media: { "schema": schema } },
                            "description": node.description,
                        }),
                    );
                }
            }
        }
    }
    obj.insert("responses".to_string(), Value::Object(responses));

    // Media type lists are Swagger 2 surface; OpenAPI 3 carries them inside
    // requestBody and response content.
    if spec == SpecType::Swagger2 {
        let consumes = if op.consumes.is_empty() {
            class_consumes
        } else {
            op.consumes.as_slice()
        };
        if !consumes.is_empty() {
            obj.insert("consumes".to_string(), json!(consumes));
        }
        if !produces.is_empty() {
            obj.insert("produces".to_string(), json!(produces));
        }
    }

    Ok(Value::Object(obj))
}

/// Path parameters in template order. A declared parameter without a wire
/// name takes the next free template name; a template name with no declared
/// parameter gets a synthesized required string parameter. Declared path
/// parameters absent from this path's template are dropped.
fn path_parameters(
    compiler: &mut SchemaCompiler<'_>,
    op: &OperationStore,
    path: &str,
    spec: SpecType,
) -> Result<Vec<Value>, SchemaError> {
    let template = template_params(path);

    let mut named: Vec<(&str, &ParameterNode)> = Vec::new();
    let mut unnamed: Vec<&ParameterNode> = Vec::new();
    for node in &op.parameters {
        if node.location == ParameterLocation::Path {
            match &node.name {
                Some(name) => named.push((name.as_str(), node)),
                None => unnamed.push(node),
            }
        }
    }
    let mut unnamed = unnamed.into_iter();

    let mut out = Vec::with_capacity(template.len());
    for name in &template {
        let declared = named
            .iter()
            .find(|(n, _)| *n == name.as_str())
            .map(|(_, node)| *node)
            .or_else(|| unnamed.next());
        let value = match declared {
            // Path parameters are always required, whatever was declared.
            Some(node) => non_body_parameter(compiler, node, name, true, spec)?,
            None => match spec {
                SpecType::Swagger2 => json!({
                    "in": "path",
                    "name": name,
                    "required": true,
                    "type": "string",
                }),
                SpecType::OpenApi3 => json!({
                    "in": "path",
                    "name": name,
                    "required": true,
                    "schema": { "type": "string" },
                }),
            },
        };
        out.push(value);
    }
    Ok(out)
}

fn non_body_parameter(
    compiler: &mut SchemaCompiler<'_>,
    node: &ParameterNode,
    name: &str,
    required: bool,
    spec: SpecType,
) -> Result<Value, SchemaError> {
    let schema = compiler.member_schema(&node.schema, &BindingFrame::empty())?;
    let mut obj = Map::new();
    obj.insert("in".to_string(), json!(node.location.to_string()));
    obj.insert("name".to_string(), json!(name));
    obj.insert("required".to_string(), json!(required));
    match spec {
        // Swagger 2 flattens the schema keywords into the parameter object.
        SpecType::Swagger2 => {
            if let Value::Object(fields) = schema {
                for (k, v) in fields {
                    obj.insert(k, v);
                }
            }
        }
        SpecType::OpenApi3 => {
            obj.insert("schema".to_string(), schema);
        }
    }
    Ok(Value::Object(obj))
}

/// Merge every body parameter of an operation into the single body schema.
///
/// One unnamed parameter contributes its schema directly; several unnamed
/// parameters combine under `allOf`; named parameters build an object schema,
/// with dotted names (`deep.model`) nesting objects and a required parameter
/// marking its key required at every level it introduces. A mix of named and
/// unnamed parameters combines the unnamed schemas and the named object
/// under `allOf`.
fn merged_body_schema(
    compiler: &mut SchemaCompiler<'_>,
    body_nodes: &[&ParameterNode],
) -> Result<Value, SchemaError> {
    let (named, unnamed): (Vec<&ParameterNode>, Vec<&ParameterNode>) =
        body_nodes.iter().copied().partition(|p| p.name.is_some());

    if named.is_empty() {
        if let [single] = unnamed.as_slice() {
            return body_node_schema(compiler, single);
        }
        let mut parts = Vec::with_capacity(unnamed.len());
        for node in unnamed {
            parts.push(body_node_schema(compiler, node)?);
        }
        return Ok(json!({ "type": "object", "allOf": parts }));
    }

    let mut root = Map::new();
    root.insert("type".to_string(), json!("object"));
    for node in &named {
        let name = node.name.clone().unwrap_or_default();
        let segments: Vec<&str> = name.split('.').collect();
        let schema = body_node_schema(compiler, node)?;
        insert_body_property(&mut root, &segments, schema, node.schema.required);
    }
    if unnamed.is_empty() {
        return Ok(Value::Object(root));
    }

    let mut parts = Vec::with_capacity(unnamed.len() + 1);
    for node in unnamed {
        parts.push(body_node_schema(compiler, node)?);
    }
    parts.push(Value::Object(root));
    Ok(json!({ "type": "object", "allOf": parts }))
}

fn insert_body_property(target: &mut Map<String, Value>, segments: &[&str], schema: Value, required: bool) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if required {
        let list = target
            .entry("required")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(items) = list.as_array_mut() {
            if !items.iter().any(|v| v == head) {
                items.push(json!(head));
            }
        }
    }

    let properties = target
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(properties) = properties.as_object_mut() else {
        return;
    };

    if rest.is_empty() {
        properties.insert((*head).to_string(), schema);
        return;
    }
    let child = properties
        .entry((*head).to_string())
        .or_insert_with(|| json!({ "type": "object" }));
    if let Some(child) = child.as_object_mut() {
        insert_body_property(child, rest, schema, required);
    }
}

/// Schema for one body parameter. A generic model with bindings registers a
/// resolved copy under the model name so the body can reference it.
fn body_node_schema(
    compiler: &mut SchemaCompiler<'_>,
    node: &ParameterNode,
) -> Result<Value, SchemaError> {
    if !node.bindings.is_empty() {
        if let TypeRef::Model(class) = &node.schema.ty {
            let resolved = compiler.resolved_model_ref(*class, &node.bindings)?;
            return Ok(wrap_collection(resolved, node.schema.collection));
        }
    }
    compiler.member_schema(&node.schema, &BindingFrame::empty())
}

fn wrap_collection(item: Value, kind: CollectionKind) -> Value {
    match kind {
        CollectionKind::None => item,
        CollectionKind::Array => json!({ "type": "array", "items": item }),
        CollectionKind::Contains => json!({ "type": "array", "contains": item }),
        CollectionKind::Set => json!({ "type": "array", "items": item, "uniqueItems": true }),
        CollectionKind::Map => json!({ "type": "object", "additionalProperties": item }),
    }
}

/// Schema for one declared response. Generic bindings on a model base
/// resolve inline; a model base without bindings goes through the shared
/// schema collection as a `$ref`.
fn response_schema(
    compiler: &mut SchemaCompiler<'_>,
    node: &crate::operation::ResponseNode,
) -> Result<Value, SchemaError> {
    match node.base {
        BaseType::Model(class) => {
            if node.bindings.is_empty() {
                compiler.model_ref(class)
            } else {
                compiler.inline_resolved(class, &node.bindings)
            }
        }
        BaseType::Array | BaseType::Set | BaseType::Map => {
            let kind = node
                .base
                .collection_kind()
                .unwrap_or(CollectionKind::Array);
            match &node.item {
                Some(ty) => {
                    let item = compiler.type_schema(ty, &Map::new(), &BindingFrame::empty())?;
                    Ok(wrap_collection(item, kind))
                }
                None if node.base == BaseType::Map => Ok(json!({ "type": "object" })),
                None => Ok(json!({ "type": "array" })),
            }
        }
        base => {
            let ty = base.primitive_type().unwrap_or(TypeRef::String);
            compiler.type_schema(&ty, &Map::new(), &BindingFrame::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable_per_options() {
        let a = SpecOptions::openapi3().root_path("/rest");
        let b = SpecOptions::openapi3().root_path("/rest");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), SpecOptions::swagger2().cache_key());
    }

    #[test]
    fn test_merge_operation_groups_methods_under_path() {
        let mut paths = Map::new();
        merge_operation(&mut paths, "/pets", &Method::GET, json!({"operationId": "a"}));
        merge_operation(&mut paths, "/pets", &Method::POST, json!({"operationId": "b"}));

        let item = paths.get("/pets").and_then(Value::as_object).unwrap();
        assert!(item.contains_key("get"));
        assert!(item.contains_key("post"));
    }

    #[test]
    fn test_dotted_body_name_nests_objects() {
        let mut root = Map::new();
        root.insert("type".to_string(), json!("object"));
        insert_body_property(&mut root, &["deep", "model"], json!({"type": "string"}), true);

        assert_eq!(
            Value::Object(root),
            json!({
                "type": "object",
                "properties": {
                    "deep": {
                        "type": "object",
                        "properties": { "model": { "type": "string" } },
                        "required": ["model"]
                    }
                },
                "required": ["deep"]
            })
        );
    }
}
