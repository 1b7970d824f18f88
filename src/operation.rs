use crate::error::SchemaError;
use crate::ids::ClassId;
use crate::schema::node::{CollectionKind, Schema, TypeRef};
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// Where an operation parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Body => "body",
        };
        write!(f, "{}", s)
    }
}

/// Base type of a declared response, mirroring the class argument of the
/// original `Returns(status, Type)` call: a primitive, a bare collection, or
/// a registered model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Set,
    Map,
    Model(ClassId),
}

impl BaseType {
    pub(crate) fn is_primitive(self) -> bool {
        matches!(
            self,
            BaseType::String | BaseType::Number | BaseType::Integer | BaseType::Boolean
        )
    }

    pub(crate) fn is_bare_collection(self) -> bool {
        matches!(self, BaseType::Array | BaseType::Set | BaseType::Map)
    }

    pub(crate) fn collection_kind(self) -> Option<CollectionKind> {
        match self {
            BaseType::Array => Some(CollectionKind::Array),
            BaseType::Set => Some(CollectionKind::Set),
            BaseType::Map => Some(CollectionKind::Map),
            _ => None,
        }
    }

    pub(crate) fn primitive_type(self) -> Option<TypeRef> {
        match self {
            BaseType::String => Some(TypeRef::String),
            BaseType::Number => Some(TypeRef::Number),
            BaseType::Integer => Some(TypeRef::Integer),
            BaseType::Boolean => Some(TypeRef::Boolean),
            _ => None,
        }
    }
}

/// Builder for one operation parameter, consumed by
/// [`SchemaRegistry::attach_parameter`](crate::SchemaRegistry::attach_parameter).
///
/// The wire name is optional for path parameters; an unnamed path parameter
/// takes its name from the path template it is merged into.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) location: ParameterLocation,
    pub(crate) name: Option<String>,
    pub(crate) schema: Schema,
    pub(crate) of_args: Vec<TypeRef>,
    pub(crate) nested_levels: Vec<Vec<TypeRef>>,
}

impl Parameter {
    pub fn new(location: ParameterLocation) -> Self {
        Parameter {
            location,
            name: None,
            schema: Schema::of(TypeRef::String),
            of_args: Vec::new(),
            nested_levels: Vec::new(),
        }
    }

    /// Shorthand for a request-body parameter.
    pub fn body() -> Self {
        Parameter::new(ParameterLocation::Body)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the member type. Defaults to `String`.
    pub fn of(mut self, ty: TypeRef) -> Self {
        self.schema.ty = ty;
        self
    }

    /// Set a collection member type; `ty` is the element (or map value) type.
    /// Flags and constraints set earlier in the chain are kept.
    pub fn collection_of(mut self, ty: TypeRef, kind: CollectionKind) -> Self {
        self.schema.ty = ty;
        self.schema.collection = kind;
        self
    }

    pub fn required(mut self) -> Self {
        self.schema = self.schema.required();
        self
    }

    pub fn constraint(mut self, key: &str, value: Value) -> Self {
        self.schema = self.schema.constraint(key, value);
        self
    }

    pub fn minimum(self, value: f64) -> Self {
        self.constraint("minimum", Value::from(value))
    }

    pub fn maximum(self, value: f64) -> Self {
        self.constraint("maximum", Value::from(value))
    }

    /// Bind the member model's generic labels to concrete types
    /// (the `GenericOf(...)` usage site).
    pub fn generic_of(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.of_args.extend(types);
        self
    }

    /// Bind generics nested one level inside the previous binding. Each call
    /// opens a deeper level.
    pub fn nested(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.nested_levels.push(types.into_iter().collect());
        self
    }

    pub(crate) fn into_node(self, index: usize) -> Result<ParameterNode, SchemaError> {
        let mut bindings: Vec<Vec<TypeRef>> = Vec::new();
        if !self.of_args.is_empty() {
            if self.schema.ty.is_primitive() && !self.schema.collection.is_collection() {
                return Err(SchemaError::OfOnPrimitive {
                    decorator: "GenericOf",
                });
            }
            bindings.push(self.of_args);
        }
        if !self.nested_levels.is_empty() {
            // Nesting needs an outer binding on a named model to attach to.
            if self.schema.ty.is_primitive()
                || self.schema.collection.is_collection()
                || bindings.is_empty()
            {
                return Err(SchemaError::NestedOnBareType {
                    decorator: "GenericOf",
                });
            }
            bindings.extend(self.nested_levels);
        }
        Ok(ParameterNode {
            location: self.location,
            name: self.name,
            index,
            schema: self.schema,
            bindings,
        })
    }
}

/// A validated, attached parameter.
#[derive(Debug, Clone)]
pub struct ParameterNode {
    pub location: ParameterLocation,
    pub name: Option<String>,
    pub index: usize,
    pub schema: Schema,
    pub bindings: Vec<Vec<TypeRef>>,
}

/// Builder for one declared response, mirroring the original
/// `Returns(status, Type).Of(...).Nested(...).Description(...)` chain.
///
/// `Of` is overloaded the way the original overloads it: on a collection base
/// it sets the element type, on a generic model base it supplies generic
/// bindings, and on a primitive base it is rejected when the response is
/// attached.
#[derive(Debug, Clone)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) base: BaseType,
    pub(crate) of_args: Vec<TypeRef>,
    pub(crate) nested_levels: Vec<Vec<TypeRef>>,
    pub(crate) description: Option<String>,
    pub(crate) media_type: Option<String>,
}

impl Response {
    /// A response with the default `String` base type, matching the original
    /// `Returns(status)` call.
    pub fn new(status: u16) -> Self {
        Response::with(status, BaseType::String)
    }

    pub fn with(status: u16, base: BaseType) -> Self {
        Response {
            status,
            base,
            of_args: Vec::new(),
            nested_levels: Vec::new(),
            description: None,
            media_type: None,
        }
    }

    pub fn of(mut self, ty: TypeRef) -> Self {
        self.of_args.push(ty);
        self
    }

    pub fn nested(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.nested_levels.push(types.into_iter().collect());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Set the response media type explicitly. Without it the media type is
    /// `*/*`, or `text/json` once `of`/`nested` is applied.
    pub fn content_type(mut self, media_type: &str) -> Self {
        self.media_type = Some(media_type.to_string());
        self
    }

    pub(crate) fn into_node(self) -> Result<(u16, ResponseNode), SchemaError> {
        let mut item = None;
        let mut bindings: Vec<Vec<TypeRef>> = Vec::new();
        let mut media_type = self.media_type;

        if !self.of_args.is_empty() {
            if self.base.is_primitive() {
                return Err(SchemaError::OfOnPrimitive {
                    decorator: "Returns",
                });
            }
            if self.base.is_bare_collection() {
                item = self.of_args.into_iter().next();
            } else {
                bindings.push(self.of_args);
            }
            media_type.get_or_insert_with(|| "text/json".to_string());
        }
        if !self.nested_levels.is_empty() {
            if self.base.is_primitive() || self.base.is_bare_collection() {
                return Err(SchemaError::NestedOnBareType {
                    decorator: "Returns",
                });
            }
            bindings.extend(self.nested_levels);
            media_type.get_or_insert_with(|| "text/json".to_string());
        }

        Ok((
            self.status,
            ResponseNode {
                base: self.base,
                item,
                bindings,
                description: self.description.unwrap_or_default(),
                media_type,
            },
        ))
    }
}

/// A validated, attached response.
#[derive(Debug, Clone)]
pub struct ResponseNode {
    pub base: BaseType,
    pub item: Option<TypeRef>,
    pub bindings: Vec<Vec<TypeRef>>,
    pub description: String,
    pub media_type: Option<String>,
}

/// All metadata accumulated for one decorated method: the operation paths it
/// is mounted at, its ordered parameters, its responses, and media types.
///
/// Created when the first registration call names the method; mutated by each
/// further call; never removed. A store with zero operation paths is skipped
/// at compile time rather than erroring.
#[derive(Debug, Clone, Default)]
pub struct OperationStore {
    pub method_key: String,
    pub operation_paths: Vec<(Method, String)>,
    pub parameters: Vec<ParameterNode>,
    pub responses: BTreeMap<u16, ResponseNode>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl OperationStore {
    pub(crate) fn new(method_key: &str) -> Self {
        OperationStore {
            method_key: method_key.to_string(),
            ..Default::default()
        }
    }
}
