use crate::ids::ClassId;
use serde_json::{Map, Value};

/// Reference to the type carried by a schema member.
///
/// Generic slots are a distinct variant rather than a string tag smuggled
/// through the type name, so the resolution engine can match on them
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    String,
    Number,
    Integer,
    Boolean,
    /// Reference to another registered class. Resolved by lookup at
    /// serialization time, never deep-copied, so later schema changes to the
    /// referenced model propagate.
    Model(ClassId),
    /// Unresolved generic slot, bound at a usage site.
    Generic(String),
}

impl TypeRef {
    pub fn generic(label: impl Into<String>) -> Self {
        TypeRef::Generic(label.into())
    }

    /// JSON Schema `type` keyword for primitive variants.
    pub(crate) fn primitive_name(&self) -> Option<&'static str> {
        match self {
            TypeRef::String => Some("string"),
            TypeRef::Number => Some("number"),
            TypeRef::Integer => Some("integer"),
            TypeRef::Boolean => Some("boolean"),
            TypeRef::Model(_) | TypeRef::Generic(_) => None,
        }
    }

    pub(crate) fn is_primitive(&self) -> bool {
        self.primitive_name().is_some()
    }
}

/// Normalized collection shape of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionKind {
    #[default]
    None,
    /// `{type: "array", items: <T>}`
    Array,
    /// `{type: "array", contains: <T>}`; at least one element matches.
    Contains,
    /// `{type: "array", items: <T>, uniqueItems: true}`
    Set,
    /// `{type: "object", additionalProperties: <V>}`
    Map,
}

impl CollectionKind {
    pub(crate) fn is_collection(self) -> bool {
        !matches!(self, CollectionKind::None)
    }
}

/// Constraint keywords that belong on the collection node itself rather than
/// on the element schema.
const COLLECTION_KEYWORDS: [&str; 5] = [
    "minItems",
    "maxItems",
    "minProperties",
    "maxProperties",
    "uniqueItems",
];

pub(crate) fn is_collection_keyword(key: &str) -> bool {
    COLLECTION_KEYWORDS.contains(&key)
}

/// One member's schema declaration: type, collection shape, raw constraint
/// fragment, and the required/ignored flags.
///
/// Built fluently and attached via
/// [`SchemaRegistry::attach_schema`](crate::SchemaRegistry::attach_schema).
/// Re-attaching under the same member key replaces the previous node; a
/// `(class, member)` pair maps to exactly one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) ty: TypeRef,
    pub(crate) collection: CollectionKind,
    pub(crate) constraints: Map<String, Value>,
    pub(crate) required: bool,
    pub(crate) ignored: bool,
}

impl Schema {
    /// A plain (non-collection) member of the given type.
    pub fn of(ty: TypeRef) -> Self {
        Schema {
            ty,
            collection: CollectionKind::None,
            constraints: Map::new(),
            required: false,
            ignored: false,
        }
    }

    /// A collection member; `ty` is the element (or map value) type.
    pub fn collection_of(ty: TypeRef, kind: CollectionKind) -> Self {
        let mut schema = Schema::of(ty);
        schema.collection = kind;
        schema
    }

    /// Array member with `contains` semantics: valid when at least one
    /// element matches the element schema.
    pub fn contains(ty: TypeRef) -> Self {
        Schema::collection_of(ty, CollectionKind::Contains)
    }

    /// Mark the member as required. Absence of the marker means optional;
    /// required-ness is never inferred from the type.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Exclude the member from compiled schemas. Once a key is ignored
    /// anywhere in an ancestor chain it stays excluded for derived classes.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Attach a raw JSON Schema constraint keyword.
    pub fn constraint(mut self, key: &str, value: Value) -> Self {
        self.constraints.insert(key.to_string(), value);
        self
    }

    pub fn minimum(self, value: f64) -> Self {
        self.constraint("minimum", Value::from(value))
    }

    pub fn maximum(self, value: f64) -> Self {
        self.constraint("maximum", Value::from(value))
    }

    pub fn format(self, value: &str) -> Self {
        self.constraint("format", Value::from(value))
    }

    pub fn min_items(self, value: u64) -> Self {
        self.constraint("minItems", Value::from(value))
    }

    pub fn max_items(self, value: u64) -> Self {
        self.constraint("maxItems", Value::from(value))
    }

    pub fn min_properties(self, value: u64) -> Self {
        self.constraint("minProperties", Value::from(value))
    }

    pub fn max_properties(self, value: u64) -> Self {
        self.constraint("maxProperties", Value::from(value))
    }

    /// Split the raw fragment into (element-level, collection-level)
    /// constraints. Numeric bounds such as `minItems` attach to the resulting
    /// collection node, not to the item schema.
    pub(crate) fn split_constraints(&self) -> (Map<String, Value>, Map<String, Value>) {
        let mut value_level = Map::new();
        let mut collection_level = Map::new();
        for (k, v) in &self.constraints {
            if is_collection_keyword(k) {
                collection_level.insert(k.clone(), v.clone());
            } else {
                value_level.insert(k.clone(), v.clone());
            }
        }
        (value_level, collection_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_split() {
        let schema = Schema::collection_of(TypeRef::Number, CollectionKind::Array)
            .minimum(0.0)
            .min_items(1)
            .max_items(10);
        let (value_level, collection_level) = schema.split_constraints();
        assert_eq!(value_level.get("minimum"), Some(&json!(0.0)));
        assert_eq!(collection_level.get("minItems"), Some(&json!(1)));
        assert_eq!(collection_level.get("maxItems"), Some(&json!(10)));
        assert!(value_level.get("minItems").is_none());
    }

    #[test]
    fn test_primitive_names() {
        assert_eq!(TypeRef::String.primitive_name(), Some("string"));
        assert_eq!(TypeRef::Integer.primitive_name(), Some("integer"));
        assert_eq!(TypeRef::generic("T").primitive_name(), None);
    }
}
