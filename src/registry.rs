use crate::error::SchemaError;
use crate::ids::ClassId;
use crate::operation::{OperationStore, Parameter, Response};
use crate::schema::generics::usable_binding_levels;
use crate::schema::node::Schema;
use crate::schema::properties::effective_properties;
use crate::schema::serialize::SchemaCompiler;
use crate::spec::build::compile_spec;
use crate::spec::paths::expand_optional_segments;
use crate::spec::SpecOptions;
use crate::store::MetadataStore;
use dashmap::DashMap;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Class-level metadata keys used in the [`MetadataStore`].
pub(crate) const META_CONSUMES: &str = "operation:consumes";
pub(crate) const META_PRODUCES: &str = "operation:produces";

/// Descriptor for a class being defined: its model name, optional base class
/// (the explicit ancestor chain), declared generic labels, and, for
/// controllers, a base path prefixed to every operation path.
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    base: Option<ClassId>,
    generics: Vec<String>,
    path: Option<String>,
}

impl ClassDef {
    pub fn new(name: &str) -> Self {
        ClassDef {
            name: name.to_string(),
            base: None,
            generics: Vec::new(),
            path: None,
        }
    }

    pub fn extends(mut self, base: ClassId) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare generic labels, e.g. `.generics(["T"])`, to be bound at usage
    /// sites.
    pub fn generics<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generics = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Controller base path, prepended to every operation path of the class.
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }
}

/// Resolved metadata for a defined class.
#[derive(Debug, Clone)]
pub struct ClassMeta {
    pub name: String,
    pub base: Option<ClassId>,
    pub generics: Vec<String>,
    pub path: Option<String>,
}

/// Process-wide metadata registry and spec compiler front door.
///
/// All registration ("decorator") calls write into one registry; compilation
/// reads from it. Registration takes `&mut self`; compilation takes `&self`
/// and is safe to call concurrently for different classes: the spec cache is
/// a concurrent map and the compile counter is atomic. Compilation is
/// deterministic, so a racing double-compute of the same key is wasteful but
/// not incorrect.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    classes: Vec<ClassMeta>,
    props: HashMap<ClassId, Vec<(String, Schema)>>,
    ops: HashMap<ClassId, Vec<OperationStore>>,
    metadata: MetadataStore,
    spec_cache: DashMap<(ClassId, String), Value>,
    compilations: AtomicU64,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a class and return its handle. Names are not deduplicated; two
    /// classes sharing a name will collide in `definitions`; avoiding that
    /// is the caller's responsibility.
    pub fn define_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassMeta {
            name: def.name,
            base: def.base,
            generics: def.generics,
            path: def.path,
        });
        id
    }

    pub fn class(&self, id: ClassId) -> Result<&ClassMeta, SchemaError> {
        self.classes
            .get(id.index())
            .ok_or(SchemaError::ClassNotFound(id))
    }

    fn class_name(&self, id: ClassId) -> String {
        self.class(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    /// Ancestor chain including `id` itself, ordered most-base first, so a
    /// walk lets derived declarations override base ones.
    pub(crate) fn ancestors_base_first(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(base) = self.class(current).ok().and_then(|m| m.base) {
            chain.push(base);
            current = base;
        }
        chain.reverse();
        chain
    }

    /// Properties declared directly on `class`, in declaration order.
    pub fn own_properties(&self, class: ClassId) -> &[(String, Schema)] {
        self.props.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Effective properties for `class`: ancestors merged most-base first,
    /// ignored entries excluded unless `with_ignored` is set. A key ignored
    /// anywhere in the chain stays excluded for derived classes.
    pub fn properties(&self, class: ClassId, with_ignored: bool) -> Vec<(String, Schema)> {
        effective_properties(self, class, with_ignored)
    }

    /// Attach (or replace) the schema node for one member. Each
    /// `(class, member)` pair maps to exactly one node; re-registration
    /// mutates, never duplicates.
    pub fn attach_schema(
        &mut self,
        class: ClassId,
        member: &str,
        schema: Schema,
    ) -> Result<(), SchemaError> {
        self.class(class)?;
        if self.operation(class, member).is_some() {
            return Err(SchemaError::Misuse {
                decorator: "Property",
                kind: "method",
                class: self.class_name(class),
                member: member.to_string(),
            });
        }
        let props = self.props.entry(class).or_default();
        match props.iter_mut().find(|(k, _)| k == member) {
            Some(slot) => slot.1 = schema,
            None => props.push((member.to_string(), schema)),
        }
        Ok(())
    }

    fn is_property(&self, class: ClassId, member: &str) -> bool {
        self.own_properties(class).iter().any(|(k, _)| k == member)
    }

    pub(crate) fn operation(&self, class: ClassId, member: &str) -> Option<&OperationStore> {
        self.ops
            .get(&class)
            .and_then(|ops| ops.iter().find(|op| op.method_key == member))
    }

    /// All operation stores declared on `class`, in declaration order.
    pub fn operations(&self, class: ClassId) -> &[OperationStore] {
        self.ops.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    fn operation_mut(
        &mut self,
        class: ClassId,
        member: &str,
        decorator: &'static str,
    ) -> Result<&mut OperationStore, SchemaError> {
        self.class(class)?;
        if self.is_property(class, member) {
            return Err(SchemaError::Misuse {
                decorator,
                kind: "property",
                class: self.class_name(class),
                member: member.to_string(),
            });
        }
        let ops = self.ops.entry(class).or_default();
        if !ops.iter().any(|op| op.method_key == member) {
            ops.push(OperationStore::new(member));
        }
        // Lookup again to satisfy the borrow checker; the store now exists.
        let idx = ops
            .iter()
            .position(|op| op.method_key == member)
            .unwrap_or_default();
        Ok(&mut ops[idx])
    }

    /// Mount a method at `(http_method, path)`. A path with an optional
    /// parameter (`/:id?`) expands into one operation path per variant, so a
    /// single registration can yield several entries in the compiled
    /// document.
    pub fn attach_operation(
        &mut self,
        class: ClassId,
        member: &str,
        http_method: Method,
        path: &str,
    ) -> Result<(), SchemaError> {
        let variants = expand_optional_segments(path);
        let op = self.operation_mut(class, member, "OperationPath")?;
        for variant in variants {
            let entry = (http_method.clone(), variant);
            if !op.operation_paths.contains(&entry) {
                op.operation_paths.push(entry);
            }
        }
        Ok(())
    }

    /// Attach the next operation parameter. Binding validation (`GenericOf`
    /// on a primitive, `Nested` without a model to attach to) fails here,
    /// at registration time.
    pub fn attach_parameter(
        &mut self,
        class: ClassId,
        member: &str,
        parameter: Parameter,
    ) -> Result<(), SchemaError> {
        let op = self.operation_mut(class, member, "In")?;
        let index = op.parameters.len();
        let node = parameter.into_node(index)?;
        let bindings = node.bindings.clone();
        let model = match &node.schema.ty {
            crate::schema::node::TypeRef::Model(model) => Some(*model),
            _ => None,
        };
        op.parameters.push(node);

        if let Some(model) = model {
            let usable = usable_binding_levels(self, model, &bindings);
            if usable < bindings.len() {
                tracing::warn!(
                    class = %self.class_name(class),
                    member,
                    index,
                    "unused generic binding level(s) on parameter; they will be ignored"
                );
            }
        }
        Ok(())
    }

    /// Attach (or replace) the response declared for a status code.
    pub fn attach_response(
        &mut self,
        class: ClassId,
        member: &str,
        response: Response,
    ) -> Result<(), SchemaError> {
        let base = response.base;
        let (status, node) = response.into_node()?;
        let bindings = node.bindings.clone();
        let op = self.operation_mut(class, member, "Returns")?;
        op.responses.insert(status, node);

        if let crate::operation::BaseType::Model(model) = base {
            let usable = usable_binding_levels(self, model, &bindings);
            if usable < bindings.len() {
                tracing::warn!(
                    class = %self.class_name(class),
                    member,
                    status,
                    "unused generic binding level(s) on response; they will be ignored"
                );
            }
        }
        Ok(())
    }

    /// Declare a consumed media type, on one method or, with `member` absent,
    /// on the class, applying to all of its operations.
    pub fn attach_consumes(
        &mut self,
        class: ClassId,
        member: Option<&str>,
        media_type: &str,
    ) -> Result<(), SchemaError> {
        match member {
            Some(member) => {
                let op = self.operation_mut(class, member, "Consumes")?;
                op.consumes.push(media_type.to_string());
            }
            None => {
                self.class(class)?;
                self.metadata.push(class, META_CONSUMES, Value::from(media_type));
            }
        }
        Ok(())
    }

    /// Declare a produced media type, on one method or the whole class.
    pub fn attach_produces(
        &mut self,
        class: ClassId,
        member: Option<&str>,
        media_type: &str,
    ) -> Result<(), SchemaError> {
        match member {
            Some(member) => {
                let op = self.operation_mut(class, member, "Produces")?;
                op.produces.push(media_type.to_string());
            }
            None => {
                self.class(class)?;
                self.metadata.push(class, META_PRODUCES, Value::from(media_type));
            }
        }
        Ok(())
    }

    pub(crate) fn class_media_types(&self, class: ClassId, key: &str) -> Vec<String> {
        self.metadata
            .get(class, key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Compile (or fetch from cache) the spec document for `class`.
    ///
    /// Memoized by `(class, options)` using a stable serialization of the
    /// options as the cache key: repeated calls with equivalent options
    /// return the cached document without recomputing.
    pub fn get_spec(&self, class: ClassId, options: &SpecOptions) -> Result<Value, SchemaError> {
        self.class(class)?;
        let key = (class, options.cache_key());

        if let Some(doc) = self.spec_cache.get(&key) {
            tracing::debug!(class = %self.class_name(class), "spec cache hit");
            return Ok(doc.value().clone());
        }

        tracing::debug!(class = %self.class_name(class), spec = ?options.spec, "compiling spec");
        let doc = compile_spec(self, class, options)?;
        self.compilations.fetch_add(1, Ordering::Relaxed);
        let entry = self.spec_cache.entry(key).or_insert(doc);
        Ok(entry.value().clone())
    }

    /// Serialize the class's schema without a spec context: nested models are
    /// inlined and unresolved generic slots render as `{"$ref": "<label>"}`.
    pub fn get_json_schema(&self, class: ClassId) -> Result<Value, SchemaError> {
        let mut compiler = SchemaCompiler::new(self, None);
        compiler.class_schema(class, &crate::schema::generics::BindingFrame::empty())
    }

    /// Number of spec compilations actually performed (cache misses).
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Drop every class, property, operation and cached document. Intended
    /// for test isolation; outstanding [`ClassId`]s become invalid.
    pub fn clear(&mut self) {
        self.classes.clear();
        self.props.clear();
        self.ops.clear();
        self.metadata.clear();
        self.spec_cache.clear();
        self.compilations.store(0, Ordering::Relaxed);
    }
}
