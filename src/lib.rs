//! # specsmith
//!
//! **specsmith** is a metadata registry and spec compiler: classes, their
//! property schemas, and their HTTP operations are registered imperatively,
//! then compiled on demand into [Swagger 2.0](https://swagger.io/specification/v2/)
//! or [OpenAPI 3.x](https://spec.openapis.org/oas/v3.0.3) documents, or into
//! plain JSON Schema.
//!
//! ## Overview
//!
//! Registration builds a graph of schema nodes: models reference each other
//! by [`ClassId`] and are resolved by lookup at compile time, so later edits
//! to a referenced model propagate into every document that mentions it.
//! Generic models stay templates; usage sites supply bindings that are
//! resolved into fresh schemas without ever mutating the template.
//!
//! ## Architecture
//!
//! - **[`registry`]** - class definitions, property and operation registration, the compile cache
//! - **[`schema`]** - schema nodes, inheritance merging, generic resolution, JSON Schema serialization
//! - **[`operation`]** - parameter and response builders and their validation
//! - **[`spec`]** - the Swagger 2 / OpenAPI 3 document compiler
//! - **[`store`]** - the low-level keyed metadata store
//! - **[`export`]** - writing compiled documents to disk as JSON or YAML
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use specsmith::{ClassDef, Parameter, ParameterLocation, Schema, SchemaRegistry, SpecOptions, TypeRef};
//!
//! # fn main() -> Result<(), specsmith::SchemaError> {
//! let mut registry = SchemaRegistry::new();
//!
//! let model = registry.define_class(ClassDef::new("Pet"));
//! registry.attach_schema(model, "name", Schema::of(TypeRef::String).required())?;
//!
//! let ctrl = registry.define_class(ClassDef::new("PetController").path("/pets"));
//! registry.attach_operation(ctrl, "get", Method::GET, "/:id")?;
//! registry.attach_parameter(
//!     ctrl,
//!     "get",
//!     Parameter::new(ParameterLocation::Path).name("id"),
//! )?;
//!
//! let doc = registry.get_spec(ctrl, &SpecOptions::openapi3())?;
//! assert!(doc["paths"]["/pets/{id}"]["get"].is_object());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod export;
pub mod ids;
pub mod operation;
pub mod registry;
pub mod schema;
pub mod spec;
pub mod store;

pub use error::SchemaError;
pub use ids::ClassId;
pub use operation::{BaseType, Parameter, ParameterLocation, Response};
pub use registry::{ClassDef, ClassMeta, SchemaRegistry};
pub use schema::{CollectionKind, Schema, TypeRef};
pub use spec::{SpecOptions, SpecType};
