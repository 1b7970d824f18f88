pub(crate) mod generics;
pub mod node;
pub(crate) mod properties;
pub(crate) mod serialize;

pub use node::{CollectionKind, Schema, TypeRef};
