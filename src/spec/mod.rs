pub(crate) mod build;
pub(crate) mod paths;

pub use build::{SpecOptions, SpecType};
