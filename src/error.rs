use crate::ids::ClassId;
use thiserror::Error;

/// Errors raised while registering metadata or compiling a spec document.
///
/// Every variant is fatal to the call that produced it; nothing is retried or
/// recovered internally. Messages identify the offending class, member and
/// registration kind so a misdeclared controller can be located from the error
/// alone.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A generic accessor was applied to a base type that carries no generic
    /// slot to bind (`String`, `Number`, `Boolean`).
    #[error("{decorator}.Of cannot be used with the following primitive classes: String, Number, Boolean")]
    OfOnPrimitive { decorator: &'static str },

    /// A nested accessor was applied to a bare collection or primitive base
    /// type. Nesting requires an intermediate named model.
    #[error("{decorator}.Nested cannot be used with the following classes: Map, Set, Array, String, Number, Boolean")]
    NestedOnBareType { decorator: &'static str },

    /// A registration call was applied to an unsupported target kind, e.g. a
    /// response attached to a member already declared as a property.
    #[error("{decorator} cannot be used as {kind} decorator on {class}.{member}")]
    Misuse {
        decorator: &'static str,
        kind: &'static str,
        class: String,
        member: String,
    },

    /// The [`ClassId`] does not resolve in this registry. Only reachable by
    /// holding a handle across [`crate::SchemaRegistry::clear`].
    #[error("class id {0} is not defined in this registry")]
    ClassNotFound(ClassId),
}
