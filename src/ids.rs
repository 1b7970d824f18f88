use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Strongly typed handle for a class registered in a
/// [`SchemaRegistry`](crate::SchemaRegistry).
///
/// Handles are assigned sequentially at definition time and index the
/// registry's class table. A handle is only meaningful for the registry that
/// issued it.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ClassId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}
