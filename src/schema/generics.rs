use crate::ids::ClassId;
use crate::registry::SchemaRegistry;
use crate::schema::node::TypeRef;

/// One resolution frame: the generic labels of the class currently being
/// resolved zipped with the concrete types bound at this level, plus the
/// deeper binding levels still to be consumed.
///
/// Frames are ephemeral; they live for one resolution call and are never
/// stored on the shared template node, so two independent usages of the same
/// generic class cannot leak into each other.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BindingFrame<'a> {
    labels: &'a [String],
    level: &'a [TypeRef],
    rest: &'a [Vec<TypeRef>],
}

const EMPTY_LABELS: &[String] = &[];
const EMPTY_LEVEL: &[TypeRef] = &[];
const EMPTY_REST: &[Vec<TypeRef>] = &[];

impl<'a> BindingFrame<'a> {
    pub fn empty() -> BindingFrame<'static> {
        BindingFrame {
            labels: EMPTY_LABELS,
            level: EMPTY_LEVEL,
            rest: EMPTY_REST,
        }
    }

    /// Frame for resolving `labels` against binding `levels`: level 0 maps the
    /// labels positionally, the remaining levels are handed to whichever bound
    /// model consumes them next.
    pub fn for_class(labels: &'a [String], levels: &'a [Vec<TypeRef>]) -> BindingFrame<'a> {
        match levels.split_first() {
            Some((level, rest)) => BindingFrame {
                labels,
                level,
                rest,
            },
            None => BindingFrame {
                labels,
                level: EMPTY_LEVEL,
                rest: EMPTY_REST,
            },
        }
    }

    /// Resolve a generic label to its bound type, if any, along with the
    /// binding levels remaining for the bound type's own generics.
    pub fn lookup(&self, label: &str) -> Option<(&'a TypeRef, &'a [Vec<TypeRef>])> {
        let pos = self.labels.iter().position(|l| l == label)?;
        self.level.get(pos).map(|ty| (ty, self.rest))
    }
}

/// Count how many of the supplied binding levels can actually be consumed by
/// `class` and the models bound beneath it. Levels beyond that count are
/// silently unused at resolution time; callers warn about them at
/// registration time.
pub(crate) fn usable_binding_levels(
    registry: &SchemaRegistry,
    class: ClassId,
    levels: &[Vec<TypeRef>],
) -> usize {
    let mut current: Vec<ClassId> = vec![class];
    for (depth, level) in levels.iter().enumerate() {
        let has_slot = current
            .iter()
            .any(|c| registry.class(*c).map(|m| !m.generics.is_empty()).unwrap_or(false));
        if !has_slot {
            return depth;
        }
        current = level
            .iter()
            .filter_map(|ty| match ty {
                TypeRef::Model(c) => Some(*c),
                _ => None,
            })
            .collect();
    }
    levels.len()
}
