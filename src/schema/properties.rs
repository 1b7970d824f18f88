use crate::ids::ClassId;
use crate::registry::SchemaRegistry;
use crate::schema::node::Schema;

/// Compute the effective property set for `class`: own declarations merged
/// with every ancestor's, most-base first, so a derived declaration overrides
/// a base one under the same key while keeping the base's position.
///
/// Unless `with_ignored` is set, ignored properties are removed, and once a
/// key is flagged ignored anywhere in the chain it stays excluded for every
/// more-derived class, even if redeclared without the flag.
pub(crate) fn effective_properties(
    registry: &SchemaRegistry,
    class: ClassId,
    with_ignored: bool,
) -> Vec<(String, Schema)> {
    let mut merged: Vec<(String, Schema)> = Vec::new();
    let mut excluded: Vec<String> = Vec::new();

    for ancestor in registry.ancestors_base_first(class) {
        for (key, schema) in registry.own_properties(ancestor) {
            if excluded.iter().any(|k| k == key) {
                continue;
            }
            if !with_ignored && schema.ignored {
                merged.retain(|(k, _)| k != key);
                excluded.push(key.clone());
                continue;
            }
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = schema.clone(),
                None => merged.push((key.clone(), schema.clone())),
            }
        }
    }

    merged
}
