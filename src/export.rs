use crate::ids::ClassId;
use crate::registry::SchemaRegistry;
use crate::spec::SpecOptions;
use std::path::Path;

/// Compile the spec for `class` and write it to `file_path`, as YAML when the
/// extension is `.yaml`/`.yml` and pretty-printed JSON otherwise.
pub fn write_spec(
    registry: &SchemaRegistry,
    class: ClassId,
    options: &SpecOptions,
    file_path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let file_path = file_path.as_ref();
    let doc = registry.get_spec(class, options)?;

    let ext = file_path.extension().and_then(|e| e.to_str());
    let content = if matches!(ext, Some("yaml") | Some("yml")) {
        serde_yaml::to_string(&doc)?
    } else {
        serde_json::to_string_pretty(&doc)?
    };
    std::fs::write(file_path, content)?;

    tracing::info!(path = %file_path.display(), "spec written");
    Ok(())
}
