use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

#[allow(clippy::expect_used)]
static EXPRESS_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(\w+)").expect("Failed to compile path regex"));

#[allow(clippy::expect_used)]
static TEMPLATE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("Failed to compile path regex"));

#[allow(clippy::expect_used)]
static DOUBLE_SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//+").expect("Failed to compile path regex"));

/// Join and normalize path fragments into one URI template: `:name` segments
/// become `{name}`, duplicate slashes collapse, and the trailing slash is
/// trimmed. An empty result normalizes to `/`.
pub(crate) fn build_path(fragments: &[&str]) -> String {
    let joined = fragments.join("/");
    let templated = EXPRESS_PARAM_RE.replace_all(&joined, "{$1}");
    let collapsed = DOUBLE_SLASH_RE.replace_all(&templated, "/");
    let trimmed = collapsed.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parameter names appearing in a normalized URI template, in order.
pub(crate) fn template_params(path: &str) -> Vec<String> {
    TEMPLATE_PARAM_RE
        .captures_iter(path)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Expand a mount path with optional parameters (`/:id?`) into its concrete
/// variants, so `/:id?` mounts both `/` and `/:id`. Each optional segment
/// splits the variant set in two, absent before present, keeping the segment
/// at its original position: `/a/:b?/c` mounts `/a/c` and `/a/:b/c`.
pub(crate) fn expand_optional_segments(path: &str) -> Vec<String> {
    if !path.contains('?') {
        return vec![path.to_string()];
    }

    let mut variants: Vec<Vec<&str>> = vec![Vec::new()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_suffix('?') {
            Some(stripped) => {
                let mut with_segment = variants.clone();
                for variant in &mut with_segment {
                    variant.push(stripped);
                }
                variants.extend(with_segment);
            }
            None => {
                for variant in &mut variants {
                    variant.push(segment);
                }
            }
        }
    }

    variants
        .into_iter()
        .map(|segments| {
            if segments.is_empty() {
                "/".to_string()
            } else {
                format!("/{}", segments.join("/"))
            }
        })
        .collect()
}

fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = true;
    for ch in input.chars() {
        if ch == '_' || ch == '-' || ch == ' ' || ch == '.' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn camel_case(input: &str) -> String {
    let pascal = pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => pascal,
    }
}

/// Derives unique `operationId`s for one compilation pass.
///
/// The pattern substitutes `%c` (class name) and `%m` (method key) and the
/// result is camel-cased, so the default `%c.%m` turns `Controller.method`
/// into `controllerMethod`. When the same method mounts several paths the
/// second and later ids get a `By<Param>` suffix from the last path
/// parameter, or a numeric suffix when the path has none.
pub(crate) struct OperationIdFormatter {
    pattern: String,
    used: HashSet<String>,
}

impl OperationIdFormatter {
    pub fn new(pattern: Option<&str>) -> Self {
        OperationIdFormatter {
            pattern: pattern.unwrap_or("%c.%m").to_string(),
            used: HashSet::new(),
        }
    }

    pub fn format(&mut self, class_name: &str, method_key: &str, path: &str) -> String {
        let raw = self
            .pattern
            .replace("%c", class_name)
            .replace("%m", method_key);
        let base = camel_case(&raw);

        let mut candidate = base.clone();
        if self.used.contains(&candidate) {
            candidate = match template_params(path).last() {
                Some(param) => format!("{}By{}", base, pascal_case(param)),
                None => candidate,
            };
        }
        let mut n = 1;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", base, n);
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path_normalizes_express_params() {
        assert_eq!(build_path(&["/", "/rest", "/:id"]), "/rest/{id}");
        assert_eq!(build_path(&["/", ""]), "/");
        assert_eq!(build_path(&["/base/", "/"]), "/base");
    }

    #[test]
    fn test_template_params_in_order() {
        assert_eq!(
            template_params("/users/{userId}/posts/{postId}"),
            vec!["userId".to_string(), "postId".to_string()]
        );
        assert!(template_params("/users").is_empty());
    }

    #[test]
    fn test_optional_segment_expands_shortest_first() {
        assert_eq!(
            expand_optional_segments("/:id?"),
            vec!["/".to_string(), "/:id".to_string()]
        );
        assert_eq!(expand_optional_segments("/fixed"), vec!["/fixed".to_string()]);
    }

    #[test]
    fn test_optional_segment_keeps_its_position() {
        assert_eq!(
            expand_optional_segments("/a/:b?/c"),
            vec!["/a/c".to_string(), "/a/:b/c".to_string()]
        );
    }

    #[test]
    fn test_operation_ids_dedupe_by_last_param() {
        let mut ids = OperationIdFormatter::new(None);
        assert_eq!(ids.format("Controller", "method", "/"), "controllerMethod");
        assert_eq!(
            ids.format("Controller", "method", "/{id}"),
            "controllerMethodById"
        );
    }
}
