//! Embedded template bundles and the placeholder renderer.
//!
//! Each handler owns a compiled-in, read-only set of `(name, text)` pairs.
//! Templates are plain text with `{{ field.path }}` placeholders resolved
//! against the manifest serialized to a JSON value tree, so the manifest
//! shape is the substitution root: `{{ scbake_version }}`,
//! `{{ projects.0.name }}`, and so on.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// A read-only set of embedded templates owned by one handler.
pub struct TemplateBundle {
    entries: &'static [(&'static str, &'static str)],
}

impl TemplateBundle {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<&'static str> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, text)| *text)
            .ok_or_else(|| Error::TemplateMissing(name.to_string()))
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("placeholder pattern")
    })
}

/// Render `text` against the manifest, substituting every placeholder.
/// An unresolvable placeholder fails the render, naming the template.
pub fn render(template_id: &str, text: &str, manifest: &Manifest) -> Result<String> {
    let root = serde_json::to_value(manifest).map_err(|err| {
        Error::Io(std::io::Error::other(format!(
            "serialize manifest for rendering: {err}"
        )))
    })?;

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for captures in placeholder_pattern().captures_iter(text) {
        let whole = captures.get(0).expect("match");
        let path = &captures[1];
        let value = lookup(&root, path).ok_or_else(|| Error::TemplateRender {
            template: template_id.to_string(),
            placeholder: path.to_string(),
        })?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&scalar_text(&value));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Walk a dotted path into the value tree. Numeric segments index arrays.
fn lookup(root: &Value, path: &str) -> Option<Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, Project};

    fn manifest_with_project() -> Manifest {
        let mut m = Manifest::empty();
        m.projects.push(Project {
            name: "api".into(),
            path: ".".into(),
            language: "go".into(),
            templates: Vec::new(),
        });
        m
    }

    #[test]
    fn substitutes_top_level_and_nested_fields() {
        let m = manifest_with_project();
        let rendered = render(
            "t",
            "# {{ projects.0.name }} ({{ projects.0.language }}) v{{scbake_version}}",
            &m,
        )
        .unwrap();
        assert_eq!(
            rendered,
            format!("# api (go) v{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let m = Manifest::empty();
        let err = render("ci.yml", "{{ projects.0.name }}", &m).unwrap_err();
        match err {
            Error::TemplateRender { template, placeholder } => {
                assert_eq!(template, "ci.yml");
                assert_eq!(placeholder, "projects.0.name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        let m = Manifest::empty();
        let text = "plain text, no substitution {single brace}";
        assert_eq!(render("t", text, &m).unwrap(), text);
    }

    #[test]
    fn bundle_lookup_reports_missing_names() {
        static BUNDLE: TemplateBundle = TemplateBundle::new(&[("a.tpl", "A")]);
        assert_eq!(BUNDLE.get("a.tpl").unwrap(), "A");
        assert!(matches!(
            BUNDLE.get("b.tpl"),
            Err(Error::TemplateMissing(name)) if name == "b.tpl"
        ));
    }
}
