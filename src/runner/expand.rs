//! Text stages of construction: placeholder substitution, then sanitizing.
//!
//! ```text
//! class filelist for __FILELIST__ {            class filelist for left_panel.list {
//!     array __FILELIST___files          ==>        array left_panel_list_files
//!     fn __FILELIST__.reset = ...                  fn left_panel.list.reset = ...
//! }                                            }
//! ```
//!
//! Substitution writes the instance name verbatim everywhere the class
//! placeholder occurs. Sanitizing then rewrites only the declared field
//! patterns `<instance>_<field>` to `<sanitized>_<field>`; every other use of
//! the instance name (function paths, comments, strings) stays verbatim.

use crate::runner::ds::schema::ClassSchema;

/// Character every illegal identifier character is mapped to.
pub const SANITIZE_REPLACEMENT: char = '_';

/// Replace every occurrence of `placeholder` with `instance`, literally.
///
/// Matches are found left to right without overlap, and inserted text is
/// never rescanned, so an instance name containing the placeholder (or any
/// other special-looking text) is inserted as-is.
pub fn substitute_placeholder(template: &str, placeholder: &str, instance: &str) -> String {
    if placeholder.is_empty() {
        return template.to_string();
    }
    template.replace(placeholder, instance)
}

/// Map an instance name to a legal identifier prefix.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, and a leading digit
/// gets a `_` in front of it.
pub fn sanitize_name(instance: &str) -> String {
    let mut sanitized: String = instance
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                SANITIZE_REPLACEMENT
            }
        })
        .collect();
    if sanitized
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit())
    {
        sanitized.insert(0, SANITIZE_REPLACEMENT);
    }
    sanitized
}

/// Rewrite `<instance>_<field>` to `<sanitized>_<field>` for the class's fields.
///
/// Only the schema's own fields are touched. The text is scanned once, left to
/// right; at each position the longest matching field pattern wins and the
/// rewritten output is never scanned again, so a sanitized name that contains
/// the raw name (`2nd` becomes `_2nd`) cannot be rewritten twice.
pub fn namespace_fields(text: &str, schema: &ClassSchema, instance: &str, sanitized: &str) -> String {
    if instance == sanitized {
        return text.to_string();
    }
    let patterns: Vec<(String, String)> = schema
        .fields_most_specific_first()
        .into_iter()
        .map(|field| (field.container_name(instance), field.container_name(sanitized)))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match patterns.iter().find(|(raw, _)| rest.starts_with(raw.as_str())) {
            Some((raw, namespaced)) => {
                out.push_str(namespaced);
                rest = &rest[raw.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Instance-specific source text, with the name it was expanded for.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedTemplate {
    pub instance: String,
    pub sanitized: String,
    pub source: String,
}

/// Run both text stages.
pub fn expand(template: &str, schema: &ClassSchema, instance: &str) -> ExpandedTemplate {
    let substituted = substitute_placeholder(template, &schema.placeholder, instance);
    let sanitized = sanitize_name(instance);
    let source = namespace_fields(&substituted, schema, instance, &sanitized);
    ExpandedTemplate {
        instance: instance.to_string(),
        sanitized,
        source,
    }
}
