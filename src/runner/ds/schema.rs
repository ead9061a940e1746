//! Declarative class schemas.
//!
//! A schema names a class, the placeholder token its template uses for the
//! instance name, and the closed, ordered list of fields every instance of the
//! class owns. The sanitizer and the activator both work from this list, so a
//! class never touches text or containers outside the fields it declares.

use crate::parser::ast::FieldKind;

/// One state container declared by a class.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Suffix after `<instance>_`, e.g. `files` or `index_name_asc`.
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Array)
    }

    pub fn assoc(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Assoc)
    }

    /// Container name for this field under the given instance prefix.
    pub fn container_name(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSchema {
    pub name: String,
    /// Token replaced by the instance name, e.g. `__FILELIST__`.
    pub placeholder: String,
    pub fields: Vec<FieldSpec>,
}

impl ClassSchema {
    pub fn new(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        ClassSchema {
            name: name.into(),
            placeholder: placeholder.into(),
            fields: Vec::new(),
        }
    }

    /// Placeholder following the `__NAME__` convention.
    pub fn conventional_placeholder(class_name: &str) -> String {
        format!("__{}__", class_name.to_uppercase())
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields ordered longest suffix first, so that no pattern is rewritten
    /// before a longer pattern it is a prefix of.
    pub fn fields_most_specific_first(&self) -> Vec<&FieldSpec> {
        let mut fields: Vec<&FieldSpec> = self.fields.iter().collect();
        fields.sort_by(|a, b| b.name.len().cmp(&a.name.len()));
        fields
    }

    /// Check the schema is usable: non-empty names, a placeholder, unique legal field names.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("class name is empty".to_string());
        }
        if self.placeholder.is_empty() {
            return Err("placeholder is empty".to_string());
        }
        let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty()
                || !field
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(format!("field name '{}' is not an identifier suffix", field.name));
            }
            if seen.contains(&field.name.as_str()) {
                return Err(format!("field '{}' is declared twice", field.name));
            }
            seen.push(&field.name);
        }
        Ok(())
    }
}
