//! Engine configuration file parsing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::parser::ast::FieldKind;
use crate::runner::ds::env::ReconstructPolicy;
use crate::runner::ds::error::ConfigError;
use crate::runner::ds::schema::{ClassSchema, FieldSpec};

/// Environment variable naming the template root.
pub const TEMPLATE_ROOT_ENV: &str = "HACKFM_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKindConfig {
    Scalar,
    Array,
    Assoc,
}

impl From<FieldKindConfig> for FieldKind {
    fn from(kind: FieldKindConfig) -> Self {
        match kind {
            FieldKindConfig::Scalar => FieldKind::Scalar,
            FieldKindConfig::Array => FieldKind::Array,
            FieldKindConfig::Assoc => FieldKind::Assoc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKindConfig,
}

/// A class schema declared in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    /// Defaults to `__NAME__`.
    pub placeholder: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ClassConfig {
    pub fn to_schema(&self) -> Result<ClassSchema, ConfigError> {
        let placeholder = self
            .placeholder
            .clone()
            .unwrap_or_else(|| ClassSchema::conventional_placeholder(&self.name));
        let schema = ClassSchema::new(self.name.clone(), placeholder).with_fields(
            self.fields
                .iter()
                .map(|f| FieldSpec::new(f.name.clone(), f.kind.into()))
                .collect(),
        );
        schema.validate().map_err(|reason| ConfigError::InvalidClass {
            class: self.name.clone(),
            reason,
        })?;
        Ok(schema)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructConfig {
    Reseat,
    Reject,
}

impl From<ReconstructConfig> for ReconstructPolicy {
    fn from(c: ReconstructConfig) -> Self {
        match c {
            ReconstructConfig::Reseat => ReconstructPolicy::Reseat,
            ReconstructConfig::Reject => ReconstructPolicy::Reject,
        }
    }
}

/// Complete engine configuration.
///
/// Expected format:
/// ```toml
/// template_root = "/usr/share/hackfm"
/// cache_templates = true
/// on_reconstruct = "reject"
///
/// [[class]]
/// name = "tabbar"
/// fields = [ { name = "tabs", kind = "array" } ]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory holding `<class>.class` templates.
    #[serde(default = "default_template_root")]
    pub template_root: PathBuf,
    #[serde(default)]
    pub cache_templates: bool,
    #[serde(default = "default_reconstruct")]
    pub on_reconstruct: ReconstructConfig,
    /// Classes registered in addition to the built-in ones.
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassConfig>,
}

fn default_template_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_reconstruct() -> ReconstructConfig {
    ReconstructConfig::Reseat
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig {
            template_root: default_template_root(),
            cache_templates: false,
            on_reconstruct: default_reconstruct(),
            classes: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        for class in &config.classes {
            class.to_schema()?;
        }
        Ok(config)
    }

    /// Let `HACKFM_DIR` override the template root.
    pub fn apply_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(TEMPLATE_ROOT_ENV) {
            if !dir.is_empty() {
                self.template_root = PathBuf::from(dir);
            }
        }
        self
    }

    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template_root = root.into();
        self
    }

    pub fn reconstruct_policy(&self) -> ReconstructPolicy {
        self.on_reconstruct.into()
    }

    pub fn class_schemas(&self) -> Result<Vec<ClassSchema>, ConfigError> {
        self.classes.iter().map(ClassConfig::to_schema).collect()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
