//! Registries for behaviors and class schemas.

use std::collections::HashMap;

use tracing::debug;

use super::types::{Behavior, CallContext, NativeFn, PluginInfo};
use crate::runner::ds::error::CallError;
use crate::runner::ds::schema::ClassSchema;
use crate::runner::ds::value::Value;
use crate::runner::std_lib::{core_classes, register_core_behaviors};

/// Registry of behaviors templates may bind to.
pub struct BehaviorRegistry {
    behaviors: HashMap<String, Behavior>,

    /// Loaded plugins.
    plugins: Vec<PluginInfo>,
}

impl BehaviorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BehaviorRegistry {
            behaviors: HashMap::new(),
            plugins: Vec::new(),
        }
    }

    /// Create a registry with the core `state.*` and `instance.*` behaviors.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_behaviors(&mut registry);

        let mut provides: Vec<String> = registry.behaviors.keys().cloned().collect();
        provides.sort();
        registry
            .plugins
            .push(PluginInfo::new("core", env!("CARGO_PKG_VERSION")).with_provides(provides));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, behavior: Behavior) {
        self.behaviors.insert(name.into(), behavior);
    }

    pub fn register_native(&mut self, name: impl Into<String>, func: NativeFn) {
        self.register(name, Behavior::Native(func));
    }

    pub fn register_closure<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&mut CallContext<'_>, Vec<Value>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.register(name, Behavior::Plugin(Box::new(func)));
    }

    /// Register a named set of behaviors supplied by the host.
    pub fn load_plugin<F>(&mut self, info: PluginInfo, install: F)
    where
        F: FnOnce(&mut BehaviorRegistry),
    {
        debug!(plugin = %info.name, version = %info.version, "loading behavior plugin");
        install(self);
        self.plugins.push(info);
    }

    pub fn get(&self, name: &str) -> Option<&Behavior> {
        self.behaviors.get(name)
    }

    pub fn has_behavior(&self, name: &str) -> bool {
        self.behaviors.contains_key(name)
    }

    pub fn behavior_names(&self) -> Vec<&String> {
        self.behaviors.keys().collect()
    }

    pub fn loaded_plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

/// Registry of class schemas, keyed by class name.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    classes: HashMap<String, ClassSchema>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        ClassCatalog {
            classes: HashMap::new(),
        }
    }

    /// Catalog holding the six built-in classes.
    pub fn with_core() -> Self {
        let mut catalog = Self::new();
        for schema in core_classes() {
            catalog.classes.insert(schema.name.clone(), schema.clone());
        }
        catalog
    }

    /// Register (or replace) a class schema after validating it.
    pub fn register(&mut self, schema: ClassSchema) -> Result<(), String> {
        schema.validate()?;
        debug!(class = %schema.name, fields = schema.fields.len(), "registering class");
        self.classes.insert(schema.name.clone(), schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassSchema> {
        self.classes.get(name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.classes.keys().collect();
        names.sort();
        names
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::with_core()
    }
}
