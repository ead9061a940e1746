//! Construction API.
//!
//! [`Engine::construct`] drives one request through every stage:
//!
//! ```text
//! Requested -> TemplateLoaded -> Substituted -> Sanitized -> Activated
//!      \              \               \             \
//!       +--------------+---------------+-------------+--> Failed
//! ```
//!
//! Only the last transition touches the environment.

use tracing::{debug, warn};

use crate::runner::activate::{activate, instantiate};
use crate::runner::ds::env::{Admission, Environment};
use crate::runner::ds::error::{CallError, ConfigError, ConstructionError};
use crate::runner::ds::instance::InstanceId;
use crate::runner::ds::schema::ClassSchema;
use crate::runner::ds::stage::ConstructionStage;
use crate::runner::ds::value::Value;
use crate::runner::expand::{
    namespace_fields, sanitize_name, substitute_placeholder, ExpandedTemplate,
};
use crate::runner::plugin::config::EngineConfig;
use crate::runner::plugin::registry::{BehaviorRegistry, ClassCatalog};
use crate::runner::store::{CachedTemplateStore, DirTemplateStore, TemplateStore};

pub struct Engine {
    store: Box<dyn TemplateStore>,
    catalog: ClassCatalog,
    env: Environment,
    last_stage: Option<ConstructionStage>,
}

impl Engine {
    /// Engine with the built-in classes and core behaviors.
    pub fn new(store: impl TemplateStore + 'static) -> Self {
        Self::with_parts(Box::new(store), ClassCatalog::with_core(), Environment::new())
    }

    pub fn with_parts(
        store: Box<dyn TemplateStore>,
        catalog: ClassCatalog,
        env: Environment,
    ) -> Self {
        Engine {
            store,
            catalog,
            env,
            last_stage: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let dir = DirTemplateStore::new(config.template_root.clone());
        let store: Box<dyn TemplateStore> = if config.cache_templates {
            Box::new(CachedTemplateStore::new(dir))
        } else {
            Box::new(dir)
        };

        let mut catalog = ClassCatalog::with_core();
        for schema in config.class_schemas()? {
            let name = schema.name.clone();
            catalog
                .register(schema)
                .map_err(|reason| ConfigError::InvalidClass { class: name, reason })?;
        }

        let mut env = Environment::with_behaviors(BehaviorRegistry::with_core());
        env.set_policy(config.reconstruct_policy());
        debug!(
            root = %config.template_root.display(),
            cached = config.cache_templates,
            classes = catalog.class_names().len(),
            "engine configured"
        );
        Ok(Self::with_parts(store, catalog, env))
    }

    /// Make another class constructible. Replaces a class of the same name.
    pub fn register_class(&mut self, schema: ClassSchema) -> Result<(), String> {
        self.catalog.register(schema)
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn into_env(self) -> Environment {
        self.env
    }

    /// Stage the most recent `construct` call ended in.
    pub fn last_stage(&self) -> Option<ConstructionStage> {
        self.last_stage
    }

    /// Create a live instance of `class_name` named `instance_name`.
    ///
    /// On success every container and function of the instance is bound in
    /// the environment. On failure nothing is.
    pub fn construct(
        &mut self,
        class_name: &str,
        instance_name: &str,
    ) -> Result<InstanceId, ConstructionError> {
        let mut stage = ConstructionStage::Requested;
        let result = self.run(class_name, instance_name, &mut stage);
        match &result {
            Ok(_) => stage = ConstructionStage::Activated,
            Err(e) => {
                warn!(
                    class = class_name,
                    instance = instance_name,
                    reached = %stage,
                    error = %e,
                    "construction failed"
                );
                stage = ConstructionStage::Failed;
            }
        }
        self.last_stage = Some(stage);
        result.map(|admission| admission.id())
    }

    fn run(
        &mut self,
        class_name: &str,
        instance_name: &str,
        stage: &mut ConstructionStage,
    ) -> Result<Admission, ConstructionError> {
        let (schema, expanded) =
            prepare(&*self.store, &self.catalog, class_name, instance_name, stage)?;
        activate(&mut self.env, schema, &expanded)
    }

    /// Run every stage except admission. The environment is not touched.
    pub fn dry_run(
        &self,
        class_name: &str,
        instance_name: &str,
    ) -> Result<ExpandedTemplate, ConstructionError> {
        let mut stage = ConstructionStage::Requested;
        let (schema, expanded) = prepare(
            &*self.store,
            &self.catalog,
            class_name,
            instance_name,
            &mut stage,
        )?;
        instantiate(self.env.behaviors(), schema, &expanded)?;
        Ok(expanded)
    }

    /// Call a live function, e.g. `left_panel.list.reset`.
    pub fn call(&mut self, function: &str, args: Vec<Value>) -> Result<Value, CallError> {
        self.env.call(function, args)
    }
}

/// Load, substitute and sanitize: every stage before activation.
fn prepare<'c>(
    store: &dyn TemplateStore,
    catalog: &'c ClassCatalog,
    class_name: &str,
    instance_name: &str,
    stage: &mut ConstructionStage,
) -> Result<(&'c ClassSchema, ExpandedTemplate), ConstructionError> {
    debug!(class = class_name, instance = instance_name, stage = %stage, "construct");
    if instance_name.is_empty() {
        return Err(ConstructionError::bad_instantiation(
            class_name,
            instance_name,
            "instance name is empty",
        ));
    }
    let template = store.load(class_name)?;
    let schema = catalog
        .get(class_name)
        .ok_or_else(|| ConstructionError::UnknownClass(class_name.to_string()))?;
    advance(stage, ConstructionStage::TemplateLoaded, class_name, instance_name);

    let substituted = substitute_placeholder(&template, &schema.placeholder, instance_name);
    advance(stage, ConstructionStage::Substituted, class_name, instance_name);

    let sanitized = sanitize_name(instance_name);
    let expanded = ExpandedTemplate {
        instance: instance_name.to_string(),
        source: namespace_fields(&substituted, schema, instance_name, &sanitized),
        sanitized,
    };
    advance(stage, ConstructionStage::Sanitized, class_name, instance_name);
    Ok((schema, expanded))
}

fn advance(stage: &mut ConstructionStage, next: ConstructionStage, class: &str, instance: &str) {
    *stage = next;
    debug!(class, instance, stage = %next, "stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::store::MemoryTemplateStore;

    const MSGBROKER: &str = "class msgbroker for __MSGBROKER__ {
        assoc __MSGBROKER___subscribers
        fn __MSGBROKER__.subscribe = state.set(__MSGBROKER___subscribers)
    }";

    fn engine() -> Engine {
        Engine::new(MemoryTemplateStore::new().with_template("msgbroker", MSGBROKER))
    }

    #[test]
    fn test_construct_tracks_stage() {
        let mut engine = engine();
        assert_eq!(engine.last_stage(), None);
        engine.construct("msgbroker", "bus").unwrap();
        assert_eq!(engine.last_stage(), Some(ConstructionStage::Activated));
        assert!(engine.construct("msgbroker", "").is_err());
        assert_eq!(engine.last_stage(), Some(ConstructionStage::Failed));
    }

    #[test]
    fn test_unknown_class_without_template() {
        let err = engine().construct("widget", "w").unwrap_err();
        assert!(matches!(err, ConstructionError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_template_without_schema() {
        let mut engine = Engine::new(
            MemoryTemplateStore::new().with_template("widget", "class widget for __WIDGET__ {}"),
        );
        let err = engine.construct("widget", "w").unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownClass(ref c) if c == "widget"));
    }

    #[test]
    fn test_known_class_without_template() {
        let err = engine().construct("menu", "m").unwrap_err();
        assert!(matches!(err, ConstructionError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_dry_run_leaves_env_untouched() {
        let engine = engine();
        let expanded = engine.dry_run("msgbroker", "app.bus").unwrap();
        assert!(expanded.source.contains("assoc app_bus_subscribers"));
        assert!(engine.env().instances().is_empty());
    }

    #[test]
    fn test_dry_run_matches_construct() {
        let mut engine = engine();
        assert!(matches!(
            engine.dry_run("msgbroker", ""),
            Err(ConstructionError::BadInstantiation { .. })
        ));
        assert!(matches!(
            engine.dry_run("widget", "w"),
            Err(ConstructionError::TemplateNotFound { .. })
        ));

        let expanded = engine.dry_run("msgbroker", "2nd.bus").unwrap();
        let id = engine.construct("msgbroker", "2nd.bus").unwrap();
        let instance = engine.env().instance(id).unwrap();
        assert_eq!(expanded.sanitized, instance.sanitized);
        assert!(expanded.source.contains("assoc _2nd_bus_subscribers"));
        assert!(engine.env().has_container("_2nd_bus_subscribers"));
    }

    #[test]
    fn test_call_through_engine() {
        let mut engine = engine();
        engine.construct("msgbroker", "bus").unwrap();
        engine
            .call("bus.subscribe", vec![Value::from("redraw"), Value::from("panel")])
            .unwrap();
        let subs = &engine.env().container("bus_subscribers").unwrap().value;
        assert_eq!(subs.to_string(), r#"{"redraw": "panel"}"#);
    }
}
