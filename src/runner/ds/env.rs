//! The live environment instances are activated into.
//!
//! Instances live in an arena indexed by [`InstanceId`]. Three lookup tables
//! map names to arena slots:
//!
//! ```text
//! namespaces:  sanitized instance name -> InstanceId
//! containers:  container name          -> (InstanceId, container slot)
//! functions:   function name           -> (InstanceId, method slot)
//! ```
//!
//! Admission checks every name an instance brings against all three tables
//! before anything is inserted, so an instance is either fully live or absent.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use crate::runner::ds::error::{CallError, ConstructionError};
use crate::runner::ds::instance::{Container, Instance, InstanceId};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::BehaviorRegistry;
use crate::runner::plugin::types::CallContext;

/// What to do when an instance is constructed again under the same name and class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructPolicy {
    /// Replace the live instance with a freshly activated one.
    Reseat,
    /// Fail with `NameCollision`.
    Reject,
}

impl Default for ReconstructPolicy {
    fn default() -> Self {
        ReconstructPolicy::Reseat
    }
}

/// How an instance was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Activated(InstanceId),
    Reseated(InstanceId),
}

impl Admission {
    pub fn id(&self) -> InstanceId {
        match self {
            Admission::Activated(id) | Admission::Reseated(id) => *id,
        }
    }
}

pub struct Environment {
    instances: Vec<Instance>,
    namespaces: HashMap<String, InstanceId>,
    containers: HashMap<String, (InstanceId, usize)>,
    functions: HashMap<String, (InstanceId, usize)>,
    behaviors: BehaviorRegistry,
    policy: ReconstructPolicy,
}

impl Environment {
    /// Environment with the core behaviors and the default reseat policy.
    pub fn new() -> Self {
        Self::with_behaviors(BehaviorRegistry::with_core())
    }

    pub fn with_behaviors(behaviors: BehaviorRegistry) -> Self {
        Environment {
            instances: Vec::new(),
            namespaces: HashMap::new(),
            containers: HashMap::new(),
            functions: HashMap::new(),
            behaviors,
            policy: ReconstructPolicy::default(),
        }
    }

    pub fn set_policy(&mut self, policy: ReconstructPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> ReconstructPolicy {
        self.policy
    }

    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    pub fn behaviors_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.behaviors
    }

    /// Make an instance live. The instance's `id` and `activation` are assigned here.
    pub fn admit(&mut self, mut instance: Instance) -> Result<Admission, ConstructionError> {
        let reseat = self.check_admission(&instance)?;
        instance.activation = Uuid::new_v4();

        match reseat {
            Some(id) => {
                self.unbind(id);
                instance.id = id;
                self.bind(&instance);
                info!(
                    class = %instance.class_name,
                    instance = %instance.name,
                    namespace = %instance.sanitized,
                    activation = %instance.activation.to_hyphenated(),
                    "instance reseated"
                );
                self.instances[id.0] = instance;
                Ok(Admission::Reseated(id))
            }
            None => {
                let id = InstanceId(self.instances.len());
                instance.id = id;
                self.bind(&instance);
                info!(
                    class = %instance.class_name,
                    instance = %instance.name,
                    namespace = %instance.sanitized,
                    activation = %instance.activation.to_hyphenated(),
                    "instance activated"
                );
                self.instances.push(instance);
                Ok(Admission::Activated(id))
            }
        }
    }

    /// Returns the instance to reseat, if any. Never mutates.
    fn check_admission(&self, instance: &Instance) -> Result<Option<InstanceId>, ConstructionError> {
        let reseat = match self.namespaces.get(&instance.sanitized) {
            None => None,
            Some(&id) => {
                let live = &self.instances[id.0];
                if live.name != instance.name || live.class_name != instance.class_name {
                    return Err(collision(instance, &instance.sanitized, live));
                }
                match self.policy {
                    ReconstructPolicy::Reseat => Some(id),
                    ReconstructPolicy::Reject => {
                        return Err(collision(instance, &instance.sanitized, live))
                    }
                }
            }
        };

        for name in instance.container_names() {
            if let Some(&(owner, _)) = self.containers.get(name) {
                if Some(owner) != reseat {
                    return Err(collision(instance, name, &self.instances[owner.0]));
                }
            }
        }
        for name in instance.function_names() {
            if let Some(&(owner, _)) = self.functions.get(name) {
                if Some(owner) != reseat {
                    return Err(collision(instance, name, &self.instances[owner.0]));
                }
            }
        }
        Ok(reseat)
    }

    fn bind(&mut self, instance: &Instance) {
        self.namespaces
            .insert(instance.sanitized.clone(), instance.id);
        for (slot, container) in instance.containers.iter().enumerate() {
            self.containers
                .insert(container.name.clone(), (instance.id, slot));
        }
        for (slot, method) in instance.methods.iter().enumerate() {
            self.functions
                .insert(method.name.clone(), (instance.id, slot));
        }
    }

    fn unbind(&mut self, id: InstanceId) {
        let old = &self.instances[id.0];
        self.namespaces.remove(&old.sanitized);
        for name in old.container_names() {
            self.containers.remove(name);
        }
        for name in old.function_names() {
            self.functions.remove(name);
        }
    }

    /// Call a function by its full name, e.g. `left_panel.list.reset`.
    pub fn call(&mut self, function: &str, args: Vec<Value>) -> Result<Value, CallError> {
        let (id, slot) = *self
            .functions
            .get(function)
            .ok_or_else(|| CallError::ReferenceError(format!("'{}' is not defined", function)))?;
        let instance = &mut self.instances[id.0];
        let method = instance.methods[slot].clone();
        let behavior = self.behaviors.get(&method.behavior).ok_or_else(|| {
            CallError::ReferenceError(format!(
                "behavior '{}' of '{}' is not registered",
                method.behavior, function
            ))
        })?;
        debug!(function, behavior = %method.behavior, "calling");
        let mut ctx = CallContext::new(instance, &method.bound);
        behavior.call(&mut ctx, args)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id.0)
    }

    /// Look up a live instance by its sanitized namespace.
    pub fn instance_by_namespace(&self, sanitized: &str) -> Option<&Instance> {
        self.namespaces
            .get(sanitized)
            .and_then(|id| self.instances.get(id.0))
    }

    /// Look up a live instance by the name it was constructed with.
    pub fn instance_by_name(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        let (id, slot) = *self.containers.get(name)?;
        self.instances.get(id.0)?.containers.get(slot)
    }

    pub fn container_mut(&mut self, name: &str) -> Option<&mut Container> {
        let (id, slot) = *self.containers.get(name)?;
        self.instances.get_mut(id.0)?.containers.get_mut(slot)
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Every live container name, sorted.
    pub fn container_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.containers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Every live function name, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn collision(instance: &Instance, namespace: &str, owner: &Instance) -> ConstructionError {
    ConstructionError::NameCollision {
        instance: instance.name.clone(),
        namespace: namespace.to_string(),
        owner: owner.name.clone(),
    }
}
