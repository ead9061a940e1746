//! Core types for the behavior plugin layer.

use crate::runner::ds::error::CallError;
use crate::runner::ds::instance::{BoundArg, Container, Instance};
use crate::runner::ds::value::Value;

/// What a behavior sees when it is called: the owning instance and the
/// arguments fixed by the template at activation time.
pub struct CallContext<'a> {
    pub instance: &'a mut Instance,
    pub bound: &'a [BoundArg],
}

impl<'a> CallContext<'a> {
    pub fn new(instance: &'a mut Instance, bound: &'a [BoundArg]) -> Self {
        CallContext { instance, bound }
    }

    /// Container bound at `position`.
    pub fn bound_container(&mut self, position: usize) -> Result<&mut Container, CallError> {
        match self.bound.get(position) {
            Some(BoundArg::Container(slot)) => {
                let slot = *slot;
                self.instance.containers.get_mut(slot).ok_or_else(|| {
                    CallError::ReferenceError(format!("container slot {} is not live", slot))
                })
            }
            Some(BoundArg::Literal(v)) => Err(CallError::TypeError(format!(
                "bound argument {} is {}, expected a container",
                position,
                v.type_name()
            ))),
            None => Err(CallError::ReferenceError(format!(
                "no container bound at position {}",
                position
            ))),
        }
    }

    /// Slots of every bound container, in binding order.
    pub fn bound_container_slots(&self) -> Vec<usize> {
        self.bound
            .iter()
            .filter_map(|b| match b {
                BoundArg::Container(slot) => Some(*slot),
                BoundArg::Literal(_) => None,
            })
            .collect()
    }

    /// Literal values bound after the containers.
    pub fn bound_literals(&self) -> Vec<Value> {
        self.bound
            .iter()
            .filter_map(|b| match b {
                BoundArg::Literal(v) => Some(v.clone()),
                BoundArg::Container(_) => None,
            })
            .collect()
    }
}

/// Function signature for compiled-in behaviors.
pub type NativeFn = fn(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError>;

/// A behavior - either compiled-in or supplied by the host application.
pub enum Behavior {
    /// Direct function pointer.
    Native(NativeFn),

    /// Host-provided closure.
    Plugin(Box<dyn Fn(&mut CallContext<'_>, Vec<Value>) -> Result<Value, CallError> + Send + Sync>),
}

impl Behavior {
    pub fn call(&self, ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError> {
        match self {
            Behavior::Native(f) => f(ctx, args),
            Behavior::Plugin(f) => f(ctx, args),
        }
    }
}

/// Plugin metadata.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    /// Behavior names this plugin provides.
    pub provides: Vec<String>,
}

impl PluginInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PluginInfo {
            name: name.into(),
            version: version.into(),
            provides: Vec::new(),
        }
    }

    pub fn with_provides(mut self, provides: Vec<String>) -> Self {
        self.provides = provides;
        self
    }
}
