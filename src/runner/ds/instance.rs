use std::fmt;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::parser::ast::FieldKind;
use crate::runner::ds::value::Value;

/// Arena index of a live instance. Stable across reseats of the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A namespaced state container owned by one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Full bindable name, e.g. `left_panel_list_files`.
    pub name: String,
    /// Schema field suffix, e.g. `files`.
    pub field: String,
    pub kind: FieldKind,
    pub value: Value,
    /// Template-declared initial state, restored by `reset`.
    pub default: Value,
}

impl Container {
    pub fn new(name: String, field: String, kind: FieldKind, default: Value) -> Self {
        Container {
            name,
            field,
            kind,
            value: default.clone(),
            default,
        }
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn clear(&mut self) {
        self.value = Value::empty(self.kind);
    }
}

/// An argument fixed at activation time.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundArg {
    /// Slot of a container in the owning instance.
    Container(usize),
    Literal(Value),
}

/// A callable behavior bound to one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Full callable name, e.g. `left_panel.list.reset`.
    pub name: String,
    pub behavior: String,
    pub bound: Vec<BoundArg>,
}

/// A live instance: its state record plus the behaviors bound to it.
#[derive(Debug, Clone)]
pub struct Instance {
    pub id: InstanceId,
    /// Changes every time the instance is (re)activated.
    pub activation: Uuid,
    pub class_name: String,
    /// Caller-supplied name, verbatim.
    pub name: String,
    /// Namespace prefix of every container.
    pub sanitized: String,
    pub containers: Vec<Container>,
    pub methods: Vec<Method>,
}

impl Instance {
    pub fn container(&self, field: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.field == field)
    }

    pub fn container_mut(&mut self, field: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.field == field)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.name.as_str())
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }

    /// Restore every container to its template-declared default.
    pub fn reset(&mut self) {
        for container in self.containers.iter_mut() {
            container.reset();
        }
    }
}
