use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::parser::ast::{FieldKind, InitializerType, LiteralType};

/// A value held by a state container or passed to a behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// The empty state of a container of the given kind.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar => Value::String(String::new()),
            FieldKind::Array => Value::List(Vec::new()),
            FieldKind::Assoc => Value::Map(BTreeMap::new()),
        }
    }

    /// Build a container default from a template initializer.
    pub fn from_initializer(init: &InitializerType) -> Self {
        match init {
            InitializerType::Literal(l) => Value::from(l),
            InitializerType::List(items) => Value::List(items.iter().map(Value::from).collect()),
            InitializerType::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect(),
            ),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Can a scalar container hold this?
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Is this the empty value for its shape?
    pub fn is_empty(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::Integer(_) | Value::Boolean(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&LiteralType> for Value {
    fn from(l: &LiteralType) -> Self {
        match l {
            LiteralType::String(s) => Value::String(s.to_string()),
            LiteralType::Integer(i) => Value::Integer(*i),
            LiteralType::Boolean(b) => Value::Boolean(*b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (idx, (k, v)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}
