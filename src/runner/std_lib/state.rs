//! `state.*` behaviors: reads and writes on one bound container.
//!
//! The container is the first bound argument. Literals bound after it are
//! passed ahead of the call-site arguments, so a template can partially apply
//! a behavior (`state.set(x_properties, "cursor")`). Reads of missing keys or
//! indices yield an empty string, the same as an unset shell variable.

use crate::parser::ast::FieldKind;
use crate::runner::ds::error::CallError;
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::BehaviorRegistry;
use crate::runner::plugin::types::CallContext;

pub fn register(registry: &mut BehaviorRegistry) {
    registry.register_native("state.get", state_get);
    registry.register_native("state.set", state_set);
    registry.register_native("state.push", state_push);
    registry.register_native("state.remove", state_remove);
    registry.register_native("state.len", state_len);
    registry.register_native("state.keys", state_keys);
    registry.register_native("state.clear", state_clear);
}

fn effective_args(ctx: &CallContext, args: Vec<Value>) -> Vec<Value> {
    let mut all = ctx.bound_literals();
    all.extend(args);
    all
}

fn expect_index(value: &Value) -> Result<usize, CallError> {
    match value {
        Value::Integer(i) if *i >= 0 => Ok(*i as usize),
        Value::Integer(i) => Err(CallError::RangeError(format!("negative index {}", i))),
        Value::String(s) => s
            .parse::<usize>()
            .map_err(|_| CallError::TypeError(format!("'{}' is not an index", s))),
        other => Err(CallError::TypeError(format!(
            "expected an index, got {}",
            other.type_name()
        ))),
    }
}

fn expect_key(value: &Value) -> Result<String, CallError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        other => Err(CallError::TypeError(format!(
            "expected a key, got {}",
            other.type_name()
        ))),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), CallError> {
    if args.len() != expected {
        return Err(CallError::TypeError(format!(
            "{} expects {} argument(s), got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn shape_mismatch(name: &str, kind: FieldKind, value: &Value) -> CallError {
    CallError::TypeError(format!(
        "{} is declared {} but holds {}",
        name,
        kind,
        value.type_name()
    ))
}

/// state.get
fn state_get(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError> {
    let args = effective_args(ctx, args);
    let container = ctx.bound_container(0)?;
    match (container.kind, &container.value) {
        (FieldKind::Array, Value::List(items)) => {
            arity("state.get", &args, 1)?;
            let idx = expect_index(&args[0])?;
            Ok(items.get(idx).cloned().unwrap_or_else(|| Value::from("")))
        }
        (FieldKind::Assoc, Value::Map(entries)) => {
            arity("state.get", &args, 1)?;
            let key = expect_key(&args[0])?;
            Ok(entries.get(&key).cloned().unwrap_or_else(|| Value::from("")))
        }
        (FieldKind::Scalar, scalar) if scalar.is_scalar() => {
            arity("state.get", &args, 0)?;
            Ok(scalar.clone())
        }
        (kind, value) => Err(shape_mismatch(&container.name, kind, value)),
    }
}

/// state.set
///
/// Setting index `len` of an array appends; anything past that is out of range.
/// A scalar container only takes a string, integer or boolean.
fn state_set(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError> {
    let mut args = effective_args(ctx, args);
    let container = ctx.bound_container(0)?;
    let kind = container.kind;
    match (kind, &mut container.value) {
        (FieldKind::Scalar, slot) => {
            arity("state.set", &args, 1)?;
            let value = args.remove(0);
            if !value.is_scalar() {
                return Err(CallError::TypeError(format!(
                    "{} is scalar, cannot hold {}",
                    container.name,
                    value.type_name()
                )));
            }
            *slot = value.clone();
            Ok(value)
        }
        (FieldKind::Array, Value::List(items)) => {
            arity("state.set", &args, 2)?;
            let idx = expect_index(&args[0])?;
            let value = args.remove(1);
            if idx < items.len() {
                items[idx] = value.clone();
            } else if idx == items.len() {
                items.push(value.clone());
            } else {
                return Err(CallError::RangeError(format!(
                    "index {} is past the end of {} ({} items)",
                    idx,
                    container.name,
                    items.len()
                )));
            }
            Ok(value)
        }
        (FieldKind::Assoc, Value::Map(entries)) => {
            arity("state.set", &args, 2)?;
            let key = expect_key(&args[0])?;
            let value = args.remove(1);
            entries.insert(key, value.clone());
            Ok(value)
        }
        (kind, value) => Err(shape_mismatch(&container.name, kind, value)),
    }
}

/// state.push - append every argument to an array. Returns the new length.
fn state_push(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError> {
    let args = effective_args(ctx, args);
    let container = ctx.bound_container(0)?;
    match &mut container.value {
        Value::List(items) => {
            items.extend(args);
            Ok(Value::Integer(items.len() as i64))
        }
        other => Err(CallError::TypeError(format!(
            "state.push needs an array, {} is {}",
            container.name,
            other.type_name()
        ))),
    }
}

/// state.remove - drop one entry and return it.
fn state_remove(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, CallError> {
    let args = effective_args(ctx, args);
    arity("state.remove", &args, 1)?;
    let container = ctx.bound_container(0)?;
    let name = container.name.clone();
    match &mut container.value {
        Value::List(items) => {
            let idx = expect_index(&args[0])?;
            if idx >= items.len() {
                return Err(CallError::RangeError(format!(
                    "index {} is out of range for {}",
                    idx, name
                )));
            }
            Ok(items.remove(idx))
        }
        Value::Map(entries) => {
            let key = expect_key(&args[0])?;
            entries
                .remove(&key)
                .ok_or_else(|| CallError::RangeError(format!("no key '{}' in {}", key, name)))
        }
        other => Err(CallError::TypeError(format!(
            "state.remove needs an array or assoc, {} is {}",
            name,
            other.type_name()
        ))),
    }
}

/// state.len
fn state_len(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    let container = ctx.bound_container(0)?;
    let len = match &container.value {
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::String(s) => s.chars().count(),
        Value::Integer(i) => i.to_string().len(),
        Value::Boolean(b) => b.to_string().len(),
    };
    Ok(Value::Integer(len as i64))
}

/// state.keys - keys of an assoc, indices of an array.
fn state_keys(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    let container = ctx.bound_container(0)?;
    match &container.value {
        Value::List(items) => Ok(Value::List(
            (0..items.len()).map(|i| Value::Integer(i as i64)).collect(),
        )),
        Value::Map(entries) => Ok(Value::List(
            entries.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        other => Err(CallError::TypeError(format!(
            "state.keys needs an array or assoc, {} is {}",
            container.name,
            other.type_name()
        ))),
    }
}

/// state.clear - empty every bound container. Returns how many were cleared.
fn state_clear(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    let slots = ctx.bound_container_slots();
    for slot in &slots {
        if let Some(container) = ctx.instance.containers.get_mut(*slot) {
            container.clear();
        }
    }
    Ok(Value::Integer(slots.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::instance::{BoundArg, Container, Instance, InstanceId};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn instance() -> Instance {
        let mut props = BTreeMap::new();
        props.insert("cursor".to_string(), Value::Integer(0));
        Instance {
            id: InstanceId(0),
            activation: Uuid::new_v4(),
            class_name: "filelist".to_string(),
            name: "p.list".to_string(),
            sanitized: "p_list".to_string(),
            containers: vec![
                Container::new(
                    "p_list_properties".to_string(),
                    "properties".to_string(),
                    FieldKind::Assoc,
                    Value::Map(props),
                ),
                Container::new(
                    "p_list_files".to_string(),
                    "files".to_string(),
                    FieldKind::Array,
                    Value::List(vec![]),
                ),
                Container::new(
                    "p_list_title".to_string(),
                    "title".to_string(),
                    FieldKind::Scalar,
                    Value::from("Files"),
                ),
            ],
            methods: vec![],
        }
    }

    fn call(
        f: fn(&mut CallContext, Vec<Value>) -> Result<Value, CallError>,
        inst: &mut Instance,
        bound: Vec<BoundArg>,
        args: Vec<Value>,
    ) -> Result<Value, CallError> {
        let mut ctx = CallContext::new(inst, &bound);
        f(&mut ctx, args)
    }

    #[test]
    fn test_push_then_get() {
        let mut inst = instance();
        let files = vec![BoundArg::Container(1)];
        let len = call(
            state_push,
            &mut inst,
            files.clone(),
            vec![Value::from("a.txt"), Value::from("b.txt")],
        )
        .unwrap();
        assert_eq!(len, Value::Integer(2));
        let second = call(state_get, &mut inst, files.clone(), vec![Value::Integer(1)]).unwrap();
        assert_eq!(second, Value::from("b.txt"));
        let missing = call(state_get, &mut inst, files, vec![Value::Integer(9)]).unwrap();
        assert_eq!(missing, Value::from(""));
    }

    #[test]
    fn test_partially_applied_set() {
        let mut inst = instance();
        let bound = vec![BoundArg::Container(0), BoundArg::Literal(Value::from("cursor"))];
        call(state_set, &mut inst, bound, vec![Value::Integer(5)]).unwrap();
        let cursor = call(
            state_get,
            &mut inst,
            vec![BoundArg::Container(0)],
            vec![Value::from("cursor")],
        )
        .unwrap();
        assert_eq!(cursor, Value::Integer(5));
    }

    #[test]
    fn test_set_past_end_is_range_error() {
        let mut inst = instance();
        let err = call(
            state_set,
            &mut inst,
            vec![BoundArg::Container(1)],
            vec![Value::Integer(3), Value::from("x")],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::RangeError(_)));
    }

    #[test]
    fn test_push_on_assoc_is_type_error() {
        let mut inst = instance();
        let err = call(state_push, &mut inst, vec![BoundArg::Container(0)], vec![]).unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));
    }

    #[test]
    fn test_scalar_get_and_len() {
        let mut inst = instance();
        let title = call(state_get, &mut inst, vec![BoundArg::Container(2)], vec![]).unwrap();
        assert_eq!(title, Value::from("Files"));
        let len = call(state_len, &mut inst, vec![BoundArg::Container(2)], vec![]).unwrap();
        assert_eq!(len, Value::Integer(5));
    }

    #[test]
    fn test_scalar_rejects_list_and_map() {
        let mut inst = instance();
        let title = vec![BoundArg::Container(2)];
        let err = call(
            state_set,
            &mut inst,
            title.clone(),
            vec![Value::List(vec![Value::from("a")])],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));
        let err = call(state_set, &mut inst, title.clone(), vec![Value::Map(BTreeMap::new())])
            .unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));
        assert_eq!(inst.containers[2].value, Value::from("Files"));

        call(state_set, &mut inst, title.clone(), vec![Value::Integer(3)]).unwrap();
        let got = call(state_get, &mut inst, title, vec![]).unwrap();
        assert_eq!(got, Value::Integer(3));
    }

    #[test]
    fn test_get_follows_declared_kind() {
        let mut inst = instance();
        inst.containers[2].value = Value::List(vec![Value::from("a")]);
        let err = call(state_get, &mut inst, vec![BoundArg::Container(2)], vec![]).unwrap_err();
        match err {
            CallError::TypeError(msg) => assert!(msg.contains("declared scalar"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_set_on_mismatched_shape_is_error() {
        let mut inst = instance();
        inst.containers[1].value = Value::Map(BTreeMap::new());
        let err = call(
            state_set,
            &mut inst,
            vec![BoundArg::Container(1)],
            vec![Value::Integer(0), Value::from("x")],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));

        inst.containers[0].value = Value::List(vec![]);
        let err = call(
            state_set,
            &mut inst,
            vec![BoundArg::Container(0)],
            vec![Value::from("cursor"), Value::Integer(1)],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));
        assert_eq!(inst.containers[0].value, Value::List(vec![]));
    }

    #[test]
    fn test_clear_empties_bound_containers() {
        let mut inst = instance();
        let cleared = call(
            state_clear,
            &mut inst,
            vec![BoundArg::Container(0), BoundArg::Container(2)],
            vec![],
        )
        .unwrap();
        assert_eq!(cleared, Value::Integer(2));
        assert!(inst.containers[0].value.is_empty());
        assert!(inst.containers[2].value.is_empty());
        inst.reset();
        assert_eq!(inst.containers[2].value, Value::from("Files"));
    }

    #[test]
    fn test_remove_missing_key() {
        let mut inst = instance();
        let err = call(
            state_remove,
            &mut inst,
            vec![BoundArg::Container(0)],
            vec![Value::from("nope")],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::RangeError(_)));
    }

    #[test]
    fn test_keys_of_assoc() {
        let mut inst = instance();
        let keys = call(state_keys, &mut inst, vec![BoundArg::Container(0)], vec![]).unwrap();
        assert_eq!(keys, Value::List(vec![Value::from("cursor")]));
    }

    #[test]
    fn test_literal_in_container_position() {
        let mut inst = instance();
        let err = call(
            state_len,
            &mut inst,
            vec![BoundArg::Literal(Value::Integer(1))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, CallError::TypeError(_)));
    }
}
