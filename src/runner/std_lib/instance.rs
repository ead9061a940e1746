//! `instance.*` behaviors: operations on the whole instance.

use crate::runner::ds::error::CallError;
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::BehaviorRegistry;
use crate::runner::plugin::types::CallContext;

pub fn register(registry: &mut BehaviorRegistry) {
    registry.register_native("instance.reset", instance_reset);
    registry.register_native("instance.name", instance_name);
    registry.register_native("instance.class", instance_class);
}

/// Restore every container to its template default. Returns the container count.
fn instance_reset(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    ctx.instance.reset();
    Ok(Value::Integer(ctx.instance.containers.len() as i64))
}

fn instance_name(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    Ok(Value::String(ctx.instance.name.clone()))
}

fn instance_class(ctx: &mut CallContext, _args: Vec<Value>) -> Result<Value, CallError> {
    Ok(Value::String(ctx.instance.class_name.clone()))
}
