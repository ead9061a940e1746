//! Activation of expanded template source.
//!
//! The source is parsed, checked against the class schema and turned into a
//! complete [`Instance`] before the environment is touched. Admission then
//! makes it live in one step. Any problem with the source surfaces as
//! `BadInstantiation`; nothing partial is left behind.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::parser::ast::{ArgumentType, TemplateData};
use crate::parser::{describe_error, TemplateParser};
use crate::runner::ds::env::{Admission, Environment};
use crate::runner::ds::error::ConstructionError;
use crate::runner::ds::instance::{BoundArg, Container, Instance, InstanceId, Method};
use crate::runner::ds::schema::ClassSchema;
use crate::runner::ds::value::Value;
use crate::runner::expand::ExpandedTemplate;
use crate::runner::plugin::registry::BehaviorRegistry;

/// Parse, validate and admit expanded source into `env`.
pub fn activate(
    env: &mut Environment,
    schema: &ClassSchema,
    expanded: &ExpandedTemplate,
) -> Result<Admission, ConstructionError> {
    let instance = instantiate(env.behaviors(), schema, expanded)?;
    env.admit(instance)
}

/// Build the instance described by expanded source without activating it.
pub fn instantiate(
    behaviors: &BehaviorRegistry,
    schema: &ClassSchema,
    expanded: &ExpandedTemplate,
) -> Result<Instance, ConstructionError> {
    let bad = |reason: String| {
        ConstructionError::bad_instantiation(&schema.name, &expanded.instance, reason)
    };

    let ast = TemplateParser::parse_to_ast_from_str(&expanded.source)
        .map_err(|e| bad(format!("invalid source: {}", describe_error(&e))))?;
    debug!(
        class = %schema.name,
        instance = %expanded.instance,
        fields = ast.fields.len(),
        methods = ast.methods.len(),
        "parsed template"
    );

    check_header(&ast, schema, expanded).map_err(bad)?;
    let containers = build_containers(&ast, schema, expanded).map_err(bad)?;
    let methods = build_methods(&ast, &containers, behaviors, expanded).map_err(bad)?;

    Ok(Instance {
        id: InstanceId(usize::MAX),
        activation: Uuid::nil(),
        class_name: schema.name.clone(),
        name: expanded.instance.clone(),
        sanitized: expanded.sanitized.clone(),
        containers,
        methods,
    })
}

fn check_header(
    ast: &TemplateData,
    schema: &ClassSchema,
    expanded: &ExpandedTemplate,
) -> Result<(), String> {
    if ast.class_name != schema.name {
        return Err(format!(
            "template declares class '{}', expected '{}'",
            ast.class_name, schema.name
        ));
    }
    if ast.instance != expanded.instance {
        return Err(format!(
            "template is bound to '{}', expected '{}'",
            ast.instance, expanded.instance
        ));
    }
    Ok(())
}

/// One container per schema field, in schema order.
fn build_containers(
    ast: &TemplateData,
    schema: &ClassSchema,
    expanded: &ExpandedTemplate,
) -> Result<Vec<Container>, String> {
    let mut declared = HashMap::new();
    for decl in &ast.fields {
        if declared.insert(decl.name.as_str(), decl).is_some() {
            return Err(format!("container '{}' is declared twice", decl.name));
        }
    }

    let mut containers = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let name = field.container_name(&expanded.sanitized);
        let decl = declared
            .remove(name.as_str())
            .ok_or_else(|| format!("field '{}' is not declared as '{}'", field.name, name))?;
        if decl.kind != field.kind {
            return Err(format!(
                "container '{}' is declared {} but the class declares {}",
                name, decl.kind, field.kind
            ));
        }
        let default = match &decl.initializer {
            Some(init) if init.kind() != field.kind => {
                return Err(format!(
                    "container '{}' is {} but is initialized as {}",
                    name,
                    field.kind,
                    init.kind()
                ))
            }
            Some(init) => Value::from_initializer(init),
            None => Value::empty(field.kind),
        };
        containers.push(Container::new(name, field.name.clone(), field.kind, default));
    }

    if let Some(extra) = ast
        .fields
        .iter()
        .find(|d| declared.contains_key(d.name.as_str()))
    {
        return Err(format!(
            "container '{}' is not a field of class '{}'",
            extra.name, schema.name
        ));
    }
    Ok(containers)
}

fn build_methods(
    ast: &TemplateData,
    containers: &[Container],
    behaviors: &BehaviorRegistry,
    expanded: &ExpandedTemplate,
) -> Result<Vec<Method>, String> {
    let prefix = format!("{}.", expanded.instance);
    let mut methods: Vec<Method> = Vec::with_capacity(ast.methods.len());
    for decl in &ast.methods {
        if !decl.path.starts_with(&prefix) || decl.path.len() == prefix.len() {
            return Err(format!(
                "function '{}' is outside the instance namespace '{}'",
                decl.path, prefix
            ));
        }
        if methods.iter().any(|m| m.name == decl.path) {
            return Err(format!("function '{}' is declared twice", decl.path));
        }
        if !behaviors.has_behavior(&decl.behavior) {
            return Err(format!(
                "function '{}' binds unknown behavior '{}'",
                decl.path, decl.behavior
            ));
        }
        let mut bound = Vec::with_capacity(decl.arguments.len());
        for arg in &decl.arguments {
            bound.push(match arg {
                ArgumentType::Literal(l) => BoundArg::Literal(Value::from(l)),
                ArgumentType::Identifier(id) => {
                    let slot = containers
                        .iter()
                        .position(|c| &c.name == id)
                        .ok_or_else(|| {
                            format!("function '{}' refers to unknown container '{}'", decl.path, id)
                        })?;
                    BoundArg::Container(slot)
                }
            });
        }
        methods.push(Method {
            name: decl.path.clone(),
            behavior: decl.behavior.clone(),
            bound,
        });
    }
    Ok(methods)
}
