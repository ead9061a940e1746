//! # hackfm-classes - class templates for a terminal file manager
//!
//! Turns a named class template into a live, uniquely namespaced instance:
//! - `pest` grammar for the template language
//! - literal placeholder substitution and identifier sanitizing
//! - schema-checked activation into an arena-backed environment
//! - pluggable behaviors bound to instance functions
//!
//! ## Quick Start
//!
//! ### Parsing a template
//!
//! ```
//! use hackfm_classes::parser::TemplateParser;
//!
//! let source = "class menu for file_menu { array file_menu_menu_names }";
//! let ast = TemplateParser::parse_to_ast_from_str(source).unwrap();
//! println!("{} declares {} fields", ast.instance, ast.fields.len());
//! ```
//!
//! ### Constructing instances
//!
//! ```
//! use hackfm_classes::runner::Engine;
//! use hackfm_classes::runner::store::MemoryTemplateStore;
//! use hackfm_classes::runner::ds::value::Value;
//!
//! let store = MemoryTemplateStore::new().with_template(
//!     "msgbroker",
//!     "class msgbroker for __MSGBROKER__ {
//!          assoc __MSGBROKER___subscribers
//!          fn __MSGBROKER__.subscribe = state.set(__MSGBROKER___subscribers)
//!      }",
//! );
//! let mut engine = Engine::new(store);
//! engine.construct("msgbroker", "app.bus").unwrap();
//!
//! // Containers are namespaced by the sanitized name, functions by the raw one.
//! assert!(engine.env().has_container("app_bus_subscribers"));
//! engine
//!     .call("app.bus.subscribe", vec![Value::from("redraw"), Value::from("left_panel")])
//!     .unwrap();
//! ```
//!
//! ## Construction
//!
//! Every call to [`runner::Engine::construct`] walks the same stages:
//!
//! 1. **Load**: the class template is read from a [`runner::store::TemplateStore`],
//!    normally `<template_root>/<class>.class`.
//!
//! 2. **Substitute**: every occurrence of the class placeholder (e.g.
//!    `__FILELIST__`) is replaced by the instance name, verbatim.
//!
//! 3. **Sanitize**: container names `<instance>_<field>` for the class's own
//!    fields are rewritten to `<sanitized>_<field>`, so `left_panel.list`
//!    owns `left_panel_list_files`.
//!
//! 4. **Activate**: the text is parsed, checked against the class schema and
//!    admitted into the [`runner::ds::env::Environment`] in one step. A failure
//!    at any stage leaves the environment exactly as it was.
//!
//! ## Configuration
//!
//! ```
//! use hackfm_classes::runner::Engine;
//! use hackfm_classes::runner::plugin::EngineConfig;
//!
//! let config = EngineConfig::parse(
//!     r#"
//!     template_root = "templates"
//!     on_reconstruct = "reject"
//!
//!     [[class]]
//!     name = "tabbar"
//!     fields = [ { name = "tabs", kind = "array" } ]
//!     "#,
//! )
//! .unwrap();
//! let engine = Engine::from_config(&config).unwrap();
//! assert!(engine.catalog().has_class("tabbar"));
//! ```

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
