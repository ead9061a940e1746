//! Behavior plugin layer.
//!
//! Templates declare behavior but never carry its body. A method declaration
//! such as
//!
//! ```text
//! fn __FILELIST__.mark = state.push(__FILELIST___marked)
//! ```
//!
//! names a behavior (`state.push`) and fixes its leading arguments. The
//! behavior itself is looked up in a [`BehaviorRegistry`] when the template is
//! activated and dispatched through [`Environment::call`](crate::runner::ds::env::Environment::call)
//! afterwards.
//!
//! ### Key Components
//!
//! - **[`Behavior`]**: a native function pointer or a host-supplied closure
//! - **[`BehaviorRegistry`]**: behaviors by name, plus the plugins that supplied them
//! - **[`ClassCatalog`]**: class schemas by name
//! - **[`EngineConfig`]**: TOML configuration for the engine
//!
//! ## Example: Host Behavior
//!
//! ```
//! use hackfm_classes::runner::plugin::registry::BehaviorRegistry;
//! use hackfm_classes::runner::plugin::types::PluginInfo;
//! use hackfm_classes::runner::ds::value::Value;
//!
//! let mut registry = BehaviorRegistry::with_core();
//! registry.load_plugin(PluginInfo::new("panel", "0.1.0"), |r| {
//!     r.register_closure("panel.cursor_down", |ctx, _args| {
//!         let props = ctx.bound_container(0)?;
//!         if let Value::Map(m) = &mut props.value {
//!             let next = m.get("cursor").and_then(|v| v.as_integer()).unwrap_or(0) + 1;
//!             m.insert("cursor".to_string(), Value::Integer(next));
//!             return Ok(Value::Integer(next));
//!         }
//!         Ok(Value::Integer(0))
//!     });
//! });
//! assert!(registry.has_behavior("panel.cursor_down"));
//! ```

pub mod config;
pub mod registry;
pub mod types;

pub use config::EngineConfig;
pub use registry::{BehaviorRegistry, ClassCatalog};
pub use types::{Behavior, CallContext, NativeFn, PluginInfo};
