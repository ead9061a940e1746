//! Built-in behaviors and class schemas.
//!
//! Behaviors here only manipulate container shape. What a panel lists, how a
//! menu renders or how messages are delivered belongs to the host application,
//! which binds its own behaviors through the plugin layer.

pub mod classes;
pub mod core;
pub mod instance;
pub mod state;

pub use self::classes::core_classes;
pub use self::core::register_core_behaviors;
