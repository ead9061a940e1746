//! Core behaviors registration.

use crate::runner::plugin::registry::BehaviorRegistry;

use super::instance;
use super::state;

/// Register all core behaviors with the registry.
pub fn register_core_behaviors(registry: &mut BehaviorRegistry) {
    state::register(registry);
    instance::register(registry);
}
