pub mod activate;
pub mod api;
pub mod ds;
pub mod expand;
pub mod plugin;
pub mod std_lib;
pub mod store;

pub use api::Engine;
