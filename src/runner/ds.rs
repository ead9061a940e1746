pub mod env;
pub mod error;
pub mod instance;
pub mod schema;
pub mod stage;
pub mod value;
