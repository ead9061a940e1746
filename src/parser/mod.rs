mod api;
pub mod ast;

pub use api::{describe_error, parse_to_pairs, parse_to_token_tree, Rule, TemplateParser};
