//! Builtin grammars, written against the public engine API.
//!
//! - [`term`]: a small term language (binders, arrows, arithmetic,
//!   application) in category `term`
//! - [`command`]: top-level commands in category `command`, including
//!   `notation`/`infixl`/... declarations and the layer that turns them into
//!   registry productions

pub mod command;
pub mod term;

#[cfg(test)]
mod command_tests;
#[cfg(test)]
mod term_tests;

use crate::registry::{DescriptorId, GrammarRegistry, Production};

/// Register a builtin production. Builtins are never rejected.
fn add(registry: &mut GrammarRegistry, production: Production) -> DescriptorId {
    registry
        .register(production)
        .expect("builtin productions always make progress")
}

/// Term and command grammars together, ready for [`Session::parse_commands`](crate::Session::parse_commands).
pub fn standard() -> GrammarRegistry {
    let mut registry = term::registry();
    command::register(&mut registry);
    registry
}
