//! Parsing engine.
//!
//! # Architecture
//!
//! Parsers are values ([`Parser`]) built from combinators and the
//! [`NodeBuilder`](builder::NodeBuilder). Each one knows how it can start
//! (its hints), which is what the [`GrammarRegistry`](crate::GrammarRegistry)
//! indexes productions by. The Pratt driver in [`pratt`] asks the registry
//! for the productions that could start at the current token, lets the
//! longest-match [`resolver`] choose among them, and loops over trailing
//! productions while precedence allows.
//!
//! - Tokens are lexed lazily against the registry's token table, so tokens
//!   declared between commands apply to the rest of the input
//! - Failures are values: a failure that consumed nothing lets the caller try
//!   something else, one that consumed input is final (see [`combinators`])
//! - A failed production still returns its partial tree with `Missing`
//!   placeholders; the session turns the failure into one diagnostic
//!
//! Lexical errors, fuel exhaustion and recursion overflow abort the parse.

pub mod builder;
pub mod combinators;
pub mod cst;
pub mod error;
pub mod hints;
pub mod lexer;
pub mod pratt;
pub mod state;
pub mod stream;
pub mod trace;

mod invariants;
mod resolver;

#[cfg(test)]
mod combinators_tests;
#[cfg(test)]
mod cst_tests;
#[cfg(test)]
mod hints_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod trace_tests;

pub use builder::{NodeBuilder, node_choice};
pub use combinators::Parser;
pub use cst::{NodeKind, SyntaxNode};
pub use error::{Failure, PResult};
pub use hints::{FirstTokens, Hint, HintSet};
pub use state::ParseState;
pub use stream::{StreamPos, TokenStream};
