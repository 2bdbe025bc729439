//! mixfix: a Pratt parsing engine whose grammar is extended at run time.
//!
//! Productions are declared with the [`NodeBuilder`] and registered in a
//! [`GrammarRegistry`] under the tokens that can start them. A [`Session`]
//! owns the registry and drives the precedence-climbing parser over it.
//!
//! # Example
//!
//! ```
//! use mixfix_lib::{Prec, Session, grammars::term};
//!
//! let session = Session::new(term::registry());
//! let (parse, diagnostics) = session.parse("fun x, f x + 1", "term", Prec::ZERO).unwrap();
//! assert!(diagnostics.is_empty());
//! assert_eq!(parse.root().kind().map(|k| k.as_str()), Some("lambda"));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod diagnostics;
pub mod grammars;
pub mod parser;
pub mod registry;
pub mod session;

#[cfg(test)]
mod test_utils;

/// Result type for passes that produce both output and diagnostics.
///
/// Recoverable problems are collected as diagnostics next to the output.
/// Fatal errors (lexical errors, fuel exhaustion) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use config::ParseConfig;
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use mixfix_core::{Prec, Symbol};
pub use parser::builder::NodeBuilder;
pub use parser::combinators::Parser;
pub use parser::cst::{NodeKind, SyntaxNode};
pub use parser::lexer::{LexError, LexErrorKind, Token, TokenKind};
pub use parser::trace::{NoopTracer, PrintTracer, Tracer};
pub use registry::{GrammarRegistry, ParserDescriptor, Production, Role, TiePolicy};
pub use session::{Module, Parse, Session};

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed token (unterminated string or comment).
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Execution fuel exhausted (too many token steps, including backtracking).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// A production refers to a category that was never declared.
    #[error("unknown syntax category `{0}`")]
    UnknownCategory(String),
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, Error>;
