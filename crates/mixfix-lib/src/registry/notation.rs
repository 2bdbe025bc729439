//! Operator shorthands.
//!
//! Operators are ordinary productions. These helpers only choose operand
//! precedences the usual way:
//!
//! | notation | left operand | right operand |
//! |---|---|---|
//! | `infixl p` | `p` | `p + 1` |
//! | `infixr p` | `p + 1` | `p` |
//! | `infix p` | `p + 1` | `p + 1` |
//! | `prefix p` | | `p` |
//! | `postfix p` | `p` | |
//!
//! So `a + b + c` with `+` at `infixl 65` nests to the left, and
//! `a -> b -> c` with `->` at `infixr 25` nests to the right.

use mixfix_core::Prec;

use super::Production;
use crate::parser::builder::NodeBuilder;
use crate::parser::combinators::{category, lhs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    /// Chaining at the same level is not allowed: `a == b == c` stops after `a == b`.
    None,
}

/// Binary operator `lhs token rhs` building a `kind` node with fields `lhs`/`rhs`.
pub fn infix(cat: &str, token: &str, prec: Prec, assoc: Assoc, kind: &str) -> Production {
    let (left, right) = match assoc {
        Assoc::Left => (prec, prec.succ()),
        Assoc::Right => (prec.succ(), prec),
        Assoc::None => (prec.succ(), prec.succ()),
    };
    let parser = NodeBuilder::new(kind)
        .field("lhs", lhs())
        .token(token)
        .field("rhs", category(cat, right))
        .build();
    Production::trailing(cat, parser)
        .precedence(prec)
        .lhs_precedence(left)
}

pub fn infixl(cat: &str, token: &str, prec: Prec, kind: &str) -> Production {
    infix(cat, token, prec, Assoc::Left, kind)
}

pub fn infixr(cat: &str, token: &str, prec: Prec, kind: &str) -> Production {
    infix(cat, token, prec, Assoc::Right, kind)
}

/// `token operand`, the operand parsed at `prec`.
pub fn prefix(cat: &str, token: &str, prec: Prec, kind: &str) -> Production {
    let parser = NodeBuilder::new(kind)
        .token(token)
        .field("arg", category(cat, prec))
        .build();
    Production::leading(cat, parser).precedence(prec)
}

/// `operand token`, for operands of precedence at least `prec`.
pub fn postfix(cat: &str, token: &str, prec: Prec, kind: &str) -> Production {
    let parser = NodeBuilder::new(kind)
        .field("arg", lhs())
        .token(token)
        .build();
    Production::trailing(cat, parser)
        .precedence(prec)
        .lhs_precedence(prec)
}
