//! A small term language.
//!
//! ```text
//! term := ident | number | string
//!       | "(" term (":" term)? ")"
//!       | ("fun" | "λ") binder+ "," term
//!       | "have" ident? ":" term ":=" term ";" term
//!       | "show" term "from" term
//!       | "-" term                              prefix 75
//!       | term "->" term                        infixr 25
//!       | term "=" term                         infix 50
//!       | term "+" term | term "-" term         infixl 65
//!       | term "*" term                         infixl 70
//!       | term term+                            application (fallback)
//! binder := ident+ (":" term)? | "(" ident+ (":" term)? ")"
//! ```

use mixfix_core::Prec;

use super::add;
use crate::parser::builder::{NodeBuilder, node_choice};
use crate::parser::combinators::{Parser, any_of, category, ident, lhs, many1, number, optional, string, symbol};
use crate::registry::{Assoc, GrammarRegistry, Production, infix, infixl, infixr, prefix};

pub const TERM: &str = "term";

pub fn term(prec: Prec) -> Parser {
    category(TERM, prec)
}

/// `: term`
pub fn type_spec() -> Parser {
    NodeBuilder::new("type_spec")
        .token(":")
        .field("type", term(Prec::ZERO))
        .build()
}

/// `x y : T` or `(x y : T)`; the type is optional in both.
pub fn binder() -> Parser {
    let simple = NodeBuilder::new("simple_binder")
        .field("names", many1(ident()))
        .field("type", optional(type_spec()));
    let bracketed = NodeBuilder::new("bracketed_binder")
        .token("(")
        .field("names", many1(ident()))
        .field("type", optional(type_spec()))
        .token(")");
    node_choice("binder", vec![simple, bracketed])
}

fn lambda() -> Parser {
    NodeBuilder::new("lambda")
        .parser(any_of(vec![symbol("fun"), symbol("λ")]))
        .field("binders", many1(binder()))
        .token(",")
        .field("body", term(Prec::ZERO))
        .build()
}

/// `(e)` and `(e : T)`.
fn paren() -> Parser {
    NodeBuilder::new("paren")
        .token("(")
        .field("term", term(Prec::ZERO))
        .field("type", optional(type_spec()))
        .token(")")
        .build()
}

fn have() -> Parser {
    NodeBuilder::new("have")
        .token("have")
        .field("name", optional(ident()))
        .field("type", type_spec())
        .token(":=")
        .field("value", term(Prec::ZERO))
        .token(";")
        .field("body", term(Prec::ZERO))
        .build()
}

fn show() -> Parser {
    NodeBuilder::new("show")
        .token("show")
        .field("type", term(Prec::ZERO))
        .token("from")
        .field("value", term(Prec::ZERO))
        .build()
}

/// `f a b`: the function must be atomic, arguments are parsed at `ARG`.
fn app() -> Production {
    let parser = NodeBuilder::new("app")
        .field("fn", lhs())
        .field("args", many1(term(Prec::ARG)))
        .build();
    Production::trailing(TERM, parser)
        .precedence(Prec::LEAD)
        .lhs_precedence(Prec::MAX)
}

/// Add the term grammar to `registry`.
pub fn register(registry: &mut GrammarRegistry) {
    registry.declare_category(TERM);

    add(registry, Production::leading(TERM, ident().with_label("ident")));
    add(registry, Production::leading(TERM, number().with_label("num")));
    add(registry, Production::leading(TERM, string().with_label("str")));
    add(registry, Production::leading(TERM, paren()));
    add(registry, Production::leading(TERM, lambda()).precedence(Prec::LEAD));
    add(registry, Production::leading(TERM, have()).precedence(Prec::LEAD));
    add(registry, Production::leading(TERM, show()).precedence(Prec::LEAD));
    add(registry, prefix(TERM, "-", Prec::new(75), "neg"));

    add(registry, infixr(TERM, "->", Prec::new(25), "arrow"));
    add(registry, infix(TERM, "=", Prec::new(50), Assoc::None, "eq"));
    add(registry, infixl(TERM, "+", Prec::new(65), "plus"));
    add(registry, infixl(TERM, "-", Prec::new(65), "minus"));
    add(registry, infixl(TERM, "*", Prec::new(70), "times"));

    registry
        .set_fallback_trailing(app())
        .expect("application consumes its arguments");
}

/// A registry holding just the term grammar.
pub fn registry() -> GrammarRegistry {
    let mut registry = GrammarRegistry::new();
    register(&mut registry);
    registry
}
