//! Top-level commands and the declaration layer.
//!
//! ```text
//! command := "#check" term
//!          | ("infixl" | "infixr" | "infix") number string ident
//!          | ("prefix" | "postfix") number string ident
//!          | "notation" (":" number)? ident ":=" item+
//!          | "section" ident? | "end" ident?
//! item    := string | ident (":" number)?
//! ```
//!
//! Parsing a declaration does not change the grammar. [`apply`] does, and
//! [`Session::parse_commands`](crate::Session::parse_commands) calls it (or
//! whatever the caller passes) after each command, so a declared notation
//! applies from the next command on.
//!
//! In a `notation`, string items are tokens and identifiers are holes parsed
//! as terms at the given precedence (0 by default). A notation whose first
//! item is a hole is a trailing production: the hole is the left operand.

use mixfix_core::Prec;

use super::add;
use super::term::{TERM, term};
use crate::diagnostics::DiagnosticKind;
use crate::parser::builder::NodeBuilder;
use crate::parser::combinators::{Parser, any_of, category, ident, lhs, many1, number, optional, string};
use crate::parser::cst::SyntaxNode;
use crate::registry::{Assoc, GrammarRegistry, Production, infix, postfix, prefix};

pub const COMMAND: &str = "command";

pub fn command() -> Parser {
    category(COMMAND, Prec::ZERO)
}

/// `: number`
fn prec_spec() -> Parser {
    NodeBuilder::new("prec")
        .token(":")
        .field("level", number())
        .build()
}

fn check() -> Parser {
    NodeBuilder::new("check")
        .token("#check")
        .field("term", term(Prec::ZERO))
        .build()
}

fn operator(keyword: &str) -> Parser {
    NodeBuilder::new(keyword)
        .token(keyword)
        .field("prec", number())
        .field("token", string())
        .field("kind", ident())
        .build()
}

fn notation() -> Parser {
    let hole = NodeBuilder::new("hole")
        .field("name", ident())
        .field("prec", optional(prec_spec()))
        .build();
    NodeBuilder::new("notation")
        .token("notation")
        .field("prec", optional(prec_spec()))
        .field("kind", ident())
        .token(":=")
        .field("items", many1(any_of(vec![string(), hole])))
        .build()
}

fn scope(keyword: &str) -> Parser {
    NodeBuilder::new(keyword)
        .token(keyword)
        .field("name", optional(ident()))
        .build()
}

/// Add the command grammar to `registry`. Commands embed terms, so the
/// term grammar should be registered too.
pub fn register(registry: &mut GrammarRegistry) {
    registry.declare_category(COMMAND);
    add(registry, Production::leading(COMMAND, check()));
    for keyword in ["infixl", "infixr", "infix", "prefix", "postfix"] {
        add(registry, Production::leading(COMMAND, operator(keyword)));
    }
    add(registry, Production::leading(COMMAND, notation()));
    add(registry, Production::leading(COMMAND, scope("section")));
    add(registry, Production::leading(COMMAND, scope("end")));
}

/// The declaration layer: apply the effect of a parsed command to the registry.
///
/// Commands with parse errors are ignored. Declarations that cannot be
/// turned into a production are reported as `RejectedRegistration` warnings.
pub fn apply(command: &SyntaxNode, registry: &mut GrammarRegistry) {
    if command.has_missing() {
        return;
    }
    let Some(kind) = command.kind() else {
        return;
    };
    let result = match kind.as_str() {
        "infixl" | "infixr" | "infix" | "prefix" | "postfix" => operator_production(command),
        "notation" => notation_production(command),
        "section" => {
            registry.push_scope();
            return;
        }
        "end" => {
            if !registry.pop_scope() {
                registry.warn(DiagnosticKind::RejectedRegistration, "`end` without `section`");
            }
            return;
        }
        _ => return,
    };

    match result.map(|production| registry.register(production)) {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => registry.warn(DiagnosticKind::RejectedRegistration, err.to_string()),
        Err(message) => registry.warn(DiagnosticKind::RejectedRegistration, message),
    }
}

fn text_of<'a>(node: &'a SyntaxNode, field: &str) -> Option<&'a str> {
    node.field(field)?.token().map(|t| &*t.text)
}

fn parse_prec(text: &str) -> Result<Prec, String> {
    text.parse::<u32>()
        .map(Prec::from)
        .map_err(|_| format!("`{text}` is not a precedence level"))
}

/// `"+"` to `+`; surrounding spaces are only for readability.
fn token_text(literal: &str) -> Result<String, String> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal)
        .trim();
    if inner.is_empty() || inner.chars().any(char::is_whitespace) {
        return Err(format!("{literal} is not a valid token"));
    }
    Ok(inner.to_string())
}

/// Level of an optional `: number` group; `None` when absent.
fn optional_prec(group: Option<&SyntaxNode>) -> Result<Option<Prec>, String> {
    let Some(level_node) = group.and_then(|g| g.children().next()) else {
        return Ok(None);
    };
    match text_of(level_node, "level") {
        Some(level) => parse_prec(level).map(Some),
        None => Ok(None),
    }
}

fn operator_production(command: &SyntaxNode) -> Result<Production, String> {
    let missing = || "incomplete operator declaration".to_string();
    let keyword = command.kind().ok_or_else(missing)?.as_str();
    let prec = parse_prec(text_of(command, "prec").ok_or_else(missing)?)?;
    let token = token_text(text_of(command, "token").ok_or_else(missing)?)?;
    let kind = text_of(command, "kind").ok_or_else(missing)?;

    Ok(match keyword {
        "infixl" => infix(TERM, &token, prec, Assoc::Left, kind),
        "infixr" => infix(TERM, &token, prec, Assoc::Right, kind),
        "infix" => infix(TERM, &token, prec, Assoc::None, kind),
        "prefix" => prefix(TERM, &token, prec, kind),
        _ => postfix(TERM, &token, prec, kind),
    })
}

fn notation_production(command: &SyntaxNode) -> Result<Production, String> {
    let prec = optional_prec(command.field("prec"))?.unwrap_or(Prec::MAX);
    let kind = text_of(command, "kind").ok_or("notation without a name")?;
    let items: Vec<&SyntaxNode> = command
        .field("items")
        .map(|group| group.children().collect())
        .unwrap_or_default();

    let mut builder = NodeBuilder::new(kind);
    let mut lhs_prec = None;
    for (i, item) in items.iter().enumerate() {
        if let Some(token) = item.token() {
            builder = builder.token(&token_text(&token.text)?);
            continue;
        }
        let name = text_of(item, "name").ok_or("hole without a name")?;
        let hole_prec = optional_prec(item.field("prec"))?.unwrap_or(Prec::ZERO);
        if i == 0 {
            builder = builder.field(name, lhs());
            lhs_prec = Some(hole_prec);
        } else {
            builder = builder.field(name, term(hole_prec));
        }
    }

    let parser = builder.build();
    Ok(match lhs_prec {
        Some(lhs_prec) => Production::trailing(TERM, parser)
            .precedence(prec)
            .lhs_precedence(lhs_prec),
        None => Production::leading(TERM, parser).precedence(prec),
    })
}
