//! Primitive parser combinators.
//!
//! A [`Parser`] is a parse function plus what is statically known about it:
//! how it can start ([`FirstTokens`]) and which tokens it needs declared.
//! Combinators compose both halves at once.
//!
//! # Commit policy
//!
//! Once a parser has consumed a token, its failure is final: `optional`,
//! `many`, `sep_by` and `any_of` only recover from failures that left the
//! cursor where it was. [`attempt`] opts back into backtracking and
//! [`longest_match`] always explores every alternative.

use std::fmt;
use std::rc::Rc;

use mixfix_core::Prec;

use super::cst::SyntaxNode;
use super::error::{Failure, PResult, merge_into};
use super::hints::{FirstTokens, Hint};
use super::lexer::TokenKind;
use super::pratt;
use super::resolver;
use super::state::ParseState;

pub type ParseFn = dyn Fn(&mut ParseState<'_, '_>) -> PResult;

/// A composable parser.
#[derive(Clone)]
pub struct Parser {
    run: Rc<ParseFn>,
    first: FirstTokens,
    tokens: Rc<[Rc<str>]>,
    label: Rc<str>,
}

impl Parser {
    pub fn new(
        label: &str,
        first: FirstTokens,
        tokens: Vec<Rc<str>>,
        run: impl Fn(&mut ParseState<'_, '_>) -> PResult + 'static,
    ) -> Self {
        Self {
            run: Rc::new(run),
            first,
            tokens: tokens.into(),
            label: Rc::from(label),
        }
    }

    pub fn parse(&self, state: &mut ParseState<'_, '_>) -> PResult {
        (self.run)(state)
    }

    /// How this parser can start.
    pub fn first(&self) -> &FirstTokens {
        &self.first
    }

    /// Tokens that must be declared for this parser to see them.
    pub fn tokens(&self) -> &[Rc<str>] {
        &self.tokens
    }

    /// Name used in traces and expectations.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Rc::from(label);
        self
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("label", &self.label)
            .field("first", &self.first)
            .finish()
    }
}

/// Declared tokens of several parsers, deduplicated, in order.
pub(crate) fn collect_tokens<'a>(parsers: impl IntoIterator<Item = &'a Parser>) -> Vec<Rc<str>> {
    let mut out: Vec<Rc<str>> = Vec::new();
    for parser in parsers {
        for token in parser.tokens.iter() {
            if !out.contains(token) {
                out.push(token.clone());
            }
        }
    }
    out
}

/// Match a declared token (keyword or punctuation) by text.
pub fn symbol(text: &str) -> Parser {
    let text: Rc<str> = Rc::from(text);
    let expected = format!("'{text}'");
    let label = expected.clone();
    Parser::new(
        &label,
        FirstTokens::single(Hint::Token(text.clone())),
        vec![text.clone()],
        move |state| {
            let token = state.peek();
            if matches!(token.kind, TokenKind::Symbol | TokenKind::Ident) && token.text == text {
                return Ok(SyntaxNode::Atom(state.advance()));
            }
            Err(state.fail(expected.clone()))
        },
    )
}

fn token_class(kind: TokenKind, hint: Hint, expected: &'static str) -> Parser {
    Parser::new(expected, FirstTokens::single(hint), Vec::new(), move |state| {
        if state.peek().kind == kind {
            return Ok(SyntaxNode::Atom(state.advance()));
        }
        Err(state.fail(expected))
    })
}

pub fn ident() -> Parser {
    token_class(TokenKind::Ident, Hint::Ident, "identifier")
}

pub fn number() -> Parser {
    token_class(TokenKind::Number, Hint::Number, "number")
}

pub fn string() -> Parser {
    token_class(TokenKind::Str, Hint::Str, "string literal")
}

/// A term of a registry category, at minimum precedence `prec`.
///
/// Resolved by name when it runs, so categories may refer to each other and
/// to themselves.
pub fn category(name: &str, prec: Prec) -> Parser {
    let owned: Rc<str> = Rc::from(name);
    Parser::new(name, FirstTokens::Unknown, Vec::new(), move |state| {
        pratt::parse_expr(state, &owned, prec)
    })
}

/// The left operand of a trailing production. Consumes nothing.
pub fn lhs() -> Parser {
    Parser::new("lhs", FirstTokens::Epsilon, Vec::new(), |state| {
        match state.lhs() {
            Some((node, _)) => Ok(node.clone()),
            None => Err(state.fail_with_message("no left operand here")),
        }
    })
}

/// `p` or nothing. Absent is an empty `null` group.
pub fn optional(p: Parser) -> Parser {
    let tokens = p.tokens.to_vec();
    let label = format!("{}?", p.label);
    Parser::new(&label, p.first.clone().to_optional(), tokens, move |state| {
        let start = state.pos();
        match p.parse(state) {
            Ok(node) => Ok(SyntaxNode::group(vec![node])),
            Err(failure) if state.pos() == start && !state.has_fatal_error() => {
                state.note_soft_failure(failure);
                Ok(SyntaxNode::empty())
            }
            Err(mut failure) => {
                let partial = SyntaxNode::group(vec![failure.take_partial_or_missing()]);
                Err(failure.with_partial(partial))
            }
        }
    })
}

pub fn many(p: Parser) -> Parser {
    repeat(p, false)
}

pub fn many1(p: Parser) -> Parser {
    repeat(p, true)
}

fn repeat(p: Parser, at_least_one: bool) -> Parser {
    let tokens = p.tokens.to_vec();
    let first = if at_least_one {
        p.first.clone()
    } else {
        p.first.clone().to_optional()
    };
    let label = format!("{}{}", p.label, if at_least_one { "+" } else { "*" });
    Parser::new(&label, first, tokens, move |state| {
        let mut items = Vec::new();
        loop {
            let start = state.pos();
            match p.parse(state) {
                Ok(node) => {
                    let progressed = state.pos() != start;
                    items.push(node);
                    if !progressed {
                        break;
                    }
                }
                Err(failure)
                    if state.pos() == start
                        && !state.has_fatal_error()
                        && (!at_least_one || !items.is_empty()) =>
                {
                    state.note_soft_failure(failure);
                    break;
                }
                Err(mut failure) => {
                    if !items.is_empty() || state.pos() != start {
                        items.push(failure.take_partial_or_missing());
                        return Err(failure.with_partial(SyntaxNode::group(items)));
                    }
                    return Err(failure);
                }
            }
        }
        Ok(SyntaxNode::group(items))
    })
}

/// `p (sep p)*`, possibly empty.
pub fn sep_by(p: Parser, sep: Parser) -> Parser {
    separated(p, sep, false, false)
}

/// `p (sep p)*`, at least one `p`.
pub fn sep_by1(p: Parser, sep: Parser) -> Parser {
    separated(p, sep, true, false)
}

/// Like [`sep_by`], accepting a trailing separator.
pub fn sep_by_trailing(p: Parser, sep: Parser) -> Parser {
    separated(p, sep, false, true)
}

/// Like [`sep_by1`], accepting a trailing separator.
pub fn sep_by1_trailing(p: Parser, sep: Parser) -> Parser {
    separated(p, sep, true, true)
}

fn separated(p: Parser, sep: Parser, at_least_one: bool, allow_trailing: bool) -> Parser {
    let tokens = collect_tokens([&p, &sep]);
    let first = if at_least_one {
        p.first.clone()
    } else {
        p.first.clone().to_optional()
    };
    let label = format!("{},*", p.label);
    Parser::new(&label, first, tokens, move |state| {
        let mut items = Vec::new();

        let start = state.pos();
        match p.parse(state) {
            Ok(node) => items.push(node),
            Err(failure) if !at_least_one && state.pos() == start && !state.has_fatal_error() => {
                state.note_soft_failure(failure);
                return Ok(SyntaxNode::empty());
            }
            Err(mut failure) => {
                if state.pos() == start {
                    return Err(failure);
                }
                let partial = SyntaxNode::group(vec![failure.take_partial_or_missing()]);
                return Err(failure.with_partial(partial));
            }
        }

        loop {
            let start = state.pos();
            match sep.parse(state) {
                Ok(node) => items.push(node),
                Err(failure) if state.pos() == start && !state.has_fatal_error() => {
                    state.note_soft_failure(failure);
                    break;
                }
                Err(mut failure) => {
                    items.push(failure.take_partial_or_missing());
                    return Err(failure.with_partial(SyntaxNode::group(items)));
                }
            }

            let start = state.pos();
            match p.parse(state) {
                Ok(node) => items.push(node),
                Err(failure)
                    if allow_trailing && state.pos() == start && !state.has_fatal_error() =>
                {
                    state.note_soft_failure(failure);
                    break;
                }
                Err(mut failure) => {
                    items.push(failure.take_partial_or_missing());
                    return Err(failure.with_partial(SyntaxNode::group(items)));
                }
            }
        }
        Ok(SyntaxNode::group(items))
    })
}

/// Backtrack on any failure, even after consuming input.
pub fn attempt(p: Parser) -> Parser {
    let tokens = p.tokens.to_vec();
    let label = p.label.to_string();
    Parser::new(&label, p.first.clone(), tokens, move |state| {
        let cp = state.checkpoint();
        p.parse(state).map_err(|mut failure| {
            if !state.has_fatal_error() {
                state.restore(cp);
                failure.partial = None;
            }
            failure
        })
    })
}

/// Ordered choice: the first alternative that succeeds wins.
///
/// An alternative that fails after consuming input ends the choice.
pub fn any_of(alternatives: Vec<Parser>) -> Parser {
    let tokens = collect_tokens(&alternatives);
    let first = merge_first(&alternatives);
    let label = join_labels(&alternatives);
    Parser::new(&label, first, tokens, move |state| {
        let start = state.pos();
        let mut best: Option<Failure> = None;
        for alternative in &alternatives {
            match alternative.parse(state) {
                Ok(node) => return Ok(node),
                Err(failure) if state.pos() == start && !state.has_fatal_error() => {
                    state.reset_debug_fuel();
                    merge_into(&mut best, failure);
                }
                Err(failure) => return Err(failure),
            }
        }
        Err(best.unwrap_or_else(|| state.fail("nothing")))
    })
}

/// Try every alternative from the same position; the longest success wins.
///
/// Ties go to the alternative listed first.
pub fn longest_match(alternatives: Vec<Parser>) -> Parser {
    let tokens = collect_tokens(&alternatives);
    let first = merge_first(&alternatives);
    let label = join_labels(&alternatives);
    Parser::new(&label, first, tokens, move |state| {
        let refs: Vec<&Parser> = alternatives.iter().collect();
        resolver::longest_match(state, &refs).map(|(node, _)| node)
    })
}

/// Succeeds if `p` would, without consuming anything.
pub fn lookahead(p: Parser) -> Parser {
    let tokens = p.tokens.to_vec();
    let label = format!("&{}", p.label);
    Parser::new(&label, FirstTokens::Epsilon, tokens, move |state| {
        let cp = state.checkpoint();
        let result = p.parse(state);
        if !state.has_fatal_error() {
            state.restore(cp);
        }
        result.map(|_| SyntaxNode::empty()).map_err(|mut failure| {
            failure.partial = None;
            failure
        })
    })
}

/// Succeeds, consuming nothing, if `p` would fail here.
pub fn not_followed_by(p: Parser, what: &str) -> Parser {
    let tokens = p.tokens.to_vec();
    let label = format!("!{}", p.label);
    let what = what.to_string();
    Parser::new(&label, FirstTokens::Epsilon, tokens, move |state| {
        let cp = state.checkpoint();
        let result = p.parse(state);
        if state.has_fatal_error() {
            return result;
        }
        state.restore(cp);
        match result {
            Ok(_) => Err(state.fail_with_message(format!("unexpected {what}"))),
            Err(_) => Ok(SyntaxNode::empty()),
        }
    })
}

/// Succeeds if the next token directly follows the previous one.
pub fn no_ws_before() -> Parser {
    Parser::new("no space", FirstTokens::Epsilon, Vec::new(), |state| {
        if state.peek().leading_trivia.is_empty() {
            Ok(SyntaxNode::empty())
        } else {
            Err(state.fail_with_message("no space before this token"))
        }
    })
}

pub(crate) fn merge_first(parsers: &[Parser]) -> FirstTokens {
    parsers
        .iter()
        .map(|p| p.first.clone())
        .reduce(FirstTokens::merge)
        .unwrap_or(FirstTokens::Unknown)
}

fn join_labels(parsers: &[Parser]) -> String {
    parsers
        .iter()
        .map(Parser::label)
        .collect::<Vec<_>>()
        .join(" | ")
}
