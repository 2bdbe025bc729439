//! Precedence climbing over the registry.
//!
//! `parse_expr(category, min_prec)`:
//!
//! 1. Look up the leading productions for the token under the cursor (the
//!    catch-all list when none is indexed), keep those with precedence at
//!    least `min_prec`, and let longest match pick one.
//! 2. Loop: look up trailing productions for the next token, gated by
//!    `min_prec` and by the precedence of the term parsed so far. Only when
//!    nothing is registered for the token is the fallback (application)
//!    tried. The winner reads the current term through `lhs()` and replaces
//!    it. Stop when nothing applies.
//!
//! A trailing production that succeeds without consuming anything is
//! reported and ends the loop.
//!
//! Results are memoized per parse by position, category and minimum
//! precedence. Longest match runs sibling alternatives from one position,
//! and those usually start with the same operand; the memo keeps nested
//! alternatives from re-parsing it once per enclosing alternative.

use mixfix_core::{Prec, Symbol};

use super::cst::SyntaxNode;
use super::error::{Failure, PResult};
use super::invariants::assert_not_behind;
use super::resolver;
use super::state::{MemoKey, ParseState};
use crate::Error;
use crate::diagnostics::DiagnosticKind;
use crate::registry::{ParserDescriptor, Role};

/// Parse a term of `category` whose productions all have precedence ≥ `min_prec`.
pub fn parse_expr(state: &mut ParseState<'_, '_>, category: &str, min_prec: Prec) -> PResult {
    let Some(cat) = state.registry().category(category) else {
        state.set_fatal(Error::UnknownCategory(category.to_string()));
        return Err(state.fail(category));
    };

    let key = MemoKey {
        pos: state.pos(),
        category: cat,
        min_prec,
    };
    if let Some(result) = state.replay(&key) {
        state.tracer().trace_replay(category, min_prec, result.is_ok());
        return result;
    }
    let start = state.checkpoint();

    state.enter_recursion()?;
    let token = state.peek().clone();
    state.tracer().trace_enter(category, min_prec, &token);

    let lhs_depth = state.lhs_stack.len();
    let result = leading(state, cat, category, min_prec)
        .and_then(|(node, prec)| trailing_loop(state, cat, min_prec, node, prec));
    state.assert_lhs_balanced(lhs_depth);

    state.tracer().trace_exit(category, result.is_ok());
    state.exit_recursion();
    state.memoize(key, start, &result);
    result
}

fn leading(
    state: &mut ParseState<'_, '_>,
    cat: Symbol,
    category: &str,
    min_prec: Prec,
) -> Result<(SyntaxNode, Prec), Failure> {
    let registry = state.registry();
    let token = state.peek().clone();
    let found = registry.lookup(cat, Role::Leading, &token);
    if found.is_empty() {
        return Err(state.fail(category));
    }

    trace_candidates(state, Role::Leading, &token, &found);
    let allowed: Vec<&ParserDescriptor> = found
        .into_iter()
        .filter(|d| d.admits(min_prec, None))
        .collect();
    if allowed.is_empty() {
        state.tracer().trace_gated(Role::Leading, &token, min_prec);
        let message = format!("unexpected {} at this precedence level", token.describe());
        let failure = state.fail_with_message(message);
        return Err(failure.with_hint("consider parenthesizing the term"));
    }

    let parsers: Vec<_> = allowed.iter().map(|d| d.parser()).collect();
    let (node, index) = resolver::longest_match(state, &parsers)?;
    Ok((node, allowed[index].precedence()))
}

fn trailing_loop(
    state: &mut ParseState<'_, '_>,
    cat: Symbol,
    min_prec: Prec,
    mut result: SyntaxNode,
    mut result_prec: Prec,
) -> PResult {
    let registry = state.registry();

    loop {
        if state.has_fatal_error() {
            return Ok(result);
        }
        let token = state.peek().clone();
        if token.is_eof() {
            return Ok(result);
        }

        let found = registry.lookup(cat, Role::Trailing, &token);
        let candidates: Vec<&ParserDescriptor> = if found.is_empty() {
            match registry.fallback_trailing(cat) {
                Some(fallback) if fallback.admits(min_prec, Some(result_prec)) => vec![fallback],
                _ => return Ok(result),
            }
        } else {
            trace_candidates(state, Role::Trailing, &token, &found);
            let allowed: Vec<_> = found
                .into_iter()
                .filter(|d| d.admits(min_prec, Some(result_prec)))
                .collect();
            if allowed.is_empty() {
                state.tracer().trace_gated(Role::Trailing, &token, min_prec);
                return Ok(result);
            }
            allowed
        };

        let start = state.checkpoint();
        state.push_lhs(result.clone(), result_prec);
        let parsers: Vec<_> = candidates.iter().map(|d| d.parser()).collect();
        let outcome = resolver::longest_match(state, &parsers);
        state.pop_lhs();

        match outcome {
            Ok((node, index)) => {
                let end = state.pos();
                assert_not_behind(start.pos, end, &node);
                if end == start.pos {
                    let range = state.current_range();
                    state
                        .diagnostics
                        .report(DiagnosticKind::NonProgressingTrailing, range)
                        .message(candidates[index].name())
                        .emit();
                    return Ok(result);
                }
                result = node;
                result_prec = candidates[index].precedence();
            }
            Err(failure) if state.pos() == start.pos && !state.has_fatal_error() => {
                // Nothing consumed: the term simply ends here. Keep the
                // expectation so a later error can mention it.
                state.note_soft_failure(failure);
                return Ok(result);
            }
            Err(failure) => return Err(failure),
        }
    }
}

fn trace_candidates(
    state: &mut ParseState<'_, '_>,
    role: Role,
    token: &super::lexer::Token,
    found: &[&ParserDescriptor],
) {
    let labels: Vec<&str> = found.iter().map(|d| d.name()).collect();
    state.tracer().trace_candidates(role, token, &labels);
}
