//! Longest-match resolution.
//!
//! Every alternative runs from the same checkpoint, ignoring the commit
//! policy. The success that consumed the most tokens wins; on equal length
//! the earlier alternative wins. When everything fails, the failure that got
//! furthest is kept and failures at the same position merge their
//! expectations.
//!
//! Diagnostics reported while running an alternative belong to it: they are
//! dropped when the alternative loses and re-appended when it wins.

use super::combinators::Parser;
use super::cst::SyntaxNode;
use super::error::{Failure, merge_into};
use super::stream::StreamPos;
use super::state::ParseState;
use crate::diagnostics::DiagnosticMessage;

struct Winner {
    node: SyntaxNode,
    index: usize,
    end: StreamPos,
    diagnostics: Vec<DiagnosticMessage>,
}

/// Run the alternatives and return the winning node with its index.
pub(crate) fn longest_match(
    state: &mut ParseState<'_, '_>,
    alternatives: &[&Parser],
) -> Result<(SyntaxNode, usize), Failure> {
    let start = state.checkpoint();

    // Fast path: no speculation needed.
    if let [only] = alternatives {
        return only.parse(state).map(|node| (node, 0));
    }

    let mut winner: Option<Winner> = None;
    let mut failure = None;
    // Where the cursor stood after the furthest failing alternative.
    let mut failed_end = start.pos;

    for (index, alternative) in alternatives.iter().enumerate() {
        state.restore(start);
        match alternative.parse(state) {
            Ok(node) => {
                let end = state.pos();
                let diagnostics = state.diagnostics.split_off(start.diagnostics_len);
                if winner.as_ref().is_none_or(|w| end > w.end) {
                    winner = Some(Winner {
                        node,
                        index,
                        end,
                        diagnostics,
                    });
                } else {
                    state.tracer().trace_backtrack(alternative.label());
                }
            }
            Err(err) => {
                if state.has_fatal_error() {
                    return Err(err);
                }
                failed_end = failed_end.max(state.pos());
                state.tracer().trace_backtrack(alternative.label());
                merge_into(&mut failure, err);
            }
        }
    }

    state.restore(start);
    if let Some(winner) = winner {
        state.stream.restore(winner.end);
        state.diagnostics.append(winner.diagnostics);
        let consumed = state.consumed_since(start.pos);
        state
            .tracer()
            .trace_winner(alternatives[winner.index].label(), consumed);
        return Ok((winner.node, winner.index));
    }

    // Keep the commit visible to callers: a branch that consumed input
    // leaves the cursor where it stopped.
    state.stream.restore(failed_end);
    match failure {
        Some(failure) => Err(failure),
        None => Err(state.fail("nothing")),
    }
}
