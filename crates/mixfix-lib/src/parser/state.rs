//! Parse state threaded through every combinator.

use std::cell::Cell;
use std::collections::HashMap;

use mixfix_core::{Prec, Symbol};
use rowan::{TextRange, TextSize};

use super::cst::SyntaxNode;
use super::error::{Failure, PResult, merge_into};
use super::lexer::Token;
use super::stream::{StreamPos, TokenStream};
use super::trace::Tracer;
use crate::Error;
use crate::config::ParseConfig;
use crate::diagnostics::{DiagnosticMessage, Diagnostics};
use crate::registry::GrammarRegistry;

/// Saved position for backtracking: cursor plus diagnostics length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub(crate) pos: StreamPos,
    pub(crate) diagnostics_len: usize,
}

/// A category parsed at some position and minimum precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct MemoKey {
    pub pos: StreamPos,
    pub category: Symbol,
    pub min_prec: Prec,
}

/// What one `parse_expr` call did, replayed on the next call with the same key.
#[derive(Debug, Clone)]
struct Memoized {
    result: PResult,
    end: StreamPos,
    diagnostics: Vec<DiagnosticMessage>,
    soft_failure: Option<Failure>,
}

/// Everything left when a parse finishes.
pub(crate) struct Finished<'src> {
    pub stream: TokenStream<'src>,
    pub diagnostics: Diagnostics,
    pub exec_fuel_remaining: Option<u32>,
    pub fatal_error: Option<Error>,
}

/// Cursor, registry view, diagnostics and limits of one parse.
///
/// The registry is borrowed immutably: grammar changes happen between
/// parses, never during one.
pub struct ParseState<'r, 'src> {
    pub(super) stream: TokenStream<'src>,
    pub(super) registry: &'r GrammarRegistry,
    pub(super) tracer: &'r mut dyn Tracer,
    pub(super) diagnostics: Diagnostics,
    /// Left operands of the trailing productions being tried, with their precedence.
    pub(super) lhs_stack: Vec<(SyntaxNode, Prec)>,
    /// Failures swallowed by `optional`/`many` at some position; merged into
    /// the next failure reported at that position.
    pub(super) soft_failure: Option<Failure>,
    pub(super) depth: u32,
    pub(super) debug_fuel: Cell<u32>,
    memo: HashMap<MemoKey, Memoized>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'r, 'src> ParseState<'r, 'src> {
    pub fn new(
        stream: TokenStream<'src>,
        registry: &'r GrammarRegistry,
        config: &ParseConfig,
        tracer: &'r mut dyn Tracer,
    ) -> Self {
        Self {
            stream,
            registry,
            tracer,
            diagnostics: Diagnostics::new(),
            lhs_stack: Vec::with_capacity(8),
            soft_failure: None,
            depth: 0,
            debug_fuel: Cell::new(256),
            memo: HashMap::new(),
            exec_fuel_remaining: config.exec_fuel(),
            recursion_fuel_limit: config.recursion_fuel(),
            fatal_error: None,
        }
    }

    /// Continue with fuel left over from an earlier parse of the same session.
    pub(crate) fn with_exec_fuel_remaining(mut self, remaining: Option<u32>) -> Self {
        self.exec_fuel_remaining = remaining;
        self
    }

    pub(crate) fn finish(self) -> Finished<'src> {
        let fatal_error = self
            .stream
            .fatal_error()
            .cloned()
            .map(Error::Lex)
            .or(self.fatal_error);
        Finished {
            stream: self.stream,
            diagnostics: self.diagnostics,
            exec_fuel_remaining: self.exec_fuel_remaining,
            fatal_error,
        }
    }

    pub fn registry(&self) -> &'r GrammarRegistry {
        self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub(super) fn tracer(&mut self) -> &mut dyn Tracer {
        &mut *self.tracer
    }

    /// A lexical error, fuel exhaustion or recursion overflow happened.
    /// Nothing should be attempted any more.
    pub fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some() || self.stream.fatal_error().is_some()
    }

    pub(super) fn reset_debug_fuel(&self) {
        self.debug_fuel.set(256);
    }

    pub fn peek(&mut self) -> &Token {
        self.ensure_progress();
        self.stream.peek(self.registry.tokens())
    }

    pub fn peek_nth(&mut self, n: usize) -> &Token {
        self.ensure_progress();
        self.stream.peek_nth(n, self.registry.tokens())
    }

    pub fn at_eof(&mut self) -> bool {
        self.peek().is_eof()
    }

    /// Consume the token under the cursor.
    pub fn advance(&mut self) -> Token {
        self.consume_exec_fuel();
        self.reset_debug_fuel();
        self.stream.advance(self.registry.tokens())
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub fn pos(&self) -> StreamPos {
        self.stream.checkpoint()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.stream.checkpoint(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    /// Rewind the cursor and drop diagnostics reported since `cp`.
    pub fn restore(&mut self, cp: Checkpoint) {
        self.stream.restore(cp.pos);
        self.diagnostics.truncate(cp.diagnostics_len);
        self.reset_debug_fuel();
    }

    /// Tokens consumed between two positions.
    pub fn consumed_since(&self, pos: StreamPos) -> usize {
        self.pos().index().saturating_sub(pos.index())
    }

    pub fn current_range(&mut self) -> TextRange {
        self.stream.current_range(self.registry.tokens())
    }

    /// End of the last consumed token.
    pub fn last_end(&self) -> TextSize {
        self.stream.last_end()
    }

    /// Bump the recursion depth. Fails fatally past the configured limit.
    pub fn enter_recursion(&mut self) -> Result<(), Failure> {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return Err(self.fail("less deeply nested input"));
        }
        self.depth += 1;
        self.reset_debug_fuel();
        Ok(())
    }

    pub fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.reset_debug_fuel();
    }

    /// Record a fatal error raised outside the stream (unknown category).
    pub(crate) fn set_fatal(&mut self, error: Error) {
        if self.fatal_error.is_none() {
            self.fatal_error = Some(error);
        }
    }

    /// Failure at the cursor: "unexpected <current token>; expected <what>".
    ///
    /// Expectations swallowed earlier at the same position are merged in.
    pub fn fail(&mut self, expected: impl Into<String>) -> Failure {
        let pos = self.pos();
        let token = self.peek();
        let failure = Failure::new(pos, token.range, token.describe(), expected);
        self.with_soft_expectations(failure)
    }

    /// Failure at the cursor with a fixed message.
    pub fn fail_with_message(&mut self, message: impl Into<String>) -> Failure {
        let pos = self.pos();
        let token = self.peek();
        Failure::custom(pos, token.range, token.describe(), message)
    }

    fn with_soft_expectations(&mut self, failure: Failure) -> Failure {
        match &self.soft_failure {
            Some(soft) if soft.pos == failure.pos => {
                let mut soft = soft.clone();
                soft.partial = None;
                // The new expectation leads: it is what the production needed.
                failure.merge(soft)
            }
            _ => failure,
        }
    }

    /// Remember a failure that `optional`/`many` recovered from.
    ///
    /// Recovering is grammar progress even though the cursor did not move,
    /// so the lookahead watchdog starts over.
    pub(super) fn note_soft_failure(&mut self, mut failure: Failure) {
        self.reset_debug_fuel();
        failure.partial = None;
        merge_into(&mut self.soft_failure, failure);
    }

    /// Replay an earlier parse of the same category at the same position
    /// and precedence: move the cursor to where it ended and report its
    /// diagnostics again.
    pub(super) fn replay(&mut self, key: &MemoKey) -> Option<PResult> {
        let entry = self.memo.get(key)?.clone();
        self.stream.restore(entry.end);
        self.diagnostics.append(entry.diagnostics);
        if let Some(soft) = entry.soft_failure {
            merge_into(&mut self.soft_failure, soft);
        }
        Some(entry.result)
    }

    /// Record the outcome of a parse that started at `start`. Fatal outcomes
    /// are not recorded; nothing runs after them anyway.
    pub(super) fn memoize(&mut self, key: MemoKey, start: Checkpoint, result: &PResult) {
        if self.has_fatal_error() {
            return;
        }
        let diagnostics = self
            .diagnostics
            .as_slice()
            .get(start.diagnostics_len..)
            .unwrap_or_default()
            .to_vec();
        let soft_failure = self
            .soft_failure
            .as_ref()
            .filter(|soft| soft.pos >= key.pos)
            .cloned();
        let entry = Memoized {
            result: result.clone(),
            end: self.pos(),
            diagnostics,
            soft_failure,
        };
        self.memo.insert(key, entry);
    }

    pub(super) fn push_lhs(&mut self, node: SyntaxNode, prec: Prec) {
        self.lhs_stack.push((node, prec));
    }

    pub(super) fn pop_lhs(&mut self) {
        self.lhs_stack.pop();
    }

    /// The left operand of the trailing production being parsed.
    pub(super) fn lhs(&self) -> Option<&(SyntaxNode, Prec)> {
        self.lhs_stack.last()
    }
}
