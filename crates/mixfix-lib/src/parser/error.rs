//! Parse failures.
//!
//! A [`Failure`] is a value, not an unwinding: combinators return it and the
//! caller decides whether to try something else (only if nothing was
//! consumed) or give up. When several branches fail, the one that got
//! furthest wins and failures at the same position merge their expectations.

use rowan::TextRange;

use super::cst::SyntaxNode;
use super::stream::StreamPos;

pub type PResult = Result<SyntaxNode, Failure>;

#[derive(Debug, Clone)]
pub struct Failure {
    pub(crate) pos: StreamPos,
    pub(crate) range: TextRange,
    pub(crate) unexpected: String,
    pub(crate) expected: Vec<String>,
    pub(crate) custom: Option<String>,
    pub(crate) hint: Option<String>,
    /// Whatever was built before the failure, with `Missing` at the failure point.
    pub(crate) partial: Option<SyntaxNode>,
}

impl Failure {
    pub(crate) fn new(
        pos: StreamPos,
        range: TextRange,
        unexpected: String,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            pos,
            range,
            unexpected,
            expected: vec![expected.into()],
            custom: None,
            hint: None,
            partial: None,
        }
    }

    /// Failure with a fixed message instead of an expectation list.
    pub(crate) fn custom(
        pos: StreamPos,
        range: TextRange,
        unexpected: String,
        message: impl Into<String>,
    ) -> Self {
        Self {
            pos,
            range,
            unexpected,
            expected: Vec::new(),
            custom: Some(message.into()),
            hint: None,
            partial: None,
        }
    }

    pub fn pos(&self) -> StreamPos {
        self.pos
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn partial(&self) -> Option<&SyntaxNode> {
        self.partial.as_ref()
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub(crate) fn with_partial(mut self, partial: SyntaxNode) -> Self {
        self.partial = Some(partial);
        self
    }

    /// The partial tree, or a `Missing` placeholder at the failure point.
    pub(crate) fn take_partial_or_missing(&mut self) -> SyntaxNode {
        match self.partial.take() {
            Some(partial) => partial,
            None => SyntaxNode::missing(self.range.start(), self.expected_summary()),
        }
    }

    /// Short description of what was expected, for `Missing` placeholders.
    pub fn expected_summary(&self) -> String {
        if self.expected.is_empty() {
            return self.custom.clone().unwrap_or_default();
        }
        join_alternatives(&self.expected)
    }

    /// Human-readable message: `unexpected token ')'; expected term`.
    pub fn message(&self) -> String {
        if let Some(custom) = &self.custom {
            return custom.clone();
        }
        format!(
            "unexpected {}; expected {}",
            self.unexpected,
            join_alternatives(&self.expected)
        )
    }

    /// Keep the failure that got further; at the same position, merge expectations.
    pub(crate) fn merge(self, other: Failure) -> Failure {
        if other.pos > self.pos {
            return other;
        }
        if other.pos < self.pos {
            return self;
        }
        let mut merged = self;
        for item in other.expected {
            if !merged.expected.contains(&item) {
                merged.expected.push(item);
            }
        }
        if merged.custom.is_some() && !merged.expected.is_empty() {
            merged.custom = None;
        }
        merged.hint = merged.hint.or(other.hint);
        merged.partial = merged.partial.or(other.partial);
        merged
    }
}

/// `a`, `a or b`, `a, b or c`.
fn join_alternatives(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Merge an optional running failure with a new one.
pub(crate) fn merge_into(best: &mut Option<Failure>, failure: Failure) {
    *best = Some(match best.take() {
        Some(current) => current.merge(failure),
        None => failure,
    });
}
