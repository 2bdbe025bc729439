//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::cst::SyntaxNode;
use super::state::ParseState;
use super::stream::StreamPos;

impl ParseState<'_, '_> {
    #[inline]
    pub(super) fn ensure_progress(&self) {
        assert!(
            self.debug_fuel.get() != 0,
            "parser is stuck: too many lookaheads"
        );
        self.debug_fuel.set(self.debug_fuel.get() - 1);
    }

    #[inline]
    pub(super) fn assert_lhs_balanced(&self, expected: usize) {
        assert_eq!(
            self.lhs_stack.len(),
            expected,
            "broken parser invariant: left operand stack unbalanced"
        );
    }
}

/// Successful trailing steps move the cursor; the driver checks this
/// separately and reports it, this is the internal consistency check.
#[inline]
pub(super) fn assert_not_behind(start: StreamPos, end: StreamPos, node: &SyntaxNode) {
    assert!(
        end >= start,
        "broken parser invariant: cursor moved backwards while producing {:?}",
        node.kind()
    );
}
