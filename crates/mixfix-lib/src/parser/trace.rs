//! Tracing hooks for debugging grammars.
//!
//! The driver reports what it does to a [`Tracer`]: which category it
//! enters, which candidates the registry offered for a token, which one
//! longest match picked, and where it backtracked. [`NoopTracer`] ignores
//! everything and is what [`Session::parse`](crate::Session::parse) uses.
//! [`PrintTracer`] collects indented lines, handy in tests:
//!
//! ```text
//! enter term @0 at identifier 'f'
//!   leading [ident] for identifier 'f'
//!   winner ident (1 tokens)
//!   trailing [app] for identifier 'x'
//!   ...
//! ```

use mixfix_core::Prec;

use super::lexer::Token;
use crate::registry::Role;

/// Instrumentation points of the Pratt driver and longest-match resolver.
pub trait Tracer {
    /// Entering `parse_expr` for a category.
    fn trace_enter(&mut self, category: &str, min_prec: Prec, token: &Token);

    /// Leaving `parse_expr`; `ok` is false when it failed.
    fn trace_exit(&mut self, category: &str, ok: bool);

    /// `parse_expr` reused the result of an earlier call at the same position.
    fn trace_replay(&mut self, category: &str, min_prec: Prec, ok: bool);

    /// Candidates the registry returned for the token under the cursor.
    fn trace_candidates(&mut self, role: Role, token: &Token, labels: &[&str]);

    /// Longest match picked an alternative.
    fn trace_winner(&mut self, label: &str, consumed: usize);

    /// An alternative failed and the resolver rewound.
    fn trace_backtrack(&mut self, label: &str);

    /// Candidates existed but precedence ruled them all out.
    fn trace_gated(&mut self, role: Role, token: &Token, min_prec: Prec);
}

/// Tracer that does nothing.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_enter(&mut self, _category: &str, _min_prec: Prec, _token: &Token) {}

    #[inline(always)]
    fn trace_exit(&mut self, _category: &str, _ok: bool) {}

    #[inline(always)]
    fn trace_replay(&mut self, _category: &str, _min_prec: Prec, _ok: bool) {}

    #[inline(always)]
    fn trace_candidates(&mut self, _role: Role, _token: &Token, _labels: &[&str]) {}

    #[inline(always)]
    fn trace_winner(&mut self, _label: &str, _consumed: usize) {}

    #[inline(always)]
    fn trace_backtrack(&mut self, _label: &str) {}

    #[inline(always)]
    fn trace_gated(&mut self, _role: Role, _token: &Token, _min_prec: Prec) {}
}

/// Tracer that records indented lines.
#[derive(Debug, Default)]
pub struct PrintTracer {
    lines: Vec<String>,
    depth: usize,
}

impl PrintTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with newlines.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{:width$}{line}", "", width = self.depth * 2));
    }
}

impl Tracer for PrintTracer {
    fn trace_enter(&mut self, category: &str, min_prec: Prec, token: &Token) {
        self.push(format!(
            "enter {category} @{min_prec} at {}",
            token.describe()
        ));
        self.depth += 1;
    }

    fn trace_exit(&mut self, category: &str, ok: bool) {
        self.depth = self.depth.saturating_sub(1);
        let outcome = if ok { "ok" } else { "failed" };
        self.push(format!("exit {category} {outcome}"));
    }

    fn trace_replay(&mut self, category: &str, min_prec: Prec, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        self.push(format!("replay {category} @{min_prec} {outcome}"));
    }

    fn trace_candidates(&mut self, role: Role, token: &Token, labels: &[&str]) {
        self.push(format!(
            "{role} [{}] for {}",
            labels.join(", "),
            token.describe()
        ));
    }

    fn trace_winner(&mut self, label: &str, consumed: usize) {
        self.push(format!("winner {label} ({consumed} tokens)"));
    }

    fn trace_backtrack(&mut self, label: &str) {
        self.push(format!("backtrack {label}"));
    }

    fn trace_gated(&mut self, role: Role, token: &Token, min_prec: Prec) {
        self.push(format!(
            "{role} candidates for {} gated out @{min_prec}",
            token.describe()
        ));
    }
}
