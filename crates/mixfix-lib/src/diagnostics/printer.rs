//! Rendering diagnostics for people.
//!
//! Without source text each diagnostic is one line (`error at 4..5: ...`),
//! which is what tests compare against. With source text the diagnostics are
//! drawn as annotated snippets.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Configurable view over a [`Diagnostics`] collection.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
    with_warnings: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
            with_warnings: true,
        }
    }

    /// Draw snippets of `source` instead of one line per diagnostic.
    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// File name shown in snippet headers.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Include registration warnings (the default).
    pub fn warnings(mut self, value: bool) -> Self {
        self.with_warnings = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = match (self.source, self.colored) {
            (None, _) => None,
            (Some(_), true) => Some(Renderer::styled()),
            (Some(_), false) => Some(Renderer::plain()),
        };

        for (i, diag) in self.selected().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match (self.source, &renderer) {
                (Some(source), Some(renderer)) => {
                    let report = annotated(diag, source, self.path);
                    write!(w, "{}", renderer.render(&report))?;
                    for hint in diag.hints() {
                        write!(w, "\n  = help: {hint}")?;
                    }
                }
                _ => write!(w, "{diag}")?,
            }
        }
        Ok(())
    }

    /// `2 errors, 1 warning`, counting what this printer shows.
    pub fn summary(&self) -> String {
        let (errors, warnings) = self.selected().fold((0, 0), |(e, w), d| match d.severity() {
            Severity::Error => (e + 1, w),
            Severity::Warning => (e, w + 1),
        });
        let mut parts = vec![count(errors, "error")];
        if self.with_warnings {
            parts.push(count(warnings, "warning"));
        }
        parts.join(", ")
    }

    fn selected(&self) -> impl Iterator<Item = &'d DiagnosticMessage> + '_ {
        self.diagnostics
            .iter()
            .filter(|d| self.with_warnings || !d.is_warning())
    }
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn annotated<'a>(diag: &'a DiagnosticMessage, source: &'a str, path: Option<&'a str>) -> Vec<Group<'a>> {
    let mut snippet = Snippet::source(source).line_start(1).annotation(
        AnnotationKind::Primary
            .span(caret_range(diag.range(), source.len()))
            .label(diag.message()),
    );
    if let Some(path) = path {
        snippet = snippet.path(path);
    }
    for related in &diag.related {
        snippet = snippet.annotation(
            AnnotationKind::Context
                .span(caret_range(related.range, source.len()))
                .label(&related.message),
        );
    }

    let level = match diag.severity() {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    };
    vec![level.primary_title(diag.message()).element(snippet)]
}

/// Byte range to underline. A missing token has an empty range; it still
/// gets one column (none at the very end of the input).
fn caret_range(range: TextRange, len: usize) -> Range<usize> {
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    if start < end {
        start..end
    } else {
        start..(start + 1).min(len)
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }

    /// Plain (uncolored) rendering against the source text.
    pub fn render(&self, source: &str) -> String {
        self.printer().source(source).render()
    }
}
