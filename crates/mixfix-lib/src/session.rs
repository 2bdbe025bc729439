//! Parse sessions.
//!
//! A [`Session`] owns a grammar registry and the parse limits. It parses a
//! single term ([`Session::parse`]) or a sequence of commands
//! ([`Session::parse_commands`]), letting a declaration layer change the
//! grammar after each command: a notation is visible to the commands after
//! the one that declared it, never to earlier ones.

use std::rc::Rc;

use mixfix_core::Prec;
use rowan::TextRange;

use crate::config::ParseConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::cst::{NodeKind, SyntaxNode};
use crate::parser::error::Failure;
use crate::parser::lexer::Token;
use crate::parser::pratt;
use crate::parser::state::ParseState;
use crate::parser::stream::TokenStream;
use crate::parser::trace::{NoopTracer, Tracer};
use crate::registry::{GrammarRegistry, Role};
use crate::{Error, PassResult};

/// Result of parsing one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    root: SyntaxNode,
    rest: Vec<Token>,
    trailing_trivia: Rc<str>,
}

impl Parse {
    /// The tree. `Missing` (or a partial tree) when the term failed.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn into_root(self) -> SyntaxNode {
        self.root
    }

    /// Tokens after the term that nothing consumed.
    pub fn rest(&self) -> &[Token] {
        &self.rest
    }

    /// Whitespace and comments at the end of the input.
    pub fn trailing_trivia(&self) -> &str {
        &self.trailing_trivia
    }

    /// The source text this parse covers, byte for byte.
    pub fn to_source(&self) -> String {
        let mut out = self.root.to_source();
        for token in &self.rest {
            out.push_str(&token.leading_trivia);
            out.push_str(&token.text);
        }
        out.push_str(&self.trailing_trivia);
        out
    }
}

/// Result of parsing a sequence of commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    commands: Vec<SyntaxNode>,
    trailing_trivia: Rc<str>,
}

impl Module {
    /// One tree per command; unparsable stretches are `error` nodes.
    pub fn commands(&self) -> &[SyntaxNode] {
        &self.commands
    }

    pub fn to_source(&self) -> String {
        let mut out: String = self.commands.iter().map(SyntaxNode::to_source).collect();
        out.push_str(&self.trailing_trivia);
        out
    }

    /// Indented rendering of all commands.
    pub fn dump(&self) -> String {
        self.commands.iter().map(SyntaxNode::dump).collect()
    }
}

/// A grammar plus limits; parses source text.
#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: GrammarRegistry,
    config: ParseConfig,
}

impl Session {
    pub fn new(registry: GrammarRegistry) -> Self {
        Self {
            registry,
            config: ParseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GrammarRegistry {
        &mut self.registry
    }

    /// Parse `source` as one term of `category` at `min_prec`.
    ///
    /// Recoverable errors come back as diagnostics next to a tree with
    /// `Missing` placeholders. Input left after a complete term is reported
    /// and kept in [`Parse::rest`].
    pub fn parse(&self, source: &str, category: &str, min_prec: Prec) -> PassResult<Parse> {
        self.parse_with_tracer(source, category, min_prec, &mut NoopTracer)
    }

    pub fn parse_with_tracer(
        &self,
        source: &str,
        category: &str,
        min_prec: Prec,
        tracer: &mut dyn Tracer,
    ) -> PassResult<Parse> {
        let stream = TokenStream::new(source);
        let mut state = ParseState::new(stream, &self.registry, &self.config, tracer);

        let root = match pratt::parse_expr(&mut state, category, min_prec) {
            Ok(root) => {
                if !state.at_eof() && !state.has_fatal_error() {
                    let failure = state.fail("end of input");
                    state
                        .diagnostics_mut()
                        .report(DiagnosticKind::TrailingInput, failure.range())
                        .message(failure.message())
                        .emit();
                }
                root
            }
            Err(failure) => report_failure(&mut state, failure),
        };

        let finished = state.finish();
        let mut stream = finished.stream;
        let mut rest = Vec::new();
        let tokens = self.registry.tokens();
        while !stream.at_eof(tokens) {
            rest.push(stream.advance(tokens));
        }
        if let Some(err) = finished.fatal_error {
            return Err(err);
        }
        if let Some(err) = stream.fatal_error() {
            return Err(Error::Lex(err.clone()));
        }

        let trailing_trivia = stream.peek(tokens).leading_trivia.clone();
        let parse = Parse {
            root,
            rest,
            trailing_trivia,
        };
        Ok((parse, finished.diagnostics))
    }

    /// Parse commands of `category` until the end of input.
    ///
    /// `on_command` runs after each command with the registry, so a command
    /// can declare notations for the ones after it. A command that fails to
    /// parse is reported, and input is skipped up to the next token that can
    /// start a command; the skipped stretch becomes an `error` node.
    pub fn parse_commands(
        &mut self,
        source: &str,
        category: &str,
        mut on_command: impl FnMut(&SyntaxNode, &mut GrammarRegistry),
    ) -> PassResult<Module> {
        let mut stream = TokenStream::new(source);
        let mut diagnostics = Diagnostics::new();
        let mut commands = Vec::new();
        let mut exec_fuel = self.config.exec_fuel();
        let mut tracer = NoopTracer;

        while !stream.at_eof(self.registry.tokens()) {
            let mut state = ParseState::new(stream, &self.registry, &self.config, &mut tracer)
                .with_exec_fuel_remaining(exec_fuel);

            let start = state.pos();
            let command = match pratt::parse_expr(&mut state, category, Prec::ZERO) {
                Ok(command) => command,
                Err(failure) => {
                    let partial = report_failure(&mut state, failure);
                    recover(&mut state, category, start, partial)
                }
            };

            let finished = state.finish();
            if let Some(err) = finished.fatal_error {
                return Err(err);
            }
            diagnostics.extend(finished.diagnostics);
            exec_fuel = finished.exec_fuel_remaining;
            stream = finished.stream;

            on_command(&command, &mut self.registry);
            let range = command
                .text_range()
                .unwrap_or_else(|| TextRange::empty(stream.last_end()));
            for warning in self.registry.take_warnings() {
                diagnostics
                    .report(warning.kind, range)
                    .message(warning.message)
                    .emit();
            }
            // Lookahead was lexed with the old token table.
            stream.invalidate_after_cursor();
            commands.push(command);
        }

        if let Some(err) = stream.fatal_error() {
            return Err(Error::Lex(err.clone()));
        }
        let trailing_trivia = stream.peek(self.registry.tokens()).leading_trivia.clone();
        let module = Module {
            commands,
            trailing_trivia,
        };
        Ok((module, diagnostics))
    }
}

/// Turn a failed term into one diagnostic; return the partial tree.
fn report_failure(state: &mut ParseState<'_, '_>, mut failure: Failure) -> SyntaxNode {
    if !state.has_fatal_error() {
        let mut builder = state
            .diagnostics_mut()
            .report(DiagnosticKind::ParseError, failure.range())
            .message(failure.message());
        if let Some(hint) = failure.hint() {
            builder = builder.hint(hint);
        }
        builder.emit();
    }
    failure.take_partial_or_missing()
}

/// Skip to the next token that can start a command, wrapping the failed
/// command and the skipped tokens in an `error` node.
fn recover(
    state: &mut ParseState<'_, '_>,
    category: &str,
    start: crate::parser::stream::StreamPos,
    partial: SyntaxNode,
) -> SyntaxNode {
    let registry = state.registry();
    let Some(cat) = registry.category(category) else {
        return partial;
    };

    let mut items = vec![partial];
    loop {
        if state.has_fatal_error() {
            break;
        }
        let token = state.peek().clone();
        if token.is_eof() {
            break;
        }
        let moved = state.pos() != start;
        if moved && !registry.lookup(cat, Role::Leading, &token).is_empty() {
            break;
        }
        items.push(SyntaxNode::Atom(state.advance()));
    }
    SyntaxNode::node(
        NodeKind::new("error"),
        items.into_iter().map(|item| (None, item)).collect(),
    )
}
