use mixfix_core::Prec;

use crate::config::ParseConfig;
use crate::diagnostics::Diagnostics;
use crate::grammars::{self, term};
use crate::registry::GrammarRegistry;
use crate::session::{Module, Parse, Session};
use crate::{Error, PassResult};

/// Recursion fuel small enough that deep-nesting tests cannot overflow the
/// test thread's stack.
pub const TEST_RECURSION_FUEL: u32 = 32;

pub fn term_session() -> Session {
    Session::new(term::registry())
}

pub fn parse_term(source: &str) -> (Parse, Diagnostics) {
    parse_in(&term::registry(), source)
}

pub fn parse_in(registry: &GrammarRegistry, source: &str) -> (Parse, Diagnostics) {
    try_parse_in(registry, source).expect("no fatal error")
}

pub fn try_parse_in(registry: &GrammarRegistry, source: &str) -> PassResult<Parse> {
    Session::new(registry.clone()).parse(source, term::TERM, Prec::ZERO)
}

/// Tree dump of a term that must parse without diagnostics.
pub fn dump_term(source: &str) -> String {
    let (parse, diagnostics) = parse_term(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}:\n{}",
        diagnostics.printer().render()
    );
    parse.root().dump()
}

/// Tree dump with the default grammar, diagnostics allowed.
pub fn dump_with_errors(source: &str) -> (String, String) {
    let (parse, diagnostics) = parse_term(source);
    (parse.root().dump(), diagnostics.printer().render())
}

pub fn parse_module(source: &str) -> (Module, Diagnostics, Session) {
    let mut session = Session::new(grammars::standard());
    let (module, diagnostics) = session
        .parse_commands(source, grammars::command::COMMAND, grammars::command::apply)
        .expect("no fatal error");
    (module, diagnostics, session)
}

pub fn small_stack_config() -> ParseConfig {
    ParseConfig::new().with_recursion_fuel(Some(TEST_RECURSION_FUEL))
}

pub fn expect_fatal(result: PassResult<Parse>) -> Error {
    match result {
        Ok((parse, _)) => panic!("expected a fatal error, got:\n{}", parse.root().dump()),
        Err(err) => err,
    }
}

/// Outcome of running a bare parser over `source`.
pub struct Run {
    pub result: crate::parser::error::PResult,
    /// Tokens consumed.
    pub consumed: usize,
    pub diagnostics: Diagnostics,
}

/// Run `parser` against `registry` (its tokens declared on the fly).
pub fn run_parser(registry: &GrammarRegistry, parser: &crate::Parser, source: &str) -> Run {
    use crate::parser::state::ParseState;
    use crate::parser::stream::TokenStream;
    use crate::parser::trace::NoopTracer;

    let mut registry = registry.clone();
    for token in parser.tokens() {
        registry.declare_token(token);
    }
    let config = small_stack_config();
    let mut tracer = NoopTracer;
    let mut state = ParseState::new(TokenStream::new(source), &registry, &config, &mut tracer);
    let start = state.pos();
    let result = parser.parse(&mut state);
    let consumed = state.consumed_since(start);
    let diagnostics = state.diagnostics().clone();
    Run {
        result,
        consumed,
        diagnostics,
    }
}

pub fn run(parser: &crate::Parser, source: &str) -> Run {
    run_parser(&GrammarRegistry::new(), parser, source)
}
