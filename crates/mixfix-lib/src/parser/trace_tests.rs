use indoc::indoc;
use mixfix_core::Prec;

use super::builder::NodeBuilder;
use super::trace::PrintTracer;
use crate::Session;
use crate::grammars::term::{TERM, term};
use crate::registry::Production;
use crate::test_utils::term_session;

fn trace(source: &str) -> String {
    let session = term_session();
    let mut tracer = PrintTracer::new();
    session
        .parse_with_tracer(source, TERM, Prec::ZERO, &mut tracer)
        .unwrap();
    tracer.output()
}

#[test]
fn application() {
    insta::assert_snapshot!(trace("f x"), @r"
    enter term @0 at identifier 'f'
      leading [ident] for identifier 'f'
      enter term @arg at identifier 'x'
        leading [ident] for identifier 'x'
      exit term ok
      enter term @arg at end of input
      exit term failed
    exit term ok
    ");
}

#[test]
fn operator_candidates() {
    let output = trace("a + b");
    assert_eq!(
        output,
        indoc! {"
            enter term @0 at identifier 'a'
              leading [ident] for identifier 'a'
              trailing [plus] for token '+'
              enter term @66 at identifier 'b'
                leading [ident] for identifier 'b'
              exit term ok
            exit term ok"}
    );
}

#[test]
fn backtracking_is_traced() {
    let output = trace("fun (x : T), x");
    assert!(output.contains("backtrack simple_binder"), "{output}");
    assert!(output.contains("winner bracketed_binder (5 tokens)"), "{output}");
}

#[test]
fn precedence_gate_is_traced() {
    let session = term_session();
    let mut tracer = PrintTracer::new();
    let _ = session.parse_with_tracer("a = b = c", TERM, Prec::ZERO, &mut tracer);
    assert!(
        tracer
            .lines()
            .iter()
            .any(|line| line.trim() == "trailing candidates for token '=' gated out @0"),
        "{}",
        tracer.output()
    );
}

#[test]
fn repeated_operand_is_replayed() {
    let mut registry = crate::grammars::term::registry();
    let singleton = NodeBuilder::new("singleton")
        .token("{")
        .field("a", term(Prec::ZERO))
        .token("}")
        .build();
    let pair = NodeBuilder::new("pair")
        .token("{")
        .field("a", term(Prec::ZERO))
        .token(",")
        .field("b", term(Prec::ZERO))
        .token("}")
        .build();
    registry.register(Production::leading(TERM, singleton)).unwrap();
    registry.register(Production::leading(TERM, pair)).unwrap();

    let mut tracer = PrintTracer::new();
    Session::new(registry)
        .parse_with_tracer("{x}", TERM, Prec::ZERO, &mut tracer)
        .unwrap();
    let output = tracer.output();
    assert_eq!(output.matches("enter term @0 at identifier 'x'").count(), 1, "{output}");
    assert!(output.contains("replay term @0 ok"), "{output}");
}
