use super::command::COMMAND;
use super::standard;
use super::term::TERM;
use crate::parser::cst::SyntaxNode;
use crate::parser::lexer::TokenKind;
use crate::test_utils::{dump_term, parse_term};

fn binders(source: &str) -> Vec<SyntaxNode> {
    let (parse, diagnostics) = parse_term(source);
    assert!(diagnostics.is_empty(), "{}", diagnostics.printer().render());
    let lambda = parse.root();
    assert!(lambda.is("lambda"), "{}", lambda.dump());
    lambda.field("binders").unwrap().children().cloned().collect()
}

#[test]
fn untyped_binder() {
    insta::assert_snapshot!(dump_term("fun x, x"), @r#"
    lambda
      Symbol "fun"
      binders: null
        simple_binder
          names: null
            Ident "x"
          type: null
      Symbol ","
      body: Ident "x"
    "#);
}

#[test]
fn bracketed_binder_with_type() {
    insta::assert_snapshot!(dump_term("fun (x : Nat), x"), @r#"
    lambda
      Symbol "fun"
      binders: null
        bracketed_binder
          Symbol "("
          names: null
            Ident "x"
          type: null
            type_spec
              Symbol ":"
              type: Ident "Nat"
          Symbol ")"
      Symbol ","
      body: Ident "x"
    "#);
}

#[test]
fn simple_binder_takes_all_names_and_the_type() {
    let found = binders("λ x y : Nat, x");
    assert_eq!(found.len(), 1);
    let binder = &found[0];
    assert!(binder.is("simple_binder"));
    assert_eq!(binder.field("names").unwrap().children().count(), 2);
    assert!(!binder.field("type").unwrap().is_empty_group());
}

#[test]
fn bracketed_binders_repeat() {
    let found = binders("fun (x : Nat) (y) z, x");
    let kinds: Vec<_> = found
        .iter()
        .map(|b| b.kind().unwrap().as_str().to_string())
        .collect();
    assert_eq!(kinds, ["bracketed_binder", "bracketed_binder", "simple_binder"]);
    assert!(found[1].field("type").unwrap().is_empty_group());
}

#[test]
fn have_without_a_name() {
    insta::assert_snapshot!(dump_term("have : a := b; c"), @r#"
    have
      Symbol "have"
      name: null
      type: type_spec
        Symbol ":"
        type: Ident "a"
      Symbol ":="
      value: Ident "b"
      Symbol ";"
      body: Ident "c"
    "#);
}

#[test]
fn literals_are_arguments() {
    let (parse, diagnostics) = parse_term("f 0x1F 2.5 \"s\"");
    assert!(diagnostics.is_empty());
    let args: Vec<TokenKind> = parse
        .root()
        .field("args")
        .unwrap()
        .children()
        .map(|arg| arg.token().unwrap().kind)
        .collect();
    assert_eq!(args, [TokenKind::Number, TokenKind::Number, TokenKind::Str]);
}

#[test]
fn standard_has_both_categories() {
    let registry = standard();
    assert!(registry.category(TERM).is_some());
    assert!(registry.category(COMMAND).is_some());
    assert!(registry.tokens().contains("#check"));
    assert!(registry.tokens().contains("->"));
}
