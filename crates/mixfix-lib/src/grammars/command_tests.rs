use indoc::indoc;

use crate::diagnostics::DiagnosticKind;
use crate::parser::cst::SyntaxNode;
use crate::test_utils::parse_module;

fn kinds(commands: &[SyntaxNode]) -> Vec<String> {
    commands
        .iter()
        .map(|c| c.kind().map_or("?", |k| k.as_str()).to_string())
        .collect()
}

fn checked_term(command: &SyntaxNode) -> &SyntaxNode {
    assert!(command.is("check"), "{}", command.dump());
    command.field("term").unwrap()
}

#[test]
fn declaration_applies_to_later_commands_only() {
    let source = indoc! {r#"
        #check a <+> b
        infixl 65 "<+>" mplus
        #check a <+> b
    "#};
    let (module, diagnostics, _) = parse_module(source);
    let commands = module.commands();
    assert_eq!(kinds(commands), ["check", "error", "infixl", "check"]);

    // Before the declaration `<+>` lexes as `<`, `+`, `>`.
    assert_eq!(checked_term(&commands[0]).token().unwrap().text.as_ref(), "a");
    assert_eq!(
        diagnostics.printer().render(),
        "error at 9..10: unexpected token '<'; expected command"
    );

    let after = checked_term(&commands[3]);
    assert!(after.is("mplus"));
    assert_eq!(after.field("rhs").unwrap().token().unwrap().text.as_ref(), "b");
}

#[test]
fn notation_with_holes() {
    let source = indoc! {r#"
        notation:50 pair := "<" a "," b ">"
        #check < x, y >
    "#};
    let (module, diagnostics, session) = parse_module(source);
    assert!(diagnostics.is_empty(), "{}", diagnostics.printer().render());
    assert!(session.registry().tokens().contains(">"));

    insta::assert_snapshot!(module.commands()[1].dump(), @r##"
    check
      Symbol "#check"
      term: pair
        Symbol "<"
        a: Ident "x"
        Symbol ","
        b: Ident "y"
        Symbol ">"
    "##);
}

#[test]
fn notation_with_leading_hole_is_trailing() {
    let source = indoc! {r#"
        notation:65 pipe := x:65 "|>" f:66
        #check a |> g |> h
    "#};
    let (module, diagnostics, _) = parse_module(source);
    assert!(diagnostics.is_empty(), "{}", diagnostics.printer().render());

    let term = checked_term(&module.commands()[1]);
    assert!(term.is("pipe"));
    assert!(term.field("x").unwrap().is("pipe"));
    assert_eq!(term.field("f").unwrap().token().unwrap().text.as_ref(), "h");
}

#[test]
fn section_scopes_declarations() {
    let source = indoc! {r#"
        section
        infixl 65 "<+>" mplus
        #check a <+> b
        end
        #check a <+> b
    "#};
    let (module, diagnostics, session) = parse_module(source);
    assert_eq!(
        kinds(module.commands()),
        ["section", "infixl", "check", "end", "check", "error"]
    );
    assert!(checked_term(&module.commands()[2]).is("mplus"));
    assert_eq!(diagnostics.count_of(DiagnosticKind::ParseError), 1);
    assert!(!session.registry().tokens().contains("<+>"));
    assert_eq!(session.registry().scope_depth(), 0);
}

#[test]
fn end_without_section_warns() {
    let (_, diagnostics, _) = parse_module("end\n#check a");
    assert_eq!(
        diagnostics.printer().render(),
        "warning at 0..3: `end` without `section`"
    );
}

#[test]
fn invalid_token_is_rejected() {
    let (_, diagnostics, session) = parse_module(r#"infixl 65 "a b" ab"#);
    let warnings: Vec<_> = diagnostics.iter().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind(), DiagnosticKind::RejectedRegistration);
    assert_eq!(warnings[0].message(), r#""a b" is not a valid token"#);
    assert!(!session.registry().tokens().contains("a b"));
}

#[test]
fn redeclared_operator_warns_and_wins() {
    let source = indoc! {r#"
        infixl 65 "+" plus2
        #check a + b
    "#};
    let (module, diagnostics, _) = parse_module(source);
    let warnings: Vec<_> = diagnostics.iter().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind(), DiagnosticKind::AmbiguousRegistration);
    assert_eq!(
        warnings[0].message(),
        "`plus2` overlaps `plus` on '+' at precedence 65; the later one wins equal-length matches"
    );
    assert!(checked_term(&module.commands()[1]).is("plus2"));
}

#[test]
fn parse_error_recovers_at_next_command() {
    let source = indoc! {r#"
        #check a +
        infixl 65 "<+>" mplus
        #check a <+> b
    "#};
    let (module, diagnostics, _) = parse_module(source);
    let commands = module.commands();
    assert_eq!(kinds(commands), ["error", "infixl", "check"]);
    assert!(commands[0].children().next().unwrap().is("check"));
    assert!(checked_term(&commands[2]).is("mplus"));
    assert_eq!(
        diagnostics.printer().render(),
        "error at 11..17: unexpected token 'infixl'; expected term"
    );
}

#[test]
fn module_round_trips() {
    let source = indoc! {r#"
        -- operators
        #check a <+> b
        infixr 25 "=>" imp   /- arrow -/
        section s
        #check a => b => c
        end s
    "#};
    let (module, _, _) = parse_module(source);
    assert_eq!(module.to_source(), source);
}
