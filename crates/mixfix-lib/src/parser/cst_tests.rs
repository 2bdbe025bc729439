use indoc::indoc;
use rowan::TextSize;

use super::cst::{NodeKind, SyntaxNode};
use crate::test_utils::{dump_term, parse_term};

#[test]
fn empty_group_is_absent_optional() {
    let empty = SyntaxNode::empty();
    assert!(empty.is_empty_group());
    assert!(!empty.has_missing());
    assert_eq!(empty.text_range(), None);
    assert_eq!(empty.kind().map(NodeKind::as_str), Some("null"));
}

#[test]
fn missing_has_an_empty_range() {
    let missing = SyntaxNode::missing(TextSize::from(4), "term");
    assert!(missing.is_missing());
    assert!(missing.has_missing());
    let range = missing.text_range().unwrap();
    assert!(range.is_empty());
    assert_eq!(u32::from(range.start()), 4);
}

#[test]
fn fields_and_children() {
    let (parse, _) = parse_term("a + b");
    let root = parse.root();

    assert!(root.is("plus"));
    let names: Vec<_> = root.fields().iter().map(|(name, _)| name.as_deref()).collect();
    assert_eq!(names, [Some("lhs"), None, Some("rhs")]);
    assert_eq!(root.children().count(), 3);
    assert_eq!(root.field("rhs").and_then(|n| n.token()).map(|t| &*t.text), Some("b"));
    assert_eq!(root.field("nope"), None);
}

#[test]
fn text_range_excludes_outer_trivia() {
    let (parse, _) = parse_term("  f x  ");
    let range = parse.root().text_range().unwrap();
    assert_eq!(u32::from(range.start()), 2);
    assert_eq!(u32::from(range.end()), 5);
}

#[test]
fn to_source_keeps_inner_trivia() {
    let source = "f  x -- arg\n  + 1";
    let (parse, _) = parse_term(source);
    assert_eq!(parse.root().to_source(), source);
}

#[test]
fn dump_nested() {
    insta::assert_snapshot!(dump_term("f (x : Nat)"), @r#"
    app
      fn: Ident "f"
      args: null
        paren
          Symbol "("
          term: Ident "x"
          type: null
            type_spec
              Symbol ":"
              type: Ident "Nat"
          Symbol ")"
    "#);
}

#[test]
fn dump_missing() {
    let (parse, _) = parse_term("(a +");
    insta::assert_snapshot!(parse.root().dump(), @r#"
    paren
      Symbol "("
      term: plus
        lhs: Ident "a"
        Symbol "+"
        rhs: <missing term>
      type: <missing type_spec?>
      <missing ')'>
    "#);
}

#[test]
fn json_serialization() {
    let (parse, _) = parse_term("-x");
    let json = serde_json::to_string_pretty(parse.root()).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "kind": "neg",
      "fields": [
        [
          null,
          {
            "token": "Symbol",
            "text": "-",
            "range": [
              0,
              1
            ]
          }
        ],
        [
          "arg",
          {
            "token": "Ident",
            "text": "x",
            "range": [
              1,
              2
            ]
          }
        ]
      ]
    }
    "#);
}

#[test]
fn display_is_dump() {
    let source = indoc! {"
        a = b
    "};
    let (parse, _) = parse_term(source);
    assert_eq!(parse.root().to_string(), parse.root().dump());
}
