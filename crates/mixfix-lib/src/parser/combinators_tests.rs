use super::builder::NodeBuilder;
use super::combinators::{
    Parser, any_of, attempt, ident, longest_match, lookahead, many, many1, no_ws_before,
    not_followed_by, number, optional, sep_by, sep_by_trailing, sep_by1, string, symbol,
};
use super::cst::SyntaxNode;
use super::lexer::TokenKind;
use crate::test_utils::run;

fn pair(kind: &str, open: &str, close: &str) -> Parser {
    NodeBuilder::new(kind).token(open).token(close).build()
}

fn texts(node: &SyntaxNode) -> Vec<String> {
    node.tokens().iter().map(|t| t.text.to_string()).collect()
}

#[test]
fn symbol_matches_declared_token() {
    let run = run(&symbol("->"), "-> x");
    let node = run.result.unwrap();
    assert_eq!(node.token().map(|t| t.kind), Some(TokenKind::Symbol));
    assert_eq!(run.consumed, 1);
}

#[test]
fn symbol_failure_message() {
    let run = run(&symbol("("), "y");
    let failure = run.result.unwrap_err();
    assert_eq!(failure.message(), "unexpected identifier 'y'; expected '('");
    assert_eq!(run.consumed, 0);
}

#[test]
fn token_classes() {
    assert!(run(&number(), "42").result.is_ok());
    assert!(run(&string(), r#""s""#).result.is_ok());
    let failure = run(&ident(), "42").result.unwrap_err();
    assert_eq!(failure.message(), "unexpected token '42'; expected identifier");
}

#[test]
fn optional_absent_is_empty_group() {
    let run = run(&optional(symbol(":")), "x");
    assert!(run.result.unwrap().is_empty_group());
    assert_eq!(run.consumed, 0);
}

#[test]
fn optional_present_wraps_item() {
    let run = run(&optional(symbol(":")), ": x");
    let node = run.result.unwrap();
    assert_eq!(node.children().count(), 1);
    assert_eq!(run.consumed, 1);
}

#[test]
fn optional_does_not_recover_after_commit() {
    let run = run(&optional(pair("pair", "(", ")")), "( x");
    let failure = run.result.unwrap_err();
    assert_eq!(run.consumed, 1);
    insta::assert_snapshot!(failure.partial().unwrap().dump(), @r#"
    null
      pair
        Symbol "("
        <missing ')'>
    "#);
}

#[test]
fn many_collects_until_mismatch() {
    let run = run(&many(ident()), "a b c )");
    let node = run.result.unwrap();
    assert_eq!(texts(&node), ["a", "b", "c"]);
    assert_eq!(run.consumed, 3);
}

#[test]
fn many_accepts_zero() {
    let run = run(&many(ident()), ")");
    assert!(run.result.unwrap().is_empty_group());
}

#[test]
fn many1_requires_one() {
    let run = run(&many1(ident()), ")");
    let failure = run.result.unwrap_err();
    assert_eq!(failure.message(), "unexpected token ')'; expected identifier");
    assert_eq!(run.consumed, 0);
}

#[test]
fn many_stops_on_committed_failure() {
    let run = run(&many(pair("pair", "(", ")")), "() ( x");
    let failure = run.result.unwrap_err();
    assert_eq!(run.consumed, 3);
    let partial = failure.partial().unwrap();
    assert_eq!(partial.children().count(), 2);
    assert!(partial.has_missing());
}

#[test]
fn sep_by_keeps_separators() {
    let run = run(&sep_by(ident(), symbol(",")), "a, b, c");
    let node = run.result.unwrap();
    assert_eq!(texts(&node), ["a", ",", "b", ",", "c"]);
    assert_eq!(run.consumed, 5);
}

#[test]
fn sep_by_accepts_empty() {
    let run = run(&sep_by(ident(), symbol(",")), "");
    assert!(run.result.unwrap().is_empty_group());
}

#[test]
fn sep_by1_rejects_empty() {
    let run = run(&sep_by1(ident(), symbol(",")), ")");
    assert!(run.result.is_err());
    assert_eq!(run.consumed, 0);
}

#[test]
fn sep_by_rejects_trailing_separator() {
    let run = run(&sep_by(ident(), symbol(",")), "a, b,");
    let failure = run.result.unwrap_err();
    assert_eq!(failure.message(), "unexpected end of input; expected identifier");
    assert_eq!(run.consumed, 4);
}

#[test]
fn sep_by_trailing_accepts_trailing_separator() {
    let run = run(&sep_by_trailing(ident(), symbol(",")), "a, b,");
    let node = run.result.unwrap();
    assert_eq!(texts(&node), ["a", ",", "b", ","]);
}

#[test]
fn any_of_takes_first_success() {
    let run = run(&any_of(vec![symbol("x"), ident()]), "x");
    let node = run.result.unwrap();
    assert_eq!(node.token().map(|t| t.kind), Some(TokenKind::Symbol));
}

#[test]
fn any_of_merges_expectations() {
    let run = run(&any_of(vec![symbol("("), number()]), "y");
    let failure = run.result.unwrap_err();
    assert_eq!(failure.message(), "unexpected identifier 'y'; expected '(' or number");
}

#[test]
fn any_of_commits_after_consuming() {
    let parser = any_of(vec![pair("paren", "(", ")"), pair("mixed", "(", "]")]);
    let run = run(&parser, "( ]");
    let failure = run.result.unwrap_err();
    assert_eq!(failure.message(), "unexpected token ']'; expected ')'");
    assert_eq!(run.consumed, 1);
}

#[test]
fn attempt_reopens_the_choice() {
    let parser = any_of(vec![attempt(pair("paren", "(", ")")), pair("mixed", "(", "]")]);
    let run = run(&parser, "( ]");
    assert!(run.result.unwrap().is("mixed"));
    assert_eq!(run.consumed, 2);
}

#[test]
fn longest_match_ignores_order() {
    let short = NodeBuilder::new("short").token("(").build();
    let long = pair("long", "(", ")");
    let run = run(&longest_match(vec![short, long]), "()");
    assert!(run.result.unwrap().is("long"));
    assert_eq!(run.consumed, 2);
}

#[test]
fn longest_match_tie_goes_to_first() {
    let a = NodeBuilder::new("a").field("x", ident()).build();
    let b = NodeBuilder::new("b").field("x", ident()).build();
    let run = run(&longest_match(vec![a, b]), "x");
    assert!(run.result.unwrap().is("a"));
}

#[test]
fn lookahead_consumes_nothing() {
    let run = run(&lookahead(ident()), "x");
    assert!(run.result.is_ok());
    assert_eq!(run.consumed, 0);

    assert!(self::run(&lookahead(ident()), ")").result.is_err());
}

#[test]
fn not_followed_by_inverts() {
    let parser = not_followed_by(ident(), "identifier");
    let failure = run(&parser, "x").result.unwrap_err();
    assert_eq!(failure.message(), "unexpected identifier");

    let ok = run(&parser, ")");
    assert!(ok.result.is_ok());
    assert_eq!(ok.consumed, 0);
}

#[test]
fn no_ws_before_checks_trivia() {
    let parser = NodeBuilder::new("bang")
        .field("name", ident())
        .parser(no_ws_before())
        .token("!")
        .build();
    assert!(run(&parser, "a!").result.is_ok());

    let failure = run(&parser, "a !").result.unwrap_err();
    assert_eq!(failure.message(), "no space before this token");
}

#[test]
fn hints_compose() {
    let parser = NodeBuilder::new("call")
        .parser(optional(symbol("@")))
        .field("name", ident())
        .build();
    assert_eq!(parser.first().to_string(), "{'@', identifier}");
    assert_eq!(many(ident()).first().to_string(), "{identifier}?");
    assert_eq!(parser.tokens().len(), 1);
}

#[test]
fn soft_failures_join_later_expectations() {
    // `a` then an optional `: type` then `)`: a stray token after `a` should
    // mention both what could continue and what must come.
    let parser = NodeBuilder::new("item")
        .field("name", ident())
        .field("type", optional(NodeBuilder::new("ann").token(":").field("t", ident()).build()))
        .token(")")
        .build();
    let failure = run(&parser, "a ;").result.unwrap_err();
    assert_eq!(failure.message(), "unexpected token ';'; expected ')' or ':'");
}

#[test]
fn wide_choice_does_not_trip_the_lookahead_watchdog() {
    let keywords: Vec<Parser> = (0..200).map(|i| symbol(&format!("kw{i}"))).collect();
    let run = run(&any_of(keywords), "kw199");
    assert_eq!(run.result.unwrap().token().unwrap().text.as_ref(), "kw199");
    assert_eq!(run.consumed, 1);
}

#[test]
fn many_absent_optionals_in_a_row() {
    let parser = (0..150)
        .fold(NodeBuilder::new("flags").token("["), |b, i| {
            b.field(&format!("f{i}"), optional(symbol(&format!("o{i}"))))
        })
        .token("]")
        .build();
    let run = run(&parser, "[ ]");
    let node = run.result.unwrap();
    assert!(node.field("f149").unwrap().is_empty_group());
    assert_eq!(run.consumed, 2);
}
