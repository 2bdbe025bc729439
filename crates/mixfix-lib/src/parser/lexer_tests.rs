use super::lexer::{LexErrorKind, TokenKind, TokenTable, lex, lex_token};

fn table(tokens: &[&str]) -> TokenTable {
    let mut table = TokenTable::new();
    for token in tokens {
        table.declare(token);
    }
    table
}

fn snapshot(source: &str, tokens: &[&str]) -> String {
    let tokens = lex(source, &table(tokens)).unwrap();
    tokens
        .iter()
        .map(|t| format!("{:?} {:?} {:?}", t.kind, &*t.text, &*t.leading_trivia))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn identifiers_numbers_strings() {
    insta::assert_snapshot!(snapshot(r#"Nat.succ 42 0x1F 3.5 "hi""#, &[]), @r#"
    Ident "Nat.succ" ""
    Number "42" " "
    Number "0x1F" " "
    Number "3.5" " "
    Str "\"hi\"" " "
    Eof "" ""
    "#);
}

#[test]
fn declared_keywords_are_symbols() {
    insta::assert_snapshot!(snapshot("fun x, x", &["fun", ","]), @r#"
    Symbol "fun" ""
    Ident "x" " "
    Symbol "," ""
    Ident "x" " "
    Eof "" ""
    "#);
}

#[test]
fn maximal_munch_over_declared_tokens() {
    insta::assert_snapshot!(snapshot("a->b-c", &["-", "->"]), @r#"
    Ident "a" ""
    Symbol "->" ""
    Ident "b" ""
    Symbol "-" ""
    Ident "c" ""
    Eof "" ""
    "#);
}

#[test]
fn undeclared_punctuation_is_one_character() {
    insta::assert_snapshot!(snapshot("a +++ b", &["+"]), @r#"
    Ident "a" ""
    Symbol "+" " "
    Symbol "+" ""
    Symbol "+" ""
    Ident "b" " "
    Eof "" ""
    "#);
}

#[test]
fn declaring_a_token_changes_later_lexing() {
    let mut table = table(&["+"]);
    let before = lex_token("+++ b", 0, &table).unwrap();
    assert_eq!(&*before.text, "+");

    table.declare("+++");
    let after = lex_token("+++ b", 0, &table).unwrap();
    assert_eq!(&*after.text, "+++");
}

#[test]
fn lambda_sign_is_punctuation() {
    let tokens = lex("λx, x", &table(&["λ", ","])).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Symbol);
    assert_eq!(&*tokens[0].text, "λ");
    assert_eq!(tokens[1].kind, TokenKind::Ident);
}

#[test]
fn comments_are_trivia() {
    let source = "a -- line\n/- block /- nested -/ -/ b";
    let tokens = lex(source, &table(&[])).unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(&*tokens[1].text, "b");
    assert_eq!(
        &*tokens[1].leading_trivia,
        " -- line\n/- block /- nested -/ -/ "
    );
}

#[test]
fn eof_carries_trailing_trivia() {
    let tokens = lex("x  -- done\n", &table(&[])).unwrap();
    let eof = tokens.last().unwrap();
    assert!(eof.is_eof());
    assert_eq!(&*eof.leading_trivia, "  -- done\n");
    assert_eq!(u32::from(eof.range.start()), 11);
}

#[test]
fn unterminated_string_is_fatal() {
    let err = lex(r#"f "abc"#, &table(&[])).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(u32::from(err.range.start()), 2);
}

#[test]
fn unterminated_comment_is_fatal() {
    let err = lex("a /- b", &table(&[])).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
}

#[test]
fn escaped_quote_stays_in_string() {
    let tokens = lex(r#""a\"b" c"#, &table(&[])).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Str);
    assert_eq!(&*tokens[0].text, r#""a\"b""#);
}

#[test]
fn trivia_range_precedes_token() {
    let tokens = lex("a   b", &table(&[])).unwrap();
    let range = tokens[1].trivia_range();
    assert_eq!(u32::from(range.start()), 1);
    assert_eq!(u32::from(range.end()), 4);
}

#[test]
fn describe_tokens() {
    let tokens = lex("x )", &table(&[")"])).unwrap();
    assert_eq!(tokens[0].describe(), "identifier 'x'");
    assert_eq!(tokens[1].describe(), "token ')'");
    assert_eq!(tokens[2].describe(), "end of input");
}

#[test]
fn token_table_truncate_forgets_longer_tokens() {
    let mut table = table(&["-"]);
    table.declare("->");
    assert_eq!(table.longest_prefix("->x"), Some(2));

    table.truncate(1);
    assert!(!table.contains("->"));
    assert_eq!(table.longest_prefix("->x"), Some(1));
}
