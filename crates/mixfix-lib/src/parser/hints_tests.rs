use super::hints::{FirstTokens, Hint, HintSet};

fn tokens(hints: &[&str]) -> FirstTokens {
    FirstTokens::Tokens(hints.iter().map(|h| Hint::token(h)).collect())
}

fn opt_tokens(hints: &[&str]) -> FirstTokens {
    FirstTokens::OptTokens(hints.iter().map(|h| Hint::token(h)).collect())
}

#[test]
fn seq_stops_at_first_required_token() {
    let first = tokens(&["("]).seq(tokens(&["x"]));
    assert_eq!(first, tokens(&["("]));
}

#[test]
fn seq_skips_epsilon() {
    let first = FirstTokens::Epsilon.seq(tokens(&["+"]));
    assert_eq!(first, tokens(&["+"]));
}

#[test]
fn seq_through_optional_collects_both() {
    let first = opt_tokens(&["@"]).seq(tokens(&["("]));
    assert_eq!(first, tokens(&["@", "("]));

    let still_optional = opt_tokens(&["@"]).seq(opt_tokens(&["!"]));
    assert_eq!(still_optional, opt_tokens(&["@", "!"]));
}

#[test]
fn seq_after_optional_into_unknown_is_unknown() {
    let first = opt_tokens(&["@"]).seq(FirstTokens::Unknown);
    assert_eq!(first, FirstTokens::Unknown);
}

#[test]
fn unknown_prefix_hides_the_rest() {
    let first = FirstTokens::Unknown.seq(tokens(&["+"]));
    assert_eq!(first, FirstTokens::Unknown);
}

#[test]
fn merge_unions_hint_sets() {
    let merged = tokens(&["("]).merge(tokens(&["["]));
    assert_eq!(merged, tokens(&["(", "["]));
}

#[test]
fn merge_with_epsilon_is_optional() {
    let merged = tokens(&["("]).merge(FirstTokens::Epsilon);
    assert_eq!(merged, opt_tokens(&["("]));
    assert!(merged.admits_empty());
    assert_eq!(merged.indexable(), None);
}

#[test]
fn merge_with_unknown_is_unknown() {
    assert_eq!(tokens(&["("]).merge(FirstTokens::Unknown), FirstTokens::Unknown);
}

#[test]
fn only_required_tokens_are_indexable() {
    let expected: HintSet = [Hint::token("(")].into_iter().collect();
    assert_eq!(tokens(&["("]).indexable(), Some(&expected));
    assert_eq!(FirstTokens::Unknown.indexable(), None);
    assert_eq!(FirstTokens::Epsilon.indexable(), None);
    assert!(!tokens(&["("]).admits_empty());
    assert!(FirstTokens::Epsilon.admits_empty());
}

#[test]
fn display() {
    let first = FirstTokens::Tokens([Hint::Ident, Hint::token("(")].into_iter().collect());
    insta::assert_snapshot!(first.to_string(), @"{'(', identifier}");
    insta::assert_snapshot!(opt_tokens(&[":"]).to_string(), @"{':'}?");
    insta::assert_snapshot!(FirstTokens::Epsilon.to_string(), @"epsilon");
}
