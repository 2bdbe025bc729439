//! Static first-token analysis.
//!
//! Every [`Parser`](super::combinators::Parser) carries a [`FirstTokens`]
//! value describing how it can start. Sequencing and choice compose them, so a
//! production's hint set is known when it is built, and the registry can index
//! it under those tokens instead of trying it everywhere.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use super::lexer::{Token, TokenKind};

/// Something a production can start with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hint {
    /// A declared token (keyword or punctuation).
    Token(Rc<str>),
    Ident,
    Number,
    Str,
}

impl Hint {
    pub fn token(text: &str) -> Self {
        Self::Token(Rc::from(text))
    }

    /// The dispatch key for a lexed token. `Eof` starts nothing.
    pub fn of(token: &Token) -> Option<Self> {
        match token.kind {
            TokenKind::Symbol => Some(Self::Token(token.text.clone())),
            TokenKind::Ident => Some(Self::Ident),
            TokenKind::Number => Some(Self::Number),
            TokenKind::Str => Some(Self::Str),
            TokenKind::Eof => None,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(text) => write!(f, "'{text}'"),
            Self::Ident => f.write_str("identifier"),
            Self::Number => f.write_str("number"),
            Self::Str => f.write_str("string literal"),
        }
    }
}

pub type HintSet = BTreeSet<Hint>;

/// How a parser can start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstTokens {
    /// Consumes nothing.
    Epsilon,
    /// Cannot be predicted (a category reference, a custom parser).
    Unknown,
    /// Must start with one of these.
    Tokens(HintSet),
    /// Starts with one of these, or consumes nothing.
    OptTokens(HintSet),
}

impl FirstTokens {
    pub fn single(hint: Hint) -> Self {
        Self::Tokens(HintSet::from([hint]))
    }

    /// `self` followed by `next`.
    pub fn seq(self, next: FirstTokens) -> FirstTokens {
        match self {
            Self::Epsilon => next,
            Self::Unknown | Self::Tokens(_) => self,
            Self::OptTokens(mut hints) => match next {
                Self::Epsilon => Self::OptTokens(hints),
                Self::Unknown => Self::Unknown,
                Self::Tokens(more) => {
                    hints.extend(more);
                    Self::Tokens(hints)
                }
                Self::OptTokens(more) => {
                    hints.extend(more);
                    Self::OptTokens(hints)
                }
            },
        }
    }

    /// Either `self` or `other`.
    pub fn merge(self, other: FirstTokens) -> FirstTokens {
        match (self, other) {
            (Self::Epsilon, Self::Epsilon) => Self::Epsilon,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::Epsilon, Self::Tokens(hints))
            | (Self::Tokens(hints), Self::Epsilon)
            | (Self::Epsilon, Self::OptTokens(hints))
            | (Self::OptTokens(hints), Self::Epsilon) => Self::OptTokens(hints),
            (Self::Tokens(mut a), Self::Tokens(b)) => {
                a.extend(b);
                Self::Tokens(a)
            }
            (Self::Tokens(mut a) | Self::OptTokens(mut a), Self::Tokens(b) | Self::OptTokens(b)) => {
                a.extend(b);
                Self::OptTokens(a)
            }
        }
    }

    /// The parser may now also consume nothing.
    pub fn to_optional(self) -> FirstTokens {
        match self {
            Self::Tokens(hints) => Self::OptTokens(hints),
            other => other,
        }
    }

    /// Hints usable for indexing: only when a token is required.
    pub fn indexable(&self) -> Option<&HintSet> {
        match self {
            Self::Tokens(hints) => Some(hints),
            _ => None,
        }
    }

    /// Can the parser succeed without consuming anything?
    pub fn admits_empty(&self) -> bool {
        matches!(self, Self::Epsilon | Self::OptTokens(_))
    }
}

impl fmt::Display for FirstTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |hints: &HintSet| {
            hints
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Self::Epsilon => f.write_str("epsilon"),
            Self::Unknown => f.write_str("unknown"),
            Self::Tokens(hints) => write!(f, "{{{}}}", list(hints)),
            Self::OptTokens(hints) => write!(f, "{{{}}}?", list(hints)),
        }
    }
}
