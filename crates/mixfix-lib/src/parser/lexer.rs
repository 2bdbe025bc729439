//! Lexer for extensible grammars.
//!
//! Logos recognizes the fixed lexical classes (identifiers, numbers, strings,
//! trivia). Everything else is punctuation, and punctuation is split against
//! the session's [`TokenTable`] by maximal munch, so declaring `->` or `#check`
//! changes how later input is tokenized.
//!
//! ## Error handling
//!
//! Unterminated strings and block comments are fatal [`LexError`]s. Undeclared
//! punctuation is not an error here: it becomes a one-character `Symbol` token
//! and the parser reports it.

use std::rc::Rc;

use indexmap::IndexSet;
use logos::Logos;
use rowan::{TextRange, TextSize};
use serde::Serialize;

/// Raw lexical classes recognized by logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
enum RawKind {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"--[^\n]*", allow_greedy = true)]
    LineComment,

    /// `/- ... -/`, nesting allowed.
    #[token("/-", block_comment)]
    BlockComment,

    #[token("\"", string_literal)]
    Str,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    #[regex(r"0x[0-9a-fA-F]+")]
    Number,

    /// Dotted names are one identifier: `Nat.succ`.
    #[regex(r"[a-zA-Z_α-κμ-ω][a-zA-Z0-9_'α-κμ-ω]*(\.[a-zA-Z_α-κμ-ω][a-zA-Z0-9_'α-κμ-ω]*)*")]
    Ident,

    /// A single character; the token table extends it.
    #[regex(r#"[^ \t\r\na-zA-Z0-9_"]"#, priority = 0)]
    Punct,
}

impl RawKind {
    fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::LineComment | Self::BlockComment)
    }
}

fn block_comment(lex: &mut logos::Lexer<'_, RawKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut depth = 1usize;
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match (c, chars.peek().map(|&(_, n)| n)) {
            ('/', Some('-')) => {
                depth += 1;
                chars.next();
            }
            ('-', Some('/')) => {
                depth -= 1;
                chars.next();
                if depth == 0 {
                    lex.bump(i + 2);
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedComment)
}

fn string_literal(lex: &mut logos::Lexer<'_, RawKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedString)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum LexErrorKind {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Fatal lexical error: the whole parse is aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {}..{}", u32::from(.range.start()), u32::from(.range.end()))]
pub struct LexError {
    pub kind: LexErrorKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    /// A declared token: keyword or punctuation.
    Symbol,
    Eof,
}

/// A token with its text and the trivia in front of it.
///
/// Text is owned (shared) so trees outlive the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Rc<str>,
    pub range: TextRange,
    /// Whitespace and comments between the previous token and this one.
    pub leading_trivia: Rc<str>,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Range covered by the leading trivia.
    pub fn trivia_range(&self) -> TextRange {
        let len = TextSize::of(&*self.leading_trivia);
        TextRange::new(self.range.start() - len, self.range.start())
    }

    /// How the token is named in "unexpected ..." messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Ident => format!("identifier '{}'", self.text),
            _ => format!("token '{}'", self.text),
        }
    }
}

/// Declared tokens of a session, matched by maximal munch.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: IndexSet<Box<str>>,
    max_chars: usize,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a token. Returns `false` if it was already declared.
    pub fn declare(&mut self, token: &str) -> bool {
        if token.is_empty() || self.tokens.contains(token) {
            return false;
        }
        self.max_chars = self.max_chars.max(token.chars().count());
        self.tokens.insert(token.into());
        true
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Forget tokens declared after the first `len` (closing a scope).
    pub fn truncate(&mut self, len: usize) {
        self.tokens.truncate(len);
        self.max_chars = self.tokens.iter().map(|t| t.chars().count()).max().unwrap_or(0);
    }

    /// Byte length of the longest declared token that prefixes `text`.
    pub fn longest_prefix(&self, text: &str) -> Option<usize> {
        let ends: Vec<usize> = text
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .take(self.max_chars)
            .collect();
        ends.into_iter()
            .rev()
            .find(|&end| self.tokens.contains(&text[..end]))
    }
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}

/// Lex the next token starting at byte `offset`, attaching the trivia before it.
///
/// At end of input returns an `Eof` token carrying the trailing trivia.
pub fn lex_token(source: &str, offset: usize, table: &TokenTable) -> Result<Token, LexError> {
    let rest = &source[offset..];
    let mut lexer = RawKind::lexer(rest);

    loop {
        let Some(raw) = lexer.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: Rc::from(""),
                range: text_range(source.len(), source.len()),
                leading_trivia: Rc::from(rest),
            });
        };
        let span = lexer.span();
        let raw = match raw {
            Ok(raw) => raw,
            Err(kind) => {
                return Err(LexError {
                    kind,
                    range: text_range(offset + span.start, offset + span.end),
                });
            }
        };
        if raw.is_trivia() {
            continue;
        }

        let (kind, len) = match raw {
            RawKind::Ident if table.contains(&rest[span.clone()]) => (TokenKind::Symbol, span.len()),
            RawKind::Ident => (TokenKind::Ident, span.len()),
            RawKind::Number => (TokenKind::Number, span.len()),
            RawKind::Str => (TokenKind::Str, span.len()),
            _ => {
                let len = table
                    .longest_prefix(&rest[span.start..])
                    .unwrap_or(span.len());
                (TokenKind::Symbol, len)
            }
        };

        let start = offset + span.start;
        return Ok(Token {
            kind,
            text: Rc::from(&source[start..start + len]),
            range: text_range(start, start + len),
            leading_trivia: Rc::from(&rest[..span.start]),
        });
    }
}

/// Tokenize a whole source against a fixed table. Stops at the first lexical error.
pub fn lex(source: &str, table: &TokenTable) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    loop {
        let token = lex_token(source, offset, table)?;
        offset = usize::from(token.range.end());
        let eof = token.is_eof();
        tokens.push(token);
        if eof {
            return Ok(tokens);
        }
    }
}
