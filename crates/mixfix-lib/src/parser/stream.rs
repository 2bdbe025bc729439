//! Lazy token stream with checkpoint/restore.
//!
//! Tokens are lexed on demand against the token table passed to each call
//! and cached. Backtracking only moves the cursor over the cache. When the
//! table changes between commands, [`TokenStream::invalidate_after_cursor`]
//! drops the cached lookahead so later input sees the new tokens.

use super::lexer::{LexError, Token, TokenKind, TokenTable, lex_token};

use rowan::TextRange;
use std::rc::Rc;

/// Cursor position. Only meaningful for the stream that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamPos(usize);

impl StreamPos {
    /// Index of the token under the cursor.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    fatal: Option<LexError>,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            fatal: None,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The lexical error that stopped tokenization, if any.
    pub fn fatal_error(&self) -> Option<&LexError> {
        self.fatal.as_ref()
    }

    /// Make sure the cache holds the token at `index` (or ends with `Eof`).
    fn fill(&mut self, index: usize, table: &TokenTable) {
        while self.tokens.len() <= index {
            if self.tokens.last().is_some_and(Token::is_eof) {
                return;
            }
            let offset = self.tokens.last().map_or(0, |t| usize::from(t.range.end()));
            let token = match lex_token(self.source, offset, table) {
                Ok(token) => token,
                Err(err) => {
                    // A synthetic end of input: everything stops, the error
                    // surfaces when the parse finishes.
                    let end = self.source.len() as u32;
                    let eof = Token {
                        kind: TokenKind::Eof,
                        text: Rc::from(""),
                        range: TextRange::empty(end.into()),
                        leading_trivia: Rc::from(""),
                    };
                    self.fatal.get_or_insert(err);
                    eof
                }
            };
            self.tokens.push(token);
        }
    }

    /// Token under the cursor.
    pub fn peek(&mut self, table: &TokenTable) -> &Token {
        self.peek_nth(0, table)
    }

    /// Token `n` positions after the cursor. Saturates at `Eof`.
    pub fn peek_nth(&mut self, n: usize, table: &TokenTable) -> &Token {
        self.fill(self.pos + n, table);
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consume the token under the cursor. `Eof` is never consumed.
    pub fn advance(&mut self, table: &TokenTable) -> Token {
        let token = self.peek(table).clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    pub fn checkpoint(&self) -> StreamPos {
        StreamPos(self.pos)
    }

    /// Move the cursor back (or forward) to a position handed out by `checkpoint`.
    pub fn restore(&mut self, pos: StreamPos) {
        debug_assert!(pos.0 <= self.tokens.len(), "restore past cached tokens");
        self.pos = pos.0;
    }

    /// Drop cached tokens after the cursor; they were lexed with an outdated table.
    pub fn invalidate_after_cursor(&mut self) {
        if self.fatal.is_none() {
            self.tokens.truncate(self.pos);
        }
    }

    /// Range of the token under the cursor, without lexing further than needed.
    pub fn current_range(&mut self, table: &TokenTable) -> TextRange {
        self.peek(table).range
    }

    /// End of the last consumed token (start of input if none).
    pub fn last_end(&self) -> rowan::TextSize {
        self.pos
            .checked_sub(1)
            .map_or(rowan::TextSize::from(0), |i| self.tokens[i].range.end())
    }

    pub fn at_eof(&mut self, table: &TokenTable) -> bool {
        self.peek(table).is_eof()
    }
}
