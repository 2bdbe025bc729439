//! Syntax tree produced by every parse.
//!
//! Trees are immutable and cheap to clone: interior nodes are reference
//! counted, atoms share their text with the token that produced them.
//!
//! Shape rules:
//! - a node's field layout is fixed by its kind; absent optional parts are an
//!   empty `null` group in their slot, never a hole
//! - `optional`/`many`/`sep_by` results are `null` groups whose children are
//!   the items (separators included, as atoms)
//! - `Missing` marks where a production that could not complete stopped

use std::fmt::{self, Write};
use std::rc::Rc;

use rowan::{TextRange, TextSize};
use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq};

use super::lexer::{Token, TokenKind};

/// Kind of an interior node: `lambda`, `app`, `null`, ...
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeKind(Rc<str>);

impl NodeKind {
    pub const NULL: &'static str = "null";

    pub fn new(kind: &str) -> Self {
        Self(Rc::from(kind))
    }

    pub fn null() -> Self {
        Self::new(Self::NULL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        &*self.0 == Self::NULL
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One slot of a node: the field name (literals have none) and its value.
pub type Field = (Option<Rc<str>>, SyntaxNode);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Atom(Token),
    Node(Rc<NodeData>),
    /// Placeholder where parsing failed: the offset it failed at and what was expected.
    Missing { offset: TextSize, expected: Rc<str> },
}

impl SyntaxNode {
    pub fn node(kind: NodeKind, fields: Vec<Field>) -> Self {
        Self::Node(Rc::new(NodeData { kind, fields }))
    }

    /// Unnamed group of items (`optional`, `many`, `sep_by`).
    pub fn group(items: Vec<SyntaxNode>) -> Self {
        Self::node(
            NodeKind::null(),
            items.into_iter().map(|item| (None, item)).collect(),
        )
    }

    /// Empty group: an absent optional part.
    pub fn empty() -> Self {
        Self::group(Vec::new())
    }

    pub fn missing(offset: TextSize, expected: impl Into<Rc<str>>) -> Self {
        Self::Missing {
            offset,
            expected: expected.into(),
        }
    }

    pub fn kind(&self) -> Option<&NodeKind> {
        match self {
            Self::Node(data) => Some(&data.kind),
            _ => None,
        }
    }

    /// Is this a node of the given kind?
    pub fn is(&self, kind: &str) -> bool {
        self.kind().is_some_and(|k| k.as_str() == kind)
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Atom(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// True for an empty `null` group (an absent optional part).
    pub fn is_empty_group(&self) -> bool {
        match self {
            Self::Node(data) => data.kind.is_null() && data.fields.is_empty(),
            _ => false,
        }
    }

    /// Does any `Missing` occur in this subtree?
    pub fn has_missing(&self) -> bool {
        match self {
            Self::Atom(_) => false,
            Self::Missing { .. } => true,
            Self::Node(data) => data.fields.iter().any(|(_, child)| child.has_missing()),
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Node(data) => &data.fields,
            _ => &[],
        }
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&SyntaxNode> {
        self.fields()
            .iter()
            .find(|(field, _)| field.as_deref() == Some(name))
            .map(|(_, child)| child)
    }

    pub fn children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.fields().iter().map(|(_, child)| child)
    }

    /// All tokens of the subtree, in source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Self::Atom(token) => out.push(token),
            Self::Missing { .. } => {}
            Self::Node(data) => {
                for (_, child) in &data.fields {
                    child.collect_tokens(out);
                }
            }
        }
    }

    /// Range from the first to the last token, trivia excluded.
    ///
    /// `None` for subtrees without tokens, except `Missing`, which has an empty
    /// range at its offset.
    pub fn text_range(&self) -> Option<TextRange> {
        if let Self::Missing { offset, .. } = self {
            return Some(TextRange::empty(*offset));
        }
        let tokens = self.tokens();
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(TextRange::new(first.range.start(), last.range.end()))
    }

    /// Re-emit the covered source: every token with its leading trivia.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for token in self.tokens() {
            out.push_str(&token.leading_trivia);
            out.push_str(&token.text);
        }
        out
    }

    /// Indented rendering for tests and debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, None, 0)
            .expect("String write never fails");
        out
    }

    fn dump_into(&self, w: &mut String, name: Option<&str>, indent: usize) -> fmt::Result {
        write!(w, "{:width$}", "", width = indent * 2)?;
        if let Some(name) = name {
            write!(w, "{name}: ")?;
        }
        match self {
            Self::Atom(token) => writeln!(w, "{:?} {:?}", token.kind, &*token.text),
            Self::Missing { expected, .. } => writeln!(w, "<missing {expected}>"),
            Self::Node(data) => {
                writeln!(w, "{}", data.kind)?;
                for (field, child) in &data.fields {
                    child.dump_into(w, field.as_deref(), indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl Serialize for SyntaxNode {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Atom(token) => {
                let mut map = s.serialize_map(Some(3))?;
                map.serialize_entry("token", &token.kind)?;
                map.serialize_entry("text", &*token.text)?;
                map.serialize_entry(
                    "range",
                    &[u32::from(token.range.start()), u32::from(token.range.end())],
                )?;
                map.end()
            }
            Self::Missing { offset, expected } => {
                let mut map = s.serialize_map(Some(2))?;
                map.serialize_entry("missing", &**expected)?;
                map.serialize_entry("offset", &u32::from(*offset))?;
                map.end()
            }
            Self::Node(data) => {
                let mut map = s.serialize_map(Some(2))?;
                map.serialize_entry("kind", &data.kind)?;
                map.serialize_entry("fields", &FieldsSer(&data.fields))?;
                map.end()
            }
        }
    }
}

struct FieldsSer<'a>(&'a [Field]);

impl Serialize for FieldsSer<'_> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(self.0.len()))?;
        for (name, child) in self.0 {
            seq.serialize_element(&(name.as_deref(), child))?;
        }
        seq.end()
    }
}

impl From<Token> for SyntaxNode {
    fn from(token: Token) -> Self {
        debug_assert!(token.kind != TokenKind::Eof, "end of input is never an atom");
        Self::Atom(token)
    }
}
