//! Declarative productions.
//!
//! A [`NodeBuilder`] lists the components of a production in order: literal
//! tokens, named fields and unnamed sub-parsers. [`NodeBuilder::build`]
//! compiles it into a [`Parser`] that parses the components in sequence and
//! assembles a node of the given kind, and computes the production's hints
//! by sequencing the components' [`FirstTokens`].
//!
//! ```
//! use mixfix_lib::{NodeBuilder, Prec};
//! use mixfix_lib::parser::combinators::category;
//!
//! let paren = NodeBuilder::new("paren")
//!     .token("(")
//!     .field("term", category("term", Prec::ZERO))
//!     .token(")")
//!     .build();
//! assert_eq!(paren.first().to_string(), "{'('}");
//! ```
//!
//! Literal tokens stay in the node (unnamed), so the tree still covers every
//! token of the source.

use std::rc::Rc;

use super::combinators::{Parser, collect_tokens, longest_match, symbol};
use super::cst::{NodeKind, SyntaxNode};
use super::hints::FirstTokens;

#[derive(Debug, Clone)]
struct Component {
    name: Option<Rc<str>>,
    parser: Parser,
}

#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    components: Vec<Component>,
}

impl NodeBuilder {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: NodeKind::new(kind),
            components: Vec::new(),
        }
    }

    /// A literal token, kept in the node without a field name.
    pub fn token(self, text: &str) -> Self {
        self.parser(symbol(text))
    }

    /// A named component.
    pub fn field(mut self, name: &str, parser: Parser) -> Self {
        self.components.push(Component {
            name: Some(Rc::from(name)),
            parser,
        });
        self
    }

    /// An unnamed component.
    pub fn parser(mut self, parser: Parser) -> Self {
        self.components.push(Component { name: None, parser });
        self
    }

    /// How the production can start: the components in sequence, stopping at
    /// the first one that must consume a token.
    pub fn hints(&self) -> FirstTokens {
        self.components
            .iter()
            .fold(FirstTokens::Epsilon, |acc, c| acc.seq(c.parser.first().clone()))
    }

    pub fn build(self) -> Parser {
        let first = self.hints();
        let tokens = collect_tokens(self.components.iter().map(|c| &c.parser));
        let NodeBuilder { kind, components } = self;
        let label = kind.as_str().to_string();

        Parser::new(&label, first, tokens, move |state| {
            state.enter_recursion()?;
            let start = state.pos();
            let mut fields = Vec::with_capacity(components.len());

            for (i, component) in components.iter().enumerate() {
                match component.parser.parse(state) {
                    Ok(node) => fields.push((component.name.clone(), node)),
                    Err(mut failure) => {
                        state.exit_recursion();
                        if state.pos() == start {
                            return Err(failure);
                        }
                        // Committed: keep what was built, mark the rest missing.
                        fields.push((component.name.clone(), failure.take_partial_or_missing()));
                        let offset = failure.range().start();
                        for rest in &components[i + 1..] {
                            let missing = SyntaxNode::missing(offset, rest.parser.label());
                            fields.push((rest.name.clone(), missing));
                        }
                        let partial = SyntaxNode::node(kind.clone(), fields);
                        return Err(failure.with_partial(partial));
                    }
                }
            }

            state.exit_recursion();
            Ok(SyntaxNode::node(kind.clone(), fields))
        })
    }
}

/// Alternative shapes of one production, resolved by longest match.
///
/// The hints are the union of the alternatives' hints.
pub fn node_choice(label: &str, alternatives: Vec<NodeBuilder>) -> Parser {
    let parsers: Vec<Parser> = alternatives.into_iter().map(NodeBuilder::build).collect();
    longest_match(parsers).with_label(label)
}
