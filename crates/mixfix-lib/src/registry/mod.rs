//! Grammar registry: the productions of every syntax category.
//!
//! Each category has a leading and a trailing table, indexed by the hints a
//! production can start with. Productions whose start cannot be predicted go
//! to a per-role catch-all list, and each category may have one fallback
//! trailing production (application) tried only when nothing is registered
//! for the token at hand.
//!
//! The registry is mutated between parses, never during one. Productions are
//! added with [`GrammarRegistry::register`] and live until the end of the
//! session, or until the scope they were registered in is popped.

mod notation;


use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use mixfix_core::{Interner, Prec, Symbol};
use serde::Serialize;

use crate::diagnostics::DiagnosticKind;
use crate::parser::combinators::Parser;
use crate::parser::hints::{FirstTokens, Hint};
use crate::parser::lexer::{Token, TokenTable};

pub use notation::{Assoc, infix, infixl, infixr, postfix, prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Starts a term.
    Leading,
    /// Extends an already parsed term.
    Trailing,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Leading => f.write_str("leading"),
            Role::Trailing => f.write_str("trailing"),
        }
    }
}

/// Which of two equally long matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiePolicy {
    /// The production registered last.
    #[default]
    MostRecent,
    /// The production registered first.
    FirstRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DescriptorId(u32);

impl DescriptorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered production.
#[derive(Debug, Clone)]
pub struct ParserDescriptor {
    id: DescriptorId,
    name: Rc<str>,
    category: Symbol,
    role: Role,
    precedence: Prec,
    lhs_precedence: Prec,
    parser: Parser,
    scope: usize,
    /// Installed as a fallback, never indexed.
    fallback: bool,
}

impl ParserDescriptor {
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Symbol {
        self.category
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Binding level; the production fires only when this is at least the
    /// caller's minimum precedence.
    pub fn precedence(&self) -> Prec {
        self.precedence
    }

    /// Trailing only: minimum precedence of the left operand.
    pub fn lhs_precedence(&self) -> Prec {
        self.lhs_precedence
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn hints(&self) -> &FirstTokens {
        self.parser.first()
    }

    /// Scope depth the production was registered at.
    pub fn scope(&self) -> usize {
        self.scope
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Can this production fire under `min_prec` after a left operand of `lhs_prec`?
    pub fn admits(&self, min_prec: Prec, lhs_prec: Option<Prec>) -> bool {
        self.precedence >= min_prec && lhs_prec.is_none_or(|lhs| lhs >= self.lhs_precedence)
    }
}

/// A production waiting to be registered.
#[derive(Debug, Clone)]
pub struct Production {
    category: String,
    role: Role,
    name: Option<String>,
    precedence: Prec,
    lhs_precedence: Prec,
    parser: Parser,
}

impl Production {
    /// Production starting a term. Atomic (`Prec::MAX`) unless told otherwise.
    pub fn leading(category: &str, parser: Parser) -> Self {
        Self {
            category: category.to_string(),
            role: Role::Leading,
            name: None,
            precedence: Prec::MAX,
            lhs_precedence: Prec::ZERO,
            parser,
        }
    }

    /// Production extending a term; its parser reads the operand with `lhs()`.
    pub fn trailing(category: &str, parser: Parser) -> Self {
        Self {
            category: category.to_string(),
            role: Role::Trailing,
            name: None,
            precedence: Prec::MAX,
            lhs_precedence: Prec::ZERO,
            parser,
        }
    }

    pub fn precedence(mut self, prec: Prec) -> Self {
        self.precedence = prec;
        self
    }

    pub fn lhs_precedence(mut self, prec: Prec) -> Self {
        self.lhs_precedence = prec;
        self
    }

    /// Name used in traces and warnings. Defaults to the parser's label.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The production could succeed without consuming a token; as a
    /// trailing production it would loop forever.
    #[error("trailing production `{0}` may start without consuming a token")]
    NonProgressingTrailing(String),
}

/// Something worth telling the grammar author, found while registering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationWarning {
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
struct CategoryTables {
    leading: IndexMap<Hint, Vec<DescriptorId>>,
    trailing: IndexMap<Hint, Vec<DescriptorId>>,
    leading_any: Vec<DescriptorId>,
    trailing_any: Vec<DescriptorId>,
    fallback_trailing: Option<DescriptorId>,
}

impl CategoryTables {
    fn table(&self, role: Role) -> &IndexMap<Hint, Vec<DescriptorId>> {
        match role {
            Role::Leading => &self.leading,
            Role::Trailing => &self.trailing,
        }
    }

    fn catch_all(&self, role: Role) -> &[DescriptorId] {
        match role {
            Role::Leading => &self.leading_any,
            Role::Trailing => &self.trailing_any,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScopeMark {
    descriptors: usize,
    tokens: usize,
}

/// Productions of all categories, with the token table they need.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    categories: Interner,
    tables: Vec<CategoryTables>,
    descriptors: Vec<ParserDescriptor>,
    tokens: TokenTable,
    tie_policy: TiePolicy,
    scopes: Vec<ScopeMark>,
    /// Fallbacks replaced inside a scope, restored when it closes.
    shadowed_fallbacks: Vec<(usize, Symbol, Option<DescriptorId>)>,
    warnings: Vec<RegistrationWarning>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    pub fn set_tie_policy(&mut self, policy: TiePolicy) {
        self.tie_policy = policy;
    }

    /// Declare a category (idempotent).
    pub fn declare_category(&mut self, name: &str) -> Symbol {
        let sym = self.categories.intern(name);
        if self.tables.len() <= sym.index() {
            self.tables.resize_with(sym.index() + 1, Default::default);
        }
        sym
    }

    pub fn category(&self, name: &str) -> Option<Symbol> {
        self.categories.get(name)
    }

    pub fn category_name(&self, sym: Symbol) -> &str {
        self.categories.resolve(sym)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(_, name)| name)
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Declare a token without registering a production for it.
    pub fn declare_token(&mut self, token: &str) -> bool {
        self.tokens.declare(token)
    }

    pub fn descriptor(&self, id: DescriptorId) -> &ParserDescriptor {
        &self.descriptors[id.index()]
    }

    pub fn descriptors(&self) -> &[ParserDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Register a production: declare its tokens and index it under its hints.
    pub fn register(&mut self, production: Production) -> Result<DescriptorId, RegistrationError> {
        let id = self.add_descriptor(production)?;
        self.index(id);
        Ok(id)
    }

    /// Install the trailing production tried when no trailing production is
    /// registered for the token after a term (application).
    pub fn set_fallback_trailing(
        &mut self,
        production: Production,
    ) -> Result<DescriptorId, RegistrationError> {
        let production = Production {
            role: Role::Trailing,
            ..production
        };
        let id = self.add_descriptor(production)?;
        self.descriptors[id.index()].fallback = true;
        let category = self.descriptors[id.index()].category;
        let tables = &mut self.tables[category.index()];
        let previous = tables.fallback_trailing.replace(id);
        if !self.scopes.is_empty() {
            self.shadowed_fallbacks
                .push((self.scopes.len(), category, previous));
        }
        Ok(id)
    }

    pub fn fallback_trailing(&self, category: Symbol) -> Option<&ParserDescriptor> {
        self.tables
            .get(category.index())?
            .fallback_trailing
            .map(|id| self.descriptor(id))
    }

    fn add_descriptor(&mut self, production: Production) -> Result<DescriptorId, RegistrationError> {
        let name: Rc<str> = Rc::from(
            production
                .name
                .as_deref()
                .unwrap_or(production.parser.label()),
        );
        if production.role == Role::Trailing && production.parser.first().admits_empty() {
            return Err(RegistrationError::NonProgressingTrailing(name.to_string()));
        }

        let category = self.declare_category(&production.category);
        for token in production.parser.tokens() {
            self.tokens.declare(token);
        }

        let id = DescriptorId(self.descriptors.len() as u32);
        self.descriptors.push(ParserDescriptor {
            id,
            name,
            category,
            role: production.role,
            precedence: production.precedence,
            lhs_precedence: production.lhs_precedence,
            parser: production.parser,
            scope: self.scopes.len(),
            fallback: false,
        });
        Ok(id)
    }

    fn index(&mut self, id: DescriptorId) {
        let descriptor = &self.descriptors[id.index()];
        let (category, role) = (descriptor.category, descriptor.role);
        let hints = descriptor.hints().indexable().cloned();

        let Some(hints) = hints else {
            let tables = &mut self.tables[category.index()];
            match role {
                Role::Leading => tables.leading_any.push(id),
                Role::Trailing => tables.trailing_any.push(id),
            }
            return;
        };

        for hint in hints {
            self.check_overlap(id, &hint);
            let tables = &mut self.tables[category.index()];
            let table = match role {
                Role::Leading => &mut tables.leading,
                Role::Trailing => &mut tables.trailing,
            };
            table.entry(hint).or_default().push(id);
        }
    }

    /// Warn when an existing production shares a hint and precedence with `id`.
    fn check_overlap(&mut self, id: DescriptorId, hint: &Hint) {
        let descriptor = &self.descriptors[id.index()];
        let tables = &self.tables[descriptor.category.index()];
        let Some(existing) = tables.table(descriptor.role).get(hint) else {
            return;
        };
        let winner = match self.tie_policy {
            TiePolicy::MostRecent => "the later one",
            TiePolicy::FirstRegistered => "the earlier one",
        };
        let overlapping = existing
            .iter()
            .map(|&other| &self.descriptors[other.index()])
            .filter(|other| other.precedence == descriptor.precedence);
        let messages: Vec<String> = overlapping
            .map(|other| {
                format!(
                    "`{}` overlaps `{}` on {} at precedence {}; {} wins equal-length matches",
                    descriptor.name, other.name, hint, descriptor.precedence, winner
                )
            })
            .collect();
        self.warnings
            .extend(messages.into_iter().map(|message| RegistrationWarning {
                kind: DiagnosticKind::AmbiguousRegistration,
                message,
            }));
    }

    /// Queue a warning for the command being processed, e.g. a declaration
    /// that could not be turned into a production.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.warnings.push(RegistrationWarning {
            kind,
            message: message.into(),
        });
    }

    /// Drain warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<RegistrationWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Candidates for `token`, in the order the resolver should try them.
    ///
    /// Indexed productions when any are registered for the token, otherwise
    /// the catch-all list. The fallback trailing production is not included.
    pub fn lookup(&self, category: Symbol, role: Role, token: &Token) -> Vec<&ParserDescriptor> {
        let Some(tables) = self.tables.get(category.index()) else {
            return Vec::new();
        };
        let indexed = Hint::of(token).and_then(|hint| tables.table(role).get(&hint));
        let ids: &[DescriptorId] = match indexed {
            Some(ids) if !ids.is_empty() => ids,
            _ => tables.catch_all(role),
        };
        let mut found: Vec<&ParserDescriptor> = ids.iter().map(|&id| self.descriptor(id)).collect();
        if self.tie_policy == TiePolicy::MostRecent {
            found.reverse();
        }
        found
    }

    /// Like [`lookup`](Self::lookup), by category name.
    pub fn lookup_by_name(&self, category: &str, role: Role, token: &Token) -> Vec<&ParserDescriptor> {
        self.category(category)
            .map(|sym| self.lookup(sym, role, token))
            .unwrap_or_default()
    }

    /// Open a scope: everything registered until the matching
    /// [`pop_scope`](Self::pop_scope) is dropped by it.
    pub fn push_scope(&mut self) {
        self.scopes.push(ScopeMark {
            descriptors: self.descriptors.len(),
            tokens: self.tokens.len(),
        });
    }

    /// Close the innermost scope. Returns `false` if none is open.
    pub fn pop_scope(&mut self) -> bool {
        let Some(mark) = self.scopes.pop() else {
            return false;
        };
        let depth = self.scopes.len() + 1;
        while let Some(&(scope, category, previous)) = self.shadowed_fallbacks.last() {
            if scope < depth {
                break;
            }
            self.tables[category.index()].fallback_trailing = previous;
            self.shadowed_fallbacks.pop();
        }

        self.descriptors.truncate(mark.descriptors);
        self.tokens.truncate(mark.tokens);
        self.reindex();
        true
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    fn reindex(&mut self) {
        for tables in &mut self.tables {
            let fallback = tables.fallback_trailing;
            *tables = CategoryTables {
                fallback_trailing: fallback,
                ..Default::default()
            };
        }
        let warnings = std::mem::take(&mut self.warnings);
        for index in 0..self.descriptors.len() {
            if self.descriptors[index].fallback {
                continue;
            }
            self.index(DescriptorId(index as u32));
        }
        // Re-indexing re-discovers old overlaps; they were reported already.
        self.warnings = warnings;
    }
}
