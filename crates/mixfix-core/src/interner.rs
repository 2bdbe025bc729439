//! Names as small integers.
//!
//! The registry refers to syntax categories (`term`, `command`, ...) by
//! [`Symbol`] and keeps one table per category, indexed by the symbol.

use indexmap::IndexSet;

/// Handle to an interned name. Symbols of one interner are dense: the n-th
/// distinct name gets index n, so they double as table indices.
///
/// Ordering follows interning order, not the names.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Position in the interner, for indexing per-name tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating name table.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol for `name`, adding it on first use.
    pub fn intern(&mut self, name: &str) -> Symbol {
        match self.get(name) {
            Some(sym) => sym,
            None => Symbol(self.names.insert_full(name.into()).0 as u32),
        }
    }

    /// Symbol for `name` if it was interned before.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.names.get_index_of(name).map(|i| Symbol(i as u32))
    }

    /// Name of a symbol from this interner.
    ///
    /// # Panics
    /// If `sym` came from another interner and is out of range here.
    pub fn resolve(&self, sym: Symbol) -> &str {
        match self.try_resolve(sym) {
            Some(name) => name,
            None => panic!("symbol {} not owned by this interner", sym.0),
        }
    }

    pub fn try_resolve(&self, sym: Symbol) -> Option<&str> {
        self.names.get_index(sym.index()).map(|name| &**name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names with their symbols, in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (Symbol(i as u32), &**name))
    }
}
