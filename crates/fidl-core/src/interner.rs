//! String interner for identifiers.
//!
//! Every declaration, member and parameter name goes through the
//! [`Interner`] once during consumption. Afterwards names are compared
//! and hashed as [`Symbol`]s, which is what the uniqueness scopes and
//! the global type registry key on.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An interned identifier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Table {
    map: HashMap<Arc<str>, Symbol>,
    strings: Vec<Arc<str>>,
}

/// A thread-safe string interner.
///
/// Shared between modules through an `Arc` so symbols stay comparable
/// across them.
#[derive(Debug, Default)]
pub struct Interner {
    table: Mutex<Table>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its [`Symbol`].
    pub fn intern(&self, text: &str) -> Symbol {
        let mut table = self.table.lock();

        if let Some(&symbol) = table.map.get(text) {
            return symbol;
        }

        let symbol = Symbol(table.strings.len() as u32);
        let text: Arc<str> = Arc::from(text);
        table.strings.push(text.clone());
        table.map.insert(text, symbol);
        symbol
    }

    /// Look up a string without interning it.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.table.lock().map.get(text).copied()
    }

    /// Get the text of a symbol.
    pub fn resolve(&self, symbol: Symbol) -> Arc<str> {
        self.table.lock().strings[symbol.index()].clone()
    }

    pub fn len(&self) -> usize {
        self.table.lock().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
