//! Module-wide compilation state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::declarations::{Declarations, Name};
use crate::diagnostic::Diagnostics;
use crate::ids::DeclRef;
use crate::interner::{Interner, Symbol};
use crate::shape::TypeShape;
use crate::source::{SourceMap, Span};

/// Registered top-level type names.
///
/// Entries are write-once: a name registered twice is a duplicate
/// declaration, and the registry keeps the first.
#[derive(Debug, Default)]
pub struct NameRegistry {
    entries: HashMap<Option<Symbol>, (DeclRef, Span)>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `decl`.
    ///
    /// On a collision nothing changes and the existing entry is returned.
    pub fn register(&mut self, name: Name, decl: DeclRef) -> Result<(), (DeclRef, Span)> {
        match self.entries.get(&name.key()) {
            Some(existing) => Err(*existing),
            None => {
                self.entries.insert(name.key(), (decl, name.span()));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, symbol: Symbol) -> Option<DeclRef> {
        self.entries.get(&Some(symbol)).map(|(decl, _)| *decl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computed shapes keyed by declaration name.
///
/// Populated only for successfully resolved declarations. Write-once.
#[derive(Debug, Default)]
pub struct ResolvedShapes {
    shapes: HashMap<Option<Symbol>, TypeShape>,
}

impl ResolvedShapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a shape. Returns false, leaving the map unchanged, if the
    /// name already has one.
    pub fn insert(&mut self, name: Name, shape: TypeShape) -> bool {
        if self.shapes.contains_key(&name.key()) {
            return false;
        }
        self.shapes.insert(name.key(), shape);
        true
    }

    pub fn get(&self, name: &Name) -> Option<&TypeShape> {
        self.shapes.get(&name.key())
    }

    pub fn get_symbol(&self, symbol: Symbol) -> Option<&TypeShape> {
        self.shapes.get(&Some(symbol))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Everything one module owns.
///
/// The fields are public and disjoint so passes can borrow the tables
/// they read separately from the maps they write.
pub struct ModuleContext {
    /// String interner (shared, thread-safe).
    pub interner: Arc<Interner>,
    /// Source file management.
    pub source_map: SourceMap,
    /// Accumulated diagnostics.
    pub diagnostics: Diagnostics,
    /// Flat declaration tables.
    pub decls: Declarations,
    /// Top-level names.
    pub registry: NameRegistry,
    /// Name → computed shape.
    pub shapes: ResolvedShapes,
    /// Dotted library name from the `library` header, if any.
    pub library_name: Option<String>,
}

impl Default for ModuleContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleContext {
    pub fn new() -> Self {
        Self::with_interner(Arc::new(Interner::new()))
    }

    /// Create with a shared interner.
    pub fn with_interner(interner: Arc<Interner>) -> Self {
        Self {
            interner,
            source_map: SourceMap::new(),
            diagnostics: Diagnostics::new(),
            decls: Declarations::new(),
            registry: NameRegistry::new(),
            shapes: ResolvedShapes::new(),
            library_name: None,
        }
    }

    pub fn intern(&self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    /// The text of a name, or `<anonymous>`.
    pub fn name_str(&self, name: &Name) -> String {
        name_text(&self.interner, name)
    }
}

pub(crate) fn name_text(interner: &Interner, name: &Name) -> String {
    match name.key() {
        Some(symbol) => interner.resolve(symbol).to_string(),
        None => "<anonymous>".to_string(),
    }
}
