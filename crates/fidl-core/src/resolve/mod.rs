//! Second pass: resolve names and compute shapes.
//!
//! The resolver walks the declaration tables in category order and
//! computes a [`TypeShape`] for every const, enum, struct and union.
//! Identifier types are resolved on demand, so a struct may refer to a
//! struct declared after it. A declaration that needs its own shape
//! while that shape is being computed is rejected as recursive, unless
//! a vector lies somewhere on the path back to it. Vector elements live
//! out of line, so such a cycle has a finite inline shape and the vector
//! records a [`Payload::Recursive`](crate::shape::Payload) element.
//!
//! The pass aborts on the first error.

mod constant;
mod decls;
mod error;
mod types;

pub use constant::ConstValue;
pub use error::{ResolveError, ScopeKind};

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::{debug, trace};

use crate::context::{name_text, ModuleContext, NameRegistry, ResolvedShapes};
use crate::declarations::{Declarations, Name};
use crate::ids::{ConstId, DeclKind, DeclRef};
use crate::interner::Interner;
use crate::scope::Scope;
use crate::shape::{TypeShape, HANDLE};
use crate::syntax::ast::CompoundIdentifier;

/// Resolve every declaration consumed into `ctx`.
pub fn resolve_module(ctx: &mut ModuleContext) -> Result<(), ResolveError> {
    let ModuleContext {
        interner,
        decls,
        registry,
        shapes,
        ..
    } = ctx;
    Resolver::new(interner, decls, registry, shapes).run()
}

/// A declaration whose shape is being computed.
#[derive(Debug, Clone, Copy)]
struct Frame {
    decl: DeclRef,
    /// Reached through a vector element of the frame below.
    out_of_line: bool,
}

pub struct Resolver<'a> {
    interner: &'a Interner,
    decls: &'a Declarations,
    registry: &'a NameRegistry,
    shapes: &'a mut ResolvedShapes,
    /// Declarations whose shape is currently being computed.
    in_progress: Vec<Frame>,
    /// Vector element types entered within the innermost frame.
    out_of_line: usize,
    /// Frame index a cycle is unwinding to. Set only while a
    /// `RecursiveType` error travels back to the vector that breaks it.
    deferred: Option<usize>,
    /// Declarations already resolved, interfaces included.
    resolved: HashSet<DeclRef>,
    /// Checked values of const declarations.
    const_values: HashMap<ConstId, ConstValue>,
    /// Consts whose value is currently being evaluated.
    evaluating: Vec<ConstId>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        interner: &'a Interner,
        decls: &'a Declarations,
        registry: &'a NameRegistry,
        shapes: &'a mut ResolvedShapes,
    ) -> Self {
        Self {
            interner,
            decls,
            registry,
            shapes,
            in_progress: Vec::new(),
            out_of_line: 0,
            deferred: None,
            resolved: HashSet::new(),
            const_values: HashMap::new(),
            evaluating: Vec::new(),
        }
    }

    /// Resolve all tables in category order.
    pub fn run(&mut self) -> Result<(), ResolveError> {
        let decls = self.decls;
        for kind in DeclKind::ALL {
            let refs: Vec<DeclRef> = match kind {
                DeclKind::Const => decls.consts.indices().map(DeclRef::Const).collect(),
                DeclKind::Enum => decls.enums.indices().map(DeclRef::Enum).collect(),
                DeclKind::Interface => decls.interfaces.indices().map(DeclRef::Interface).collect(),
                DeclKind::Struct => decls.structs.indices().map(DeclRef::Struct).collect(),
                DeclKind::Union => decls.unions.indices().map(DeclRef::Union).collect(),
            };
            trace!(%kind, count = refs.len(), "resolving declarations");
            for decl in refs {
                self.declaration_shape(decl)?;
            }
        }
        Ok(())
    }

    /// The shape of a declaration, resolving it first if needed.
    ///
    /// Interfaces resolve to the shape of a reference to them and never
    /// enter the resolved map.
    pub(crate) fn declaration_shape(&mut self, decl: DeclRef) -> Result<TypeShape, ResolveError> {
        let name = self.decls.name_of(decl);

        if self.resolved.contains(&decl) {
            return Ok(match decl {
                DeclRef::Interface(_) => HANDLE,
                _ => self.shapes.get(&name).cloned().unwrap_or_default(),
            });
        }
        if let Some(index) = self.in_progress.iter().position(|frame| frame.decl == decl) {
            return Err(self.cycle(index, &name));
        }

        self.in_progress.push(Frame {
            decl,
            out_of_line: self.out_of_line > 0,
        });
        let depth = std::mem::take(&mut self.out_of_line);
        let result = match decl {
            DeclRef::Const(id) => self.const_decl(id),
            DeclRef::Enum(id) => self.enum_decl(id),
            DeclRef::Interface(id) => self.interface_decl(id).map(|()| HANDLE),
            DeclRef::Struct(id) => self.struct_decl(id),
            DeclRef::Union(id) => self.union_decl(id),
        };
        self.out_of_line = depth;
        self.in_progress.pop();
        let shape = result?;

        if !matches!(decl, DeclRef::Interface(_)) {
            if !self.shapes.insert(name, shape.clone()) {
                return Err(ResolveError::AlreadyResolved {
                    name: self.name_str(&name),
                    span: name.span(),
                });
            }
            debug!(
                name = %self.name_str(&name),
                size = shape.size,
                alignment = shape.alignment,
                allocations = shape.allocations.len(),
                "resolved shape"
            );
        }
        self.resolved.insert(decl);
        Ok(shape)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// A reference back to the in-progress frame at `index`.
    ///
    /// If a vector lies between that frame and this reference, marks the
    /// frame whose vector breaks the cycle so it can catch the error.
    fn cycle(&mut self, index: usize, name: &Name) -> ResolveError {
        self.deferred = if self.out_of_line > 0 {
            Some(self.in_progress.len())
        } else {
            self.in_progress[index + 1..]
                .iter()
                .rposition(|frame| frame.out_of_line)
                .map(|offset| index + 1 + offset)
        };
        ResolveError::RecursiveType {
            name: self.name_str(name),
            span: name.span(),
        }
    }

    fn name_str(&self, name: &Name) -> String {
        name_text(self.interner, name)
    }

    /// Look a possibly dotted name up in the registry.
    ///
    /// Names are registered undotted, so a multi-component name only
    /// resolves if some declaration was registered under the joined text.
    fn lookup(&self, name: &CompoundIdentifier) -> Option<DeclRef> {
        let symbol = self.interner.get(&name.to_string())?;
        self.registry.lookup(symbol)
    }

    fn declare<K: Eq + Hash>(
        &self,
        scope: &mut Scope<K>,
        key: K,
        name: &Name,
        kind: ScopeKind,
    ) -> Result<(), ResolveError> {
        scope
            .declare(key, name.span())
            .map_err(|previous| ResolveError::DuplicateName {
                scope: kind,
                name: self.name_str(name),
                span: name.span(),
                previous,
            })
    }

    fn overflow(&self, name: &Name) -> ResolveError {
        ResolveError::SizeOverflow {
            name: self.name_str(name),
            span: name.span(),
        }
    }
}
