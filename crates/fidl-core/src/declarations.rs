//! Flat declaration tables.
//!
//! The consumer moves every declaration out of the AST into one of these
//! tables, nested consts and enums included. Types and constants stay in
//! their unresolved AST form until the resolver reads them.

use crate::ids::{ConstId, DeclRef, EnumId, InterfaceId, StructId, UnionId};
use crate::index_vec::IndexVec;
use crate::interner::Symbol;
use crate::source::Span;
use crate::syntax::ast::{Constant, NumericLiteral, PrimitiveType, Type};

/// An optional identifier reference.
///
/// Only a default-constructed name is anonymous; every name produced from
/// source text carries a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Name {
    symbol: Option<Symbol>,
    span: Span,
}

impl Name {
    pub fn new(symbol: Symbol, span: Span) -> Self {
        Self {
            symbol: Some(symbol),
            span,
        }
    }

    /// The key this name occupies in scopes and maps.
    pub fn key(&self) -> Option<Symbol> {
        self.symbol
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// A method selector and the literal it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordinal {
    pub literal: NumericLiteral,
    pub value: u32,
}

#[derive(Debug, Clone)]
pub struct ConstInfo {
    pub name: Name,
    pub ty: Type,
    pub value: Constant,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: Name,
    pub value: Option<Constant>,
}

#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub name: Name,
    /// Underlying type; `uint32` when the source omits it.
    pub subtype: PrimitiveType,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub ty: Type,
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub ordinal: Ordinal,
    pub name: Name,
    pub parameters: Vec<Parameter>,
    pub has_response: bool,
    /// Empty unless `has_response`.
    pub response: Vec<Parameter>,
}

#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub name: Name,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub ty: Type,
    pub name: Name,
    pub default_value: Option<Constant>,
}

#[derive(Debug, Clone)]
pub struct StructInfo {
    pub name: Name,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone)]
pub struct UnionMember {
    pub ty: Type,
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct UnionInfo {
    pub name: Name,
    pub members: Vec<UnionMember>,
}

/// All declarations of a module, one table per category.
///
/// Tables are append-only and keep consumption order.
#[derive(Debug, Default)]
pub struct Declarations {
    pub consts: IndexVec<ConstId, ConstInfo>,
    pub enums: IndexVec<EnumId, EnumInfo>,
    pub interfaces: IndexVec<InterfaceId, InterfaceInfo>,
    pub structs: IndexVec<StructId, StructInfo>,
    pub unions: IndexVec<UnionId, UnionInfo>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The name of the declaration `decl` points at.
    pub fn name_of(&self, decl: DeclRef) -> Name {
        match decl {
            DeclRef::Const(id) => self.consts[id].name,
            DeclRef::Enum(id) => self.enums[id].name,
            DeclRef::Interface(id) => self.interfaces[id].name,
            DeclRef::Struct(id) => self.structs[id].name,
            DeclRef::Union(id) => self.unions[id].name,
        }
    }

    /// Total number of declarations across all tables.
    pub fn len(&self) -> usize {
        self.consts.len()
            + self.enums.len()
            + self.interfaces.len()
            + self.structs.len()
            + self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
