//! Typed indices into the flat declaration tables.

use serde::Serialize;
use std::fmt;

use crate::index_vec::Idx;

macro_rules! declaration_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
        pub struct $name(pub u32);

        impl Idx for $name {
            fn new(raw: u32) -> Self {
                Self(raw)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

declaration_id!(
    /// Index into the const table.
    ConstId,
    "const"
);
declaration_id!(
    /// Index into the enum table.
    EnumId,
    "enum"
);
declaration_id!(
    /// Index into the interface table.
    InterfaceId,
    "interface"
);
declaration_id!(
    /// Index into the struct table.
    StructId,
    "struct"
);
declaration_id!(
    /// Index into the union table.
    UnionId,
    "union"
);

/// The category of a top-level declaration.
///
/// The variant order is the fixed order in which declarations are
/// consumed, resolved and dumped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Const,
    Enum,
    Interface,
    Struct,
    Union,
}

impl DeclKind {
    pub const ALL: [DeclKind; 5] = [
        DeclKind::Const,
        DeclKind::Enum,
        DeclKind::Interface,
        DeclKind::Struct,
        DeclKind::Union,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Enum => "enum",
            DeclKind::Interface => "interface",
            DeclKind::Struct => "struct",
            DeclKind::Union => "union",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a registered top-level name lives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum DeclRef {
    Const(ConstId),
    Enum(EnumId),
    Interface(InterfaceId),
    Struct(StructId),
    Union(UnionId),
}

impl DeclRef {
    pub fn kind(self) -> DeclKind {
        match self {
            DeclRef::Const(_) => DeclKind::Const,
            DeclRef::Enum(_) => DeclKind::Enum,
            DeclRef::Interface(_) => DeclKind::Interface,
            DeclRef::Struct(_) => DeclKind::Struct,
            DeclRef::Union(_) => DeclKind::Union,
        }
    }
}

impl fmt::Display for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclRef::Const(id) => id.fmt(f),
            DeclRef::Enum(id) => id.fmt(f),
            DeclRef::Interface(id) => id.fmt(f),
            DeclRef::Struct(id) => id.fmt(f),
            DeclRef::Union(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(StructId(3).to_string(), "struct#3");
        assert_eq!(DeclRef::Enum(EnumId(0)).to_string(), "enum#0");
    }

    #[test]
    fn test_decl_kind_order() {
        let mut kinds = DeclKind::ALL;
        kinds.sort();
        assert_eq!(kinds, DeclKind::ALL);
        assert_eq!(DeclRef::Union(UnionId(1)).kind(), DeclKind::Union);
    }
}
