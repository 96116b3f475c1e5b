//! Resolution errors.

use std::fmt;

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::source::Span;

/// The lexical scope a duplicate name was found in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
    StructMember,
    UnionMember,
    EnumMember,
    Method,
    Parameter,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeKind::StructMember => "struct member",
            ScopeKind::UnionMember => "union member",
            ScopeKind::EnumMember => "enum member",
            ScopeKind::Method => "method",
            ScopeKind::Parameter => "parameter",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("duplicate {scope} name `{name}`")]
    DuplicateName {
        scope: ScopeKind,
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("duplicate method ordinal {ordinal}")]
    DuplicateOrdinal {
        ordinal: u32,
        span: Span,
        previous: Span,
    },

    #[error("unknown name `{name}`")]
    UnresolvedName { name: String, span: Span },

    #[error("`{name}` is a constant, not a type")]
    NotAType { name: String, span: Span },

    #[error("`{name}` is not an interface")]
    NotAnInterface { name: String, span: Span },

    #[error("`{name}` is not a constant")]
    NotAConstant { name: String, span: Span },

    #[error("invalid constant `{constant}`: {reason}")]
    InvalidConstant {
        constant: String,
        reason: String,
        span: Span,
    },

    #[error("constant `{name}` depends on itself")]
    ConstantCycle { name: String, span: Span },

    #[error("array element count must not be zero")]
    ZeroArrayCount { span: Span },

    #[error("size bound must be positive, found {value}")]
    NonPositiveBound { value: i128, span: Span },

    #[error("enum underlying type must be an integer type, found `{subtype}`")]
    InvalidEnumSubtype { subtype: String, span: Span },

    #[error("constant `{constant}` cannot be used as a value of type `{ty}`")]
    ConstantTypeMismatch {
        constant: String,
        ty: String,
        span: Span,
    },

    #[error("value {value} does not fit in `{ty}`")]
    ConstantOutOfRange { value: i128, ty: String, span: Span },

    #[error("type `{name}` contains itself")]
    RecursiveType { name: String, span: Span },

    #[error("size of `{name}` overflows")]
    SizeOverflow { name: String, span: Span },

    #[error("`{name}` was resolved twice")]
    AlreadyResolved { name: String, span: Span },
}

impl ResolveError {
    pub fn span(&self) -> Span {
        match self {
            ResolveError::DuplicateName { span, .. }
            | ResolveError::DuplicateOrdinal { span, .. }
            | ResolveError::UnresolvedName { span, .. }
            | ResolveError::NotAType { span, .. }
            | ResolveError::NotAnInterface { span, .. }
            | ResolveError::NotAConstant { span, .. }
            | ResolveError::InvalidConstant { span, .. }
            | ResolveError::ConstantCycle { span, .. }
            | ResolveError::ZeroArrayCount { span }
            | ResolveError::NonPositiveBound { span, .. }
            | ResolveError::InvalidEnumSubtype { span, .. }
            | ResolveError::ConstantTypeMismatch { span, .. }
            | ResolveError::ConstantOutOfRange { span, .. }
            | ResolveError::RecursiveType { span, .. }
            | ResolveError::SizeOverflow { span, .. }
            | ResolveError::AlreadyResolved { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::DuplicateName { .. } => "E0201",
            ResolveError::DuplicateOrdinal { .. } => "E0202",
            ResolveError::UnresolvedName { .. } => "E0203",
            ResolveError::NotAType { .. } => "E0204",
            ResolveError::NotAnInterface { .. } => "E0205",
            ResolveError::NotAConstant { .. } => "E0206",
            ResolveError::InvalidConstant { .. } => "E0207",
            ResolveError::ConstantCycle { .. } => "E0208",
            ResolveError::ZeroArrayCount { .. } => "E0209",
            ResolveError::NonPositiveBound { .. } => "E0210",
            ResolveError::InvalidEnumSubtype { .. } => "E0211",
            ResolveError::ConstantTypeMismatch { .. } => "E0212",
            ResolveError::ConstantOutOfRange { .. } => "E0213",
            ResolveError::RecursiveType { .. } => "E0214",
            ResolveError::SizeOverflow { .. } => "E0215",
            ResolveError::AlreadyResolved { .. } => "E0299",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string())
            .with_span(self.span())
            .with_code(self.code());
        match self {
            ResolveError::DuplicateName { previous, .. }
            | ResolveError::DuplicateOrdinal { previous, .. } => {
                diag.with_related("previously declared here", *previous)
            }
            _ => diag,
        }
    }
}
