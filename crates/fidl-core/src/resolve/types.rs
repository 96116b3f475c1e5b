//! Type resolution.

use tracing::trace;

use super::{ResolveError, Resolver};
use crate::ids::DeclRef;
use crate::shape::{
    array_shape, primitive_shape, string_shape, vector_shape, Bound, Payload, TypeShape, HANDLE,
};
use crate::syntax::ast::{CompoundIdentifier, Constant, Type, TypeKind};

impl Resolver<'_> {
    /// Resolve a type reference and compute its shape.
    pub(crate) fn resolve_type(&mut self, ty: &Type) -> Result<TypeShape, ResolveError> {
        match &ty.kind {
            TypeKind::Primitive(subtype) => Ok(primitive_shape(*subtype)),
            TypeKind::Handle { .. } => Ok(HANDLE),
            TypeKind::Request { subtype } => match self.lookup_required(subtype)? {
                DeclRef::Interface(_) => Ok(HANDLE),
                _ => Err(ResolveError::NotAnInterface {
                    name: subtype.to_string(),
                    span: subtype.span,
                }),
            },
            TypeKind::Array {
                element_type,
                element_count,
            } => {
                let element = self.resolve_type(element_type)?;
                let count = self.array_count(element_count)?;
                array_shape(element, count).ok_or_else(|| ResolveError::SizeOverflow {
                    name: ty.to_string(),
                    span: ty.span,
                })
            }
            TypeKind::Vector {
                element_type,
                maybe_element_count,
            } => {
                let element = self.vector_element(element_type)?;
                let bound = self.bound(maybe_element_count.as_ref())?;
                Ok(vector_shape(element, bound))
            }
            TypeKind::String {
                maybe_element_count,
            } => {
                let bound = self.bound(maybe_element_count.as_ref())?;
                Ok(string_shape(bound))
            }
            TypeKind::Identifier(name) => match self.lookup_required(name)? {
                DeclRef::Const(_) => Err(ResolveError::NotAType {
                    name: name.to_string(),
                    span: name.span,
                }),
                // Interfaces appear inline as a channel handle.
                DeclRef::Interface(_) => Ok(HANDLE),
                decl => self.declaration_shape(decl),
            },
        }
    }

    /// Resolve a vector element type.
    ///
    /// A cycle unwinding to the current frame stops here and becomes a
    /// recursive payload.
    fn vector_element(&mut self, element_type: &Type) -> Result<Payload, ResolveError> {
        let frame = self.in_progress.len();
        self.out_of_line += 1;
        let result = self.resolve_type(element_type);
        self.out_of_line -= 1;

        match result {
            Ok(shape) => Ok(Payload::Shape(shape)),
            Err(ResolveError::RecursiveType { .. }) if self.deferred == Some(frame) => {
                self.deferred = None;
                trace!(element = %element_type, "recursive vector element");
                Ok(Payload::Recursive(element_type.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) fn lookup_required(
        &self,
        name: &CompoundIdentifier,
    ) -> Result<DeclRef, ResolveError> {
        self.lookup(name).ok_or_else(|| ResolveError::UnresolvedName {
            name: name.to_string(),
            span: name.span,
        })
    }

    fn array_count(&mut self, constant: &Constant) -> Result<u64, ResolveError> {
        let count = self.evaluate_integer(constant)?;
        if count == 0 {
            return Err(ResolveError::ZeroArrayCount {
                span: constant.span,
            });
        }
        u64::try_from(count).map_err(|_| ResolveError::InvalidConstant {
            constant: constant.to_string(),
            reason: format!("array element count {count} is out of range"),
            span: constant.span,
        })
    }

    /// Evaluate an optional vector or string bound.
    pub(crate) fn bound(&mut self, constant: Option<&Constant>) -> Result<Bound, ResolveError> {
        let Some(constant) = constant else {
            return Ok(Bound::Unbounded);
        };
        let value = self.evaluate_integer(constant)?;
        if value <= 0 {
            return Err(ResolveError::NonPositiveBound {
                value,
                span: constant.span,
            });
        }
        u64::try_from(value)
            .map(Bound::Bounded)
            .map_err(|_| ResolveError::InvalidConstant {
                constant: constant.to_string(),
                reason: format!("bound {value} is out of range"),
                span: constant.span,
            })
    }
}
