//! Per-declaration resolution.

use tracing::trace;

use super::{ResolveError, Resolver, ScopeKind};
use crate::declarations::Parameter;
use crate::ids::{ConstId, EnumId, InterfaceId, StructId, UnionId};
use crate::scope::Scope;
use crate::shape::{primitive_shape, union_shape, StructLayout, TypeShape};

impl Resolver<'_> {
    /// A const has the shape of its type; its value must fit that type.
    pub(super) fn const_decl(&mut self, id: ConstId) -> Result<TypeShape, ResolveError> {
        let decls = self.decls;
        let info = &decls.consts[id];
        trace!(name = %self.name_str(&info.name), "resolving const");

        let shape = self.resolve_type(&info.ty)?;
        self.const_value(id)?;
        Ok(shape)
    }

    pub(super) fn enum_decl(&mut self, id: EnumId) -> Result<TypeShape, ResolveError> {
        let decls = self.decls;
        let info = &decls.enums[id];
        trace!(name = %self.name_str(&info.name), "resolving enum");

        let subtype = info.subtype.subtype;
        if !subtype.is_integer() {
            return Err(ResolveError::InvalidEnumSubtype {
                subtype: subtype.to_string(),
                span: info.subtype.span,
            });
        }

        let mut scope = Scope::new();
        for member in &info.members {
            self.declare(&mut scope, member.name.key(), &member.name, ScopeKind::EnumMember)?;
            if let Some(constant) = &member.value {
                let value = self.evaluate_integer(constant)?;
                if !subtype.holds(value) {
                    return Err(ResolveError::ConstantOutOfRange {
                        value,
                        ty: subtype.to_string(),
                        span: constant.span,
                    });
                }
            }
        }

        Ok(primitive_shape(subtype))
    }

    pub(super) fn interface_decl(&mut self, id: InterfaceId) -> Result<(), ResolveError> {
        let decls = self.decls;
        let info = &decls.interfaces[id];
        trace!(name = %self.name_str(&info.name), "resolving interface");

        let mut names = Scope::new();
        let mut ordinals = Scope::new();
        for method in &info.methods {
            self.declare(&mut names, method.name.key(), &method.name, ScopeKind::Method)?;
            ordinals
                .declare(method.ordinal.value, method.ordinal.literal.span)
                .map_err(|previous| ResolveError::DuplicateOrdinal {
                    ordinal: method.ordinal.value,
                    span: method.ordinal.literal.span,
                    previous,
                })?;

            self.parameters(&method.parameters)?;
            if method.has_response {
                self.parameters(&method.response)?;
            }
        }

        Ok(())
    }

    fn parameters(&mut self, parameters: &[Parameter]) -> Result<(), ResolveError> {
        let mut scope = Scope::new();
        for param in parameters {
            self.declare(&mut scope, param.name.key(), &param.name, ScopeKind::Parameter)?;
            self.resolve_type(&param.ty)?;
        }
        Ok(())
    }

    pub(super) fn struct_decl(&mut self, id: StructId) -> Result<TypeShape, ResolveError> {
        let decls = self.decls;
        let info = &decls.structs[id];
        trace!(name = %self.name_str(&info.name), "resolving struct");

        let mut scope = Scope::new();
        let mut layout = StructLayout::new();
        for member in &info.members {
            self.declare(&mut scope, member.name.key(), &member.name, ScopeKind::StructMember)?;
            let shape = self.resolve_type(&member.ty)?;
            if let Some(default) = &member.default_value {
                self.check_default(&member.ty, default)?;
            }
            layout
                .push(shape)
                .ok_or_else(|| self.overflow(&info.name))?;
        }

        layout.finish().ok_or_else(|| self.overflow(&info.name))
    }

    pub(super) fn union_decl(&mut self, id: UnionId) -> Result<TypeShape, ResolveError> {
        let decls = self.decls;
        let info = &decls.unions[id];
        trace!(name = %self.name_str(&info.name), "resolving union");

        let mut scope = Scope::new();
        let mut members = Vec::with_capacity(info.members.len());
        for member in &info.members {
            self.declare(&mut scope, member.name.key(), &member.name, ScopeKind::UnionMember)?;
            members.push(self.resolve_type(&member.ty)?);
        }

        union_shape(members).ok_or_else(|| self.overflow(&info.name))
    }
}
