//! First pass: move the AST into the flat declaration tables.
//!
//! Declarations are consumed in a fixed category order (consts, enums,
//! interfaces, structs, unions). Consts and enums nested in interfaces
//! and structs are consumed before their host and land in the same
//! global tables. Every top-level name is registered before its record
//! enters a table; the first duplicate aborts the pass and leaves the
//! losing record out.

use tracing::debug;

use crate::constant::{parse_integer_literal, IntegerLiteralError};
use crate::context::ModuleContext;
use crate::declarations::{
    ConstInfo, EnumInfo, EnumMember, InterfaceInfo, Method, Name, Ordinal, Parameter, StructInfo,
    StructMember, UnionInfo, UnionMember,
};
use crate::diagnostic::Diagnostic;
use crate::ids::DeclRef;
use crate::source::Span;
use crate::syntax::ast::{
    self, ConstDeclaration, EnumDeclaration, File, Identifier, InterfaceDeclaration,
    PrimitiveSubtype, PrimitiveType, StructDeclaration, UnionDeclaration,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsumeError {
    #[error("the name `{name}` is declared more than once")]
    DuplicateName {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("invalid method ordinal `{literal}`: {source}")]
    InvalidOrdinal {
        literal: String,
        #[source]
        source: IntegerLiteralError,
        span: Span,
    },
}

impl ConsumeError {
    pub fn span(&self) -> Span {
        match self {
            ConsumeError::DuplicateName { span, .. } => *span,
            ConsumeError::InvalidOrdinal { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConsumeError::DuplicateName { .. } => "E0101",
            ConsumeError::InvalidOrdinal { .. } => "E0102",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string())
            .with_span(self.span())
            .with_code(self.code());
        match self {
            ConsumeError::DuplicateName { previous, .. } => {
                diag.with_related("previously declared here", *previous)
            }
            ConsumeError::InvalidOrdinal { .. } => diag,
        }
    }
}

/// Consume `file` into `ctx`.
pub fn consume_file(ctx: &mut ModuleContext, file: File) -> Result<(), ConsumeError> {
    Consumer { ctx }.file(file)
}

struct Consumer<'a> {
    ctx: &'a mut ModuleContext,
}

impl Consumer<'_> {
    fn file(&mut self, file: File) -> Result<(), ConsumeError> {
        if let Some(library) = &file.library_name {
            debug!(library = %library, "consuming library");
            self.ctx.library_name = Some(library.to_string());
        }
        for using in &file.using_list {
            debug!(using = %using, "ignoring using declaration");
        }

        for decl in file.const_declaration_list {
            self.const_decl(decl)?;
        }
        for decl in file.enum_declaration_list {
            self.enum_decl(decl)?;
        }
        for decl in file.interface_declaration_list {
            self.interface_decl(decl)?;
        }
        for decl in file.struct_declaration_list {
            self.struct_decl(decl)?;
        }
        for decl in file.union_declaration_list {
            self.union_decl(decl)?;
        }

        Ok(())
    }

    fn name(&self, identifier: &Identifier) -> Name {
        Name::new(self.ctx.intern(&identifier.name), identifier.span)
    }

    fn register(&mut self, name: Name, decl: DeclRef) -> Result<(), ConsumeError> {
        debug!(name = %self.ctx.name_str(&name), decl = %decl, "registering declaration");
        self.ctx
            .registry
            .register(name, decl)
            .map_err(|(_, previous)| ConsumeError::DuplicateName {
                name: self.ctx.name_str(&name),
                span: name.span(),
                previous,
            })
    }

    fn const_decl(&mut self, decl: ConstDeclaration) -> Result<(), ConsumeError> {
        let name = self.name(&decl.identifier);
        let id = self.ctx.decls.consts.next_idx();
        self.register(name, DeclRef::Const(id))?;
        self.ctx.decls.consts.push(ConstInfo {
            name,
            ty: decl.ty,
            value: decl.constant,
        });
        Ok(())
    }

    fn enum_decl(&mut self, decl: EnumDeclaration) -> Result<(), ConsumeError> {
        let name = self.name(&decl.identifier);
        let subtype = decl.maybe_subtype.unwrap_or(PrimitiveType {
            subtype: PrimitiveSubtype::Uint32,
            span: decl.identifier.span,
        });
        let members = decl
            .members
            .into_iter()
            .map(|member| EnumMember {
                name: self.name(&member.identifier),
                value: member.maybe_value,
            })
            .collect();

        let id = self.ctx.decls.enums.next_idx();
        self.register(name, DeclRef::Enum(id))?;
        self.ctx.decls.enums.push(EnumInfo {
            name,
            subtype,
            members,
        });
        Ok(())
    }

    fn interface_decl(&mut self, decl: InterfaceDeclaration) -> Result<(), ConsumeError> {
        for nested in decl.const_members {
            self.const_decl(nested)?;
        }
        for nested in decl.enum_members {
            self.enum_decl(nested)?;
        }

        let name = self.name(&decl.identifier);
        let mut methods = Vec::with_capacity(decl.method_members.len());
        for method in decl.method_members {
            let value = parse_integer_literal::<u32>(&method.ordinal.value).map_err(|source| {
                ConsumeError::InvalidOrdinal {
                    literal: method.ordinal.value.clone(),
                    source,
                    span: method.ordinal.span,
                }
            })?;

            let has_response = method.maybe_response.is_some();
            methods.push(Method {
                ordinal: Ordinal {
                    literal: method.ordinal,
                    value,
                },
                name: self.name(&method.identifier),
                parameters: self.parameters(method.parameter_list),
                has_response,
                response: method
                    .maybe_response
                    .map(|list| self.parameters(list))
                    .unwrap_or_default(),
            });
        }

        let id = self.ctx.decls.interfaces.next_idx();
        self.register(name, DeclRef::Interface(id))?;
        self.ctx.decls.interfaces.push(InterfaceInfo { name, methods });
        Ok(())
    }

    fn parameters(&self, list: ast::ParameterList) -> Vec<Parameter> {
        list.parameters
            .into_iter()
            .map(|param| Parameter {
                name: self.name(&param.identifier),
                ty: param.ty,
            })
            .collect()
    }

    fn struct_decl(&mut self, decl: StructDeclaration) -> Result<(), ConsumeError> {
        for nested in decl.const_members {
            self.const_decl(nested)?;
        }
        for nested in decl.enum_members {
            self.enum_decl(nested)?;
        }

        let name = self.name(&decl.identifier);
        let members = decl
            .members
            .into_iter()
            .map(|member| StructMember {
                name: self.name(&member.identifier),
                ty: member.ty,
                default_value: member.maybe_default_value,
            })
            .collect();

        let id = self.ctx.decls.structs.next_idx();
        self.register(name, DeclRef::Struct(id))?;
        self.ctx.decls.structs.push(StructInfo { name, members });
        Ok(())
    }

    fn union_decl(&mut self, decl: UnionDeclaration) -> Result<(), ConsumeError> {
        let name = self.name(&decl.identifier);
        let members = decl
            .members
            .into_iter()
            .map(|member| UnionMember {
                name: self.name(&member.identifier),
                ty: member.ty,
            })
            .collect();

        let id = self.ctx.decls.unions.next_idx();
        self.register(name, DeclRef::Union(id))?;
        self.ctx.decls.unions.push(UnionInfo { name, members });
        Ok(())
    }
}
