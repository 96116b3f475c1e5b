//! Parser implementation for FIDL.

use super::ast::{
    CompoundIdentifier, ConstDeclaration, Constant, ConstantKind, EnumDeclaration, EnumMember,
    File, HandleSubtype, Identifier, InterfaceDeclaration, InterfaceMethod, Literal,
    NumericLiteral, Parameter, ParameterList, PrimitiveSubtype, PrimitiveType, StructDeclaration,
    StructMember, Type, TypeKind, UnionDeclaration, UnionMember,
};
use crate::source::{SourceId, Span};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct FidlParser;

/// Parse error with source location.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("{message} at line {line}, column {column}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("unknown handle subtype `{name}`")]
    UnknownHandleSubtype { name: String, span: Span },

    #[error("missing required element: {0}")]
    Missing(&'static str),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. } => Some(*span),
            ParseError::UnknownHandleSubtype { span, .. } => Some(*span),
            ParseError::Missing(_) => None,
        }
    }

    fn from_pest(err: pest::error::Error<Rule>, source_id: SourceId) -> Self {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        let span = match err.location {
            pest::error::InputLocation::Pos(pos) => Span::new(source_id, pos, pos + 1),
            pest::error::InputLocation::Span((start, end)) => Span::new(source_id, start, end),
        };
        ParseError::Syntax {
            message: err.variant.message().to_string(),
            line,
            column,
            span,
        }
    }
}

/// Parse FIDL source into a File AST.
pub fn parse(source: &str) -> Result<File, ParseError> {
    parse_with_source_id(source, SourceId(0))
}

/// Parse FIDL source, stamping spans with `source_id`.
pub fn parse_with_source_id(source: &str, source_id: SourceId) -> Result<File, ParseError> {
    let mut pairs = FidlParser::parse(Rule::file, source)
        .map_err(|err| ParseError::from_pest(err, source_id))?;
    let file_pair = pairs.next().ok_or(ParseError::Missing("file"))?;
    ParserContext { source_id }.file(file_pair)
}

/// Advance `pairs` to the next child with `rule`, skipping keyword tokens.
fn next<'i>(
    pairs: &mut Pairs<'i, Rule>,
    rule: Rule,
    what: &'static str,
) -> Result<Pair<'i, Rule>, ParseError> {
    pairs
        .find(|p| p.as_rule() == rule)
        .ok_or(ParseError::Missing(what))
}

struct ParserContext {
    source_id: SourceId,
}

impl ParserContext {
    fn span(&self, pair: &Pair<Rule>) -> Span {
        let pest_span = pair.as_span();
        Span::new(self.source_id, pest_span.start(), pest_span.end())
    }

    fn file(&self, pair: Pair<Rule>) -> Result<File, ParseError> {
        let mut file = File::default();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::library_decl => {
                    let name = next(
                        &mut inner.into_inner(),
                        Rule::compound_identifier,
                        "library name",
                    )?;
                    file.library_name = Some(self.compound_identifier(name));
                }
                Rule::using_decl => {
                    let name = next(
                        &mut inner.into_inner(),
                        Rule::compound_identifier,
                        "using name",
                    )?;
                    file.using_list.push(self.compound_identifier(name));
                }
                Rule::const_decl => file.const_declaration_list.push(self.const_decl(inner)?),
                Rule::enum_decl => file.enum_declaration_list.push(self.enum_decl(inner)?),
                Rule::interface_decl => file
                    .interface_declaration_list
                    .push(self.interface_decl(inner)?),
                Rule::struct_decl => file.struct_declaration_list.push(self.struct_decl(inner)?),
                Rule::union_decl => file.union_declaration_list.push(self.union_decl(inner)?),
                _ => {}
            }
        }

        Ok(file)
    }

    // ========================================================================
    // Names and constants
    // ========================================================================

    fn identifier(&self, pair: Pair<Rule>) -> Identifier {
        Identifier::new(pair.as_str(), self.span(&pair))
    }

    fn compound_identifier(&self, pair: Pair<Rule>) -> CompoundIdentifier {
        let span = self.span(&pair);
        let components = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(|p| self.identifier(p))
            .collect();
        CompoundIdentifier { components, span }
    }

    fn numeric_literal(&self, pair: Pair<Rule>) -> NumericLiteral {
        NumericLiteral {
            value: pair.as_str().to_string(),
            span: self.span(&pair),
        }
    }

    fn literal(&self, pair: Pair<Rule>) -> Result<Literal, ParseError> {
        let inner = pair
            .into_inner()
            .next()
            .ok_or(ParseError::Missing("literal"))?;
        let literal = match inner.as_rule() {
            Rule::string_literal => {
                let contents = next(&mut inner.into_inner(), Rule::string_inner, "string")?;
                Literal::String(unescape(contents.as_str()))
            }
            Rule::numeric_literal => Literal::Numeric(self.numeric_literal(inner)),
            Rule::kw_true => Literal::True,
            Rule::kw_false => Literal::False,
            _ => Literal::Default,
        };
        Ok(literal)
    }

    fn constant(&self, pair: Pair<Rule>) -> Result<Constant, ParseError> {
        let span = self.span(&pair);
        let inner = pair
            .into_inner()
            .next()
            .ok_or(ParseError::Missing("constant"))?;
        let kind = match inner.as_rule() {
            Rule::literal => ConstantKind::Literal(self.literal(inner)?),
            _ => ConstantKind::Identifier(self.compound_identifier(inner)),
        };
        Ok(Constant { kind, span })
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn primitive_type(&self, pair: Pair<Rule>) -> Result<PrimitiveType, ParseError> {
        let subtype = PrimitiveSubtype::from_keyword(pair.as_str())
            .ok_or(ParseError::Missing("primitive type"))?;
        Ok(PrimitiveType {
            subtype,
            span: self.span(&pair),
        })
    }

    fn ty(&self, pair: Pair<Rule>) -> Result<Type, ParseError> {
        let span = self.span(&pair);
        let inner = pair.into_inner().next().ok_or(ParseError::Missing("type"))?;

        let kind = match inner.as_rule() {
            Rule::array_type => {
                let mut parts = inner.into_inner();
                let element_type = self.ty(next(&mut parts, Rule::ty, "array element type")?)?;
                let element_count =
                    self.constant(next(&mut parts, Rule::constant, "array element count")?)?;
                TypeKind::Array {
                    element_type: Box::new(element_type),
                    element_count,
                }
            }
            Rule::vector_type => {
                let mut parts = inner.into_inner();
                let element_type = self.ty(next(&mut parts, Rule::ty, "vector element type")?)?;
                let maybe_element_count = parts
                    .find(|p| p.as_rule() == Rule::constant)
                    .map(|p| self.constant(p))
                    .transpose()?;
                TypeKind::Vector {
                    element_type: Box::new(element_type),
                    maybe_element_count,
                }
            }
            Rule::string_type => {
                let maybe_element_count = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::constant)
                    .map(|p| self.constant(p))
                    .transpose()?;
                TypeKind::String {
                    maybe_element_count,
                }
            }
            Rule::handle_type => {
                let subtype = match inner.into_inner().find(|p| p.as_rule() == Rule::identifier) {
                    Some(name) => HandleSubtype::from_keyword(name.as_str()).ok_or_else(|| {
                        ParseError::UnknownHandleSubtype {
                            name: name.as_str().to_string(),
                            span: self.span(&name),
                        }
                    })?,
                    None => HandleSubtype::Handle,
                };
                TypeKind::Handle { subtype }
            }
            Rule::request_type => {
                let name = next(
                    &mut inner.into_inner(),
                    Rule::compound_identifier,
                    "request interface",
                )?;
                TypeKind::Request {
                    subtype: self.compound_identifier(name),
                }
            }
            Rule::primitive_type => TypeKind::Primitive(self.primitive_type(inner)?.subtype),
            _ => {
                let name = next(&mut inner.into_inner(), Rule::compound_identifier, "type name")?;
                TypeKind::Identifier(self.compound_identifier(name))
            }
        };

        Ok(Type::new(kind, span))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn const_decl(&self, pair: Pair<Rule>) -> Result<ConstDeclaration, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();

        let ty = self.ty(next(&mut inner, Rule::ty, "const type")?)?;
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "const name")?);
        let constant = self.constant(next(&mut inner, Rule::constant, "const value")?)?;

        Ok(ConstDeclaration {
            identifier,
            ty,
            constant,
            span,
        })
    }

    fn enum_decl(&self, pair: Pair<Rule>) -> Result<EnumDeclaration, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "enum name")?);

        let mut maybe_subtype = None;
        let mut members = Vec::new();
        for item in inner {
            match item.as_rule() {
                Rule::primitive_type => maybe_subtype = Some(self.primitive_type(item)?),
                Rule::enum_member => members.push(self.enum_member(item)?),
                _ => {}
            }
        }

        Ok(EnumDeclaration {
            identifier,
            maybe_subtype,
            members,
            span,
        })
    }

    fn enum_member(&self, pair: Pair<Rule>) -> Result<EnumMember, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "enum member name")?);
        let maybe_value = inner
            .find(|p| p.as_rule() == Rule::constant)
            .map(|p| self.constant(p))
            .transpose()?;

        Ok(EnumMember {
            identifier,
            maybe_value,
            span,
        })
    }

    fn parameter_list(&self, pair: Pair<Rule>) -> Result<ParameterList, ParseError> {
        let span = self.span(&pair);
        let mut parameters = Vec::new();

        for param in pair.into_inner().filter(|p| p.as_rule() == Rule::parameter) {
            let param_span = self.span(&param);
            let mut inner = param.into_inner();
            let ty = self.ty(next(&mut inner, Rule::ty, "parameter type")?)?;
            let identifier = self.identifier(next(&mut inner, Rule::identifier, "parameter name")?);
            parameters.push(Parameter {
                ty,
                identifier,
                span: param_span,
            });
        }

        Ok(ParameterList { parameters, span })
    }

    fn method_decl(&self, pair: Pair<Rule>) -> Result<InterfaceMethod, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();

        let ordinal = self.numeric_literal(next(&mut inner, Rule::numeric_literal, "ordinal")?);
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "method name")?);
        let parameter_list =
            self.parameter_list(next(&mut inner, Rule::parameter_list, "parameter list")?)?;
        let maybe_response = match inner.find(|p| p.as_rule() == Rule::response_list) {
            Some(response) => Some(self.parameter_list(next(
                &mut response.into_inner(),
                Rule::parameter_list,
                "response parameter list",
            )?)?),
            None => None,
        };

        Ok(InterfaceMethod {
            ordinal,
            identifier,
            parameter_list,
            maybe_response,
            span,
        })
    }

    fn interface_decl(&self, pair: Pair<Rule>) -> Result<InterfaceDeclaration, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "interface name")?);

        let mut const_members = Vec::new();
        let mut enum_members = Vec::new();
        let mut method_members = Vec::new();
        for item in inner {
            match item.as_rule() {
                Rule::const_decl => const_members.push(self.const_decl(item)?),
                Rule::enum_decl => enum_members.push(self.enum_decl(item)?),
                Rule::method_decl => method_members.push(self.method_decl(item)?),
                _ => {}
            }
        }

        Ok(InterfaceDeclaration {
            identifier,
            const_members,
            enum_members,
            method_members,
            span,
        })
    }

    fn struct_decl(&self, pair: Pair<Rule>) -> Result<StructDeclaration, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "struct name")?);

        let mut const_members = Vec::new();
        let mut enum_members = Vec::new();
        let mut members = Vec::new();
        for item in inner {
            match item.as_rule() {
                Rule::const_decl => const_members.push(self.const_decl(item)?),
                Rule::enum_decl => enum_members.push(self.enum_decl(item)?),
                Rule::struct_member => {
                    let member_span = self.span(&item);
                    let mut parts = item.into_inner();
                    let ty = self.ty(next(&mut parts, Rule::ty, "member type")?)?;
                    let identifier =
                        self.identifier(next(&mut parts, Rule::identifier, "member name")?);
                    let maybe_default_value = parts
                        .find(|p| p.as_rule() == Rule::constant)
                        .map(|p| self.constant(p))
                        .transpose()?;
                    members.push(StructMember {
                        ty,
                        identifier,
                        maybe_default_value,
                        span: member_span,
                    });
                }
                _ => {}
            }
        }

        Ok(StructDeclaration {
            identifier,
            const_members,
            enum_members,
            members,
            span,
        })
    }

    fn union_decl(&self, pair: Pair<Rule>) -> Result<UnionDeclaration, ParseError> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let identifier = self.identifier(next(&mut inner, Rule::identifier, "union name")?);

        let mut members = Vec::new();
        for item in inner.filter(|p| p.as_rule() == Rule::union_member) {
            let member_span = self.span(&item);
            let mut parts = item.into_inner();
            let ty = self.ty(next(&mut parts, Rule::ty, "member type")?)?;
            let identifier = self.identifier(next(&mut parts, Rule::identifier, "member name")?);
            members.push(UnionMember {
                ty,
                identifier,
                span: member_span,
            });
        }

        Ok(UnionDeclaration {
            identifier,
            members,
            span,
        })
    }
}

/// Resolve backslash escapes in a string literal body.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_library_and_using() {
        let file = parse("library fidl.test; using fuchsia.io; using zircon;").unwrap();
        assert_eq!(file.library_name.unwrap().to_string(), "fidl.test");
        assert_eq!(file.using_list.len(), 2);
        assert_eq!(file.using_list[0].to_string(), "fuchsia.io");
    }

    #[test]
    fn test_parse_struct_with_nested_declarations() {
        let source = r#"
            struct Buffer {
                const uint32 kMax = 0x100;
                enum Mode : uint8 { READ = 1; WRITE = 2; };
                vector<uint8>:kMax data;
                Mode mode = default;
                handle<vmo> backing;
            };
        "#;
        let file = parse(source).unwrap();
        let decl = &file.struct_declaration_list[0];

        assert_eq!(decl.identifier.name, "Buffer");
        assert_eq!(decl.const_members.len(), 1);
        assert_eq!(decl.enum_members[0].members.len(), 2);
        assert_eq!(decl.members.len(), 3);
        assert_eq!(decl.members[0].ty.to_string(), "vector<uint8>:kMax");
        assert_eq!(
            decl.members[1].maybe_default_value.as_ref().map(|c| c.kind.clone()),
            Some(ConstantKind::Literal(Literal::Default))
        );
        assert_eq!(
            decl.members[2].ty.kind,
            TypeKind::Handle {
                subtype: HandleSubtype::Vmo
            }
        );
    }

    #[test]
    fn test_parse_interface_methods() {
        let source = r#"
            interface Echo {
                1: EchoString(string? value) -> (string response);
            };
        "#;
        assert!(parse(source).is_err(), "nullable types are not part of the grammar");

        let source = r#"
            interface Echo {
                1: EchoString(string:32 value, request<Echo> other) -> (string response);
                0x2: Close();
            };
        "#;
        let file = parse(source).unwrap();
        let methods = &file.interface_declaration_list[0].method_members;

        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].ordinal.value, "1");
        assert_eq!(methods[0].parameter_list.parameters.len(), 2);
        assert_eq!(methods[0].parameter_list.parameters[1].ty.to_string(), "request<Echo>");
        assert_eq!(methods[0].maybe_response.as_ref().unwrap().parameters.len(), 1);
        assert_eq!(methods[1].ordinal.value, "0x2");
        assert!(methods[1].maybe_response.is_none());
    }

    #[test]
    fn test_parse_union_and_types() {
        let source = r#"
            // comments are skipped
            union Value {
                array<array<int16>:2>:3 matrix;
                vector<vector<uint8>:4> rows;
                fuchsia.io.Node node;
                float64 real;
            };
        "#;
        let file = parse(source).unwrap();
        let members = &file.union_declaration_list[0].members;

        assert_eq!(members[0].ty.to_string(), "array<array<int16>:2>:3");
        assert_eq!(members[1].ty.to_string(), "vector<vector<uint8>:4>");
        assert_eq!(members[2].ty.to_string(), "fuchsia.io.Node");
        assert_eq!(members[3].ty.kind, TypeKind::Primitive(PrimitiveSubtype::Float64));
    }

    #[test]
    fn test_keyword_prefixed_identifiers() {
        let file = parse("struct S { int32x a; stringy b; constant c; };").unwrap();
        let members = &file.struct_declaration_list[0].members;

        assert_eq!(members[0].ty.to_string(), "int32x");
        assert_eq!(members[1].ty.to_string(), "stringy");
        assert_eq!(members[2].ty.to_string(), "constant");
    }

    #[test]
    fn test_parse_const_literals() {
        let source = r#"
            const string kGreeting = "hi \"there\"";
            const bool kEnabled = true;
            const int64 kNegative = -5;
            const uint32 kAlias = kOther;
        "#;
        let file = parse(source).unwrap();
        let consts = &file.const_declaration_list;

        assert_eq!(
            consts[0].constant.kind,
            ConstantKind::Literal(Literal::String("hi \"there\"".to_string()))
        );
        assert_eq!(consts[1].constant.kind, ConstantKind::Literal(Literal::True));
        assert_eq!(consts[2].constant.to_string(), "-5");
        assert!(matches!(consts[3].constant.kind, ConstantKind::Identifier(_)));
    }

    #[test]
    fn test_spans_point_into_source() {
        let source = "struct Point { int32 x; };";
        let file = parse_with_source_id(source, SourceId(7)).unwrap();
        let ident = &file.struct_declaration_list[0].identifier;

        assert_eq!(ident.span.source, SourceId(7));
        assert_eq!(&source[ident.span.start..ident.span.end], "Point");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("struct Point { int32 x };"),
            Err(ParseError::Syntax { .. })
        ));
        assert!(parse("struct { int32 x; };").is_err());
        assert!(matches!(
            parse("struct S { handle<banana> h; };"),
            Err(ParseError::UnknownHandleSubtype { .. })
        ));
    }

    #[test]
    fn test_parse_empty_source() {
        let file = parse("").unwrap();
        assert!(file.struct_declaration_list.is_empty());
        assert!(file.library_name.is_none());
    }
}
