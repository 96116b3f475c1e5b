//! Abstract syntax tree for FIDL source files.
//!
//! The tree is produced by the parser and handed to the consumer by
//! value. Nothing here is resolved: identifiers are plain strings and
//! constants are unevaluated tokens.

use crate::source::Span;
use serde::Serialize;
use std::fmt;

/// A single identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn dummy(name: impl Into<String>) -> Self {
        Self::new(name, Span::default())
    }
}

/// A dotted identifier such as `fuchsia.io.File`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundIdentifier {
    pub components: Vec<Identifier>,
    pub span: Span,
}

impl CompoundIdentifier {
    pub fn dummy(name: &str) -> Self {
        Self {
            components: name.split('.').map(Identifier::dummy).collect(),
            span: Span::default(),
        }
    }
}

impl fmt::Display for CompoundIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&component.name)?;
        }
        Ok(())
    }
}

/// A numeric literal kept as written, e.g. `0x10` or `-3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumericLiteral {
    pub value: String,
    pub span: Span,
}

impl NumericLiteral {
    pub fn dummy(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// String contents without the surrounding quotes.
    String(String),
    Numeric(NumericLiteral),
    True,
    False,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstantKind {
    Identifier(CompoundIdentifier),
    Literal(Literal),
}

/// A constant expression: a literal or a reference to a named const.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    pub kind: ConstantKind,
    pub span: Span,
}

impl Constant {
    pub fn numeric(value: &str) -> Self {
        Self {
            kind: ConstantKind::Literal(Literal::Numeric(NumericLiteral::dummy(value))),
            span: Span::default(),
        }
    }

    pub fn identifier(name: &str) -> Self {
        Self {
            kind: ConstantKind::Identifier(CompoundIdentifier::dummy(name)),
            span: Span::default(),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConstantKind::Identifier(name) => name.fmt(f),
            ConstantKind::Literal(Literal::String(s)) => write!(f, "{:?}", s),
            ConstantKind::Literal(Literal::Numeric(n)) => f.write_str(&n.value),
            ConstantKind::Literal(Literal::True) => f.write_str("true"),
            ConstantKind::Literal(Literal::False) => f.write_str("false"),
            ConstantKind::Literal(Literal::Default) => f.write_str("default"),
        }
    }
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveSubtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl PrimitiveSubtype {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let subtype = match keyword {
            "bool" => PrimitiveSubtype::Bool,
            "int8" => PrimitiveSubtype::Int8,
            "int16" => PrimitiveSubtype::Int16,
            "int32" => PrimitiveSubtype::Int32,
            "int64" => PrimitiveSubtype::Int64,
            "uint8" => PrimitiveSubtype::Uint8,
            "uint16" => PrimitiveSubtype::Uint16,
            "uint32" => PrimitiveSubtype::Uint32,
            "uint64" => PrimitiveSubtype::Uint64,
            "float32" => PrimitiveSubtype::Float32,
            "float64" => PrimitiveSubtype::Float64,
            _ => return None,
        };
        Some(subtype)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveSubtype::Bool => "bool",
            PrimitiveSubtype::Int8 => "int8",
            PrimitiveSubtype::Int16 => "int16",
            PrimitiveSubtype::Int32 => "int32",
            PrimitiveSubtype::Int64 => "int64",
            PrimitiveSubtype::Uint8 => "uint8",
            PrimitiveSubtype::Uint16 => "uint16",
            PrimitiveSubtype::Uint32 => "uint32",
            PrimitiveSubtype::Uint64 => "uint64",
            PrimitiveSubtype::Float32 => "float32",
            PrimitiveSubtype::Float64 => "float64",
        }
    }

    /// True for the eight sized integer kinds.
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            PrimitiveSubtype::Bool | PrimitiveSubtype::Float32 | PrimitiveSubtype::Float64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveSubtype::Float32 | PrimitiveSubtype::Float64)
    }

    /// Whether `value` is representable in this integer type.
    ///
    /// Always false for non-integer subtypes.
    pub fn holds(self, value: i128) -> bool {
        match self {
            PrimitiveSubtype::Int8 => i8::try_from(value).is_ok(),
            PrimitiveSubtype::Int16 => i16::try_from(value).is_ok(),
            PrimitiveSubtype::Int32 => i32::try_from(value).is_ok(),
            PrimitiveSubtype::Int64 => i64::try_from(value).is_ok(),
            PrimitiveSubtype::Uint8 => u8::try_from(value).is_ok(),
            PrimitiveSubtype::Uint16 => u16::try_from(value).is_ok(),
            PrimitiveSubtype::Uint32 => u32::try_from(value).is_ok(),
            PrimitiveSubtype::Uint64 => u64::try_from(value).is_ok(),
            PrimitiveSubtype::Bool | PrimitiveSubtype::Float32 | PrimitiveSubtype::Float64 => {
                false
            }
        }
    }
}

impl fmt::Display for PrimitiveSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimitiveType {
    pub subtype: PrimitiveSubtype,
    pub span: Span,
}

/// The kernel object a handle refers to; `handle` alone is `Handle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSubtype {
    Handle,
    Process,
    Thread,
    Vmo,
    Channel,
    Event,
    Port,
    Interrupt,
    Log,
    Socket,
    Resource,
    Eventpair,
    Job,
    Vmar,
    Fifo,
    Timer,
}

impl HandleSubtype {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let subtype = match keyword {
            "handle" => HandleSubtype::Handle,
            "process" => HandleSubtype::Process,
            "thread" => HandleSubtype::Thread,
            "vmo" => HandleSubtype::Vmo,
            "channel" => HandleSubtype::Channel,
            "event" => HandleSubtype::Event,
            "port" => HandleSubtype::Port,
            "interrupt" => HandleSubtype::Interrupt,
            "log" => HandleSubtype::Log,
            "socket" => HandleSubtype::Socket,
            "resource" => HandleSubtype::Resource,
            "eventpair" => HandleSubtype::Eventpair,
            "job" => HandleSubtype::Job,
            "vmar" => HandleSubtype::Vmar,
            "fifo" => HandleSubtype::Fifo,
            "timer" => HandleSubtype::Timer,
            _ => return None,
        };
        Some(subtype)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            HandleSubtype::Handle => "handle",
            HandleSubtype::Process => "process",
            HandleSubtype::Thread => "thread",
            HandleSubtype::Vmo => "vmo",
            HandleSubtype::Channel => "channel",
            HandleSubtype::Event => "event",
            HandleSubtype::Port => "port",
            HandleSubtype::Interrupt => "interrupt",
            HandleSubtype::Log => "log",
            HandleSubtype::Socket => "socket",
            HandleSubtype::Resource => "resource",
            HandleSubtype::Eventpair => "eventpair",
            HandleSubtype::Job => "job",
            HandleSubtype::Vmar => "vmar",
            HandleSubtype::Fifo => "fifo",
            HandleSubtype::Timer => "timer",
        }
    }
}

/// A type reference with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Type {
    pub kind: TypeKind,
    pub span: Span,
}

impl Type {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create a type without a source location (for tests or generated code).
    pub fn dummy(kind: TypeKind) -> Self {
        Self::new(kind, Span::default())
    }

    pub fn primitive(subtype: PrimitiveSubtype) -> Self {
        Self::dummy(TypeKind::Primitive(subtype))
    }

    pub fn identifier(name: &str) -> Self {
        Self::dummy(TypeKind::Identifier(CompoundIdentifier::dummy(name)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeKind {
    /// `array<T>:N`
    Array {
        element_type: Box<Type>,
        element_count: Constant,
    },
    /// `vector<T>` or `vector<T>:N`
    Vector {
        element_type: Box<Type>,
        maybe_element_count: Option<Constant>,
    },
    /// `string` or `string:N`
    String { maybe_element_count: Option<Constant> },
    /// `handle` or `handle<subtype>`
    Handle { subtype: HandleSubtype },
    /// `request<Interface>`
    Request { subtype: CompoundIdentifier },
    Primitive(PrimitiveSubtype),
    /// A reference to a declared type.
    Identifier(CompoundIdentifier),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Array {
                element_type,
                element_count,
            } => write!(f, "array<{}>:{}", element_type, element_count),
            TypeKind::Vector {
                element_type,
                maybe_element_count,
            } => {
                write!(f, "vector<{}>", element_type)?;
                if let Some(count) = maybe_element_count {
                    write!(f, ":{}", count)?;
                }
                Ok(())
            }
            TypeKind::String {
                maybe_element_count,
            } => {
                f.write_str("string")?;
                if let Some(count) = maybe_element_count {
                    write!(f, ":{}", count)?;
                }
                Ok(())
            }
            TypeKind::Handle {
                subtype: HandleSubtype::Handle,
            } => f.write_str("handle"),
            TypeKind::Handle { subtype } => write!(f, "handle<{}>", subtype.keyword()),
            TypeKind::Request { subtype } => write!(f, "request<{}>", subtype),
            TypeKind::Primitive(subtype) => subtype.fmt(f),
            TypeKind::Identifier(name) => name.fmt(f),
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// `const uint32 kMax = 16;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDeclaration {
    pub identifier: Identifier,
    pub ty: Type,
    pub constant: Constant,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub identifier: Identifier,
    pub maybe_value: Option<Constant>,
    pub span: Span,
}

/// `enum Color : uint8 { RED = 1; };`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDeclaration {
    pub identifier: Identifier,
    pub maybe_subtype: Option<PrimitiveType>,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub ty: Type,
    pub identifier: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParameterList {
    pub parameters: Vec<Parameter>,
    pub span: Span,
}

/// `1: Frob(int32 x) -> (int32 y);`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceMethod {
    pub ordinal: NumericLiteral,
    pub identifier: Identifier,
    pub parameter_list: ParameterList,
    pub maybe_response: Option<ParameterList>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDeclaration {
    pub identifier: Identifier,
    pub const_members: Vec<ConstDeclaration>,
    pub enum_members: Vec<EnumDeclaration>,
    pub method_members: Vec<InterfaceMethod>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructMember {
    pub ty: Type,
    pub identifier: Identifier,
    pub maybe_default_value: Option<Constant>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructDeclaration {
    pub identifier: Identifier,
    pub const_members: Vec<ConstDeclaration>,
    pub enum_members: Vec<EnumDeclaration>,
    pub members: Vec<StructMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionMember {
    pub ty: Type,
    pub identifier: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionDeclaration {
    pub identifier: Identifier,
    pub members: Vec<UnionMember>,
    pub span: Span,
}

/// A parsed file. Declarations are grouped by category, each list in
/// source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    pub library_name: Option<CompoundIdentifier>,
    pub using_list: Vec<CompoundIdentifier>,
    pub const_declaration_list: Vec<ConstDeclaration>,
    pub enum_declaration_list: Vec<EnumDeclaration>,
    pub interface_declaration_list: Vec<InterfaceDeclaration>,
    pub struct_declaration_list: Vec<StructDeclaration>,
    pub union_declaration_list: Vec<UnionDeclaration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let vector = Type::dummy(TypeKind::Vector {
            element_type: Box::new(Type::dummy(TypeKind::String {
                maybe_element_count: Some(Constant::numeric("32")),
            })),
            maybe_element_count: Some(Constant::identifier("kMaxNames")),
        });
        assert_eq!(vector.to_string(), "vector<string:32>:kMaxNames");

        let array = Type::dummy(TypeKind::Array {
            element_type: Box::new(Type::primitive(PrimitiveSubtype::Uint32)),
            element_count: Constant::numeric("4"),
        });
        assert_eq!(array.to_string(), "array<uint32>:4");

        let channel = Type::dummy(TypeKind::Handle {
            subtype: HandleSubtype::Channel,
        });
        assert_eq!(channel.to_string(), "handle<channel>");
        assert_eq!(Type::identifier("fuchsia.io.File").to_string(), "fuchsia.io.File");
    }

    #[test]
    fn test_primitive_ranges() {
        assert!(PrimitiveSubtype::Uint8.holds(255));
        assert!(!PrimitiveSubtype::Uint8.holds(256));
        assert!(!PrimitiveSubtype::Uint32.holds(-1));
        assert!(PrimitiveSubtype::Int8.holds(-128));
        assert!(PrimitiveSubtype::Uint64.holds(u64::MAX as i128));
        assert!(!PrimitiveSubtype::Float32.holds(0));
    }

    #[test]
    fn test_keywords_round_trip() {
        for keyword in ["bool", "int8", "uint64", "float32"] {
            let subtype = PrimitiveSubtype::from_keyword(keyword).unwrap();
            assert_eq!(subtype.keyword(), keyword);
        }
        assert_eq!(PrimitiveSubtype::from_keyword("int128"), None);
        assert!(!PrimitiveSubtype::Bool.is_integer());
        assert!(PrimitiveSubtype::Int16.is_integer());
    }
}
