//! Module driver.
//!
//! A [`Module`] owns one compilation unit and drives it through
//! Parse → Consume → Resolve. It is single use: each pass runs at most
//! once and in that order.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::consume::{consume_file, ConsumeError};
use crate::context::ModuleContext;
use crate::diagnostic::Diagnostic;
use crate::dump::{self, ShapeEntry};
use crate::interner::Interner;
use crate::resolve::{resolve_module, ResolveError};
use crate::shape::TypeShape;
use crate::source::SourceId;
use crate::syntax::ast::File;
use crate::syntax::parser::{parse_with_source_id, ParseError};

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Where a module is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Consumed,
    Resolved,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Empty => "empty",
            Phase::Consumed => "consumed",
            Phase::Resolved => "resolved",
        })
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Consume(#[from] ConsumeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("cannot {operation} a module that is {phase}")]
    Phase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Consume(e) => e.to_diagnostic(),
            CompileError::Resolve(e) => e.to_diagnostic(),
            CompileError::Parse(e) => {
                let diag = Diagnostic::error(e.to_string()).with_code("E0001");
                match e.span() {
                    Some(span) => diag.with_span(span),
                    None => diag,
                }
            }
            CompileError::Phase { .. } | CompileError::Io(_) => Diagnostic::error(self.to_string()),
        }
    }
}

/// One compilation unit.
pub struct Module {
    ctx: ModuleContext,
    phase: Phase,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        Self::from_context(ModuleContext::new())
    }

    /// Create with a shared interner.
    pub fn with_interner(interner: Arc<Interner>) -> Self {
        Self::from_context(ModuleContext::with_interner(interner))
    }

    fn from_context(ctx: ModuleContext) -> Self {
        Self {
            ctx,
            phase: Phase::Empty,
        }
    }

    pub fn context(&self) -> &ModuleContext {
        &self.ctx
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Load and parse a source file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> CompileResult<File> {
        let path = path.as_ref();
        let source_id = match self.ctx.source_map.load_file(path) {
            Ok(id) => id,
            Err(e) => return Err(self.report(e.into())),
        };
        self.parse_source(source_id)
    }

    /// Parse a source string.
    pub fn parse(&mut self, source: &str) -> CompileResult<File> {
        let source_id = self.ctx.source_map.add_inline(source);
        self.parse_source(source_id)
    }

    /// Parse a source already in the source map.
    pub fn parse_source(&mut self, source_id: SourceId) -> CompileResult<File> {
        let result = match self.ctx.source_map.get(source_id) {
            Some(source) => parse_with_source_id(&source.content, source_id),
            None => Err(ParseError::Missing("source")),
        };
        result.map_err(|e| self.report(e.into()))
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Move a parsed file into the declaration tables.
    pub fn consume_file(&mut self, file: File) -> CompileResult<()> {
        self.expect_phase(Phase::Empty, "consume")?;
        consume_file(&mut self.ctx, file).map_err(|e| self.report(e.into()))?;
        self.phase = Phase::Consumed;
        debug!(declarations = self.ctx.decls.len(), "consumed file");
        Ok(())
    }

    /// Resolve all consumed declarations and compute their shapes.
    pub fn resolve(&mut self) -> CompileResult<()> {
        self.expect_phase(Phase::Consumed, "resolve")?;
        resolve_module(&mut self.ctx).map_err(|e| self.report(e.into()))?;
        self.phase = Phase::Resolved;
        debug!(shapes = self.ctx.shapes.len(), "resolved module");
        Ok(())
    }

    /// Parse, consume and resolve a source string.
    pub fn compile_source(&mut self, source: &str) -> CompileResult<()> {
        let file = self.parse(source)?;
        self.consume_file(file)?;
        self.resolve()
    }

    /// Load, parse, consume and resolve a file.
    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> CompileResult<()> {
        let file = self.load_file(path)?;
        self.consume_file(file)?;
        self.resolve()
    }

    fn expect_phase(&mut self, expected: Phase, operation: &'static str) -> CompileResult<()> {
        if self.phase == expected {
            return Ok(());
        }
        Err(self.report(CompileError::Phase {
            operation,
            phase: self.phase,
        }))
    }

    /// Record an error as a diagnostic and hand it back.
    fn report(&mut self, error: CompileError) -> CompileError {
        self.ctx.diagnostics.push(error.to_diagnostic());
        error
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// The computed shape of a declaration, by name.
    pub fn resolved_shape(&self, name: &str) -> Option<&TypeShape> {
        let symbol = self.ctx.interner.get(name)?;
        self.ctx.shapes.get_symbol(symbol)
    }

    /// All declarations and their shapes, in dump order.
    pub fn resolved_shapes(&self) -> Vec<ShapeEntry> {
        dump::shape_report(&self.ctx)
    }

    /// The text dump of every declaration.
    pub fn dump(&self) -> String {
        dump::dump(&self.ctx)
    }

    pub fn has_errors(&self) -> bool {
        self.ctx.diagnostics.has_errors()
    }

    pub fn render_diagnostics(&self) -> String {
        self.ctx.diagnostics.render(&self.ctx.source_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Allocation, Bound, Payload};

    fn compile(source: &str) -> Module {
        let mut module = Module::new();
        module.compile_source(source).unwrap();
        module
    }

    fn sizes(module: &Module, name: &str) -> (u64, u64) {
        let shape = module.resolved_shape(name).unwrap();
        (shape.size, shape.alignment)
    }

    // ========================================================================
    // SHAPES
    // ========================================================================

    #[test]
    fn test_primitive_members() {
        let module = compile(
            r#"
            struct P1 { int8 a; };
            struct P2 { uint32 a; };
            struct P3 { uint64 a; };
            struct P4 { bool a; };
            struct P5 { float64 a; };
            struct P6 { handle a; };
            struct P7 { handle<channel> a; };
            "#,
        );

        assert_eq!(sizes(&module, "P1"), (1, 1));
        assert_eq!(sizes(&module, "P2"), (4, 4));
        assert_eq!(sizes(&module, "P3"), (8, 8));
        assert_eq!(sizes(&module, "P4"), (1, 1));
        assert_eq!(sizes(&module, "P5"), (8, 8));
        assert_eq!(sizes(&module, "P6"), (4, 4));
        assert_eq!(sizes(&module, "P7"), (4, 4));
    }

    #[test]
    fn test_array_member() {
        let module = compile("struct A { array<uint32>:4 values; };");
        assert_eq!(sizes(&module, "A"), (16, 4));
    }

    #[test]
    fn test_vector_member_allocation() {
        let module = compile("struct V { vector<uint8>:5 bytes; vector<uint8> rest; };");
        let shape = module.resolved_shape("V").unwrap();

        assert_eq!((shape.size, shape.alignment), (32, 8));
        assert_eq!(
            shape.allocations,
            vec![
                Allocation {
                    payload: Payload::Shape(TypeShape::new(1, 1)),
                    bound: Bound::Bounded(5),
                },
                Allocation {
                    payload: Payload::Shape(TypeShape::new(1, 1)),
                    bound: Bound::Unbounded,
                },
            ]
        );
    }

    #[test]
    fn test_union_fold() {
        let module = compile("union U { uint8 a; uint64 b; };");
        assert_eq!(sizes(&module, "U"), (8, 8));
    }

    #[test]
    fn test_enum_shape() {
        let module = compile("enum E : uint16 { A = 1; B = 2; };");
        assert_eq!(sizes(&module, "E"), (2, 2));
    }

    #[test]
    fn test_forward_reference_propagates_shape() {
        let module = compile("struct A { B b; }; struct B { int32 x; };");

        assert_eq!(sizes(&module, "A"), (4, 4));
        assert_eq!(sizes(&module, "B"), (4, 4));
    }

    #[test]
    fn test_self_referencing_vector_member() {
        let module = compile("struct Node { vector<Node> children; };");

        assert_eq!(sizes(&module, "Node"), (16, 8));
        assert!(module.dump().contains("\tNode\n\t\tsize: 16\n\t\talignment: 8\n"));
    }

    #[test]
    fn test_const_shape_is_type_shape() {
        let module = compile("const uint64 kBig = 0x10;");
        assert_eq!(sizes(&module, "kBig"), (8, 8));
    }

    // ========================================================================
    // FAILURES
    // ========================================================================

    #[test]
    fn test_duplicate_top_level_name_fails_at_consume() {
        let mut module = Module::new();
        let file = module.parse("struct X {}; enum X { A; };").unwrap();

        let err = module.consume_file(file).unwrap_err();
        assert!(matches!(err, CompileError::Consume(ConsumeError::DuplicateName { .. })));
        assert_eq!(module.phase(), Phase::Empty);
        assert!(module.has_errors());
        assert!(module.dump().contains("\nenum 0\n"));
    }

    #[test]
    fn test_failed_consume_keeps_first_declaration_only() {
        let mut module = Module::new();
        let file = module.parse("struct P { int8 a; }; struct P { int8 b; };").unwrap();

        assert!(module.consume_file(file).is_err());
        assert!(module.dump().contains("\nstruct 1\n\tP\n"));
    }

    #[test]
    fn test_resolve_before_consume_is_rejected() {
        let mut module = Module::new();
        assert!(matches!(
            module.resolve(),
            Err(CompileError::Phase {
                operation: "resolve",
                phase: Phase::Empty
            })
        ));
    }

    #[test]
    fn test_resolve_error_is_reported() {
        let mut module = Module::new();
        let err = module
            .compile_source("struct S { int32 a; int32 a; };")
            .unwrap_err();

        assert!(matches!(
            err,
            CompileError::Resolve(ResolveError::DuplicateName { .. })
        ));
        assert_eq!(module.phase(), Phase::Consumed);
        let rendered = module.render_diagnostics();
        assert!(rendered.contains("duplicate struct member name `a`"));
        assert!(rendered.contains("previously declared here"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let mut module = Module::new();
        assert!(matches!(
            module.parse("struct {"),
            Err(CompileError::Parse(_))
        ));
        assert!(module.has_errors());
    }

    #[test]
    fn test_missing_file() {
        let mut module = Module::new();
        assert!(matches!(
            module.load_file("/nonexistent/definitely/missing.fidl"),
            Err(CompileError::Io(_))
        ));
    }

    // ========================================================================
    // RESULTS
    // ========================================================================

    #[test]
    fn test_dump_through_module() {
        let module = compile("struct S { uint16 a; };");
        assert!(module.dump().contains("\nstruct 1\n\tS\n\t\tsize: 2\n\t\talignment: 2\n"));
    }

    #[test]
    fn test_resolved_shapes_report() {
        let module = compile("interface I { 1: M(); }; struct S { request<I> r; };");
        let report = module.resolved_shapes();

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].shape, None);
        assert_eq!(report[1].shape, Some(TypeShape::new(4, 4)));
        assert_eq!(module.resolved_shape("I"), None);
    }

    #[test]
    fn test_shared_interner() {
        let interner = Arc::new(Interner::new());
        let mut first = Module::with_interner(interner.clone());
        let mut second = Module::with_interner(interner.clone());

        first.compile_source("struct S { int8 a; };").unwrap();
        second.compile_source("struct S { int64 a; };").unwrap();

        assert_eq!(first.resolved_shape("S"), Some(&TypeShape::new(1, 1)));
        assert_eq!(second.resolved_shape("S"), Some(&TypeShape::new(8, 8)));
    }
}
