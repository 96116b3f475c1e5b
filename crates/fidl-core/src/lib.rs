//! FIDL front end
//!
//! This crate implements semantic analysis and wire layout for FIDL
//! declarations:
//! - Flat declaration tables with typed indices
//! - Two-pass compilation: Consume (AST → tables) then Resolve
//! - Wire shapes: inline size, alignment and out-of-line allocations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ModuleContext                                 │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐            │
//! │  │ Interner  │  │   Decls   │  │ Registry  │  │  Shapes   │            │
//! │  │ (strings) │  │ (tables)  │  │(name→decl)│  │(resolved) │            │
//! │  └───────────┘  └───────────┘  └───────────┘  └───────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                        ↑               ↑               ↑
//!                        │               │               │
//!    ┌─────────┐    ┌────┴────┐    ┌─────┴─────┐    ┌────┴────┐
//!    │  Parse  │ →  │ Consume │ →  │  Resolve  │ →  │  Dump   │
//!    │  (AST)  │    │         │    │  (shape)  │    │         │
//!    └─────────┘    └─────────┘    └───────────┘    └─────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use fidl_core::Module;
//!
//! let mut module = Module::new();
//! module
//!     .compile_source("struct A { B b; }; struct B { int32 x; };")
//!     .unwrap();
//!
//! let shape = module.resolved_shape("A").unwrap();
//! assert_eq!((shape.size, shape.alignment), (4, 4));
//! ```

// Core modules
pub mod constant;
pub mod context;
pub mod declarations;
pub mod diagnostic;
pub mod ids;
pub mod index_vec;
pub mod interner;
pub mod scope;
pub mod source;
pub mod syntax;

// Passes
pub mod consume;
pub mod module;
pub mod resolve;
pub mod shape;

// Output
pub mod dump;

// Re-exports
pub use consume::ConsumeError;
pub use context::ModuleContext;
pub use declarations::{Declarations, Name};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use dump::ShapeEntry;
pub use ids::{DeclKind, DeclRef};
pub use index_vec::{Idx, IndexVec};
pub use interner::{Interner, Symbol};
pub use module::{CompileError, CompileResult, Module, Phase};
pub use resolve::{ResolveError, ScopeKind};
pub use scope::Scope;
pub use shape::{Allocation, Bound, Payload, TypeShape};
pub use source::{Source, SourceId, SourceMap, Span};
pub use syntax::{parse, ParseError};
