//! Syntax module - grammar, parsing, and AST definitions.

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::{parse, parse_with_source_id, ParseError};
