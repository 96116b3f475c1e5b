//! Source file management for diagnostics.
//!
//! The SourceMap owns the text of every loaded `.fidl` file. The parser
//! stamps each AST node with a [`Span`] pointing back into it, which is
//! how consume/resolve errors find their way to a line and column.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Unique identifier for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// A source file with its content and metadata.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: SourceId,
    /// None for inline sources.
    pub path: Option<PathBuf>,
    pub content: String,
}

impl Source {
    /// Get a display name for this source.
    pub fn name(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("<source#{}>", self.id.0))
    }

    /// Get the 1-based line and column for a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in self.content.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Get the source lines around `line`, prefixed with line numbers.
    pub fn snippet(&self, line: usize, context: usize) -> String {
        let lines: Vec<&str> = self.content.lines().collect();
        let start = line.saturating_sub(context + 1);
        let end = (line + context).min(lines.len());
        if start >= end {
            return String::new();
        }

        lines[start..end]
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{:4} | {}", start + i + 1, l))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Manages a collection of source files.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    sources: HashMap<SourceId, Source>,
    path_to_id: HashMap<PathBuf, SourceId>,
    next_id: u32,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file from disk and add it to the map.
    ///
    /// Loading the same path twice returns the existing ID.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<SourceId> {
        let path = path.as_ref();
        if let Some(&id) = self.path_to_id.get(path) {
            return Ok(id);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_file(path, content))
    }

    /// Add a source file with a path.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> SourceId {
        let path = path.into();

        if let Some(&id) = self.path_to_id.get(&path) {
            return id;
        }

        let id = self.next_source_id();
        self.path_to_id.insert(path.clone(), id);
        self.sources.insert(
            id,
            Source {
                id,
                path: Some(path),
                content: content.into(),
            },
        );
        id
    }

    /// Add an inline source (no path).
    pub fn add_inline(&mut self, content: impl Into<String>) -> SourceId {
        let id = self.next_source_id();
        self.sources.insert(
            id,
            Source {
                id,
                path: None,
                content: content.into(),
            },
        );
        id
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn next_source_id(&mut self) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// A byte range in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub source: SourceId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(source: SourceId, start: usize, end: usize) -> Self {
        Self { source, start, end }
    }

    /// Create a zero-length span at a position.
    pub fn point(source: SourceId, offset: usize) -> Self {
        Self::new(source, offset, offset)
    }
}

impl Default for SourceId {
    fn default() -> Self {
        SourceId(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let mut map = SourceMap::new();
        let id = map.add_inline("struct A {\n    int32 x;\n};\n");
        let source = map.get(id).unwrap();

        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(11), (2, 1));
        assert_eq!(source.line_col(15), (2, 5));
    }

    #[test]
    fn test_add_file_dedup() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.fidl", "struct A {};");
        let b = map.add_file("a.fidl", "ignored");
        let c = map.add_inline("struct C {};");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(a).unwrap().name(), "a.fidl");
        assert_eq!(map.get(c).unwrap().name(), "<source#1>");
    }

    #[test]
    fn test_snippet() {
        let mut map = SourceMap::new();
        let id = map.add_inline("one\ntwo\nthree\n");
        let source = map.get(id).unwrap();

        assert_eq!(source.snippet(2, 0), "   2 | two");
        assert_eq!(source.snippet(2, 1), "   1 | one\n   2 | two\n   3 | three");
    }
}
