//! Diagnostic types for error reporting.

use crate::source::{SourceMap, Span};
use std::fmt;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Note => f.write_str("note"),
        }
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub code: Option<&'static str>,
    /// Secondary locations, e.g. the earlier declaration of a duplicate name.
    pub related: Vec<(String, Span)>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
            code: None,
            related: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_related(mut self, message: impl Into<String>, span: Span) -> Self {
        self.related.push((message.into(), span));
        self
    }

    /// Render the diagnostic with source context.
    pub fn render(&self, source_map: &SourceMap) -> String {
        let mut output = match self.code {
            Some(code) => format!("{}[{}]: {}\n", self.severity, code, self.message),
            None => format!("{}: {}\n", self.severity, self.message),
        };

        if let Some(span) = self.span {
            render_location(&mut output, source_map, span);
        }

        for (message, span) in &self.related {
            output.push_str(&format!("  = {}: {}\n", Severity::Note, message));
            render_location(&mut output, source_map, *span);
        }

        output
    }
}

fn render_location(output: &mut String, source_map: &SourceMap, span: Span) {
    if let Some(source) = source_map.get(span.source) {
        let (line, col) = source.line_col(span.start);
        output.push_str(&format!("  --> {}:{}:{}\n", source.name(), line, col));
        let snippet = source.snippet(line, 0);
        if !snippet.is_empty() {
            output.push_str(&snippet);
            output.push('\n');
        }
    }
}

/// A collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Render all diagnostics.
    pub fn render(&self, source_map: &SourceMap) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.render(source_map))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diag in &self.diagnostics {
            writeln!(f, "{}: {}", diag.severity, diag.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_location() {
        let mut map = SourceMap::new();
        let id = map.add_file("point.fidl", "struct Point {\n    int32 x;\n    int32 x;\n};\n");

        let diag = Diagnostic::error("duplicate struct member name `x`")
            .with_code("E0201")
            .with_span(Span::new(id, 38, 39))
            .with_related("previously declared here", Span::new(id, 25, 26));

        let rendered = diag.render(&map);
        assert!(rendered.starts_with("error[E0201]: duplicate struct member name `x`\n"));
        assert!(rendered.contains("  --> point.fidl:3:11\n"));
        assert!(rendered.contains("  = note: previously declared here\n"));
        assert!(rendered.contains("  --> point.fidl:2:11\n"));
    }

    #[test]
    fn test_error_count() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.push(Diagnostic::error("first"));
        diags.push(Diagnostic::error("second"));

        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.to_string(), "error: first\nerror: second\n");
    }
}
