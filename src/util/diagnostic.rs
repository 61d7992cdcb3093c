//! User-facing diagnostic messages.
//!
//! Errors carry the root cause, any context lines, and a suggested fix.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages.
pub mod suggestions {
    /// Suggestion when no solution description is found.
    pub const NO_SOLUTION: &str =
        "help: Pass the description with `--solution <path>` or run from its folder";

    /// Suggestion when a project is not found.
    pub const PROJECT_NOT_FOUND: &str = "help: Run `slnmake tree` to see the projects in the solution";
}

/// An error message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self) -> String {
        let mut output = format!("error: {}\n", self.message);

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nhelp: consider:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl Diagnostic {
    /// Convert to an error for `main` to report, keeping context and help
    /// lines.
    pub fn into_error(self) -> anyhow::Error {
        let mut text = self.message;
        for ctx in &self.context {
            text.push_str(&format!("\n  = {}", ctx));
        }
        for suggestion in &self.suggestions {
            text.push_str(&format!("\nhelp: {}", suggestion));
        }
        anyhow::anyhow!(text)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// The override document is not well-formed XML.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("malformed override document at line {line}, column {column}: {message}")]
#[diagnostic(
    code(slnmake::overrides::syntax),
    help("Check that every element is closed and every attribute is quoted")
)]
pub struct OverrideSyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

impl OverrideSyntaxError {
    /// Build an error pointing at byte `offset` of `text`.
    pub fn at(name: &str, text: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..floor_char_boundary(text, offset)];
        let line = before.matches('\n').count() + 1;
        let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        OverrideSyntaxError {
            message: message.into(),
            line,
            column,
            src: NamedSource::new(name, text.to_string()),
            span: SourceSpan::from(offset),
        }
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("project `Core` is defined more than once")
            .with_context("first defined in solution.toml")
            .with_suggestion("Rename one of the `Core` projects");

        let output = diag.format();
        assert!(output.contains("error: project `Core`"));
        assert!(output.contains("first defined"));
        assert!(output.contains("1. Rename one"));
    }

    #[test]
    fn test_into_error_keeps_help() {
        let err = Diagnostic::error("project `Mathz` not found")
            .with_context("did you mean: Mathx")
            .with_suggestion("Run `slnmake tree` to see the projects in the solution")
            .into_error();
        assert_eq!(
            err.to_string(),
            "project `Mathz` not found\n  = did you mean: Mathx\n\
             help: Run `slnmake tree` to see the projects in the solution"
        );
    }

    #[test]
    fn test_override_syntax_error_position() {
        let text = "<Root>\n  <AllProjects>\n</Root>";
        let offset = text.find("</Root>").unwrap();
        let err = OverrideSyntaxError::at("slnmake.config", text, offset, "mismatched end tag");
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 1);
        assert!(err.to_string().contains("line 3, column 1"));
    }
}
