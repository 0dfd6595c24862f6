//! User-facing diagnostic messages.
//!
//! Errors shown to the user name the offending input, say what went wrong,
//! and suggest a fix.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(&self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(false))
    }
}

/// A message with optional location, context lines and suggested fixes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = format!("{}: {}\n", self.severity.label(color), self.message);

        if let Some(path) = &self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for line in &self.context {
            output.push_str(&format!("  = {}\n", line));
        }

        if !self.suggestions.is_empty() {
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            output.push_str(&format!("\n{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// A user-specified source could not be read.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to read source file `{path}`: {reason}")]
#[diagnostic(
    code(makegen::resolve::source_unreadable),
    help("source files are never dropped silently; fix the path or remove it")
)]
pub struct SourceUnreadableError {
    pub path: String,
    pub reason: String,
}

/// The requested output format does not exist.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("unknown format `{name}`")]
#[diagnostic(code(makegen::config::unsupported_format))]
pub struct UnsupportedFormatError {
    pub name: String,
    #[help]
    pub supported: Option<String>,
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic as _;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to read source file `gone.c`")
            .with_location("gone.c")
            .with_context("No such file or directory")
            .with_suggestion("Check the path")
            .with_suggestion("Remove it from the command line");

        let output = diag.format(false);
        assert!(output.starts_with("error: failed to read source file `gone.c`\n"));
        assert!(output.contains("  --> gone.c\n"));
        assert!(output.contains("  = No such file or directory\n"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("  2. Remove it from the command line"));
    }

    #[test]
    fn test_color_only_when_requested() {
        let diag = Diagnostic::warning("unknown extension");
        assert!(!diag.format(false).contains('\x1b'));
        assert!(diag.format(true).contains("\x1b[1;33mwarning"));
    }

    #[test]
    fn test_unsupported_format_help() {
        let err = UnsupportedFormatError {
            name: "ninja".to_string(),
            supported: Some("supported formats are: make, cmake, automake".to_string()),
        };

        assert_eq!(err.to_string(), "unknown format `ninja`");
        let help = err.help().map(|h| h.to_string()).unwrap();
        assert!(help.contains("make, cmake, automake"));
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("makegen::config::unsupported_format")
        );
    }
}
