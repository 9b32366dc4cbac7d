//! vanadium_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Syntax errors, semantic errors found while binding, unresolved names and
//! type errors all end up as [`Diagnostic`]s in a [`DiagnosticCollection`].

use std::fmt;
use vanadium_core::text::{LineMap, TextRange};

mod semantic;

pub use semantic::{SemanticError, SemanticErrorKind};

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Hint,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Hint => write!(f, "hint"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code.
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source range where this diagnostic occurred, if any.
    pub range: Option<TextRange>,
    /// The formatted message.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            range: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic with file and range info.
    pub fn with_location(
        file: &str,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file.to_string()),
            range: Some(range),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// Render as `file:line:col: category Vcode: message`, 1-based.
    pub fn render(&self, lines: &LineMap) -> String {
        match (&self.file, self.range) {
            (Some(file), Some(range)) => {
                let lc = lines.line_and_column_of(range.pos);
                format!(
                    "{}:{}:{}: {} V{}: {}",
                    file,
                    lc.line + 1,
                    lc.character + 1,
                    self.category,
                    self.code,
                    self.message_text
                )
            }
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(range) = self.range {
                write!(f, "({})", range.pos)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} V{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.range.map(|r| r.pos).cmp(&b.range.map(|r| r.pos)))
        });
    }
}

impl Extend<Diagnostic> for DiagnosticCollection {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Hint, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Hint, message: $msg }
        };
    }

    // ========================================================================
    // Scanner and parser errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1003, Error, "Identifier expected.");
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1005, Error, "'{0}' expected.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1010, Error, "'*/' expected.");
    pub const UNEXPECTED_TOKEN_0: DiagnosticMessage = diag!(1012, Error, "Unexpected token '{0}'.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1127, Error, "Invalid character.");
    pub const DEFINITION_EXPECTED: DiagnosticMessage = diag!(1128, Error, "Definition expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1109, Error, "Expression expected.");
    pub const TYPE_EXPECTED: DiagnosticMessage = diag!(1110, Error, "Type expected.");
    pub const STATEMENT_EXPECTED: DiagnosticMessage = diag!(1129, Error, "Statement expected.");

    // ========================================================================
    // Binder errors (2000-2099)
    // ========================================================================
    pub const REDEFINITION_OF_0: DiagnosticMessage = diag!(2001, Error, "Redefinition of '{0}'.");
    pub const RUNS_ON_REQUIRES_COMPONENT: DiagnosticMessage = diag!(2002, Error, "'runs on' clause requires a component type.");
    pub const CLASS_CAN_BE_EXTENDED_BY_CLASS_ONLY: DiagnosticMessage = diag!(2003, Error, "A class can only extend another class.");
    pub const COMPONENT_CAN_BE_EXTENDED_BY_COMPONENT_ONLY: DiagnosticMessage = diag!(2004, Error, "A component can only extend another component.");
    pub const ABSTRACT_FUNCTION_IN_NON_ABSTRACT_CLASS: DiagnosticMessage = diag!(2005, Error, "Abstract functions are only allowed in abstract classes.");
    pub const ONLY_ONE_MODULE_PER_FILE: DiagnosticMessage = diag!(2006, Error, "Only one module per file is supported.");

    // ========================================================================
    // Cross-module resolution (2100-2199)
    // ========================================================================
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2101, Error, "Cannot find name '{0}'.");
    pub const CANNOT_FIND_MODULE_0: DiagnosticMessage = diag!(2102, Error, "Cannot find module '{0}'.");
    pub const IMPORT_OF_0_IS_UNUSED: DiagnosticMessage = diag!(2103, Hint, "Import of module '{0}' is never used.");
    pub const CANNOT_FIND_MODULE_0_THROUGH_1: DiagnosticMessage = diag!(2104, Error, "Cannot find module '{0}' imported through '{1}'.");
    pub const FAILED_TO_TRANSFORM_0_1: DiagnosticMessage = diag!(2201, Error, "Failed to transform '{0}': {1}");

    // ========================================================================
    // Type checking (3000-3999)
    // ========================================================================
    pub const TYPE_ERROR_0: DiagnosticMessage = diag!(3001, Error, "{0}");
    pub const DUPLICATE_MODULE_0: DiagnosticMessage = diag!(3002, Warning, "Module '{0}' is declared in more than one file.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let d = Diagnostic::new(&messages::REDEFINITION_OF_0, &["x"]);
        assert_eq!(d.message_text, "Redefinition of 'x'.");
        assert_eq!(d.code, 2001);
        assert!(d.is_error());
    }

    #[test]
    fn test_sort_and_render() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::with_location("a.ttcn", TextRange::new(12, 13), &messages::CANNOT_FIND_NAME_0, &["y"]));
        diags.add(Diagnostic::with_location("a.ttcn", TextRange::new(2, 3), &messages::CANNOT_FIND_NAME_0, &["x"]));
        diags.sort();
        assert_eq!(diags.diagnostics()[0].message_text, "Cannot find name 'x'.");

        let lines = LineMap::new("module M {\n  y\n}");
        assert_eq!(
            diags.diagnostics()[1].render(&lines),
            "a.ttcn:2:2: error V2101: Cannot find name 'y'."
        );
        assert_eq!(diags.error_count(), 2);
    }
}
