//! typeguard_diagnostics: Diagnostic records and the message catalogue.
//!
//! Every stage of the compiler reports problems as [`Diagnostic`] values built
//! from a fixed [`DiagnosticMessage`] template. Diagnostics never decide whether
//! a compilation fails; that policy belongs to the caller.

use std::fmt;
use typeguard_core::text::TextSpan;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A message template. `{0}`, `{1}`, ... are replaced by arguments.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// A realized diagnostic with resolved text and an optional location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic with no location.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: &str,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file.to_string()),
            span: Some(span),
            ..Self::new(message, args)
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} TG{}: {}", self.category, self.code, self.message_text)
    }
}

/// Substitute `{0}`, `{1}`, ... in a template.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Ordered diagnostics accumulated by one stage.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
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

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// The message texts, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| d.message_text.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Drop everything reported after `len`. Used to roll back speculative parses.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    /// Stable sort by file, then position. Diagnostics without a span keep
    /// their relative order at the front of their file.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.span.map(|s| s.start).cmp(&b.span.map(|s| s.start)))
        });
    }
}

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const ASTERISK_SLASH_EXPECTED: DiagnosticMessage = diag!(1010, Error, "'*/' expected.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1027, Error, "Invalid character.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = diag!(1060, Error, "Unterminated template literal.");
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: DiagnosticMessage = diag!(1061, Error, "Unterminated regular expression literal.");
    pub const DIGIT_EXPECTED: DiagnosticMessage = diag!(1024, Error, "Digit expected.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1103, Error, "Identifier expected.");
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1105, Error, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN_0: DiagnosticMessage = diag!(1112, Error, "Unexpected token '{0}'.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1109, Error, "Expression expected.");
    pub const TYPE_EXPECTED: DiagnosticMessage = diag!(1110, Error, "Type expected.");
    pub const DECLARATION_OR_STATEMENT_EXPECTED: DiagnosticMessage = diag!(1128, Error, "Declaration or statement expected.");
    pub const PROPERTY_OR_SIGNATURE_EXPECTED: DiagnosticMessage = diag!(1131, Error, "Property or signature expected.");
    pub const ENUM_MEMBER_EXPECTED: DiagnosticMessage = diag!(1132, Error, "Enum member expected.");
    pub const CLASS_MEMBER_EXPECTED: DiagnosticMessage = diag!(1168, Error, "A constructor, method, accessor, or property was expected.");
    pub const A_REST_PARAMETER_MUST_BE_LAST: DiagnosticMessage = diag!(1114, Error, "A rest parameter must be last in a parameter list.");
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: DiagnosticMessage = diag!(1199, Error, "Maximum nesting depth exceeded.");

    // ========================================================================
    // Static analysis (2000-2999)
    // ========================================================================
    pub const TYPE_MISMATCH: DiagnosticMessage = diag!(2322, Error, "{0}: type mismatch, expected {1} but got {2}");
    pub const MISSING_REQUIRED_PROPERTY: DiagnosticMessage = diag!(2741, Error, "{0}: missing required property '{1}' of type {2}");

    // ========================================================================
    // Type model construction (5000-5099)
    // ========================================================================
    pub const RECURSIVE_REFERENCE_0_NOT_SUPPORTED: DiagnosticMessage = diag!(5001, Warning, "Recursive reference to '{0}' is not supported; it is treated as 'unknown'.");
    pub const TYPE_0_NESTED_TOO_DEEPLY: DiagnosticMessage = diag!(5002, Warning, "Type '{0}' is nested too deeply; the remainder is treated as 'unknown'.");
    pub const DUPLICATE_DECLARATION_0: DiagnosticMessage = diag!(5003, Warning, "Duplicate declaration of '{0}'; the first declaration is used.");
    pub const ENUM_MEMBER_0_NOT_CONSTANT: DiagnosticMessage = diag!(5004, Warning, "Enum member '{0}' does not have a constant value.");
    pub const TYPE_0_USED_BEFORE_DECLARATION: DiagnosticMessage = diag!(5005, Warning, "Type '{0}' is used before its declaration; it is treated as 'unknown'.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("{0}: type mismatch, expected {1} but got {2}", &["'age'", "number", "\"25\""]);
        assert_eq!(msg, "'age': type mismatch, expected number but got \"25\"");
    }

    #[test]
    fn test_format_message_keeps_literal_braces() {
        assert_eq!(format_message("{ a } {0}", &["x"]), "{ a } x");
        assert_eq!(format_message("{7}", &["x"]), "{7}");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(
            "main.ts",
            TextSpan::new(10, 3),
            &messages::TYPE_EXPECTED,
            &[],
        );
        let display = diag.to_string();
        assert_eq!(display, "main.ts(10): error TG1110: Type expected.");
    }

    #[test]
    fn test_collection_counts_and_messages() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());
        collection.add(Diagnostic::new(&messages::DUPLICATE_DECLARATION_0, &["User"]));
        collection.add(Diagnostic::new(&messages::UNTERMINATED_STRING_LITERAL, &[]));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.error_count(), 1);
        assert!(collection.has_errors());
        assert_eq!(
            collection.messages()[0],
            "Duplicate declaration of 'User'; the first declaration is used."
        );
    }

    #[test]
    fn test_truncate_rolls_back() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::new(&messages::EXPRESSION_EXPECTED, &[]));
        let mark = collection.len();
        collection.add(Diagnostic::new(&messages::TYPE_EXPECTED, &[]));
        collection.truncate(mark);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_sort_by_position() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::with_location("a.ts", TextSpan::new(20, 1), &messages::TYPE_EXPECTED, &[]));
        collection.add(Diagnostic::with_location("a.ts", TextSpan::new(5, 1), &messages::EXPRESSION_EXPECTED, &[]));
        collection.sort();
        assert_eq!(collection.diagnostics()[0].code, 1109);
    }
}
