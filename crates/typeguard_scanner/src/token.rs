//! Token information produced by the scanner.

use typeguard_ast::syntax_kind::SyntaxKind;

/// A snapshot of one scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub kind: SyntaxKind,
    /// Start position in the source text.
    pub pos: u32,
    /// End position in the source text (exclusive).
    pub end: u32,
    /// The cooked value for literals, the name for identifiers.
    pub text: String,
    pub preceding_line_break: bool,
}

impl TokenInfo {
    pub fn len(&self) -> u32 {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }
}
