//! typeguard_scanner: Lexer for the typed script dialect.
//!
//! Produces tokens from source text, records comments for the printer, and
//! reports malformed literals as diagnostics instead of failing.

mod char_codes;
mod scanner;
mod token;

pub use char_codes::{is_identifier_part, is_identifier_start, is_identifier_text};
pub use scanner::{parse_numeric_literal, Scanner, ScannerState};
pub use token::TokenInfo;

/// Scan `text` to the end and return every token, for tests and tooling.
pub fn tokenize(text: &str) -> Vec<TokenInfo> {
    let mut scanner = Scanner::new(text);
    scanner.skip_shebang();
    let mut tokens = Vec::new();
    while scanner.scan() != typeguard_ast::syntax_kind::SyntaxKind::EndOfFileToken {
        tokens.push(scanner.token_info());
    }
    tokens
}
