//! typeguard_parser: Recursive descent parser for the typed script dialect.
//!
//! Parses the scanner's token stream into an arena-allocated AST. Syntax
//! errors are reported as diagnostics and parsing continues, so callers always
//! get a tree back.

mod expressions;
mod parser;
mod precedence;
mod types;
mod utilities;

use bumpalo::Bump;
use typeguard_ast::node::SourceFile;
use typeguard_diagnostics::DiagnosticCollection;

pub use parser::Parser;

/// Parse `source_text` into `arena` and return the tree with its syntax
/// diagnostics.
pub fn parse_source_file<'a>(
    arena: &'a Bump,
    file_name: &str,
    source_text: &str,
) -> (SourceFile<'a>, DiagnosticCollection) {
    let mut parser = Parser::new(arena, file_name, source_text);
    let source_file = parser.parse_source_file();
    (source_file, parser.take_diagnostics())
}
