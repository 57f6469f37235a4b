//! Scanner integration tests.

use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::CommentKind;
use typeguard_scanner::{tokenize, Scanner};

fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    tokenize(source).into_iter().map(|t| (t.kind, t.text)).collect()
}

fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  ").is_empty());
}

#[test]
fn test_numeric_literals() {
    let tokens = scan_all("42 3.14 0xFF 0b1010 0o777 1_000 .5 1e-3");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, ["42", "3.14", "0xFF", "0b1010", "0o777", "1_000", ".5", "1e-3"]);
    assert!(tokens.iter().all(|(k, _)| *k == SyntaxKind::NumericLiteral));
}

#[test]
fn test_bigint_literals() {
    assert_eq!(
        scan_kinds("42n 0xFFn 0b1n"),
        vec![SyntaxKind::BigIntLiteral; 3]
    );
}

#[test]
fn test_annotated_declaration_tokens() {
    assert_eq!(
        scan_kinds("let age: number = \"25\";"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        scan_kinds("=> ?? ??= ?. ... ** **= && &&= || ||= !== ==="),
        vec![
            SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::QuestionQuestionToken,
            SyntaxKind::QuestionQuestionEqualsToken,
            SyntaxKind::QuestionDotToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::AsteriskAsteriskToken,
            SyntaxKind::AsteriskAsteriskEqualsToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::AmpersandAmpersandEqualsToken,
            SyntaxKind::BarBarToken,
            SyntaxKind::BarBarEqualsToken,
            SyntaxKind::ExclamationEqualsEqualsToken,
            SyntaxKind::EqualsEqualsEqualsToken,
        ]
    );
}

#[test]
fn test_optional_chain_before_digit_is_conditional() {
    assert_eq!(
        scan_kinds("a?.5:1"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::QuestionToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::ColonToken,
            SyntaxKind::NumericLiteral,
        ]
    );
}

#[test]
fn test_nested_type_arguments_close_separately() {
    let kinds = scan_kinds("Array<Array<number>>");
    assert_eq!(kinds[kinds.len() - 1], SyntaxKind::GreaterThanToken);
    assert_eq!(kinds[kinds.len() - 2], SyntaxKind::GreaterThanToken);
}

#[test]
fn test_template_pieces() {
    let mut scanner = Scanner::new("`a${x}b${y}c`");
    assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
    assert_eq!(scanner.token_value(), "a");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateMiddle);
    assert_eq!(scanner.token_value(), "b");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateTail);
    assert_eq!(scanner.token_raw(), "c");
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_regex_rescan() {
    let mut scanner = Scanner::new("/[/]+\\d/gi.test");
    assert_eq!(scanner.scan(), SyntaxKind::SlashToken);
    assert_eq!(scanner.rescan_slash_token(), SyntaxKind::RegularExpressionLiteral);
    assert_eq!(scanner.token_text(), "/[/]+\\d/gi");
    assert_eq!(scanner.scan(), SyntaxKind::DotToken);
}

#[test]
fn test_comments_are_recorded() {
    let mut scanner = Scanner::new("// lead\nlet /* inner */ x");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(!scanner.has_preceding_line_break());
    let comments = scanner.take_comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].kind, CommentKind::SingleLine);
    assert_eq!(comments[1].kind, CommentKind::MultiLine);
    assert_eq!(comments[1].range.pos, 12);
}

#[test]
fn test_restore_discards_comments_and_diagnostics() {
    let mut scanner = Scanner::new("a /* c */ \"open");
    scanner.scan();
    let state = scanner.save_state();
    scanner.scan();
    assert_eq!(scanner.diagnostics().len(), 1);
    scanner.restore_state(state);
    assert!(scanner.diagnostics().is_empty());
    assert!(scanner.take_comments().is_empty());
}

#[test]
fn test_multiline_comment_sets_line_break() {
    let mut scanner = Scanner::new("a /*\n*/ b");
    scanner.scan();
    scanner.scan();
    assert!(scanner.has_preceding_line_break());
}

#[test]
fn test_private_identifier() {
    let tokens = scan_all("#count");
    assert_eq!(tokens, vec![(SyntaxKind::PrivateIdentifier, "#count".to_string())]);
}

#[test]
fn test_unicode_identifier_and_positions() {
    let tokens = tokenize("const größe = 1");
    assert_eq!(tokens[1].text, "größe");
    assert_eq!(tokens[1].pos, 6);
    assert_eq!(tokens[1].end, 6 + "größe".len() as u32);
}

#[test]
fn test_shebang_skipping() {
    let kinds = scan_kinds("#!/usr/bin/env node\nlet x = 1;");
    assert_eq!(kinds[0], SyntaxKind::Identifier);
}

#[test]
fn test_invalid_character_reports() {
    let mut scanner = Scanner::new("a \u{0} b").with_file_name("bad.ts");
    scanner.scan();
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    let diags = scanner.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.diagnostics()[0].file.as_deref(), Some("bad.ts"));
}

#[test]
fn test_no_diagnostics_for_valid_source() {
    let mut scanner = Scanner::new("function add(a: number, b: number): number { return a + b; }");
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    assert!(scanner.diagnostics().is_empty());
}
