//! The scanner.
//!
//! Converts source text into the token stream the parser consumes. Positions
//! are byte offsets. Contextual keywords are left as identifiers, `>` is always
//! scanned alone (the parser asks for `>>`, `>=` and friends with
//! [`Scanner::rescan_greater_than_token`]), and `/` is rescanned as a regular
//! expression on request.

use crate::char_codes::*;
use crate::token::TokenInfo;
use typeguard_ast::node::Comment;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::CommentKind;
use typeguard_core::text::{TextRange, TextSpan};
use typeguard_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_raw_range: (usize, usize),
    preceding_line_break: bool,
    unterminated: bool,
    diagnostics_len: usize,
    comments_len: usize,
}

pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    file_name: &'a str,
    pos: usize,
    /// Start of the current token, after leading trivia.
    token_start: usize,
    token: SyntaxKind,
    /// Cooked value: escapes resolved for strings and templates.
    token_value: String,
    /// Literal content between the delimiters of a string or template piece.
    token_raw_range: (usize, usize),
    preceding_line_break: bool,
    unterminated: bool,
    comments: Vec<Comment>,
    diagnostics: DiagnosticCollection,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            file_name: "",
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_raw_range: (0, 0),
            preceding_line_break: false,
            unterminated: false,
            comments: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Attach a file name to the diagnostics this scanner reports.
    pub fn with_file_name(mut self, file_name: &'a str) -> Self {
        self.file_name = file_name;
        self
    }

    /// Skip a `#!` line at the very start of the file.
    pub fn skip_shebang(&mut self) {
        if self.pos == 0 && self.text.starts_with("#!") {
            self.pos = memchr::memchr2(b'\n', b'\r', self.bytes).unwrap_or(self.bytes.len());
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Run `f` and restore the scanner afterwards.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Run `f` and restore the scanner only if it returns `None`.
    pub fn try_scan<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let state = self.save_state();
        let result = f(self);
        if result.is_none() {
            self.restore_state(state);
        }
        result
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// The cooked value of the current token.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// The source text of the current token.
    #[inline]
    pub fn token_text(&self) -> &'a str {
        &self.text[self.token_start..self.pos]
    }

    /// For strings and template pieces, the uncooked text between delimiters.
    #[inline]
    pub fn token_raw(&self) -> &'a str {
        let (start, end) = self.token_raw_range;
        &self.text[start..end]
    }

    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.unterminated
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Comments seen so far, in source order.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            kind: self.token,
            pos: self.token_start as u32,
            end: self.pos as u32,
            text: self.token_value.clone(),
            preceding_line_break: self.preceding_line_break,
        }
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_raw_range: self.token_raw_range,
            preceding_line_break: self.preceding_line_break,
            unterminated: self.unterminated,
            diagnostics_len: self.diagnostics.len(),
            comments_len: self.comments.len(),
        }
    }

    /// Restore a saved state, discarding diagnostics and comments reported since.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.token_raw_range = state.token_raw_range;
        self.preceding_line_break = state.preceding_line_break;
        self.unterminated = state.unterminated;
        self.diagnostics.truncate(state.diagnostics_len);
        self.comments.truncate(state.comments_len);
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn error_at(&mut self, start: usize, end: usize, message: &DiagnosticMessage) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name,
            TextSpan::from_bounds(start as u32, end as u32),
            message,
            &[],
        ));
    }

    fn push_comment(&mut self, start: usize, end: usize, kind: CommentKind) {
        // Comments before a rescanned token are seen twice.
        if self.comments.last().map_or(true, |c| (c.range.pos as usize) < start) {
            self.comments.push(Comment {
                range: TextRange::new(start as u32, end as u32),
                kind,
            });
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.byte_at(0) {
            match b {
                b'\r' | b'\n' => {
                    self.preceding_line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'/' if self.byte_at(1) == Some(b'/') => {
                    let start = self.pos;
                    let rest = &self.bytes[self.pos..];
                    self.pos += memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
                    self.push_comment(start, self.pos, CommentKind::SingleLine);
                }
                b'/' if self.byte_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let body = &self.bytes[self.pos + 2..];
                    let (body_len, closed) = match memchr::memmem::find(body, b"*/") {
                        Some(i) => (i, true),
                        None => (body.len(), false),
                    };
                    if memchr::memchr2(b'\n', b'\r', &body[..body_len]).is_some() {
                        self.preceding_line_break = true;
                    }
                    self.pos += 2 + body_len;
                    if closed {
                        self.pos += 2;
                    } else {
                        self.error_at(self.pos, self.pos, &messages::ASTERISK_SLASH_EXPECTED);
                    }
                    self.push_comment(start, self.pos, CommentKind::MultiLine);
                }
                b if b < 0x80 => return,
                _ => match self.current_char() {
                    Some(ch) if is_line_break(ch) => {
                        self.preceding_line_break = true;
                        self.pos += ch.len_utf8();
                    }
                    Some(ch) if is_white_space_single_line(ch) => self.pos += ch.len_utf8(),
                    _ => return,
                },
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.preceding_line_break = false;
        self.unterminated = false;
        self.token_value.clear();

        self.skip_trivia();
        self.token_start = self.pos;

        let b = match self.byte_at(0) {
            Some(b) => b,
            None => {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            }
        };

        self.token = match b {
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'~' => self.single(SyntaxKind::TildeToken),
            b'@' => self.single(SyntaxKind::AtToken),
            b':' => self.single(SyntaxKind::ColonToken),
            b'>' => self.single(SyntaxKind::GreaterThanToken),

            b'.' => self.scan_dot(),
            b'?' => self.scan_question(),
            b'<' => self.scan_operator(
                SyntaxKind::LessThanToken,
                SyntaxKind::LessThanEqualsToken,
                Some((SyntaxKind::LessThanLessThanToken, SyntaxKind::LessThanLessThanEqualsToken)),
            ),
            b'=' => self.scan_equals(),
            b'!' => self.scan_exclamation(),
            b'+' => self.scan_operator(
                SyntaxKind::PlusToken,
                SyntaxKind::PlusEqualsToken,
                Some((SyntaxKind::PlusPlusToken, SyntaxKind::PlusPlusToken)),
            ),
            b'-' => self.scan_operator(
                SyntaxKind::MinusToken,
                SyntaxKind::MinusEqualsToken,
                Some((SyntaxKind::MinusMinusToken, SyntaxKind::MinusMinusToken)),
            ),
            b'*' => self.scan_operator(
                SyntaxKind::AsteriskToken,
                SyntaxKind::AsteriskEqualsToken,
                Some((SyntaxKind::AsteriskAsteriskToken, SyntaxKind::AsteriskAsteriskEqualsToken)),
            ),
            b'/' => self.scan_operator(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken, None),
            b'%' => self.scan_operator(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken, None),
            b'^' => self.scan_operator(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken, None),
            b'&' => self.scan_operator(
                SyntaxKind::AmpersandToken,
                SyntaxKind::AmpersandEqualsToken,
                Some((SyntaxKind::AmpersandAmpersandToken, SyntaxKind::AmpersandAmpersandEqualsToken)),
            ),
            b'|' => self.scan_operator(
                SyntaxKind::BarToken,
                SyntaxKind::BarEqualsToken,
                Some((SyntaxKind::BarBarToken, SyntaxKind::BarBarEqualsToken)),
            ),

            b'\'' | b'"' => self.scan_string_literal(b),
            b'`' => {
                self.pos += 1;
                self.scan_template_piece(SyntaxKind::NoSubstitutionTemplateLiteral, SyntaxKind::TemplateHead)
            }
            b'0'..=b'9' => self.scan_number(),
            b'#' => self.scan_private_identifier(),

            _ => match self.current_char() {
                Some(ch) if is_identifier_start(ch) => self.scan_identifier(),
                Some(ch) => {
                    self.pos += ch.len_utf8();
                    self.error_at(self.token_start, self.pos, &messages::INVALID_CHARACTER);
                    SyntaxKind::Unknown
                }
                None => SyntaxKind::EndOfFileToken,
            },
        };

        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// Scan `op`, `op=`, and optionally `opop` / `opop=`.
    fn scan_operator(
        &mut self,
        plain: SyntaxKind,
        with_equals: SyntaxKind,
        doubled: Option<(SyntaxKind, SyntaxKind)>,
    ) -> SyntaxKind {
        let op = self.bytes[self.pos];
        if let Some((double, double_equals)) = doubled {
            if self.byte_at(1) == Some(op) {
                if self.byte_at(2) == Some(b'=') && double != double_equals {
                    self.pos += 3;
                    return double_equals;
                }
                self.pos += 2;
                return double;
            }
        }
        if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            return with_equals;
        }
        self.pos += 1;
        plain
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.byte_at(1) == Some(b'.') && self.byte_at(2) == Some(b'.') {
            self.pos += 3;
            SyntaxKind::DotDotDotToken
        } else if self.byte_at(1).map_or(false, is_digit) {
            self.scan_number()
        } else {
            self.pos += 1;
            SyntaxKind::DotToken
        }
    }

    fn scan_question(&mut self) -> SyntaxKind {
        if self.byte_at(1) == Some(b'?') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::QuestionQuestionEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::QuestionQuestionToken
            }
        } else if self.byte_at(1) == Some(b'.') && !self.byte_at(2).map_or(false, is_digit) {
            self.pos += 2;
            SyntaxKind::QuestionDotToken
        } else {
            self.pos += 1;
            SyntaxKind::QuestionToken
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        match (self.byte_at(1), self.byte_at(2)) {
            (Some(b'='), Some(b'=')) => {
                self.pos += 3;
                SyntaxKind::EqualsEqualsEqualsToken
            }
            (Some(b'='), _) => {
                self.pos += 2;
                SyntaxKind::EqualsEqualsToken
            }
            (Some(b'>'), _) => {
                self.pos += 2;
                SyntaxKind::EqualsGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::EqualsToken
            }
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        match (self.byte_at(1), self.byte_at(2)) {
            (Some(b'='), Some(b'=')) => {
                self.pos += 3;
                SyntaxKind::ExclamationEqualsEqualsToken
            }
            (Some(b'='), _) => {
                self.pos += 2;
                SyntaxKind::ExclamationEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::ExclamationToken
            }
        }
    }

    fn scan_string_literal(&mut self, quote: u8) -> SyntaxKind {
        self.pos += 1;
        let content_start = self.pos;
        let mut cooked = String::new();
        loop {
            let Some(b) = self.byte_at(0) else {
                self.unterminated = true;
                self.error_at(self.token_start, self.pos, &messages::UNTERMINATED_STRING_LITERAL);
                self.token_raw_range = (content_start, self.pos);
                break;
            };
            if b == quote {
                self.token_raw_range = (content_start, self.pos);
                self.pos += 1;
                break;
            }
            if b == b'\\' {
                self.scan_escape(&mut cooked);
                continue;
            }
            if b == b'\n' || b == b'\r' {
                self.unterminated = true;
                self.error_at(self.token_start, self.pos, &messages::UNTERMINATED_STRING_LITERAL);
                self.token_raw_range = (content_start, self.pos);
                break;
            }
            let ch = self.current_char().unwrap_or('\u{FFFD}');
            cooked.push(ch);
            self.pos += ch.len_utf8();
        }
        self.token_value = cooked;
        SyntaxKind::StringLiteral
    }

    /// Scan template text up to the closing backtick (`end_kind`) or the next
    /// `${` (`open_kind`). The opening delimiter is already consumed.
    fn scan_template_piece(&mut self, end_kind: SyntaxKind, open_kind: SyntaxKind) -> SyntaxKind {
        let content_start = self.pos;
        let mut cooked = String::new();
        loop {
            let Some(b) = self.byte_at(0) else {
                self.unterminated = true;
                self.error_at(self.token_start, self.pos, &messages::UNTERMINATED_TEMPLATE_LITERAL);
                self.token_raw_range = (content_start, self.pos);
                self.token_value = cooked;
                return end_kind;
            };
            match b {
                b'`' => {
                    self.token_raw_range = (content_start, self.pos);
                    self.pos += 1;
                    self.token_value = cooked;
                    return end_kind;
                }
                b'$' if self.byte_at(1) == Some(b'{') => {
                    self.token_raw_range = (content_start, self.pos);
                    self.pos += 2;
                    self.token_value = cooked;
                    return open_kind;
                }
                b'\\' => self.scan_escape(&mut cooked),
                b'\r' => {
                    // Template values normalize CRLF and CR to LF.
                    self.pos += 1;
                    if self.byte_at(0) == Some(b'\n') {
                        self.pos += 1;
                    }
                    cooked.push('\n');
                }
                _ => {
                    let ch = self.current_char().unwrap_or('\u{FFFD}');
                    cooked.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    /// Scan one escape sequence starting at the backslash and push its value.
    fn scan_escape(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += 1;
        let Some(ch) = self.current_char() else {
            return;
        };
        self.pos += ch.len_utf8();
        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '0' if !self.byte_at(0).map_or(false, is_digit) => out.push('\0'),
            'x' => match self.scan_hex_value(2) {
                Some(c) => out.push(c),
                None => self.error_at(start, self.pos, &messages::DIGIT_EXPECTED),
            },
            'u' => {
                let value = if self.byte_at(0) == Some(b'{') {
                    self.pos += 1;
                    let digits_start = self.pos;
                    while self.byte_at(0).map_or(false, is_hex_digit) {
                        self.pos += 1;
                    }
                    let digits = &self.text[digits_start..self.pos];
                    if self.byte_at(0) == Some(b'}') {
                        self.pos += 1;
                    }
                    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
                } else {
                    self.scan_hex_value(4)
                };
                match value {
                    Some(c) => out.push(c),
                    None => self.error_at(start, self.pos, &messages::DIGIT_EXPECTED),
                }
            }
            '\r' => {
                // Line continuation.
                if self.byte_at(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    fn scan_hex_value(&mut self, count: usize) -> Option<char> {
        let end = self.pos + count;
        let digits = self.text.get(self.pos..end)?;
        if !digits.bytes().all(is_hex_digit) {
            return None;
        }
        self.pos = end;
        u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
    }

    /// Rescan a template middle or tail. Called with `}` as the current token.
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.unterminated = false;
        self.token = self.scan_template_piece(SyntaxKind::TemplateTail, SyntaxKind::TemplateMiddle);
        self.token
    }

    /// Rescan the current `/` or `/=` token as a regular expression literal.
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        let mut in_character_class = false;
        loop {
            let Some(b) = self.byte_at(0) else {
                self.unterminated = true;
                self.error_at(self.token_start, self.pos, &messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                break;
            };
            match b {
                b'\n' | b'\r' => {
                    self.unterminated = true;
                    self.error_at(self.token_start, self.pos, &messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    if let Some(ch) = self.current_char() {
                        if !is_line_break(ch) {
                            self.pos += ch.len_utf8();
                        }
                    }
                }
                b'[' => {
                    in_character_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_character_class = false;
                    self.pos += 1;
                }
                b'/' if !in_character_class => {
                    self.pos += 1;
                    while let Some(ch) = self.current_char() {
                        if !is_identifier_part(ch) {
                            break;
                        }
                        self.pos += ch.len_utf8();
                    }
                    break;
                }
                _ => {
                    let ch = self.current_char().unwrap_or('\u{FFFD}');
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = self.token_text().to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Rescan `>` as `>=`, `>>`, `>>=`, `>>>`, or `>>>=`.
    pub fn rescan_greater_than_token(&mut self) -> SyntaxKind {
        if self.token == SyntaxKind::GreaterThanToken {
            self.token = match (self.byte_at(0), self.byte_at(1), self.byte_at(2)) {
                (Some(b'>'), Some(b'>'), Some(b'=')) => {
                    self.pos += 3;
                    SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
                }
                (Some(b'>'), Some(b'>'), _) => {
                    self.pos += 2;
                    SyntaxKind::GreaterThanGreaterThanGreaterThanToken
                }
                (Some(b'>'), Some(b'='), _) => {
                    self.pos += 2;
                    SyntaxKind::GreaterThanGreaterThanEqualsToken
                }
                (Some(b'>'), _, _) => {
                    self.pos += 1;
                    SyntaxKind::GreaterThanGreaterThanToken
                }
                (Some(b'='), _, _) => {
                    self.pos += 1;
                    SyntaxKind::GreaterThanEqualsToken
                }
                _ => SyntaxKind::GreaterThanToken,
            };
        }
        self.token
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        if self.bytes[self.pos] == b'0' {
            let radix_digit: Option<fn(u8) -> bool> = match self.byte_at(1) {
                Some(b'x') | Some(b'X') => Some(is_hex_digit),
                Some(b'b') | Some(b'B') => Some(is_binary_digit),
                Some(b'o') | Some(b'O') => Some(is_octal_digit),
                _ => None,
            };
            if let Some(is_radix_digit) = radix_digit {
                self.pos += 2;
                let digits_start = self.pos;
                self.scan_digits(is_radix_digit);
                if self.pos == digits_start {
                    self.error_at(start, self.pos, &messages::DIGIT_EXPECTED);
                }
                return self.finish_number(start, true);
            }
        }

        self.scan_digits(is_digit);
        if self.byte_at(0) == Some(b'.') {
            self.pos += 1;
            self.scan_digits(is_digit);
        }
        if let Some(b'e') | Some(b'E') = self.byte_at(0) {
            self.pos += 1;
            if let Some(b'+') | Some(b'-') = self.byte_at(0) {
                self.pos += 1;
            }
            let exponent_start = self.pos;
            self.scan_digits(is_digit);
            if self.pos == exponent_start {
                self.error_at(start, self.pos, &messages::DIGIT_EXPECTED);
            }
            return self.finish_number(start, false);
        }
        let is_integer = !self.text[start..self.pos].contains('.');
        self.finish_number(start, is_integer)
    }

    fn finish_number(&mut self, start: usize, bigint_allowed: bool) -> SyntaxKind {
        if bigint_allowed && self.byte_at(0) == Some(b'n') {
            self.pos += 1;
            self.token_value = self.text[start..self.pos].to_string();
            return SyntaxKind::BigIntLiteral;
        }
        self.token_value = self.text[start..self.pos].to_string();
        SyntaxKind::NumericLiteral
    }

    fn scan_digits(&mut self, is_valid: fn(u8) -> bool) {
        while let Some(b) = self.byte_at(0) {
            if is_valid(b) || (b == b'_' && self.byte_at(1).map_or(false, is_valid)) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_identifier_rest(&mut self) {
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        self.scan_identifier_rest();
        let text = self.token_text();
        self.token_value = text.to_string();
        SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_private_identifier(&mut self) -> SyntaxKind {
        self.pos += 1;
        match self.current_char() {
            Some(ch) if is_identifier_start(ch) => {
                self.scan_identifier_rest();
                self.token_value = self.token_text().to_string();
                SyntaxKind::PrivateIdentifier
            }
            _ => {
                self.error_at(self.token_start, self.pos, &messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        }
    }
}

/// Numeric value of a numeric literal's source text.
pub fn parse_numeric_literal(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|&c| c != '_').collect();
    let radix = match cleaned.get(..2) {
        Some("0x") | Some("0X") => 16,
        Some("0b") | Some("0B") => 2,
        Some("0o") | Some("0O") => 8,
        _ => 10,
    };
    if radix == 10 {
        return cleaned.parse::<f64>().unwrap_or(f64::NAN);
    }
    cleaned[2..]
        .bytes()
        .try_fold(0f64, |acc, b| {
            (b as char)
                .to_digit(radix)
                .map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_tokens() {
        let mut scanner = Scanner::new("( ) { } [ ] ; , :");
        assert_eq!(scanner.scan(), SyntaxKind::OpenParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
        assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
        assert_eq!(scanner.scan(), SyntaxKind::ColonToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_contextual_keywords_scan_as_identifiers() {
        let mut scanner = Scanner::new("type interface let");
        for word in ["type", "interface", "let"] {
            assert_eq!(scanner.scan(), SyntaxKind::Identifier);
            assert_eq!(scanner.token_text(), word);
        }
    }

    #[test]
    fn test_string_escapes_are_cooked() {
        let mut scanner = Scanner::new(r#""a\n\x41B\u{43}\"""#);
        assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.token_value(), "a\nABC\"");
        assert_eq!(scanner.token_raw(), r#"a\n\x41B\u{43}\""#);
    }

    #[test]
    fn test_unterminated_string_reports() {
        let mut scanner = Scanner::new("\"abc\nx");
        assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
        assert!(scanner.is_unterminated());
        assert_eq!(scanner.diagnostics().len(), 1);
    }

    #[test]
    fn test_greater_than_rescan() {
        let mut scanner = Scanner::new("a >>= b");
        scanner.scan();
        assert_eq!(scanner.scan(), SyntaxKind::GreaterThanToken);
        assert_eq!(scanner.rescan_greater_than_token(), SyntaxKind::GreaterThanGreaterThanEqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    }

    #[test]
    fn test_look_ahead_restores() {
        let mut scanner = Scanner::new("let x = 1;");
        scanner.scan();
        let next = scanner.look_ahead(|s| s.scan());
        assert_eq!(next, SyntaxKind::Identifier);
        assert_eq!(scanner.token_text(), "let");
    }

    #[test]
    fn test_parse_numeric_literal() {
        assert_eq!(parse_numeric_literal("42"), 42.0);
        assert_eq!(parse_numeric_literal("1_000"), 1000.0);
        assert_eq!(parse_numeric_literal("0xFF"), 255.0);
        assert_eq!(parse_numeric_literal("0b101"), 5.0);
        assert_eq!(parse_numeric_literal("0o17"), 15.0);
        assert_eq!(parse_numeric_literal(".5"), 0.5);
        assert_eq!(parse_numeric_literal("1e3"), 1000.0);
    }
}
