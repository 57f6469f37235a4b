//! The parser implementation.
//!
//! A recursive descent parser that consumes tokens from the scanner and builds
//! an arena-allocated AST. Statement and declaration parsing lives here;
//! expressions and types are in sibling modules as further `impl` blocks.

use bumpalo::Bump;
use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::*;
use typeguard_ast::alloc_vec_in;
use typeguard_core::text::{TextRange, TextSpan};
use typeguard_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use typeguard_scanner::{Scanner, ScannerState};

use crate::utilities::{can_follow_modifier, can_start_statement};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 200;

/// Saved parser state for speculative parsing.
pub(crate) struct ParserState {
    scanner: ScannerState,
    prev_token_end: u32,
    diagnostics_len: usize,
}

/// The parser produces a [`SourceFile`] from source text.
pub struct Parser<'a> {
    pub(crate) arena: &'a Bump,
    pub(crate) scanner: Scanner<'a>,
    file_name: &'a str,
    source_text: &'a str,
    pub(crate) diagnostics: DiagnosticCollection,
    /// End of the most recently consumed token.
    pub(crate) prev_token_end: u32,
    pub(crate) recursion_depth: u32,
    /// `await` is an operator at the top level and inside async functions.
    pub(crate) in_await_context: bool,
    pub(crate) in_generator_context: bool,
    /// Inside a `for (...; ` initializer, where `in` is not a binary operator.
    pub(crate) disallow_in: bool,
    /// Inside the `extends` clause of a conditional type.
    pub(crate) disallow_conditional_types: bool,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file_name: &str, source_text: &str) -> Self {
        let file_name: &'a str = arena.alloc_str(file_name);
        let source_text: &'a str = arena.alloc_str(source_text);
        Self {
            arena,
            scanner: Scanner::new(source_text).with_file_name(file_name),
            file_name,
            source_text,
            diagnostics: DiagnosticCollection::new(),
            prev_token_end: 0,
            recursion_depth: 0,
            in_await_context: true,
            in_generator_context: false,
            disallow_in: false,
            disallow_conditional_types: false,
        }
    }

    /// Parse the whole file. Diagnostics are available afterwards through
    /// [`Parser::take_diagnostics`].
    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        self.scanner.skip_shebang();
        self.next_token();
        let statements = self.parse_statements();
        if self.current_token() != SyntaxKind::EndOfFileToken {
            // A stray `}` at the top level.
            self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
        }
        let comments = self.scanner.take_comments();
        SourceFile {
            data: NodeData::new(0, self.source_text.len() as u32),
            statements,
            file_name: self.file_name,
            text: self.source_text,
            comments: alloc_vec_in(self.arena, comments),
        }
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.extend(self.scanner.take_diagnostics());
        diagnostics.sort();
        diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end() as u32;
        self.scanner.scan()
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    pub(crate) fn token_text(&self) -> &'a str {
        self.scanner.token_text()
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// Node data spanning from `pos` to the end of the last consumed token.
    #[inline]
    pub(crate) fn finish_node(&self, pos: u32) -> NodeData {
        NodeData::new(pos, self.prev_token_end.max(pos))
    }

    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    pub(crate) fn alloc_list<T: Copy>(&self, items: Vec<T>) -> &'a [T] {
        alloc_vec_in(self.arena, items)
    }

    pub(crate) fn expect_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            self.error(&messages::_0_EXPECTED, &[&kind.to_string()]);
            false
        }
    }

    pub(crate) fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `;`, or accept an automatically inserted one.
    pub(crate) fn parse_expected_semicolon(&mut self) {
        if self.optional_token(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.can_insert_semicolon() {
            return;
        }
        self.error(&messages::_0_EXPECTED, &[";"]);
    }

    pub(crate) fn can_insert_semicolon(&self) -> bool {
        matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    pub(crate) fn error(&mut self, msg: &DiagnosticMessage, args: &[&str]) {
        let pos = self.token_pos();
        let end = self.scanner.token_end() as u32;
        self.error_at(TextRange::new(pos, end.max(pos)), msg, args);
    }

    pub(crate) fn error_at(&mut self, range: TextRange, msg: &DiagnosticMessage, args: &[&str]) {
        // One error per position keeps recovery from cascading.
        let span = TextSpan::from_bounds(range.pos, range.end);
        if self
            .diagnostics
            .diagnostics()
            .last()
            .map_or(false, |d| d.span.map(|s| s.start) == Some(span.start))
        {
            return;
        }
        self.diagnostics
            .add(Diagnostic::with_location(self.file_name, span, msg, args));
    }

    /// Whether the current token is the identifier `text`.
    pub(crate) fn is_identifier_text(&self, text: &str) -> bool {
        self.current_token() == SyntaxKind::Identifier && self.token_text() == text
    }

    // ========================================================================
    // Speculation
    // ========================================================================

    pub(crate) fn save_state(&self) -> ParserState {
        ParserState {
            scanner: self.scanner.save_state(),
            prev_token_end: self.prev_token_end,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub(crate) fn restore_state(&mut self, state: ParserState) {
        self.scanner.restore_state(state.scanner);
        self.prev_token_end = state.prev_token_end;
        self.diagnostics.truncate(state.diagnostics_len);
    }

    /// Run `f` and roll back if it returns `None` or reports any error.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let state = self.save_state();
        let scanner_errors = self.scanner.diagnostics().len();
        let result = f(self);
        let clean = self.diagnostics.len() == state.diagnostics_len
            && self.scanner.diagnostics().len() == scanner_errors;
        match result {
            Some(value) if clean => Some(value),
            _ => {
                self.restore_state(state);
                None
            }
        }
    }

    /// Run `f` and always restore.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    /// Whether the next token is on the same line and satisfies `pred`.
    pub(crate) fn next_token_on_same_line(&mut self, pred: impl FnOnce(SyntaxKind, &str) -> bool) -> bool {
        self.look_ahead(|p| {
            let kind = p.next_token();
            !p.has_preceding_line_break() && pred(kind, p.token_text())
        })
    }

    // ========================================================================
    // Names and literals
    // ========================================================================

    /// Parse a binding identifier. Reserved words are rejected.
    pub(crate) fn parse_identifier(&mut self) -> Identifier<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::Identifier {
            let name = self.token_text();
            self.next_token();
            return Identifier { data: self.finish_node(pos), name };
        }
        self.error(&messages::IDENTIFIER_EXPECTED, &[]);
        if self.current_token().is_keyword() {
            // Keep going with the keyword as the name.
            let name = self.token_text();
            self.next_token();
            return Identifier { data: self.finish_node(pos), name };
        }
        Identifier { data: NodeData::new(pos, pos), name: "" }
    }

    /// Parse an identifier where reserved words are allowed (`x.default`).
    pub(crate) fn parse_identifier_name(&mut self) -> Identifier<'a> {
        if self.current_token().is_identifier_or_keyword() {
            let pos = self.token_pos();
            let name = self.token_text();
            self.next_token();
            return Identifier { data: self.finish_node(pos), name };
        }
        self.parse_identifier()
    }

    pub(crate) fn parse_string_literal(&mut self) -> StringLiteral<'a> {
        let pos = self.token_pos();
        let raw_content = self.scanner.token_raw();
        let value: &'a str = if raw_content == self.scanner.token_value() {
            raw_content
        } else {
            self.arena.alloc_str(self.scanner.token_value())
        };
        let raw = self.token_text();
        self.next_token();
        StringLiteral { data: self.finish_node(pos), value, raw }
    }

    pub(crate) fn parse_numeric_literal(&mut self) -> NumericLiteral<'a> {
        let pos = self.token_pos();
        let raw = self.token_text();
        self.next_token();
        NumericLiteral {
            data: self.finish_node(pos),
            value: typeguard_scanner::parse_numeric_literal(raw),
            raw,
        }
    }

    pub(crate) fn parse_property_name(&mut self) -> PropertyName<'a> {
        match self.current_token() {
            SyntaxKind::StringLiteral => PropertyName::StringLiteral(self.parse_string_literal()),
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                PropertyName::NumericLiteral(self.parse_numeric_literal())
            }
            SyntaxKind::PrivateIdentifier => {
                let pos = self.token_pos();
                let name = self.token_text();
                self.next_token();
                PropertyName::PrivateIdentifier(Identifier { data: self.finish_node(pos), name })
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let saved = self.disallow_in;
                self.disallow_in = false;
                let expr = self.parse_assignment_expression_and_alloc();
                self.disallow_in = saved;
                self.expect_token(SyntaxKind::CloseBracketToken);
                PropertyName::Computed(expr)
            }
            _ => PropertyName::Identifier(self.parse_identifier_name()),
        }
    }

    pub(crate) fn is_property_name_start(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::PrivateIdentifier
                | SyntaxKind::OpenBracketToken
        ) || kind.is_identifier_or_keyword()
    }

    pub(crate) fn parse_entity_name(&mut self) -> EntityName<'a> {
        let pos = self.token_pos();
        let mut name = EntityName::Identifier(self.parse_identifier_name());
        while self.current_token() == SyntaxKind::DotToken {
            self.next_token();
            let right = self.parse_identifier_name();
            name = EntityName::Qualified(self.alloc(QualifiedName {
                data: self.finish_node(pos),
                left: name,
                right,
            }));
        }
        name
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    pub(crate) fn parse_statements(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken
            && self.current_token() != SyntaxKind::CloseBraceToken
        {
            let saved_pos = self.token_pos();
            let stmt = self.parse_statement();
            statements.push(stmt);

            // Error recovery: if no progress was made, skip to something that
            // can start a statement.
            if self.token_pos() == saved_pos {
                self.skip_to_next_statement();
            }
        }
        self.alloc_list(statements)
    }

    fn skip_to_next_statement(&mut self) {
        if self.current_token() != SyntaxKind::EndOfFileToken {
            self.next_token();
        }
        while self.current_token() != SyntaxKind::EndOfFileToken
            && !can_start_statement(self.current_token())
            && !self.has_preceding_line_break()
        {
            self.next_token();
        }
    }

    pub(crate) fn parse_statement(&mut self) -> Statement<'a> {
        self.recursion_depth += 1;
        let stmt = if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]);
            let pos = self.token_pos();
            Statement::Empty(NodeData::new(pos, pos))
        } else {
            self.parse_statement_worker()
        };
        self.recursion_depth -= 1;
        stmt
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                Statement::Empty(self.finish_node(pos))
            }
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::VarKeyword => self.parse_variable_statement(pos, ModifierFlags::NONE),
            SyntaxKind::ConstKeyword if self.peek_token() == SyntaxKind::EnumKeyword => {
                self.next_token();
                self.parse_enum_declaration(pos, ModifierFlags::CONST)
            }
            SyntaxKind::ConstKeyword => self.parse_variable_statement(pos, ModifierFlags::NONE),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, ModifierFlags::NONE),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, ModifierFlags::NONE),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(pos, ModifierFlags::NONE),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => self.parse_jump_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::DebuggerKeyword => {
                self.next_token();
                self.parse_expected_semicolon();
                Statement::Debugger(self.finish_node(pos))
            }
            SyntaxKind::ExportKeyword => self.parse_export(pos),
            SyntaxKind::ImportKeyword
                if !matches!(self.peek_token(), SyntaxKind::OpenParenToken | SyntaxKind::DotToken) =>
            {
                self.parse_import(pos, ModifierFlags::NONE)
            }
            SyntaxKind::AtToken => {
                self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                self.next_token();
                Statement::Empty(self.finish_node(pos))
            }
            SyntaxKind::WithKeyword => {
                self.error(&messages::UNEXPECTED_TOKEN_0, &["with"]);
                self.next_token();
                Statement::Empty(self.finish_node(pos))
            }
            SyntaxKind::Identifier => self.parse_identifier_led_statement(pos),
            _ => self.parse_expression_statement(),
        }
    }

    /// Statements that start with a contextual word: `let`, `type`,
    /// `interface`, `declare`, labels, and plain expression statements.
    fn parse_identifier_led_statement(&mut self, pos: u32) -> Statement<'a> {
        let text = self.token_text();
        match text {
            "let" if self.is_let_declaration() => {
                return self.parse_variable_statement(pos, ModifierFlags::NONE)
            }
            "using" if self.next_token_on_same_line(|k, _| k == SyntaxKind::Identifier) => {
                return self.parse_variable_statement(pos, ModifierFlags::NONE)
            }
            "await" if self.next_token_on_same_line(|k, t| k == SyntaxKind::Identifier && t == "using") => {
                return self.parse_variable_statement(pos, ModifierFlags::NONE)
            }
            "type" | "interface" | "namespace" | "module" | "declare" | "abstract" | "async" | "global"
                if self.is_start_of_declaration() =>
            {
                return self.parse_declaration(pos, ModifierFlags::NONE)
            }
            _ => {}
        }
        if self.peek_token() == SyntaxKind::ColonToken {
            return self.parse_labeled_statement();
        }
        self.parse_expression_statement()
    }

    fn is_let_declaration(&mut self) -> bool {
        self.look_ahead(|p| {
            let kind = p.next_token();
            matches!(kind, SyntaxKind::Identifier | SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken)
                && !(kind == SyntaxKind::Identifier && matches!(p.token_text(), "in" | "of" | "instanceof"))
        })
    }

    /// Whether the current contextual word starts a declaration.
    fn is_start_of_declaration(&mut self) -> bool {
        let word = self.token_text();
        self.look_ahead(|p| {
            let kind = p.next_token();
            let next = p.token_text();
            let same_line = !p.has_preceding_line_break();
            match word {
                "type" => same_line && kind == SyntaxKind::Identifier,
                "interface" => same_line && kind == SyntaxKind::Identifier,
                "namespace" => same_line && kind == SyntaxKind::Identifier,
                "module" => same_line && matches!(kind, SyntaxKind::Identifier | SyntaxKind::StringLiteral),
                "global" => same_line && kind == SyntaxKind::OpenBraceToken,
                "abstract" => same_line && kind == SyntaxKind::ClassKeyword,
                "async" => same_line && kind == SyntaxKind::FunctionKeyword,
                "declare" => {
                    same_line
                        && (matches!(
                            kind,
                            SyntaxKind::VarKeyword
                                | SyntaxKind::ConstKeyword
                                | SyntaxKind::FunctionKeyword
                                | SyntaxKind::ClassKeyword
                                | SyntaxKind::EnumKeyword
                        ) || (kind == SyntaxKind::Identifier
                            && matches!(
                                next,
                                "let" | "type" | "interface" | "namespace" | "module" | "global" | "abstract"
                                    | "async"
                            )))
                }
                _ => false,
            }
        })
    }

    /// Parse a declaration after any leading modifiers. `modifiers` holds the
    /// ones already consumed (`export`, `default`).
    fn parse_declaration(&mut self, pos: u32, mut modifiers: ModifierFlags) -> Statement<'a> {
        loop {
            let flag = match self.current_token() {
                SyntaxKind::Identifier => match self.token_text() {
                    "declare" => ModifierFlags::AMBIENT,
                    "abstract" => ModifierFlags::ABSTRACT,
                    "async" => ModifierFlags::ASYNC,
                    _ => break,
                },
                _ => break,
            };
            if !self.next_token_on_same_line(|k, _| can_follow_modifier(k)) {
                break;
            }
            modifiers |= flag;
            self.next_token();
        }

        match self.current_token() {
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, modifiers),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, modifiers),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(pos, modifiers),
            SyntaxKind::VarKeyword => self.parse_variable_statement(pos, modifiers),
            SyntaxKind::ConstKeyword => {
                if self.peek_token() == SyntaxKind::EnumKeyword {
                    self.next_token();
                    self.parse_enum_declaration(pos, modifiers | ModifierFlags::CONST)
                } else {
                    self.parse_variable_statement(pos, modifiers)
                }
            }
            SyntaxKind::ImportKeyword => self.parse_import(pos, modifiers),
            SyntaxKind::Identifier => match self.token_text() {
                "let" | "using" => self.parse_variable_statement(pos, modifiers),
                "interface" => self.parse_interface_declaration(pos, modifiers),
                "type" => self.parse_type_alias_declaration(pos, modifiers),
                "namespace" | "module" | "global" => self.parse_module_declaration(pos, modifiers),
                _ => {
                    self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                    Statement::Empty(self.finish_node(pos))
                }
            },
            _ => {
                self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                Statement::Empty(self.finish_node(pos))
            }
        }
    }

    pub(crate) fn parse_block(&mut self) -> &'a Block<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statements();
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc(Block { data: self.finish_node(pos), statements })
    }

    /// Parse a function body block with its own `await`/`yield` context.
    pub(crate) fn parse_function_body(&mut self, is_async: bool, is_generator: bool) -> &'a Block<'a> {
        let saved = (self.in_await_context, self.in_generator_context, self.disallow_in);
        self.in_await_context = is_async;
        self.in_generator_context = is_generator;
        self.disallow_in = false;
        let block = self.parse_block();
        (self.in_await_context, self.in_generator_context, self.disallow_in) = saved;
        block
    }

    fn parse_variable_statement(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let list = self.parse_variable_declaration_list();
        self.parse_expected_semicolon();
        Statement::Variable(VariableStatement {
            data: self.finish_node(pos).with_modifiers(modifiers),
            kind: list.kind,
            declarations: list.declarations,
        })
    }

    pub(crate) fn parse_variable_declaration_list(&mut self) -> VariableStatement<'a> {
        let pos = self.token_pos();
        let kind = match (self.current_token(), self.token_text()) {
            (SyntaxKind::VarKeyword, _) => VariableKind::Var,
            (SyntaxKind::ConstKeyword, _) => VariableKind::Const,
            (_, "let") => VariableKind::Let,
            (_, "using") => VariableKind::Using,
            (_, "await") => {
                self.next_token();
                VariableKind::AwaitUsing
            }
            _ => VariableKind::Var,
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declaration());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        VariableStatement {
            data: self.finish_node(pos),
            kind,
            declarations: self.alloc_list(declarations),
        }
    }

    fn parse_variable_declaration(&mut self) -> VariableDeclaration<'a> {
        let pos = self.token_pos();
        let name = self.parse_binding_name();
        let definite = self.current_token() == SyntaxKind::ExclamationToken
            && !self.has_preceding_line_break()
            && self.optional_token(SyntaxKind::ExclamationToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression_and_alloc())
        } else {
            None
        };
        VariableDeclaration {
            data: self.finish_node(pos),
            name,
            definite,
            type_annotation,
            initializer,
        }
    }

    // ========================================================================
    // Binding patterns (destructuring)
    // ========================================================================

    pub(crate) fn parse_binding_name(&mut self) -> BindingName<'a> {
        match self.current_token() {
            SyntaxKind::OpenBraceToken => {
                let pattern = self.parse_object_binding_pattern();
                BindingName::Object(self.alloc(pattern))
            }
            SyntaxKind::OpenBracketToken => {
                let pattern = self.parse_array_binding_pattern();
                BindingName::Array(self.alloc(pattern))
            }
            _ => BindingName::Identifier(self.parse_identifier()),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> ObjectBindingPattern<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let epos = self.token_pos();
            let rest = self.optional_token(SyntaxKind::DotDotDotToken);
            let (property_name, name) = if rest {
                (None, self.parse_binding_name())
            } else {
                let property = self.parse_property_name();
                if self.optional_token(SyntaxKind::ColonToken) {
                    (Some(property), self.parse_binding_name())
                } else {
                    match property {
                        PropertyName::Identifier(id) => (None, BindingName::Identifier(id)),
                        _ => {
                            self.error(&messages::_0_EXPECTED, &[":"]);
                            (Some(property), BindingName::Identifier(Identifier { data: self.finish_node(epos), name: "" }))
                        }
                    }
                }
            };
            let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
                Some(self.parse_assignment_expression_and_alloc())
            } else {
                None
            };
            elements.push(BindingElement {
                data: self.finish_node(epos),
                rest,
                property_name,
                name,
                initializer,
            });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        ObjectBindingPattern { data: self.finish_node(pos), elements: self.alloc_list(elements) }
    }

    fn parse_array_binding_pattern(&mut self) -> ArrayBindingPattern<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            let epos = self.token_pos();
            if self.current_token() == SyntaxKind::CommaToken {
                elements.push(ArrayBindingElement::Omitted(NodeData::new(epos, epos)));
            } else {
                let rest = self.optional_token(SyntaxKind::DotDotDotToken);
                let name = self.parse_binding_name();
                let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
                    Some(self.parse_assignment_expression_and_alloc())
                } else {
                    None
                };
                elements.push(ArrayBindingElement::Element(BindingElement {
                    data: self.finish_node(epos),
                    rest,
                    property_name: None,
                    name,
                    initializer,
                }));
            }
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        ArrayBindingPattern { data: self.finish_node(pos), elements: self.alloc_list(elements) }
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression_and_alloc();
        self.parse_expected_semicolon();
        Statement::Expression(ExpressionStatement { data: self.finish_node(pos), expression })
    }

    fn parse_labeled_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let label = self.parse_identifier();
        self.expect_token(SyntaxKind::ColonToken);
        let statement = self.parse_statement();
        Statement::Labeled(LabeledStatement {
            data: self.finish_node(pos),
            label,
            statement: self.alloc(statement),
        })
    }

    fn parse_parenthesized_condition(&mut self) -> &'a Expression<'a> {
        self.expect_token(SyntaxKind::OpenParenToken);
        let expr = self.parse_expression_and_alloc();
        self.expect_token(SyntaxKind::CloseParenToken);
        expr
    }

    fn parse_embedded_statement(&mut self) -> &'a Statement<'a> {
        let statement = self.parse_statement();
        self.alloc(statement)
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        let then_statement = self.parse_embedded_statement();
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            Some(self.parse_embedded_statement())
        } else {
            None
        };
        Statement::If(IfStatement {
            data: self.finish_node(pos),
            expression,
            then_statement,
            else_statement,
        })
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let expression = if self.can_insert_semicolon() || self.current_token() == SyntaxKind::SemicolonToken {
            None
        } else {
            Some(self.parse_expression_and_alloc())
        };
        self.parse_expected_semicolon();
        Statement::Return(ReturnStatement { data: self.finish_node(pos), expression })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        let statement = self.parse_embedded_statement();
        Statement::While(LoopStatement { data: self.finish_node(pos), expression, statement })
    }

    fn parse_do_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let statement = self.parse_embedded_statement();
        self.expect_token(SyntaxKind::WhileKeyword);
        let expression = self.parse_parenthesized_condition();
        // The semicolon after do-while is always optional.
        self.optional_token(SyntaxKind::SemicolonToken);
        Statement::Do(LoopStatement { data: self.finish_node(pos), expression, statement })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let is_await = self.is_identifier_text("await") && {
            self.next_token();
            true
        };
        self.expect_token(SyntaxKind::OpenParenToken);

        let saved_disallow_in = self.disallow_in;
        self.disallow_in = true;
        let initializer = match self.current_token() {
            SyntaxKind::SemicolonToken => None,
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword => {
                Some(ForInitializer::Variable(self.parse_variable_declaration_list()))
            }
            SyntaxKind::Identifier
                if (self.token_text() == "let" && self.is_let_declaration())
                    || (self.token_text() == "using"
                        && self.next_token_on_same_line(|k, t| k == SyntaxKind::Identifier && t != "of")) =>
            {
                Some(ForInitializer::Variable(self.parse_variable_declaration_list()))
            }
            _ => Some(ForInitializer::Expression(self.parse_expression_and_alloc())),
        };
        self.disallow_in = saved_disallow_in;

        if let Some(initializer) = initializer {
            let is_of = self.is_identifier_text("of");
            if is_of || self.current_token() == SyntaxKind::InKeyword {
                self.next_token();
                let expression = if is_of {
                    self.parse_assignment_expression_and_alloc()
                } else {
                    self.parse_expression_and_alloc()
                };
                self.expect_token(SyntaxKind::CloseParenToken);
                let statement = self.parse_embedded_statement();
                let node = ForInOfStatement {
                    data: self.finish_node(pos),
                    is_await,
                    initializer,
                    expression,
                    statement,
                };
                return if is_of { Statement::ForOf(node) } else { Statement::ForIn(node) };
            }
        }

        self.expect_token(SyntaxKind::SemicolonToken);
        let condition = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken);
        let incrementor = if self.current_token() != SyntaxKind::CloseParenToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseParenToken);
        let statement = self.parse_embedded_statement();
        Statement::For(ForStatement {
            data: self.finish_node(pos),
            initializer,
            condition,
            incrementor,
            statement,
        })
    }

    fn parse_throw_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_expression_and_alloc();
        self.parse_expected_semicolon();
        Statement::Throw(ExpressionStatement { data: self.finish_node(pos), expression })
    }

    fn parse_try_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let try_block = self.parse_block();
        let catch_clause = if self.current_token() == SyntaxKind::CatchKeyword {
            let cpos = self.token_pos();
            self.next_token();
            let (binding, type_annotation) = if self.optional_token(SyntaxKind::OpenParenToken) {
                let binding = self.parse_binding_name();
                let type_annotation = self.parse_type_annotation();
                self.expect_token(SyntaxKind::CloseParenToken);
                (Some(binding), type_annotation)
            } else {
                (None, None)
            };
            let block = self.parse_block();
            Some(CatchClause { data: self.finish_node(cpos), binding, type_annotation, block })
        } else {
            None
        };
        let finally_block = if self.optional_token(SyntaxKind::FinallyKeyword) {
            Some(self.parse_block())
        } else {
            None
        };
        if catch_clause.is_none() && finally_block.is_none() {
            self.error(&messages::_0_EXPECTED, &["catch"]);
        }
        Statement::Try(TryStatement { data: self.finish_node(pos), try_block, catch_clause, finally_block })
    }

    fn parse_jump_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let is_break = self.current_token() == SyntaxKind::BreakKeyword;
        self.next_token();
        let label = if self.current_token() == SyntaxKind::Identifier && !self.has_preceding_line_break() {
            Some(self.parse_identifier())
        } else {
            None
        };
        self.parse_expected_semicolon();
        let node = JumpStatement { data: self.finish_node(pos), label };
        if is_break { Statement::Break(node) } else { Statement::Continue(node) }
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.parse_parenthesized_condition();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut clauses = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let cpos = self.token_pos();
            let expression = match self.current_token() {
                SyntaxKind::CaseKeyword => {
                    self.next_token();
                    Some(self.parse_expression_and_alloc())
                }
                SyntaxKind::DefaultKeyword => {
                    self.next_token();
                    None
                }
                _ => {
                    self.error(&messages::_0_EXPECTED, &["case"]);
                    break;
                }
            };
            self.expect_token(SyntaxKind::ColonToken);
            let mut statements = Vec::new();
            while !matches!(
                self.current_token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                let saved_pos = self.token_pos();
                statements.push(self.parse_statement());
                if self.token_pos() == saved_pos {
                    self.skip_to_next_statement();
                }
            }
            clauses.push(CaseClause {
                data: self.finish_node(cpos),
                expression,
                statements: self.alloc_list(statements),
            });
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        Statement::Switch(SwitchStatement {
            data: self.finish_node(pos),
            expression,
            clauses: self.alloc_list(clauses),
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_function_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let function = self.parse_function_like(pos, modifiers, true);
        Statement::Function(self.alloc(function))
    }

    /// Parse `function* name<T>(params): R { body }` starting at `function`.
    /// Bodiless signatures end with a semicolon.
    pub(crate) fn parse_function_like(
        &mut self,
        pos: u32,
        modifiers: ModifierFlags,
        is_declaration: bool,
    ) -> FunctionDeclaration<'a> {
        self.expect_token(SyntaxKind::FunctionKeyword);
        let asterisk = self.optional_token(SyntaxKind::AsteriskToken);
        let name = if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            if is_declaration && !modifiers.contains(ModifierFlags::DEFAULT) {
                self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            }
            None
        };
        let is_async = modifiers.contains(ModifierFlags::ASYNC);
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters_in_context(is_async, asterisk);
        let return_type = self.parse_return_type();
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            Some(self.parse_function_body(is_async, asterisk))
        } else {
            if is_declaration {
                self.parse_expected_semicolon();
            } else {
                self.expect_token(SyntaxKind::OpenBraceToken);
            }
            None
        };
        FunctionDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            asterisk,
            type_parameters,
            parameters,
            return_type,
            body,
        }
    }

    fn parse_class_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let class = self.parse_class_like(pos, modifiers);
        Statement::Class(self.alloc(class))
    }

    pub(crate) fn parse_class_like(&mut self, pos: u32, modifiers: ModifierFlags) -> ClassDeclaration<'a> {
        self.expect_token(SyntaxKind::ClassKeyword);
        let name = if self.current_token() == SyntaxKind::Identifier && !self.is_identifier_text("implements") {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_parameters = self.parse_type_parameters();

        let (extends, extends_type_arguments) = if self.optional_token(SyntaxKind::ExtendsKeyword) {
            let expr = self.parse_left_hand_side_expression();
            let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
                self.parse_type_arguments()
            } else {
                None
            };
            (Some(self.alloc(expr)), type_arguments)
        } else {
            (None, None)
        };

        let mut implements = Vec::new();
        if self.is_identifier_text("implements") {
            self.next_token();
            loop {
                implements.push(self.parse_heritage_type());
                if !self.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }

        self.expect_token(SyntaxKind::OpenBraceToken);
        let members = self.parse_class_members();
        self.expect_token(SyntaxKind::CloseBraceToken);
        ClassDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            type_parameters,
            extends,
            extends_type_arguments,
            implements: self.alloc_list(implements),
            members,
        }
    }

    pub(crate) fn parse_heritage_type(&mut self) -> HeritageType<'a> {
        let pos = self.token_pos();
        let name = self.parse_entity_name();
        let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
            self.parse_type_arguments()
        } else {
            None
        };
        HeritageType { data: self.finish_node(pos), name, type_arguments }
    }

    fn parse_class_members(&mut self) -> &'a [ClassElement<'a>] {
        let mut members = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            if let Some(member) = self.parse_class_member() {
                members.push(member);
            }
            if self.token_pos() == saved_pos {
                self.error(&messages::CLASS_MEMBER_EXPECTED, &[]);
                self.next_token();
            }
        }
        self.alloc_list(members)
    }

    /// Consume member modifiers. A modifier word followed by something that
    /// cannot be a member name (`static() {}`, `readonly: 1`) is the name itself.
    pub(crate) fn parse_member_modifiers(&mut self, is_valid: fn(&str) -> bool) -> ModifierFlags {
        let mut modifiers = ModifierFlags::NONE;
        while self.current_token() == SyntaxKind::Identifier && is_valid(self.token_text()) {
            let Some(flag) = ModifierFlags::from_modifier_text(self.token_text()) else {
                break;
            };
            let follows = self.look_ahead(|p| {
                let kind = p.next_token();
                !p.has_preceding_line_break() && can_follow_modifier(kind)
            });
            if !follows {
                break;
            }
            modifiers |= flag;
            self.next_token();
        }
        modifiers
    }

    fn parse_class_member(&mut self) -> Option<ClassElement<'a>> {
        let pos = self.token_pos();
        if self.optional_token(SyntaxKind::SemicolonToken) {
            return Some(ClassElement::Semicolon(self.finish_node(pos)));
        }
        if self.current_token() == SyntaxKind::AtToken {
            self.error(&messages::CLASS_MEMBER_EXPECTED, &[]);
            return None;
        }
        if self.is_identifier_text("static") && self.peek_token() == SyntaxKind::OpenBraceToken {
            self.next_token();
            let block = self.parse_function_body(false, false);
            return Some(ClassElement::StaticBlock(block));
        }

        let modifiers = self.parse_member_modifiers(crate::utilities::is_class_member_modifier);

        if self.current_token() == SyntaxKind::OpenBracketToken && self.is_index_signature() {
            let index = self.parse_index_signature(pos, modifiers);
            self.parse_expected_semicolon();
            return Some(ClassElement::Index(index));
        }

        let asterisk = self.optional_token(SyntaxKind::AsteriskToken);
        let kind = self.parse_accessor_kind();
        let name = self.parse_property_name();
        let kind = match (kind, name) {
            (MethodKind::Method, PropertyName::Identifier(id)) if id.name == "constructor" => MethodKind::Constructor,
            (MethodKind::Method, PropertyName::StringLiteral(s)) if s.value == "constructor" => MethodKind::Constructor,
            (kind, _) => kind,
        };
        let optional = self.optional_token(SyntaxKind::QuestionToken);

        if asterisk
            || kind != MethodKind::Method
            || matches!(self.current_token(), SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken)
        {
            let method = self.parse_method_rest(pos, modifiers, kind, name, optional, asterisk);
            return Some(ClassElement::Method(self.alloc(method)));
        }

        let definite = !optional && self.optional_token(SyntaxKind::ExclamationToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            let saved = (self.in_await_context, self.in_generator_context);
            (self.in_await_context, self.in_generator_context) = (false, false);
            let init = self.parse_assignment_expression_and_alloc();
            (self.in_await_context, self.in_generator_context) = saved;
            Some(init)
        } else {
            None
        };
        self.parse_expected_semicolon();
        Some(ClassElement::Property(self.alloc(PropertyDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            optional,
            definite,
            type_annotation,
            initializer,
        })))
    }

    /// `get`/`set` followed by a member name on the same line starts an accessor.
    pub(crate) fn parse_accessor_kind(&mut self) -> MethodKind {
        let kind = match self.current_token() {
            SyntaxKind::Identifier if self.token_text() == "get" => MethodKind::Get,
            SyntaxKind::Identifier if self.token_text() == "set" => MethodKind::Set,
            _ => return MethodKind::Method,
        };
        if self.next_token_on_same_line(|k, _| Self::is_property_name_start(k)) {
            self.next_token();
            kind
        } else {
            MethodKind::Method
        }
    }

    /// Parse the signature and body of a method after its name.
    pub(crate) fn parse_method_rest(
        &mut self,
        pos: u32,
        modifiers: ModifierFlags,
        kind: MethodKind,
        name: PropertyName<'a>,
        optional: bool,
        asterisk: bool,
    ) -> MethodDeclaration<'a> {
        let is_async = modifiers.contains(ModifierFlags::ASYNC);
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters_in_context(is_async, asterisk);
        let return_type = self.parse_return_type();
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            Some(self.parse_function_body(is_async, asterisk))
        } else {
            self.parse_expected_semicolon();
            None
        };
        MethodDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            kind,
            name,
            optional,
            asterisk,
            type_parameters,
            parameters,
            return_type,
            body,
        }
    }

    fn parse_interface_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.next_token();
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let mut extends = Vec::new();
        if self.optional_token(SyntaxKind::ExtendsKeyword) {
            loop {
                extends.push(self.parse_heritage_type());
                if !self.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        let members = self.parse_object_type_members();
        Statement::Interface(self.alloc(InterfaceDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            type_parameters,
            extends: self.alloc_list(extends),
            members,
        }))
    }

    fn parse_type_alias_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.next_token();
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        self.expect_token(SyntaxKind::EqualsToken);
        let type_node = self.parse_type_and_alloc();
        self.parse_expected_semicolon();
        Statement::TypeAlias(self.alloc(TypeAliasDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            type_parameters,
            type_node,
        }))
    }

    fn parse_enum_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::EnumKeyword);
        let name = self.parse_identifier();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let mpos = self.token_pos();
            if !Self::is_property_name_start(self.current_token()) {
                self.error(&messages::ENUM_MEMBER_EXPECTED, &[]);
                break;
            }
            let member_name = self.parse_property_name();
            let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
                Some(self.parse_assignment_expression_and_alloc())
            } else {
                None
            };
            members.push(EnumMember { data: self.finish_node(mpos), name: member_name, initializer });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        Statement::Enum(self.alloc(EnumDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            members: self.alloc_list(members),
        }))
    }

    /// `namespace A.B { }`, `module "m" { }`, `declare global { }`. Dotted
    /// names nest: `A.B` becomes `A { export B { } }`.
    fn parse_module_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let keyword = self.token_text();
        if keyword != "global" {
            self.next_token();
        }
        let (name, is_string_name) = if self.current_token() == SyntaxKind::StringLiteral {
            (self.parse_string_literal().value, true)
        } else {
            (self.parse_identifier_name().name, false)
        };

        let body = if !is_string_name && self.optional_token(SyntaxKind::DotToken) {
            let inner_pos = self.token_pos();
            let inner = self.parse_module_declaration_after_dot(inner_pos, modifiers);
            Some(self.alloc_list(vec![inner]))
        } else if self.current_token() == SyntaxKind::OpenBraceToken {
            let saved = (self.in_await_context, self.in_generator_context);
            (self.in_await_context, self.in_generator_context) = (false, false);
            self.next_token();
            let statements = self.parse_statements();
            self.expect_token(SyntaxKind::CloseBraceToken);
            (self.in_await_context, self.in_generator_context) = saved;
            Some(statements)
        } else {
            self.parse_expected_semicolon();
            None
        };
        Statement::Module(self.alloc(ModuleDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            is_string_name,
            body,
        }))
    }

    fn parse_module_declaration_after_dot(&mut self, pos: u32, outer: ModifierFlags) -> Statement<'a> {
        let name = self.parse_identifier_name().name;
        let modifiers = ModifierFlags::EXPORT | (outer & ModifierFlags::AMBIENT);
        let body = if self.optional_token(SyntaxKind::DotToken) {
            let inner_pos = self.token_pos();
            let inner = self.parse_module_declaration_after_dot(inner_pos, outer);
            Some(self.alloc_list(vec![inner]))
        } else {
            self.expect_token(SyntaxKind::OpenBraceToken);
            let statements = self.parse_statements();
            self.expect_token(SyntaxKind::CloseBraceToken);
            Some(statements)
        };
        Statement::Module(self.alloc(ModuleDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            is_string_name: false,
            body,
        }))
    }

    // ========================================================================
    // Import/Export
    // ========================================================================

    fn parse_import(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::ImportKeyword);

        if self.current_token() == SyntaxKind::StringLiteral {
            let module_specifier = self.parse_string_literal();
            self.skip_import_attributes();
            self.parse_expected_semicolon();
            return Statement::Import(self.alloc(ImportDeclaration {
                data: self.finish_node(pos).with_modifiers(modifiers),
                is_type_only: false,
                default_binding: None,
                namespace_binding: None,
                named_bindings: None,
                module_specifier,
            }));
        }

        let is_type_only = self.is_identifier_text("type")
            && self.look_ahead(|p| {
                let kind = p.next_token();
                match kind {
                    SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken => true,
                    SyntaxKind::Identifier => p.token_text() != "from" || p.peek_token() == SyntaxKind::Identifier,
                    _ => false,
                }
            });
        if is_type_only {
            self.next_token();
        }

        let default_binding = if self.current_token() == SyntaxKind::Identifier {
            let id = self.parse_identifier();
            if self.current_token() == SyntaxKind::EqualsToken {
                return self.parse_import_equals(pos, modifiers, is_type_only, id);
            }
            Some(id)
        } else {
            None
        };

        let mut namespace_binding = None;
        let mut named_bindings = None;
        if default_binding.is_none() || self.optional_token(SyntaxKind::CommaToken) {
            if self.optional_token(SyntaxKind::AsteriskToken) {
                if self.is_identifier_text("as") {
                    self.next_token();
                } else {
                    self.error(&messages::_0_EXPECTED, &["as"]);
                }
                namespace_binding = Some(self.parse_identifier());
            } else if self.current_token() == SyntaxKind::OpenBraceToken {
                named_bindings = Some(self.parse_import_or_export_specifiers());
            } else {
                self.error(&messages::_0_EXPECTED, &["{"]);
            }
        }

        if self.is_identifier_text("from") {
            self.next_token();
        } else {
            self.error(&messages::_0_EXPECTED, &["from"]);
        }
        let module_specifier = if self.current_token() == SyntaxKind::StringLiteral {
            self.parse_string_literal()
        } else {
            self.error(&messages::_0_EXPECTED, &["string literal"]);
            StringLiteral { data: self.finish_node(pos), value: "", raw: "\"\"" }
        };
        self.skip_import_attributes();
        self.parse_expected_semicolon();
        Statement::Import(self.alloc(ImportDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            is_type_only,
            default_binding,
            namespace_binding,
            named_bindings,
            module_specifier,
        }))
    }

    /// `with { type: "json" }` after an import source is dropped.
    fn skip_import_attributes(&mut self) {
        if (self.current_token() == SyntaxKind::WithKeyword || self.is_identifier_text("assert"))
            && !self.has_preceding_line_break()
        {
            self.next_token();
            self.parse_object_literal();
        }
    }

    fn parse_import_equals(
        &mut self,
        pos: u32,
        modifiers: ModifierFlags,
        is_type_only: bool,
        name: Identifier<'a>,
    ) -> Statement<'a> {
        self.expect_token(SyntaxKind::EqualsToken);
        let module_reference = if self.is_identifier_text("require") && self.peek_token() == SyntaxKind::OpenParenToken {
            self.next_token();
            self.next_token();
            let specifier = if self.current_token() == SyntaxKind::StringLiteral {
                self.parse_string_literal()
            } else {
                self.error(&messages::_0_EXPECTED, &["string literal"]);
                StringLiteral { data: self.finish_node(pos), value: "", raw: "\"\"" }
            };
            self.expect_token(SyntaxKind::CloseParenToken);
            ModuleReference::External(specifier)
        } else {
            ModuleReference::Entity(self.parse_entity_name())
        };
        self.parse_expected_semicolon();
        Statement::ImportEquals(self.alloc(ImportEqualsDeclaration {
            data: self.finish_node(pos).with_modifiers(modifiers),
            is_type_only,
            name,
            module_reference,
        }))
    }

    fn parse_import_or_export_specifiers(&mut self) -> &'a [ImportSpecifier<'a>] {
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut specifiers = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let spos = self.token_pos();
            // `type x` and `type as as y`, but not `type` alone or `type as y`.
            let is_type_only = self.is_identifier_text("type")
                && self.look_ahead(|p| {
                    let kind = p.next_token();
                    if p.token_text() == "as" {
                        p.next_token();
                        return p.token_text() == "as";
                    }
                    kind.is_identifier_or_keyword() || kind == SyntaxKind::StringLiteral
                });
            if is_type_only {
                self.next_token();
            }
            let first = if self.current_token() == SyntaxKind::StringLiteral {
                let lit = self.parse_string_literal();
                Identifier { data: lit.data, name: lit.raw }
            } else {
                self.parse_identifier_name()
            };
            let (property_name, name) = if self.is_identifier_text("as") {
                self.next_token();
                let local = if self.current_token() == SyntaxKind::StringLiteral {
                    let lit = self.parse_string_literal();
                    Identifier { data: lit.data, name: lit.raw }
                } else {
                    self.parse_identifier_name()
                };
                (Some(first), local)
            } else {
                (None, first)
            };
            specifiers.push(ImportSpecifier {
                data: self.finish_node(spos),
                is_type_only,
                property_name,
                name,
            });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(specifiers)
    }

    fn parse_export(&mut self, pos: u32) -> Statement<'a> {
        self.next_token();

        if self.optional_token(SyntaxKind::EqualsToken) {
            let expression = self.parse_assignment_expression_and_alloc();
            self.parse_expected_semicolon();
            return Statement::ExportAssignment(ExportAssignment {
                data: self.finish_node(pos),
                is_export_equals: true,
                expression,
            });
        }

        if self.current_token() == SyntaxKind::DefaultKeyword {
            self.next_token();
            let modifiers = ModifierFlags::EXPORT | ModifierFlags::DEFAULT;
            let is_declaration = match self.current_token() {
                SyntaxKind::FunctionKeyword | SyntaxKind::ClassKeyword => true,
                SyntaxKind::Identifier => match self.token_text() {
                    "abstract" | "async" | "interface" => self.is_start_of_declaration(),
                    _ => false,
                },
                _ => false,
            };
            if is_declaration {
                return self.parse_declaration(pos, modifiers);
            }
            let expression = self.parse_assignment_expression_and_alloc();
            self.parse_expected_semicolon();
            return Statement::ExportAssignment(ExportAssignment {
                data: self.finish_node(pos),
                is_export_equals: false,
                expression,
            });
        }

        if self.is_identifier_text("as") && self.peek_token() == SyntaxKind::Identifier {
            // `export as namespace Lib;` only affects declaration files.
            self.next_token();
            self.next_token();
            let name = self.parse_identifier().name;
            self.parse_expected_semicolon();
            return Statement::Module(self.alloc(ModuleDeclaration {
                data: self.finish_node(pos).with_modifiers(ModifierFlags::AMBIENT),
                name,
                is_string_name: false,
                body: None,
            }));
        }

        let is_type_only = self.is_identifier_text("type")
            && matches!(self.peek_token(), SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken);
        if is_type_only {
            self.next_token();
        }

        let clause = match self.current_token() {
            SyntaxKind::AsteriskToken => {
                self.next_token();
                let alias = if self.is_identifier_text("as") {
                    self.next_token();
                    Some(self.parse_identifier_name())
                } else {
                    None
                };
                Some(ExportClause::Namespace(alias))
            }
            SyntaxKind::OpenBraceToken => Some(ExportClause::Named(self.parse_import_or_export_specifiers())),
            _ => None,
        };

        let Some(clause) = clause else {
            // `export` followed by a declaration.
            return match self.current_token() {
                SyntaxKind::VarKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::ImportKeyword
                | SyntaxKind::Identifier => self.parse_declaration(pos, ModifierFlags::EXPORT),
                _ => {
                    self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                    Statement::Empty(self.finish_node(pos))
                }
            };
        };

        let module_specifier = if self.is_identifier_text("from") {
            self.next_token();
            if self.current_token() == SyntaxKind::StringLiteral {
                Some(self.parse_string_literal())
            } else {
                self.error(&messages::_0_EXPECTED, &["string literal"]);
                None
            }
        } else {
            if matches!(clause, ExportClause::Namespace(_)) {
                self.error(&messages::_0_EXPECTED, &["from"]);
            }
            None
        };
        self.skip_import_attributes();
        self.parse_expected_semicolon();
        Statement::Export(self.alloc(ExportDeclaration {
            data: self.finish_node(pos),
            is_type_only,
            clause,
            module_specifier,
        }))
    }
}
