//! typeguard_printer: syntax tree to source text.
//!
//! Prints whatever the tree holds: a parsed tree prints back as the typed
//! dialect, a stripped tree prints as plain JavaScript. Synthesized
//! expressions get the parentheses their precedence needs, and comments that
//! directly precede a statement or class member in the original text are
//! carried over.

use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::{MethodKind, ModifierFlags};
use typeguard_ast::factory::quote_string;
use typeguard_core::text::TextRange;

/// Options for the printer.
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Indentation string.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
    /// Whether to emit a trailing newline.
    pub trailing_newline: bool,
    /// Whether to copy comments from the source text.
    pub preserve_comments: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
            trailing_newline: true,
            preserve_comments: true,
        }
    }
}

/// Binding strength of an expression, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Comma,
    Assignment,
    Conditional,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponentiation,
    Unary,
    Postfix,
    LeftHandSide,
    Primary,
}

fn binary_precedence(operator: SyntaxKind) -> Precedence {
    match operator {
        SyntaxKind::CommaToken => Precedence::Comma,
        SyntaxKind::QuestionQuestionToken => Precedence::Coalesce,
        SyntaxKind::BarBarToken => Precedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => Precedence::LogicalAnd,
        SyntaxKind::BarToken => Precedence::BitwiseOr,
        SyntaxKind::CaretToken => Precedence::BitwiseXor,
        SyntaxKind::AmpersandToken => Precedence::BitwiseAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => Precedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword
        | SyntaxKind::InKeyword => Precedence::Relational,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Precedence::Shift,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => Precedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            Precedence::Multiplicative
        }
        SyntaxKind::AsteriskAsteriskToken => Precedence::Exponentiation,
        _ => Precedence::Assignment,
    }
}

fn expression_precedence(expr: &Expression<'_>) -> Precedence {
    match expr {
        Expression::Binary(b) => binary_precedence(b.operator),
        Expression::Conditional(_) => Precedence::Conditional,
        Expression::Arrow(_) | Expression::Yield(_) | Expression::Spread(_) => Precedence::Assignment,
        Expression::As(_) | Expression::Satisfies(_) => Precedence::Relational,
        Expression::PrefixUnary(_) | Expression::Await(_) | Expression::TypeAssertion(_) => {
            Precedence::Unary
        }
        Expression::PostfixUnary(_) => Precedence::Postfix,
        Expression::New(n) if n.arguments.is_none() => Precedence::LeftHandSide,
        Expression::Call(_)
        | Expression::New(_)
        | Expression::PropertyAccess(_)
        | Expression::ElementAccess(_)
        | Expression::TaggedTemplate(_)
        | Expression::NonNull(_)
        | Expression::MetaProperty(_) => Precedence::LeftHandSide,
        _ => Precedence::Primary,
    }
}

/// The expression printed first when `expr` is printed, looking through
/// operators that do not add a leading token.
fn leftmost_expression<'e, 'a>(expr: &'e Expression<'a>) -> &'e Expression<'a> {
    match expr {
        Expression::Binary(b) => leftmost_expression(b.left),
        Expression::Conditional(c) => leftmost_expression(c.condition),
        Expression::Call(c) => leftmost_expression(c.expression),
        Expression::PropertyAccess(p) => leftmost_expression(p.expression),
        Expression::ElementAccess(e) => leftmost_expression(e.expression),
        Expression::TaggedTemplate(t) => leftmost_expression(t.tag),
        Expression::PostfixUnary(p) => leftmost_expression(p.operand),
        Expression::NonNull(n) => leftmost_expression(n.operand),
        Expression::As(a) | Expression::Satisfies(a) => leftmost_expression(a.expression),
        _ => expr,
    }
}

/// Where comments for the file being printed come from.
struct CommentSource<'s> {
    text: &'s str,
    comments: &'s [Comment],
    /// Comments ending before this offset have been written.
    written_until: u32,
}

/// The printer converts syntax trees to text.
pub struct Printer<'s> {
    output: String,
    indent_level: u32,
    options: PrinterOptions,
    comments: Option<CommentSource<'s>>,
}

impl<'s> Printer<'s> {
    pub fn new() -> Self {
        Self::with_options(PrinterOptions::default())
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            options,
            comments: None,
        }
    }

    /// Print a source file to a string.
    pub fn print_source_file(&mut self, source_file: &SourceFile<'s>) -> String {
        self.output.clear();
        self.comments = self.options.preserve_comments.then_some(CommentSource {
            text: source_file.text,
            comments: source_file.comments,
            written_until: 0,
        });
        for (i, stmt) in source_file.statements.iter().enumerate() {
            if i > 0 {
                self.write_newline();
            }
            self.write_indent();
            self.print_leading_comments(stmt.data().range);
            self.print_statement(stmt);
        }
        if self.options.trailing_newline && !self.output.is_empty() {
            self.write_newline();
        }
        self.comments = None;
        std::mem::take(&mut self.output)
    }

    /// Print a list of statements without comments.
    pub fn print_statements(&mut self, statements: &[Statement<'_>]) -> String {
        self.output.clear();
        for (i, stmt) in statements.iter().enumerate() {
            if i > 0 {
                self.write_newline();
            }
            self.write_indent();
            self.print_statement(stmt);
        }
        std::mem::take(&mut self.output)
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Write the block of comments that sits directly before `range`, with
    /// nothing but whitespace between them and the node.
    fn print_leading_comments(&mut self, range: TextRange) {
        if range.is_synthesized() {
            return;
        }
        let Some(source) = self.comments.as_mut() else {
            return;
        };
        let (text, comments, written_until) = (source.text, source.comments, source.written_until);
        let end = comments.partition_point(|c| c.range.end <= range.pos);
        let mut start = end;
        let mut boundary = range.pos;
        while start > 0 {
            let candidate = &comments[start - 1];
            if candidate.range.end < written_until {
                break;
            }
            let gap = TextRange::new(candidate.range.end, boundary).slice(text);
            if !gap.chars().all(char::is_whitespace) {
                break;
            }
            boundary = candidate.range.pos;
            start -= 1;
        }
        if start == end {
            return;
        }
        source.written_until = range.pos;
        let texts = comments[start..end]
            .iter()
            .filter(|c| c.range.pos >= written_until)
            .map(|c| c.range.slice(text));
        for text in texts {
            self.write(text);
            self.write_newline();
            self.write_indent();
        }
    }

    // ========================================================================
    // Statement printing
    // ========================================================================

    pub fn print_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::Empty(_) => self.write(";"),
            Statement::Expression(n) => {
                self.print_expression_statement_body(n.expression);
                self.write(";");
            }
            Statement::Variable(n) => {
                self.print_modifiers(n.data.modifier_flags);
                self.print_variable_statement(n);
                self.write(";");
            }
            Statement::Return(n) => {
                self.write("return");
                if let Some(expr) = n.expression {
                    self.write(" ");
                    self.print_expression(expr);
                }
                self.write(";");
            }
            Statement::If(n) => self.print_if_statement(n),
            Statement::Block(n) => self.print_block(n),
            Statement::Function(n) => self.print_function(n),
            Statement::Class(n) => self.print_class(n),
            Statement::Interface(n) => self.print_interface(n),
            Statement::TypeAlias(n) => self.print_type_alias(n),
            Statement::Enum(n) => self.print_enum(n),
            Statement::Module(n) => self.print_module(n),
            Statement::For(n) => self.print_for_statement(n),
            Statement::ForIn(n) => self.print_for_in_of(n, "in"),
            Statement::ForOf(n) => self.print_for_in_of(n, "of"),
            Statement::While(n) => {
                self.write("while (");
                self.print_expression(n.expression);
                self.write(") ");
                self.print_statement(n.statement);
            }
            Statement::Do(n) => {
                self.write("do ");
                self.print_statement(n.statement);
                self.write(" while (");
                self.print_expression(n.expression);
                self.write(");");
            }
            Statement::Switch(n) => self.print_switch_statement(n),
            Statement::Throw(n) => {
                self.write("throw ");
                self.print_expression(n.expression);
                self.write(";");
            }
            Statement::Try(n) => self.print_try_statement(n),
            Statement::Break(n) => self.print_jump("break", n),
            Statement::Continue(n) => self.print_jump("continue", n),
            Statement::Labeled(n) => {
                self.write(n.label.name);
                self.write(": ");
                self.print_statement(n.statement);
            }
            Statement::Debugger(_) => self.write("debugger;"),
            Statement::Import(n) => self.print_import(n),
            Statement::ImportEquals(n) => {
                self.print_modifiers(n.data.modifier_flags);
                self.write("import ");
                if n.is_type_only {
                    self.write("type ");
                }
                self.write(n.name.name);
                self.write(" = ");
                match &n.module_reference {
                    ModuleReference::External(s) => {
                        self.write("require(");
                        self.write(s.raw);
                        self.write(")");
                    }
                    ModuleReference::Entity(name) => self.print_entity_name(name),
                }
                self.write(";");
            }
            Statement::Export(n) => self.print_export(n),
            Statement::ExportAssignment(n) => {
                self.write(if n.is_export_equals { "export = " } else { "export default " });
                self.print_expression_statement_body(n.expression);
                self.write(";");
            }
            Statement::Verbatim(n) => self.print_verbatim(n.text),
        }
    }

    /// Generated text, re-indented line by line to the current level.
    fn print_verbatim(&mut self, text: &str) {
        for (i, line) in text.trim_end().lines().enumerate() {
            if i > 0 {
                self.write_newline();
                if !line.is_empty() {
                    self.write_indent();
                }
            }
            self.write(line);
        }
    }

    fn print_jump(&mut self, keyword: &str, node: &JumpStatement<'_>) {
        self.write(keyword);
        if let Some(label) = &node.label {
            self.write(" ");
            self.write(label.name);
        }
        self.write(";");
    }

    /// An expression in statement position must not start with `{`,
    /// `function` or `class`.
    fn print_expression_statement_body(&mut self, expr: &Expression<'_>) {
        let needs_parens = matches!(
            leftmost_expression(expr),
            Expression::ObjectLiteral(_) | Expression::Function(_) | Expression::Class(_)
        );
        if needs_parens {
            self.write("(");
            self.print_expression(expr);
            self.write(")");
        } else {
            self.print_expression(expr);
        }
    }

    fn print_variable_statement(&mut self, node: &VariableStatement<'_>) {
        self.write(node.kind.keyword());
        self.write(" ");
        for (i, decl) in node.declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_binding_name(&decl.name);
            if decl.definite {
                self.write("!");
            }
            self.print_type_annotation(decl.type_annotation);
            if let Some(init) = decl.initializer {
                self.write(" = ");
                self.print_expression_at(init, Precedence::Assignment);
            }
        }
    }

    fn print_binding_name(&mut self, name: &BindingName<'_>) {
        match name {
            BindingName::Identifier(id) => self.write(id.name),
            BindingName::Object(p) => {
                if p.elements.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, elem) in p.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_binding_element(elem);
                }
                self.write(" }");
            }
            BindingName::Array(p) => {
                self.write("[");
                for (i, elem) in p.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match elem {
                        ArrayBindingElement::Element(e) => self.print_binding_element(e),
                        ArrayBindingElement::Omitted(_) => {}
                    }
                }
                if matches!(p.elements.last(), Some(ArrayBindingElement::Omitted(_))) {
                    self.write(",");
                }
                self.write("]");
            }
        }
    }

    fn print_binding_element(&mut self, elem: &BindingElement<'_>) {
        if elem.rest {
            self.write("...");
        }
        if let Some(prop_name) = &elem.property_name {
            self.print_property_name(prop_name);
            self.write(": ");
        }
        self.print_binding_name(&elem.name);
        if let Some(init) = elem.initializer {
            self.write(" = ");
            self.print_expression_at(init, Precedence::Assignment);
        }
    }

    fn print_if_statement(&mut self, node: &IfStatement<'_>) {
        self.write("if (");
        self.print_expression(node.expression);
        self.write(") ");
        self.print_statement(node.then_statement);
        if let Some(else_stmt) = node.else_statement {
            self.write(" else ");
            self.print_statement(else_stmt);
        }
    }

    pub fn print_block(&mut self, node: &Block<'_>) {
        self.print_statement_list_braced(node.statements);
    }

    fn print_statement_list_braced(&mut self, statements: &[Statement<'_>]) {
        self.write("{");
        if !statements.is_empty() {
            self.increase_indent();
            for stmt in statements.iter() {
                self.write_newline();
                self.write_indent();
                self.print_leading_comments(stmt.data().range);
                self.print_statement(stmt);
            }
            self.decrease_indent();
            self.write_newline();
            self.write_indent();
        }
        self.write("}");
    }

    fn print_function(&mut self, node: &FunctionDeclaration<'_>) {
        self.print_modifiers(node.data.modifier_flags);
        self.write("function");
        if node.asterisk {
            self.write("*");
        }
        if let Some(name) = &node.name {
            self.write(" ");
            self.write(name.name);
        }
        self.print_type_parameters(node.type_parameters);
        self.print_parameter_list(node.parameters);
        self.print_type_annotation(node.return_type);
        match node.body {
            Some(body) => {
                self.write(" ");
                self.print_block(body);
            }
            None => self.write(";"),
        }
    }

    fn print_class(&mut self, node: &ClassDeclaration<'_>) {
        self.print_modifiers(node.data.modifier_flags);
        self.write("class");
        if let Some(name) = &node.name {
            self.write(" ");
            self.write(name.name);
        }
        self.print_type_parameters(node.type_parameters);
        if let Some(extends) = node.extends {
            self.write(" extends ");
            self.print_expression_at(extends, Precedence::LeftHandSide);
            self.print_type_arguments(node.extends_type_arguments);
        }
        if !node.implements.is_empty() {
            self.write(" implements ");
            self.print_heritage_types(node.implements);
        }
        self.write(" {");
        if !node.members.is_empty() {
            self.increase_indent();
            for member in node.members.iter() {
                self.write_newline();
                self.write_indent();
                self.print_class_element(member);
            }
            self.decrease_indent();
            self.write_newline();
            self.write_indent();
        }
        self.write("}");
    }

    fn print_heritage_types(&mut self, types: &[HeritageType<'_>]) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_entity_name(&ty.name);
            self.print_type_arguments(ty.type_arguments);
        }
    }

    fn print_class_element(&mut self, elem: &ClassElement<'_>) {
        match elem {
            ClassElement::Property(p) => {
                self.print_leading_comments(p.data.range);
                self.print_modifiers(p.data.modifier_flags);
                self.print_property_name(&p.name);
                if p.optional {
                    self.write("?");
                }
                if p.definite {
                    self.write("!");
                }
                self.print_type_annotation(p.type_annotation);
                if let Some(init) = p.initializer {
                    self.write(" = ");
                    self.print_expression_at(init, Precedence::Assignment);
                }
                self.write(";");
            }
            ClassElement::Method(m) => {
                self.print_leading_comments(m.data.range);
                self.print_method(m);
            }
            ClassElement::Index(idx) => {
                self.print_index_signature(idx);
                self.write(";");
            }
            ClassElement::Semicolon(_) => self.write(";"),
            ClassElement::StaticBlock(block) => {
                self.write("static ");
                self.print_block(block);
            }
        }
    }

    /// Methods and accessors, shared by classes and object literals.
    fn print_method(&mut self, m: &MethodDeclaration<'_>) {
        self.print_modifiers(m.data.modifier_flags);
        if m.asterisk {
            self.write("*");
        }
        match m.kind {
            MethodKind::Get => self.write("get "),
            MethodKind::Set => self.write("set "),
            MethodKind::Method | MethodKind::Constructor => {}
        }
        self.print_property_name(&m.name);
        if m.optional {
            self.write("?");
        }
        self.print_type_parameters(m.type_parameters);
        self.print_parameter_list(m.parameters);
        self.print_type_annotation(m.return_type);
        match m.body {
            Some(body) => {
                self.write(" ");
                self.print_block(body);
            }
            None => self.write(";"),
        }
    }

    fn print_interface(&mut self, node: &InterfaceDeclaration<'_>) {
        self.print_modifiers(node.data.modifier_flags);
        self.write("interface ");
        self.write(node.name.name);
        self.print_type_parameters(node.type_parameters);
        if !node.extends.is_empty() {
            self.write(" extends ");
            self.print_heritage_types(node.extends);
        }
        self.write(" {");
        if !node.members.is_empty() {
            self.increase_indent();
            for member in node.members.iter() {
                self.write_newline();
                self.write_indent();
                self.print_type_element(member);
                self.write(";");
            }
            self.decrease_indent();
            self.write_newline();
            self.write_indent();
        }
        self.write("}");
    }

    fn print_type_element(&mut self, elem: &TypeElement<'_>) {
        match elem {
            TypeElement::Property(p) => {
                self.print_modifiers(p.data.modifier_flags);
                self.print_property_name(&p.name);
                if p.optional {
                    self.write("?");
                }
                self.print_type_annotation(p.type_annotation);
            }
            TypeElement::Method(m) => {
                self.print_property_name(&m.name);
                if m.optional {
                    self.write("?");
                }
                self.print_type_parameters(m.type_parameters);
                self.print_parameter_list(m.parameters);
                self.print_type_annotation(m.return_type);
            }
            TypeElement::Call(c) => {
                self.print_type_parameters(c.type_parameters);
                self.print_parameter_list(c.parameters);
                self.print_type_annotation(c.return_type);
            }
            TypeElement::Construct(c) => {
                self.write("new ");
                self.print_type_parameters(c.type_parameters);
                self.print_parameter_list(c.parameters);
                self.print_type_annotation(c.return_type);
            }
            TypeElement::Index(idx) => self.print_index_signature(idx),
        }
    }

    fn print_index_signature(&mut self, idx: &IndexSignature<'_>) {
        self.print_modifiers(idx.data.modifier_flags);
        self.write("[");
        self.write(idx.parameter.name);
        self.write(": ");
        self.print_type(idx.key_type);
        self.write("]: ");
        self.print_type(idx.type_annotation);
    }

    fn print_type_alias(&mut self, node: &TypeAliasDeclaration<'_>) {
        self.print_modifiers(node.data.modifier_flags);
        self.write("type ");
        self.write(node.name.name);
        self.print_type_parameters(node.type_parameters);
        self.write(" = ");
        self.print_type(node.type_node);
        self.write(";");
    }

    fn print_enum(&mut self, node: &EnumDeclaration<'_>) {
        self.print_modifiers(node.data.modifier_flags);
        self.write("enum ");
        self.write(node.name.name);
        self.write(" {");
        if !node.members.is_empty() {
            self.increase_indent();
            for (i, member) in node.members.iter().enumerate() {
                self.write_newline();
                self.write_indent();
                self.print_property_name(&member.name);
                if let Some(init) = member.initializer {
                    self.write(" = ");
                    self.print_expression_at(init, Precedence::Assignment);
                }
                if i + 1 < node.members.len() {
                    self.write(",");
                }
            }
            self.decrease_indent();
            self.write_newline();
            self.write_indent();
        }
        self.write("}");
    }

    fn print_module(&mut self, node: &ModuleDeclaration<'_>) {
        let Some(body) = node.body else {
            if node.is_string_name {
                self.print_modifiers(node.data.modifier_flags);
                self.write("module ");
                self.write(&quote_string(node.name));
            } else {
                self.write("export as namespace ");
                self.write(node.name);
            }
            self.write(";");
            return;
        };
        self.print_modifiers(node.data.modifier_flags);
        if node.is_string_name {
            self.write("module ");
            self.write(&quote_string(node.name));
        } else if node.name == "global" && node.data.has_modifier(ModifierFlags::AMBIENT) {
            self.write("global");
        } else {
            self.write("namespace ");
            self.write(node.name);
        }
        self.write(" ");
        self.print_statement_list_braced(body);
    }

    fn print_for_statement(&mut self, node: &ForStatement<'_>) {
        self.write("for (");
        if let Some(init) = &node.initializer {
            self.print_for_initializer(init);
        }
        self.write(";");
        if let Some(cond) = node.condition {
            self.write(" ");
            self.print_expression(cond);
        }
        self.write(";");
        if let Some(incr) = node.incrementor {
            self.write(" ");
            self.print_expression(incr);
        }
        self.write(") ");
        self.print_statement(node.statement);
    }

    fn print_for_in_of(&mut self, node: &ForInOfStatement<'_>, keyword: &str) {
        self.write("for ");
        if node.is_await {
            self.write("await ");
        }
        self.write("(");
        self.print_for_initializer(&node.initializer);
        self.write(" ");
        self.write(keyword);
        self.write(" ");
        self.print_expression_at(node.expression, Precedence::Assignment);
        self.write(") ");
        self.print_statement(node.statement);
    }

    fn print_for_initializer(&mut self, init: &ForInitializer<'_>) {
        match init {
            ForInitializer::Variable(list) => self.print_variable_statement(list),
            ForInitializer::Expression(expr) => self.print_expression_at(expr, Precedence::LeftHandSide),
        }
    }

    fn print_switch_statement(&mut self, node: &SwitchStatement<'_>) {
        self.write("switch (");
        self.print_expression(node.expression);
        self.write(") {");
        self.increase_indent();
        for clause in node.clauses.iter() {
            self.write_newline();
            self.write_indent();
            match clause.expression {
                Some(expr) => {
                    self.write("case ");
                    self.print_expression(expr);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.increase_indent();
            for stmt in clause.statements.iter() {
                self.write_newline();
                self.write_indent();
                self.print_leading_comments(stmt.data().range);
                self.print_statement(stmt);
            }
            self.decrease_indent();
        }
        self.decrease_indent();
        self.write_newline();
        self.write_indent();
        self.write("}");
    }

    fn print_try_statement(&mut self, node: &TryStatement<'_>) {
        self.write("try ");
        self.print_block(node.try_block);
        if let Some(catch) = &node.catch_clause {
            self.write(" catch ");
            if let Some(binding) = &catch.binding {
                self.write("(");
                self.print_binding_name(binding);
                self.print_type_annotation(catch.type_annotation);
                self.write(") ");
            }
            self.print_block(catch.block);
        }
        if let Some(finally) = node.finally_block {
            self.write(" finally ");
            self.print_block(finally);
        }
    }

    fn print_import(&mut self, node: &ImportDeclaration<'_>) {
        self.write("import ");
        if node.is_side_effect_only() {
            self.write(node.module_specifier.raw);
            self.write(";");
            return;
        }
        if node.is_type_only {
            self.write("type ");
        }
        let mut wrote_clause = false;
        if let Some(default) = &node.default_binding {
            self.write(default.name);
            wrote_clause = true;
        }
        if let Some(namespace) = &node.namespace_binding {
            if wrote_clause {
                self.write(", ");
            }
            self.write("* as ");
            self.write(namespace.name);
            wrote_clause = true;
        }
        if let Some(named) = node.named_bindings {
            if wrote_clause {
                self.write(", ");
            }
            self.print_specifiers(named);
        }
        self.write(" from ");
        self.write(node.module_specifier.raw);
        self.write(";");
    }

    fn print_specifiers(&mut self, specifiers: &[ImportSpecifier<'_>]) {
        if specifiers.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, spec) in specifiers.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if spec.is_type_only {
                self.write("type ");
            }
            if let Some(property) = &spec.property_name {
                self.write(property.name);
                self.write(" as ");
            }
            self.write(spec.name.name);
        }
        self.write(" }");
    }

    fn print_export(&mut self, node: &ExportDeclaration<'_>) {
        self.write("export ");
        if node.is_type_only {
            self.write("type ");
        }
        match &node.clause {
            ExportClause::Named(specifiers) => self.print_specifiers(specifiers),
            ExportClause::Namespace(alias) => {
                self.write("*");
                if let Some(alias) = alias {
                    self.write(" as ");
                    self.write(alias.name);
                }
            }
        }
        if let Some(module) = &node.module_specifier {
            self.write(" from ");
            self.write(module.raw);
        }
        self.write(";");
    }

    // ========================================================================
    // Expression printing
    // ========================================================================

    pub fn print_expression(&mut self, expr: &Expression<'_>) {
        self.print_expression_at(expr, Precedence::Comma);
    }

    /// Print `expr` in a position that binds at least as tightly as `min`,
    /// adding parentheses when the expression binds looser.
    fn print_expression_at(&mut self, expr: &Expression<'_>, min: Precedence) {
        if expression_precedence(expr) < min {
            self.write("(");
            self.print_expression_inner(expr);
            self.write(")");
        } else {
            self.print_expression_inner(expr);
        }
    }

    fn print_expression_inner(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Identifier(id) => self.write(id.name),
            Expression::StringLiteral(s) => self.write(s.raw),
            Expression::NumericLiteral(n) => self.write(n.raw),
            Expression::BigIntLiteral(n) | Expression::RegularExpressionLiteral(n) => self.write(n.raw),
            Expression::NoSubstitutionTemplateLiteral(t) => {
                self.write("`");
                self.write(t.raw);
                self.write("`");
            }
            Expression::Template(t) => {
                self.write("`");
                self.write(t.head.raw);
                for span in t.spans.iter() {
                    self.write("${");
                    self.print_expression(span.expression);
                    self.write("}");
                    self.write(span.literal.raw);
                }
                self.write("`");
            }
            Expression::ArrayLiteral(a) => {
                self.write("[");
                for (i, elem) in a.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if !matches!(elem, Expression::Omitted(_)) {
                        self.print_expression_at(elem, Precedence::Assignment);
                    }
                }
                if matches!(a.elements.last(), Some(Expression::Omitted(_))) {
                    self.write(",");
                }
                self.write("]");
            }
            Expression::ObjectLiteral(o) => self.print_object_literal(o),
            Expression::PropertyAccess(p) => {
                self.print_member_object(p.expression);
                self.write(if p.optional { "?." } else { "." });
                self.write(p.name.name);
            }
            Expression::ElementAccess(e) => {
                self.print_member_object(e.expression);
                self.write(if e.optional { "?.[" } else { "[" });
                self.print_expression(e.argument);
                self.write("]");
            }
            Expression::Call(c) => {
                self.print_member_object(c.expression);
                if c.optional {
                    self.write("?.");
                }
                self.print_type_arguments(c.type_arguments);
                self.print_arguments(c.arguments);
            }
            Expression::New(n) => {
                self.write("new ");
                if callee_contains_call(n.expression) {
                    self.write("(");
                    self.print_expression(n.expression);
                    self.write(")");
                } else {
                    self.print_expression_at(n.expression, Precedence::LeftHandSide);
                }
                self.print_type_arguments(n.type_arguments);
                if let Some(args) = n.arguments {
                    self.print_arguments(args);
                }
            }
            Expression::TaggedTemplate(t) => {
                self.print_member_object(t.tag);
                self.print_type_arguments(t.type_arguments);
                self.print_expression_inner(t.template);
            }
            Expression::TypeAssertion(t) => {
                self.write("<");
                self.print_type(t.type_node);
                self.write(">");
                self.print_expression_at(t.expression, Precedence::Unary);
            }
            Expression::Parenthesized(p) => {
                self.write("(");
                self.print_expression(p.expression);
                self.write(")");
            }
            Expression::Function(f) => self.print_function(f),
            Expression::Arrow(a) => self.print_arrow(a),
            Expression::Class(c) => self.print_class(c),
            Expression::PrefixUnary(p) => {
                self.write(p.operator.operator_text());
                let is_word = matches!(
                    p.operator,
                    SyntaxKind::TypeOfKeyword | SyntaxKind::VoidKeyword | SyntaxKind::DeleteKeyword
                );
                let doubled_sign = match (p.operator, p.operand) {
                    (SyntaxKind::MinusToken | SyntaxKind::MinusMinusToken, Expression::PrefixUnary(inner)) => {
                        matches!(inner.operator, SyntaxKind::MinusToken | SyntaxKind::MinusMinusToken)
                    }
                    (SyntaxKind::PlusToken | SyntaxKind::PlusPlusToken, Expression::PrefixUnary(inner)) => {
                        matches!(inner.operator, SyntaxKind::PlusToken | SyntaxKind::PlusPlusToken)
                    }
                    _ => false,
                };
                if is_word || doubled_sign {
                    self.write(" ");
                }
                self.print_expression_at(p.operand, Precedence::Unary);
            }
            Expression::PostfixUnary(p) => {
                self.print_expression_at(p.operand, Precedence::LeftHandSide);
                self.write(p.operator.operator_text());
            }
            Expression::Await(a) => {
                self.write("await ");
                self.print_expression_at(a.operand, Precedence::Unary);
            }
            Expression::Yield(y) => {
                self.write("yield");
                if y.delegate {
                    self.write("*");
                }
                if let Some(expr) = y.expression {
                    self.write(" ");
                    self.print_expression_at(expr, Precedence::Assignment);
                }
            }
            Expression::Binary(b) => self.print_binary(b),
            Expression::Conditional(c) => {
                self.print_expression_at(c.condition, Precedence::Coalesce);
                self.write(" ? ");
                self.print_expression_at(c.when_true, Precedence::Assignment);
                self.write(" : ");
                self.print_expression_at(c.when_false, Precedence::Assignment);
            }
            Expression::Spread(s) => {
                self.write("...");
                self.print_expression_at(s.operand, Precedence::Assignment);
            }
            Expression::Omitted(_) => {}
            Expression::As(a) => {
                self.print_expression_at(a.expression, Precedence::Relational);
                self.write(" as ");
                self.print_type(a.type_node);
            }
            Expression::Satisfies(a) => {
                self.print_expression_at(a.expression, Precedence::Relational);
                self.write(" satisfies ");
                self.print_type(a.type_node);
            }
            Expression::NonNull(n) => {
                self.print_expression_at(n.operand, Precedence::LeftHandSide);
                self.write("!");
            }
            Expression::MetaProperty(m) => {
                self.write(m.keyword.operator_text());
                self.write(".");
                self.write(m.name.name);
            }
            Expression::This(_) => self.write("this"),
            Expression::Super(_) => self.write("super"),
            Expression::Null(_) => self.write("null"),
            Expression::True(_) => self.write("true"),
            Expression::False(_) => self.write("false"),
        }
    }

    /// The object of a member access or call: `1.x` needs parentheses.
    fn print_member_object(&mut self, expr: &Expression<'_>) {
        let is_bare_integer = matches!(
            expr,
            Expression::NumericLiteral(n) if n.raw.bytes().all(|b| b.is_ascii_digit())
        );
        if is_bare_integer {
            self.write("(");
            self.print_expression_inner(expr);
            self.write(")");
        } else {
            self.print_expression_at(expr, Precedence::LeftHandSide);
        }
    }

    fn print_binary(&mut self, b: &BinaryExpression<'_>) {
        if b.operator.is_assignment_operator() {
            self.print_expression_at(b.left, Precedence::LeftHandSide);
            self.write(" ");
            self.write(b.operator.operator_text());
            self.write(" ");
            self.print_expression_at(b.right, Precedence::Assignment);
            return;
        }
        if b.operator == SyntaxKind::CommaToken {
            self.print_expression_at(b.left, Precedence::Comma);
            self.write(", ");
            self.print_expression_at(b.right, Precedence::Assignment);
            return;
        }
        let precedence = binary_precedence(b.operator);
        let (left_min, right_min) = if b.operator == SyntaxKind::AsteriskAsteriskToken {
            (Precedence::Postfix, precedence)
        } else {
            (precedence, next_precedence(precedence))
        };
        self.print_expression_at(b.left, left_min);
        self.write(" ");
        self.write(b.operator.operator_text());
        self.write(" ");
        self.print_expression_at(b.right, right_min);
    }

    fn print_arguments(&mut self, args: &[Expression<'_>]) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression_at(arg, Precedence::Assignment);
        }
        self.write(")");
    }

    fn print_arrow(&mut self, a: &ArrowFunction<'_>) {
        if a.data.has_modifier(ModifierFlags::ASYNC) {
            self.write("async ");
        }
        self.print_type_parameters(a.type_parameters);
        self.print_parameter_list(a.parameters);
        self.print_type_annotation(a.return_type);
        self.write(" => ");
        match &a.body {
            ArrowFunctionBody::Block(block) => self.print_block(block),
            ArrowFunctionBody::Expression(expr) => {
                if matches!(leftmost_expression(expr), Expression::ObjectLiteral(_)) {
                    self.write("(");
                    self.print_expression(expr);
                    self.write(")");
                } else {
                    self.print_expression_at(expr, Precedence::Assignment);
                }
            }
        }
    }

    fn print_object_literal(&mut self, node: &ObjectLiteralExpression<'_>) {
        if node.properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, prop) in node.properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match prop {
                ObjectLiteralElement::Property(p) => {
                    self.print_property_name(&p.name);
                    self.write(": ");
                    self.print_expression_at(p.initializer, Precedence::Assignment);
                }
                ObjectLiteralElement::Shorthand(s) => {
                    self.write(s.name.name);
                    if let Some(default) = s.default {
                        self.write(" = ");
                        self.print_expression_at(default, Precedence::Assignment);
                    }
                }
                ObjectLiteralElement::Spread(s) => {
                    self.write("...");
                    self.print_expression_at(s.operand, Precedence::Assignment);
                }
                ObjectLiteralElement::Method(m) => self.print_method(m),
            }
        }
        self.write(" }");
    }

    // ========================================================================
    // Type printing
    // ========================================================================

    pub fn print_type(&mut self, ty: &TypeNode<'_>) {
        match ty {
            TypeNode::Keyword(k) => self.write(k.keyword.text()),
            TypeNode::Reference(r) => {
                self.print_entity_name(&r.type_name);
                self.print_type_arguments(r.type_arguments);
            }
            TypeNode::Function(f) => {
                if f.is_constructor {
                    self.print_modifiers(f.data.modifier_flags);
                    self.write("new ");
                }
                self.print_type_parameters(f.type_parameters);
                self.print_parameter_list(f.parameters);
                self.write(" => ");
                self.print_type(f.return_type);
            }
            TypeNode::Query(q) => {
                self.write("typeof ");
                self.print_entity_name(&q.expr_name);
            }
            TypeNode::TypeLiteral(t) => {
                if t.members.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, member) in t.members.iter().enumerate() {
                    if i > 0 {
                        self.write("; ");
                    }
                    self.print_type_element(member);
                }
                self.write(" }");
            }
            TypeNode::Array(a) => {
                self.print_type_operand(a.element_type, TypeContext::Postfix);
                self.write("[]");
            }
            TypeNode::Tuple(t) => {
                self.write("[");
                for (i, elem) in t.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if elem.rest {
                        self.write("...");
                    }
                    match &elem.name {
                        Some(name) => {
                            self.write(name.name);
                            if elem.optional {
                                self.write("?");
                            }
                            self.write(": ");
                            self.print_type(elem.type_node);
                        }
                        None => {
                            self.print_type(elem.type_node);
                            if elem.optional {
                                self.write("?");
                            }
                        }
                    }
                }
                self.write("]");
            }
            TypeNode::Union(u) => self.print_type_list(u.types, " | ", TypeContext::UnionMember),
            TypeNode::Intersection(u) => {
                self.print_type_list(u.types, " & ", TypeContext::IntersectionMember)
            }
            TypeNode::Conditional(c) => {
                self.print_type_operand(c.check_type, TypeContext::UnionMember);
                self.write(" extends ");
                self.print_type_operand(c.extends_type, TypeContext::UnionMember);
                self.write(" ? ");
                self.print_type(c.true_type);
                self.write(" : ");
                self.print_type(c.false_type);
            }
            TypeNode::Infer(i) => {
                self.write("infer ");
                self.write(i.name.name);
            }
            TypeNode::Parenthesized(p) => {
                self.write("(");
                self.print_type(p.type_node);
                self.write(")");
            }
            TypeNode::This(_) => self.write("this"),
            TypeNode::Operator(o) => {
                self.write(o.operator.text());
                self.write(" ");
                self.print_type_operand(o.type_node, TypeContext::Postfix);
            }
            TypeNode::IndexedAccess(i) => {
                self.print_type_operand(i.object_type, TypeContext::Postfix);
                self.write("[");
                self.print_type(i.index_type);
                self.write("]");
            }
            TypeNode::Mapped(m) => {
                self.write("{ ");
                if m.readonly {
                    self.write("readonly ");
                }
                self.write("[");
                self.write(m.type_parameter.name);
                self.write(" in ");
                self.print_type(m.constraint);
                if let Some(name_type) = m.name_type {
                    self.write(" as ");
                    self.print_type(name_type);
                }
                self.write("]");
                if m.optional {
                    self.write("?");
                }
                if let Some(ty) = m.type_node {
                    self.write(": ");
                    self.print_type(ty);
                }
                self.write(" }");
            }
            TypeNode::Literal(l) => self.print_expression_inner(l.literal),
            TypeNode::TemplateLiteral(t) => {
                self.write("`");
                self.write(t.head.raw);
                for span in t.spans.iter() {
                    self.write("${");
                    self.print_type(span.type_node);
                    self.write("}");
                    self.write(span.literal.raw);
                }
                self.write("`");
            }
            TypeNode::Predicate(p) => {
                if p.asserts {
                    self.write("asserts ");
                }
                self.write(p.parameter_name.name);
                if let Some(ty) = p.type_node {
                    self.write(" is ");
                    self.print_type(ty);
                }
            }
        }
    }

    fn print_type_list(&mut self, types: &[TypeNode<'_>], separator: &str, context: TypeContext) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.print_type_operand(ty, context);
        }
    }

    /// Parenthesize types that would otherwise re-associate in `context`.
    fn print_type_operand(&mut self, ty: &TypeNode<'_>, context: TypeContext) {
        let needs_parens = match ty {
            TypeNode::Function(_) | TypeNode::Conditional(_) => true,
            TypeNode::Union(_) => context != TypeContext::UnionMember,
            TypeNode::Intersection(_) => context == TypeContext::Postfix,
            TypeNode::Operator(_) | TypeNode::Infer(_) => context == TypeContext::Postfix,
            _ => false,
        };
        if needs_parens {
            self.write("(");
            self.print_type(ty);
            self.write(")");
        } else {
            self.print_type(ty);
        }
    }

    fn print_type_annotation(&mut self, ty: Option<&TypeNode<'_>>) {
        if let Some(ty) = ty {
            self.write(": ");
            self.print_type(ty);
        }
    }

    fn print_type_arguments(&mut self, args: Option<&[TypeNode<'_>]>) {
        if let Some(args) = args {
            self.write("<");
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.print_type(arg);
            }
            self.write(">");
        }
    }

    fn print_type_parameters(&mut self, params: Option<&[TypeParameter<'_>]>) {
        let Some(params) = params else {
            return;
        };
        self.write("<");
        for (i, tp) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(tp.name.name);
            if let Some(constraint) = tp.constraint {
                self.write(" extends ");
                self.print_type(constraint);
            }
            if let Some(default) = tp.default {
                self.write(" = ");
                self.print_type(default);
            }
        }
        self.write(">");
    }

    // ========================================================================
    // Helper printing functions
    // ========================================================================

    fn print_entity_name(&mut self, name: &EntityName<'_>) {
        match name {
            EntityName::Identifier(id) => self.write(id.name),
            EntityName::Qualified(q) => {
                self.print_entity_name(&q.left);
                self.write(".");
                self.write(q.right.name);
            }
        }
    }

    fn print_property_name(&mut self, name: &PropertyName<'_>) {
        match name {
            PropertyName::Identifier(id) | PropertyName::PrivateIdentifier(id) => self.write(id.name),
            PropertyName::StringLiteral(s) => self.write(s.raw),
            PropertyName::NumericLiteral(n) => self.write(n.raw),
            PropertyName::Computed(expr) => {
                self.write("[");
                self.print_expression_at(expr, Precedence::Assignment);
                self.write("]");
            }
        }
    }

    fn print_parameter_list(&mut self, params: &[Parameter<'_>]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_modifiers(param.data.modifier_flags);
            if param.rest {
                self.write("...");
            }
            self.print_binding_name(&param.name);
            if param.optional {
                self.write("?");
            }
            self.print_type_annotation(param.type_annotation);
            if let Some(init) = param.initializer {
                self.write(" = ");
                self.print_expression_at(init, Precedence::Assignment);
            }
        }
        self.write(")");
    }

    fn print_modifiers(&mut self, flags: ModifierFlags) {
        const ORDER: [(ModifierFlags, &str); 13] = [
            (ModifierFlags::EXPORT, "export "),
            (ModifierFlags::DEFAULT, "default "),
            (ModifierFlags::AMBIENT, "declare "),
            (ModifierFlags::PUBLIC, "public "),
            (ModifierFlags::PRIVATE, "private "),
            (ModifierFlags::PROTECTED, "protected "),
            (ModifierFlags::STATIC, "static "),
            (ModifierFlags::OVERRIDE, "override "),
            (ModifierFlags::ABSTRACT, "abstract "),
            (ModifierFlags::READONLY, "readonly "),
            (ModifierFlags::ACCESSOR, "accessor "),
            (ModifierFlags::ASYNC, "async "),
            (ModifierFlags::CONST, "const "),
        ];
        if flags.is_empty() {
            return;
        }
        for (flag, text) in ORDER {
            if flags.contains(flag) {
                self.write(text);
            }
        }
    }

    #[inline]
    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_newline(&mut self) {
        self.output.push_str(&self.options.new_line);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

impl Default for Printer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeContext {
    UnionMember,
    IntersectionMember,
    Postfix,
}

fn next_precedence(p: Precedence) -> Precedence {
    match p {
        Precedence::Comma => Precedence::Assignment,
        Precedence::Assignment => Precedence::Conditional,
        Precedence::Conditional => Precedence::Coalesce,
        Precedence::Coalesce => Precedence::LogicalOr,
        Precedence::LogicalOr => Precedence::LogicalAnd,
        Precedence::LogicalAnd => Precedence::BitwiseOr,
        Precedence::BitwiseOr => Precedence::BitwiseXor,
        Precedence::BitwiseXor => Precedence::BitwiseAnd,
        Precedence::BitwiseAnd => Precedence::Equality,
        Precedence::Equality => Precedence::Relational,
        Precedence::Relational => Precedence::Shift,
        Precedence::Shift => Precedence::Additive,
        Precedence::Additive => Precedence::Multiplicative,
        Precedence::Multiplicative => Precedence::Exponentiation,
        Precedence::Exponentiation => Precedence::Unary,
        Precedence::Unary => Precedence::Postfix,
        Precedence::Postfix => Precedence::LeftHandSide,
        Precedence::LeftHandSide | Precedence::Primary => Precedence::Primary,
    }
}

/// Whether the callee of a `new` contains a call that would otherwise take
/// the argument list: `new (f())()`.
fn callee_contains_call(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::Call(_) => true,
        Expression::PropertyAccess(p) => callee_contains_call(p.expression),
        Expression::ElementAccess(e) => callee_contains_call(e.expression),
        _ => false,
    }
}

/// Print a type node on its own; used for messages that name a type.
pub fn type_to_string(ty: &TypeNode<'_>) -> String {
    let mut printer = Printer::new();
    printer.print_type(ty);
    printer.output
}

/// Print an expression on its own.
pub fn expression_to_string(expr: &Expression<'_>) -> String {
    let mut printer = Printer::new();
    printer.print_expression(expr);
    printer.output
}
