//! AST visitor trait for traversing the syntax tree.
//!
//! Default implementations walk into children, so an implementation overrides
//! only the hooks it cares about and calls the matching `walk_*` function when
//! it still wants the default descent.

use crate::node::*;

/// A visitor over statements and expressions. Type annotations are reported
/// through [`AstVisitor::visit_type_node`] but not walked into.
pub trait AstVisitor<'a> {
    fn visit_source_file(&mut self, node: &SourceFile<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        walk_statement(self, stmt);
    }

    // -- Statements --

    fn visit_variable_statement(&mut self, node: &VariableStatement<'a>) {
        for decl in node.declarations.iter() {
            self.visit_variable_declaration(decl);
        }
    }

    fn visit_variable_declaration(&mut self, node: &VariableDeclaration<'a>) {
        self.visit_binding_name(&node.name);
        if let Some(ty) = node.type_annotation {
            self.visit_type_node(ty);
        }
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        walk_function(self, node);
    }

    fn visit_class_declaration(&mut self, node: &ClassDeclaration<'a>) {
        if let Some(extends) = node.extends {
            self.visit_expression(extends);
        }
        for member in node.members.iter() {
            self.visit_class_element(member);
        }
    }

    fn visit_class_element(&mut self, member: &ClassElement<'a>) {
        match member {
            ClassElement::Property(p) => {
                if let Some(ty) = p.type_annotation {
                    self.visit_type_node(ty);
                }
                if let Some(init) = p.initializer {
                    self.visit_expression(init);
                }
            }
            ClassElement::Method(m) => self.visit_method_declaration(m),
            ClassElement::StaticBlock(block) => self.visit_block(block),
            ClassElement::Index(_) | ClassElement::Semicolon(_) => {}
        }
    }

    fn visit_method_declaration(&mut self, node: &MethodDeclaration<'a>) {
        if let PropertyName::Computed(expr) = node.name {
            self.visit_expression(expr);
        }
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        if let Some(ret) = node.return_type {
            self.visit_type_node(ret);
        }
        if let Some(body) = node.body {
            self.visit_block(body);
        }
    }

    fn visit_interface_declaration(&mut self, _node: &InterfaceDeclaration<'a>) {}

    fn visit_type_alias_declaration(&mut self, _node: &TypeAliasDeclaration<'a>) {}

    fn visit_enum_declaration(&mut self, node: &EnumDeclaration<'a>) {
        for member in node.members.iter() {
            if let Some(init) = member.initializer {
                self.visit_expression(init);
            }
        }
    }

    fn visit_module_declaration(&mut self, node: &ModuleDeclaration<'a>) {
        if let Some(body) = node.body {
            for stmt in body.iter() {
                self.visit_statement(stmt);
            }
        }
    }

    fn visit_block(&mut self, node: &Block<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_return_statement(&mut self, node: &ReturnStatement<'a>) {
        if let Some(expr) = node.expression {
            self.visit_expression(expr);
        }
    }

    fn visit_for_initializer(&mut self, init: &ForInitializer<'a>) {
        match init {
            ForInitializer::Variable(list) => self.visit_variable_statement(list),
            ForInitializer::Expression(expr) => self.visit_expression(expr),
        }
    }

    fn visit_parameter(&mut self, node: &Parameter<'a>) {
        self.visit_binding_name(&node.name);
        if let Some(ty) = node.type_annotation {
            self.visit_type_node(ty);
        }
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_binding_name(&mut self, name: &BindingName<'a>) {
        match name {
            BindingName::Identifier(_) => {}
            BindingName::Object(pattern) => {
                for element in pattern.elements.iter() {
                    self.visit_binding_element(element);
                }
            }
            BindingName::Array(pattern) => {
                for element in pattern.elements.iter() {
                    if let ArrayBindingElement::Element(e) = element {
                        self.visit_binding_element(e);
                    }
                }
            }
        }
    }

    fn visit_binding_element(&mut self, node: &BindingElement<'a>) {
        if let Some(PropertyName::Computed(expr)) = node.property_name {
            self.visit_expression(expr);
        }
        self.visit_binding_name(&node.name);
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    // -- Expressions --

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        walk_expression(self, expr);
    }

    fn visit_arrow_function(&mut self, node: &ArrowFunction<'a>) {
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        if let Some(ret) = node.return_type {
            self.visit_type_node(ret);
        }
        match node.body {
            ArrowFunctionBody::Block(block) => self.visit_block(block),
            ArrowFunctionBody::Expression(expr) => self.visit_expression(expr),
        }
    }

    fn visit_call_expression(&mut self, node: &CallExpression<'a>) {
        self.visit_expression(node.expression);
        for arg in node.arguments.iter() {
            self.visit_expression(arg);
        }
    }

    fn visit_object_literal_element(&mut self, elem: &ObjectLiteralElement<'a>) {
        match elem {
            ObjectLiteralElement::Property(p) => {
                if let PropertyName::Computed(expr) = p.name {
                    self.visit_expression(expr);
                }
                self.visit_expression(p.initializer);
            }
            ObjectLiteralElement::Shorthand(s) => {
                if let Some(default) = s.default {
                    self.visit_expression(default);
                }
            }
            ObjectLiteralElement::Spread(s) => self.visit_expression(s.operand),
            ObjectLiteralElement::Method(m) => self.visit_method_declaration(m),
        }
    }

    // -- Types --

    fn visit_type_node(&mut self, _node: &TypeNode<'a>) {}
}

/// Default descent for a statement.
pub fn walk_statement<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, stmt: &Statement<'a>) {
    match stmt {
        Statement::Variable(n) => v.visit_variable_statement(n),
        Statement::Function(n) => v.visit_function_declaration(n),
        Statement::Class(n) => v.visit_class_declaration(n),
        Statement::Interface(n) => v.visit_interface_declaration(n),
        Statement::TypeAlias(n) => v.visit_type_alias_declaration(n),
        Statement::Enum(n) => v.visit_enum_declaration(n),
        Statement::Module(n) => v.visit_module_declaration(n),
        Statement::Import(_) | Statement::ImportEquals(_) | Statement::Export(_) => {}
        Statement::ExportAssignment(n) => v.visit_expression(n.expression),
        Statement::Block(n) => v.visit_block(n),
        Statement::Expression(n) | Statement::Throw(n) => v.visit_expression(n.expression),
        Statement::If(n) => {
            v.visit_expression(n.expression);
            v.visit_statement(n.then_statement);
            if let Some(else_stmt) = n.else_statement {
                v.visit_statement(else_stmt);
            }
        }
        Statement::Do(n) => {
            v.visit_statement(n.statement);
            v.visit_expression(n.expression);
        }
        Statement::While(n) => {
            v.visit_expression(n.expression);
            v.visit_statement(n.statement);
        }
        Statement::For(n) => {
            if let Some(ref init) = n.initializer {
                v.visit_for_initializer(init);
            }
            if let Some(cond) = n.condition {
                v.visit_expression(cond);
            }
            if let Some(incr) = n.incrementor {
                v.visit_expression(incr);
            }
            v.visit_statement(n.statement);
        }
        Statement::ForIn(n) | Statement::ForOf(n) => {
            v.visit_for_initializer(&n.initializer);
            v.visit_expression(n.expression);
            v.visit_statement(n.statement);
        }
        Statement::Return(n) => v.visit_return_statement(n),
        Statement::Switch(n) => {
            v.visit_expression(n.expression);
            for clause in n.clauses.iter() {
                if let Some(expr) = clause.expression {
                    v.visit_expression(expr);
                }
                for s in clause.statements.iter() {
                    v.visit_statement(s);
                }
            }
        }
        Statement::Labeled(n) => v.visit_statement(n.statement),
        Statement::Try(n) => {
            v.visit_block(n.try_block);
            if let Some(ref catch) = n.catch_clause {
                if let Some(ref binding) = catch.binding {
                    v.visit_binding_name(binding);
                }
                v.visit_block(catch.block);
            }
            if let Some(finally) = n.finally_block {
                v.visit_block(finally);
            }
        }
        Statement::Empty(_)
        | Statement::Continue(_)
        | Statement::Break(_)
        | Statement::Debugger(_)
        | Statement::Verbatim(_) => {}
    }
}

/// Default descent for a function declaration or expression.
pub fn walk_function<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &FunctionDeclaration<'a>) {
    for param in node.parameters.iter() {
        v.visit_parameter(param);
    }
    if let Some(ret) = node.return_type {
        v.visit_type_node(ret);
    }
    if let Some(body) = node.body {
        v.visit_block(body);
    }
}

/// Default descent for an expression.
pub fn walk_expression<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, expr: &Expression<'a>) {
    match expr {
        Expression::Identifier(_)
        | Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::RegularExpressionLiteral(_)
        | Expression::NoSubstitutionTemplateLiteral(_)
        | Expression::Omitted(_)
        | Expression::MetaProperty(_)
        | Expression::This(_)
        | Expression::Super(_)
        | Expression::Null(_)
        | Expression::True(_)
        | Expression::False(_) => {}
        Expression::Template(n) => {
            for span in n.spans.iter() {
                v.visit_expression(span.expression);
            }
        }
        Expression::ArrayLiteral(n) => {
            for elem in n.elements.iter() {
                v.visit_expression(elem);
            }
        }
        Expression::ObjectLiteral(n) => {
            for prop in n.properties.iter() {
                v.visit_object_literal_element(prop);
            }
        }
        Expression::PropertyAccess(n) => v.visit_expression(n.expression),
        Expression::ElementAccess(n) => {
            v.visit_expression(n.expression);
            v.visit_expression(n.argument);
        }
        Expression::Call(n) => v.visit_call_expression(n),
        Expression::New(n) => {
            v.visit_expression(n.expression);
            if let Some(args) = n.arguments {
                for arg in args.iter() {
                    v.visit_expression(arg);
                }
            }
        }
        Expression::TaggedTemplate(n) => {
            v.visit_expression(n.tag);
            v.visit_expression(n.template);
        }
        Expression::TypeAssertion(n) => {
            v.visit_type_node(n.type_node);
            v.visit_expression(n.expression);
        }
        Expression::Parenthesized(n) => v.visit_expression(n.expression),
        Expression::Function(n) => v.visit_function_declaration(n),
        Expression::Arrow(n) => v.visit_arrow_function(n),
        Expression::Class(n) => v.visit_class_declaration(n),
        Expression::PrefixUnary(n) => v.visit_expression(n.operand),
        Expression::PostfixUnary(n) => v.visit_expression(n.operand),
        Expression::Await(n) | Expression::Spread(n) | Expression::NonNull(n) => {
            v.visit_expression(n.operand)
        }
        Expression::Yield(n) => {
            if let Some(expr) = n.expression {
                v.visit_expression(expr);
            }
        }
        Expression::Binary(n) => {
            v.visit_expression(n.left);
            v.visit_expression(n.right);
        }
        Expression::Conditional(n) => {
            v.visit_expression(n.condition);
            v.visit_expression(n.when_true);
            v.visit_expression(n.when_false);
        }
        Expression::As(n) | Expression::Satisfies(n) => {
            v.visit_expression(n.expression);
            v.visit_type_node(n.type_node);
        }
    }
}
