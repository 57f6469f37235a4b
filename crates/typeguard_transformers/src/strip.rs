//! Type erasure.
//!
//! [`Stripper`] rebuilds a source file without its type-only syntax. The new
//! tree lives in the same arena as the old one; leaf nodes are shared rather
//! than copied. With an [`Instrumenter`] attached, function boundaries get
//! their guards in the same pass.

use crate::instrument::{Instrumenter, Signature};
use typeguard_ast::node::*;
use typeguard_ast::{MethodKind, ModifierFlags, NodeFactory, SyntaxKind, VariableKind};
use typeguard_evaluator::{evaluate_enum, ConstantValue};
use typeguard_types::translate::property_key;

/// Modifiers that survive erasure on a declaration.
fn runtime_modifiers(flags: ModifierFlags) -> ModifierFlags {
    flags - ModifierFlags::TYPE_ONLY_MODIFIER
}

fn with_runtime_modifiers(data: NodeData) -> NodeData {
    data.with_modifiers(runtime_modifiers(data.modifier_flags))
}

fn is_ambient(data: &NodeData) -> bool {
    data.has_modifier(ModifierFlags::AMBIENT)
}

pub struct Stripper<'a, 'r> {
    factory: NodeFactory<'a>,
    instrumenter: Option<Instrumenter<'r>>,
}

impl<'a, 'r> Stripper<'a, 'r> {
    pub fn new(factory: NodeFactory<'a>) -> Self {
        Self {
            factory,
            instrumenter: None,
        }
    }

    /// Add guards at function boundaries while stripping.
    pub fn with_instrumenter(mut self, instrumenter: Instrumenter<'r>) -> Self {
        self.instrumenter = Some(instrumenter);
        self
    }

    pub fn strip_source_file(&mut self, file: &SourceFile<'a>) -> SourceFile<'a> {
        SourceFile {
            statements: self.statement_list(file.statements),
            ..*file
        }
    }

    /// Give back the instrumenter and the descriptor table it filled.
    pub fn into_instrumenter(self) -> Option<Instrumenter<'r>> {
        self.instrumenter
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement_list(&mut self, statements: &'a [Statement<'a>]) -> &'a [Statement<'a>] {
        let out = self.statement_vec(statements);
        self.factory.list(out)
    }

    fn statement_vec(&mut self, statements: &'a [Statement<'a>]) -> Vec<Statement<'a>> {
        let mut out = Vec::with_capacity(statements.len());
        for stmt in statements {
            self.statement(stmt, &mut out);
        }
        out
    }

    /// A statement in a position that holds exactly one.
    fn single(&mut self, stmt: &'a Statement<'a>) -> &'a Statement<'a> {
        let mut out = Vec::with_capacity(1);
        self.statement(stmt, &mut out);
        match out.len() {
            0 => self.factory.alloc(Statement::Empty(*stmt.data())),
            1 => self.factory.alloc(out[0]),
            _ => self.factory.alloc(Statement::Block(self.factory.alloc(Block {
                data: *stmt.data(),
                statements: self.factory.list(out),
            }))),
        }
    }

    fn block(&mut self, block: &'a Block<'a>) -> &'a Block<'a> {
        let statements = self.statement_list(block.statements);
        self.factory.alloc(Block {
            data: block.data,
            statements,
        })
    }

    fn statement(&mut self, stmt: &'a Statement<'a>, out: &mut Vec<Statement<'a>>) {
        match stmt {
            Statement::Interface(_) | Statement::TypeAlias(_) => {}
            s if is_ambient(s.data()) => {}
            Statement::Variable(v) => out.push(Statement::Variable(self.variable_statement(v))),
            Statement::Function(f) => {
                if f.body.is_some() {
                    let name = f.name.map(|id| id.name);
                    let function = self.function(f, name);
                    out.push(Statement::Function(self.factory.alloc(function)));
                }
            }
            Statement::Class(c) => {
                let class = self.class(c);
                out.push(Statement::Class(self.factory.alloc(class)));
            }
            Statement::Enum(e) => out.push(self.enum_declaration(e)),
            Statement::Module(m) => self.module(m, out),
            Statement::Import(i) => {
                if let Some(import) = self.import(i) {
                    out.push(Statement::Import(self.factory.alloc(import)));
                }
            }
            Statement::ImportEquals(i) => {
                if !i.is_type_only {
                    out.push(self.import_equals(i));
                }
            }
            Statement::Export(e) => {
                if let Some(export) = self.export(e) {
                    out.push(Statement::Export(self.factory.alloc(export)));
                }
            }
            Statement::ExportAssignment(a) => {
                let expression = self.expr(a.expression);
                if a.is_export_equals {
                    let module = self.factory.identifier_expression("module");
                    let target = self.factory.property_access(module, "exports");
                    let assign = self.factory.binary(target, SyntaxKind::EqualsToken, expression);
                    out.push(Statement::Expression(ExpressionStatement { data: a.data, expression: assign }));
                } else {
                    out.push(Statement::ExportAssignment(ExportAssignment { expression, ..*a }));
                }
            }
            Statement::Block(b) => out.push(Statement::Block(self.block(b))),
            Statement::Expression(e) => {
                out.push(Statement::Expression(ExpressionStatement { data: e.data, expression: self.expr(e.expression) }))
            }
            Statement::Throw(e) => {
                out.push(Statement::Throw(ExpressionStatement { data: e.data, expression: self.expr(e.expression) }))
            }
            Statement::If(n) => out.push(Statement::If(IfStatement {
                data: n.data,
                expression: self.expr(n.expression),
                then_statement: self.single(n.then_statement),
                else_statement: n.else_statement.map(|s| self.single(s)),
            })),
            Statement::Do(n) => out.push(Statement::Do(self.loop_statement(n))),
            Statement::While(n) => out.push(Statement::While(self.loop_statement(n))),
            Statement::For(n) => out.push(Statement::For(ForStatement {
                data: n.data,
                initializer: n.initializer.as_ref().map(|init| self.for_initializer(init)),
                condition: n.condition.map(|e| self.expr(e)),
                incrementor: n.incrementor.map(|e| self.expr(e)),
                statement: self.single(n.statement),
            })),
            Statement::ForIn(n) => out.push(Statement::ForIn(self.for_in_of(n))),
            Statement::ForOf(n) => out.push(Statement::ForOf(self.for_in_of(n))),
            Statement::Return(r) => {
                let expression = r.expression.map(|e| self.expr(e));
                let guarded = match (expression, self.instrumenter.as_mut()) {
                    (Some(expr), Some(instrumenter)) => instrumenter.guard_return(&self.factory, expr),
                    _ => None,
                };
                match guarded {
                    Some(statements) => out.extend(statements),
                    None => out.push(Statement::Return(ReturnStatement { data: r.data, expression })),
                }
            }
            Statement::Switch(n) => {
                let clauses = n
                    .clauses
                    .iter()
                    .map(|clause| CaseClause {
                        data: clause.data,
                        expression: clause.expression.map(|e| self.expr(e)),
                        statements: self.statement_list(clause.statements),
                    })
                    .collect();
                out.push(Statement::Switch(SwitchStatement {
                    data: n.data,
                    expression: self.expr(n.expression),
                    clauses: self.factory.list(clauses),
                }));
            }
            Statement::Labeled(n) => out.push(Statement::Labeled(LabeledStatement {
                data: n.data,
                label: n.label,
                statement: self.single(n.statement),
            })),
            Statement::Try(n) => out.push(Statement::Try(TryStatement {
                data: n.data,
                try_block: self.block(n.try_block),
                catch_clause: n.catch_clause.map(|clause| CatchClause {
                    data: clause.data,
                    binding: clause.binding.map(|b| self.binding_name(b)),
                    type_annotation: None,
                    block: self.block(clause.block),
                }),
                finally_block: n.finally_block.map(|b| self.block(b)),
            })),
            Statement::Empty(_)
            | Statement::Continue(_)
            | Statement::Break(_)
            | Statement::Debugger(_)
            | Statement::Verbatim(_) => out.push(*stmt),
        }
    }

    fn variable_statement(&mut self, v: &VariableStatement<'a>) -> VariableStatement<'a> {
        let declarations = v
            .declarations
            .iter()
            .map(|decl| {
                let hint = decl.name.as_identifier().map(|id| id.name);
                VariableDeclaration {
                    data: decl.data,
                    name: self.binding_name(decl.name),
                    definite: false,
                    type_annotation: None,
                    initializer: decl.initializer.map(|e| self.named_expr(e, hint)),
                }
            })
            .collect();
        VariableStatement {
            data: with_runtime_modifiers(v.data),
            kind: v.kind,
            declarations: self.factory.list(declarations),
        }
    }

    fn loop_statement(&mut self, n: &LoopStatement<'a>) -> LoopStatement<'a> {
        LoopStatement {
            data: n.data,
            expression: self.expr(n.expression),
            statement: self.single(n.statement),
        }
    }

    fn for_initializer(&mut self, init: &ForInitializer<'a>) -> ForInitializer<'a> {
        match init {
            ForInitializer::Variable(v) => ForInitializer::Variable(self.variable_statement(v)),
            ForInitializer::Expression(e) => ForInitializer::Expression(self.expr(e)),
        }
    }

    fn for_in_of(&mut self, n: &ForInOfStatement<'a>) -> ForInOfStatement<'a> {
        ForInOfStatement {
            data: n.data,
            is_await: n.is_await,
            initializer: self.for_initializer(&n.initializer),
            expression: self.expr(n.expression),
            statement: self.single(n.statement),
        }
    }

    // ========================================================================
    // Enums, namespaces, imports
    // ========================================================================

    /// `const E = Object.freeze({ A: 0, B: "b" });`
    fn enum_declaration(&mut self, e: &'a EnumDeclaration<'a>) -> Statement<'a> {
        let values = evaluate_enum(e);
        let mut entries = Vec::with_capacity(values.len());
        for member in &values {
            let value = match &member.value {
                Some(ConstantValue::Number(n)) => self.factory.numeric_literal(*n),
                Some(ConstantValue::String(s)) => self
                    .factory
                    .alloc(Expression::StringLiteral(self.factory.string_literal(s))),
                None => {
                    let init = e
                        .members
                        .iter()
                        .find(|m| m.name.static_name() == Some(member.name.as_str()))
                        .and_then(|m| m.initializer);
                    match init {
                        Some(init) => self.expr(init),
                        None => self.factory.identifier_expression("undefined"),
                    }
                }
            };
            entries.push((member.name.as_str(), value));
        }
        let object = self.factory.identifier_expression("Object");
        let freeze = self.factory.property_access(object, "freeze");
        let call = self.factory.call(freeze, vec![*self.factory.object_literal(entries)]);
        let declaration = VariableDeclaration {
            data: NodeData::synthesized(),
            name: BindingName::Identifier(e.name),
            definite: false,
            type_annotation: None,
            initializer: Some(call),
        };
        Statement::Variable(VariableStatement {
            data: e.data.with_modifiers(e.data.modifier_flags & ModifierFlags::EXPORT),
            kind: VariableKind::Const,
            declarations: self.factory.list(vec![declaration]),
        })
    }

    /// `namespace N { ... }` becomes
    /// `var N; (function (N) { ... })(N || (N = {}));`, with exported
    /// members assigned onto `N`. Namespaces holding only types vanish.
    fn module(&mut self, m: &'a ModuleDeclaration<'a>, out: &mut Vec<Statement<'a>>) {
        let Some(body) = m.body else {
            return;
        };
        if m.is_string_name {
            return;
        }
        let name = m.name;
        let mut inner = Vec::with_capacity(body.len());
        for stmt in body {
            // Assignments onto the namespace go after everything a member
            // lowers to, so a nested namespace is filled in first.
            let mut group = Vec::new();
            self.statement(stmt, &mut group);
            let mut exported = Vec::new();
            for stmt in group {
                if stmt.data().has_modifier(ModifierFlags::EXPORT) {
                    let (stmt, names) = self.unexport(stmt);
                    exported.extend(names);
                    inner.push(stmt);
                } else {
                    inner.push(stmt);
                }
            }
            for bound in exported {
                let target = self.factory.property_access(self.factory.identifier_expression(name), bound);
                let value = self.factory.identifier_expression(bound);
                let assign = self.factory.binary(target, SyntaxKind::EqualsToken, value);
                inner.push(self.factory.expression_statement(assign));
            }
        }
        if inner.is_empty() {
            return;
        }

        let declaration = VariableStatement {
            data: m.data.with_modifiers(m.data.modifier_flags & ModifierFlags::EXPORT),
            kind: VariableKind::Var,
            declarations: self.factory.list(vec![VariableDeclaration {
                data: NodeData::synthesized(),
                name: BindingName::Identifier(self.factory.identifier(name)),
                definite: false,
                type_annotation: None,
                initializer: None,
            }]),
        };
        out.push(Statement::Variable(declaration));

        let function = self.factory.alloc(FunctionDeclaration {
            data: NodeData::synthesized(),
            name: None,
            asterisk: false,
            type_parameters: None,
            parameters: self.factory.list(vec![Parameter {
                data: NodeData::synthesized(),
                name: BindingName::Identifier(self.factory.identifier(name)),
                rest: false,
                optional: false,
                type_annotation: None,
                initializer: None,
            }]),
            return_type: None,
            body: Some(self.factory.block(inner)),
        });
        let callee = self.factory.alloc(Expression::Parenthesized(ParenthesizedExpression {
            data: NodeData::synthesized(),
            expression: self.factory.alloc(Expression::Function(function)),
        }));
        let id = self.factory.identifier_expression(name);
        let init = self.factory.binary(id, SyntaxKind::EqualsToken, self.factory.object_literal(Vec::new()));
        let argument = self.factory.binary(id, SyntaxKind::BarBarToken, init);
        out.push(self.factory.expression_statement(self.factory.call(callee, vec![*argument])));
    }

    /// Drop `export` from a namespace member, returning the names it binds.
    fn unexport(&self, stmt: Statement<'a>) -> (Statement<'a>, Vec<&'a str>) {
        let flags = |data: &NodeData| data.with_modifiers(data.modifier_flags - ModifierFlags::EXPORT);
        let mut names = Vec::new();
        let stmt = match stmt {
            Statement::Variable(mut v) => {
                for decl in v.declarations {
                    decl.name.bound_names(&mut names);
                }
                v.data = flags(&v.data);
                Statement::Variable(v)
            }
            Statement::Function(f) => {
                names.extend(f.name.map(|id| id.name));
                Statement::Function(self.factory.alloc(FunctionDeclaration { data: flags(&f.data), ..*f }))
            }
            Statement::Class(c) => {
                names.extend(c.name.map(|id| id.name));
                Statement::Class(self.factory.alloc(ClassDeclaration { data: flags(&c.data), ..*c }))
            }
            other => other,
        };
        (stmt, names)
    }

    /// `None` when nothing of the import remains at run time.
    fn import(&mut self, i: &'a ImportDeclaration<'a>) -> Option<ImportDeclaration<'a>> {
        if i.is_type_only {
            return None;
        }
        let Some(named) = i.named_bindings else {
            return Some(*i);
        };
        let kept: Vec<ImportSpecifier<'a>> = named.iter().filter(|s| !s.is_type_only).copied().collect();
        let has_other_bindings = i.default_binding.is_some() || i.namespace_binding.is_some();
        if kept.is_empty() && !named.is_empty() && !has_other_bindings {
            return None;
        }
        let named_bindings = if kept.is_empty() && has_other_bindings {
            None
        } else {
            Some(self.factory.list(kept))
        };
        Some(ImportDeclaration { named_bindings, ..*i })
    }

    fn export(&mut self, e: &'a ExportDeclaration<'a>) -> Option<ExportDeclaration<'a>> {
        if e.is_type_only {
            return None;
        }
        match e.clause {
            ExportClause::Named(specifiers) => {
                let kept: Vec<ImportSpecifier<'a>> =
                    specifiers.iter().filter(|s| !s.is_type_only).copied().collect();
                if kept.is_empty() && !specifiers.is_empty() {
                    return None;
                }
                Some(ExportDeclaration {
                    clause: ExportClause::Named(self.factory.list(kept)),
                    ..*e
                })
            }
            ExportClause::Namespace(_) => Some(*e),
        }
    }

    /// `import x = require("m")` → `const x = require("m");`,
    /// `import x = N.y` → `var x = N.y;`.
    fn import_equals(&mut self, i: &'a ImportEqualsDeclaration<'a>) -> Statement<'a> {
        let (kind, value) = match &i.module_reference {
            ModuleReference::External(specifier) => {
                let require = self.factory.identifier_expression("require");
                let argument = Expression::StringLiteral(*specifier);
                (VariableKind::Const, self.factory.call(require, vec![argument]))
            }
            ModuleReference::Entity(name) => (VariableKind::Var, self.entity_expression(name)),
        };
        let declaration = VariableDeclaration {
            data: NodeData::synthesized(),
            name: BindingName::Identifier(i.name),
            definite: false,
            type_annotation: None,
            initializer: Some(value),
        };
        Statement::Variable(VariableStatement {
            data: i.data.with_modifiers(i.data.modifier_flags & ModifierFlags::EXPORT),
            kind,
            declarations: self.factory.list(vec![declaration]),
        })
    }

    fn entity_expression(&self, name: &EntityName<'a>) -> &'a Expression<'a> {
        match name {
            EntityName::Identifier(id) => self.factory.alloc(Expression::Identifier(*id)),
            EntityName::Qualified(q) => {
                let left = self.entity_expression(&q.left);
                self.factory.property_access(left, q.right.name)
            }
        }
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    fn parameter(&mut self, p: &Parameter<'a>) -> Parameter<'a> {
        Parameter {
            data: with_runtime_modifiers(p.data),
            name: self.binding_name(p.name),
            rest: p.rest,
            optional: false,
            type_annotation: None,
            initializer: p.initializer.map(|e| self.expr(e)),
        }
    }

    /// Strip and, when instrumenting, guard a function's parameters and
    /// body. `properties` are constructor parameter properties to assign
    /// onto `this`.
    fn function_parts(
        &mut self,
        signature: Signature<'a, '_>,
        body: &'a Block<'a>,
        properties: &[&'a str],
    ) -> (&'a [Parameter<'a>], &'a Block<'a>) {
        let stripped: Vec<Parameter<'a>> = signature.parameters.iter().map(|p| self.parameter(p)).collect();
        let (parameters, prologue) = match self.instrumenter.as_mut() {
            Some(instrumenter) => {
                let entry = instrumenter.enter_function(&self.factory, &signature, stripped);
                (entry.parameters, entry.prologue)
            }
            None => (stripped, Vec::new()),
        };
        let statements = self.statement_vec(body.statements);
        if let Some(instrumenter) = self.instrumenter.as_mut() {
            instrumenter.leave_function();
        }
        let statements = self.assemble_body(statements, prologue, properties);
        let body = self.factory.alloc(Block {
            data: body.data,
            statements: self.factory.list(statements),
        });
        (self.factory.list(parameters), body)
    }

    /// Directives first, then the prologue, then the original statements
    /// with `this.x = x;` inserted after the `super(...)` call (or at the
    /// start when there is none).
    fn assemble_body(
        &self,
        statements: Vec<Statement<'a>>,
        prologue: Vec<Statement<'a>>,
        properties: &[&'a str],
    ) -> Vec<Statement<'a>> {
        if prologue.is_empty() && properties.is_empty() {
            return statements;
        }
        let directives = statements.iter().take_while(|s| s.is_directive()).count();
        let super_call = statements.iter().position(is_super_call);
        let mut out = Vec::with_capacity(statements.len() + prologue.len() + properties.len());
        out.extend_from_slice(&statements[..directives]);
        out.extend(prologue);
        let assignments = properties.iter().map(|name| self.factory.this_assignment(name));
        match super_call {
            Some(at) if at >= directives => {
                out.extend_from_slice(&statements[directives..=at]);
                out.extend(assignments);
                out.extend_from_slice(&statements[at + 1..]);
            }
            _ => {
                out.extend(assignments);
                out.extend_from_slice(&statements[directives..]);
            }
        }
        out
    }

    fn function(&mut self, f: &'a FunctionDeclaration<'a>, name: Option<&str>) -> FunctionDeclaration<'a> {
        let Some(body) = f.body else {
            return FunctionDeclaration {
                data: with_runtime_modifiers(f.data),
                type_parameters: None,
                return_type: None,
                ..*f
            };
        };
        let parameters: Vec<Parameter<'a>> = f.parameters.iter().filter(|p| !p.is_this()).copied().collect();
        let signature = Signature {
            name,
            type_parameters: f.type_parameters,
            parameters: &parameters,
            return_type: f.return_type,
            is_async_or_generator: f.asterisk || f.data.has_modifier(ModifierFlags::ASYNC),
        };
        let (parameters, body) = self.function_parts(signature, body, &[]);
        FunctionDeclaration {
            data: with_runtime_modifiers(f.data),
            name: f.name,
            asterisk: f.asterisk,
            type_parameters: None,
            parameters,
            return_type: None,
            body: Some(body),
        }
    }

    fn arrow(&mut self, a: &'a ArrowFunction<'a>, name: Option<&str>) -> ArrowFunction<'a> {
        let parameters: Vec<Parameter<'a>> = a.parameters.iter().filter(|p| !p.is_this()).copied().collect();
        let signature = Signature {
            name,
            type_parameters: a.type_parameters,
            parameters: &parameters,
            return_type: a.return_type,
            is_async_or_generator: a.data.has_modifier(ModifierFlags::ASYNC),
        };
        let (parameters, body) = match a.body {
            ArrowFunctionBody::Block(block) => {
                let (parameters, block) = self.function_parts(signature, block, &[]);
                (parameters, ArrowFunctionBody::Block(block))
            }
            ArrowFunctionBody::Expression(expr) if self.instrumenter.is_some() => {
                // A concise body becomes `{ return expr; }` so the return
                // can be guarded.
                let ret = self.factory.return_statement(Some(expr));
                let block = self.factory.alloc(Block {
                    data: *expr.data(),
                    statements: self.factory.list(vec![ret]),
                });
                let (parameters, block) = self.function_parts(signature, block, &[]);
                match block.statements {
                    [Statement::Return(ReturnStatement { expression: Some(e), .. })] => {
                        (parameters, ArrowFunctionBody::Expression(e))
                    }
                    _ => (parameters, ArrowFunctionBody::Block(block)),
                }
            }
            ArrowFunctionBody::Expression(expr) => {
                let parameters: Vec<Parameter<'a>> = parameters.iter().map(|p| self.parameter(p)).collect();
                (self.factory.list(parameters), ArrowFunctionBody::Expression(self.expr(expr)))
            }
        };
        ArrowFunction {
            data: a.data,
            type_parameters: None,
            parameters,
            return_type: None,
            body,
        }
    }

    fn class(&mut self, c: &'a ClassDeclaration<'a>) -> ClassDeclaration<'a> {
        if let Some(instrumenter) = self.instrumenter.as_mut() {
            instrumenter.enter_class(c.type_parameters);
        }
        let extends = c.extends.map(|e| self.expr(e));
        let mut members = Vec::with_capacity(c.members.len());
        for member in c.members.iter() {
            match member {
                ClassElement::Property(p) => {
                    if is_ambient(&p.data) || p.data.has_modifier(ModifierFlags::ABSTRACT) {
                        continue;
                    }
                    let hint = property_key(&p.name);
                    let property = PropertyDeclaration {
                        data: with_runtime_modifiers(p.data),
                        name: self.property_name(p.name),
                        optional: false,
                        definite: false,
                        type_annotation: None,
                        initializer: p.initializer.map(|e| self.named_expr(e, hint.as_deref())),
                    };
                    members.push(ClassElement::Property(self.factory.alloc(property)));
                }
                ClassElement::Method(m) => {
                    if m.body.is_some() {
                        let method = self.method(m);
                        members.push(ClassElement::Method(self.factory.alloc(method)));
                    }
                }
                ClassElement::StaticBlock(block) => members.push(ClassElement::StaticBlock(self.block(block))),
                ClassElement::Index(_) => {}
                ClassElement::Semicolon(data) => members.push(ClassElement::Semicolon(*data)),
            }
        }
        if let Some(instrumenter) = self.instrumenter.as_mut() {
            instrumenter.leave_class();
        }
        ClassDeclaration {
            data: with_runtime_modifiers(c.data),
            name: c.name,
            type_parameters: None,
            extends,
            extends_type_arguments: None,
            implements: &[],
            members: self.factory.list(members),
        }
    }

    fn method(&mut self, m: &'a MethodDeclaration<'a>) -> MethodDeclaration<'a> {
        let name = self.property_name(m.name);
        let Some(body) = m.body else {
            return MethodDeclaration {
                data: with_runtime_modifiers(m.data),
                name,
                optional: false,
                type_parameters: None,
                return_type: None,
                ..*m
            };
        };
        let parameters: Vec<Parameter<'a>> = m.parameters.iter().filter(|p| !p.is_this()).copied().collect();
        let mut properties = Vec::new();
        if m.kind == MethodKind::Constructor {
            for param in parameters.iter().filter(|p| p.is_parameter_property()) {
                if let BindingName::Identifier(id) = param.name {
                    properties.push(id.name);
                }
            }
        }
        let label = match m.kind {
            MethodKind::Constructor => Some("constructor".to_string()),
            _ => property_key(&m.name),
        };
        let signature = Signature {
            name: label.as_deref(),
            type_parameters: m.type_parameters,
            parameters: &parameters,
            return_type: m.return_type,
            is_async_or_generator: m.asterisk || m.data.has_modifier(ModifierFlags::ASYNC),
        };
        let (parameters, body) = self.function_parts(signature, body, &properties);
        MethodDeclaration {
            data: with_runtime_modifiers(m.data),
            kind: m.kind,
            name,
            optional: false,
            asterisk: m.asterisk,
            type_parameters: None,
            parameters,
            return_type: None,
            body: Some(body),
        }
    }

    // ========================================================================
    // Names and bindings
    // ========================================================================

    fn property_name(&mut self, name: PropertyName<'a>) -> PropertyName<'a> {
        match name {
            PropertyName::Computed(expr) => PropertyName::Computed(self.expr(expr)),
            other => other,
        }
    }

    fn binding_name(&mut self, name: BindingName<'a>) -> BindingName<'a> {
        match name {
            BindingName::Identifier(_) => name,
            BindingName::Object(pattern) => {
                let elements = pattern.elements.iter().map(|e| self.binding_element(e)).collect();
                BindingName::Object(self.factory.alloc(ObjectBindingPattern {
                    data: pattern.data,
                    elements: self.factory.list(elements),
                }))
            }
            BindingName::Array(pattern) => {
                let elements = pattern
                    .elements
                    .iter()
                    .map(|e| match e {
                        ArrayBindingElement::Element(e) => ArrayBindingElement::Element(self.binding_element(e)),
                        ArrayBindingElement::Omitted(data) => ArrayBindingElement::Omitted(*data),
                    })
                    .collect();
                BindingName::Array(self.factory.alloc(ArrayBindingPattern {
                    data: pattern.data,
                    elements: self.factory.list(elements),
                }))
            }
        }
    }

    fn binding_element(&mut self, e: &BindingElement<'a>) -> BindingElement<'a> {
        BindingElement {
            data: e.data,
            rest: e.rest,
            property_name: e.property_name.map(|n| self.property_name(n)),
            name: self.binding_name(e.name),
            initializer: e.initializer.map(|i| self.expr(i)),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Strip an expression that may be a function named by its context.
    fn named_expr(&mut self, expr: &'a Expression<'a>, name: Option<&str>) -> &'a Expression<'a> {
        match expr {
            Expression::Arrow(a) => {
                let arrow = self.arrow(a, name);
                self.factory.alloc(Expression::Arrow(self.factory.alloc(arrow)))
            }
            Expression::Function(f) => {
                let name = f.name.map(|id| id.name).or(name);
                let function = self.function(f, name);
                self.factory.alloc(Expression::Function(self.factory.alloc(function)))
            }
            _ => self.expr(expr),
        }
    }

    fn expr(&mut self, expr: &'a Expression<'a>) -> &'a Expression<'a> {
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
            | Expression::False(_) => expr,
            Expression::As(n) | Expression::Satisfies(n) => self.expr(n.expression),
            Expression::NonNull(n) => self.expr(n.operand),
            Expression::TypeAssertion(n) => self.expr(n.expression),
            _ => {
                let value = self.expr_value(expr);
                self.factory.alloc(value)
            }
        }
    }

    fn expr_list(&mut self, list: &'a [Expression<'a>]) -> &'a [Expression<'a>] {
        let items: Vec<Expression<'a>> = list.iter().map(|e| *self.expr(e)).collect();
        self.factory.list(items)
    }

    fn expr_value(&mut self, expr: &'a Expression<'a>) -> Expression<'a> {
        match expr {
            Expression::Template(n) => {
                let spans = n
                    .spans
                    .iter()
                    .map(|span| TemplateSpan {
                        expression: self.expr(span.expression),
                        literal: span.literal,
                    })
                    .collect();
                Expression::Template(TemplateExpression {
                    data: n.data,
                    head: n.head,
                    spans: self.factory.list(spans),
                })
            }
            Expression::ArrayLiteral(n) => Expression::ArrayLiteral(ArrayLiteralExpression {
                data: n.data,
                elements: self.expr_list(n.elements),
            }),
            Expression::ObjectLiteral(n) => {
                let properties = n
                    .properties
                    .iter()
                    .map(|p| match p {
                        ObjectLiteralElement::Property(p) => {
                            let hint = property_key(&p.name);
                            ObjectLiteralElement::Property(PropertyAssignment {
                                data: p.data,
                                name: self.property_name(p.name),
                                initializer: self.named_expr(p.initializer, hint.as_deref()),
                            })
                        }
                        ObjectLiteralElement::Shorthand(s) => ObjectLiteralElement::Shorthand(ShorthandPropertyAssignment {
                            default: s.default.map(|d| self.expr(d)),
                            ..*s
                        }),
                        ObjectLiteralElement::Spread(s) => ObjectLiteralElement::Spread(UnaryOperand {
                            data: s.data,
                            operand: self.expr(s.operand),
                        }),
                        ObjectLiteralElement::Method(m) => {
                            let method = self.method(m);
                            ObjectLiteralElement::Method(self.factory.alloc(method))
                        }
                    })
                    .collect();
                Expression::ObjectLiteral(ObjectLiteralExpression {
                    data: n.data,
                    properties: self.factory.list(properties),
                })
            }
            Expression::PropertyAccess(n) => Expression::PropertyAccess(PropertyAccessExpression {
                expression: self.expr(n.expression),
                ..*n
            }),
            Expression::ElementAccess(n) => Expression::ElementAccess(ElementAccessExpression {
                data: n.data,
                expression: self.expr(n.expression),
                optional: n.optional,
                argument: self.expr(n.argument),
            }),
            Expression::Call(n) => Expression::Call(CallExpression {
                data: n.data,
                expression: self.expr(n.expression),
                optional: n.optional,
                type_arguments: None,
                arguments: self.expr_list(n.arguments),
            }),
            Expression::New(n) => Expression::New(NewExpression {
                data: n.data,
                expression: self.expr(n.expression),
                type_arguments: None,
                arguments: n.arguments.map(|args| self.expr_list(args)),
            }),
            Expression::TaggedTemplate(n) => Expression::TaggedTemplate(TaggedTemplateExpression {
                data: n.data,
                tag: self.expr(n.tag),
                type_arguments: None,
                template: self.expr(n.template),
            }),
            Expression::Parenthesized(n) => {
                let inner = self.expr(n.expression);
                // `(b as T)` leaves `(b)`; drop parentheses nothing needs.
                if is_assertion(n.expression) && binds_tightly(inner) {
                    *inner
                } else {
                    Expression::Parenthesized(ParenthesizedExpression {
                        data: n.data,
                        expression: inner,
                    })
                }
            }
            Expression::Function(f) => {
                let function = self.function(f, f.name.map(|id| id.name));
                Expression::Function(self.factory.alloc(function))
            }
            Expression::Arrow(a) => {
                let arrow = self.arrow(a, None);
                Expression::Arrow(self.factory.alloc(arrow))
            }
            Expression::Class(c) => {
                let class = self.class(c);
                Expression::Class(self.factory.alloc(class))
            }
            Expression::PrefixUnary(n) => Expression::PrefixUnary(PrefixUnaryExpression {
                operand: self.expr(n.operand),
                ..*n
            }),
            Expression::PostfixUnary(n) => Expression::PostfixUnary(PostfixUnaryExpression {
                operand: self.expr(n.operand),
                ..*n
            }),
            Expression::Await(n) => Expression::Await(UnaryOperand {
                data: n.data,
                operand: self.expr(n.operand),
            }),
            Expression::Spread(n) => Expression::Spread(UnaryOperand {
                data: n.data,
                operand: self.expr(n.operand),
            }),
            Expression::Yield(n) => Expression::Yield(YieldExpression {
                expression: n.expression.map(|e| self.expr(e)),
                ..*n
            }),
            Expression::Binary(n) => Expression::Binary(BinaryExpression {
                data: n.data,
                left: self.expr(n.left),
                operator: n.operator,
                right: self.expr(n.right),
            }),
            Expression::Conditional(n) => Expression::Conditional(ConditionalExpression {
                data: n.data,
                condition: self.expr(n.condition),
                when_true: self.expr(n.when_true),
                when_false: self.expr(n.when_false),
            }),
            Expression::As(n) | Expression::Satisfies(n) => *self.expr(n.expression),
            Expression::NonNull(n) => *self.expr(n.operand),
            Expression::TypeAssertion(n) => *self.expr(n.expression),
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
            | Expression::False(_) => *expr,
        }
    }
}

fn is_super_call(stmt: &Statement<'_>) -> bool {
    matches!(
        stmt,
        Statement::Expression(ExpressionStatement {
            expression: Expression::Call(CallExpression { expression: Expression::Super(_), .. }),
            ..
        })
    )
}

/// Strip every type from `file`, without guards.
pub fn strip_types<'a>(factory: NodeFactory<'a>, file: &SourceFile<'a>) -> SourceFile<'a> {
    Stripper::new(factory).strip_source_file(file)
}

fn is_assertion(expr: &Expression<'_>) -> bool {
    matches!(
        expr,
        Expression::As(_) | Expression::Satisfies(_) | Expression::NonNull(_) | Expression::TypeAssertion(_)
    )
}

/// Whether `expr` reads the same with or without parentheses around it,
/// wherever it appears.
fn binds_tightly(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::Identifier(_)
        | Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::NoSubstitutionTemplateLiteral(_)
        | Expression::This(_)
        | Expression::Null(_)
        | Expression::True(_)
        | Expression::False(_)
        | Expression::Parenthesized(_) => true,
        Expression::PropertyAccess(_) | Expression::ElementAccess(_) => !in_optional_chain(expr),
        _ => false,
    }
}

fn in_optional_chain(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::PropertyAccess(n) => n.optional || in_optional_chain(n.expression),
        Expression::ElementAccess(n) => n.optional || in_optional_chain(n.expression),
        Expression::Call(n) => n.optional || in_optional_chain(n.expression),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use typeguard_options::Mode;
    use typeguard_parser::parse_source_file;
    use typeguard_printer::Printer;
    use crate::eval::{run, run_with};
    use typeguard_checker::Value;
    use typeguard_types::Registry;

    fn strip(source: &str) -> String {
        let arena = Bump::new();
        let (file, diagnostics) = parse_source_file(&arena, "test.ts", source);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let stripped = strip_types(NodeFactory::new(&arena), &file);
        Printer::new().print_statements(stripped.statements)
    }

    fn instrument(source: &str) -> String {
        let arena = Bump::new();
        let (file, _) = parse_source_file(&arena, "test.ts", source);
        let registry = Registry::new();
        let mut stripper =
            Stripper::new(NodeFactory::new(&arena)).with_instrumenter(Instrumenter::new(&registry, Mode::Development));
        let stripped = stripper.strip_source_file(&file);
        Printer::new().print_statements(stripped.statements)
    }

    #[test]
    fn test_annotations_removed() {
        assert_eq!(strip("let age: number = 25;"), "let age = 25;");
        assert_eq!(
            strip("function add(a: number, b: number): number { return a + b; }"),
            "function add(a, b) {\n    return a + b;\n}"
        );
    }

    #[test]
    fn test_type_declarations_dropped() {
        let out = strip("interface User { id: number }\ntype Id = number;\ndeclare const x: number;\nlet y = 1;");
        assert_eq!(out, "let y = 1;");
    }

    #[test]
    fn test_assertions_unwrapped() {
        assert_eq!(strip("let a = (b as any)!;"), "let a = b;");
        assert_eq!(strip("let c = <string>d;"), "let c = d;");
        assert_eq!(strip("let e = f satisfies object;"), "let e = f;");
        assert_eq!(strip("let g = (h.i as any).j;"), "let g = h.i.j;");
    }

    #[test]
    fn test_assertion_parentheses_kept_where_needed() {
        assert_eq!(strip("let a = ((b + c) as any) * 2;"), "let a = (b + c) * 2;");
        assert_eq!(strip("let d = (e?.f as any).g;"), "let d = (e?.f).g;");
        assert_eq!(strip("let h = new (k() as any)();"), "let h = new (k())();");
        assert_eq!(strip("let m = (n);"), "let m = (n);");
    }

    #[test]
    fn test_type_only_imports_dropped() {
        assert_eq!(strip("import type { A } from \"./a\";"), "");
        assert_eq!(strip("import { type A } from \"./a\";"), "");
        assert!(strip("import { type A, b } from \"./a\";").contains("b"));
        assert_eq!(strip("export type { A };"), "");
    }

    #[test]
    fn test_enum_lowered_to_frozen_object() {
        assert_eq!(
            strip("enum Color { Red, Green = 5, Blue }"),
            "const Color = Object.freeze({ Red: 0, Green: 5, Blue: 6 });"
        );
        assert_eq!(
            strip("export const enum Dir { Up = \"UP\" }"),
            "export const Dir = Object.freeze({ Up: \"UP\" });"
        );
    }

    #[test]
    fn test_namespace_lowered() {
        let out = strip("namespace N { export const a = 1; const b = 2; }");
        assert!(out.starts_with("var N;\n"), "{}", out);
        assert!(out.contains("const a = 1;"));
        assert!(out.contains("N.a = a;"));
        assert!(!out.contains("N.b"));
        assert!(out.ends_with("})(N || (N = {}));"), "{}", out);
    }

    #[test]
    fn test_type_only_namespace_dropped() {
        assert_eq!(strip("namespace T { export type A = string; }"), "");
    }

    #[test]
    fn test_parameter_properties_assigned() {
        let out = strip("class P extends B { constructor(private x: number) { super(); } }");
        assert!(out.contains("constructor(x) {\n        super();\n        this.x = x;\n    }"), "{}", out);
    }

    #[test]
    fn test_class_members_stripped() {
        let out = strip(
            "abstract class A implements I { abstract f(): void; declare g: number; [k: string]: any; h?: number = 1; }",
        );
        assert!(!out.contains("abstract"));
        assert!(!out.contains("implements"));
        assert!(!out.contains(" f("));
        assert!(!out.contains(" g"));
        assert!(out.contains("h = 1;"), "{}", out);
        assert!(!out.lines().any(|line| line.trim() == ";"), "{}", out);
    }

    #[test]
    fn test_export_equals() {
        assert_eq!(strip("export = foo;"), "module.exports = foo;");
    }

    #[test]
    fn test_guards_added_for_typed_parameters() {
        let out = instrument("function greet(name: string) { return name; }");
        assert!(out.contains("function greet(__tg_p1) {"), "{}", out);
        assert!(out.contains("__tg_report(\"name\", \"string\", __tg_p1);"), "{}", out);
        assert!(out.contains("var name = __tg_p1;"));
    }

    #[test]
    fn test_return_guard() {
        let out = instrument("function f(): number { return 1; }");
        assert!(out.contains("const __tg_r1 = 1;"), "{}", out);
        assert!(out.contains("__tg_report(\"return value of 'f'\", \"number\", __tg_r1);"), "{}", out);
        assert!(out.contains("return __tg_r1;"));
    }

    #[test]
    fn test_pass_through_argument_reported_once_per_call() {
        let source = "type Direction = \"up\" | \"down\";\nfunction move(d: Direction): Direction { return d; }";
        let arena = Bump::new();
        let (file, _) = parse_source_file(&arena, "test.ts", source);
        let (registry, _) = typeguard_types::build_registry(&file);
        let mut stripper =
            Stripper::new(NodeFactory::new(&arena)).with_instrumenter(Instrumenter::new(&registry, Mode::Development));
        let stripped = stripper.strip_source_file(&file);
        let out = Printer::new().print_statements(stripped.statements);
        assert!(out.contains("if (!Object.is(__tg_r2, __tg_p1)) {"), "{}", out);

        let instrumenter = stripper.into_instrumenter().unwrap();
        let [entry, exit] = instrumenter.guards() else {
            panic!("expected a parameter and a return guard");
        };
        let table = instrumenter.table();
        let call = |argument: Value, returned: Value| {
            let mut reports = run(entry, &argument, table);
            reports.extend(run_with(exit, &returned, &[(entry.target.as_str(), argument)], table));
            reports
        };

        let oops = Value::string("oops");
        let reports = call(oops.clone(), oops.clone());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, "d");
        assert_eq!(call(Value::string("up"), Value::string("up")), vec![]);
        // A different bad value on the way out is still reported.
        let reports = call(Value::string("up"), oops);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, "return value of 'move'");
    }

    #[test]
    fn test_return_guard_without_matching_parameter_is_plain() {
        let out = instrument("function f(a: string): number { return a.length; }");
        assert!(!out.contains("Object.is"), "{}", out);
    }

    #[test]
    fn test_concise_arrow_kept_without_return_type() {
        assert_eq!(instrument("const id = (x) => x;"), "const id = (x) => x;");
    }

    #[test]
    fn test_async_returns_unchecked() {
        let out = instrument("async function f(): Promise<number> { return 1; }");
        assert!(!out.contains("__tg_report"), "{}", out);
    }
}
