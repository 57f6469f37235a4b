//! The static analyzer.
//!
//! Checks literal values against the annotations they are assigned to:
//! variable initializers, class property initializers, parameter defaults and
//! `return` arguments of the enclosing named function. Anything that is not a
//! literal is left to the runtime guards.

use crate::matcher::{explain, Mismatch, MismatchKind};
use crate::value::Value;
use typeguard_ast::node::*;
use typeguard_ast::visitor::{walk_function, AstVisitor};
use typeguard_ast::{MethodKind, ModifierFlags};
use typeguard_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use typeguard_printer::type_to_string;
use typeguard_types::translate::property_key;
use typeguard_types::{Registry, Translator, TypeNode};

/// Analyze one source file against its registry.
pub fn analyze(file: &SourceFile<'_>, registry: &Registry) -> AnalysisReport {
    let mut analyzer = Analyzer::new(registry, file.file_name);
    analyzer.visit_source_file(file);
    let report = analyzer.finish();
    tracing::debug!(file = file.file_name, count = report.diagnostics.len(), "static analysis");
    report
}

/// The diagnostics of one analysis run.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    diagnostics: DiagnosticCollection,
}

impl AnalysisReport {
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.messages()
    }

    /// True when nothing was reported.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticCollection {
        self.diagnostics
    }
}

/// The named function whose `return` statements are being checked.
struct FunctionContext {
    name: String,
    /// `None` when returns are not checked.
    return_type: Option<(TypeNode, String)>,
}

/// What a checked value is assigned to.
enum Subject<'s> {
    Binding(&'s str),
    Return(&'s str),
}

impl Subject<'_> {
    fn root(&self) -> String {
        match self {
            Subject::Binding(name) => name.to_string(),
            Subject::Return(function) => format!("return value of '{}'", function),
        }
    }

    fn label(&self, path: &str) -> String {
        match self {
            Subject::Binding(_) => format!("'{}'", path),
            Subject::Return(_) => path.to_string(),
        }
    }
}

pub struct Analyzer<'r> {
    translator: Translator<'r>,
    file_name: &'r str,
    current: Option<FunctionContext>,
    diagnostics: DiagnosticCollection,
}

impl<'r> Analyzer<'r> {
    pub fn new(registry: &'r Registry, file_name: &'r str) -> Self {
        Self {
            translator: Translator::new(registry),
            file_name,
            current: None,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn finish(self) -> AnalysisReport {
        AnalysisReport { diagnostics: self.diagnostics }
    }

    fn translate(&mut self, node: &typeguard_ast::node::TypeNode<'_>) -> TypeNode {
        let ty = self.translator.translate(node);
        // Builder warnings were already reported while building the registry.
        self.translator.take_diagnostics();
        ty
    }

    /// Check `expr` against `annotation` if it is a literal.
    fn check_literal(
        &mut self,
        subject: Subject<'_>,
        ty: &TypeNode,
        annotation_text: &str,
        expr: &Expression<'_>,
    ) {
        let Some(value) = Value::from_literal_expression(expr) else {
            return;
        };
        let root = subject.root();
        for mismatch in explain(&value, ty, &root) {
            self.report(&subject, &root, annotation_text, mismatch, expr);
        }
    }

    fn report(
        &mut self,
        subject: &Subject<'_>,
        root: &str,
        annotation_text: &str,
        mismatch: Mismatch,
        expr: &Expression<'_>,
    ) {
        let label = subject.label(&mismatch.path);
        let span = expr.data().range.to_span();
        let diagnostic = match mismatch.kind {
            MismatchKind::TypeMismatch { expected, actual } => {
                // The annotation reads better than its expansion.
                let expected = if mismatch.path == root { annotation_text.to_string() } else { expected };
                Diagnostic::with_location(
                    self.file_name,
                    span,
                    &messages::TYPE_MISMATCH,
                    &[label.as_str(), expected.as_str(), actual.as_str()],
                )
            }
            MismatchKind::MissingProperty { property, expected } => Diagnostic::with_location(
                self.file_name,
                span,
                &messages::MISSING_REQUIRED_PROPERTY,
                &[label.as_str(), property.as_str(), expected.as_str()],
            ),
        };
        tracing::trace!(text = %diagnostic.message_text, "literal mismatch");
        self.diagnostics.add(diagnostic);
    }

    fn check_parameters(&mut self, params: &[Parameter<'_>]) {
        for param in params {
            let (Some(annotation), Some(init), BindingName::Identifier(id)) =
                (param.type_annotation, param.initializer, &param.name)
            else {
                continue;
            };
            let ty = self.translate(annotation);
            let text = type_to_string(annotation);
            self.check_literal(Subject::Binding(id.name), &ty, &text, init);
        }
    }

    /// Enter a function, returning the context to restore on leave.
    fn enter_function(
        &mut self,
        name: Option<&str>,
        type_parameters: Option<&[TypeParameter<'_>]>,
        return_type: Option<&typeguard_ast::node::TypeNode<'_>>,
        is_async_or_generator: bool,
    ) -> Option<FunctionContext> {
        self.translator.push_type_parameters(type_parameters);
        let context = name.map(|name| FunctionContext {
            name: name.to_string(),
            return_type: match return_type {
                Some(node) if !is_async_or_generator => Some((self.translate(node), type_to_string(node))),
                _ => None,
            },
        });
        std::mem::replace(&mut self.current, context)
    }

    fn leave_function(&mut self, saved: Option<FunctionContext>) {
        self.translator.pop_type_parameters();
        self.current = saved;
    }
}

impl<'a, 'r> AstVisitor<'a> for Analyzer<'r> {
    fn visit_variable_declaration(&mut self, node: &VariableDeclaration<'a>) {
        if let (BindingName::Identifier(id), Some(annotation), Some(init)) =
            (&node.name, node.type_annotation, node.initializer)
        {
            let ty = self.translate(annotation);
            let text = type_to_string(annotation);
            self.check_literal(Subject::Binding(id.name), &ty, &text, init);
        }
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        let saved = self.enter_function(
            node.name.as_ref().map(|id| id.name),
            node.type_parameters,
            node.return_type,
            node.asterisk || node.data.has_modifier(ModifierFlags::ASYNC),
        );
        self.check_parameters(node.parameters);
        walk_function(self, node);
        self.leave_function(saved);
    }

    fn visit_arrow_function(&mut self, node: &ArrowFunction<'a>) {
        let saved = self.enter_function(None, node.type_parameters, None, false);
        self.check_parameters(node.parameters);
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        match node.body {
            ArrowFunctionBody::Block(block) => self.visit_block(block),
            ArrowFunctionBody::Expression(expr) => self.visit_expression(expr),
        }
        self.leave_function(saved);
    }

    fn visit_class_declaration(&mut self, node: &ClassDeclaration<'a>) {
        self.translator.push_type_parameters(node.type_parameters);
        if let Some(extends) = node.extends {
            self.visit_expression(extends);
        }
        for member in node.members.iter() {
            self.visit_class_element(member);
        }
        self.translator.pop_type_parameters();
    }

    fn visit_class_element(&mut self, member: &ClassElement<'a>) {
        match member {
            ClassElement::Property(p) => {
                if let (Some(annotation), Some(init), Some(key)) =
                    (p.type_annotation, p.initializer, property_key(&p.name))
                {
                    let ty = self.translate(annotation);
                    let ty = if p.optional { TypeNode::optional(ty) } else { ty };
                    let text = type_to_string(annotation);
                    self.check_literal(Subject::Binding(&key), &ty, &text, init);
                }
                if let Some(init) = p.initializer {
                    self.visit_expression(init);
                }
            }
            ClassElement::Method(m) => self.visit_method_declaration(m),
            ClassElement::StaticBlock(block) => {
                let saved = std::mem::take(&mut self.current);
                self.visit_block(block);
                self.current = saved;
            }
            ClassElement::Index(_) | ClassElement::Semicolon(_) => {}
        }
    }

    fn visit_method_declaration(&mut self, node: &MethodDeclaration<'a>) {
        if let PropertyName::Computed(expr) = node.name {
            self.visit_expression(expr);
        }
        let name = match node.kind {
            MethodKind::Method => property_key(&node.name),
            MethodKind::Get | MethodKind::Set | MethodKind::Constructor => None,
        };
        let saved = self.enter_function(
            name.as_deref(),
            node.type_parameters,
            node.return_type,
            node.asterisk || node.data.has_modifier(ModifierFlags::ASYNC),
        );
        self.check_parameters(node.parameters);
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        if let Some(body) = node.body {
            self.visit_block(body);
        }
        self.leave_function(saved);
    }

    fn visit_return_statement(&mut self, node: &ReturnStatement<'a>) {
        let Some(expr) = node.expression else {
            return;
        };
        if let Some(FunctionContext { name, return_type: Some((ty, text)) }) = &self.current {
            let (name, ty, text) = (name.clone(), ty.clone(), text.clone());
            self.check_literal(Subject::Return(&name), &ty, &text, expr);
        }
        self.visit_expression(expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_labels() {
        assert_eq!(Subject::Binding("user").label("user.address.zip"), "'user.address.zip'");
        assert_eq!(Subject::Return("f").root(), "return value of 'f'");
        assert_eq!(Subject::Return("f").label("return value of 'f'.id"), "return value of 'f'.id");
    }
}
