//! Registry construction.
//!
//! Pass 1 registers interfaces, type aliases and enums in declaration order.
//! Pass 2 registers module-level variables, functions and classes, whose
//! annotations may then refer to any definition in the unit. Pass 1 always
//! completes before Pass 2 starts.

use crate::model::*;
use crate::model::TypeNode;
use crate::registry::*;
use crate::translate::{entity_text, property_key, Translator};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use typeguard_ast::node::*;
use typeguard_ast::visitor::{walk_function, walk_statement, AstVisitor};
use typeguard_ast::{MethodKind, ModifierFlags};
use typeguard_core::text::TextRange;
use typeguard_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use typeguard_evaluator::{evaluate_enum, ConstantValue};

/// Build the registry of one source file.
pub fn build_registry(file: &SourceFile<'_>) -> (Registry, DiagnosticCollection) {
    RegistryBuilder::new(file.file_name).build(file)
}

#[derive(Clone, Copy)]
enum Definition<'a> {
    Interface(&'a InterfaceDeclaration<'a>),
    TypeAlias(&'a TypeAliasDeclaration<'a>),
    Enum(&'a EnumDeclaration<'a>),
}

impl<'a> Definition<'a> {
    fn name(&self) -> &'a str {
        match self {
            Definition::Interface(d) => d.name.name,
            Definition::TypeAlias(d) => d.name.name,
            Definition::Enum(d) => d.name.name,
        }
    }
}

/// Collects type definitions at any depth.
#[derive(Default)]
struct DefinitionCollector<'a> {
    definitions: Vec<Definition<'a>>,
}

impl<'a> AstVisitor<'a> for DefinitionCollector<'a> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match *stmt {
            Statement::Interface(decl) => self.definitions.push(Definition::Interface(decl)),
            Statement::TypeAlias(decl) => self.definitions.push(Definition::TypeAlias(decl)),
            Statement::Enum(decl) => self.definitions.push(Definition::Enum(decl)),
            _ => {}
        }
        walk_statement(self, stmt);
    }
}

#[derive(Clone, Copy)]
enum Usage<'a> {
    Variable(VariableStatement<'a>),
    Function(&'a FunctionDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
}

/// Collects declarations outside of any function body.
#[derive(Default)]
struct UsageCollector<'a> {
    usages: Vec<Usage<'a>>,
    function_depth: u32,
}

impl<'a> AstVisitor<'a> for UsageCollector<'a> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        if self.function_depth == 0 {
            match *stmt {
                Statement::Variable(decl) => self.usages.push(Usage::Variable(decl)),
                Statement::Function(decl) => self.usages.push(Usage::Function(decl)),
                Statement::Class(decl) => self.usages.push(Usage::Class(decl)),
                _ => {}
            }
        }
        walk_statement(self, stmt);
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        self.function_depth += 1;
        walk_function(self, node);
        self.function_depth -= 1;
    }

    fn visit_arrow_function(&mut self, _node: &ArrowFunction<'a>) {}

    fn visit_method_declaration(&mut self, _node: &MethodDeclaration<'a>) {}
}

/// Fills a [`Registry`] from one source file.
pub struct RegistryBuilder<'f> {
    file_name: &'f str,
    registry: Registry,
    diagnostics: DiagnosticCollection,
}

impl<'f> RegistryBuilder<'f> {
    pub fn new(file_name: &'f str) -> Self {
        Self {
            file_name,
            registry: Registry::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn build(mut self, file: &SourceFile<'_>) -> (Registry, DiagnosticCollection) {
        let mut definitions = DefinitionCollector::default();
        definitions.visit_source_file(file);
        let declared: FxHashSet<String> = definitions
            .definitions
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        tracing::debug!(file = self.file_name, count = definitions.definitions.len(), "registry pass 1");
        for definition in &definitions.definitions {
            self.define(*definition, &declared);
        }

        let mut usages = UsageCollector::default();
        usages.visit_source_file(file);
        tracing::debug!(file = self.file_name, count = usages.usages.len(), "registry pass 2");
        for usage in &usages.usages {
            self.declare(*usage);
        }

        (self.registry, self.diagnostics)
    }

    fn warn_duplicate(&mut self, name: &str, range: TextRange) {
        let diagnostic = Diagnostic::with_location(
            self.file_name,
            range.to_span(),
            &messages::DUPLICATE_DECLARATION_0,
            &[name],
        );
        tracing::warn!(name, "duplicate declaration");
        self.diagnostics.add(diagnostic);
    }

    fn insert(&mut self, entry: RegistryEntry, range: TextRange) {
        let name = entry.name().to_string();
        if !self.registry.insert(entry) {
            self.warn_duplicate(&name, range);
        }
    }

    // ------------------------------------------------------------------
    // Pass 1
    // ------------------------------------------------------------------

    fn define(&mut self, definition: Definition<'_>, declared: &FxHashSet<String>) {
        let name = definition.name();
        tracing::trace!(name, "define");
        match definition {
            Definition::Interface(decl) => {
                let mut translator = Translator::new(&self.registry)
                    .with_file_name(self.file_name)
                    .for_definition(name, declared);
                translator.push_type_parameters(decl.type_parameters);
                let mut shape = ObjectShape::new();
                for heritage in decl.extends.iter() {
                    let base = translator.reference(
                        &heritage.name,
                        heritage.type_arguments,
                        heritage.data.range,
                    );
                    if let TypeNode::Object(base) = base {
                        shape.merge(&base);
                    }
                }
                shape.merge(&translator.shape_from_members(decl.members));
                let diagnostics = translator.into_diagnostics();
                self.diagnostics.extend(diagnostics);

                match self.registry.interface_mut(name) {
                    Some(existing) => existing.merge(&shape),
                    None => {
                        self.registry.insert(RegistryEntry::Interface { name: name.to_string(), shape });
                    }
                }
            }
            Definition::TypeAlias(decl) => {
                let mut translator = Translator::new(&self.registry)
                    .with_file_name(self.file_name)
                    .for_definition(name, declared);
                translator.push_type_parameters(decl.type_parameters);
                let ty = translator.translate(decl.type_node);
                let diagnostics = translator.into_diagnostics();
                self.diagnostics.extend(diagnostics);
                self.insert(RegistryEntry::TypeAlias { name: name.to_string(), ty }, decl.name.data.range);
            }
            Definition::Enum(decl) => {
                let mut members = IndexMap::new();
                for member in evaluate_enum(decl) {
                    match member.value {
                        Some(ConstantValue::Number(n)) => {
                            members.insert(member.name, LiteralValue::Number(n));
                        }
                        Some(ConstantValue::String(s)) => {
                            members.insert(member.name, LiteralValue::String(s));
                        }
                        None => {
                            let range = decl
                                .members
                                .iter()
                                .find(|m| property_key(&m.name).as_deref() == Some(member.name.as_str()))
                                .map(|m| m.data.range)
                                .unwrap_or(decl.name.data.range);
                            tracing::warn!(name = %member.name, "enum member is not constant");
                            self.diagnostics.add(Diagnostic::with_location(
                                self.file_name,
                                range.to_span(),
                                &messages::ENUM_MEMBER_0_NOT_CONSTANT,
                                &[member.name.as_str()],
                            ));
                        }
                    }
                }
                let entry = EnumEntry {
                    name: name.to_string(),
                    members,
                    is_const: decl.data.has_modifier(ModifierFlags::CONST),
                };
                self.insert(RegistryEntry::Enum(entry), decl.name.data.range);
            }
        }
    }

    // ------------------------------------------------------------------
    // Pass 2
    // ------------------------------------------------------------------

    fn declare(&mut self, usage: Usage<'_>) {
        match usage {
            Usage::Variable(stmt) => {
                for decl in stmt.declarations.iter() {
                    let BindingName::Identifier(id) = decl.name else {
                        continue;
                    };
                    let mut translator = Translator::new(&self.registry).with_file_name(self.file_name);
                    let ty = decl
                        .type_annotation
                        .map(|t| translator.translate(t))
                        .unwrap_or(TypeNode::Unknown);
                    let diagnostics = translator.into_diagnostics();
                    self.diagnostics.extend(diagnostics);
                    let entry = VariableEntry {
                        name: id.name.to_string(),
                        ty,
                        is_const: stmt.kind.is_const(),
                    };
                    self.insert(RegistryEntry::Variable(entry), id.data.range);
                }
            }
            Usage::Function(decl) => {
                let Some(id) = decl.name else {
                    return;
                };
                // Overload signatures describe the implementation that follows.
                if decl.body.is_none() && !decl.data.has_modifier(ModifierFlags::AMBIENT) {
                    return;
                }
                let mut translator = Translator::new(&self.registry).with_file_name(self.file_name);
                translator.push_type_parameters(decl.type_parameters);
                let params = translator.function_params(decl.parameters);
                let return_type = decl.return_type.map(|t| translator.translate(t));
                let diagnostics = translator.into_diagnostics();
                self.diagnostics.extend(diagnostics);
                let entry = FunctionEntry {
                    name: id.name.to_string(),
                    params,
                    return_type,
                    type_params: type_parameter_names(decl.type_parameters),
                    is_async: decl.data.has_modifier(ModifierFlags::ASYNC),
                    is_generator: decl.asterisk,
                };
                self.insert(RegistryEntry::Function(entry), id.data.range);
            }
            Usage::Class(decl) => {
                let Some(id) = decl.name else {
                    return;
                };
                let entry = self.class_entry(id.name, decl);
                self.insert(RegistryEntry::Class(entry), id.data.range);
            }
        }
    }

    fn class_entry(&mut self, name: &str, decl: &ClassDeclaration<'_>) -> ClassEntry {
        let mut translator = Translator::new(&self.registry).with_file_name(self.file_name);
        translator.push_type_parameters(decl.type_parameters);
        let mut properties = IndexMap::new();
        let mut methods = IndexMap::new();

        for member in decl.members.iter() {
            match member {
                ClassElement::Property(p) if !p.data.has_modifier(ModifierFlags::STATIC) => {
                    let Some(key) = property_key(&p.name) else {
                        continue;
                    };
                    let ty = p.type_annotation.map(|t| translator.translate(t)).unwrap_or(TypeNode::Unknown);
                    properties.insert(key, if p.optional { TypeNode::optional(ty) } else { ty });
                }
                ClassElement::Method(m) if m.kind == MethodKind::Constructor => {
                    for param in m.parameters.iter().filter(|p| p.is_parameter_property()) {
                        let Some(param_name) = param.name.as_identifier() else {
                            continue;
                        };
                        let ty = param
                            .type_annotation
                            .map(|t| translator.translate(t))
                            .unwrap_or(TypeNode::Unknown);
                        let ty = if param.optional { TypeNode::optional(ty) } else { ty };
                        properties.insert(param_name.name.to_string(), ty);
                    }
                }
                ClassElement::Method(m)
                    if m.kind == MethodKind::Method && !m.data.has_modifier(ModifierFlags::STATIC) =>
                {
                    let Some(key) = property_key(&m.name) else {
                        continue;
                    };
                    if !methods.contains_key(&key) {
                        let function = translator.signature(m.type_parameters, m.parameters, m.return_type, false);
                        methods.insert(key, function);
                    }
                }
                _ => {}
            }
        }

        let diagnostics = translator.into_diagnostics();
        self.diagnostics.extend(diagnostics);
        ClassEntry {
            name: name.to_string(),
            properties,
            methods,
            extends: decl.extends.and_then(expression_name),
            implements: decl.implements.iter().map(|h| entity_text(&h.name)).collect(),
            type_params: type_parameter_names(decl.type_parameters),
        }
    }
}

fn type_parameter_names(params: Option<&[TypeParameter<'_>]>) -> Vec<String> {
    params
        .unwrap_or_default()
        .iter()
        .map(|p| p.name.name.to_string())
        .collect()
}

/// `Base` or `ns.Base` in an `extends` clause.
fn expression_name(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::PropertyAccess(p) => {
            expression_name(p.expression).map(|left| format!("{}.{}", left, p.name.name))
        }
        _ => None,
    }
}
