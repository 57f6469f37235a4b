//! Translation of type-annotation syntax into TypeNodes.
//!
//! Translation is total: syntax that has no structural meaning at run time
//! degrades to [`TypeNode::Unknown`]. Named references are resolved against
//! the registry as it stands and embedded by value.

use crate::model::*;
use crate::registry::Registry;
use crate::template;
use crate::utility;
use rustc_hash::{FxHashMap, FxHashSet};
use typeguard_ast::factory::format_number;
use typeguard_ast::node as ast;
use typeguard_ast::{KeywordType, ModifierFlags, SyntaxKind, TypeOperator};
use typeguard_core::text::TextRange;
use typeguard_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Nesting limit for a single translation. Deeper syntax becomes `unknown`.
pub const MAX_TYPE_DEPTH: u32 = 64;

/// Translates annotations in one scope of type parameters at a time.
pub struct Translator<'r> {
    registry: &'r Registry,
    /// Type parameters in scope. `None` is an opaque parameter, `Some` a
    /// mapped-type key bound to one literal.
    scopes: Vec<FxHashMap<String, Option<TypeNode>>>,
    /// The definition being translated, which may not refer to itself.
    defining: Option<String>,
    /// Definitions declared anywhere in the unit.
    declared: Option<&'r FxHashSet<String>>,
    file_name: Option<&'r str>,
    depth: u32,
    depth_reported: bool,
    diagnostics: DiagnosticCollection,
}

impl<'r> Translator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            scopes: Vec::new(),
            defining: None,
            declared: None,
            file_name: None,
            depth: 0,
            depth_reported: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Attach `file_name` to reported diagnostics.
    pub fn with_file_name(mut self, file_name: &'r str) -> Self {
        self.file_name = Some(file_name);
        self
    }

    /// Translate the definition `name`. References to definitions in
    /// `declared` that are not registered yet are reported.
    pub fn for_definition(mut self, name: &str, declared: &'r FxHashSet<String>) -> Self {
        self.defining = Some(name.to_string());
        self.declared = Some(declared);
        self
    }

    pub fn push_type_parameters(&mut self, params: Option<&[ast::TypeParameter<'_>]>) {
        let mut scope = FxHashMap::default();
        for param in params.unwrap_or_default() {
            scope.insert(param.name.name.to_string(), None);
        }
        self.scopes.push(scope);
    }

    pub fn pop_type_parameters(&mut self) {
        self.scopes.pop();
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn into_diagnostics(self) -> DiagnosticCollection {
        self.diagnostics
    }

    fn report(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        let diagnostic = match self.file_name {
            Some(file) if !range.is_synthesized() => {
                Diagnostic::with_location(file, range.to_span(), message, args)
            }
            _ => Diagnostic::new(message, args),
        };
        tracing::warn!(code = diagnostic.code, text = %diagnostic.message_text, "type translation");
        self.diagnostics.add(diagnostic);
    }

    /// Translate one annotation.
    pub fn translate(&mut self, node: &ast::TypeNode<'_>) -> TypeNode {
        if self.depth >= MAX_TYPE_DEPTH {
            if !self.depth_reported {
                self.depth_reported = true;
                let name = self.defining.clone().unwrap_or_else(|| "type annotation".to_string());
                self.report(node.data().range, &messages::TYPE_0_NESTED_TOO_DEEPLY, &[name.as_str()]);
            }
            return TypeNode::Unknown;
        }
        self.depth += 1;
        let ty = self.translate_node(node);
        self.depth -= 1;
        ty
    }

    fn translate_node(&mut self, node: &ast::TypeNode<'_>) -> TypeNode {
        match node {
            ast::TypeNode::Keyword(k) => keyword(k.keyword),
            ast::TypeNode::Reference(r) => {
                self.reference(&r.type_name, r.type_arguments, r.data.range)
            }
            ast::TypeNode::Function(f) => {
                self.push_type_parameters(f.type_parameters);
                let params = self.function_params(f.parameters);
                let returns = self.translate(f.return_type);
                self.pop_type_parameters();
                TypeNode::Function(FunctionType {
                    params,
                    returns: Box::new(returns),
                    is_constructor: f.is_constructor,
                })
            }
            ast::TypeNode::Query(q) => match q.expr_name {
                ast::EntityName::Identifier(id) => self
                    .registry
                    .variable(id.name)
                    .map(|v| v.ty.clone())
                    .unwrap_or(TypeNode::Unknown),
                ast::EntityName::Qualified(_) => TypeNode::Unknown,
            },
            ast::TypeNode::TypeLiteral(lit) => TypeNode::Object(self.shape_from_members(lit.members)),
            ast::TypeNode::Array(a) => TypeNode::Array(Box::new(self.translate(a.element_type))),
            ast::TypeNode::Tuple(t) => {
                let members = t
                    .elements
                    .iter()
                    .map(|e| {
                        let ty = self.translate(e.type_node);
                        let ty = if e.rest {
                            match ty {
                                TypeNode::Array(element) | TypeNode::ReadonlyArray(element) => *element,
                                _ => TypeNode::Unknown,
                            }
                        } else {
                            ty
                        };
                        TupleMember {
                            ty,
                            optional: e.optional,
                            rest: e.rest,
                            label: e.name.map(|n| n.name.to_string()),
                        }
                    })
                    .collect();
                TypeNode::Tuple(members)
            }
            ast::TypeNode::Union(u) => {
                TypeNode::union(u.types.iter().map(|t| self.translate(t)).collect())
            }
            ast::TypeNode::Intersection(u) => {
                let types: Vec<TypeNode> = u.types.iter().map(|t| self.translate(t)).collect();
                intersection(types)
            }
            ast::TypeNode::Conditional(_) => TypeNode::Conditional,
            ast::TypeNode::Infer(_) | ast::TypeNode::This(_) => TypeNode::Unknown,
            ast::TypeNode::Parenthesized(p) => self.translate(p.type_node),
            ast::TypeNode::Operator(op) => {
                let inner = self.translate(op.type_node);
                match op.operator {
                    TypeOperator::KeyOf => utility::keyof(&inner),
                    TypeOperator::Unique => inner,
                    TypeOperator::Readonly => match inner {
                        TypeNode::Array(element) => TypeNode::ReadonlyArray(element),
                        other => other,
                    },
                }
            }
            ast::TypeNode::IndexedAccess(ia) => {
                let object = self.translate(ia.object_type);
                let index = self.translate(ia.index_type);
                utility::indexed_access(&object, &index)
            }
            ast::TypeNode::Mapped(m) => self.mapped(m),
            ast::TypeNode::Literal(l) => literal_type(l.literal),
            ast::TypeNode::TemplateLiteral(t) => {
                let spans: Vec<(TypeNode, String)> = t
                    .spans
                    .iter()
                    .map(|s| (self.translate(s.type_node), s.literal.cooked.to_string()))
                    .collect();
                TypeNode::TemplateLiteral {
                    pattern: template::build_pattern(t.head.cooked, &spans),
                }
            }
            // A predicate's function returns a boolean; an assertion returns nothing.
            ast::TypeNode::Predicate(p) => {
                if p.asserts {
                    TypeNode::Primitive(Primitive::Void)
                } else {
                    TypeNode::boolean()
                }
            }
        }
    }

    /// Resolve a named type with optional arguments.
    pub fn reference(
        &mut self,
        name: &ast::EntityName<'_>,
        type_arguments: Option<&[ast::TypeNode<'_>]>,
        range: TextRange,
    ) -> TypeNode {
        let id = match name {
            ast::EntityName::Identifier(id) => id,
            ast::EntityName::Qualified(q) => {
                if let ast::EntityName::Identifier(left) = q.left {
                    if let Some(entry) = self.registry.enumeration(left.name) {
                        return entry
                            .members
                            .get(q.right.name)
                            .map(|v| TypeNode::Literal(v.clone()))
                            .unwrap_or(TypeNode::Unknown);
                    }
                }
                let args = self.translate_arguments(type_arguments);
                return TypeNode::Generic { name: entity_text(name), args };
            }
        };

        for scope in self.scopes.iter().rev() {
            if let Some(binding) = scope.get(id.name) {
                return binding.clone().unwrap_or(TypeNode::Unknown);
            }
        }

        if self.defining.as_deref() == Some(id.name) {
            self.report(range, &messages::RECURSIVE_REFERENCE_0_NOT_SUPPORTED, &[id.name]);
            return TypeNode::Unknown;
        }

        if let Some(ty) = self.registry.lookup_type(id.name) {
            tracing::trace!(name = id.name, "resolved type reference");
            return ty;
        }

        if self.declared.is_some_and(|names| names.contains(id.name)) {
            self.report(range, &messages::TYPE_0_USED_BEFORE_DECLARATION, &[id.name]);
            return TypeNode::Unknown;
        }

        let args = self.translate_arguments(type_arguments);
        utility::apply(id.name, &args).unwrap_or_else(|| TypeNode::Generic {
            name: id.name.to_string(),
            args,
        })
    }

    fn translate_arguments(&mut self, args: Option<&[ast::TypeNode<'_>]>) -> Vec<TypeNode> {
        args.unwrap_or_default().iter().map(|t| self.translate(t)).collect()
    }

    fn mapped(&mut self, m: &ast::MappedTypeNode<'_>) -> TypeNode {
        let constraint = self.translate(m.constraint);
        let key_name = m.type_parameter.name.to_string();
        let keys = match constraint.literal_keys() {
            Some(keys) if m.name_type.is_none() => keys,
            _ => {
                let mut scope = FxHashMap::default();
                scope.insert(key_name, None);
                self.scopes.push(scope);
                let value = m.type_node.map(|t| self.translate(t)).unwrap_or(TypeNode::Unknown);
                self.scopes.pop();
                return TypeNode::Mapped { key: Box::new(constraint), value: Box::new(value) };
            }
        };

        let mut shape = ObjectShape::new();
        for key in keys {
            let Some(property) = key.as_property_key() else {
                continue;
            };
            let mut scope = FxHashMap::default();
            scope.insert(key_name.clone(), Some(TypeNode::Literal(key)));
            self.scopes.push(scope);
            let value = m.type_node.map(|t| self.translate(t)).unwrap_or(TypeNode::Unknown);
            self.scopes.pop();
            let value = if m.optional { TypeNode::optional(value) } else { value };
            if m.readonly {
                shape.readonly.insert(property.clone());
            }
            shape.properties.insert(property, value);
        }
        TypeNode::Object(shape)
    }

    /// Build an object shape from interface or type literal members.
    pub fn shape_from_members(&mut self, members: &[ast::TypeElement<'_>]) -> ObjectShape {
        let mut shape = ObjectShape::new();
        for member in members {
            match member {
                ast::TypeElement::Property(p) => {
                    let Some(name) = property_key(&p.name) else {
                        continue;
                    };
                    let ty = p.type_annotation.map(|t| self.translate(t)).unwrap_or(TypeNode::Unknown);
                    let ty = if p.optional { TypeNode::optional(ty) } else { ty };
                    if p.data.has_modifier(ModifierFlags::READONLY) {
                        shape.readonly.insert(name.clone());
                    }
                    shape.properties.insert(name, ty);
                }
                ast::TypeElement::Method(m) => {
                    let Some(name) = property_key(&m.name) else {
                        continue;
                    };
                    if shape.properties.contains_key(&name) {
                        continue;
                    }
                    let function = self.signature(m.type_parameters, m.parameters, m.return_type, false);
                    let ty = TypeNode::Function(function);
                    let ty = if m.optional { TypeNode::optional(ty) } else { ty };
                    shape.properties.insert(name, ty);
                }
                ast::TypeElement::Call(sig) => {
                    if shape.call.is_none() {
                        let function = self.signature(sig.type_parameters, sig.parameters, sig.return_type, false);
                        shape.call = Some(Box::new(function));
                    }
                }
                ast::TypeElement::Construct(sig) => {
                    if shape.construct.is_none() {
                        let function = self.signature(sig.type_parameters, sig.parameters, sig.return_type, true);
                        shape.construct = Some(Box::new(function));
                    }
                }
                ast::TypeElement::Index(ix) => {
                    let key = self.translate(ix.key_type);
                    let value = self.translate(ix.type_annotation);
                    shape.index = Some(IndexSignatureType { key: Box::new(key), value: Box::new(value) });
                }
            }
        }
        shape
    }

    /// The function type of a signature with its own type parameters.
    pub fn signature(
        &mut self,
        type_parameters: Option<&[ast::TypeParameter<'_>]>,
        parameters: &[ast::Parameter<'_>],
        return_type: Option<&ast::TypeNode<'_>>,
        is_constructor: bool,
    ) -> FunctionType {
        self.push_type_parameters(type_parameters);
        let params = self.function_params(parameters);
        let returns = return_type.map(|t| self.translate(t)).unwrap_or(TypeNode::Unknown);
        self.pop_type_parameters();
        FunctionType { params, returns: Box::new(returns), is_constructor }
    }

    /// Parameter descriptions, without the `this` pseudo-parameter.
    pub fn function_params(&mut self, params: &[ast::Parameter<'_>]) -> Vec<FunctionParam> {
        params
            .iter()
            .filter(|p| !p.is_this())
            .enumerate()
            .map(|(i, p)| FunctionParam {
                name: p
                    .name
                    .as_identifier()
                    .map(|id| id.name.to_string())
                    .unwrap_or_else(|| format!("arg{}", i)),
                ty: p.type_annotation.map(|t| self.translate(t)).unwrap_or(TypeNode::Unknown),
                optional: p.optional || p.initializer.is_some(),
                rest: p.rest,
            })
            .collect()
    }
}

fn keyword(keyword: KeywordType) -> TypeNode {
    let primitive = match keyword {
        KeywordType::Any => Primitive::Any,
        KeywordType::Unknown => Primitive::Unknown,
        KeywordType::String => Primitive::String,
        KeywordType::Number => Primitive::Number,
        KeywordType::Boolean => Primitive::Boolean,
        KeywordType::BigInt => Primitive::BigInt,
        KeywordType::Symbol => Primitive::Symbol,
        KeywordType::Object => Primitive::Object,
        KeywordType::Void => Primitive::Void,
        KeywordType::Never => Primitive::Never,
        KeywordType::Undefined => Primitive::Undefined,
        KeywordType::Null => Primitive::Null,
        KeywordType::Intrinsic => return TypeNode::Unknown,
    };
    TypeNode::Primitive(primitive)
}

fn literal_type(expr: &ast::Expression<'_>) -> TypeNode {
    match expr {
        ast::Expression::StringLiteral(s) => TypeNode::string_literal(s.value),
        ast::Expression::NoSubstitutionTemplateLiteral(t) => TypeNode::string_literal(t.cooked),
        ast::Expression::NumericLiteral(n) => TypeNode::number_literal(n.value),
        ast::Expression::BigIntLiteral(b) => TypeNode::Literal(LiteralValue::bigint_from_raw(b.raw)),
        ast::Expression::True(_) => TypeNode::Literal(LiteralValue::Boolean(true)),
        ast::Expression::False(_) => TypeNode::Literal(LiteralValue::Boolean(false)),
        ast::Expression::Null(_) => TypeNode::Primitive(Primitive::Null),
        ast::Expression::Identifier(id) if id.name == "undefined" => {
            TypeNode::Primitive(Primitive::Undefined)
        }
        ast::Expression::PrefixUnary(p) if p.operator == SyntaxKind::MinusToken => {
            match literal_type(p.operand) {
                TypeNode::Literal(LiteralValue::Number(n)) => TypeNode::number_literal(-n),
                TypeNode::Literal(LiteralValue::BigInt(digits)) => {
                    TypeNode::Literal(LiteralValue::BigInt(format!("-{}", digits)))
                }
                _ => TypeNode::Unknown,
            }
        }
        _ => TypeNode::Unknown,
    }
}

/// Merge intersections of plain object shapes into one shape when no
/// property is declared twice; otherwise keep the intersection.
fn intersection(types: Vec<TypeNode>) -> TypeNode {
    let types: Vec<TypeNode> = types.into_iter().filter(|t| !t.is_permissive()).collect();
    if types.is_empty() {
        return TypeNode::Unknown;
    }
    if types.len() == 1 {
        return types.into_iter().next().unwrap_or(TypeNode::Unknown);
    }
    let mergeable = types.iter().all(|t| matches!(t, TypeNode::Object(s) if s.index.is_none() && !s.is_callable()));
    if mergeable {
        let mut seen = FxHashSet::default();
        let disjoint = types.iter().all(|t| match t {
            TypeNode::Object(s) => s.properties.keys().all(|k| seen.insert(k.clone())),
            _ => false,
        });
        if disjoint {
            let mut merged = ObjectShape::new();
            for t in &types {
                if let TypeNode::Object(s) = t {
                    merged.merge(s);
                }
            }
            return TypeNode::Object(merged);
        }
    }
    TypeNode::Intersection(types)
}

/// The runtime key of a property name, if it is static.
pub fn property_key(name: &ast::PropertyName<'_>) -> Option<String> {
    match name {
        ast::PropertyName::NumericLiteral(n) => Some(format_number(n.value)),
        other => other.static_name().map(str::to_string),
    }
}

/// `a.b.C` for an entity name.
pub fn entity_text(name: &ast::EntityName<'_>) -> String {
    match name {
        ast::EntityName::Identifier(id) => id.name.to_string(),
        ast::EntityName::Qualified(q) => format!("{}.{}", entity_text(&q.left), q.right.name),
    }
}
