//! Syntax tree node definitions.
//!
//! Children are arena references (`&'a T`) or arena slices ([`NodeList`]).
//! Text is borrowed from the source or from the arena, never owned, so nothing
//! in the tree needs dropping.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use typeguard_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Data shared by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeData {
    pub range: TextRange,
    pub modifier_flags: ModifierFlags,
}

impl NodeData {
    pub fn new(pos: u32, end: u32) -> Self {
        Self {
            range: TextRange::new(pos, end),
            modifier_flags: ModifierFlags::NONE,
        }
    }

    pub fn synthesized() -> Self {
        Self {
            range: TextRange::SYNTHESIZED,
            modifier_flags: ModifierFlags::NONE,
        }
    }

    pub fn with_modifiers(mut self, flags: ModifierFlags) -> Self {
        self.modifier_flags = flags;
        self
    }

    #[inline]
    pub fn has_modifier(&self, flag: ModifierFlags) -> bool {
        self.modifier_flags.contains(flag)
    }
}

pub type NodeList<'a, T> = &'a [T];

pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub file_name: &'a str,
    pub text: &'a str,
    /// Every comment in the file, in source order.
    pub comments: NodeList<'a, Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub range: TextRange,
    pub kind: CommentKind,
}

// ============================================================================
// Names
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub enum EntityName<'a> {
    Identifier(Identifier<'a>),
    Qualified(&'a QualifiedName<'a>),
}

impl<'a> EntityName<'a> {
    /// The rightmost identifier: `Color` for `ns.Color`.
    pub fn last(&self) -> &Identifier<'a> {
        match self {
            EntityName::Identifier(id) => id,
            EntityName::Qualified(q) => &q.right,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            EntityName::Identifier(id) => id.data.range,
            EntityName::Qualified(q) => q.data.range,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualifiedName<'a> {
    pub data: NodeData,
    pub left: EntityName<'a>,
    pub right: Identifier<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyName<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
    NumericLiteral(NumericLiteral<'a>),
    Computed(&'a Expression<'a>),
    PrivateIdentifier(Identifier<'a>),
}

impl<'a> PropertyName<'a> {
    /// The statically known key, if there is one.
    pub fn static_name(&self) -> Option<&'a str> {
        match self {
            PropertyName::Identifier(id) => Some(id.name),
            PropertyName::StringLiteral(s) => Some(s.value),
            PropertyName::NumericLiteral(n) => Some(n.raw),
            PropertyName::Computed(expr) => match expr {
                Expression::StringLiteral(s) => Some(s.value),
                Expression::NoSubstitutionTemplateLiteral(t) => Some(t.cooked),
                _ => None,
            },
            PropertyName::PrivateIdentifier(_) => None,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            PropertyName::Identifier(id) | PropertyName::PrivateIdentifier(id) => id.data.range,
            PropertyName::StringLiteral(s) => s.data.range,
            PropertyName::NumericLiteral(n) => n.data.range,
            PropertyName::Computed(expr) => expr.data().range,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum BindingName<'a> {
    Identifier(Identifier<'a>),
    Object(&'a ObjectBindingPattern<'a>),
    Array(&'a ArrayBindingPattern<'a>),
}

impl<'a> BindingName<'a> {
    pub fn as_identifier(&self) -> Option<&Identifier<'a>> {
        match self {
            BindingName::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// Every identifier this name binds, in source order.
    pub fn bound_names(&self, out: &mut Vec<&'a str>) {
        match self {
            BindingName::Identifier(id) => out.push(id.name),
            BindingName::Object(pattern) => {
                for element in pattern.elements.iter() {
                    element.name.bound_names(out);
                }
            }
            BindingName::Array(pattern) => {
                for element in pattern.elements.iter() {
                    if let ArrayBindingElement::Element(e) = element {
                        e.name.bound_names(out);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectBindingPattern<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, BindingElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayBindingPattern<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, ArrayBindingElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ArrayBindingElement<'a> {
    Element(BindingElement<'a>),
    Omitted(NodeData),
}

#[derive(Debug, Clone, Copy)]
pub struct BindingElement<'a> {
    pub data: NodeData,
    pub rest: bool,
    pub property_name: Option<PropertyName<'a>>,
    pub name: BindingName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

// ============================================================================
// Type Nodes
// ============================================================================

/// Type annotation syntax.
#[derive(Debug, Clone, Copy)]
pub enum TypeNode<'a> {
    Keyword(KeywordTypeNode),
    Reference(TypeReferenceNode<'a>),
    Function(FunctionTypeNode<'a>),
    Query(TypeQueryNode<'a>),
    TypeLiteral(TypeLiteralNode<'a>),
    Array(ArrayTypeNode<'a>),
    Tuple(TupleTypeNode<'a>),
    Union(UnionTypeNode<'a>),
    Intersection(UnionTypeNode<'a>),
    Conditional(ConditionalTypeNode<'a>),
    Infer(InferTypeNode<'a>),
    Parenthesized(ParenthesizedTypeNode<'a>),
    This(NodeData),
    Operator(TypeOperatorNode<'a>),
    IndexedAccess(IndexedAccessTypeNode<'a>),
    Mapped(MappedTypeNode<'a>),
    Literal(LiteralTypeNode<'a>),
    TemplateLiteral(TemplateLiteralTypeNode<'a>),
    Predicate(TypePredicateNode<'a>),
}

impl<'a> TypeNode<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            TypeNode::Keyword(n) => &n.data,
            TypeNode::Reference(n) => &n.data,
            TypeNode::Function(n) => &n.data,
            TypeNode::Query(n) => &n.data,
            TypeNode::TypeLiteral(n) => &n.data,
            TypeNode::Array(n) => &n.data,
            TypeNode::Tuple(n) => &n.data,
            TypeNode::Union(n) | TypeNode::Intersection(n) => &n.data,
            TypeNode::Conditional(n) => &n.data,
            TypeNode::Infer(n) => &n.data,
            TypeNode::Parenthesized(n) => &n.data,
            TypeNode::This(d) => d,
            TypeNode::Operator(n) => &n.data,
            TypeNode::IndexedAccess(n) => &n.data,
            TypeNode::Mapped(n) => &n.data,
            TypeNode::Literal(n) => &n.data,
            TypeNode::TemplateLiteral(n) => &n.data,
            TypeNode::Predicate(n) => &n.data,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordTypeNode {
    pub data: NodeData,
    pub keyword: KeywordType,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeReferenceNode<'a> {
    pub data: NodeData,
    pub type_name: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

/// `(a: A) => R` or `new (a: A) => R`.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTypeNode<'a> {
    pub data: NodeData,
    pub is_constructor: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: &'a TypeNode<'a>,
}

/// `typeof x`
#[derive(Debug, Clone, Copy)]
pub struct TypeQueryNode<'a> {
    pub data: NodeData,
    pub expr_name: EntityName<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeLiteralNode<'a> {
    pub data: NodeData,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayTypeNode<'a> {
    pub data: NodeData,
    pub element_type: &'a TypeNode<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct TupleTypeNode<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, TupleElement<'a>>,
}

/// One tuple position: `T`, `T?`, `...T[]`, `label: T`, `label?: T`.
#[derive(Debug, Clone, Copy)]
pub struct TupleElement<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub optional: bool,
    pub rest: bool,
    pub type_node: &'a TypeNode<'a>,
}

/// Shared by unions and intersections.
#[derive(Debug, Clone, Copy)]
pub struct UnionTypeNode<'a> {
    pub data: NodeData,
    pub types: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionalTypeNode<'a> {
    pub data: NodeData,
    pub check_type: &'a TypeNode<'a>,
    pub extends_type: &'a TypeNode<'a>,
    pub true_type: &'a TypeNode<'a>,
    pub false_type: &'a TypeNode<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct InferTypeNode<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParenthesizedTypeNode<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeOperatorNode<'a> {
    pub data: NodeData,
    pub operator: TypeOperator,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexedAccessTypeNode<'a> {
    pub data: NodeData,
    pub object_type: &'a TypeNode<'a>,
    pub index_type: &'a TypeNode<'a>,
}

/// `{ readonly [K in C as N]?: T }`
#[derive(Debug, Clone, Copy)]
pub struct MappedTypeNode<'a> {
    pub data: NodeData,
    pub readonly: bool,
    pub type_parameter: Identifier<'a>,
    pub constraint: &'a TypeNode<'a>,
    pub name_type: OptionalNode<'a, TypeNode<'a>>,
    pub optional: bool,
    pub type_node: OptionalNode<'a, TypeNode<'a>>,
}

/// A literal used as a type: `"a"`, `42`, `-1`, `true`, `10n`.
#[derive(Debug, Clone, Copy)]
pub struct LiteralTypeNode<'a> {
    pub data: NodeData,
    pub literal: &'a Expression<'a>,
}

/// `` `prefix-${string}` ``
#[derive(Debug, Clone, Copy)]
pub struct TemplateLiteralTypeNode<'a> {
    pub data: NodeData,
    pub head: TemplatePart<'a>,
    pub spans: NodeList<'a, TemplateLiteralTypeSpan<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateLiteralTypeSpan<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
    pub literal: TemplatePart<'a>,
}

/// `x is T`, `asserts x is T`, `asserts x`.
#[derive(Debug, Clone, Copy)]
pub struct TypePredicateNode<'a> {
    pub data: NodeData,
    pub asserts: bool,
    pub parameter_name: Identifier<'a>,
    pub type_node: OptionalNode<'a, TypeNode<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeParameter<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub constraint: OptionalNode<'a, TypeNode<'a>>,
    pub default: OptionalNode<'a, TypeNode<'a>>,
}

/// A named type with optional arguments in a heritage clause: `extends Base<T>`.
#[derive(Debug, Clone, Copy)]
pub struct HeritageType<'a> {
    pub data: NodeData,
    pub name: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

// ============================================================================
// Type Elements (interface and type literal members)
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum TypeElement<'a> {
    Property(PropertySignature<'a>),
    Method(MethodSignature<'a>),
    Call(SignatureDeclaration<'a>),
    Construct(SignatureDeclaration<'a>),
    Index(IndexSignature<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct PropertySignature<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub optional: bool,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct MethodSignature<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub optional: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
}

/// Call and construct signatures: `(x: T): R`, `new (x: T): R`.
#[derive(Debug, Clone, Copy)]
pub struct SignatureDeclaration<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
}

/// `[key: string]: T`
#[derive(Debug, Clone, Copy)]
pub struct IndexSignature<'a> {
    pub data: NodeData,
    pub parameter: Identifier<'a>,
    pub key_type: &'a TypeNode<'a>,
    pub type_annotation: &'a TypeNode<'a>,
}

// ============================================================================
// Parameters
// ============================================================================

/// A function parameter. Modifiers on `data` (`private`, `readonly`, ...) mark
/// constructor parameter properties.
#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub name: BindingName<'a>,
    pub rest: bool,
    pub optional: bool,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

impl<'a> Parameter<'a> {
    /// The `this` pseudo-parameter only carries a type.
    pub fn is_this(&self) -> bool {
        matches!(self.name, BindingName::Identifier(id) if id.name == "this")
    }

    pub fn is_parameter_property(&self) -> bool {
        self.data
            .modifier_flags
            .intersects(ModifierFlags::PARAMETER_PROPERTY_MODIFIER)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
    NumericLiteral(NumericLiteral<'a>),
    BigIntLiteral(RawLiteral<'a>),
    RegularExpressionLiteral(RawLiteral<'a>),
    NoSubstitutionTemplateLiteral(TemplateLiteral<'a>),
    Template(TemplateExpression<'a>),
    ArrayLiteral(ArrayLiteralExpression<'a>),
    ObjectLiteral(ObjectLiteralExpression<'a>),
    PropertyAccess(PropertyAccessExpression<'a>),
    ElementAccess(ElementAccessExpression<'a>),
    Call(CallExpression<'a>),
    New(NewExpression<'a>),
    TaggedTemplate(TaggedTemplateExpression<'a>),
    TypeAssertion(TypeAssertionExpression<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
    Function(&'a FunctionDeclaration<'a>),
    Arrow(&'a ArrowFunction<'a>),
    Class(&'a ClassDeclaration<'a>),
    PrefixUnary(PrefixUnaryExpression<'a>),
    PostfixUnary(PostfixUnaryExpression<'a>),
    Await(UnaryOperand<'a>),
    Yield(YieldExpression<'a>),
    Binary(BinaryExpression<'a>),
    Conditional(ConditionalExpression<'a>),
    Spread(UnaryOperand<'a>),
    Omitted(NodeData),
    As(AsExpression<'a>),
    Satisfies(AsExpression<'a>),
    NonNull(UnaryOperand<'a>),
    MetaProperty(MetaPropertyExpression<'a>),
    This(NodeData),
    Super(NodeData),
    Null(NodeData),
    True(NodeData),
    False(NodeData),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::StringLiteral(n) => &n.data,
            Expression::NumericLiteral(n) => &n.data,
            Expression::BigIntLiteral(n) | Expression::RegularExpressionLiteral(n) => &n.data,
            Expression::NoSubstitutionTemplateLiteral(n) => &n.data,
            Expression::Template(n) => &n.data,
            Expression::ArrayLiteral(n) => &n.data,
            Expression::ObjectLiteral(n) => &n.data,
            Expression::PropertyAccess(n) => &n.data,
            Expression::ElementAccess(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::New(n) => &n.data,
            Expression::TaggedTemplate(n) => &n.data,
            Expression::TypeAssertion(n) => &n.data,
            Expression::Parenthesized(n) => &n.data,
            Expression::Function(n) => &n.data,
            Expression::Arrow(n) => &n.data,
            Expression::Class(n) => &n.data,
            Expression::PrefixUnary(n) => &n.data,
            Expression::PostfixUnary(n) => &n.data,
            Expression::Await(n) | Expression::Spread(n) | Expression::NonNull(n) => &n.data,
            Expression::Yield(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::As(n) | Expression::Satisfies(n) => &n.data,
            Expression::MetaProperty(n) => &n.data,
            Expression::Omitted(d)
            | Expression::This(d)
            | Expression::Super(d)
            | Expression::Null(d)
            | Expression::True(d)
            | Expression::False(d) => d,
        }
    }

    /// Strip parentheses and type-only wrappers (`as`, `satisfies`, `!`, `<T>x`).
    pub fn skip_outer_expressions(&self) -> &Expression<'a> {
        let mut expr = self;
        loop {
            expr = match expr {
                Expression::Parenthesized(n) => n.expression,
                Expression::As(n) | Expression::Satisfies(n) => n.expression,
                Expression::NonNull(n) => n.operand,
                Expression::TypeAssertion(n) => n.expression,
                _ => return expr,
            };
        }
    }
}

/// A string literal: `value` is the cooked text, `raw` includes the quotes.
#[derive(Debug, Clone, Copy)]
pub struct StringLiteral<'a> {
    pub data: NodeData,
    pub value: &'a str,
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct NumericLiteral<'a> {
    pub data: NodeData,
    pub value: f64,
    pub raw: &'a str,
}

/// Literals printed exactly as written (bigints, regular expressions).
#[derive(Debug, Clone, Copy)]
pub struct RawLiteral<'a> {
    pub data: NodeData,
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateLiteral<'a> {
    pub data: NodeData,
    pub cooked: &'a str,
    pub raw: &'a str,
}

/// Literal text of one template piece, between the backticks and `${ }`.
#[derive(Debug, Clone, Copy)]
pub struct TemplatePart<'a> {
    pub cooked: &'a str,
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateExpression<'a> {
    pub data: NodeData,
    pub head: TemplatePart<'a>,
    pub spans: NodeList<'a, TemplateSpan<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateSpan<'a> {
    pub expression: &'a Expression<'a>,
    pub literal: TemplatePart<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayLiteralExpression<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectLiteralExpression<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ObjectLiteralElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ObjectLiteralElement<'a> {
    Property(PropertyAssignment<'a>),
    Shorthand(ShorthandPropertyAssignment<'a>),
    Spread(UnaryOperand<'a>),
    Method(&'a MethodDeclaration<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyAssignment<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: &'a Expression<'a>,
}

/// `{ x }`, or `{ x = 1 }` inside a destructuring assignment target.
#[derive(Debug, Clone, Copy)]
pub struct ShorthandPropertyAssignment<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub default: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub optional: bool,
    /// Private names keep their leading `#`.
    pub name: Identifier<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub optional: bool,
    pub argument: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub optional: bool,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub arguments: Option<NodeList<'a, Expression<'a>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaggedTemplateExpression<'a> {
    pub data: NodeData,
    pub tag: &'a Expression<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub template: &'a Expression<'a>,
}

/// `<T>expr`
#[derive(Debug, Clone, Copy)]
pub struct TypeAssertionExpression<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrowFunction<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
    pub body: ArrowFunctionBody<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ArrowFunctionBody<'a> {
    Block(&'a Block<'a>),
    Expression(&'a Expression<'a>),
}

/// Prefix operators, including `typeof`, `void` and `delete`.
#[derive(Debug, Clone, Copy)]
pub struct PrefixUnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct PostfixUnaryExpression<'a> {
    pub data: NodeData,
    pub operand: &'a Expression<'a>,
    pub operator: SyntaxKind,
}

/// Shared shape for `await x`, `...x` and `x!`.
#[derive(Debug, Clone, Copy)]
pub struct UnaryOperand<'a> {
    pub data: NodeData,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct YieldExpression<'a> {
    pub data: NodeData,
    pub delegate: bool,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

/// Binary operators, assignments and the comma operator.
#[derive(Debug, Clone, Copy)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub when_true: &'a Expression<'a>,
    pub when_false: &'a Expression<'a>,
}

/// `x as T` and `x satisfies T`.
#[derive(Debug, Clone, Copy)]
pub struct AsExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_node: &'a TypeNode<'a>,
}

/// `new.target`, `import.meta`
#[derive(Debug, Clone, Copy)]
pub struct MetaPropertyExpression<'a> {
    pub data: NodeData,
    pub keyword: SyntaxKind,
    pub name: Identifier<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Variable(VariableStatement<'a>),
    Function(&'a FunctionDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
    Interface(&'a InterfaceDeclaration<'a>),
    TypeAlias(&'a TypeAliasDeclaration<'a>),
    Enum(&'a EnumDeclaration<'a>),
    Module(&'a ModuleDeclaration<'a>),
    Import(&'a ImportDeclaration<'a>),
    ImportEquals(&'a ImportEqualsDeclaration<'a>),
    Export(&'a ExportDeclaration<'a>),
    ExportAssignment(ExportAssignment<'a>),
    Block(&'a Block<'a>),
    Empty(NodeData),
    Expression(ExpressionStatement<'a>),
    If(IfStatement<'a>),
    Do(LoopStatement<'a>),
    While(LoopStatement<'a>),
    For(ForStatement<'a>),
    ForIn(ForInOfStatement<'a>),
    ForOf(ForInOfStatement<'a>),
    Continue(JumpStatement<'a>),
    Break(JumpStatement<'a>),
    Return(ReturnStatement<'a>),
    Switch(SwitchStatement<'a>),
    Labeled(LabeledStatement<'a>),
    Throw(ExpressionStatement<'a>),
    Try(TryStatement<'a>),
    Debugger(NodeData),
    /// Generated code emitted as-is.
    Verbatim(VerbatimStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Variable(n) => &n.data,
            Statement::Function(n) => &n.data,
            Statement::Class(n) => &n.data,
            Statement::Interface(n) => &n.data,
            Statement::TypeAlias(n) => &n.data,
            Statement::Enum(n) => &n.data,
            Statement::Module(n) => &n.data,
            Statement::Import(n) => &n.data,
            Statement::ImportEquals(n) => &n.data,
            Statement::Export(n) => &n.data,
            Statement::ExportAssignment(n) => &n.data,
            Statement::Block(n) => &n.data,
            Statement::Expression(n) | Statement::Throw(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::Do(n) | Statement::While(n) => &n.data,
            Statement::For(n) => &n.data,
            Statement::ForIn(n) | Statement::ForOf(n) => &n.data,
            Statement::Continue(n) | Statement::Break(n) => &n.data,
            Statement::Return(n) => &n.data,
            Statement::Switch(n) => &n.data,
            Statement::Labeled(n) => &n.data,
            Statement::Try(n) => &n.data,
            Statement::Verbatim(n) => &n.data,
            Statement::Empty(d) | Statement::Debugger(d) => d,
        }
    }

    /// Whether this is a `"use strict"`-style directive.
    pub fn is_directive(&self) -> bool {
        matches!(
            self,
            Statement::Expression(ExpressionStatement {
                expression: Expression::StringLiteral(_),
                ..
            })
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableStatement<'a> {
    pub data: NodeData,
    pub kind: VariableKind,
    pub declarations: NodeList<'a, VariableDeclaration<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub name: BindingName<'a>,
    /// `let x!: T`
    pub definite: bool,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

/// Expression statements and `throw`.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

/// `while (e) s` and `do s while (e)`.
#[derive(Debug, Clone, Copy)]
pub struct LoopStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub initializer: Option<ForInitializer<'a>>,
    pub condition: OptionalNode<'a, Expression<'a>>,
    pub incrementor: OptionalNode<'a, Expression<'a>>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ForInitializer<'a> {
    Variable(VariableStatement<'a>),
    Expression(&'a Expression<'a>),
}

/// `for (x in o)` and `for (await x of xs)`.
#[derive(Debug, Clone, Copy)]
pub struct ForInOfStatement<'a> {
    pub data: NodeData,
    pub is_await: bool,
    pub initializer: ForInitializer<'a>,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct JumpStatement<'a> {
    pub data: NodeData,
    pub label: Option<Identifier<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct SwitchStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub clauses: NodeList<'a, CaseClause<'a>>,
}

/// A `case e:` clause, or `default:` when `expression` is `None`.
#[derive(Debug, Clone, Copy)]
pub struct CaseClause<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct LabeledStatement<'a> {
    pub data: NodeData,
    pub label: Identifier<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct TryStatement<'a> {
    pub data: NodeData,
    pub try_block: &'a Block<'a>,
    pub catch_clause: Option<CatchClause<'a>>,
    pub finally_block: OptionalNode<'a, Block<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct CatchClause<'a> {
    pub data: NodeData,
    pub binding: Option<BindingName<'a>>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub block: &'a Block<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct VerbatimStatement<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

// ============================================================================
// Declarations
// ============================================================================

/// Function declarations and function expressions. `body` is `None` for
/// overload signatures and ambient declarations.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub asterisk: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
    pub body: OptionalNode<'a, Block<'a>>,
}

/// Class declarations and class expressions.
#[derive(Debug, Clone, Copy)]
pub struct ClassDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub extends: OptionalNode<'a, Expression<'a>>,
    pub extends_type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub implements: NodeList<'a, HeritageType<'a>>,
    pub members: NodeList<'a, ClassElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ClassElement<'a> {
    Property(&'a PropertyDeclaration<'a>),
    Method(&'a MethodDeclaration<'a>),
    Index(IndexSignature<'a>),
    StaticBlock(&'a Block<'a>),
    Semicolon(NodeData),
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub optional: bool,
    pub definite: bool,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

/// Methods, accessors and constructors, in classes and object literals.
#[derive(Debug, Clone, Copy)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    pub kind: MethodKind,
    pub name: PropertyName<'a>,
    pub optional: bool,
    pub asterisk: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
    pub body: OptionalNode<'a, Block<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct InterfaceDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub extends: NodeList<'a, HeritageType<'a>>,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeAliasDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_parameters: Option<NodeList<'a, TypeParameter<'a>>>,
    pub type_node: &'a TypeNode<'a>,
}

/// `enum E { ... }`; `const enum` sets `ModifierFlags::CONST`.
#[derive(Debug, Clone, Copy)]
pub struct EnumDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub members: NodeList<'a, EnumMember<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnumMember<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

/// `namespace N { }`, `module "m" { }`, `declare global { }`.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub is_string_name: bool,
    pub body: Option<NodeList<'a, Statement<'a>>>,
}

// ============================================================================
// Import/Export
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ImportDeclaration<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    pub default_binding: Option<Identifier<'a>>,
    pub namespace_binding: Option<Identifier<'a>>,
    pub named_bindings: Option<NodeList<'a, ImportSpecifier<'a>>>,
    pub module_specifier: StringLiteral<'a>,
}

impl<'a> ImportDeclaration<'a> {
    /// A bare `import "m"` evaluated for side effects only.
    pub fn is_side_effect_only(&self) -> bool {
        self.default_binding.is_none()
            && self.namespace_binding.is_none()
            && self.named_bindings.is_none()
    }
}

/// Import and export specifiers: `a`, `a as b`, `type a`.
#[derive(Debug, Clone, Copy)]
pub struct ImportSpecifier<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    pub property_name: Option<Identifier<'a>>,
    pub name: Identifier<'a>,
}

/// `import x = require("m")` or `import x = N.y`.
#[derive(Debug, Clone, Copy)]
pub struct ImportEqualsDeclaration<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    pub name: Identifier<'a>,
    pub module_reference: ModuleReference<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ModuleReference<'a> {
    External(StringLiteral<'a>),
    Entity(EntityName<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct ExportDeclaration<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    pub clause: ExportClause<'a>,
    pub module_specifier: Option<StringLiteral<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ExportClause<'a> {
    /// `export { a, b as c }`
    Named(NodeList<'a, ImportSpecifier<'a>>),
    /// `export * from "m"` / `export * as ns from "m"`
    Namespace(Option<Identifier<'a>>),
}

/// `export default expr` or `export = expr`.
#[derive(Debug, Clone, Copy)]
pub struct ExportAssignment<'a> {
    pub data: NodeData,
    pub is_export_equals: bool,
    pub expression: &'a Expression<'a>,
}
