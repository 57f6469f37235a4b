//! Type annotation parsing.
//!
//! Types are parsed in full even though most of them only matter to the
//! registry, so that erasure can drop them without guessing where they end.

use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::*;
use typeguard_diagnostics::messages;

use crate::parser::{Parser, MAX_RECURSION_DEPTH};
use crate::utilities::is_start_of_type;

impl<'a> Parser<'a> {
    fn missing_type(&self) -> TypeNode<'a> {
        let pos = self.token_pos();
        TypeNode::Keyword(KeywordTypeNode {
            data: NodeData::new(pos, pos),
            keyword: KeywordType::Any,
        })
    }

    /// `: T` if present.
    pub(crate) fn parse_type_annotation(&mut self) -> Option<&'a TypeNode<'a>> {
        if self.optional_token(SyntaxKind::ColonToken) {
            Some(self.parse_type_and_alloc())
        } else {
            None
        }
    }

    /// `: T` after a signature, where type predicates are also allowed.
    pub(crate) fn parse_return_type(&mut self) -> Option<&'a TypeNode<'a>> {
        if !self.optional_token(SyntaxKind::ColonToken) {
            return None;
        }
        let type_node = self.parse_type_or_predicate();
        Some(self.alloc(type_node))
    }

    fn parse_type_or_predicate(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let is_name = |k: SyntaxKind| matches!(k, SyntaxKind::Identifier | SyntaxKind::ThisKeyword);

        if self.is_identifier_text("asserts") && self.next_token_on_same_line(|k, _| is_name(k)) {
            self.next_token();
            let parameter_name = self.parse_predicate_parameter_name();
            let type_node = if self.is_identifier_text("is") && !self.has_preceding_line_break() {
                self.next_token();
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            return TypeNode::Predicate(TypePredicateNode {
                data: self.finish_node(pos),
                asserts: true,
                parameter_name,
                type_node,
            });
        }

        if is_name(self.current_token())
            && self.next_token_on_same_line(|k, t| k == SyntaxKind::Identifier && t == "is")
        {
            let parameter_name = self.parse_predicate_parameter_name();
            self.next_token();
            let type_node = self.parse_type_and_alloc();
            return TypeNode::Predicate(TypePredicateNode {
                data: self.finish_node(pos),
                asserts: false,
                parameter_name,
                type_node: Some(type_node),
            });
        }

        self.parse_type()
    }

    fn parse_predicate_parameter_name(&mut self) -> Identifier<'a> {
        if self.current_token() == SyntaxKind::ThisKeyword {
            let pos = self.token_pos();
            self.next_token();
            return Identifier {
                data: self.finish_node(pos),
                name: "this",
            };
        }
        self.parse_identifier()
    }

    pub(crate) fn parse_type_and_alloc(&mut self) -> &'a TypeNode<'a> {
        let type_node = self.parse_type();
        self.alloc(type_node)
    }

    pub(crate) fn parse_type(&mut self) -> TypeNode<'a> {
        self.recursion_depth += 1;
        let type_node = if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]);
            self.missing_type()
        } else {
            self.parse_type_worker()
        };
        self.recursion_depth -= 1;
        type_node
    }

    fn parse_type_worker(&mut self) -> TypeNode<'a> {
        if let Some(function_type) = self.try_parse_function_type() {
            return function_type;
        }

        let pos = self.token_pos();
        let check_type = self.parse_union_type();
        if self.disallow_conditional_types
            || self.current_token() != SyntaxKind::ExtendsKeyword
            || self.has_preceding_line_break()
        {
            return check_type;
        }

        self.next_token();
        let saved = self.disallow_conditional_types;
        self.disallow_conditional_types = true;
        let extends_type = self.parse_type_and_alloc();
        self.disallow_conditional_types = saved;
        self.expect_token(SyntaxKind::QuestionToken);
        let true_type = self.parse_type_and_alloc();
        self.expect_token(SyntaxKind::ColonToken);
        let false_type = self.parse_type_and_alloc();
        TypeNode::Conditional(ConditionalTypeNode {
            data: self.finish_node(pos),
            check_type: self.alloc(check_type),
            extends_type,
            true_type,
            false_type,
        })
    }

    /// `(a: A) => R`, `<T>(x: T) => T`, `new () => C`, `abstract new () => C`.
    fn try_parse_function_type(&mut self) -> Option<TypeNode<'a>> {
        let starts = match self.current_token() {
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::Identifier => {
                self.token_text() == "abstract" && self.peek_token() == SyntaxKind::NewKeyword
            }
            _ => false,
        };
        if !starts {
            return None;
        }
        self.try_parse(|p| {
            let pos = p.token_pos();
            if p.is_identifier_text("abstract") {
                p.next_token();
            }
            let is_constructor = p.optional_token(SyntaxKind::NewKeyword);
            let type_parameters = p.parse_type_parameters();
            if p.current_token() != SyntaxKind::OpenParenToken {
                return None;
            }
            let parameters = p.parse_parameters_in_context(false, false);
            if !p.optional_token(SyntaxKind::EqualsGreaterThanToken) {
                return None;
            }
            let saved = p.disallow_conditional_types;
            p.disallow_conditional_types = false;
            let return_type = p.parse_type_or_predicate();
            p.disallow_conditional_types = saved;
            Some(TypeNode::Function(FunctionTypeNode {
                data: p.finish_node(pos),
                is_constructor,
                type_parameters,
                parameters,
                return_type: p.alloc(return_type),
            }))
        })
    }

    fn parse_union_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.optional_token(SyntaxKind::BarToken);
        let first = self.parse_intersection_type();
        if self.current_token() != SyntaxKind::BarToken {
            return first;
        }
        let mut types = vec![first];
        while self.optional_token(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_type());
        }
        TypeNode::Union(UnionTypeNode {
            data: self.finish_node(pos),
            types: self.alloc_list(types),
        })
    }

    fn parse_intersection_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.optional_token(SyntaxKind::AmpersandToken);
        let first = self.parse_type_operator_or_higher();
        if self.current_token() != SyntaxKind::AmpersandToken {
            return first;
        }
        let mut types = vec![first];
        while self.optional_token(SyntaxKind::AmpersandToken) {
            types.push(self.parse_type_operator_or_higher());
        }
        TypeNode::Intersection(UnionTypeNode {
            data: self.finish_node(pos),
            types: self.alloc_list(types),
        })
    }

    fn parse_type_operator_or_higher(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::Identifier {
            let operator = match self.token_text() {
                "keyof" => Some(TypeOperator::KeyOf),
                "unique" => Some(TypeOperator::Unique),
                "readonly" => Some(TypeOperator::Readonly),
                _ => None,
            };
            if let Some(operator) = operator {
                if self.next_token_on_same_line(|k, _| is_start_of_type(k)) {
                    self.next_token();
                    let operand = self.parse_type_operator_or_higher();
                    return TypeNode::Operator(TypeOperatorNode {
                        data: self.finish_node(pos),
                        operator,
                        type_node: self.alloc(operand),
                    });
                }
            }
            if self.token_text() == "infer" && self.peek_token() == SyntaxKind::Identifier {
                self.next_token();
                let name = self.parse_identifier();
                if self.disallow_conditional_types && self.current_token() == SyntaxKind::ExtendsKeyword {
                    // `infer U extends C` constrains the inferred name only.
                    self.try_parse(|p| {
                        p.next_token();
                        p.parse_type();
                        (p.current_token() != SyntaxKind::QuestionToken).then_some(())
                    });
                }
                return TypeNode::Infer(InferTypeNode {
                    data: self.finish_node(pos),
                    name,
                });
            }
        }
        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while self.current_token() == SyntaxKind::OpenBracketToken && !self.has_preceding_line_break() {
            self.next_token();
            if self.optional_token(SyntaxKind::CloseBracketToken) {
                type_node = TypeNode::Array(ArrayTypeNode {
                    data: self.finish_node(pos),
                    element_type: self.alloc(type_node),
                });
            } else {
                let index_type = self.parse_type_and_alloc();
                self.expect_token(SyntaxKind::CloseBracketToken);
                type_node = TypeNode::IndexedAccess(IndexedAccessTypeNode {
                    data: self.finish_node(pos),
                    object_type: self.alloc(type_node),
                    index_type,
                });
            }
        }
        type_node
    }

    fn parse_non_array_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::Identifier => {
                if let Some(keyword) = KeywordType::from_text(self.token_text()) {
                    if self.peek_token() != SyntaxKind::DotToken {
                        self.next_token();
                        return TypeNode::Keyword(KeywordTypeNode {
                            data: self.finish_node(pos),
                            keyword,
                        });
                    }
                }
                self.parse_type_reference()
            }
            SyntaxKind::NullKeyword | SyntaxKind::VoidKeyword => {
                let keyword = if self.current_token() == SyntaxKind::NullKeyword {
                    KeywordType::Null
                } else {
                    KeywordType::Void
                };
                self.next_token();
                TypeNode::Keyword(KeywordTypeNode {
                    data: self.finish_node(pos),
                    keyword,
                })
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                TypeNode::This(self.finish_node(pos))
            }
            SyntaxKind::TypeOfKeyword => {
                self.next_token();
                if self.current_token() == SyntaxKind::ImportKeyword {
                    return self.parse_import_type(pos);
                }
                let expr_name = self.parse_entity_name();
                TypeNode::Query(TypeQueryNode {
                    data: self.finish_node(pos),
                    expr_name,
                })
            }
            SyntaxKind::ImportKeyword => self.parse_import_type(pos),
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => {
                let literal = self.parse_literal_type_expression();
                TypeNode::Literal(LiteralTypeNode {
                    data: self.finish_node(pos),
                    literal: self.alloc(literal),
                })
            }
            SyntaxKind::MinusToken
                if matches!(
                    self.peek_token(),
                    SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral
                ) =>
            {
                self.next_token();
                let operand = self.parse_literal_type_expression();
                let literal = Expression::PrefixUnary(PrefixUnaryExpression {
                    data: self.finish_node(pos),
                    operator: SyntaxKind::MinusToken,
                    operand: self.alloc(operand),
                });
                TypeNode::Literal(LiteralTypeNode {
                    data: self.finish_node(pos),
                    literal: self.alloc(literal),
                })
            }
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                let literal = self.parse_template_expression();
                TypeNode::Literal(LiteralTypeNode {
                    data: self.finish_node(pos),
                    literal: self.alloc(literal),
                })
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(),
            SyntaxKind::OpenBraceToken => {
                if self.is_start_of_mapped_type() {
                    self.parse_mapped_type()
                } else {
                    let members = self.parse_object_type_members();
                    TypeNode::TypeLiteral(TypeLiteralNode {
                        data: self.finish_node(pos),
                        members,
                    })
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let saved = self.disallow_conditional_types;
                self.disallow_conditional_types = false;
                let inner = self.parse_type_and_alloc();
                self.disallow_conditional_types = saved;
                self.expect_token(SyntaxKind::CloseParenToken);
                TypeNode::Parenthesized(ParenthesizedTypeNode {
                    data: self.finish_node(pos),
                    type_node: inner,
                })
            }
            _ => {
                self.error(&messages::TYPE_EXPECTED, &[]);
                self.missing_type()
            }
        }
    }

    fn parse_literal_type_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::StringLiteral => Expression::StringLiteral(self.parse_string_literal()),
            SyntaxKind::NumericLiteral => Expression::NumericLiteral(self.parse_numeric_literal()),
            SyntaxKind::BigIntLiteral => {
                let raw = self.token_text();
                self.next_token();
                Expression::BigIntLiteral(RawLiteral {
                    data: self.finish_node(pos),
                    raw,
                })
            }
            SyntaxKind::TrueKeyword => {
                self.next_token();
                Expression::True(self.finish_node(pos))
            }
            _ => {
                self.next_token();
                Expression::False(self.finish_node(pos))
            }
        }
    }

    fn parse_type_reference(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let type_name = self.parse_entity_name();
        let type_arguments = if self.current_token() == SyntaxKind::LessThanToken && !self.has_preceding_line_break() {
            self.parse_type_arguments()
        } else {
            None
        };
        TypeNode::Reference(TypeReferenceNode {
            data: self.finish_node(pos),
            type_name,
            type_arguments,
        })
    }

    /// `import("mod").Name<T>`. Only the trailing name is kept; such types are
    /// never declared locally.
    fn parse_import_type(&mut self, pos: u32) -> TypeNode<'a> {
        self.expect_token(SyntaxKind::ImportKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);
        if self.current_token() == SyntaxKind::StringLiteral {
            self.parse_string_literal();
        } else {
            self.error(&messages::_0_EXPECTED, &["string literal"]);
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        if !self.optional_token(SyntaxKind::DotToken) {
            return TypeNode::Keyword(KeywordTypeNode {
                data: self.finish_node(pos),
                keyword: KeywordType::Any,
            });
        }
        let type_name = self.parse_entity_name();
        let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
            self.parse_type_arguments()
        } else {
            None
        };
        TypeNode::Reference(TypeReferenceNode {
            data: self.finish_node(pos),
            type_name,
            type_arguments,
        })
    }

    fn parse_template_literal_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let head = TemplatePart {
            cooked: self.arena.alloc_str(self.scanner.token_value()),
            raw: self.scanner.token_raw(),
        };
        self.next_token();
        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let type_node = self.parse_type_and_alloc();
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.error(&messages::_0_EXPECTED, &["}"]);
                break;
            }
            let kind = self.scanner.rescan_template_token();
            let literal = TemplatePart {
                cooked: self.arena.alloc_str(self.scanner.token_value()),
                raw: self.scanner.token_raw(),
            };
            self.next_token();
            spans.push(TemplateLiteralTypeSpan {
                data: self.finish_node(span_pos),
                type_node,
                literal,
            });
            if kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        TypeNode::TemplateLiteral(TemplateLiteralTypeNode {
            data: self.finish_node(pos),
            head,
            spans: self.alloc_list(spans),
        })
    }

    fn parse_tuple_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            let epos = self.token_pos();
            let rest = self.optional_token(SyntaxKind::DotDotDotToken);
            let is_named = self.current_token().is_identifier_or_keyword()
                && self.look_ahead(|p| {
                    let kind = p.next_token();
                    kind == SyntaxKind::ColonToken
                        || (kind == SyntaxKind::QuestionToken && p.next_token() == SyntaxKind::ColonToken)
                });
            let (name, mut optional) = if is_named {
                let name = self.parse_identifier_name();
                let optional = self.optional_token(SyntaxKind::QuestionToken);
                self.expect_token(SyntaxKind::ColonToken);
                (Some(name), optional)
            } else {
                (None, false)
            };
            let type_node = self.parse_type_and_alloc();
            if !is_named && self.optional_token(SyntaxKind::QuestionToken) {
                optional = true;
            }
            elements.push(TupleElement {
                data: self.finish_node(epos),
                name,
                optional,
                rest,
                type_node,
            });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        TypeNode::Tuple(TupleTypeNode {
            data: self.finish_node(pos),
            elements: self.alloc_list(elements),
        })
    }

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.look_ahead(|p| {
            let mut kind = p.next_token();
            if matches!(kind, SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
                kind = p.next_token();
                return kind == SyntaxKind::Identifier && p.token_text() == "readonly";
            }
            if kind == SyntaxKind::Identifier && p.token_text() == "readonly" {
                kind = p.next_token();
            }
            if kind != SyntaxKind::OpenBracketToken {
                return false;
            }
            p.next_token() == SyntaxKind::Identifier && p.next_token() == SyntaxKind::InKeyword
        })
    }

    fn parse_mapped_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut readonly = false;
        if matches!(self.current_token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
            // `-readonly` removes the modifier.
            readonly = self.current_token() == SyntaxKind::PlusToken;
            self.next_token();
            self.next_token();
        } else if self.is_identifier_text("readonly") {
            readonly = true;
            self.next_token();
        }
        self.expect_token(SyntaxKind::OpenBracketToken);
        let type_parameter = self.parse_identifier();
        self.expect_token(SyntaxKind::InKeyword);
        let constraint = self.parse_type_and_alloc();
        let name_type = if self.is_identifier_text("as") {
            self.next_token();
            Some(self.parse_type_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseBracketToken);
        let optional = match self.current_token() {
            SyntaxKind::QuestionToken => {
                self.next_token();
                true
            }
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => {
                let adds = self.current_token() == SyntaxKind::PlusToken;
                self.next_token();
                self.expect_token(SyntaxKind::QuestionToken);
                adds
            }
            _ => false,
        };
        let type_node = self.parse_type_annotation();
        self.optional_token(SyntaxKind::SemicolonToken);
        self.expect_token(SyntaxKind::CloseBraceToken);
        TypeNode::Mapped(MappedTypeNode {
            data: self.finish_node(pos),
            readonly,
            type_parameter,
            constraint,
            name_type,
            optional,
            type_node,
        })
    }

    // ========================================================================
    // Type parameters and arguments
    // ========================================================================

    pub(crate) fn parse_type_parameters(&mut self) -> Option<&'a [TypeParameter<'a>]> {
        if self.current_token() != SyntaxKind::LessThanToken {
            return None;
        }
        self.next_token();
        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken
        ) {
            let pos = self.token_pos();
            // `const T`, `in T`, `out T`
            while matches!(self.current_token(), SyntaxKind::ConstKeyword | SyntaxKind::InKeyword)
                || (self.is_identifier_text("out") && self.peek_token() == SyntaxKind::Identifier)
            {
                self.next_token();
            }
            let name = self.parse_identifier();
            let constraint = if self.optional_token(SyntaxKind::ExtendsKeyword) {
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            let default = if self.optional_token(SyntaxKind::EqualsToken) {
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            parameters.push(TypeParameter {
                data: self.finish_node(pos),
                name,
                constraint,
                default,
            });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::GreaterThanToken);
        Some(self.alloc_list(parameters))
    }

    /// `<A, B>`. Returns `None` without consuming anything when the current
    /// token is not `<`.
    pub(crate) fn parse_type_arguments(&mut self) -> Option<&'a [TypeNode<'a>]> {
        if self.current_token() != SyntaxKind::LessThanToken {
            return None;
        }
        self.next_token();
        let mut arguments = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken
        ) {
            arguments.push(self.parse_type());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::GreaterThanToken);
        Some(self.alloc_list(arguments))
    }

    // ========================================================================
    // Object type members
    // ========================================================================

    /// `{ a: T; b?(): U; [k: string]: V }`, shared by interfaces and type literals.
    pub(crate) fn parse_object_type_members(&mut self) -> &'a [TypeElement<'a>] {
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            if let Some(member) = self.parse_type_member() {
                members.push(member);
            }
            if !self.optional_token(SyntaxKind::SemicolonToken) {
                self.optional_token(SyntaxKind::CommaToken);
            }
            if self.token_pos() == saved_pos {
                self.error(&messages::PROPERTY_OR_SIGNATURE_EXPECTED, &[]);
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(members)
    }

    fn parse_type_member(&mut self) -> Option<TypeElement<'a>> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                return Some(TypeElement::Call(self.parse_signature(pos)));
            }
            SyntaxKind::NewKeyword
                if matches!(
                    self.peek_token(),
                    SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
                ) =>
            {
                self.next_token();
                return Some(TypeElement::Construct(self.parse_signature(pos)));
            }
            _ => {}
        }

        let mut modifiers = ModifierFlags::NONE;
        if self.is_identifier_text("readonly")
            && self.next_token_on_same_line(|k, _| Self::is_property_name_start(k))
        {
            self.next_token();
            modifiers = ModifierFlags::READONLY;
        }

        if self.current_token() == SyntaxKind::OpenBracketToken && self.is_index_signature() {
            return Some(TypeElement::Index(self.parse_index_signature(pos, modifiers)));
        }

        if !Self::is_property_name_start(self.current_token()) {
            return None;
        }

        let kind = self.parse_accessor_kind();
        let name = self.parse_property_name();
        let optional = self.optional_token(SyntaxKind::QuestionToken);

        if kind == MethodKind::Method
            && !matches!(
                self.current_token(),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            )
        {
            let type_annotation = self.parse_type_annotation();
            return Some(TypeElement::Property(PropertySignature {
                data: self.finish_node(pos).with_modifiers(modifiers),
                name,
                optional,
                type_annotation,
            }));
        }

        let signature = self.parse_signature(pos);
        let element = match kind {
            // Accessor signatures describe a property of the accessor's type.
            MethodKind::Get => TypeElement::Property(PropertySignature {
                data: signature.data,
                name,
                optional,
                type_annotation: signature.return_type,
            }),
            MethodKind::Set => TypeElement::Property(PropertySignature {
                data: signature.data,
                name,
                optional,
                type_annotation: signature.parameters.first().and_then(|p| p.type_annotation),
            }),
            _ => TypeElement::Method(MethodSignature {
                data: signature.data.with_modifiers(modifiers),
                name,
                optional,
                type_parameters: signature.type_parameters,
                parameters: signature.parameters,
                return_type: signature.return_type,
            }),
        };
        Some(element)
    }

    fn parse_signature(&mut self, pos: u32) -> SignatureDeclaration<'a> {
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters_in_context(false, false);
        let return_type = self.parse_return_type();
        SignatureDeclaration {
            data: self.finish_node(pos),
            type_parameters,
            parameters,
            return_type,
        }
    }

    /// `[name: K]`, as opposed to a computed property name `[expr]`.
    pub(crate) fn is_index_signature(&mut self) -> bool {
        self.look_ahead(|p| {
            if !p.next_token().is_identifier_or_keyword() {
                return false;
            }
            matches!(p.next_token(), SyntaxKind::ColonToken | SyntaxKind::CommaToken)
        })
    }

    pub(crate) fn parse_index_signature(&mut self, pos: u32, modifiers: ModifierFlags) -> IndexSignature<'a> {
        self.expect_token(SyntaxKind::OpenBracketToken);
        let parameter = self.parse_identifier_name();
        self.expect_token(SyntaxKind::ColonToken);
        let key_type = self.parse_type_and_alloc();
        self.expect_token(SyntaxKind::CloseBracketToken);
        let type_annotation = match self.parse_type_annotation() {
            Some(type_node) => type_node,
            None => {
                self.error(&messages::TYPE_EXPECTED, &[]);
                let missing = self.missing_type();
                self.alloc(missing)
            }
        };
        IndexSignature {
            data: self.finish_node(pos).with_modifiers(modifiers),
            parameter,
            key_type,
            type_annotation,
        }
    }
}
