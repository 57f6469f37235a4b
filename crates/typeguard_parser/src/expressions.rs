//! Expression parsing.

use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::*;
use typeguard_diagnostics::messages;

use crate::parser::{Parser, MAX_RECURSION_DEPTH};
use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use crate::utilities::is_parameter_modifier;

/// Everything of an arrow function before its body.
struct ArrowHead<'a> {
    modifiers: ModifierFlags,
    type_parameters: Option<&'a [TypeParameter<'a>]>,
    parameters: &'a [Parameter<'a>],
    return_type: Option<&'a TypeNode<'a>>,
}

impl<'a> Parser<'a> {
    /// Placeholder for an expression that is missing from the source.
    fn missing_expression(&self) -> Expression<'a> {
        let pos = self.token_pos();
        Expression::Identifier(Identifier {
            data: NodeData::new(pos, pos),
            name: "",
        })
    }

    pub(crate) fn parse_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_expression();
        self.alloc(expr)
    }

    pub(crate) fn parse_assignment_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_assignment_expression();
        self.alloc(expr)
    }

    /// `a, b, c`
    pub(crate) fn parse_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let mut expr = self.parse_assignment_expression();
        while self.current_token() == SyntaxKind::CommaToken {
            self.next_token();
            let right = self.parse_assignment_expression_and_alloc();
            expr = Expression::Binary(BinaryExpression {
                data: self.finish_node(pos),
                left: self.alloc(expr),
                operator: SyntaxKind::CommaToken,
                right,
            });
        }
        expr
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Expression<'a> {
        self.recursion_depth += 1;
        let expr = if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]);
            self.missing_expression()
        } else {
            self.parse_assignment_expression_worker()
        };
        self.recursion_depth -= 1;
        expr
    }

    fn parse_assignment_expression_worker(&mut self) -> Expression<'a> {
        if self.in_generator_context && self.is_identifier_text("yield") {
            return self.parse_yield_expression();
        }
        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }

        let pos = self.token_pos();
        let expr = self.parse_binary_expression_or_higher(OperatorPrecedence::Lowest);

        if self.current_token().is_assignment_operator() {
            let operator = self.current_token();
            self.next_token();
            let right = self.parse_assignment_expression_and_alloc();
            return Expression::Binary(BinaryExpression {
                data: self.finish_node(pos),
                left: self.alloc(expr),
                operator,
                right,
            });
        }

        if self.current_token() == SyntaxKind::QuestionToken {
            self.next_token();
            let saved = self.disallow_in;
            self.disallow_in = false;
            let when_true = self.parse_assignment_expression_and_alloc();
            self.disallow_in = saved;
            self.expect_token(SyntaxKind::ColonToken);
            let when_false = self.parse_assignment_expression_and_alloc();
            return Expression::Conditional(ConditionalExpression {
                data: self.finish_node(pos),
                condition: self.alloc(expr),
                when_true,
                when_false,
            });
        }

        expr
    }

    fn parse_yield_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token();
        let delegate = !self.has_preceding_line_break() && self.optional_token(SyntaxKind::AsteriskToken);
        let ends_here = self.has_preceding_line_break()
            || matches!(
                self.current_token(),
                SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::EndOfFileToken
            );
        let expression = if delegate || !ends_here {
            Some(self.parse_assignment_expression_and_alloc())
        } else {
            None
        };
        Expression::Yield(YieldExpression {
            data: self.finish_node(pos),
            delegate,
            expression,
        })
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    fn try_parse_arrow_function(&mut self) -> Option<Expression<'a>> {
        match self.current_token() {
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {}
            SyntaxKind::Identifier => {
                let plain = !self.is_identifier_text("async");
                if plain && self.peek_token() != SyntaxKind::EqualsGreaterThanToken {
                    return None;
                }
            }
            _ => return None,
        }

        let pos = self.token_pos();
        let head = self.try_parse(|p| p.parse_arrow_function_head())?;
        let is_async = head.modifiers.contains(ModifierFlags::ASYNC);
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            ArrowFunctionBody::Block(self.parse_function_body(is_async, false))
        } else {
            let saved = (self.in_await_context, self.in_generator_context);
            (self.in_await_context, self.in_generator_context) = (is_async, false);
            let expr = self.parse_assignment_expression_and_alloc();
            (self.in_await_context, self.in_generator_context) = saved;
            ArrowFunctionBody::Expression(expr)
        };
        Some(Expression::Arrow(self.alloc(ArrowFunction {
            data: self.finish_node(pos).with_modifiers(head.modifiers),
            type_parameters: head.type_parameters,
            parameters: head.parameters,
            return_type: head.return_type,
            body,
        })))
    }

    /// Parameters, return type and `=>`. Fails on anything else so the
    /// caller can reparse the tokens as an ordinary expression.
    fn parse_arrow_function_head(&mut self) -> Option<ArrowHead<'a>> {
        let mut modifiers = ModifierFlags::NONE;
        if self.is_identifier_text("async")
            && self.next_token_on_same_line(|k, _| {
                matches!(
                    k,
                    SyntaxKind::Identifier | SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
                )
            })
        {
            self.next_token();
            modifiers = ModifierFlags::ASYNC;
        }
        let is_async = modifiers.contains(ModifierFlags::ASYNC);

        let (type_parameters, parameters) = if self.current_token() == SyntaxKind::Identifier {
            let id = self.parse_identifier();
            let parameter = Parameter {
                data: id.data,
                name: BindingName::Identifier(id),
                rest: false,
                optional: false,
                type_annotation: None,
                initializer: None,
            };
            (None, self.alloc_list(vec![parameter]))
        } else {
            let type_parameters = self.parse_type_parameters();
            if self.current_token() != SyntaxKind::OpenParenToken {
                return None;
            }
            (type_parameters, self.parse_parameters_in_context(is_async, false))
        };

        let return_type = self.parse_return_type();
        if self.current_token() != SyntaxKind::EqualsGreaterThanToken || self.has_preceding_line_break() {
            return None;
        }
        self.next_token();
        Some(ArrowHead {
            modifiers,
            type_parameters,
            parameters,
            return_type,
        })
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// `(a: T, b?: U, ...rest: V[])` with `await`/`yield` set for the function.
    pub(crate) fn parse_parameters_in_context(
        &mut self,
        is_async: bool,
        is_generator: bool,
    ) -> &'a [Parameter<'a>] {
        let saved = (self.in_await_context, self.in_generator_context, self.disallow_in);
        (self.in_await_context, self.in_generator_context, self.disallow_in) = (is_async, is_generator, false);

        self.expect_token(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let parameter = self.parse_parameter();
            if parameter.rest && self.current_token() == SyntaxKind::CommaToken {
                self.error(&messages::A_REST_PARAMETER_MUST_BE_LAST, &[]);
            }
            parameters.push(parameter);
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);

        (self.in_await_context, self.in_generator_context, self.disallow_in) = saved;
        self.alloc_list(parameters)
    }

    fn parse_parameter(&mut self) -> Parameter<'a> {
        let pos = self.token_pos();
        let modifiers = self.parse_member_modifiers(is_parameter_modifier);
        let rest = self.optional_token(SyntaxKind::DotDotDotToken);
        let name = if self.current_token() == SyntaxKind::ThisKeyword {
            let tpos = self.token_pos();
            self.next_token();
            BindingName::Identifier(Identifier {
                data: self.finish_node(tpos),
                name: "this",
            })
        } else {
            self.parse_binding_name()
        };
        let optional = self.optional_token(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression_and_alloc())
        } else {
            None
        };
        Parameter {
            data: self.finish_node(pos).with_modifiers(modifiers),
            name,
            rest,
            optional,
            type_annotation,
            initializer,
        }
    }

    // ========================================================================
    // Binary and unary expressions
    // ========================================================================

    fn parse_binary_expression_or_higher(&mut self, precedence: OperatorPrecedence) -> Expression<'a> {
        let pos = self.token_pos();
        let left = self.parse_unary_expression_or_higher();
        self.parse_binary_expression_rest(pos, precedence, left)
    }

    fn parse_binary_expression_rest(
        &mut self,
        pos: u32,
        precedence: OperatorPrecedence,
        mut left: Expression<'a>,
    ) -> Expression<'a> {
        loop {
            if self.current_token() == SyntaxKind::GreaterThanToken {
                self.scanner.rescan_greater_than_token();
            }

            // `x as T` and `x satisfies T` bind like relational operators.
            if (self.is_identifier_text("as") || self.is_identifier_text("satisfies"))
                && !self.has_preceding_line_break()
            {
                if OperatorPrecedence::Relational <= precedence {
                    break;
                }
                let is_satisfies = self.token_text() == "satisfies";
                self.next_token();
                let type_node = self.parse_type_and_alloc();
                let node = AsExpression {
                    data: self.finish_node(pos),
                    expression: self.alloc(left),
                    type_node,
                };
                left = if is_satisfies {
                    Expression::Satisfies(node)
                } else {
                    Expression::As(node)
                };
                continue;
            }

            let operator = self.current_token();
            let new_precedence = get_binary_operator_precedence(operator);
            if new_precedence == OperatorPrecedence::Invalid {
                break;
            }
            if operator == SyntaxKind::InKeyword && self.disallow_in {
                break;
            }
            // `**` is right-associative.
            let consume = if operator == SyntaxKind::AsteriskAsteriskToken {
                new_precedence >= precedence
            } else {
                new_precedence > precedence
            };
            if !consume {
                break;
            }
            self.next_token();
            let right = self.parse_binary_expression_or_higher(new_precedence);
            left = Expression::Binary(BinaryExpression {
                data: self.finish_node(pos),
                left: self.alloc(left),
                operator,
                right: self.alloc(right),
            });
        }
        left
    }

    fn parse_unary_expression_or_higher(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::DeleteKeyword => {
                let operator = self.current_token();
                self.next_token();
                let operand = self.parse_unary_expression_or_higher();
                Expression::PrefixUnary(PrefixUnaryExpression {
                    data: self.finish_node(pos),
                    operator,
                    operand: self.alloc(operand),
                })
            }
            SyntaxKind::LessThanToken => {
                // `<T>expr`
                self.next_token();
                let type_node = self.parse_type_and_alloc();
                self.expect_token(SyntaxKind::GreaterThanToken);
                let operand = self.parse_unary_expression_or_higher();
                Expression::TypeAssertion(TypeAssertionExpression {
                    data: self.finish_node(pos),
                    type_node,
                    expression: self.alloc(operand),
                })
            }
            SyntaxKind::Identifier if self.in_await_context && self.token_text() == "await" => {
                self.next_token();
                let operand = self.parse_unary_expression_or_higher();
                Expression::Await(UnaryOperand {
                    data: self.finish_node(pos),
                    operand: self.alloc(operand),
                })
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let expr = self.parse_left_hand_side_expression();
        if matches!(
            self.current_token(),
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
        ) && !self.has_preceding_line_break()
        {
            let operator = self.current_token();
            self.next_token();
            return Expression::PostfixUnary(PostfixUnaryExpression {
                data: self.finish_node(pos),
                operand: self.alloc(expr),
                operator,
            });
        }
        expr
    }

    // ========================================================================
    // Member access and calls
    // ========================================================================

    pub(crate) fn parse_left_hand_side_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let expr = match self.current_token() {
            SyntaxKind::ImportKeyword => {
                self.next_token();
                if self.optional_token(SyntaxKind::DotToken) {
                    let name = self.parse_identifier_name();
                    Expression::MetaProperty(MetaPropertyExpression {
                        data: self.finish_node(pos),
                        keyword: SyntaxKind::ImportKeyword,
                        name,
                    })
                } else {
                    // Dynamic `import(...)` is called like a function.
                    Expression::Identifier(Identifier {
                        data: self.finish_node(pos),
                        name: "import",
                    })
                }
            }
            SyntaxKind::SuperKeyword => {
                self.next_token();
                Expression::Super(self.finish_node(pos))
            }
            _ => self.parse_member_expression_or_higher(),
        };
        self.parse_member_and_call_rest(pos, expr, true)
    }

    fn parse_member_expression_or_higher(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let expr = self.parse_primary_expression();
        self.parse_member_and_call_rest(pos, expr, false)
    }

    /// Property access, element access, `!`, tagged templates and, when
    /// `allow_call` is set, calls.
    fn parse_member_and_call_rest(&mut self, pos: u32, mut expr: Expression<'a>, allow_call: bool) -> Expression<'a> {
        loop {
            expr = match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_member_name();
                    Expression::PropertyAccess(PropertyAccessExpression {
                        data: self.finish_node(pos),
                        expression: self.alloc(expr),
                        optional: false,
                        name,
                    })
                }
                SyntaxKind::QuestionDotToken => {
                    self.next_token();
                    match self.current_token() {
                        SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                            let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
                                self.parse_type_arguments()
                            } else {
                                None
                            };
                            let arguments = self.parse_arguments();
                            Expression::Call(CallExpression {
                                data: self.finish_node(pos),
                                expression: self.alloc(expr),
                                optional: true,
                                type_arguments,
                                arguments,
                            })
                        }
                        SyntaxKind::OpenBracketToken => {
                            self.next_token();
                            let argument = self.parse_bracketed_argument();
                            Expression::ElementAccess(ElementAccessExpression {
                                data: self.finish_node(pos),
                                expression: self.alloc(expr),
                                optional: true,
                                argument,
                            })
                        }
                        _ => {
                            let name = self.parse_member_name();
                            Expression::PropertyAccess(PropertyAccessExpression {
                                data: self.finish_node(pos),
                                expression: self.alloc(expr),
                                optional: true,
                                name,
                            })
                        }
                    }
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let argument = self.parse_bracketed_argument();
                    Expression::ElementAccess(ElementAccessExpression {
                        data: self.finish_node(pos),
                        expression: self.alloc(expr),
                        optional: false,
                        argument,
                    })
                }
                SyntaxKind::ExclamationToken if !self.has_preceding_line_break() => {
                    self.next_token();
                    Expression::NonNull(UnaryOperand {
                        data: self.finish_node(pos),
                        operand: self.alloc(expr),
                    })
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    let template = self.parse_template_expression();
                    Expression::TaggedTemplate(TaggedTemplateExpression {
                        data: self.finish_node(pos),
                        tag: self.alloc(expr),
                        type_arguments: None,
                        template: self.alloc(template),
                    })
                }
                SyntaxKind::OpenParenToken if allow_call => {
                    let arguments = self.parse_arguments();
                    Expression::Call(CallExpression {
                        data: self.finish_node(pos),
                        expression: self.alloc(expr),
                        optional: false,
                        type_arguments: None,
                        arguments,
                    })
                }
                SyntaxKind::LessThanToken if allow_call => {
                    let Some(type_arguments) = self.try_parse(|p| p.parse_type_arguments_in_expression()) else {
                        break;
                    };
                    if self.current_token() == SyntaxKind::OpenParenToken {
                        let arguments = self.parse_arguments();
                        Expression::Call(CallExpression {
                            data: self.finish_node(pos),
                            expression: self.alloc(expr),
                            optional: false,
                            type_arguments: Some(type_arguments),
                            arguments,
                        })
                    } else {
                        let template = self.parse_template_expression();
                        Expression::TaggedTemplate(TaggedTemplateExpression {
                            data: self.finish_node(pos),
                            tag: self.alloc(expr),
                            type_arguments: Some(type_arguments),
                            template: self.alloc(template),
                        })
                    }
                }
                _ => break,
            };
        }
        expr
    }

    /// `<T, U>` followed by `(` or a template. Anything else means the `<`
    /// was a comparison.
    fn parse_type_arguments_in_expression(&mut self) -> Option<&'a [TypeNode<'a>]> {
        let type_arguments = self.parse_type_arguments()?;
        match self.current_token() {
            SyntaxKind::OpenParenToken
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateHead => Some(type_arguments),
            _ => None,
        }
    }

    fn parse_member_name(&mut self) -> Identifier<'a> {
        if self.current_token() == SyntaxKind::PrivateIdentifier {
            let pos = self.token_pos();
            let name = self.token_text();
            self.next_token();
            return Identifier {
                data: self.finish_node(pos),
                name,
            };
        }
        self.parse_identifier_name()
    }

    fn parse_bracketed_argument(&mut self) -> &'a Expression<'a> {
        let saved = self.disallow_in;
        self.disallow_in = false;
        let argument = self.parse_expression_and_alloc();
        self.disallow_in = saved;
        self.expect_token(SyntaxKind::CloseBracketToken);
        argument
    }

    pub(crate) fn parse_arguments(&mut self) -> &'a [Expression<'a>] {
        let saved = self.disallow_in;
        self.disallow_in = false;
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            arguments.push(self.parse_spread_or_assignment_expression());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        self.disallow_in = saved;
        self.alloc_list(arguments)
    }

    fn parse_spread_or_assignment_expression(&mut self) -> Expression<'a> {
        if self.current_token() == SyntaxKind::DotDotDotToken {
            let pos = self.token_pos();
            self.next_token();
            let operand = self.parse_assignment_expression_and_alloc();
            return Expression::Spread(UnaryOperand {
                data: self.finish_node(pos),
                operand,
            });
        }
        self.parse_assignment_expression()
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::NumericLiteral => Expression::NumericLiteral(self.parse_numeric_literal()),
            SyntaxKind::BigIntLiteral => {
                let raw = self.token_text();
                self.next_token();
                Expression::BigIntLiteral(RawLiteral {
                    data: self.finish_node(pos),
                    raw,
                })
            }
            SyntaxKind::StringLiteral => Expression::StringLiteral(self.parse_string_literal()),
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                self.parse_template_expression()
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.scanner.rescan_slash_token();
                let raw = self.token_text();
                self.next_token();
                Expression::RegularExpressionLiteral(RawLiteral {
                    data: self.finish_node(pos),
                    raw,
                })
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let saved = self.disallow_in;
                self.disallow_in = false;
                let expression = self.parse_expression_and_alloc();
                self.disallow_in = saved;
                self.expect_token(SyntaxKind::CloseParenToken);
                Expression::Parenthesized(ParenthesizedExpression {
                    data: self.finish_node(pos),
                    expression,
                })
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(pos, ModifierFlags::NONE),
            SyntaxKind::ClassKeyword => {
                let class = self.parse_class_like(pos, ModifierFlags::NONE);
                Expression::Class(self.alloc(class))
            }
            SyntaxKind::NewKeyword => self.parse_new_expression(),
            SyntaxKind::ThisKeyword => {
                self.next_token();
                Expression::This(self.finish_node(pos))
            }
            SyntaxKind::NullKeyword => {
                self.next_token();
                Expression::Null(self.finish_node(pos))
            }
            SyntaxKind::TrueKeyword => {
                self.next_token();
                Expression::True(self.finish_node(pos))
            }
            SyntaxKind::FalseKeyword => {
                self.next_token();
                Expression::False(self.finish_node(pos))
            }
            SyntaxKind::Identifier
                if self.token_text() == "async"
                    && self.next_token_on_same_line(|k, _| k == SyntaxKind::FunctionKeyword) =>
            {
                self.next_token();
                self.parse_function_expression(pos, ModifierFlags::ASYNC)
            }
            SyntaxKind::Identifier => Expression::Identifier(self.parse_identifier()),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                self.missing_expression()
            }
        }
    }

    fn parse_function_expression(&mut self, pos: u32, modifiers: ModifierFlags) -> Expression<'a> {
        let function = self.parse_function_like(pos, modifiers, false);
        Expression::Function(self.alloc(function))
    }

    fn parse_new_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token();
        if self.optional_token(SyntaxKind::DotToken) {
            let name = self.parse_identifier_name();
            return Expression::MetaProperty(MetaPropertyExpression {
                data: self.finish_node(pos),
                keyword: SyntaxKind::NewKeyword,
                name,
            });
        }
        let callee = self.parse_member_expression_or_higher();
        let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
            self.try_parse(|p| p.parse_type_arguments())
        } else {
            None
        };
        let arguments = if self.current_token() == SyntaxKind::OpenParenToken {
            Some(self.parse_arguments())
        } else {
            None
        };
        Expression::New(NewExpression {
            data: self.finish_node(pos),
            expression: self.alloc(callee),
            type_arguments,
            arguments,
        })
    }

    fn parse_template_part(&mut self) -> TemplatePart<'a> {
        let cooked: &'a str = self.arena.alloc_str(self.scanner.token_value());
        TemplatePart {
            cooked,
            raw: self.scanner.token_raw(),
        }
    }

    /// A template literal, starting at its first piece.
    pub(crate) fn parse_template_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::NoSubstitutionTemplateLiteral {
            let part = self.parse_template_part();
            self.next_token();
            return Expression::NoSubstitutionTemplateLiteral(TemplateLiteral {
                data: self.finish_node(pos),
                cooked: part.cooked,
                raw: part.raw,
            });
        }

        let head = self.parse_template_part();
        self.next_token();
        let mut spans = Vec::new();
        loop {
            let saved = self.disallow_in;
            self.disallow_in = false;
            let expression = self.parse_expression_and_alloc();
            self.disallow_in = saved;
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.error(&messages::_0_EXPECTED, &["}"]);
                spans.push(TemplateSpan {
                    expression,
                    literal: TemplatePart { cooked: "", raw: "" },
                });
                break;
            }
            let kind = self.scanner.rescan_template_token();
            let literal = self.parse_template_part();
            self.next_token();
            spans.push(TemplateSpan { expression, literal });
            if kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        Expression::Template(TemplateExpression {
            data: self.finish_node(pos),
            head,
            spans: self.alloc_list(spans),
        })
    }

    fn parse_array_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next_token();
        let saved = self.disallow_in;
        self.disallow_in = false;
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            if self.current_token() == SyntaxKind::CommaToken {
                let hole = self.token_pos();
                elements.push(Expression::Omitted(NodeData::new(hole, hole)));
            } else {
                elements.push(self.parse_spread_or_assignment_expression());
            }
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.disallow_in = saved;
        self.expect_token(SyntaxKind::CloseBracketToken);
        Expression::ArrayLiteral(ArrayLiteralExpression {
            data: self.finish_node(pos),
            elements: self.alloc_list(elements),
        })
    }

    pub(crate) fn parse_object_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let saved = self.disallow_in;
        self.disallow_in = false;
        let mut properties = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            properties.push(self.parse_object_literal_element());
            if !self.optional_token(SyntaxKind::CommaToken) || self.token_pos() == saved_pos {
                break;
            }
        }
        self.disallow_in = saved;
        self.expect_token(SyntaxKind::CloseBraceToken);
        Expression::ObjectLiteral(ObjectLiteralExpression {
            data: self.finish_node(pos),
            properties: self.alloc_list(properties),
        })
    }

    fn parse_object_literal_element(&mut self) -> ObjectLiteralElement<'a> {
        let pos = self.token_pos();
        if self.optional_token(SyntaxKind::DotDotDotToken) {
            let operand = self.parse_assignment_expression_and_alloc();
            return ObjectLiteralElement::Spread(UnaryOperand {
                data: self.finish_node(pos),
                operand,
            });
        }

        let mut modifiers = ModifierFlags::NONE;
        if self.is_identifier_text("async")
            && self.next_token_on_same_line(|k, _| k == SyntaxKind::AsteriskToken || Self::is_property_name_start(k))
        {
            self.next_token();
            modifiers = ModifierFlags::ASYNC;
        }
        let asterisk = self.optional_token(SyntaxKind::AsteriskToken);
        let kind = self.parse_accessor_kind();
        let name = self.parse_property_name();
        let optional = self.optional_token(SyntaxKind::QuestionToken);

        if asterisk
            || kind != MethodKind::Method
            || !modifiers.is_empty()
            || matches!(
                self.current_token(),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            )
        {
            let method = self.parse_method_rest(pos, modifiers, kind, name, optional, asterisk);
            return ObjectLiteralElement::Method(self.alloc(method));
        }

        if self.optional_token(SyntaxKind::ColonToken) {
            let initializer = self.parse_assignment_expression_and_alloc();
            return ObjectLiteralElement::Property(PropertyAssignment {
                data: self.finish_node(pos),
                name,
                initializer,
            });
        }

        match name {
            PropertyName::Identifier(id) => {
                let default = if self.optional_token(SyntaxKind::EqualsToken) {
                    Some(self.parse_assignment_expression_and_alloc())
                } else {
                    None
                };
                ObjectLiteralElement::Shorthand(ShorthandPropertyAssignment {
                    data: self.finish_node(pos),
                    name: id,
                    default,
                })
            }
            _ => {
                self.error(&messages::_0_EXPECTED, &[":"]);
                let initializer = self.alloc(self.missing_expression());
                ObjectLiteralElement::Property(PropertyAssignment {
                    data: self.finish_node(pos),
                    name,
                    initializer,
                })
            }
        }
    }
}
