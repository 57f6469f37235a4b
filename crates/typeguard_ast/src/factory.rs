//! Construction of synthesized nodes.
//!
//! Transforms create nodes through [`NodeFactory`] so that every generated
//! node lives in the same arena as the tree it is spliced into and carries
//! [`TextRange::SYNTHESIZED`](typeguard_core::text::TextRange::SYNTHESIZED).

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use crate::types::VariableKind;
use bumpalo::Bump;

/// Move a vector into the arena as a slice.
pub fn alloc_vec_in<T: Copy>(arena: &Bump, vec: Vec<T>) -> &[T] {
    arena.alloc_slice_copy(&vec)
}

#[derive(Clone, Copy)]
pub struct NodeFactory<'a> {
    arena: &'a Bump,
}

impl<'a> NodeFactory<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    pub fn list<T: Copy>(&self, items: Vec<T>) -> &'a [T] {
        alloc_vec_in(self.arena, items)
    }

    pub fn str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    // -- Names and literals --

    pub fn identifier(&self, name: &str) -> Identifier<'a> {
        Identifier {
            data: NodeData::synthesized(),
            name: self.str(name),
        }
    }

    pub fn identifier_expression(&self, name: &str) -> &'a Expression<'a> {
        self.alloc(Expression::Identifier(self.identifier(name)))
    }

    /// A double-quoted string literal with `value` escaped for JavaScript.
    pub fn string_literal(&self, value: &str) -> StringLiteral<'a> {
        let raw = quote_string(value);
        StringLiteral {
            data: NodeData::synthesized(),
            value: self.str(value),
            raw: self.str(&raw),
        }
    }

    pub fn numeric_literal(&self, value: f64) -> &'a Expression<'a> {
        let raw = format_number(value);
        if value < 0.0 {
            let operand = self.numeric_literal(-value);
            return self.alloc(Expression::PrefixUnary(PrefixUnaryExpression {
                data: NodeData::synthesized(),
                operator: SyntaxKind::MinusToken,
                operand,
            }));
        }
        self.alloc(Expression::NumericLiteral(NumericLiteral {
            data: NodeData::synthesized(),
            value,
            raw: self.str(&raw),
        }))
    }

    // -- Expressions --

    pub fn property_access(&self, expression: &'a Expression<'a>, name: &str) -> &'a Expression<'a> {
        self.alloc(Expression::PropertyAccess(PropertyAccessExpression {
            data: NodeData::synthesized(),
            expression,
            optional: false,
            name: self.identifier(name),
        }))
    }

    pub fn call(&self, callee: &'a Expression<'a>, arguments: Vec<Expression<'a>>) -> &'a Expression<'a> {
        self.alloc(Expression::Call(CallExpression {
            data: NodeData::synthesized(),
            expression: callee,
            optional: false,
            type_arguments: None,
            arguments: self.list(arguments),
        }))
    }

    pub fn binary(
        &self,
        left: &'a Expression<'a>,
        operator: SyntaxKind,
        right: &'a Expression<'a>,
    ) -> &'a Expression<'a> {
        self.alloc(Expression::Binary(BinaryExpression {
            data: NodeData::synthesized(),
            left,
            operator,
            right,
        }))
    }

    /// `{ key: value, ... }` with string keys quoted only when needed.
    pub fn object_literal(&self, entries: Vec<(&str, &'a Expression<'a>)>) -> &'a Expression<'a> {
        let properties = entries
            .into_iter()
            .map(|(key, initializer)| {
                let name = if is_identifier_name(key) {
                    PropertyName::Identifier(self.identifier(key))
                } else {
                    PropertyName::StringLiteral(self.string_literal(key))
                };
                ObjectLiteralElement::Property(PropertyAssignment {
                    data: NodeData::synthesized(),
                    name,
                    initializer,
                })
            })
            .collect();
        self.alloc(Expression::ObjectLiteral(ObjectLiteralExpression {
            data: NodeData::synthesized(),
            properties: self.list(properties),
        }))
    }

    // -- Statements --

    pub fn variable(
        &self,
        kind: VariableKind,
        name: &str,
        initializer: Option<&'a Expression<'a>>,
    ) -> Statement<'a> {
        self.variable_with_binding(kind, BindingName::Identifier(self.identifier(name)), initializer)
    }

    pub fn variable_with_binding(
        &self,
        kind: VariableKind,
        name: BindingName<'a>,
        initializer: Option<&'a Expression<'a>>,
    ) -> Statement<'a> {
        let declaration = VariableDeclaration {
            data: NodeData::synthesized(),
            name,
            definite: false,
            type_annotation: None,
            initializer,
        };
        Statement::Variable(VariableStatement {
            data: NodeData::synthesized(),
            kind,
            declarations: self.list(vec![declaration]),
        })
    }

    pub fn return_statement(&self, expression: Option<&'a Expression<'a>>) -> Statement<'a> {
        Statement::Return(ReturnStatement {
            data: NodeData::synthesized(),
            expression,
        })
    }

    pub fn expression_statement(&self, expression: &'a Expression<'a>) -> Statement<'a> {
        Statement::Expression(ExpressionStatement {
            data: NodeData::synthesized(),
            expression,
        })
    }

    pub fn block(&self, statements: Vec<Statement<'a>>) -> &'a Block<'a> {
        self.alloc(Block {
            data: NodeData::synthesized(),
            statements: self.list(statements),
        })
    }

    /// A statement printed exactly as given.
    pub fn verbatim(&self, text: &str) -> Statement<'a> {
        Statement::Verbatim(VerbatimStatement {
            data: NodeData::synthesized(),
            text: self.str(text),
        })
    }

    /// `this.name = name;`, the lowering of a constructor parameter property.
    pub fn this_assignment(&self, name: &str) -> Statement<'a> {
        let this = self.alloc(Expression::This(NodeData::synthesized()));
        let target = self.property_access(this, name);
        let value = self.identifier_expression(name);
        self.expression_statement(self.binary(target, SyntaxKind::EqualsToken, value))
    }
}

/// Quote a string as a JavaScript double-quoted literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Format a number the way JavaScript's `String(n)` does for the common cases.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == value.trunc() && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Whether `text` can be written as a bare property name.
pub fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}
