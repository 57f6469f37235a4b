//! The value model shared by static analysis and guard evaluation.

use indexmap::IndexMap;
use std::fmt;
use typeguard_ast::factory::{format_number, is_identifier_name, quote_string};
use typeguard_ast::node::*;
use typeguard_ast::{MethodKind, SyntaxKind};
use typeguard_types::LiteralValue;

/// Nesting shown by [`Value`]'s `Display` before eliding with `...`.
const DISPLAY_DEPTH: usize = 2;

/// A JavaScript value, or `Unknown` for a sub-expression whose value is not
/// known before run time. `Unknown` matches every type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    /// Decimal digits.
    BigInt(String),
    String(String),
    Symbol(Option<String>),
    Array(Vec<Value>),
    /// Own enumerable properties in insertion order.
    Object(IndexMap<String, Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Function,
    Unknown,
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    pub fn object(properties: Vec<(&str, Value)>) -> Value {
        Value::Object(properties.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// JavaScript `typeof`. `Unknown` reports `"unknown"`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_) => "object",
            Value::Function => "function",
            Value::Unknown => "unknown",
        }
    }

    /// `===` against a literal type's value.
    pub fn strict_equals(&self, literal: &LiteralValue) -> bool {
        match (self, literal) {
            (Value::String(a), LiteralValue::String(b)) => a == b,
            (Value::Number(a), LiteralValue::Number(b)) => a == b,
            (Value::Boolean(a), LiteralValue::Boolean(b)) => a == b,
            (Value::BigInt(a), LiteralValue::BigInt(b)) => a == b,
            _ => false,
        }
    }

    /// Own property lookup. Only plain objects have own properties here.
    pub fn own_property(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(props) => props.get(key),
            _ => None,
        }
    }

    /// The value of a literal expression. Returns `None` unless `expr` is a
    /// literal, an object literal or an array literal; sub-expressions that
    /// are not literals become [`Value::Unknown`].
    pub fn from_literal_expression(expr: &Expression<'_>) -> Option<Value> {
        match expr {
            Expression::Parenthesized(p) => Value::from_literal_expression(p.expression),
            Expression::StringLiteral(_)
            | Expression::NumericLiteral(_)
            | Expression::BigIntLiteral(_)
            | Expression::NoSubstitutionTemplateLiteral(_)
            | Expression::True(_)
            | Expression::False(_)
            | Expression::Null(_)
            | Expression::ObjectLiteral(_)
            | Expression::ArrayLiteral(_) => Some(Value::from_expression(expr)),
            Expression::Identifier(id) if id.name == "undefined" => Some(Value::Undefined),
            Expression::PrefixUnary(p)
                if matches!(p.operator, SyntaxKind::MinusToken | SyntaxKind::PlusToken)
                    && matches!(p.operand, Expression::NumericLiteral(_) | Expression::BigIntLiteral(_)) =>
            {
                Some(Value::from_expression(expr))
            }
            _ => None,
        }
    }

    fn from_expression(expr: &Expression<'_>) -> Value {
        match expr {
            Expression::Parenthesized(p) => Value::from_expression(p.expression),
            Expression::StringLiteral(s) => Value::string(s.value),
            Expression::NoSubstitutionTemplateLiteral(t) => Value::string(t.cooked),
            Expression::NumericLiteral(n) => Value::Number(n.value),
            Expression::BigIntLiteral(b) => match LiteralValue::bigint_from_raw(b.raw) {
                LiteralValue::BigInt(digits) => Value::BigInt(digits),
                _ => Value::Unknown,
            },
            Expression::True(_) => Value::Boolean(true),
            Expression::False(_) => Value::Boolean(false),
            Expression::Null(_) => Value::Null,
            Expression::Identifier(id) if id.name == "undefined" => Value::Undefined,
            Expression::PrefixUnary(p) if p.operator == SyntaxKind::MinusToken => {
                match Value::from_expression(p.operand) {
                    Value::Number(n) => Value::Number(-n),
                    Value::BigInt(digits) => Value::BigInt(format!("-{}", digits)),
                    _ => Value::Unknown,
                }
            }
            Expression::PrefixUnary(p) if p.operator == SyntaxKind::PlusToken => {
                match Value::from_expression(p.operand) {
                    n @ Value::Number(_) => n,
                    _ => Value::Unknown,
                }
            }
            Expression::Function(_) | Expression::Arrow(_) | Expression::Class(_) => Value::Function,
            Expression::ArrayLiteral(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in array.elements.iter() {
                    match element {
                        // The length is not known.
                        Expression::Spread(_) => return Value::Unknown,
                        Expression::Omitted(_) => elements.push(Value::Undefined),
                        other => elements.push(Value::from_expression(other)),
                    }
                }
                Value::Array(elements)
            }
            Expression::ObjectLiteral(object) => {
                let mut properties = IndexMap::new();
                for property in object.properties.iter() {
                    match property {
                        ObjectLiteralElement::Property(p) => {
                            let Some(key) = static_key(&p.name) else {
                                return Value::Unknown;
                            };
                            properties.insert(key, Value::from_expression(p.initializer));
                        }
                        ObjectLiteralElement::Shorthand(s) => {
                            properties.insert(s.name.name.to_string(), Value::Unknown);
                        }
                        ObjectLiteralElement::Method(m) => {
                            let Some(key) = static_key(&m.name) else {
                                return Value::Unknown;
                            };
                            // An accessor's value is whatever the getter returns.
                            let value = match m.kind {
                                MethodKind::Get | MethodKind::Set => Value::Unknown,
                                _ => Value::Function,
                            };
                            properties.insert(key, value);
                        }
                        // The set of keys is not known.
                        ObjectLiteralElement::Spread(_) => return Value::Unknown,
                    }
                }
                Value::Object(properties)
            }
            _ => Value::Unknown,
        }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::BigInt(digits) => write!(f, "{}n", digits),
            Value::String(s) => f.write_str(&quote_string(s)),
            Value::Symbol(description) => {
                write!(f, "Symbol({})", description.as_deref().unwrap_or(""))
            }
            Value::Array(elements) => {
                if depth >= DISPLAY_DEPTH {
                    return f.write_str("[...]");
                }
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    element.write_nested(f, depth + 1)?;
                }
                f.write_str("]")
            }
            Value::Object(properties) => {
                if properties.is_empty() {
                    return f.write_str("{}");
                }
                if depth >= DISPLAY_DEPTH {
                    return f.write_str("{...}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_identifier_name(key) {
                        f.write_str(key)?;
                    } else {
                        f.write_str(&quote_string(key))?;
                    }
                    f.write_str(": ")?;
                    value.write_nested(f, depth + 1)?;
                }
                f.write_str(" }")
            }
            Value::Map(entries) => write!(f, "Map({})", entries.len()),
            Value::Set(elements) => write!(f, "Set({})", elements.len()),
            Value::Function => f.write_str("function"),
            Value::Unknown => f.write_str("unknown"),
        }
    }
}

fn static_key(name: &PropertyName<'_>) -> Option<String> {
    match name {
        PropertyName::NumericLiteral(n) => Some(format_number(n.value)),
        other => other.static_name().map(str::to_string),
    }
}

/// The same rendering as the prelude's `__tg_stringify`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Array(vec![]).type_of(), "object");
        assert_eq!(Value::Function.type_of(), "function");
        assert_eq!(Value::BigInt("1".into()).type_of(), "bigint");
    }

    #[test]
    fn test_strict_equals() {
        assert!(Value::string("up").strict_equals(&LiteralValue::String("up".into())));
        assert!(!Value::Number(1.0).strict_equals(&LiteralValue::String("1".into())));
        assert!(!Value::Number(f64::NAN).strict_equals(&LiteralValue::Number(f64::NAN)));
    }

    #[test]
    fn test_display() {
        let value = Value::object(vec![
            ("id", Value::Number(1.0)),
            ("tags", Value::Array(vec![Value::string("a"), Value::Array(vec![])])),
            ("first-name", Value::Null),
        ]);
        assert_eq!(value.to_string(), "{ id: 1, tags: [\"a\", [...]], \"first-name\": null }");
        assert_eq!(Value::BigInt("10".into()).to_string(), "10n");
        assert_eq!(Value::Map(vec![]).to_string(), "Map(0)");
    }
}
