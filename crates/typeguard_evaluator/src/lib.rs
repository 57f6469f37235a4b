//! typeguard_evaluator: Constant expression evaluation.
//!
//! Folds enum member initializers to their values at compile time. Only the
//! expressions an enum may use as a constant are understood; anything else
//! evaluates to `None` and the caller decides what to report.

use rustc_hash::FxHashMap;
use typeguard_ast::factory::format_number;
use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;

/// The result of evaluating a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Number(f64),
    String(String),
}

impl ConstantValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConstantValue::Number(n) => Some(*n),
            ConstantValue::String(_) => None,
        }
    }

    /// JavaScript `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            ConstantValue::Number(n) => format_number(*n),
            ConstantValue::String(s) => s.clone(),
        }
    }
}

/// One evaluated enum member. `value` is `None` when the initializer is not
/// a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberValue {
    pub name: String,
    pub value: Option<ConstantValue>,
}

/// Evaluate every member of an enum in declaration order.
///
/// A member without an initializer takes the previous numeric value plus one,
/// starting at zero. Members whose value is unknown do not advance the
/// counter. Initializers may refer to earlier members, bare or qualified with
/// the enum name.
pub fn evaluate_enum(decl: &EnumDeclaration<'_>) -> Vec<EnumMemberValue> {
    let enum_name = decl.name.name;
    let mut known: FxHashMap<String, ConstantValue> = FxHashMap::default();
    let mut next_auto: Option<f64> = Some(0.0);
    let mut out = Vec::with_capacity(decl.members.len());

    for member in decl.members.iter() {
        let name = match member.name.static_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let value = match member.initializer {
            Some(init) => {
                let mut resolve = |qualifier: Option<&str>, member: &str| match qualifier {
                    Some(q) if q != enum_name => None,
                    _ => known.get(member).cloned(),
                };
                evaluate_constant(init, &mut resolve)
            }
            None => next_auto.map(ConstantValue::Number),
        };
        match &value {
            Some(ConstantValue::Number(n)) => next_auto = Some(n + 1.0),
            Some(ConstantValue::String(_)) => next_auto = None,
            None => {}
        }
        if let Some(v) = &value {
            known.insert(name.clone(), v.clone());
        }
        out.push(EnumMemberValue { name, value });
    }
    out
}

/// Evaluate a constant expression. `resolve` looks up names: the first
/// argument is the qualifier of `E.Member`, `None` for a bare name.
pub fn evaluate_constant<F>(expr: &Expression<'_>, resolve: &mut F) -> Option<ConstantValue>
where
    F: FnMut(Option<&str>, &str) -> Option<ConstantValue>,
{
    match expr {
        Expression::NumericLiteral(n) => Some(ConstantValue::Number(n.value)),
        Expression::StringLiteral(s) => Some(ConstantValue::String(s.value.to_string())),
        Expression::NoSubstitutionTemplateLiteral(t) => Some(ConstantValue::String(t.cooked.to_string())),
        Expression::Template(t) => {
            let mut out = t.head.cooked.to_string();
            for span in t.spans.iter() {
                out.push_str(&evaluate_constant(span.expression, resolve)?.to_js_string());
                out.push_str(span.literal.cooked);
            }
            Some(ConstantValue::String(out))
        }
        Expression::Parenthesized(p) => evaluate_constant(p.expression, resolve),
        Expression::Identifier(id) => match id.name {
            "Infinity" => Some(ConstantValue::Number(f64::INFINITY)),
            "NaN" => Some(ConstantValue::Number(f64::NAN)),
            name => resolve(None, name),
        },
        Expression::PropertyAccess(p) => match p.expression {
            Expression::Identifier(q) => resolve(Some(q.name), p.name.name),
            _ => None,
        },
        Expression::ElementAccess(e) => match (e.expression, e.argument) {
            (Expression::Identifier(q), Expression::StringLiteral(key)) => resolve(Some(q.name), key.value),
            _ => None,
        },
        Expression::PrefixUnary(p) => {
            let operand = evaluate_constant(p.operand, resolve)?.as_number()?;
            match p.operator {
                SyntaxKind::PlusToken => Some(ConstantValue::Number(operand)),
                SyntaxKind::MinusToken => Some(ConstantValue::Number(-operand)),
                SyntaxKind::TildeToken => Some(ConstantValue::Number(!to_int32(operand) as f64)),
                _ => None,
            }
        }
        Expression::Binary(b) => {
            let left = evaluate_constant(b.left, resolve)?;
            let right = evaluate_constant(b.right, resolve)?;
            evaluate_binary(b.operator, left, right)
        }
        _ => None,
    }
}

fn evaluate_binary(operator: SyntaxKind, left: ConstantValue, right: ConstantValue) -> Option<ConstantValue> {
    if operator == SyntaxKind::PlusToken {
        if let (ConstantValue::Number(l), ConstantValue::Number(r)) = (&left, &right) {
            return Some(ConstantValue::Number(l + r));
        }
        let mut text = left.to_js_string();
        text.push_str(&right.to_js_string());
        return Some(ConstantValue::String(text));
    }
    let (l, r) = (left.as_number()?, right.as_number()?);
    let value = match operator {
        SyntaxKind::MinusToken => l - r,
        SyntaxKind::AsteriskToken => l * r,
        SyntaxKind::SlashToken => l / r,
        SyntaxKind::PercentToken => l % r,
        SyntaxKind::AsteriskAsteriskToken => l.powf(r),
        SyntaxKind::LessThanLessThanToken => to_int32(l).wrapping_shl(shift_count(r)) as f64,
        SyntaxKind::GreaterThanGreaterThanToken => to_int32(l).wrapping_shr(shift_count(r)) as f64,
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => {
            (to_int32(l) as u32).wrapping_shr(shift_count(r)) as f64
        }
        SyntaxKind::AmpersandToken => (to_int32(l) & to_int32(r)) as f64,
        SyntaxKind::BarToken => (to_int32(l) | to_int32(r)) as f64,
        SyntaxKind::CaretToken => (to_int32(l) ^ to_int32(r)) as f64,
        _ => return None,
    };
    Some(ConstantValue::Number(value))
}

/// JavaScript `ToInt32`.
fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let modulo = value.trunc().rem_euclid(4_294_967_296.0);
    modulo as u32 as i32
}

fn shift_count(value: f64) -> u32 {
    (to_int32(value) as u32) & 31
}
