//! The structural type matcher.
//!
//! [`matches`] is the single source of truth for type compatibility. The
//! runtime prelude mirrors these rules over serialized descriptors, and the
//! compiled guards are tested against this function.

use crate::value::Value;
use std::fmt;
use typeguard_ast::factory::{is_identifier_name, quote_string};
use typeguard_types::template::pattern_matches;
use typeguard_types::*;

/// Whether `value` is compatible with `ty`.
pub fn matches(value: &Value, ty: &TypeNode) -> bool {
    if matches!(value, Value::Unknown) {
        return true;
    }
    match ty {
        TypeNode::Primitive(p) => matches_primitive(value, *p),
        TypeNode::Literal(literal) => value.strict_equals(literal),
        TypeNode::Union(types) => types.iter().any(|t| matches(value, t)),
        TypeNode::Intersection(types) => types.iter().all(|t| matches(value, t)),
        TypeNode::Optional(inner) => matches!(value, Value::Undefined) || matches(value, inner),
        TypeNode::Array(element) | TypeNode::ReadonlyArray(element) => match value {
            Value::Array(elements) => elements.iter().all(|e| matches(e, element)),
            _ => false,
        },
        TypeNode::Tuple(members) => match value {
            Value::Array(elements) => tuple_positions(members, elements.len())
                .is_some_and(|positions| {
                    positions
                        .iter()
                        .zip(elements)
                        .all(|(member, e)| matches_member(e, member))
                }),
            _ => false,
        },
        TypeNode::Object(shape) => {
            if !is_shape_target(value, shape) {
                return false;
            }
            let declared_ok = shape.properties.iter().all(|(key, prop)| match value.own_property(key) {
                Some(v) => matches(v, prop),
                None => prop.is_optional(),
            });
            declared_ok && undeclared_keys(value, shape).all(|(_, v, index_value)| matches(v, index_value))
        }
        TypeNode::Map { key, value: value_type } => match value {
            Value::Map(entries) => entries
                .iter()
                .all(|(k, v)| matches(k, key) && matches(v, value_type)),
            _ => false,
        },
        TypeNode::Set(element) => match value {
            Value::Set(elements) => elements.iter().all(|e| matches(e, element)),
            _ => false,
        },
        TypeNode::Record { value: value_type, .. } => match value {
            Value::Object(properties) => properties.values().all(|v| matches(v, value_type)),
            Value::Map(_) | Value::Set(_) => true,
            _ => false,
        },
        TypeNode::Function(_) => matches!(value, Value::Function),
        TypeNode::EnumRef { values, .. } => values.iter().any(|v| value.strict_equals(v)),
        TypeNode::TemplateLiteral { pattern } => match value {
            Value::String(s) => pattern_matches(pattern, s),
            _ => false,
        },
        TypeNode::Generic { .. } | TypeNode::Mapped { .. } | TypeNode::Conditional | TypeNode::Unknown => true,
    }
}

fn matches_primitive(value: &Value, primitive: Primitive) -> bool {
    match primitive {
        Primitive::Any | Primitive::Unknown => true,
        Primitive::Never => false,
        Primitive::Void | Primitive::Undefined => matches!(value, Value::Undefined),
        Primitive::Null => matches!(value, Value::Null),
        Primitive::Object => !matches!(value, Value::Null) && matches!(value.type_of(), "object" | "function"),
        Primitive::String => matches!(value, Value::String(_)),
        Primitive::Number => matches!(value, Value::Number(_)),
        Primitive::Boolean => matches!(value, Value::Boolean(_)),
        Primitive::BigInt => matches!(value, Value::BigInt(_)),
        Primitive::Symbol => matches!(value, Value::Symbol(_)),
    }
}

fn matches_member(value: &Value, member: &TupleMember) -> bool {
    (member.optional && matches!(value, Value::Undefined)) || matches(value, &member.ty)
}

/// Assign a tuple member to each of `len` elements, or `None` if the length
/// is not allowed.
fn tuple_positions(members: &[TupleMember], len: usize) -> Option<Vec<&TupleMember>> {
    let rest = members.iter().position(|m| m.rest);
    let (leading, trailing) = match rest {
        Some(r) => (&members[..r], &members[r + 1..]),
        None => (members, &members[..0]),
    };
    let required = leading.iter().rposition(|m| !m.optional).map_or(0, |i| i + 1);
    let min = required + trailing.len();
    if len < min || (rest.is_none() && len > members.len()) {
        return None;
    }
    let head = len - trailing.len();
    let mut positions = Vec::with_capacity(len);
    for i in 0..head {
        match leading.get(i) {
            Some(member) => positions.push(member),
            None => positions.push(&members[rest?]),
        }
    }
    positions.extend(trailing.iter());
    Some(positions)
}

/// Object shapes accept plain objects, maps and sets; callable shapes
/// accept functions.
fn is_shape_target(value: &Value, shape: &ObjectShape) -> bool {
    if shape.is_callable() {
        matches!(value, Value::Function)
    } else {
        matches!(value, Value::Object(_) | Value::Map(_) | Value::Set(_))
    }
}

/// Own keys not declared by the shape that its index signature constrains,
/// with their values and the index value type.
fn undeclared_keys<'v>(
    value: &'v Value,
    shape: &'v ObjectShape,
) -> impl Iterator<Item = (&'v String, &'v Value, &'v TypeNode)> {
    let properties = match (value, &shape.index) {
        (Value::Object(properties), Some(_)) => Some(properties),
        _ => None,
    };
    properties
        .into_iter()
        .flat_map(|p| p.iter())
        .filter_map(move |(key, v)| {
            let index = shape.index.as_ref()?;
            if shape.properties.contains_key(key) {
                return None;
            }
            if matches!(*index.key, TypeNode::Primitive(Primitive::Number)) && !is_numeric_key(key) {
                return None;
            }
            Some((key, v, &*index.value))
        })
}

/// Canonical numeric keys: `String(Number(key)) === key`.
fn is_numeric_key(key: &str) -> bool {
    key.parse::<f64>()
        .map(|n| typeguard_ast::factory::format_number(n) == key)
        .unwrap_or(false)
}

// ============================================================================
// Explanations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MismatchKind {
    TypeMismatch { expected: String, actual: String },
    MissingProperty { property: String, expected: String },
}

/// One reason a value does not match a type.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Where the mismatch is: `user.address.zip`, `xs[2]`.
    pub path: String,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MismatchKind::TypeMismatch { expected, actual } => {
                write!(f, "{}: type mismatch, expected {} but got {}", self.path, expected, actual)
            }
            MismatchKind::MissingProperty { property, expected } => {
                write!(f, "{}: missing required property '{}' of type {}", self.path, property, expected)
            }
        }
    }
}

/// `path.key`, or `path["key"]` for keys that are not identifiers.
pub fn property_path(path: &str, key: &str) -> String {
    if is_identifier_name(key) {
        format!("{}.{}", path, key)
    } else {
        format!("{}[{}]", path, quote_string(key))
    }
}

fn type_mismatch(path: &str, ty: &TypeNode, value: &Value) -> Mismatch {
    Mismatch {
        path: path.to_string(),
        kind: MismatchKind::TypeMismatch { expected: ty.to_string(), actual: value.to_string() },
    }
}

/// Why `value` does not match `ty`. Empty exactly when [`matches`] holds.
pub fn explain(value: &Value, ty: &TypeNode, path: &str) -> Vec<Mismatch> {
    if matches(value, ty) {
        return Vec::new();
    }
    let mut out = Vec::new();
    match (ty, value) {
        (TypeNode::Optional(inner), _) => out.extend(explain(value, inner, path)),
        (TypeNode::Intersection(types), _) => {
            for t in types {
                out.extend(explain(value, t, path));
            }
        }
        (TypeNode::Array(element) | TypeNode::ReadonlyArray(element), Value::Array(elements)) => {
            for (i, e) in elements.iter().enumerate() {
                out.extend(explain(e, element, &format!("{}[{}]", path, i)));
            }
        }
        (TypeNode::Tuple(members), Value::Array(elements)) => {
            match tuple_positions(members, elements.len()) {
                Some(positions) => {
                    for (i, (member, e)) in positions.iter().zip(elements).enumerate() {
                        if !matches_member(e, member) {
                            out.extend(explain(e, &member.ty, &format!("{}[{}]", path, i)));
                        }
                    }
                }
                None => out.push(type_mismatch(path, ty, value)),
            }
        }
        (TypeNode::Object(shape), _) if is_shape_target(value, shape) => {
            for (key, prop) in &shape.properties {
                match value.own_property(key) {
                    Some(v) => out.extend(explain(v, prop, &property_path(path, key))),
                    None if !prop.is_optional() => out.push(Mismatch {
                        path: path.to_string(),
                        kind: MismatchKind::MissingProperty {
                            property: key.clone(),
                            expected: prop.to_string(),
                        },
                    }),
                    None => {}
                }
            }
            for (key, v, index_value) in undeclared_keys(value, shape) {
                out.extend(explain(v, index_value, &property_path(path, key)));
            }
        }
        (TypeNode::Record { value: value_type, .. }, Value::Object(properties)) => {
            for (key, v) in properties {
                out.extend(explain(v, value_type, &property_path(path, key)));
            }
        }
        _ => out.push(type_mismatch(path, ty, value)),
    }
    if out.is_empty() {
        out.push(type_mismatch(path, ty, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> TypeNode {
        TypeNode::object(vec![("id", TypeNode::number()), ("name", TypeNode::string())])
    }

    fn tuple(members: &[(TypeNode, bool, bool)]) -> TypeNode {
        TypeNode::Tuple(
            members
                .iter()
                .map(|(ty, optional, rest)| TupleMember {
                    ty: ty.clone(),
                    optional: *optional,
                    rest: *rest,
                    label: None,
                })
                .collect(),
        )
    }

    fn numbers(n: usize) -> Value {
        Value::Array(vec![Value::Number(1.0); n])
    }

    #[test]
    fn test_primitives() {
        assert!(matches(&Value::Number(5.0), &TypeNode::number()));
        assert!(!matches(&Value::string("25"), &TypeNode::number()));
        assert!(matches(&Value::Undefined, &TypeNode::Primitive(Primitive::Void)));
        assert!(!matches(&Value::Null, &TypeNode::Primitive(Primitive::Object)));
        assert!(matches(&Value::Function, &TypeNode::Primitive(Primitive::Object)));
        assert!(!matches(&Value::Null, &TypeNode::Primitive(Primitive::Never)));
        assert!(matches(&Value::Null, &TypeNode::Primitive(Primitive::Unknown)));
    }

    #[test]
    fn test_unknown_value_matches_everything() {
        assert!(matches(&Value::Unknown, &TypeNode::Primitive(Primitive::Never)));
    }

    #[test]
    fn test_missing_property() {
        let value = Value::object(vec![("id", Value::Number(1.0))]);
        assert!(!matches(&value, &user()));
        let mismatches = explain(&value, &user(), "user");
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].to_string(), "user: missing required property 'name' of type string");
    }

    #[test]
    fn test_extra_properties_allowed_without_index_signature() {
        let value = Value::object(vec![
            ("id", Value::Number(1.0)),
            ("name", Value::string("a")),
            ("extra", Value::Boolean(true)),
        ]);
        assert!(matches(&value, &user()));
    }

    #[test]
    fn test_index_signature_checks_undeclared_keys() {
        let mut shape = ObjectShape::new();
        shape.properties.insert("count".into(), TypeNode::number());
        shape.index = Some(IndexSignatureType {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::string()),
        });
        let ty = TypeNode::Object(shape);
        let good = Value::object(vec![("count", Value::Number(1.0)), ("a", Value::string("x"))]);
        let bad = Value::object(vec![("count", Value::Number(1.0)), ("a", Value::Number(2.0))]);
        assert!(matches(&good, &ty));
        assert!(!matches(&bad, &ty));
        assert_eq!(explain(&bad, &ty, "m")[0].path, "m.a");
    }

    #[test]
    fn test_arrays_are_not_objects_for_shapes() {
        assert!(!matches(&Value::Array(vec![]), &TypeNode::object(vec![])));
        assert!(matches(&Value::object(vec![]), &TypeNode::object(vec![])));
    }

    #[test]
    fn test_tuple_lengths() {
        let fixed = tuple(&[(TypeNode::number(), false, false), (TypeNode::number(), true, false)]);
        assert!(!matches(&numbers(0), &fixed));
        assert!(matches(&numbers(1), &fixed));
        assert!(matches(&numbers(2), &fixed));
        assert!(!matches(&numbers(3), &fixed));

        let with_rest = tuple(&[
            (TypeNode::number(), false, false),
            (TypeNode::number(), false, true),
            (TypeNode::number(), false, false),
        ]);
        assert!(!matches(&numbers(1), &with_rest));
        assert!(matches(&numbers(2), &with_rest));
        assert!(matches(&numbers(6), &with_rest));
    }

    #[test]
    fn test_tuple_rest_checks_each_element() {
        let ty = tuple(&[(TypeNode::string(), false, false), (TypeNode::number(), false, true)]);
        let good = Value::Array(vec![Value::string("a"), Value::Number(1.0), Value::Number(2.0)]);
        let bad = Value::Array(vec![Value::string("a"), Value::Number(1.0), Value::string("b")]);
        assert!(matches(&good, &ty));
        assert!(!matches(&bad, &ty));
        assert_eq!(explain(&bad, &ty, "t")[0].path, "t[2]");
    }

    #[test]
    fn test_nested_paths() {
        let ty = TypeNode::object(vec![(
            "address",
            TypeNode::object(vec![("zip", TypeNode::string())]),
        )]);
        let value = Value::object(vec![("address", Value::object(vec![("zip", Value::Number(1.0))]))]);
        let mismatches = explain(&value, &ty, "user");
        assert_eq!(mismatches.len(), 1);
        assert_eq!(
            mismatches[0].to_string(),
            "user.address.zip: type mismatch, expected string but got 1"
        );
    }

    #[test]
    fn test_union_explains_once() {
        let ty = TypeNode::union(vec![TypeNode::string_literal("up"), TypeNode::string_literal("down")]);
        let mismatches = explain(&Value::string("oops"), &ty, "dir");
        assert_eq!(mismatches.len(), 1);
    }

    #[test]
    fn test_containers() {
        let map = TypeNode::Map { key: Box::new(TypeNode::string()), value: Box::new(TypeNode::number()) };
        assert!(matches(&Value::Map(vec![(Value::string("a"), Value::Number(1.0))]), &map));
        assert!(!matches(&Value::Map(vec![(Value::Number(1.0), Value::Number(1.0))]), &map));
        assert!(!matches(&Value::object(vec![]), &map));

        let record = TypeNode::Record { key: Box::new(TypeNode::string()), value: Box::new(TypeNode::boolean()) };
        assert!(matches(&Value::object(vec![("x", Value::Boolean(true))]), &record));
        assert!(!matches(&Value::object(vec![("x", Value::Null)]), &record));
        assert!(!matches(&Value::Array(vec![]), &record));
    }

    #[test]
    fn test_enum_and_template() {
        let ty = TypeNode::EnumRef {
            name: "Color".into(),
            values: vec![LiteralValue::Number(0.0), LiteralValue::Number(1.0)],
        };
        assert!(matches(&Value::Number(1.0), &ty));
        assert!(!matches(&Value::Number(2.0), &ty));

        let template = TypeNode::TemplateLiteral { pattern: "^id-[0-9]+$".into() };
        assert!(matches(&Value::string("id-12"), &template));
        assert!(!matches(&Value::string("id-"), &template));
    }
}
