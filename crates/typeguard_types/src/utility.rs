//! Built-in generic types and utility-type expansion.
//!
//! Arguments are already-translated TypeNodes. A utility whose arguments are
//! not concrete enough to expand stays a generic application, which checks
//! nothing.

use crate::model::*;

/// Expand an application of a built-in generic or utility type. Returns
/// `None` if `name` is not one.
pub fn apply(name: &str, args: &[TypeNode]) -> Option<TypeNode> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(TypeNode::Unknown);
    let generic = || TypeNode::Generic { name: name.to_string(), args: args.to_vec() };

    let ty = match name {
        "Array" => TypeNode::Array(Box::new(arg(0))),
        "ReadonlyArray" => TypeNode::ReadonlyArray(Box::new(arg(0))),
        "Map" | "ReadonlyMap" | "WeakMap" => TypeNode::Map {
            key: Box::new(arg(0)),
            value: Box::new(arg(1)),
        },
        "Set" | "ReadonlySet" | "WeakSet" => TypeNode::Set(Box::new(arg(0))),
        "Record" => record(arg(0), arg(1)),
        "Partial" => map_shape(&arg(0), |shape| {
            for ty in shape.properties.values_mut() {
                *ty = TypeNode::optional(std::mem::replace(ty, TypeNode::Unknown));
            }
        })
        .unwrap_or_else(generic),
        "Required" => map_shape(&arg(0), |shape| {
            for ty in shape.properties.values_mut() {
                *ty = ty.strip_optional().clone();
            }
        })
        .unwrap_or_else(generic),
        "Readonly" => match arg(0) {
            TypeNode::Array(element) => TypeNode::ReadonlyArray(element),
            other => map_shape(&other, |shape| {
                let names: Vec<String> = shape.properties.keys().cloned().collect();
                shape.readonly.extend(names);
            })
            .unwrap_or_else(generic),
        },
        "Pick" | "Omit" => {
            let keep = name == "Pick";
            match (arg(0), arg(1).literal_keys()) {
                (TypeNode::Object(shape), Some(keys)) => {
                    let keys: Vec<String> = keys.iter().filter_map(LiteralValue::as_property_key).collect();
                    let mut picked = shape.clone();
                    picked.properties.retain(|k, _| keys.contains(k) == keep);
                    picked.readonly.retain(|k| picked.properties.contains_key(k));
                    if keep {
                        picked.index = None;
                    }
                    TypeNode::Object(picked)
                }
                _ => generic(),
            }
        }
        "NonNullable" => {
            let t = arg(0);
            if t.is_permissive() {
                generic()
            } else {
                TypeNode::union(
                    t.strip_optional()
                        .members()
                        .iter()
                        .filter(|m| !is_nullish(m))
                        .cloned()
                        .collect(),
                )
            }
        }
        "Exclude" | "Extract" => {
            let (t, u) = (arg(0), arg(1));
            if t.is_permissive() || u.is_permissive() {
                generic()
            } else {
                let extract = name == "Extract";
                TypeNode::union(
                    t.members()
                        .iter()
                        .filter(|m| is_assignable(m, &u) == extract)
                        .cloned()
                        .collect(),
                )
            }
        }
        "ReturnType" => match signature_of(&arg(0)) {
            Some(function) => (*function.returns).clone(),
            None => generic(),
        },
        "Parameters" => match signature_of(&arg(0)) {
            Some(function) => parameters_tuple(&function.params),
            None => generic(),
        },
        "Awaited" => awaited(arg(0)),
        _ => return None,
    };
    Some(ty)
}

fn map_shape(ty: &TypeNode, f: impl FnOnce(&mut ObjectShape)) -> Option<TypeNode> {
    match ty {
        TypeNode::Object(shape) => {
            let mut shape = shape.clone();
            f(&mut shape);
            Some(TypeNode::Object(shape))
        }
        _ => None,
    }
}

/// `Record<K, V>`: an object with exactly the keys of `K` when `K` is a
/// finite set of literals.
pub fn record(key: TypeNode, value: TypeNode) -> TypeNode {
    match key.literal_keys() {
        Some(keys) => {
            let mut shape = ObjectShape::new();
            for key in keys.iter().filter_map(LiteralValue::as_property_key) {
                shape.properties.insert(key, value.clone());
            }
            TypeNode::Object(shape)
        }
        None => TypeNode::Record { key: Box::new(key), value: Box::new(value) },
    }
}

fn signature_of(ty: &TypeNode) -> Option<&FunctionType> {
    match ty {
        TypeNode::Function(function) => Some(function),
        TypeNode::Object(shape) => shape.call.as_deref(),
        _ => None,
    }
}

fn parameters_tuple(params: &[FunctionParam]) -> TypeNode {
    TypeNode::Tuple(
        params
            .iter()
            .map(|p| TupleMember {
                ty: if p.rest {
                    match &p.ty {
                        TypeNode::Array(element) | TypeNode::ReadonlyArray(element) => (**element).clone(),
                        _ => TypeNode::Unknown,
                    }
                } else {
                    p.ty.strip_optional().clone()
                },
                optional: p.optional,
                rest: p.rest,
                label: Some(p.name.clone()),
            })
            .collect(),
    )
}

fn awaited(ty: TypeNode) -> TypeNode {
    match ty {
        TypeNode::Generic { name, mut args } if name == "Promise" || name == "PromiseLike" => {
            awaited(args.pop().unwrap_or(TypeNode::Unknown))
        }
        TypeNode::Union(types) => TypeNode::union(types.into_iter().map(awaited).collect()),
        other => other,
    }
}

fn is_nullish(ty: &TypeNode) -> bool {
    matches!(
        ty,
        TypeNode::Primitive(Primitive::Null) | TypeNode::Primitive(Primitive::Undefined)
    )
}

/// A conservative "every value of `a` is a value of `b`", for filtering
/// union members.
pub fn is_assignable(a: &TypeNode, b: &TypeNode) -> bool {
    if a == b || b.is_permissive() {
        return true;
    }
    match (a, b) {
        (TypeNode::Union(types), _) => types.iter().all(|t| is_assignable(t, b)),
        (_, TypeNode::Union(types)) => types.iter().any(|t| is_assignable(a, t)),
        (TypeNode::Literal(value), TypeNode::Primitive(p)) => matches!(
            (value, p),
            (LiteralValue::String(_), Primitive::String)
                | (LiteralValue::Number(_), Primitive::Number)
                | (LiteralValue::Boolean(_), Primitive::Boolean)
                | (LiteralValue::BigInt(_), Primitive::BigInt)
        ),
        (TypeNode::TemplateLiteral { .. }, TypeNode::Primitive(Primitive::String)) => true,
        (TypeNode::Literal(value), TypeNode::EnumRef { values, .. }) => values.contains(value),
        (TypeNode::EnumRef { values, .. }, _) => values
            .iter()
            .all(|v| is_assignable(&TypeNode::Literal(v.clone()), b)),
        (
            TypeNode::Object(_)
            | TypeNode::Array(_)
            | TypeNode::ReadonlyArray(_)
            | TypeNode::Tuple(_)
            | TypeNode::Map { .. }
            | TypeNode::Set(_)
            | TypeNode::Record { .. }
            | TypeNode::Function(_),
            TypeNode::Primitive(Primitive::Object),
        ) => true,
        (TypeNode::Function(_), TypeNode::Function(_)) => true,
        _ => false,
    }
}

/// `keyof T`.
pub fn keyof(ty: &TypeNode) -> TypeNode {
    match ty {
        TypeNode::Object(shape) => {
            let mut keys: Vec<TypeNode> = shape
                .properties
                .keys()
                .map(|k| TypeNode::string_literal(k))
                .collect();
            if let Some(index) = &shape.index {
                keys.push((*index.key).clone());
            }
            TypeNode::union(keys)
        }
        TypeNode::Record { key, .. } => (**key).clone(),
        _ => TypeNode::Unknown,
    }
}

/// `T[K]`.
pub fn indexed_access(object: &TypeNode, index: &TypeNode) -> TypeNode {
    match object {
        TypeNode::Object(shape) => {
            if let Some(keys) = index.literal_keys() {
                let mut found = Vec::with_capacity(keys.len());
                for key in keys.iter().filter_map(LiteralValue::as_property_key) {
                    match shape.properties.get(&key) {
                        Some(ty) => found.push(ty.clone()),
                        None => match &shape.index {
                            Some(sig) => found.push((*sig.value).clone()),
                            None => return TypeNode::Unknown,
                        },
                    }
                }
                return TypeNode::union(found);
            }
            match (&shape.index, index) {
                (Some(sig), TypeNode::Primitive(Primitive::String | Primitive::Number)) => {
                    (*sig.value).clone()
                }
                _ => TypeNode::Unknown,
            }
        }
        TypeNode::Array(element) | TypeNode::ReadonlyArray(element) => match index {
            TypeNode::Primitive(Primitive::Number) | TypeNode::Literal(LiteralValue::Number(_)) => {
                (**element).clone()
            }
            _ => TypeNode::Unknown,
        },
        TypeNode::Tuple(members) => match index {
            TypeNode::Literal(LiteralValue::Number(n)) => {
                let position = *n as usize;
                match members.get(position) {
                    Some(member) if !member.rest && position as f64 == *n => member.ty.clone(),
                    _ => TypeNode::Unknown,
                }
            }
            TypeNode::Primitive(Primitive::Number) => {
                TypeNode::union(members.iter().map(|m| m.ty.clone()).collect())
            }
            _ => TypeNode::Unknown,
        },
        TypeNode::Record { value, .. } => (**value).clone(),
        _ => TypeNode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> TypeNode {
        TypeNode::object(vec![
            ("id", TypeNode::number()),
            ("name", TypeNode::string()),
            ("email", TypeNode::optional(TypeNode::string())),
        ])
    }

    fn keys(names: &[&str]) -> TypeNode {
        TypeNode::union(names.iter().map(|n| TypeNode::string_literal(n)).collect())
    }

    #[test]
    fn test_partial_and_required() {
        let partial = apply("Partial", &[user()]).unwrap();
        let TypeNode::Object(shape) = &partial else { panic!("expected object") };
        assert!(shape.properties.values().all(TypeNode::is_optional));

        let required = apply("Required", &[partial]).unwrap();
        let TypeNode::Object(shape) = &required else { panic!("expected object") };
        assert!(shape.properties.values().all(|t| !t.is_optional()));
    }

    #[test]
    fn test_pick_and_omit() {
        let picked = apply("Pick", &[user(), keys(&["name", "id"])]).unwrap();
        assert_eq!(picked.to_string(), "{ id: number; name: string }");
        let omitted = apply("Omit", &[user(), keys(&["email"])]).unwrap();
        assert_eq!(omitted.to_string(), "{ id: number; name: string }");
    }

    #[test]
    fn test_utility_over_generic_stays_generic() {
        let t = TypeNode::Unknown;
        assert_eq!(
            apply("Partial", &[t.clone()]),
            Some(TypeNode::Generic { name: "Partial".into(), args: vec![t] })
        );
        assert_eq!(apply("Promise", &[TypeNode::number()]), None);
    }

    #[test]
    fn test_record_with_literal_keys_expands() {
        let expanded = record(keys(&["a", "b"]), TypeNode::number());
        assert_eq!(expanded.to_string(), "{ a: number; b: number }");
        let open = record(TypeNode::string(), TypeNode::number());
        assert!(matches!(open, TypeNode::Record { .. }));
    }

    #[test]
    fn test_exclude_extract_non_nullable() {
        let t = TypeNode::union(vec![
            TypeNode::string_literal("a"),
            TypeNode::number_literal(1.0),
            TypeNode::Primitive(Primitive::Null),
        ]);
        assert_eq!(apply("Exclude", &[t.clone(), TypeNode::string()]).unwrap().to_string(), "1 | null");
        assert_eq!(apply("Extract", &[t.clone(), TypeNode::string()]).unwrap().to_string(), "\"a\"");
        assert_eq!(apply("NonNullable", &[t]).unwrap().to_string(), "\"a\" | 1");
    }

    #[test]
    fn test_function_utilities() {
        let f = TypeNode::Function(FunctionType {
            params: vec![FunctionParam { name: "x".into(), ty: TypeNode::number(), optional: false, rest: false }],
            returns: Box::new(TypeNode::string()),
            is_constructor: false,
        });
        assert_eq!(apply("ReturnType", &[f.clone()]), Some(TypeNode::string()));
        assert_eq!(apply("Parameters", &[f]).unwrap().to_string(), "[x: number]");
        let promised = TypeNode::Generic { name: "Promise".into(), args: vec![TypeNode::number()] };
        assert_eq!(apply("Awaited", &[promised]), Some(TypeNode::number()));
    }

    #[test]
    fn test_keyof_and_indexed_access() {
        assert_eq!(keyof(&user()).to_string(), "\"id\" | \"name\" | \"email\"");
        assert_eq!(indexed_access(&user(), &TypeNode::string_literal("id")), TypeNode::number());
        assert_eq!(
            indexed_access(&TypeNode::array(TypeNode::string()), &TypeNode::number()),
            TypeNode::string()
        );
    }
}
