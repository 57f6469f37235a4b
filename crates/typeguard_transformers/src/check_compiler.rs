//! The check compiler: TypeNode to guard.
//!
//! Leaf types become a single test, containers become loops and property
//! reads over fresh temporaries, and anything else (unions, intersections,
//! callable shapes, structures nested deeper than the inline limit) becomes
//! one call to the runtime matcher.

use crate::guard::*;
use crate::names::NameGenerator;
use crate::render::render_guard;
use typeguard_ast::factory::{is_identifier_name, quote_string};
use typeguard_options::{Mode, DEFAULT_MAX_INLINE_DEPTH};
use typeguard_types::{Primitive, TupleMember, TypeNode};

/// `.key` or `["key"]`, appended to a diagnostic path.
pub fn key_suffix(key: &str) -> String {
    if is_identifier_name(key) {
        format!(".{}", key)
    } else {
        format!("[{}]", quote_string(key))
    }
}

pub struct CheckCompiler<'c> {
    names: &'c mut NameGenerator,
    table: &'c mut DescriptorTable,
    mode: Mode,
    max_inline_depth: u32,
}

impl<'c> CheckCompiler<'c> {
    pub fn new(names: &'c mut NameGenerator, table: &'c mut DescriptorTable, mode: Mode) -> Self {
        Self {
            names,
            table,
            mode,
            max_inline_depth: DEFAULT_MAX_INLINE_DEPTH,
        }
    }

    pub fn with_max_inline_depth(mut self, depth: u32) -> Self {
        self.max_inline_depth = depth;
        self
    }

    /// The guard checking `target` against `ty`. `label` names the expected
    /// type at the root of the path in place of its expansion.
    pub fn compile_guard(&mut self, target: &str, ty: &TypeNode, path: &str, label: Option<&str>) -> Guard {
        let nodes = if self.mode.emits_guards() {
            self.nodes(target, ty, &Path::new(path), label, 0)
        } else {
            Vec::new()
        };
        Guard {
            target: target.to_string(),
            nodes,
        }
    }

    /// The guard as JavaScript statements; empty when nothing is checked.
    pub fn compile(&mut self, target: &str, ty: &TypeNode, path: &str) -> String {
        render_guard(&self.compile_guard(target, ty, path, None))
    }

    fn nodes(&mut self, var: &str, ty: &TypeNode, path: &Path, label: Option<&str>, depth: u32) -> Vec<GuardNode> {
        let expected = || label.map_or_else(|| ty.to_string(), str::to_string);
        let check = |test: Test, then: Vec<GuardNode>| {
            vec![GuardNode::Check {
                var: var.to_string(),
                test,
                path: path.clone(),
                expected: expected(),
                then,
            }]
        };
        let inline = depth < self.max_inline_depth;

        match ty {
            TypeNode::Primitive(p) => match primitive_test(*p) {
                Some(test) => check(test, Vec::new()),
                None => Vec::new(),
            },
            TypeNode::Literal(value) => check(Test::Equals(value.clone()), Vec::new()),
            TypeNode::Optional(inner) => {
                let then = self.nodes(var, inner, path, label, depth);
                if then.is_empty() {
                    return then;
                }
                vec![GuardNode::When {
                    var: var.to_string(),
                    test: Test::NotUndefined,
                    then,
                }]
            }
            TypeNode::Union(members) | TypeNode::Intersection(members) => {
                if ty.is_permissive() || (matches!(ty, TypeNode::Union(_)) && members.iter().any(TypeNode::is_permissive)) {
                    return Vec::new();
                }
                check(Test::Matches(self.table.intern(ty)), Vec::new())
            }
            TypeNode::Array(element) | TypeNode::ReadonlyArray(element) if inline => {
                let index = self.names.next("i");
                let item = self.names.next("v");
                let inner = self.nodes(&item, element, &path.index(&index), None, depth + 1);
                let then = if inner.is_empty() {
                    Vec::new()
                } else {
                    vec![GuardNode::Elements {
                        var: var.to_string(),
                        index,
                        element: item,
                        start: 0,
                        trailing: 0,
                        then: inner,
                    }]
                };
                check(Test::Array, then)
            }
            TypeNode::Tuple(members) if inline => {
                let positions = self.tuple_positions(var, members, path, depth);
                let (min, max) = tuple_bounds(members);
                let length = GuardNode::Check {
                    var: var.to_string(),
                    test: Test::Length { min, max },
                    path: path.clone(),
                    expected: expected(),
                    then: positions,
                };
                check(Test::Array, vec![length])
            }
            TypeNode::Object(shape) if inline && !shape.is_callable() => {
                let mut then = Vec::new();
                for (key, prop) in &shape.properties {
                    let name = self.names.next("v");
                    let inner = self.nodes(&name, prop.strip_optional(), &path.text(&key_suffix(key)), None, depth + 1);
                    if prop.is_optional() {
                        if inner.is_empty() {
                            continue;
                        }
                        then.push(GuardNode::Property {
                            var: var.to_string(),
                            key: key.clone(),
                            missing: None,
                            then: vec![GuardNode::When {
                                var: name.clone(),
                                test: Test::NotUndefined,
                                then: inner,
                            }],
                            name,
                        });
                    } else {
                        then.push(GuardNode::Property {
                            name,
                            var: var.to_string(),
                            key: key.clone(),
                            missing: Some((path.clone(), prop.to_string())),
                            then: inner,
                        });
                    }
                }
                if let Some(index) = &shape.index {
                    let key = self.names.next("k");
                    let value = self.names.next("v");
                    let inner = self.nodes(&value, &index.value, &path.key(&key), None, depth + 1);
                    if !inner.is_empty() {
                        then.push(GuardNode::OwnKeys {
                            var: var.to_string(),
                            key,
                            value,
                            exclude: shape.properties.keys().cloned().collect(),
                            numeric_only: matches!(*index.key, TypeNode::Primitive(Primitive::Number)),
                            then: inner,
                        });
                    }
                }
                check(Test::Object, then)
            }
            TypeNode::Map { key, value } if inline => {
                let k = self.names.next("k");
                let v = self.names.next("v");
                let mut inner = self.nodes(&k, key, path, None, depth + 1);
                inner.extend(self.nodes(&v, value, &path.entry(&k), None, depth + 1));
                let then = if inner.is_empty() {
                    Vec::new()
                } else {
                    vec![GuardNode::Entries {
                        var: var.to_string(),
                        key: k,
                        value: v,
                        then: inner,
                    }]
                };
                check(Test::Map, then)
            }
            TypeNode::Set(element) if inline => {
                let item = self.names.next("v");
                let inner = self.nodes(&item, element, path, None, depth + 1);
                let then = if inner.is_empty() {
                    Vec::new()
                } else {
                    vec![GuardNode::Members {
                        var: var.to_string(),
                        element: item,
                        then: inner,
                    }]
                };
                check(Test::Set, then)
            }
            TypeNode::Record { value, .. } if inline => {
                let key = self.names.next("k");
                let item = self.names.next("v");
                let inner = self.nodes(&item, value, &path.key(&key), None, depth + 1);
                let then = if inner.is_empty() {
                    Vec::new()
                } else {
                    vec![GuardNode::OwnKeys {
                        var: var.to_string(),
                        key,
                        value: item,
                        exclude: Vec::new(),
                        numeric_only: false,
                        then: inner,
                    }]
                };
                check(Test::Object, then)
            }
            TypeNode::Array(_)
            | TypeNode::ReadonlyArray(_)
            | TypeNode::Tuple(_)
            | TypeNode::Object(_)
            | TypeNode::Map { .. }
            | TypeNode::Set(_)
            | TypeNode::Record { .. } => check(Test::Matches(self.table.intern(ty)), Vec::new()),
            TypeNode::Function(_) => check(Test::Function, Vec::new()),
            TypeNode::EnumRef { values, .. } => check(Test::OneOf(values.clone()), Vec::new()),
            TypeNode::TemplateLiteral { pattern } => check(Test::Pattern(pattern.clone()), Vec::new()),
            TypeNode::Generic { .. } | TypeNode::Mapped { .. } | TypeNode::Conditional | TypeNode::Unknown => {
                Vec::new()
            }
        }
    }

    fn tuple_positions(&mut self, var: &str, members: &[TupleMember], path: &Path, depth: u32) -> Vec<GuardNode> {
        let rest = members.iter().position(|m| m.rest);
        let (leading, trailing) = match rest {
            Some(r) => (&members[..r], &members[r + 1..]),
            None => (members, &members[..0]),
        };
        let mut out = Vec::new();
        for (i, member) in leading.iter().enumerate() {
            let name = self.names.next("v");
            let inner = self.member_nodes(&name, member, &path.text(&format!("[{}]", i)), depth);
            if !inner.is_empty() {
                let access = if member.optional && !trailing.is_empty() {
                    Access::Head { index: i, trailing: trailing.len() }
                } else {
                    Access::Index(i)
                };
                out.push(GuardNode::Bind {
                    name,
                    var: var.to_string(),
                    access,
                    then: inner,
                });
            }
        }
        if let Some(r) = rest {
            let index = self.names.next("i");
            let item = self.names.next("v");
            let inner = self.nodes(&item, &members[r].ty, &path.index(&index), None, depth + 1);
            if !inner.is_empty() {
                out.push(GuardNode::Elements {
                    var: var.to_string(),
                    index,
                    element: item,
                    start: leading.len(),
                    trailing: trailing.len(),
                    then: inner,
                });
            }
        }
        for (j, member) in trailing.iter().enumerate() {
            let from_end = trailing.len() - j;
            let name = self.names.next("v");
            let inner = self.member_nodes(&name, member, &path.text(&format!("[length-{}]", from_end)), depth);
            if !inner.is_empty() {
                out.push(GuardNode::Bind {
                    name,
                    var: var.to_string(),
                    access: Access::FromEnd(from_end),
                    then: inner,
                });
            }
        }
        out
    }

    fn member_nodes(&mut self, name: &str, member: &TupleMember, path: &Path, depth: u32) -> Vec<GuardNode> {
        let inner = self.nodes(name, &member.ty, path, None, depth + 1);
        if member.optional && !inner.is_empty() {
            vec![GuardNode::When {
                var: name.to_string(),
                test: Test::NotUndefined,
                then: inner,
            }]
        } else {
            inner
        }
    }
}

fn primitive_test(primitive: Primitive) -> Option<Test> {
    let test = match primitive {
        Primitive::Any | Primitive::Unknown => return None,
        Primitive::String => Test::TypeOf("string"),
        Primitive::Number => Test::TypeOf("number"),
        Primitive::Boolean => Test::TypeOf("boolean"),
        Primitive::BigInt => Test::TypeOf("bigint"),
        Primitive::Symbol => Test::TypeOf("symbol"),
        Primitive::Object => Test::ObjectOrFunction,
        Primitive::Void | Primitive::Undefined => Test::Undefined,
        Primitive::Null => Test::Null,
        Primitive::Never => Test::Never,
    };
    Some(test)
}

/// Allowed tuple lengths: positions up to the last required leading one,
/// plus everything after the rest element.
fn tuple_bounds(members: &[TupleMember]) -> (usize, Option<usize>) {
    match members.iter().position(|m| m.rest) {
        Some(r) => {
            let required = members[..r].iter().rposition(|m| !m.optional).map_or(0, |i| i + 1);
            (required + members.len() - r - 1, None)
        }
        None => {
            let required = members.iter().rposition(|m| !m.optional).map_or(0, |i| i + 1);
            (required, Some(members.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(ty: &TypeNode, mode: Mode) -> Guard {
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        CheckCompiler::new(&mut names, &mut table, mode).compile_guard("x", ty, "x", None)
    }

    #[test]
    fn test_primitive_is_one_check() {
        let guard = compile(&TypeNode::string(), Mode::Development);
        assert_eq!(guard.nodes.len(), 1);
        assert!(matches!(
            &guard.nodes[0],
            GuardNode::Check { test: Test::TypeOf("string"), then, .. } if then.is_empty()
        ));
    }

    #[test]
    fn test_permissive_types_compile_to_nothing() {
        for ty in [
            TypeNode::Primitive(Primitive::Any),
            TypeNode::Primitive(Primitive::Unknown),
            TypeNode::Unknown,
            TypeNode::Generic { name: "Date".into(), args: vec![] },
            TypeNode::union(vec![TypeNode::string(), TypeNode::Primitive(Primitive::Any)]),
        ] {
            assert!(compile(&ty, Mode::Development).is_empty(), "{ty}");
        }
    }

    #[test]
    fn test_production_compiles_nothing() {
        assert!(compile(&TypeNode::string(), Mode::Production).is_empty());
        assert!(!compile(&TypeNode::string(), Mode::Strict).is_empty());
    }

    #[test]
    fn test_union_falls_back_to_matcher() {
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        let union = TypeNode::union(vec![TypeNode::string_literal("up"), TypeNode::string_literal("down")]);
        let guard = CheckCompiler::new(&mut names, &mut table, Mode::Development)
            .compile_guard("x", &union, "dir", Some("Direction"));
        match &guard.nodes[0] {
            GuardNode::Check { test: Test::Matches(0), expected, .. } => assert_eq!(expected, "Direction"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_inline_depth_bound() {
        let nested = TypeNode::array(TypeNode::array(TypeNode::array(TypeNode::number())));
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        let guard = CheckCompiler::new(&mut names, &mut table, Mode::Development)
            .with_max_inline_depth(1)
            .compile_guard("x", &nested, "x", None);
        // The outer array is inlined, its element falls back.
        assert!(matches!(&guard.nodes[0], GuardNode::Check { test: Test::Array, .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_tuple_bounds() {
        let member = |optional, rest| TupleMember { ty: TypeNode::number(), optional, rest, label: None };
        assert_eq!(tuple_bounds(&[member(false, false), member(true, false)]), (1, Some(2)));
        assert_eq!(tuple_bounds(&[member(false, false), member(false, true), member(false, false)]), (2, None));
        assert_eq!(tuple_bounds(&[]), (0, Some(0)));
    }

    #[test]
    fn test_temporaries_are_deterministic() {
        let ty = TypeNode::object(vec![("id", TypeNode::number()), ("tags", TypeNode::array(TypeNode::string()))]);
        assert_eq!(compile(&ty, Mode::Development), compile(&ty, Mode::Development));
    }

    #[test]
    fn test_key_suffix() {
        assert_eq!(key_suffix("zip"), ".zip");
        assert_eq!(key_suffix("first-name"), "[\"first-name\"]");
    }
}
