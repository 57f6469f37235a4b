//! Guard execution over [`Value`]s.
//!
//! Runs a guard the way its rendered JavaScript would run, collecting the
//! reports instead of calling `__tg_report`. Guards and the structural
//! matcher are tested against each other through this module.

use crate::guard::*;
use rustc_hash::FxHashMap;
use std::fmt;
use typeguard_ast::factory::format_number;
use typeguard_checker::{matches, Value};
use typeguard_types::template::pattern_matches;

/// One `__tg_report` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub path: String,
    pub expected: String,
    /// The offending value as the prelude prints it.
    pub actual: String,
    /// Set for a missing required property.
    pub missing: Option<String>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.missing {
            Some(property) => write!(
                f,
                "{}: missing required property '{}' of type {}",
                self.path, property, self.expected
            ),
            None => write!(
                f,
                "{}: type mismatch, expected {} but got {}",
                self.path, self.expected, self.actual
            ),
        }
    }
}

/// Run `guard` with its target bound to `value`.
pub fn run(guard: &Guard, value: &Value, table: &DescriptorTable) -> Vec<Report> {
    run_with(guard, value, &[], table)
}

/// Run `guard` with its target bound to `value` and `scope` visible, as
/// the temporaries of earlier guards in the same function are.
pub fn run_with(guard: &Guard, value: &Value, scope: &[(&str, Value)], table: &DescriptorTable) -> Vec<Report> {
    let mut env = Env {
        vars: FxHashMap::default(),
        table,
        reports: Vec::new(),
    };
    for (name, bound) in scope {
        env.vars.insert(name.to_string(), bound.clone());
    }
    env.vars.insert(guard.target.clone(), value.clone());
    env.run_nodes(&guard.nodes);
    env.reports
}

struct Env<'t> {
    vars: FxHashMap<String, Value>,
    table: &'t DescriptorTable,
    reports: Vec<Report>,
}

impl Env<'_> {
    fn get(&self, var: &str) -> Value {
        self.vars.get(var).cloned().unwrap_or(Value::Undefined)
    }

    fn run_nodes(&mut self, nodes: &[GuardNode]) {
        for node in nodes {
            self.run_node(node);
        }
    }

    fn run_node(&mut self, node: &GuardNode) {
        match node {
            GuardNode::Check { var, test, path, expected, then } => {
                let value = self.get(var);
                if self.test(&value, test) {
                    self.run_nodes(then);
                } else {
                    self.reports.push(Report {
                        path: self.path(path),
                        expected: expected.clone(),
                        actual: value.to_string(),
                        missing: None,
                    });
                }
            }
            GuardNode::When { var, test, then } => {
                if self.test(&self.get(var), test) {
                    self.run_nodes(then);
                }
            }
            GuardNode::Unseen { var, seen, then } => {
                let value = self.get(var);
                if !seen.iter().any(|other| same_value(&value, &self.get(other))) {
                    self.run_nodes(then);
                }
            }
            GuardNode::Bind { name, var, access, then } => {
                let parent = self.get(var);
                let bound = match access {
                    Access::Key(key) => read_key(&parent, key),
                    Access::Index(i) => read_index(&parent, Some(*i)),
                    Access::Head { index, trailing } => {
                        let before = length(&parent).is_some_and(|len| len.saturating_sub(*trailing) > *index);
                        if before || matches!(parent, Value::Unknown) {
                            read_index(&parent, Some(*index))
                        } else {
                            Value::Undefined
                        }
                    }
                    Access::FromEnd(n) => read_index(&parent, length(&parent).and_then(|len| len.checked_sub(*n))),
                };
                self.vars.insert(name.clone(), bound);
                self.run_nodes(then);
            }
            GuardNode::Property { name, var, key, missing, then } => {
                let parent = self.get(var);
                let present = match &parent {
                    Value::Object(props) => props.contains_key(key),
                    Value::Unknown => true,
                    _ => false,
                };
                if present {
                    self.vars.insert(name.clone(), read_key(&parent, key));
                    self.run_nodes(then);
                } else if let Some((path, expected)) = missing {
                    self.reports.push(Report {
                        path: self.path(path),
                        expected: expected.clone(),
                        actual: parent.to_string(),
                        missing: Some(key.clone()),
                    });
                }
            }
            GuardNode::Elements { var, index, element, start, trailing, then } => {
                let Value::Array(elements) = self.get(var) else {
                    return;
                };
                let end = elements.len().saturating_sub(*trailing);
                for i in *start..end {
                    self.vars.insert(index.clone(), Value::Number(i as f64));
                    self.vars.insert(element.clone(), elements[i].clone());
                    self.run_nodes(then);
                }
            }
            GuardNode::Entries { var, key, value, then } => {
                let Value::Map(entries) = self.get(var) else {
                    return;
                };
                for (k, v) in entries {
                    self.vars.insert(key.clone(), k);
                    self.vars.insert(value.clone(), v);
                    self.run_nodes(then);
                }
            }
            GuardNode::Members { var, element, then } => {
                let Value::Set(members) = self.get(var) else {
                    return;
                };
                for member in members {
                    self.vars.insert(element.clone(), member);
                    self.run_nodes(then);
                }
            }
            GuardNode::OwnKeys { var, key, value, exclude, numeric_only, then } => {
                // `Object.keys` of a map or set is empty.
                let Value::Object(props) = self.get(var) else {
                    return;
                };
                for (k, v) in props {
                    if exclude.contains(&k) || (*numeric_only && !is_canonical_number(&k)) {
                        continue;
                    }
                    self.vars.insert(key.clone(), Value::String(k));
                    self.vars.insert(value.clone(), v);
                    self.run_nodes(then);
                }
            }
        }
    }

    fn test(&self, value: &Value, test: &Test) -> bool {
        if matches!(value, Value::Unknown) {
            return true;
        }
        match test {
            Test::TypeOf(name) => value.type_of() == *name,
            Test::ObjectOrFunction => !matches!(value, Value::Null) && matches!(value.type_of(), "object" | "function"),
            Test::Undefined => matches!(value, Value::Undefined),
            Test::NotUndefined => !matches!(value, Value::Undefined),
            Test::Null => matches!(value, Value::Null),
            Test::Equals(literal) => value.strict_equals(literal),
            Test::OneOf(literals) => literals.iter().any(|l| value.strict_equals(l)),
            Test::Array => matches!(value, Value::Array(_)),
            Test::Object => matches!(value, Value::Object(_) | Value::Map(_) | Value::Set(_)),
            Test::Function => matches!(value, Value::Function),
            Test::Map => matches!(value, Value::Map(_)),
            Test::Set => matches!(value, Value::Set(_)),
            Test::Length { min, max } => match value {
                Value::Array(elements) => elements.len() >= *min && max.map_or(true, |max| elements.len() <= max),
                _ => false,
            },
            Test::Pattern(pattern) => match value {
                Value::String(s) => pattern_matches(pattern, s),
                _ => false,
            },
            Test::Never => false,
            Test::Matches(slot) => self.table.get(*slot).map_or(true, |ty| matches(value, ty)),
        }
    }

    fn path(&self, path: &Path) -> String {
        let mut out = String::new();
        for part in &path.0 {
            match part {
                PathPart::Text(text) => out.push_str(text),
                PathPart::Index(var) => {
                    out.push('[');
                    out.push_str(&plain_string(&self.get(var)));
                    out.push(']');
                }
                PathPart::Key(var) => {
                    out.push('.');
                    out.push_str(&plain_string(&self.get(var)));
                }
                PathPart::Entry(var) => {
                    out.push('[');
                    out.push_str(&self.get(var).to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

/// `String(v)` for the values a path can hold.
fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        other => other.to_string(),
    }
}

/// `Object.is`. Values carry no identity, so objects compare by content.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            (x.is_nan() && y.is_nan()) || (x == y && x.is_sign_negative() == y.is_sign_negative())
        }
        (Value::Unknown, _) | (_, Value::Unknown) => false,
        _ => a == b,
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::Array(elements) => Some(elements.len()),
        _ => None,
    }
}

fn read_key(parent: &Value, key: &str) -> Value {
    match parent {
        Value::Unknown => Value::Unknown,
        other => other.own_property(key).cloned().unwrap_or(Value::Undefined),
    }
}

fn read_index(parent: &Value, index: Option<usize>) -> Value {
    match (parent, index) {
        (Value::Unknown, _) => Value::Unknown,
        (Value::Array(elements), Some(i)) => elements.get(i).cloned().unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

fn is_canonical_number(key: &str) -> bool {
    key.parse::<f64>().map(|n| format_number(n) == key).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_compiler::CheckCompiler;
    use crate::names::NameGenerator;
    use typeguard_options::Mode;
    use typeguard_types::TypeNode;

    fn reports(ty: &TypeNode, value: &Value, path: &str) -> Vec<String> {
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        let guard = CheckCompiler::new(&mut names, &mut table, Mode::Development).compile_guard("x", ty, path, None);
        run(&guard, value, &table).iter().map(Report::to_string).collect()
    }

    #[test]
    fn test_missing_property_report() {
        let ty = TypeNode::object(vec![("id", TypeNode::number()), ("name", TypeNode::string())]);
        let value = Value::object(vec![("id", Value::Number(1.0))]);
        assert_eq!(
            reports(&ty, &value, "user"),
            vec!["user: missing required property 'name' of type string"]
        );
    }

    #[test]
    fn test_dynamic_paths() {
        let ty = TypeNode::array(TypeNode::number());
        let value = Value::Array(vec![Value::Number(1.0), Value::string("2")]);
        assert_eq!(
            reports(&ty, &value, "xs"),
            vec![r#"xs[1]: type mismatch, expected number but got "2""#]
        );
    }

    #[test]
    fn test_record_keys_in_path() {
        let ty = TypeNode::Record {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::number()),
        };
        let value = Value::object(vec![("a", Value::Number(1.0)), ("b", Value::Boolean(true))]);
        assert_eq!(
            reports(&ty, &value, "scores"),
            vec!["scores.b: type mismatch, expected number but got true"]
        );
    }

    #[test]
    fn test_unknown_passes() {
        let ty = TypeNode::object(vec![("id", TypeNode::number())]);
        assert!(reports(&ty, &Value::Unknown, "x").is_empty());
    }

    #[test]
    fn test_unseen_skips_checked_values() {
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        let inner =
            CheckCompiler::new(&mut names, &mut table, Mode::Development).compile_guard("r", &TypeNode::number(), "ret", None);
        let guard = Guard {
            target: "r".into(),
            nodes: vec![GuardNode::Unseen { var: "r".into(), seen: vec!["p".into()], then: inner.nodes }],
        };
        let oops = Value::string("oops");
        assert!(run_with(&guard, &oops, &[("p", oops.clone())], &table).is_empty());
        assert_eq!(run_with(&guard, &oops, &[("p", Value::string("other"))], &table).len(), 1);
        assert_eq!(run(&guard, &oops, &table).len(), 1);
    }

    #[test]
    fn test_same_value() {
        assert!(same_value(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
        assert!(!same_value(&Value::Number(0.0), &Value::Number(-0.0)));
        assert!(same_value(&Value::string("a"), &Value::string("a")));
        assert!(!same_value(&Value::Unknown, &Value::Unknown));
    }

    #[test]
    fn test_canonical_numbers() {
        assert!(is_canonical_number("1"));
        assert!(is_canonical_number("-2.5"));
        assert!(!is_canonical_number("01"));
        assert!(!is_canonical_number("a"));
    }
}
