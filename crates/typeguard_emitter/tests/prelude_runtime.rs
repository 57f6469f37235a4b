//! Runs the emitted prelude and rendered guards under Node.js and compares
//! their verdicts with the structural matcher.
//!
//! Skipped when no `node` binary is on the PATH.

use std::io::Write;
use std::process::{Command, Stdio};
use typeguard_checker::{matches, Value};
use typeguard_emitter::{prelude, types_table};
use typeguard_options::Mode;
use typeguard_transformers::{render_guard, CheckCompiler, DescriptorTable, NameGenerator};
use typeguard_types::{IndexSignatureType, LiteralValue, Primitive, TupleMember, TypeNode};

fn member(ty: TypeNode, optional: bool, rest: bool) -> TupleMember {
    TupleMember {
        ty,
        optional,
        rest,
        label: None,
    }
}

fn types() -> Vec<TypeNode> {
    let mut indexed = TypeNode::object(vec![("id", TypeNode::number())]);
    if let TypeNode::Object(shape) = &mut indexed {
        shape.index = Some(IndexSignatureType {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::number()),
        });
    }
    vec![
        TypeNode::string(),
        TypeNode::number(),
        TypeNode::Primitive(Primitive::Null),
        TypeNode::Primitive(Primitive::Undefined),
        TypeNode::Primitive(Primitive::Object),
        TypeNode::Primitive(Primitive::Any),
        TypeNode::string_literal("up"),
        TypeNode::Literal(LiteralValue::BigInt("10".to_string())),
        TypeNode::optional(TypeNode::number()),
        TypeNode::union(vec![TypeNode::string(), TypeNode::number()]),
        TypeNode::union(vec![TypeNode::array(TypeNode::number()), TypeNode::string()]),
        TypeNode::Intersection(vec![
            TypeNode::object(vec![("id", TypeNode::number())]),
            TypeNode::object(vec![("name", TypeNode::string())]),
        ]),
        TypeNode::array(TypeNode::number()),
        TypeNode::array(TypeNode::optional(TypeNode::number())),
        TypeNode::Tuple(vec![member(TypeNode::string(), false, false), member(TypeNode::number(), true, false)]),
        TypeNode::Tuple(vec![
            member(TypeNode::string(), false, false),
            member(TypeNode::boolean(), false, true),
        ]),
        TypeNode::object(vec![("id", TypeNode::number()), ("name", TypeNode::string())]),
        TypeNode::object(vec![("id", TypeNode::number()), ("tag", TypeNode::optional(TypeNode::string()))]),
        TypeNode::object(vec![(
            "inner",
            TypeNode::object(vec![("deep", TypeNode::array(TypeNode::number()))]),
        )]),
        indexed,
        TypeNode::Map {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::number()),
        },
        TypeNode::Set(Box::new(TypeNode::number())),
        TypeNode::Record {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::boolean()),
        },
        TypeNode::EnumRef {
            name: "Direction".to_string(),
            values: vec![LiteralValue::String("UP".to_string()), LiteralValue::Number(1.0)],
        },
        TypeNode::TemplateLiteral {
            pattern: "^id-.*$".to_string(),
        },
    ]
}

/// Each value as JavaScript source, paired with its model. A hole in an
/// array literal reads as `undefined`.
fn values() -> Vec<(&'static str, Value)> {
    let n = Value::Number;
    vec![
        ("undefined", Value::Undefined),
        ("null", Value::Null),
        ("true", Value::Boolean(true)),
        ("1", n(1.0)),
        ("\"up\"", Value::string("up")),
        ("\"UP\"", Value::string("UP")),
        ("\"id-7\"", Value::string("id-7")),
        ("10n", Value::BigInt("10".to_string())),
        ("function () {}", Value::Function),
        ("[]", Value::Array(vec![])),
        ("[1, 2]", Value::Array(vec![n(1.0), n(2.0)])),
        ("[1, , 3]", Value::Array(vec![n(1.0), Value::Undefined, n(3.0)])),
        ("[, ]", Value::Array(vec![Value::Undefined])),
        ("[\"a\", 2]", Value::Array(vec![Value::string("a"), n(2.0)])),
        ("[\"a\"]", Value::Array(vec![Value::string("a")])),
        (
            "[\"a\", true, , false]",
            Value::Array(vec![Value::string("a"), Value::Boolean(true), Value::Undefined, Value::Boolean(false)]),
        ),
        ("{}", Value::object(vec![])),
        ("{ id: 1 }", Value::object(vec![("id", n(1.0))])),
        ("{ id: 1, name: \"Ann\" }", Value::object(vec![("id", n(1.0)), ("name", Value::string("Ann"))])),
        ("{ id: \"1\", name: \"Ann\" }", Value::object(vec![("id", Value::string("1")), ("name", Value::string("Ann"))])),
        ("{ id: 1, tag: undefined }", Value::object(vec![("id", n(1.0)), ("tag", Value::Undefined)])),
        ("{ id: 1, tag: 3 }", Value::object(vec![("id", n(1.0)), ("tag", n(3.0))])),
        ("{ id: 1, extra: true }", Value::object(vec![("id", n(1.0)), ("extra", Value::Boolean(true))])),
        ("{ a: true }", Value::object(vec![("a", Value::Boolean(true))])),
        (
            "{ inner: { deep: [1, , 2] } }",
            Value::object(vec![("inner", Value::object(vec![("deep", Value::Array(vec![n(1.0), Value::Undefined, n(2.0)]))]))]),
        ),
        (
            "{ inner: { deep: [1] } }",
            Value::object(vec![("inner", Value::object(vec![("deep", Value::Array(vec![n(1.0)]))]))]),
        ),
        ("new Map([[\"a\", 1]])", Value::Map(vec![(Value::string("a"), n(1.0))])),
        ("new Map([[1, 1]])", Value::Map(vec![(n(1.0), n(1.0))])),
        ("new Set([1])", Value::Set(vec![n(1.0)])),
        ("new Set([\"a\"])", Value::Set(vec![Value::string("a")])),
    ]
}

/// `function (x) { <table> <guard> }` checking `ty` the way emitted code does.
fn guard_function(ty: &TypeNode, max_inline_depth: u32) -> String {
    let mut names = NameGenerator::new();
    let mut table = DescriptorTable::new();
    let guard = CheckCompiler::new(&mut names, &mut table, Mode::Development)
        .with_max_inline_depth(max_inline_depth)
        .compile_guard("x", ty, "x", None);
    let table = types_table(&table).unwrap_or_default();
    format!("function (x) {{\n{}\n{}\n}}", table, render_guard(&guard))
}

/// The program printing, for every type and value, whether `__tg_matches`
/// accepts the value, whether the inline guard stays silent and whether the
/// table-only guard stays silent.
fn program(types: &[TypeNode], values: &[(&str, Value)]) -> String {
    let mut js = prelude(Mode::Development).unwrap_or_default();
    js.push_str("\nvar reports = 0;\n__tg_report = function () { reports += 1; };\n");
    let descriptors: Vec<String> = types.iter().map(TypeNode::to_descriptor).collect();
    js.push_str(&format!("const descriptors = [{}];\n", descriptors.join(",\n")));
    for (name, depth) in [("inline", 4), ("tabled", 0)] {
        let guards: Vec<String> = types.iter().map(|ty| guard_function(ty, depth)).collect();
        js.push_str(&format!("const {} = [{}];\n", name, guards.join(",\n")));
    }
    let literals: Vec<&str> = values.iter().map(|(js, _)| *js).collect();
    js.push_str(&format!("const values = [{}];\n", literals.join(",\n")));
    js.push_str(
        r#"function silent(guard, value) {
    reports = 0;
    guard(value);
    return reports === 0;
}
const out = [];
for (let t = 0; t < descriptors.length; t++) {
    for (let v = 0; v < values.length; v++) {
        out.push([__tg_matches(values[v], descriptors[t]), silent(inline[t], values[v]), silent(tabled[t], values[v])]);
    }
}
console.log(JSON.stringify(out));
"#,
    );
    js
}

/// Run `js` with node, or `None` when node is not installed.
fn run_node(js: &str) -> Option<String> {
    let mut child = Command::new("node")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .ok()?;
    child.stdin.take()?.write_all(js.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "node failed:\n{}\n---\n{}",
        String::from_utf8_lossy(&output.stderr),
        js
    );
    Some(String::from_utf8(output.stdout).unwrap())
}

#[test]
fn test_runtime_matcher_and_guards_agree_with_matcher() {
    let types = types();
    let values = values();
    let Some(stdout) = run_node(&program(&types, &values)) else {
        eprintln!("node not found; skipping runtime comparison");
        return;
    };
    let verdicts: Vec<[bool; 3]> = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(verdicts.len(), types.len() * values.len());

    let mut failures = Vec::new();
    for (t, ty) in types.iter().enumerate() {
        for (v, (js, value)) in values.iter().enumerate() {
            let expected = matches(value, ty);
            let [runtime, inline, tabled] = verdicts[t * values.len() + v];
            if runtime != expected || inline != expected || tabled != expected {
                failures.push(format!(
                    "type {} value {}: matcher {} __tg_matches {} inline {} tabled {}",
                    ty, js, expected, runtime, inline, tabled
                ));
            }
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_sparse_array_is_checked_by_every_path() {
    let ty = TypeNode::array(TypeNode::number());
    let values = [("[1, , 3]", Value::Array(vec![Value::Number(1.0), Value::Undefined, Value::Number(3.0)]))];
    assert!(!matches(&values[0].1, &ty));
    let Some(stdout) = run_node(&program(&[ty], &values)) else {
        return;
    };
    assert_eq!(stdout.trim(), "[[false,false,false]]");
}
