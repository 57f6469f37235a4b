//! Guard to JavaScript.

use crate::guard::*;
use typeguard_ast::factory::{format_number, is_identifier_name, quote_string};
use typeguard_types::LiteralValue;

pub const REPORT_FN: &str = "__tg_report";
pub const MATCHES_FN: &str = "__tg_matches";
pub const STRINGIFY_FN: &str = "__tg_stringify";
pub const TYPES_TABLE: &str = "__tg_types";

const INDENT: &str = "    ";

/// The guard as statements, one per line, without a trailing newline.
pub fn render_guard(guard: &Guard) -> String {
    let mut out = Vec::new();
    render_nodes(&mut out, &guard.nodes, 0);
    out.join("\n")
}

/// JavaScript source for a literal value.
pub fn literal_js(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => quote_string(s),
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::BigInt(digits) => format!("{}n", digits),
    }
}

/// `v.key` or `v["key"]`.
fn member(var: &str, key: &str) -> String {
    if is_identifier_name(key) {
        format!("{}.{}", var, key)
    } else {
        format!("{}[{}]", var, quote_string(key))
    }
}

fn has_own(var: &str, key: &str) -> String {
    format!("Object.prototype.hasOwnProperty.call({}, {})", var, quote_string(key))
}

fn test_js(var: &str, test: &Test) -> String {
    match test {
        Test::TypeOf(name) => format!("typeof {} === \"{}\"", var, name),
        Test::ObjectOrFunction => {
            format!("(typeof {v} === \"object\" || typeof {v} === \"function\") && {v} !== null", v = var)
        }
        Test::Undefined => format!("{} === undefined", var),
        Test::NotUndefined => format!("{} !== undefined", var),
        Test::Null => format!("{} === null", var),
        Test::Equals(value) => format!("{} === {}", var, literal_js(value)),
        Test::OneOf(values) => {
            let values: Vec<String> = values.iter().map(literal_js).collect();
            format!("[{}].indexOf({}) !== -1", values.join(", "), var)
        }
        Test::Array => format!("Array.isArray({})", var),
        Test::Object => format!("typeof {v} === \"object\" && {v} !== null && !Array.isArray({v})", v = var),
        Test::Function => format!("typeof {} === \"function\"", var),
        Test::Map => format!("{} instanceof Map", var),
        Test::Set => format!("{} instanceof Set", var),
        Test::Length { min, max } => {
            let mut parts = Vec::new();
            if *min > 0 {
                parts.push(format!("{}.length >= {}", var, min));
            }
            if let Some(max) = max {
                parts.push(format!("{}.length <= {}", var, max));
            }
            if parts.is_empty() {
                "true".to_string()
            } else {
                parts.join(" && ")
            }
        }
        Test::Pattern(pattern) => {
            format!("typeof {v} === \"string\" && new RegExp({}).test({v})", quote_string(pattern), v = var)
        }
        Test::Never => "false".to_string(),
        Test::Matches(slot) => format!("{}({}, {}[{}])", MATCHES_FN, var, TYPES_TABLE, slot),
    }
}

/// The negation of a test, written without a wrapping `!(...)` where a
/// direct form exists.
fn negated_js(var: &str, test: &Test) -> String {
    match test {
        Test::TypeOf(name) => format!("typeof {} !== \"{}\"", var, name),
        Test::Undefined => format!("{} !== undefined", var),
        Test::NotUndefined => format!("{} === undefined", var),
        Test::Null => format!("{} !== null", var),
        Test::Equals(value) => format!("{} !== {}", var, literal_js(value)),
        Test::OneOf(values) => {
            let values: Vec<String> = values.iter().map(literal_js).collect();
            format!("[{}].indexOf({}) === -1", values.join(", "), var)
        }
        Test::Array | Test::Matches(_) => format!("!{}", test_js(var, test)),
        Test::Function => format!("typeof {} !== \"function\"", var),
        Test::Never => "true".to_string(),
        _ => format!("!({})", test_js(var, test)),
    }
}

/// A diagnostic path as a JavaScript string expression.
pub fn path_js(path: &Path) -> String {
    enum Piece {
        Lit(String),
        Expr(String),
    }
    let mut pieces: Vec<Piece> = Vec::new();
    let push_lit = |pieces: &mut Vec<Piece>, text: &str| match pieces.last_mut() {
        Some(Piece::Lit(last)) => last.push_str(text),
        _ => pieces.push(Piece::Lit(text.to_string())),
    };
    for part in &path.0 {
        match part {
            PathPart::Text(text) => push_lit(&mut pieces, text),
            PathPart::Index(var) => {
                push_lit(&mut pieces, "[");
                pieces.push(Piece::Expr(var.clone()));
                push_lit(&mut pieces, "]");
            }
            PathPart::Key(var) => {
                push_lit(&mut pieces, ".");
                pieces.push(Piece::Expr(var.clone()));
            }
            PathPart::Entry(var) => {
                push_lit(&mut pieces, "[");
                pieces.push(Piece::Expr(format!("{}({})", STRINGIFY_FN, var)));
                push_lit(&mut pieces, "]");
            }
        }
    }
    if pieces.is_empty() {
        return "\"\"".to_string();
    }
    let rendered: Vec<String> = pieces
        .into_iter()
        .map(|piece| match piece {
            Piece::Lit(text) => quote_string(&text),
            Piece::Expr(expr) => expr,
        })
        .collect();
    rendered.join(" + ")
}

fn line(out: &mut Vec<String>, depth: usize, text: String) {
    out.push(format!("{}{}", INDENT.repeat(depth), text));
}

fn render_nodes(out: &mut Vec<String>, nodes: &[GuardNode], depth: usize) {
    for node in nodes {
        render_node(out, node, depth);
    }
}

fn render_node(out: &mut Vec<String>, node: &GuardNode, depth: usize) {
    match node {
        GuardNode::Check { var, test, path, expected, then } => {
            line(out, depth, format!("if ({}) {{", negated_js(var, test)));
            line(
                out,
                depth + 1,
                format!("{}({}, {}, {});", REPORT_FN, path_js(path), quote_string(expected), var),
            );
            if then.is_empty() {
                line(out, depth, "}".to_string());
            } else {
                line(out, depth, "} else {".to_string());
                render_nodes(out, then, depth + 1);
                line(out, depth, "}".to_string());
            }
        }
        GuardNode::When { var, test, then } => {
            line(out, depth, format!("if ({}) {{", test_js(var, test)));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::Unseen { var, seen, then } => {
            let fresh: Vec<String> = seen.iter().map(|other| format!("!Object.is({}, {})", var, other)).collect();
            line(out, depth, format!("if ({}) {{", fresh.join(" && ")));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::Bind { name, var, access, then } => {
            let read = match access {
                Access::Key(key) => member(var, key),
                Access::Index(i) => format!("{}[{}]", var, i),
                Access::Head { index, trailing } => format!(
                    "{v}.length - {t} > {i} ? {v}[{i}] : undefined",
                    v = var,
                    t = trailing,
                    i = index
                ),
                Access::FromEnd(n) => format!("{v}[{v}.length - {n}]", v = var, n = n),
            };
            line(out, depth, format!("const {} = {};", name, read));
            render_nodes(out, then, depth);
        }
        GuardNode::Property { name, var, key, missing, then } => {
            match missing {
                Some((path, expected)) => {
                    line(out, depth, format!("if (!{}) {{", has_own(var, key)));
                    line(
                        out,
                        depth + 1,
                        format!(
                            "{}({}, {}, {}, {});",
                            REPORT_FN,
                            path_js(path),
                            quote_string(expected),
                            var,
                            quote_string(key)
                        ),
                    );
                    line(out, depth, "} else {".to_string());
                }
                None => line(out, depth, format!("if ({}) {{", has_own(var, key))),
            }
            line(out, depth + 1, format!("const {} = {};", name, member(var, key)));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::Elements { var, index, element, start, trailing, then } => {
            let bound = if *trailing == 0 {
                format!("{}.length", var)
            } else {
                format!("{}.length - {}", var, trailing)
            };
            line(
                out,
                depth,
                format!("for (let {i} = {}; {i} < {}; {i}++) {{", start, bound, i = index),
            );
            line(out, depth + 1, format!("const {} = {}[{}];", element, var, index));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::Entries { var, key, value, then } => {
            line(out, depth, format!("for (const [{}, {}] of {}) {{", key, value, var));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::Members { var, element, then } => {
            line(out, depth, format!("for (const {} of {}) {{", element, var));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
        GuardNode::OwnKeys { var, key, value, exclude, numeric_only, then } => {
            line(out, depth, format!("for (const {} of Object.keys({})) {{", key, var));
            if !exclude.is_empty() {
                let skipped: Vec<String> = exclude
                    .iter()
                    .map(|name| format!("{} === {}", key, quote_string(name)))
                    .collect();
                line(out, depth + 1, format!("if ({}) continue;", skipped.join(" || ")));
            }
            if *numeric_only {
                line(out, depth + 1, format!("if (String(Number({k})) !== {k}) continue;", k = key));
            }
            line(out, depth + 1, format!("const {} = {}[{}];", value, var, key));
            render_nodes(out, then, depth + 1);
            line(out, depth, "}".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_compiler::CheckCompiler;
    use crate::names::NameGenerator;
    use typeguard_options::Mode;
    use typeguard_types::TypeNode;

    fn render(ty: &TypeNode, path: &str) -> String {
        let mut names = NameGenerator::new();
        let mut table = DescriptorTable::new();
        CheckCompiler::new(&mut names, &mut table, Mode::Development).compile("x", ty, path)
    }

    #[test]
    fn test_render_primitive() {
        assert_eq!(
            render(&TypeNode::number(), "a"),
            "if (typeof x !== \"number\") {\n    __tg_report(\"a\", \"number\", x);\n}"
        );
    }

    #[test]
    fn test_render_object() {
        let ty = TypeNode::object(vec![("id", TypeNode::number()), ("nick", TypeNode::optional(TypeNode::string()))]);
        let js = render(&ty, "user");
        assert!(js.starts_with("if (!(typeof x === \"object\" && x !== null && !Array.isArray(x))) {"));
        assert!(js.contains("if (!Object.prototype.hasOwnProperty.call(x, \"id\")) {"));
        assert!(js.contains("__tg_report(\"user\", \"number\", x, \"id\");"));
        assert!(js.contains("const __tg_v1 = x.id;"));
        assert!(js.contains("__tg_report(\"user.id\", \"number\", __tg_v1);"));
        assert!(js.contains("if (Object.prototype.hasOwnProperty.call(x, \"nick\")) {"));
        assert!(js.contains("if (__tg_v2 !== undefined) {"));
    }

    #[test]
    fn test_render_array_loop() {
        let js = render(&TypeNode::array(TypeNode::string()), "xs");
        assert!(js.contains("for (let __tg_i1 = 0; __tg_i1 < x.length; __tg_i1++) {"));
        assert!(js.contains("__tg_report(\"xs[\" + __tg_i1 + \"]\", \"string\", __tg_v2);"));
    }

    #[test]
    fn test_path_js() {
        let path = Path::new("m").entry("k").text(".a");
        assert_eq!(path_js(&path), "\"m[\" + __tg_stringify(k) + \"].a\"");
        assert_eq!(path_js(&Path::new("r").key("k")), "\"r.\" + k");
        assert_eq!(path_js(&Path::default()), "\"\"");
    }

    #[test]
    fn test_literal_js() {
        assert_eq!(literal_js(&LiteralValue::String("a\"b".into())), "\"a\\\"b\"");
        assert_eq!(literal_js(&LiteralValue::Number(-1.5)), "-1.5");
        assert_eq!(literal_js(&LiteralValue::BigInt("10".into())), "10n");
    }

    #[test]
    fn test_render_unseen() {
        let guard = Guard {
            target: "r".into(),
            nodes: vec![GuardNode::Unseen {
                var: "r".into(),
                seen: vec!["a".into(), "b".into()],
                then: vec![GuardNode::Check {
                    var: "r".into(),
                    test: Test::TypeOf("number"),
                    path: Path::new("ret"),
                    expected: "number".into(),
                    then: vec![],
                }],
            }],
        };
        assert_eq!(
            render_guard(&guard),
            "if (!Object.is(r, a) && !Object.is(r, b)) {\n    if (typeof r !== \"number\") {\n        __tg_report(\"ret\", \"number\", r);\n    }\n}"
        );
    }

    #[test]
    fn test_fallback_calls_matcher() {
        let union = TypeNode::union(vec![TypeNode::string(), TypeNode::number()]);
        assert_eq!(
            render(&union, "v"),
            "if (!__tg_matches(x, __tg_types[0])) {\n    __tg_report(\"v\", \"string | number\", x);\n}"
        );
    }
}
