//! Regular expressions for template literal types.
//!
//! Patterns are written in the subset of syntax that the `regex` crate and
//! JavaScript's `RegExp` (without flags) read the same way, so the static and
//! the runtime matcher agree on every string.

use crate::model::{LiteralValue, Primitive, TypeNode};
use typeguard_ast::factory::format_number;

const ANY_TEXT: &str = r"[\s\S]*";
const NUMBER_TEXT: &str = r"-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";
const BIGINT_TEXT: &str = r"-?[0-9]+";

/// The unanchored pattern matching the string form of values of `ty`.
pub fn span_pattern(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Primitive(Primitive::Number) => NUMBER_TEXT.to_string(),
        TypeNode::Primitive(Primitive::BigInt) => BIGINT_TEXT.to_string(),
        TypeNode::Primitive(Primitive::Boolean) => "(?:true|false)".to_string(),
        TypeNode::Primitive(Primitive::Null) => "null".to_string(),
        TypeNode::Primitive(Primitive::Undefined) => "undefined".to_string(),
        TypeNode::Literal(value) => regex::escape(&literal_text(value)),
        TypeNode::EnumRef { values, .. } => alternation(values.iter().map(|v| regex::escape(&literal_text(v)))),
        TypeNode::Union(types) => alternation(types.iter().map(span_pattern)),
        TypeNode::TemplateLiteral { pattern } => {
            let inner = pattern.strip_prefix('^').unwrap_or(pattern);
            let inner = inner.strip_suffix('$').unwrap_or(inner);
            format!("(?:{})", inner)
        }
        _ => ANY_TEXT.to_string(),
    }
}

fn alternation(parts: impl Iterator<Item = String>) -> String {
    let parts: Vec<String> = parts.collect();
    format!("(?:{})", parts.join("|"))
}

/// `String(value)` for a literal.
pub fn literal_text(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => s.clone(),
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::BigInt(digits) => digits.clone(),
    }
}

/// Build the anchored pattern for `` `head${T1}text1${T2}text2` ``.
pub fn build_pattern(head: &str, spans: &[(TypeNode, String)]) -> String {
    let mut pattern = String::from("^");
    pattern.push_str(&regex::escape(head));
    for (ty, text) in spans {
        pattern.push_str(&span_pattern(ty));
        pattern.push_str(&regex::escape(text));
    }
    pattern.push('$');
    pattern
}

/// Test a string against a template pattern. A pattern that does not compile
/// accepts everything.
pub fn pattern_matches(pattern: &str, text: &str) -> bool {
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern() {
        let pattern = build_pattern("id-", &[(TypeNode::number(), String::new())]);
        assert!(pattern_matches(&pattern, "id-42"));
        assert!(pattern_matches(&pattern, "id--1.5"));
        assert!(!pattern_matches(&pattern, "id-x"));
        assert!(!pattern_matches(&pattern, "xid-1"));
    }

    #[test]
    fn test_literal_union_span() {
        let sizes = TypeNode::union(vec![TypeNode::string_literal("sm"), TypeNode::string_literal("lg")]);
        let pattern = build_pattern("", &[(sizes, ".px".to_string())]);
        assert!(pattern_matches(&pattern, "sm.px"));
        assert!(!pattern_matches(&pattern, "smapx"));
        assert!(!pattern_matches(&pattern, "md.px"));
    }

    #[test]
    fn test_string_span_matches_anything() {
        let pattern = build_pattern("a", &[(TypeNode::string(), "z".to_string())]);
        assert!(pattern_matches(&pattern, "az"));
        assert!(pattern_matches(&pattern, "a\nbz"));
        assert!(!pattern_matches(&pattern, "ab"));
    }
}
