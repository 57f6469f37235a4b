//! The runtime helper prelude.
//!
//! Development and strict output start with three helpers:
//!
//! - `__tg_matches(value, descriptor)`, the structural matcher over JSON
//!   descriptors, used by guards for types nested too deep to inline;
//! - `__tg_stringify(value)`, which prints values the way diagnostics do;
//! - `__tg_report(path, expected, value, missing)`, the error hook.
//!
//! The mode is fixed when the prelude is generated: the hook either warns or
//! throws, and never looks anything up at run time.

use typeguard_ast::factory::quote_string;
use typeguard_options::Mode;
use typeguard_transformers::{DescriptorTable, REPORT_FN, STRINGIFY_FN, TYPES_TABLE};

/// Prefix of every runtime warning.
pub const WARNING_PREFIX: &str = "[typeguard] ";

const STRINGIFY: &str = r#"function __tg_stringify(value, depth) {
    depth = depth || 0;
    if (value === undefined) return "undefined";
    if (value === null) return "null";
    switch (typeof value) {
        case "string": return JSON.stringify(value);
        case "bigint": return String(value) + "n";
        case "function": return "function";
        case "object": break;
        default: return String(value);
    }
    if (value instanceof Map) return "Map(" + value.size + ")";
    if (value instanceof Set) return "Set(" + value.size + ")";
    if (Array.isArray(value)) {
        if (depth >= 2) return "[...]";
        var parts = [];
        for (var i = 0; i < value.length; i++) parts.push(__tg_stringify(value[i], depth + 1));
        return "[" + parts.join(", ") + "]";
    }
    var keys = Object.keys(value);
    if (keys.length === 0) return "{}";
    if (depth >= 2) return "{...}";
    return "{ " + keys.map(function (k) {
        var name = /^[A-Za-z_$][A-Za-z0-9_$]*$/.test(k) ? k : JSON.stringify(k);
        return name + ": " + __tg_stringify(value[k], depth + 1);
    }).join(", ") + " }";
}"#;

const MATCHES: &str = r#"function __tg_matches(value, type) {
    function same(value, literal) {
        if (literal !== null && typeof literal === "object") {
            return typeof value === "bigint" && String(value) === literal.bigint;
        }
        return value === literal;
    }
    function has(value, key) {
        return Object.prototype.hasOwnProperty.call(value, key);
    }
    function isPlainObject(value) {
        return typeof value === "object" && value !== null && !Array.isArray(value);
    }
    function member(value, element) {
        return (element.optional && value === undefined) || __tg_matches(value, element.type);
    }
    function positions(elements, length) {
        var rest = -1;
        for (var i = 0; i < elements.length; i++) {
            if (elements[i].rest) { rest = i; break; }
        }
        var leading = rest === -1 ? elements : elements.slice(0, rest);
        var trailing = rest === -1 ? [] : elements.slice(rest + 1);
        var required = 0;
        for (var j = 0; j < leading.length; j++) {
            if (!leading[j].optional) required = j + 1;
        }
        if (length < required + trailing.length || (rest === -1 && length > elements.length)) return null;
        var head = length - trailing.length;
        var out = [];
        for (var k = 0; k < head; k++) out.push(k < leading.length ? leading[k] : elements[rest]);
        return out.concat(trailing);
    }
    function shape(value, type) {
        var callable = type["@@call"] !== undefined || type["@@construct"] !== undefined;
        if (callable ? typeof value !== "function" : !isPlainObject(value)) return false;
        var declared = {};
        for (var i = 0; i < type.properties.length; i++) {
            var key = type.properties[i][0];
            var prop = type.properties[i][1];
            declared[key] = true;
            if (has(value, key)) {
                if (!__tg_matches(value[key], prop)) return false;
            } else if (prop.kind !== "optional") {
                return false;
            }
        }
        var index = type["@@index"];
        if (index === undefined || !isPlainObject(value) || value instanceof Map || value instanceof Set) return true;
        var numeric = index.key.kind === "primitive" && index.key.name === "number";
        return Object.keys(value).every(function (k) {
            if (has(declared, k)) return true;
            if (numeric && String(Number(k)) !== k) return true;
            return __tg_matches(value[k], index.value);
        });
    }
    switch (type.kind) {
        case "primitive":
            switch (type.name) {
                case "any": case "unknown": return true;
                case "never": return false;
                case "void": case "undefined": return value === undefined;
                case "null": return value === null;
                case "object": return value !== null && (typeof value === "object" || typeof value === "function");
                default: return typeof value === type.name;
            }
        case "literal": return same(value, type.value);
        case "union": return type.types.some(function (t) { return __tg_matches(value, t); });
        case "intersection": return type.types.every(function (t) { return __tg_matches(value, t); });
        case "optional": return value === undefined || __tg_matches(value, type.type);
        case "array":
        case "readonlyArray":
            if (!Array.isArray(value)) return false;
            for (var n = 0; n < value.length; n++) {
                if (!__tg_matches(value[n], type.element)) return false;
            }
            return true;
        case "tuple":
            if (!Array.isArray(value)) return false;
            var slots = positions(type.elements, value.length);
            return slots !== null && slots.every(function (m, i) { return member(value[i], m); });
        case "object": return shape(value, type);
        case "map":
            if (!(value instanceof Map)) return false;
            for (var [k, v] of value) {
                if (!__tg_matches(k, type.key) || !__tg_matches(v, type.value)) return false;
            }
            return true;
        case "set":
            if (!(value instanceof Set)) return false;
            for (var e of value) {
                if (!__tg_matches(e, type.element)) return false;
            }
            return true;
        case "record":
            if (value instanceof Map || value instanceof Set) return true;
            return isPlainObject(value) && Object.keys(value).every(function (k) {
                return __tg_matches(value[k], type.value);
            });
        case "function": return typeof value === "function";
        case "enum": return type.values.some(function (v) { return same(value, v); });
        case "templateLiteral": return typeof value === "string" && new RegExp(type.pattern).test(value);
        default: return true;
    }
}"#;

/// The error hook for `mode`.
fn report(mode: Mode) -> String {
    let sink = if mode.throws() {
        "throw new TypeError(message);".to_string()
    } else {
        format!("console.warn({} + message);", quote_string(WARNING_PREFIX))
    };
    format!(
        r#"function {report}(path, expected, value, missing) {{
    var message = missing === undefined
        ? path + ": type mismatch, expected " + expected + " but got " + {stringify}(value)
        : path + ": missing required property '" + missing + "' of type " + expected;
    {sink}
}}"#,
        report = REPORT_FN,
        stringify = STRINGIFY_FN,
        sink = sink,
    )
}

/// The prelude for `mode`, or `None` when the mode emits no guards.
pub fn prelude(mode: Mode) -> Option<String> {
    if !mode.emits_guards() {
        return None;
    }
    Some(format!("{}\n{}\n{}", MATCHES, STRINGIFY, report(mode)))
}

/// `const __tg_types = [...];`, or `None` when no guard needs a descriptor.
pub fn types_table(table: &DescriptorTable) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let mut out = format!("const {} = [\n", TYPES_TABLE);
    for descriptor in table.descriptors() {
        out.push_str("    ");
        out.push_str(descriptor);
        out.push_str(",\n");
    }
    out.push_str("];");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeguard_types::TypeNode;

    #[test]
    fn test_production_has_no_prelude() {
        assert!(prelude(Mode::Production).is_none());
    }

    #[test]
    fn test_development_warns() {
        let text = prelude(Mode::Development).unwrap();
        assert!(text.contains("function __tg_matches(value, type)"));
        assert!(text.contains("function __tg_stringify(value, depth)"));
        assert!(text.contains("function __tg_report(path, expected, value, missing)"));
        assert!(text.contains("console.warn(\"[typeguard] \" + message);"));
        assert!(!text.contains("throw"));
    }

    #[test]
    fn test_strict_throws() {
        let text = prelude(Mode::Strict).unwrap();
        assert!(text.contains("throw new TypeError(message);"));
        assert!(!text.contains("console.warn"));
    }

    #[test]
    fn test_types_table() {
        let mut table = DescriptorTable::new();
        assert!(types_table(&table).is_none());
        table.intern(&TypeNode::string());
        table.intern(&TypeNode::array(TypeNode::number()));
        assert_eq!(
            types_table(&table).unwrap(),
            concat!(
                "const __tg_types = [\n",
                "    {\"kind\":\"primitive\",\"name\":\"string\"},\n",
                "    {\"kind\":\"array\",\"element\":{\"kind\":\"primitive\",\"name\":\"number\"}},\n",
                "];"
            )
        );
    }
}
