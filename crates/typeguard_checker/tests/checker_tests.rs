//! Static analyzer integration tests.
//!
//! Runs the parse -> build registry -> analyze pipeline and verifies the
//! reported diagnostics.

use bumpalo::Bump;
use typeguard_checker::{analyze, matches, AnalysisReport, Value};
use typeguard_parser::parse_source_file;
use typeguard_types::{build_registry, TypeNode};

/// Helper: run the full pipeline and return the analysis report.
fn analyze_source(source: &str) -> AnalysisReport {
    let arena = Bump::new();
    let (file, parse_diagnostics) = parse_source_file(&arena, "test.ts", source);
    assert!(parse_diagnostics.is_empty(), "{:?}", parse_diagnostics.messages());
    let (registry, _) = build_registry(&file);
    analyze(&file, &registry)
}

/// Helper: diagnostic messages.
fn check_source(source: &str) -> Vec<String> {
    analyze_source(source).messages()
}

fn diagnostic_count(source: &str) -> usize {
    check_source(source).len()
}

// ============================================================================
// No Diagnostics Expected
// ============================================================================

#[test]
fn test_valid_primitives() {
    assert_eq!(
        diagnostic_count(r#"let age: number = 25; const name: string = "a"; let ok: boolean = true;"#),
        0
    );
}

#[test]
fn test_unannotated_declarations_are_ignored() {
    assert_eq!(diagnostic_count(r#"let x = "a"; const y = 1;"#), 0);
}

#[test]
fn test_non_literal_initializers_are_ignored() {
    assert_eq!(diagnostic_count("declare function load(): string; let n: number = load();"), 0);
    assert_eq!(diagnostic_count(r#"let n: number = "a" as any;"#), 0);
    assert_eq!(diagnostic_count("let a = 1; let b: string = a;"), 0);
}

#[test]
fn test_valid_interface_literal() {
    let source = r#"
        interface User { id: number; name: string }
        const user: User = { id: 1, name: "Ada", extra: true };
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_accessors_are_not_functions() {
    let source = r#"
        interface User { id: number; name: string }
        const u: User = { id: 1, get name() { return "g"; } };
        const w: User = { id: 2, name: "w", set tag(v) {} };
    "#;
    assert_eq!(check_source(source), Vec::<String>::new());
    // A plain method is still a function.
    assert_eq!(diagnostic_count(r#"interface U { name: string } const m: U = { name() { return "m"; } };"#), 1);
}

#[test]
fn test_unknown_sub_expressions_match() {
    let source = r#"
        interface User { id: number; name: string }
        const name = "Ada";
        const a: User = { id: 1, name };
        const b: User = { id: compute(), name: "x" };
        const base = { id: 1 };
        const c: User = { ...base };
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_generic_types_are_permissive() {
    let source = r#"
        let when: Date = "yesterday";
        let p: Promise<number> = 5;
        function id<T>(x: T): T { const y: T = 1; return "x"; }
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

// ============================================================================
// Variable Initializers
// ============================================================================

#[test]
fn test_type_mismatch_names_variable() {
    let messages = check_source(r#"let age: number = "25";"#);
    assert_eq!(messages, vec![r#"'age': type mismatch, expected number but got "25""#]);
}

#[test]
fn test_missing_required_property() {
    let source = r#"
        interface User { id: number; name: string }
        const user: User = { id: 1 };
    "#;
    let messages = check_source(source);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], "'user': missing required property 'name' of type string");
}

#[test]
fn test_nested_property_path() {
    let source = r#"
        interface Address { zip: string }
        interface User { address: Address }
        const user: User = { address: { zip: 12345 } };
    "#;
    assert_eq!(
        check_source(source),
        vec!["'user.address.zip': type mismatch, expected string but got 12345"]
    );
}

#[test]
fn test_one_diagnostic_per_failing_property() {
    let source = r#"
        interface Point { x: number; y: number; label: string }
        const p: Point = { x: "1", y: "2" };
    "#;
    let messages = check_source(source);
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("'p.x': type mismatch"));
    assert!(messages[1].starts_with("'p.y': type mismatch"));
    assert_eq!(messages[2], "'p': missing required property 'label' of type string");
}

#[test]
fn test_array_element_path() {
    let messages = check_source(r#"const xs: number[] = [1, "2", 3];"#);
    assert_eq!(messages, vec![r#"'xs[1]': type mismatch, expected number but got "2""#]);
}

#[test]
fn test_tuple_positions() {
    assert_eq!(diagnostic_count(r#"const t: [string, number] = ["a", 1];"#), 0);
    assert_eq!(
        check_source(r#"const t: [string, number] = ["a", "b"];"#),
        vec![r#"'t[1]': type mismatch, expected number but got "b""#]
    );
    assert_eq!(
        check_source(r#"const t: [string, number] = ["a"];"#),
        vec![r#"'t': type mismatch, expected [string, number] but got ["a"]"#]
    );
}

#[test]
fn test_literal_union_uses_alias_name() {
    let source = r#"
        type Direction = "up" | "down" | "left" | "right";
        let d: Direction = "oops";
        let ok: Direction = "left";
    "#;
    assert_eq!(
        check_source(source),
        vec![r#"'d': type mismatch, expected Direction but got "oops""#]
    );
}

#[test]
fn test_union_accepts_any_member() {
    assert_eq!(diagnostic_count("let v: string | number = 5;"), 0);
    assert_eq!(diagnostic_count(r#"let v: string | number = "5";"#), 0);
    assert_eq!(diagnostic_count("let v: string | number = true;"), 1);
}

#[test]
fn test_enum_values() {
    let source = r#"
        enum Color { Red, Green }
        const a: Color = 1;
        const b: Color = 5;
        const c: Color.Red = 0;
    "#;
    assert_eq!(
        check_source(source),
        vec!["'b': type mismatch, expected Color but got 5"]
    );
}

#[test]
fn test_null_and_undefined() {
    assert_eq!(diagnostic_count("let a: string | null = null;"), 0);
    assert_eq!(
        check_source("let b: string = undefined;"),
        vec!["'b': type mismatch, expected string but got undefined"]
    );
    assert_eq!(diagnostic_count("let c: number = -1;"), 0);
}

#[test]
fn test_index_signature() {
    let source = r#"const m: { [key: string]: number } = { a: 1, b: "x" };"#;
    assert_eq!(
        check_source(source),
        vec![r#"'m.b': type mismatch, expected number but got "x""#]
    );
}

#[test]
fn test_record_and_utility_types() {
    let source = r#"
        interface User { id: number; name: string }
        const scores: Record<string, number> = { a: 1 };
        const patch: Partial<User> = { name: "x" };
        const picked: Pick<User, "id"> = {};
    "#;
    assert_eq!(
        check_source(source),
        vec!["'picked': missing required property 'id' of type number"]
    );
}

#[test]
fn test_locals_inside_functions_are_checked() {
    let source = r#"
        function f() {
            const n: number = "one";
        }
    "#;
    assert_eq!(diagnostic_count(source), 1);
}

// ============================================================================
// Optional Semantics
// ============================================================================

#[test]
fn test_optional_property_absent_or_undefined() {
    let source = r#"
        interface Profile { nick?: string }
        const a: Profile = {};
        const b: Profile = { nick: undefined };
        const c: Profile = { nick: "x" };
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_optional_property_present_and_wrong() {
    let source = r#"
        interface Profile { nick?: string }
        const p: Profile = { nick: 5 };
    "#;
    assert_eq!(
        check_source(source),
        vec!["'p.nick': type mismatch, expected string but got 5"]
    );
}

// ============================================================================
// Returns
// ============================================================================

#[test]
fn test_return_of_named_function() {
    let source = "function label(): string { return 42; }";
    assert_eq!(
        check_source(source),
        vec!["return value of 'label': type mismatch, expected string but got 42"]
    );
}

#[test]
fn test_return_object_literal() {
    let source = r#"
        interface User { id: number; name: string }
        function make(): User { return { id: 1 }; }
    "#;
    assert_eq!(
        check_source(source),
        vec!["return value of 'make': missing required property 'name' of type string"]
    );
}

#[test]
fn test_valid_returns() {
    let source = r#"
        function add(a: number, b: number): number { return a + b; }
        function zero(): number { return 0; }
        function nothing(): void { return; }
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_anonymous_functions_are_not_attributed() {
    let source = r#"
        function outer(): string {
            const inner = function () { return 1; };
            const arrow = () => { return 2; };
            return "ok";
        }
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_nested_named_function_restores_outer() {
    let source = r#"
        function outer(): string {
            function inner(): number { return 1; }
            return 2;
        }
    "#;
    assert_eq!(
        check_source(source),
        vec!["return value of 'outer': type mismatch, expected string but got 2"]
    );
}

#[test]
fn test_async_and_generator_returns_are_not_checked() {
    let source = r#"
        async function load(): Promise<number> { return "x"; }
        function* ids(): Generator<number> { return "x"; }
    "#;
    assert_eq!(diagnostic_count(source), 0);
}

#[test]
fn test_method_return() {
    let source = r#"
        class Store {
            count(): number { return "many"; }
        }
    "#;
    assert_eq!(
        check_source(source),
        vec![r#"return value of 'count': type mismatch, expected number but got "many""#]
    );
}

// ============================================================================
// Class Properties and Parameters
// ============================================================================

#[test]
fn test_class_property_initializer() {
    let source = r#"
        class Counter {
            count: number = "zero";
            label?: string = undefined;
        }
    "#;
    assert_eq!(
        check_source(source),
        vec![r#"'count': type mismatch, expected number but got "zero""#]
    );
}

#[test]
fn test_parameter_default() {
    let source = r#"function greet(name: string = 5, loud: boolean = false) {}"#;
    assert_eq!(
        check_source(source),
        vec!["'name': type mismatch, expected string but got 5"]
    );
}

// ============================================================================
// Report Properties
// ============================================================================

#[test]
fn test_diagnostics_carry_location() {
    let report = analyze_source(r#"let age: number = "25";"#);
    assert!(!report.is_ok());
    let diagnostic = &report.diagnostics().diagnostics()[0];
    assert_eq!(diagnostic.file.as_deref(), Some("test.ts"));
    assert!(diagnostic.span.is_some());
}

#[test]
fn test_analysis_is_idempotent() {
    let source = r#"
        interface User { id: number; name: string }
        const user: User = { id: "1" };
        function f(): boolean { return 0; }
    "#;
    let arena = Bump::new();
    let (file, _) = parse_source_file(&arena, "test.ts", source);
    let (registry, _) = build_registry(&file);
    let first = analyze(&file, &registry).messages();
    let second = analyze(&file, &registry).messages();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_clean_report_is_ok() {
    assert!(analyze_source("const x: number = 1;").is_ok());
}

#[test]
fn test_union_short_circuits_on_first_member() {
    // The first member matches, so the rest is never consulted.
    let ty = TypeNode::union(vec![TypeNode::string(), TypeNode::Primitive(typeguard_types::Primitive::Never)]);
    assert!(matches(&Value::string("a"), &ty));
}
