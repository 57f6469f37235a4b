//! Registry builder tests.
//!
//! Parses small programs and checks the TypeNodes and registry entries the two
//! builder passes produce.

use bumpalo::Bump;
use typeguard_parser::parse_source_file;
use typeguard_types::*;

/// Helper: build the registry of `source` and return it with the builder's
/// warning messages.
fn build(source: &str) -> (Registry, Vec<String>) {
    let arena = Bump::new();
    let (file, parse_diagnostics) = parse_source_file(&arena, "test.ts", source);
    assert!(parse_diagnostics.is_empty(), "{:?}", parse_diagnostics.messages());
    let (registry, diagnostics) = build_registry(&file);
    (registry, diagnostics.messages())
}

fn alias(source: &str, name: &str) -> TypeNode {
    let (registry, warnings) = build(source);
    assert!(warnings.is_empty(), "{warnings:?}");
    registry.type_alias(name).cloned().expect("alias registered")
}

fn described(source: &str, name: &str) -> String {
    alias(source, name).to_string()
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn test_interface_shape() {
    let (registry, warnings) = build(
        "interface User { readonly id: number; name: string; email?: string; greet(x: string): void }",
    );
    assert!(warnings.is_empty());
    let shape = registry.interface("User").unwrap();
    let names: Vec<&str> = shape.properties.keys().map(String::as_str).collect();
    assert_eq!(names, ["id", "name", "email", "greet"]);
    assert!(shape.readonly.contains("id"));
    assert!(shape.properties["email"].is_optional());
    assert!(matches!(shape.properties["greet"], TypeNode::Function(_)));
}

#[test]
fn test_alias_chain_resolves_by_value() {
    let source = "type Id = number; type UserId = Id; type Key = UserId;";
    assert_eq!(alias(source, "Key"), TypeNode::number());
}

#[test]
fn test_interface_embedded_by_copy() {
    let source = "interface Point { x: number; y: number }\ntype Line = { from: Point; to: Point };";
    assert_eq!(
        described(source, "Line"),
        "{ from: { x: number; y: number }; to: { x: number; y: number } }"
    );
}

#[test]
fn test_interface_extends_copies_base_first() {
    let (registry, _) = build("interface A { a: string }\ninterface B extends A { b: number }");
    let b = registry.interface("B").unwrap();
    assert_eq!(b.properties.keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn test_interface_declarations_merge() {
    let (registry, warnings) = build("interface Cfg { a: string }\ninterface Cfg { b: number }");
    assert!(warnings.is_empty());
    assert_eq!(registry.interface("Cfg").unwrap().properties.len(), 2);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_duplicate_alias_keeps_first() {
    let (registry, warnings) = build("type T = string;\ntype T = number;");
    assert_eq!(registry.type_alias("T"), Some(&TypeNode::string()));
    assert_eq!(warnings, ["Duplicate declaration of 'T'; the first declaration is used."]);
}

#[test]
fn test_literal_union() {
    let ty = alias("type Direction = \"up\" | \"down\" | \"left\" | \"right\";", "Direction");
    assert_eq!(ty.members().len(), 4);
    assert_eq!(ty.members()[0], TypeNode::string_literal("up"));
}

#[test]
fn test_literal_types() {
    assert_eq!(described("type T = -1 | 10n | true | null | undefined;", "T"), "-1 | 10n | true | null | undefined");
}

#[test]
fn test_arrays_and_tuples() {
    assert_eq!(described("type T = readonly string[];", "T"), "readonly string[]");
    assert_eq!(described("type T = ReadonlyArray<number>;", "T"), "readonly number[]");
    assert_eq!(described("type T = Array<string | number>;", "T"), "(string | number)[]");
    assert_eq!(
        described("type T = [string, number?, ...boolean[]];", "T"),
        "[string, number?, ...boolean[]]"
    );
    let TypeNode::Tuple(members) = alias("type P = [x: number, y?: number];", "P") else {
        panic!("expected tuple");
    };
    assert_eq!(members[0].label.as_deref(), Some("x"));
    assert!(members[1].optional);
}

#[test]
fn test_containers() {
    assert_eq!(described("type T = Map<string, number>;", "T"), "Map<string, number>");
    assert_eq!(described("type T = ReadonlySet<string>;", "T"), "Set<string>");
    assert_eq!(described("type T = Record<string, boolean>;", "T"), "Record<string, boolean>");
    assert_eq!(
        described("type K = \"a\" | \"b\"; type T = Record<K, number>;", "T"),
        "{ a: number; b: number }"
    );
}

#[test]
fn test_utility_types() {
    let source = "interface User { id: number; name: string; email?: string }\n\
                  type A = Partial<User>;\n\
                  type B = Pick<User, \"id\" | \"name\">;\n\
                  type C = Omit<User, \"email\">;\n\
                  type D = Required<User>;\n\
                  type E = keyof User;\n\
                  type F = User[\"name\"];";
    let (registry, warnings) = build(source);
    assert!(warnings.is_empty());
    let get = |name: &str| registry.type_alias(name).unwrap().to_string();
    assert_eq!(get("A"), "{ id?: number; name?: string; email?: string }");
    assert_eq!(get("B"), "{ id: number; name: string }");
    assert_eq!(get("C"), "{ id: number; name: string }");
    assert_eq!(get("D"), "{ id: number; name: string; email: string }");
    assert_eq!(get("E"), "\"id\" | \"name\" | \"email\"");
    assert_eq!(get("F"), "string");
}

#[test]
fn test_signatures_become_metadata() {
    let ty = alias(
        "type Fn = { (x: number): string; new (s: string): object; [key: string]: unknown; tag: string };",
        "Fn",
    );
    let TypeNode::Object(shape) = ty else { panic!("expected object") };
    assert!(shape.call.is_some());
    assert!(shape.construct.as_ref().is_some_and(|c| c.is_constructor));
    assert!(shape.index.is_some());
    assert_eq!(shape.properties.len(), 1);
}

#[test]
fn test_function_types() {
    assert_eq!(
        described("type F = (a: number, b?: string, ...rest: boolean[]) => void;", "F"),
        "(a: number, b?: string, ...rest: boolean[]) => void"
    );
}

#[test]
fn test_mapped_type_over_finite_keys() {
    assert_eq!(
        described("type Flags = { readonly [K in \"a\" | \"b\"]?: boolean };", "Flags"),
        "{ readonly a?: boolean; readonly b?: boolean }"
    );
    let open = alias("type M<T> = { [K in keyof T]: string };", "M");
    assert!(matches!(open, TypeNode::Mapped { .. }));
}

#[test]
fn test_template_literal_type() {
    let TypeNode::TemplateLiteral { pattern } = alias("type Id = `user-${number}`;", "Id") else {
        panic!("expected template literal");
    };
    assert!(pattern.starts_with("^user\\-"));
    assert!(typeguard_types::template::pattern_matches(&pattern, "user-7"));
    assert!(!typeguard_types::template::pattern_matches(&pattern, "user-x"));
}

#[test]
fn test_type_parameters_are_unknown() {
    assert_eq!(described("type Box<T> = { value: T };", "Box"), "{ value: unknown }");
    assert_eq!(
        described("type P = Promise<string>;", "P"),
        "Promise<string>"
    );
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn test_enum_members() {
    let (registry, warnings) = build("enum Color { Red, Green = 5, Blue, Name = \"n\" }");
    assert!(warnings.is_empty());
    let color = registry.enumeration("Color").unwrap();
    let values: Vec<String> = color.members.values().map(|v| v.to_string()).collect();
    assert_eq!(values, ["0", "5", "6", "\"n\""]);
    assert!(!color.is_const);
}

#[test]
fn test_enum_reference_and_member_literal() {
    let source = "const enum Dir { Up = 1, Down = 2 }\ntype D = Dir;\ntype U = Dir.Up;";
    let (registry, _) = build(source);
    assert!(registry.enumeration("Dir").unwrap().is_const);
    assert_eq!(
        registry.type_alias("D"),
        Some(&TypeNode::EnumRef {
            name: "Dir".into(),
            values: vec![LiteralValue::Number(1.0), LiteralValue::Number(2.0)],
        })
    );
    assert_eq!(registry.type_alias("U"), Some(&TypeNode::number_literal(1.0)));
}

#[test]
fn test_non_constant_enum_member_warns() {
    let (registry, warnings) = build("enum E { A = compute(), B = 2 }");
    assert_eq!(warnings, ["Enum member 'A' does not have a constant value."]);
    assert_eq!(registry.enumeration("E").unwrap().members.len(), 1);
}

// ============================================================================
// Cycle and size policy
// ============================================================================

#[test]
fn test_self_reference_is_rejected() {
    let (registry, warnings) = build("interface Node { value: number; next?: Node }");
    assert_eq!(
        warnings,
        ["Recursive reference to 'Node' is not supported; it is treated as 'unknown'."]
    );
    let shape = registry.interface("Node").unwrap();
    assert_eq!(shape.properties["next"], TypeNode::optional(TypeNode::Unknown));
}

#[test]
fn test_forward_reference_between_definitions() {
    let (registry, warnings) = build("type A = { b: B };\ntype B = string;");
    assert_eq!(
        warnings,
        ["Type 'B' is used before its declaration; it is treated as 'unknown'."]
    );
    assert_eq!(registry.type_alias("A").unwrap().to_string(), "{ b: unknown }");
}

#[test]
fn test_depth_is_bounded() {
    let source = format!("type Deep = number{};", "[]".repeat(MAX_TYPE_DEPTH as usize + 6));
    let (registry, warnings) = build(&source);
    assert_eq!(
        warnings,
        ["Type 'Deep' is nested too deeply; the remainder is treated as 'unknown'."]
    );
    let mut ty = registry.type_alias("Deep").unwrap();
    let mut depth = 0;
    while let TypeNode::Array(element) = ty {
        ty = &**element;
        depth += 1;
    }
    assert_eq!(depth, MAX_TYPE_DEPTH);
    assert_eq!(ty, &TypeNode::Unknown);
}

// ============================================================================
// Usages
// ============================================================================

#[test]
fn test_usages_resolve_later_definitions() {
    let source = "let user: User = { id: 1 };\ninterface User { id: number }";
    let (registry, warnings) = build(source);
    assert!(warnings.is_empty());
    let user = registry.variable("user").unwrap();
    assert_eq!(user.ty.to_string(), "{ id: number }");
    assert!(!user.is_const);
}

#[test]
fn test_function_entry() {
    let source = "async function load<T>(id: number, opts?: T): Promise<string> { return \"\"; }\n\
                  function* gen(): Generator<number> {}";
    let (registry, _) = build(source);
    let load = registry.function("load").unwrap();
    assert_eq!(load.params.len(), 2);
    assert!(load.params[1].optional);
    assert_eq!(load.params[1].ty, TypeNode::Unknown);
    assert_eq!(load.type_params, ["T"]);
    assert!(load.is_async);
    assert!(!load.is_generator);
    assert!(registry.function("gen").unwrap().is_generator);
}

#[test]
fn test_overload_signatures_are_skipped() {
    let source = "function f(x: string): string;\nfunction f(x: any): any { return x; }";
    let (registry, warnings) = build(source);
    assert!(warnings.is_empty());
    assert_eq!(registry.function("f").unwrap().params[0].ty, TypeNode::Primitive(Primitive::Any));
}

#[test]
fn test_class_entry() {
    let source = "class Point extends Base implements Shape, ns.Named {\n\
                      static origin: Point;\n\
                      label?: string;\n\
                      constructor(public x: number, private y: number, z: number) { super(); }\n\
                      norm(): number { return 0; }\n\
                  }";
    let (registry, _) = build(source);
    let point = registry.class("Point").unwrap();
    assert_eq!(point.properties.keys().collect::<Vec<_>>(), ["label", "x", "y"]);
    assert_eq!(point.methods.keys().collect::<Vec<_>>(), ["norm"]);
    assert_eq!(point.extends.as_deref(), Some("Base"));
    assert_eq!(point.implements, ["Shape", "ns.Named"]);
}

#[test]
fn test_typeof_uses_registered_variable() {
    let source = "const limit: number = 3;\nlet other: typeof limit = 4;";
    let (registry, _) = build(source);
    assert_eq!(registry.variable("other").unwrap().ty, TypeNode::number());
    assert!(registry.variable("limit").unwrap().is_const);
}

#[test]
fn test_function_locals_are_not_registered() {
    let (registry, _) = build("function f() { let inner: number = 1; }\nlet outer: string = \"\";");
    assert!(registry.variable("inner").is_none());
    assert!(registry.variable("outer").is_some());
}

#[test]
fn test_descriptor_of_registered_type() {
    let ty = alias("type Pair = { a: string; b?: number };", "Pair");
    assert_eq!(
        ty.to_descriptor(),
        concat!(
            r#"{"kind":"object","properties":[["a",{"kind":"primitive","name":"string"}],"#,
            r#"["b",{"kind":"optional","type":{"kind":"primitive","name":"number"}}]]}"#
        )
    );
}
