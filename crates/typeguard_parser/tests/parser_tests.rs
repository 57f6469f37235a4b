//! Parser integration tests.
//!
//! Verifies that the parser builds the expected AST shapes and reports syntax
//! errors without giving up on the rest of the file.

use bumpalo::Bump;
use typeguard_ast::node::*;
use typeguard_ast::syntax_kind::SyntaxKind;
use typeguard_ast::types::*;
use typeguard_parser::parse_source_file;

/// Helper: parse and hand the tree and its diagnostics to `check`.
fn with_parsed<R>(source: &str, check: impl FnOnce(&SourceFile<'_>, &[String]) -> R) -> R {
    let arena = Bump::new();
    let (file, diagnostics) = parse_source_file(&arena, "test.ts", source);
    check(&file, &diagnostics.messages())
}

/// Helper: assert a clean parse with the expected number of top-level statements.
fn assert_statement_count(source: &str, expected: usize) {
    with_parsed(source, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "source: {source}\n{diagnostics:?}");
        assert_eq!(file.statements.len(), expected, "source: {source}");
    });
}

fn has_errors(source: &str) -> bool {
    with_parsed(source, |_, diagnostics| !diagnostics.is_empty())
}

// ============================================================================
// Variable Declarations
// ============================================================================

#[test]
fn test_parse_typed_declaration() {
    with_parsed("let age: number = \"25\";", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Variable(stmt) = &file.statements[0] else {
            panic!("expected variable statement");
        };
        assert_eq!(stmt.kind, VariableKind::Let);
        let decl = &stmt.declarations[0];
        assert_eq!(decl.name.as_identifier().map(|id| id.name), Some("age"));
        assert!(matches!(
            decl.type_annotation,
            Some(TypeNode::Keyword(KeywordTypeNode { keyword: KeywordType::Number, .. }))
        ));
        assert!(matches!(decl.initializer, Some(Expression::StringLiteral(s)) if s.value == "25"));
    });
}

#[test]
fn test_parse_multiple_declarations() {
    assert_statement_count("const a = 1; let b = 2; var c = 3;", 3);
}

#[test]
fn test_let_as_identifier() {
    with_parsed("let = 1;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(file.statements[0], Statement::Expression(_)));
    });
}

#[test]
fn test_destructuring_declaration() {
    with_parsed("const { a, b: [c, , d = 1], ...rest } = obj;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::Variable(stmt) = &file.statements[0] else {
            panic!("expected variable statement");
        };
        let mut names = Vec::new();
        stmt.declarations[0].name.bound_names(&mut names);
        assert_eq!(names, ["a", "c", "d", "rest"]);
    });
}

#[test]
fn test_definite_assignment() {
    assert_statement_count("let ready!: boolean;", 1);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_parse_function_with_params() {
    with_parsed("function add(a: number, b?: number, ...rest: number[]): number { return a; }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Function(func) = &file.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name.map(|n| n.name), Some("add"));
        assert_eq!(func.parameters.len(), 3);
        assert!(func.parameters[1].optional);
        assert!(func.parameters[2].rest);
        assert!(matches!(func.parameters[2].type_annotation, Some(TypeNode::Array(_))));
        assert!(func.return_type.is_some());
        assert_eq!(func.body.map(|b| b.statements.len()), Some(1));
    });
}

#[test]
fn test_overload_signatures() {
    with_parsed("function f(x: string): void;\nfunction f(x: any) {}", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Function(first) = &file.statements[0] else {
            panic!("expected function");
        };
        assert!(first.body.is_none());
    });
}

#[test]
fn test_parse_async_and_generator() {
    with_parsed("async function load() { await fetch(url); }\nfunction* gen() { yield* other(); }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(file.statements[0].data().has_modifier(ModifierFlags::ASYNC));
        let Statement::Function(gen) = &file.statements[1] else {
            panic!("expected function");
        };
        assert!(gen.asterisk);
    });
}

#[test]
fn test_rest_parameter_must_be_last() {
    assert!(has_errors("function f(...a, b) {}"));
}

#[test]
fn test_this_parameter() {
    with_parsed("function f(this: Window, x: number) {}", |file, _| {
        let Statement::Function(func) = &file.statements[0] else {
            panic!("expected function");
        };
        assert!(func.parameters[0].is_this());
    });
}

#[test]
fn test_type_predicate_return() {
    with_parsed("function isStr(x: unknown): x is string { return true; }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Function(func) = &file.statements[0] else {
            panic!("expected function");
        };
        assert!(matches!(func.return_type, Some(TypeNode::Predicate(p)) if !p.asserts));
    });
}

// ============================================================================
// Arrow Functions
// ============================================================================

fn first_initializer<'a>(file: &SourceFile<'a>) -> &'a Expression<'a> {
    match &file.statements[0] {
        Statement::Variable(stmt) => stmt.declarations[0].initializer.expect("initializer"),
        other => panic!("expected variable statement, got {other:?}"),
    }
}

#[test]
fn test_arrow_with_typed_params() {
    with_parsed("const f = (a: number, b = 2): number => a + b;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Expression::Arrow(arrow) = first_initializer(file) else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.parameters.len(), 2);
        assert!(arrow.return_type.is_some());
        assert!(matches!(arrow.body, ArrowFunctionBody::Expression(Expression::Binary(_))));
    });
}

#[test]
fn test_single_identifier_arrow() {
    with_parsed("const id = x => x;", |file, _| {
        assert!(matches!(first_initializer(file), Expression::Arrow(_)));
    });
}

#[test]
fn test_async_arrow() {
    with_parsed("const f = async (u: string) => { await get(u); };", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Expression::Arrow(arrow) = first_initializer(file) else {
            panic!("expected arrow");
        };
        assert!(arrow.data.has_modifier(ModifierFlags::ASYNC));
    });
}

#[test]
fn test_generic_arrow() {
    with_parsed("const f = <T,>(x: T): T => x;", |file, _| {
        let Expression::Arrow(arrow) = first_initializer(file) else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.type_parameters.map(|t| t.len()), Some(1));
    });
}

#[test]
fn test_parenthesized_is_not_arrow() {
    with_parsed("const v = (a + b) * c;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(first_initializer(file), Expression::Binary(_)));
    });
}

#[test]
fn test_conditional_with_parenthesized_branch() {
    with_parsed("const v = ok ? (a) : b;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(matches!(first_initializer(file), Expression::Conditional(_)));
    });
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_operator_precedence() {
    with_parsed("x = 1 + 2 * 3;", |file, _| {
        let Statement::Expression(stmt) = &file.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Binary(assign) = stmt.expression else {
            panic!("expected assignment");
        };
        assert_eq!(assign.operator, SyntaxKind::EqualsToken);
        let Expression::Binary(sum) = assign.right else {
            panic!("expected sum");
        };
        assert_eq!(sum.operator, SyntaxKind::PlusToken);
        assert!(matches!(sum.right, Expression::Binary(b) if b.operator == SyntaxKind::AsteriskToken));
    });
}

#[test]
fn test_exponent_is_right_associative() {
    with_parsed("x = 2 ** 3 ** 2;", |file, _| {
        let Statement::Expression(stmt) = &file.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Binary(assign) = stmt.expression else {
            panic!("expected assignment");
        };
        let Expression::Binary(pow) = assign.right else {
            panic!("expected power");
        };
        assert!(matches!(pow.left, Expression::NumericLiteral(n) if n.value == 2.0));
        assert!(matches!(pow.right, Expression::Binary(_)));
    });
}

#[test]
fn test_shift_operators_are_rescanned() {
    with_parsed("x = a >> 2; y = b >>> 1; z >>= 3; w = c >= d;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(file.statements.len(), 4);
    });
}

#[test]
fn test_as_and_satisfies() {
    with_parsed("const a = x as unknown as string;\nconst b = { } satisfies Shape;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Expression::As(outer) = first_initializer(file) else {
            panic!("expected as");
        };
        assert!(matches!(outer.expression, Expression::As(_)));
    });
}

#[test]
fn test_generic_call_and_comparison() {
    with_parsed("const a = make<string>(\"x\");\nconst b = p < q && r > s;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Expression::Call(call) = first_initializer(file) else {
            panic!("expected call");
        };
        assert_eq!(call.type_arguments.map(|t| t.len()), Some(1));
        let Statement::Variable(second) = &file.statements[1] else {
            panic!("expected variable");
        };
        assert!(matches!(second.declarations[0].initializer, Some(Expression::Binary(_))));
    });
}

#[test]
fn test_optional_chain_and_non_null() {
    with_parsed("const v = a?.b?.[0]?.(1)!.c;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(matches!(first_initializer(file), Expression::PropertyAccess(_)));
    });
}

#[test]
fn test_object_literal_forms() {
    with_parsed(
        "const o = { a: 1, b, [k]: 2, \"s\": 3, m() {}, get g() { return 1; }, async *h() {}, ...rest };",
        |file, diagnostics| {
            assert!(diagnostics.is_empty(), "{diagnostics:?}");
            let Expression::ObjectLiteral(obj) = first_initializer(file) else {
                panic!("expected object literal");
            };
            assert_eq!(obj.properties.len(), 8);
            assert!(matches!(obj.properties[1], ObjectLiteralElement::Shorthand(_)));
            assert!(matches!(obj.properties[7], ObjectLiteralElement::Spread(_)));
        },
    );
}

#[test]
fn test_template_literal() {
    with_parsed("const s = `a${x}b${y + 1}c`;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Expression::Template(template) = first_initializer(file) else {
            panic!("expected template");
        };
        assert_eq!(template.head.cooked, "a");
        assert_eq!(template.spans.len(), 2);
        assert_eq!(template.spans[1].literal.raw, "c");
    });
}

#[test]
fn test_regex_literal() {
    with_parsed("const r = /ab+c/gi;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(first_initializer(file), Expression::RegularExpressionLiteral(r) if r.raw == "/ab+c/gi"));
    });
}

#[test]
fn test_type_assertion() {
    with_parsed("const n = <number>value;", |file, _| {
        assert!(matches!(first_initializer(file), Expression::TypeAssertion(_)));
    });
}

#[test]
fn test_dynamic_import_and_meta() {
    assert_statement_count("const m = import(\"./m\");\nconst u = import.meta.url;", 2);
}

#[test]
fn test_new_expression() {
    with_parsed("const m = new Map<string, number>();", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Expression::New(new) = first_initializer(file) else {
            panic!("expected new");
        };
        assert_eq!(new.type_arguments.map(|t| t.len()), Some(2));
    });
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_parse_class_with_members() {
    let src = r#"
        class Person extends Base<string> implements Named {
            static count = 0;
            private readonly id: number;
            #secret?: string;
            constructor(public name: string, private age = 3) {
                super();
            }
            get label(): string { return this.name; }
            greet(): string {
                return "Hello, " + this.name;
            }
            [key: string]: unknown;
            static { Person.count = 1; }
        }
    "#;
    with_parsed(src, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::Class(class) = &file.statements[0] else {
            panic!("expected class");
        };
        assert!(class.extends.is_some());
        assert_eq!(class.implements.len(), 1);
        assert_eq!(class.members.len(), 8);
        let ClassElement::Method(ctor) = class.members[3] else {
            panic!("expected constructor");
        };
        assert_eq!(ctor.kind, MethodKind::Constructor);
        assert!(ctor.parameters[0].is_parameter_property());
        assert!(ctor.parameters[1].data.has_modifier(ModifierFlags::PRIVATE));
        assert!(matches!(class.members[6], ClassElement::Index(_)));
        assert!(matches!(class.members[7], ClassElement::StaticBlock(_)));
    });
}

#[test]
fn test_modifier_words_as_member_names() {
    with_parsed("class C { static() {} readonly = 1; get; }", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::Class(class) = &file.statements[0] else {
            panic!("expected class");
        };
        assert_eq!(class.members.len(), 3);
        assert!(matches!(class.members[0], ClassElement::Method(m) if m.data.modifier_flags.is_empty()));
    });
}

#[test]
fn test_abstract_class() {
    with_parsed("abstract class Shape { abstract area(): number; }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(file.statements[0].data().has_modifier(ModifierFlags::ABSTRACT));
    });
}

#[test]
fn test_decorators_are_rejected() {
    assert!(has_errors("@sealed class C {}"));
}

// ============================================================================
// Interfaces and Type Aliases
// ============================================================================

#[test]
fn test_parse_interface() {
    let src = r#"
        interface User extends Base {
            readonly id: number;
            name: string;
            email?: string;
            greet(msg: string): void;
            (x: number): string;
            new (x: number): User;
            [key: string]: unknown
        }
    "#;
    with_parsed(src, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::Interface(decl) = &file.statements[0] else {
            panic!("expected interface");
        };
        assert_eq!(decl.name.name, "User");
        assert_eq!(decl.extends.len(), 1);
        assert_eq!(decl.members.len(), 7);
        assert!(matches!(decl.members[0], TypeElement::Property(p) if p.data.has_modifier(ModifierFlags::READONLY)));
        assert!(matches!(decl.members[2], TypeElement::Property(p) if p.optional));
        assert!(matches!(decl.members[3], TypeElement::Method(_)));
        assert!(matches!(decl.members[4], TypeElement::Call(_)));
        assert!(matches!(decl.members[5], TypeElement::Construct(_)));
        assert!(matches!(decl.members[6], TypeElement::Index(_)));
    });
}

fn alias_type<'a>(file: &SourceFile<'a>) -> &'a TypeNode<'a> {
    match &file.statements[0] {
        Statement::TypeAlias(alias) => alias.type_node,
        other => panic!("expected type alias, got {other:?}"),
    }
}

#[test]
fn test_union_of_literals() {
    with_parsed("type Direction = \"up\" | \"down\" | -1 | true;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let TypeNode::Union(union) = alias_type(file) else {
            panic!("expected union");
        };
        assert_eq!(union.types.len(), 4);
        assert!(matches!(
            union.types[2],
            TypeNode::Literal(LiteralTypeNode { literal: Expression::PrefixUnary(_), .. })
        ));
    });
}

#[test]
fn test_leading_bar_union() {
    with_parsed("type T =\n  | { kind: \"a\" }\n  | { kind: \"b\" };", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(alias_type(file), TypeNode::Union(u) if u.types.len() == 2));
    });
}

#[test]
fn test_function_type_versus_parenthesized() {
    with_parsed("type F = (a: string) => void;", |file, _| {
        assert!(matches!(alias_type(file), TypeNode::Function(_)));
    });
    with_parsed("type P = (string | number)[];", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(alias_type(file), TypeNode::Array(_)));
    });
}

#[test]
fn test_conditional_type() {
    with_parsed(
        "type R<T> = T extends (...args: any[]) => infer U ? U : never;",
        |file, diagnostics| {
            assert!(diagnostics.is_empty(), "{diagnostics:?}");
            let TypeNode::Conditional(cond) = alias_type(file) else {
                panic!("expected conditional");
            };
            assert!(matches!(cond.extends_type, TypeNode::Function(_)));
        },
    );
}

#[test]
fn test_mapped_type() {
    with_parsed("type Ro<T> = { readonly [P in keyof T]?: T[P] };", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let TypeNode::Mapped(mapped) = alias_type(file) else {
            panic!("expected mapped type");
        };
        assert!(mapped.readonly);
        assert!(mapped.optional);
        assert!(matches!(mapped.type_node, Some(TypeNode::IndexedAccess(_))));
    });
}

#[test]
fn test_tuple_type() {
    with_parsed("type T = [name: string, age?: number, ...rest: boolean[]];", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let TypeNode::Tuple(tuple) = alias_type(file) else {
            panic!("expected tuple");
        };
        assert_eq!(tuple.elements.len(), 3);
        assert!(tuple.elements[1].optional);
        assert!(tuple.elements[2].rest);
    });
}

#[test]
fn test_nested_generic_arguments() {
    with_parsed("type M = Map<string, Array<Array<number>>>;", |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(matches!(alias_type(file), TypeNode::Reference(r) if r.type_arguments.map(|a| a.len()) == Some(2)));
    });
}

#[test]
fn test_template_literal_type() {
    with_parsed("type Id = `user-${number}`;", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        assert!(matches!(alias_type(file), TypeNode::TemplateLiteral(t) if t.head.cooked == "user-"));
    });
}

#[test]
fn test_type_operators() {
    with_parsed("type K = keyof typeof config;", |file, _| {
        assert!(matches!(alias_type(file), TypeNode::Operator(o) if o.operator == TypeOperator::KeyOf));
    });
}

// ============================================================================
// Enums, Namespaces and Modules
// ============================================================================

#[test]
fn test_parse_enums() {
    with_parsed("enum Dir { Up = \"UP\", Down = \"DOWN\" }\nconst enum Status { Ok = 200 }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Enum(dir) = &file.statements[0] else {
            panic!("expected enum");
        };
        assert_eq!(dir.members.len(), 2);
        assert!(file.statements[1].data().has_modifier(ModifierFlags::CONST));
    });
}

#[test]
fn test_dotted_namespace_nests() {
    with_parsed("namespace A.B { export const x = 1; }", |file, diagnostics| {
        assert!(diagnostics.is_empty());
        let Statement::Module(outer) = &file.statements[0] else {
            panic!("expected module");
        };
        assert_eq!(outer.name, "A");
        let inner = outer.body.expect("body");
        assert!(matches!(inner[0], Statement::Module(m) if m.name == "B" && m.data.has_modifier(ModifierFlags::EXPORT)));
    });
}

#[test]
fn test_declare_forms() {
    assert_statement_count(
        "declare const VERSION: string;\ndeclare function f(): void;\ndeclare module \"m\" { }\ndeclare global { interface Window { x: number } }",
        4,
    );
}

// ============================================================================
// Import / Export
// ============================================================================

#[test]
fn test_import_forms() {
    let src = r#"
        import def, { a, b as c, type T } from "./m";
        import * as ns from "./ns";
        import type { Shape } from "./shapes";
        import "./side-effect";
        import fs = require("fs");
    "#;
    with_parsed(src, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::Import(first) = &file.statements[0] else {
            panic!("expected import");
        };
        assert_eq!(first.default_binding.map(|d| d.name), Some("def"));
        let named = first.named_bindings.expect("named bindings");
        assert_eq!(named.len(), 3);
        assert!(named[2].is_type_only);
        assert!(matches!(file.statements[2], Statement::Import(i) if i.is_type_only));
        assert!(matches!(file.statements[3], Statement::Import(i) if i.is_side_effect_only()));
        assert!(matches!(file.statements[4], Statement::ImportEquals(_)));
    });
}

#[test]
fn test_export_forms() {
    let src = r#"
        export const a = 1;
        export default function () {}
        export { a as b };
        export * from "./all";
        export type { T } from "./types";
        export interface I { x: number }
        export = a;
    "#;
    with_parsed(src, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(file.statements.len(), 7);
        assert!(file.statements[0].data().has_modifier(ModifierFlags::EXPORT));
        assert!(file.statements[1].data().has_modifier(ModifierFlags::DEFAULT));
        assert!(matches!(file.statements[4], Statement::Export(e) if e.is_type_only));
        assert!(matches!(file.statements[6], Statement::ExportAssignment(e) if e.is_export_equals));
    });
}

// ============================================================================
// Control Flow
// ============================================================================

#[test]
fn test_control_flow_statements() {
    let src = r#"
        if (a) b(); else { c(); }
        for (let i = 0; i < 10; i++) {}
        for (const k in obj) {}
        for await (const v of stream) {}
        while (x) break;
        do { x--; } while (x > 0)
        switch (v) { case 1: f(); break; default: g(); }
        try { risky(); } catch (e: unknown) { log(e); } finally { done(); }
        outer: for (;;) { continue outer; }
        throw new Error("x");
    "#;
    with_parsed(src, |file, diagnostics| {
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(file.statements.len(), 10);
        assert!(matches!(file.statements[2], Statement::ForIn(_)));
        assert!(matches!(file.statements[3], Statement::ForOf(f) if f.is_await));
    });
}

#[test]
fn test_for_in_initializer_disallows_in() {
    with_parsed("for (var x = 0 in y) {}", |file, _| {
        assert!(matches!(file.statements[0], Statement::ForIn(_)));
    });
}

// ============================================================================
// Error Recovery
// ============================================================================

#[test]
fn test_missing_semicolon_reports() {
    with_parsed("let a = 1 let b = 2;", |_, diagnostics| {
        assert_eq!(diagnostics, ["';' expected."]);
    });
}

#[test]
fn test_asi_on_newline() {
    assert_statement_count("let a = 1\nlet b = 2\n", 2);
}

#[test]
fn test_recovery_continues_after_error() {
    with_parsed("let = ;\nfunction ok() { return 1; }", |file, diagnostics| {
        assert!(!diagnostics.is_empty());
        assert!(file.statements.iter().any(|s| matches!(s, Statement::Function(_))));
    });
}

#[test]
fn test_deep_nesting_is_bounded() {
    let src = format!("x = {}1{};", "(".repeat(400), ")".repeat(400));
    with_parsed(&src, |_, diagnostics| {
        assert!(diagnostics.iter().any(|d| d.contains("nesting")));
    });
}

#[test]
fn test_node_ranges() {
    with_parsed("  const x = 1;", |file, _| {
        let range = file.statements[0].data().range;
        assert_eq!((range.pos, range.end), (2, 14));
    });
}

#[test]
fn test_comments_are_collected() {
    with_parsed("// lead\nconst x = 1; /* trail */", |file, _| {
        assert_eq!(file.comments.len(), 2);
    });
}
