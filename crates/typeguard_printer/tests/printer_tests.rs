//! Printer integration tests: parse, print, and compare.

use bumpalo::Bump;
use typeguard_parser::parse_source_file;
use typeguard_printer::{Printer, PrinterOptions};

fn print(source: &str) -> String {
    let arena = Bump::new();
    let (file, diagnostics) = parse_source_file(&arena, "test.ts", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    Printer::new().print_source_file(&file)
}

/// Printing is a fixed point after one pass.
fn assert_stable(source: &str) {
    let once = print(source);
    let twice = print(&once);
    assert_eq!(once, twice, "printing is not stable for:\n{source}");
}

#[test]
fn test_print_variable_with_type() {
    assert_eq!(print("let age:number=25"), "let age: number = 25;\n");
}

#[test]
fn test_print_function() {
    let out = print("function add(a: number, b: number): number { return a + b }");
    assert_eq!(
        out,
        "function add(a: number, b: number): number {\n    return a + b;\n}\n"
    );
}

#[test]
fn test_print_interface_and_alias() {
    let out = print("interface User { readonly id: number; name?: string }\ntype D = \"up\" | \"down\";");
    assert_eq!(
        out,
        "interface User {\n    readonly id: number;\n    name?: string;\n}\ntype D = \"up\" | \"down\";\n"
    );
}

#[test]
fn test_print_class() {
    let out = print("class A extends B { private x = 1; static get y() { return 2; } }");
    assert_eq!(
        out,
        "class A extends B {\n    private x = 1;\n    static get y() {\n        return 2;\n    }\n}\n"
    );
}

#[test]
fn test_parentheses_are_kept() {
    assert_eq!(print("x = (a + b) * c;"), "x = (a + b) * c;\n");
    assert_eq!(print("f = () => ({ a: 1 });"), "f = () => ({ a: 1 });\n");
}

#[test]
fn test_print_types() {
    assert_eq!(
        print("type T = { a: string[]; b: [number, string?]; c: Map<string, (x: number) => void> };"),
        "type T = { a: string[]; b: [number, string?]; c: Map<string, (x: number) => void> };\n"
    );
    assert_eq!(print("type U = (A | B)[];"), "type U = (A | B)[];\n");
}

#[test]
fn test_print_imports_and_exports() {
    let out = print("import d, { a as b } from \"./m\";\nexport { b };\nexport * as ns from \"./n\";");
    assert_eq!(
        out,
        "import d, { a as b } from \"./m\";\nexport { b };\nexport * as ns from \"./n\";\n"
    );
}

#[test]
fn test_leading_comments_are_preserved() {
    let src = "// greet the user\nfunction greet() {\n    /* inner */\n    return 1;\n}\n";
    assert_eq!(print(src), src);
}

#[test]
fn test_comments_can_be_disabled() {
    let arena = Bump::new();
    let (file, _) = parse_source_file(&arena, "test.ts", "// note\nlet a = 1;");
    let options = PrinterOptions {
        preserve_comments: false,
        ..PrinterOptions::default()
    };
    assert_eq!(Printer::with_options(options).print_source_file(&file), "let a = 1;\n");
}

#[test]
fn test_comment_inside_removed_construct_is_not_leading() {
    let arena = Bump::new();
    let (file, _) = parse_source_file(&arena, "test.ts", "interface I {\n  // hidden\n  x: number;\n}\nlet a = 1;");
    let kept = &file.statements[1..];
    let stripped = typeguard_ast::SourceFile { statements: kept, ..file };
    assert_eq!(Printer::new().print_source_file(&stripped), "let a = 1;\n");
}

#[test]
fn test_round_trip_is_stable() {
    assert_stable(
        r#"
        enum Color { Red, Green = "g", Blue = 4 }
        namespace NS { export const v = 1; }
        abstract class Shape<T extends object = {}> implements Named {
            constructor(public readonly name: string, protected size?: number) {}
            abstract area(): number;
        }
        const pick = <K extends keyof T, T>(o: T, k: K): T[K] => o[k];
        for (const [k, v] of Object.entries(obj)) { if (!v) continue; else break; }
        switch (x) { case 1: y(); break; default: z(); }
        try { a(); } catch { b(); } finally { c(); }
        label: while (true) { break label; }
        const t = `a${b}c`, n = -(-x), s = typeof v === "string" ? v as string : String(v!);
        type C<T> = T extends string ? "s" : T extends number ? "n" : never;
        type M = { readonly [K in "a" | "b"]?: number };
        "#,
    );
}
