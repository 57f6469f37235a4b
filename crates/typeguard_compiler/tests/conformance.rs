//! Erasure conformance tests.
//!
//! Production output of typed code must print exactly like the same program
//! written without types, and every mode must accept the whole dialect.

use typeguard_compiler::compile;
use typeguard_options::{CompilerOptions, Mode};

const ERASABLE_TS: &str = include_str!("fixtures/erasable.ts");
const ERASABLE_JS: &str = include_str!("fixtures/erasable.js");

/// A typed snippet and its hand-erased counterpart.
struct Case {
    name: &'static str,
    typed: &'static str,
    erased: &'static str,
}

const CASES: &[Case] = &[
    Case {
        name: "annotations",
        typed: "let a: number = 1; const b: string[] = []; var c: [number, string?] = [1];",
        erased: "let a = 1; const b = []; var c = [1];",
    },
    Case {
        name: "declarations",
        typed: "interface I { x: number }\ntype T = I | null;\ndeclare function ext(): void;\nlet y = 2;",
        erased: "let y = 2;",
    },
    Case {
        name: "assertions",
        typed: "const v = (load() as unknown as number)!;\nconst w = <any>v;",
        erased: "const v = (load());\nconst w = v;",
    },
    Case {
        name: "generics",
        typed: "function id<T extends object>(x: T): T { return x; }\nconst n = id<number>(3);",
        erased: "function id(x) { return x; }\nconst n = id(3);",
    },
    Case {
        name: "classes",
        typed: "abstract class A<T> implements I { abstract run(): void; protected readonly x!: T; static s?: number; constructor(private readonly y: string) { super(); } }",
        erased: "class A { x; static s; constructor(y) { super(); this.y = y; } }",
    },
    Case {
        name: "overloads",
        typed: "function f(x: string): string;\nfunction f(x: number): number;\nfunction f(x: any) { return x; }",
        erased: "function f(x) { return x; }",
    },
    Case {
        name: "type-only imports",
        typed: "import type { A } from \"./a\";\nimport { type B, c } from \"./b\";\nexport type { A };\nc();",
        erased: "import { c } from \"./b\";\nc();",
    },
    Case {
        name: "arrow functions",
        typed: "const add = (a: number, b: number): number => a + b;\nconst f = async (x: number): Promise<number> => x;",
        erased: "const add = (a, b) => a + b;\nconst f = async (x) => x;",
    },
];

fn production(file_name: &str, source: &str) -> String {
    match compile(file_name, source, &CompilerOptions::with_mode(Mode::Production)) {
        Ok(output) => output.code,
        Err(err) => panic!("{file_name}: {err:?}"),
    }
}

#[test]
fn test_erasable_fixture_matches_hand_erased_program() {
    assert_eq!(production("erasable.ts", ERASABLE_TS), production("erasable.js", ERASABLE_JS));
}

#[test]
fn test_erasure_cases() {
    let mut failures = Vec::new();
    for case in CASES {
        let typed = production("typed.ts", case.typed);
        let erased = production("erased.js", case.erased);
        if typed != erased {
            failures.push(format!("{}:\n  typed:  {typed:?}\n  erased: {erased:?}", case.name));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_every_mode_accepts_the_dialect() {
    for mode in [Mode::Development, Mode::Production, Mode::Strict] {
        let options = CompilerOptions::with_mode(mode);
        for case in CASES {
            let result = compile("case.ts", case.typed, &options);
            assert!(result.is_ok(), "{} in {mode}: {:?}", case.name, result.err());
        }
        assert!(compile("erasable.ts", ERASABLE_TS, &options).is_ok());
    }
}

#[test]
fn test_untyped_code_is_unchanged_by_development_mode() {
    let dev = compile("erasable.js", ERASABLE_JS, &CompilerOptions::with_mode(Mode::Development))
        .map(|output| output.code)
        .unwrap_or_default();
    // Only the prelude is added in front of the program.
    assert!(dev.ends_with(&production("erasable.js", ERASABLE_JS)));
    assert!(!dev.contains("__tg_types"));
}
