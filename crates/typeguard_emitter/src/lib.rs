//! typeguard_emitter: JavaScript output.
//!
//! Coordinates the output side of a compilation:
//! 1. Strip types, adding guards unless the mode is production
//! 2. Prepend the runtime prelude and the descriptor table
//! 3. Print to text
//! 4. Write output files

pub mod prelude;

use bumpalo::Bump;
use std::path::{Path, PathBuf};
use typeguard_ast::node::{SourceFile, Statement};
use typeguard_ast::NodeFactory;
use typeguard_options::{CompilerOptions, Mode, DEFAULT_MAX_INLINE_DEPTH};
use typeguard_printer::{Printer, PrinterOptions};
use typeguard_transformers::{Instrumenter, Stripper};
use typeguard_types::Registry;

pub use prelude::{prelude, types_table, WARNING_PREFIX};

/// The emitter produces JavaScript from a parsed file and its registry.
#[derive(Debug, Clone)]
pub struct Emitter {
    pub mode: Mode,
    /// Whether to copy comments from the source text.
    pub preserve_comments: bool,
    pub max_inline_depth: u32,
    /// Output directory override.
    pub out_dir: Option<PathBuf>,
}

/// The result of emitting a source file.
#[derive(Debug, Clone)]
pub struct EmitResult {
    /// The emitted JavaScript.
    pub js_content: String,
    /// Number of guards inserted at function boundaries.
    pub guard_count: usize,
    /// Number of entries in the descriptor table.
    pub descriptor_count: usize,
    /// Output file paths.
    pub output_files: Vec<OutputFile>,
}

/// A file produced by the emitter.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// The output file path.
    pub path: PathBuf,
    /// The content of the file.
    pub text: String,
}

impl Emitter {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            preserve_comments: true,
            max_inline_depth: DEFAULT_MAX_INLINE_DEPTH,
            out_dir: None,
        }
    }

    pub fn from_options(options: &CompilerOptions) -> Self {
        Self {
            mode: options.mode(),
            preserve_comments: options.preserve_comments(),
            max_inline_depth: options.max_inline_depth(),
            out_dir: options.out_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Emit a source file to JavaScript.
    pub fn emit<'a>(&self, arena: &'a Bump, source_file: &SourceFile<'a>, registry: &Registry) -> EmitResult {
        let _span = tracing::debug_span!("emit", file = source_file.file_name, mode = %self.mode).entered();
        let factory = NodeFactory::new(arena);

        let (stripped, guard_count, table) = if self.mode.emits_guards() {
            let instrumenter =
                Instrumenter::new(registry, self.mode).with_max_inline_depth(self.max_inline_depth);
            let mut stripper = Stripper::new(factory).with_instrumenter(instrumenter);
            let stripped = stripper.strip_source_file(source_file);
            match stripper.into_instrumenter() {
                Some(instrumenter) => {
                    let count = instrumenter.guard_count();
                    (stripped, count, Some(instrumenter.into_table()))
                }
                None => (stripped, 0, None),
            }
        } else {
            (Stripper::new(factory).strip_source_file(source_file), 0, None)
        };

        let mut header: Vec<Statement<'a>> = Vec::new();
        if let Some(text) = prelude(self.mode) {
            header.push(factory.verbatim(&text));
        }
        let descriptor_count = table.as_ref().map_or(0, |t| t.len());
        if let Some(text) = table.as_ref().and_then(types_table) {
            header.push(factory.verbatim(&text));
        }
        let output = with_header(&factory, &stripped, header);

        let js_content = Printer::with_options(PrinterOptions {
            preserve_comments: self.preserve_comments,
            ..PrinterOptions::default()
        })
        .print_source_file(&output);

        tracing::debug!(guard_count, descriptor_count, bytes = js_content.len(), "emitted");

        let js_path = self.get_output_path(Path::new(source_file.file_name), ".js");
        EmitResult {
            output_files: vec![OutputFile {
                path: js_path,
                text: js_content.clone(),
            }],
            js_content,
            guard_count,
            descriptor_count,
        }
    }

    /// Where the output for `source` goes.
    pub fn get_output_path(&self, source: &Path, ext: &str) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let base_dir = if let Some(ref out_dir) = self.out_dir {
            out_dir.clone()
        } else {
            source.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
        };
        base_dir.join(format!("{}{}", stem.to_string_lossy(), ext))
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

/// `file` with `header` placed after its directive prologue.
fn with_header<'a>(factory: &NodeFactory<'a>, file: &SourceFile<'a>, header: Vec<Statement<'a>>) -> SourceFile<'a> {
    if header.is_empty() {
        return *file;
    }
    let prologue = file.statements.iter().take_while(|s| s.is_directive()).count();
    let mut statements = Vec::with_capacity(file.statements.len() + header.len());
    statements.extend_from_slice(&file.statements[..prologue]);
    statements.extend(header);
    statements.extend_from_slice(&file.statements[prologue..]);
    SourceFile {
        statements: factory.list(statements),
        ..*file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeguard_parser::parse_source_file;
    use typeguard_types::build_registry;

    fn emit(source: &str, mode: Mode) -> EmitResult {
        let arena = Bump::new();
        let (file, diagnostics) = parse_source_file(&arena, "src/app.ts", source);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
        let (registry, _) = build_registry(&file);
        Emitter::new(mode).emit(&arena, &file, &registry)
    }

    #[test]
    fn test_output_path() {
        let emitter = Emitter::default();
        let path = emitter.get_output_path(Path::new("src/foo.ts"), ".js");
        assert_eq!(path, PathBuf::from("src/foo.js"));
    }

    #[test]
    fn test_output_path_with_outdir() {
        let mut emitter = Emitter::default();
        emitter.out_dir = Some(PathBuf::from("dist"));
        let path = emitter.get_output_path(Path::new("src/foo.ts"), ".js");
        assert_eq!(path, PathBuf::from("dist/foo.js"));
    }

    #[test]
    fn test_from_options() {
        let mut options = CompilerOptions::with_mode(Mode::Strict);
        options.out_dir = Some("build".to_string());
        options.max_inline_depth = Some(1);
        let emitter = Emitter::from_options(&options);
        assert_eq!(emitter.mode, Mode::Strict);
        assert_eq!(emitter.max_inline_depth, 1);
        assert_eq!(emitter.out_dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn test_production_is_plain_stripped_source() {
        let result = emit("function id(x: number): number { return x; }", Mode::Production);
        assert_eq!(result.js_content, "function id(x) {\n    return x;\n}\n");
        assert_eq!(result.guard_count, 0);
        assert_eq!(result.output_files[0].path, PathBuf::from("src/app.js"));
    }

    #[test]
    fn test_prelude_emitted_once() {
        let result = emit(
            "function f(a: string) { return a; }\nfunction g(b: number) { return b; }",
            Mode::Development,
        );
        assert_eq!(result.js_content.matches("function __tg_report(").count(), 1);
        assert_eq!(result.js_content.matches("function __tg_matches(").count(), 1);
        assert_eq!(result.guard_count, 2);
    }

    #[test]
    fn test_prelude_follows_directives() {
        let result = emit("\"use strict\";\nfunction f(a: string) {}", Mode::Development);
        let directive = result.js_content.find("\"use strict\";").unwrap();
        let prelude = result.js_content.find("function __tg_matches(").unwrap();
        assert_eq!(directive, 0);
        assert!(prelude > directive);
    }

    #[test]
    fn test_types_table_emitted_for_deep_types() {
        let source = "type Deep = { a: { b: { c: { d: { e: { f: string } } } } } };\nfunction f(x: Deep) {}";
        let result = emit(source, Mode::Development);
        assert!(result.descriptor_count > 0);
        assert!(result.js_content.contains("const __tg_types = ["));
        assert!(result.js_content.contains("__tg_matches("));
    }
}
