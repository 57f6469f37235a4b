//! typeguard_compiler: Compiler orchestration.
//!
//! Runs one compilation unit through parse -> build registry -> analyze ->
//! strip/instrument -> emit, and compiles many units in parallel.

mod error;

pub use error::{CompileError, StaticDiagnostic};

use bumpalo::Bump;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use typeguard_checker::analyze;
use typeguard_diagnostics::Diagnostic;
use typeguard_emitter::Emitter;
use typeguard_options::{CompilerOptions, Mode};
use typeguard_parser::parse_source_file;
use typeguard_types::{build_registry, Registry};

/// The result of compiling one unit.
#[derive(Debug)]
pub struct CompileOutput {
    pub file_name: String,
    pub mode: Mode,
    /// The emitted JavaScript.
    pub code: String,
    /// Where `code` is written.
    pub output_path: PathBuf,
    /// Static analyzer findings, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Registry builder notes: rejected recursive references, non-constant
    /// enum members, and the like. They never affect [`CompileOutput::ok`].
    pub warnings: Vec<Diagnostic>,
    pub guard_count: usize,
    /// The declarations the unit was compiled against.
    pub registry: Registry,
    source_text: String,
}

impl CompileOutput {
    /// The static diagnostics as strings.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.message_text.clone()).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|d| d.message_text.clone()).collect()
    }

    /// True when the static analyzer reported nothing.
    pub fn ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Escalate static diagnostics to an error when `fail_on_diagnostics`
    /// is set.
    pub fn check(self, fail_on_diagnostics: bool) -> Result<Self, CompileError> {
        if fail_on_diagnostics && !self.ok() {
            return Err(CompileError::diagnostics(&self.file_name, &self.source_text, &self.diagnostics));
        }
        Ok(self)
    }

    /// Write `code` to `output_path`.
    pub fn write(&self) -> Result<(), CompileError> {
        let display = self.output_path.display().to_string();
        if self.output_path == Path::new(&self.file_name) {
            let source = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "output would overwrite its source file");
            return Err(CompileError::io(display, source));
        }
        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompileError::io(&display, e))?;
        }
        std::fs::write(&self.output_path, &self.code).map_err(|e| CompileError::io(display, e))
    }
}

/// Compile one unit. A parse error aborts; static diagnostics are reported
/// in the output and left to the caller.
pub fn compile(file_name: &str, source_text: &str, options: &CompilerOptions) -> Result<CompileOutput, CompileError> {
    let mode = options.mode();
    let _span = tracing::info_span!("compile", file = file_name, mode = %mode).entered();
    let arena = Bump::new();

    let (file, parse_diagnostics) = parse_source_file(&arena, file_name, source_text);
    if parse_diagnostics.has_errors() {
        tracing::debug!(count = parse_diagnostics.len(), "parse failed");
        return Err(CompileError::parse(file_name, source_text, parse_diagnostics.diagnostics()));
    }

    let (registry, builder_diagnostics) = build_registry(&file);
    let report = analyze(&file, &registry);
    let result = Emitter::from_options(options).emit(&arena, &file, &registry);

    let output_path = result
        .output_files
        .first()
        .map(|f| f.path.clone())
        .unwrap_or_else(|| PathBuf::from(file_name).with_extension("js"));

    Ok(CompileOutput {
        file_name: file_name.to_string(),
        mode,
        code: result.js_content,
        output_path,
        diagnostics: report.into_diagnostics().into_diagnostics(),
        warnings: builder_diagnostics.into_diagnostics(),
        guard_count: result.guard_count,
        registry,
        source_text: source_text.to_string(),
    })
}

/// The program is the set of units compiled with one set of options.
pub struct Program {
    /// Compiler options.
    pub options: CompilerOptions,
    /// Loaded sources as (file name, text), in the order added.
    source_files: Vec<(String, String)>,
}

impl Program {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            source_files: Vec::new(),
        }
    }

    /// Add a source file to the program.
    pub fn add_source(&mut self, file_name: impl Into<String>, source_text: impl Into<String>) {
        self.source_files.push((file_name.into(), source_text.into()));
    }

    /// Load files from disk.
    pub fn load_files<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<(), CompileError> {
        for file in files {
            let path = file.as_ref();
            let display = path.display().to_string();
            let content = std::fs::read_to_string(path).map_err(|e| CompileError::io(&display, e))?;
            self.source_files.push((display, content));
        }
        Ok(())
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.source_files.iter().map(|(name, _)| name.as_str())
    }

    /// Compile every unit in parallel. Each unit has its own arena, registry
    /// and name counter; results come back in the order files were added.
    pub fn compile_all(&self) -> Vec<Result<CompileOutput, CompileError>> {
        tracing::debug!(files = self.source_files.len(), "compiling program");
        self.source_files
            .par_iter()
            .map(|(file_name, source_text)| compile(file_name, source_text, &self.options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_fatal() {
        let err = compile("bad.ts", "let = ;", &CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_check_policy() {
        let source = "let age: number = \"25\";";
        let output = compile("a.ts", source, &CompilerOptions::default()).unwrap();
        assert!(!output.ok());
        let output = output.check(false).unwrap();
        let err = output.check(true).unwrap_err();
        match &err {
            CompileError::Diagnostics { count, file, .. } => {
                assert_eq!(*count, 1);
                assert_eq!(file, "a.ts");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_output_path_follows_out_dir() {
        let mut options = CompilerOptions::default();
        options.out_dir = Some("dist".to_string());
        let output = compile("src/a.ts", "let x = 1;", &options).unwrap();
        assert_eq!(output.output_path, PathBuf::from("dist/a.js"));
    }

    #[test]
    fn test_compile_all_keeps_order() {
        let mut program = Program::new(CompilerOptions::with_mode(Mode::Production));
        for i in 0..8 {
            program.add_source(format!("f{i}.ts"), format!("let v{i}: number = {i};"));
        }
        let outputs = program.compile_all();
        assert_eq!(outputs.len(), 8);
        for (i, output) in outputs.into_iter().enumerate() {
            let output = output.unwrap();
            assert_eq!(output.file_name, format!("f{i}.ts"));
            assert_eq!(output.code, format!("let v{i} = {i};\n"));
        }
    }
}
