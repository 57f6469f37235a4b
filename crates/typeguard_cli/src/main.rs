//! tgc: The typeguard compiler CLI.
//!
//! Usage:
//!   tgc [options] [file...]
//!
//! Exit codes: 0 on success, 1 when static diagnostics are fatal under the
//! active policy, 2 on parse, config or I/O errors.

use clap::Parser as ClapParser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use typeguard_compiler::{CompileError, CompileOutput, Program};
use typeguard_diagnostics::Diagnostic;
use typeguard_options::{parse_config_file, CompilerOptions, ConfigFile, Mode};

/// Looked up in the working directory when no file or project is given.
const DEFAULT_CONFIG: &str = "typeguard.json";

#[derive(ClapParser, Debug)]
#[command(name = "tgc", version, about = "typeguard - compile typed JavaScript with runtime type guards")]
struct Cli {
    /// Source files to compile.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to typeguard.json.
    #[arg(short = 'p', long = "project", value_name = "CONFIG")]
    project: Option<PathBuf>,

    /// development, production or strict.
    #[arg(long)]
    mode: Option<Mode>,

    /// Redirect output structure to the directory.
    #[arg(long = "out-dir", value_name = "DIR")]
    out_dir: Option<String>,

    /// Analyze only; do not emit outputs.
    #[arg(long)]
    check: bool,

    /// Print outputs to stdout instead of writing files.
    #[arg(long)]
    stdout: bool,

    /// Treat static diagnostics as fatal.
    #[arg(long = "fail-on-diagnostics")]
    fail_on_diagnostics: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const EXIT_DIAGNOSTICS: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("TYPEGUARD_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();
    ExitCode::from(run_compile(&cli))
}

fn run_compile(cli: &Cli) -> u8 {
    let start = Instant::now();

    let (files, config) = match resolve_input_files(cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            report_error(err);
            return EXIT_FATAL;
        }
    };

    if files.is_empty() {
        print_error("No input files found.");
        return EXIT_FATAL;
    }

    // CLI options override typeguard.json
    let mut options = CompilerOptions {
        mode: cli.mode,
        out_dir: cli.out_dir.clone(),
        fail_on_diagnostics: cli.fail_on_diagnostics.then_some(true),
        ..CompilerOptions::default()
    };
    if let Some(ref config) = config {
        options.merge(&config.options());
    }
    let fail_on_diagnostics = options.fail_on_diagnostics();
    tracing::debug!(mode = %options.mode(), files = files.len(), fail_on_diagnostics, "resolved options");

    let mut program = Program::new(options);
    if let Err(err) = program.load_files(&files) {
        report_error(err);
        return EXIT_FATAL;
    }

    let use_color = std::io::stderr().is_terminal();
    let mut exit_code = 0;
    let mut error_count = 0;
    for result in program.compile_all() {
        let output = match report_unit(result, fail_on_diagnostics, use_color) {
            Ok(output) => output,
            Err((code, errors)) => {
                exit_code = exit_code.max(code);
                error_count += errors;
                continue;
            }
        };
        if cli.check {
            continue;
        }
        if cli.stdout {
            print!("{}", output.code);
        } else if let Err(err) = output.write() {
            exit_code = EXIT_FATAL;
            error_count += 1;
            report_error(err);
        }
    }

    if error_count > 0 {
        let plural = if error_count == 1 { "" } else { "s" };
        if use_color {
            eprintln!("\n{}Found {} error{}.{}", RED, error_count, plural, RESET);
        } else {
            eprintln!("\nFound {} error{}.", error_count, plural);
        }
    } else if use_color {
        eprintln!("{}Compilation completed in {:.2}s.{}", GRAY, start.elapsed().as_secs_f64(), RESET);
    }

    exit_code
}

/// Print what one unit reported. A failed unit yields its exit code and the
/// number of errors it counts for: one per static diagnostic when they are
/// fatal, one for a parse or I/O error.
fn report_unit(
    result: Result<CompileOutput, CompileError>,
    fail_on_diagnostics: bool,
    use_color: bool,
) -> Result<CompileOutput, (u8, usize)> {
    let output = result.map_err(|err| {
        report_error(err);
        (EXIT_FATAL, 1)
    })?;
    for warning in &output.warnings {
        print_diagnostic(warning, use_color);
    }
    let count = output.diagnostics.len();
    let output = output.check(fail_on_diagnostics).map_err(|err| {
        // The report lists every diagnostic.
        report_error(err);
        (EXIT_DIAGNOSTICS, count)
    })?;
    for diag in &output.diagnostics {
        print_diagnostic(diag, use_color);
    }
    Ok(output)
}

fn resolve_input_files(cli: &Cli) -> Result<(Vec<PathBuf>, Option<ConfigFile>), CompileError> {
    if let Some(ref project) = cli.project {
        let config = parse_config_file(project)?;
        let files = if cli.files.is_empty() { config.resolved_files(project) } else { cli.files.clone() };
        Ok((files, Some(config)))
    } else if !cli.files.is_empty() {
        Ok((cli.files.clone(), None))
    } else if Path::new(DEFAULT_CONFIG).exists() {
        let config = parse_config_file(Path::new(DEFAULT_CONFIG))?;
        Ok((config.resolved_files(Path::new(DEFAULT_CONFIG)), Some(config)))
    } else {
        Ok((vec![], None))
    }
}

fn print_diagnostic(diag: &Diagnostic, use_color: bool) {
    if use_color {
        let color = if diag.is_error() { RED } else { YELLOW };
        if let Some(ref file) = diag.file {
            eprint!("{}{}{}", CYAN, file, RESET);
            if let Some(span) = diag.span {
                eprint!("({})", span.start);
            }
            eprint!(": ");
        }
        eprintln!(
            "{}{}{}{} {}TG{}{}: {}",
            BOLD, color, diag.category, RESET, CYAN, diag.code, RESET, diag.message_text
        );
    } else {
        eprintln!("{}", diag);
    }
}

fn report_error(err: impl Into<CompileError>) {
    eprintln!("{:?}", miette::Report::new(err.into()));
}

fn print_error(msg: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["tgc", "--mode", "strict", "--out-dir", "dist", "--stdout", "a.ts", "b.ts"]);
        assert_eq!(cli.mode, Some(Mode::Strict));
        assert_eq!(cli.out_dir.as_deref(), Some("dist"));
        assert!(cli.stdout);
        assert!(!cli.check);
        assert_eq!(cli.files, vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]);
    }

    #[test]
    fn test_fatal_diagnostics_counted_individually() {
        let source = "let a: number = \"1\";\nlet b: string = 2;";
        let compiled = || typeguard_compiler::compile("a.ts", source, &CompilerOptions::default());
        assert!(matches!(report_unit(compiled(), true, false), Err((EXIT_DIAGNOSTICS, 2))));
        let output = report_unit(compiled(), false, false).unwrap();
        assert_eq!(output.diagnostics.len(), 2);
    }

    #[test]
    fn test_parse_error_counts_once() {
        let result = typeguard_compiler::compile("bad.ts", "let = ;", &CompilerOptions::default());
        assert!(matches!(report_unit(result, false, false), Err((EXIT_FATAL, 1))));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["tgc", "--mode", "fast", "a.ts"]).is_err());
    }
}
