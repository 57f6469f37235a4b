//! Compilation errors, rendered with miette.

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use typeguard_diagnostics::Diagnostic as TgDiagnostic;
use typeguard_options::ConfigError;

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    /// The source could not be parsed. Always fatal.
    #[error("{message}")]
    #[diagnostic(code(typeguard::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
        #[help]
        help: Option<String>,
    },

    /// Static diagnostics escalated by the caller's policy.
    #[error("{count} static diagnostic(s) in {file}")]
    #[diagnostic(code(typeguard::diagnostics))]
    Diagnostics {
        file: String,
        count: usize,
        #[related]
        related: Vec<StaticDiagnostic>,
    },

    #[error(transparent)]
    #[diagnostic(code(typeguard::config))]
    Config(#[from] ConfigError),

    #[error("cannot access {path}")]
    #[diagnostic(code(typeguard::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One static analyzer finding, with the source it points into.
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(typeguard::type_mismatch))]
pub struct StaticDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("TG{code}")]
    span: Option<SourceSpan>,
    code: u32,
}

fn source_span(diagnostic: &TgDiagnostic) -> Option<SourceSpan> {
    diagnostic
        .span
        .map(|span| (span.start as usize, span.length as usize).into())
}

impl CompileError {
    /// The first parse error of `file_name`, noting how many follow it.
    pub(crate) fn parse(file_name: &str, source_text: &str, errors: &[TgDiagnostic]) -> Self {
        let first = errors.first();
        let help = match errors.len() {
            0 | 1 => None,
            2 => Some("1 more parse error follows".to_string()),
            n => Some(format!("{} more parse errors follow", n - 1)),
        };
        CompileError::Parse {
            message: first.map_or_else(|| "parse error".to_string(), |d| d.message_text.clone()),
            src: NamedSource::new(file_name, source_text.to_string()),
            span: first.and_then(source_span),
            help,
        }
    }

    pub(crate) fn diagnostics(file_name: &str, source_text: &str, diagnostics: &[TgDiagnostic]) -> Self {
        let related = diagnostics
            .iter()
            .map(|d| StaticDiagnostic {
                message: d.message_text.clone(),
                src: NamedSource::new(file_name, source_text.to_string()),
                span: source_span(d),
                code: d.code,
            })
            .collect();
        CompileError::Diagnostics {
            file: file_name.to_string(),
            count: diagnostics.len(),
            related,
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    /// Parse and I/O failures stop a build before any output exists.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompileError::Diagnostics { .. })
    }
}
