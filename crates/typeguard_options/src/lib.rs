//! typeguard_options: Compilation mode, compiler options and `typeguard.json`.
//!
//! A config file has the same outline as a tsconfig:
//!
//! ```json
//! { "compilerOptions": { "mode": "development", "maxInlineDepth": 4 },
//!   "files": ["src/main.ts"] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Nesting depth up to which guards are inlined before falling back to the
/// runtime matcher.
pub const DEFAULT_MAX_INLINE_DEPTH: u32 = 4;

/// How types are enforced at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Guards warn through `console.warn` and let the value through.
    #[default]
    Development,
    /// Types are erased; nothing is checked.
    Production,
    /// Guards as in development, but a mismatch throws a `TypeError`.
    Strict,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::Strict => "strict",
        }
    }

    /// Whether guards and the runtime prelude are emitted.
    pub fn emits_guards(self) -> bool {
        !matches!(self, Mode::Production)
    }

    /// Whether a runtime mismatch throws instead of warning.
    pub fn throws(self) -> bool {
        !matches!(self, Mode::Development)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected one of: development, production, strict")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            "strict" => Ok(Mode::Strict),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Options under `compilerOptions`. Unset fields take their defaults from
/// the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub mode: Option<Mode>,
    /// Treat static diagnostics as fatal.
    pub fail_on_diagnostics: Option<bool>,
    pub max_inline_depth: Option<u32>,
    pub preserve_comments: Option<bool>,
    pub out_dir: Option<String>,
}

impl CompilerOptions {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    /// Defaults to `false` in development and `true` otherwise.
    pub fn fail_on_diagnostics(&self) -> bool {
        self.fail_on_diagnostics
            .unwrap_or(self.mode() != Mode::Development)
    }

    pub fn max_inline_depth(&self) -> u32 {
        self.max_inline_depth.unwrap_or(DEFAULT_MAX_INLINE_DEPTH)
    }

    pub fn preserve_comments(&self) -> bool {
        self.preserve_comments.unwrap_or(true)
    }

    /// Fill unset fields from `base`.
    pub fn merge(&mut self, base: &CompilerOptions) {
        self.mode = self.mode.or(base.mode);
        self.fail_on_diagnostics = self.fail_on_diagnostics.or(base.fail_on_diagnostics);
        self.max_inline_depth = self.max_inline_depth.or(base.max_inline_depth);
        self.preserve_comments = self.preserve_comments.or(base.preserve_comments);
        if self.out_dir.is_none() {
            self.out_dir.clone_from(&base.out_dir);
        }
    }
}

/// The `typeguard.json` file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub compiler_options: Option<CompilerOptions>,
    pub files: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn options(&self) -> CompilerOptions {
        self.compiler_options.clone().unwrap_or_default()
    }

    /// Listed files, resolved against the directory holding the config.
    pub fn resolved_files(&self, config_path: &Path) -> Vec<PathBuf> {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        self.files
            .iter()
            .flatten()
            .map(|file| base.join(file))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a config file from a string.
pub fn parse_config(content: &str) -> Result<ConfigFile, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a config file from a path.
pub fn parse_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    parse_config(&content).map_err(|source| ConfigError::Parse { path: display, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"{
                "compilerOptions": { "mode": "strict", "maxInlineDepth": 2, "preserveComments": false },
                "files": ["src/main.ts"]
            }"#,
        )
        .unwrap();
        let options = config.options();
        assert_eq!(options.mode(), Mode::Strict);
        assert_eq!(options.max_inline_depth(), 2);
        assert!(!options.preserve_comments());
        assert_eq!(config.files.as_deref(), Some(&["src/main.ts".to_string()][..]));
    }

    #[test]
    fn test_defaults() {
        let options = parse_config("{}").unwrap().options();
        assert_eq!(options.mode(), Mode::Development);
        assert!(!options.fail_on_diagnostics());
        assert_eq!(options.max_inline_depth(), DEFAULT_MAX_INLINE_DEPTH);
        assert!(options.preserve_comments());
    }

    #[test]
    fn test_fail_on_diagnostics_follows_mode() {
        assert!(CompilerOptions::with_mode(Mode::Production).fail_on_diagnostics());
        assert!(CompilerOptions::with_mode(Mode::Strict).fail_on_diagnostics());
        let mut options = CompilerOptions::with_mode(Mode::Production);
        options.fail_on_diagnostics = Some(false);
        assert!(!options.fail_on_diagnostics());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(parse_config(r#"{ "compilerOptions": { "mode": "loose" } }"#).is_err());
        assert_eq!("prod".parse::<Mode>(), Ok(Mode::Production));
        assert!("loose".parse::<Mode>().is_err());
    }

    #[test]
    fn test_merge_keeps_explicit_values() {
        let mut options = CompilerOptions::with_mode(Mode::Strict);
        let base = CompilerOptions {
            mode: Some(Mode::Production),
            max_inline_depth: Some(1),
            ..CompilerOptions::default()
        };
        options.merge(&base);
        assert_eq!(options.mode(), Mode::Strict);
        assert_eq!(options.max_inline_depth(), 1);
    }

    #[test]
    fn test_resolved_files() {
        let config = parse_config(r#"{ "files": ["a.ts"] }"#).unwrap();
        let files = config.resolved_files(Path::new("project/typeguard.json"));
        assert_eq!(files, vec![PathBuf::from("project/a.ts")]);
    }

    #[test]
    fn test_mode_flags() {
        assert!(Mode::Development.emits_guards());
        assert!(!Mode::Development.throws());
        assert!(!Mode::Production.emits_guards());
        assert!(Mode::Strict.emits_guards() && Mode::Strict.throws());
    }
}
