//! typeguard_checker: Structural matching and static analysis.
//!
//! The [`matcher`] decides whether a [`Value`] is compatible with a
//! [`TypeNode`](typeguard_types::TypeNode). The [`analyzer`] uses it to check
//! literal initializers and returns against their declared types before the
//! program ever runs.

pub mod analyzer;
pub mod matcher;
pub mod value;

pub use analyzer::{analyze, AnalysisReport, Analyzer};
pub use matcher::{explain, matches, Mismatch, MismatchKind};
pub use value::Value;
