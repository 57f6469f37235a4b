//! typeguard_transformers: Type erasure and runtime guard generation.
//!
//! - [`strip`] removes type-only syntax and lowers enums and namespaces.
//! - [`check_compiler`] turns a resolved type into a [`Guard`] tree.
//! - [`render`] prints guards as JavaScript; [`eval`] runs them in-process.
//! - [`instrument`] wires guards into function boundaries during stripping.

pub mod check_compiler;
pub mod eval;
pub mod guard;
pub mod instrument;
pub mod names;
pub mod render;
pub mod strip;

pub use check_compiler::CheckCompiler;
pub use eval::{run, run_with, Report};
pub use guard::{DescriptorTable, Guard, GuardNode};
pub use instrument::Instrumenter;
pub use names::{NameGenerator, RESERVED_PREFIX};
pub use render::{render_guard, MATCHES_FN, REPORT_FN, STRINGIFY_FN, TYPES_TABLE};
pub use strip::{strip_types, Stripper};
