//! typeguard_core: Core utilities shared by every stage of the typeguard compiler.
//!
//! Provides text ranges, spans and line maps used to locate tokens, nodes and
//! diagnostics in the source text.

pub mod text;

pub use text::{LineAndColumn, LineMap, TextRange, TextSpan};
