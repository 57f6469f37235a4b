//! typeguard_ast: Syntax tree for the typed script dialect.
//!
//! Nodes are allocated in a `bumpalo` arena and are `Copy`: a node is a small
//! record of child references, so transforms build new trees by copying the
//! nodes they change and sharing everything else.

pub mod factory;
pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

pub use factory::{alloc_vec_in, NodeFactory};
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
