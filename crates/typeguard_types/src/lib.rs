//! typeguard_types: The structural type model and the type registry.
//!
//! Type annotations are translated into [`TypeNode`] values: closed,
//! self-contained descriptions in which every interface and alias reference
//! has already been replaced by the referenced type. The [`Registry`] holds the
//! named declarations of one compilation unit and is filled by the two passes
//! of the [`RegistryBuilder`].

pub mod builder;
pub mod descriptor;
pub mod model;
pub mod registry;
pub mod template;
pub mod translate;
pub mod utility;

pub use builder::{build_registry, RegistryBuilder};
pub use model::{
    FunctionParam, FunctionType, IndexSignatureType, LiteralValue, ObjectShape, Primitive,
    TupleMember, TypeNode,
};
pub use registry::{
    ClassEntry, EntryKind, EnumEntry, FunctionEntry, Registry, RegistryEntry, VariableEntry,
};
pub use translate::{Translator, MAX_TYPE_DEPTH};
