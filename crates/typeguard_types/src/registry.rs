//! The per-compilation registry of named declarations.

use crate::model::{FunctionParam, FunctionType, LiteralValue, ObjectShape, TypeNode};
use indexmap::IndexMap;

/// The kind half of a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Interface,
    TypeAlias,
    Enum,
    Variable,
    Function,
    Class,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    /// Members with a constant value, in declaration order.
    pub members: IndexMap<String, LiteralValue>,
    pub is_const: bool,
}

impl EnumEntry {
    /// The enum as a type: one of its member values.
    pub fn to_type(&self) -> TypeNode {
        TypeNode::EnumRef {
            name: self.name.clone(),
            values: self.members.values().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub name: String,
    pub ty: TypeNode,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub name: String,
    pub params: Vec<FunctionParam>,
    /// `None` when no return type is declared.
    pub return_type: Option<TypeNode>,
    pub type_params: Vec<String>,
    pub is_async: bool,
    pub is_generator: bool,
}

impl FunctionEntry {
    pub fn to_function_type(&self) -> FunctionType {
        FunctionType {
            params: self.params.clone(),
            returns: Box::new(self.return_type.clone().unwrap_or(TypeNode::Unknown)),
            is_constructor: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    /// Instance properties, including constructor parameter properties.
    pub properties: IndexMap<String, TypeNode>,
    pub methods: IndexMap<String, FunctionType>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEntry {
    Interface { name: String, shape: ObjectShape },
    TypeAlias { name: String, ty: TypeNode },
    Enum(EnumEntry),
    Variable(VariableEntry),
    Function(FunctionEntry),
    Class(ClassEntry),
}

impl RegistryEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            RegistryEntry::Interface { .. } => EntryKind::Interface,
            RegistryEntry::TypeAlias { .. } => EntryKind::TypeAlias,
            RegistryEntry::Enum(_) => EntryKind::Enum,
            RegistryEntry::Variable(_) => EntryKind::Variable,
            RegistryEntry::Function(_) => EntryKind::Function,
            RegistryEntry::Class(_) => EntryKind::Class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RegistryEntry::Interface { name, .. } | RegistryEntry::TypeAlias { name, .. } => name,
            RegistryEntry::Enum(e) => &e.name,
            RegistryEntry::Variable(v) => &v.name,
            RegistryEntry::Function(f) => &f.name,
            RegistryEntry::Class(c) => &c.name,
        }
    }
}

/// Named declarations of one compilation unit, unique by kind and name and
/// kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<(EntryKind, String), RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `false`, leaving the registry unchanged, if an
    /// entry of the same kind and name already exists.
    pub fn insert(&mut self, entry: RegistryEntry) -> bool {
        let key = (entry.kind(), entry.name().to_string());
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    pub fn get(&self, kind: EntryKind, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(&(kind, name.to_string()))
    }

    pub fn contains(&self, kind: EntryKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    pub fn interface(&self, name: &str) -> Option<&ObjectShape> {
        match self.get(EntryKind::Interface, name) {
            Some(RegistryEntry::Interface { shape, .. }) => Some(shape),
            _ => None,
        }
    }

    pub(crate) fn interface_mut(&mut self, name: &str) -> Option<&mut ObjectShape> {
        match self.entries.get_mut(&(EntryKind::Interface, name.to_string())) {
            Some(RegistryEntry::Interface { shape, .. }) => Some(shape),
            _ => None,
        }
    }

    pub fn type_alias(&self, name: &str) -> Option<&TypeNode> {
        match self.get(EntryKind::TypeAlias, name) {
            Some(RegistryEntry::TypeAlias { ty, .. }) => Some(ty),
            _ => None,
        }
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumEntry> {
        match self.get(EntryKind::Enum, name) {
            Some(RegistryEntry::Enum(e)) => Some(e),
            _ => None,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableEntry> {
        match self.get(EntryKind::Variable, name) {
            Some(RegistryEntry::Variable(v)) => Some(v),
            _ => None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        match self.get(EntryKind::Function, name) {
            Some(RegistryEntry::Function(f)) => Some(f),
            _ => None,
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        match self.get(EntryKind::Class, name) {
            Some(RegistryEntry::Class(c)) => Some(c),
            _ => None,
        }
    }

    /// The type a bare type name denotes: an interface's shape, an alias's
    /// type or an enum's values.
    pub fn lookup_type(&self, name: &str) -> Option<TypeNode> {
        if let Some(shape) = self.interface(name) {
            return Some(TypeNode::Object(shape.clone()));
        }
        if let Some(ty) = self.type_alias(name) {
            return Some(ty.clone());
        }
        self.enumeration(name).map(EnumEntry::to_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_unique_by_kind_and_name() {
        let mut registry = Registry::new();
        assert!(registry.insert(RegistryEntry::TypeAlias { name: "Id".into(), ty: TypeNode::number() }));
        assert!(!registry.insert(RegistryEntry::TypeAlias { name: "Id".into(), ty: TypeNode::string() }));
        assert!(registry.insert(RegistryEntry::Variable(VariableEntry {
            name: "Id".into(),
            ty: TypeNode::Unknown,
            is_const: true,
        })));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.type_alias("Id"), Some(&TypeNode::number()));
    }

    #[test]
    fn test_lookup_type_for_enum() {
        let mut registry = Registry::new();
        let mut members = IndexMap::new();
        members.insert("Up".to_string(), LiteralValue::Number(0.0));
        members.insert("Down".to_string(), LiteralValue::Number(1.0));
        registry.insert(RegistryEntry::Enum(EnumEntry { name: "Dir".into(), members, is_const: false }));
        assert_eq!(
            registry.lookup_type("Dir"),
            Some(TypeNode::EnumRef {
                name: "Dir".into(),
                values: vec![LiteralValue::Number(0.0), LiteralValue::Number(1.0)],
            })
        );
        assert_eq!(registry.lookup_type("Nope"), None);
    }
}
