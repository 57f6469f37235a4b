//! JSON type descriptors.
//!
//! A descriptor is the serialized form of a [`TypeNode`] that the runtime
//! matcher in the emitted prelude interprets. Every node is an object tagged
//! by `kind`. Object shapes list their properties as `[name, type]` pairs, and
//! their metadata lives under keys with the reserved `@@` prefix, so a real
//! property can never be mistaken for metadata.

use crate::model::*;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

pub const INDEX_KEY: &str = "@@index";
pub const CALL_KEY: &str = "@@call";
pub const CONSTRUCT_KEY: &str = "@@construct";
pub const READONLY_KEY: &str = "@@readonly";

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::String(s) => serializer.serialize_str(s),
            LiteralValue::Number(n) => serializer.serialize_f64(*n),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            LiteralValue::BigInt(digits) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bigint", digits)?;
                map.end()
            }
        }
    }
}

impl Serialize for TupleMember {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.ty)?;
        map.serialize_entry("optional", &self.optional)?;
        map.serialize_entry("rest", &self.rest)?;
        map.end()
    }
}

impl Serialize for FunctionParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.ty)?;
        map.serialize_entry("optional", &self.optional)?;
        map.serialize_entry("rest", &self.rest)?;
        map.end()
    }
}

impl Serialize for FunctionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("kind", "function")?;
        map.serialize_entry("params", &self.params)?;
        map.serialize_entry("returns", &*self.returns)?;
        map.end()
    }
}

struct Properties<'s>(&'s ObjectShape);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.properties.len()))?;
        for (name, ty) in &self.0.properties {
            seq.serialize_element(&(name, ty))?;
        }
        seq.end()
    }
}

impl Serialize for ObjectShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", "object")?;
        map.serialize_entry("properties", &Properties(self))?;
        if let Some(index) = &self.index {
            map.serialize_entry(
                INDEX_KEY,
                &KeyValue { key: &index.key, value: &index.value },
            )?;
        }
        if let Some(call) = &self.call {
            map.serialize_entry(CALL_KEY, &**call)?;
        }
        if let Some(construct) = &self.construct {
            map.serialize_entry(CONSTRUCT_KEY, &**construct)?;
        }
        if !self.readonly.is_empty() {
            map.serialize_entry(READONLY_KEY, &self.readonly)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct KeyValue<'t> {
    key: &'t TypeNode,
    value: &'t TypeNode,
}

impl Serialize for TypeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeNode::Object(shape) => return shape.serialize(serializer),
            TypeNode::Function(function) => return function.serialize(serializer),
            _ => {}
        }
        let mut map = serializer.serialize_map(None)?;
        match self {
            TypeNode::Primitive(p) => {
                map.serialize_entry("kind", "primitive")?;
                map.serialize_entry("name", p.name())?;
            }
            TypeNode::Literal(value) => {
                map.serialize_entry("kind", "literal")?;
                map.serialize_entry("value", value)?;
            }
            TypeNode::Union(types) => {
                map.serialize_entry("kind", "union")?;
                map.serialize_entry("types", types)?;
            }
            TypeNode::Intersection(types) => {
                map.serialize_entry("kind", "intersection")?;
                map.serialize_entry("types", types)?;
            }
            TypeNode::Optional(inner) => {
                map.serialize_entry("kind", "optional")?;
                map.serialize_entry("type", &**inner)?;
            }
            TypeNode::Array(element) => {
                map.serialize_entry("kind", "array")?;
                map.serialize_entry("element", &**element)?;
            }
            TypeNode::ReadonlyArray(element) => {
                map.serialize_entry("kind", "readonlyArray")?;
                map.serialize_entry("element", &**element)?;
            }
            TypeNode::Tuple(members) => {
                map.serialize_entry("kind", "tuple")?;
                map.serialize_entry("elements", members)?;
            }
            TypeNode::Map { key, value } => {
                map.serialize_entry("kind", "map")?;
                map.serialize_entry("key", &**key)?;
                map.serialize_entry("value", &**value)?;
            }
            TypeNode::Set(element) => {
                map.serialize_entry("kind", "set")?;
                map.serialize_entry("element", &**element)?;
            }
            TypeNode::Record { key, value } => {
                map.serialize_entry("kind", "record")?;
                map.serialize_entry("key", &**key)?;
                map.serialize_entry("value", &**value)?;
            }
            TypeNode::EnumRef { name, values } => {
                map.serialize_entry("kind", "enum")?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("values", values)?;
            }
            TypeNode::Generic { name, .. } => {
                map.serialize_entry("kind", "generic")?;
                map.serialize_entry("name", name)?;
            }
            TypeNode::Mapped { .. } => map.serialize_entry("kind", "mapped")?,
            TypeNode::Conditional => map.serialize_entry("kind", "conditional")?,
            TypeNode::TemplateLiteral { pattern } => {
                map.serialize_entry("kind", "templateLiteral")?;
                map.serialize_entry("pattern", pattern)?;
            }
            TypeNode::Unknown => map.serialize_entry("kind", "unknown")?,
            TypeNode::Object(_) | TypeNode::Function(_) => {}
        }
        map.end()
    }
}

impl TypeNode {
    /// The JSON descriptor of this type.
    pub fn to_descriptor(&self) -> String {
        // Only string keys are ever produced, so serialization cannot fail;
        // an unknown descriptor matches everything.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"kind\":\"unknown\"}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_descriptor() {
        assert_eq!(
            TypeNode::string().to_descriptor(),
            r#"{"kind":"primitive","name":"string"}"#
        );
    }

    #[test]
    fn test_object_descriptor_uses_reserved_keys() {
        let mut shape = ObjectShape::new();
        shape.properties.insert("@@index".to_string(), TypeNode::number());
        shape.readonly.insert("@@index".to_string());
        shape.index = Some(IndexSignatureType {
            key: Box::new(TypeNode::string()),
            value: Box::new(TypeNode::boolean()),
        });
        let json = TypeNode::Object(shape).to_descriptor();
        assert_eq!(
            json,
            concat!(
                r#"{"kind":"object","properties":[["@@index",{"kind":"primitive","name":"number"}]],"#,
                r#""@@index":{"key":{"kind":"primitive","name":"string"},"value":{"kind":"primitive","name":"boolean"}},"#,
                r#""@@readonly":["@@index"]}"#
            )
        );
    }

    #[test]
    fn test_literal_descriptors() {
        assert_eq!(
            TypeNode::string_literal("up").to_descriptor(),
            r#"{"kind":"literal","value":"up"}"#
        );
        assert_eq!(
            TypeNode::Literal(LiteralValue::BigInt("10".into())).to_descriptor(),
            r#"{"kind":"literal","value":{"bigint":"10"}}"#
        );
        assert_eq!(
            TypeNode::number_literal(2.0).to_descriptor(),
            r#"{"kind":"literal","value":2.0}"#
        );
    }
}
