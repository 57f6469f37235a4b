//! The TypeNode model.
//!
//! A `TypeNode` never refers to another declaration by name (enum references
//! carry their materialized values, generic applications are opaque), so it
//! can be checked, compiled and serialized without access to the registry.

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use typeguard_ast::factory::{format_number, is_identifier_name, quote_string};

/// Primitive type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    Void,
    Never,
    Any,
    Unknown,
    Null,
    Undefined,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
            Primitive::Object => "object",
            Primitive::Void => "void",
            Primitive::Never => "never",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
        }
    }
}

/// The value of a literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Decimal digits, without the `n` suffix.
    BigInt(String),
}

impl LiteralValue {
    /// Parse the source text of a bigint literal (`10n`, `0xffn`) into its
    /// decimal digits.
    pub fn bigint_from_raw(raw: &str) -> LiteralValue {
        let digits: String = raw.trim_end_matches('n').chars().filter(|c| *c != '_').collect();
        let (radix, body) = match digits.get(..2) {
            Some("0x") | Some("0X") => (16, &digits[2..]),
            Some("0o") | Some("0O") => (8, &digits[2..]),
            Some("0b") | Some("0B") => (2, &digits[2..]),
            _ => (10, digits.as_str()),
        };
        let normalized = u128::from_str_radix(body, radix)
            .map(|n| n.to_string())
            .unwrap_or_else(|_| digits.clone());
        LiteralValue::BigInt(normalized)
    }

    /// The key this literal names when used as a property key.
    pub fn as_property_key(&self) -> Option<String> {
        match self {
            LiteralValue::String(s) => Some(s.clone()),
            LiteralValue::Number(n) => Some(format_number(*n)),
            LiteralValue::Boolean(_) | LiteralValue::BigInt(_) => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => f.write_str(&quote_string(s)),
            LiteralValue::Number(n) => f.write_str(&format_number(*n)),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::BigInt(digits) => write!(f, "{}n", digits),
        }
    }
}

/// One tuple position.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleMember {
    pub ty: TypeNode,
    pub optional: bool,
    /// A rest position; `ty` is the element type, not the array type.
    pub rest: bool,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<FunctionParam>,
    pub returns: Box<TypeNode>,
    pub is_constructor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignatureType {
    pub key: Box<TypeNode>,
    pub value: Box<TypeNode>,
}

/// The structure of an object type: ordered properties plus signature
/// metadata. Optional properties hold a [`TypeNode::Optional`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    pub properties: IndexMap<String, TypeNode>,
    pub index: Option<IndexSignatureType>,
    pub call: Option<Box<FunctionType>>,
    pub construct: Option<Box<FunctionType>>,
    pub readonly: IndexSet<String>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether values of this shape must be callable.
    pub fn is_callable(&self) -> bool {
        self.call.is_some() || self.construct.is_some()
    }

    /// Copy another shape's members into this one. Properties already
    /// declared here keep their position and are overwritten.
    pub fn merge(&mut self, other: &ObjectShape) {
        for (name, ty) in &other.properties {
            self.properties.insert(name.clone(), ty.clone());
        }
        for name in &other.readonly {
            self.readonly.insert(name.clone());
        }
        if other.index.is_some() {
            self.index = other.index.clone();
        }
        if other.call.is_some() {
            self.call = other.call.clone();
        }
        if other.construct.is_some() {
            self.construct = other.construct.clone();
        }
    }
}

/// A structural description of a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    Literal(LiteralValue),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Optional(Box<TypeNode>),
    Array(Box<TypeNode>),
    ReadonlyArray(Box<TypeNode>),
    Tuple(Vec<TupleMember>),
    Object(ObjectShape),
    Map { key: Box<TypeNode>, value: Box<TypeNode> },
    Set(Box<TypeNode>),
    Record { key: Box<TypeNode>, value: Box<TypeNode> },
    Function(FunctionType),
    /// A reference to an enum, with the enum's member values.
    EnumRef { name: String, values: Vec<LiteralValue> },
    /// A generic or otherwise unresolved named type: `Promise<T>`, `Date`.
    Generic { name: String, args: Vec<TypeNode> },
    /// A mapped type whose keys are not a finite set.
    Mapped { key: Box<TypeNode>, value: Box<TypeNode> },
    Conditional,
    /// `pattern` is an anchored regular expression over the string value.
    TemplateLiteral { pattern: String },
    Unknown,
}

impl TypeNode {
    pub fn string() -> TypeNode {
        TypeNode::Primitive(Primitive::String)
    }

    pub fn number() -> TypeNode {
        TypeNode::Primitive(Primitive::Number)
    }

    pub fn boolean() -> TypeNode {
        TypeNode::Primitive(Primitive::Boolean)
    }

    pub fn string_literal(value: &str) -> TypeNode {
        TypeNode::Literal(LiteralValue::String(value.to_string()))
    }

    pub fn number_literal(value: f64) -> TypeNode {
        TypeNode::Literal(LiteralValue::Number(value))
    }

    pub fn array(element: TypeNode) -> TypeNode {
        TypeNode::Array(Box::new(element))
    }

    pub fn object(properties: Vec<(&str, TypeNode)>) -> TypeNode {
        let mut shape = ObjectShape::new();
        for (name, ty) in properties {
            shape.properties.insert(name.to_string(), ty);
        }
        TypeNode::Object(shape)
    }

    /// Wrap in [`TypeNode::Optional`] unless already optional.
    pub fn optional(inner: TypeNode) -> TypeNode {
        match inner {
            TypeNode::Optional(_) => inner,
            other => TypeNode::Optional(Box::new(other)),
        }
    }

    /// Build a union, flattening nested unions and dropping duplicates. A
    /// single member is returned as is, no members means `never`.
    pub fn union(types: Vec<TypeNode>) -> TypeNode {
        let mut members: Vec<TypeNode> = Vec::with_capacity(types.len());
        for ty in types {
            match ty {
                TypeNode::Union(inner) => {
                    for t in inner {
                        if !members.contains(&t) {
                            members.push(t);
                        }
                    }
                }
                t => {
                    if !members.contains(&t) {
                        members.push(t);
                    }
                }
            }
        }
        match members.len() {
            0 => TypeNode::Primitive(Primitive::Never),
            1 => members.pop().unwrap_or(TypeNode::Unknown),
            _ => TypeNode::Union(members),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeNode::Optional(_))
    }

    /// The type without its optional wrapper.
    pub fn strip_optional(&self) -> &TypeNode {
        match self {
            TypeNode::Optional(inner) => inner,
            other => other,
        }
    }

    /// Types that every value satisfies.
    pub fn is_permissive(&self) -> bool {
        matches!(
            self,
            TypeNode::Primitive(Primitive::Any)
                | TypeNode::Primitive(Primitive::Unknown)
                | TypeNode::Unknown
                | TypeNode::Generic { .. }
                | TypeNode::Mapped { .. }
                | TypeNode::Conditional
        )
    }

    /// The members of a union, or the type itself.
    pub fn members(&self) -> &[TypeNode] {
        match self {
            TypeNode::Union(types) => types,
            other => std::slice::from_ref(other),
        }
    }

    /// The literal values of a finite union of string and number literals
    /// (enum references included), or `None` if the set is not finite.
    pub fn literal_keys(&self) -> Option<Vec<LiteralValue>> {
        let mut out = Vec::new();
        for member in self.members() {
            match member {
                TypeNode::Literal(value @ (LiteralValue::String(_) | LiteralValue::Number(_))) => {
                    out.push(value.clone())
                }
                TypeNode::EnumRef { values, .. } => out.extend(values.iter().cloned()),
                TypeNode::Primitive(Primitive::Never) => {}
                _ => return None,
            }
        }
        Some(out)
    }
}

fn needs_parens_in_postfix(ty: &TypeNode) -> bool {
    matches!(
        ty,
        TypeNode::Union(_) | TypeNode::Intersection(_) | TypeNode::Function(_) | TypeNode::Optional(_)
    )
}

fn needs_parens_in_union(ty: &TypeNode) -> bool {
    matches!(ty, TypeNode::Function(_))
}

fn write_property_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_identifier_name(name) {
        f.write_str(name)
    } else {
        f.write_str(&quote_string(name))
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[FunctionParam]) -> fmt::Result {
    f.write_str("(")?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if param.rest {
            f.write_str("...")?;
        }
        f.write_str(&param.name)?;
        if param.optional {
            f.write_str("?")?;
        }
        write!(f, ": {}", param.ty.strip_optional())?;
    }
    f.write_str(")")
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constructor {
            f.write_str("new ")?;
        }
        write_params(f, &self.params)?;
        write!(f, " => {}", self.returns)
    }
}

impl fmt::Display for ObjectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(call) = &self.call {
            let mut text = String::new();
            for (i, p) in call.params.iter().enumerate() {
                if i > 0 {
                    text.push_str(", ");
                }
                text.push_str(&format!("{}: {}", p.name, p.ty.strip_optional()));
            }
            parts.push(format!("({}): {}", text, call.returns));
        }
        if let Some(index) = &self.index {
            parts.push(format!("[key: {}]: {}", index.key, index.value));
        }
        for (name, ty) in &self.properties {
            let mut text = String::new();
            if self.readonly.contains(name) {
                text.push_str("readonly ");
            }
            text.push_str(&DisplayName(name).to_string());
            if ty.is_optional() {
                text.push('?');
            }
            text.push_str(&format!(": {}", ty.strip_optional()));
            parts.push(text);
        }
        if parts.is_empty() {
            return f.write_str("{}");
        }
        write!(f, "{{ {} }}", parts.join("; "))
    }
}

struct DisplayName<'n>(&'n str);

impl fmt::Display for DisplayName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_property_name(f, self.0)
    }
}

/// Type-annotation-like rendering, used in diagnostics.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Primitive(p) => f.write_str(p.name()),
            TypeNode::Literal(value) => write!(f, "{}", value),
            TypeNode::Union(types) | TypeNode::Intersection(types) => {
                let separator = if matches!(self, TypeNode::Union(_)) { " | " } else { " & " };
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    if needs_parens_in_union(ty) {
                        write!(f, "({})", ty)?;
                    } else {
                        write!(f, "{}", ty)?;
                    }
                }
                Ok(())
            }
            TypeNode::Optional(inner) => write!(f, "{} | undefined", inner),
            TypeNode::Array(element) | TypeNode::ReadonlyArray(element) => {
                if matches!(self, TypeNode::ReadonlyArray(_)) {
                    f.write_str("readonly ")?;
                }
                if needs_parens_in_postfix(element) {
                    write!(f, "({})[]", element)
                } else {
                    write!(f, "{}[]", element)
                }
            }
            TypeNode::Tuple(members) => {
                f.write_str("[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if member.rest {
                        f.write_str("...")?;
                    }
                    if let Some(label) = &member.label {
                        f.write_str(label)?;
                        if member.optional {
                            f.write_str("?")?;
                        }
                        f.write_str(": ")?;
                    }
                    if member.rest {
                        write!(f, "{}[]", member.ty)?;
                    } else {
                        write!(f, "{}", member.ty)?;
                        if member.optional && member.label.is_none() {
                            f.write_str("?")?;
                        }
                    }
                }
                f.write_str("]")
            }
            TypeNode::Object(shape) => write!(f, "{}", shape),
            TypeNode::Map { key, value } => write!(f, "Map<{}, {}>", key, value),
            TypeNode::Set(element) => write!(f, "Set<{}>", element),
            TypeNode::Record { key, value } => write!(f, "Record<{}, {}>", key, value),
            TypeNode::Function(function) => write!(f, "{}", function),
            TypeNode::EnumRef { name, .. } => f.write_str(name),
            TypeNode::Generic { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeNode::Mapped { key, value } => write!(f, "{{ [key in {}]: {} }}", key, value),
            TypeNode::Conditional => f.write_str("conditional type"),
            TypeNode::TemplateLiteral { .. } => f.write_str("template literal type"),
            TypeNode::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens_and_dedupes() {
        let inner = TypeNode::union(vec![TypeNode::string(), TypeNode::number()]);
        let outer = TypeNode::union(vec![inner, TypeNode::string(), TypeNode::boolean()]);
        assert_eq!(
            outer,
            TypeNode::Union(vec![TypeNode::string(), TypeNode::number(), TypeNode::boolean()])
        );
        assert_eq!(TypeNode::union(vec![TypeNode::string()]), TypeNode::string());
        assert_eq!(TypeNode::union(vec![]), TypeNode::Primitive(Primitive::Never));
    }

    #[test]
    fn test_optional_does_not_nest() {
        let once = TypeNode::optional(TypeNode::number());
        let twice = TypeNode::optional(once.clone());
        assert_eq!(once, twice);
        assert_eq!(twice.strip_optional(), &TypeNode::number());
    }

    #[test]
    fn test_bigint_literals_normalize() {
        assert_eq!(LiteralValue::bigint_from_raw("10n"), LiteralValue::BigInt("10".into()));
        assert_eq!(LiteralValue::bigint_from_raw("0xffn"), LiteralValue::BigInt("255".into()));
        assert_eq!(LiteralValue::bigint_from_raw("1_000n"), LiteralValue::BigInt("1000".into()));
    }

    #[test]
    fn test_literal_keys() {
        let keys = TypeNode::union(vec![TypeNode::string_literal("a"), TypeNode::number_literal(1.0)]);
        assert_eq!(
            keys.literal_keys(),
            Some(vec![LiteralValue::String("a".into()), LiteralValue::Number(1.0)])
        );
        assert_eq!(TypeNode::string().literal_keys(), None);
    }

    #[test]
    fn test_display() {
        let user = TypeNode::object(vec![
            ("id", TypeNode::number()),
            ("nick-name", TypeNode::optional(TypeNode::string())),
        ]);
        assert_eq!(user.to_string(), "{ id: number; \"nick-name\"?: string }");

        let list = TypeNode::array(TypeNode::union(vec![TypeNode::string(), TypeNode::number()]));
        assert_eq!(list.to_string(), "(string | number)[]");

        let dir = TypeNode::union(vec![TypeNode::string_literal("up"), TypeNode::string_literal("down")]);
        assert_eq!(dir.to_string(), "\"up\" | \"down\"");

        let tuple = TypeNode::Tuple(vec![
            TupleMember { ty: TypeNode::string(), optional: false, rest: false, label: None },
            TupleMember { ty: TypeNode::number(), optional: true, rest: false, label: None },
            TupleMember { ty: TypeNode::boolean(), optional: false, rest: true, label: None },
        ]);
        assert_eq!(tuple.to_string(), "[string, number?, ...boolean[]]");
    }
}
