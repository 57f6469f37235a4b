//! Flag sets and small enums attached to nodes.

bitflags::bitflags! {
    /// Declaration modifiers, both the ones JavaScript keeps (`export`,
    /// `static`, `async`) and the ones erasure removes (`declare`, `private`, ...).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u32 {
        const NONE      = 0;
        const EXPORT    = 1 << 0;
        const AMBIENT   = 1 << 1;
        const PUBLIC    = 1 << 2;
        const PRIVATE   = 1 << 3;
        const PROTECTED = 1 << 4;
        const STATIC    = 1 << 5;
        const READONLY  = 1 << 6;
        const ACCESSOR  = 1 << 7;
        const ABSTRACT  = 1 << 8;
        const ASYNC     = 1 << 9;
        const DEFAULT   = 1 << 10;
        const CONST     = 1 << 11;
        const OVERRIDE  = 1 << 12;
        const IN        = 1 << 13;
        const OUT       = 1 << 14;

        const ACCESSIBILITY_MODIFIER = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        /// Any of these on a constructor parameter declares a class property.
        const PARAMETER_PROPERTY_MODIFIER = Self::ACCESSIBILITY_MODIFIER.bits() | Self::READONLY.bits() | Self::OVERRIDE.bits();
        /// Modifiers with no runtime meaning.
        const TYPE_ONLY_MODIFIER = Self::AMBIENT.bits()
            | Self::ACCESSIBILITY_MODIFIER.bits()
            | Self::READONLY.bits()
            | Self::ABSTRACT.bits()
            | Self::OVERRIDE.bits()
            | Self::IN.bits()
            | Self::OUT.bits();
    }
}

impl ModifierFlags {
    /// Map a modifier word to its flag. `const` is only a modifier before `enum`
    /// and is handled by the parser directly.
    pub fn from_modifier_text(text: &str) -> Option<ModifierFlags> {
        let flag = match text {
            "export" => ModifierFlags::EXPORT,
            "declare" => ModifierFlags::AMBIENT,
            "public" => ModifierFlags::PUBLIC,
            "private" => ModifierFlags::PRIVATE,
            "protected" => ModifierFlags::PROTECTED,
            "static" => ModifierFlags::STATIC,
            "readonly" => ModifierFlags::READONLY,
            "accessor" => ModifierFlags::ACCESSOR,
            "abstract" => ModifierFlags::ABSTRACT,
            "async" => ModifierFlags::ASYNC,
            "default" => ModifierFlags::DEFAULT,
            "override" => ModifierFlags::OVERRIDE,
            "in" => ModifierFlags::IN,
            "out" => ModifierFlags::OUT,
            _ => return None,
        };
        Some(flag)
    }
}

/// The binding keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
    Using,
    AwaitUsing,
}

impl VariableKind {
    pub fn keyword(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Using => "using",
            VariableKind::AwaitUsing => "await using",
        }
    }

    pub fn is_const(self) -> bool {
        matches!(self, VariableKind::Const | VariableKind::Using | VariableKind::AwaitUsing)
    }
}

/// Built-in type keywords usable in annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordType {
    Any,
    Unknown,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    Void,
    Never,
    Undefined,
    Null,
    Intrinsic,
}

impl KeywordType {
    pub fn from_text(text: &str) -> Option<KeywordType> {
        let keyword = match text {
            "any" => KeywordType::Any,
            "unknown" => KeywordType::Unknown,
            "string" => KeywordType::String,
            "number" => KeywordType::Number,
            "boolean" => KeywordType::Boolean,
            "bigint" => KeywordType::BigInt,
            "symbol" => KeywordType::Symbol,
            "object" => KeywordType::Object,
            "void" => KeywordType::Void,
            "never" => KeywordType::Never,
            "undefined" => KeywordType::Undefined,
            "null" => KeywordType::Null,
            "intrinsic" => KeywordType::Intrinsic,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn text(self) -> &'static str {
        match self {
            KeywordType::Any => "any",
            KeywordType::Unknown => "unknown",
            KeywordType::String => "string",
            KeywordType::Number => "number",
            KeywordType::Boolean => "boolean",
            KeywordType::BigInt => "bigint",
            KeywordType::Symbol => "symbol",
            KeywordType::Object => "object",
            KeywordType::Void => "void",
            KeywordType::Never => "never",
            KeywordType::Undefined => "undefined",
            KeywordType::Null => "null",
            KeywordType::Intrinsic => "intrinsic",
        }
    }
}

/// What kind of method-like member a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    SingleLine,
    MultiLine,
}

/// Type operators written before a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    KeyOf,
    Unique,
    Readonly,
}

impl TypeOperator {
    pub fn text(self) -> &'static str {
        match self {
            TypeOperator::KeyOf => "keyof",
            TypeOperator::Unique => "unique",
            TypeOperator::Readonly => "readonly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_only_modifiers() {
        let flags = ModifierFlags::PRIVATE | ModifierFlags::STATIC;
        assert!(flags.intersects(ModifierFlags::TYPE_ONLY_MODIFIER));
        assert_eq!(flags - ModifierFlags::TYPE_ONLY_MODIFIER, ModifierFlags::STATIC);
    }

    #[test]
    fn test_modifier_text() {
        assert_eq!(ModifierFlags::from_modifier_text("declare"), Some(ModifierFlags::AMBIENT));
        assert_eq!(ModifierFlags::from_modifier_text("let"), None);
    }

    #[test]
    fn test_keyword_types() {
        assert_eq!(KeywordType::from_text("bigint"), Some(KeywordType::BigInt));
        assert_eq!(KeywordType::Never.text(), "never");
        assert_eq!(KeywordType::from_text("Number"), None);
    }
}
