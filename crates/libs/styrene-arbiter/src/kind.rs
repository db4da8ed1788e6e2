//! Element kinds carried on the wire and the declared value types that map onto them.

use std::fmt;

/// Wire element kinds.
///
/// Declaration order is the wire tag order: `Byte` is tag 1, `Array` is tag 8.
/// `Byte` through `Boolean` and `Uuid` are basic (fixed length); `String` and
/// `Array` are advanced (variable length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Byte,
    Short,
    Int,
    Long,
    Boolean,
    String,
    Uuid,
    Array,
}

impl ElementKind {
    /// Every kind, in wire tag order.
    pub const ALL: [ElementKind; 8] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Boolean,
        Self::String,
        Self::Uuid,
        Self::Array,
    ];

    pub const fn is_basic(self) -> bool {
        match self {
            Self::Byte | Self::Short | Self::Int | Self::Long | Self::Boolean | Self::Uuid => true,
            Self::String | Self::Array => false,
        }
    }

    pub const fn is_advanced(self) -> bool {
        !self.is_basic()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Uuid => "UUID",
            Self::Array => "ARRAY",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared value type of a record field.
///
/// The `Option*` variants are the nullable forms (`Option<i32>` and friends) and
/// are the only basic types that may be declared optional. `OptionWrapped` is an
/// `Option` around a type that is already nullable; it never maps to a kind,
/// optionality has to be expressed through the descriptor's optional flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    Bool,
    Uuid,
    String,
    OptionI8,
    OptionI16,
    OptionI32,
    OptionI64,
    OptionBool,
    OptionUuid,
    OptionString,
    OptionWrapped,
    F32,
    F64,
    Char,
    List,
}

impl ValueType {
    /// Whether a field of this type can hold "no value".
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::OptionI8
                | Self::OptionI16
                | Self::OptionI32
                | Self::OptionI64
                | Self::OptionBool
                | Self::OptionUuid
                | Self::OptionString
                | Self::OptionWrapped
        )
    }

    /// The declared type of `Option<T>` where `T` is declared as `self`.
    pub const fn wrapped_in_option(self) -> Self {
        match self {
            Self::I8 => Self::OptionI8,
            Self::I16 => Self::OptionI16,
            Self::I32 => Self::OptionI32,
            Self::I64 => Self::OptionI64,
            Self::Bool => Self::OptionBool,
            Self::Uuid => Self::OptionUuid,
            Self::String => Self::OptionString,
            _ => Self::OptionWrapped,
        }
    }
}
