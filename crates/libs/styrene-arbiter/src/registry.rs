//! Immutable lookup tables between declared types, element kinds, wire tags
//! and fixed lengths.

use crate::kind::{ElementKind, ValueType};

/// The process-wide registry. Built at compile time, never mutated.
pub static REGISTRY: TypeRegistry = TypeRegistry::standard();

const VALUE_KINDS: [(ValueType, ElementKind); 15] = [
    (ValueType::I8, ElementKind::Byte),
    (ValueType::I16, ElementKind::Short),
    (ValueType::I32, ElementKind::Int),
    (ValueType::I64, ElementKind::Long),
    (ValueType::Bool, ElementKind::Boolean),
    (ValueType::Uuid, ElementKind::Uuid),
    (ValueType::String, ElementKind::String),
    (ValueType::OptionI8, ElementKind::Byte),
    (ValueType::OptionI16, ElementKind::Short),
    (ValueType::OptionI32, ElementKind::Int),
    (ValueType::OptionI64, ElementKind::Long),
    (ValueType::OptionBool, ElementKind::Boolean),
    (ValueType::OptionUuid, ElementKind::Uuid),
    (ValueType::OptionString, ElementKind::String),
    (ValueType::List, ElementKind::Array),
];

const FIXED_LENGTHS: [(ElementKind, u8); 6] = [
    (ElementKind::Byte, 1),
    (ElementKind::Short, 2),
    (ElementKind::Int, 4),
    (ElementKind::Long, 8),
    (ElementKind::Boolean, 1),
    (ElementKind::Uuid, 16),
];

/// Bidirectional tables: value type → kind, kind ↔ wire tag, kind → fixed length.
///
/// All lookups run over closed, pre-populated tables, so a shared reference is
/// safe to use from any number of concurrent exchanges.
#[derive(Debug)]
pub struct TypeRegistry {
    value_kinds: [(ValueType, ElementKind); 15],
    tags: [(ElementKind, u8); 8],
    fixed_lengths: [(ElementKind, u8); 6],
}

impl TypeRegistry {
    /// Standard tables. Wire tags follow [`ElementKind::ALL`] order starting at 1.
    pub const fn standard() -> Self {
        let mut tags = [(ElementKind::Byte, 0u8); 8];
        let mut i = 0;
        while i < ElementKind::ALL.len() {
            tags[i] = (ElementKind::ALL[i], (i + 1) as u8);
            i += 1;
        }
        Self {
            value_kinds: VALUE_KINDS,
            tags,
            fixed_lengths: FIXED_LENGTHS,
        }
    }

    /// Element kind for a declared value type, `None` when the type is unmapped.
    pub fn kind_of(&self, value_type: ValueType) -> Option<ElementKind> {
        self.value_kinds
            .iter()
            .find(|(candidate, _)| *candidate == value_type)
            .map(|(_, kind)| *kind)
    }

    pub fn wire_tag(&self, kind: ElementKind) -> u8 {
        self.tags
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, tag)| *tag)
            .unwrap_or_default()
    }

    /// Kind for a raw (already masked) wire tag.
    pub fn kind_from_tag(&self, tag: u8) -> Option<ElementKind> {
        self.tags
            .iter()
            .find(|(_, candidate)| *candidate == tag)
            .map(|(kind, _)| *kind)
    }

    /// Fixed value length in bytes; `None` for advanced kinds.
    pub fn fixed_length(&self, kind: ElementKind) -> Option<u8> {
        self.fixed_lengths
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, len)| *len)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
