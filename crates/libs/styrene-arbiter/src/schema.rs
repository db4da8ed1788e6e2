//! Schema derivation: partition a record's elements into basic and advanced
//! groups ordered by placement.

use std::collections::HashMap;
use std::fmt;

use crate::descriptor::{FieldDescriptor, FieldTable, NetworkObject};
use crate::error::{ArbiterError, Result};
use crate::kind::{ElementKind, ValueType};
use crate::registry::{TypeRegistry, REGISTRY};

/// A field descriptor paired with its resolved element kind.
pub struct SchemaElement<R> {
    pub descriptor: FieldDescriptor<R>,
    pub kind: ElementKind,
}

impl<R> SchemaElement<R> {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn placement(&self) -> u32 {
        self.descriptor.placement
    }

    pub fn is_optional(&self) -> bool {
        self.descriptor.optional
    }
}

impl<R> fmt::Debug for SchemaElement<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaElement")
            .field("descriptor", &self.descriptor)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered element lists for one record type. Never mutated after derivation.
pub struct Schema<R> {
    basic: Vec<SchemaElement<R>>,
    advanced: Vec<SchemaElement<R>>,
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("basic", &self.basic)
            .field("advanced", &self.advanced)
            .finish_non_exhaustive()
    }
}

impl<R> Schema<R> {
    /// Fixed-length elements, ascending by placement.
    pub fn basic_elements(&self) -> &[SchemaElement<R>] {
        &self.basic
    }

    /// Variable-length elements, ascending by placement.
    pub fn advanced_elements(&self) -> &[SchemaElement<R>] {
        &self.advanced
    }

    pub fn element_count(&self) -> usize {
        self.basic.len() + self.advanced.len()
    }

    /// All elements in wire order.
    pub fn elements(&self) -> impl Iterator<Item = &SchemaElement<R>> {
        self.basic.iter().chain(self.advanced.iter())
    }

    /// Kind sequence in wire order: basic kinds, then advanced kinds.
    pub fn kinds(&self) -> Vec<ElementKind> {
        self.elements().map(|element| element.kind).collect()
    }

    /// `(placement, kind)` pairs in wire order.
    pub fn layout(&self) -> Vec<(u32, ElementKind)> {
        self.elements()
            .map(|element| (element.placement(), element.kind))
            .collect()
    }

    /// Structural gate: does a wire shape agree element-for-element with this schema?
    pub fn matches_shape(&self, shape: &[ElementKind]) -> bool {
        shape.len() == self.element_count()
            && self
                .elements()
                .zip(shape)
                .all(|(element, kind)| element.kind == *kind)
    }

    /// Like [`Schema::matches_shape`], but reports the first difference.
    pub fn check_shape(&self, shape: &[ElementKind]) -> Result<()> {
        if shape.len() != self.element_count() {
            return Err(ArbiterError::mismatched(format!(
                "expected {} elements, envelope carries {}",
                self.element_count(),
                shape.len()
            )));
        }
        for (position, (element, kind)) in self.elements().zip(shape).enumerate() {
            if element.kind != *kind {
                return Err(ArbiterError::mismatched(format!(
                    "element {position} (`{}`): expected {}, envelope carries {kind}",
                    element.name(),
                    element.kind
                )));
            }
        }
        Ok(())
    }
}

/// Derives [`Schema`]s from registered field tables.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDescriber<'a> {
    registry: &'a TypeRegistry,
}

impl Default for SchemaDescriber<'static> {
    fn default() -> Self {
        Self::new(&REGISTRY)
    }
}

impl<'a> SchemaDescriber<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Derive the schema for a record type from its [`NetworkObject`] table.
    pub fn describe<R: NetworkObject>(&self) -> Result<Schema<R>> {
        let mut table = FieldTable::new();
        R::describe(&mut table);
        if table.is_empty() {
            return Err(ArbiterError::not_network_object(format!(
                "{} declares no elements",
                std::any::type_name::<R>()
            )));
        }
        let schema = self.describe_fields(table.into_fields())?;
        log::debug!(
            "arbiter: schema for {}: {} basic, {} advanced",
            std::any::type_name::<R>(),
            schema.basic.len(),
            schema.advanced.len()
        );
        Ok(schema)
    }

    /// Derive a schema from an explicit descriptor list.
    pub fn describe_fields<R>(&self, fields: Vec<FieldDescriptor<R>>) -> Result<Schema<R>> {
        let mut seen: HashMap<u32, &'static str> = HashMap::with_capacity(fields.len());
        for field in &fields {
            if let Some(existing) = seen.insert(field.placement, field.name) {
                return Err(ArbiterError::DuplicatePlacement {
                    placement: field.placement,
                    existing,
                    duplicate: field.name,
                });
            }
        }

        let mut basic = Vec::new();
        let mut advanced = Vec::new();
        for descriptor in fields {
            let kind = self.resolve(&descriptor)?;
            let element = SchemaElement { descriptor, kind };
            if kind.is_basic() {
                basic.push(element);
            } else {
                advanced.push(element);
            }
        }
        basic.sort_by_key(SchemaElement::placement);
        advanced.sort_by_key(SchemaElement::placement);
        Ok(Schema { basic, advanced })
    }

    fn resolve<R>(&self, descriptor: &FieldDescriptor<R>) -> Result<ElementKind> {
        let Some(kind) = self.registry.kind_of(descriptor.value_type) else {
            let reason = match descriptor.value_type {
                ValueType::OptionWrapped => format!(
                    "field `{}` wraps an optional or unsupported type in Option; \
                     declare the inner type and use the optional flag",
                    descriptor.name
                ),
                other => format!("field `{}` has unsupported type {other:?}", descriptor.name),
            };
            return Err(ArbiterError::NotANetworkObject { reason });
        };
        if descriptor.optional && kind.is_basic() && !descriptor.value_type.is_nullable() {
            return Err(ArbiterError::InvalidOptional {
                field: descriptor.name,
                value_type: descriptor.value_type,
            });
        }
        if kind == ElementKind::Array {
            return Err(ArbiterError::UnsupportedKind(kind));
        }
        Ok(kind)
    }
}
