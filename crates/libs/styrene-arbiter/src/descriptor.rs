//! Statically registered field metadata.
//!
//! A record type implements [`NetworkObject`] and lists its elements in
//! [`NetworkObject::describe`]. The resulting table is the only metadata the
//! codec reads: no runtime type inspection takes place.

use std::fmt;

use crate::kind::ValueType;
use crate::value::{FieldValue, Value};

type ReadFn<R> = Box<dyn Fn(&R) -> Option<Value> + Send + Sync>;
type WriteFn<R> = Box<dyn Fn(&mut R, Value) -> bool + Send + Sync>;

/// A record type that can be exchanged as a ZNA envelope.
///
/// Decoding starts from `Default::default()`; fields whose optional value is
/// absent on the wire keep their default.
pub trait NetworkObject: Default + 'static {
    fn describe(table: &mut FieldTable<Self>);
}

/// Reads and writes one field of a record through [`Value`]s.
pub struct Accessor<R> {
    read: ReadFn<R>,
    write: WriteFn<R>,
}

impl<R> Accessor<R> {
    pub fn new<G, S>(read: G, write: S) -> Self
    where
        G: Fn(&R) -> Option<Value> + Send + Sync + 'static,
        S: Fn(&mut R, Value) -> bool + Send + Sync + 'static,
    {
        Self {
            read: Box::new(read),
            write: Box::new(write),
        }
    }

    /// Accessor over a typed field projection.
    pub fn typed<V: FieldValue + 'static>(get: fn(&R) -> &V, get_mut: fn(&mut R) -> &mut V) -> Self
    where
        R: 'static,
    {
        Self::new(
            move |record: &R| get(record).to_value(),
            move |record: &mut R, value: Value| match V::from_value(value) {
                Some(field) => {
                    *get_mut(record) = field;
                    true
                }
                None => false,
            },
        )
    }

    /// Current value of the field, `None` when it holds no value.
    pub fn read(&self, record: &R) -> Option<Value> {
        (self.read)(record)
    }

    /// Assign a value; returns `false` if the value does not fit the field.
    pub fn write(&self, record: &mut R, value: Value) -> bool {
        (self.write)(record, value)
    }
}

/// Metadata for one record element.
pub struct FieldDescriptor<R> {
    pub name: &'static str,
    pub placement: u32,
    pub optional: bool,
    pub value_type: ValueType,
    pub accessor: Accessor<R>,
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("placement", &self.placement)
            .field("optional", &self.optional)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// Builder collecting a record's field descriptors in declaration order.
pub struct FieldTable<R> {
    fields: Vec<FieldDescriptor<R>>,
}

impl<R: 'static> FieldTable<R> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register a required element.
    pub fn field<V: FieldValue + 'static>(
        &mut self,
        name: &'static str,
        placement: u32,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> &mut Self {
        self.push(FieldDescriptor {
            name,
            placement,
            optional: false,
            value_type: V::VALUE_TYPE,
            accessor: Accessor::typed(get, get_mut),
        })
    }

    /// Register an element declared optional.
    pub fn optional<V: FieldValue + 'static>(
        &mut self,
        name: &'static str,
        placement: u32,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> &mut Self {
        self.push(FieldDescriptor {
            name,
            placement,
            optional: true,
            value_type: V::VALUE_TYPE,
            accessor: Accessor::typed(get, get_mut),
        })
    }

    /// Register a hand-built descriptor.
    pub fn push(&mut self, descriptor: FieldDescriptor<R>) -> &mut Self {
        self.fields.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<FieldDescriptor<R>> {
        self.fields
    }
}

impl<R: 'static> Default for FieldTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
