//! Record → ZNA envelope.

use crate::error::{ArbiterError, Result};
use crate::registry::{TypeRegistry, REGISTRY};
use crate::schema::{Schema, SchemaElement};
use crate::value::Value;
use crate::{
    ENVELOPE_OVERHEAD, FLAG_OPTIONAL, FLAG_PRESENT, MAGIC, MAX_STRING_LEN, TERMINATOR,
    WIRE_VERSION,
};

/// Frames records into envelopes.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    registry: &'a TypeRegistry,
    max_string_len: usize,
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new(&REGISTRY)
    }
}

/// Values read out of a record, in wire order, ready to be laid out.
struct Snapshot {
    basic: Vec<Option<Value>>,
    advanced: Vec<Option<Vec<u8>>>,
}

impl<'a> Encoder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            max_string_len: MAX_STRING_LEN,
        }
    }

    /// Lower the STRING length cap. Values above [`MAX_STRING_LEN`] never fit the wire.
    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max.min(MAX_STRING_LEN);
        self
    }

    /// Total envelope length for `record`, without building it.
    pub fn encoded_len<R>(&self, record: &R, schema: &Schema<R>) -> Result<usize> {
        let snapshot = self.snapshot(record, schema)?;
        Ok(self.len_of(schema, &snapshot))
    }

    /// Build the envelope for `record`.
    pub fn encode<R>(&self, record: &R, schema: &Schema<R>) -> Result<Vec<u8>> {
        let count = u16::try_from(schema.element_count())
            .map_err(|_| ArbiterError::TooManyElements(schema.element_count()))?;
        let snapshot = self.snapshot(record, schema)?;
        let total = self.len_of(schema, &snapshot);

        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(MAGIC);
        buf.push(WIRE_VERSION);
        buf.extend_from_slice(&count.to_be_bytes());

        for (element, value) in schema.basic_elements().iter().zip(&snapshot.basic) {
            buf.push(self.header(element, value.is_some()));
            if let Some(value) = value {
                write_fixed(&mut buf, value)?;
            }
        }

        for (element, payload) in schema.advanced_elements().iter().zip(&snapshot.advanced) {
            buf.push(self.header(element, payload.is_some()));
            // Length fits: snapshot() enforced max_string_len <= 255.
            buf.push(payload.as_ref().map_or(0, |bytes| bytes.len() as u8));
        }
        for payload in snapshot.advanced.iter().flatten() {
            buf.extend_from_slice(payload);
        }

        buf.push(TERMINATOR);
        debug_assert_eq!(buf.len(), total);
        Ok(buf)
    }

    fn header<R>(&self, element: &SchemaElement<R>, present: bool) -> u8 {
        let mut header = self.registry.wire_tag(element.kind);
        if element.is_optional() {
            header |= FLAG_OPTIONAL;
            if present {
                header |= FLAG_PRESENT;
            }
        }
        header
    }

    fn len_of<R>(&self, schema: &Schema<R>, snapshot: &Snapshot) -> usize {
        let basic: usize = schema
            .basic_elements()
            .iter()
            .zip(&snapshot.basic)
            .map(|(element, value)| match value {
                Some(_) => 1 + usize::from(self.registry.fixed_length(element.kind).unwrap_or(0)),
                None => 1,
            })
            .sum();
        let advanced: usize = snapshot
            .advanced
            .iter()
            .map(|payload| 2 + payload.as_ref().map_or(0, Vec::len))
            .sum();
        ENVELOPE_OVERHEAD + basic + advanced
    }

    fn snapshot<R>(&self, record: &R, schema: &Schema<R>) -> Result<Snapshot> {
        let basic = schema
            .basic_elements()
            .iter()
            .map(|element| self.read_element(record, element))
            .collect::<Result<Vec<_>>>()?;
        let advanced = schema
            .advanced_elements()
            .iter()
            .map(|element| {
                self.read_element(record, element)?
                    .map(|value| self.advanced_payload(element, value))
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Snapshot { basic, advanced })
    }

    fn read_element<R>(&self, record: &R, element: &SchemaElement<R>) -> Result<Option<Value>> {
        match element.descriptor.accessor.read(record) {
            Some(value) if value.kind() != element.kind => Err(ArbiterError::mismatched(format!(
                "field `{}` yielded {}, declared {}",
                element.name(),
                value.kind(),
                element.kind
            ))),
            Some(value) => Ok(Some(value)),
            None if element.is_optional() => Ok(None),
            None => Err(ArbiterError::MissingValue {
                field: element.name(),
            }),
        }
    }

    fn advanced_payload<R>(&self, element: &SchemaElement<R>, value: Value) -> Result<Vec<u8>> {
        match value {
            Value::String(text) => {
                if text.len() > self.max_string_len {
                    return Err(ArbiterError::ValueTooLong {
                        field: element.name(),
                        len: text.len(),
                        max: self.max_string_len,
                    });
                }
                Ok(text.into_bytes())
            }
            other => Err(ArbiterError::UnsupportedKind(other.kind())),
        }
    }
}

/// Big-endian fixed-width value bytes. STRING has no fixed width and is refused.
fn write_fixed(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Byte(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::Short(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::Boolean(v) => buf.push(u8::from(*v)),
        // Most significant 64 bits first, then least significant.
        Value::Uuid(v) => buf.extend_from_slice(&v.as_u128().to_be_bytes()),
        Value::String(_) => return Err(ArbiterError::UnsupportedKind(value.kind())),
    }
    Ok(())
}
