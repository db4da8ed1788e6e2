//! ZNA envelope → record.
//!
//! Decoding runs in two passes. The shape pass walks an envelope and returns
//! only its element-kind sequence; the receiver compares that against its own
//! schema. The materialize pass then re-reads the same bytes against the schema
//! and fills a fresh record. A record is only handed back once every element
//! and the terminator have been read, so a failed decode never leaks a
//! partially populated value.

use std::io::{self, Read};

use uuid::Uuid;

use crate::descriptor::NetworkObject;
use crate::error::{ArbiterError, Result};
use crate::kind::ElementKind;
use crate::registry::{TypeRegistry, REGISTRY};
use crate::schema::{Schema, SchemaElement};
use crate::value::Value;
use crate::{FLAG_OPTIONAL, FLAG_PRESENT, MAGIC, TAG_MASK, TERMINATOR, WIRE_VERSION};

/// One complete envelope read off a stream: its shape and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub kinds: Vec<ElementKind>,
    pub bytes: Vec<u8>,
}

/// Reads envelopes.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    registry: &'a TypeRegistry,
    strict_utf8: bool,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(&REGISTRY)
    }
}

/// Decoded header byte.
#[derive(Debug, Clone, Copy)]
struct Header {
    kind: ElementKind,
    optional: bool,
    present: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            strict_utf8: true,
        }
    }

    /// When disabled, STRING payloads that are not valid UTF-8 decode lossily.
    pub fn with_strict_utf8(mut self, strict: bool) -> Self {
        self.strict_utf8 = strict;
        self
    }

    /// Shape pass: consume exactly one envelope from `reader` and return its
    /// element kinds in wire order. Payload bytes are read and discarded.
    pub fn shape<Rd: Read>(&self, reader: &mut Rd) -> Result<Vec<ElementKind>> {
        self.scan(&mut WireReader::new(reader))
    }

    /// Shape pass that also keeps the envelope's bytes for materialization.
    pub fn read_envelope<Rd: Read>(&self, reader: &mut Rd) -> Result<Envelope> {
        let mut wire = WireReader::recording(reader);
        let kinds = self.scan(&mut wire)?;
        Ok(Envelope {
            kinds,
            bytes: wire.into_captured(),
        })
    }

    /// Full receive path over an in-memory envelope: shape pass, structural
    /// gate against `schema`, then materialization.
    pub fn decode<R: NetworkObject>(&self, bytes: &[u8], schema: &Schema<R>) -> Result<R> {
        let mut input = bytes;
        let kinds = self.shape(&mut input)?;
        if !input.is_empty() {
            return Err(trailing_bytes(input.len()));
        }
        schema.check_shape(&kinds)?;
        self.materialize(bytes, schema)
    }

    /// Gate and materialize an envelope previously read with [`Decoder::read_envelope`].
    pub fn decode_envelope<R: NetworkObject>(
        &self,
        envelope: &Envelope,
        schema: &Schema<R>,
    ) -> Result<R> {
        schema.check_shape(&envelope.kinds)?;
        self.materialize(&envelope.bytes, schema)
    }

    /// Materialize pass: populate a fresh record from `bytes`, resolving each
    /// position against `schema`.
    ///
    /// Callers are expected to have run the structural gate first; element
    /// kinds are still checked one by one here.
    pub fn materialize<R: NetworkObject>(&self, bytes: &[u8], schema: &Schema<R>) -> Result<R> {
        let mut input = bytes;
        let mut wire = WireReader::new(&mut input);

        let count = self.read_preamble(&mut wire)?;
        if usize::from(count) != schema.element_count() {
            return Err(ArbiterError::mismatched(format!(
                "envelope declares {count} elements, schema has {}",
                schema.element_count()
            )));
        }

        let mut record = R::default();

        for element in schema.basic_elements() {
            let header = self.expect_header(&mut wire, element)?;
            if !header.present {
                continue;
            }
            let value = read_fixed(&mut wire, element.kind)?;
            assign(&mut record, element, value)?;
        }

        let mut pending = Vec::with_capacity(schema.advanced_elements().len());
        for element in schema.advanced_elements() {
            let header = self.expect_header(&mut wire, element)?;
            let len = wire.u8()?;
            pending.push((header.present, usize::from(len)));
        }
        for (element, (present, len)) in schema.advanced_elements().iter().zip(pending) {
            let mut payload = vec![0u8; len];
            wire.read_exact(&mut payload)?;
            if !present {
                continue;
            }
            let value = match element.kind {
                ElementKind::String => Value::String(self.text(element, payload)?),
                other => return Err(ArbiterError::UnsupportedKind(other)),
            };
            assign(&mut record, element, value)?;
        }

        expect_terminator(&mut wire)?;
        if !input.is_empty() {
            return Err(trailing_bytes(input.len()));
        }
        Ok(record)
    }

    fn scan<Rd: Read>(&self, wire: &mut WireReader<'_, Rd>) -> Result<Vec<ElementKind>> {
        let count = self.read_preamble(wire)?;
        let mut kinds = Vec::with_capacity(usize::from(count));
        let mut in_advanced = false;
        let mut advanced_payload = 0usize;

        for _ in 0..count {
            let header = self.read_header(wire)?;
            if header.kind.is_basic() {
                if in_advanced {
                    return Err(ArbiterError::not_network_object(format!(
                        "basic element {} after advanced elements",
                        header.kind
                    )));
                }
                if header.present {
                    let len = self.registry.fixed_length(header.kind).unwrap_or(0);
                    wire.skip(usize::from(len))?;
                }
            } else {
                in_advanced = true;
                match header.kind {
                    ElementKind::String => advanced_payload += usize::from(wire.u8()?),
                    other => return Err(ArbiterError::UnsupportedKind(other)),
                }
            }
            kinds.push(header.kind);
        }

        wire.skip(advanced_payload)?;
        expect_terminator(wire)?;
        log::trace!("arbiter: envelope shape {kinds:?}");
        Ok(kinds)
    }

    fn read_preamble<Rd: Read>(&self, wire: &mut WireReader<'_, Rd>) -> Result<u16> {
        let magic: [u8; 3] = wire.array()?;
        if &magic != MAGIC {
            return Err(ArbiterError::not_network_object(format!(
                "bad magic {}",
                hex::encode(magic)
            )));
        }
        let version = wire.u8()?;
        if version != WIRE_VERSION {
            return Err(ArbiterError::not_network_object(format!(
                "unsupported envelope version {version}"
            )));
        }
        Ok(u16::from_be_bytes(wire.array()?))
    }

    fn read_header<Rd: Read>(&self, wire: &mut WireReader<'_, Rd>) -> Result<Header> {
        let raw = wire.u8()?;
        let optional = raw & FLAG_OPTIONAL != 0;
        let present = !optional || raw & FLAG_PRESENT != 0;
        let tag = raw & TAG_MASK;
        let kind = self.registry.kind_from_tag(tag).ok_or_else(|| {
            ArbiterError::not_network_object(format!("unknown element tag {tag}"))
        })?;
        Ok(Header {
            kind,
            optional,
            present,
        })
    }

    fn expect_header<R, Rd: Read>(
        &self,
        wire: &mut WireReader<'_, Rd>,
        element: &SchemaElement<R>,
    ) -> Result<Header> {
        let header = self.read_header(wire)?;
        if header.kind == ElementKind::Array {
            return Err(ArbiterError::UnsupportedKind(header.kind));
        }
        if header.kind != element.kind {
            return Err(ArbiterError::mismatched(format!(
                "field `{}`: expected {}, envelope carries {}",
                element.name(),
                element.kind,
                header.kind
            )));
        }
        if header.optional != element.is_optional() {
            log::debug!(
                "arbiter: field `{}` optional flag differs from sender ({})",
                element.name(),
                header.optional
            );
        }
        Ok(header)
    }

    fn text<R>(&self, element: &SchemaElement<R>, payload: Vec<u8>) -> Result<String> {
        if self.strict_utf8 {
            String::from_utf8(payload).map_err(|_| ArbiterError::InvalidUtf8 {
                field: element.name(),
            })
        } else {
            Ok(String::from_utf8_lossy(&payload).into_owned())
        }
    }
}

fn read_fixed<Rd: Read>(wire: &mut WireReader<'_, Rd>, kind: ElementKind) -> Result<Value> {
    let value = match kind {
        ElementKind::Byte => Value::Byte(i8::from_be_bytes(wire.array()?)),
        ElementKind::Short => Value::Short(i16::from_be_bytes(wire.array()?)),
        ElementKind::Int => Value::Int(i32::from_be_bytes(wire.array()?)),
        ElementKind::Long => Value::Long(i64::from_be_bytes(wire.array()?)),
        ElementKind::Boolean => Value::Boolean(wire.u8()? != 0),
        ElementKind::Uuid => Value::Uuid(Uuid::from_u128(u128::from_be_bytes(wire.array()?))),
        ElementKind::String | ElementKind::Array => {
            return Err(ArbiterError::UnsupportedKind(kind));
        }
    };
    Ok(value)
}

fn assign<R>(record: &mut R, element: &SchemaElement<R>, value: Value) -> Result<()> {
    let kind = value.kind();
    if element.descriptor.accessor.write(record, value) {
        Ok(())
    } else {
        Err(ArbiterError::mismatched(format!(
            "field `{}` does not accept a {kind} value",
            element.name()
        )))
    }
}

fn expect_terminator<Rd: Read>(wire: &mut WireReader<'_, Rd>) -> Result<()> {
    let last = wire.u8()?;
    if last != TERMINATOR {
        return Err(ArbiterError::not_network_object(format!(
            "envelope ends with 0x{last:02x}, expected 0x{TERMINATOR:02x}"
        )));
    }
    Ok(())
}

fn trailing_bytes(len: usize) -> ArbiterError {
    ArbiterError::not_network_object(format!("{len} trailing bytes after terminator"))
}

/// Blocking reader that only hands out complete fields.
///
/// `read_exact` keeps reading until the requested number of bytes has
/// arrived, so short reads from the transport are absorbed here. A recording
/// reader additionally keeps every byte it consumed.
struct WireReader<'r, Rd> {
    inner: &'r mut Rd,
    captured: Option<Vec<u8>>,
}

impl<'r, Rd: Read> WireReader<'r, Rd> {
    fn new(inner: &'r mut Rd) -> Self {
        Self {
            inner,
            captured: None,
        }
    }

    fn recording(inner: &'r mut Rd) -> Self {
        Self {
            inner,
            captured: Some(Vec::new()),
        }
    }

    fn into_captured(self) -> Vec<u8> {
        self.captured.unwrap_or_default()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        if let Some(captured) = self.captured.as_mut() {
            captured.extend_from_slice(buf);
        }
        Ok(())
    }

    fn array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn u8(&mut self) -> io::Result<u8> {
        let [byte] = self.array::<1>()?;
        Ok(byte)
    }

    fn skip(&mut self, mut len: usize) -> io::Result<()> {
        let mut scratch = [0u8; 256];
        while len > 0 {
            let step = len.min(scratch.len());
            self.read_exact(&mut scratch[..step])?;
            len -= step;
        }
        Ok(())
    }
}
