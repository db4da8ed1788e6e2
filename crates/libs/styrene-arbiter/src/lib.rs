//! # styrene-arbiter
//!
//! Self-describing binary record codec for byte-stream exchange.
//!
//! A record type registers its elements once (placement index, optional flag,
//! declared value type, accessor) through [`NetworkObject`]. From that table the
//! [`SchemaDescriber`] derives a [`Schema`], the [`Encoder`] frames a record into
//! a ZNA envelope and the [`Decoder`] validates the envelope's shape against the
//! receiver's schema before populating a fresh record.
//!
//! ## Envelope
//!
//! ```text
//! [magic:3]["ZNA"][version:1][count:2 BE][basic records][advanced headers][advanced payloads][0xFF]
//!
//! basic record:     [header:1][0 or fixed-length value bytes]
//! advanced header:  [header:1][length:1]
//! header byte:      bit 7 = declared optional, bit 6 = value present, bits 0-5 = wire tag
//! ```
//!
//! Basic (fixed-length) elements always precede advanced (variable-length)
//! elements. Placement indices only order elements within their own group.
//!
//! ## Example
//!
//! ```rust
//! use styrene_arbiter::{Decoder, Encoder, FieldTable, NetworkObject, SchemaDescriber};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Reading {
//!     sensor: i16,
//!     value: i64,
//!     label: String,
//! }
//!
//! impl NetworkObject for Reading {
//!     fn describe(table: &mut FieldTable<Self>) {
//!         table.field("sensor", 1, |r| &r.sensor, |r| &mut r.sensor);
//!         table.field("value", 2, |r| &r.value, |r| &mut r.value);
//!         table.field("label", 3, |r| &r.label, |r| &mut r.label);
//!     }
//! }
//!
//! let schema = SchemaDescriber::default().describe::<Reading>().unwrap();
//! let reading = Reading { sensor: 7, value: -40, label: "probe".into() };
//! let envelope = Encoder::default().encode(&reading, &schema).unwrap();
//! let decoded = Decoder::default().decode(&envelope, &schema).unwrap();
//! assert_eq!(decoded, reading);
//! ```

pub mod arbiter;
pub mod config;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod value;

pub use arbiter::Arbiter;
pub use config::ArbiterConfig;
pub use decode::{Decoder, Envelope};
pub use descriptor::{Accessor, FieldDescriptor, FieldTable, NetworkObject};
pub use encode::Encoder;
pub use error::{ArbiterError, Result};
pub use kind::{ElementKind, ValueType};
pub use registry::{TypeRegistry, REGISTRY};
pub use schema::{Schema, SchemaDescriber, SchemaElement};
pub use value::{FieldValue, Value};

/// Envelope magic marker.
pub const MAGIC: &[u8; 3] = b"ZNA";

/// Current envelope version.
pub const WIRE_VERSION: u8 = 0x01;

/// Final byte of every envelope.
pub const TERMINATOR: u8 = 0xFF;

/// Magic + version + element count + terminator.
pub const ENVELOPE_OVERHEAD: usize = 7;

/// STRING payloads carry a one-byte length on the wire.
pub const MAX_STRING_LEN: usize = u8::MAX as usize;

/// Header bit: the element was declared optional.
pub const FLAG_OPTIONAL: u8 = 1 << 7;

/// Header bit: an optional element carries a value.
pub const FLAG_PRESENT: u8 = 1 << 6;

/// Mask selecting the wire tag from a header byte.
pub const TAG_MASK: u8 = 0b0011_1111;
