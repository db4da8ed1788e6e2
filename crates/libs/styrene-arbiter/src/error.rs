use crate::kind::{ElementKind, ValueType};

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, ArbiterError>;

/// Errors from schema derivation, encoding, decoding and stream exchange.
///
/// Every fault is terminal for the exchange it occurred in. Transport failures
/// (`Io`) are kept apart from protocol violations so callers can tell a dropped
/// connection from a peer speaking a different schema.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArbiterError {
    #[error("not a network object: {reason}")]
    NotANetworkObject { reason: String },

    #[error("duplicate placement {placement}: existing `{existing}`, new `{duplicate}`")]
    DuplicatePlacement {
        placement: u32,
        existing: &'static str,
        duplicate: &'static str,
    },

    #[error("mismatched object: {reason}")]
    MismatchedObject { reason: String },

    #[error("field `{field}` cannot be optional: {value_type:?} cannot represent absence")]
    InvalidOptional {
        field: &'static str,
        value_type: ValueType,
    },

    #[error("unsupported element kind: {0}")]
    UnsupportedKind(ElementKind),

    #[error("field `{field}` is {len} bytes (maximum {max})")]
    ValueTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("required field `{field}` has no value")]
    MissingValue { field: &'static str },

    #[error("too many elements: {0} (maximum {})", u16::MAX)]
    TooManyElements(usize),

    #[error("field `{field}` is not valid utf-8")]
    InvalidUtf8 { field: &'static str },

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArbiterError {
    pub(crate) fn not_network_object(reason: impl Into<String>) -> Self {
        Self::NotANetworkObject {
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatched(reason: impl Into<String>) -> Self {
        Self::MismatchedObject {
            reason: reason.into(),
        }
    }

    /// Returns `true` when the underlying byte stream failed (closed, truncated).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` for faults in the envelope, the record metadata or its values.
    pub fn is_protocol(&self) -> bool {
        !self.is_transport()
    }

    /// Returns `true` when the peer's envelope disagreed with the local schema.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::MismatchedObject { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::ArbiterError;
    use std::io;

    #[test]
    fn io_errors_are_classified_as_transport() {
        let err = ArbiterError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
        assert!(err.is_transport());
        assert!(!err.is_mismatch());
    }

    #[test]
    fn protocol_errors_are_not_transport() {
        let err = ArbiterError::mismatched("expected INT, got LONG");
        assert!(!err.is_transport());
        assert!(err.is_protocol());
        assert!(err.is_mismatch());
        assert_eq!(err.to_string(), "mismatched object: expected INT, got LONG");
    }

    #[test]
    fn duplicate_placement_names_both_fields() {
        let err = ArbiterError::DuplicatePlacement {
            placement: 3,
            existing: "b1",
            duplicate: "b3",
        };
        assert_eq!(err.to_string(), "duplicate placement 3: existing `b1`, new `b3`");
    }
}
