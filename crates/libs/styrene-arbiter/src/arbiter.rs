//! Record exchange over a blocking byte stream.

use std::io::{Read, Write};

use crate::config::ArbiterConfig;
use crate::descriptor::NetworkObject;
use crate::error::Result;
use crate::schema::SchemaDescriber;

/// Sends and receives records over one stream, one envelope at a time.
///
/// Schemas are derived per call; nothing is cached between exchanges. The
/// arbiter owns the stream, so two records can never interleave on it.
#[derive(Debug)]
pub struct Arbiter<S> {
    stream: S,
    config: ArbiterConfig,
}

impl<S> Arbiter<S> {
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ArbiterConfig::default())
    }

    pub fn with_config(stream: S, config: ArbiterConfig) -> Self {
        Self { stream, config }
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Write> Arbiter<S> {
    /// Encode `record` and write the whole envelope. Returns the bytes written.
    pub fn send_object<R: NetworkObject>(&mut self, record: &R) -> Result<usize> {
        let schema = SchemaDescriber::default().describe::<R>()?;
        let envelope = self.config.encoder().encode(record, &schema)?;
        if self.config.log_envelopes {
            log::trace!("arbiter: send {}", hex::encode(&envelope));
        }
        self.stream.write_all(&envelope)?;
        self.stream.flush()?;
        log::debug!(
            "arbiter: sent {} ({} bytes)",
            std::any::type_name::<R>(),
            envelope.len()
        );
        Ok(envelope.len())
    }
}

impl<S: Read> Arbiter<S> {
    /// Read one envelope and materialize it as `R`.
    ///
    /// The local schema is derived before any byte is read, so a record type
    /// that cannot be described fails without touching the stream.
    pub fn receive_object<R: NetworkObject>(&mut self) -> Result<R> {
        let schema = SchemaDescriber::default().describe::<R>()?;
        let decoder = self.config.decoder();
        let envelope = decoder.read_envelope(&mut self.stream)?;
        if self.config.log_envelopes {
            log::trace!("arbiter: recv {}", hex::encode(&envelope.bytes));
        }
        decoder.decode_envelope(&envelope, &schema).map_err(|err| {
            log::warn!(
                "arbiter: rejected envelope for {}: {err}",
                std::any::type_name::<R>()
            );
            err
        })
    }
}
