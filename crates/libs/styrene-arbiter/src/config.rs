use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::decode::Decoder;
use crate::encode::Encoder;

/// Settings for a stream-bound [`crate::Arbiter`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Trace-log every envelope sent or received as hex.
    pub log_envelopes: bool,
    /// Reject STRING payloads that are not valid UTF-8 instead of decoding lossily.
    pub strict_utf8: bool,
    /// Largest STRING value accepted when encoding, in bytes.
    pub max_string_len: u8,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            log_envelopes: false,
            strict_utf8: true,
            max_string_len: u8::MAX,
        }
    }
}

impl ArbiterConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    pub fn encoder(&self) -> Encoder<'static> {
        Encoder::default().with_max_string_len(usize::from(self.max_string_len))
    }

    pub fn decoder(&self) -> Decoder<'static> {
        Decoder::default().with_strict_utf8(self.strict_utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::ArbiterConfig;

    #[test]
    fn empty_input_uses_defaults() {
        let config = ArbiterConfig::from_toml("").expect("parse");
        assert_eq!(config, ArbiterConfig::default());
        assert!(config.strict_utf8);
        assert_eq!(config.max_string_len, 255);
    }

    #[test]
    fn partial_input_overrides_named_keys() {
        let config = ArbiterConfig::from_toml("log_envelopes = true\nmax_string_len = 64\n")
            .expect("parse");
        assert!(config.log_envelopes);
        assert!(config.strict_utf8);
        assert_eq!(config.max_string_len, 64);
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert!(ArbiterConfig::from_toml("max_string_len = 300").is_err());
    }
}
