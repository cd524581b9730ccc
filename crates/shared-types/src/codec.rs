//! # Marshalizers
//!
//! Wire encoding shared by every subsystem. The set of encodings is closed:
//! `bincode` for gossip payloads and JSON for signing payloads and configs.
//!
//! Bincode decoding is bounded: a byte limit caps allocation on hostile
//! length prefixes and trailing bytes are rejected.

use crate::errors::CodecError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default decode limit (10 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarshalizerKind {
    #[default]
    Bincode,
    Json,
}

/// Encoder/decoder for wire entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marshalizer {
    kind: MarshalizerKind,
    size_check_delta: u32,
    max_size: u64,
}

impl Marshalizer {
    pub fn new(kind: MarshalizerKind) -> Self {
        Self {
            kind,
            size_check_delta: 0,
            max_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    pub fn bincode() -> Self {
        Self::new(MarshalizerKind::Bincode)
    }

    pub fn json() -> Self {
        Self::new(MarshalizerKind::Json)
    }

    /// Enables padding detection: decoded input may exceed its canonical
    /// encoding by at most `delta` bytes. Zero disables the check.
    pub fn with_size_check(mut self, delta: u32) -> Self {
        self.size_check_delta = delta;
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn kind(&self) -> MarshalizerKind {
        self.kind
    }

    pub fn size_check_delta(&self) -> u32 {
        self.size_check_delta
    }

    fn bincode_options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(self.max_size)
            .reject_trailing_bytes()
    }

    pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self.kind {
            MarshalizerKind::Bincode => self
                .bincode_options()
                .serialize(value)
                .map_err(|e| CodecError::Encode(e.to_string())),
            MarshalizerKind::Json => {
                serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
            }
        }
    }

    pub fn unmarshal<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + Serialize,
    {
        if bytes.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if bytes.len() as u64 > self.max_size {
            return Err(CodecError::TooLarge {
                size: bytes.len(),
                max: self.max_size,
            });
        }

        let value: T = match self.kind {
            MarshalizerKind::Bincode => self
                .bincode_options()
                .deserialize(bytes)
                .map_err(|e| CodecError::Decode(e.to_string()))?,
            MarshalizerKind::Json => {
                serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))?
            }
        };

        if self.size_check_delta > 0 {
            let canonical = self.marshal(&value)?.len();
            if bytes.len() > canonical + self.size_check_delta as usize {
                return Err(CodecError::SizeCheckFailed {
                    received: bytes.len(),
                    canonical,
                    delta: self.size_check_delta,
                });
            }
        }

        Ok(value)
    }
}

impl Default for Marshalizer {
    fn default() -> Self {
        Self::bincode()
    }
}
