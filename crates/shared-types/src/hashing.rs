//! # Hashers
//!
//! `Sha256Hasher` produces content hashes; `Keccak256Hasher` is the
//! transaction sign-hasher.

use crate::codec::Marshalizer;
use crate::entities::Hash;
use crate::errors::CodecError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// A 32-byte digest function.
pub trait Hasher: Send + Sync {
    fn compute(&self, data: &[u8]) -> Hash;

    fn size(&self) -> usize {
        32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn compute(&self, data: &[u8]) -> Hash {
        Sha256::digest(data).into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn compute(&self, data: &[u8]) -> Hash {
        Keccak256::digest(data).into()
    }
}

/// Hash of the marshalled form of `value`.
pub fn calculate_hash<T: Serialize + ?Sized>(
    marshalizer: &Marshalizer,
    hasher: &dyn Hasher,
    value: &T,
) -> Result<Hash, CodecError> {
    let bytes = marshalizer.marshal(value)?;
    Ok(hasher.compute(&bytes))
}
