//! # Ed25519 Signatures
//!
//! Key validation and signature checks for transactions and blocks.
//! Aggregated block signatures are the members' Ed25519 signatures
//! concatenated in consensus-group order.

use crate::domain::CryptoError;
use crate::ports::{KeyGenerator, MultiSigVerifier, SingleSigner};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let bytes: &[u8; PUBLIC_KEY_LEN] = public_key
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    VerifyingKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)
}

fn verify_one(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let key = verifying_key(public_key)?;
    let signature = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
    key.verify(message, &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Ed25519 key generator, single signer and multi-signature verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Signer;

impl KeyGenerator for Ed25519Signer {
    fn check_public_key(&self, public_key: &[u8]) -> Result<(), CryptoError> {
        verifying_key(public_key).map(|_| ())
    }
}

impl SingleSigner for Ed25519Signer {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        verify_one(public_key, message, signature)
    }
}

impl MultiSigVerifier for Ed25519Signer {
    fn verify_aggregated(
        &self,
        public_keys: &[Vec<u8>],
        message: &[u8],
        aggregated: &[u8],
    ) -> Result<(), CryptoError> {
        if public_keys.is_empty() {
            return Err(CryptoError::EmptyConsensusGroup);
        }
        if aggregated.len() != public_keys.len() * SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature);
        }
        public_keys
            .iter()
            .zip(aggregated.chunks_exact(SIGNATURE_LEN))
            .try_for_each(|(key, signature)| verify_one(key, message, signature))
    }
}

/// Ed25519 signing key.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

/// Aggregates member signatures in group order.
pub fn aggregate_signatures(signatures: &[Vec<u8>]) -> Vec<u8> {
    signatures.concat()
}
