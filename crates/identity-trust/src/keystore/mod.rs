//! Key management boundary.
//!
//! The registry and issuance flow never read private keys. They ask a
//! [`KeyService`] for fresh keys and for [`ContentSigner`]s bound to keys the
//! service holds. Implementations may block (e.g. on hardware key storage);
//! callers impose no timeout of their own.

pub mod memory;

pub use memory::InMemoryKeyService;

use crate::crypto::keys::{Ed25519KeyPair, PublicKey};
use crate::crypto::signing;
use crate::error::KeyServiceError;

/// Produces signatures with the private key behind `public_key()`.
pub trait ContentSigner: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyServiceError>;
}

/// A key management service.
pub trait KeyService: Send + Sync {
    /// Generate and retain a new key pair, returning its public key.
    ///
    /// A fresh key is never handed out twice.
    fn fresh_key(&self) -> Result<PublicKey, KeyServiceError>;

    /// A signer for a key this service holds.
    fn signer_for(&self, key: &PublicKey) -> Result<Box<dyn ContentSigner>, KeyServiceError>;
}

impl ContentSigner for Ed25519KeyPair {
    fn public_key(&self) -> PublicKey {
        Ed25519KeyPair::public_key(self)
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyServiceError> {
        Ok(signing::sign(self.signing_key(), message).to_vec())
    }
}
