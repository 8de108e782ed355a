//! Ed25519 public keys and key pairs.
//!
//! `PublicKey` is the opaque verification key every index in the registry
//! is keyed by. `Ed25519KeyPair` holds private material and only ever lives
//! inside a key service.

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CertificateError;

/// An Ed25519 verification key in its 32-byte encoded form.
///
/// Equality and hashing are over the encoded bytes, so two keys compare
/// equal exactly when their encodings are byte-for-byte identical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap raw encoded key bytes without checking they decode to a point.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The encoded key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short, stable identifier for logs and error messages.
    ///
    /// Format: `key_` + base58 of first 16 bytes of SHA-256(key).
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.0);
        format!("key_{}", bs58::encode(&hash[..16]).into_string())
    }

    /// Base64 of the encoded key, the form used on the command line.
    pub fn to_base64(&self) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, self.0)
    }

    /// Parse a base64-encoded key, validating that it is a curve point.
    pub fn from_base64(encoded: &str) -> Result<Self, CertificateError> {
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .map_err(|e| CertificateError::InvalidKey(format!("invalid base64 public key: {e}")))?;
        crate::cert::builder::decode_public_key(&bytes)
    }

    /// Convert to a dalek verifying key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, CertificateError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CertificateError::InvalidKey(format!("invalid verifying key: {e}")))
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

/// An Ed25519 key pair for signing operations.
///
/// `SigningKey` zeroizes its secret bytes when dropped.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let public_key = PublicKey::from(&signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let public_key = PublicKey::from(&signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }
}
