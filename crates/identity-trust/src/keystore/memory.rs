//! In-memory key service.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::crypto::keys::{Ed25519KeyPair, PublicKey};
use crate::error::KeyServiceError;

use super::{ContentSigner, KeyService};

/// Thread-safe key service holding Ed25519 key pairs in memory.
///
/// Key pairs are zeroized when the last signer referencing them is dropped.
#[derive(Default)]
pub struct InMemoryKeyService {
    keys: RwLock<HashMap<PublicKey, Arc<Ed25519KeyPair>>>,
}

impl InMemoryKeyService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import an existing signing key, returning its public key.
    pub fn import(&self, signing_key_bytes: &[u8; 32]) -> PublicKey {
        self.insert(Ed25519KeyPair::from_signing_key_bytes(signing_key_bytes))
    }

    /// Does this service hold the private key for `key`?
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of key pairs held.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key_pair: Ed25519KeyPair) -> PublicKey {
        let public_key = key_pair.public_key();
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(public_key, Arc::new(key_pair));
        public_key
    }
}

impl KeyService for InMemoryKeyService {
    fn fresh_key(&self) -> Result<PublicKey, KeyServiceError> {
        Ok(self.insert(Ed25519KeyPair::generate()))
    }

    fn signer_for(&self, key: &PublicKey) -> Result<Box<dyn ContentSigner>, KeyServiceError> {
        let key_pair = self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or(KeyServiceError::UnknownKey(*key))?;
        Ok(Box::new(KeyPairSigner(key_pair)))
    }
}

struct KeyPairSigner(Arc<Ed25519KeyPair>);

impl ContentSigner for KeyPairSigner {
    fn public_key(&self) -> PublicKey {
        self.0.public_key()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyServiceError> {
        ContentSigner::sign(self.0.as_ref(), message)
    }
}
