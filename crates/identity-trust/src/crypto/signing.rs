//! Ed25519 signing and verification over certificate bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};

use super::keys::PublicKey;

/// Sign a message with an Ed25519 signing key.
///
/// Returns the signature as 64 bytes.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> [u8; 64] {
    signing_key.sign(message).to_bytes()
}

/// Verify a 64-byte Ed25519 signature against a public key and message.
///
/// Returns `false` for undecodable keys as well as bad signatures.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = public_key.verifying_key() else {
        return false;
    };
    let Ok(sig_array) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(&sig_array))
        .is_ok()
}
