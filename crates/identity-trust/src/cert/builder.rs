//! Certificate construction.
//!
//! Builds signed certificates from a subject, a subject key and an issuer
//! signer, computes validity windows clipped to an issuer, decodes public
//! keys and assembles paths. Signing goes through [`ContentSigner`], so
//! private keys never leave the key service.

use std::time::Duration;

use ed25519_dalek::VerifyingKey;

use crate::crypto::keys::PublicKey;
use crate::error::CertificateError;
use crate::identity::LegalName;
use crate::keystore::ContentSigner;

use super::certificate::{CertRole, Certificate};
use super::path::CertPath;

/// A `[not_before, not_after]` window in microseconds since epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub not_before: u64,
    pub not_after: u64,
}

impl ValidityWindow {
    /// `[now, now + validity]`.
    pub fn starting_now(validity: Duration) -> Self {
        let now = crate::time::now_micros();
        Self {
            not_before: now,
            not_after: now.saturating_add(crate::time::duration_micros(validity)),
        }
    }
}

/// Compute `[now, now + validity]` clipped to the issuer's own window.
///
/// A certificate never outlives its issuer. Fails when the clipped window
/// is empty, e.g. because the issuer has already expired.
pub fn validity_window(
    issuer: &Certificate,
    now: u64,
    validity: Duration,
) -> Result<ValidityWindow, CertificateError> {
    let not_before = now.max(issuer.not_before());
    let not_after = now
        .saturating_add(crate::time::duration_micros(validity))
        .min(issuer.not_after());
    if not_after < not_before {
        return Err(CertificateError::EmptyValidityWindow {
            issuer: issuer.subject().clone(),
        });
    }
    Ok(ValidityWindow {
        not_before,
        not_after,
    })
}

fn sign_certificate(
    role: CertRole,
    subject: LegalName,
    issuer: LegalName,
    subject_key: PublicKey,
    window: ValidityWindow,
    signer: &dyn ContentSigner,
) -> Result<Certificate, CertificateError> {
    let mut cert = Certificate {
        serial: rand::random(),
        role,
        subject,
        issuer,
        subject_key,
        not_before: window.not_before,
        not_after: window.not_after,
        signature: Vec::new(),
    };
    let tbs = cert.tbs_bytes()?;
    cert.signature = signer.sign(&tbs)?;
    Ok(cert)
}

/// Build a self-signed certificate for the signer's own key.
pub fn create_self_signed(
    role: CertRole,
    name: LegalName,
    signer: &dyn ContentSigner,
    window: ValidityWindow,
) -> Result<Certificate, CertificateError> {
    sign_certificate(
        role,
        name.clone(),
        name,
        signer.public_key(),
        window,
        signer,
    )
}

/// Build a certificate for `subject_key` issued under `issuer`.
///
/// The signer must hold the key the issuer certificate attests.
pub fn create_certificate(
    role: CertRole,
    issuer: &Certificate,
    issuer_signer: &dyn ContentSigner,
    subject: LegalName,
    subject_key: PublicKey,
    window: ValidityWindow,
) -> Result<Certificate, CertificateError> {
    let signer_key = issuer_signer.public_key();
    if signer_key != *issuer.subject_key() {
        return Err(CertificateError::SignerMismatch {
            signer: signer_key,
            issuer_key: *issuer.subject_key(),
        });
    }
    sign_certificate(
        role,
        subject,
        issuer.subject().clone(),
        subject_key,
        window,
        issuer_signer,
    )
}

/// Decode a public key from its 32-byte encoded form.
pub fn decode_public_key(encoded: &[u8]) -> Result<PublicKey, CertificateError> {
    let bytes: [u8; 32] = encoded
        .try_into()
        .map_err(|_| CertificateError::InvalidKey("public key must be 32 bytes".into()))?;
    let key = VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CertificateError::InvalidKey(format!("invalid verifying key: {e}")))?;
    Ok(PublicKey::from(&key))
}

/// Prepend `leaf` to the issuer's own path.
pub fn build_cert_path(
    leaf: Certificate,
    issuer_path: &CertPath,
    revocation_enabled: bool,
) -> CertPath {
    issuer_path.prepend(leaf).with_revocation(revocation_enabled)
}
