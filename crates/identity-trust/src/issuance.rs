//! Fresh anonymous identity issuance.
//!
//! Issues a new confidential identity for a well-known issuer:
//! 1. Request a fresh key from the key service
//! 2. Obtain a signer for the issuer's key
//! 3. Clip the validity window to the issuer's certificate
//! 4. Build and sign the confidential identity certificate
//! 5. Decode the key from the signed encoding and compare it to the fresh key
//! 6. Prepend the certificate to the issuer's path
//! 7. Register the anonymous identity
//!
//! Steps 1 to 6 only produce values; registration is the sole mutation, so a
//! failure anywhere leaves the registry untouched.

use std::time::Duration;

use crate::cert::{
    build_cert_path, create_certificate, validity_window, CertPath, CertRole, Certificate,
};
use crate::error::IssuanceError;
use crate::identity::{AnonymousParty, CertifiedIdentity};
use crate::keystore::KeyService;
use crate::registry::IdentityRegistry;

/// Default validity of an issued confidential identity: ten years.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(3650 * 24 * 60 * 60);

/// Options for issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceOptions {
    /// Requested validity, clipped to the issuer's own certificate.
    pub validity: Duration,
    /// Recorded on the resulting path; revocation is never checked.
    pub revocation_enabled: bool,
}

impl Default for IssuanceOptions {
    fn default() -> Self {
        Self {
            validity: DEFAULT_VALIDITY,
            revocation_enabled: false,
        }
    }
}

/// A newly issued and registered anonymous identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshIdentity {
    pub anonymous: AnonymousParty,
    /// The new leaf certificate.
    pub certificate: Certificate,
    /// The leaf followed by the issuer's own path.
    pub path: CertPath,
}

/// Issue a fresh anonymous identity for `issuer` and register it.
pub fn issue_fresh_anonymous_identity<K: KeyService + ?Sized>(
    key_service: &K,
    registry: &IdentityRegistry,
    issuer: &CertifiedIdentity,
    options: &IssuanceOptions,
) -> Result<FreshIdentity, IssuanceError> {
    let fresh_key = key_service.fresh_key()?;
    let issuer_signer = key_service.signer_for(issuer.owning_key())?;

    let issuer_cert = issuer.leaf_certificate();
    let window = validity_window(issuer_cert, crate::time::now_micros(), options.validity)?;
    let certificate = create_certificate(
        CertRole::ConfidentialIdentity,
        issuer_cert,
        issuer_signer.as_ref(),
        issuer.name().clone(),
        fresh_key,
        window,
    )?;

    let encoded = certificate.encoded_subject_key()?;
    if encoded != fresh_key {
        return Err(IssuanceError::KeyEncodingMismatch {
            requested: fresh_key,
            encoded,
        });
    }

    let path = build_cert_path(
        certificate.clone(),
        issuer.certificate_path(),
        options.revocation_enabled,
    );
    let anonymous = AnonymousParty::new(fresh_key);
    registry.register_anonymous_identity(&anonymous, issuer.party(), path.clone())?;

    Ok(FreshIdentity {
        anonymous,
        certificate,
        path,
    })
}
