//! Certificate chain validation.
//!
//! Validation walks the path from leaf to root:
//! 1. Every certificate is within its validity window
//! 2. Each certificate is issued by, and signed by, the one above it
//! 3. The top-most certificate chains to the resolved trust anchor
//! 4. The leaf attests the required key (and subject, when given)
//!
//! Revocation status is never consulted. Validation has no side effects.

use crate::cert::{CertPath, Certificate};
use crate::crypto::keys::PublicKey;
use crate::error::ChainValidationError;
use crate::identity::LegalName;

use super::anchor::{AnchorMode, ResolvedAnchor, TrustAnchor};

/// Result of a successful chain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Anchored or self-anchored.
    pub mode: AnchorMode,
    /// The certificate the path was validated against.
    pub anchor: Certificate,
    /// The key the path terminates at.
    pub leaf_key: PublicKey,
    /// Number of certificates in the path.
    pub path_length: usize,
}

/// Validate `path` at the current time.
pub fn validate(
    path: &CertPath,
    trust_anchor: Option<&TrustAnchor>,
    required_owning_key: &PublicKey,
    required_subject_name: Option<&LegalName>,
) -> Result<ValidationOutcome, ChainValidationError> {
    validate_at(
        path.certificates(),
        trust_anchor,
        required_owning_key,
        required_subject_name,
        crate::time::now_micros(),
    )
}

/// Validate a leaf-first certificate chain at time `now` (microseconds).
pub fn validate_at(
    certificates: &[Certificate],
    trust_anchor: Option<&TrustAnchor>,
    required_owning_key: &PublicKey,
    required_subject_name: Option<&LegalName>,
    now: u64,
) -> Result<ValidationOutcome, ChainValidationError> {
    let (Some(leaf), Some(top)) = (certificates.first(), certificates.last()) else {
        return Err(ChainValidationError::EmptyChain);
    };
    let top_index = certificates.len() - 1;

    // 1. Validity windows
    for (index, cert) in certificates.iter().enumerate() {
        if !cert.is_valid_at(now) {
            return Err(ChainValidationError::CertificateNotValidAt {
                index,
                subject: cert.subject().clone(),
            });
        }
    }

    // 2. Links, leaf to root
    for (index, pair) in certificates.windows(2).enumerate() {
        let (child, parent) = (&pair[0], &pair[1]);
        if child.issuer() != parent.subject() {
            return Err(ChainValidationError::BrokenLink {
                index,
                issuer: child.issuer().clone(),
                expected: parent.subject().clone(),
            });
        }
        if !child.verify_signature(parent.subject_key()) {
            return Err(ChainValidationError::SignatureInvalid {
                index,
                subject: child.subject().clone(),
            });
        }
    }

    // 3. Anchor
    let resolved = ResolvedAnchor::resolve(trust_anchor, top);
    match resolved {
        ResolvedAnchor::Configured(anchor) => {
            if top.issuer() != anchor.subject() {
                return Err(ChainValidationError::AnchorMismatch {
                    expected: anchor.subject().clone(),
                    actual: top.issuer().clone(),
                });
            }
            if !top.verify_signature(anchor.public_key()) {
                return Err(ChainValidationError::SignatureInvalid {
                    index: top_index,
                    subject: top.subject().clone(),
                });
            }
        }
        // The top's issuer is trusted by fiat; only a self-issued top can
        // still be checked.
        ResolvedAnchor::Synthetic(top) => {
            if top.is_self_issued() && !top.verify_signature(top.subject_key()) {
                return Err(ChainValidationError::SignatureInvalid {
                    index: top_index,
                    subject: top.subject().clone(),
                });
            }
        }
    }

    // 4. Terminal key and subject
    if leaf.subject_key() != required_owning_key {
        return Err(ChainValidationError::KeyMismatch {
            expected: *required_owning_key,
            actual: *leaf.subject_key(),
        });
    }
    if let Some(expected) = required_subject_name {
        if leaf.subject() != expected {
            return Err(ChainValidationError::SubjectMismatch {
                expected: expected.clone(),
                actual: leaf.subject().clone(),
            });
        }
    }

    Ok(ValidationOutcome {
        mode: resolved.mode(),
        anchor: resolved.certificate().clone(),
        leaf_key: *leaf.subject_key(),
        path_length: certificates.len(),
    })
}
