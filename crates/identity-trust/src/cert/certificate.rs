//! X.509-style certificates.
//!
//! A certificate binds a subject legal name to a subject public key, is
//! valid for a window of time, and is signed by its issuer over the
//! canonical bincode encoding of every field except the signature.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::PublicKey;
use crate::crypto::signing;
use crate::error::CertificateError;
use crate::identity::LegalName;

/// The role a certificate plays in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertRole {
    RootCa,
    IntermediateCa,
    NodeCa,
    WellKnownIdentity,
    ConfidentialIdentity,
}

impl CertRole {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RootCa => "root_ca",
            Self::IntermediateCa => "intermediate_ca",
            Self::NodeCa => "node_ca",
            Self::WellKnownIdentity => "well_known_identity",
            Self::ConfidentialIdentity => "confidential_identity",
        }
    }
}

/// A signed certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub(crate) serial: [u8; 16],
    pub(crate) role: CertRole,
    pub(crate) subject: LegalName,
    pub(crate) issuer: LegalName,
    pub(crate) subject_key: PublicKey,
    /// Start of validity (microseconds since epoch).
    pub(crate) not_before: u64,
    /// End of validity (microseconds since epoch).
    pub(crate) not_after: u64,
    pub(crate) signature: Vec<u8>,
}

/// Fields covered by the issuer signature.
#[derive(Serialize)]
struct TbsCertificate<'a> {
    serial: &'a [u8; 16],
    role: CertRole,
    subject: &'a LegalName,
    issuer: &'a LegalName,
    subject_key: &'a PublicKey,
    not_before: u64,
    not_after: u64,
}

/// The signed fields up to the subject key, read back from the encoding.
#[derive(Deserialize)]
struct EncodedTbsPrefix {
    _serial: [u8; 16],
    _role: CertRole,
    _subject: LegalName,
    _issuer: LegalName,
    subject_key: [u8; 32],
}

impl Certificate {
    pub fn serial_hex(&self) -> String {
        hex::encode(self.serial)
    }

    pub fn role(&self) -> CertRole {
        self.role
    }

    pub fn subject(&self) -> &LegalName {
        &self.subject
    }

    pub fn issuer(&self) -> &LegalName {
        &self.issuer
    }

    /// The public key this certificate attests.
    pub fn subject_key(&self) -> &PublicKey {
        &self.subject_key
    }

    pub fn not_before(&self) -> u64 {
        self.not_before
    }

    pub fn not_after(&self) -> u64 {
        self.not_after
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Issuer and subject are the same name.
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    pub fn is_valid_at(&self, micros: u64) -> bool {
        self.not_before <= micros && micros <= self.not_after
    }

    /// Canonical encoding of the signed fields.
    pub fn tbs_bytes(&self) -> Result<Vec<u8>, CertificateError> {
        let tbs = TbsCertificate {
            serial: &self.serial,
            role: self.role,
            subject: &self.subject,
            issuer: &self.issuer,
            subject_key: &self.subject_key,
            not_before: self.not_before,
            not_after: self.not_after,
        };
        bincode::serialize(&tbs).map_err(|e| CertificateError::Encoding(e.to_string()))
    }

    /// Decode the subject key from the signed encoding.
    ///
    /// Fails when the encoded bytes are not a valid Ed25519 point.
    pub fn encoded_subject_key(&self) -> Result<PublicKey, CertificateError> {
        let tbs = self.tbs_bytes()?;
        let prefix: EncodedTbsPrefix =
            bincode::deserialize(&tbs).map_err(|e| CertificateError::Encoding(e.to_string()))?;
        crate::cert::builder::decode_public_key(&prefix.subject_key)
    }

    /// Check the signature against the issuer's public key.
    pub fn verify_signature(&self, issuer_key: &PublicKey) -> bool {
        match self.tbs_bytes() {
            Ok(tbs) => signing::verify(issuer_key, &tbs, &self.signature),
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] issued by {} (serial {})",
            self.subject,
            self.role.as_str(),
            self.issuer,
            self.serial_hex()
        )
    }
}
