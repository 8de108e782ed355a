//! Certificate paths.
//!
//! Index 0 is the subject (leaf) certificate; the last element is the
//! certificate closest to the trust root. Certificate `i` is expected to be
//! issued by the subject of certificate `i + 1`, which the validator checks.

use serde::{Deserialize, Serialize};

use crate::error::ChainValidationError;

use super::certificate::Certificate;

/// An ordered, non-empty, immutable chain of certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCertPath")]
pub struct CertPath {
    certificates: Vec<Certificate>,
    revocation_enabled: bool,
}

#[derive(Deserialize)]
struct RawCertPath {
    certificates: Vec<Certificate>,
    #[serde(default)]
    revocation_enabled: bool,
}

impl TryFrom<RawCertPath> for CertPath {
    type Error = ChainValidationError;

    fn try_from(raw: RawCertPath) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.certificates)?.with_revocation(raw.revocation_enabled))
    }
}

#[allow(clippy::len_without_is_empty)]
impl CertPath {
    /// Build a path, rejecting an empty certificate list.
    pub fn new(certificates: Vec<Certificate>) -> Result<Self, ChainValidationError> {
        if certificates.is_empty() {
            return Err(ChainValidationError::EmptyChain);
        }
        Ok(Self {
            certificates,
            revocation_enabled: false,
        })
    }

    /// Record whether revocation checking was requested for this path.
    ///
    /// Revocation is never consulted by validation.
    pub fn with_revocation(mut self, enabled: bool) -> Self {
        self.revocation_enabled = enabled;
        self
    }

    /// A new path with `leaf` in front of this one.
    pub fn prepend(&self, leaf: Certificate) -> Self {
        let mut certificates = Vec::with_capacity(self.len() + 1);
        certificates.push(leaf);
        certificates.extend(self.certificates.iter().cloned());
        Self {
            certificates,
            revocation_enabled: self.revocation_enabled,
        }
    }

    pub fn revocation_enabled(&self) -> bool {
        self.revocation_enabled
    }

    /// The subject certificate.
    pub fn leaf(&self) -> &Certificate {
        &self.certificates[0]
    }

    /// The certificate closest to the trust root.
    pub fn top(&self) -> &Certificate {
        &self.certificates[self.certificates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }
}

impl<'a> IntoIterator for &'a CertPath {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
