//! Trust anchor resolution.
//!
//! With a configured anchor every path must chain to its root certificate.
//! Without one, each path is validated against its own top-most
//! certificate, for that validation only. The self-anchored mode is weaker
//! and is always reported as such.

use serde::{Deserialize, Serialize};

use crate::cert::{CertPath, Certificate};
use crate::crypto::keys::PublicKey;
use crate::error::{CertificateError, ChainValidationError};
use crate::identity::LegalName;

use super::validator::ValidationOutcome;

/// A self-signed root certificate that validation terminates at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Certificate", into = "Certificate")]
pub struct TrustAnchor {
    root: Certificate,
}

impl TrustAnchor {
    /// Accept `root` as an anchor if it is self-issued and self-signed.
    pub fn new(root: Certificate) -> Result<Self, CertificateError> {
        if !root.is_self_issued() || !root.verify_signature(root.subject_key()) {
            return Err(CertificateError::NotSelfSigned(root.subject().clone()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Certificate {
        &self.root
    }

    pub fn subject(&self) -> &LegalName {
        self.root.subject()
    }

    pub fn public_key(&self) -> &PublicKey {
        self.root.subject_key()
    }
}

impl TryFrom<Certificate> for TrustAnchor {
    type Error = CertificateError;

    fn try_from(root: Certificate) -> Result<Self, Self::Error> {
        Self::new(root)
    }
}

impl From<TrustAnchor> for Certificate {
    fn from(anchor: TrustAnchor) -> Self {
        anchor.root
    }
}

/// Which kind of anchor a validation ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorMode {
    /// Against the configured network trust anchor.
    Anchored,
    /// Against the path's own top-most certificate.
    SelfAnchored,
}

impl AnchorMode {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anchored => "anchored",
            Self::SelfAnchored => "self_anchored",
        }
    }
}

impl std::fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The anchor a particular path is validated against.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedAnchor<'a> {
    Configured(&'a TrustAnchor),
    /// The path's own top-most certificate, trusted for one validation.
    Synthetic(&'a Certificate),
}

impl<'a> ResolvedAnchor<'a> {
    /// Resolve the anchor for a path whose top-most certificate is `top`.
    pub fn resolve(configured: Option<&'a TrustAnchor>, top: &'a Certificate) -> Self {
        match configured {
            Some(anchor) => Self::Configured(anchor),
            None => Self::Synthetic(top),
        }
    }

    pub fn mode(&self) -> AnchorMode {
        match self {
            Self::Configured(_) => AnchorMode::Anchored,
            Self::Synthetic(_) => AnchorMode::SelfAnchored,
        }
    }

    pub fn certificate(&self) -> &'a Certificate {
        match self {
            Self::Configured(anchor) => anchor.root(),
            Self::Synthetic(top) => top,
        }
    }
}

/// Holds the optional network anchor for a registry's lifetime.
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorResolver {
    anchor: Option<TrustAnchor>,
}

impl TrustAnchorResolver {
    pub fn new(anchor: Option<TrustAnchor>) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> Option<&TrustAnchor> {
        self.anchor.as_ref()
    }

    pub fn mode(&self) -> AnchorMode {
        match self.anchor {
            Some(_) => AnchorMode::Anchored,
            None => AnchorMode::SelfAnchored,
        }
    }

    /// Validate `path` at the current time against this resolver's anchor.
    pub fn validate(
        &self,
        path: &CertPath,
        required_owning_key: &PublicKey,
        required_subject_name: Option<&LegalName>,
    ) -> Result<ValidationOutcome, ChainValidationError> {
        super::validator::validate(
            path,
            self.anchor.as_ref(),
            required_owning_key,
            required_subject_name,
        )
    }
}
