//! Error types for identity-trust.
//!
//! All errors are strongly typed and returned to the immediate caller.
//! Keys are named by fingerprint and names in canonical form; private key
//! material never appears in an error message.

use crate::crypto::keys::PublicKey;
use crate::identity::LegalName;

/// Failure to parse an X.500 legal name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    #[error("Missing required attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Invalid value for {attribute}: {reason}")]
    InvalidValue {
        attribute: &'static str,
        reason: String,
    },
}

/// Certificate chain validation failures.
///
/// Always recoverable: a failed validation mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainValidationError {
    #[error("Certificate path must contain at least one certificate")]
    EmptyChain,

    #[error("Certificate {index} ({subject}) signature does not verify")]
    SignatureInvalid { index: usize, subject: LegalName },

    #[error("Certificate {index} issuer {issuer} does not match the subject above it ({expected})")]
    BrokenLink {
        index: usize,
        issuer: LegalName,
        expected: LegalName,
    },

    #[error("Path is rooted at {actual}, not at trust anchor {expected}")]
    AnchorMismatch {
        expected: LegalName,
        actual: LegalName,
    },

    #[error("Certificate {index} ({subject}) is not valid at the validation time")]
    CertificateNotValidAt { index: usize, subject: LegalName },

    #[error("Path terminates at key {actual}, expected {expected}")]
    KeyMismatch {
        expected: PublicKey,
        actual: PublicKey,
    },

    #[error("Leaf certificate subject is {actual}, expected {expected}")]
    SubjectMismatch {
        expected: LegalName,
        actual: LegalName,
    },
}

/// Registration failures surfaced by the identity registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error(transparent)]
    Chain(#[from] ChainValidationError),

    #[error("Leaf certificate carries key {certificate_key}, party claims {party_key}")]
    KeyCertificateMismatch {
        party_key: PublicKey,
        certificate_key: PublicKey,
    },

    #[error("No well-known identity named {0} owns this certificate path")]
    UnknownOwner(LegalName),

    #[error("Key {0} is the owning key of a well-known identity and cannot be registered as anonymous")]
    WellKnownKeyReuse(PublicKey),
}

/// Ownership assertion failures. Callers treat these as a hard deny.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("Unknown anonymous party {0}")]
    UnknownAnonymousParty(PublicKey),

    #[error("Ownership mismatch on {check}: expected {expected}, actual {actual}")]
    OwnershipMismatch {
        check: &'static str,
        expected: String,
        actual: String,
    },
}

/// An anonymous party with no known well-known owner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not deanonymise party {0}")]
pub struct UnresolvedAnonymousParty(pub PublicKey);

/// Failures reported by a key management service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyServiceError {
    #[error("No private key held for {0}")]
    UnknownKey(PublicKey),

    #[error("Key service unavailable: {0}")]
    Unavailable(String),
}

/// Failures while building or decoding certificates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Validity window is empty after clipping to issuer {issuer}")]
    EmptyValidityWindow { issuer: LegalName },

    #[error("Signer key {signer} does not match issuer certificate key {issuer_key}")]
    SignerMismatch {
        signer: PublicKey,
        issuer_key: PublicKey,
    },

    #[error("Trust anchor must be a self-signed certificate: {0}")]
    NotSelfSigned(LegalName),

    #[error(transparent)]
    Signer(#[from] KeyServiceError),

    #[error(transparent)]
    Chain(#[from] ChainValidationError),
}

/// Failures of the fresh anonymous identity issuance flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssuanceError {
    #[error(transparent)]
    KeyService(#[from] KeyServiceError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("Issued certificate encodes key {encoded}, requested {requested}")]
    KeyEncodingMismatch {
        requested: PublicKey,
        encoded: PublicKey,
    },

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Failures loading or saving a registry configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Convenience Result alias for registration.
pub type Result<T> = std::result::Result<T, IdentityError>;
