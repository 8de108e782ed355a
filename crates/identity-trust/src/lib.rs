//! identity-trust: a node-local identity and certificate trust service.
//!
//! Resolves public keys and X.500 legal names to verified identities,
//! validates certificate chains against a configurable trust anchor, and
//! maps well-known legal identities to the disposable anonymous identities
//! used for privacy-preserving transactions.

pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod issuance;
pub mod keystore;
pub mod registry;
pub mod time;
pub mod trust;

// Re-export primary types
pub use cert::{CertPath, CertRole, Certificate};
pub use config::{AnonymousPathEntry, RegistryConfig};
pub use crypto::PublicKey;
pub use error::{
    CertificateError, ChainValidationError, ConfigError, IdentityError, IssuanceError,
    KeyServiceError, NameError, OwnershipError, Result, UnresolvedAnonymousParty,
};
pub use identity::{AbstractParty, AnonymousParty, CertifiedIdentity, LegalName, Party};
pub use issuance::{issue_fresh_anonymous_identity, FreshIdentity, IssuanceOptions};
pub use keystore::{ContentSigner, InMemoryKeyService, KeyService};
pub use registry::IdentityRegistry;
pub use trust::{AnchorMode, TrustAnchor, ValidationOutcome};
