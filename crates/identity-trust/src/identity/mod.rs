//! Identity record model: names, parties and certified identities.
//!
//! Well-known parties carry a legal name and a long-lived key; anonymous
//! parties carry only a disposable key. `AbstractParty` is the tagged
//! union callers use when either will do.

pub mod name;
pub mod party;

pub use name::LegalName;
pub use party::{AbstractParty, AnonymousParty, CertifiedIdentity, Party};
