//! Parties and certified identities.

use serde::{Deserialize, Serialize};

use crate::cert::{CertPath, Certificate};
use crate::crypto::keys::PublicKey;

use super::name::LegalName;

/// A well-known party: a legal name bound to a long-lived public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    name: LegalName,
    owning_key: PublicKey,
}

impl Party {
    pub fn new(name: LegalName, owning_key: PublicKey) -> Self {
        Self { name, owning_key }
    }

    pub fn name(&self) -> &LegalName {
        &self.name
    }

    pub fn owning_key(&self) -> &PublicKey {
        &self.owning_key
    }

    /// The anonymous view of this party's own key.
    pub fn anonymise(&self) -> AnonymousParty {
        AnonymousParty::new(self.owning_key)
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.owning_key)
    }
}

/// A disposable identity with no attached name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnonymousParty {
    owning_key: PublicKey,
}

impl AnonymousParty {
    pub fn new(owning_key: PublicKey) -> Self {
        Self { owning_key }
    }

    pub fn owning_key(&self) -> &PublicKey {
        &self.owning_key
    }
}

impl std::fmt::Display for AnonymousParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Anonymous({})", self.owning_key)
    }
}

/// Either kind of party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractParty {
    WellKnown(Party),
    Anonymous(AnonymousParty),
}

impl AbstractParty {
    pub fn owning_key(&self) -> &PublicKey {
        match self {
            Self::WellKnown(party) => party.owning_key(),
            Self::Anonymous(party) => party.owning_key(),
        }
    }
}

impl From<Party> for AbstractParty {
    fn from(party: Party) -> Self {
        Self::WellKnown(party)
    }
}

impl From<AnonymousParty> for AbstractParty {
    fn from(party: AnonymousParty) -> Self {
        Self::Anonymous(party)
    }
}

impl std::fmt::Display for AbstractParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WellKnown(party) => party.fmt(f),
            Self::Anonymous(party) => party.fmt(f),
        }
    }
}

/// A well-known party together with the certificate path attesting it.
///
/// Construction does not validate the path; the registry does that on
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedIdentity {
    party: Party,
    certificate_path: CertPath,
}

impl CertifiedIdentity {
    pub fn new(party: Party, certificate_path: CertPath) -> Self {
        Self {
            party,
            certificate_path,
        }
    }

    /// Derive the party from the path's leaf certificate subject and key.
    pub fn from_path(certificate_path: CertPath) -> Self {
        let leaf = certificate_path.leaf();
        let party = Party::new(leaf.subject().clone(), *leaf.subject_key());
        Self::new(party, certificate_path)
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn name(&self) -> &LegalName {
        self.party.name()
    }

    pub fn owning_key(&self) -> &PublicKey {
        self.party.owning_key()
    }

    pub fn certificate_path(&self) -> &CertPath {
        &self.certificate_path
    }

    /// The certificate attesting this party (index 0 of the path).
    pub fn leaf_certificate(&self) -> &Certificate {
        self.certificate_path.leaf()
    }
}
