//! The three registry indices.
//!
//! - key → well-known party (owning keys and anonymous keys alike)
//! - legal name → certified identity (well-known parties only)
//! - key → certificate path
//!
//! `Indices` is plain data; the registry wraps it in a single lock so each
//! registration lands in all indices at once.

use std::collections::HashMap;

use crate::cert::CertPath;
use crate::crypto::keys::PublicKey;
use crate::identity::{AnonymousParty, CertifiedIdentity, LegalName, Party};

#[derive(Debug, Default, Clone)]
pub(crate) struct Indices {
    key_to_party: HashMap<PublicKey, Party>,
    name_to_identity: HashMap<LegalName, CertifiedIdentity>,
    key_to_path: HashMap<PublicKey, CertPath>,
}

impl Indices {
    /// Last write wins in every index.
    pub(crate) fn insert_well_known(&mut self, identity: CertifiedIdentity) {
        let key = *identity.owning_key();
        self.key_to_path
            .insert(key, identity.certificate_path().clone());
        self.key_to_party.insert(key, identity.party().clone());
        self.name_to_identity
            .insert(identity.name().clone(), identity);
    }

    /// Anonymous keys are never indexed by name.
    pub(crate) fn insert_anonymous(
        &mut self,
        anonymous: &AnonymousParty,
        owner: &Party,
        path: CertPath,
    ) {
        let key = *anonymous.owning_key();
        self.key_to_path.insert(key, path);
        self.key_to_party.insert(key, owner.clone());
    }

    pub(crate) fn party_for_key(&self, key: &PublicKey) -> Option<&Party> {
        self.key_to_party.get(key)
    }

    pub(crate) fn identity_for_name(&self, name: &LegalName) -> Option<&CertifiedIdentity> {
        self.name_to_identity.get(name)
    }

    pub(crate) fn path_for_key(&self, key: &PublicKey) -> Option<&CertPath> {
        self.key_to_path.get(key)
    }

    pub(crate) fn identities(&self) -> impl Iterator<Item = &CertifiedIdentity> {
        self.name_to_identity.values()
    }

    /// Is `key` the owning key of a current well-known registration?
    pub(crate) fn is_well_known_key(&self, key: &PublicKey) -> bool {
        self.key_to_party
            .get(key)
            .and_then(|party| self.name_to_identity.get(party.name()))
            .is_some_and(|identity| identity.owning_key() == key)
    }

    /// `(anonymous key, owner, path)` for every anonymous registration.
    pub(crate) fn anonymous_entries(
        &self,
    ) -> impl Iterator<Item = (&PublicKey, &Party, &CertPath)> {
        self.key_to_party
            .iter()
            .filter(|(key, party)| party.owning_key() != *key)
            .filter_map(|(key, party)| self.key_to_path.get(key).map(|path| (key, party, path)))
    }

    pub(crate) fn key_count(&self) -> usize {
        self.key_to_party.len()
    }
}
