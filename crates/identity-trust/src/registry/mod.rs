//! The identity registry, a node-local trust cache.
//!
//! The registry resolves public keys and legal names to well-known parties,
//! deanonymises anonymous parties, and proves ownership of anonymous keys
//! through their certificate paths. Every path is validated before it is
//! stored. Entries are only ever added; re-registering a key replaces the
//! previous entry (last write wins).
//!
//! All three indices sit behind one `RwLock`. Validation runs before the
//! write lock is taken, and a registration is applied to every index under
//! a single write guard, so readers never see a partial registration.

mod index;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::Span;

use crate::cert::CertPath;
use crate::config::{AnonymousPathEntry, RegistryConfig};
use crate::crypto::keys::PublicKey;
use crate::error::{
    IdentityError, OwnershipError, Result, UnresolvedAnonymousParty,
};
use crate::identity::{AbstractParty, AnonymousParty, CertifiedIdentity, LegalName, Party};
use crate::trust::{AnchorMode, TrustAnchor, TrustAnchorResolver, ValidationOutcome};

use index::Indices;

/// Concurrent, in-memory identity registry.
pub struct IdentityRegistry {
    resolver: TrustAnchorResolver,
    indices: RwLock<Indices>,
    span: Span,
}

impl IdentityRegistry {
    /// Create an empty registry.
    ///
    /// With `trust_anchor` every path must chain to it. Without one, each
    /// path is validated against its own top-most certificate.
    pub fn new(trust_anchor: Option<TrustAnchor>) -> Self {
        let resolver = TrustAnchorResolver::new(trust_anchor);
        let span = tracing::info_span!("identity_registry", mode = %resolver.mode());
        Self {
            resolver,
            indices: RwLock::new(Indices::default()),
            span,
        }
    }

    /// Replace the span every registry event is emitted under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Build a registry from construction-time configuration.
    ///
    /// Initial identities and paths go through the same validating
    /// registration calls as later ones. The owner of each anonymous path
    /// is the initial identity named by the path's leaf subject.
    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        let registry = Self::new(config.trust_anchor);
        for identity in config.initial_identities {
            registry.register_identity(identity)?;
        }
        for entry in config.initial_cert_paths {
            let subject = entry.path.leaf().subject().clone();
            let owner = registry
                .party_from_name(&subject)
                .ok_or(IdentityError::UnknownOwner(subject))?;
            registry.register_anonymous_identity(&entry.anonymous, &owner, entry.path)?;
        }
        Ok(registry)
    }

    /// Export the registry contents as configuration.
    pub fn to_config(&self) -> RegistryConfig {
        let indices = self.read();
        let mut initial_identities: Vec<CertifiedIdentity> =
            indices.identities().cloned().collect();
        initial_identities.sort_by(|a, b| a.party().cmp(b.party()));
        let mut initial_cert_paths: Vec<AnonymousPathEntry> = indices
            .anonymous_entries()
            .map(|(key, _, path)| AnonymousPathEntry {
                anonymous: AnonymousParty::new(*key),
                path: path.clone(),
            })
            .collect();
        initial_cert_paths.sort_by(|a, b| a.anonymous.cmp(&b.anonymous));
        RegistryConfig {
            trust_anchor: self.resolver.anchor().cloned(),
            initial_identities,
            initial_cert_paths,
        }
    }

    pub fn trust_anchor(&self) -> Option<&TrustAnchor> {
        self.resolver.anchor()
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.resolver.mode()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Validate and register a well-known identity.
    ///
    /// The leaf certificate must carry the party's key byte-for-byte and
    /// name the party as its subject.
    pub fn register_identity(&self, identity: CertifiedIdentity) -> Result<()> {
        let party = identity.party();
        let leaf = identity.leaf_certificate();
        if leaf.subject_key() != party.owning_key() {
            let err = IdentityError::KeyCertificateMismatch {
                party_key: *party.owning_key(),
                certificate_key: *leaf.subject_key(),
            };
            tracing::warn!(
                parent: &self.span,
                key = %party.owning_key(),
                name = %party.name(),
                outcome = "rejected",
                error = %err,
                "identity registration rejected"
            );
            return Err(err);
        }

        let outcome = self.validate(
            identity.certificate_path(),
            party.owning_key(),
            Some(party.name()),
            party.name(),
        )?;
        self.log_accepted("identity registered", party.owning_key(), party.name(), &outcome);

        self.write().insert_well_known(identity);
        Ok(())
    }

    /// Validate and register an anonymous identity owned by `owner`.
    ///
    /// The path must terminate at the anonymous key and its leaf subject
    /// must be the owner's name. The anonymous key is resolvable by key
    /// but never by name. A key that is currently the owning key of a
    /// well-known identity is refused.
    pub fn register_anonymous_identity(
        &self,
        anonymous: &AnonymousParty,
        owner: &Party,
        path: CertPath,
    ) -> Result<()> {
        let outcome = self.validate(
            &path,
            anonymous.owning_key(),
            Some(owner.name()),
            owner.name(),
        )?;

        // A configured anchor is already enforced by validation.
        let mut indices = self.write();
        if indices.is_well_known_key(anonymous.owning_key()) {
            drop(indices);
            let err = IdentityError::WellKnownKeyReuse(*anonymous.owning_key());
            tracing::warn!(
                parent: &self.span,
                key = %anonymous.owning_key(),
                name = %owner.name(),
                outcome = "rejected",
                error = %err,
                "anonymous identity rejected"
            );
            return Err(err);
        }
        self.log_accepted(
            "anonymous identity registered",
            anonymous.owning_key(),
            owner.name(),
            &outcome,
        );

        indices.insert_anonymous(anonymous, owner, path);
        Ok(())
    }

    fn validate(
        &self,
        path: &CertPath,
        required_key: &PublicKey,
        required_subject: Option<&LegalName>,
        name: &LegalName,
    ) -> Result<ValidationOutcome> {
        self.resolver
            .validate(path, required_key, required_subject)
            .map_err(|err| {
                tracing::warn!(
                    parent: &self.span,
                    key = %required_key,
                    name = %name,
                    mode = %self.resolver.mode(),
                    outcome = "rejected",
                    error = %err,
                    "certificate path failed validation"
                );
                IdentityError::from(err)
            })
    }

    fn log_accepted(
        &self,
        message: &str,
        key: &PublicKey,
        name: &LegalName,
        outcome: &ValidationOutcome,
    ) {
        match outcome.mode {
            AnchorMode::Anchored => tracing::debug!(
                parent: &self.span,
                key = %key,
                name = %name,
                mode = %outcome.mode,
                anchor = %outcome.anchor.subject(),
                path_length = outcome.path_length,
                outcome = "accepted",
                "{message}"
            ),
            AnchorMode::SelfAnchored => tracing::warn!(
                parent: &self.span,
                key = %key,
                name = %name,
                mode = %outcome.mode,
                anchor = %outcome.anchor.subject(),
                path_length = outcome.path_length,
                outcome = "accepted",
                "{message} without a network trust anchor"
            ),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Snapshot of every well-known party, ordered by name then key.
    ///
    /// Later registrations never change a returned snapshot.
    pub fn all_identities(&self) -> Vec<Party> {
        let mut parties: Vec<Party> = self
            .read()
            .identities()
            .map(|identity| identity.party().clone())
            .collect();
        parties.sort();
        parties
    }

    /// The well-known party owning `key`, directly or through an anonymous
    /// registration.
    pub fn party_from_key(&self, key: &PublicKey) -> Option<Party> {
        self.read().party_for_key(key).cloned()
    }

    pub fn party_from_name(&self, name: &LegalName) -> Option<Party> {
        self.read()
            .identity_for_name(name)
            .map(|identity| identity.party().clone())
    }

    /// The certified identity registered under its own owning key `key`.
    pub fn certificate_from_key(&self, key: &PublicKey) -> Option<CertifiedIdentity> {
        let indices = self.read();
        let party = indices.party_for_key(key)?;
        indices
            .identity_for_name(party.name())
            .filter(|identity| identity.owning_key() == key)
            .cloned()
    }

    /// The certified identity registered under `party`'s name.
    pub fn certificate_from_party(&self, party: &Party) -> Option<CertifiedIdentity> {
        self.read().identity_for_name(party.name()).cloned()
    }

    /// Well-known parties with any name attribute matching `query`.
    ///
    /// Exact matching compares whole attribute values; otherwise a
    /// case-insensitive substring match is used.
    pub fn parties_from_name(&self, query: &str, exact_match: bool) -> Vec<Party> {
        let needle = query.to_lowercase();
        let mut parties: Vec<Party> = self
            .read()
            .identities()
            .filter(|identity| {
                identity.name().attributes().iter().any(|(_, value)| {
                    if exact_match {
                        *value == query
                    } else {
                        value.to_lowercase().contains(&needle)
                    }
                })
            })
            .map(|identity| identity.party().clone())
            .collect();
        parties.sort();
        parties
    }

    /// Resolve any party to its well-known owner.
    ///
    /// A well-known party is returned as is, without a lookup.
    pub fn party_from_anonymous(&self, party: &AbstractParty) -> Option<Party> {
        match party {
            AbstractParty::WellKnown(party) => Some(party.clone()),
            AbstractParty::Anonymous(anonymous) => self.party_from_key(anonymous.owning_key()),
        }
    }

    /// Like [`party_from_anonymous`](Self::party_from_anonymous), for callers
    /// that cannot continue without a well-known party.
    pub fn require_party_from_anonymous(
        &self,
        party: &AbstractParty,
    ) -> std::result::Result<Party, UnresolvedAnonymousParty> {
        self.party_from_anonymous(party)
            .ok_or(UnresolvedAnonymousParty(*party.owning_key()))
    }

    pub fn path_for_anonymous(&self, anonymous: &AnonymousParty) -> Option<CertPath> {
        self.read().path_for_key(anonymous.owning_key()).cloned()
    }

    /// Prove that `claimed_owner` owns `anonymous` through its stored path.
    ///
    /// Checks, in order:
    /// 1. the leaf subject is the claimed owner's name
    /// 2. the leaf key is the anonymous key
    /// 3. the certificate issuing the leaf, if any, names the owner and
    ///    carries the owner's key
    /// 4. the top-most certificate's issuer is the configured trust
    ///    anchor's subject, or the claimed owner's name when self-anchored
    pub fn assert_ownership(
        &self,
        claimed_owner: &Party,
        anonymous: &AnonymousParty,
    ) -> std::result::Result<(), OwnershipError> {
        let path = self
            .path_for_anonymous(anonymous)
            .ok_or(OwnershipError::UnknownAnonymousParty(*anonymous.owning_key()))?;

        let result = check_ownership(claimed_owner, anonymous, &path, self.resolver.anchor());
        if let Err(err) = &result {
            tracing::warn!(
                parent: &self.span,
                key = %anonymous.owning_key(),
                name = %claimed_owner.name(),
                outcome = "denied",
                error = %err,
                "ownership assertion failed"
            );
        }
        result
    }

    /// Number of distinct keys known, well-known and anonymous.
    pub fn len(&self) -> usize {
        self.read().key_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Writers never panic while holding the guard, so a poisoned lock still
    // guards consistent indices.
    fn read(&self) -> RwLockReadGuard<'_, Indices> {
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indices> {
        self.indices.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_ownership(
    claimed_owner: &Party,
    anonymous: &AnonymousParty,
    path: &CertPath,
    trust_anchor: Option<&TrustAnchor>,
) -> std::result::Result<(), OwnershipError> {
    let leaf = path.leaf();
    if leaf.subject() != claimed_owner.name() {
        return Err(mismatch(
            "leaf subject",
            claimed_owner.name(),
            leaf.subject(),
        ));
    }
    if leaf.subject_key() != anonymous.owning_key() {
        return Err(mismatch(
            "leaf key",
            anonymous.owning_key(),
            leaf.subject_key(),
        ));
    }
    if let Some(issuing) = path.certificates().get(1) {
        if issuing.subject() != claimed_owner.name() {
            return Err(mismatch(
                "issuing subject",
                claimed_owner.name(),
                issuing.subject(),
            ));
        }
        if issuing.subject_key() != claimed_owner.owning_key() {
            return Err(mismatch(
                "issuing key",
                claimed_owner.owning_key(),
                issuing.subject_key(),
            ));
        }
    }
    let root = trust_anchor.map_or(claimed_owner.name(), TrustAnchor::subject);
    let top = path.top();
    if top.issuer() != root {
        return Err(mismatch("root issuer", root, top.issuer()));
    }
    Ok(())
}

fn mismatch(
    check: &'static str,
    expected: &impl std::fmt::Display,
    actual: &impl std::fmt::Display,
) -> OwnershipError {
    OwnershipError::OwnershipMismatch {
        check,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
