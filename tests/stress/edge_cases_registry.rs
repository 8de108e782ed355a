//! Edge case tests for registration, lookup and issuance.

use std::time::Duration;

use identity_trust::cert::{create_certificate, create_self_signed, validity_window, ValidityWindow};
use identity_trust::crypto::keys::Ed25519KeyPair;
use identity_trust::time::{duration_micros, now_micros};
use identity_trust::{
    issue_fresh_anonymous_identity, AbstractParty, AnonymousParty, CertPath, CertRole,
    CertificateError, CertifiedIdentity, ChainValidationError, IdentityError, IdentityRegistry,
    InMemoryKeyService, IssuanceError, IssuanceOptions, KeyService, LegalName, NameError,
    OwnershipError, Party, PublicKey, RegistryConfig, TrustAnchor,
};

const HOUR: Duration = Duration::from_secs(3600);

fn name(s: &str) -> LegalName {
    s.parse().unwrap()
}

fn self_signed(kp: &Ed25519KeyPair, legal_name: &str, window: ValidityWindow) -> CertifiedIdentity {
    let cert = create_self_signed(CertRole::NodeCa, name(legal_name), kp, window).unwrap();
    CertifiedIdentity::from_path(CertPath::new(vec![cert]).unwrap())
}

fn expired_window() -> ValidityWindow {
    let now = now_micros();
    ValidityWindow {
        not_before: now - 2 * duration_micros(HOUR),
        not_after: now - duration_micros(HOUR),
    }
}

// ── Names ───────────────────────────────────────────────────────────────

#[test]
fn edge_names_with_same_attributes_are_one_party() {
    let registry = IdentityRegistry::new(None);
    let kp = Ed25519KeyPair::generate();
    let alice = self_signed(&kp, "O=Alice,L=London,C=GB", ValidityWindow::starting_now(HOUR));
    registry.register_identity(alice.clone()).unwrap();

    let respelled = name("c=gb, o=Alice, l=London");
    assert_eq!(registry.party_from_name(&respelled).as_ref(), Some(alice.party()));
}

#[test]
fn edge_malformed_names_rejected() {
    assert!(matches!(
        "O=Alice;L=London;C=GB".parse::<LegalName>(),
        Err(NameError::MissingAttribute(_)) | Err(NameError::InvalidValue { .. })
    ));
    assert!(matches!(
        "Alice".parse::<LegalName>(),
        Err(NameError::MalformedAttribute(_))
    ));
    assert!(matches!(
        "O=,L=London,C=GB".parse::<LegalName>(),
        Err(NameError::InvalidValue { attribute: "O", .. })
    ));
}

// ── Registration ────────────────────────────────────────────────────────

#[test]
fn edge_expired_certificate_rejected() {
    let registry = IdentityRegistry::new(None);
    let kp = Ed25519KeyPair::generate();
    let alice = self_signed(&kp, "O=Alice,L=London,C=GB", expired_window());

    assert!(matches!(
        registry.register_identity(alice),
        Err(IdentityError::Chain(
            ChainValidationError::CertificateNotValidAt { index: 0, .. }
        ))
    ));
    assert!(registry.is_empty());
}

#[test]
fn edge_self_anchored_top_need_not_be_self_issued() {
    // A node certificate whose root was never shipped: the self-anchored
    // fallback trusts the top-most certificate as presented.
    let root_kp = Ed25519KeyPair::generate();
    let root = create_self_signed(
        CertRole::RootCa,
        name("O=Root,L=Zurich,C=CH"),
        &root_kp,
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let node_kp = Ed25519KeyPair::generate();
    let node = create_certificate(
        CertRole::NodeCa,
        &root,
        &root_kp,
        name("O=Alice,L=London,C=GB"),
        node_kp.public_key(),
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let alice = CertifiedIdentity::from_path(CertPath::new(vec![node]).unwrap());

    let self_anchored = IdentityRegistry::new(None);
    assert!(self_anchored.register_identity(alice.clone()).is_ok());

    let anchored = IdentityRegistry::new(Some(TrustAnchor::new(root).unwrap()));
    assert!(anchored.register_identity(alice).is_ok());
}

#[test]
fn edge_trust_anchor_must_be_self_signed() {
    let root_kp = Ed25519KeyPair::generate();
    let root = create_self_signed(
        CertRole::RootCa,
        name("O=Root,L=Zurich,C=CH"),
        &root_kp,
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let child = create_certificate(
        CertRole::IntermediateCa,
        &root,
        &root_kp,
        name("O=Sub CA,L=Zurich,C=CH"),
        Ed25519KeyPair::generate().public_key(),
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    assert!(matches!(
        TrustAnchor::new(child),
        Err(CertificateError::NotSelfSigned(_))
    ));
}

#[test]
fn edge_anonymous_reregistration_moves_owner() {
    let registry = IdentityRegistry::new(None);
    let alice_kp = Ed25519KeyPair::generate();
    let alice = self_signed(&alice_kp, "O=Alice,L=London,C=GB", ValidityWindow::starting_now(HOUR));
    let bob_kp = Ed25519KeyPair::generate();
    let bob = self_signed(&bob_kp, "O=Bob,L=Paris,C=FR", ValidityWindow::starting_now(HOUR));

    let anon_key = Ed25519KeyPair::generate().public_key();
    let anonymous = AnonymousParty::new(anon_key);
    let path_for = |issuer: &CertifiedIdentity, kp: &Ed25519KeyPair| {
        let cert = create_certificate(
            CertRole::ConfidentialIdentity,
            issuer.leaf_certificate(),
            kp,
            issuer.name().clone(),
            anon_key,
            ValidityWindow::starting_now(HOUR),
        )
        .unwrap();
        issuer.certificate_path().prepend(cert)
    };

    registry
        .register_anonymous_identity(&anonymous, alice.party(), path_for(&alice, &alice_kp))
        .unwrap();
    registry
        .register_anonymous_identity(&anonymous, bob.party(), path_for(&bob, &bob_kp))
        .unwrap();

    assert_eq!(registry.party_from_key(&anon_key).as_ref(), Some(bob.party()));
    assert!(registry.assert_ownership(bob.party(), &anonymous).is_ok());
    assert!(registry.assert_ownership(alice.party(), &anonymous).is_err());
    assert_eq!(registry.len(), 1);
}

// ── Lookup ──────────────────────────────────────────────────────────────

#[test]
fn edge_lookups_on_empty_registry() {
    let registry = IdentityRegistry::new(None);
    let key = Ed25519KeyPair::generate().public_key();
    let anonymous = AnonymousParty::new(key);

    assert!(registry.party_from_key(&key).is_none());
    assert!(registry.party_from_name(&name("O=Nobody,L=Nowhere,C=XX")).is_none());
    assert!(registry.certificate_from_key(&key).is_none());
    assert!(registry.parties_from_name("", false).is_empty());
    assert!(registry.path_for_anonymous(&anonymous).is_none());
    assert!(registry
        .party_from_anonymous(&AbstractParty::from(anonymous))
        .is_none());
    assert!(registry.all_identities().is_empty());
}

#[test]
fn edge_certificate_from_key_ignores_anonymous_keys() {
    let service = InMemoryKeyService::new();
    let registry = IdentityRegistry::new(None);
    let key = service.fresh_key().unwrap();
    let signer = service.signer_for(&key).unwrap();
    let cert = create_self_signed(
        CertRole::NodeCa,
        name("O=Alice,L=London,C=GB"),
        signer.as_ref(),
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let alice = CertifiedIdentity::from_path(CertPath::new(vec![cert]).unwrap());
    registry.register_identity(alice.clone()).unwrap();

    let fresh =
        issue_fresh_anonymous_identity(&service, &registry, &alice, &IssuanceOptions::default())
            .unwrap();
    assert!(registry
        .certificate_from_key(fresh.anonymous.owning_key())
        .is_none());
    assert_eq!(registry.certificate_from_key(&key), Some(alice));
}

// ── Ownership ───────────────────────────────────────────────────────────

#[test]
fn edge_ownership_holds_under_network_root() {
    // The top certificate is issued by the network root, not by Alice.
    let root_kp = Ed25519KeyPair::generate();
    let root = create_self_signed(
        CertRole::RootCa,
        name("O=Root,L=Zurich,C=CH"),
        &root_kp,
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let service = InMemoryKeyService::new();
    let node = |legal_name: &str| {
        let key = service.fresh_key().unwrap();
        let cert = create_certificate(
            CertRole::NodeCa,
            &root,
            &root_kp,
            name(legal_name),
            key,
            ValidityWindow::starting_now(HOUR),
        )
        .unwrap();
        CertifiedIdentity::from_path(CertPath::new(vec![cert, root.clone()]).unwrap())
    };
    let alice = node("O=Alice,L=London,C=GB");
    let bob = node("O=Bob,L=Paris,C=FR");
    let registry = IdentityRegistry::new(Some(TrustAnchor::new(root.clone()).unwrap()));
    registry.register_identity(alice.clone()).unwrap();
    registry.register_identity(bob.clone()).unwrap();

    let fresh =
        issue_fresh_anonymous_identity(&service, &registry, &alice, &IssuanceOptions::default())
            .unwrap();
    assert_eq!(fresh.path.top(), &root);
    assert!(registry
        .assert_ownership(alice.party(), &fresh.anonymous)
        .is_ok());
    assert!(matches!(
        registry.assert_ownership(bob.party(), &fresh.anonymous),
        Err(OwnershipError::OwnershipMismatch {
            check: "leaf subject",
            ..
        })
    ));
}

#[test]
fn edge_anonymous_registration_cannot_take_well_known_key() {
    let registry = IdentityRegistry::new(None);
    let alice_kp = Ed25519KeyPair::generate();
    let bob_kp = Ed25519KeyPair::generate();
    let alice = self_signed(&alice_kp, "O=Alice,L=London,C=GB", ValidityWindow::starting_now(HOUR));
    let bob = self_signed(&bob_kp, "O=Bob,L=Paris,C=FR", ValidityWindow::starting_now(HOUR));
    registry.register_identity(alice.clone()).unwrap();
    registry.register_identity(bob.clone()).unwrap();

    // Alice certifies Bob's owning key as one of her anonymous keys.
    let cert = create_certificate(
        CertRole::ConfidentialIdentity,
        alice.leaf_certificate(),
        &alice_kp,
        alice.name().clone(),
        bob_kp.public_key(),
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let hijack = AnonymousParty::new(bob_kp.public_key());
    let result = registry.register_anonymous_identity(
        &hijack,
        alice.party(),
        alice.certificate_path().prepend(cert),
    );

    assert_eq!(
        result,
        Err(IdentityError::WellKnownKeyReuse(bob_kp.public_key()))
    );
    assert!(registry.all_identities().contains(bob.party()));
    assert_eq!(registry.all_identities().len(), 2);
    assert_eq!(registry.party_from_key(&bob_kp.public_key()).as_ref(), Some(bob.party()));
    assert_eq!(registry.certificate_from_key(&bob_kp.public_key()), Some(bob));
}

#[test]
fn edge_ownership_claim_by_unrelated_key_holder() {
    let registry = IdentityRegistry::new(None);
    let kp = Ed25519KeyPair::generate();
    let alice = self_signed(&kp, "O=Alice,L=London,C=GB", ValidityWindow::starting_now(HOUR));
    let anon_kp = Ed25519KeyPair::generate();
    let cert = create_certificate(
        CertRole::ConfidentialIdentity,
        alice.leaf_certificate(),
        &kp,
        alice.name().clone(),
        anon_kp.public_key(),
        ValidityWindow::starting_now(HOUR),
    )
    .unwrap();
    let anonymous = AnonymousParty::new(anon_kp.public_key());
    registry
        .register_anonymous_identity(&anonymous, alice.party(), alice.certificate_path().prepend(cert))
        .unwrap();

    // Claiming the anonymous key as its own well-known party
    let claimant = Party::new(alice.name().clone(), anon_kp.public_key());
    assert!(matches!(
        registry.assert_ownership(&claimant, &anonymous),
        Err(OwnershipError::OwnershipMismatch {
            check: "issuing key",
            ..
        })
    ));
}

// ── Issuance ────────────────────────────────────────────────────────────

#[test]
fn edge_issuance_under_expired_issuer_fails_cleanly() {
    let service = InMemoryKeyService::new();
    let registry = IdentityRegistry::new(None);
    let key = service.fresh_key().unwrap();
    let signer = service.signer_for(&key).unwrap();
    let cert = create_self_signed(
        CertRole::NodeCa,
        name("O=Alice,L=London,C=GB"),
        signer.as_ref(),
        expired_window(),
    )
    .unwrap();
    let alice = CertifiedIdentity::from_path(CertPath::new(vec![cert]).unwrap());

    let result =
        issue_fresh_anonymous_identity(&service, &registry, &alice, &IssuanceOptions::default());
    assert!(matches!(
        result,
        Err(IssuanceError::Certificate(
            CertificateError::EmptyValidityWindow { .. }
        ))
    ));
    assert!(registry.is_empty());
}

#[test]
fn edge_validity_window_clipped_to_issuer_start() {
    let kp = Ed25519KeyPair::generate();
    let now = now_micros();
    let window = ValidityWindow {
        not_before: now + duration_micros(HOUR),
        not_after: now + 2 * duration_micros(HOUR),
    };
    let issuer = create_self_signed(CertRole::NodeCa, name("O=Future,L=Oslo,C=NO"), &kp, window)
        .unwrap();

    let clipped = validity_window(&issuer, now, 10 * HOUR).unwrap();
    assert_eq!(clipped, window);
}

#[test]
fn edge_config_with_empty_sections_builds_empty_registry() {
    let config: RegistryConfig = serde_json::from_str("{}").unwrap();
    let registry = IdentityRegistry::from_config(config).unwrap();
    assert!(registry.is_empty());
    assert!(registry.trust_anchor().is_none());
}

#[test]
fn edge_public_key_base64_roundtrip_and_rejection() {
    let key = Ed25519KeyPair::generate().public_key();
    assert_eq!(PublicKey::from_base64(&key.to_base64()).unwrap(), key);
    assert!(PublicKey::from_base64("not base64!").is_err());
    assert!(PublicKey::from_base64("AAAA").is_err());
}
