//! Concurrency test: parallel registration, lookup and issuance.
//!
//! Validates that the registry is safe to share across threads and that
//! readers never observe a half-applied registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use identity_trust::cert::{create_self_signed, ValidityWindow};
use identity_trust::crypto::keys::Ed25519KeyPair;
use identity_trust::{
    issue_fresh_anonymous_identity, CertPath, CertRole, CertifiedIdentity, IdentityRegistry,
    InMemoryKeyService, IssuanceOptions, KeyService, PublicKey,
};

const DAY: Duration = Duration::from_secs(86_400);

fn identity(legal_name: &str) -> CertifiedIdentity {
    let kp = Ed25519KeyPair::generate();
    let cert = create_self_signed(
        CertRole::NodeCa,
        legal_name.parse().unwrap(),
        &kp,
        ValidityWindow::starting_now(DAY),
    )
    .unwrap();
    CertifiedIdentity::from_path(CertPath::new(vec![cert]).unwrap())
}

#[test]
fn stress_16_concurrent_registrars() {
    let registry = Arc::new(IdentityRegistry::new(None));

    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let mut keys = Vec::new();
            for i in 0..50 {
                let id = identity(&format!("O=Party {thread_id}-{i},L=London,C=GB"));
                keys.push(*id.owning_key());
                registry
                    .register_identity(id)
                    .expect("registration should succeed");
            }
            keys
        }));
    }

    let keys: Vec<PublicKey> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(keys.len(), 800);
    assert_eq!(registry.len(), 800);
    assert_eq!(registry.all_identities().len(), 800);
    for key in &keys {
        let party = registry.party_from_key(key).expect("every key resolves");
        assert_eq!(registry.party_from_name(party.name()), Some(party));
    }
}

#[test]
fn stress_readers_never_see_partial_registration() {
    let registry = Arc::new(IdentityRegistry::new(None));
    let identities: Arc<Vec<CertifiedIdentity>> = Arc::new(
        (0..400)
            .map(|i| identity(&format!("O=Node {i},L=Berlin,C=DE")))
            .collect(),
    );
    let done = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        let identities = Arc::clone(&identities);
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            let mut observed = 0usize;
            while !done.load(Ordering::Acquire) {
                for id in identities.iter() {
                    if let Some(party) = registry.party_from_key(id.owning_key()) {
                        // Key index hit implies the name and path indices
                        // were written under the same guard.
                        assert_eq!(&party, id.party());
                        assert!(registry.party_from_name(id.name()).is_some());
                        assert!(registry.certificate_from_key(id.owning_key()).is_some());
                        observed += 1;
                    }
                }
            }
            observed
        }));
    }

    let writer = {
        let registry = Arc::clone(&registry);
        let identities = Arc::clone(&identities);
        thread::spawn(move || {
            for id in identities.iter() {
                registry.register_identity(id.clone()).unwrap();
            }
        })
    };
    writer.join().unwrap();
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.all_identities().len(), 400);
}

#[test]
fn stress_snapshots_are_isolated_from_later_writes() {
    let registry = Arc::new(IdentityRegistry::new(None));
    for i in 0..10 {
        registry
            .register_identity(identity(&format!("O=Seed {i},L=Oslo,C=NO")))
            .unwrap();
    }
    let snapshot = registry.all_identities();

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..100 {
                registry
                    .register_identity(identity(&format!("O=Late {i},L=Oslo,C=NO")))
                    .unwrap();
            }
        })
    };
    writer.join().unwrap();

    assert_eq!(snapshot.len(), 10);
    assert!(snapshot
        .iter()
        .all(|party| party.name().organisation().starts_with("Seed")));
    assert_eq!(registry.all_identities().len(), 110);
}

#[test]
fn stress_concurrent_issuance_for_one_issuer() {
    let service = Arc::new(InMemoryKeyService::new());
    let registry = Arc::new(IdentityRegistry::new(None));

    let key = service.fresh_key().unwrap();
    let signer = service.signer_for(&key).unwrap();
    let cert = create_self_signed(
        CertRole::NodeCa,
        "O=Alice,L=London,C=GB".parse().unwrap(),
        signer.as_ref(),
        ValidityWindow::starting_now(DAY),
    )
    .unwrap();
    let alice = Arc::new(CertifiedIdentity::from_path(CertPath::new(vec![cert]).unwrap()));
    registry.register_identity((*alice).clone()).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let registry = Arc::clone(&registry);
        let alice = Arc::clone(&alice);
        handles.push(thread::spawn(move || {
            (0..25)
                .map(|_| {
                    issue_fresh_anonymous_identity(
                        service.as_ref(),
                        &registry,
                        &alice,
                        &IssuanceOptions::default(),
                    )
                    .expect("issuance should succeed")
                    .anonymous
                })
                .collect::<Vec<_>>()
        }));
    }

    let issued: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let unique: std::collections::HashSet<_> = issued.iter().collect();
    assert_eq!(unique.len(), 200, "fresh keys are never reused");

    for anonymous in &issued {
        assert_eq!(
            registry.party_from_key(anonymous.owning_key()).as_ref(),
            Some(alice.party())
        );
        assert!(registry.assert_ownership(alice.party(), anonymous).is_ok());
    }
    assert_eq!(registry.len(), 201);
}
