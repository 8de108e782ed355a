//! Cryptographic primitives for identity-trust.
//!
//! This module provides:
//! - Ed25519 public keys with stable equality and fingerprints
//! - Ed25519 key pairs (held only by key services)
//! - Signing and verification of certificate bytes

pub mod keys;
pub mod signing;

pub use keys::{Ed25519KeyPair, PublicKey};
