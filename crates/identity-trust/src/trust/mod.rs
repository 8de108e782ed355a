//! Trust anchors and certificate chain validation.
//!
//! The trust module provides:
//! - The optional network trust anchor and its self-anchored fallback
//! - Link-by-link chain validation against the resolved anchor
//! - Terminal key and leaf subject checks

pub mod anchor;
pub mod validator;

pub use anchor::{AnchorMode, ResolvedAnchor, TrustAnchor, TrustAnchorResolver};
pub use validator::{validate, validate_at, ValidationOutcome};
