//! Construction-time registry configuration.
//!
//! A configuration carries only public material: the optional network
//! trust anchor, well-known identities with their paths, and anonymous
//! paths. It is read once when a registry is built and stored as pretty
//! JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cert::CertPath;
use crate::error::ConfigError;
use crate::identity::{AnonymousParty, CertifiedIdentity};
use crate::trust::TrustAnchor;

/// Registry construction options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Present: strict anchored validation. Absent: self-anchored fallback.
    #[serde(default)]
    pub trust_anchor: Option<TrustAnchor>,
    #[serde(default)]
    pub initial_identities: Vec<CertifiedIdentity>,
    #[serde(default)]
    pub initial_cert_paths: Vec<AnonymousPathEntry>,
}

/// An anonymous party and the path certifying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousPathEntry {
    pub anonymous: AnonymousParty,
    pub path: CertPath,
}

impl RegistryConfig {
    /// Read a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
