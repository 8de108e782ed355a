//! X.500 legal names.
//!
//! A legal name is the structured distinguished name a well-known party is
//! known by, e.g. `O=Alice,L=London,C=GB`. Parsing normalizes attribute
//! keys and values, so two names compare equal exactly when their
//! normalized attribute sets match, regardless of input order or spacing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// A normalized X.500 distinguished name.
///
/// Organisation, locality and country are required. Displayed in the
/// canonical order `CN, OU, O, L, ST, C`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LegalName {
    common_name: Option<String>,
    organisation_unit: Option<String>,
    organisation: String,
    locality: String,
    state: Option<String>,
    country: String,
}

impl LegalName {
    /// Build a name from its three required attributes.
    pub fn new(organisation: &str, locality: &str, country: &str) -> Result<Self, NameError> {
        Ok(Self {
            common_name: None,
            organisation_unit: None,
            organisation: normalize_value("O", organisation)?,
            locality: normalize_value("L", locality)?,
            state: None,
            country: normalize_country(country)?,
        })
    }

    /// Set the common name (CN).
    pub fn with_common_name(mut self, common_name: &str) -> Result<Self, NameError> {
        self.common_name = Some(normalize_value("CN", common_name)?);
        Ok(self)
    }

    /// Set the organisation unit (OU).
    pub fn with_organisation_unit(mut self, unit: &str) -> Result<Self, NameError> {
        self.organisation_unit = Some(normalize_value("OU", unit)?);
        Ok(self)
    }

    /// Set the state or province (ST).
    pub fn with_state(mut self, state: &str) -> Result<Self, NameError> {
        self.state = Some(normalize_value("ST", state)?);
        Ok(self)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    pub fn organisation_unit(&self) -> Option<&str> {
        self.organisation_unit.as_deref()
    }

    pub fn organisation(&self) -> &str {
        &self.organisation
    }

    pub fn locality(&self) -> &str {
        &self.locality
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// All present attributes as `(key, value)` pairs in canonical order.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs = Vec::with_capacity(6);
        if let Some(cn) = &self.common_name {
            attrs.push(("CN", cn.as_str()));
        }
        if let Some(ou) = &self.organisation_unit {
            attrs.push(("OU", ou.as_str()));
        }
        attrs.push(("O", self.organisation.as_str()));
        attrs.push(("L", self.locality.as_str()));
        if let Some(st) = &self.state {
            attrs.push(("ST", st.as_str()));
        }
        attrs.push(("C", self.country.as_str()));
        attrs
    }
}

fn normalize_value(attribute: &'static str, value: &str) -> Result<String, NameError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NameError::InvalidValue {
            attribute,
            reason: "must not be empty".into(),
        });
    }
    if value.contains(|c| c == ',' || c == '=') {
        return Err(NameError::InvalidValue {
            attribute,
            reason: "must not contain ',' or '='".into(),
        });
    }
    Ok(value.to_string())
}

fn normalize_country(value: &str) -> Result<String, NameError> {
    let country = value.trim().to_ascii_uppercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(NameError::InvalidValue {
            attribute: "C",
            reason: format!("expected a two-letter country code, got '{}'", value.trim()),
        });
    }
    Ok(country)
}

impl FromStr for LegalName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut common_name = None;
        let mut organisation_unit = None;
        let mut organisation = None;
        let mut locality = None;
        let mut state = None;
        let mut country = None;

        for pair in s.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| NameError::MalformedAttribute(pair.trim().to_string()))?;
            let key = key.trim().to_ascii_uppercase();
            let slot = match key.as_str() {
                "CN" => &mut common_name,
                "OU" => &mut organisation_unit,
                "O" => &mut organisation,
                "L" => &mut locality,
                "ST" => &mut state,
                "C" => &mut country,
                _ => return Err(NameError::UnknownAttribute(key)),
            };
            if slot.is_some() {
                return Err(NameError::DuplicateAttribute(key));
            }
            *slot = Some(value);
        }

        let mut name = Self::new(
            organisation.ok_or(NameError::MissingAttribute("O"))?,
            locality.ok_or(NameError::MissingAttribute("L"))?,
            country.ok_or(NameError::MissingAttribute("C"))?,
        )?;
        if let Some(cn) = common_name {
            name = name.with_common_name(cn)?;
        }
        if let Some(ou) = organisation_unit {
            name = name.with_organisation_unit(ou)?;
        }
        if let Some(st) = state {
            name = name.with_state(st)?;
        }
        Ok(name)
    }
}

impl TryFrom<String> for LegalName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LegalName> for String {
    fn from(name: LegalName) -> Self {
        name.to_string()
    }
}

impl std::fmt::Display for LegalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, value)) in self.attributes().into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LegalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LegalName({self})")
    }
}
