//! Registration form draft.
//!
//! DESIGN
//! ======
//! The draft is local-only and mirrors the creatable bond fields. Validation
//! is limited to what a form's required-field constraints would enforce; the
//! backend owns duplicate and business-rule rejection.

#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use crate::net::types::NewBond;

pub const DEFAULT_LAT: f64 = 12.97;
pub const DEFAULT_LON: f64 = 77.59;
pub const DEFAULT_CAPACITY_KW: f64 = 100.0;
pub const DEFAULT_THRESHOLD: f64 = 75.0;

/// Errors raised while editing or validating a draft.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("name is required")]
    EmptyName,
    #[error("{field} must be a number, got `{value}`")]
    NotANumber { field: &'static str, value: String },
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

/// Editable copy of a bond about to be registered.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftBond {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity_kw: f64,
    pub threshold: f64,
    pub interest_rate: Option<f64>,
    pub contract_address: String,
}

impl DraftBond {
    /// Fresh draft with form defaults and a placeholder contract address.
    #[must_use]
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            lat: DEFAULT_LAT,
            lon: DEFAULT_LON,
            capacity_kw: DEFAULT_CAPACITY_KW,
            threshold: DEFAULT_THRESHOLD,
            interest_rate: None,
            contract_address: contract_address.into(),
        }
    }

    /// Set one field from raw form text.
    ///
    /// Field names match the wire names (`capacity_kw`, `interest_rate`, ...).
    /// An empty `interest_rate` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] for unknown fields or unparsable numbers.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<(), DraftError> {
        match field {
            "name" => self.name = raw.to_owned(),
            "contract_address" => self.contract_address = raw.trim().to_owned(),
            "lat" => self.lat = parse_number("lat", raw)?,
            "lon" => self.lon = parse_number("lon", raw)?,
            "capacity_kw" => self.capacity_kw = parse_number("capacity_kw", raw)?,
            "threshold" => self.threshold = parse_number("threshold", raw)?,
            "interest_rate" if raw.trim().is_empty() => self.interest_rate = None,
            "interest_rate" => self.interest_rate = Some(parse_number("interest_rate", raw)?),
            other => return Err(DraftError::UnknownField(other.to_owned())),
        }
        Ok(())
    }

    /// Check required fields and build the request payload.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::EmptyName`] or [`DraftError::NonFinite`].
    pub fn to_request(&self) -> Result<NewBond, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        for (field, value) in [
            ("lat", self.lat),
            ("lon", self.lon),
            ("capacity_kw", self.capacity_kw),
            ("threshold", self.threshold),
        ] {
            if !value.is_finite() {
                return Err(DraftError::NonFinite(field));
            }
        }
        if self.interest_rate.is_some_and(|rate| !rate.is_finite()) {
            return Err(DraftError::NonFinite("interest_rate"));
        }

        Ok(NewBond {
            name: name.to_owned(),
            lat: self.lat,
            lon: self.lon,
            capacity_kw: self.capacity_kw,
            threshold: self.threshold,
            interest_rate: self.interest_rate,
            contract_address: self.contract_address.clone(),
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, DraftError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DraftError::NotANumber { field, value: raw.to_owned() })?;
    if value.is_finite() { Ok(value) } else { Err(DraftError::NonFinite(field)) }
}
