//! Dashboard configuration.
//!
//! DESIGN
//! ======
//! Everything the controller would otherwise read from ambient globals (backend
//! URL, the clock, random contract addresses) is an explicit field here and
//! handed to `Dashboard::new`. The binary fills it from CLI flags and their
//! `ORACLEX_*` environment fallbacks.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt::Write;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::net::types::RegistrationEncoding;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown dashboard variant `{0}` (expected `polling` or `push`)")]
    UnknownVariant(String),
    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Which flavour of detail view the dashboard runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// Audit log plus a "today" result over REST; JSON registration.
    #[default]
    Polling,
    /// 30-day history plus a live websocket feed; query-string registration
    /// and manual production logs.
    Push,
}

impl Variant {
    #[must_use]
    pub fn registration_encoding(self) -> RegistrationEncoding {
        match self {
            Self::Polling => RegistrationEncoding::Json,
            Self::Push => RegistrationEncoding::Query,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polling => "polling",
            Self::Push => "push",
        }
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "polling" | "poll" | "a" => Ok(Self::Polling),
            "push" | "live" | "b" => Ok(Self::Push),
            other => Err(ConfigError::UnknownVariant(other.to_owned())),
        }
    }
}

/// Source of the placeholder contract address put on new drafts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AddressSource {
    #[default]
    Random,
    Fixed(String),
}

impl AddressSource {
    #[must_use]
    pub fn next_address(&self) -> String {
        match self {
            Self::Random => random_contract_address(),
            Self::Fixed(address) => address.clone(),
        }
    }
}

/// Source of "today" for daily lookups and the manual-log check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateSource {
    /// Client-local calendar date.
    #[default]
    Local,
    Fixed(NaiveDate),
}

impl DateSource {
    #[must_use]
    pub fn today(self) -> NaiveDate {
        match self {
            Self::Local => Local::now().date_naive(),
            Self::Fixed(date) => date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    pub base_url: String,
    pub variant: Variant,
    pub http_timeout: Duration,
    pub addresses: AddressSource,
    pub dates: DateSource,
}

impl DashboardConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, variant: Variant) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            variant,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            addresses: AddressSource::default(),
            dates: DateSource::default(),
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.dates.today()
    }

    /// `today()` as `YYYY-MM-DD`.
    #[must_use]
    pub fn today_iso(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Variant::default())
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDate`] for anything else.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate(raw.to_owned()))
}

/// `0x` followed by 40 random hex digits.
#[must_use]
pub fn random_contract_address() -> String {
    let bytes: [u8; 20] = rand::rng().random();
    let mut address = String::with_capacity(42);
    address.push_str("0x");
    for byte in bytes {
        let _ = write!(address, "{byte:02x}");
    }
    address
}
