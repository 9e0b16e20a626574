//! Canonical wire types shared by the REST client, the push feed, and state.
//!
//! DESIGN
//! ======
//! Backend payloads arrive in loose shapes (bare arrays vs. wrapped lists,
//! numeric strings, optional fields). `normalize` converts them into the
//! types below once, at the API boundary, so state and rendering code never
//! inspect raw JSON.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::Serialize;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by oracle backend operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or the connection dropped.
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response JSON did not have any of the accepted shapes.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// The configured base URL cannot be mapped to a websocket URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The websocket handshake failed.
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
}

impl ApiError {
    /// Human-readable detail for a rejected request.
    ///
    /// Non-2xx bodies of the form `{"detail": ...}` yield the JSON text of
    /// `detail`; any other body is returned verbatim.
    #[must_use]
    pub fn rejection_detail(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("detail").cloned())
            .map(|detail| detail.to_string());
        Some(detail.unwrap_or_else(|| body.clone()))
    }
}

// =============================================================================
// BONDS
// =============================================================================

/// A registered solar installation.
#[derive(Clone, Debug, PartialEq)]
pub struct Bond {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity_kw: f64,
    /// Compliance floor, in percent.
    pub threshold: f64,
    pub interest_rate: Option<f64>,
    pub contract_address: Option<String>,
}

impl Bond {
    /// First eight characters of the id, used on list cards.
    #[must_use]
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

// =============================================================================
// VERDICTS + AUDIT LOG
// =============================================================================

/// Compliance classification computed by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Verdict {
    Compliant,
    NonCompliant,
    /// Non-compliant day reported under the backend's `PENALTY` label.
    Penalty,
    /// Sunlight was too low for the day to count.
    IgnoredDay,
    #[default]
    Pending,
    Other(String),
}

impl Verdict {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "COMPLIANT" => Self::Compliant,
            "NON_COMPLIANT" | "NON-COMPLIANT" => Self::NonCompliant,
            "PENALTY" => Self::Penalty,
            "IGNORED_DAY" => Self::IgnoredDay,
            "" | "PENDING" => Self::Pending,
            _ => Self::Other(label.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::Penalty => "PENALTY",
            Self::IgnoredDay => "IGNORED_DAY",
            Self::Pending => "PENDING",
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub fn is_compliant(&self) -> bool {
        matches!(self, Self::Compliant)
    }
}

/// One day of the append-only audit history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditEntry {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Percent.
    pub performance_ratio: f64,
    pub verdict: Verdict,
    pub tx_link: Option<String>,
    pub actual_energy_kwh: Option<f64>,
    pub theoretical_max_kwh: Option<f64>,
    pub ghi: Option<f64>,
    /// Backend anomaly marker such as `LOW_GHI` or `PR_ANOMALY`.
    pub flag: Option<String>,
}

/// Batch statistics returned next to an audit log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditSummary {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_days: Option<u64>,
    pub compliant_days: Option<u64>,
    pub penalty_days: Option<u64>,
    pub threshold: Option<f64>,
}

impl AuditSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Normalized audit log response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditLog {
    pub entries: Vec<AuditEntry>,
    pub summary: AuditSummary,
}

/// Today's computed result. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodayResult {
    pub date: Option<String>,
    pub performance_ratio: Option<f64>,
    pub theoretical_max_kwh: Option<f64>,
    pub verdict: Option<Verdict>,
    pub actual_energy_kwh: Option<f64>,
    pub ghi: Option<f64>,
    pub flag: Option<String>,
}

// =============================================================================
// PENALTIES
// =============================================================================

/// A non-compliant day with its energy shortfall.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PenaltyEvent {
    pub date: String,
    pub pr: f64,
    pub actual_energy: f64,
    pub theoretical_max: f64,
    pub shortfall: f64,
}

/// Settlement-oriented penalty report for one bond.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PenaltySummary {
    pub total_days: u64,
    pub penalty_days: u64,
    /// Percent of days under the floor.
    pub penalty_rate: f64,
    pub events: Vec<PenaltyEvent>,
}

// =============================================================================
// PUSH FEED
// =============================================================================

/// Message type tag for live oracle readings.
pub const ORACLE_UPDATE: &str = "ORACLE_UPDATE";

/// A decoded push frame from `/ws/oracle/{bond_id}`.
#[derive(Clone, Debug, PartialEq)]
pub enum PushMessage {
    OracleUpdate(AuditEntry),
    /// Any other `type` tag; carries the tag for logging.
    Unrecognized(String),
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Creatable bond fields, as sent to `POST /api/v1/bonds`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBond {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity_kw: f64,
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    pub contract_address: String,
}

/// How a registration is carried on the create request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationEncoding {
    /// JSON request body.
    #[default]
    Json,
    /// URL-encoded query parameters with an empty body.
    Query,
}
