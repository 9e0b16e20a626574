//! REST client for the oracle backend.
//!
//! DESIGN
//! ======
//! `OracleApi` is the seam between the dashboard controller and the network.
//! `HttpOracleApi` is the real implementation; tests substitute a recording
//! mock. Every response body is read as text, status-checked, then handed to
//! `normalize` so callers only ever see canonical types.
//!
//! ERROR HANDLING
//! ==============
//! Transport, status, and decode failures are all returned as `ApiError`.
//! Deciding whether a failure is silent or user-visible is the controller's
//! job, not this module's.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use super::feed::{self, FeedSubscription};
use super::normalize;
use super::types::{ApiError, AuditLog, Bond, NewBond, PenaltySummary, RegistrationEncoding, TodayResult};

const CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ENDPOINTS
// =============================================================================

fn bonds_endpoint(base: &str) -> String {
    format!("{base}/api/v1/bonds")
}

fn audit_endpoint(base: &str, bond_id: &str) -> String {
    format!("{base}/oracle/audit/{bond_id}")
}

fn daily_pr_endpoint(base: &str, bond_id: &str, date: NaiveDate) -> String {
    format!("{base}/oracle/pr/{bond_id}/{}", date.format("%Y-%m-%d"))
}

fn time_warp_endpoint(base: &str, bond_id: &str) -> String {
    format!("{base}/api/v1/oracle/time-warp/{bond_id}")
}

fn manual_log_endpoint(base: &str, bond_id: &str) -> String {
    format!("{base}/api/v1/bonds/{bond_id}/log-manual")
}

fn penalty_summary_endpoint(base: &str, bond_id: &str) -> String {
    format!("{base}/oracle/penalty-summary/{bond_id}")
}

// =============================================================================
// TRAIT
// =============================================================================

/// Backend operations used by the dashboard.
#[async_trait::async_trait]
pub trait OracleApi: Send + Sync {
    /// `GET /api/v1/bonds`.
    async fn list_bonds(&self) -> Result<Vec<Bond>, ApiError>;

    /// `GET /oracle/audit/{bond_id}`.
    async fn audit_log(&self, bond_id: &str) -> Result<AuditLog, ApiError>;

    /// `GET /oracle/pr/{bond_id}/{date}`.
    async fn today_result(&self, bond_id: &str, date: NaiveDate) -> Result<TodayResult, ApiError>;

    /// `GET /api/v1/oracle/time-warp/{bond_id}`: the 30-day lookback window.
    async fn time_warp(&self, bond_id: &str) -> Result<AuditLog, ApiError>;

    /// `POST /api/v1/bonds`, carried as JSON or query parameters.
    async fn create_bond(&self, bond: &NewBond, encoding: RegistrationEncoding) -> Result<(), ApiError>;

    /// `POST /api/v1/bonds/{bond_id}/log-manual?actual_energy=<n>`.
    async fn log_manual(&self, bond_id: &str, actual_energy: f64) -> Result<(), ApiError>;

    /// `GET /oracle/penalty-summary/{bond_id}`.
    async fn penalty_summary(&self, bond_id: &str) -> Result<PenaltySummary, ApiError>;

    /// Open the live feed for one bond.
    async fn subscribe(&self, bond_id: &str) -> Result<FeedSubscription, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed [`OracleApi`].
#[derive(Clone, Debug)]
pub struct HttpOracleApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpOracleApi {
    /// Build a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the URL is not `http(s)://`,
    /// or [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), body });
    }
    Ok(body)
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let body = read_body(response).await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait::async_trait]
impl OracleApi for HttpOracleApi {
    async fn list_bonds(&self) -> Result<Vec<Bond>, ApiError> {
        let json = self.get_json(&bonds_endpoint(&self.base_url)).await?;
        normalize::bond_list(&json)
    }

    async fn audit_log(&self, bond_id: &str) -> Result<AuditLog, ApiError> {
        let json = self.get_json(&audit_endpoint(&self.base_url, bond_id)).await?;
        Ok(normalize::audit_log(&json))
    }

    async fn today_result(&self, bond_id: &str, date: NaiveDate) -> Result<TodayResult, ApiError> {
        let json = self
            .get_json(&daily_pr_endpoint(&self.base_url, bond_id, date))
            .await?;
        Ok(normalize::today_result(&json))
    }

    async fn time_warp(&self, bond_id: &str) -> Result<AuditLog, ApiError> {
        let json = self.get_json(&time_warp_endpoint(&self.base_url, bond_id)).await?;
        let mut log = normalize::audit_log(&json);
        normalize::sort_by_date(&mut log.entries);
        Ok(log)
    }

    async fn create_bond(&self, bond: &NewBond, encoding: RegistrationEncoding) -> Result<(), ApiError> {
        let request = self.http.post(bonds_endpoint(&self.base_url));
        let request = match encoding {
            RegistrationEncoding::Json => request.json(bond),
            RegistrationEncoding::Query => request.query(bond),
        };
        let response = request.send().await?;
        read_body(response).await.map(|_| ())
    }

    async fn log_manual(&self, bond_id: &str, actual_energy: f64) -> Result<(), ApiError> {
        let response = self
            .http
            .post(manual_log_endpoint(&self.base_url, bond_id))
            .query(&[("actual_energy", actual_energy)])
            .send()
            .await?;
        read_body(response).await.map(|_| ())
    }

    async fn penalty_summary(&self, bond_id: &str) -> Result<PenaltySummary, ApiError> {
        let json = self
            .get_json(&penalty_summary_endpoint(&self.base_url, bond_id))
            .await?;
        Ok(normalize::penalty_summary(&json))
    }

    async fn subscribe(&self, bond_id: &str) -> Result<FeedSubscription, ApiError> {
        let url = feed::feed_url(&self.base_url, bond_id)?;
        feed::connect(&url, bond_id).await
    }
}
