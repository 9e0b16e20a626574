//! View-state controller for the oracle dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Dashboard` is the single owner of registry, detail, draft and routing
//! state. Renderers read it; the CLI and the interactive shell drive it.
//!
//! DESIGN
//! ======
//! Every mutating operation takes `&mut self` and is awaited to completion
//! before the next one starts, so a detail response is always applied to the
//! selection it was requested for.
//!
//! The live feed is acquired on entering a detail scope and released on every
//! exit: deselection, reselection, `shutdown`, and drop.
//!
//! ERROR HANDLING
//! ==============
//! Loader failures are logged and degrade to empty state. The only failure a
//! user sees is a rejected registration, surfaced through `ui.alert`.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use tokio::sync::mpsc::error::TryRecvError;

use crate::config::{DashboardConfig, Variant};
use crate::net::api::OracleApi;
use crate::net::feed::FeedSubscription;
use crate::net::normalize;
use crate::net::types::ApiError;
use crate::state::detail::{DetailState, FeedStatus};
use crate::state::draft::{DraftBond, DraftError};
use crate::state::registry::RegistryState;
use crate::state::ui::UiState;

pub const CONNECT_FAILURE_ALERT: &str =
    "Cannot connect to backend. Check if the server is running and CORS is enabled.";

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("no bond `{0}` in the registry")]
    UnknownBond(String),
    #[error("no bond selected")]
    NoSelection,
    #[error("registration form is not open")]
    FormClosed,
    #[error("invalid registration: {0}")]
    InvalidDraft(#[from] DraftError),
    #[error("manual production logs need the push variant")]
    PushOnly,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of submitting the registration form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    /// Backend refused or was unreachable; see `ui.alert`.
    Rejected,
}

/// Outcome of one wait on the live feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedPoll {
    /// An `ORACLE_UPDATE` was appended to the live feed.
    Applied,
    /// A frame arrived but was not a reading.
    Ignored,
    /// The server closed the feed.
    Ended,
}

pub struct Dashboard {
    api: Box<dyn OracleApi>,
    config: DashboardConfig,
    pub registry: RegistryState,
    pub detail: DetailState,
    pub ui: UiState,
    pub draft: Option<DraftBond>,
    feed: Option<FeedSubscription>,
}

impl Dashboard {
    #[must_use]
    pub fn new(api: Box<dyn OracleApi>, config: DashboardConfig) -> Self {
        Self {
            api,
            config,
            registry: RegistryState::default(),
            detail: DetailState::default(),
            ui: UiState::default(),
            draft: None,
            feed: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    /// Replace the registry from `GET /api/v1/bonds`. Any failure empties it.
    pub async fn load_registry(&mut self) {
        match self.api.list_bonds().await {
            Ok(bonds) => {
                tracing::debug!(count = bonds.len(), "registry loaded");
                self.registry.replace(bonds);
            }
            Err(error) => {
                tracing::error!(%error, "registry fetch failed");
                self.registry.clear();
            }
        }
    }

    // =========================================================================
    // SELECTION + DETAIL
    // =========================================================================

    /// Enter the detail view for `bond_id` and load its data.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownBond`] when the id is not in the
    /// registry; state is left untouched in that case.
    pub async fn select(&mut self, bond_id: &str) -> Result<(), DashboardError> {
        let bond = self
            .registry
            .find(bond_id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownBond(bond_id.to_owned()))?;

        self.release_feed();
        self.detail.select(bond);
        self.ui.show_detail();

        match self.config.variant {
            Variant::Polling => self.load_polling_detail(bond_id).await,
            Variant::Push => self.load_push_detail(bond_id).await,
        }
        Ok(())
    }

    /// Back to the list. Releases the live feed.
    pub fn clear_selection(&mut self) {
        self.release_feed();
        self.detail.clear();
        self.ui.show_list();
    }

    async fn load_polling_detail(&mut self, bond_id: &str) {
        match self.api.audit_log(bond_id).await {
            Ok(log) => {
                self.detail.history = log.entries;
                self.detail.summary = log.summary;
            }
            Err(error) => tracing::error!(%bond_id, %error, "audit log fetch failed"),
        }

        let today = self.config.today();
        match self.api.today_result(bond_id, today).await {
            Ok(result) => self.detail.today = Some(result),
            Err(error) => tracing::error!(%bond_id, %today, %error, "daily result fetch failed"),
        }
    }

    async fn load_push_detail(&mut self, bond_id: &str) {
        match self.api.time_warp(bond_id).await {
            Ok(mut log) => {
                normalize::sort_by_date(&mut log.entries);
                self.detail.history = log.entries;
                self.detail.summary = log.summary;
            }
            Err(error) => tracing::error!(%bond_id, %error, "time-warp history fetch failed"),
        }

        match self.api.subscribe(bond_id).await {
            Ok(subscription) => {
                self.feed = Some(subscription);
                self.detail.feed_status = FeedStatus::Live;
            }
            Err(error) => {
                tracing::warn!(%bond_id, %error, "live feed unavailable");
                self.detail.feed_status = FeedStatus::Offline;
            }
        }
    }

    /// Fetch the penalty report for the selected bond.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NoSelection`] outside the detail view. Fetch
    /// failures are logged and leave the previous report in place.
    pub async fn load_penalty_summary(&mut self) -> Result<(), DashboardError> {
        let bond_id = self.selected_id()?;
        match self.api.penalty_summary(&bond_id).await {
            Ok(summary) => self.detail.penalties = Some(summary),
            Err(error) => tracing::error!(%bond_id, %error, "penalty summary fetch failed"),
        }
        Ok(())
    }

    fn selected_id(&self) -> Result<String, DashboardError> {
        self.detail
            .selected_id()
            .map(str::to_owned)
            .ok_or(DashboardError::NoSelection)
    }

    // =========================================================================
    // LIVE FEED
    // =========================================================================

    #[must_use]
    pub fn has_feed(&self) -> bool {
        self.feed.is_some()
    }

    /// Apply one raw push frame to the selected bond.
    pub fn apply_feed_frame(&mut self, text: &str) -> FeedPoll {
        match normalize::push_message(text) {
            Ok(message) => {
                if self.detail.apply_push(message) {
                    FeedPoll::Applied
                } else {
                    FeedPoll::Ignored
                }
            }
            Err(error) => {
                tracing::debug!(%error, "ignoring unreadable feed frame");
                FeedPoll::Ignored
            }
        }
    }

    /// Wait for the next live frame and apply it.
    ///
    /// Pends forever when no feed is open, so it can sit in a `select!` next to
    /// other input. Cancel-safe.
    pub async fn poll_feed(&mut self) -> FeedPoll {
        let Some(feed) = self.feed.as_mut() else {
            return std::future::pending().await;
        };
        match feed.recv().await {
            Some(text) => self.apply_feed_frame(&text),
            None => {
                self.end_feed();
                FeedPoll::Ended
            }
        }
    }

    /// Apply every frame already buffered without waiting.
    ///
    /// A feed the server has closed is dropped and marked offline once its
    /// buffered frames are applied, the same as in [`Self::poll_feed`].
    pub fn drain_feed(&mut self) -> usize {
        let mut frames = Vec::new();
        let mut ended = false;
        if let Some(feed) = self.feed.as_mut() {
            loop {
                match feed.try_recv() {
                    Ok(text) => frames.push(text),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        ended = true;
                        break;
                    }
                }
            }
        }
        let applied = frames
            .iter()
            .filter(|text| self.apply_feed_frame(text) == FeedPoll::Applied)
            .count();
        if ended {
            self.end_feed();
        }
        applied
    }

    fn end_feed(&mut self) {
        if let Some(feed) = self.feed.take() {
            tracing::info!(bond_id = feed.bond_id(), "live feed ended");
        }
        self.detail.feed_status = FeedStatus::Offline;
    }

    fn release_feed(&mut self) {
        if let Some(feed) = self.feed.take() {
            tracing::debug!(bond_id = feed.bond_id(), "releasing live feed");
            feed.dispose();
        }
    }

    /// Release every held resource.
    pub fn shutdown(&mut self) {
        self.release_feed();
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Open the creation modal with a fresh draft (an open draft is kept).
    pub fn open_registration(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(DraftBond::new(self.config.addresses.next_address()));
        }
        self.ui.modal_open = true;
    }

    /// Close the modal and discard the draft.
    pub fn cancel_registration(&mut self) {
        self.ui.modal_open = false;
        self.draft = None;
    }

    /// Submit the open draft.
    ///
    /// On success the modal closes and the registry is re-fetched once. On a
    /// backend rejection or transport failure the modal stays open and
    /// `ui.alert` carries the reason.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::FormClosed`] without an open draft, or
    /// [`DashboardError::InvalidDraft`] when required fields are missing; no
    /// request is sent in either case.
    pub async fn submit_registration(&mut self) -> Result<Registration, DashboardError> {
        let draft = self.draft.as_ref().filter(|_| self.ui.modal_open).ok_or(DashboardError::FormClosed)?;
        let request = draft.to_request()?;
        tracing::info!(name = %request.name, "registering asset");

        match self
            .api
            .create_bond(&request, self.config.variant.registration_encoding())
            .await
        {
            Ok(()) => {
                tracing::info!(name = %request.name, "asset registered");
                self.cancel_registration();
                self.load_registry().await;
                Ok(Registration::Created)
            }
            Err(error) => {
                let alert = match error.rejection_detail() {
                    Some(detail) => {
                        tracing::error!(%error, %detail, "backend rejected registration");
                        format!("Creation Failed: {detail}")
                    }
                    None => {
                        tracing::error!(%error, "registration request failed");
                        CONNECT_FAILURE_ALERT.to_owned()
                    }
                };
                self.ui.raise_alert(alert);
                Ok(Registration::Rejected)
            }
        }
    }

    // =========================================================================
    // MANUAL PRODUCTION LOG
    // =========================================================================

    /// Submit `ui.manual_input` as today's production reading.
    ///
    /// Blank input sends nothing and returns `Ok(false)`. Non-numeric input is
    /// logged, kept for correction, and sends nothing. Any call that sends a
    /// request clears the input whatever the outcome; failures are only logged.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::PushOnly`] on the polling variant and
    /// [`DashboardError::NoSelection`] outside the detail view.
    pub async fn submit_manual_log(&mut self) -> Result<bool, DashboardError> {
        if self.config.variant != Variant::Push {
            return Err(DashboardError::PushOnly);
        }
        let bond_id = self.selected_id()?;

        let raw = self.ui.manual_input.trim();
        if raw.is_empty() {
            return Ok(false);
        }
        let Some(actual_energy) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) else {
            tracing::warn!(input = %raw, "manual reading is not a number");
            return Ok(false);
        };

        self.ui.manual_input.clear();
        match self.api.log_manual(&bond_id, actual_energy).await {
            Ok(()) => tracing::info!(%bond_id, actual_energy, "manual reading submitted"),
            Err(error) => tracing::error!(%bond_id, %error, "manual reading failed"),
        }
        Ok(true)
    }

    /// Whether the live feed already shows a reading dated today.
    ///
    /// Client-side inference only; the backend is not known to reject
    /// duplicate submissions.
    #[must_use]
    pub fn has_logged_today(&self) -> bool {
        let today = self.config.today_iso();
        self.detail
            .selection
            .as_ref()
            .is_some_and(|selection| selection.has_reading_for(&today))
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.release_feed();
    }
}
