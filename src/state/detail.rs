//! Detail-view state for the selected bond.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here is scoped to exactly one bond. `select` and `clear` wipe
//! the previous bond's history, today result, penalty report and live feed
//! so nothing leaks across selections.

#[cfg(test)]
#[path = "detail_test.rs"]
mod detail_test;

use crate::net::types::{AuditEntry, AuditSummary, Bond, PenaltySummary, PushMessage, TodayResult};

/// The selected bond together with the readings pushed for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub bond: Bond,
    /// Live readings in arrival order. Repeated dates are kept.
    pub live_feed: Vec<AuditEntry>,
}

impl Selection {
    #[must_use]
    pub fn new(bond: Bond) -> Self {
        Self { bond, live_feed: Vec::new() }
    }

    /// True when the live feed holds a reading dated `date`.
    #[must_use]
    pub fn has_reading_for(&self, date: &str) -> bool {
        self.live_feed.iter().any(|entry| entry.date == date)
    }
}

/// Live feed lifecycle as seen by the detail view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// No feed for this view (polling variant or no selection).
    #[default]
    Idle,
    Live,
    /// The feed could not be opened or was closed by the server.
    Offline,
}

#[derive(Clone, Debug, Default)]
pub struct DetailState {
    pub selection: Option<Selection>,
    /// Audit history, oldest first.
    pub history: Vec<AuditEntry>,
    pub summary: AuditSummary,
    pub today: Option<TodayResult>,
    pub penalties: Option<PenaltySummary>,
    pub feed_status: FeedStatus,
}

impl DetailState {
    /// Start a fresh detail scope for `bond`.
    pub fn select(&mut self, bond: Bond) {
        *self = Self { selection: Some(Selection::new(bond)), ..Self::default() };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selection.as_ref().map(|sel| sel.bond.id.as_str())
    }

    #[must_use]
    pub fn is_selected(&self, bond_id: &str) -> bool {
        self.selected_id() == Some(bond_id)
    }

    /// Apply a decoded push frame. Returns true when a reading was appended.
    pub fn apply_push(&mut self, message: PushMessage) -> bool {
        match (message, self.selection.as_mut()) {
            (PushMessage::OracleUpdate(entry), Some(selection)) => {
                selection.live_feed.push(entry);
                true
            }
            _ => false,
        }
    }

    /// Latest PR reading: newest live entry, else newest history entry.
    #[must_use]
    pub fn latest_entry(&self) -> Option<&AuditEntry> {
        self.selection
            .as_ref()
            .and_then(|sel| sel.live_feed.last())
            .or_else(|| self.history.last())
    }
}
