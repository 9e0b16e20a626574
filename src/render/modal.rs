//! Registration modal and the blocking alert box.

#[cfg(test)]
#[path = "modal_test.rs"]
mod modal_test;

use std::fmt::Write;

use crate::state::draft::DraftBond;

/// Draft form with the editable field names the shell's `set` command takes.
#[must_use]
pub fn registration_modal(draft: &DraftBond) -> String {
    let mut out = String::new();
    out.push_str("+-- Initialize Asset ---------------------------------------\n");
    let fields = [
        ("name", draft.name.clone()),
        ("capacity_kw", draft.capacity_kw.to_string()),
        ("threshold", draft.threshold.to_string()),
        ("lat", draft.lat.to_string()),
        ("lon", draft.lon.to_string()),
        ("interest_rate", draft.interest_rate.map(|rate| rate.to_string()).unwrap_or_default()),
        ("contract_address", draft.contract_address.clone()),
    ];
    for (field, value) in fields {
        let _ = writeln!(out, "| {field:<17}{value}");
    }
    out.push_str("|\n| [CANCEL]  [REGISTER_ASSET]\n");
    out.push_str("+-----------------------------------------------------------\n");
    out
}

/// Boxed message that stays on screen until dismissed.
#[must_use]
pub fn alert_box(message: &str) -> String {
    let width = message.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    let rule = "-".repeat(width + 2);
    let mut out = String::new();
    let _ = writeln!(out, "+{rule}+");
    for line in message.lines() {
        let _ = writeln!(out, "| {line:<width$} |");
    }
    let _ = writeln!(out, "+{rule}+");
    out.push_str("  (dismiss to continue)\n");
    out
}
