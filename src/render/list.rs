//! Registry list view: one card per bond.

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;

use std::fmt::Write;

use crate::net::types::Bond;

pub const EMPTY_REGISTRY: &str = "No active assets detected on node";

#[must_use]
pub fn bond_list(bonds: &[Bond]) -> String {
    if bonds.is_empty() {
        return format!("  {EMPTY_REGISTRY}\n");
    }
    let mut out = String::new();
    for (idx, bond) in bonds.iter().enumerate() {
        out.push_str(&bond_card(idx + 1, bond));
    }
    out
}

/// Card for the bond at 1-based `position`, which the shell accepts as a
/// selection key.
#[must_use]
pub fn bond_card(position: usize, bond: &Bond) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{position}] {:<32} ID: {}", bond.name, bond.short_id());
    let _ = writeln!(out, "    Capacity {}kW   Floor {}%", bond.capacity_kw, bond.threshold);
    if let Some(rate) = bond.interest_rate {
        let _ = writeln!(out, "    Interest {rate}%");
    }
    out.push('\n');
    out
}
