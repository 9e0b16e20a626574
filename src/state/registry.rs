//! Asset registry for the list view.
//!
//! DESIGN
//! ======
//! The registry is inventory only. Detail data for the selected bond lives in
//! `detail`, so a registry refresh never disturbs an open detail view.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use crate::net::types::Bond;

/// Bonds known to the dashboard, in server order.
#[derive(Clone, Debug, Default)]
pub struct RegistryState {
    pub bonds: Vec<Bond>,
}

impl RegistryState {
    /// Replace the whole registry.
    pub fn replace(&mut self, bonds: Vec<Bond>) {
        self.bonds = bonds;
    }

    pub fn clear(&mut self) {
        self.bonds.clear();
    }

    #[must_use]
    pub fn find(&self, bond_id: &str) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.id == bond_id)
    }

    /// Resolve a 1-based list position or a bond id.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&Bond> {
        if let Some(bond) = self.find(key) {
            return Some(bond);
        }
        key.parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|idx| self.bonds.get(idx))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bonds.len()
    }
}
