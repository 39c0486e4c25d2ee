//! Damage ledger
//!
//! Cumulative damage dealt per weapon kind for the end-of-run statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::weapon::WeaponKind;

/// A single ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub weapon: WeaponKind,
    pub damage: u64,
}

/// Damage dealt per weapon kind (append-only within a run)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageLedger {
    totals: BTreeMap<WeaponKind, u64>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, weapon: WeaponKind, damage: u32) {
        *self.totals.entry(weapon).or_insert(0) += u64::from(damage);
    }

    pub fn total_for(&self, weapon: WeaponKind) -> u64 {
        self.totals.get(&weapon).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.totals.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Rows sorted by damage, highest first (ties by weapon order)
    pub fn ranked(&self) -> Vec<LedgerEntry> {
        let mut rows: Vec<LedgerEntry> = self
            .totals
            .iter()
            .map(|(&weapon, &damage)| LedgerEntry { weapon, damage })
            .collect();
        rows.sort_by(|a, b| b.damage.cmp(&a.damage).then(a.weapon.cmp(&b.weapon)));
        rows
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}
