//! ContentRegistry resource providing HashMap lookups for all loaded content.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::*;
use crate::upgrades::{SynergyId, UpgradeId};

/// Central registry for the upgrade catalog, synergy catalog and balance tables.
/// Provides O(1) lookup by id for any content type.
#[derive(Resource, Debug, Clone)]
pub struct ContentRegistry {
    pub upgrades: HashMap<String, UpgradeDef>,
    pub synergies: HashMap<String, SynergyDef>,
    pub balance: BalanceConfig,
}

impl ContentRegistry {
    pub fn new(balance: BalanceConfig) -> Self {
        Self {
            upgrades: HashMap::new(),
            synergies: HashMap::new(),
            balance,
        }
    }

    pub fn upgrade(&self, id: UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.get(id.as_str())
    }

    pub fn synergy(&self, id: SynergyId) -> Option<&SynergyDef> {
        self.synergies.get(id.as_str())
    }

    /// Upgrade definitions in catalog order, skipping ids missing from the data.
    pub fn upgrades_in_order(&self) -> impl Iterator<Item = (UpgradeId, &UpgradeDef)> {
        UpgradeId::ALL
            .iter()
            .filter_map(|id| self.upgrade(*id).map(|def| (*id, def)))
    }

    /// Returns a summary of loaded content counts for logging.
    pub fn summary(&self) -> String {
        format!(
            "ContentRegistry loaded:\n\
             - Upgrades: {}\n\
             - Synergies: {}\n\
             - Diminishing Returns: {}\n\
             - Stacking Caps: {}\n\
             - Synergy Adjustments: {}\n\
             - Legendary Adjustments: {}",
            self.upgrades.len(),
            self.synergies.len(),
            self.balance.diminishing_returns.len(),
            self.balance.stacking_caps.len(),
            self.balance.synergy_adjustments.len(),
            self.balance.legendary_adjustments.len(),
        )
    }

    /// Returns total count of all loaded items.
    pub fn total_count(&self) -> usize {
        self.upgrades.len() + self.synergies.len()
    }
}
