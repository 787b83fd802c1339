//! Upgrades domain: per-run upgrade state.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

use super::balance::{StackCounts, stack_count};
use super::effects::{LiveEffects, SynergyModifiers};
use super::ids::{SynergyId, UpgradeId};

/// One line of the post-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeSummaryEntry {
    pub upgrade_id: UpgradeId,
    pub final_stack_count: u32,
}

/// Everything the upgrade engine accumulates during one run.
///
/// Only `UpgradeManager` mutates this. Gameplay systems read the live effect
/// records through the accessors every tick.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RunUpgradeState {
    pub(crate) stacks: StackCounts,
    /// Grows monotonically; nothing removes an entry during a run
    pub(crate) active_synergies: BTreeSet<SynergyId>,
    pub(crate) live: LiveEffects,
    pub(crate) synergy_modifiers: SynergyModifiers,
    /// Set to 1 by Glass Cannon; max health may never exceed it afterwards
    pub(crate) glass_cannon_cap: Option<u32>,
    pub(crate) projectile_scale: f32,
}

impl Default for RunUpgradeState {
    fn default() -> Self {
        Self {
            stacks: StackCounts::new(),
            active_synergies: BTreeSet::new(),
            live: LiveEffects::default(),
            synergy_modifiers: SynergyModifiers::default(),
            glass_cannon_cap: None,
            projectile_scale: 1.0,
        }
    }
}

impl RunUpgradeState {
    /// Back to the zero-stack state. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn stacks(&self) -> &StackCounts {
        &self.stacks
    }

    pub fn stacks_of(&self, id: UpgradeId) -> u32 {
        stack_count(&self.stacks, id)
    }

    pub fn has(&self, id: UpgradeId) -> bool {
        self.stacks_of(id) > 0
    }

    pub fn active_synergies(&self) -> &BTreeSet<SynergyId> {
        &self.active_synergies
    }

    pub fn is_synergy_active(&self, id: SynergyId) -> bool {
        self.active_synergies.contains(&id)
    }

    pub fn live(&self) -> &LiveEffects {
        &self.live
    }

    pub fn synergy_modifiers(&self) -> &SynergyModifiers {
        &self.synergy_modifiers
    }

    pub fn glass_cannon_cap(&self) -> Option<u32> {
        self.glass_cannon_cap
    }

    pub fn projectile_scale(&self) -> f32 {
        self.projectile_scale
    }

    /// The stack map as it would look after one more stack of `id`
    pub fn with_next_stack(&self, id: UpgradeId) -> StackCounts {
        let mut hypothetical = self.stacks.clone();
        *hypothetical.entry(id).or_insert(0) += 1;
        hypothetical
    }

    /// Owned upgrades in catalog order
    pub fn summary(&self) -> Vec<UpgradeSummaryEntry> {
        UpgradeId::ALL
            .iter()
            .filter_map(|&id| {
                let count = self.stacks_of(id);
                (count > 0).then_some(UpgradeSummaryEntry {
                    upgrade_id: id,
                    final_stack_count: count,
                })
            })
            .collect()
    }
}
