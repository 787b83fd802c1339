//! Upgrades domain: run-scoped telemetry for the post-run summary.

use bevy::prelude::*;
use serde::Serialize;

use super::ids::{SynergyId, UpgradeId};
use super::state::UpgradeSummaryEntry;

/// A single committed stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackChange {
    pub upgrade_id: UpgradeId,
    pub new_stacks: u32,
}

/// Everything the upgrade engine reported during the current run.
#[derive(Resource, Debug, Clone, Default)]
pub struct RunUpgradeLog {
    /// Stack changes in the order they were committed
    pub history: Vec<StackChange>,
    /// Synergies in unlock order
    pub unlocked_synergies: Vec<SynergyId>,
    pub rejected_count: u32,
}

impl RunUpgradeLog {
    /// Reset for a new run
    pub fn reset(&mut self) {
        self.history.clear();
        self.unlocked_synergies.clear();
        self.rejected_count = 0;
    }

    pub fn record_stack_change(&mut self, upgrade_id: UpgradeId, new_stacks: u32) {
        self.history.push(StackChange {
            upgrade_id,
            new_stacks,
        });
    }

    pub fn record_synergy(&mut self, id: SynergyId) {
        if !self.unlocked_synergies.contains(&id) {
            self.unlocked_synergies.push(id);
        }
    }

    /// Final stack count per upgrade, in first-acquisition order
    pub fn summary(&self) -> Vec<UpgradeSummaryEntry> {
        let mut summary: Vec<UpgradeSummaryEntry> = Vec::new();
        for change in &self.history {
            match summary
                .iter_mut()
                .find(|entry| entry.upgrade_id == change.upgrade_id)
            {
                Some(entry) => entry.final_stack_count = change.new_stacks,
                None => summary.push(UpgradeSummaryEntry {
                    upgrade_id: change.upgrade_id,
                    final_stack_count: change.new_stacks,
                }),
            }
        }
        summary
    }

    /// One-line rendering for logs
    pub fn describe(&self) -> String {
        let upgrades: Vec<String> = self
            .summary()
            .iter()
            .map(|entry| format!("{} x{}", entry.upgrade_id, entry.final_stack_count))
            .collect();
        let synergies: Vec<&str> = self.unlocked_synergies.iter().map(|id| id.as_str()).collect();
        format!(
            "upgrades [{}], synergies [{}], {} rejected",
            upgrades.join(", "),
            synergies.join(", "),
            self.rejected_count
        )
    }
}
