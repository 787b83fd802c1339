//! Upgrades domain: the seam between the upgrade engine and the game loop.

use bevy::prelude::*;
use serde::Serialize;
use std::fmt;

use super::balance::CombinationReport;
use super::effects::{MomentumConfig, ShieldConfig};
use super::ids::{SynergyId, UpgradeId};
use crate::core::{PilotState, PlayerStats, StatsPatch};

/// Cosmetic burst shown when a synergy unlocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackBurst {
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    pub alpha: f32,
}

/// Capabilities the upgrade engine needs from whatever owns the run.
///
/// Every call is synchronous. The Bevy adapter buffers the notification
/// methods and flushes them as messages once `apply` returns.
pub trait UpgradeHost {
    fn player_stats(&self) -> PlayerStats;

    fn set_player_stats(&mut self, patch: StatsPatch);

    fn primary_pilot(&mut self) -> Option<&mut PilotState>;

    /// Only present in co-op
    fn secondary_pilot(&mut self) -> Option<&mut PilotState>;

    /// Re-clamp current health after a max health change
    fn enforce_health_cap(&mut self);

    fn set_paused(&mut self, paused: bool);

    fn clear_pending_choice(&mut self);

    /// Where feedback bursts are centred
    fn player_position(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn spawn_feedback_burst(&mut self, burst: FeedbackBurst);

    fn default_shield_config(&self) -> ShieldConfig {
        ShieldConfig::default()
    }

    fn default_momentum_config(&self) -> MomentumConfig {
        MomentumConfig::default()
    }

    /// Telemetry: `id` now has `stacks` stacks
    fn record_stack_change(&mut self, id: UpgradeId, stacks: u32);

    /// Progression: `id` unlocked for the first time this run
    fn synergy_unlocked(&mut self, id: SynergyId);

    fn report_rejection(&mut self, _rejection: &UpgradeRejection) {}
}

/// Why `apply` refused an upgrade. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeRejection {
    UnknownUpgrade {
        id: String,
    },
    StackCapReached {
        upgrade: UpgradeId,
        current: u32,
        cap: u32,
    },
    DefinitionMaxReached {
        upgrade: UpgradeId,
        current: u32,
        max_stacks: u32,
    },
    BalanceViolation {
        upgrade: UpgradeId,
        report: CombinationReport,
    },
}

impl UpgradeRejection {
    /// Catalog id of the refused upgrade
    pub fn upgrade_id(&self) -> &str {
        match self {
            UpgradeRejection::UnknownUpgrade { id } => id,
            UpgradeRejection::StackCapReached { upgrade, .. }
            | UpgradeRejection::DefinitionMaxReached { upgrade, .. }
            | UpgradeRejection::BalanceViolation { upgrade, .. } => upgrade.as_str(),
        }
    }
}

impl fmt::Display for UpgradeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeRejection::UnknownUpgrade { id } => {
                write!(f, "upgrade '{}' is not in the catalog", id)
            }
            UpgradeRejection::StackCapReached {
                upgrade,
                current,
                cap,
            } => write!(
                f,
                "{} is at its stacking cap ({}/{})",
                upgrade, current, cap
            ),
            UpgradeRejection::DefinitionMaxReached {
                upgrade,
                current,
                max_stacks,
            } => write!(
                f,
                "{} is at its max stacks ({}/{})",
                upgrade, current, max_stacks
            ),
            UpgradeRejection::BalanceViolation { upgrade, report } => {
                write!(f, "{} would break balance:", upgrade)?;
                for reason in &report.reasons {
                    write!(f, " {};", reason)?;
                }
                Ok(())
            }
        }
    }
}
