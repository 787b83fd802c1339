//! Upgrades domain: stackable power-ups, balance gating and synergy unlocks.

mod appliers;
mod balance;
mod choices;
mod effects;
mod events;
mod host;
mod ids;
mod manager;
mod state;
mod synergy;
mod systems;
mod telemetry;
#[cfg(test)]
mod tests;

pub use balance::{
    BalanceCalculator, BalanceMetrics, BalanceViolation, CombinationReport, StackCounts,
    plating_reduction, stack_count,
};
pub use choices::{
    DEFAULT_CHOICE_COUNT, PendingUpgradeChoices, UPGRADE_CHOICE_PAUSE, choice_rng,
    roll_upgrade_choices,
};
pub use effects::*;
pub use events::{
    FeedbackBurstEvent, OfferUpgradeChoicesEvent, SynergyUnlockedEvent, UpgradeChoicesOfferedEvent,
    UpgradeChosenEvent, UpgradeRejectedEvent, UpgradeStackChangedEvent,
};
pub use host::{FeedbackBurst, UpgradeHost, UpgradeRejection};
pub use ids::{SynergyId, UpgradeId};
pub use manager::UpgradeManager;
pub use state::{RunUpgradeState, UpgradeSummaryEntry};
pub use synergy::{requirements_met, synergy_scale};
pub use telemetry::{RunUpgradeLog, StackChange};

use bevy::prelude::*;

use crate::content::ContentRegistry;
use crate::core::RunStartSet;
use crate::upgrades::systems::{
    apply_chosen_upgrades, offer_upgrade_choices, record_upgrade_telemetry,
    reset_upgrades_on_run_start,
};

/// The upgrade systems, for ordering message producers ahead of them.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpgradeSystems;

pub struct UpgradesPlugin;

impl Plugin for UpgradesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunUpgradeState>()
            .init_resource::<RunUpgradeLog>()
            .init_resource::<PendingUpgradeChoices>()
            .add_message::<UpgradeChosenEvent>()
            .add_message::<UpgradeRejectedEvent>()
            .add_message::<UpgradeStackChangedEvent>()
            .add_message::<SynergyUnlockedEvent>()
            .add_message::<FeedbackBurstEvent>()
            .add_message::<OfferUpgradeChoicesEvent>()
            .add_message::<UpgradeChoicesOfferedEvent>()
            .add_systems(
                Update,
                (
                    reset_upgrades_on_run_start,
                    offer_upgrade_choices,
                    apply_chosen_upgrades,
                    record_upgrade_telemetry,
                )
                    .chain()
                    .in_set(UpgradeSystems)
                    .after(RunStartSet)
                    .run_if(resource_exists::<ContentRegistry>),
            );
    }
}
