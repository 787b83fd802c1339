//! Upgrades domain: Bevy systems wrapping the upgrade manager.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use super::choices::{PendingUpgradeChoices, UPGRADE_CHOICE_PAUSE, choice_rng, roll_upgrade_choices};
use super::events::*;
use super::host::{FeedbackBurst, UpgradeHost, UpgradeRejection};
use super::ids::{SynergyId, UpgradeId};
use super::manager::UpgradeManager;
use super::state::RunUpgradeState;
use super::telemetry::RunUpgradeLog;
use crate::content::ContentRegistry;
use crate::core::{
    CoopPilots, GameplayPaused, PilotState, PlayerStats, RunConfig, RunStartedEvent, StatsPatch,
};

// ============================================================================
// Host adapter
// ============================================================================

/// Notifications raised during one `apply`, flushed as messages afterwards.
#[derive(Debug, Default)]
pub(crate) struct HostOutbox {
    pub stack_changes: Vec<UpgradeStackChangedEvent>,
    pub synergies: Vec<SynergyUnlockedEvent>,
    pub bursts: Vec<FeedbackBurstEvent>,
    pub rejections: Vec<UpgradeRejectedEvent>,
}

/// `UpgradeHost` over the world's resources
pub(crate) struct WorldHost<'a> {
    stats: &'a mut PlayerStats,
    pilots: &'a mut CoopPilots,
    paused: &'a mut GameplayPaused,
    pending: &'a mut PendingUpgradeChoices,
    pub outbox: HostOutbox,
}

impl<'a> WorldHost<'a> {
    pub fn new(
        stats: &'a mut PlayerStats,
        pilots: &'a mut CoopPilots,
        paused: &'a mut GameplayPaused,
        pending: &'a mut PendingUpgradeChoices,
    ) -> Self {
        Self {
            stats,
            pilots,
            paused,
            pending,
            outbox: HostOutbox::default(),
        }
    }
}

impl UpgradeHost for WorldHost<'_> {
    fn player_stats(&self) -> PlayerStats {
        self.stats.clone()
    }

    fn set_player_stats(&mut self, patch: StatsPatch) {
        patch.apply_to(self.stats);
    }

    fn primary_pilot(&mut self) -> Option<&mut PilotState> {
        Some(&mut self.pilots.primary)
    }

    fn secondary_pilot(&mut self) -> Option<&mut PilotState> {
        self.pilots.secondary.as_mut()
    }

    fn enforce_health_cap(&mut self) {
        self.stats.enforce_health_cap();
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.paused.pause(UPGRADE_CHOICE_PAUSE);
        } else {
            self.paused.unpause(UPGRADE_CHOICE_PAUSE);
        }
    }

    fn clear_pending_choice(&mut self) {
        self.pending.clear();
    }

    fn spawn_feedback_burst(&mut self, burst: FeedbackBurst) {
        self.outbox.bursts.push(FeedbackBurstEvent { burst });
    }

    fn record_stack_change(&mut self, id: UpgradeId, stacks: u32) {
        self.outbox.stack_changes.push(UpgradeStackChangedEvent {
            upgrade_id: id,
            new_stacks: stacks,
        });
    }

    fn synergy_unlocked(&mut self, id: SynergyId) {
        self.outbox.synergies.push(SynergyUnlockedEvent { synergy_id: id });
    }

    fn report_rejection(&mut self, rejection: &UpgradeRejection) {
        self.outbox.rejections.push(UpgradeRejectedEvent {
            rejection: rejection.clone(),
        });
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Clear run upgrade state when a run starts. Runs after core's run init.
pub(crate) fn reset_upgrades_on_run_start(
    mut events: MessageReader<RunStartedEvent>,
    registry: Res<ContentRegistry>,
    mut state: ResMut<RunUpgradeState>,
    mut log: ResMut<RunUpgradeLog>,
    mut stats: ResMut<PlayerStats>,
    mut pilots: ResMut<CoopPilots>,
    mut paused: ResMut<GameplayPaused>,
    mut pending: ResMut<PendingUpgradeChoices>,
) {
    for _event in events.read() {
        let mut host = WorldHost::new(&mut stats, &mut pilots, &mut paused, &mut pending);
        UpgradeManager::new(&registry).reset(&mut state, &mut host);
        log.reset();
        info!("Upgrade state reset for new run");
    }
}

/// Roll an offer, hold it in `PendingUpgradeChoices` and pause until the player picks
pub(crate) fn offer_upgrade_choices(
    mut events: MessageReader<OfferUpgradeChoicesEvent>,
    registry: Res<ContentRegistry>,
    state: Res<RunUpgradeState>,
    mut run_config: ResMut<RunConfig>,
    mut pending: ResMut<PendingUpgradeChoices>,
    mut paused: ResMut<GameplayPaused>,
    mut offered: MessageWriter<UpgradeChoicesOfferedEvent>,
) {
    for event in events.read() {
        let mut rng = choice_rng(run_config.seed, run_config.offer_index);
        run_config.offer_index += 1;

        let choices = roll_upgrade_choices(&registry, &state, &mut rng, event.count);
        if choices.is_empty() {
            info!("No upgrades left to offer");
            continue;
        }

        let names: Vec<&str> = choices.iter().map(|id| id.as_str()).collect();
        info!(
            "Offering upgrades (offer {}): {}",
            run_config.offer_index,
            names.join(", ")
        );

        pending.choices = choices.clone();
        paused.pause(UPGRADE_CHOICE_PAUSE);
        offered.write(UpgradeChoicesOfferedEvent { choices });
    }
}

/// Feed chosen upgrades through the manager and publish what happened
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_chosen_upgrades(
    mut events: MessageReader<UpgradeChosenEvent>,
    registry: Res<ContentRegistry>,
    mut state: ResMut<RunUpgradeState>,
    mut stats: ResMut<PlayerStats>,
    mut pilots: ResMut<CoopPilots>,
    mut paused: ResMut<GameplayPaused>,
    mut pending: ResMut<PendingUpgradeChoices>,
    mut stack_changed: MessageWriter<UpgradeStackChangedEvent>,
    mut synergy_unlocked: MessageWriter<SynergyUnlockedEvent>,
    mut bursts: MessageWriter<FeedbackBurstEvent>,
    mut rejected: MessageWriter<UpgradeRejectedEvent>,
) {
    let manager = UpgradeManager::new(&registry);
    for event in events.read() {
        let mut host = WorldHost::new(&mut stats, &mut pilots, &mut paused, &mut pending);
        manager.apply(&mut state, &event.upgrade_id, &mut host);

        let outbox = host.outbox;
        stack_changed.write_batch(outbox.stack_changes);
        synergy_unlocked.write_batch(outbox.synergies);
        bursts.write_batch(outbox.bursts);
        rejected.write_batch(outbox.rejections);
    }
}

pub(crate) fn record_upgrade_telemetry(
    mut stack_changes: MessageReader<UpgradeStackChangedEvent>,
    mut synergies: MessageReader<SynergyUnlockedEvent>,
    mut rejections: MessageReader<UpgradeRejectedEvent>,
    mut log: ResMut<RunUpgradeLog>,
) {
    for event in stack_changes.read() {
        log.record_stack_change(event.upgrade_id, event.new_stacks);
    }
    for event in synergies.read() {
        log.record_synergy(event.synergy_id);
    }
    for _event in rejections.read() {
        log.rejected_count += 1;
    }
}
