//! Core domain: run flow systems.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use rand::Rng;

use crate::core::events::RunStartedEvent;
use crate::core::resources::{CoopPilots, GameplayPaused, PilotState, PlayerStats, RunConfig};

/// Initialize a new run with a fresh seed and default player records
pub(crate) fn initialize_run(
    mut events: MessageReader<RunStartedEvent>,
    mut run_config: ResMut<RunConfig>,
    mut stats: ResMut<PlayerStats>,
    mut pilots: ResMut<CoopPilots>,
    mut paused: ResMut<GameplayPaused>,
) {
    for event in events.read() {
        run_config.seed = event.seed.unwrap_or_else(|| rand::rng().random());
        run_config.offer_index = 0;

        *stats = PlayerStats::default();
        *pilots = CoopPilots {
            primary: PilotState::default(),
            secondary: event.coop.then(PilotState::default),
        };
        paused.sources.clear();

        info!(
            "Starting new run with seed: {}, co-op: {}",
            run_config.seed, event.coop
        );
    }
}
