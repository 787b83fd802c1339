//! Core domain: run configuration, pause sources and the player's stat record.

mod events;
mod resources;
mod systems;

pub use events::RunStartedEvent;
pub use resources::{CoopPilots, GameplayPaused, PilotState, PlayerStats, RunConfig, StatsPatch};

use bevy::prelude::*;

/// Ordering for systems that react to a run starting.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunStartSet;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameplayPaused>()
            .init_resource::<RunConfig>()
            .init_resource::<PlayerStats>()
            .init_resource::<CoopPilots>()
            .add_message::<RunStartedEvent>()
            .add_systems(Update, systems::initialize_run.in_set(RunStartSet));
    }
}
