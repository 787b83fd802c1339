//! Core domain: events for run flow.

use bevy::ecs::message::Message;

/// Event fired when a new run begins; every run-scoped resource resets on it
#[derive(Debug, Default)]
pub struct RunStartedEvent {
    /// Explicit seed for reproducible runs; a random one is rolled otherwise
    pub seed: Option<u64>,
    /// Whether a second pilot joins this run
    pub coop: bool,
}

impl Message for RunStartedEvent {}
