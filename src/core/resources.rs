//! Core domain: shared resources for run configuration and the player's combat record.

use bevy::prelude::*;
use rand::Rng;
use std::collections::HashSet;

use crate::upgrades::{MomentumConfig, ShieldConfig};

/// Resource tracking if gameplay should be paused.
/// Gameplay is paused if any source is active.
#[derive(Resource, Debug, Default)]
pub struct GameplayPaused {
    pub sources: HashSet<String>,
}

impl GameplayPaused {
    pub fn is_paused(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn pause(&mut self, source: impl Into<String>) {
        self.sources.insert(source.into());
    }

    pub fn unpause(&mut self, source: impl Into<String>) {
        self.sources.remove(&source.into());
    }
}

#[derive(Resource, Debug)]
pub struct RunConfig {
    pub seed: u64,
    /// Number of upgrade offers rolled so far this run
    pub offer_index: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: rand::rng().random(),
            offer_index: 0,
        }
    }
}

/// The player's combat stat record. Owned by the game loop; the upgrade
/// engine only reads snapshots and writes patches.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub max_health: f32,
    pub health: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    /// Fraction of incoming damage removed (0.0 - 0.5)
    pub damage_reduction: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            fire_rate: 4.0,
            max_health: 5.0,
            health: 5.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            damage_reduction: 0.0,
        }
    }
}

impl PlayerStats {
    /// Clamp current health to max health
    pub fn enforce_health_cap(&mut self) {
        self.health = self.health.min(self.max_health);
    }
}

/// Partial update to PlayerStats; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsPatch {
    pub damage: Option<f32>,
    pub fire_rate: Option<f32>,
    pub max_health: Option<f32>,
    pub health: Option<f32>,
    pub crit_chance: Option<f32>,
    pub crit_multiplier: Option<f32>,
    pub damage_reduction: Option<f32>,
}

impl StatsPatch {
    pub fn apply_to(&self, stats: &mut PlayerStats) {
        if let Some(v) = self.damage {
            stats.damage = v;
        }
        if let Some(v) = self.fire_rate {
            stats.fire_rate = v;
        }
        if let Some(v) = self.max_health {
            stats.max_health = v;
        }
        if let Some(v) = self.health {
            stats.health = v;
        }
        if let Some(v) = self.crit_chance {
            stats.crit_chance = v;
        }
        if let Some(v) = self.crit_multiplier {
            stats.crit_multiplier = v;
        }
        if let Some(v) = self.damage_reduction {
            stats.damage_reduction = v;
        }
    }
}

/// Per-pilot runtime state in co-op mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotState {
    /// Cooldown of the pilot's special ability
    pub ability_cooldown_ms: f32,
    pub shield: ShieldConfig,
    pub momentum: MomentumConfig,
}

impl Default for PilotState {
    fn default() -> Self {
        Self {
            ability_cooldown_ms: 8000.0,
            shield: ShieldConfig::default(),
            momentum: MomentumConfig::default(),
        }
    }
}

/// Pilots taking part in the current run. The secondary pilot only exists in co-op.
#[derive(Resource, Debug, Clone, Default)]
pub struct CoopPilots {
    pub primary: PilotState,
    pub secondary: Option<PilotState>,
}
