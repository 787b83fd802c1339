//! Upgrades domain: synergy detection and one-time activation.

use bevy::prelude::*;

use super::appliers::{for_each_pilot, rebuild_record};
use super::host::{FeedbackBurst, UpgradeHost};
use super::ids::{SynergyId, UpgradeId};
use super::state::RunUpgradeState;
use crate::content::{BalanceConfig, ContentRegistry, SynergyDef};
use crate::core::StatsPatch;

const FEEDBACK_RADIUS: f32 = 120.0;
const FEEDBACK_ALPHA: f32 = 0.6;

/// Bonus magnitude multiplier: `1 - power_reduction`, or 1 with no adjustment entry
pub fn synergy_scale(balance: &BalanceConfig, id: SynergyId) -> f32 {
    balance
        .synergy_adjustments
        .get(id.as_str())
        .map_or(1.0, |adjustment| 1.0 - adjustment.power_reduction)
}

/// True when every required upgrade has at least one stack
pub fn requirements_met(def: &SynergyDef, state: &RunUpgradeState) -> bool {
    def.requires.iter().all(|required| {
        UpgradeId::from_id(required).is_some_and(|id| state.has(id))
    })
}

/// Activate every synergy whose requirements are now met. Already active
/// synergies are never re-evaluated. Returns the newly activated ids.
pub(crate) fn detect_synergies(
    registry: &ContentRegistry,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) -> Vec<SynergyId> {
    let mut unlocked = Vec::new();
    for &id in SynergyId::ALL {
        if state.is_synergy_active(id) {
            continue;
        }
        let Some(def) = registry.synergy(id) else {
            continue;
        };
        if !requirements_met(def, state) {
            continue;
        }

        state.active_synergies.insert(id);
        let scale = synergy_scale(&registry.balance, id);
        activate(id, scale, registry, state, host);

        info!("Synergy unlocked: {} (scale {:.2})", def.name, scale);
        host.synergy_unlocked(id);
        let position = host.player_position();
        host.spawn_feedback_burst(FeedbackBurst {
            position,
            radius: FEEDBACK_RADIUS,
            color: burst_color(id),
            alpha: FEEDBACK_ALPHA,
        });
        unlocked.push(id);
    }
    unlocked
}

fn activate(
    id: SynergyId,
    k: f32,
    registry: &ContentRegistry,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) {
    match id {
        SynergyId::Overcharge => {
            state.synergy_modifiers.chain_arc_cooldown *= 1.0 - 0.25 * k;
            refresh_record(UpgradeId::ChainArc, registry, state, host);
        }
        SynergyId::Deadeye => add_crit(host, 0.15 * k, 0.25 * k),
        SynergyId::ClusterBomb => {
            state.synergy_modifiers.explosive_radius *= 1.0 + 0.3 * k;
            refresh_record(UpgradeId::Explosive, registry, state, host);
        }
        SynergyId::Fortress => {
            state.synergy_modifiers.shield_duration *= 1.0 + 0.5 * k;
            refresh_record(UpgradeId::Shield, registry, state, host);
        }
        SynergyId::PerpetualMotion => {
            state.synergy_modifiers.momentum_max_bonus *= 1.0 + 0.2 * k;
            refresh_record(UpgradeId::Momentum, registry, state, host);
        }
        SynergyId::BloodFrenzy => {
            let factor = 1.0 - 0.2 * k;
            for_each_pilot(host, |pilot| pilot.ability_cooldown_ms *= factor);
        }
        SynergyId::EventHorizon => {
            state.synergy_modifiers.singularity_pull_radius *= 1.0 + 0.5 * k;
            refresh_record(UpgradeId::SingularityRounds, registry, state, host);
        }
        SynergyId::CriticalMass => add_crit(host, 0.1 * k, 0.5 * k),
    }
}

fn refresh_record(
    id: UpgradeId,
    registry: &ContentRegistry,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) {
    if let Some(def) = registry.upgrade(id) {
        let stacks = state.stacks_of(id);
        rebuild_record(id, stacks, def, state, host);
    }
}

fn add_crit(host: &mut dyn UpgradeHost, chance: f32, multiplier: f32) {
    let stats = host.player_stats();
    host.set_player_stats(StatsPatch {
        crit_chance: Some(stats.crit_chance + chance),
        crit_multiplier: Some(stats.crit_multiplier + multiplier),
        ..Default::default()
    });
}

fn burst_color(id: SynergyId) -> Color {
    match id {
        SynergyId::Overcharge => Color::srgb(0.4, 0.8, 1.0),
        SynergyId::Deadeye => Color::srgb(1.0, 0.3, 0.3),
        SynergyId::ClusterBomb => Color::srgb(1.0, 0.6, 0.1),
        SynergyId::Fortress => Color::srgb(0.5, 0.7, 1.0),
        SynergyId::PerpetualMotion => Color::srgb(0.3, 1.0, 0.5),
        SynergyId::BloodFrenzy => Color::srgb(0.7, 0.0, 0.1),
        SynergyId::EventHorizon => Color::srgb(0.5, 0.2, 0.9),
        SynergyId::CriticalMass => Color::srgb(1.0, 0.9, 0.2),
    }
}
