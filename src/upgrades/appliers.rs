//! Upgrades domain: per-upgrade effect appliers.
//!
//! Called once per committed stack with the new stack count. Stat scalers
//! multiply in the incremental factor for that one stack; live records are
//! rebuilt in full.

use super::balance::{
    BULLET_HELL_DAMAGE, BULLET_HELL_FIRE_RATE, BalanceCalculator, GLASS_CANNON_DAMAGE,
    HEAVY_BARREL_FIRE_RATE_PENALTY, HEAVY_BARREL_PER_STACK, POWER_SHOT_PER_STACK,
    RAPID_FIRE_PER_STACK, plating_reduction,
};
use super::effects::*;
use super::host::UpgradeHost;
use super::ids::UpgradeId;
use super::state::RunUpgradeState;
use crate::content::UpgradeDef;
use crate::core::{PilotState, StatsPatch};

/// Ratio between the diminished multiplier at `stacks` and at `stacks - 1`.
fn incremental_factor(calc: &BalanceCalculator, id: UpgradeId, stacks: u32, base: f32) -> f32 {
    let now = calc.diminished_multiplier(id, stacks, base);
    let before = calc.diminished_multiplier(id, stacks.saturating_sub(1), base);
    now / before
}

pub(crate) fn apply_effect(
    id: UpgradeId,
    stacks: u32,
    def: &UpgradeDef,
    calc: &BalanceCalculator,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) {
    match id {
        UpgradeId::PowerShot => {
            let stats = host.player_stats();
            let factor = incremental_factor(calc, id, stacks, POWER_SHOT_PER_STACK);
            host.set_player_stats(StatsPatch {
                damage: Some(stats.damage * factor),
                ..Default::default()
            });
        }
        UpgradeId::RapidFire => {
            let stats = host.player_stats();
            let factor = incremental_factor(calc, id, stacks, RAPID_FIRE_PER_STACK);
            host.set_player_stats(StatsPatch {
                fire_rate: Some(stats.fire_rate * factor),
                ..Default::default()
            });
        }
        UpgradeId::HeavyBarrel => {
            let stats = host.player_stats();
            let factor = incremental_factor(calc, id, stacks, HEAVY_BARREL_PER_STACK);
            host.set_player_stats(StatsPatch {
                damage: Some(stats.damage * factor),
                fire_rate: Some(stats.fire_rate * HEAVY_BARREL_FIRE_RATE_PENALTY),
                ..Default::default()
            });
            state.projectile_scale *= def.tuning("projectile_scale", 1.1);
        }
        UpgradeId::Plating => apply_plating(stacks, def, state, host),
        UpgradeId::NeutronCore => {
            state.live.neutron_core = NeutronCoreConfig {
                active: true,
                pierce: def.tuning("pierce", 3.0) as u32,
            };
            state.projectile_scale *= def.tuning("projectile_scale", 1.25);
            add_legendary_crit(id, calc, host);
        }
        UpgradeId::SingularityRounds => {
            rebuild_record(id, stacks, def, state, host);
            add_legendary_crit(id, calc, host);
        }
        UpgradeId::QuantumTunneling => {
            state.live.quantum = QuantumConfig {
                active: true,
                wrap_edges: true,
                phase_chance: def.tuning("phase_chance", 0.2),
            };
        }
        UpgradeId::GlassCannon => {
            let stats = host.player_stats();
            let damage = calc
                .legendary(id)
                .damage_multiplier
                .unwrap_or(GLASS_CANNON_DAMAGE);
            host.set_player_stats(StatsPatch {
                damage: Some(stats.damage * damage),
                max_health: Some(1.0),
                health: Some(1.0),
                ..Default::default()
            });
            state.glass_cannon_cap = Some(1);
            host.enforce_health_cap();
        }
        UpgradeId::BulletHell => {
            let stats = host.player_stats();
            let adjustment = calc.legendary(id);
            host.set_player_stats(StatsPatch {
                damage: Some(stats.damage * adjustment.damage_multiplier.unwrap_or(BULLET_HELL_DAMAGE)),
                fire_rate: Some(
                    stats.fire_rate
                        * adjustment
                            .fire_rate_multiplier
                            .unwrap_or(BULLET_HELL_FIRE_RATE),
                ),
                ..Default::default()
            });
            state.projectile_scale *= def.tuning("projectile_scale", 0.8);
            state.live.bullet_hell = BulletHellConfig {
                active: true,
                spread_jitter_degrees: def.tuning("spread_jitter", 8.0),
            };
        }
        UpgradeId::SplitShot
        | UpgradeId::Spread
        | UpgradeId::Capacitor
        | UpgradeId::Explosive
        | UpgradeId::ChainArc
        | UpgradeId::Homing
        | UpgradeId::Kinetic
        | UpgradeId::Momentum
        | UpgradeId::Shrapnel
        | UpgradeId::ChainReaction
        | UpgradeId::Berserk
        | UpgradeId::BloodFuel
        | UpgradeId::Shield
        | UpgradeId::Stabilizer
        | UpgradeId::Magnet => rebuild_record(id, stacks, def, state, host),
    }
}

/// Recompute the live record owned by `id` from its stack count and the
/// current synergy modifiers. Upgrades without a stack-derived record are
/// left alone, so this is safe to call again after a synergy changes a
/// modifier.
pub(crate) fn rebuild_record(
    id: UpgradeId,
    stacks: u32,
    def: &UpgradeDef,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) {
    let modifiers = state.synergy_modifiers;
    let live = &mut state.live;
    match id {
        UpgradeId::SplitShot => live.split = SplitConfig::for_stacks(stacks, def),
        UpgradeId::Spread => live.spread = SpreadConfig::for_stacks(stacks, def),
        UpgradeId::Capacitor => live.charge = ChargeConfig::for_stacks(stacks, def),
        UpgradeId::Explosive => {
            live.explosive = ExplosiveConfig::for_stacks(stacks, def, modifiers.explosive_radius)
        }
        UpgradeId::ChainArc => {
            live.chain_arc = ChainArcConfig::for_stacks(stacks, def, modifiers.chain_arc_cooldown)
        }
        UpgradeId::Homing => live.homing = HomingConfig::for_stacks(stacks, def),
        UpgradeId::Kinetic => live.kinetic = KineticConfig::for_stacks(stacks, def),
        UpgradeId::Shrapnel => live.shrapnel = ShrapnelConfig::for_stacks(stacks, def),
        UpgradeId::ChainReaction => {
            live.chain_reaction = ChainReactionConfig::for_stacks(stacks, def)
        }
        UpgradeId::Berserk => live.berserk = BerserkConfig::for_stacks(stacks, def),
        UpgradeId::BloodFuel => live.blood_fuel = BloodFuelConfig::for_stacks(stacks, def),
        UpgradeId::Stabilizer => live.stabilizer = StabilizerConfig::for_stacks(stacks, def),
        UpgradeId::Magnet => live.magnet = MagnetConfig::for_stacks(stacks, def),
        UpgradeId::SingularityRounds => {
            live.singularity =
                SingularityConfig::for_stacks(stacks, def, modifiers.singularity_pull_radius)
        }
        UpgradeId::Shield => {
            let shield = ShieldConfig::for_stacks(stacks, def, modifiers.shield_duration);
            live.shield = shield;
            for_each_pilot(host, |pilot| pilot.shield = shield);
        }
        UpgradeId::Momentum => {
            let momentum = MomentumConfig::for_stacks(stacks, def, modifiers.momentum_max_bonus);
            live.momentum = momentum;
            for_each_pilot(host, |pilot| pilot.momentum = momentum);
        }
        UpgradeId::PowerShot
        | UpgradeId::RapidFire
        | UpgradeId::HeavyBarrel
        | UpgradeId::Plating
        | UpgradeId::NeutronCore
        | UpgradeId::QuantumTunneling
        | UpgradeId::GlassCannon
        | UpgradeId::BulletHell => {}
    }
}

pub(crate) fn for_each_pilot(
    host: &mut dyn UpgradeHost,
    mut update: impl FnMut(&mut PilotState),
) {
    if let Some(pilot) = host.primary_pilot() {
        update(pilot);
    }
    if let Some(pilot) = host.secondary_pilot() {
        update(pilot);
    }
}

fn apply_plating(
    stacks: u32,
    def: &UpgradeDef,
    state: &mut RunUpgradeState,
    host: &mut dyn UpgradeHost,
) {
    let reduction = plating_reduction(stacks);
    state.live.plating = PlatingConfig {
        damage_reduction: reduction,
    };

    let stats = host.player_stats();
    let health_gain = def.tuning("health_per_stack", 1.0);
    let mut max_health = stats.max_health + health_gain;
    if let Some(cap) = state.glass_cannon_cap {
        max_health = max_health.min(cap as f32);
    }
    host.set_player_stats(StatsPatch {
        damage_reduction: Some(reduction),
        max_health: Some(max_health),
        health: Some(stats.health + health_gain),
        ..Default::default()
    });
    host.enforce_health_cap();
}

fn add_legendary_crit(id: UpgradeId, calc: &BalanceCalculator, host: &mut dyn UpgradeHost) {
    let Some(bonus) = calc.legendary(id).crit_chance_bonus else {
        return;
    };
    let stats = host.player_stats();
    host.set_player_stats(StatsPatch {
        crit_chance: Some(stats.crit_chance + bonus),
        ..Default::default()
    });
}
