//! Upgrades domain: live effect records read every tick by combat systems.
//!
//! Each record holds only the current magnitude derived from its upgrade's
//! stack count. Records are rebuilt from scratch with `for_stacks` whenever
//! the upgrade gains a stack; nothing patches them incrementally. `Default`
//! is the zero-stack state.

use crate::content::UpgradeDef;

/// Multiplicative factors from activated synergies, applied on every rebuild
/// of the record they target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynergyModifiers {
    pub chain_arc_cooldown: f32,
    pub explosive_radius: f32,
    pub shield_duration: f32,
    pub momentum_max_bonus: f32,
    pub singularity_pull_radius: f32,
}

impl Default for SynergyModifiers {
    fn default() -> Self {
        Self {
            chain_arc_cooldown: 1.0,
            explosive_radius: 1.0,
            shield_duration: 1.0,
            momentum_max_bonus: 1.0,
            singularity_pull_radius: 1.0,
        }
    }
}

fn stacks_above_first(stacks: u32) -> f32 {
    stacks.saturating_sub(1) as f32
}

/// Capacitor: hold-to-charge shots
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChargeConfig {
    pub active: bool,
    pub charge_time_ms: f32,
    pub charged_damage_multiplier: f32,
}

impl ChargeConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        let extra = stacks_above_first(stacks);
        Self {
            active: stacks > 0,
            charge_time_ms: (def.tuning("base_charge_ms", 900.0)
                - extra * def.tuning("charge_ms_per_stack", 150.0))
            .max(def.tuning("min_charge_ms", 500.0)),
            charged_damage_multiplier: def.tuning("base_damage", 2.0)
                + extra * def.tuning("damage_per_stack", 0.5),
        }
    }
}

/// Shield: recharging barrier. Also copied onto each pilot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShieldConfig {
    pub active: bool,
    pub duration_secs: f32,
    pub cooldown_secs: f32,
}

impl ShieldConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef, duration_factor: f32) -> Self {
        let extra = stacks_above_first(stacks);
        Self {
            active: stacks > 0,
            duration_secs: (def.tuning("base_duration", 2.0)
                + extra * def.tuning("duration_per_stack", 0.3))
                * duration_factor,
            cooldown_secs: (def.tuning("base_cooldown", 10.0)
                - extra * def.tuning("cooldown_per_stack", 1.0))
            .max(def.tuning("min_cooldown", 6.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExplosiveConfig {
    pub active: bool,
    pub radius: f32,
    pub splash_fraction: f32,
}

impl ExplosiveConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef, radius_factor: f32) -> Self {
        let extra = stacks_above_first(stacks);
        Self {
            active: stacks > 0,
            radius: (def.tuning("base_radius", 40.0) + extra * def.tuning("radius_per_stack", 12.0))
                * radius_factor,
            splash_fraction: def.tuning("base_splash", 0.5)
                + extra * def.tuning("splash_per_stack", 0.15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitConfig {
    pub active: bool,
    pub fragments: u32,
    pub fragment_damage: f32,
}

impl SplitConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        Self {
            active: stacks > 0,
            fragments: 1 + stacks,
            fragment_damage: def.tuning("fragment_damage", 0.4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpreadConfig {
    pub extra_projectiles: u32,
    pub arc_degrees: f32,
}

impl SpreadConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            extra_projectiles: stacks * def.tuning("projectiles_per_stack", 2.0) as u32,
            arc_degrees: def.tuning("base_arc", 15.0)
                + stacks_above_first(stacks) * def.tuning("arc_per_stack", 5.0),
        }
    }
}

/// Chain arc: lightning jumps between nearby enemies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChainArcConfig {
    pub active: bool,
    pub cooldown_ms: f32,
    pub jumps: u32,
    pub range: f32,
}

impl ChainArcConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef, cooldown_factor: f32) -> Self {
        let extra = stacks_above_first(stacks);
        Self {
            active: stacks > 0,
            cooldown_ms: (def.tuning("base_cooldown_ms", 150.0)
                - extra * def.tuning("cooldown_per_stack_ms", 20.0))
            .max(def.tuning("min_cooldown_ms", 120.0))
                * cooldown_factor,
            jumps: def.tuning("base_jumps", 2.0) as u32 + stacks.saturating_sub(1),
            range: def.tuning("base_range", 120.0) + extra * def.tuning("range_per_stack", 20.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HomingConfig {
    pub active: bool,
    /// Radians per tick
    pub turn_rate: f32,
    pub acquire_range: f32,
}

impl HomingConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        let turn_rate = match stacks {
            0 => 0.0,
            1 => def.tuning("turn_rate_1", 0.05),
            2 => def.tuning("turn_rate_2", 0.08),
            _ => def.tuning("turn_rate_3", 0.12),
        };
        Self {
            active: stacks > 0,
            turn_rate,
            acquire_range: def.tuning("base_range", 200.0)
                + stacks_above_first(stacks) * def.tuning("range_per_stack", 50.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticConfig {
    pub active: bool,
    pub damage_per_speed: f32,
    pub projectile_speed_multiplier: f32,
}

impl Default for KineticConfig {
    fn default() -> Self {
        Self {
            active: false,
            damage_per_speed: 0.0,
            projectile_speed_multiplier: 1.0,
        }
    }
}

impl KineticConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        Self {
            active: stacks > 0,
            damage_per_speed: def.tuning("damage_per_speed", 0.04) * stacks as f32,
            projectile_speed_multiplier: def.tuning("speed_per_stack", 1.1).powi(stacks as i32),
        }
    }
}

/// Momentum ramp: damage bonus that builds while moving. Also copied onto each pilot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MomentumConfig {
    pub active: bool,
    pub ramp_per_second: f32,
    pub max_bonus: f32,
    pub decay_per_second: f32,
}

impl MomentumConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef, max_bonus_factor: f32) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            active: true,
            ramp_per_second: def.tuning("ramp_per_stack", 0.1) * stacks as f32,
            max_bonus: (def.tuning("base_max_bonus", 0.3)
                + stacks_above_first(stacks) * def.tuning("max_bonus_per_stack", 0.1))
                * max_bonus_factor,
            decay_per_second: def.tuning("decay", 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetConfig {
    pub pickup_radius: f32,
    pub pull_strength: f32,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            pickup_radius: 80.0,
            pull_strength: 1.0,
        }
    }
}

impl MagnetConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        Self {
            pickup_radius: def.tuning("base_radius", 80.0)
                + def.tuning("radius_per_stack", 40.0) * stacks as f32,
            pull_strength: 1.0 + def.tuning("pull_per_stack", 0.25) * stacks as f32,
        }
    }
}

/// Stabilizers: collision-channel defense, kept out of the balance defense aggregate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilizerConfig {
    pub collision_reduction: f32,
    pub knockback_resistance: f32,
}

impl StabilizerConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        let stacks = stacks as f32;
        Self {
            collision_reduction: (def.tuning("reduction_per_stack", 0.2) * stacks)
                .min(def.tuning("max_reduction", 0.6)),
            knockback_resistance: (def.tuning("knockback_per_stack", 0.25) * stacks)
                .min(def.tuning("max_knockback", 0.75)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlatingConfig {
    pub damage_reduction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShrapnelConfig {
    pub active: bool,
    pub fragments: u32,
    pub fragment_damage: f32,
}

impl ShrapnelConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            active: true,
            fragments: def.tuning("base_fragments", 2.0) as u32 + stacks,
            fragment_damage: def.tuning("fragment_damage", 0.3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeutronCoreConfig {
    pub active: bool,
    pub pierce: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SingularityConfig {
    pub active: bool,
    pub pull_radius: f32,
    pub pull_strength: f32,
}

impl SingularityConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef, radius_factor: f32) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            active: true,
            pull_radius: def.tuning("pull_radius", 90.0) * radius_factor,
            pull_strength: def.tuning("pull_strength", 0.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BulletHellConfig {
    pub active: bool,
    pub spread_jitter_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BloodFuelConfig {
    pub lifesteal: f32,
    pub heal_cap_per_second: f32,
}

impl BloodFuelConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            lifesteal: def.tuning("lifesteal_per_stack", 0.02) * stacks as f32,
            heal_cap_per_second: def.tuning("base_heal_cap", 1.0)
                + stacks_above_first(stacks) * def.tuning("heal_cap_per_stack", 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChainReactionConfig {
    pub active: bool,
    pub chance: f32,
    pub radius: f32,
}

impl ChainReactionConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            active: true,
            chance: (def.tuning("base_chance", 0.15)
                + stacks_above_first(stacks) * def.tuning("chance_per_stack", 0.1))
            .min(def.tuning("max_chance", 0.5)),
            radius: def.tuning("radius", 60.0),
        }
    }
}

/// Quantum tunneling: screen-edge wrap plus a chance to phase through bullets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuantumConfig {
    pub active: bool,
    pub wrap_edges: bool,
    pub phase_chance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BerserkConfig {
    pub active: bool,
    /// Health fraction below which the bonus applies
    pub health_threshold: f32,
    pub damage_bonus: f32,
}

impl BerserkConfig {
    pub fn for_stacks(stacks: u32, def: &UpgradeDef) -> Self {
        if stacks == 0 {
            return Self::default();
        }
        Self {
            active: true,
            health_threshold: def.tuning("base_threshold", 0.3)
                + stacks_above_first(stacks) * def.tuning("threshold_per_stack", 0.05),
            damage_bonus: def.tuning("damage_per_stack", 0.25) * stacks as f32,
        }
    }
}

/// Every live effect record for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveEffects {
    pub charge: ChargeConfig,
    pub shield: ShieldConfig,
    pub explosive: ExplosiveConfig,
    pub split: SplitConfig,
    pub spread: SpreadConfig,
    pub chain_arc: ChainArcConfig,
    pub homing: HomingConfig,
    pub kinetic: KineticConfig,
    pub momentum: MomentumConfig,
    pub magnet: MagnetConfig,
    pub stabilizer: StabilizerConfig,
    pub plating: PlatingConfig,
    pub shrapnel: ShrapnelConfig,
    pub neutron_core: NeutronCoreConfig,
    pub singularity: SingularityConfig,
    pub bullet_hell: BulletHellConfig,
    pub blood_fuel: BloodFuelConfig,
    pub chain_reaction: ChainReactionConfig,
    pub quantum: QuantumConfig,
    pub berserk: BerserkConfig,
}
