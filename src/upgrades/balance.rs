//! Upgrades domain: the balance calculator.
//!
//! Pure functions over a stack-count map. Nothing here mutates state, so the
//! manager can call `validate_combination` speculatively before committing.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::content::{BalanceConfig, LegendaryAdjustment};
use crate::upgrades::ids::UpgradeId;

/// Stack count per owned upgrade. Absence means zero stacks.
pub type StackCounts = BTreeMap<UpgradeId, u32>;

// ============================================================================
// Balance Constants
// ============================================================================

/// Per-stack damage multiplier for Power Shot
pub const POWER_SHOT_PER_STACK: f32 = 1.15;

/// Per-stack fire-rate multiplier for Rapid Fire
pub const RAPID_FIRE_PER_STACK: f32 = 1.15;

/// Per-stack damage multiplier for Heavy Barrel
pub const HEAVY_BARREL_PER_STACK: f32 = 1.2;

/// Flat per-stack fire-rate penalty for Heavy Barrel (not diminished)
pub const HEAVY_BARREL_FIRE_RATE_PENALTY: f32 = 0.9;

/// Glass Cannon damage when balance.ron has no override
pub const GLASS_CANNON_DAMAGE: f32 = 2.5;

/// Bullet Hell damage penalty when balance.ron has no override
pub const BULLET_HELL_DAMAGE: f32 = 0.7;

/// Bullet Hell fire-rate boost when balance.ron has no override
pub const BULLET_HELL_FIRE_RATE: f32 = 3.0;

/// Damage reduction granted by each of the first plating stacks
pub const PLATING_REDUCTION_PER_STACK: f32 = 0.08;

/// Plating stacks that earn the full reduction
pub const PLATING_FULL_STACKS: u32 = 3;

/// Multiplier on the per-stack reduction beyond the full stacks
pub const PLATING_FALLOFF: f32 = 0.8;

/// Hard ceiling on plating damage reduction
pub const PLATING_REDUCTION_CAP: f32 = 0.5;

pub fn stack_count(stacks: &StackCounts, id: UpgradeId) -> u32 {
    stacks.get(&id).copied().unwrap_or(0)
}

/// Plating damage reduction at the given stack count, simulated stack by stack.
pub fn plating_reduction(plating_stacks: u32) -> f32 {
    let mut reduction = 0.0;
    for stack in 1..=plating_stacks {
        reduction += if stack <= PLATING_FULL_STACKS {
            PLATING_REDUCTION_PER_STACK
        } else {
            PLATING_REDUCTION_PER_STACK * PLATING_FALLOFF
        };
    }
    reduction.min(PLATING_REDUCTION_CAP)
}

// ============================================================================
// Reports
// ============================================================================

/// Aggregate power of a stack combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceMetrics {
    pub max_damage: f32,
    pub max_fire_rate: f32,
    pub max_dps: f32,
    pub max_defense: f32,
}

/// A single broken balance rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BalanceViolation {
    DamageExceeded { value: f32, limit: f32 },
    DpsExceeded { value: f32, limit: f32 },
    DefenseExceeded { value: f32, limit: f32 },
    InsufficientVulnerability { vulnerability: f32, required: f32 },
}

impl fmt::Display for BalanceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceViolation::DamageExceeded { value, limit } => {
                write!(f, "damage multiplier {:.2} exceeds {:.2}", value, limit)
            }
            BalanceViolation::DpsExceeded { value, limit } => {
                write!(f, "DPS multiplier {:.2} exceeds {:.2}", value, limit)
            }
            BalanceViolation::DefenseExceeded { value, limit } => {
                write!(f, "damage reduction {:.2} exceeds {:.2}", value, limit)
            }
            BalanceViolation::InsufficientVulnerability {
                vulnerability,
                required,
            } => write!(
                f,
                "only {:.2} of incoming damage lands, at least {:.2} required",
                vulnerability, required
            ),
        }
    }
}

/// Outcome of `validate_combination`. Metrics are filled in even when invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationReport {
    pub valid: bool,
    pub reasons: Vec<BalanceViolation>,
    pub metrics: BalanceMetrics,
}

// ============================================================================
// Calculator
// ============================================================================

/// Read-only view over the balance tables.
#[derive(Debug, Clone, Copy)]
pub struct BalanceCalculator<'a> {
    config: &'a BalanceConfig,
}

impl<'a> BalanceCalculator<'a> {
    pub fn new(config: &'a BalanceConfig) -> Self {
        Self { config }
    }

    /// Geometric compounding up to the diminishing-returns threshold, then a
    /// reduced per-stack increment beyond it. Continuous at the threshold.
    pub fn diminished_multiplier(&self, id: UpgradeId, stacks: u32, base_per_stack: f32) -> f32 {
        let Some(rule) = self.config.diminishing_returns.get(id.as_str()) else {
            return base_per_stack.powi(stacks as i32);
        };
        if stacks <= rule.threshold {
            return base_per_stack.powi(stacks as i32);
        }

        let normal_power = base_per_stack.powi(rule.threshold as i32);
        let scaled_increment = (base_per_stack - 1.0) * rule.scaling_factor;
        let extra = stacks - rule.threshold;
        normal_power * (1.0 + scaled_increment).powi(extra as i32)
    }

    /// Balance-layer stacking cap; `None` means unbounded at this layer
    pub fn stacking_cap(&self, id: UpgradeId) -> Option<u32> {
        self.config.stacking_caps.get(id.as_str()).copied()
    }

    pub fn can_stack(&self, id: UpgradeId, current_stacks: u32) -> bool {
        self.stacking_cap(id)
            .is_none_or(|cap| current_stacks < cap)
    }

    pub fn legendary(&self, id: UpgradeId) -> LegendaryAdjustment {
        self.config
            .legendary_adjustments
            .get(id.as_str())
            .copied()
            .unwrap_or_default()
    }

    pub fn max_damage_multiplier(&self, stacks: &StackCounts) -> f32 {
        let mut multiplier = 1.0;

        let power_shot = stack_count(stacks, UpgradeId::PowerShot);
        if power_shot > 0 {
            multiplier *=
                self.diminished_multiplier(UpgradeId::PowerShot, power_shot, POWER_SHOT_PER_STACK);
        }
        let heavy_barrel = stack_count(stacks, UpgradeId::HeavyBarrel);
        if heavy_barrel > 0 {
            multiplier *= self.diminished_multiplier(
                UpgradeId::HeavyBarrel,
                heavy_barrel,
                HEAVY_BARREL_PER_STACK,
            );
        }
        if stack_count(stacks, UpgradeId::GlassCannon) > 0 {
            multiplier *= self
                .legendary(UpgradeId::GlassCannon)
                .damage_multiplier
                .unwrap_or(GLASS_CANNON_DAMAGE);
        }
        if stack_count(stacks, UpgradeId::BulletHell) > 0 {
            multiplier *= self
                .legendary(UpgradeId::BulletHell)
                .damage_multiplier
                .unwrap_or(BULLET_HELL_DAMAGE);
        }

        multiplier
    }

    pub fn max_fire_rate_multiplier(&self, stacks: &StackCounts) -> f32 {
        let mut multiplier = 1.0;

        let rapid_fire = stack_count(stacks, UpgradeId::RapidFire);
        if rapid_fire > 0 {
            multiplier *=
                self.diminished_multiplier(UpgradeId::RapidFire, rapid_fire, RAPID_FIRE_PER_STACK);
        }
        let heavy_barrel = stack_count(stacks, UpgradeId::HeavyBarrel);
        multiplier *= HEAVY_BARREL_FIRE_RATE_PENALTY.powi(heavy_barrel as i32);
        if stack_count(stacks, UpgradeId::BulletHell) > 0 {
            multiplier *= self
                .legendary(UpgradeId::BulletHell)
                .fire_rate_multiplier
                .unwrap_or(BULLET_HELL_FIRE_RATE);
        }

        multiplier
    }

    pub fn max_dps_multiplier(&self, stacks: &StackCounts) -> f32 {
        self.max_damage_multiplier(stacks) * self.max_fire_rate_multiplier(stacks)
    }

    /// Plating only. Stabilizers act on the collision channel and are checked there.
    pub fn max_defense_multiplier(&self, stacks: &StackCounts) -> f32 {
        plating_reduction(stack_count(stacks, UpgradeId::Plating))
    }

    /// Glass Cannon's health cap counts as enough vulnerability on its own.
    /// Otherwise this mirrors the defense ceiling; kept separate in case the
    /// two thresholds are tuned apart.
    fn has_sufficient_vulnerability(&self, stacks: &StackCounts, max_defense: f32) -> bool {
        if stack_count(stacks, UpgradeId::GlassCannon) > 0 {
            return true;
        }
        1.0 - max_defense >= self.config.thresholds.min_vulnerability
    }

    pub fn validate_combination(&self, stacks: &StackCounts) -> CombinationReport {
        let thresholds = &self.config.thresholds;
        let max_damage = self.max_damage_multiplier(stacks);
        let max_fire_rate = self.max_fire_rate_multiplier(stacks);
        let max_dps = max_damage * max_fire_rate;
        let max_defense = self.max_defense_multiplier(stacks);

        let mut reasons = Vec::new();
        if max_damage > thresholds.max_damage {
            reasons.push(BalanceViolation::DamageExceeded {
                value: max_damage,
                limit: thresholds.max_damage,
            });
        }
        if max_dps > thresholds.max_dps {
            reasons.push(BalanceViolation::DpsExceeded {
                value: max_dps,
                limit: thresholds.max_dps,
            });
        }
        if max_defense > thresholds.max_defense {
            reasons.push(BalanceViolation::DefenseExceeded {
                value: max_defense,
                limit: thresholds.max_defense,
            });
        }
        if !self.has_sufficient_vulnerability(stacks, max_defense) {
            reasons.push(BalanceViolation::InsufficientVulnerability {
                vulnerability: 1.0 - max_defense,
                required: thresholds.min_vulnerability,
            });
        }

        CombinationReport {
            valid: reasons.is_empty(),
            reasons,
            metrics: BalanceMetrics {
                max_damage,
                max_fire_rate,
                max_dps,
                max_defense,
            },
        }
    }
}
