//! Data definitions for all RON content files.
//!
//! These structs mirror the structure in assets/data/*.ron and are used
//! for deserialization. The ContentRegistry provides lookup by id.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

// ============================================================================
// Upgrades (upgrades.ron)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    /// Offer weight used when a definition carries no explicit drop weight
    pub fn default_drop_weight(&self) -> f32 {
        match self {
            Rarity::Common => 10.0,
            Rarity::Rare => 5.0,
            Rarity::Legendary => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum UpgradeCategory {
    #[default]
    Offense,
    Defense,
    Utility,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub category: UpgradeCategory,
    /// Per-definition stack ceiling; checked alongside the balance stacking cap
    #[serde(default)]
    pub max_stacks: Option<u32>,
    /// Synergy this upgrade participates in, for UI grouping
    #[serde(default)]
    pub synergy_tag: Option<String>,
    /// Free-form tuning numbers read by the effect appliers
    #[serde(default)]
    pub tuning: HashMap<String, f32>,
    #[serde(default)]
    pub drop_weight: Option<f32>,
}

impl UpgradeDef {
    /// Read a tuning value, falling back to the catalog default
    pub fn tuning(&self, key: &str, default: f32) -> f32 {
        self.tuning.get(key).copied().unwrap_or(default)
    }

    pub fn offer_weight(&self) -> f32 {
        self.drop_weight
            .unwrap_or_else(|| self.rarity.default_drop_weight())
    }
}

// ============================================================================
// Synergies (synergies.ron)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynergyDef {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Upgrade ids that must all be owned; order is irrelevant
    pub requires: Vec<String>,
}

// ============================================================================
// Balance (balance.ron) - Single struct, not a list
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, Resource)]
pub struct BalanceConfig {
    pub schema_version: u32,
    pub thresholds: BalanceThresholds,
    pub diminishing_returns: HashMap<String, DiminishingReturns>,
    pub stacking_caps: HashMap<String, u32>,
    pub synergy_adjustments: HashMap<String, SynergyAdjustment>,
    pub legendary_adjustments: HashMap<String, LegendaryAdjustment>,
}

/// Hard ceilings every valid upgrade combination must respect
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BalanceThresholds {
    pub max_damage: f32,
    pub max_dps: f32,
    pub max_defense: f32,
    /// Share of incoming damage that must still land (1 - defense)
    pub min_vulnerability: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DiminishingReturns {
    /// Stacks up to and including this count compound at the full rate
    pub threshold: u32,
    /// Fraction of the per-stack increment earned beyond the threshold
    pub scaling_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SynergyAdjustment {
    pub power_reduction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Default)]
pub struct LegendaryAdjustment {
    #[serde(default)]
    pub damage_multiplier: Option<f32>,
    #[serde(default)]
    pub fire_rate_multiplier: Option<f32>,
    #[serde(default)]
    pub crit_chance_bonus: Option<f32>,
}
