//! Upgrades domain: rolling the "choose one of three" upgrade offer.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ids::UpgradeId;
use super::manager::UpgradeManager;
use super::state::RunUpgradeState;
use crate::content::ContentRegistry;

/// Options shown per offer unless the caller asks otherwise
pub const DEFAULT_CHOICE_COUNT: usize = 3;

/// Pause source held while an offer is open
pub const UPGRADE_CHOICE_PAUSE: &str = "upgrade_choice";

/// The offer currently waiting on the player, if any
#[derive(Resource, Debug, Default, Clone)]
pub struct PendingUpgradeChoices {
    pub choices: Vec<UpgradeId>,
}

impl PendingUpgradeChoices {
    pub fn is_open(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn clear(&mut self) {
        self.choices.clear();
    }
}

/// Deterministic RNG for the `offer_index`-th offer of a run
pub fn choice_rng(seed: u64, offer_index: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(offer_index as u64))
}

/// Roll up to `count` distinct upgrades the player could take right now.
///
/// Upgrades at a cap, or whose next stack would break balance, are never
/// offered. The rest are drawn without replacement by drop weight.
pub fn roll_upgrade_choices(
    registry: &ContentRegistry,
    state: &RunUpgradeState,
    rng: &mut ChaCha8Rng,
    count: usize,
) -> Vec<UpgradeId> {
    let manager = UpgradeManager::new(registry);
    let mut available: Vec<(UpgradeId, f32)> = registry
        .upgrades_in_order()
        .filter(|(id, _)| manager.check(state, *id).is_ok())
        .map(|(id, def)| (id, def.offer_weight().max(0.0)))
        .collect();

    let mut choices = Vec::with_capacity(count.min(available.len()));
    while choices.len() < count && !available.is_empty() {
        let total_weight: f32 = available.iter().map(|(_, weight)| weight).sum();
        let index = if total_weight > 0.0 {
            pick_weighted(rng, &available, total_weight)
        } else {
            rng.random_range(0..available.len())
        };
        let (id, _) = available.remove(index);
        choices.push(id);
    }

    choices
}

fn pick_weighted(rng: &mut ChaCha8Rng, available: &[(UpgradeId, f32)], total_weight: f32) -> usize {
    let mut roll: f32 = rng.random_range(0.0..total_weight);
    for (i, (_, weight)) in available.iter().enumerate() {
        roll -= weight;
        if roll <= 0.0 {
            return i;
        }
    }
    // Float drift can leave a sliver past the last bucket
    available.len() - 1
}
