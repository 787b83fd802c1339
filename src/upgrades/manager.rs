//! Upgrades domain: the upgrade manager, sole writer of `RunUpgradeState`.

use bevy::prelude::*;

use super::appliers::{apply_effect, for_each_pilot};
use super::balance::BalanceCalculator;
use super::host::{UpgradeHost, UpgradeRejection};
use super::ids::UpgradeId;
use super::state::RunUpgradeState;
use super::synergy::detect_synergies;
use crate::content::{ContentRegistry, UpgradeDef};

/// Gates and commits upgrade stacks against the loaded catalog and balance tables.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeManager<'a> {
    registry: &'a ContentRegistry,
}

impl<'a> UpgradeManager<'a> {
    pub fn new(registry: &'a ContentRegistry) -> Self {
        Self { registry }
    }

    pub fn calculator(&self) -> BalanceCalculator<'a> {
        BalanceCalculator::new(&self.registry.balance)
    }

    /// Run-start initializer. Safe to call more than once before any `apply`.
    pub fn reset(&self, state: &mut RunUpgradeState, host: &mut dyn UpgradeHost) {
        state.reset();
        host.clear_pending_choice();

        let shield = host.default_shield_config();
        let momentum = host.default_momentum_config();
        for_each_pilot(host, |pilot| {
            pilot.shield = shield;
            pilot.momentum = momentum;
        });
    }

    /// Whether one more stack of `id` would be accepted right now.
    /// Returns the stack count it would reach.
    pub fn check(&self, state: &RunUpgradeState, id: UpgradeId) -> Result<u32, UpgradeRejection> {
        let Some(def) = self.registry.upgrade(id) else {
            return Err(UpgradeRejection::UnknownUpgrade {
                id: id.as_str().to_string(),
            });
        };
        self.check_def(state, id, def)
    }

    fn check_def(
        &self,
        state: &RunUpgradeState,
        id: UpgradeId,
        def: &UpgradeDef,
    ) -> Result<u32, UpgradeRejection> {
        let calc = self.calculator();
        let current = state.stacks_of(id);

        if !calc.can_stack(id, current) {
            return Err(UpgradeRejection::StackCapReached {
                upgrade: id,
                current,
                cap: calc.stacking_cap(id).unwrap_or(current),
            });
        }
        if let Some(max_stacks) = def.max_stacks {
            if current >= max_stacks {
                return Err(UpgradeRejection::DefinitionMaxReached {
                    upgrade: id,
                    current,
                    max_stacks,
                });
            }
        }

        let report = calc.validate_combination(&state.with_next_stack(id));
        if !report.valid {
            return Err(UpgradeRejection::BalanceViolation {
                upgrade: id,
                report,
            });
        }

        Ok(current + 1)
    }

    /// Add one stack of the upgrade named `id`.
    ///
    /// Returns false with nothing mutated when the id is unknown, a cap is
    /// reached, or the resulting combination breaks a balance threshold.
    pub fn apply(&self, state: &mut RunUpgradeState, id: &str, host: &mut dyn UpgradeHost) -> bool {
        let resolved = UpgradeId::from_id(id)
            .and_then(|upgrade| self.registry.upgrade(upgrade).map(|def| (upgrade, def)));
        let Some((upgrade, def)) = resolved else {
            let rejection = UpgradeRejection::UnknownUpgrade { id: id.to_string() };
            error!("Cannot apply upgrade: {}", rejection);
            host.report_rejection(&rejection);
            return false;
        };

        let new_stacks = match self.check_def(state, upgrade, def) {
            Ok(new_stacks) => new_stacks,
            Err(rejection) => {
                let payload = serde_json::to_string(&rejection)
                    .unwrap_or_else(|e| format!("<unserializable: {}>", e));
                warn!("Upgrade rejected: {} {}", rejection, payload);
                host.report_rejection(&rejection);
                return false;
            }
        };

        state.stacks.insert(upgrade, new_stacks);
        host.clear_pending_choice();
        host.set_paused(false);

        apply_effect(upgrade, new_stacks, def, &self.calculator(), state, host);
        detect_synergies(self.registry, state, host);
        host.record_stack_change(upgrade, new_stacks);

        info!("Upgrade applied: {} x{}", def.name, new_stacks);
        true
    }
}
