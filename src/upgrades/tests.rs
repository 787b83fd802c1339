//! Upgrades domain: unit tests for balance gating, effect appliers and synergies.

use bevy::prelude::*;

use super::*;
use crate::content::{ContentRegistry, UpgradeDef};
use crate::core::{CoopPilots, CorePlugin, PilotState, PlayerStats, RunStartedEvent, StatsPatch};

// ============================================================================
// Helpers
// ============================================================================

fn registry() -> ContentRegistry {
    match ContentRegistry::embedded() {
        Ok(registry) => registry,
        Err(errors) => panic!("embedded content failed to parse: {:?}", errors),
    }
}

fn stacks(pairs: &[(UpgradeId, u32)]) -> StackCounts {
    pairs.iter().copied().collect()
}

fn assert_approx(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

/// Records every host callback so tests can inspect side effects
struct TestHost {
    stats: PlayerStats,
    pilots: CoopPilots,
    paused: bool,
    pending_choice: bool,
    health_cap_checks: u32,
    bursts: Vec<FeedbackBurst>,
    stack_changes: Vec<(UpgradeId, u32)>,
    unlocked: Vec<SynergyId>,
    rejections: Vec<UpgradeRejection>,
}

impl TestHost {
    fn new() -> Self {
        Self {
            stats: PlayerStats::default(),
            pilots: CoopPilots::default(),
            paused: true,
            pending_choice: true,
            health_cap_checks: 0,
            bursts: Vec::new(),
            stack_changes: Vec::new(),
            unlocked: Vec::new(),
            rejections: Vec::new(),
        }
    }

    fn coop() -> Self {
        let mut host = Self::new();
        host.pilots.secondary = Some(PilotState::default());
        host
    }
}

impl UpgradeHost for TestHost {
    fn player_stats(&self) -> PlayerStats {
        self.stats.clone()
    }

    fn set_player_stats(&mut self, patch: StatsPatch) {
        patch.apply_to(&mut self.stats);
    }

    fn primary_pilot(&mut self) -> Option<&mut PilotState> {
        Some(&mut self.pilots.primary)
    }

    fn secondary_pilot(&mut self) -> Option<&mut PilotState> {
        self.pilots.secondary.as_mut()
    }

    fn enforce_health_cap(&mut self) {
        self.health_cap_checks += 1;
        self.stats.enforce_health_cap();
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn clear_pending_choice(&mut self) {
        self.pending_choice = false;
    }

    fn spawn_feedback_burst(&mut self, burst: FeedbackBurst) {
        self.bursts.push(burst);
    }

    fn record_stack_change(&mut self, id: UpgradeId, stacks: u32) {
        self.stack_changes.push((id, stacks));
    }

    fn synergy_unlocked(&mut self, id: SynergyId) {
        self.unlocked.push(id);
    }

    fn report_rejection(&mut self, rejection: &UpgradeRejection) {
        self.rejections.push(rejection.clone());
    }
}

fn apply_n(
    manager: &UpgradeManager,
    state: &mut RunUpgradeState,
    host: &mut TestHost,
    id: &str,
    times: u32,
) {
    for i in 0..times {
        assert!(
            manager.apply(state, id, host),
            "{} stack {} should apply",
            id,
            i + 1
        );
    }
}

fn def<'a>(registry: &'a ContentRegistry, id: UpgradeId) -> &'a UpgradeDef {
    match registry.upgrade(id) {
        Some(def) => def,
        None => panic!("{} missing from embedded catalog", id),
    }
}

// ============================================================================
// Balance calculator
// ============================================================================

#[test]
fn test_empty_combination_is_identity() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);
    let report = calc.validate_combination(&StackCounts::new());

    assert!(report.valid);
    assert!(report.reasons.is_empty());
    assert_eq!(report.metrics.max_damage, 1.0);
    assert_eq!(report.metrics.max_fire_rate, 1.0);
    assert_eq!(report.metrics.max_dps, 1.0);
    assert_eq!(report.metrics.max_defense, 0.0);
}

#[test]
fn test_calculator_is_pure() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);
    let build = stacks(&[
        (UpgradeId::PowerShot, 5),
        (UpgradeId::HeavyBarrel, 3),
        (UpgradeId::RapidFire, 4),
        (UpgradeId::Plating, 4),
    ]);

    let first = calc.validate_combination(&build);
    for _ in 0..10 {
        let again = calc.validate_combination(&build);
        assert_eq!(
            again.metrics.max_damage.to_bits(),
            first.metrics.max_damage.to_bits()
        );
        assert_eq!(
            again.metrics.max_dps.to_bits(),
            first.metrics.max_dps.to_bits()
        );
        assert_eq!(
            calc.max_fire_rate_multiplier(&build).to_bits(),
            first.metrics.max_fire_rate.to_bits()
        );
        assert_eq!(
            calc.max_defense_multiplier(&build).to_bits(),
            first.metrics.max_defense.to_bits()
        );
    }
}

#[test]
fn test_diminished_multiplier_below_geometric_past_threshold() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);

    for s in 4..=12 {
        let diminished = calc.diminished_multiplier(UpgradeId::PowerShot, s, 1.15);
        assert!(diminished < 1.15f32.powi(s as i32), "stack {}", s);
    }
    for s in 3..=8 {
        let diminished = calc.diminished_multiplier(UpgradeId::HeavyBarrel, s, 1.2);
        assert!(diminished < 1.2f32.powi(s as i32), "stack {}", s);
    }
}

#[test]
fn test_diminished_multiplier_continuous_at_threshold() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);

    assert_eq!(
        calc.diminished_multiplier(UpgradeId::PowerShot, 3, 1.15),
        1.15f32.powi(3)
    );
    // One stack past the threshold earns 80% of the normal increment
    assert_approx(
        calc.diminished_multiplier(UpgradeId::PowerShot, 4, 1.15),
        1.15f32.powi(3) * 1.12,
    );
}

#[test]
fn test_unconfigured_upgrade_compounds_geometrically() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);

    assert_eq!(
        calc.diminished_multiplier(UpgradeId::Magnet, 5, 1.1),
        1.1f32.powi(5)
    );
}

#[test]
fn test_power_shot_stacking_cap() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);

    assert!(calc.can_stack(UpgradeId::PowerShot, 5));
    assert!(!calc.can_stack(UpgradeId::PowerShot, 6));
    assert!(!calc.can_stack(UpgradeId::PowerShot, 7));
    // No balance cap: bounded only by the definition
    assert!(calc.can_stack(UpgradeId::Magnet, 100));
}

#[test]
fn test_glass_cannon_legendary_bound() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);
    let report = calc.validate_combination(&stacks(&[(UpgradeId::GlassCannon, 1)]));

    assert!(report.valid);
    assert!(report.metrics.max_damage > 2.0 && report.metrics.max_damage < 3.0);
    assert_approx(report.metrics.max_damage, 2.5);
}

#[test]
fn test_plating_defense_curve() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);

    let six = stacks(&[(UpgradeId::Plating, 6)]);
    assert_approx(calc.max_defense_multiplier(&six), 0.432);
    assert!(calc.validate_combination(&six).valid);

    assert_approx(plating_reduction(3), 0.24);
    // 0.24 + 5 * 0.064 = 0.56, clamped
    assert_eq!(plating_reduction(8), 0.5);
}

#[test]
fn test_strong_build_stays_within_budget() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);
    let report = calc.validate_combination(&stacks(&[
        (UpgradeId::PowerShot, 6),
        (UpgradeId::RapidFire, 6),
        (UpgradeId::GlassCannon, 1),
    ]));

    assert!(report.valid, "{:?}", report.reasons);
    assert!((report.metrics.max_damage - 5.34).abs() < 0.01);
    assert!((report.metrics.max_dps - 11.4).abs() < 0.05);
}

#[test]
fn test_bullet_hell_on_maxed_scalers_breaks_dps_ceiling() {
    let registry = registry();
    let calc = BalanceCalculator::new(&registry.balance);
    let report = calc.validate_combination(&stacks(&[
        (UpgradeId::PowerShot, 6),
        (UpgradeId::RapidFire, 6),
        (UpgradeId::GlassCannon, 1),
        (UpgradeId::BulletHell, 1),
    ]));

    assert!(!report.valid);
    assert!(report.metrics.max_dps > 20.0);
    assert!(matches!(
        report.reasons.as_slice(),
        [BalanceViolation::DpsExceeded { .. }]
    ));
}

#[test]
fn test_vulnerability_check_waived_for_glass_cannon() {
    let mut registry = registry();
    registry.balance.thresholds.min_vulnerability = 0.9;
    let calc = BalanceCalculator::new(&registry.balance);

    let armored = stacks(&[(UpgradeId::Plating, 3)]);
    let report = calc.validate_combination(&armored);
    assert!(!report.valid);
    assert!(matches!(
        report.reasons.as_slice(),
        [BalanceViolation::InsufficientVulnerability { .. }]
    ));

    let glass = stacks(&[(UpgradeId::Plating, 3), (UpgradeId::GlassCannon, 1)]);
    assert!(calc.validate_combination(&glass).valid);
}

#[test]
fn test_rejection_payload_serializes() {
    let rejection = UpgradeRejection::StackCapReached {
        upgrade: UpgradeId::PowerShot,
        current: 6,
        cap: 6,
    };
    let json = serde_json::to_value(&rejection).unwrap();
    assert_eq!(json["kind"], "stack_cap_reached");
    assert_eq!(json["upgrade"], "power-shot");
}

// ============================================================================
// Upgrade manager
// ============================================================================

#[test]
fn test_power_shot_scales_damage_incrementally() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "power-shot", 1);
    assert_approx(host.stats.damage, 11.5);
    assert!(!host.paused);
    assert!(!host.pending_choice);

    apply_n(&manager, &mut state, &mut host, "power-shot", 3);
    let expected = 10.0 * manager.calculator().diminished_multiplier(UpgradeId::PowerShot, 4, 1.15);
    assert_approx(host.stats.damage, expected);
    assert_eq!(state.stacks_of(UpgradeId::PowerShot), 4);
    assert_eq!(
        host.stack_changes,
        vec![
            (UpgradeId::PowerShot, 1),
            (UpgradeId::PowerShot, 2),
            (UpgradeId::PowerShot, 3),
            (UpgradeId::PowerShot, 4),
        ]
    );
}

#[test]
fn test_heavy_barrel_trades_fire_rate_for_damage() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "heavy-barrel", 2);
    assert_approx(host.stats.damage, 14.4);
    assert_approx(host.stats.fire_rate, 4.0 * 0.81);
    assert_approx(state.projectile_scale(), 1.21);
}

#[test]
fn test_unknown_upgrade_is_rejected_without_mutation() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    assert!(!manager.apply(&mut state, "laser-eyes", &mut host));
    assert_eq!(state, RunUpgradeState::default());
    assert_eq!(host.stats, PlayerStats::default());
    assert!(host.paused);
    assert!(matches!(
        host.rejections.as_slice(),
        [UpgradeRejection::UnknownUpgrade { id }] if id == "laser-eyes"
    ));
}

#[test]
fn test_stacking_cap_rejects_seventh_power_shot() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "power-shot", 6);
    let damage = host.stats.damage;

    assert!(!manager.apply(&mut state, "power-shot", &mut host));
    assert_eq!(state.stacks_of(UpgradeId::PowerShot), 6);
    assert_eq!(host.stats.damage, damage);
    assert!(matches!(
        host.rejections.as_slice(),
        [UpgradeRejection::StackCapReached { cap: 6, .. }]
    ));
}

#[test]
fn test_definition_max_stacks_applies_without_balance_cap() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "quantum-tunneling", 1);
    assert!(state.live().quantum.active);

    assert!(!manager.apply(&mut state, "quantum-tunneling", &mut host));
    assert_eq!(state.stacks_of(UpgradeId::QuantumTunneling), 1);
    assert!(matches!(
        host.rejections.as_slice(),
        [UpgradeRejection::DefinitionMaxReached { max_stacks: 1, .. }]
    ));
}

#[test]
fn test_balance_rejection_leaves_state_untouched() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "glass-cannon", 1);
    apply_n(&manager, &mut state, &mut host, "power-shot", 6);
    apply_n(&manager, &mut state, &mut host, "heavy-barrel", 2);

    let before_state = state.clone();
    let before_stats = host.stats.clone();
    host.paused = true;

    // 2.14 * 1.64 * 2.5 is past the 8x damage ceiling
    assert!(!manager.apply(&mut state, "heavy-barrel", &mut host));
    assert_eq!(state, before_state);
    assert_eq!(host.stats, before_stats);
    assert!(host.paused);

    let Some(UpgradeRejection::BalanceViolation { upgrade, report }) = host.rejections.last()
    else {
        panic!("expected a balance rejection, got {:?}", host.rejections);
    };
    assert_eq!(*upgrade, UpgradeId::HeavyBarrel);
    assert!(report.metrics.max_damage > 8.0);
    assert!(
        report
            .reasons
            .iter()
            .any(|r| matches!(r, BalanceViolation::DamageExceeded { .. }))
    );
}

#[test]
fn test_lowered_defense_ceiling_rejects_plating() {
    let mut registry = registry();
    registry.balance.thresholds.max_defense = 0.3;
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "plating", 3);
    assert!(!manager.apply(&mut state, "plating", &mut host));
    assert_eq!(state.stacks_of(UpgradeId::Plating), 3);
    assert_approx(host.stats.damage_reduction, 0.24);
}

#[test]
fn test_plating_adds_health_and_reduction() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "plating", 4);
    assert_approx(host.stats.damage_reduction, 0.304);
    assert_approx(state.live().plating.damage_reduction, 0.304);
    assert_eq!(host.stats.max_health, 9.0);
    assert_eq!(host.stats.health, 9.0);
}

#[test]
fn test_glass_cannon_caps_health_against_plating() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "plating", 2);
    assert_eq!(host.stats.max_health, 7.0);

    apply_n(&manager, &mut state, &mut host, "glass-cannon", 1);
    assert_eq!(state.glass_cannon_cap(), Some(1));
    assert_eq!(host.stats.max_health, 1.0);
    assert_eq!(host.stats.health, 1.0);
    assert_approx(host.stats.damage, 25.0);

    apply_n(&manager, &mut state, &mut host, "plating", 1);
    assert_eq!(host.stats.max_health, 1.0);
    assert_eq!(host.stats.health, 1.0);
    assert_approx(host.stats.damage_reduction, 0.24);
    assert!(host.health_cap_checks >= 2);
}

#[test]
fn test_bullet_hell_overrides() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "bullet-hell", 1);
    assert_approx(host.stats.damage, 7.0);
    assert_approx(host.stats.fire_rate, 12.0);
    assert_approx(state.projectile_scale(), 0.8);
    assert!(state.live().bullet_hell.active);
    assert_eq!(state.live().bullet_hell.spread_jitter_degrees, 8.0);
}

#[test]
fn test_neutron_core_adds_crit_and_pierce() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "neutron-core", 1);
    assert_eq!(state.live().neutron_core.pierce, 3);
    assert_approx(host.stats.crit_chance, 0.1);
    assert_approx(state.projectile_scale(), 1.25);
}

#[test]
fn test_live_records_follow_closed_forms() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "capacitor", 3);
    apply_n(&manager, &mut state, &mut host, "homing", 2);
    apply_n(&manager, &mut state, &mut host, "spread", 2);
    apply_n(&manager, &mut state, &mut host, "stabilizer", 3);
    apply_n(&manager, &mut state, &mut host, "magnet", 2);

    let live = state.live();
    assert_eq!(live.charge.charge_time_ms, 600.0);
    assert_eq!(live.charge.charged_damage_multiplier, 3.0);
    assert_approx(live.homing.turn_rate, 0.08);
    assert_eq!(live.spread.extra_projectiles, 4);
    assert_eq!(live.spread.arc_degrees, 20.0);
    assert_approx(live.stabilizer.collision_reduction, 0.6);
    assert_approx(live.stabilizer.knockback_resistance, 0.75);
    assert_eq!(live.magnet.pickup_radius, 160.0);
    assert_eq!(live.magnet.pull_strength, 1.5);
    // Stabilizers stay out of the plating channel
    assert_eq!(host.stats.damage_reduction, 0.0);
}

#[test]
fn test_shield_copied_onto_every_pilot() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::coop();

    apply_n(&manager, &mut state, &mut host, "shield", 3);

    let shield = state.live().shield;
    assert_approx(shield.duration_secs, 2.6);
    assert_eq!(shield.cooldown_secs, 8.0);
    assert_eq!(host.pilots.primary.shield, shield);
    assert_eq!(host.pilots.secondary.as_ref().map(|p| p.shield), Some(shield));
}

#[test]
fn test_record_rebuild_matches_fresh_computation() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "explosive", 3);
    let fresh = ExplosiveConfig::for_stacks(3, def(&registry, UpgradeId::Explosive), 1.0);
    assert_eq!(state.live().explosive, fresh);
}

#[test]
fn test_reset_restores_zero_stack_state() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::coop();

    apply_n(&manager, &mut state, &mut host, "shield", 2);
    apply_n(&manager, &mut state, &mut host, "momentum", 1);
    apply_n(&manager, &mut state, &mut host, "glass-cannon", 1);
    host.pending_choice = true;

    manager.reset(&mut state, &mut host);
    assert_eq!(state, RunUpgradeState::default());
    assert!(state.active_synergies().is_empty());
    assert!(!host.pending_choice);
    assert_eq!(host.pilots.primary.shield, ShieldConfig::default());
    assert_eq!(host.pilots.primary.momentum, MomentumConfig::default());

    // Idempotent
    manager.reset(&mut state, &mut host);
    assert_eq!(state, RunUpgradeState::default());
}

// ============================================================================
// Synergies
// ============================================================================

#[test]
fn test_overcharge_unlocks_once_and_survives_restack() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "capacitor", 1);
    assert!(!state.is_synergy_active(SynergyId::Overcharge));

    apply_n(&manager, &mut state, &mut host, "chain-arc", 1);
    assert!(state.is_synergy_active(SynergyId::Overcharge));
    // 150ms, shortened by 25% * (1 - 0.2)
    assert_approx(state.live().chain_arc.cooldown_ms, 120.0);

    apply_n(&manager, &mut state, &mut host, "chain-arc", 1);
    apply_n(&manager, &mut state, &mut host, "capacitor", 1);
    assert!(state.is_synergy_active(SynergyId::Overcharge));
    assert_approx(state.live().chain_arc.cooldown_ms, 104.0);
    assert_eq!(host.unlocked, vec![SynergyId::Overcharge]);
    assert_eq!(host.bursts.len(), 1);
}

#[test]
fn test_deadeye_crit_bonus_scaled_by_power_reduction() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "homing", 1);
    apply_n(&manager, &mut state, &mut host, "power-shot", 1);

    assert_eq!(synergy_scale(&registry.balance, SynergyId::Deadeye), 0.75);
    assert_approx(host.stats.crit_chance, 0.05 + 0.15 * 0.75);
    assert_approx(host.stats.crit_multiplier, 1.5 + 0.25 * 0.75);
}

#[test]
fn test_fortress_needs_all_three_and_extends_shield() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "plating", 1);
    apply_n(&manager, &mut state, &mut host, "shield", 1);
    assert!(!state.is_synergy_active(SynergyId::Fortress));
    assert_approx(state.live().shield.duration_secs, 2.0);

    apply_n(&manager, &mut state, &mut host, "stabilizer", 1);
    assert!(state.is_synergy_active(SynergyId::Fortress));
    assert_approx(state.live().shield.duration_secs, 2.9);

    apply_n(&manager, &mut state, &mut host, "shield", 1);
    assert_approx(state.live().shield.duration_secs, 2.3 * 1.45);
    assert_eq!(host.pilots.primary.shield, state.live().shield);
}

#[test]
fn test_blood_frenzy_shortens_every_pilot_cooldown() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::coop();

    apply_n(&manager, &mut state, &mut host, "berserk", 1);
    apply_n(&manager, &mut state, &mut host, "blood-fuel", 1);

    assert!(state.is_synergy_active(SynergyId::BloodFrenzy));
    assert_approx(host.pilots.primary.ability_cooldown_ms, 6400.0);
    assert_eq!(
        host.pilots.secondary.as_ref().map(|p| p.ability_cooldown_ms),
        Some(host.pilots.primary.ability_cooldown_ms)
    );
}

#[test]
fn test_synergies_are_monotone_over_a_long_run() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    let picks = [
        "explosive", "shrapnel", "momentum", "kinetic", "explosive", "magnet",
        "singularity-rounds", "momentum", "shrapnel", "kinetic", "magnet",
    ];
    let mut seen = std::collections::BTreeSet::new();
    for pick in picks {
        manager.apply(&mut state, pick, &mut host);
        assert!(seen.is_subset(state.active_synergies()));
        seen = state.active_synergies().clone();
    }

    assert!(seen.contains(&SynergyId::ClusterBomb));
    assert!(seen.contains(&SynergyId::PerpetualMotion));
    assert!(seen.contains(&SynergyId::EventHorizon));
    assert_eq!(host.unlocked.len(), seen.len());
    assert_approx(state.live().singularity.pull_radius, 135.0);
}

// ============================================================================
// Choices and telemetry
// ============================================================================

#[test]
fn test_roll_choices_is_deterministic_and_distinct() {
    let registry = registry();
    let state = RunUpgradeState::default();

    let first = roll_upgrade_choices(&registry, &state, &mut choice_rng(99, 0), 3);
    let second = roll_upgrade_choices(&registry, &state, &mut choice_rng(99, 0), 3);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    let mut unique = first.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_roll_choices_skips_upgrades_that_cannot_stack() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();

    apply_n(&manager, &mut state, &mut host, "glass-cannon", 1);
    apply_n(&manager, &mut state, &mut host, "power-shot", 6);
    apply_n(&manager, &mut state, &mut host, "rapid-fire", 6);

    for seed in 0..50 {
        let choices = roll_upgrade_choices(&registry, &state, &mut choice_rng(seed, 0), 3);
        assert!(!choices.contains(&UpgradeId::GlassCannon));
        assert!(!choices.contains(&UpgradeId::PowerShot));
        assert!(!choices.contains(&UpgradeId::RapidFire));
        // Would push DPS past the ceiling
        assert!(!choices.contains(&UpgradeId::BulletHell));
    }
}

#[test]
fn test_roll_choices_limited_by_available_pool() {
    let mut registry = registry();
    registry
        .upgrades
        .retain(|id, _| id == "magnet" || id == "homing");
    let state = RunUpgradeState::default();

    let mut choices = roll_upgrade_choices(&registry, &state, &mut choice_rng(1, 0), 3);
    choices.sort();
    assert_eq!(choices, vec![UpgradeId::Homing, UpgradeId::Magnet]);
}

#[test]
fn test_summaries_keep_their_own_order() {
    let registry = registry();
    let manager = UpgradeManager::new(&registry);
    let mut state = RunUpgradeState::default();
    let mut host = TestHost::new();
    let mut log = RunUpgradeLog::default();

    for pick in ["magnet", "power-shot", "magnet", "plating"] {
        manager.apply(&mut state, pick, &mut host);
    }
    for (id, stacks) in &host.stack_changes {
        log.record_stack_change(*id, *stacks);
    }

    let acquired: Vec<(UpgradeId, u32)> = log
        .summary()
        .iter()
        .map(|e| (e.upgrade_id, e.final_stack_count))
        .collect();
    assert_eq!(
        acquired,
        vec![
            (UpgradeId::Magnet, 2),
            (UpgradeId::PowerShot, 1),
            (UpgradeId::Plating, 1),
        ]
    );

    let catalog: Vec<UpgradeId> = state.summary().iter().map(|e| e.upgrade_id).collect();
    assert_eq!(
        catalog,
        vec![UpgradeId::PowerShot, UpgradeId::Plating, UpgradeId::Magnet]
    );
}

// ============================================================================
// Plugin
// ============================================================================

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((CorePlugin, UpgradesPlugin))
        .insert_resource(registry());
    app.update();
    app.world_mut().write_message(RunStartedEvent {
        seed: Some(7),
        coop: false,
    });
    app
}

#[test]
fn test_plugin_applies_chosen_upgrades() {
    let mut app = test_app();
    app.world_mut().write_message(UpgradeChosenEvent {
        upgrade_id: "power-shot".to_string(),
    });
    app.world_mut().write_message(UpgradeChosenEvent {
        upgrade_id: "laser-eyes".to_string(),
    });
    app.update();

    let state = app.world().resource::<RunUpgradeState>();
    assert_eq!(state.stacks_of(UpgradeId::PowerShot), 1);
    assert_approx(app.world().resource::<PlayerStats>().damage, 11.5);

    let log = app.world().resource::<RunUpgradeLog>();
    assert_eq!(log.history.len(), 1);
    assert_eq!(log.rejected_count, 1);
}

#[test]
fn test_plugin_offer_pauses_until_chosen() {
    let mut app = test_app();
    app.update();

    app.world_mut()
        .write_message(OfferUpgradeChoicesEvent::default());
    app.update();

    let pending = app.world().resource::<PendingUpgradeChoices>().clone();
    assert_eq!(pending.choices.len(), DEFAULT_CHOICE_COUNT);
    assert!(app.world().resource::<crate::core::GameplayPaused>().is_paused());
    assert_eq!(app.world().resource::<crate::core::RunConfig>().offer_index, 1);

    app.world_mut().write_message(UpgradeChosenEvent {
        upgrade_id: pending.choices[0].as_str().to_string(),
    });
    app.update();

    assert!(!app.world().resource::<PendingUpgradeChoices>().is_open());
    assert!(!app.world().resource::<crate::core::GameplayPaused>().is_paused());
    assert_eq!(
        app.world()
            .resource::<RunUpgradeState>()
            .stacks_of(pending.choices[0]),
        1
    );
}
