//! Named upgrade builds for exercising the balance gates without playing a run.

use crate::upgrades::UpgradeId;

/// A scripted sequence of upgrade picks
#[derive(Debug, Clone, Copy)]
pub struct BuildTemplate {
    pub name: &'static str,
    pub description: &'static str,
    /// (upgrade, stacks) in pick order
    pub picks: &'static [(UpgradeId, u32)],
}

impl BuildTemplate {
    /// Catalog ids, one per stack, in the order they are chosen
    pub fn expanded_picks(&self) -> Vec<String> {
        self.picks
            .iter()
            .flat_map(|(id, stacks)| std::iter::repeat_n(id.as_str().to_string(), *stacks as usize))
            .collect()
    }
}

pub const BUILD_TEMPLATES: &[BuildTemplate] = &[
    BuildTemplate {
        name: "glass-storm",
        description: "Maxed damage and fire rate on Glass Cannon; Bullet Hell trips the DPS ceiling",
        picks: &[
            (UpgradeId::GlassCannon, 1),
            (UpgradeId::PowerShot, 6),
            (UpgradeId::RapidFire, 6),
            (UpgradeId::BulletHell, 1),
        ],
    },
    BuildTemplate {
        name: "fortress",
        description: "Plating, shields and stabilizers up to the defense ceiling",
        picks: &[
            (UpgradeId::Plating, 6),
            (UpgradeId::Shield, 3),
            (UpgradeId::Stabilizer, 2),
            (UpgradeId::Plating, 1),
        ],
    },
    BuildTemplate {
        name: "overdrive",
        description: "Charged shots, chain lightning and homing with a kinetic engine",
        picks: &[
            (UpgradeId::Capacitor, 2),
            (UpgradeId::ChainArc, 3),
            (UpgradeId::PowerShot, 3),
            (UpgradeId::Homing, 2),
            (UpgradeId::Kinetic, 2),
            (UpgradeId::Momentum, 2),
        ],
    },
];

pub fn find_template(name: &str) -> Option<&'static BuildTemplate> {
    BUILD_TEMPLATES.iter().find(|template| template.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRegistry;
    use crate::core::{PilotState, PlayerStats, StatsPatch};
    use crate::upgrades::{
        FeedbackBurst, RunUpgradeState, SynergyId, UpgradeHost, UpgradeManager,
    };

    #[derive(Default)]
    struct StatsOnlyHost {
        stats: PlayerStats,
        pilot: PilotState,
        unlocked: Vec<SynergyId>,
    }

    impl UpgradeHost for StatsOnlyHost {
        fn player_stats(&self) -> PlayerStats {
            self.stats.clone()
        }
        fn set_player_stats(&mut self, patch: StatsPatch) {
            patch.apply_to(&mut self.stats);
        }
        fn primary_pilot(&mut self) -> Option<&mut PilotState> {
            Some(&mut self.pilot)
        }
        fn secondary_pilot(&mut self) -> Option<&mut PilotState> {
            None
        }
        fn enforce_health_cap(&mut self) {
            self.stats.enforce_health_cap();
        }
        fn set_paused(&mut self, _paused: bool) {}
        fn clear_pending_choice(&mut self) {}
        fn spawn_feedback_burst(&mut self, _burst: FeedbackBurst) {}
        fn record_stack_change(&mut self, _id: UpgradeId, _stacks: u32) {}
        fn synergy_unlocked(&mut self, id: SynergyId) {
            self.unlocked.push(id);
        }
    }

    fn run_template(name: &str) -> (Vec<bool>, RunUpgradeState, StatsOnlyHost) {
        let Ok(registry) = ContentRegistry::embedded() else {
            panic!("embedded content failed to parse");
        };
        let Some(template) = find_template(name) else {
            panic!("no template named {}", name);
        };
        let manager = UpgradeManager::new(&registry);
        let mut state = RunUpgradeState::default();
        let mut host = StatsOnlyHost::default();
        let results = template
            .expanded_picks()
            .iter()
            .map(|id| manager.apply(&mut state, id, &mut host))
            .collect();
        (results, state, host)
    }

    #[test]
    fn test_template_names_are_unique() {
        for (i, template) in BUILD_TEMPLATES.iter().enumerate() {
            assert!(
                BUILD_TEMPLATES[i + 1..]
                    .iter()
                    .all(|other| other.name != template.name)
            );
        }
    }

    #[test]
    fn test_glass_storm_last_pick_is_rejected() {
        let (results, state, _) = run_template("glass-storm");
        assert_eq!(results.len(), 14);
        assert!(results[..13].iter().all(|ok| *ok));
        assert!(!results[13]);
        assert_eq!(state.stacks_of(UpgradeId::BulletHell), 0);
    }

    #[test]
    fn test_fortress_unlocks_synergy_and_hits_plating_cap() {
        let (results, state, host) = run_template("fortress");
        assert_eq!(results.iter().filter(|ok| !**ok).count(), 1);
        assert_eq!(state.stacks_of(UpgradeId::Plating), 6);
        assert_eq!(host.unlocked, vec![SynergyId::Fortress]);
    }

    #[test]
    fn test_overdrive_unlocks_three_synergies() {
        let (results, state, _) = run_template("overdrive");
        assert!(results.iter().all(|ok| *ok));
        assert!(state.is_synergy_active(SynergyId::Overcharge));
        assert!(state.is_synergy_active(SynergyId::Deadeye));
        assert!(state.is_synergy_active(SynergyId::PerpetualMotion));
    }
}
