//! Debug tooling for fast balance iteration.
//!
//! Features:
//! - Apply named build templates through the normal upgrade path
//! - Log the run summary on demand

mod templates;

pub use templates::{BUILD_TEMPLATES, BuildTemplate, find_template};

use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::upgrades::{RunUpgradeLog, RunUpgradeState, UpgradeChosenEvent, UpgradeSystems};

// ============================================================================
// Debug State Resource
// ============================================================================

/// Resource tracking debug tool state
#[derive(Resource, Debug, Default)]
pub struct DebugState {
    /// Template most recently queued
    pub last_template: Option<String>,
    /// Last status line reported by a debug action
    pub status_message: Option<String>,
}

impl DebugState {
    pub fn set_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("[DEBUG] {}", message);
        self.status_message = Some(message);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Queue every pick of a named build template
#[derive(Debug, Clone)]
pub struct ApplyBuildTemplateEvent {
    pub name: String,
}

impl Message for ApplyBuildTemplateEvent {}

/// Log the current run's upgrades and synergies
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRunSummaryEvent;

impl Message for LogRunSummaryEvent {}

// ============================================================================
// Plugin
// ============================================================================

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .add_message::<ApplyBuildTemplateEvent>()
            .add_message::<LogRunSummaryEvent>()
            .add_systems(Update, apply_build_templates.before(UpgradeSystems))
            .add_systems(Update, log_run_summary.after(UpgradeSystems));
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Turn each template request into one `UpgradeChosenEvent` per stack
fn apply_build_templates(
    mut events: MessageReader<ApplyBuildTemplateEvent>,
    mut chosen: MessageWriter<UpgradeChosenEvent>,
    mut debug_state: ResMut<DebugState>,
) {
    for event in events.read() {
        let Some(template) = find_template(&event.name) else {
            let known: Vec<&str> = BUILD_TEMPLATES.iter().map(|t| t.name).collect();
            warn!(
                "[DEBUG] Unknown build template '{}' (known: {})",
                event.name,
                known.join(", ")
            );
            continue;
        };

        let picks = template.expanded_picks();
        debug_state.set_message(format!(
            "Applying template '{}' ({} picks): {}",
            template.name,
            picks.len(),
            template.description
        ));
        debug_state.last_template = Some(template.name.to_string());
        chosen.write_batch(
            picks
                .into_iter()
                .map(|upgrade_id| UpgradeChosenEvent { upgrade_id }),
        );
    }
}

fn log_run_summary(
    mut events: MessageReader<LogRunSummaryEvent>,
    log: Res<RunUpgradeLog>,
    state: Res<RunUpgradeState>,
) {
    for _event in events.read() {
        info!("[DEBUG] Run summary: {}", log.describe());
        info!(
            "[DEBUG] Projectile scale {:.2}, glass cannon cap {:?}",
            state.projectile_scale(),
            state.glass_cannon_cap()
        );
    }
}
