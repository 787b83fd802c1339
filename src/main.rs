use bevy::log::LogPlugin;
use bevy::prelude::*;

use salvo_upgrades::content::ContentPlugin;
use salvo_upgrades::core::{CorePlugin, PlayerStats, RunStartedEvent};
use salvo_upgrades::upgrades::{RunUpgradeLog, UpgradesPlugin};

/// Seed used when none is given on the command line
const DEFAULT_SEED: u64 = 42;

fn main() -> AppExit {
    let mut args = std::env::args().skip(1);
    let template = args.next().unwrap_or_else(|| "glass-storm".to_string());
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins((CorePlugin, ContentPlugin, UpgradesPlugin));
    #[cfg(feature = "dev-tools")]
    app.add_plugins(salvo_upgrades::debug::DebugPlugin);

    // Startup: content load and validation
    app.update();
    if let Some(exit) = app.should_exit() {
        return exit;
    }

    app.world_mut().write_message(RunStartedEvent {
        seed: Some(seed),
        coop: false,
    });
    #[cfg(feature = "dev-tools")]
    app.world_mut()
        .write_message(salvo_upgrades::debug::ApplyBuildTemplateEvent { name: template });
    #[cfg(not(feature = "dev-tools"))]
    warn!("Built without dev-tools, ignoring template '{}'", template);
    app.update();

    let log = app.world().resource::<RunUpgradeLog>();
    info!("Run summary: {}", log.describe());
    let stats = app.world().resource::<PlayerStats>();
    info!(
        "Final stats: damage {:.2}, fire rate {:.2}, health {}/{}, crit {:.2} x{:.2}, reduction {:.3}",
        stats.damage,
        stats.fire_rate,
        stats.health,
        stats.max_health,
        stats.crit_chance,
        stats.crit_multiplier,
        stats.damage_reduction
    );

    AppExit::Success
}
