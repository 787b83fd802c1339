//! Content domain: RON-backed upgrade catalog, synergy catalog and balance tables.

mod data;
mod loader;
mod registry;
mod validation;

pub use data::*;
pub use loader::{
    ContentLoadError, ContentSources, EMBEDDED_BALANCE, EMBEDDED_SYNERGIES, EMBEDDED_UPGRADES,
    load_all_content, parse_content,
};
pub use registry::ContentRegistry;
pub use validation::{ValidationError, validate_content};

use bevy::prelude::*;
use std::path::PathBuf;

/// Where the content loader looks for data files.
#[derive(Resource, Debug, Clone)]
pub struct ContentSettings {
    pub base_path: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("assets/data"),
        }
    }
}

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ContentSettings>()
            .add_systems(Startup, load_content);
    }
}

/// Load and validate content, inserting the registry only if everything checks out.
fn load_content(
    mut commands: Commands,
    settings: Res<ContentSettings>,
    mut exit: MessageWriter<AppExit>,
) {
    let loaded = if settings.base_path.is_dir() {
        load_all_content(&settings.base_path)
    } else {
        info!(
            "Content directory {} not found, using embedded content",
            settings.base_path.display()
        );
        ContentRegistry::embedded()
    };

    let registry = match loaded {
        Ok(registry) => registry,
        Err(errors) => {
            for e in &errors {
                error!("{}", e);
            }
            exit.write(AppExit::error());
            return;
        }
    };

    let validation_errors = validate_content(&registry);
    if !validation_errors.is_empty() {
        for e in &validation_errors {
            error!("Content validation failed: {}", e);
        }
        exit.write(AppExit::error());
        return;
    }

    info!("{}", registry.summary());
    commands.insert_resource(registry);
}
