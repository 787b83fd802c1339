//! Upgrade power and synergy balance engine for a wave-survival shooter.

pub mod content;
pub mod core;
#[cfg(feature = "dev-tools")]
pub mod debug;
pub mod upgrades;
