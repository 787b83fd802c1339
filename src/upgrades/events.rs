use bevy::ecs::message::Message;

use super::host::{FeedbackBurst, UpgradeRejection};
use super::ids::{SynergyId, UpgradeId};

/// The player picked an upgrade (or a debug tool asked for one).
/// Carries the raw catalog id so unknown ids reach the manager and get rejected there.
#[derive(Debug, Clone)]
pub struct UpgradeChosenEvent {
    pub upgrade_id: String,
}

impl Message for UpgradeChosenEvent {}

#[derive(Debug, Clone)]
pub struct UpgradeRejectedEvent {
    pub rejection: UpgradeRejection,
}

impl Message for UpgradeRejectedEvent {}

#[derive(Debug, Clone, Copy)]
pub struct UpgradeStackChangedEvent {
    pub upgrade_id: UpgradeId,
    pub new_stacks: u32,
}

impl Message for UpgradeStackChangedEvent {}

#[derive(Debug, Clone, Copy)]
pub struct SynergyUnlockedEvent {
    pub synergy_id: SynergyId,
}

impl Message for SynergyUnlockedEvent {}

/// Cosmetic only; nothing in the engine reads it back
#[derive(Debug, Clone, Copy)]
pub struct FeedbackBurstEvent {
    pub burst: FeedbackBurst,
}

impl Message for FeedbackBurstEvent {}

/// Request a fresh upgrade offer (wave cleared, level up, ...)
#[derive(Debug, Clone, Copy)]
pub struct OfferUpgradeChoicesEvent {
    pub count: usize,
}

impl Default for OfferUpgradeChoicesEvent {
    fn default() -> Self {
        Self {
            count: super::choices::DEFAULT_CHOICE_COUNT,
        }
    }
}

impl Message for OfferUpgradeChoicesEvent {}

#[derive(Debug, Clone)]
pub struct UpgradeChoicesOfferedEvent {
    pub choices: Vec<UpgradeId>,
}

impl Message for UpgradeChoicesOfferedEvent {}
