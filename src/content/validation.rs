//! Validation for cross-references between content definitions.
//!
//! The balance tables and synergy catalog must only name ids that exist, and
//! every typed upgrade/synergy id must have data behind it. Any failure here
//! means the content fails closed: nothing is registered.

use super::data::*;
use super::registry::ContentRegistry;
use crate::upgrades::{SynergyId, UpgradeId};

/// A validation error with context about what failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A definition or table references an id that was never loaded
    MissingReference {
        source_type: &'static str,
        source_id: String,
        field: &'static str,
        target_type: &'static str,
        missing_id: String,
    },
    /// A data id with no engine variant, or a variant with no data
    UnmappedId {
        kind: &'static str,
        id: String,
        detail: &'static str,
    },
    /// A value that parses but breaks a balance rule
    InvalidValue {
        source_type: &'static str,
        source_id: String,
        message: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingReference {
                source_type,
                source_id,
                field,
                target_type,
                missing_id,
            } => write!(
                f,
                "{} '{}' references missing {} '{}' in field '{}'",
                source_type, source_id, target_type, missing_id, field
            ),
            ValidationError::UnmappedId { kind, id, detail } => {
                write!(f, "{} '{}' {}", kind, id, detail)
            }
            ValidationError::InvalidValue {
                source_type,
                source_id,
                message,
            } => write!(f, "{} '{}': {}", source_type, source_id, message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Helper macro for checking a reference exists
macro_rules! check_ref {
    ($errors:expr, $registry_map:expr, $source_type:expr, $source_id:expr, $field:expr, $target_type:expr, $ref_id:expr) => {
        if !$registry_map.contains_key($ref_id.as_str()) {
            $errors.push(ValidationError::MissingReference {
                source_type: $source_type,
                source_id: $source_id.to_string(),
                field: $field,
                target_type: $target_type,
                missing_id: $ref_id.to_string(),
            });
        }
    };
}

/// Validate all cross-references in the registry.
/// Returns a list of validation errors, empty if all references are valid.
pub fn validate_content(registry: &ContentRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_id_mapping(registry, &mut errors);

    // Validate upgrades
    for (id, upgrade) in &registry.upgrades {
        if let Some(ref tag) = upgrade.synergy_tag {
            check_ref!(
                errors,
                registry.synergies,
                "Upgrade",
                id,
                "synergy_tag",
                "Synergy",
                tag
            );
        }
        if upgrade.rarity == Rarity::Legendary && upgrade.max_stacks != Some(1) {
            errors.push(ValidationError::InvalidValue {
                source_type: "Upgrade",
                source_id: id.clone(),
                message: "legendary upgrades must declare max_stacks: 1".to_string(),
            });
        }
        if upgrade.max_stacks == Some(0) {
            errors.push(ValidationError::InvalidValue {
                source_type: "Upgrade",
                source_id: id.clone(),
                message: "max_stacks of 0 makes the upgrade unobtainable".to_string(),
            });
        }
    }

    // Validate synergies
    for (id, synergy) in &registry.synergies {
        if synergy.requires.is_empty() {
            errors.push(ValidationError::InvalidValue {
                source_type: "Synergy",
                source_id: id.clone(),
                message: "requires at least one upgrade".to_string(),
            });
        }
        for required in &synergy.requires {
            check_ref!(
                errors,
                registry.upgrades,
                "Synergy",
                id,
                "requires",
                "Upgrade",
                required
            );
        }
    }

    // Validate balance tables
    let balance = &registry.balance;
    for (id, rule) in &balance.diminishing_returns {
        check_ref!(
            errors,
            registry.upgrades,
            "BalanceConfig",
            "diminishing_returns",
            "diminishing_returns",
            "Upgrade",
            id
        );
        if !(0.0..=1.0).contains(&rule.scaling_factor) {
            errors.push(ValidationError::InvalidValue {
                source_type: "DiminishingReturns",
                source_id: id.clone(),
                message: format!(
                    "scaling_factor {} must be within [0, 1]",
                    rule.scaling_factor
                ),
            });
        }
    }
    for id in balance.stacking_caps.keys() {
        check_ref!(
            errors,
            registry.upgrades,
            "BalanceConfig",
            "stacking_caps",
            "stacking_caps",
            "Upgrade",
            id
        );
    }
    for (id, adjustment) in &balance.synergy_adjustments {
        check_ref!(
            errors,
            registry.synergies,
            "BalanceConfig",
            "synergy_adjustments",
            "synergy_adjustments",
            "Synergy",
            id
        );
        if !(0.0..1.0).contains(&adjustment.power_reduction) {
            errors.push(ValidationError::InvalidValue {
                source_type: "SynergyAdjustment",
                source_id: id.clone(),
                message: format!(
                    "power_reduction {} must be within [0, 1)",
                    adjustment.power_reduction
                ),
            });
        }
    }
    for id in balance.legendary_adjustments.keys() {
        check_ref!(
            errors,
            registry.upgrades,
            "BalanceConfig",
            "legendary_adjustments",
            "legendary_adjustments",
            "Upgrade",
            id
        );
        if let Some(upgrade) = registry.upgrades.get(id) {
            if upgrade.rarity != Rarity::Legendary {
                errors.push(ValidationError::InvalidValue {
                    source_type: "LegendaryAdjustment",
                    source_id: id.clone(),
                    message: format!("upgrade is {:?}, not Legendary", upgrade.rarity),
                });
            }
        }
    }

    errors
}

/// Every data id needs an engine variant and every variant needs data.
fn validate_id_mapping(registry: &ContentRegistry, errors: &mut Vec<ValidationError>) {
    for id in registry.upgrades.keys() {
        if UpgradeId::from_id(id).is_none() {
            errors.push(ValidationError::UnmappedId {
                kind: "Upgrade",
                id: id.clone(),
                detail: "has no effect handler",
            });
        }
    }
    for id in UpgradeId::ALL {
        if !registry.upgrades.contains_key(id.as_str()) {
            errors.push(ValidationError::UnmappedId {
                kind: "Upgrade",
                id: id.to_string(),
                detail: "is missing from upgrades.ron",
            });
        }
    }
    for id in registry.synergies.keys() {
        if SynergyId::from_id(id).is_none() {
            errors.push(ValidationError::UnmappedId {
                kind: "Synergy",
                id: id.clone(),
                detail: "has no activation handler",
            });
        }
    }
    for id in SynergyId::ALL {
        if !registry.synergies.contains_key(id.as_str()) {
            errors.push(ValidationError::UnmappedId {
                kind: "Synergy",
                id: id.to_string(),
                detail: "is missing from synergies.ron",
            });
        }
    }
}
