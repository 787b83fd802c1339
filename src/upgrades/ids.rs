//! Upgrades domain: typed identifiers for catalog upgrades and synergies.
//!
//! The catalog stores plain string ids. Every id the engine can act on has a
//! variant here, so an effect applier or synergy activator that forgets a
//! variant fails to compile instead of silently doing nothing.

use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! catalog_ids {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in catalog order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The catalog string id for this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }

            /// Look up a variant by its catalog string id.
            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

catalog_ids! {
    /// Upgrade ids known to the effect appliers.
    UpgradeId {
        PowerShot => "power-shot",
        RapidFire => "rapid-fire",
        HeavyBarrel => "heavy-barrel",
        SplitShot => "split-shot",
        Spread => "spread",
        Capacitor => "capacitor",
        Explosive => "explosive",
        ChainArc => "chain-arc",
        Homing => "homing",
        Kinetic => "kinetic",
        Momentum => "momentum",
        Shrapnel => "shrapnel",
        ChainReaction => "chain-reaction",
        Berserk => "berserk",
        BloodFuel => "blood-fuel",
        Plating => "plating",
        Shield => "shield",
        Stabilizer => "stabilizer",
        Magnet => "magnet",
        QuantumTunneling => "quantum-tunneling",
        NeutronCore => "neutron-core",
        SingularityRounds => "singularity-rounds",
        GlassCannon => "glass-cannon",
        BulletHell => "bullet-hell",
    }
}

catalog_ids! {
    /// Synergy ids known to the synergy activators.
    SynergyId {
        Overcharge => "overcharge",
        Deadeye => "deadeye",
        ClusterBomb => "cluster-bomb",
        Fortress => "fortress",
        PerpetualMotion => "perpetual-motion",
        BloodFrenzy => "blood-frenzy",
        EventHorizon => "event-horizon",
        CriticalMass => "critical-mass",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_ids_parse_back() {
        for id in UpgradeId::ALL {
            assert_eq!(UpgradeId::from_id(id.as_str()), Some(*id));
        }
        assert_eq!(UpgradeId::from_id("laser-eyes"), None);
    }

    #[test]
    fn test_synergy_display_matches_catalog_id() {
        assert_eq!(SynergyId::ClusterBomb.to_string(), "cluster-bomb");
        assert_eq!(SynergyId::from_id("fortress"), Some(SynergyId::Fortress));
    }
}
