//! The armor tier table.
//!
//! Armor is rated 0 (none) to 3 (heavy). The tier decides the die rolled to
//! reduce incoming damage and the DR penalties for wearing it.

/// One row of the armor tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmorTier {
    /// Tier index (0-3).
    pub tier: u32,
    /// Display name of the tier.
    pub name: &'static str,
    /// Dice formula rolled to reduce incoming damage (`"0"` = none).
    pub damage_reduction_die: &'static str,
    /// DR penalty on agility tests.
    pub agility_modifier: i32,
    /// DR penalty on defense rolls.
    pub defense_modifier: i32,
}

/// Highest defined tier; larger values clamp to it.
pub const MAX_TIER: u32 = 3;

const ARMOR_TIERS: [ArmorTier; 4] = [
    ArmorTier {
        tier: 0,
        name: "None",
        damage_reduction_die: "0",
        agility_modifier: 0,
        defense_modifier: 0,
    },
    ArmorTier {
        tier: 1,
        name: "Light",
        damage_reduction_die: "d2",
        agility_modifier: 0,
        defense_modifier: 0,
    },
    ArmorTier {
        tier: 2,
        name: "Medium",
        damage_reduction_die: "d4",
        agility_modifier: 2,
        defense_modifier: 2,
    },
    ArmorTier {
        tier: 3,
        name: "Heavy",
        damage_reduction_die: "d6",
        agility_modifier: 4,
        defense_modifier: 2,
    },
];

/// Look up a tier row. Tiers above [`MAX_TIER`] clamp to the heaviest row.
pub fn armor_tier(tier: u32) -> &'static ArmorTier {
    &ARMOR_TIERS[tier.min(MAX_TIER) as usize]
}
