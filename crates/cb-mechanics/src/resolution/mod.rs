//! Resolvers: ability tests, attacks, defenses and carriage upgrades.
//!
//! Each resolver is synchronous and draws its dice in a fixed order from the
//! injected [`RandomSource`](crate::dice::RandomSource). Resolvers that
//! change the actor borrow it mutably for the whole resolution.

pub mod ability;
pub mod attack;
pub mod card;
pub mod carriage;
pub mod defend;

pub use ability::{AbilityTest, CheckRoll, death_check, drop_check, roll_omens, test_ability, test_omens};
pub use attack::{
    AmmoUsage, AttackInput, AttackOutcome, AttackResolution, AttackSetup, AttackStage,
    roll_unautomated_attack,
};
pub use card::{CardRoll, RollCard};
pub use carriage::{UpgradeUse, upgrade_attack};
pub use defend::{
    DefendInput, DefendOutcome, DefendResolution, DefendSetup, DefendStage, roll_unautomated_defend,
};

use crate::error::{MechError, MechResult};

/// Parse a base DR typed by a user. Zero and non-numbers are rejected.
pub fn parse_base_dr(text: &str) -> MechResult<i32> {
    let base_dr = text
        .trim()
        .parse::<i32>()
        .map_err(|_| MechError::Validation(format!("base DR must be a number, got '{}'", text.trim())))?;
    if base_dr == 0 {
        return Err(MechError::Validation("base DR must not be zero".to_string()));
    }
    Ok(base_dr)
}
