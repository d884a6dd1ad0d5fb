//! Rules engine for Crys-Borg.
//!
//! Provides dice formulas, DR modifier aggregation, and the resolvers for
//! ability tests, attacks, defenses and carriage upgrades. All randomness
//! comes from an injected [`RandomSource`]; all table settings from an
//! explicit [`EngineConfig`](cb_core::EngineConfig).

pub mod dice;
pub mod error;
pub mod formula;
pub mod modifiers;
pub mod resolution;

pub use dice::{DicePool, Die, DieResult, RandomSource, Roll, ScriptedDice};
pub use error::{MechError, MechResult};
pub use formula::{Formula, evaluate};
pub use modifiers::{DrBreakdown, DrCategory, DrRequest, DrSource, DrSourceKind, aggregate};
pub use resolution::{
    AbilityTest, AmmoUsage, AttackInput, AttackOutcome, AttackResolution, AttackSetup, AttackStage,
    CardRoll, CheckRoll, DefendInput, DefendOutcome, DefendResolution, DefendSetup, DefendStage,
    RollCard, UpgradeUse, death_check, drop_check, roll_omens, roll_unautomated_attack,
    roll_unautomated_defend, test_ability, test_omens, upgrade_attack,
};
