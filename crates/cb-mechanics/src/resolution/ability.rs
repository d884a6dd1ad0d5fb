//! Ability tests, omens and toughness checks.

use cb_core::{Ability, Actor, EngineConfig, ItemKind, RollData};

use crate::dice::{RandomSource, Roll};
use crate::error::MechResult;
use crate::formula::Formula;
use crate::modifiers::{DrBreakdown, DrRequest, aggregate};

use super::card::RollCard;

/// Result of testing an ability.
#[derive(Debug, Clone)]
pub struct AbilityTest {
    /// The ability tested.
    pub ability: Ability,
    /// DR modifiers around a base of 0.
    pub breakdown: DrBreakdown,
    /// `1d20 + ability`.
    pub roll: Roll,
    /// Presentation payload.
    pub card: RollCard,
}

impl AbilityTest {
    /// Whether the roll meets `base_dr` shifted by this test's modifiers.
    pub fn succeeds_against(&self, base_dr: i32) -> bool {
        self.roll.total >= i64::from(base_dr) + i64::from(self.breakdown.total)
    }
}

/// Test an ability: `1d20 + @abilities.<key>.value`, with the DR
/// modifiers that apply to it. Never mutates the actor.
pub fn test_ability(
    actor: &Actor,
    config: &EngineConfig,
    ability: &Ability,
    rng: &mut dyn RandomSource,
) -> MechResult<AbilityTest> {
    let breakdown = aggregate(actor, config, &DrRequest::ability(ability.clone()));
    let formula = Formula::parse(&format!("1d20 + @{}", ability.roll_path()))?;
    let roll = formula.evaluate(&actor.roll_data(), rng)?;

    tracing::debug!(actor = %actor.name, %ability, total = roll.total, "ability test");

    let mut card = RollCard::new(format!("Test {}", ability.label()))
        .roll(format!("1d20 + {}", ability.abbrev()), &roll);
    if breakdown.total != 0 {
        card = card.breakdown(&breakdown);
    }

    Ok(AbilityTest {
        ability: ability.clone(),
        breakdown,
        roll,
        card,
    })
}

/// A plain roll with its card.
#[derive(Debug, Clone)]
pub struct CheckRoll {
    /// The roll.
    pub roll: Roll,
    /// Presentation payload.
    pub card: RollCard,
}

/// Test omens: `1d20 + omens`.
pub fn test_omens(actor: &Actor, rng: &mut dyn RandomSource) -> MechResult<CheckRoll> {
    let roll = Formula::parse("1d20 + @omens.value")?.evaluate(&actor.roll_data(), rng)?;
    let card = RollCard::new("Test Omens").roll(format!("1d20 + {}", actor.omens.value), &roll);
    Ok(CheckRoll { roll, card })
}

/// Roll the class omen die and set current and maximum omens to the result,
/// floored at zero. Returns `None` when the actor has no class.
pub fn roll_omens(actor: &mut Actor, rng: &mut dyn RandomSource) -> MechResult<Option<CheckRoll>> {
    let Some(class) = actor.class_item() else {
        tracing::debug!(actor = %actor.name, "no class item, omens unchanged");
        return Ok(None);
    };
    let omen_die = match &class.kind {
        ItemKind::Class { omen_die } => omen_die.clone(),
        _ => return Ok(None),
    };

    let roll = Formula::parse(&omen_die)?.evaluate(&RollData::new(), rng)?;
    let omens = i32::try_from(roll.total.max(0)).unwrap_or(i32::MAX);
    actor.omens.value = omens;
    actor.omens.max = omens;

    tracing::debug!(actor = %actor.name, omens, "rolled omens");

    let card = RollCard::new("Omens")
        .roll(omen_die, &roll)
        .outcome(format!("Omens: {omens}"));
    Ok(Some(CheckRoll { roll, card }))
}

/// Death check: `1d20 + toughness`. The caller consults its own table.
pub fn death_check(actor: &Actor, rng: &mut dyn RandomSource) -> MechResult<CheckRoll> {
    toughness_check(actor, "Death Check", rng)
}

/// Drop check: `1d20 + toughness`. The caller consults its own table.
pub fn drop_check(actor: &Actor, rng: &mut dyn RandomSource) -> MechResult<CheckRoll> {
    toughness_check(actor, "Drop Check", rng)
}

fn toughness_check(actor: &Actor, title: &str, rng: &mut dyn RandomSource) -> MechResult<CheckRoll> {
    let ability = Ability::Toughness;
    let roll = Formula::parse(&format!("1d20 + @{}", ability.roll_path()))?
        .evaluate(&actor.roll_data(), rng)?;
    let card = RollCard::new(title).roll(format!("1d20 + {}", ability.abbrev()), &roll);
    Ok(CheckRoll { roll, card })
}
