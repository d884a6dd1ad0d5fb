//! Defending against an incoming attack.
//!
//! ```text
//! Configuring -> RollingDefend -> CriticalDodge | Dodge -> Resolved
//!                              -> Hit | Fumble -> RollingDamage -> [RollingReduction] -> Resolved
//! ```

use serde::{Deserialize, Serialize};

use cb_core::{Ability, Actor, ActorKind, EngineConfig, RollData, armor_tier};

use crate::dice::{RandomSource, Roll};
use crate::error::{MechError, MechResult};
use crate::formula::Formula;
use crate::modifiers::{DrBreakdown, DrCategory, DrRequest, aggregate};

use super::card::RollCard;
use super::parse_base_dr;

/// Stages of a defense, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefendStage {
    /// Choosing DR and incoming attack.
    Configuring,
    /// Rolling the d20.
    RollingDefend,
    /// The attack was avoided.
    Dodged,
    /// The attack landed.
    Hit,
    /// Rolling incoming damage.
    RollingDamage,
    /// Rolling armor.
    RollingReduction,
    /// Done.
    Resolved,
}

/// How a defense turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefendOutcome {
    /// Natural 20.
    CriticalDodge,
    /// Met the DR.
    Dodge,
    /// Hit.
    Hit,
    /// Natural 1: damage is doubled.
    Fumble,
}

impl std::fmt::Display for DefendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalDodge => write!(f, "Critical dodge! Free attack"),
            Self::Dodge => write!(f, "Dodge"),
            Self::Hit => write!(f, "You are hit"),
            Self::Fumble => write!(f, "Fumble! Double damage"),
        }
    }
}

/// Everything known before the first roll.
#[derive(Debug, Clone)]
pub struct DefendSetup {
    /// Suggested base DR.
    pub base_dr: i32,
    /// Suggested incoming attack formula.
    pub incoming_attack: String,
    /// DR modifiers around `base_dr`.
    pub breakdown: DrBreakdown,
    /// Damage reduction formula, if the defender has any armor.
    pub reduction: Option<String>,
    /// Items that reduce damage.
    pub armor_items: Vec<String>,
    /// Carriages roll a flat d20.
    pub is_carriage: bool,
}

impl DefendSetup {
    /// Prefill remembered inputs and gather modifiers and armor.
    pub fn prepare(actor: &Actor, config: &EngineConfig) -> Self {
        let base_dr = actor.preferences.defend_dr();
        let breakdown = aggregate(
            actor,
            config,
            &DrRequest {
                base_dr,
                category: DrCategory::Defense,
                primary_ability: Some(Ability::Agility),
                focus: None,
            },
        );
        let (reduction, armor_items) = damage_reduction(actor);

        tracing::debug!(
            actor = %actor.name,
            base_dr,
            modified_dr = breakdown.modified_dr(),
            reduction = ?reduction,
            stage = ?DefendStage::Configuring,
            "defense prepared"
        );

        Self {
            base_dr,
            incoming_attack: actor.preferences.incoming_attack().to_string(),
            breakdown,
            reduction,
            armor_items,
            is_carriage: actor.kind.is_carriage(),
        }
    }

    /// The DR to dodge for a chosen base DR.
    pub fn modified_dr(&self, base_dr: i32) -> i32 {
        base_dr.saturating_add(self.breakdown.total)
    }

    /// The inputs this setup suggests.
    pub fn suggested_input(&self) -> DefendInput {
        DefendInput {
            base_dr: self.base_dr,
            incoming_attack: self.incoming_attack.clone(),
        }
    }

    fn defend_formula(&self) -> String {
        if self.is_carriage {
            "1d20".to_string()
        } else {
            format!("1d20 + @{}", Ability::Agility.roll_path())
        }
    }
}

/// The damage reduction formula: the current armor tier's die, plus one for
/// a shield; carriages use their hull formula. `None` when nothing reduces.
fn damage_reduction(actor: &Actor) -> (Option<String>, Vec<String>) {
    let mut items = Vec::new();
    let formula = match &actor.kind {
        ActorKind::Carriage { armor } => armor.trim().to_string(),
        _ => {
            let mut die = String::new();
            if let Some(armor) = actor.equipped_armor() {
                let tier = armor.armor_data().map_or(0, |a| a.tier.value);
                die = armor_tier(tier).damage_reduction_die.to_string();
                items.push(armor.name.clone());
            }
            if let Some(shield) = actor.equipped_shield() {
                die = if die.is_empty() || die == "0" {
                    "1".to_string()
                } else {
                    format!("{die}+1")
                };
                items.push(shield.name.clone());
            }
            die
        }
    };
    if formula.is_empty() || formula == "0" {
        (None, items)
    } else {
        (Some(formula), items)
    }
}

/// Validated defend inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefendInput {
    /// Base DR, never zero.
    pub base_dr: i32,
    /// Incoming attack formula, never blank.
    pub incoming_attack: String,
}

impl DefendInput {
    /// Validate raw form input.
    pub fn parse(base_dr: &str, incoming_attack: &str) -> MechResult<Self> {
        Self::new(parse_base_dr(base_dr)?, incoming_attack)
    }

    /// Validate typed input.
    pub fn new(base_dr: i32, incoming_attack: &str) -> MechResult<Self> {
        if base_dr == 0 {
            return Err(MechError::Validation("base DR must not be zero".to_string()));
        }
        let incoming_attack = incoming_attack.trim();
        if incoming_attack.is_empty() {
            return Err(MechError::Validation(
                "incoming attack must not be blank".to_string(),
            ));
        }
        Ok(Self {
            base_dr,
            incoming_attack: incoming_attack.to_string(),
        })
    }
}

/// A finished defense.
#[derive(Debug, Clone)]
pub struct DefendResolution {
    /// DR the defense was made against.
    pub modified_dr: i32,
    /// The d20 roll.
    pub defend_roll: Roll,
    /// Natural d20 face.
    pub d20: u32,
    /// Natural 20.
    pub is_crit: bool,
    /// Natural 1.
    pub is_fumble: bool,
    /// Outcome.
    pub outcome: DefendOutcome,
    /// Incoming damage roll, when hit.
    pub damage_roll: Option<Roll>,
    /// Armor roll, when hit while armored.
    pub reduction_roll: Option<Roll>,
    /// Damage taken after reduction, when hit.
    pub damage: Option<i64>,
    /// Stages passed through.
    pub stages: Vec<DefendStage>,
    /// Presentation payload.
    pub card: RollCard,
}

/// Roll a defense and remember its inputs on `actor`.
pub fn resolve(
    actor: &mut Actor,
    setup: &DefendSetup,
    input: &DefendInput,
    rng: &mut dyn RandomSource,
) -> MechResult<DefendResolution> {
    let defend_formula = Formula::parse(&setup.defend_formula())?;
    let incoming = Formula::parse(&input.incoming_attack)?;
    let reduction_formula = setup
        .reduction
        .as_deref()
        .map(Formula::parse)
        .transpose()?;

    let breakdown = setup.breakdown.with_base(input.base_dr);
    let modified_dr = breakdown.modified_dr();
    let mut stages = vec![DefendStage::Configuring, DefendStage::RollingDefend];

    let defend_roll = defend_formula.evaluate(&actor.roll_data(), rng)?;
    let d20 = defend_roll.natural().unwrap_or(0);
    let is_fumble = d20 == 1;
    let is_crit = d20 == 20;

    let mut damage_roll = None;
    let mut reduction_roll = None;
    let mut damage = None;
    let outcome = if is_crit {
        DefendOutcome::CriticalDodge
    } else if !is_fumble && defend_roll.total >= i64::from(modified_dr) {
        DefendOutcome::Dodge
    } else {
        stages.push(DefendStage::Hit);
        stages.push(DefendStage::RollingDamage);
        let formula = if is_fumble {
            incoming.doubled()
        } else {
            incoming
        };
        let rolled = formula.evaluate(&RollData::new(), rng)?;
        let mut taken = rolled.total;
        damage_roll = Some(rolled);

        if let Some(reduction) = &reduction_formula {
            stages.push(DefendStage::RollingReduction);
            let armor = reduction.evaluate(&RollData::new(), rng)?;
            taken = taken.saturating_sub(armor.total).max(0);
            reduction_roll = Some(armor);
        }
        damage = Some(taken);
        if is_fumble {
            DefendOutcome::Fumble
        } else {
            DefendOutcome::Hit
        }
    };
    if damage.is_none() {
        stages.push(DefendStage::Dodged);
    }

    actor
        .preferences
        .remember_defend(input.base_dr, &input.incoming_attack);
    stages.push(DefendStage::Resolved);

    tracing::debug!(
        actor = %actor.name,
        d20,
        total = defend_roll.total,
        modified_dr,
        ?outcome,
        ?damage,
        "defense resolved"
    );

    let ability_label = if setup.is_carriage {
        "1d20".to_string()
    } else {
        format!("1d20 + {}", Ability::Agility.abbrev())
    };
    let mut card = RollCard::new("Defend")
        .roll(ability_label, &defend_roll)
        .outcome(outcome.to_string())
        .breakdown(&breakdown);
    if let Some(roll) = &damage_roll {
        card = card.roll("Incoming Damage", roll);
    }
    if let Some(roll) = &reduction_roll {
        card = card.roll("Armor", roll);
        for name in &setup.armor_items {
            card = card.item(name.clone());
        }
    }
    if let Some(taken) = damage {
        card = card.damage(taken);
    }

    Ok(DefendResolution {
        modified_dr,
        defend_roll,
        d20,
        is_crit,
        is_fumble,
        outcome,
        damage_roll,
        reduction_roll,
        damage,
        stages,
        card,
    })
}

/// A plain defense roll with its DR breakdown but no outcome, for tables
/// that adjudicate hits themselves.
pub fn roll_unautomated_defend(
    actor: &Actor,
    config: &EngineConfig,
    rng: &mut dyn RandomSource,
) -> MechResult<(Roll, RollCard)> {
    let setup = DefendSetup::prepare(actor, config);
    let roll = Formula::parse(&setup.defend_formula())?.evaluate(&actor.roll_data(), rng)?;
    let label = if setup.is_carriage {
        "1d20".to_string()
    } else {
        format!("1d20 + {}", Ability::Agility.abbrev())
    };
    let card = RollCard::new("Defend")
        .roll(label, &roll)
        .breakdown(&setup.breakdown);
    Ok((roll, card))
}
