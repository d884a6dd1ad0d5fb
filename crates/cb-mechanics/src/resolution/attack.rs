//! Weapon attacks.
//!
//! An attack moves through fixed stages:
//!
//! ```text
//! Configuring -> RollingAttack -> Hit  -> RollingDamage -> [RollingReduction] -> Resolved
//!                              -> Miss -> Resolved
//! ```
//!
//! Every formula is parsed before the first die is drawn, and the actor is
//! only touched once all rolls have succeeded.

use serde::{Deserialize, Serialize};

use cb_core::{Ability, Actor, EngineConfig, ItemId, RollData, WeaponData};

use crate::dice::{RandomSource, Roll};
use crate::error::{MechError, MechResult};
use crate::formula::Formula;
use crate::modifiers::{DrBreakdown, DrCategory, DrRequest, aggregate};

use super::card::RollCard;
use super::parse_base_dr;

/// Stages of an attack, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackStage {
    /// Choosing DR and target armor.
    Configuring,
    /// Rolling the d20.
    RollingAttack,
    /// The attack connected.
    Hit,
    /// The attack missed.
    Miss,
    /// Rolling weapon damage.
    RollingDamage,
    /// Rolling the target's armor.
    RollingReduction,
    /// Done.
    Resolved,
}

/// How an attack turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// Critical hit: damage is doubled.
    Crit,
    /// Hit.
    Hit,
    /// Miss.
    Miss,
    /// Fumbled miss.
    Fumble,
}

impl std::fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crit => write!(f, "Critical hit! Double damage"),
            Self::Hit => write!(f, "Hit"),
            Self::Miss => write!(f, "Miss"),
            Self::Fumble => write!(f, "Fumble! Your weapon slips"),
        }
    }
}

/// What happened to the weapon's ammo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmmoUsage {
    /// The weapon does not use ammo, has none linked, or tracking is off.
    NotTracked,
    /// One round spent.
    Decremented {
        /// The ammo item.
        ammo: ItemId,
        /// Quantity left.
        remaining: u32,
    },
    /// The last round was spent.
    Depleted {
        /// The ammo item.
        ammo: ItemId,
        /// Whether the empty item was removed.
        deleted: bool,
    },
    /// The linked ammo item could not be found or updated.
    Missing(ItemId),
}

/// Everything known before the first roll.
#[derive(Debug, Clone)]
pub struct AttackSetup {
    /// The weapon attacked with.
    pub weapon_id: ItemId,
    /// Weapon display name.
    pub weapon_name: String,
    /// Weapon data at preparation time.
    pub weapon: WeaponData,
    /// Ability the attack rolls with.
    pub ability: Ability,
    /// Suggested base DR.
    pub base_dr: i32,
    /// Suggested target armor formula.
    pub target_armor: Option<String>,
    /// DR modifiers around `base_dr`.
    pub breakdown: DrBreakdown,
}

impl AttackSetup {
    /// Look up the weapon, prefill remembered inputs and gather modifiers.
    pub fn prepare(actor: &Actor, config: &EngineConfig, weapon_id: ItemId) -> MechResult<Self> {
        let item = actor
            .item(weapon_id)
            .ok_or(MechError::ItemNotFound(weapon_id))?;
        let weapon = item
            .weapon_data()
            .ok_or_else(|| MechError::NotAWeapon(item.name.clone()))?
            .clone();
        let ability = weapon.weapon_type.attack_ability();
        let base_dr = actor.preferences.attack_dr();
        let breakdown = aggregate(
            actor,
            config,
            &DrRequest {
                base_dr,
                category: DrCategory::Attack,
                primary_ability: Some(ability.clone()),
                focus: Some(weapon_id),
            },
        );

        tracing::debug!(
            actor = %actor.name,
            weapon = %item.name,
            base_dr,
            modified_dr = breakdown.modified_dr(),
            stage = ?AttackStage::Configuring,
            "attack prepared"
        );

        Ok(Self {
            weapon_id,
            weapon_name: item.name.clone(),
            weapon,
            ability,
            base_dr,
            target_armor: actor.preferences.target_armor().map(str::to_string),
            breakdown,
        })
    }

    /// The DR to hit for a chosen base DR.
    pub fn modified_dr(&self, base_dr: i32) -> i32 {
        base_dr.saturating_add(self.breakdown.total)
    }

    /// The inputs this setup suggests.
    pub fn suggested_input(&self) -> AttackInput {
        AttackInput {
            base_dr: self.base_dr,
            target_armor: self.target_armor.clone(),
        }
    }

    fn attack_formula(&self) -> String {
        format!("1d20 + @{}", self.ability.roll_path())
    }
}

/// Validated attack inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackInput {
    /// Base DR, never zero.
    pub base_dr: i32,
    /// Target armor formula, if the target wears any.
    pub target_armor: Option<String>,
}

impl AttackInput {
    /// Validate raw form input. A blank target armor means none.
    pub fn parse(base_dr: &str, target_armor: &str) -> MechResult<Self> {
        let target_armor = target_armor.trim();
        Self::new(
            parse_base_dr(base_dr)?,
            (!target_armor.is_empty()).then_some(target_armor),
        )
    }

    /// Validate typed input.
    pub fn new(base_dr: i32, target_armor: Option<&str>) -> MechResult<Self> {
        if base_dr == 0 {
            return Err(MechError::Validation("base DR must not be zero".to_string()));
        }
        Ok(Self {
            base_dr,
            target_armor: target_armor
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

/// A finished attack.
#[derive(Debug, Clone)]
pub struct AttackResolution {
    /// Weapon attacked with.
    pub weapon_id: ItemId,
    /// DR the attack was made against.
    pub modified_dr: i32,
    /// The d20 roll.
    pub attack_roll: Roll,
    /// Natural d20 face.
    pub d20: u32,
    /// Connected.
    pub is_hit: bool,
    /// Natural face at or above the weapon's crit threshold.
    pub is_crit: bool,
    /// Natural face at or below the weapon's fumble threshold.
    pub is_fumble: bool,
    /// Outcome.
    pub outcome: AttackOutcome,
    /// Damage roll, on a hit.
    pub damage_roll: Option<Roll>,
    /// Target armor roll, on a hit against armor.
    pub reduction_roll: Option<Roll>,
    /// Damage inflicted after reduction, on a hit.
    pub damage: Option<i64>,
    /// Ammo bookkeeping.
    pub ammo: AmmoUsage,
    /// Stages passed through.
    pub stages: Vec<AttackStage>,
    /// Presentation payload.
    pub card: RollCard,
}

/// Hit rule: a total of exactly 1 always misses, a total of exactly 20
/// always hits, anything else must meet the DR.
pub fn is_hit(total: i64, modified_dr: i32) -> bool {
    total != 1 && (total == 20 || total >= i64::from(modified_dr))
}

/// Roll an attack and apply its consequences to `actor`.
pub fn resolve(
    actor: &mut Actor,
    config: &EngineConfig,
    setup: &AttackSetup,
    input: &AttackInput,
    rng: &mut dyn RandomSource,
) -> MechResult<AttackResolution> {
    if actor.item(setup.weapon_id).is_none() {
        return Err(MechError::ItemNotFound(setup.weapon_id));
    }
    let weapon = &setup.weapon;

    let attack_formula = Formula::parse(&setup.attack_formula())?;
    let damage_formula = Formula::parse(&weapon.damage_die)?;
    let armor_formula = input
        .target_armor
        .as_deref()
        .map(Formula::parse)
        .transpose()?;

    let breakdown = setup.breakdown.with_base(input.base_dr);
    let modified_dr = breakdown.modified_dr();
    let roll_data = actor.roll_data();
    let mut stages = vec![AttackStage::Configuring, AttackStage::RollingAttack];

    let attack_roll = attack_formula.evaluate(&roll_data, rng)?;
    let d20 = attack_roll.natural().unwrap_or(0);
    let is_fumble = d20 <= weapon.fumble_on;
    let is_crit = d20 >= weapon.crit_on;
    let hit = is_hit(attack_roll.total, modified_dr);

    let mut damage_roll = None;
    let mut reduction_roll = None;
    let mut damage = None;
    let outcome = if hit {
        stages.push(AttackStage::Hit);
        stages.push(AttackStage::RollingDamage);
        let formula = if is_crit {
            damage_formula.doubled()
        } else {
            damage_formula
        };
        let rolled = formula.evaluate(&roll_data, rng)?;
        let mut dealt = rolled.total;
        damage_roll = Some(rolled);

        if let Some(armor) = &armor_formula {
            stages.push(AttackStage::RollingReduction);
            let reduction = armor.evaluate(&RollData::new(), rng)?;
            dealt = dealt.saturating_sub(reduction.total).max(0);
            reduction_roll = Some(reduction);
        }
        damage = Some(dealt);
        if is_crit {
            AttackOutcome::Crit
        } else {
            AttackOutcome::Hit
        }
    } else {
        stages.push(AttackStage::Miss);
        if is_fumble {
            AttackOutcome::Fumble
        } else {
            AttackOutcome::Miss
        }
    };

    let ammo = consume_ammo(actor, config, weapon);
    actor
        .preferences
        .remember_attack(input.base_dr, input.target_armor.as_deref());
    stages.push(AttackStage::Resolved);

    tracing::debug!(
        actor = %actor.name,
        weapon = %setup.weapon_name,
        d20,
        total = attack_roll.total,
        modified_dr,
        ?outcome,
        ?damage,
        "attack resolved"
    );

    let mut card = RollCard::new(format!("{} Attack", weapon.weapon_type))
        .roll(format!("1d20 + {}", setup.ability.abbrev()), &attack_roll)
        .outcome(outcome.to_string())
        .item(setup.weapon_name.clone())
        .breakdown(&breakdown);
    if let Some(roll) = &damage_roll {
        card = card.roll("Damage", roll);
    }
    if let Some(roll) = &reduction_roll {
        card = card.roll("Target Armor", roll);
    }
    if let Some(dealt) = damage {
        card = card.damage(dealt);
    }

    Ok(AttackResolution {
        weapon_id: setup.weapon_id,
        modified_dr,
        attack_roll,
        d20,
        is_hit: hit,
        is_crit,
        is_fumble,
        outcome,
        damage_roll,
        reduction_roll,
        damage,
        ammo,
        stages,
        card,
    })
}

/// A plain attack roll without DR, outcome or damage, for tables that
/// adjudicate hits themselves. Ammo is still spent.
pub fn roll_unautomated_attack(
    actor: &mut Actor,
    config: &EngineConfig,
    weapon_id: ItemId,
    rng: &mut dyn RandomSource,
) -> MechResult<(Roll, AmmoUsage, RollCard)> {
    let item = actor
        .item(weapon_id)
        .ok_or(MechError::ItemNotFound(weapon_id))?;
    let weapon = item
        .weapon_data()
        .ok_or_else(|| MechError::NotAWeapon(item.name.clone()))?
        .clone();
    let weapon_name = item.name.clone();
    let ability = weapon.weapon_type.attack_ability();

    let roll = Formula::parse(&format!("1d20 + @{}", ability.roll_path()))?
        .evaluate(&actor.roll_data(), rng)?;
    let ammo = consume_ammo(actor, config, &weapon);

    let card = RollCard::new(format!("{} Attack", weapon.weapon_type))
        .roll(format!("1d20 + {}", ability.abbrev()), &roll)
        .item(weapon_name);
    Ok((roll, ammo, card))
}

/// Spend one round of the weapon's linked ammo. Runs on hits and misses.
fn consume_ammo(actor: &mut Actor, config: &EngineConfig, weapon: &WeaponData) -> AmmoUsage {
    if !weapon.uses_ammo || !config.track_ammo {
        return AmmoUsage::NotTracked;
    }
    let Some(ammo_id) = weapon.ammo_id else {
        return AmmoUsage::NotTracked;
    };
    let Some(quantity) = actor.item(ammo_id).map(|ammo| ammo.quantity) else {
        tracing::warn!(actor = %actor.name, ammo = %ammo_id, "linked ammo not found");
        return AmmoUsage::Missing(ammo_id);
    };

    let result = if quantity > 1 {
        actor
            .update_quantity(ammo_id, quantity - 1)
            .map(|()| AmmoUsage::Decremented {
                ammo: ammo_id,
                remaining: quantity - 1,
            })
    } else if config.delete_zero_quantity {
        actor.delete_item(ammo_id).map(|_| AmmoUsage::Depleted {
            ammo: ammo_id,
            deleted: true,
        })
    } else {
        actor.update_quantity(ammo_id, 0).map(|()| AmmoUsage::Depleted {
            ammo: ammo_id,
            deleted: false,
        })
    };

    result.unwrap_or_else(|err| {
        tracing::warn!(actor = %actor.name, ammo = %ammo_id, %err, "failed to update ammo");
        AmmoUsage::Missing(ammo_id)
    })
}
