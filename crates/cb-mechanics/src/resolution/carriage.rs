//! Carriage upgrades that attack.

use cb_core::{Ability, Actor, ItemId, ItemKind, UpgradeAttackMode};

use crate::dice::{RandomSource, Roll};
use crate::error::{MechError, MechResult};
use crate::formula::Formula;

use super::card::RollCard;

/// Result of using an attacking upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeUse {
    /// The attack roll; absent for custom upgrades with only flavor text.
    pub roll: Option<Roll>,
    /// Flavor shown with the roll.
    pub flavor: String,
    /// Quantity left, for consumable upgrades.
    pub remaining: Option<u32>,
    /// Presentation payload.
    pub card: RollCard,
}

/// Use a carriage upgrade. Speed attacks roll `1d20 + speed`; custom
/// attacks roll the upgrade's own formula. Consumable upgrades lose one of
/// their quantity, never going below zero. Upgrades that do not attack
/// return `None` and change nothing.
pub fn upgrade_attack(
    actor: &mut Actor,
    item_id: ItemId,
    rng: &mut dyn RandomSource,
) -> MechResult<Option<UpgradeUse>> {
    let item = actor.item(item_id).ok_or(MechError::ItemNotFound(item_id))?;
    let ItemKind::CarriageUpgrade(upgrade) = &item.kind else {
        return Err(MechError::NotAnUpgrade(item.name.clone()));
    };

    let (formula, flavor) = match upgrade.attack.mode {
        UpgradeAttackMode::None => return Ok(None),
        UpgradeAttackMode::Speed => (
            Some(format!(
                "1d20 + @{}",
                Ability::Custom("speed".to_string()).roll_path()
            )),
            item.name.clone(),
        ),
        UpgradeAttackMode::Custom => (
            upgrade
                .attack
                .formula
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            upgrade
                .attack
                .chat
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| item.name.clone()),
        ),
    };
    let consumable = upgrade.consumable;
    let quantity = item.quantity;
    let name = item.name.clone();

    let roll = formula
        .map(|f| Formula::parse(&f)?.evaluate(&actor.roll_data(), rng))
        .transpose()?;

    let remaining = if consumable {
        let left = quantity.saturating_sub(1);
        actor.update_quantity(item_id, left)?;
        Some(left)
    } else {
        None
    };

    tracing::debug!(
        actor = %actor.name,
        upgrade = %name,
        total = roll.as_ref().map(|r| r.total),
        ?remaining,
        "upgrade used"
    );

    let mut card = RollCard::new(flavor.clone()).item(name);
    if let Some(roll) = &roll {
        card = card.roll("Attack", roll);
    }
    Ok(Some(UpgradeUse {
        roll,
        flavor,
        remaining,
        card,
    }))
}
