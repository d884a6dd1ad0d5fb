use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ability::Ability;
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult};
use crate::item::{Item, ItemId, ItemKind};
use crate::preferences::ResolverPreferences;
use crate::roll_data::RollData;

/// Unique identifier for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Generate a new random actor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The kind of an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActorKind {
    /// A player character.
    #[default]
    Character,
    /// A monster or NPC.
    Creature,
    /// A hireling following a character.
    Follower,
    /// A stash of items.
    Container,
    /// The table's misery tracker.
    MiseryTracker,
    /// A vehicle. Defends with a flat d20 and its own armor formula.
    Carriage {
        /// Damage reduction formula of the carriage's hull.
        #[serde(default)]
        armor: String,
    },
}

impl ActorKind {
    /// Returns true for carriages.
    pub fn is_carriage(&self) -> bool {
        matches!(self, Self::Carriage { .. })
    }
}

/// A single ability score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    /// The score, usually -3 to +3.
    pub value: i32,
}

/// Omens: a small pool of re-rolls and favors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Omens {
    /// Omens left.
    pub value: i32,
    /// Omens at the start of the day.
    pub max: i32,
}

/// An actor: anything that owns items and rolls dice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    #[serde(default)]
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Kind and kind-specific data.
    #[serde(flatten)]
    pub kind: ActorKind,
    /// Ability scores keyed by ability key.
    #[serde(default, deserialize_with = "crate::ability::lowercase_keys")]
    pub abilities: BTreeMap<String, AbilityScore>,
    /// Owned items, in sheet order.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Omens.
    #[serde(default)]
    pub omens: Omens,
    /// Remembered resolver inputs.
    #[serde(default)]
    pub preferences: ResolverPreferences,
}

impl Actor {
    /// Create an actor with no abilities or items.
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            abilities: BTreeMap::new(),
            items: Vec::new(),
            omens: Omens::default(),
            preferences: ResolverPreferences::default(),
        }
    }

    /// Create a character with all four core abilities at zero.
    pub fn character(name: impl Into<String>) -> Self {
        let mut actor = Self::new(name, ActorKind::Character);
        for ability in [
            Ability::Strength,
            Ability::Agility,
            Ability::Presence,
            Ability::Toughness,
        ] {
            actor.set_ability(&ability, 0);
        }
        actor
    }

    /// Builder-style ability setter.
    pub fn with_ability(mut self, ability: &Ability, value: i32) -> Self {
        self.set_ability(ability, value);
        self
    }

    /// Builder-style item adder.
    pub fn with_item(mut self, item: Item) -> Self {
        self.add_item(item);
        self
    }

    /// Set an ability score.
    pub fn set_ability(&mut self, ability: &Ability, value: i32) {
        self.abilities
            .insert(ability.key().to_string(), AbilityScore { value });
    }

    /// Get an ability score, if the actor has it.
    pub fn ability(&self, ability: &Ability) -> Option<i32> {
        self.abilities.get(ability.key()).map(|a| a.value)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Add an item. Returns its ID.
    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Get an item by ID.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Get a mutable item by ID.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Find an item by name (case-insensitive).
    pub fn item_by_name(&self, name: &str) -> CoreResult<&Item> {
        let lower = name.to_lowercase();
        self.items
            .iter()
            .find(|i| i.name.to_lowercase() == lower)
            .ok_or_else(|| CoreError::ItemNameNotFound(name.to_string()))
    }

    /// Set an item's quantity.
    pub fn update_quantity(&mut self, id: ItemId, quantity: u32) -> CoreResult<()> {
        let item = self.item_mut(id).ok_or(CoreError::ItemNotFound(id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove an item from the actor.
    pub fn delete_item(&mut self, id: ItemId) -> CoreResult<Item> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::ItemNotFound(id))?;
        Ok(self.items.remove(index))
    }

    // -----------------------------------------------------------------------
    // Derived status
    // -----------------------------------------------------------------------

    /// The equipped armor with the highest current tier. Ties go to the
    /// name that sorts first, so the result never depends on item order.
    pub fn equipped_armor(&self) -> Option<&Item> {
        self.items
            .iter()
            .filter(|i| i.equipped)
            .filter_map(|i| i.armor_data().map(|a| (i, a.tier.value)))
            .min_by(|(a, a_tier), (b, b_tier)| {
                b_tier.cmp(a_tier).then_with(|| a.name.cmp(&b.name))
            })
            .map(|(item, _)| item)
    }

    /// The first equipped shield.
    pub fn equipped_shield(&self) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.equipped && matches!(i.kind, ItemKind::Shield))
    }

    /// The last class item, which decides the omen die.
    pub fn class_item(&self) -> Option<&Item> {
        self.items
            .iter()
            .rev()
            .find(|i| matches!(i.kind, ItemKind::Class { .. }))
    }

    /// Carrying capacity before becoming encumbered.
    pub fn normal_carrying_capacity(&self) -> i32 {
        self.ability(&Ability::Strength).unwrap_or(0) + 8
    }

    /// Absolute carrying limit.
    pub fn max_carrying_capacity(&self) -> i32 {
        2 * self.normal_carrying_capacity()
    }

    /// Total weight of carried equipment.
    pub fn carrying_weight(&self) -> u32 {
        self.items
            .iter()
            .filter(|i| i.is_equipment() && i.carried)
            .map(Item::total_carry_weight)
            .sum()
    }

    /// Returns true if the actor carries more than its normal capacity.
    /// Always false when carrying capacity is not tracked.
    pub fn is_encumbered(&self, config: &EngineConfig) -> bool {
        if !config.track_carrying_capacity {
            return false;
        }
        i64::from(self.carrying_weight()) > i64::from(self.normal_carrying_capacity())
    }

    /// Variables exposed to dice formulas.
    pub fn roll_data(&self) -> RollData {
        let mut data = RollData::new();
        for (key, score) in &self.abilities {
            data.insert(format!("abilities.{key}.value"), i64::from(score.value));
        }
        data.insert("omens.value", i64::from(self.omens.value));
        data.insert("omens.max", i64::from(self.omens.max));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::WeaponType;

    #[test]
    fn character_has_core_abilities() {
        let actor = Actor::character("Nyx");
        assert_eq!(actor.ability(&Ability::Strength), Some(0));
        assert_eq!(actor.ability(&Ability::Toughness), Some(0));
        assert_eq!(actor.ability(&Ability::Custom("speed".into())), None);
    }

    #[test]
    fn equipped_armor_prefers_highest_tier() {
        let actor = Actor::character("Nyx")
            .with_item(Item::armor("Leather", 1).equipped())
            .with_item(Item::armor("Plate", 3).equipped())
            .with_item(Item::armor("Chain", 2).equipped());
        assert_eq!(actor.equipped_armor().unwrap().name, "Plate");
    }

    #[test]
    fn equipped_armor_ignores_unequipped() {
        let actor = Actor::character("Nyx")
            .with_item(Item::armor("Plate", 3))
            .with_item(Item::armor("Leather", 1).equipped());
        assert_eq!(actor.equipped_armor().unwrap().name, "Leather");
    }

    #[test]
    fn equipped_armor_tie_breaks_by_name() {
        let forward = Actor::character("Nyx")
            .with_item(Item::armor("Scale", 2).equipped())
            .with_item(Item::armor("Brigandine", 2).equipped());
        let reverse = Actor::character("Nyx")
            .with_item(Item::armor("Brigandine", 2).equipped())
            .with_item(Item::armor("Scale", 2).equipped());
        assert_eq!(forward.equipped_armor().unwrap().name, "Brigandine");
        assert_eq!(reverse.equipped_armor().unwrap().name, "Brigandine");
    }

    #[test]
    fn no_armor() {
        let actor = Actor::character("Nyx").with_item(Item::new("Shield", ItemKind::Shield));
        assert!(actor.equipped_armor().is_none());
        assert!(actor.equipped_shield().is_none());
    }

    #[test]
    fn equipped_shield() {
        let actor = Actor::character("Nyx")
            .with_item(Item::new("Buckler", ItemKind::Shield))
            .with_item(Item::new("Tower", ItemKind::Shield).equipped());
        assert_eq!(actor.equipped_shield().unwrap().name, "Tower");
    }

    #[test]
    fn encumbrance() {
        let config = EngineConfig::default();
        let light = Actor::character("Nyx")
            .with_ability(&Ability::Strength, 1)
            .with_item(Item::new("Rope", ItemKind::Misc).with_weight(9));
        assert_eq!(light.normal_carrying_capacity(), 9);
        assert_eq!(light.max_carrying_capacity(), 18);
        assert!(!light.is_encumbered(&config));

        let heavy = light.with_item(Item::new("Anvil", ItemKind::Misc));
        assert_eq!(heavy.carrying_weight(), 10);
        assert!(heavy.is_encumbered(&config));
        assert!(!heavy.is_encumbered(&config.clone().with_track_carrying_capacity(false)));
    }

    #[test]
    fn uncarried_items_do_not_weigh() {
        let actor = Actor::character("Nyx")
            .with_item(Item::new("Chest", ItemKind::Container).with_weight(50).with_carried(false));
        assert_eq!(actor.carrying_weight(), 0);
    }

    #[test]
    fn update_and_delete_items() {
        let mut actor = Actor::character("Nyx");
        let id = actor.add_item(Item::new("Arrows", ItemKind::Ammo).with_quantity(5));
        actor.update_quantity(id, 4).unwrap();
        assert_eq!(actor.item(id).unwrap().quantity, 4);
        let removed = actor.delete_item(id).unwrap();
        assert_eq!(removed.name, "Arrows");
        assert!(actor.item(id).is_none());
        assert!(matches!(
            actor.delete_item(id),
            Err(CoreError::ItemNotFound(missing)) if missing == id
        ));
        assert!(actor.update_quantity(id, 1).is_err());
    }

    #[test]
    fn item_by_name_is_case_insensitive() {
        let actor = Actor::character("Nyx").with_item(Item::weapon(
            "Zweihander",
            WeaponType::Melee,
            "1d10",
        ));
        assert!(actor.item_by_name("zweihander").is_ok());
        assert!(actor.item_by_name("dagger").is_err());
    }

    #[test]
    fn roll_data_exposes_abilities_and_omens() {
        let mut actor = Actor::character("Nyx").with_ability(&Ability::Presence, -2);
        actor.omens = Omens { value: 2, max: 3 };
        let data = actor.roll_data();
        assert_eq!(data.get("abilities.presence.value"), Some(-2));
        assert_eq!(data.get("omens.value"), Some(2));
    }

    #[test]
    fn class_item_is_last_class() {
        let actor = Actor::character("Nyx")
            .with_item(Item::new("Wretch", ItemKind::Class { omen_die: "1d2".into() }))
            .with_item(Item::new("Hacker", ItemKind::Class { omen_die: "1d4".into() }));
        assert_eq!(actor.class_item().unwrap().name, "Hacker");
    }

    #[test]
    fn deserialize_carriage() {
        let actor: Actor = serde_json::from_str(
            r#"{
                "name": "The Rattler",
                "type": "carriage",
                "armor": "d4",
                "abilities": { "speed": { "value": 2 }, "stability": { "value": -1 } }
            }"#,
        )
        .unwrap();
        assert_eq!(
            actor.kind,
            ActorKind::Carriage {
                armor: "d4".to_string()
            }
        );
        assert!(actor.kind.is_carriage());
        assert_eq!(actor.ability(&Ability::Custom("stability".into())), Some(-1));
    }

    #[test]
    fn ability_keys_are_lowercased() {
        let actor: Actor = serde_json::from_str(
            r#"{
                "name": "The Rattler",
                "type": "carriage",
                "abilities": { "Speed": { "value": 3 }, "STRENGTH": { "value": 1 } }
            }"#,
        )
        .unwrap();
        let speed: Ability = "speed".parse().unwrap();
        assert_eq!(actor.ability(&speed), Some(3));
        assert_eq!(actor.ability(&Ability::Strength), Some(1));
        assert_eq!(actor.roll_data().get("abilities.speed.value"), Some(3));
    }
}
