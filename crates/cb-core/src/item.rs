use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ability::Ability;

/// Unique identifier for every item an actor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Melee or ranged. Decides which ability an attack rolls with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    /// Uses strength.
    #[default]
    Melee,
    /// Uses presence.
    Ranged,
}

impl WeaponType {
    /// The ability attacks with this weapon type are rolled with.
    pub fn attack_ability(self) -> Ability {
        match self {
            Self::Melee => Ability::Strength,
            Self::Ranged => Ability::Presence,
        }
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Melee => write!(f, "Melee"),
            Self::Ranged => write!(f, "Ranged"),
        }
    }
}

/// Weapon-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponData {
    /// Melee or ranged.
    pub weapon_type: WeaponType,
    /// Natural d20 at or below this is a fumble.
    pub fumble_on: u32,
    /// Natural d20 at or above this is a critical.
    pub crit_on: u32,
    /// Damage formula, e.g. `1d6+1`.
    pub damage_die: String,
    /// Whether attacking consumes the linked ammo.
    pub uses_ammo: bool,
    /// The linked ammo item, if any.
    pub ammo_id: Option<ItemId>,
}

impl Default for WeaponData {
    fn default() -> Self {
        Self {
            weapon_type: WeaponType::Melee,
            fumble_on: 1,
            crit_on: 20,
            damage_die: "1d4".to_string(),
            uses_ammo: false,
            ammo_id: None,
        }
    }
}

/// Current and maximum armor tier. Damage lowers `value`; `max` is the
/// armor's rating when intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tier {
    /// Current tier (selects the damage reduction die).
    pub value: u32,
    /// Intact tier (selects the DR penalties).
    pub max: u32,
}

/// Armor-specific data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorData {
    /// Tier rating.
    pub tier: Tier,
}

/// How a carriage upgrade attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeAttackMode {
    /// Not an attack.
    #[default]
    None,
    /// `d20 + speed`.
    Speed,
    /// The upgrade's own formula.
    Custom,
}

/// Attack configuration of a carriage upgrade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeAttack {
    /// Attack mode.
    pub mode: UpgradeAttackMode,
    /// Formula for [`UpgradeAttackMode::Custom`].
    pub formula: Option<String>,
    /// Flavor text shown with the roll.
    pub chat: Option<String>,
}

/// Carriage-upgrade-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarriageUpgradeData {
    /// How the upgrade attacks.
    pub attack: UpgradeAttack,
    /// Using the upgrade spends one of its quantity.
    pub consumable: bool,
}

/// The kind of an item, with the data only that kind carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ItemKind {
    /// A weapon.
    Weapon(WeaponData),
    /// Body armor.
    Armor(ArmorData),
    /// A shield (adds 1 to damage reduction).
    Shield,
    /// Arrows, bolts, stones.
    Ammo,
    /// A feat or special ability.
    Feat,
    /// Miscellaneous equipment.
    Misc,
    /// A scroll or tablet.
    Scroll,
    /// A bag or other container.
    Container,
    /// A character class.
    Class {
        /// Formula rolled to set the actor's omens.
        #[serde(default = "default_omen_die")]
        omen_die: String,
    },
    /// An upgrade installed on a carriage.
    CarriageUpgrade(CarriageUpgradeData),
    /// A carriage class.
    CarriageClass,
}

fn default_omen_die() -> String {
    "1d2".to_string()
}

impl ItemKind {
    /// The kind's type tag as stored in documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Weapon(_) => "weapon",
            Self::Armor(_) => "armor",
            Self::Shield => "shield",
            Self::Ammo => "ammo",
            Self::Feat => "feat",
            Self::Misc => "misc",
            Self::Scroll => "scroll",
            Self::Container => "container",
            Self::Class { .. } => "class",
            Self::CarriageUpgrade(_) => "carriage-upgrade",
            Self::CarriageClass => "carriage-class",
        }
    }

    /// Returns true for kinds that count as carried equipment.
    pub fn is_equipment(&self) -> bool {
        match self {
            Self::Weapon(_)
            | Self::Armor(_)
            | Self::Shield
            | Self::Ammo
            | Self::Misc
            | Self::Scroll
            | Self::Container => true,
            Self::Feat | Self::Class { .. } | Self::CarriageUpgrade(_) | Self::CarriageClass => {
                false
            }
        }
    }
}

/// Flat DR modifiers an item applies to attack and defense rolls.
/// Take precedence over the item's ability DR modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatModifiers {
    /// Modifier to attack DR.
    pub attack: i32,
    /// Modifier to defense DR.
    pub defense: i32,
}

/// An item owned by an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier for this item.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Kind and kind-specific data.
    #[serde(flatten)]
    pub kind: ItemKind,
    /// Worn or wielded.
    #[serde(default)]
    pub equipped: bool,
    /// On the actor's person (not stashed in a container).
    #[serde(default = "default_true")]
    pub carried: bool,
    /// Stack size.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Carry weight per unit. Defaults to 1 for equipment and 0 otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// DR modifiers keyed by ability key, applied to tests of that ability.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "crate::ability::lowercase_keys"
    )]
    pub dr_modifiers: BTreeMap<String, i32>,
    /// DR modifiers for attack and defense rolls.
    #[serde(default)]
    pub combat_modifiers: CombatModifiers,
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

impl Item {
    /// Create a carried, unequipped item of the given kind.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            equipped: false,
            carried: true,
            quantity: 1,
            weight: None,
            dr_modifiers: BTreeMap::new(),
            combat_modifiers: CombatModifiers::default(),
        }
    }

    /// Create a weapon with the given damage formula.
    pub fn weapon(name: impl Into<String>, weapon_type: WeaponType, damage_die: &str) -> Self {
        Self::new(
            name,
            ItemKind::Weapon(WeaponData {
                weapon_type,
                damage_die: damage_die.to_string(),
                ..WeaponData::default()
            }),
        )
    }

    /// Create armor rated at `tier` (current and max).
    pub fn armor(name: impl Into<String>, tier: u32) -> Self {
        Self::new(
            name,
            ItemKind::Armor(ArmorData {
                tier: Tier {
                    value: tier,
                    max: tier,
                },
            }),
        )
    }

    /// Mark the item equipped.
    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    /// Set whether the item is carried.
    pub fn with_carried(mut self, carried: bool) -> Self {
        self.carried = carried;
        self
    }

    /// Set the stack size.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the per-unit carry weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Add an ability DR modifier.
    pub fn with_dr_modifier(mut self, ability: &Ability, value: i32) -> Self {
        self.dr_modifiers.insert(ability.key().to_string(), value);
        self
    }

    /// Set the attack and defense combat modifiers.
    pub fn with_combat_modifiers(mut self, attack: i32, defense: i32) -> Self {
        self.combat_modifiers = CombatModifiers { attack, defense };
        self
    }

    /// Weapon data, if this item is a weapon.
    pub fn weapon_data(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable weapon data, if this item is a weapon.
    pub fn weapon_data_mut(&mut self) -> Option<&mut WeaponData> {
        match &mut self.kind {
            ItemKind::Weapon(data) => Some(data),
            _ => None,
        }
    }

    /// Armor data, if this item is armor.
    pub fn armor_data(&self) -> Option<&ArmorData> {
        match &self.kind {
            ItemKind::Armor(data) => Some(data),
            _ => None,
        }
    }

    /// Returns true if this item is carried equipment.
    pub fn is_equipment(&self) -> bool {
        self.kind.is_equipment()
    }

    /// The ability DR modifier for `ability`, or 0.
    pub fn dr_modifier(&self, ability: &Ability) -> i32 {
        self.dr_modifiers.get(ability.key()).copied().unwrap_or(0)
    }

    /// Total carry weight of the stack.
    pub fn total_carry_weight(&self) -> u32 {
        let per_unit = self
            .weight
            .unwrap_or(if self.is_equipment() { 1 } else { 0 });
        per_unit.saturating_mul(self.quantity.max(1))
    }
}
