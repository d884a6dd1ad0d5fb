use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// An ability an actor can be tested on. Extensible via `Custom(String)`
/// for carriage stats (speed, stability) and table-specific additions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ability {
    /// Melee attacks, carrying capacity.
    Strength,
    /// Defense and dodging.
    Agility,
    /// Ranged attacks and willpower.
    Presence,
    /// Death and drop checks.
    Toughness,
    /// Any other ability, stored lower-cased.
    Custom(String),
}

impl Ability {
    /// The roll-data key of this ability (`abilities.<key>.value`).
    pub fn key(&self) -> &str {
        match self {
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Presence => "presence",
            Self::Toughness => "toughness",
            Self::Custom(name) => name,
        }
    }

    /// Short label used in modifier source names, e.g. `STR`.
    pub fn abbrev(&self) -> String {
        match self {
            Self::Strength => "STR".to_string(),
            Self::Agility => "AGI".to_string(),
            Self::Presence => "PRE".to_string(),
            Self::Toughness => "TOU".to_string(),
            Self::Custom(name) => name.chars().take(3).collect::<String>().to_uppercase(),
        }
    }

    /// Display label with the first letter capitalised.
    pub fn label(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Roll-data path of this ability's value.
    pub fn roll_path(&self) -> String {
        format!("abilities.{}.value", self.key())
    }
}

impl FromStr for Ability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "" => Err(CoreError::UnknownAbility(s.to_string())),
            "strength" | "str" => Ok(Self::Strength),
            "agility" | "agi" => Ok(Self::Agility),
            "presence" | "pre" => Ok(Self::Presence),
            "toughness" | "tou" => Ok(Self::Toughness),
            other => {
                if other
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    Ok(Self::Custom(other.to_string()))
                } else {
                    Err(CoreError::UnknownAbility(s.to_string()))
                }
            }
        }
    }
}

impl TryFrom<String> for Ability {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ability> for String {
    fn from(ability: Ability) -> Self {
        ability.key().to_string()
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Deserialize a map keyed by ability key, lower-casing the keys so they
/// match [`Ability::key`].
pub(crate) fn lowercase_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value))
        .collect())
}
