//! Roll cards: the presentation payload of a resolution.

use serde::{Deserialize, Serialize};

use crate::dice::{DieResult, Roll};
use crate::modifiers::{DrBreakdown, DrSource, DrSourceKind};

/// One titled roll on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRoll {
    /// What the roll was for, e.g. `Damage`.
    pub title: String,
    /// Formula rolled.
    pub formula: String,
    /// Result.
    pub total: i64,
    /// Faces drawn.
    pub dice: Vec<DieResult>,
}

/// Everything a front end needs to show a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCard {
    /// Card heading, e.g. `Melee Attack`.
    pub title: String,
    /// Rolls in the order they were made.
    pub rolls: Vec<CardRoll>,
    /// Outcome line, absent for plain rolls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Final damage after reduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i64>,
    /// DR the roll was made against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_dr: Option<i32>,
    /// Names of items involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    /// DR sources, base first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dr_sources: Vec<DrSource>,
}

impl RollCard {
    /// Start a card.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Append a roll.
    pub fn roll(mut self, title: impl Into<String>, roll: &Roll) -> Self {
        self.rolls.push(CardRoll {
            title: title.into(),
            formula: roll.formula.clone(),
            total: roll.total,
            dice: roll.dice.clone(),
        });
        self
    }

    /// Set the outcome line.
    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    /// Set the final damage.
    pub fn damage(mut self, damage: i64) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Attach a DR breakdown. Items behind the sources are listed too.
    pub fn breakdown(mut self, breakdown: &DrBreakdown) -> Self {
        self.modified_dr = Some(breakdown.modified_dr());
        self.dr_sources = breakdown.sources.clone();
        for source in breakdown.modifiers().filter(|s| s.item.is_some()) {
            let name = match source.kind {
                DrSourceKind::Ability => source
                    .name
                    .rsplit_once(" (")
                    .map_or(source.name.as_str(), |(name, _)| name),
                _ => source.name.as_str(),
            };
            self = self.item(name);
        }
        self
    }

    /// List an item, once.
    pub fn item(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.items.contains(&name) {
            self.items.push(name);
        }
        self
    }
}
