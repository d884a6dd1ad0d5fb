//! Roll results.

use serde::{Deserialize, Serialize};

use super::Die;

/// The result of rolling a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    /// The type of die that was rolled.
    pub die: Die,
    /// The value rolled (1 to die.sides()).
    pub value: u32,
}

/// An evaluated formula: the total and every die face drawn, in order.
///
/// Rolls are ephemeral; only what a resolver derives from them is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// The formula as evaluated, e.g. `1d20 + @abilities.strength.value`.
    pub formula: String,
    /// The evaluated total.
    pub total: i64,
    /// Individual die results, in evaluation order.
    pub dice: Vec<DieResult>,
}

impl Roll {
    /// The natural face of the first die rolled, before modifiers.
    /// `None` for formulas without dice.
    pub fn natural(&self) -> Option<u32> {
        self.dice.first().map(|d| d.value)
    }
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.dice.iter().map(|d| d.value.to_string()).collect();
        write!(f, "{} [{}] = {}", self.formula, values.join(", "), self.total)
    }
}
