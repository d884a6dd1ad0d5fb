//! Error types for the mechanics engine.

use cb_core::{CoreError, ItemId};

/// Errors that can occur while rolling or resolving.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A formula failed to parse or evaluate.
    #[error("invalid formula '{formula}': {message}")]
    Formula {
        /// The formula source text.
        formula: String,
        /// What went wrong.
        message: String,
    },

    /// A formula referenced a variable missing from the roll data.
    #[error("formula '{formula}' references unknown variable @{variable}")]
    UnresolvedVariable {
        /// The formula source text.
        formula: String,
        /// The variable path, without the `@`.
        variable: String,
    },

    /// User input was rejected before any dice were rolled.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced item does not exist on the actor.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The item an attack was made with is not a weapon.
    #[error("'{0}' is not a weapon")]
    NotAWeapon(String),

    /// The item used is not a carriage upgrade.
    #[error("'{0}' is not a carriage upgrade")]
    NotAnUpgrade(String),

    /// An error from the data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MechError {
    pub(crate) fn formula(formula: &str, message: impl Into<String>) -> Self {
        Self::Formula {
            formula: formula.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
