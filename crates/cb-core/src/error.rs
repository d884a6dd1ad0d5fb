use crate::item::ItemId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when reading or mutating actors and items.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested item ID does not exist on the actor.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// No item with the given name is owned by the actor.
    #[error("no item named \"{0}\"")]
    ItemNameNotFound(String),

    /// An ability name could not be parsed.
    #[error("unknown ability: \"{0}\"")]
    UnknownAbility(String),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
