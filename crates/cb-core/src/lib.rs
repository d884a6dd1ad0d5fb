//! Core types for the Crys-Borg rules engine: actors, items, and abilities.
//!
//! This crate defines the data the resolution engine reads and mutates. It
//! knows nothing about dice; you can build an [`Actor`] programmatically or
//! deserialize one from JSON.

/// Named abilities (strength, agility, presence, toughness, custom).
pub mod ability;
/// Actors: characters, creatures, carriages and their derived status.
pub mod actor;
/// The static armor tier table.
pub mod armor;
/// Engine-wide toggles passed explicitly into every resolver.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// Items and their per-kind data.
pub mod item;
/// Typed per-actor memory of the last resolver inputs.
pub mod preferences;
/// Variable context for dice formulas.
pub mod roll_data;

/// Re-export ability types.
pub use ability::Ability;
/// Re-export actor types.
pub use actor::{AbilityScore, Actor, ActorId, ActorKind, Omens};
/// Re-export armor tier types.
pub use armor::{ArmorTier, armor_tier};
/// Re-export configuration.
pub use config::EngineConfig;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export item types.
pub use item::{
    ArmorData, CarriageUpgradeData, CombatModifiers, Item, ItemId, ItemKind, Tier, UpgradeAttack,
    UpgradeAttackMode, WeaponData, WeaponType,
};
/// Re-export preferences.
pub use preferences::ResolverPreferences;
/// Re-export roll data.
pub use roll_data::RollData;
