use serde::{Deserialize, Serialize};

/// Table-wide toggles that change how resolutions behave.
///
/// Passed explicitly into every resolver; nothing reads ambient settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resolve attacks and defenses against a DR with outcomes and damage.
    /// When off, only the bare d20 roll is made.
    pub hit_automation: bool,
    /// Decrement linked ammo when a weapon that uses ammo attacks.
    pub track_ammo: bool,
    /// Derive encumbrance from carried weight vs. carrying capacity.
    pub track_carrying_capacity: bool,
    /// Delete stackable items whose quantity reaches zero instead of
    /// keeping them at zero.
    pub delete_zero_quantity: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_automation: true,
            track_ammo: true,
            track_carrying_capacity: true,
            delete_zero_quantity: true,
        }
    }
}

impl EngineConfig {
    /// Builder-style setter for [`EngineConfig::hit_automation`].
    pub fn with_hit_automation(mut self, enabled: bool) -> Self {
        self.hit_automation = enabled;
        self
    }

    /// Builder-style setter for [`EngineConfig::track_ammo`].
    pub fn with_track_ammo(mut self, enabled: bool) -> Self {
        self.track_ammo = enabled;
        self
    }

    /// Builder-style setter for [`EngineConfig::track_carrying_capacity`].
    pub fn with_track_carrying_capacity(mut self, enabled: bool) -> Self {
        self.track_carrying_capacity = enabled;
        self
    }

    /// Builder-style setter for [`EngineConfig::delete_zero_quantity`].
    pub fn with_delete_zero_quantity(mut self, enabled: bool) -> Self {
        self.delete_zero_quantity = enabled;
        self
    }
}
