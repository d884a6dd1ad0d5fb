use serde::{Deserialize, Serialize};

/// Base DR offered when an actor has never attacked or defended.
pub const DEFAULT_DR: i32 = 12;
/// Incoming attack formula offered when none was remembered.
pub const DEFAULT_INCOMING_ATTACK: &str = "1d4";

/// The last inputs an actor used for attack and defend resolutions.
///
/// Only used to prefill the next resolution; never affects outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPreferences {
    /// Last base DR used for an attack.
    pub attack_dr: Option<i32>,
    /// Last target armor formula used for an attack.
    pub target_armor: Option<String>,
    /// Last base DR used for a defense.
    pub defend_dr: Option<i32>,
    /// Last incoming attack formula used for a defense.
    pub incoming_attack: Option<String>,
}

impl ResolverPreferences {
    /// Base attack DR to prefill. Zero or missing falls back to the default.
    pub fn attack_dr(&self) -> i32 {
        self.attack_dr.filter(|dr| *dr != 0).unwrap_or(DEFAULT_DR)
    }

    /// Target armor formula to prefill, if one was remembered.
    pub fn target_armor(&self) -> Option<&str> {
        self.target_armor.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Base defend DR to prefill. Zero or missing falls back to the default.
    pub fn defend_dr(&self) -> i32 {
        self.defend_dr.filter(|dr| *dr != 0).unwrap_or(DEFAULT_DR)
    }

    /// Incoming attack formula to prefill.
    pub fn incoming_attack(&self) -> &str {
        self.incoming_attack
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_INCOMING_ATTACK)
    }

    /// Remember the inputs of a completed attack.
    pub fn remember_attack(&mut self, base_dr: i32, target_armor: Option<&str>) {
        self.attack_dr = Some(base_dr);
        self.target_armor = target_armor.map(str::to_string);
    }

    /// Remember the inputs of a completed defense.
    pub fn remember_defend(&mut self, base_dr: i32, incoming_attack: &str) {
        self.defend_dr = Some(base_dr);
        self.incoming_attack = Some(incoming_attack.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let prefs = ResolverPreferences::default();
        assert_eq!(prefs.attack_dr(), 12);
        assert_eq!(prefs.defend_dr(), 12);
        assert_eq!(prefs.target_armor(), None);
        assert_eq!(prefs.incoming_attack(), "1d4");
    }

    #[test]
    fn zero_dr_falls_back_to_default() {
        let prefs = ResolverPreferences {
            attack_dr: Some(0),
            ..ResolverPreferences::default()
        };
        assert_eq!(prefs.attack_dr(), 12);
    }

    #[test]
    fn remember_roundtrip() {
        let mut prefs = ResolverPreferences::default();
        prefs.remember_attack(14, Some("d4"));
        prefs.remember_defend(10, "1d8");
        assert_eq!(prefs.attack_dr(), 14);
        assert_eq!(prefs.target_armor(), Some("d4"));
        assert_eq!(prefs.defend_dr(), 10);
        assert_eq!(prefs.incoming_attack(), "1d8");
    }

    #[test]
    fn blank_strings_are_ignored() {
        let prefs = ResolverPreferences {
            target_armor: Some("  ".to_string()),
            incoming_attack: Some(String::new()),
            ..ResolverPreferences::default()
        };
        assert_eq!(prefs.target_armor(), None);
        assert_eq!(prefs.incoming_attack(), "1d4");
    }
}
