//! DR modifier aggregation.
//!
//! Collects every source that shifts the difficulty of a roll: armor, the
//! encumbrance penalty and item modifiers. Each item contributes at most one
//! entry per roll; a non-zero combat modifier wins over the item's ability
//! modifier.

use serde::{Deserialize, Serialize};

use cb_core::{Ability, Actor, EngineConfig, Item, ItemId, armor_tier};

/// Name of the synthetic base entry.
pub const BASE_SOURCE: &str = "Base DR";
/// Name of the encumbrance entry.
pub const ENCUMBERED_SOURCE: &str = "Encumbered";
/// DR penalty for being encumbered.
pub const ENCUMBERED_PENALTY: i32 = 2;

/// What kind of roll the DR is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrCategory {
    /// An attack roll.
    Attack,
    /// A defense roll.
    Defense,
    /// A test of one ability.
    Ability(Ability),
}

impl DrCategory {
    fn combat_modifier(&self, item: &Item) -> i32 {
        match self {
            Self::Attack => item.combat_modifiers.attack,
            Self::Defense => item.combat_modifiers.defense,
            Self::Ability(_) => 0,
        }
    }
}

/// Where a DR entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrSourceKind {
    /// The base DR chosen for the roll.
    Base,
    /// The worn armor's defense penalty.
    Armor,
    /// Carrying too much.
    Encumbered,
    /// An item's combat modifier.
    Combat,
    /// An item's ability modifier.
    Ability,
}

/// One line of a DR breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrSource {
    /// Display name, e.g. `Chain Mail` or `Ring of Rot (AGI)`.
    pub name: String,
    /// Signed modifier.
    pub value: i32,
    /// Kind of source.
    pub kind: DrSourceKind,
    /// The item behind the entry, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemId>,
}

/// Ordered DR sources plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrBreakdown {
    /// Base entry first, then modifiers in discovery order.
    pub sources: Vec<DrSource>,
    /// Sum of every entry except the base.
    pub total: i32,
}

impl DrBreakdown {
    /// The base DR.
    pub fn base(&self) -> i32 {
        self.sources
            .iter()
            .find(|s| s.kind == DrSourceKind::Base)
            .map_or(0, |s| s.value)
    }

    /// Base DR plus all modifiers.
    pub fn modified_dr(&self) -> i32 {
        self.base().saturating_add(self.total)
    }

    /// Entries other than the base.
    pub fn modifiers(&self) -> impl Iterator<Item = &DrSource> {
        self.sources.iter().filter(|s| s.kind != DrSourceKind::Base)
    }

    /// The same modifiers around a different base DR.
    pub fn with_base(&self, base_dr: i32) -> Self {
        let mut rebased = self.clone();
        for source in &mut rebased.sources {
            if source.kind == DrSourceKind::Base {
                source.value = base_dr;
            }
        }
        rebased
    }
}

/// Inputs for [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrRequest {
    /// Base DR; `0` for ability tests.
    pub base_dr: i32,
    /// Kind of roll.
    pub category: DrCategory,
    /// Ability whose item DR modifiers apply.
    pub primary_ability: Option<Ability>,
    /// The item the roll is made with; counted first.
    pub focus: Option<ItemId>,
}

impl DrRequest {
    /// Request for an ability test.
    pub fn ability(ability: Ability) -> Self {
        Self {
            base_dr: 0,
            category: DrCategory::Ability(ability.clone()),
            primary_ability: Some(ability),
            focus: None,
        }
    }
}

struct Collector<'a> {
    sources: Vec<DrSource>,
    request: &'a DrRequest,
}

impl Collector<'_> {
    fn push(&mut self, name: String, value: i32, kind: DrSourceKind, item: Option<ItemId>) {
        if value != 0 {
            self.sources.push(DrSource {
                name,
                value,
                kind,
                item,
            });
        }
    }

    /// Adds the item's single entry: its combat modifier if non-zero,
    /// otherwise its primary-ability modifier.
    fn push_item(&mut self, item: &Item) {
        let combat = self.request.category.combat_modifier(item);
        if combat != 0 {
            self.push(item.name.clone(), combat, DrSourceKind::Combat, Some(item.id));
            return;
        }
        if let Some(ability) = &self.request.primary_ability {
            let value = item.dr_modifier(ability);
            self.push(
                format!("{} ({})", item.name, ability.abbrev()),
                value,
                DrSourceKind::Ability,
                Some(item.id),
            );
        }
    }
}

/// Gather the DR sources for a roll.
///
/// Never fails: absent armor, items or modifiers simply add nothing.
pub fn aggregate(actor: &Actor, config: &EngineConfig, request: &DrRequest) -> DrBreakdown {
    let mut collector = Collector {
        sources: vec![DrSource {
            name: BASE_SOURCE.to_string(),
            value: request.base_dr,
            kind: DrSourceKind::Base,
            item: None,
        }],
        request,
    };

    if request.category == DrCategory::Defense {
        if let Some(armor) = actor.equipped_armor() {
            let max_tier = armor.armor_data().map_or(0, |a| a.tier.max);
            collector.push(
                armor.name.clone(),
                armor_tier(max_tier).defense_modifier,
                DrSourceKind::Armor,
                Some(armor.id),
            );
        }
        if actor.is_encumbered(config) {
            collector.push(
                ENCUMBERED_SOURCE.to_string(),
                ENCUMBERED_PENALTY,
                DrSourceKind::Encumbered,
                None,
            );
        }
    }

    let focus = request.focus.and_then(|id| actor.item(id));
    if let Some(item) = focus {
        collector.push_item(item);
    }

    for item in actor
        .items
        .iter()
        .filter(|i| i.carried && Some(i.id) != request.focus)
    {
        collector.push_item(item);
    }

    let sources = collector.sources;
    let total = sources
        .iter()
        .filter(|s| s.kind != DrSourceKind::Base)
        .map(|s| s.value)
        .fold(0, i32::saturating_add);

    tracing::debug!(
        actor = %actor.name,
        category = ?request.category,
        base = request.base_dr,
        total,
        sources = sources.len(),
        "aggregated DR"
    );

    DrBreakdown { sources, total }
}
