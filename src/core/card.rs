//! Card types and definitions

use crate::core::{CardEffect, EffectTrigger, Faction, GameEntity, InstanceId, PlayerId, TemplateId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Creature,
    Spell,
}

/// Combat keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// Incoming attacks must target guards first
    Guard,
    /// May attack the turn it is summoned
    Rush,
    /// Untargetable by opposing attacks and random effects until it acts
    Stealth,
    /// Damage dealt heals the controller
    Lifesteal,
    /// Bonus return damage when struck and surviving
    Retaliate,
    /// Hits apply poison
    Poison,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Keyword::Guard => "guard",
            Keyword::Rush => "rush",
            Keyword::Stealth => "stealth",
            Keyword::Lifesteal => "lifesteal",
            Keyword::Retaliate => "retaliate",
            Keyword::Poison => "poison",
        };
        write!(f, "{name}")
    }
}

/// Represents a card in the game
///
/// Many instances can share one template. `id` identifies this instance,
/// `template_id` is used for catalog and behavior-hook lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique ID for this card instance (assigned when a deck is built)
    #[serde(default)]
    pub id: InstanceId,

    pub template_id: TemplateId,

    pub name: String,

    pub card_type: CardType,

    pub faction: Faction,

    /// Energy cost
    pub cost: u32,

    /// Base attack (creatures)
    #[serde(default)]
    pub attack: i32,

    /// Base health (creatures)
    #[serde(default)]
    pub health: i32,

    #[serde(default)]
    pub keywords: SmallVec<[Keyword; 2]>,

    #[serde(default)]
    pub effects: Vec<CardEffect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,
}

impl Card {
    pub fn new_creature(
        id: InstanceId,
        template_id: impl Into<TemplateId>,
        name: impl Into<String>,
        cost: u32,
        attack: i32,
        health: i32,
    ) -> Self {
        Card {
            id,
            template_id: template_id.into(),
            name: name.into(),
            card_type: CardType::Creature,
            faction: Faction::neutral(),
            cost,
            attack,
            health,
            keywords: SmallVec::new(),
            effects: Vec::new(),
            flavor_text: None,
        }
    }

    pub fn new_spell(
        id: InstanceId,
        template_id: impl Into<TemplateId>,
        name: impl Into<String>,
        cost: u32,
    ) -> Self {
        Card {
            id,
            template_id: template_id.into(),
            name: name.into(),
            card_type: CardType::Spell,
            faction: Faction::neutral(),
            cost,
            attack: 0,
            health: 0,
            keywords: SmallVec::new(),
            effects: Vec::new(),
            flavor_text: None,
        }
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_faction(mut self, faction: impl Into<Faction>) -> Self {
        self.faction = faction.into();
        self
    }

    /// Copy of this template with a fresh instance id
    pub fn instantiate(&self, id: InstanceId) -> Card {
        let mut card = self.clone();
        card.id = id;
        card
    }

    pub fn is_creature(&self) -> bool {
        self.card_type == CardType::Creature
    }

    pub fn is_spell(&self) -> bool {
        self.card_type == CardType::Spell
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Effects fired by the given trigger, in declaration order
    pub fn effects_for(&self, trigger: EffectTrigger) -> impl Iterator<Item = &CardEffect> {
        self.effects.iter().filter(move |e| e.trigger == trigger)
    }
}

impl GameEntity for Card {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Timed or persistent condition on a field card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEffect {
    Poison { duration: i32, damage: i32 },
    Stun { duration: i32 },
    /// Persists until cleared
    Branded,
}

impl StatusEffect {
    pub fn is_expired(&self) -> bool {
        match self {
            StatusEffect::Poison { duration, .. } | StatusEffect::Stun { duration } => {
                *duration <= 0
            }
            StatusEffect::Branded => false,
        }
    }
}

/// A creature in play with its runtime combat state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCard {
    pub card: Card,
    pub owner: PlayerId,
    pub current_health: i32,
    pub attack_modifier: i32,
    pub health_modifier: i32,
    /// Recomputed by every passive pass, never accumulated
    pub passive_attack_modifier: i32,
    pub passive_health_modifier: i32,
    pub summon_turn: u32,
    pub position: usize,
    pub has_attacked: bool,
    pub is_stealthed: bool,
    pub is_silenced: bool,
    pub status_effects: SmallVec<[StatusEffect; 2]>,
}

impl FieldCard {
    /// Place a creature card into play with base stats and zeroed modifiers
    pub fn new(card: Card, owner: PlayerId, summon_turn: u32, position: usize) -> Self {
        let is_stealthed = card.has_keyword(Keyword::Stealth);
        FieldCard {
            current_health: card.health,
            card,
            owner,
            attack_modifier: 0,
            health_modifier: 0,
            passive_attack_modifier: 0,
            passive_health_modifier: 0,
            summon_turn,
            position,
            has_attacked: false,
            is_stealthed,
            is_silenced: false,
            status_effects: SmallVec::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.card.id
    }

    /// Attack after modifiers, floored at 0
    pub fn total_attack(&self) -> i32 {
        (self.card.attack + self.attack_modifier + self.passive_attack_modifier).max(0)
    }

    pub fn max_health(&self) -> i32 {
        self.card.health + self.health_modifier + self.passive_health_modifier
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn is_damaged(&self) -> bool {
        self.current_health < self.max_health()
    }

    /// Keyword check that respects silence
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        !self.is_silenced && self.card.has_keyword(keyword)
    }

    pub fn is_stunned(&self) -> bool {
        self.status_effects
            .iter()
            .any(|s| matches!(s, StatusEffect::Stun { duration } if *duration > 0))
    }

    pub fn is_branded(&self) -> bool {
        self.status_effects.iter().any(|s| matches!(s, StatusEffect::Branded))
    }

    /// Replace any poison with a fresh one, returning the old remaining duration (0 if none)
    pub fn replace_poison(&mut self, duration: i32, damage: i32) -> i32 {
        let before = self
            .status_effects
            .iter()
            .find_map(|s| match s {
                StatusEffect::Poison { duration, .. } => Some(*duration),
                _ => None,
            })
            .unwrap_or(0);
        self.status_effects
            .retain(|s| !matches!(s, StatusEffect::Poison { .. }));
        self.status_effects.push(StatusEffect::Poison { duration, damage });
        before
    }

    /// Alive, unsilenced guard
    pub fn is_active_guard(&self) -> bool {
        self.is_alive() && self.has_keyword(Keyword::Guard)
    }
}

impl GameEntity for FieldCard {
    fn id(&self) -> InstanceId {
        self.card.id
    }

    fn name(&self) -> &str {
        &self.card.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt() -> Card {
        Card::new_creature(InstanceId::new(1), "grunt", "Grunt", 2, 2, 3)
    }

    #[test]
    fn test_field_card_starts_from_base_stats() {
        let fc = FieldCard::new(grunt(), PlayerId::Player1, 1, 0);
        assert_eq!(fc.current_health, 3);
        assert_eq!(fc.total_attack(), 2);
        assert_eq!(fc.max_health(), 3);
        assert!(!fc.is_stealthed);
        assert!(!fc.is_damaged());
    }

    #[test]
    fn test_total_attack_floors_at_zero() {
        let mut fc = FieldCard::new(grunt(), PlayerId::Player1, 1, 0);
        fc.attack_modifier = -5;
        assert_eq!(fc.total_attack(), 0);
    }

    #[test]
    fn test_stealth_keyword_enters_stealthed() {
        let card = grunt().with_keyword(Keyword::Stealth);
        let fc = FieldCard::new(card, PlayerId::Player2, 1, 0);
        assert!(fc.is_stealthed);
    }

    #[test]
    fn test_silence_disables_guard() {
        let mut fc = FieldCard::new(grunt().with_keyword(Keyword::Guard), PlayerId::Player1, 1, 0);
        assert!(fc.is_active_guard());
        fc.is_silenced = true;
        assert!(!fc.is_active_guard());
    }

    #[test]
    fn test_status_expiry() {
        assert!(StatusEffect::Stun { duration: 0 }.is_expired());
        assert!(!StatusEffect::Poison { duration: 1, damage: 1 }.is_expired());
        assert!(!StatusEffect::Branded.is_expired());
    }
}
