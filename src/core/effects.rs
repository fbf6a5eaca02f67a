//! Declarative card effects
//!
//! A card carries a list of `CardEffect` rules. Each rule names the event that
//! fires it, who it hits, what it does and by how much. The effect engine in
//! `game::effect_engine` interprets them.

use crate::core::Keyword;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Event that fires an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTrigger {
    OnPlay,
    OnDeath,
    OnAttack,
    OnDamageTaken,
    OnAllyDeath,
    TurnStart,
    TurnEnd,
    /// Continuous aura, recomputed rather than fired
    Passive,
    OnSpellPlay,
}

/// Declared target kind of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    #[serde(rename = "self")]
    SelfCard,
    AllyAll,
    AllyRandom,
    EnemyAll,
    EnemyRandom,
    AllCreatures,
    /// The opponent for harmful actions, the controller otherwise
    Player,
}

impl EffectTarget {
    /// Targets that resolve against creatures on the field
    pub fn is_board_target(self) -> bool {
        matches!(
            self,
            EffectTarget::AllyAll
                | EffectTarget::AllyRandom
                | EffectTarget::EnemyAll
                | EffectTarget::EnemyRandom
                | EffectTarget::AllCreatures
        )
    }

    pub fn is_random(self) -> bool {
        matches!(self, EffectTarget::AllyRandom | EffectTarget::EnemyRandom)
    }
}

/// What an effect does to each resolved target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectAction {
    Damage,
    Heal,
    BuffAttack,
    BuffHealth,
    DebuffAttack,
    DebuffHealth,
    Summon,
    DrawCard,
    Resurrect,
    Silence,
    Stun,
    ApplyPoison,
    ApplyBrand,
    ClearBrand,
    Banish,
    Destroy,
    DestroyAllCreatures,
    HandDiscard,
    SwapAttackHealth,
    GainEnergy,
}

impl EffectAction {
    /// Actions aimed at the opponent when the target is `player`
    pub fn is_harmful(self) -> bool {
        matches!(
            self,
            EffectAction::Damage
                | EffectAction::DebuffAttack
                | EffectAction::DebuffHealth
                | EffectAction::HandDiscard
                | EffectAction::Silence
                | EffectAction::Stun
                | EffectAction::ApplyPoison
                | EffectAction::ApplyBrand
                | EffectAction::Banish
                | EffectAction::Destroy
                | EffectAction::DestroyAllCreatures
        )
    }

    /// Actions that act on a player's zones or resources, not on creatures
    pub fn is_player_level(self) -> bool {
        matches!(
            self,
            EffectAction::Summon
                | EffectAction::DrawCard
                | EffectAction::Resurrect
                | EffectAction::HandDiscard
                | EffectAction::GainEnergy
        )
    }

    /// Rough worth of one point of `value` for card scoring
    pub fn weight(self) -> f64 {
        match self {
            EffectAction::Damage => 1.0,
            EffectAction::Heal => 0.5,
            EffectAction::BuffAttack | EffectAction::BuffHealth => 0.8,
            EffectAction::DebuffAttack | EffectAction::DebuffHealth => 0.7,
            EffectAction::Summon => 2.0,
            EffectAction::DrawCard => 1.5,
            EffectAction::Resurrect => 3.0,
            EffectAction::Silence => 1.5,
            EffectAction::Stun => 1.5,
            EffectAction::ApplyPoison => 1.0,
            EffectAction::ApplyBrand => 1.0,
            EffectAction::ClearBrand => 0.5,
            EffectAction::Banish => 4.0,
            EffectAction::Destroy => 3.5,
            EffectAction::DestroyAllCreatures => 5.0,
            EffectAction::HandDiscard => 1.2,
            EffectAction::SwapAttackHealth => 1.0,
            EffectAction::GainEnergy => 1.0,
        }
    }

    /// Actions whose magnitude ignores `value` (score as a flat single unit)
    pub fn is_flat(self) -> bool {
        matches!(
            self,
            EffectAction::Silence
                | EffectAction::ApplyBrand
                | EffectAction::ClearBrand
                | EffectAction::Banish
                | EffectAction::Destroy
                | EffectAction::DestroyAllCreatures
                | EffectAction::SwapAttackHealth
        )
    }
}

/// Board predicate that gates an effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectCondition {
    BrandedEnemiesAtLeast { count: usize },
    GraveyardAtLeast { count: usize },
    AlliesAtLeast { count: usize },
    EnemiesAtLeast { count: usize },
    LifeAtMost { life: i32 },
    All { conditions: Vec<EffectCondition> },
    Any { conditions: Vec<EffectCondition> },
}

/// Second-pass narrowing of the resolved target set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFilter {
    ExcludeSelf,
    OnlyBranded,
    OnlyDamaged,
}

/// Stats for creatures made by `summon`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub attack: i32,
    pub health: i32,
    #[serde(default)]
    pub keywords: SmallVec<[Keyword; 2]>,
}

impl Default for TokenSpec {
    fn default() -> Self {
        TokenSpec {
            name: "Token".to_string(),
            attack: 1,
            health: 1,
            keywords: SmallVec::new(),
        }
    }
}

/// One declarative rule attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEffect {
    pub trigger: EffectTrigger,
    pub target: EffectTarget,
    pub action: EffectAction,
    #[serde(default)]
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<EffectCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_filter: Option<SelectionFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenSpec>,
}

impl CardEffect {
    pub fn new(
        trigger: EffectTrigger,
        target: EffectTarget,
        action: EffectAction,
        value: i32,
    ) -> Self {
        CardEffect {
            trigger,
            target,
            action,
            value,
            condition: None,
            selection_filter: None,
            token: None,
        }
    }

    pub fn with_condition(mut self, condition: EffectCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_filter(mut self, filter: SelectionFilter) -> Self {
        self.selection_filter = Some(filter);
        self
    }

    pub fn with_token(mut self, token: TokenSpec) -> Self {
        self.token = Some(token);
        self
    }
}
