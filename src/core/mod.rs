//! Core game types and entities

pub mod card;
pub mod effects;
pub mod entity;
pub mod player;
pub mod types;

pub use card::{Card, CardType, FieldCard, Keyword, StatusEffect};
pub use effects::{
    CardEffect, EffectAction, EffectCondition, EffectTarget, EffectTrigger, SelectionFilter,
    TokenSpec,
};
pub use entity::{GameEntity, InstanceId};
pub use player::PlayerState;
pub use types::{Faction, PlayerId, TacticsType, TemplateId};
