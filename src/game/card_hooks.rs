//! Per-template behavior hooks
//!
//! A few cards bend the generic rules: one may only attack while its side is
//! behind on life, others scale their effect magnitude with the board. Those
//! rules live here, keyed by template id, so the engine never matches on
//! literal card names.

use crate::core::{CardEffect, FieldCard, InstanceId, PlayerId, TemplateId};
use crate::game::GameState;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Where an effect is being executed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectContext {
    pub controller: PlayerId,
    pub source_id: InstanceId,
}

/// Custom rules for one card template
///
/// Both methods default to the generic behavior, so a hook only overrides
/// what it changes.
pub trait CardBehavior: Send + Sync {
    /// Additional gate on top of the normal attack eligibility rules
    fn can_attack(&self, _attacker: &FieldCard, _state: &GameState) -> bool {
        true
    }

    /// Magnitude of `effect` at execution time
    fn resolve_value(&self, effect: &CardEffect, _ctx: EffectContext, _state: &GameState) -> i32 {
        effect.value
    }
}

/// May only attack while its controller has strictly less life than the opponent
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingLifeGate;

impl CardBehavior for TrailingLifeGate {
    fn can_attack(&self, attacker: &FieldCard, state: &GameState) -> bool {
        let own = state.player(attacker.owner).life;
        let theirs = state.player(attacker.owner.opponent()).life;
        own < theirs
    }
}

/// Board quantity a dynamic value counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueBasis {
    /// Living allies other than the source
    Allies,
    /// Cards in the controller's graveyard
    Graveyard,
    /// Living branded enemy creatures
    BrandedEnemies,
}

/// Adds `per_unit` to the printed value for every counted unit
#[derive(Debug, Clone, Copy)]
pub struct DynamicValue {
    pub basis: ValueBasis,
    pub per_unit: i32,
}

impl DynamicValue {
    fn count(&self, ctx: EffectContext, state: &GameState) -> usize {
        let own = state.player(ctx.controller);
        match self.basis {
            ValueBasis::Allies => own
                .living_creatures()
                .filter(|fc| fc.id() != ctx.source_id)
                .count(),
            ValueBasis::Graveyard => own.graveyard.len(),
            ValueBasis::BrandedEnemies => state.player(ctx.controller.opponent()).branded_count(),
        }
    }
}

impl CardBehavior for DynamicValue {
    fn resolve_value(&self, effect: &CardEffect, ctx: EffectContext, state: &GameState) -> i32 {
        effect.value + self.per_unit * self.count(ctx, state) as i32
    }
}

/// Template id to behavior lookup
#[derive(Clone, Default)]
pub struct CardHookRegistry {
    hooks: FxHashMap<TemplateId, Arc<dyn CardBehavior>>,
}

impl CardHookRegistry {
    /// Registry with no hooks; every card follows the generic rules
    pub fn empty() -> Self {
        CardHookRegistry {
            hooks: FxHashMap::default(),
        }
    }

    /// Registry with the built-in special cards
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("desperate_raider", TrailingLifeGate);
        registry.register(
            "legion_banneret",
            DynamicValue {
                basis: ValueBasis::Allies,
                per_unit: 1,
            },
        );
        registry.register(
            "grave_tide",
            DynamicValue {
                basis: ValueBasis::Graveyard,
                per_unit: 1,
            },
        );
        registry.register(
            "brand_reaper",
            DynamicValue {
                basis: ValueBasis::BrandedEnemies,
                per_unit: 2,
            },
        );
        registry
    }

    pub fn register(&mut self, template_id: impl Into<TemplateId>, hook: impl CardBehavior + 'static) {
        self.hooks.insert(template_id.into(), Arc::new(hook));
    }

    pub fn get(&self, template_id: &TemplateId) -> Option<&Arc<dyn CardBehavior>> {
        self.hooks.get(template_id)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn can_attack(&self, attacker: &FieldCard, state: &GameState) -> bool {
        match self.get(&attacker.card.template_id) {
            Some(hook) => hook.can_attack(attacker, state),
            None => true,
        }
    }

    pub fn resolve_value(
        &self,
        template_id: &TemplateId,
        effect: &CardEffect,
        ctx: EffectContext,
        state: &GameState,
    ) -> i32 {
        match self.get(template_id) {
            Some(hook) => hook.resolve_value(effect, ctx, state),
            None => effect.value,
        }
    }
}

impl std::fmt::Debug for CardHookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.hooks.keys().map(TemplateId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("CardHookRegistry").field("templates", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::core::{Card, EffectAction, EffectTarget, EffectTrigger, StatusEffect};
    use crate::game::GameSetup;

    fn empty_state() -> GameState {
        GameState::new(
            GameSetup::new("hooks", Vec::new(), Vec::new(), "seed"),
            GameConfig::default(),
        )
    }

    fn place(state: &mut GameState, owner: PlayerId, card: Card) -> InstanceId {
        let id = card.id;
        let player = state.player_mut(owner);
        let pos = player.field.len();
        player.field.push(FieldCard::new(card, owner, 1, pos));
        id
    }

    #[test]
    fn test_trailing_life_gate() {
        let mut state = empty_state();
        let raider = Card::new_creature(InstanceId::new(1), "desperate_raider", "Raider", 2, 3, 2);
        place(&mut state, PlayerId::Player1, raider);
        let registry = CardHookRegistry::with_defaults();

        let fc = state.player(PlayerId::Player1).field[0].clone();
        assert!(!registry.can_attack(&fc, &state));

        state.player_mut(PlayerId::Player1).life = 7;
        assert!(registry.can_attack(&fc, &state));
    }

    #[test]
    fn test_unregistered_cards_pass_through() {
        let state = empty_state();
        let registry = CardHookRegistry::with_defaults();
        let effect = CardEffect::new(EffectTrigger::OnPlay, EffectTarget::EnemyAll, EffectAction::Damage, 3);
        let ctx = EffectContext {
            controller: PlayerId::Player1,
            source_id: InstanceId::new(1),
        };
        assert_eq!(
            registry.resolve_value(&TemplateId::new("ember_scout"), &effect, ctx, &state),
            3
        );
    }

    #[test]
    fn test_ally_scaling_excludes_source() {
        let mut state = empty_state();
        let banneret = Card::new_creature(InstanceId::new(1), "legion_banneret", "Banneret", 3, 2, 2);
        let source = place(&mut state, PlayerId::Player1, banneret);
        place(&mut state, PlayerId::Player1, Card::new_creature(InstanceId::new(2), "grunt", "Grunt", 1, 1, 1));
        place(&mut state, PlayerId::Player1, Card::new_creature(InstanceId::new(3), "grunt", "Grunt", 1, 1, 1));

        let effect = CardEffect::new(EffectTrigger::OnPlay, EffectTarget::AllyAll, EffectAction::BuffAttack, 1);
        let ctx = EffectContext {
            controller: PlayerId::Player1,
            source_id: source,
        };
        let registry = CardHookRegistry::with_defaults();
        assert_eq!(
            registry.resolve_value(&TemplateId::new("legion_banneret"), &effect, ctx, &state),
            3
        );
    }

    #[test]
    fn test_branded_enemy_scaling() {
        let mut state = empty_state();
        let id = place(
            &mut state,
            PlayerId::Player2,
            Card::new_creature(InstanceId::new(5), "grunt", "Grunt", 1, 1, 1),
        );
        state
            .find_field_card_mut(id)
            .unwrap()
            .status_effects
            .push(StatusEffect::Branded);

        let effect = CardEffect::new(EffectTrigger::OnPlay, EffectTarget::Player, EffectAction::Damage, 1);
        let ctx = EffectContext {
            controller: PlayerId::Player1,
            source_id: InstanceId::new(9),
        };
        let registry = CardHookRegistry::with_defaults();
        assert_eq!(
            registry.resolve_value(&TemplateId::new("brand_reaper"), &effect, ctx, &state),
            3
        );
    }
}
