//! Target and condition resolution for card effects
//!
//! Declared target kinds expand to concrete creatures or players here. The
//! selection filter narrows the candidate set before any random pick, and the
//! declared kind on the effect is never rewritten.

use crate::core::{
    CardEffect, EffectAction, EffectCondition, EffectTarget, FieldCard, InstanceId, PlayerId,
    SelectionFilter,
};
use crate::game::GameState;
use crate::rng::SeededRng;

/// Concrete recipients of one effect execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    pub creatures: Vec<InstanceId>,
    pub players: Vec<PlayerId>,
}

impl ResolvedTargets {
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty() && self.players.is_empty()
    }
}

fn passes_filter(fc: &FieldCard, source_id: InstanceId, filter: Option<SelectionFilter>) -> bool {
    match filter {
        None => true,
        Some(SelectionFilter::ExcludeSelf) => fc.id() != source_id,
        Some(SelectionFilter::OnlyBranded) => fc.is_branded(),
        Some(SelectionFilter::OnlyDamaged) => fc.is_damaged(),
    }
}

/// Living creatures a board target could hit, after the selection filter
///
/// Random enemy picks skip stealthed creatures; area targets do not.
pub fn candidate_creatures(
    state: &GameState,
    source_id: InstanceId,
    controller: PlayerId,
    target: EffectTarget,
    filter: Option<SelectionFilter>,
) -> Vec<InstanceId> {
    let own = state.player(controller);
    let enemy = state.player(controller.opponent());

    let pool: Vec<&FieldCard> = match target {
        EffectTarget::SelfCard => state
            .find_field_card(source_id)
            .filter(|fc| fc.is_alive())
            .into_iter()
            .collect(),
        EffectTarget::AllyAll | EffectTarget::AllyRandom => own.living_creatures().collect(),
        EffectTarget::EnemyAll => enemy.living_creatures().collect(),
        EffectTarget::EnemyRandom => enemy
            .living_creatures()
            .filter(|fc| !fc.is_stealthed)
            .collect(),
        EffectTarget::AllCreatures => state
            .players
            .player1
            .living_creatures()
            .chain(state.players.player2.living_creatures())
            .collect(),
        EffectTarget::Player => Vec::new(),
    };

    pool.into_iter()
        .filter(|fc| passes_filter(fc, source_id, filter))
        .map(|fc| fc.id())
        .collect()
}

/// Players a player-level action (or a `player`-targeted one) applies to
pub fn player_targets(target: EffectTarget, action: EffectAction, controller: PlayerId) -> Vec<PlayerId> {
    match target {
        EffectTarget::Player => {
            if action.is_harmful() {
                vec![controller.opponent()]
            } else {
                vec![controller]
            }
        }
        EffectTarget::SelfCard | EffectTarget::AllyAll | EffectTarget::AllyRandom => vec![controller],
        EffectTarget::EnemyAll | EffectTarget::EnemyRandom => vec![controller.opponent()],
        EffectTarget::AllCreatures => vec![controller, controller.opponent()],
    }
}

/// Expand an effect's declared target into concrete recipients
pub fn resolve_targets(
    state: &GameState,
    rng: &mut SeededRng,
    source_id: InstanceId,
    controller: PlayerId,
    effect: &CardEffect,
) -> ResolvedTargets {
    if effect.action.is_player_level() {
        return ResolvedTargets {
            creatures: Vec::new(),
            players: player_targets(effect.target, effect.action, controller),
        };
    }

    if effect.target == EffectTarget::Player {
        return match effect.action {
            EffectAction::Damage | EffectAction::Heal => ResolvedTargets {
                creatures: Vec::new(),
                players: player_targets(effect.target, effect.action, controller),
            },
            // Board wipe aimed at a player clears that player's side
            EffectAction::DestroyAllCreatures => {
                let victim = controller.opponent();
                ResolvedTargets {
                    creatures: state.player(victim).living_creatures().map(|fc| fc.id()).collect(),
                    players: Vec::new(),
                }
            }
            _ => ResolvedTargets::default(),
        };
    }

    let candidates = candidate_creatures(
        state,
        source_id,
        controller,
        effect.target,
        effect.selection_filter,
    );

    let creatures = if effect.target.is_random() {
        rng.pick(&candidates).copied().into_iter().collect()
    } else {
        candidates
    };

    ResolvedTargets {
        creatures,
        players: Vec::new(),
    }
}

/// Evaluate an effect's gating predicate from the controller's point of view
pub fn condition_holds(state: &GameState, controller: PlayerId, condition: &EffectCondition) -> bool {
    let own = state.player(controller);
    let enemy = state.player(controller.opponent());
    match condition {
        EffectCondition::BrandedEnemiesAtLeast { count } => enemy.branded_count() >= *count,
        EffectCondition::GraveyardAtLeast { count } => own.graveyard.len() >= *count,
        EffectCondition::AlliesAtLeast { count } => own.living_creatures().count() >= *count,
        EffectCondition::EnemiesAtLeast { count } => enemy.living_creatures().count() >= *count,
        EffectCondition::LifeAtMost { life } => own.life <= *life,
        EffectCondition::All { conditions } => conditions
            .iter()
            .all(|c| condition_holds(state, controller, c)),
        EffectCondition::Any { conditions } => conditions
            .iter()
            .any(|c| condition_holds(state, controller, c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::core::{Card, EffectTrigger, Keyword, StatusEffect};
    use crate::game::GameSetup;

    fn state_with_board() -> GameState {
        let mut state = GameState::new(
            GameSetup::new("targeting", Vec::new(), Vec::new(), "seed"),
            GameConfig::default(),
        );
        let cards = [
            (PlayerId::Player1, Card::new_creature(InstanceId::new(1), "a", "Ally A", 1, 1, 3)),
            (PlayerId::Player1, Card::new_creature(InstanceId::new(2), "b", "Ally B", 1, 1, 3)),
            (PlayerId::Player2, Card::new_creature(InstanceId::new(3), "c", "Enemy C", 1, 1, 3)),
            (
                PlayerId::Player2,
                Card::new_creature(InstanceId::new(4), "d", "Enemy D", 1, 1, 3)
                    .with_keyword(Keyword::Stealth),
            ),
        ];
        for (owner, card) in cards {
            let player = state.player_mut(owner);
            let pos = player.field.len();
            player.field.push(FieldCard::new(card, owner, 1, pos));
        }
        state
    }

    #[test]
    fn test_exclude_self_filter() {
        let state = state_with_board();
        let ids = candidate_creatures(
            &state,
            InstanceId::new(1),
            PlayerId::Player1,
            EffectTarget::AllyAll,
            Some(SelectionFilter::ExcludeSelf),
        );
        assert_eq!(ids, vec![InstanceId::new(2)]);
    }

    #[test]
    fn test_random_enemy_skips_stealth_but_area_does_not() {
        let state = state_with_board();
        let random = candidate_creatures(&state, InstanceId::new(1), PlayerId::Player1, EffectTarget::EnemyRandom, None);
        assert_eq!(random, vec![InstanceId::new(3)]);

        let all = candidate_creatures(&state, InstanceId::new(1), PlayerId::Player1, EffectTarget::EnemyAll, None);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_dead_creatures_are_not_candidates() {
        let mut state = state_with_board();
        state.find_field_card_mut(InstanceId::new(3)).unwrap().current_health = 0;
        let all = candidate_creatures(&state, InstanceId::new(1), PlayerId::Player1, EffectTarget::AllCreatures, None);
        assert!(!all.contains(&InstanceId::new(3)));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_player_target_direction() {
        assert_eq!(
            player_targets(EffectTarget::Player, EffectAction::Damage, PlayerId::Player1),
            vec![PlayerId::Player2]
        );
        assert_eq!(
            player_targets(EffectTarget::Player, EffectAction::Heal, PlayerId::Player1),
            vec![PlayerId::Player1]
        );
    }

    #[test]
    fn test_filter_does_not_rewrite_declared_target() {
        let state = state_with_board();
        let effect = CardEffect::new(
            EffectTrigger::OnPlay,
            EffectTarget::AllyRandom,
            EffectAction::Heal,
            1,
        )
        .with_filter(SelectionFilter::OnlyBranded);
        let mut rng = SeededRng::new("t");
        let resolved = resolve_targets(&state, &mut rng, InstanceId::new(1), PlayerId::Player1, &effect);
        assert!(resolved.is_empty());
        assert_eq!(effect.target, EffectTarget::AllyRandom);
    }

    #[test]
    fn test_conditions() {
        let mut state = state_with_board();
        let branded = EffectCondition::BrandedEnemiesAtLeast { count: 1 };
        assert!(!condition_holds(&state, PlayerId::Player1, &branded));

        state
            .find_field_card_mut(InstanceId::new(3))
            .unwrap()
            .status_effects
            .push(StatusEffect::Branded);
        assert!(condition_holds(&state, PlayerId::Player1, &branded));

        let both = EffectCondition::All {
            conditions: vec![branded.clone(), EffectCondition::GraveyardAtLeast { count: 1 }],
        };
        assert!(!condition_holds(&state, PlayerId::Player1, &both));
        let either = EffectCondition::Any {
            conditions: vec![branded, EffectCondition::GraveyardAtLeast { count: 1 }],
        };
        assert!(condition_holds(&state, PlayerId::Player1, &either));
    }
}
