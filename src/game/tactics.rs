//! Heuristic AI for automatic play
//!
//! Scores hand cards for the greedy deploy loop and picks attack targets.
//! Scoring is additive: cost efficiency, then a bias for the player's
//! tactics profile, then a large penalty for spells whose targeted effects
//! would currently whiff.

use crate::core::{
    Card, EffectAction, EffectTrigger, FieldCard, InstanceId, Keyword, PlayerId, TacticsType,
};
use crate::game::action_log::AttackTarget;
use crate::game::targeting::candidate_creatures;
use crate::game::GameState;
use crate::rng::SeededRng;

/// Subtracted from a card whose board-targeted effect has no legal target
pub const TARGET_PENALTY: f64 = 1000.0;

/// Candidates scoring at or below this are never played
pub const WHIFF_THRESHOLD: f64 = -500.0;

/// Floor for a playable card's score before the penalty
const MIN_BASELINE: f64 = 0.1;

/// Total magnitude of a card's effects, weighted by action kind
fn effect_magnitude(card: &Card) -> f64 {
    card.effects
        .iter()
        .filter(|e| e.trigger != EffectTrigger::Passive || card.is_creature())
        .map(|e| {
            let units = if e.action.is_flat() {
                1.0
            } else {
                f64::from(e.value.max(1))
            };
            units * e.action.weight()
        })
        .sum()
}

fn magnitude_of(card: &Card, actions: &[EffectAction]) -> f64 {
    card.effects
        .iter()
        .filter(|e| actions.contains(&e.action))
        .map(|e| f64::from(e.value.max(1)) * e.action.weight())
        .sum()
}

fn cost_efficiency(card: &Card) -> f64 {
    let cost = f64::from(card.cost.max(1));
    if card.is_creature() {
        let stats = f64::from(card.attack + card.health);
        (stats + 0.5 * effect_magnitude(card)) / cost
    } else {
        effect_magnitude(card) / cost
    }
}

fn tactics_bias(card: &Card, tactics: TacticsType, state: &GameState, player_id: PlayerId) -> f64 {
    let mut bias = 0.0;
    match tactics {
        TacticsType::Aggressive => {
            if card.is_creature() {
                bias += 0.5 * f64::from(card.attack);
                if card.has_keyword(Keyword::Rush) {
                    bias += 1.0;
                }
            }
            bias += 0.5 * magnitude_of(card, &[EffectAction::Damage, EffectAction::BuffAttack]);
        }
        TacticsType::Defensive => {
            if card.is_creature() {
                bias += 0.5 * f64::from(card.health);
                if card.has_keyword(Keyword::Guard) {
                    bias += 1.5;
                }
            }
            let protective = magnitude_of(card, &[EffectAction::Heal, EffectAction::BuffHealth]);
            bias += 0.5 * protective;
            // Under pressure, lean harder on protection
            let player = state.player(player_id);
            if player.life * 2 <= state.config.initial_life {
                bias += 0.5 * protective + if card.has_keyword(Keyword::Guard) { 1.0 } else { 0.0 };
            }
        }
        TacticsType::Tempo => {
            let cheapness = 5.0 - f64::from(card.cost);
            bias += 0.4 * cheapness.max(0.0);
            if card.has_keyword(Keyword::Rush) {
                bias += 0.5;
            }
        }
        TacticsType::Balanced => {
            bias += 0.5 * cost_efficiency(card);
        }
    }
    bias
}

/// Can every on-play effect that targets the board find at least one target?
///
/// Effects aimed at `self` or a player, and player-level actions like
/// summon or draw, always count as resolvable.
pub fn can_effect_find_valid_targets(card: &Card, state: &GameState, player_id: PlayerId) -> bool {
    card.effects_for(EffectTrigger::OnPlay)
        .filter(|e| e.target.is_board_target() && !e.action.is_player_level())
        .all(|e| {
            !candidate_creatures(state, card.id, player_id, e.target, e.selection_filter).is_empty()
        })
}

/// Heuristic play score for `card` in `player_id`'s hand
///
/// Creatures always keep a positive score. Spells get `TARGET_PENALTY`
/// subtracted when a targeted on-play effect would whiff.
pub fn evaluate_card_for_play(card: &Card, state: &GameState, player_id: PlayerId) -> f64 {
    let tactics = state.player(player_id).tactics;
    let mut score = cost_efficiency(card) + tactics_bias(card, tactics, state, player_id);
    score = score.max(MIN_BASELINE);

    if card.is_spell() && !can_effect_find_valid_targets(card, state, player_id) {
        score -= TARGET_PENALTY;
    }
    score
}

/// Is `card` affordable and legal to put down right now?
pub fn is_playable(card: &Card, state: &GameState, player_id: PlayerId) -> bool {
    let player = state.player(player_id);
    if card.cost > player.energy {
        return false;
    }
    !card.is_creature() || player.field.len() < state.config.field_limit
}

/// Hand index of the best play, if any clears the whiff threshold
///
/// Ties keep the earliest hand position.
pub fn select_card_to_play(state: &GameState, player_id: PlayerId) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, card) in state.player(player_id).hand.iter().enumerate() {
        if !is_playable(card, state, player_id) {
            continue;
        }
        let score = evaluate_card_for_play(card, state, player_id);
        if score <= WHIFF_THRESHOLD {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Board value of a creature, used to pick the juiciest kill
pub fn creature_value(fc: &FieldCard) -> i32 {
    let mut value = 80;
    value += fc.total_attack() * 15;
    value += fc.current_health * 10;
    value += fc.card.cost as i32 * 5;

    if fc.has_keyword(Keyword::Guard) {
        value += 10;
    }
    if fc.has_keyword(Keyword::Lifesteal) {
        value += fc.total_attack() * 10;
    }
    if fc.has_keyword(Keyword::Poison) {
        value += 15;
    }
    if fc.has_keyword(Keyword::Retaliate) {
        value += fc.total_attack() * 5;
    }
    if !fc.card.effects.is_empty() && !fc.is_silenced {
        value += 10 * fc.card.effects.len() as i32;
    }
    value
}

/// First candidate with the highest key
fn best_by(cands: &[&FieldCard], key: impl Fn(&FieldCard) -> i32) -> Option<InstanceId> {
    let mut best: Option<(InstanceId, i32)> = None;
    for fc in cands {
        let k = key(fc);
        match best {
            Some((_, top)) if k <= top => {}
            _ => best = Some((fc.id(), k)),
        }
    }
    best.map(|(id, _)| id)
}

/// Pick what `attacker` hits
///
/// Alive, unsilenced guards on the other side force a uniform random pick
/// among them. Otherwise the controller's tactics decide among visible
/// enemy creatures, falling back to the opposing player.
pub fn choose_attack_target(attacker: &FieldCard, state: &GameState, rng: &mut SeededRng) -> AttackTarget {
    let opponent = attacker.owner.opponent();
    let enemy = state.player(opponent);
    let face = AttackTarget::Player { id: opponent };

    let guards: Vec<InstanceId> = enemy
        .field
        .iter()
        .filter(|fc| fc.is_active_guard())
        .map(|fc| fc.id())
        .collect();
    if let Some(id) = rng.pick(&guards) {
        return AttackTarget::Creature { id: *id };
    }

    let visible: Vec<&FieldCard> = enemy
        .living_creatures()
        .filter(|fc| !fc.is_stealthed)
        .collect();
    let attack = attacker.total_attack();
    let killable: Vec<&FieldCard> = visible
        .iter()
        .copied()
        .filter(|fc| fc.current_health <= attack)
        .collect();

    let choice = match state.player(attacker.owner).tactics {
        TacticsType::Aggressive => None,
        TacticsType::Defensive => best_by(&killable, |fc| fc.total_attack()),
        TacticsType::Tempo => {
            let clean: Vec<&FieldCard> = killable
                .iter()
                .copied()
                .filter(|fc| fc.total_attack() < attacker.current_health)
                .collect();
            best_by(&clean, |fc| fc.total_attack())
        }
        TacticsType::Balanced => best_by(&killable, creature_value),
    };

    match choice {
        Some(id) => AttackTarget::Creature { id },
        None => face,
    }
}
