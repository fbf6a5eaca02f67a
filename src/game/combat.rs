//! Battle phase resolution
//!
//! The active player's eligible creatures attack one at a time in field
//! order. Damage is exchanged immediately; deaths are collected by a single
//! sweep once every attacker has acted.

use crate::core::{EffectTrigger, FieldCard, InstanceId, Keyword, PlayerId};
use crate::game::action_log::{AttackTarget, DestroySource, EntityRef, GameAction};
use crate::game::card_hooks::CardHookRegistry;
use crate::game::effect_engine::EffectEngine;
use crate::game::tactics::choose_attack_target;
use crate::game::GameState;
use crate::rng::SeededRng;

/// Can this creature attack right now?
pub fn can_attack(hooks: &CardHookRegistry, fc: &FieldCard, state: &GameState) -> bool {
    if !fc.is_alive() || fc.is_stunned() || fc.has_attacked || fc.total_attack() <= 0 {
        return false;
    }
    // Summoning sickness
    if !fc.has_keyword(Keyword::Rush) && fc.summon_turn >= state.turn_number {
        return false;
    }
    hooks.can_attack(fc, state)
}

/// Creatures of `player` allowed to attack this turn, in field order
pub fn eligible_attackers(hooks: &CardHookRegistry, state: &GameState, player: PlayerId) -> Vec<InstanceId> {
    state
        .player(player)
        .field
        .iter()
        .filter(|fc| can_attack(hooks, fc, state))
        .map(|fc| fc.id())
        .collect()
}

/// Run every attack for the active player, then sweep the dead once
///
/// Returns how many attacks were made.
pub fn resolve_battle(engine: &EffectEngine<'_>, state: &mut GameState, rng: &mut SeededRng) -> usize {
    let active = state.current_player;
    let attackers = eligible_attackers(engine.hooks(), state, active);
    let mut attacks = 0;

    for id in attackers {
        // Earlier exchanges may have killed or removed it
        let Some(card) = state
            .player(active)
            .field_card(id)
            .filter(|fc| fc.is_alive())
            .map(|fc| fc.card.clone())
        else {
            continue;
        };

        engine.fire_card_trigger(state, rng, &card, active, EffectTrigger::OnAttack);

        let Some(attacker) = state
            .player(active)
            .field_card(id)
            .filter(|fc| fc.is_alive())
            .cloned()
        else {
            continue;
        };

        let target = choose_attack_target(&attacker, state, rng);
        strike(engine, state, rng, &attacker, target);
        attacks += 1;

        if let Some(fc) = state.player_mut(active).field_card_mut(id) {
            fc.has_attacked = true;
            fc.is_stealthed = false;
        }
    }

    engine.sweep_dead(state, rng, DestroySource::Combat);
    attacks
}

/// One attack from `attacker` into `target`
fn strike(
    engine: &EffectEngine<'_>,
    state: &mut GameState,
    rng: &mut SeededRng,
    attacker: &FieldCard,
    target: AttackTarget,
) {
    let controller = attacker.owner;
    let damage = attacker.total_attack();

    if attacker.has_keyword(Keyword::Lifesteal) && damage > 0 {
        let cap = state.config.initial_life;
        let player = state.player_mut(controller);
        let before = player.life;
        player.life = (before + damage).min(cap.max(before));
        let after = player.life;
        state.record(
            controller,
            GameAction::KeywordTrigger {
                card_id: attacker.id(),
                keyword: Keyword::Lifesteal,
                value: damage,
                entity: EntityRef::Player { id: controller },
                before,
                after,
            },
        );
    }

    match target {
        AttackTarget::Creature { id } => strike_creature(engine, state, rng, attacker, id, damage),
        AttackTarget::Player { id } => {
            let player = state.player_mut(id);
            let before = player.life;
            player.life -= damage;
            let after = player.life;
            log_if_verbose!(
                engine.logger(),
                Verbose,
                "combat",
                "{} hits {} for {} ({} -> {})",
                attacker.card.name,
                id,
                damage,
                before,
                after
            );
            state.record(
                controller,
                GameAction::CardAttack {
                    attacker_id: attacker.id(),
                    attacker_name: attacker.card.name.clone(),
                    target,
                    damage,
                    before,
                    after,
                },
            );
        }
    }
}

fn strike_creature(
    engine: &EffectEngine<'_>,
    state: &mut GameState,
    rng: &mut SeededRng,
    attacker: &FieldCard,
    defender_id: InstanceId,
    damage: i32,
) {
    let controller = attacker.owner;
    let Some(defender_owner) = state.owner_of(defender_id) else {
        return;
    };
    let poison_duration = state.config.poison_duration;
    let poison_damage = state.config.poison_damage;

    let Some(defender) = state.player_mut(defender_owner).field_card_mut(defender_id) else {
        return;
    };

    let mut poisoned = None;
    if attacker.has_keyword(Keyword::Poison) {
        let before = defender.replace_poison(poison_duration, poison_damage);
        poisoned = Some(before);
    }

    let before = defender.current_health;
    defender.current_health -= damage;
    let after = defender.current_health;
    let defender_card = defender.card.clone();

    if let Some(previous) = poisoned {
        state.record(
            controller,
            GameAction::KeywordTrigger {
                card_id: attacker.id(),
                keyword: Keyword::Poison,
                value: poison_damage,
                entity: EntityRef::Creature {
                    id: defender_id,
                    owner: defender_owner,
                },
                before: previous,
                after: poison_duration,
            },
        );
    }

    log_if_verbose!(
        engine.logger(),
        Verbose,
        "combat",
        "{} attacks {} for {} ({} -> {})",
        attacker.card.name,
        defender_card.name,
        damage,
        before,
        after
    );
    state.record(
        controller,
        GameAction::CardAttack {
            attacker_id: attacker.id(),
            attacker_name: attacker.card.name.clone(),
            target: AttackTarget::Creature { id: defender_id },
            damage,
            before,
            after,
        },
    );

    if damage > 0 {
        engine.fire_card_trigger(state, rng, &defender_card, defender_owner, EffectTrigger::OnDamageTaken);
    }
    counter_strike(engine, state, rng, attacker.id(), controller, defender_id);
}

/// The defender hits back at the attacker
///
/// Damage is exchanged simultaneously, so a defender the hit just killed
/// still strikes. The retaliate bonus needs the defender to have survived.
fn counter_strike(
    engine: &EffectEngine<'_>,
    state: &mut GameState,
    rng: &mut SeededRng,
    attacker_id: InstanceId,
    controller: PlayerId,
    defender_id: InstanceId,
) {
    let Some(defender) = state.find_field_card(defender_id) else {
        return;
    };
    let defender_owner = defender.owner;
    let base = defender.total_attack();
    let bonus = if defender.is_alive() && defender.has_keyword(Keyword::Retaliate) && base > 0 {
        (base + 1) / 2
    } else {
        0
    };
    let total = base + bonus;
    if total <= 0 {
        return;
    }

    let Some(attacker) = state.player_mut(controller).field_card_mut(attacker_id) else {
        return;
    };
    let before = attacker.current_health;
    attacker.current_health -= total;
    let after = attacker.current_health;
    let attacker_card = attacker.card.clone();
    let attacker_ref = EntityRef::Creature {
        id: attacker_id,
        owner: controller,
    };

    state.record(
        defender_owner,
        GameAction::CounterAttack {
            defender_id,
            attacker_id,
            damage: total,
            before,
            after,
        },
    );
    if bonus > 0 {
        state.record(
            defender_owner,
            GameAction::KeywordTrigger {
                card_id: defender_id,
                keyword: Keyword::Retaliate,
                value: bonus,
                entity: attacker_ref,
                before: before - base,
                after,
            },
        );
    }

    engine.fire_card_trigger(state, rng, &attacker_card, controller, EffectTrigger::OnDamageTaken);
}
