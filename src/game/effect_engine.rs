//! Card effect execution
//!
//! Resolves trigger events against cards, runs each matching effect through
//! condition check, dynamic value lookup, target expansion and action, and
//! records one `effect_trigger` entry per effect that changed something.

use crate::core::{
    Card, CardEffect, EffectAction, EffectTrigger, FieldCard, InstanceId, PlayerId, StatusEffect,
    TemplateId,
};
use crate::game::action_log::{
    Attribute, DestroySource, EffectSource, EntityChange, EntityRef, GameAction, TickKind,
};
use crate::game::card_hooks::{CardHookRegistry, EffectContext};
use crate::game::targeting::{candidate_creatures, condition_holds, resolve_targets};
use crate::game::{GameLogger, GameState};
use crate::rng::SeededRng;
use rustc_hash::FxHashMap;

/// Upper bound on chained death waves from one effect resolution
const MAX_DEATH_WAVES: usize = 16;

fn raw_attack(fc: &FieldCard) -> i32 {
    fc.card.attack + fc.attack_modifier + fc.passive_attack_modifier
}

/// Interprets card effects against a game state
///
/// Borrows the hook registry and logger; all game data flows through the
/// `&mut GameState` passed to each call.
pub struct EffectEngine<'a> {
    hooks: &'a CardHookRegistry,
    logger: &'a GameLogger,
}

impl<'a> EffectEngine<'a> {
    pub fn new(hooks: &'a CardHookRegistry, logger: &'a GameLogger) -> Self {
        EffectEngine { hooks, logger }
    }

    pub fn hooks(&self) -> &CardHookRegistry {
        self.hooks
    }

    pub fn logger(&self) -> &GameLogger {
        self.logger
    }

    /// Dispatch a trigger event
    ///
    /// With a `source` card only that card fires. Without one, every living
    /// creature of `player` (default: the active player) fires, except
    /// `event_card`. `passive` recomputes auras instead of firing.
    pub fn process_effect_trigger(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        trigger: EffectTrigger,
        source: Option<&Card>,
        player: Option<PlayerId>,
        event_card: Option<InstanceId>,
    ) {
        if trigger == EffectTrigger::Passive {
            self.apply_passive_effects(state);
            return;
        }

        if let Some(card) = source {
            let controller = player
                .or_else(|| state.owner_of(card.id))
                .unwrap_or(state.current_player);
            self.fire_card_trigger(state, rng, card, controller, trigger);
            return;
        }

        let player = player.unwrap_or(state.current_player);
        let ids: Vec<InstanceId> = state
            .player(player)
            .living_creatures()
            .map(|fc| fc.id())
            .filter(|id| Some(*id) != event_card)
            .collect();

        for id in ids {
            // Earlier firings may have killed or removed this card
            let card = match state.player(player).field_card(id) {
                Some(fc) if fc.is_alive() => fc.card.clone(),
                _ => continue,
            };
            self.fire_card_trigger(state, rng, &card, player, trigger);
        }
    }

    /// Run every effect on `card` that matches `trigger`
    ///
    /// Silenced field cards never fire. When at least one effect changes
    /// something, one `trigger_event` is logged ahead of the effect entries;
    /// a firing where every effect is a no-op leaves the log untouched.
    pub fn fire_card_trigger(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        card: &Card,
        controller: PlayerId,
        trigger: EffectTrigger,
    ) {
        if !card.effects.iter().any(|e| e.trigger == trigger) {
            return;
        }
        if state
            .find_field_card(card.id)
            .is_some_and(|fc| fc.is_silenced)
        {
            return;
        }

        let effects: Vec<CardEffect> = card.effects_for(trigger).cloned().collect();
        let mut outcomes = Vec::with_capacity(effects.len());
        for effect in &effects {
            if let Some(outcome) = self.apply_effect(state, rng, card, controller, effect) {
                outcomes.push(outcome);
            }
        }
        if outcomes.is_empty() {
            return;
        }

        log_if_verbose!(self.logger, Verbose, "effect", "{} triggers on {:?}", card.name, trigger);
        state.record(
            controller,
            GameAction::TriggerEvent {
                card_id: card.id,
                card_name: card.name.clone(),
                trigger,
            },
        );
        for outcome in outcomes {
            state.record(controller, outcome);
        }
    }

    /// Execute a single effect; returns whether anything changed
    pub fn execute_effect(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        source: &Card,
        controller: PlayerId,
        effect: &CardEffect,
    ) -> bool {
        match self.apply_effect(state, rng, source, controller, effect) {
            Some(outcome) => {
                state.record(controller, outcome);
                true
            }
            None => false,
        }
    }

    /// Apply one effect and build its `effect_trigger` entry without logging it
    ///
    /// Returns None when the condition fails, no target exists or nothing changed.
    fn apply_effect(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        source: &Card,
        controller: PlayerId,
        effect: &CardEffect,
    ) -> Option<GameAction> {
        if let Some(condition) = &effect.condition {
            if !condition_holds(state, controller, condition) {
                return None;
            }
        }

        let ctx = EffectContext {
            controller,
            source_id: source.id,
        };
        let value = self
            .hooks
            .resolve_value(&source.template_id, effect, ctx, state);

        let targets = resolve_targets(state, rng, source.id, controller, effect);
        if targets.is_empty() {
            return None;
        }

        let mut changes = Vec::new();
        for pid in &targets.players {
            self.apply_to_player(state, rng, *pid, effect, value, &mut changes);
        }
        for id in &targets.creatures {
            self.apply_to_creature(state, *id, effect.action, value, &mut changes);
        }

        if changes.is_empty() {
            return None;
        }

        log_if_verbose!(
            self.logger,
            Verbose,
            "effect",
            "{} {:?} ({}) changed {} value(s)",
            source.name,
            effect.action,
            value,
            changes.len()
        );
        Some(GameAction::EffectTrigger {
            source: EffectSource::Card {
                id: source.id,
                name: source.name.clone(),
            },
            action: effect.action,
            value,
            changes,
        })
    }

    fn apply_to_player(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        pid: PlayerId,
        effect: &CardEffect,
        value: i32,
        changes: &mut Vec<EntityChange>,
    ) {
        let entity = EntityRef::Player { id: pid };
        let hand_limit = state.config.hand_limit;
        let life_cap = state.config.initial_life;

        match effect.action {
            EffectAction::Damage => {
                if value <= 0 {
                    return;
                }
                let player = state.player_mut(pid);
                let before = player.life;
                player.life -= value;
                push_change(changes, entity, Attribute::Life, before, player.life);
            }
            EffectAction::Heal => {
                if value <= 0 {
                    return;
                }
                let player = state.player_mut(pid);
                let before = player.life;
                player.life = (player.life + value).min(life_cap.max(before));
                push_change(changes, entity, Attribute::Life, before, player.life);
            }
            EffectAction::GainEnergy => {
                let player = state.player_mut(pid);
                let before = player.energy as i32;
                let after = (before + value.max(0)).min(player.max_energy as i32);
                player.energy = after as u32;
                push_change(changes, entity, Attribute::Energy, before, after);
            }
            EffectAction::DrawCard => {
                let player = state.player_mut(pid);
                let before = player.hand.len() as i32;
                for _ in 0..value.max(1) {
                    if player.hand.len() >= hand_limit {
                        break;
                    }
                    match player.deck.pop() {
                        Some(card) => player.hand.push(card),
                        None => break,
                    }
                }
                push_change(changes, entity, Attribute::HandSize, before, player.hand.len() as i32);
            }
            EffectAction::HandDiscard => {
                let player = state.player_mut(pid);
                let before = player.hand.len() as i32;
                for _ in 0..value.max(1) {
                    if player.hand.is_empty() {
                        break;
                    }
                    let idx = rng.next_index(player.hand.len());
                    let card = player.hand.remove(idx);
                    player.graveyard.push(card);
                }
                push_change(changes, entity, Attribute::HandSize, before, player.hand.len() as i32);
            }
            EffectAction::Summon => self.summon_tokens(state, pid, effect, value, changes),
            EffectAction::Resurrect => self.resurrect(state, pid, value, changes),
            _ => {}
        }
    }

    /// Put `value` tokens (at least one) onto `pid`'s field; a full field stops it
    fn summon_tokens(
        &self,
        state: &mut GameState,
        pid: PlayerId,
        effect: &CardEffect,
        value: i32,
        changes: &mut Vec<EntityChange>,
    ) {
        let spec = effect.token.clone().unwrap_or_default();
        let field_limit = state.config.field_limit;
        let turn = state.turn_number;

        for _ in 0..value.max(1) {
            if state.player(pid).field.len() >= field_limit {
                break;
            }
            let id = state.next_instance_id();
            let faction = state.player(pid).faction.clone();
            let mut card = Card::new_creature(
                id,
                TemplateId::token(),
                spec.name.clone(),
                0,
                spec.attack,
                spec.health,
            )
            .with_faction(faction);
            card.keywords = spec.keywords.clone();

            let player = state.player_mut(pid);
            let position = player.field.len();
            player.field.push(FieldCard::new(card, pid, turn, position));
            push_change(
                changes,
                EntityRef::Creature { id, owner: pid },
                Attribute::OnField,
                0,
                1,
            );
        }
    }

    /// Return the most recent creatures from the graveyard at full health
    fn resurrect(&self, state: &mut GameState, pid: PlayerId, value: i32, changes: &mut Vec<EntityChange>) {
        let field_limit = state.config.field_limit;
        let turn = state.turn_number;
        let player = state.player_mut(pid);

        for _ in 0..value.max(1) {
            if player.field.len() >= field_limit {
                break;
            }
            let Some(idx) = player.graveyard.iter().rposition(|c| c.is_creature()) else {
                break;
            };
            let card = player.graveyard.remove(idx);
            let id = card.id;
            let position = player.field.len();
            player.field.push(FieldCard::new(card, pid, turn, position));
            push_change(
                changes,
                EntityRef::Creature { id, owner: pid },
                Attribute::OnField,
                0,
                1,
            );
        }
    }

    fn apply_to_creature(
        &self,
        state: &mut GameState,
        id: InstanceId,
        action: EffectAction,
        value: i32,
        changes: &mut Vec<EntityChange>,
    ) {
        let Some(owner) = state.owner_of(id) else {
            return;
        };
        let entity = EntityRef::Creature { id, owner };

        if action == EffectAction::Banish {
            let player = state.player_mut(owner);
            if let Some(fc) = player.take_from_field(id) {
                player.banished_cards.push(fc.card);
                push_change(changes, entity, Attribute::OnField, 1, 0);
            }
            return;
        }

        let poison_duration = state.config.poison_duration;
        let Some(fc) = state.player_mut(owner).field_card_mut(id) else {
            return;
        };

        match action {
            EffectAction::Damage => {
                if value <= 0 {
                    return;
                }
                let before = fc.current_health;
                fc.current_health -= value;
                push_change(changes, entity, Attribute::Health, before, fc.current_health);
            }
            EffectAction::Heal => {
                if value <= 0 {
                    return;
                }
                let before = fc.current_health;
                fc.current_health = (before + value).min(fc.max_health()).max(before);
                push_change(changes, entity, Attribute::Health, before, fc.current_health);
            }
            EffectAction::BuffAttack | EffectAction::DebuffAttack => {
                let delta = if action == EffectAction::BuffAttack { value } else { -value };
                let before = raw_attack(fc);
                fc.attack_modifier += delta;
                push_change(changes, entity, Attribute::Attack, before, raw_attack(fc));
            }
            EffectAction::BuffHealth | EffectAction::DebuffHealth => {
                let delta = if action == EffectAction::BuffHealth { value } else { -value };
                let before = fc.current_health;
                fc.health_modifier += delta;
                fc.current_health += delta;
                push_change(changes, entity, Attribute::Health, before, fc.current_health);
            }
            EffectAction::Silence => {
                if fc.is_silenced {
                    return;
                }
                let attack_before = raw_attack(fc);
                let health_before = fc.current_health;
                fc.is_silenced = true;
                fc.is_stealthed = false;
                fc.attack_modifier = 0;
                fc.health_modifier = 0;
                fc.current_health = fc.current_health.min(fc.max_health());
                push_change(changes, entity, Attribute::Silenced, 0, 1);
                push_change(changes, entity, Attribute::Attack, attack_before, raw_attack(fc));
                push_change(changes, entity, Attribute::Health, health_before, fc.current_health);
            }
            EffectAction::Stun => {
                let duration = value.max(1);
                let existing = fc.status_effects.iter_mut().find_map(|s| match s {
                    StatusEffect::Stun { duration } => Some(duration),
                    _ => None,
                });
                match existing {
                    Some(current) => {
                        let before = *current;
                        *current = before.max(duration);
                        push_change(changes, entity, Attribute::Stun, before, *current);
                    }
                    None => {
                        fc.status_effects.push(StatusEffect::Stun { duration });
                        push_change(changes, entity, Attribute::Stun, 0, duration);
                    }
                }
            }
            EffectAction::ApplyPoison => {
                let damage = value.max(1);
                let fresh = StatusEffect::Poison {
                    duration: poison_duration,
                    damage,
                };
                if fc.status_effects.contains(&fresh) {
                    return;
                }
                let before = fc.replace_poison(poison_duration, damage);
                changes.push(EntityChange {
                    entity,
                    attribute: Attribute::Poison,
                    before,
                    after: poison_duration,
                });
            }
            EffectAction::ApplyBrand => {
                if fc.is_branded() {
                    return;
                }
                fc.status_effects.push(StatusEffect::Branded);
                push_change(changes, entity, Attribute::Branded, 0, 1);
            }
            EffectAction::ClearBrand => {
                if !fc.is_branded() {
                    return;
                }
                fc.status_effects.retain(|s| !matches!(s, StatusEffect::Branded));
                push_change(changes, entity, Attribute::Branded, 1, 0);
            }
            EffectAction::Destroy | EffectAction::DestroyAllCreatures => {
                if fc.current_health <= 0 {
                    return;
                }
                let before = fc.current_health;
                fc.current_health = 0;
                push_change(changes, entity, Attribute::Health, before, 0);
            }
            EffectAction::SwapAttackHealth => {
                let attack = fc.total_attack();
                let health = fc.current_health;
                if attack == health {
                    return;
                }
                let attack_before = raw_attack(fc);
                fc.attack_modifier += health - attack_before;
                fc.health_modifier += attack - health;
                fc.current_health = attack;
                push_change(changes, entity, Attribute::Attack, attack_before, raw_attack(fc));
                push_change(changes, entity, Attribute::Health, health, attack);
            }
            // Player-level actions never reach a creature
            EffectAction::Banish
            | EffectAction::Summon
            | EffectAction::DrawCard
            | EffectAction::Resurrect
            | EffectAction::HandDiscard
            | EffectAction::GainEnergy => {}
        }
    }

    /// Recompute every aura from scratch
    ///
    /// Passive modifiers are zeroed and re-derived from all living, unsilenced
    /// sources, so repeated calls on an unchanged board are idempotent. The
    /// change in passive health carries into current health but never kills.
    pub fn apply_passive_effects(&self, state: &mut GameState) {
        let mut sources: Vec<(PlayerId, InstanceId, TemplateId, CardEffect)> = Vec::new();
        for pid in PlayerId::both() {
            for fc in state.player(pid).living_creatures() {
                if fc.is_silenced {
                    continue;
                }
                for effect in fc.card.effects_for(EffectTrigger::Passive) {
                    sources.push((pid, fc.id(), fc.card.template_id.clone(), effect.clone()));
                }
            }
        }

        let mut bonus: FxHashMap<InstanceId, (i32, i32)> = FxHashMap::default();
        for (controller, source_id, template_id, effect) in &sources {
            // Auras need a stable recipient set
            if effect.target.is_random() {
                continue;
            }
            if let Some(condition) = &effect.condition {
                if !condition_holds(state, *controller, condition) {
                    continue;
                }
            }
            let ctx = EffectContext {
                controller: *controller,
                source_id: *source_id,
            };
            let value = self.hooks.resolve_value(template_id, effect, ctx, state);
            let recipients = candidate_creatures(
                state,
                *source_id,
                *controller,
                effect.target,
                effect.selection_filter,
            );
            for id in recipients {
                let entry = bonus.entry(id).or_default();
                match effect.action {
                    EffectAction::BuffAttack => entry.0 += value,
                    EffectAction::DebuffAttack => entry.0 -= value,
                    EffectAction::BuffHealth => entry.1 += value,
                    EffectAction::DebuffHealth => entry.1 -= value,
                    _ => {}
                }
            }
        }

        for pid in PlayerId::both() {
            for fc in state.player_mut(pid).field.iter_mut() {
                let (attack, health) = bonus.get(&fc.id()).copied().unwrap_or((0, 0));
                let previous_health = fc.passive_health_modifier;
                fc.passive_attack_modifier = attack;
                fc.passive_health_modifier = health;
                if fc.is_alive() {
                    fc.current_health += health - previous_health;
                    if fc.current_health <= 0 {
                        fc.current_health = 1;
                    }
                }
            }
        }
    }

    /// End-of-turn status ticking for one player's creatures
    ///
    /// Poison deals its damage and is logged before its duration drops; stun
    /// just counts down. Expired entries stay until `drop_expired_statuses`.
    pub fn tick_status_effects(&self, state: &mut GameState, player: PlayerId) {
        let ids: Vec<InstanceId> = state.player(player).field.iter().map(|fc| fc.id()).collect();
        for id in ids {
            let mut ticks = Vec::new();
            if let Some(fc) = state.player_mut(player).field_card_mut(id) {
                for status in fc.status_effects.iter_mut() {
                    match status {
                        StatusEffect::Poison { duration, damage } if *duration > 0 => {
                            let health_before = fc.current_health;
                            fc.current_health -= *damage;
                            *duration -= 1;
                            ticks.push(GameAction::StatusTick {
                                card_id: id,
                                status: TickKind::Poison,
                                damage: *damage,
                                health_before,
                                health_after: fc.current_health,
                                remaining: *duration,
                            });
                        }
                        StatusEffect::Stun { duration } if *duration > 0 => {
                            *duration -= 1;
                            ticks.push(GameAction::StatusTick {
                                card_id: id,
                                status: TickKind::Stun,
                                damage: 0,
                                health_before: fc.current_health,
                                health_after: fc.current_health,
                                remaining: *duration,
                            });
                        }
                        _ => {}
                    }
                }
            }
            for tick in ticks {
                state.record(player, tick);
            }
        }
    }

    /// Remove poison and stun entries whose duration ran out
    pub fn drop_expired_statuses(&self, state: &mut GameState) {
        for pid in PlayerId::both() {
            for fc in state.player_mut(pid).field.iter_mut() {
                fc.status_effects.retain(|s| !s.is_expired());
            }
        }
    }

    /// One pass over both fields, player1 first, for creatures at or below 0 health
    ///
    /// The dead set is captured up front. Each logs `creature_destroyed`,
    /// fires `on_death`, then `on_ally_death` on living allies, then moves to
    /// the graveyard. Returns how many creatures were destroyed.
    pub fn sweep_dead(&self, state: &mut GameState, rng: &mut SeededRng, source: DestroySource) -> usize {
        let mut dead = Vec::new();
        for pid in PlayerId::both() {
            for fc in state.player(pid).field.iter().filter(|fc| !fc.is_alive()) {
                dead.push((pid, fc.id()));
            }
        }

        let mut destroyed = 0;
        for (owner, id) in dead {
            // An earlier death trigger may have banished it
            let Some(fc) = state.player(owner).field_card(id).cloned() else {
                continue;
            };
            state.record(
                owner,
                GameAction::CreatureDestroyed {
                    card_id: id,
                    card_name: fc.card.name.clone(),
                    owner,
                    source,
                },
            );
            log_if_verbose!(self.logger, Verbose, "death", "{} ({}) is destroyed", fc.card.name, owner);

            self.fire_card_trigger(state, rng, &fc.card, owner, EffectTrigger::OnDeath);
            self.process_effect_trigger(
                state,
                rng,
                EffectTrigger::OnAllyDeath,
                None,
                Some(owner),
                Some(id),
            );

            let player = state.player_mut(owner);
            if let Some(removed) = player.take_from_field(id) {
                player.graveyard.push(removed.card);
            }
            destroyed += 1;
        }
        destroyed
    }

    /// Sweep repeatedly until death triggers stop killing things
    pub fn resolve_deaths(&self, state: &mut GameState, rng: &mut SeededRng, source: DestroySource) -> usize {
        let mut total = 0;
        for _ in 0..MAX_DEATH_WAVES {
            let destroyed = self.sweep_dead(state, rng, source);
            if destroyed == 0 {
                break;
            }
            total += destroyed;
        }
        total
    }
}

fn push_change(
    changes: &mut Vec<EntityChange>,
    entity: EntityRef,
    attribute: Attribute,
    before: i32,
    after: i32,
) {
    if before != after {
        changes.push(EntityChange {
            entity,
            attribute,
            before,
            after,
        });
    }
}
