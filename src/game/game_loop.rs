//! Game loop implementation
//!
//! Drives the phase state machine one step at a time. Each step clones the
//! incoming state, checks for a winner, runs the current phase, then advances
//! to the next phase and logs the transition.

use crate::core::{Card, EffectAction, EffectTrigger, FieldCard, PlayerId};
use crate::game::action_log::{
    Attribute, DestroySource, EffectSource, EndReason, EntityChange, EntityRef, GameAction,
};
use crate::game::card_hooks::CardHookRegistry;
use crate::game::combat::resolve_battle;
use crate::game::effect_engine::EffectEngine;
use crate::game::state::GameResult;
use crate::game::tactics::{is_playable, select_card_to_play};
use crate::game::{GameLogger, GameState, Phase};
use crate::rng::SeededRng;
use crate::Result;

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome
    Minimal = 1,
    /// Normal - turns, phases, and plays (default)
    #[default]
    Normal = 2,
    /// Verbose - every attack, effect and death
    Verbose = 3,
}

/// Step driver
///
/// Holds the collaborators a step needs besides the state itself: the
/// per-template behavior hooks and the narrative logger. Neither is part of
/// the game state, so two loops with different loggers produce identical
/// states and logs.
#[derive(Debug, Clone)]
pub struct GameLoop {
    hooks: CardHookRegistry,
    logger: GameLogger,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLoop {
    /// Loop with the built-in card hooks and a normal-verbosity logger
    pub fn new() -> Self {
        GameLoop {
            hooks: CardHookRegistry::with_defaults(),
            logger: GameLogger::new(),
        }
    }

    /// Loop that prints nothing
    pub fn silent() -> Self {
        Self::new().with_verbosity(VerbosityLevel::Silent)
    }

    pub fn with_hooks(mut self, hooks: CardHookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn hooks(&self) -> &CardHookRegistry {
        &self.hooks
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    fn engine(&self) -> EffectEngine<'_> {
        EffectEngine::new(&self.hooks, &self.logger)
    }

    /// Advance exactly one phase
    ///
    /// A finished game is passed through unchanged. The input is never
    /// mutated; the returned state shares nothing with it.
    pub fn process_game_step(&self, state: &GameState) -> Result<GameState> {
        let mut next = state.clone();
        if next.is_over() {
            return Ok(next);
        }

        if self.check_win_condition(&mut next) {
            return Ok(next);
        }

        let engine = self.engine();
        let mut rng = next.phase_rng();
        match next.phase {
            Phase::Draw => self.draw_phase(&engine, &mut next, &mut rng),
            Phase::Energy => self.energy_phase(&mut next),
            Phase::Deploy => self.deploy_phase(&engine, &mut next, &mut rng),
            Phase::Battle => self.battle_phase(&engine, &mut next, &mut rng),
            Phase::End => self.end_phase(&engine, &mut next, &mut rng),
        }

        self.advance_phase(&mut next);
        next.integrity_check()?;
        Ok(next)
    }

    /// Step until the game has a result
    ///
    /// Gives up after `max_steps` steps and forces a timeout.
    pub fn execute_full_game(&self, state: GameState) -> Result<GameState> {
        let mut state = state;
        let max_steps = state.config.max_steps;
        let mut steps = 0;

        while !state.is_over() && steps < max_steps {
            state = self.process_game_step(&state)?;
            steps += 1;
        }

        if !state.is_over() {
            log_if_verbose!(self.logger, Minimal, "game", "Step limit {} reached", max_steps);
            let winner = life_leader(&state);
            self.finish(&mut state, winner, EndReason::Timeout);
        }
        Ok(state)
    }

    /// Check life totals and the turn cap; sets the result when the game is over
    fn check_win_condition(&self, state: &mut GameState) -> bool {
        let p1_dead = state.player(PlayerId::Player1).is_defeated();
        let p2_dead = state.player(PlayerId::Player2).is_defeated();

        let outcome = match (p1_dead, p2_dead) {
            (true, true) => Some((None, EndReason::LifeZero)),
            (true, false) => Some((Some(PlayerId::Player2), EndReason::LifeZero)),
            (false, true) => Some((Some(PlayerId::Player1), EndReason::LifeZero)),
            (false, false) if state.turn_number > state.config.max_turns => {
                Some((life_leader(state), EndReason::Timeout))
            }
            (false, false) => None,
        };

        match outcome {
            Some((winner, reason)) => {
                self.finish(state, winner, reason);
                true
            }
            None => false,
        }
    }

    /// Record the game end and set the result
    fn finish(&self, state: &mut GameState, winner: Option<PlayerId>, reason: EndReason) {
        let total_turns = state.turn_number.min(state.config.max_turns);
        let actor = winner.unwrap_or(state.current_player);
        state.record(
            actor,
            GameAction::GameEnd {
                winner,
                reason,
                total_turns,
            },
        );

        // Logical clock: one millisecond per log entry
        let end_time = state.start_time + state.action_log.len() as u64;
        state.result = Some(GameResult {
            winner,
            reason,
            total_turns,
            duration_seconds: (end_time - state.start_time) as f64 / 1000.0,
            end_time,
        });

        if self.logger.enabled(VerbosityLevel::Minimal) {
            let message = match winner {
                Some(pid) => format!("Game over: {pid} wins ({reason:?}) after {total_turns} turns"),
                None => format!("Game over: draw ({reason:?}) after {total_turns} turns"),
            };
            self.logger.event(VerbosityLevel::Minimal, "game", &message);
        }
    }

    fn advance_phase(&self, state: &mut GameState) {
        let from = state.phase;
        let to = from.next();
        if from.ends_turn() {
            state.turn_number += 1;
            state.current_player = state.current_player.opponent();
        }
        state.phase = to;
        state.record(
            state.current_player,
            GameAction::PhaseChange {
                from: Some(from),
                to,
                turn_number: state.turn_number,
            },
        );

        if self.logger.enabled(VerbosityLevel::Normal) {
            let message = format!("Turn {} ({}) - {}", state.turn_number, state.current_player, to);
            self.logger.event(VerbosityLevel::Normal, "phase", &message);
        }
    }

    /// Turn-start triggers, then draw one card (or take fatigue damage)
    fn draw_phase(&self, engine: &EffectEngine<'_>, state: &mut GameState, rng: &mut SeededRng) {
        let active = state.current_player;
        engine.process_effect_trigger(state, rng, EffectTrigger::TurnStart, None, Some(active), None);
        engine.resolve_deaths(state, rng, DestroySource::Effect);

        let hand_limit = state.config.hand_limit;
        let fatigue = state.config.fatigue_damage;
        let player = state.player_mut(active);

        if player.hand.len() >= hand_limit {
            log_if_verbose!(self.logger, Verbose, "draw", "{} has a full hand, skipping draw", active);
            return;
        }

        match player.deck.pop() {
            Some(card) => {
                let card_id = card.id;
                let card_name = card.name.clone();
                player.hand.push(card);
                let deck_remaining = player.deck.len();
                let hand_size = player.hand.len();
                log_if_verbose!(self.logger, Verbose, "draw", "{} draws {}", active, card_name);
                state.record(
                    active,
                    GameAction::CardDraw {
                        card_id,
                        card_name,
                        deck_remaining,
                        hand_size,
                    },
                );
            }
            None => {
                let before = player.life;
                player.life -= fatigue;
                let after = player.life;
                log_if_verbose!(self.logger, Verbose, "draw", "{} takes {} fatigue damage", active, fatigue);
                state.record(
                    active,
                    GameAction::EffectTrigger {
                        source: EffectSource::Fatigue,
                        action: EffectAction::Damage,
                        value: fatigue,
                        changes: vec![EntityChange {
                            entity: EntityRef::Player { id: active },
                            attribute: Attribute::Life,
                            before,
                            after,
                        }],
                    },
                );
            }
        }
    }

    /// Grow max energy by one (up to the limit) and refill
    fn energy_phase(&self, state: &mut GameState) {
        let active = state.current_player;
        let limit = state.config.energy_limit;
        let player = state.player_mut(active);

        let energy_before = player.energy;
        let max_energy_before = player.max_energy;
        player.max_energy = (player.max_energy + 1).min(limit);
        player.energy = player.max_energy;

        if player.max_energy != max_energy_before {
            let action = GameAction::EnergyUpdate {
                energy_before,
                energy_after: player.energy,
                max_energy_before,
                max_energy_after: player.max_energy,
            };
            state.record(active, action);
        }
    }

    /// Recompute auras, then greedily play the best card until nothing fits
    fn deploy_phase(&self, engine: &EffectEngine<'_>, state: &mut GameState, rng: &mut SeededRng) {
        let active = state.current_player;
        engine.apply_passive_effects(state);

        for _ in 0..state.config.max_deploy_attempts {
            let Some(index) = select_card_to_play(state, active) else {
                break;
            };
            if !self.play_with(engine, state, rng, active, index) {
                break;
            }
            engine.apply_passive_effects(state);
        }
    }

    fn battle_phase(&self, engine: &EffectEngine<'_>, state: &mut GameState, rng: &mut SeededRng) {
        engine.apply_passive_effects(state);
        let attacks = resolve_battle(engine, state, rng);
        log_if_verbose!(self.logger, Verbose, "combat", "{} attack(s) this turn", attacks);
    }

    /// Status ticks, turn bookkeeping, turn-end triggers and deaths
    fn end_phase(&self, engine: &EffectEngine<'_>, state: &mut GameState, rng: &mut SeededRng) {
        let active = state.current_player;
        engine.tick_status_effects(state, active);

        for fc in state.player_mut(active).field.iter_mut() {
            fc.has_attacked = false;
        }
        // The opponent's stealthed creatures have now survived a full turn
        for fc in state.player_mut(active.opponent()).field.iter_mut() {
            fc.is_stealthed = false;
        }

        engine.drop_expired_statuses(state);
        engine.process_effect_trigger(state, rng, EffectTrigger::TurnEnd, None, Some(active), None);
        engine.resolve_deaths(state, rng, DestroySource::Effect);
    }

    /// Play the card at `hand_index` for `player`
    ///
    /// Returns false, leaving the state untouched, when the index is out of
    /// range, the card costs too much or the field is full.
    pub fn play_card_to_field(
        &self,
        state: &mut GameState,
        rng: &mut SeededRng,
        player: PlayerId,
        hand_index: usize,
    ) -> bool {
        let engine = self.engine();
        self.play_with(&engine, state, rng, player, hand_index)
    }

    fn play_with(
        &self,
        engine: &EffectEngine<'_>,
        state: &mut GameState,
        rng: &mut SeededRng,
        player: PlayerId,
        hand_index: usize,
    ) -> bool {
        match state.player(player).hand.get(hand_index) {
            Some(card) if is_playable(card, state, player) => {}
            _ => return false,
        }

        let turn = state.turn_number;
        let owner = state.player_mut(player);
        let card: Card = owner.hand.remove(hand_index);
        let energy_before = owner.energy;
        owner.energy -= card.cost;
        let energy_after = owner.energy;

        let position = if card.is_creature() {
            let position = owner.field.len();
            owner
                .field
                .push(FieldCard::new(card.clone(), player, turn, position));
            Some(position)
        } else {
            None
        };

        if self.logger.enabled(VerbosityLevel::Normal) {
            let message = format!("{} plays {} ({} energy)", player, card.name, card.cost);
            self.logger.event(VerbosityLevel::Normal, "deploy", &message);
        }
        state.record(
            player,
            GameAction::CardPlay {
                card: card.clone(),
                energy_before,
                energy_after,
                position,
            },
        );

        engine.fire_card_trigger(state, rng, &card, player, EffectTrigger::OnPlay);
        if card.is_spell() {
            engine.process_effect_trigger(state, rng, EffectTrigger::OnSpellPlay, None, Some(player), None);
            state.player_mut(player).graveyard.push(card);
        }

        engine.resolve_deaths(state, rng, DestroySource::Effect);
        true
    }
}

/// Player with more life, or None when level
fn life_leader(state: &GameState) -> Option<PlayerId> {
    let p1 = state.player(PlayerId::Player1).life;
    let p2 = state.player(PlayerId::Player2).life;
    match p1.cmp(&p2) {
        std::cmp::Ordering::Greater => Some(PlayerId::Player1),
        std::cmp::Ordering::Less => Some(PlayerId::Player2),
        std::cmp::Ordering::Equal => None,
    }
}

/// Advance one phase with the built-in hooks and no output
pub fn process_game_step(state: &GameState) -> Result<GameState> {
    GameLoop::silent().process_game_step(state)
}

/// Run a game to completion with the built-in hooks and no output
pub fn execute_full_game(state: GameState) -> Result<GameState> {
    GameLoop::silent().execute_full_game(state)
}
