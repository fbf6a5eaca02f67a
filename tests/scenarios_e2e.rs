//! Rule scenarios played through the public engine API
//!
//! Each test builds a small board by hand, runs one phase or one engine call,
//! and checks the resulting state and log.

use auto_duel::{
    config::GameConfig,
    core::{Card, CardEffect, EffectAction, EffectTarget, EffectTrigger, Faction, FieldCard, InstanceId, Keyword, PlayerId, TacticsType, TemplateId},
    game::{
        action_log::{AttackTarget, DestroySource, EffectSource, GameAction},
        combat::resolve_battle,
        create_initial_game_state, process_game_step, CardHookRegistry, EffectEngine, EndReason, GameLogger, GameLoop, GameSetup, GameState, Phase,
    },
    loader::{CardCatalog, CardDatabase},
    rng::SeededRng,
};
use similar_asserts::assert_eq;
use std::path::PathBuf;

fn catalog() -> CardDatabase {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks/catalog");
    CardDatabase::load(&path).unwrap()
}

fn from_catalog(db: &CardDatabase, template: &str, id: u32) -> Card {
    db.get_card_by_id(&TemplateId::new(template))
        .unwrap_or_else(|| panic!("{template} missing from catalog"))
        .instantiate(InstanceId::new(id))
}

fn creature(id: u32, attack: i32, health: i32) -> Card {
    Card::new_creature(InstanceId::new(id), "grunt", format!("Grunt {id}"), 2, attack, health)
}

/// Empty-deck state at turn 3 with player1 to act
fn board(tactics: TacticsType) -> GameState {
    let setup = GameSetup::new("scenario", Vec::new(), Vec::new(), "scenario").with_tactics(tactics, tactics);
    let mut state = GameState::new(setup, GameConfig::default());
    state.turn_number = 3;
    state
}

fn place(state: &mut GameState, owner: PlayerId, card: Card, summon_turn: u32) -> InstanceId {
    let id = card.id;
    let player = state.player_mut(owner);
    let position = player.field.len();
    player.field.push(FieldCard::new(card, owner, summon_turn, position));
    id
}

fn battle(state: &mut GameState, seed: &str) -> usize {
    let hooks = CardHookRegistry::with_defaults();
    let logger = GameLogger::with_verbosity(auto_duel::game::VerbosityLevel::Silent);
    let engine = EffectEngine::new(&hooks, &logger);
    let mut rng = SeededRng::new(seed);
    resolve_battle(&engine, state, &mut rng)
}

#[test]
fn test_empty_decks_fatigue_to_life_zero() {
    let mut state = create_initial_game_state(
        "fatigue",
        Vec::new(),
        Vec::new(),
        Faction::new("ember"),
        Faction::new("tide"),
        TacticsType::Aggressive,
        TacticsType::Defensive,
        "fatigue",
    )
    .unwrap();
    let first = state.current_player;

    while state.result.is_none() {
        state = process_game_step(&state).unwrap();
    }
    let result = state.result.as_ref().unwrap();

    // 15 life against 1 fatigue per own draw: the first player's 15th turn is turn 29
    assert_eq!(result.reason, EndReason::LifeZero);
    assert_eq!(result.winner, Some(first.opponent()));
    assert_eq!(result.total_turns, 29);
    assert_eq!(state.player(first).life, 0);
    assert_eq!(state.player(first.opponent()).life, 1);

    let fatigue_hits = state
        .action_log
        .iter()
        .filter(|e| matches!(&e.action, GameAction::EffectTrigger { source: EffectSource::Fatigue, .. }))
        .count();
    assert_eq!(fatigue_hits, 29);
    assert_eq!(state.action_log.count_kind("card_draw"), 0);
}

#[test]
fn test_brand_applies_once() {
    let mut state = board(TacticsType::Balanced);
    let target = place(&mut state, PlayerId::Player2, creature(10, 2, 3), 1);
    let hex = Card::new_spell(InstanceId::new(1), "hex", "Hex", 1).with_effect(CardEffect::new(
        EffectTrigger::OnPlay,
        EffectTarget::EnemyAll,
        EffectAction::ApplyBrand,
        1,
    ));

    let hooks = CardHookRegistry::with_defaults();
    let logger = GameLogger::default();
    let engine = EffectEngine::new(&hooks, &logger);
    let mut rng = SeededRng::new("brand");

    assert!(engine.execute_effect(&mut state, &mut rng, &hex, PlayerId::Player1, &hex.effects[0]));
    assert_eq!(state.action_log.len(), 1);
    assert!(state.find_field_card(target).unwrap().is_branded());

    let after_first = state.clone();
    assert!(!engine.execute_effect(&mut state, &mut rng, &hex, PlayerId::Player1, &hex.effects[0]));
    assert_eq!(state, after_first);
    assert_eq!(state.player(PlayerId::Player2).branded_count(), 1);
}

#[test]
fn test_second_brander_play_logs_only_the_play() {
    let mut state = board(TacticsType::Balanced);
    let target = place(&mut state, PlayerId::Player2, creature(10, 2, 3), 1);
    let brander = |id: u32| {
        Card::new_creature(InstanceId::new(id), "hexer", "Hexer", 1, 1, 1).with_effect(CardEffect::new(
            EffectTrigger::OnPlay,
            EffectTarget::EnemyAll,
            EffectAction::ApplyBrand,
            1,
        ))
    };
    let player = state.player_mut(PlayerId::Player1);
    player.hand = vec![brander(1), brander(2)];
    player.energy = 2;
    player.max_energy = 2;

    let game = GameLoop::silent();
    let mut rng = SeededRng::new("brand-play");
    let kinds = |state: &GameState, from: usize| -> Vec<&'static str> {
        state.action_log.entries()[from..].iter().map(|e| e.action.kind()).collect()
    };

    assert!(game.play_card_to_field(&mut state, &mut rng, PlayerId::Player1, 0));
    assert_eq!(kinds(&state, 0), vec!["card_play", "trigger_event", "effect_trigger"]);
    assert!(state.find_field_card(target).unwrap().is_branded());

    let mark = state.action_log.len();
    assert!(game.play_card_to_field(&mut state, &mut rng, PlayerId::Player1, 0));
    assert_eq!(kinds(&state, mark), vec!["card_play"]);
    assert_eq!(state.player(PlayerId::Player2).branded_count(), 1);
    assert_eq!(state.find_field_card(target).unwrap().status_effects.len(), 1);
}

#[test]
fn test_mutual_kill_sweeps_both_in_one_pass() {
    let mut state = board(TacticsType::Balanced);
    place(&mut state, PlayerId::Player1, creature(1, 3, 3), 1);
    place(&mut state, PlayerId::Player2, creature(2, 3, 3), 1);

    assert_eq!(battle(&mut state, "trade"), 1);

    let destroyed: Vec<(InstanceId, DestroySource)> = state
        .action_log
        .iter()
        .filter_map(|e| match &e.action {
            GameAction::CreatureDestroyed { card_id, source, .. } => Some((*card_id, *source)),
            _ => None,
        })
        .collect();
    assert_eq!(
        destroyed,
        vec![
            (InstanceId::new(1), DestroySource::Combat),
            (InstanceId::new(2), DestroySource::Combat)
        ]
    );
    assert_eq!(state.player(PlayerId::Player1).graveyard.len(), 1);
    assert_eq!(state.player(PlayerId::Player2).graveyard.len(), 1);
    assert_eq!(state.action_log.count_kind("counter_attack"), 1);
}

#[test]
fn test_guard_redirects_every_attack() {
    for tactics in [
        TacticsType::Aggressive,
        TacticsType::Defensive,
        TacticsType::Tempo,
        TacticsType::Balanced,
    ] {
        for seed in 0..20 {
            let mut state = board(tactics);
            place(&mut state, PlayerId::Player1, creature(1, 2, 9), 1);
            place(&mut state, PlayerId::Player1, creature(2, 2, 9), 1);
            let guard = place(&mut state, PlayerId::Player2, creature(3, 0, 30).with_keyword(Keyword::Guard), 1);
            place(&mut state, PlayerId::Player2, creature(4, 1, 1), 1);

            battle(&mut state, &format!("guard-{seed}"));

            let targets: Vec<AttackTarget> = state
                .action_log
                .iter()
                .filter_map(|e| match &e.action {
                    GameAction::CardAttack { target, .. } => Some(*target),
                    _ => None,
                })
                .collect();
            assert_eq!(targets.len(), 2);
            assert!(targets.iter().all(|t| *t == AttackTarget::Creature { id: guard }));
            assert_eq!(state.player(PlayerId::Player2).life, 15);
        }
    }
}

#[test]
fn test_passive_auras_are_idempotent() {
    let db = catalog();
    let mut state = board(TacticsType::Balanced);
    let caller = place(&mut state, PlayerId::Player1, from_catalog(&db, "tidecaller", 1), 1);
    let ally = place(&mut state, PlayerId::Player1, creature(2, 2, 2), 1);

    let hooks = CardHookRegistry::with_defaults();
    let logger = GameLogger::default();
    let engine = EffectEngine::new(&hooks, &logger);

    engine.apply_passive_effects(&mut state);
    let once = state.clone();
    engine.apply_passive_effects(&mut state);
    engine.apply_passive_effects(&mut state);
    assert_eq!(state, once);

    let buffed = state.find_field_card(ally).unwrap();
    assert_eq!(buffed.max_health(), 3);
    assert_eq!(buffed.current_health, 3);
    assert_eq!(state.find_field_card(caller).unwrap().passive_health_modifier, 0);
    assert!(state.action_log.is_empty());
}

#[test]
fn test_battle_step_through_process_game_step() {
    let mut state = board(TacticsType::Aggressive);
    state.phase = Phase::Battle;
    state.current_player = PlayerId::Player1;
    place(&mut state, PlayerId::Player1, creature(1, 4, 4).with_keyword(Keyword::Lifesteal), 1);
    place(&mut state, PlayerId::Player1, creature(2, 3, 3), 3);
    state.player_mut(PlayerId::Player1).life = 10;

    let next = GameLoop::silent().process_game_step(&state).unwrap();

    assert_eq!(next.phase, Phase::End);
    assert_eq!(next.player(PlayerId::Player2).life, 11);
    assert_eq!(next.player(PlayerId::Player1).life, 14);
    assert_eq!(next.action_log.count_kind("card_attack"), 1);
    assert_eq!(next.action_log.count_kind("keyword_trigger"), 1);
    assert_eq!(next.action_log.last().unwrap().action.kind(), "phase_change");
    assert!(state.action_log.is_empty());
}

#[test]
fn test_poison_ticks_at_end_of_owner_turn() {
    let mut state = board(TacticsType::Aggressive);
    let attacker = place(&mut state, PlayerId::Player1, creature(1, 1, 9).with_keyword(Keyword::Poison), 1);
    let victim = place(&mut state, PlayerId::Player2, creature(2, 0, 5).with_keyword(Keyword::Guard), 1);

    battle(&mut state, "poison");
    assert_eq!(state.find_field_card(victim).unwrap().current_health, 4);
    assert_eq!(state.find_field_card(attacker).unwrap().current_health, 9);

    // Player2's end phase ticks player2's creatures
    state.current_player = PlayerId::Player2;
    state.phase = Phase::End;
    let game = GameLoop::silent();
    let next = game.process_game_step(&state).unwrap();

    let poisoned = next.find_field_card(victim).unwrap();
    assert_eq!(poisoned.current_health, 3);
    assert_eq!(next.action_log.count_kind("status_tick"), 1);
    assert_eq!(next.current_player, PlayerId::Player1);
    assert_eq!(next.turn_number, 4);
}

#[test]
fn test_desperate_raider_waits_for_trailing_life() {
    let db = catalog();
    let mut state = board(TacticsType::Aggressive);
    place(&mut state, PlayerId::Player1, from_catalog(&db, "desperate_raider", 1), 1);

    assert_eq!(battle(&mut state.clone(), "level"), 0);

    state.player_mut(PlayerId::Player1).life = 9;
    assert_eq!(battle(&mut state, "behind"), 1);
    assert_eq!(state.player(PlayerId::Player2).life, 10);
}

#[test]
fn test_legion_banneret_scales_with_allies() {
    let db = catalog();
    let mut state = board(TacticsType::Balanced);
    let a = place(&mut state, PlayerId::Player1, creature(1, 1, 1), 1);
    let b = place(&mut state, PlayerId::Player1, creature(2, 1, 1), 1);
    let player = state.player_mut(PlayerId::Player1);
    player.hand.push(from_catalog(&db, "legion_banneret", 3));
    player.energy = 3;
    player.max_energy = 3;

    let mut rng = SeededRng::new("banner");
    assert!(GameLoop::silent().play_card_to_field(&mut state, &mut rng, PlayerId::Player1, 0));

    assert_eq!(state.find_field_card(a).unwrap().total_attack(), 3);
    assert_eq!(state.find_field_card(b).unwrap().total_attack(), 3);
    assert_eq!(state.find_field_card(InstanceId::new(3)).unwrap().total_attack(), 2);
    assert_eq!(state.player(PlayerId::Player1).energy, 0);
}

#[test]
fn test_soul_exile_banishes_only_branded() {
    let db = catalog();
    let mut state = board(TacticsType::Balanced);
    let branded = place(&mut state, PlayerId::Player2, creature(10, 2, 2), 1);
    let clean = place(&mut state, PlayerId::Player2, creature(11, 2, 2), 1);
    state
        .find_field_card_mut(branded)
        .unwrap()
        .status_effects
        .push(auto_duel::core::StatusEffect::Branded);

    let player = state.player_mut(PlayerId::Player1);
    player.hand.push(from_catalog(&db, "soul_exile", 1));
    player.energy = 5;
    player.max_energy = 5;

    let mut rng = SeededRng::new("exile");
    assert!(GameLoop::silent().play_card_to_field(&mut state, &mut rng, PlayerId::Player1, 0));

    let p2 = state.player(PlayerId::Player2);
    assert!(p2.field_card(branded).is_none());
    assert!(p2.field_card(clean).is_some());
    assert_eq!(p2.banished_cards.len(), 1);
    assert!(p2.graveyard.is_empty());
    assert_eq!(state.action_log.count_kind("creature_destroyed"), 0);
}
