//! Append-only action log
//!
//! Every observable change in a game is recorded here with a sequence number
//! equal to its index. The log is the audit trail and the only record external
//! consumers need to rebuild any past state.

use crate::core::{Card, EffectAction, EffectTrigger, InstanceId, Keyword, PlayerId};
use crate::game::Phase;
use serde::{Deserialize, Serialize};

/// Something whose attributes an action changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRef {
    Creature { id: InstanceId, owner: PlayerId },
    Player { id: PlayerId },
}

/// Quantity recorded in a before/after pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Health,
    Attack,
    Life,
    Energy,
    HandSize,
    /// 1 while branded
    Branded,
    /// Remaining stun turns
    Stun,
    /// Remaining poison turns
    Poison,
    /// 1 while silenced
    Silenced,
    /// 1 while on the field
    OnField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChange {
    pub entity: EntityRef,
    pub attribute: Attribute,
    pub before: i32,
    pub after: i32,
}

/// Origin of an effect entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSource {
    Card { id: InstanceId, name: String },
    /// Drawing from an empty deck
    Fatigue,
}

/// How a creature died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroySource {
    Combat,
    Effect,
}

/// What an attack hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackTarget {
    Creature { id: InstanceId },
    Player { id: PlayerId },
}

/// Status effect kinds that tick at end of turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickKind {
    Poison,
    Stun,
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    LifeZero,
    Timeout,
}

/// One observable event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    PhaseChange {
        from: Option<Phase>,
        to: Phase,
        turn_number: u32,
    },

    CardDraw {
        card_id: InstanceId,
        card_name: String,
        deck_remaining: usize,
        hand_size: usize,
    },

    EnergyUpdate {
        energy_before: u32,
        energy_after: u32,
        max_energy_before: u32,
        max_energy_after: u32,
    },

    /// Carries the whole card so the play can be replayed without a catalog
    CardPlay {
        card: Card,
        energy_before: u32,
        energy_after: u32,
        position: Option<usize>,
    },

    CardAttack {
        attacker_id: InstanceId,
        attacker_name: String,
        target: AttackTarget,
        damage: i32,
        before: i32,
        after: i32,
    },

    /// The struck defender hitting back at its attacker
    CounterAttack {
        defender_id: InstanceId,
        attacker_id: InstanceId,
        damage: i32,
        before: i32,
        after: i32,
    },

    EffectTrigger {
        source: EffectSource,
        action: EffectAction,
        value: i32,
        changes: Vec<EntityChange>,
    },

    CreatureDestroyed {
        card_id: InstanceId,
        card_name: String,
        owner: PlayerId,
        source: DestroySource,
    },

    KeywordTrigger {
        card_id: InstanceId,
        keyword: Keyword,
        value: i32,
        entity: EntityRef,
        before: i32,
        after: i32,
    },

    TriggerEvent {
        card_id: InstanceId,
        card_name: String,
        trigger: EffectTrigger,
    },

    StatusTick {
        card_id: InstanceId,
        status: TickKind,
        damage: i32,
        health_before: i32,
        health_after: i32,
        remaining: i32,
    },

    GameEnd {
        winner: Option<PlayerId>,
        reason: EndReason,
        total_turns: u32,
    },
}

impl GameAction {
    /// Wire tag of this action
    pub fn kind(&self) -> &'static str {
        match self {
            GameAction::PhaseChange { .. } => "phase_change",
            GameAction::CardDraw { .. } => "card_draw",
            GameAction::EnergyUpdate { .. } => "energy_update",
            GameAction::CardPlay { .. } => "card_play",
            GameAction::CardAttack { .. } => "card_attack",
            GameAction::CounterAttack { .. } => "counter_attack",
            GameAction::EffectTrigger { .. } => "effect_trigger",
            GameAction::CreatureDestroyed { .. } => "creature_destroyed",
            GameAction::KeywordTrigger { .. } => "keyword_trigger",
            GameAction::TriggerEvent { .. } => "trigger_event",
            GameAction::StatusTick { .. } => "status_tick",
            GameAction::GameEnd { .. } => "game_end",
        }
    }
}

/// A logged action with its position and acting player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub sequence: u64,
    pub player_id: PlayerId,
    /// Logical clock: game start time plus sequence, in milliseconds
    pub timestamp: u64,
    pub action: GameAction,
}

/// Ordered record of every action in a game
///
/// Entries are only ever appended; `entries()[i].sequence == i` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    entries: Vec<ActionEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog { entries: Vec::new() }
    }

    /// Append an action, returning its sequence number
    pub fn append(&mut self, player_id: PlayerId, start_time: u64, action: GameAction) -> u64 {
        let sequence = self.entries.len() as u64;
        self.entries.push(ActionEntry {
            sequence,
            player_id,
            timestamp: start_time + sequence,
            action,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ActionEntry> {
        self.entries.last()
    }

    pub fn get(&self, sequence: u64) -> Option<&ActionEntry> {
        self.entries.get(sequence as usize)
    }

    /// Sequence of the newest entry, if any
    pub fn last_sequence(&self) -> Option<u64> {
        self.entries.last().map(|e| e.sequence)
    }

    /// True when every entry's sequence equals its index
    pub fn is_monotonic(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, e)| e.sequence == i as u64)
    }

    /// Number of entries with the given wire tag
    pub fn count_kind(&self, kind: &str) -> usize {
        self.entries.iter().filter(|e| e.action.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_sequences() {
        let mut log = ActionLog::new();
        assert!(log.is_empty());

        let s0 = log.append(
            PlayerId::Player1,
            1000,
            GameAction::PhaseChange {
                from: None,
                to: Phase::Draw,
                turn_number: 1,
            },
        );
        let s1 = log.append(
            PlayerId::Player1,
            1000,
            GameAction::PhaseChange {
                from: Some(Phase::Draw),
                to: Phase::Energy,
                turn_number: 1,
            },
        );

        assert_eq!((s0, s1), (0, 1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].timestamp, 1001);
        assert!(log.is_monotonic());
        assert_eq!(log.count_kind("phase_change"), 2);
    }

    #[test]
    fn test_action_json_tag() {
        let action = GameAction::CreatureDestroyed {
            card_id: InstanceId::new(4),
            card_name: "Grunt".to_string(),
            owner: PlayerId::Player2,
            source: DestroySource::Combat,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "creature_destroyed");
        assert_eq!(json["source"], "combat");
        assert_eq!(json["owner"], "player2");
        assert_eq!(action.kind(), "creature_destroyed");
    }

    #[test]
    fn test_log_serializes_as_array() {
        let mut log = ActionLog::new();
        log.append(
            PlayerId::Player2,
            0,
            GameAction::GameEnd {
                winner: Some(PlayerId::Player2),
                reason: EndReason::LifeZero,
                total_turns: 7,
            },
        );
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.starts_with('['));
        let back: ActionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
