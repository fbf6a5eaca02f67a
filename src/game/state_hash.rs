//! Deterministic board hashing
//!
//! Hashes the gameplay-relevant part of a state: the JSON form with the
//! history and clock fields stripped. Two states with the same players,
//! turn and phase hash equal no matter how they were reached, which is how
//! replays are checked against the original run.

use crate::game::GameState;
use crate::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fields that do not affect play
///
/// - action_log: history, not board state
/// - setup: the original decks, kept only to rebuild the start
/// - start_time, timestamp, end_time, duration_seconds: logical clock
const EXCLUDED_FIELDS: &[&str] = &[
    "action_log",
    "setup",
    "start_time",
    "timestamp",
    "end_time",
    "duration_seconds",
];

/// Hash of the gameplay-relevant state
pub fn compute_state_hash(game: &GameState) -> Result<u64> {
    let json_value = serde_json::to_value(game)?;
    let cleaned = strip_metadata(json_value);
    let canonical = serde_json::to_string(&cleaned)?;

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok(hasher.finish())
}

/// Recursively strip excluded fields from a JSON value
fn strip_metadata(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k, strip_metadata(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(strip_metadata).collect())
        }
        other => other,
    }
}

/// Format a hash for display (first 8 hex digits)
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}
