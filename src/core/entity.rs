//! Instance ids for cards in a game

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple integer ID for card instances
///
/// Two copies of the same template get distinct ids. Ids are handed out by the
/// game state and never reused within one game.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct InstanceId(u32);

impl InstanceId {
    pub fn new(id: u32) -> Self {
        InstanceId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Base trait for anything with an instance id and a display name
pub trait GameEntity {
    fn id(&self) -> InstanceId;
    fn name(&self) -> &str;
}
