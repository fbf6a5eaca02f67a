//! Player representation

use crate::core::{Card, Faction, FieldCard, InstanceId, PlayerId, TacticsType};
use serde::{Deserialize, Serialize};

/// One side of the table: life, energy and every card zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,

    /// Life total (may dip below zero until the next win check)
    pub life: i32,

    pub energy: u32,
    pub max_energy: u32,

    pub faction: Faction,
    pub tactics: TacticsType,

    /// Draw pile; the top of the deck is the tail
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub field: Vec<FieldCard>,
    pub graveyard: Vec<Card>,
    /// Removed cards that skipped death triggers
    pub banished_cards: Vec<Card>,
}

impl PlayerState {
    pub fn new(
        id: PlayerId,
        faction: Faction,
        tactics: TacticsType,
        deck: Vec<Card>,
        starting_life: i32,
    ) -> Self {
        PlayerState {
            id,
            life: starting_life,
            energy: 0,
            max_energy: 0,
            faction,
            tactics,
            deck,
            hand: Vec::new(),
            field: Vec::new(),
            graveyard: Vec::new(),
            banished_cards: Vec::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.life <= 0
    }

    pub fn field_card(&self, id: InstanceId) -> Option<&FieldCard> {
        self.field.iter().find(|fc| fc.id() == id)
    }

    pub fn field_card_mut(&mut self, id: InstanceId) -> Option<&mut FieldCard> {
        self.field.iter_mut().find(|fc| fc.id() == id)
    }

    pub fn field_index(&self, id: InstanceId) -> Option<usize> {
        self.field.iter().position(|fc| fc.id() == id)
    }

    /// Living creatures in field order
    pub fn living_creatures(&self) -> impl Iterator<Item = &FieldCard> {
        self.field.iter().filter(|fc| fc.is_alive())
    }

    pub fn branded_count(&self) -> usize {
        self.living_creatures().filter(|fc| fc.is_branded()).count()
    }

    /// Remove a field card and renumber positions of those left behind
    pub fn take_from_field(&mut self, id: InstanceId) -> Option<FieldCard> {
        let idx = self.field_index(id)?;
        let removed = self.field.remove(idx);
        self.reindex_field();
        Some(removed)
    }

    pub fn reindex_field(&mut self) {
        for (position, fc) in self.field.iter_mut().enumerate() {
            fc.position = position;
        }
    }
}
