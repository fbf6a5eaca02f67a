//! Deck list loader (JSON)
//!
//! ```json
//! {
//!   "name": "Ember Rush",
//!   "faction": "ember",
//!   "tactics": "aggressive",
//!   "cards": [{"template_id": "ember_whelp", "count": 3}]
//! }
//! ```

use crate::core::{Card, Faction, InstanceId, TacticsType, TemplateId};
use crate::loader::CardCatalog;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Deck loader for JSON deck lists
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a JSON file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its JSON content
    pub fn parse(content: &str) -> Result<DeckList> {
        let deck: DeckList = serde_json::from_str(content)
            .map_err(|e| DuelError::InvalidDeckFormat(e.to_string()))?;

        if deck.cards.is_empty() {
            return Err(DuelError::InvalidDeckFormat("Empty deck".to_string()));
        }
        if let Some(entry) = deck.cards.iter().find(|e| e.count == 0) {
            return Err(DuelError::InvalidDeckFormat(format!(
                "{} is listed with count 0",
                entry.template_id
            )));
        }
        Ok(deck)
    }
}

/// Represents a deck entry (template id and count)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub template_id: TemplateId,
    pub count: u8,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub name: String,
    pub faction: Faction,
    #[serde(default)]
    pub tactics: TacticsType,
    pub cards: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in the deck
    pub fn total_cards(&self) -> usize {
        self.cards.iter().map(|e| e.count as usize).sum()
    }

    /// Concrete cards in list order, with instance ids counting up from `first_id`
    pub fn instantiate(&self, catalog: &impl CardCatalog, first_id: u32) -> Result<Vec<Card>> {
        let mut cards = Vec::with_capacity(self.total_cards());
        let mut next_id = first_id;

        for entry in &self.cards {
            let template = catalog
                .get_card_by_id(&entry.template_id)
                .ok_or_else(|| DuelError::CardNotFound(entry.template_id.to_string()))?;

            for _ in 0..entry.count {
                cards.push(template.instantiate(InstanceId::new(next_id)));
                next_id += 1;
            }
        }
        Ok(cards)
    }
}
