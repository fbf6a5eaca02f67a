//! Card catalog
//!
//! Card templates keyed by template id, loaded from JSON. A catalog file
//! holds an array of cards; a catalog directory is walked recursively and
//! every `.json` file in it is merged.

use crate::core::{Card, CardType, TemplateId};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Pure template lookup
pub trait CardCatalog {
    /// Template with the given id, or None when unknown
    fn get_card_by_id(&self, template_id: &TemplateId) -> Option<Card>;
}

/// In-memory catalog of card templates
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<TemplateId, Card>,
}

impl CardDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        CardDatabase {
            cards: FxHashMap::default(),
        }
    }

    /// Load a catalog file, or every catalog file under a directory
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DuelError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Catalog not found: {path:?}"),
            )));
        }

        let mut db = CardDatabase::new();
        if path.is_dir() {
            db.load_directory(path)?;
        } else {
            db.load_file(path)?;
        }
        Ok(db)
    }

    /// Parse a JSON array of card templates
    pub fn parse(content: &str) -> Result<Self> {
        let mut db = CardDatabase::new();
        db.merge_json(content)?;
        Ok(db)
    }

    fn load_directory(&mut self, dir: &Path) -> Result<()> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            paths.push(entry?.path());
        }
        // read_dir order is platform dependent
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_directory(&path)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
                self.load_file(&path)?;
            }
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_json(&content)
            .map_err(|e| DuelError::InvalidCatalog(format!("{}: {e}", path.display())))
    }

    fn merge_json(&mut self, content: &str) -> Result<()> {
        let cards: Vec<Card> = serde_json::from_str(content)?;
        for card in cards {
            self.add_card(card)?;
        }
        Ok(())
    }

    /// Add one template; ids must be unique and stats sane
    pub fn add_card(&mut self, card: Card) -> Result<()> {
        validate_template(&card)?;
        if self.cards.contains_key(&card.template_id) {
            return Err(DuelError::InvalidCatalog(format!(
                "duplicate template id {}",
                card.template_id
            )));
        }
        self.cards.insert(card.template_id.clone(), card);
        Ok(())
    }

    pub fn get_card(&self, template_id: &TemplateId) -> Option<&Card> {
        self.cards.get(template_id)
    }

    pub fn contains(&self, template_id: &TemplateId) -> bool {
        self.cards.contains_key(template_id)
    }

    /// Template ids in sorted order
    pub fn template_ids(&self) -> Vec<&TemplateId> {
        let mut ids: Vec<&TemplateId> = self.cards.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardCatalog for CardDatabase {
    fn get_card_by_id(&self, template_id: &TemplateId) -> Option<Card> {
        self.cards.get(template_id).cloned()
    }
}

fn validate_template(card: &Card) -> Result<()> {
    match card.card_type {
        CardType::Creature if card.health <= 0 => Err(DuelError::InvalidCatalog(format!(
            "creature {} needs positive health",
            card.template_id
        ))),
        CardType::Creature if card.attack < 0 => Err(DuelError::InvalidCatalog(format!(
            "creature {} has negative attack",
            card.template_id
        ))),
        CardType::Spell if card.effects.is_empty() => Err(DuelError::InvalidCatalog(format!(
            "spell {} has no effects",
            card.template_id
        ))),
        _ => Ok(()),
    }
}
