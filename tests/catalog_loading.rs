//! Catalog and deck fixture loading
//!
//! Every deck under test_decks/decks must resolve against the shared catalog.

use auto_duel::{
    core::{CardType, TemplateId},
    game::CardHookRegistry,
    loader::{CardCatalog, CardDatabase, DeckLoader},
    DuelError,
};
use dir_test::{dir_test, Fixture};
use std::path::PathBuf;

fn catalog_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks/catalog")
}

#[test]
fn test_load_catalog_directory() {
    let db = CardDatabase::load(&catalog_dir()).expect("catalog should load");
    assert!(db.len() >= 20, "expected a full catalog, got {} cards", db.len());

    for id in db.template_ids() {
        let card = db.get_card_by_id(id).unwrap();
        assert_eq!(&card.template_id, id);
        match card.card_type {
            CardType::Creature => assert!(card.health > 0, "{id} has no health"),
            CardType::Spell => assert!(!card.effects.is_empty(), "{id} does nothing"),
        }
    }
}

#[test]
fn test_hooked_templates_are_in_catalog() {
    let db = CardDatabase::load(&catalog_dir()).unwrap();
    let hooks = CardHookRegistry::with_defaults();

    for template in ["desperate_raider", "legion_banneret", "grave_tide", "brand_reaper"] {
        let id = TemplateId::new(template);
        assert!(hooks.get(&id).is_some(), "{template} has no hook");
        assert!(db.contains(&id), "{template} missing from catalog");
    }
}

#[test]
fn test_single_catalog_file() {
    let db = CardDatabase::load(&catalog_dir().join("tide.json")).unwrap();
    assert!(db.contains(&TemplateId::new("reef_warden")));
    assert!(!db.contains(&TemplateId::new("ember_whelp")));
}

#[test]
fn test_missing_catalog_is_io_error() {
    let result = CardDatabase::load(&catalog_dir().join("no_such_file.json"));
    assert!(matches!(result, Err(DuelError::IoError(_))));
}

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/test_decks/decks",
    glob: "*.json",
)]
fn test_deck_resolves(fixture: Fixture<&str>) {
    let db = CardDatabase::load(&catalog_dir()).unwrap();
    let deck = DeckLoader::parse(fixture.content()).expect("deck should parse");

    let cards = deck.instantiate(&db, 1).expect("every card should be in the catalog");
    assert_eq!(cards.len(), deck.total_cards());
    assert!(cards.len() >= 15, "{} is too small to play", fixture.path());

    let mut ids: Vec<u32> = cards.iter().map(|c| c.id.as_u32()).collect();
    ids.dedup();
    assert_eq!(ids.len(), cards.len());
}
