//! Card catalog and deck loaders
//!
//! JSON formats for card templates and deck lists

pub mod database;
pub mod deck;
pub mod game_init;

pub use database::{CardCatalog, CardDatabase};
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::GameInitializer;
