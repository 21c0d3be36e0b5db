//! Card and deck model.
//!
//! - `Card`: immutable identity (shape, number, derived special)
//! - `new_deck`: the fixed 54-card Whot deck
//! - `shuffle`: Fisher-Yates over a copy

pub mod card;
pub mod deck;

pub use card::{Card, CardId, Shape, Special, WILDCARD_NUMBER};
pub use deck::{new_deck, shuffle, shuffled_deck, DECK_SIZE, WILDCARD_COUNT};
