//! Deck construction and shuffling.

use rustc_hash::FxHashSet;

use super::card::{Card, CardId, Shape, WILDCARD_NUMBER};
use crate::core::rng::MatchRng;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 54;

/// Number of Wildcards in a full deck.
pub const WILDCARD_COUNT: usize = 5;

/// Build a full, unshuffled 54-card deck.
///
/// Ids are assigned in construction order. Panics if a (shape, number) pair
/// repeats among non-Wildcards, which can only mean the deck table is wrong.
#[must_use]
pub fn new_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0u8;

    for shape in Shape::ALL_PLAYABLE {
        for &number in shape.numbers() {
            deck.push(Card::new(CardId::new(next_id), shape, number));
            next_id += 1;
        }
    }
    for _ in 0..WILDCARD_COUNT {
        deck.push(Card::new(CardId::new(next_id), Shape::Wildcard, WILDCARD_NUMBER));
        next_id += 1;
    }

    let mut seen = FxHashSet::default();
    for card in deck.iter().filter(|c| !c.is_wildcard()) {
        assert!(
            seen.insert((card.shape, card.number)),
            "duplicate card in deck: {card}"
        );
    }
    assert_eq!(deck.len(), DECK_SIZE, "deck must hold {DECK_SIZE} cards");

    deck
}

/// Return a uniformly shuffled copy of `cards`.
///
/// Fisher-Yates over a copy; the argument is left untouched.
#[must_use]
pub fn shuffle(cards: &[Card], rng: &mut MatchRng) -> Vec<Card> {
    let mut shuffled = cards.to_vec();
    rng.shuffle(&mut shuffled);
    shuffled
}

/// Build a full deck and shuffle it.
#[must_use]
pub fn shuffled_deck(rng: &mut MatchRng) -> Vec<Card> {
    let mut deck = new_deck();
    rng.shuffle(&mut deck);
    deck
}
