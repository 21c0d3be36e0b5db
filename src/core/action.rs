//! Actions a seat can take, and the round log they leave behind.
//!
//! A turn is either a play of one card from hand (with a chosen shape when
//! the card is a Wildcard) or a draw. How many cards a draw takes is decided
//! by the rules, not by the action: a seat owing a penalty draws what it
//! owes, otherwise one card.

use serde::{Deserialize, Serialize};

use super::player::SeatId;
use crate::cards::{Card, CardId, Shape};

/// A complete turn action.
///
/// ```
/// use whot_engine::cards::{CardId, Shape};
/// use whot_engine::core::Action;
///
/// let play = Action::play(CardId::new(4));
/// let whot = Action::play_wildcard(CardId::new(50), Shape::Star);
/// assert!(play.is_play());
/// assert_eq!(whot.card(), Some(CardId::new(50)));
/// assert!(!Action::Draw.is_play());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play a card from hand. `shape` is required for Wildcards and ignored
    /// otherwise.
    Play { card: CardId, shape: Option<Shape> },
    /// Draw from the market.
    Draw,
}

impl Action {
    /// Play a non-Wildcard card.
    #[must_use]
    pub fn play(card: CardId) -> Self {
        Action::Play { card, shape: None }
    }

    /// Play a Wildcard, binding `shape`.
    #[must_use]
    pub fn play_wildcard(card: CardId, shape: Shape) -> Self {
        Action::Play {
            card,
            shape: Some(shape),
        }
    }

    #[must_use]
    pub fn is_play(&self) -> bool {
        matches!(self, Action::Play { .. })
    }

    /// The card being played, if any.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            Action::Play { card, .. } => Some(*card),
            Action::Draw => None,
        }
    }
}

/// One entry in the round log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    Dealt { round: u32, top: Card },
    Played { seat: SeatId, card: Card },
    ShapeChosen { seat: SeatId, shape: Shape },
    Drew { seat: SeatId, count: u32 },
    Skipped { seat: SeatId },
    GeneralMarketEnded { originator: SeatId },
    Reshuffled { cards: usize },
    TurnTimedOut { seat: SeatId },
    Eliminated { seat: SeatId, total: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_helpers() {
        let play = Action::play(CardId::new(3));
        assert!(play.is_play());
        assert_eq!(play.card(), Some(CardId::new(3)));
        assert_eq!(play, Action::Play { card: CardId::new(3), shape: None });

        assert_eq!(Action::Draw.card(), None);
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::play_wildcard(CardId::new(51), Shape::Cross);
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn test_log_entry_serialization() {
        let entry = LogEntry::Drew { seat: SeatId::new(1), count: 2 };
        let json = serde_json::to_string(&entry).unwrap();
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
