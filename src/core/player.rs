//! Seats: persistent participant slots.
//!
//! ## SeatId
//!
//! Seat identifiers are positional (0-based) and stable for the whole game.
//! Eliminated seats stay in the seat list so turn order and history never
//! shift.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};

/// Seat identifier, equal to the seat's position in turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(pub u8);

impl SeatId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seat IDs for a table of `seat_count` seats.
    ///
    /// ```
    /// use whot_engine::core::SeatId;
    ///
    /// let seats: Vec<_> = SeatId::all(3).collect();
    /// assert_eq!(seats, vec![SeatId::new(0), SeatId::new(1), SeatId::new(2)]);
    /// ```
    pub fn all(seat_count: usize) -> impl Iterator<Item = SeatId> {
        (0..seat_count as u8).map(SeatId)
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// A participant slot, human or computer-controlled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub display_name: String,
    /// Cards in hand, in the order they were received.
    pub hand: Vector<Card>,
    pub is_computer: bool,
    /// Set once by the lifecycle; never cleared.
    pub eliminated: bool,
    /// Cards played by this seat in the current round.
    pub cards_played: u32,
}

impl Seat {
    #[must_use]
    pub fn new(id: SeatId, display_name: impl Into<String>, is_computer: bool) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            hand: Vector::new(),
            is_computer,
            eliminated: false,
            cards_played: 0,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// Sum of point values left in hand.
    #[must_use]
    pub fn hand_total(&self) -> u32 {
        self.hand.iter().map(Card::point_value).sum()
    }

    /// Position of a card in hand by id.
    #[must_use]
    pub fn find_card(&self, card: CardId) -> Option<usize> {
        self.hand.iter().position(|c| c.id == card)
    }
}
