//! Card identity: shape, number, and the special effect they imply.

use serde::{Deserialize, Serialize};

/// Number printed on every Wildcard. Also its point value at round end.
pub const WILDCARD_NUMBER: u8 = 20;

/// Card identifier, stable for the lifetime of a round's deck.
///
/// Assigned in deck construction order (0..54) so identity survives
/// shuffles, serialization and replication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Card shapes. `Wildcard` is the "Whot" card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Triangle,
    Cross,
    Square,
    Star,
    Wildcard,
}

impl Shape {
    /// The five shapes a Wildcard can bind to.
    pub const ALL_PLAYABLE: [Shape; 5] = [
        Shape::Circle,
        Shape::Triangle,
        Shape::Cross,
        Shape::Square,
        Shape::Star,
    ];

    /// Numbers printed on this shape in a full deck.
    #[must_use]
    pub fn numbers(self) -> &'static [u8] {
        match self {
            Shape::Circle | Shape::Triangle => &[1, 2, 3, 4, 5, 7, 8, 10, 11, 12, 13, 14],
            Shape::Cross | Shape::Square => &[1, 2, 3, 5, 7, 10, 11, 13, 14],
            Shape::Star => &[1, 2, 3, 4, 5, 7, 8],
            Shape::Wildcard => &[WILDCARD_NUMBER],
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Shape::Circle => "Circle",
            Shape::Triangle => "Triangle",
            Shape::Cross => "Cross",
            Shape::Square => "Square",
            Shape::Star => "Star",
            Shape::Wildcard => "Whot",
        };
        f.write_str(name)
    }
}

/// Special effect carried by a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    None,
    /// Skips the next seat.
    HoldOn,
    /// Next seat owes two extra draws.
    Pick2,
    /// Every other seat draws once before the turn returns.
    GeneralMarket,
    /// Playable on anything; binds a chosen shape.
    Wildcard,
}

impl Special {
    /// Derive the special from a shape and number.
    #[must_use]
    pub fn derive(shape: Shape, number: u8) -> Self {
        if shape == Shape::Wildcard {
            return Special::Wildcard;
        }
        match number {
            1 => Special::HoldOn,
            2 => Special::Pick2,
            14 => Special::GeneralMarket,
            _ => Special::None,
        }
    }
}

/// A single card.
///
/// `special` is always derived from `shape` and `number`; use [`Card::new`]
/// rather than building the struct by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub shape: Shape,
    pub number: u8,
    pub special: Special,
}

impl Card {
    /// Create a card, deriving its special effect.
    #[must_use]
    pub fn new(id: CardId, shape: Shape, number: u8) -> Self {
        let number = if shape == Shape::Wildcard { WILDCARD_NUMBER } else { number };
        Self {
            id,
            shape,
            number,
            special: Special::derive(shape, number),
        }
    }

    /// Create a Wildcard.
    #[must_use]
    pub fn wildcard(id: CardId) -> Self {
        Self::new(id, Shape::Wildcard, WILDCARD_NUMBER)
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.special == Special::Wildcard
    }

    /// Round-end scoring value: the face number, or 20 for a Wildcard.
    #[must_use]
    pub fn point_value(&self) -> u32 {
        if self.is_wildcard() {
            u32::from(WILDCARD_NUMBER)
        } else {
            u32::from(self.number)
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_wildcard() {
            write!(f, "Whot")
        } else {
            write!(f, "{} {}", self.shape, self.number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_derivation() {
        assert_eq!(Special::derive(Shape::Circle, 1), Special::HoldOn);
        assert_eq!(Special::derive(Shape::Star, 2), Special::Pick2);
        assert_eq!(Special::derive(Shape::Cross, 14), Special::GeneralMarket);
        assert_eq!(Special::derive(Shape::Wildcard, 20), Special::Wildcard);
        assert_eq!(Special::derive(Shape::Square, 7), Special::None);
    }

    #[test]
    fn test_wildcard_number_is_sentinel() {
        let card = Card::new(CardId::new(0), Shape::Wildcard, 3);
        assert_eq!(card.number, WILDCARD_NUMBER);
        assert!(card.is_wildcard());
    }

    #[test]
    fn test_point_value() {
        assert_eq!(Card::new(CardId::new(0), Shape::Circle, 13).point_value(), 13);
        assert_eq!(Card::wildcard(CardId::new(1)).point_value(), 20);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::new(CardId::new(0), Shape::Triangle, 5).to_string(), "Triangle 5");
        assert_eq!(Card::wildcard(CardId::new(1)).to_string(), "Whot");
    }
}
