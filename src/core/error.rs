//! Error taxonomy.
//!
//! - `ActionRejected`: illegal intents. Recovered locally, no state change.
//! - `InvariantViolation`: bugs in deck or pile bookkeeping. Unrecoverable.
//! - `StoreError`: the remote record is unreachable or gone. Ends the match.
//! - `ConfigError`: invalid match setup.

use thiserror::Error;

use super::player::SeatId;
use crate::cards::CardId;

/// Why an intent was refused. Surfaced to the submitter only.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("it is not {0}'s turn")]
    NotYourTurn(SeatId),

    #[error("{0} is not controlled by this client")]
    SeatNotOwned(SeatId),

    #[error("another action is still resolving")]
    ActionInFlight,

    #[error("no round is being played")]
    NotPlaying,

    #[error("{0} is not a seat at this table")]
    UnknownSeat(SeatId),

    #[error("{0} has been eliminated")]
    SeatEliminated(SeatId),

    #[error("card {0:?} is not in hand")]
    CardNotInHand(CardId),

    #[error("card {0:?} does not match the top of the pile")]
    IllegalCard(CardId),

    #[error("{count} card(s) must be drawn first")]
    PenaltyOwed { count: u32 },

    #[error("a Wildcard needs a chosen shape")]
    MissingShape,
}

/// Broken conservation or uniqueness. Indicates a bug, never user input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("card {0:?} appears more than once")]
    DuplicateCard(CardId),

    #[error("expected {expected} cards in circulation, found {found}")]
    CardCountMismatch { expected: usize, found: usize },
}

/// Failures talking to the shared match record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("match record {0} does not exist")]
    RecordMissing(String),

    #[error("could not encode or decode match record: {0}")]
    Codec(String),
}

/// Invalid match setup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a match needs 2 to 4 seats, got {0}")]
    SeatCount(usize),

    #[error("seat {0} has an empty name")]
    EmptySeatName(usize),

    #[error("no seat is controlled by this client")]
    NoLocalSeats,
}

/// Umbrella error for fallible engine entry points.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WhotError {
    #[error(transparent)]
    Rejected(#[from] ActionRejected),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ActionRejected::NotYourTurn(SeatId::new(2)).to_string(),
            "it is not Seat 2's turn"
        );
        assert_eq!(
            InvariantViolation::CardCountMismatch { expected: 54, found: 53 }.to_string(),
            "expected 54 cards in circulation, found 53"
        );
    }

    #[test]
    fn test_from_conversions() {
        let err: WhotError = ActionRejected::ActionInFlight.into();
        assert!(matches!(err, WhotError::Rejected(ActionRejected::ActionInFlight)));

        let err: WhotError = StoreError::RecordMissing("m1".into()).into();
        assert!(matches!(err, WhotError::Store(_)));
    }
}
