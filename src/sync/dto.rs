//! Wire form of the shared match record.
//!
//! `MatchStateDto` is what the remote store holds: a plain snapshot of
//! `MatchState` (including the RNG position, so whichever client commits
//! next continues the same stream) plus seat identity metadata for the
//! profile collaborator.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Shape};
use crate::core::{
    LogEntry, MatchRng, MatchState, PenaltyRule, Phase, RngPosition, RoundEndRecord, Seat, SeatId,
    StoreError,
};

/// Identity of the participant behind a seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatIdentity {
    pub seat: SeatId,
    pub display_name: String,
    /// Account handle used by the identity/profile collaborator.
    pub account: Option<String>,
}

/// Plain serialization of every `MatchState` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub seats: Vec<Seat>,
    pub draw_pile: Vec<Card>,
    pub play_pile: Vec<Card>,
    pub current_seat: SeatId,
    pub pending_draw_count: u32,
    pub general_market_active: bool,
    pub general_market_originator: Option<SeatId>,
    pub skip_next_seat: bool,
    pub round_number: u32,
    pub phase: Phase,
    pub chosen_shape: Option<Shape>,
    pub penalty_rule: PenaltyRule,
    pub revision: u64,
    pub log: Vec<LogEntry>,
    pub last_round: Option<RoundEndRecord>,
    pub winner: Option<SeatId>,
    pub rng: RngPosition,
}

impl From<&MatchState> for MatchSnapshot {
    fn from(state: &MatchState) -> Self {
        Self {
            seats: state.seats.clone(),
            draw_pile: state.draw_pile.iter().copied().collect(),
            play_pile: state.play_pile.iter().copied().collect(),
            current_seat: state.current_seat,
            pending_draw_count: state.pending_draw_count,
            general_market_active: state.general_market_active,
            general_market_originator: state.general_market_originator,
            skip_next_seat: state.skip_next_seat,
            round_number: state.round_number,
            phase: state.phase,
            chosen_shape: state.chosen_shape,
            penalty_rule: state.penalty_rule,
            revision: state.revision,
            log: state.log.iter().cloned().collect(),
            last_round: state.last_round.clone(),
            winner: state.winner,
            rng: state.rng.position(),
        }
    }
}

impl MatchSnapshot {
    /// Rebuild the full state, restoring the RNG at its recorded position.
    #[must_use]
    pub fn into_state(self) -> MatchState {
        let mut state = MatchState::new(self.seats, MatchRng::at_position(&self.rng), self.penalty_rule);
        state.draw_pile = self.draw_pile.into_iter().collect();
        state.play_pile = self.play_pile.into_iter().collect();
        state.current_seat = self.current_seat;
        state.pending_draw_count = self.pending_draw_count;
        state.general_market_active = self.general_market_active;
        state.general_market_originator = self.general_market_originator;
        state.skip_next_seat = self.skip_next_seat;
        state.round_number = self.round_number;
        state.phase = self.phase;
        state.chosen_shape = self.chosen_shape;
        state.revision = self.revision;
        state.log = self.log.into_iter().collect();
        state.last_round = self.last_round;
        state.winner = self.winner;
        state
    }
}

/// The document stored under a match id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStateDto {
    pub state: MatchSnapshot,
    pub identities: Vec<SeatIdentity>,
}

impl MatchStateDto {
    /// Snapshot `state`. Seats without an entry in `identities` get one
    /// from their display name.
    #[must_use]
    pub fn new(state: &MatchState, identities: &[SeatIdentity]) -> Self {
        let identities = state
            .seats
            .iter()
            .map(|seat| {
                identities
                    .iter()
                    .find(|i| i.seat == seat.id)
                    .cloned()
                    .unwrap_or_else(|| SeatIdentity {
                        seat: seat.id,
                        display_name: seat.display_name.clone(),
                        account: None,
                    })
            })
            .collect();
        Self {
            state: MatchSnapshot::from(state),
            identities,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Codec(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Codec(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::Codec(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }
}
