//! Match state: the authoritative record of one round in progress.
//!
//! ## MatchState
//!
//! - Seats (hands, elimination flags)
//! - Draw pile and play pile (top = back of the vector)
//! - Turn pointer and pending effects (Pick2 debt, HoldOn skip,
//!   General Market, Wildcard shape)
//! - Round number and phase
//! - RNG position and round log
//!
//! Uses `im` persistent vectors so the coordinator can clone the whole state,
//! apply a transition to the copy, and swap it in.
//!
//! ## RoundEndRecord
//!
//! Immutable summary produced once per round for presentation.

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::action::LogEntry;
use super::config::PenaltyRule;
use super::error::InvariantViolation;
use super::player::{Seat, SeatId};
use super::rng::MatchRng;
use crate::cards::{Card, Shape, DECK_SIZE};

/// Lifecycle phase of the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Dealing,
    Playing,
    RoundEnd,
    GameEnd,
}

/// Summary of a finished round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEndRecord {
    pub round_number: u32,
    /// Hand totals of every seat that was active when the round ended.
    pub per_seat_totals: Vec<(SeatId, u32)>,
    pub eliminated_seat: SeatId,
    /// Lowest total (first in seat order on ties). Display only.
    pub round_winner: SeatId,
    pub is_game_end: bool,
}

impl RoundEndRecord {
    /// Total for a seat, if it played this round.
    #[must_use]
    pub fn total_for(&self, seat: SeatId) -> Option<u32> {
        self.per_seat_totals
            .iter()
            .find(|(s, _)| *s == seat)
            .map(|(_, total)| *total)
    }
}

/// Complete state of a match.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub seats: Vec<Seat>,

    /// Face-down market. Top = back.
    pub draw_pile: Vector<Card>,

    /// Face-up discard stack. Top = back.
    pub play_pile: Vector<Card>,

    pub current_seat: SeatId,

    /// Accumulated Pick2 debt owed by the current seat.
    pub pending_draw_count: u32,

    pub general_market_active: bool,
    pub general_market_originator: Option<SeatId>,

    /// Consumed by the next turn advance.
    pub skip_next_seat: bool,

    /// Starts at 1.
    pub round_number: u32,
    pub phase: Phase,

    /// Shape bound by the Wildcard currently on top of the play pile.
    pub chosen_shape: Option<Shape>,

    pub penalty_rule: PenaltyRule,

    /// Bumped on every committed transition.
    pub revision: u64,

    pub log: Vector<LogEntry>,

    /// Record of the most recently finished round.
    pub last_round: Option<RoundEndRecord>,

    /// Set when the phase reaches `GameEnd`.
    pub winner: Option<SeatId>,

    pub rng: MatchRng,
}

impl MatchState {
    /// Create an empty state in `Dealing` with no cards placed.
    #[must_use]
    pub fn new(seats: Vec<Seat>, rng: MatchRng, penalty_rule: PenaltyRule) -> Self {
        Self {
            seats,
            draw_pile: Vector::new(),
            play_pile: Vector::new(),
            current_seat: SeatId::new(0),
            pending_draw_count: 0,
            general_market_active: false,
            general_market_originator: None,
            skip_next_seat: false,
            round_number: 1,
            phase: Phase::Dealing,
            chosen_shape: None,
            penalty_rule,
            revision: 0,
            log: Vector::new(),
            last_round: None,
            winner: None,
            rng,
        }
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn seat(&self, seat: SeatId) -> Option<&Seat> {
        self.seats.get(seat.index())
    }

    pub fn seat_mut(&mut self, seat: SeatId) -> Option<&mut Seat> {
        self.seats.get_mut(seat.index())
    }

    /// Iterate over seats that have not been eliminated.
    pub fn active_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_active())
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_seats().count()
    }

    #[must_use]
    pub fn is_active(&self, seat: SeatId) -> bool {
        self.seat(seat).is_some_and(Seat::is_active)
    }

    #[must_use]
    pub fn top_card(&self) -> Option<&Card> {
        self.play_pile.back()
    }

    #[must_use]
    pub fn hand(&self, seat: SeatId) -> Option<&Vector<Card>> {
        self.seat(seat).map(|s| &s.hand)
    }

    #[must_use]
    pub fn is_turn_of(&self, seat: SeatId) -> bool {
        self.phase == Phase::Playing && self.current_seat == seat
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push_back(entry);
    }

    /// Number of cards currently in circulation.
    #[must_use]
    pub fn cards_in_circulation(&self) -> usize {
        self.draw_pile.len()
            + self.play_pile.len()
            + self.active_seats().map(|s| s.hand.len()).sum::<usize>()
    }

    /// Verify that draw pile, play pile and active hands hold the full deck
    /// exactly once.
    ///
    /// Only meaningful while a round is dealt or being played; after
    /// elimination the eliminated hand has left circulation.
    pub fn check_conservation(&self) -> Result<(), InvariantViolation> {
        if !matches!(self.phase, Phase::Dealing | Phase::Playing) {
            return Ok(());
        }

        let found = self.cards_in_circulation();
        if found != DECK_SIZE {
            return Err(InvariantViolation::CardCountMismatch {
                expected: DECK_SIZE,
                found,
            });
        }

        let mut seen = FxHashSet::default();
        let all_cards = self
            .draw_pile
            .iter()
            .chain(self.play_pile.iter())
            .chain(self.active_seats().flat_map(|s| s.hand.iter()));
        for card in all_cards {
            if !seen.insert(card.id) {
                return Err(InvariantViolation::DuplicateCard(card.id));
            }
        }
        Ok(())
    }
}
