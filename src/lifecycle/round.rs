//! Dealing, round end and elimination.

use smallvec::SmallVec;
use tracing::info;

use crate::cards::{shuffled_deck, Shape};
use crate::core::{
    ConfigError, LogEntry, MatchConfig, MatchRng, MatchState, Phase, RoundEndRecord, Seat, SeatId,
};

const LOG_TARGET: &str = "whot_engine::lifecycle";

/// Cards dealt to each seat for a given number of active seats.
#[must_use]
pub fn cards_per_player(active_seats: usize) -> usize {
    match active_seats {
        4 => 6,
        3 => 9,
        2 => 12,
        _ => 6,
    }
}

/// Build seats from `config`, seed the RNG and deal the first round.
pub fn start_match(config: &MatchConfig) -> Result<MatchState, ConfigError> {
    config.validate()?;

    let seats = config
        .seats
        .iter()
        .enumerate()
        .map(|(i, seat)| Seat::new(SeatId::new(i as u8), seat.name.clone(), seat.computer))
        .collect();
    let rng = config.seed.map_or_else(MatchRng::from_entropy, MatchRng::new);

    let mut state = MatchState::new(seats, rng, config.penalty_rule);
    deal_round(&mut state);

    info!(
        target: LOG_TARGET,
        seats = state.seat_count(),
        seed = state.rng.seed(),
        "match started"
    );
    Ok(state)
}

/// Deal a fresh shuffled deck to the active seats and flip the first card.
///
/// Resets piles and pending effects, puts the turn on the first active seat,
/// and leaves the state in `Playing`.
pub fn deal_round(state: &mut MatchState) {
    state.phase = Phase::Dealing;
    state.pending_draw_count = 0;
    state.general_market_active = false;
    state.general_market_originator = None;
    state.skip_next_seat = false;
    state.chosen_shape = None;
    state.play_pile = im::Vector::new();

    for seat in &mut state.seats {
        seat.hand = im::Vector::new();
        seat.cards_played = 0;
    }

    let mut deck: im::Vector<_> = shuffled_deck(&mut state.rng).into_iter().collect();
    let per_seat = cards_per_player(state.active_count());
    let active: Vec<SeatId> = state.active_seats().map(|s| s.id).collect();

    for _ in 0..per_seat {
        for &seat in &active {
            if let Some(card) = deck.pop_back() {
                state.seats[seat.index()].hand.push_back(card);
            }
        }
    }
    state.draw_pile = deck;

    state.current_seat = active.first().copied().unwrap_or(SeatId::new(0));
    flip_first_card(state);
    state.phase = Phase::Playing;
}

/// Turn the top of the market face up to start the play pile.
///
/// A Wildcard gets a shape chosen uniformly at random. Other specials on
/// the opening card have no effect.
fn flip_first_card(state: &mut MatchState) {
    let Some(top) = state.draw_pile.pop_back() else {
        return;
    };
    state.play_pile.push_back(top);
    if top.is_wildcard() {
        state.chosen_shape = state.rng.choose(&Shape::ALL_PLAYABLE).copied();
    }
    state.push_log(LogEntry::Dealt {
        round: state.round_number,
        top,
    });
}

/// Score the round and eliminate the seat holding the most points.
///
/// Ties for the maximum are broken uniformly at random with the match RNG.
/// The first seat holding the minimum is recorded as round winner. Leaves
/// the state in `RoundEnd`, or `GameEnd` when at most one seat survives.
pub fn end_round(state: &mut MatchState) -> RoundEndRecord {
    let totals: Vec<(SeatId, u32)> = state
        .active_seats()
        .map(|s| (s.id, s.hand_total()))
        .collect();

    let max_total = totals.iter().map(|(_, t)| *t).max().unwrap_or(0);
    let candidates: SmallVec<[SeatId; 4]> = totals
        .iter()
        .filter(|(_, t)| *t == max_total)
        .map(|(s, _)| *s)
        .collect();
    let eliminated = if candidates.len() > 1 {
        state.rng.choose(&candidates).copied()
    } else {
        candidates.first().copied()
    }
    .unwrap_or(state.current_seat);

    let min_total = totals.iter().map(|(_, t)| *t).min().unwrap_or(0);
    let round_winner = totals
        .iter()
        .find(|(_, t)| *t == min_total)
        .map_or(state.current_seat, |(s, _)| *s);

    if let Some(seat) = state.seat_mut(eliminated) {
        seat.eliminated = true;
    }
    state.push_log(LogEntry::Eliminated {
        seat: eliminated,
        total: max_total,
    });

    let remaining: Vec<SeatId> = state.active_seats().map(|s| s.id).collect();
    let is_game_end = remaining.len() <= 1;
    if is_game_end {
        state.phase = Phase::GameEnd;
        state.winner = Some(remaining.first().copied().unwrap_or(round_winner));
    } else {
        state.phase = Phase::RoundEnd;
    }

    let record = RoundEndRecord {
        round_number: state.round_number,
        per_seat_totals: totals,
        eliminated_seat: eliminated,
        round_winner,
        is_game_end,
    };
    state.last_round = Some(record.clone());

    info!(
        target: LOG_TARGET,
        round = record.round_number,
        eliminated = %eliminated,
        total = max_total,
        winner = %round_winner,
        game_over = is_game_end,
        "round ended"
    );
    record
}

/// Build the state for the next round from a finished one.
///
/// The result is a new value: seats keep identity and elimination, the RNG
/// stream continues, everything else is dealt fresh.
#[must_use]
pub fn start_next_round(finished: &MatchState) -> MatchState {
    let mut seats = finished.seats.clone();
    for seat in &mut seats {
        seat.hand = im::Vector::new();
        seat.cards_played = 0;
    }

    let mut next = MatchState::new(seats, finished.rng.clone(), finished.penalty_rule);
    next.round_number = finished.round_number + 1;
    next.revision = finished.revision + 1;
    next.last_round = finished.last_round.clone();
    deal_round(&mut next);

    info!(
        target: LOG_TARGET,
        round = next.round_number,
        active = next.active_count(),
        first = %next.current_seat,
        "round dealt"
    );
    next
}
