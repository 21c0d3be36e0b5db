//! State transitions: play effects, turn advancement, market handling.
//!
//! Every function here mutates the `MatchState` it is given. Callers that
//! need a pure transition clone first; `im` vectors make that cheap.

use tracing::debug;

use super::legality::{owed_draw, validate};
use crate::cards::{self, Card, Shape, Special};
use crate::core::{Action, ActionRejected, LogEntry, MatchState, SeatId};

const LOG_TARGET: &str = "whot_engine::rules";

/// What an applied action left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The turn moved on.
    TurnPassed,
    /// The acting seat emptied its hand. The turn pointer is left on it.
    HandEmptied,
}

/// Put `card` on the play pile and apply its special effect.
///
/// `chosen_shape` binds a Wildcard. Any non-Wildcard play clears the
/// previous binding. The card must already be out of the seat's hand.
pub fn resolve_play_effect(
    state: &mut MatchState,
    seat: SeatId,
    card: Card,
    chosen_shape: Option<Shape>,
) {
    state.play_pile.push_back(card);
    state.push_log(LogEntry::Played { seat, card });

    match card.special {
        Special::Wildcard => {
            state.chosen_shape = chosen_shape;
            if let Some(shape) = chosen_shape {
                state.push_log(LogEntry::ShapeChosen { seat, shape });
            }
        }
        Special::Pick2 => {
            state.chosen_shape = None;
            state.pending_draw_count += 2;
        }
        Special::HoldOn => {
            state.chosen_shape = None;
            state.skip_next_seat = true;
        }
        Special::GeneralMarket => {
            state.chosen_shape = None;
            state.general_market_active = true;
            state.general_market_originator = Some(seat);
        }
        Special::None => {
            state.chosen_shape = None;
        }
    }
}

/// First active seat after `from` in turn order, wrapping around.
///
/// Returns `from` when it is the only active seat.
#[must_use]
pub fn next_active_seat(state: &MatchState, from: SeatId) -> SeatId {
    let count = state.seat_count();
    (1..=count)
        .map(|offset| SeatId::new(((from.index() + offset) % count) as u8))
        .find(|&seat| state.is_active(seat))
        .unwrap_or(from)
}

/// Move the turn to the next eligible seat.
///
/// A pending HoldOn skips exactly one seat and is consumed. If a General
/// Market is running and the turn lands on its originator, it ends.
pub fn advance_turn(state: &mut MatchState) {
    let mut next = next_active_seat(state, state.current_seat);

    if state.skip_next_seat {
        state.skip_next_seat = false;
        state.push_log(LogEntry::Skipped { seat: next });
        next = next_active_seat(state, next);
    }

    state.current_seat = next;

    if state.general_market_active && state.general_market_originator == Some(next) {
        state.general_market_active = false;
        state.general_market_originator = None;
        state.push_log(LogEntry::GeneralMarketEnded { originator: next });
    }
}

/// Refill the market from the play pile when it is down to one card.
///
/// Everything under the top play-pile card is shuffled and placed beneath
/// whatever is left in the market. Returns whether a reshuffle happened.
pub fn reshuffle_if_needed(state: &mut MatchState) -> bool {
    if state.draw_pile.len() > 1 || state.play_pile.len() <= 1 {
        return false;
    }

    let Some(top) = state.play_pile.pop_back() else {
        return false;
    };
    let under: Vec<Card> = state.play_pile.iter().copied().collect();
    let shuffled = cards::shuffle(&under, &mut state.rng);
    let moved = shuffled.len();

    let mut draw_pile: im::Vector<Card> = shuffled.into_iter().collect();
    draw_pile.append(std::mem::take(&mut state.draw_pile));
    state.draw_pile = draw_pile;
    state.play_pile = im::vector![top];

    state.push_log(LogEntry::Reshuffled { cards: moved });
    debug!(target: LOG_TARGET, moved, "reshuffled play pile into market");
    true
}

/// Draw `count` cards from the market into `seat`'s hand.
///
/// Reshuffles as needed before each card. Stops early only when the market
/// is empty even after reshuffling. Returns the number of cards drawn.
pub fn draw_cards(state: &mut MatchState, seat: SeatId, count: u32) -> u32 {
    let mut drawn = 0;
    for _ in 0..count {
        reshuffle_if_needed(state);
        let Some(card) = state.draw_pile.pop_back() else {
            break;
        };
        match state.seat_mut(seat) {
            Some(seat_ref) => seat_ref.hand.push_back(card),
            None => {
                state.draw_pile.push_back(card);
                break;
            }
        }
        drawn += 1;
    }
    drawn
}

/// Validate and apply one action for `seat`.
///
/// A play moves the card and resolves its effect; a draw takes whatever
/// the seat owes (or one card) and clears Pick2 debt. If the play empties
/// the hand the turn is not advanced and the caller ends the round.
pub fn apply_action(
    state: &mut MatchState,
    seat: SeatId,
    action: &Action,
) -> Result<Resolution, ActionRejected> {
    validate(state, seat, action)?;

    match *action {
        Action::Play { card, shape } => {
            let seat_ref = state
                .seat_mut(seat)
                .ok_or(ActionRejected::UnknownSeat(seat))?;
            let pos = seat_ref
                .find_card(card)
                .ok_or(ActionRejected::CardNotInHand(card))?;
            let card = seat_ref.hand.remove(pos);
            seat_ref.cards_played += 1;
            let emptied = seat_ref.hand.is_empty();

            resolve_play_effect(state, seat, card, shape);
            debug!(target: LOG_TARGET, %seat, %card, "card played");

            if emptied {
                return Ok(Resolution::HandEmptied);
            }
        }
        Action::Draw => {
            let count = owed_draw(state, seat).unwrap_or(1);
            let drawn = draw_cards(state, seat, count);
            state.pending_draw_count = 0;
            state.push_log(LogEntry::Drew { seat, count: drawn });
            debug!(target: LOG_TARGET, %seat, drawn, "cards drawn");
        }
    }

    advance_turn(state);
    Ok(Resolution::TurnPassed)
}
