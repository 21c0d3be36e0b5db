//! Legality checks: what a seat may do right now.

use crate::cards::{Card, Shape, Special};
use crate::core::{Action, ActionRejected, MatchState, PenaltyRule, Phase, SeatId};

/// Can `card` be played on `top`?
///
/// - Wildcards are always legal on a non-empty pile.
/// - With a chosen shape in force, only that shape matches.
/// - Otherwise shape or number must match.
///
/// An empty play pile accepts nothing; the first card is placed by dealing.
#[must_use]
pub fn is_legal_play(card: &Card, top: Option<&Card>, chosen_shape: Option<Shape>) -> bool {
    let Some(top) = top else {
        return false;
    };
    if card.is_wildcard() {
        return true;
    }
    if let Some(shape) = chosen_shape {
        return card.shape == shape;
    }
    card.shape == top.shape || card.number == top.number
}

/// The forced draw `seat` currently owes, if any.
///
/// Pick2 debt takes precedence; otherwise an active General Market costs
/// every seat but its originator one card.
#[must_use]
pub fn owed_draw(state: &MatchState, seat: SeatId) -> Option<u32> {
    if state.current_seat != seat {
        return None;
    }
    if state.pending_draw_count > 0 {
        return Some(state.pending_draw_count);
    }
    if state.general_market_active && state.general_market_originator != Some(seat) {
        return Some(1);
    }
    None
}

/// Check whether `seat` may take `action` in `state`.
///
/// This is the single gate every seat type goes through, so the penalty
/// rule applies the same way to humans and computers.
pub fn validate(state: &MatchState, seat: SeatId, action: &Action) -> Result<(), ActionRejected> {
    if state.phase != Phase::Playing {
        return Err(ActionRejected::NotPlaying);
    }
    let Some(seat_ref) = state.seat(seat) else {
        return Err(ActionRejected::UnknownSeat(seat));
    };
    if seat_ref.eliminated {
        return Err(ActionRejected::SeatEliminated(seat));
    }
    if state.current_seat != seat {
        return Err(ActionRejected::NotYourTurn(seat));
    }

    let (card_id, shape) = match *action {
        Action::Draw => return Ok(()),
        Action::Play { card, shape } => (card, shape),
    };

    let card = seat_ref
        .find_card(card_id)
        .map(|pos| seat_ref.hand[pos])
        .ok_or(ActionRejected::CardNotInHand(card_id))?;

    if card.is_wildcard() && !matches!(shape, Some(s) if s != Shape::Wildcard) {
        return Err(ActionRejected::MissingShape);
    }

    if let Some(count) = owed_draw(state, seat) {
        let may_stack = state.penalty_rule == PenaltyRule::StackPick2
            && state.pending_draw_count > 0
            && card.special == Special::Pick2;
        if !may_stack {
            return Err(ActionRejected::PenaltyOwed { count });
        }
    }

    if !is_legal_play(&card, state.top_card(), state.chosen_shape) {
        return Err(ActionRejected::IllegalCard(card_id));
    }
    Ok(())
}

/// Cards in `seat`'s hand that may be played now.
#[must_use]
pub fn legal_cards(state: &MatchState, seat: SeatId) -> Vec<Card> {
    let Some(seat_ref) = state.seat(seat) else {
        return Vec::new();
    };
    seat_ref
        .hand
        .iter()
        .filter(|card| {
            let probe = if card.is_wildcard() {
                Action::play_wildcard(card.id, Shape::Circle)
            } else {
                Action::play(card.id)
            };
            validate(state, seat, &probe).is_ok()
        })
        .copied()
        .collect()
}

/// Every legal action for `seat`. Wildcards expand to one action per shape.
///
/// Empty when it is not the seat's turn.
#[must_use]
pub fn legal_actions(state: &MatchState, seat: SeatId) -> Vec<Action> {
    if validate(state, seat, &Action::Draw).is_err() {
        return Vec::new();
    }

    let mut actions = Vec::new();
    for card in legal_cards(state, seat) {
        if card.is_wildcard() {
            actions.extend(
                Shape::ALL_PLAYABLE
                    .iter()
                    .map(|&shape| Action::play_wildcard(card.id, shape)),
            );
        } else {
            actions.push(Action::play(card.id));
        }
    }
    actions.push(Action::Draw);
    actions
}
