//! Rule engine.
//!
//! - `legality`: what a seat may play, what it owes, and the single
//!   validation gate shared by every seat type
//! - `engine`: special-card effects, turn advancement, market refill and
//!   the action applier
//!
//! Everything operates on a `MatchState` value and never looks at who is
//! driving the seat.

pub mod engine;
pub mod legality;

pub use engine::{
    advance_turn, apply_action, draw_cards, next_active_seat, reshuffle_if_needed,
    resolve_play_effect, Resolution,
};
pub use legality::{is_legal_play, legal_actions, legal_cards, owed_draw, validate};
