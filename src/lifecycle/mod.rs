//! Turn and round lifecycle.
//!
//! Phase machine: `Dealing -> Playing -> RoundEnd -> (Playing | GameEnd)`.
//!
//! - `round`: dealing, scoring, elimination, next-round construction
//! - `turn`: applying one action and detecting the end of a round

pub mod round;
pub mod turn;

pub use round::{cards_per_player, deal_round, end_round, start_match, start_next_round};
pub use turn::{force_draw, play_turn, TurnOutcome};
