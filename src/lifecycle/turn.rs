//! Turn driver: applies one action and moves the phase machine forward.

use crate::core::{Action, ActionRejected, LogEntry, MatchState, RoundEndRecord, SeatId};
use crate::rules::{apply_action, Resolution};

use super::round::end_round;

/// Result of a committed turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Play continues; the turn is on `next`.
    Continued { next: SeatId },
    /// A hand emptied. The round has been scored and a seat eliminated.
    /// Check `record.is_game_end` for the end of the match.
    RoundEnded(RoundEndRecord),
}

/// Apply `action` for `seat`, ending the round if its hand empties.
///
/// Bumps the state revision on success. On rejection the state is left
/// untouched.
pub fn play_turn(
    state: &mut MatchState,
    seat: SeatId,
    action: &Action,
) -> Result<TurnOutcome, ActionRejected> {
    let resolution = apply_action(state, seat, action)?;
    state.revision += 1;

    Ok(match resolution {
        Resolution::TurnPassed => TurnOutcome::Continued {
            next: state.current_seat,
        },
        Resolution::HandEmptied => TurnOutcome::RoundEnded(end_round(state)),
    })
}

/// Force the current seat to draw whatever it owes (or one card).
///
/// Used when a turn timer expires. Never ends a round.
pub fn force_draw(state: &mut MatchState, seat: SeatId) -> Result<TurnOutcome, ActionRejected> {
    let outcome = play_turn(state, seat, &Action::Draw)?;
    state.push_log(LogEntry::TurnTimedOut { seat });
    Ok(outcome)
}
