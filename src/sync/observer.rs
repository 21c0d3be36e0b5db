//! Outbound notifications to the presentation layer and stats service.

use std::fmt;

use tokio::sync::mpsc;

use crate::core::{Action, MatchState, RoundEndRecord, SeatId, StoreError};

/// Why a match stopped being playable on this client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The local participant left.
    Left,
    /// The shared record was deleted.
    RecordRemoved,
    /// The store could not be reached.
    StoreFailed(StoreError),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left the match"),
            Self::RecordRemoved => write!(f, "match record removed"),
            Self::StoreFailed(e) => write!(f, "{e}"),
        }
    }
}

/// Presentation-layer hooks. All methods default to doing nothing.
///
/// Called without any coordinator lock held.
pub trait MatchObserver: Send + Sync {
    /// An action passed validation and is being presented.
    fn on_action_accepted(&self, _seat: SeatId, _action: &Action) {}

    /// A new authoritative state is in place (local commit or remote).
    fn on_state_committed(&self, _state: &MatchState) {}

    fn on_round_end(&self, _record: &RoundEndRecord) {}

    fn on_game_end(&self, _winner: Option<SeatId>) {}

    fn on_match_terminated(&self, _reason: &TerminationReason) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl MatchObserver for NullObserver {}

/// Observer notifications as values.
#[derive(Clone, Debug)]
pub enum ObserverEvent {
    ActionAccepted { seat: SeatId, action: Action },
    StateCommitted(MatchState),
    RoundEnded(RoundEndRecord),
    GameEnded(Option<SeatId>),
    Terminated(TerminationReason),
}

/// Forwards every notification into an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ObserverEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ObserverEvent) {
        // receiver gone means nobody is watching
        let _ = self.tx.send(event);
    }
}

impl MatchObserver for ChannelObserver {
    fn on_action_accepted(&self, seat: SeatId, action: &Action) {
        self.send(ObserverEvent::ActionAccepted {
            seat,
            action: *action,
        });
    }

    fn on_state_committed(&self, state: &MatchState) {
        self.send(ObserverEvent::StateCommitted(state.clone()));
    }

    fn on_round_end(&self, record: &RoundEndRecord) {
        self.send(ObserverEvent::RoundEnded(record.clone()));
    }

    fn on_game_end(&self, winner: Option<SeatId>) {
        self.send(ObserverEvent::GameEnded(winner));
    }

    fn on_match_terminated(&self, reason: &TerminationReason) {
        self.send(ObserverEvent::Terminated(reason.clone()));
    }
}

/// Receives per-round results for persistence.
///
/// Called once per finished round for each locally owned human seat.
pub trait StatsReporter: Send + Sync {
    /// `won` is true when `seat` emptied its hand this round.
    fn report_round_result(
        &self,
        seat: SeatId,
        won: bool,
        rounds_in_game: u32,
        cards_played_estimate: u32,
    );
}

/// Stats sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStats;

impl StatsReporter for NullStats {
    fn report_round_result(&self, _seat: SeatId, _won: bool, _rounds: u32, _cards: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards() {
        let (observer, mut rx) = ChannelObserver::new();

        observer.on_action_accepted(SeatId::new(1), &Action::Draw);
        observer.on_game_end(Some(SeatId::new(0)));
        observer.on_match_terminated(&TerminationReason::Left);

        assert!(matches!(
            rx.try_recv().unwrap(),
            ObserverEvent::ActionAccepted { seat, action: Action::Draw } if seat == SeatId::new(1)
        ));
        assert!(matches!(rx.try_recv().unwrap(), ObserverEvent::GameEnded(Some(_))));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ObserverEvent::Terminated(TerminationReason::Left)
        ));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_game_end(None);
    }

    #[test]
    fn test_termination_display() {
        let reason = TerminationReason::StoreFailed(StoreError::Unavailable("timeout".into()));
        assert_eq!(reason.to_string(), "store unavailable: timeout");
    }
}
