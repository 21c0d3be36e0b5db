//! # whot-engine
//!
//! Rules and match engine for the Whot shedding card game, for 2-4 seats
//! mixing local humans, computer opponents and remote players.
//!
//! ## Design Principles
//!
//! 1. **One rule engine**: every seat, human or computer, local or remote,
//!    goes through the same validation gate and transition functions.
//!
//! 2. **Values, not shared mutation**: `MatchState` uses `im-rs` persistent
//!    vectors, so a transition is applied to a cheap copy which then
//!    replaces the authoritative state wholesale.
//!
//! 3. **Deterministic**: the shuffle/tie-break RNG is part of the state and
//!    travels with replicated records.
//!
//! ## Modules
//!
//! - `cards`: card identity and the 54-card deck
//! - `core`: seats, state, actions, RNG, configuration, errors
//! - `rules`: legality, special-card effects, turn advancement, market refill
//! - `lifecycle`: dealing, scoring, elimination, round transitions
//! - `ai`: computer seat policy
//! - `sync`: coordinator, transports, remote store, observers, timers

pub mod ai;
pub mod cards;
pub mod core;
pub mod lifecycle;
pub mod rules;
pub mod sync;

pub use crate::cards::{Card, CardId, Shape, Special};

pub use crate::core::{
    Action, ActionRejected, LogEntry, MatchConfig, MatchRng, MatchState, PenaltyRule, Phase,
    RoundEndRecord, Seat, SeatConfig, SeatId, TimingConfig, WhotError,
};

pub use crate::rules::{apply_action, is_legal_play, legal_actions, validate};

pub use crate::lifecycle::{end_round, play_turn, start_match, start_next_round, TurnOutcome};

pub use crate::ai::{choose_ai_action, RandomPolicy, SeatPolicy};

pub use crate::sync::{
    Coordinator, CoordinatorConfig, CoordinatorPhase, MatchObserver, MatchStateDto, MemoryStore,
    RemoteStore, StatsReporter, Submission,
};
