//! Core engine types: seats, state, actions, RNG, configuration, errors.

pub mod action;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, LogEntry};
pub use config::{MatchConfig, PenaltyRule, SeatConfig, TimingConfig, MAX_SEATS, MIN_SEATS};
pub use error::{ActionRejected, ConfigError, InvariantViolation, StoreError, WhotError};
pub use player::{Seat, SeatId};
pub use rng::{MatchRng, RngPosition, AI_STREAM};
pub use state::{MatchState, Phase, RoundEndRecord};
