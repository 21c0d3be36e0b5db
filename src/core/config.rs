//! Match configuration.
//!
//! Hosts configure a match at startup by providing:
//! - `SeatConfig`: one per seat (2-4), human or computer
//! - `PenaltyRule`: how pending Pick2 / General Market draws may be answered
//! - `TimingConfig`: presentation and timer durations used by the coordinator
//!
//! `MatchConfig` combines these and is built with chained setters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Smallest table size.
pub const MIN_SEATS: usize = 2;

/// Largest table size.
pub const MAX_SEATS: usize = 4;

/// How a seat that owes a forced draw may respond.
///
/// Applied identically to human and computer seats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenaltyRule {
    /// A seat owing a Pick2 or General Market draw must draw.
    #[default]
    MustDraw,
    /// A seat owing a Pick2 penalty may answer with another Pick2, passing
    /// the accumulated debt on. General Market draws are still forced.
    StackPick2,
}

/// Configuration for a single seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConfig {
    /// Name shown to other players.
    pub name: String,
    /// Is this seat driven by the AI policy?
    pub computer: bool,
}

impl SeatConfig {
    /// A human-controlled seat.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computer: false,
        }
    }

    /// A computer-controlled seat.
    #[must_use]
    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computer: true,
        }
    }
}

/// Durations used by the coordinator's serialization window and timers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between accepting an action and committing it.
    pub presentation_delay: Duration,
    /// Delay before a computer seat acts.
    pub ai_think_delay: Duration,
    /// Delay between a round ending and the next deal.
    pub inter_round_delay: Duration,
    /// If set, a locally owned human seat that does not act in time is
    /// forced to draw.
    pub turn_timeout: Option<Duration>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            presentation_delay: Duration::from_millis(600),
            ai_think_delay: Duration::from_millis(800),
            inter_round_delay: Duration::from_secs(3),
            turn_timeout: None,
        }
    }
}

impl TimingConfig {
    /// All delays zero and no turn timer. Handy for headless runs.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            presentation_delay: Duration::ZERO,
            ai_think_delay: Duration::ZERO,
            inter_round_delay: Duration::ZERO,
            turn_timeout: None,
        }
    }
}

/// Complete match configuration.
///
/// ```
/// use whot_engine::core::{MatchConfig, PenaltyRule, SeatConfig};
///
/// let config = MatchConfig::new()
///     .seat(SeatConfig::human("Ada"))
///     .seat(SeatConfig::computer("Bot 1"))
///     .seat(SeatConfig::computer("Bot 2"))
///     .penalty_rule(PenaltyRule::StackPick2)
///     .seed(7);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.seats.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub seats: Vec<SeatConfig>,
    /// RNG seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    pub penalty_rule: PenaltyRule,
    pub timing: TimingConfig,
}

impl MatchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Solo table: one human against `computers` computer seats.
    #[must_use]
    pub fn solo(name: impl Into<String>, computers: usize) -> Self {
        let mut config = Self::new().seat(SeatConfig::human(name));
        for i in 0..computers {
            config = config.seat(SeatConfig::computer(format!("Computer {}", i + 1)));
        }
        config
    }

    #[must_use]
    pub fn seat(mut self, seat: SeatConfig) -> Self {
        self.seats.push(seat);
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn penalty_rule(mut self, rule: PenaltyRule) -> Self {
        self.penalty_rule = rule;
        self
    }

    #[must_use]
    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Check seat count and names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.seats.len();
        if !(MIN_SEATS..=MAX_SEATS).contains(&count) {
            return Err(ConfigError::SeatCount(count));
        }
        if let Some(index) = self.seats.iter().position(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::EmptySeatName(index));
        }
        Ok(())
    }
}
