//! AI move selection for computer-controlled seats.

pub mod policy;

pub use policy::{choose_ai_action, RandomPolicy, SeatPolicy};
