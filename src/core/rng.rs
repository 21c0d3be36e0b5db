//! The match RNG: deck shuffles, elimination tie-breaks, opening Wildcard
//! shapes and computer-seat choices all draw from it.
//!
//! The stream position is part of `MatchState`, so a replicated record
//! carries it and whichever client commits next continues the same
//! sequence. Computer seats use a derived stream so their choices never
//! shift the match stream.
//!
//! ```
//! use whot_engine::core::{MatchRng, AI_STREAM};
//!
//! let match_rng = MatchRng::new(42);
//! let mut ai = match_rng.derive(AI_STREAM);
//! let mut again = match_rng.derive(AI_STREAM);
//!
//! assert_eq!(ai.index(1000), again.index(1000));
//! assert_eq!(match_rng.position(), MatchRng::new(42).position());
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Label of the stream computer seats draw from.
pub const AI_STREAM: u64 = 1;

/// Seeded ChaCha8 stream with a serializable position.
#[derive(Clone, Debug)]
pub struct MatchRng {
    stream: ChaCha8Rng,
    seed: u64,
}

impl MatchRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy, for matches configured without a seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// An independent stream identified by `label`. Does not advance `self`.
    #[must_use]
    pub fn derive(&self, label: u64) -> Self {
        Self::new(self.seed ^ label.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Uniform index in `0..len`, or `None` when `len` is zero.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.stream.gen_range(0..len))
    }

    /// Fisher-Yates in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.stream);
    }

    /// Uniformly chosen element. Empty slices consume nothing.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }

    #[must_use]
    pub fn position(&self) -> RngPosition {
        RngPosition {
            seed: self.seed,
            word_pos: self.stream.get_word_pos(),
        }
    }

    /// Resume a stream exactly where `position` left it.
    #[must_use]
    pub fn at_position(position: &RngPosition) -> Self {
        let mut rng = Self::new(position.seed);
        rng.stream.set_word_pos(position.word_pos);
        rng
    }
}

/// Where a [`MatchRng`] stands: its seed and ChaCha word offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RngPosition {
    pub seed: u64,
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(rng: &mut MatchRng) -> Vec<usize> {
        (0..16).filter_map(|_| rng.index(54)).collect()
    }

    #[test]
    fn test_same_seed_same_shuffle() {
        let mut a: Vec<u8> = (0..54).collect();
        let mut b = a.clone();

        MatchRng::new(7).shuffle(&mut a);
        MatchRng::new(7).shuffle(&mut b);

        assert_eq!(a, b);
        assert_ne!(a, (0..54).collect::<Vec<u8>>());
    }

    #[test]
    fn test_derived_stream_leaves_parent_alone() {
        let mut parent = MatchRng::new(42);
        let before = parent.position();
        let mut ai = parent.derive(AI_STREAM);

        assert_eq!(parent.position(), before);
        assert_ne!(draws(&mut parent), draws(&mut ai));
        assert_ne!(MatchRng::new(42).derive(2).seed(), MatchRng::new(42).derive(AI_STREAM).seed());
    }

    #[test]
    fn test_index_and_choose_on_empty() {
        let mut rng = MatchRng::new(3);
        let before = rng.position();

        assert_eq!(rng.index(0), None);
        assert!(rng.choose::<u8>(&[]).is_none());
        assert_eq!(rng.position(), before);
        assert!(rng.index(4).is_some_and(|i| i < 4));
    }

    #[test]
    fn test_position_resumes_mid_stream() {
        let mut rng = MatchRng::new(42);
        draws(&mut rng);

        let saved = rng.position();
        let expected = draws(&mut rng);

        assert_eq!(draws(&mut MatchRng::at_position(&saved)), expected);
    }

    #[test]
    fn test_position_serde() {
        let position = RngPosition {
            seed: 42,
            word_pos: 12345,
        };
        let json = serde_json::to_string(&position).unwrap();
        assert_eq!(serde_json::from_str::<RngPosition>(&json).unwrap(), position);
    }
}
