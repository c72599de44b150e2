//! Deterministic random number generation for dice and id allocation.
//!
//! Same seed, same faces. Context labels derive stable sub-seeds, so ids
//! minted for the same input text come out identical run after run.
//!
//! ```
//! use ability_effects::core::DiceRng;
//!
//! let mut rng = DiceRng::new(42);
//! let face = rng.roll_die(8);
//! assert!((1..=8).contains(&face));
//!
//! let mut again = DiceRng::new(42);
//! assert_eq!(again.roll_die(8), face);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Deterministic RNG for dice rolls.
///
/// Uses ChaCha8 for speed while maintaining good statistical quality.
#[derive(Clone, Debug)]
pub struct DiceRng {
    inner: ChaCha8Rng,
}

impl DiceRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded from a label, e.g. an activation or action name.
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        Self::new(context_seed(0, label))
    }

    /// Roll a single die with the given number of faces.
    ///
    /// Returns a value in `1..=faces`. A zero-faced die always rolls 0.
    pub fn roll_die(&mut self, faces: u32) -> u32 {
        if faces == 0 {
            return 0;
        }
        self.inner.gen_range(1..=faces)
    }

    pub(crate) fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }
}

/// Derive a stable seed from a base seed and a context label.
///
/// Derived ids are persisted, so the input is fed to `FxHasher` as explicit
/// little-endian words rather than through `Hash` impls. The value is fixed
/// for a given `rustc-hash` release on 64-bit targets.
fn context_seed(seed: u64, context: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    for chunk in context.as_bytes().chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        hasher.write_u64(u64::from_le_bytes(word));
    }
    hasher.write_u64(context.len() as u64);
    hasher.finish()
}
