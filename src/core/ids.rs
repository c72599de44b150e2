//! Effect node identification.
//!
//! Every effect node carries an opaque `NodeId` that is stable across
//! flatten/reconstruct cycles. Ids authored by hand or by the host are kept
//! verbatim; ids minted by this crate are 16-character alphanumeric strings
//! drawn from an `IdAllocator`.
//!
//! ## Usage
//!
//! ```
//! use ability_effects::core::IdAllocator;
//!
//! let mut ids = IdAllocator::for_context("Bite: 2d6+4 Slashing");
//! let first = ids.next_id();
//! assert_eq!(first.as_str().len(), 16);
//!
//! // Same context, same ids
//! let mut again = IdAllocator::for_context("Bite: 2d6+4 Slashing");
//! assert_eq!(again.next_id(), first);
//! ```

use serde::{Deserialize, Serialize};

use super::rng::DiceRng;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 16;

/// Unique identifier for an effect node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node ID from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic source of fresh node ids.
///
/// Seeded allocators always mint the same sequence, which keeps parser
/// output and upcast results reproducible.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    rng: DiceRng,
}

impl IdAllocator {
    /// Create an allocator from a numeric seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: DiceRng::new(seed) }
    }

    /// Create an allocator seeded from a context string.
    #[must_use]
    pub fn for_context(context: &str) -> Self {
        Self {
            rng: DiceRng::for_label(context),
        }
    }

    /// Mint the next id.
    pub fn next_id(&mut self) -> NodeId {
        let id: String = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[self.rng.gen_range_usize(0..ID_ALPHABET.len())] as char)
            .collect();
        NodeId(id)
    }
}
