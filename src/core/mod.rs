//! Core types shared by every module: node ids and deterministic randomness.

pub mod ids;
pub mod rng;

pub use ids::{IdAllocator, NodeId};
pub use rng::DiceRng;
