//! Effect node model.
//!
//! - `EffectNode` / `EffectKind`: the closed set of effect kinds
//! - `OutcomeContext`: names of the outcome edges between nodes
//! - `EffectTree`: arena holding nodes and their edges
//!
//! ## Design Philosophy
//!
//! Nodes never own their children. Edges live in the tree, keyed by the
//! parent's id, so a node is exactly one storage record and the nested
//! shape is recovered from the arena on demand.

mod context;
mod node;
mod tree;

pub use context::{OutcomeContext, UnknownContext};
pub use node::{
    ConditionEffect, Damage, DamageOutcome, DamageType, EffectKind, EffectNode, Escape, Healing,
    HealingType, NoteType, OutcomeAmount, RollAnnotation, SaveAbility, SavingThrow, TextNote,
};
pub use tree::{ChildList, Edges, EffectTree, TreeEditError};
