//! # ability-effects
//!
//! Effect-resolution engine for a tabletop ability system: what a spell,
//! attack or feature *does*, as a tree of typed effect nodes.
//!
//! ## Design Principles
//!
//! 1. **Closed Effect Set**: Every effect is one `EffectKind` variant.
//!    Outcome edges are checked against the kind that owns them.
//!
//! 2. **Flat Storage**: Trees are persisted only as an ordered list of
//!    records with parent pointers. `reconstruct(flatten(t)) == t`.
//!
//! 3. **Copies, Never Mutation**: Editing, scaling and evaluation all
//!    return new trees. `im` persistent maps make the copies O(1).
//!
//! 4. **Deterministic**: New ids and dice come from seeded ChaCha8
//!    streams, so re-running a transformation gives the same result.
//!
//! ## Flow
//!
//! ```text
//! stored FlatList -> reconstruct -> scaling::apply -> activation::evaluate
//!                                                       -> rolls + annotated tree -> flatten -> stored
//! imported text -> parser::parse_action -> FlatList -> stored
//! ```
//!
//! ## Modules
//!
//! - `core`: Node ids, id allocation, deterministic RNG
//! - `effects`: Effect nodes, outcome edges, the arena tree and its edits
//! - `codec`: Flatten/reconstruct, nested authored trees, `@{...}` references
//! - `dice`: Dice formulas, damage rolls with crit/miss, plain rolls
//! - `scaling`: Upcast validation and delta application
//! - `parser`: Description parser for imported monster actions
//! - `activation`: Rolls an effect tree when an ability fires

pub mod activation;
pub mod codec;
pub mod core;
pub mod dice;
pub mod effects;
pub mod parser;
pub mod scaling;

// Re-export commonly used types
pub use crate::core::{DiceRng, IdAllocator, NodeId};

pub use crate::effects::{
    ConditionEffect, Damage, DamageOutcome, DamageType, EffectKind, EffectNode, EffectTree,
    Healing, OutcomeContext, SaveAbility, SavingThrow, TextNote, TreeEditError,
};

pub use crate::codec::{flatten, reconstruct, CodecError, FlatList, NestedNode};

pub use crate::dice::{DamageRoll, DiceFormula, DiceSource, PlainRoll, RollOutcome};

pub use crate::scaling::{
    apply, apply_plan, validate, ActorResources, Delta, ScaledSpell, ScalingError, ScalingSpec,
    SpellProfile, UpcastPlan, ValidationError,
};

pub use crate::parser::{build_effect_tree, parse_action, parse_actions, MonsterAction};

pub use crate::activation::{
    evaluate, ActivationError, ActivationOptions, ActivationResult, ActorContext, ActorType,
    SubjectCategory,
};
