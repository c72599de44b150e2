//! Activation evaluation.
//!
//! At the moment an ability fires, `evaluate` walks its effect tree, rolls
//! what needs rolling in node order, and hands back the rolls together with
//! an annotated copy of the tree ready to be flattened for storage.

mod actor;
mod evaluator;
mod options;

pub use actor::{ActorContext, ActorType, SubjectCategory};
pub use evaluator::{evaluate, primary_config, ActivationError, ActivationResult, ResolvedRoll, RollKind};
pub use options::ActivationOptions;
