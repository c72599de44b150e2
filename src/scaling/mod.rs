//! Upcast scaling.
//!
//! Two phases: `validate` turns a mana spend into an `UpcastPlan` (or a
//! user-facing `ValidationError`), then `apply` / `apply_plan` run the
//! ability's deltas `steps` times on a copy.

mod apply;
mod profile;
mod spec;
mod validate;

pub use apply::{apply, apply_plan, apply_to_tree, ScaledSpell, ScalingError};
pub use profile::{ActorResources, AreaTemplate, Duration, SpellProfile, Targets};
pub use spec::{Delta, DeltaOperation, DiceDelta, ScalingChoice, ScalingMode, ScalingSpec};
pub use validate::{validate, UpcastPlan, ValidationError};
