//! Delta application, the second phase of scaling.
//!
//! Every application works on a copy: the input profile is never touched,
//! and applying the same steps to the same original always yields the same
//! result (new node ids included).

use serde::Serialize;

use crate::core::{IdAllocator, NodeId};
use crate::effects::{ConditionEffect, EffectKind, EffectNode, EffectTree};

use super::profile::{AreaTemplate, Duration, SpellProfile, Targets};
use super::spec::{Delta, DeltaOperation, ScalingMode, ScalingSpec};
use super::validate::{UpcastPlan, ValidationError};

/// Structural errors raised while applying deltas.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScalingError {
    #[error("this ability requires a scaling choice")]
    MissingChoice,

    #[error("scaling choice {index} is out of range ({available} available)")]
    ChoiceOutOfRange { index: usize, available: usize },

    #[error("cannot apply a rejected upcast: {0}")]
    InvalidValidation(#[source] ValidationError),
}

/// An ability after scaling.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledSpell {
    pub effects: EffectTree,
    pub targets: Option<Targets>,
    pub template: Option<AreaTemplate>,
    pub duration: Option<Duration>,
    /// Label of the applied `upcastChoice` option.
    pub choice_label: Option<String>,
    pub steps: u32,
}

/// Apply a profile's deltas `steps` times to a copy of it.
pub fn apply(
    profile: &SpellProfile,
    steps: u32,
    choice: Option<usize>,
) -> Result<ScaledSpell, ScalingError> {
    let mut scaled = ScaledSpell {
        effects: profile.effects.clone(),
        targets: profile.targets,
        template: profile.template,
        duration: profile.duration.clone(),
        choice_label: None,
        steps,
    };
    run(&mut scaled, &profile.scaling, choice)?;
    Ok(scaled)
}

/// Apply deltas to an effect tree alone.
///
/// Deltas aimed at targets, templates or durations have nothing to act on
/// and are skipped. Returns the new tree and the chosen option's label.
pub fn apply_to_tree(
    tree: &EffectTree,
    spec: &ScalingSpec,
    steps: u32,
    choice: Option<usize>,
) -> Result<(EffectTree, Option<String>), ScalingError> {
    let mut scaled = ScaledSpell {
        effects: tree.clone(),
        targets: None,
        template: None,
        duration: None,
        choice_label: None,
        steps,
    };
    run(&mut scaled, spec, choice)?;
    Ok((scaled.effects, scaled.choice_label))
}

/// Apply a validated plan. A rejected validation is an error here.
pub fn apply_plan(
    profile: &SpellProfile,
    plan: &Result<UpcastPlan, ValidationError>,
) -> Result<ScaledSpell, ScalingError> {
    let plan = plan
        .as_ref()
        .map_err(|err| ScalingError::InvalidValidation(err.clone()))?;
    apply(profile, plan.steps, plan.choice)
}

fn run(scaled: &mut ScaledSpell, spec: &ScalingSpec, choice: Option<usize>) -> Result<(), ScalingError> {
    let (deltas, label) = select_deltas(spec, choice)?;
    scaled.choice_label = label;
    if scaled.steps == 0 {
        return Ok(());
    }

    for (index, delta) in deltas.iter().enumerate() {
        let applied = apply_delta(scaled, index, delta);
        tracing::trace!(
            operation = %delta.operation,
            steps = scaled.steps,
            applied,
            "scaling delta"
        );
    }
    Ok(())
}

fn select_deltas(
    spec: &ScalingSpec,
    choice: Option<usize>,
) -> Result<(&[Delta], Option<String>), ScalingError> {
    match spec.mode {
        ScalingMode::None => Ok((&[][..], None)),
        ScalingMode::Upcast => Ok((spec.deltas.as_slice(), None)),
        ScalingMode::UpcastChoice => {
            let index = choice.ok_or(ScalingError::MissingChoice)?;
            let options = spec.choices();
            let picked = options.get(index).ok_or(ScalingError::ChoiceOutOfRange {
                index,
                available: options.len(),
            })?;
            Ok((picked.deltas.as_slice(), Some(picked.label.clone())))
        }
    }
}

/// Returns whether the delta found something to change.
fn apply_delta(scaled: &mut ScaledSpell, index: usize, delta: &Delta) -> bool {
    let steps = i64::from(scaled.steps);
    let amount = delta.value.unwrap_or(0).saturating_mul(steps);
    let target = delta.target_effect_id.as_ref();

    match delta.operation {
        DeltaOperation::AddFlatDamage => {
            if amount == 0 {
                return false;
            }
            let term = if amount > 0 {
                format!("+{amount}")
            } else {
                format!("-{}", amount.unsigned_abs())
            };
            edit_formula(&mut scaled.effects, target, &term)
        }
        DeltaOperation::AddDice => match delta.dice {
            // Zero-faced dice never reach a formula.
            Some(dice) if dice.count > 0 && dice.faces > 0 => {
                let count = i64::from(dice.count) * steps;
                edit_formula(&mut scaled.effects, target, &format!("+{count}d{}", dice.faces))
            }
            _ => false,
        },
        DeltaOperation::AddDc => edit_save_dc(&mut scaled.effects, target, amount),
        DeltaOperation::AddAreaSize => match &mut scaled.template {
            Some(template) if template.radius.is_some() || template.length.is_some() => {
                if let Some(radius) = &mut template.radius {
                    bump(radius, amount);
                }
                if let Some(length) = &mut template.length {
                    bump(length, amount);
                }
                true
            }
            _ => false,
        },
        DeltaOperation::AddDuration => match &mut scaled.duration {
            Some(duration)
                if delta
                    .duration_type
                    .as_deref()
                    .map_or(true, |units| duration.has_units(units)) =>
            {
                bump(&mut duration.quantity, amount);
                true
            }
            _ => false,
        },
        DeltaOperation::AddRange | DeltaOperation::AddReach => match &mut scaled.targets {
            Some(targets) => {
                bump(&mut targets.distance, amount);
                true
            }
            None => false,
        },
        DeltaOperation::AddTargets => match &mut scaled.targets {
            Some(targets) => {
                bump(&mut targets.count, amount);
                true
            }
            None => false,
        },
        DeltaOperation::AddCondition => match &delta.condition {
            Some(condition) => add_condition(&mut scaled.effects, index, condition),
            None => false,
        },
        DeltaOperation::AddArmor => false,
    }
}

fn bump(field: &mut u32, amount: i64) {
    let next = (i64::from(*field) + amount).max(0);
    *field = u32::try_from(next).unwrap_or(u32::MAX);
}

/// The delta's target, or the first node matching `accepts` in pre-order.
fn locate(tree: &EffectTree, target: Option<&NodeId>, accepts: impl Fn(&EffectKind) -> bool) -> Option<NodeId> {
    match target {
        Some(id) => tree.get(id).filter(|node| accepts(&node.kind)).map(|node| node.id.clone()),
        None => tree.find_first(|node| accepts(&node.kind)).map(|node| node.id.clone()),
    }
}

/// Append a term to a damage formula, or a healing formula when the tree
/// has no damage.
fn edit_formula(tree: &mut EffectTree, target: Option<&NodeId>, term: &str) -> bool {
    let id = locate(tree, target, |kind| matches!(kind, EffectKind::Damage(_))).or_else(|| {
        locate(tree, target, |kind| matches!(kind, EffectKind::Healing(_)))
    });
    let Some(id) = id else {
        return false;
    };
    let Some(node) = tree.node_mut(&id) else {
        return false;
    };
    match &mut node.kind {
        EffectKind::Damage(damage) => damage.formula.push_str(term),
        EffectKind::Healing(healing) => healing.formula.push_str(term),
        _ => return false,
    }
    true
}

fn edit_save_dc(tree: &mut EffectTree, target: Option<&NodeId>, amount: i64) -> bool {
    let id = locate(tree, target, |kind| {
        matches!(kind, EffectKind::SavingThrow(save) if save.save_dc.is_some())
    });
    let Some(id) = id else {
        return false;
    };
    let Some(node) = tree.node_mut(&id) else {
        return false;
    };
    match &mut node.kind {
        EffectKind::SavingThrow(save) => match &mut save.save_dc {
            Some(dc) => {
                bump(dc, amount);
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn add_condition(tree: &mut EffectTree, index: usize, condition: &str) -> bool {
    let id = IdAllocator::for_context(&format!("upcast/{index}/{condition}")).next_id();
    match tree.attach(None, EffectNode::new(id, ConditionEffect::new(condition))) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, condition, "upcast condition not added");
            false
        }
    }
}
