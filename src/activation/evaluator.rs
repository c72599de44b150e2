//! Activation: turn an effect tree into resolved rolls.

use serde::Serialize;

use crate::codec::flatten;
use crate::core::NodeId;
use crate::dice::{DamageRoll, DiceFormula, DiceSource, FormulaError, PlainRoll, PrimaryDieConfig, RollOutcome};
use crate::effects::{Damage, EffectKind, EffectTree, RollAnnotation};

use super::actor::{ActorContext, SubjectCategory};
use super::options::ActivationOptions;

#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("node `{node}` has an unreadable formula: {source}")]
    Formula {
        node: NodeId,
        #[source]
        source: FormulaError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RollKind {
    /// The first damage node: primary die, crits and misses.
    PrimaryDamage,
    Damage,
    Healing,
}

/// One evaluated roll, attributed to the node that asked for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoll {
    pub node_id: NodeId,
    pub kind: RollKind,
    /// Formula after roll data substitution.
    pub formula: String,
    pub total: i64,
    /// Natural face of the primary die.
    pub natural: Option<u32>,
    pub is_critical: bool,
    pub is_miss: bool,
    /// Primary die configuration the roll was requested with.
    pub config: Option<PrimaryDieConfig>,
}

/// Rolls in node order, plus the tree with roll results written back.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub rolls: Vec<ResolvedRoll>,
    pub tree: EffectTree,
    pub fast_forward: bool,
}

impl ActivationResult {
    /// The primary damage roll, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&ResolvedRoll> {
        self.rolls.iter().find(|roll| roll.kind == RollKind::PrimaryDamage)
    }
}

/// Evaluate every roll an activation needs.
///
/// Walks the flattened tree in order. The first damage node is the primary
/// roll; later damage and all healing roll plainly. Saving throws are
/// rolled later by their targets, and the remaining kinds have nothing to
/// roll. The input tree is left untouched.
///
/// ```
/// use ability_effects::activation::{evaluate, ActivationOptions, ActorContext, ActorType, SubjectCategory};
/// use ability_effects::dice::ScriptedDice;
/// use ability_effects::effects::{Damage, DamageType, EffectNode, EffectTree};
///
/// let mut tree = EffectTree::new();
/// tree.attach(None, EffectNode::new("bite", Damage::new(DamageType::Piercing, "1d6+2"))).unwrap();
///
/// let result = evaluate(
///     &tree,
///     &ActorContext::new(ActorType::Npc),
///     SubjectCategory::MonsterAction,
///     &ActivationOptions::default(),
///     &mut ScriptedDice::new([4]),
/// )
/// .unwrap();
/// assert_eq!(result.rolls[0].total, 6);
/// ```
pub fn evaluate(
    tree: &EffectTree,
    actor: &ActorContext,
    subject: SubjectCategory,
    options: &ActivationOptions,
    dice: &mut impl DiceSource,
) -> Result<ActivationResult, ActivationError> {
    let mut result = ActivationResult {
        rolls: Vec::new(),
        tree: tree.clone(),
        fast_forward: options.fast_forward,
    };
    if !subject.has_rolls() {
        tracing::debug!(?subject, "subject has no rolls");
        return Ok(result);
    }

    for record in flatten(tree) {
        let (kind, outcome, config) = match &record.kind {
            EffectKind::Damage(damage) => {
                let formula = resolve(&record.id, &damage.formula, actor)?;
                if result.primary().is_none() {
                    let config = primary_config(damage, actor, options);
                    let outcome = DamageRoll::new(formula, config).evaluate(dice);
                    (RollKind::PrimaryDamage, outcome, Some(config))
                } else {
                    (RollKind::Damage, PlainRoll::new(formula).evaluate(dice), None)
                }
            }
            EffectKind::Healing(healing) => {
                let formula = resolve(&record.id, &healing.formula, actor)?;
                (RollKind::Healing, PlainRoll::new(formula).evaluate(dice), None)
            }
            EffectKind::SavingThrow(_)
            | EffectKind::Condition(_)
            | EffectKind::DamageOutcome(_)
            | EffectKind::Text(_) => continue,
        };

        tracing::debug!(
            node = %record.id,
            ?kind,
            formula = %outcome.formula,
            total = outcome.total,
            critical = outcome.is_critical,
            miss = outcome.is_miss,
            "resolved roll"
        );

        annotate(&mut result.tree, &record.id, &outcome);
        result.rolls.push(ResolvedRoll {
            node_id: record.id,
            kind,
            natural: outcome.primary.as_ref().map(|die| die.natural),
            formula: outcome.formula,
            total: outcome.total,
            is_critical: outcome.is_critical,
            is_miss: outcome.is_miss,
            config,
        });
    }

    Ok(result)
}

/// Roll configuration of the primary damage roll. Minions never crit and
/// can always miss, whatever the node says.
#[must_use]
pub fn primary_config(damage: &Damage, actor: &ActorContext, options: &ActivationOptions) -> PrimaryDieConfig {
    let minion = actor.is_minion();
    PrimaryDieConfig {
        can_crit: !minion && damage.can_crit(),
        can_miss: minion || damage.can_miss(),
        roll_mode: options.roll_mode,
        primary_die_value: options.primary_die_value,
        primary_die_modifier: options.primary_die_modifier,
    }
}

fn resolve(node: &NodeId, formula: &str, actor: &ActorContext) -> Result<DiceFormula, ActivationError> {
    let parsed = DiceFormula::parse(formula).map_err(|source| ActivationError::Formula {
        node: node.clone(),
        source,
    })?;
    Ok(parsed.resolve(&actor.roll_data))
}

fn annotate(tree: &mut EffectTree, id: &NodeId, outcome: &RollOutcome) {
    let annotation = RollAnnotation {
        total: outcome.total,
        is_critical: outcome.is_critical,
        is_miss: outcome.is_miss,
    };
    if let Some(node) = tree.node_mut(id) {
        match &mut node.kind {
            EffectKind::Damage(damage) => damage.roll_result = Some(annotation),
            EffectKind::Healing(healing) => healing.roll_result = Some(annotation),
            _ => {}
        }
    }
}
