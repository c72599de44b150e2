//! Turning one imported action into effect nodes.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::codec::{flatten, FlatList};
use crate::core::{IdAllocator, NodeId};
use crate::effects::{
    ConditionEffect, Damage, DamageOutcome, EffectNode, EffectTree, OutcomeContext, SavingThrow,
    TreeEditError,
};

use super::conditions::{parse_conditions, ParsedCondition};
use super::damage::{extract_dice_formula, find_dice_formula, parse_damage_type};
use super::range::{parse_range_reach, RangeReach};
use super::save::parse_saving_throw;

/// A monster action as it arrives from third-party content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Formula field, possibly with a trailing type word (`"2d6+4 Slashing"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_formula: Option<String>,
    /// Range or reach already recorded on the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeReach>,
}

impl MonsterAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            damage_formula: None,
            range: None,
        }
    }

    #[must_use]
    pub fn with_damage_formula(mut self, formula: impl Into<String>) -> Self {
        self.damage_formula = Some(formula.into());
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: RangeReach) -> Self {
        self.range = Some(range);
        self
    }

    fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
            && self.damage_formula.as_deref().map_or(true, |f| f.trim().is_empty())
    }
}

/// Result of importing one action.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAction {
    pub name: String,
    pub effects: FlatList,
    pub range: Option<RangeReach>,
}

/// Build the flat effect list of one action.
///
/// Never fails: anything going wrong inside the sub-parsers yields an
/// empty list.
///
/// The sub-parsers only slice at regex match boundaries and parse numbers
/// through `Option`, so assembly is not expected to panic. The
/// `catch_unwind` stays so one action can never abort a batch import. A
/// caught panic is still reported on stderr by the process panic hook;
/// hosts that want it silent install their own hook.
#[must_use]
pub fn build_effect_tree(action: &MonsterAction) -> FlatList {
    match catch_unwind(AssertUnwindSafe(|| assemble(action))) {
        Ok(Ok(tree)) => flatten(&tree),
        Ok(Err(err)) => {
            tracing::debug!(action = %action.name, error = %err, "action produced an invalid tree");
            FlatList::new()
        }
        Err(_) => {
            tracing::debug!(action = %action.name, "action parser panicked");
            FlatList::new()
        }
    }
}

/// Parse a bare description.
///
/// ```
/// use ability_effects::parser::parse_action;
///
/// let effects = parse_action("DC 14 DEX save for half damage. 4d6 fire damage.");
/// assert_eq!(effects.as_slice()[0].type_name(), "savingThrow");
/// ```
#[must_use]
pub fn parse_action(description: &str) -> FlatList {
    build_effect_tree(&MonsterAction::new("", description))
}

/// Parse a batch of actions. One bad action never stops the batch.
pub fn parse_actions<'a>(actions: impl IntoIterator<Item = &'a MonsterAction>) -> Vec<ParsedAction> {
    actions
        .into_iter()
        .map(|action| {
            let effects = build_effect_tree(action);
            if effects.is_empty() && !action.is_blank() {
                tracing::warn!(action = %action.name, "no effects derived from action text");
            }
            ParsedAction {
                name: action.name.clone(),
                effects,
                range: parse_range_reach(&action.description, action.range),
            }
        })
        .collect()
}

fn assemble(action: &MonsterAction) -> Result<EffectTree, TreeEditError> {
    let description = action.description.as_str();
    let formula = action
        .damage_formula
        .as_deref()
        .and_then(extract_dice_formula)
        .or_else(|| find_dice_formula(description));
    let damage_type = parse_damage_type(action.damage_formula.as_deref(), Some(description));
    let save = parse_saving_throw(description);
    let conditions = parse_conditions(description);

    tracing::trace!(
        action = %action.name,
        formula = ?formula,
        save = ?save,
        conditions = conditions.len(),
        "parsed action"
    );

    let seed = format!(
        "{}\n{}\n{}",
        action.name,
        description,
        action.damage_formula.as_deref().unwrap_or("")
    );
    let mut ids = IdAllocator::for_context(&seed);
    let mut tree = EffectTree::new();

    if let Some(save) = save {
        let root = ids.next_id();
        tree.attach(
            None,
            EffectNode::new(root.clone(), SavingThrow::new(save.save_type, Some(save.dc))),
        )?;
        if let Some(formula) = formula {
            tree.attach(
                Some((root.clone(), OutcomeContext::SharedRolls)),
                EffectNode::new(ids.next_id(), Damage::new(damage_type, formula)),
            )?;
            tree.attach(
                Some((root.clone(), OutcomeContext::FailedSave)),
                EffectNode::new(ids.next_id(), DamageOutcome::FULL),
            )?;
            if save.half_on_save {
                tree.attach(
                    Some((root.clone(), OutcomeContext::PassedSave)),
                    EffectNode::new(ids.next_id(), DamageOutcome::HALF),
                )?;
            }
        }
        // Every condition lands on the one failed-save edge, so contexts
        // no longer tell repeats apart.
        let mut attached: Vec<&str> = Vec::with_capacity(conditions.len());
        for parsed in &conditions {
            if attached.contains(&parsed.condition.as_str()) {
                continue;
            }
            attached.push(&parsed.condition);
            attach_condition(&mut tree, &mut ids, Some((root.clone(), OutcomeContext::FailedSave)), parsed)?;
        }
    } else if let Some(formula) = formula {
        let root = ids.next_id();
        tree.attach(None, EffectNode::new(root.clone(), Damage::new(damage_type, formula)))?;
        tree.attach(
            Some((root.clone(), OutcomeContext::Hit)),
            EffectNode::new(ids.next_id(), DamageOutcome::FULL),
        )?;
        for parsed in &conditions {
            match parsed.context {
                OutcomeContext::Hit | OutcomeContext::CriticalHit => {
                    attach_condition(&mut tree, &mut ids, Some((root.clone(), parsed.context)), parsed)?;
                }
                other => {
                    tracing::trace!(condition = %parsed.condition, context = %other, "condition has no edge on a damage root");
                }
            }
        }
    } else {
        for parsed in &conditions {
            attach_condition(&mut tree, &mut ids, None, parsed)?;
        }
    }

    Ok(tree)
}

fn attach_condition(
    tree: &mut EffectTree,
    ids: &mut IdAllocator,
    parent: Option<(NodeId, OutcomeContext)>,
    parsed: &ParsedCondition,
) -> Result<(), TreeEditError> {
    let effect = ConditionEffect {
        condition: parsed.condition.clone(),
        escape: parsed.escape,
    };
    tree.attach(parent, EffectNode::new(ids.next_id(), effect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reconstruct;
    use crate::effects::{DamageType, EffectKind, OutcomeAmount, SaveAbility};

    fn tree_of(action: &MonsterAction) -> EffectTree {
        reconstruct(build_effect_tree(action)).unwrap()
    }

    fn outcome(tree: &EffectTree, id: &NodeId) -> OutcomeAmount {
        match &tree.get(id).unwrap().kind {
            EffectKind::DamageOutcome(outcome) => outcome.outcome,
            other => panic!("expected damage outcome, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_damage_root() {
        let action = MonsterAction::new("Claw", "Melee attack.").with_damage_formula("2d6+4 Slashing");
        let tree = tree_of(&action);

        let roots: Vec<_> = tree.roots().cloned().collect();
        assert_eq!(roots.len(), 1);
        let damage = tree.get(&roots[0]).unwrap().kind.as_damage().unwrap().clone();
        assert_eq!(damage.damage_type, DamageType::Slashing);
        assert_eq!(damage.formula, "2d6+4");

        let hit = tree.children(&roots[0], OutcomeContext::Hit);
        assert_eq!(hit.len(), 1);
        assert_eq!(outcome(&tree, &hit[0]), OutcomeAmount::FullDamage);
    }

    #[test]
    fn test_save_root_half() {
        let action = MonsterAction::new("Breath", "Cone 30. DC 21 DEX save for half damage.")
            .with_damage_formula("12d6 fire");
        let tree = tree_of(&action);
        let root = tree.roots().next().unwrap().clone();

        let save = tree.get(&root).unwrap().kind.as_saving_throw().unwrap().clone();
        assert_eq!(save.saving_throw_type, SaveAbility::Dexterity);
        assert_eq!(save.save_dc, Some(21));

        let shared = tree.children(&root, OutcomeContext::SharedRolls);
        assert_eq!(shared.len(), 1);
        assert_eq!(tree.get(&shared[0]).unwrap().kind.as_damage().unwrap().damage_type, DamageType::Fire);

        let failed = tree.children(&root, OutcomeContext::FailedSave);
        let passed = tree.children(&root, OutcomeContext::PassedSave);
        assert_eq!(outcome(&tree, &failed[0]), OutcomeAmount::FullDamage);
        assert_eq!(outcome(&tree, &passed[0]), OutcomeAmount::HalfDamage);
    }

    #[test]
    fn test_save_conditions_under_failed_save() {
        let action = MonsterAction::new("Gaze", "DC 15 WIL save or [[Frightened]]. On crit: [[Stunned]]");
        let tree = tree_of(&action);
        let root = tree.roots().next().unwrap().clone();

        let failed = tree.children(&root, OutcomeContext::FailedSave);
        assert_eq!(failed.len(), 2);
        assert!(tree.children(&root, OutcomeContext::SharedRolls).is_empty());
        assert!(tree.children(&root, OutcomeContext::PassedSave).is_empty());
    }

    #[test]
    fn test_damage_root_conditions() {
        let action = MonsterAction::new("Slam", "Hit: 2d8+4 bludgeoning and [[Prone]]. On crit: [[Stunned]]");
        let tree = tree_of(&action);
        let root = tree.roots().next().unwrap().clone();

        let hit = tree.children(&root, OutcomeContext::Hit);
        assert_eq!(hit.len(), 2);
        let prone = tree.get(&hit[1]).unwrap().kind.as_condition().unwrap();
        assert_eq!(prone.condition, "prone");

        let crit = tree.children(&root, OutcomeContext::CriticalHit);
        assert_eq!(tree.get(&crit[0]).unwrap().kind.as_condition().unwrap().condition, "stunned");
    }

    #[test]
    fn test_bare_conditions() {
        let effects = parse_action("The target is [[Charmed]] and [[Slowed]].");
        assert_eq!(effects.len(), 2);
        assert!(effects.iter().all(|node| node.is_root() && node.type_name() == "condition"));
    }

    #[test]
    fn test_nothing_found() {
        assert!(parse_action("The creature roars menacingly.").is_empty());
        assert!(parse_action("").is_empty());
    }

    #[test]
    fn test_ids_deterministic() {
        let action = MonsterAction::new("Bite", "Melee").with_damage_formula("1d8+2 piercing");
        assert_eq!(build_effect_tree(&action), build_effect_tree(&action));
    }

    #[test]
    fn test_batch_keeps_going() {
        let actions = vec![
            MonsterAction::new("Roar", "It roars."),
            MonsterAction::new("Bite", "Reach 10").with_damage_formula("1d8 piercing"),
        ];
        let parsed = parse_actions(&actions);
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].effects.is_empty());
        assert_eq!(parsed[1].effects.len(), 2);
        assert_eq!(parsed[1].range.map(|r| r.distance), Some(10));
    }
}
