//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ability_effects::core::NodeId;
use ability_effects::effects::{
    ConditionEffect, Damage, DamageOutcome, DamageType, EffectKind, EffectNode, EffectTree, Healing,
    OutcomeContext, SaveAbility, SavingThrow, TextNote,
};
use proptest::prelude::*;

pub fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

/// One random build step: what to add and where.
#[derive(Clone, Debug)]
pub struct Step {
    pub parent: usize,
    pub kind: u8,
    pub edge: u8,
}

pub fn step() -> impl Strategy<Value = Step> {
    (any::<usize>(), 0u8..6, 0u8..8).prop_map(|(parent, kind, edge)| Step { parent, kind, edge })
}

pub fn kind_for(choice: u8, n: usize) -> EffectKind {
    match choice {
        0 => Damage::new(DamageType::ALL[n % DamageType::ALL.len()], format!("{}d6", n % 4 + 1)).into(),
        1 => Healing::new(format!("1d{}", n % 10 + 2)).into(),
        2 => ConditionEffect::new(format!("condition{n}")).into(),
        3 => SavingThrow::new(SaveAbility::Will, Some(10 + (n % 10) as u32)).into(),
        4 => DamageOutcome::HALF.into(),
        _ => TextNote { note_type: Default::default(), text: format!("note {n}") }.into(),
    }
}

pub fn edge_for(parent: &EffectKind, choice: u8) -> Option<OutcomeContext> {
    match parent {
        EffectKind::Damage(_) => Some(
            [OutcomeContext::Hit, OutcomeContext::Miss, OutcomeContext::CriticalHit][choice as usize % 3],
        ),
        EffectKind::SavingThrow(_) => Some(match choice % 5 {
            0 => OutcomeContext::SharedRolls,
            1 => OutcomeContext::FailedSave,
            2 => OutcomeContext::PassedSave,
            n => OutcomeContext::FailedSaveBy(u32::from(n) * 2),
        }),
        _ => None,
    }
}

/// Build a valid tree from random steps; invalid placements fall back to
/// roots or get skipped.
pub fn build(steps: &[Step]) -> EffectTree {
    let mut tree = EffectTree::new();
    let mut ids: Vec<NodeId> = Vec::new();

    for (n, step) in steps.iter().enumerate() {
        let mut kind = kind_for(step.kind, n);
        let node_id = id(&format!("n{n}"));

        let parent = if ids.is_empty() || step.parent % (ids.len() + 1) == 0 {
            None
        } else {
            let parent_id = ids[step.parent % ids.len()].clone();
            let parent_kind = tree.get(&parent_id).map(|node| node.kind.clone());
            parent_kind.and_then(|k| edge_for(&k, step.edge)).map(|edge| (parent_id, edge))
        };

        if let Some((_, OutcomeContext::SharedRolls)) = parent {
            kind = Damage::new(DamageType::Fire, "2d6").into();
        }
        if parent.is_none() && matches!(kind, EffectKind::DamageOutcome(_)) {
            kind = ConditionEffect::new("dazed").into();
        }

        if tree.attach(parent, EffectNode::new(node_id.clone(), kind)).is_ok() {
            ids.push(node_id);
        }
    }
    tree
}

/// Arbitrary valid trees of up to `max_steps` build steps.
pub fn arb_tree(max_steps: usize) -> impl Strategy<Value = EffectTree> {
    prop::collection::vec(step(), 0..max_steps).prop_map(|steps| build(&steps))
}
