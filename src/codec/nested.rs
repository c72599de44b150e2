//! Nested (compendium-authored) tree form.
//!
//! Authored content describes a tree the way a reader thinks of it: each
//! node carries an `on` map of outcome edges (with graduated failures under
//! `failedSaveBy`, keyed by margin) and saves carry `sharedRolls`. Any child
//! slot may hold a compact `@{...}` reference instead of an object.
//! `unnest` turns that shape into an arena tree; `nest` renders it back.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{IdAllocator, NodeId};
use crate::effects::{EffectKind, EffectNode, EffectTree, OutcomeContext};

use super::compact::parse_compact;
use super::flat::CodecError;

/// A child slot: an inline node or a compact reference string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Inline(Box<NestedNode>),
    Compact(String),
}

impl From<NestedNode> for NodeRef {
    fn from(node: NestedNode) -> Self {
        Self::Inline(Box::new(node))
    }
}

/// Outcome edges of a nested node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedEdges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hit: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub miss: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_hit: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_save: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed_save: Vec<NodeRef>,
    /// Graduated failures keyed by margin. Keys stay strings on the wire.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failed_save_by: BTreeMap<String, Vec<NodeRef>>,
}

impl NestedEdges {
    /// True when no edge has children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hit.is_empty()
            && self.miss.is_empty()
            && self.critical_hit.is_empty()
            && self.failed_save.is_empty()
            && self.passed_save.is_empty()
            && self.failed_save_by.values().all(Vec::is_empty)
    }

    fn slot_mut(&mut self, context: OutcomeContext) -> Option<&mut Vec<NodeRef>> {
        match context {
            OutcomeContext::Hit => Some(&mut self.hit),
            OutcomeContext::Miss => Some(&mut self.miss),
            OutcomeContext::CriticalHit => Some(&mut self.critical_hit),
            OutcomeContext::FailedSave => Some(&mut self.failed_save),
            OutcomeContext::PassedSave => Some(&mut self.passed_save),
            OutcomeContext::FailedSaveBy(margin) => {
                Some(self.failed_save_by.entry(margin.to_string()).or_default())
            }
            OutcomeContext::SharedRolls => None,
        }
    }

    /// Edges in enumeration order; graduated failures by ascending margin.
    fn ordered(&self) -> Vec<(OutcomeContext, &[NodeRef])> {
        let mut graduated: Vec<(OutcomeContext, &[NodeRef])> = self
            .failed_save_by
            .iter()
            .filter_map(|(margin, list)| match margin.trim().parse::<u32>() {
                Ok(margin) => Some((OutcomeContext::FailedSaveBy(margin), list.as_slice())),
                Err(_) => {
                    tracing::debug!(margin = %margin, "skipping non-numeric failedSaveBy margin");
                    None
                }
            })
            .collect();
        graduated.sort_by_key(|(context, _)| *context);

        let mut edges = vec![
            (OutcomeContext::Hit, self.hit.as_slice()),
            (OutcomeContext::Miss, self.miss.as_slice()),
            (OutcomeContext::CriticalHit, self.critical_hit.as_slice()),
            (OutcomeContext::FailedSave, self.failed_save.as_slice()),
            (OutcomeContext::PassedSave, self.passed_save.as_slice()),
        ];
        edges.extend(graduated);
        edges
    }
}

/// A node in nested form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedNode {
    /// Authored id; minted on import when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    #[serde(flatten)]
    pub kind: EffectKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_rolls: Vec<NodeRef>,

    #[serde(default, skip_serializing_if = "NestedEdges::is_empty")]
    pub on: NestedEdges,
}

impl NestedNode {
    /// Create a childless nested node.
    pub fn new(id: Option<NodeId>, kind: impl Into<EffectKind>) -> Self {
        Self {
            id,
            kind: kind.into(),
            shared_rolls: Vec::new(),
            on: NestedEdges::default(),
        }
    }
}

/// Resolve a compact reference into a nested node.
///
/// Malformed references (bad wrapper, unknown type, missing fields) are
/// dropped and yield `None`.
#[must_use]
pub fn resolve_compact(encoded: &str) -> Option<NestedNode> {
    let Some(mut fields) = parse_compact(encoded) else {
        tracing::debug!(reference = encoded, "dropping malformed compact reference");
        return None;
    };

    // Numeric-looking ids are still ids.
    if let Some(Value::Number(n)) = fields.get("id") {
        let id = n.to_string();
        fields.insert("id".to_string(), Value::String(id));
    }

    match serde_json::from_value(Value::Object(fields)) {
        Ok(node) => Some(node),
        Err(err) => {
            tracing::debug!(reference = encoded, error = %err, "dropping unusable compact reference");
            None
        }
    }
}

/// Build an arena tree from nested roots.
///
/// Nodes without an id receive one from `ids`. Compact references that do
/// not resolve are skipped; structural violations (duplicate ids, edges a
/// kind may not own) are errors.
pub fn unnest(roots: &[NodeRef], ids: &mut IdAllocator) -> Result<EffectTree, CodecError> {
    let mut tree = EffectTree::new();
    for root in roots {
        attach_ref(&mut tree, None, root, ids)?;
    }
    Ok(tree)
}

/// Parse nested roots from JSON and build an arena tree.
pub fn unnest_json(json: &str, ids: &mut IdAllocator) -> Result<EffectTree, CodecError> {
    let roots: Vec<NodeRef> = serde_json::from_str(json)?;
    unnest(&roots, ids)
}

fn attach_ref(
    tree: &mut EffectTree,
    parent: Option<(NodeId, OutcomeContext)>,
    node_ref: &NodeRef,
    ids: &mut IdAllocator,
) -> Result<(), CodecError> {
    let resolved;
    let nested = match node_ref {
        NodeRef::Inline(node) => node.as_ref(),
        NodeRef::Compact(encoded) => match resolve_compact(encoded) {
            Some(node) => {
                resolved = node;
                &resolved
            }
            None => return Ok(()),
        },
    };

    let id = nested.id.clone().unwrap_or_else(|| ids.next_id());
    tree.attach(parent, EffectNode::new(id.clone(), nested.kind.clone()))?;

    for child in &nested.shared_rolls {
        attach_ref(tree, Some((id.clone(), OutcomeContext::SharedRolls)), child, ids)?;
    }
    for (context, children) in nested.on.ordered() {
        for child in children {
            attach_ref(tree, Some((id.clone(), context)), child, ids)?;
        }
    }
    Ok(())
}

/// Render an arena tree in nested form.
#[must_use]
pub fn nest(tree: &EffectTree) -> Vec<NestedNode> {
    // Reverse pre-order builds every child before its parent.
    let mut built: FxHashMap<NodeId, NestedNode> = FxHashMap::default();
    for id in tree.preorder().into_iter().rev() {
        let Some(node) = tree.get(&id) else {
            continue;
        };
        let mut nested = NestedNode::new(Some(node.id.clone()), node.kind.clone());

        if let Some(edges) = tree.edges(&id) {
            for (context, children) in edges.iter() {
                let rendered = children
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .map(NodeRef::from);
                match nested.on.slot_mut(context) {
                    Some(slot) => slot.extend(rendered),
                    None => nested.shared_rolls.extend(rendered),
                }
            }
        }
        built.insert(id, nested);
    }

    tree.roots().filter_map(|root| built.remove(root)).collect()
}
