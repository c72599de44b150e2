//! Flat storage form.
//!
//! The persisted shape of a tree is an ordered array of node records, each
//! naming its owner through `parentNode`/`parentContext`. `flatten` emits
//! records in pre-order; `reconstruct` is its left inverse.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::NodeId;
use crate::effects::{EffectNode, EffectTree, OutcomeContext, TreeEditError};

/// Errors raised while rebuilding a tree from storage.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Edit(#[from] TreeEditError),

    #[error("node `{0}` is not reachable from any root (parent cycle)")]
    Cycle(NodeId),

    #[error("malformed flat list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered list of node records, the only form written to storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatList(Vec<EffectNode>);

impl FlatList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectNode> {
        self.0.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append records from another list.
    pub fn extend(&mut self, other: FlatList) {
        self.0.extend(other.0);
    }

    /// Borrow the records.
    #[must_use]
    pub fn as_slice(&self) -> &[EffectNode] {
        &self.0
    }

    /// Take the records.
    #[must_use]
    pub fn into_vec(self) -> Vec<EffectNode> {
        self.0
    }

    /// Parse a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as a JSON array of records.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Vec<EffectNode>> for FlatList {
    fn from(records: Vec<EffectNode>) -> Self {
        Self(records)
    }
}

impl IntoIterator for FlatList {
    type Item = EffectNode;
    type IntoIter = std::vec::IntoIter<EffectNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Trees serialise through their flat form.
impl Serialize for EffectTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        flatten(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EffectTree {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = FlatList::deserialize(deserializer)?;
        reconstruct(records).map_err(serde::de::Error::custom)
    }
}

/// Flatten a tree into storage records, roots left unparented.
#[must_use]
pub fn flatten(tree: &EffectTree) -> FlatList {
    flatten_under(tree, None, None)
}

/// Flatten a tree whose roots are to be stamped with the given parent.
///
/// Used to splice a freshly built subtree under an existing node of a
/// stored list.
#[must_use]
pub fn flatten_under(
    tree: &EffectTree,
    parent_node: Option<&NodeId>,
    parent_context: Option<OutcomeContext>,
) -> FlatList {
    let out = tree
        .iter_preorder()
        .map(|node| {
            let mut record = node.clone();
            if record.parent_node.is_none() {
                record.parent_node = parent_node.cloned();
                record.parent_context = parent_context;
            }
            record
        })
        .collect();
    FlatList(out)
}

/// Rebuild a tree from storage records.
///
/// Every record is indexed first, then linked in list order: children land
/// in their parent's edge in the order they appear, and unparented records
/// become roots in first-seen order. Records whose parent chain never
/// reaches a root are rejected as a cycle.
pub fn reconstruct(records: impl IntoIterator<Item = EffectNode>) -> Result<EffectTree, CodecError> {
    let mut tree = EffectTree::new();
    let mut order = Vec::new();

    for record in records {
        order.push(record.id.clone());
        tree.insert_unlinked(record).map_err(|err| {
            tracing::warn!(error = %err, "rejecting flat list");
            err
        })?;
    }

    for id in &order {
        tree.link(id).map_err(|err| {
            tracing::warn!(error = %err, "rejecting flat list");
            err
        })?;
    }

    let reachable = tree.preorder();
    if reachable.len() != order.len() {
        let reachable: FxHashSet<&NodeId> = reachable.iter().collect();
        if let Some(stray) = order.iter().find(|id| !reachable.contains(id)) {
            tracing::warn!(node = %stray, "flat list contains a parent cycle");
            return Err(CodecError::Cycle(stray.clone()));
        }
    }

    Ok(tree)
}
