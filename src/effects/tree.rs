//! Arena-based effect tree.
//!
//! Nodes are stored in a persistent map keyed by `NodeId`, with outcome
//! edges held beside them as ordered id lists. Cloning a tree is O(1) and
//! every write is copy-on-write, so the public editing operations take
//! `&self` and hand back a new tree while the input stays untouched.

use std::collections::BTreeMap;

use im::{HashMap as ImHashMap, HashSet as ImHashSet, Vector};
use smallvec::SmallVec;

use crate::core::NodeId;

use super::context::OutcomeContext;
use super::node::{EffectKind, EffectNode};

/// Ordered child ids under one edge.
///
/// SmallVec keeps the common case (1-3 children) off the heap.
pub type ChildList = SmallVec<[NodeId; 4]>;

/// Outgoing edges of one node, iterated in `OutcomeContext` order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    lists: BTreeMap<OutcomeContext, ChildList>,
}

impl Edges {
    /// Children under one edge.
    #[must_use]
    pub fn get(&self, context: OutcomeContext) -> &[NodeId] {
        self.lists.get(&context).map_or(&[] as &[NodeId], |list| list.as_slice())
    }

    /// Iterate non-empty edges in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (OutcomeContext, &[NodeId])> {
        self.lists
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(context, list)| (*context, list.as_slice()))
    }

    /// True when no edge has children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.values().all(|list| list.is_empty())
    }

    fn push(&mut self, context: OutcomeContext, child: NodeId) {
        self.lists.entry(context).or_default().push(child);
    }

    fn remove(&mut self, child: &NodeId) {
        for list in self.lists.values_mut() {
            list.retain(|id| id != child);
        }
        self.lists.retain(|_, list| !list.is_empty());
    }
}

/// Errors raised by tree editing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeEditError {
    #[error("node id `{0}` already exists in the tree")]
    DuplicateId(NodeId),

    #[error("node `{0}` does not exist in the tree")]
    UnknownNode(NodeId),

    #[error("a {kind} node cannot own children under `{context}` (parent `{parent}`)")]
    InvalidEdge {
        parent: NodeId,
        kind: &'static str,
        context: OutcomeContext,
    },

    #[error("shared rolls of `{parent}` may only hold damage, got {kind} `{child}`")]
    InvalidSharedRoll {
        parent: NodeId,
        child: NodeId,
        kind: &'static str,
    },

    #[error("node `{0}` names a parent but no parent context")]
    MissingContext(NodeId),

    #[error("damage outcome `{0}` cannot be a root")]
    OutcomeAsRoot(NodeId),
}

/// A forest of effect nodes.
///
/// ## Example
///
/// ```
/// use ability_effects::effects::{
///     Damage, DamageOutcome, DamageType, EffectNode, EffectTree, OutcomeContext,
/// };
///
/// let mut tree = EffectTree::new();
/// tree.attach(None, EffectNode::new("bite", Damage::new(DamageType::Piercing, "1d6+2")))
///     .unwrap();
/// tree.attach(
///     Some(("bite".into(), OutcomeContext::Hit)),
///     EffectNode::new("full", DamageOutcome::FULL),
/// )
/// .unwrap();
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.children(&"bite".into(), OutcomeContext::Hit).len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectTree {
    nodes: ImHashMap<NodeId, EffectNode>,
    edges: ImHashMap<NodeId, Edges>,
    roots: Vector<NodeId>,
}

impl EffectTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root ids in order.
    pub fn roots(&self) -> impl Iterator<Item = &NodeId> {
        self.roots.iter()
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&EffectNode> {
        self.nodes.get(id)
    }

    /// Check if a node exists.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Outgoing edges of a node (empty for leaves).
    #[must_use]
    pub fn edges(&self, id: &NodeId) -> Option<&Edges> {
        self.edges.get(id)
    }

    /// Children of a node under one edge.
    #[must_use]
    pub fn children(&self, id: &NodeId, context: OutcomeContext) -> &[NodeId] {
        self.edges.get(id).map_or(&[] as &[NodeId], |edges| edges.get(context))
    }

    /// Node ids in pre-order: each root, then its edges in enumeration order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().cloned().collect();

        while let Some(id) = stack.pop() {
            if let Some(edges) = self.edges.get(&id) {
                let children: Vec<&NodeId> = edges.iter().flat_map(|(_, list)| list.iter()).collect();
                stack.extend(children.into_iter().rev().cloned());
            }
            order.push(id);
        }

        order
    }

    /// Iterate nodes in pre-order.
    pub fn iter_preorder(&self) -> impl Iterator<Item = &EffectNode> + '_ {
        self.preorder().into_iter().filter_map(move |id| self.nodes.get(&id))
    }

    /// First node in pre-order matching a predicate.
    #[must_use]
    pub fn find_first(&self, predicate: impl Fn(&EffectNode) -> bool) -> Option<&EffectNode> {
        self.iter_preorder().find(|node| predicate(node))
    }

    /// All descendants of a node, in pre-order, excluding the node itself.
    #[must_use]
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(edges) = self.edges.get(&current) {
                let children: Vec<&NodeId> = edges.iter().flat_map(|(_, list)| list.iter()).collect();
                stack.extend(children.into_iter().rev().cloned());
            }
            if &current != id {
                found.push(current);
            }
        }
        found
    }

    /// Attach a node to this tree, as a root or under a parent edge.
    ///
    /// Stamps the node's parent header from `parent`. Used by builders that
    /// own the tree they are filling; editing a shared tree goes through
    /// [`EffectTree::insert_node`].
    pub fn attach(
        &mut self,
        parent: Option<(NodeId, OutcomeContext)>,
        mut node: EffectNode,
    ) -> Result<(), TreeEditError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TreeEditError::DuplicateId(node.id));
        }

        match parent {
            None => {
                if matches!(node.kind, EffectKind::DamageOutcome(_)) {
                    return Err(TreeEditError::OutcomeAsRoot(node.id));
                }
                node.parent_node = None;
                node.parent_context = None;
                self.roots.push_back(node.id.clone());
            }
            Some((parent_id, context)) => {
                self.check_edge(&parent_id, context, &node)?;
                self.edges
                    .entry(parent_id.clone())
                    .or_insert_with(Edges::default)
                    .push(context, node.id.clone());
                node.parent_node = Some(parent_id);
                node.parent_context = Some(context);
            }
        }

        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Return a copy of this tree with one node inserted.
    pub fn insert_node(
        &self,
        parent: Option<(NodeId, OutcomeContext)>,
        node: EffectNode,
    ) -> Result<Self, TreeEditError> {
        let mut next = self.clone();
        next.attach(parent, node)?;
        Ok(next)
    }

    /// Return a copy of this tree with one node's payload edited.
    ///
    /// The id and parent header are preserved. Fails if the edited kind can
    /// no longer own the edges the node already has.
    pub fn update_node(
        &self,
        id: &NodeId,
        edit: impl FnOnce(&mut EffectKind),
    ) -> Result<Self, TreeEditError> {
        let mut next = self.clone();
        let node = next
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeEditError::UnknownNode(id.clone()))?;
        edit(&mut node.kind);

        let kind = node.kind.clone();
        if node.is_root() && matches!(kind, EffectKind::DamageOutcome(_)) {
            return Err(TreeEditError::OutcomeAsRoot(id.clone()));
        }
        if node.parent_context == Some(OutcomeContext::SharedRolls)
            && !matches!(kind, EffectKind::Damage(_))
        {
            return Err(TreeEditError::InvalidSharedRoll {
                parent: node.parent_node.clone().unwrap_or_else(|| id.clone()),
                child: id.clone(),
                kind: kind.type_name(),
            });
        }
        if let Some(edges) = next.edges.get(id) {
            if let Some((context, _)) = edges.iter().find(|(context, _)| !kind.can_own(*context)) {
                return Err(TreeEditError::InvalidEdge {
                    parent: id.clone(),
                    kind: kind.type_name(),
                    context,
                });
            }
        }
        Ok(next)
    }

    /// Return a copy of this tree without a node and all of its descendants.
    ///
    /// Descendants are discovered through the flattened form's parent
    /// pointers: pre-order guarantees every parent precedes its children.
    pub fn delete_node(&self, id: &NodeId) -> Result<Self, TreeEditError> {
        let target = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeEditError::UnknownNode(id.clone()))?;

        let mut doomed: ImHashSet<NodeId> = ImHashSet::unit(id.clone());
        for record in crate::codec::flatten(self).iter() {
            if let Some(parent) = &record.parent_node {
                if doomed.contains(parent) {
                    doomed.insert(record.id.clone());
                }
            }
        }

        let mut next = self.clone();
        match &target.parent_node {
            Some(parent) => {
                if let Some(edges) = next.edges.get_mut(parent) {
                    edges.remove(id);
                    if edges.is_empty() {
                        next.edges.remove(parent);
                    }
                }
            }
            None => next.roots.retain(|root| root != id),
        }
        for gone in doomed.iter() {
            next.nodes.remove(gone);
            next.edges.remove(gone);
        }

        tracing::trace!(node = %id, removed = doomed.len(), "deleted effect subtree");
        Ok(next)
    }

    /// Mutable access for crate-internal transformations on owned copies.
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut EffectNode> {
        self.nodes.get_mut(id)
    }

    /// Insert a node without linking it (reconstruction, first pass).
    pub(crate) fn insert_unlinked(&mut self, node: EffectNode) -> Result<(), TreeEditError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TreeEditError::DuplicateId(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Link an already inserted node (reconstruction, second pass).
    pub(crate) fn link(&mut self, id: &NodeId) -> Result<(), TreeEditError> {
        let node = self
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| TreeEditError::UnknownNode(id.clone()))?;

        match (&node.parent_node, node.parent_context) {
            (None, _) => {
                if matches!(node.kind, EffectKind::DamageOutcome(_)) {
                    return Err(TreeEditError::OutcomeAsRoot(node.id));
                }
                self.roots.push_back(node.id);
            }
            (Some(parent), context) => {
                let context = context.ok_or_else(|| TreeEditError::MissingContext(node.id.clone()))?;
                self.check_edge(parent, context, &node)?;
                self.edges.entry(parent.clone()).or_insert_with(Edges::default).push(context, node.id);
            }
        }
        Ok(())
    }

    fn check_edge(
        &self,
        parent_id: &NodeId,
        context: OutcomeContext,
        child: &EffectNode,
    ) -> Result<(), TreeEditError> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| TreeEditError::UnknownNode(parent_id.clone()))?;

        if !parent.kind.can_own(context) {
            return Err(TreeEditError::InvalidEdge {
                parent: parent_id.clone(),
                kind: parent.kind.type_name(),
                context,
            });
        }
        if context == OutcomeContext::SharedRolls && !matches!(child.kind, EffectKind::Damage(_)) {
            return Err(TreeEditError::InvalidSharedRoll {
                parent: parent_id.clone(),
                child: child.id.clone(),
                kind: child.kind.type_name(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{
        ConditionEffect, Damage, DamageOutcome, DamageType, SaveAbility, SavingThrow,
    };

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn fireball() -> EffectTree {
        let mut tree = EffectTree::new();
        tree.attach(None, EffectNode::new("save", SavingThrow::new(SaveAbility::Dexterity, Some(13))))
            .unwrap();
        tree.attach(
            Some((id("save"), OutcomeContext::SharedRolls)),
            EffectNode::new("fire", Damage::new(DamageType::Fire, "3d6")),
        )
        .unwrap();
        tree.attach(
            Some((id("save"), OutcomeContext::FailedSave)),
            EffectNode::new("full", DamageOutcome::FULL),
        )
        .unwrap();
        tree.attach(
            Some((id("save"), OutcomeContext::FailedSave)),
            EffectNode::new("prone", ConditionEffect::new("prone")),
        )
        .unwrap();
        tree.attach(
            Some((id("save"), OutcomeContext::PassedSave)),
            EffectNode::new("half", DamageOutcome::HALF),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_attach_stamps_parent() {
        let tree = fireball();
        let full = tree.get(&id("full")).unwrap();
        assert_eq!(full.parent_node, Some(id("save")));
        assert_eq!(full.parent_context, Some(OutcomeContext::FailedSave));
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn test_preorder_follows_edge_order() {
        let tree = fireball();
        let order: Vec<String> = tree.preorder().into_iter().map(|n| n.to_string()).collect();
        assert_eq!(order, vec!["save", "fire", "full", "prone", "half"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut tree = fireball();
        let err = tree
            .attach(None, EffectNode::new("fire", ConditionEffect::new("dazed")))
            .unwrap_err();
        assert_eq!(err, TreeEditError::DuplicateId(id("fire")));
    }

    #[test]
    fn test_leaf_cannot_own_children() {
        let mut tree = fireball();
        let err = tree
            .attach(
                Some((id("prone"), OutcomeContext::Hit)),
                EffectNode::new("x", ConditionEffect::new("dazed")),
            )
            .unwrap_err();
        assert!(matches!(err, TreeEditError::InvalidEdge { kind: "condition", .. }));
    }

    #[test]
    fn test_shared_rolls_only_hold_damage() {
        let mut tree = fireball();
        let err = tree
            .attach(
                Some((id("save"), OutcomeContext::SharedRolls)),
                EffectNode::new("x", ConditionEffect::new("dazed")),
            )
            .unwrap_err();
        assert!(matches!(err, TreeEditError::InvalidSharedRoll { .. }));
    }

    #[test]
    fn test_outcome_cannot_be_root() {
        let mut tree = EffectTree::new();
        let err = tree.attach(None, EffectNode::new("o", DamageOutcome::FULL)).unwrap_err();
        assert_eq!(err, TreeEditError::OutcomeAsRoot(id("o")));
    }

    #[test]
    fn test_insert_returns_copy() {
        let tree = fireball();
        let next = tree
            .insert_node(
                Some((id("save"), OutcomeContext::FailedSaveBy(5))),
                EffectNode::new("stun", ConditionEffect::new("stunned")),
            )
            .unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(next.len(), 6);
        assert_eq!(next.children(&id("save"), OutcomeContext::FailedSaveBy(5)), &[id("stun")]);
    }

    #[test]
    fn test_update_preserves_header() {
        let tree = fireball();
        let next = tree
            .update_node(&id("fire"), |kind| {
                if let EffectKind::Damage(damage) = kind {
                    damage.formula = "4d6".to_string();
                }
            })
            .unwrap();

        let fire = next.get(&id("fire")).unwrap();
        assert_eq!(fire.parent_context, Some(OutcomeContext::SharedRolls));
        assert_eq!(fire.kind.as_damage().unwrap().formula, "4d6");
        assert_eq!(tree.get(&id("fire")).unwrap().kind.as_damage().unwrap().formula, "3d6");
    }

    #[test]
    fn test_update_rejects_kind_losing_edges() {
        let tree = fireball();
        let err = tree
            .update_node(&id("save"), |kind| *kind = ConditionEffect::new("prone").into())
            .unwrap_err();
        assert!(matches!(err, TreeEditError::InvalidEdge { .. }));
    }

    #[test]
    fn test_delete_removes_descendants() {
        let tree = fireball();
        let next = tree.delete_node(&id("save")).unwrap();
        assert!(next.is_empty());
        assert_eq!(next.roots().count(), 0);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_delete_leaf_unlinks_from_parent() {
        let tree = fireball();
        let next = tree.delete_node(&id("prone")).unwrap();
        assert_eq!(next.len(), 4);
        assert_eq!(next.children(&id("save"), OutcomeContext::FailedSave), &[id("full")]);
    }

    #[test]
    fn test_delete_unknown() {
        let tree = fireball();
        assert_eq!(tree.delete_node(&id("nope")).unwrap_err(), TreeEditError::UnknownNode(id("nope")));
    }

    #[test]
    fn test_descendants() {
        let tree = fireball();
        let found: Vec<String> = tree.descendants(&id("save")).into_iter().map(|n| n.to_string()).collect();
        assert_eq!(found, vec!["fire", "full", "prone", "half"]);
    }

    #[test]
    fn test_equality_ignores_build_order() {
        let mut a = EffectTree::new();
        a.attach(None, EffectNode::new("r1", ConditionEffect::new("prone"))).unwrap();
        a.attach(None, EffectNode::new("r2", ConditionEffect::new("dazed"))).unwrap();

        let mut b = EffectTree::new();
        b.attach(None, EffectNode::new("r1", ConditionEffect::new("prone"))).unwrap();
        b.attach(None, EffectNode::new("r2", ConditionEffect::new("dazed"))).unwrap();
        assert_eq!(a, b);

        let mut c = EffectTree::new();
        c.attach(None, EffectNode::new("r2", ConditionEffect::new("dazed"))).unwrap();
        c.attach(None, EffectNode::new("r1", ConditionEffect::new("prone"))).unwrap();
        assert_ne!(a, c);
    }
}
