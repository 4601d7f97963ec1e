//! Persistent shadow tree of views that were removed by the host but are still
//! mounted because they (or a descendant) are animating out.
//!
//! Nodes live in a generational arena and are addressed by [`NodeId`]. Parent
//! links are plain ids, never owners. Every node keeps two child orderings:
//! `children` mirrors the flattened host hierarchy and `unflattened_children`
//! the logical nesting. Both hold only mutation nodes and are kept sorted by
//! the host index recorded in each child's removal mutation.

use std::fmt::Write as _;
use std::mem;

use transit_core::collections::TagMap;
use transit_core::{MutationKind, NodeError, ShadowViewMutation, Tag, NO_INDEX};

/// Stable handle of an arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Classification of a mutation node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Not classified yet in the current pass.
    Undefined,
    /// No animation in this subtree; fate decided by an ancestor later.
    Waiting,
    /// An exit animation is in flight for this view.
    Animating,
    /// Reparented within the batch; its removal must not delete the view.
    Moved,
    /// Animation ended with a removal request; finalized next transaction.
    Dead,
    /// Fully resolved and gone from every table.
    Deleted,
}

/// Removal record carried by a mutation node.
#[derive(Clone, Debug)]
pub struct Removal {
    pub mutation: ShadowViewMutation,
    pub state: NodeState,
}

#[derive(Clone, Debug)]
pub struct TreeNode {
    pub tag: Tag,
    pub children: Vec<NodeId>,
    pub unflattened_children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub unflattened_parent: Option<NodeId>,
    /// `Some` for mutation nodes, `None` for placeholder parents.
    pub removal: Option<Removal>,
}

impl TreeNode {
    fn placeholder(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
            unflattened_children: Vec::new(),
            parent: None,
            unflattened_parent: None,
            removal: None,
        }
    }

    pub fn is_mutation_node(&self) -> bool {
        self.removal.is_some()
    }

    pub fn state(&self) -> Option<NodeState> {
        self.removal.as_ref().map(|removal| removal.state)
    }

    fn index(&self) -> i32 {
        self.removal
            .as_ref()
            .map(|removal| removal.mutation.index)
            .unwrap_or(NO_INDEX)
    }

    fn is_bare(&self) -> bool {
        self.removal.is_none() && self.children.is_empty() && self.unflattened_children.is_empty()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

#[derive(Debug, Default)]
pub struct MutationTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    by_tag: TagMap<NodeId>,
}

impl MutationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, tag: Tag) -> Option<NodeId> {
        self.by_tag.get(&tag).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&TreeNode, NodeError> {
        self.get(id).ok_or(NodeError::Stale {
            index: id.index,
            generation: id.generation,
        })
    }

    pub fn node_for_tag(&self, tag: Tag) -> Result<&TreeNode, NodeError> {
        let id = self.lookup(tag).ok_or(NodeError::Missing { tag })?;
        self.node(id)
    }

    /// State of a mutation node; `None` for placeholders and stale ids.
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.get(id).and_then(TreeNode::state)
    }

    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        if let Some(removal) = self.get_mut(id).and_then(|node| node.removal.as_mut()) {
            removal.state = state;
        }
    }

    pub fn removal(&self, id: NodeId) -> Option<&Removal> {
        self.get(id).and_then(|node| node.removal.as_ref())
    }

    fn index_of(&self, id: NodeId) -> i32 {
        self.get(id).map(TreeNode::index).unwrap_or(NO_INDEX)
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot of `id` and drops its tag binding if it still points here.
    ///
    /// Releasing a stale id is a no-op.
    pub fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        if self.by_tag.get(&node.tag) == Some(&id) {
            self.by_tag.remove(&node.tag);
        }
    }

    /// Returns the node registered for `tag`, creating a placeholder if needed.
    pub fn placeholder(&mut self, tag: Tag) -> NodeId {
        if let Some(id) = self.lookup(tag) {
            return id;
        }
        let id = self.alloc(TreeNode::placeholder(tag));
        self.by_tag.insert(tag, id);
        id
    }

    /// Registers a mutation node for the view removed by `mutation`.
    ///
    /// If a node already exists for the tag, its children are adopted by the
    /// new node and the old one is detached and released.
    pub fn attach_removal(&mut self, mutation: ShadowViewMutation) -> NodeId {
        let tag = mutation.old_child.tag;
        let mut node = TreeNode::placeholder(tag);
        node.removal = Some(Removal {
            mutation,
            state: NodeState::Undefined,
        });

        if let Some(previous) = self.lookup(tag) {
            let mut parents = Vec::new();
            if let Some(old) = self.get_mut(previous) {
                node.children = mem::take(&mut old.children);
                node.unflattened_children = mem::take(&mut old.unflattened_children);
                parents.extend(old.parent);
                parents.extend(old.unflattened_parent);
            }
            for parent in parents {
                self.remove_child_from_unflattened_tree(parent, previous);
            }
            self.release(previous);
        }

        let id = self.alloc(node);
        self.reparent_children(id);
        self.by_tag.insert(tag, id);
        id
    }

    fn reparent_children(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let children = node.children.clone();
        let unflattened = node.unflattened_children.clone();
        for child in children {
            if let Some(child) = self.get_mut(child) {
                child.parent = Some(id);
            }
        }
        for child in unflattened {
            if let Some(child) = self.get_mut(child) {
                child.unflattened_parent = Some(id);
            }
        }
    }

    /// Merges `incoming` into `existing`, both ordered by host index.
    ///
    /// `incoming` is stably sorted first, so siblings with equal indices keep
    /// their batch order; on ties with existing children incoming ones go first.
    fn merge_by_index(&self, existing: &[NodeId], mut incoming: Vec<NodeId>) -> Vec<NodeId> {
        incoming.sort_by_key(|id| self.index_of(*id));
        let mut merged = Vec::with_capacity(existing.len() + incoming.len());
        let mut existing = existing.iter().copied().peekable();
        let mut incoming = incoming.into_iter().peekable();
        while let (Some(&old), Some(&new)) = (existing.peek(), incoming.peek()) {
            if self.index_of(old) < self.index_of(new) {
                merged.push(old);
                existing.next();
            } else {
                merged.push(new);
                incoming.next();
            }
        }
        merged.extend(existing);
        merged.extend(incoming);
        merged
    }

    pub fn insert_children(&mut self, parent: NodeId, incoming: Vec<NodeId>) {
        let Some(node) = self.get(parent) else {
            return;
        };
        let merged = self.merge_by_index(&node.children, incoming.clone());
        for child in incoming {
            if let Some(child) = self.get_mut(child) {
                child.parent = Some(parent);
            }
        }
        if let Some(node) = self.get_mut(parent) {
            node.children = merged;
        }
    }

    pub fn insert_unflattened_children(&mut self, parent: NodeId, incoming: Vec<NodeId>) {
        let Some(node) = self.get(parent) else {
            return;
        };
        let merged = self.merge_by_index(&node.unflattened_children, incoming.clone());
        for child in incoming {
            if let Some(child) = self.get_mut(child) {
                child.unflattened_parent = Some(parent);
            }
        }
        if let Some(node) = self.get_mut(parent) {
            node.unflattened_children = merged;
        }
    }

    /// Detaches `child` from both orderings of `parent`. Idempotent.
    ///
    /// A placeholder parent left without children is released.
    pub fn remove_child_from_unflattened_tree(&mut self, parent: NodeId, child: NodeId) {
        let Some(node) = self.get_mut(parent) else {
            return;
        };
        if let Some(position) = node.unflattened_children.iter().rposition(|&id| id == child) {
            node.unflattened_children.remove(position);
        }
        if let Some(position) = node.children.iter().rposition(|&id| id == child) {
            node.children.remove(position);
        }
        let bare = node.is_bare();
        if bare {
            self.release(parent);
        }
    }

    /// Shifts the recorded host index of `parent`'s children at or after the
    /// index touched by an Insert (+1) or Remove (-1) under that parent.
    pub fn apply_mutation_to_indices(&mut self, parent: NodeId, mutation: &ShadowViewMutation) {
        let Some(node) = self.get(parent) else {
            return;
        };
        if node.tag != mutation.parent_tag {
            return;
        }
        let children = node.children.clone();
        for child in children.into_iter().rev() {
            let Some(removal) = self.get_mut(child).and_then(|node| node.removal.as_mut()) else {
                continue;
            };
            if removal.mutation.index < mutation.index {
                return;
            }
            match mutation.kind {
                MutationKind::Insert => removal.mutation.index += 1,
                MutationKind::Remove => removal.mutation.index -= 1,
                _ => {}
            }
        }
    }

    /// Translates a host-diff index into a mounted index by counting the
    /// still-mounted exiting siblings that precede it.
    pub fn update_index_for_mutation(&self, mutation: &mut ShadowViewMutation) {
        if mutation.index == NO_INDEX {
            return;
        }
        let Some(parent) = self.lookup(mutation.parent_tag).and_then(|id| self.get(id)) else {
            return;
        };
        let mut size = 0;
        let mut previous = NO_INDEX;
        let mut offset = 0;
        for &child in &parent.children {
            let index = self.index_of(child);
            size += index - previous - 1;
            if mutation.index < size {
                break;
            }
            offset += 1;
            previous = index;
        }
        if offset != 0 {
            log::trace!(
                "update index for {} in {}: {} -> {}",
                mutation.tag(),
                mutation.parent_tag,
                mutation.index,
                mutation.index + offset
            );
        }
        mutation.index += offset;
    }

    /// Swaps the mutation node `id` for a placeholder that keeps its children.
    ///
    /// The mutation node itself stays allocated so the caller can still read
    /// its removal record; it must be released afterwards. Returns the
    /// placeholder, or `None` when there were no children to keep.
    pub fn replace_moved(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.get_mut(id)?;
        let tag = node.tag;
        let children = mem::take(&mut node.children);
        let unflattened_children = mem::take(&mut node.unflattened_children);
        if self.by_tag.get(&tag) == Some(&id) {
            self.by_tag.remove(&tag);
        }
        if children.is_empty() && unflattened_children.is_empty() {
            return None;
        }
        let mut replacement = TreeNode::placeholder(tag);
        replacement.children = children;
        replacement.unflattened_children = unflattened_children;
        let replacement = self.alloc(replacement);
        self.reparent_children(replacement);
        self.by_tag.insert(tag, replacement);
        Some(replacement)
    }

    /// Indented listing of the unflattened subtree below `tag`.
    pub fn dump_tree(&self, tag: Tag) -> String {
        let mut output = String::new();
        match self.lookup(tag) {
            Some(id) => self.dump_node(&mut output, id, 0),
            None => output.push_str("(no node)\n"),
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.get(id) {
            Some(node) => {
                let _ = match node.state() {
                    Some(state) => writeln!(
                        output,
                        "{indent}[{}] {:?} @{}",
                        node.tag,
                        state,
                        node.index()
                    ),
                    None => writeln!(output, "{indent}[{}]", node.tag),
                };
                for &child in &node.unflattened_children {
                    self.dump_node(output, child, depth + 1);
                }
            }
            None => {
                let _ = writeln!(output, "{indent}(stale)");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
