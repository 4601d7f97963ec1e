//! Removal classification and the animate-or-delete decision.
//!
//! Removed views are organized into the persistent [`MutationTree`] so the
//! proxy can tell reparented views from deleted ones and keep exiting
//! subtrees mounted until their animations end.
//!
//! [`MutationTree`]: crate::tree::MutationTree

use std::mem;

use indexmap::IndexMap;
use transit_core::collections::TagSet;
use transit_core::{LayoutAnimationType, MutationKind, ShadowViewMutation, Tag};

use crate::commands::UiCommand;
use crate::transaction::{MovedViews, Transaction};
use crate::tree::{NodeId, NodeState};

impl Transaction<'_> {
    /// Builds mutation nodes for every Remove of the batch.
    ///
    /// The batch is scanned from the end so that parents are registered
    /// before the children removed under them. Returns the moved views and
    /// the roots of the independent removal subtrees, in scan order.
    pub(crate) fn parse_remove_mutations(
        &mut self,
        mutations: &mut [ShadowViewMutation],
    ) -> (MovedViews, Vec<NodeId>) {
        let mut moved_views = MovedViews::new();
        let mut deleted_views = TagSet::new();
        let mut children_for_tag: IndexMap<Tag, Vec<NodeId>> = IndexMap::new();
        let mut unflattened_children_for_tag: IndexMap<Tag, Vec<NodeId>> = IndexMap::new();
        let mut mutation_nodes = Vec::new();
        let tree = &mut self.state.tree;

        for mutation in mutations.iter_mut().rev() {
            match mutation.kind {
                MutationKind::Delete => {
                    deleted_views.insert(mutation.old_child.tag);
                }
                MutationKind::Remove => {
                    tree.update_index_for_mutation(mutation);
                    let tag = mutation.old_child.tag;
                    let parent_tag = mutation.parent_tag;
                    // The host reports flattened parents only.
                    let unflattened_parent_tag = parent_tag;

                    let id = tree.attach_removal(mutation.clone());
                    if !deleted_views.contains(&tag) {
                        tree.set_state(id, NodeState::Moved);
                        moved_views.insert(tag, None);
                    }
                    tree.placeholder(parent_tag);
                    tree.placeholder(unflattened_parent_tag);

                    mutation_nodes.push(id);
                    children_for_tag.entry(parent_tag).or_default().push(id);
                    unflattened_children_for_tag
                        .entry(unflattened_parent_tag)
                        .or_default()
                        .push(id);
                }
                MutationKind::Update if moved_views.contains_key(&mutation.new_child.tag) => {
                    let removal = tree
                        .lookup(mutation.new_child.tag)
                        .and_then(|id| tree.get_mut(id))
                        .and_then(|node| node.removal.as_mut());
                    if let Some(removal) = removal {
                        removal.mutation.old_child = mutation.old_child.clone();
                    }
                }
                _ => {}
            }
        }

        for mutation in mutations.iter() {
            if mutation.kind != MutationKind::Insert {
                continue;
            }
            if let Some(parent) = moved_views.get_mut(&mutation.new_child.tag) {
                *parent = Some(mutation.parent_tag);
            }
        }

        for (parent_tag, children) in children_for_tag {
            let parent = tree.placeholder(parent_tag);
            tree.insert_children(parent, children);
        }
        for (parent_tag, children) in unflattened_children_for_tag {
            let parent = tree.placeholder(parent_tag);
            tree.insert_unflattened_children(parent, children);
        }

        let roots = mutation_nodes
            .into_iter()
            .filter(|&id| {
                let Some(node) = tree.get(id) else {
                    return false;
                };
                !node
                    .unflattened_parent
                    .and_then(|parent| tree.get(parent))
                    .is_some_and(|parent| parent.is_mutation_node())
            })
            .collect();

        (moved_views, roots)
    }

    /// Decides the fate of every removal root, then finalizes the nodes whose
    /// exit animation ended since the previous pass.
    pub(crate) fn handle_removals(&mut self, roots: &[NodeId]) {
        // Later roots hold higher indices; emitting them first keeps the
        // remaining indices valid for the mounting layer.
        for &root in roots.iter().rev() {
            if self.start_animations_recursively(root, true, true, false) {
                continue;
            }
            let Some(node) = self.state.tree.get(root) else {
                continue;
            };
            let Some(removal) = node.removal.as_ref() else {
                continue;
            };
            let tag = node.tag;
            let parent = node.unflattened_parent;
            let state = removal.state;
            let mutation = removal.mutation.clone();

            self.filtered.push(mutation.clone());
            if let Some(parent) = parent {
                self.state.tree.remove_child_from_unflattened_tree(parent, root);
            }
            if state != NodeState::Moved {
                self.state.cancel_animation(tag);
                self.filtered.push(ShadowViewMutation::delete(mutation.old_child));
                log::debug!("delete {tag}");
            }
            self.state.tree.release(root);
        }

        self.finalize_dead_nodes();
    }

    pub(crate) fn finalize_dead_nodes(&mut self) {
        let dead_nodes = mem::take(&mut self.state.dead_nodes);
        for id in dead_nodes {
            let Some(node) = self.state.tree.get(id) else {
                continue;
            };
            if node.state() == Some(NodeState::Deleted) {
                continue;
            }
            let parent = node.unflattened_parent;
            self.end_animations_recursively(id);
            if let Some(parent) = parent {
                self.maybe_drop_ancestors(parent, id);
            }
        }
    }

    /// Returns whether `id` or one of its descendants has to stay mounted.
    fn start_animations_recursively(
        &mut self,
        id: NodeId,
        remove_without_animation: bool,
        should_animate: bool,
        is_screen_pop: bool,
    ) -> bool {
        let Some(node) = self.state.tree.get(id) else {
            return false;
        };
        let Some(removal) = node.removal.as_ref() else {
            return false;
        };
        let tag = node.tag;
        let state = removal.state;
        let children = node.unflattened_children.clone();
        let is_screen_pop = is_screen_pop
            || self
                .config
                .is_screen_component(&removal.mutation.old_child.component_name);

        let should_animate =
            !is_screen_pop && self.manager.should_animate_exiting(tag, should_animate);
        let has_exit_animation = should_animate
            && self
                .manager
                .has_layout_animation(tag, LayoutAnimationType::Exiting);
        let mut has_animated_children = false;
        let remove_without_animation =
            remove_without_animation && (!has_exit_animation || state == NodeState::Moved);
        let mut to_be_removed = Vec::new();

        for &child in children.iter().rev() {
            match self.state.tree.state(child) {
                None => continue,
                Some(NodeState::Undefined | NodeState::Moved) => {}
                Some(child_state) => {
                    if should_animate && child_state != NodeState::Dead {
                        has_animated_children = true;
                    } else {
                        self.end_animations_recursively(child);
                        to_be_removed.push(child);
                    }
                    continue;
                }
            }

            if self.start_animations_recursively(
                child,
                remove_without_animation,
                should_animate,
                is_screen_pop,
            ) {
                log::trace!("child {} of {tag} keeps animating", self.tag_of(child));
                has_animated_children = true;
            } else if self.state.tree.state(child) == Some(NodeState::Moved) {
                if let Some(removal) = self.state.tree.removal(child) {
                    self.filtered.push(removal.mutation.clone());
                }
                to_be_removed.push(child);
            } else if remove_without_animation {
                self.delete_node(child);
                to_be_removed.push(child);
            } else {
                self.state.tree.set_state(child, NodeState::Waiting);
            }
        }

        for child in to_be_removed {
            self.state.tree.remove_child_from_unflattened_tree(id, child);
            self.state.tree.release(child);
        }

        if state == NodeState::Moved {
            self.state.tree.replace_moved(id);
            return false;
        }

        if has_exit_animation {
            self.state.tree.set_state(id, NodeState::Animating);
            if let Some(removal) = self.state.tree.removal(id) {
                let mutation = removal.mutation.clone();
                self.start_exiting_animation(tag, mutation);
            }
        } else {
            self.manager.clear_layout_animation_config(tag);
        }

        has_exit_animation || has_animated_children
    }

    fn start_exiting_animation(&mut self, tag: Tag, mutation: ShadowViewMutation) {
        log::debug!("start exiting animation for {tag}");
        self.state.schedule(UiCommand::StartExiting { tag, mutation });
    }

    fn tag_of(&self, id: NodeId) -> Tag {
        self.state
            .tree
            .get(id)
            .map(|node| node.tag)
            .unwrap_or(transit_core::NO_TAG)
    }

    /// Emits Remove + Delete for a childless mutation node and releases it.
    fn delete_node(&mut self, id: NodeId) {
        let Some(node) = self.state.tree.get(id) else {
            return;
        };
        let Some(removal) = node.removal.as_ref() else {
            return;
        };
        let tag = node.tag;
        let mutation = removal.mutation.clone();

        self.state.cancel_animation(tag);
        self.filtered.push(mutation.clone());
        self.state.tree.set_state(id, NodeState::Deleted);
        self.state.tree.release(id);
        log::debug!("delete {tag}");
        self.filtered.push(ShadowViewMutation::delete(mutation.old_child));
    }

    /// Deletes `root` and every descendant not deleted yet, children before
    /// parents and higher indices first.
    fn end_animations_recursively(&mut self, root: NodeId) {
        let mut stack = vec![(root, false)];
        while let Some((id, visited)) = stack.pop() {
            let Some(node) = self.state.tree.get(id) else {
                continue;
            };
            let tag = node.tag;
            if !visited {
                if node.state() == Some(NodeState::Deleted) {
                    continue;
                }
                let children = node.unflattened_children.clone();
                self.state.cancel_animation(tag);
                self.state.tree.set_state(id, NodeState::Deleted);
                stack.push((id, true));
                stack.extend(children.into_iter().map(|child| (child, false)));
                continue;
            }

            let Some(removal) = node.removal.as_ref() else {
                continue;
            };
            let mutation = removal.mutation.clone();
            self.state.tree.release(id);
            log::debug!("delete {tag}");
            self.filtered.push(mutation.clone());
            self.filtered.push(ShadowViewMutation::delete(mutation.old_child));
        }
    }

    /// Detaches `child` from `parent` and deletes every ancestor left without
    /// children that is not animating itself.
    fn maybe_drop_ancestors(&mut self, parent: NodeId, child: NodeId) {
        let mut parent = parent;
        let mut child = child;
        loop {
            self.state.tree.remove_child_from_unflattened_tree(parent, child);
            let Some(node) = self.state.tree.get(parent) else {
                return;
            };
            let Some(removal) = node.removal.as_ref() else {
                return;
            };
            if !node.children.is_empty() || removal.state == NodeState::Animating {
                return;
            }
            let tag = node.tag;
            let next = node.unflattened_parent;
            let mutation = removal.mutation.clone();

            self.state.tree.set_state(parent, NodeState::Deleted);
            self.state.tree.release(parent);
            self.filtered.push(mutation.clone());
            self.state.cancel_animation(tag);
            log::debug!("delete {tag}");
            self.filtered.push(ShadowViewMutation::delete(mutation.old_child));

            let Some(next) = next else {
                return;
            };
            child = parent;
            parent = next;
        }
    }
}

#[cfg(test)]
#[path = "tests/removals_tests.rs"]
mod tests;
