use super::*;
use pretty_assertions::assert_eq;
use transit_core::collections::TagMap;
use transit_testing::{delete, insert, remove, RecordingAnimationsManager, SURFACE};

use crate::config::ProxyConfig;
use crate::state::ProxyState;

fn run(
    state: &mut ProxyState,
    manager: &RecordingAnimationsManager,
    mutations: Vec<ShadowViewMutation>,
) -> Vec<ShadowViewMutation> {
    let config = ProxyConfig::default();
    Transaction::new(state, manager, &config, SURFACE).run(mutations)
}

#[test]
fn parse_marks_reinserted_views_as_moved() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    let config = ProxyConfig::default();
    let mut mutations = vec![remove(1, 5, 0), remove(1, 6, 1), delete(6), insert(2, 5, 0)];

    let mut transaction = Transaction::new(&mut state, &manager, &config, SURFACE);
    let (moved, roots) = transaction.parse_remove_mutations(&mut mutations);

    let expected: TagMap<Option<Tag>> = [(5, Some(2))].into_iter().collect();
    assert_eq!(moved, expected);
    assert_eq!(roots.len(), 2);
    let tree = &transaction.state.tree;
    assert_eq!(tree.lookup(5).and_then(|id| tree.state(id)), Some(NodeState::Moved));
    assert_eq!(tree.lookup(6).and_then(|id| tree.state(id)), Some(NodeState::Undefined));
}

#[test]
fn children_removed_with_their_parent_are_not_roots() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    let config = ProxyConfig::default();
    let mut mutations = vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)];

    let mut transaction = Transaction::new(&mut state, &manager, &config, SURFACE);
    let (moved, roots) = transaction.parse_remove_mutations(&mut mutations);

    assert!(moved.is_empty());
    assert_eq!(roots, transaction.state.tree.lookup(2).into_iter().collect::<Vec<_>>());
}

#[test]
fn exiting_parent_keeps_plain_child_waiting() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    manager.configure(2, LayoutAnimationType::Exiting);

    let filtered = run(
        &mut state,
        &manager,
        vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)],
    );

    assert!(filtered.is_empty());
    let parent = state.tree.lookup(2).expect("parent kept");
    let child = state.tree.lookup(3).expect("child kept");
    assert_eq!(state.tree.state(parent), Some(NodeState::Animating));
    assert_eq!(state.tree.state(child), Some(NodeState::Waiting));
    assert_eq!(manager.cleared(), vec![3]);

    let commands = state.take_ui_commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], UiCommand::StartExiting { tag: 2, .. }));
}

#[test]
fn dead_subtree_is_deleted_children_first() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    manager.configure(2, LayoutAnimationType::Exiting);
    run(
        &mut state,
        &manager,
        vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)],
    );
    state.create_layout_animation(&remove(1, 2, 0), 2);

    assert_eq!(state.end_layout_animation(2, true), Some(SURFACE));
    let filtered = run(&mut state, &manager, Vec::new());

    assert_eq!(
        filtered,
        vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)]
    );
    assert!(state.tree.is_empty());
}

#[test]
fn finalizing_the_same_dead_node_twice_deletes_once() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    let parent = state.tree.placeholder(1);
    let node = state.tree.attach_removal(remove(1, 7, 0));
    state.tree.insert_children(parent, vec![node]);
    state.tree.insert_unflattened_children(parent, vec![node]);
    state.tree.set_state(node, NodeState::Dead);
    state.dead_nodes.extend([node, node]);

    let filtered = run(&mut state, &manager, Vec::new());

    assert_eq!(filtered, vec![remove(1, 7, 0), delete(7)]);
    assert!(state.tree.is_empty());
    assert!(state.dead_nodes.is_empty());
    assert!(run(&mut state, &manager, Vec::new()).is_empty());
}

#[test]
fn exhausted_ancestors_are_pruned_up_to_an_animating_one() {
    let mut state = ProxyState::default();
    let manager = RecordingAnimationsManager::new();
    manager.configure(2, LayoutAnimationType::Exiting);
    manager.configure(4, LayoutAnimationType::Exiting);
    // 2 exits, 3 is a plain view between 2 and the exiting 4.
    run(
        &mut state,
        &manager,
        vec![
            remove(3, 4, 0),
            delete(4),
            remove(2, 3, 0),
            delete(3),
            remove(1, 2, 0),
            delete(2),
        ],
    );
    let node_3 = state.tree.lookup(3).expect("kept");
    assert_eq!(state.tree.state(node_3), Some(NodeState::Undefined));

    state.create_layout_animation(&remove(3, 4, 0), 4);
    assert_eq!(state.end_layout_animation(4, true), Some(SURFACE));
    let filtered = run(&mut state, &manager, Vec::new());

    assert_eq!(filtered, vec![remove(3, 4, 0), delete(4), remove(2, 3, 0), delete(3)]);
    assert_eq!(
        state.tree.lookup(2).and_then(|id| state.tree.state(id)),
        Some(NodeState::Animating)
    );
    assert_eq!(state.tree.lookup(3), None);
}
