use pretty_assertions::assert_eq;
use transit_core::{LayoutAnimationType, ShadowView, ShadowViewMutation};
use transit_proxy::NodeState;
use transit_testing::{delete, insert, remove, remove_and_delete, ProxyHarness, SURFACE};

#[test]
fn reparented_view_is_passed_through_without_delete() {
    let mut harness = ProxyHarness::new();

    let filtered = harness.pull(vec![remove(1, 5, 0), insert(2, 5, 0)]);

    assert_eq!(filtered, vec![remove(1, 5, 0), insert(2, 5, 0)]);
    assert_eq!(harness.proxy.node_state(5), None);
    assert_eq!(harness.drain_ui(), 0);
    assert!(harness.manager.calls().is_empty());
}

#[test]
fn plain_removal_is_removed_and_deleted_at_once() {
    let mut harness = ProxyHarness::new();

    let filtered = harness.pull(remove_and_delete(1, 5, 0).to_vec());

    assert_eq!(filtered, vec![remove(1, 5, 0), delete(5)]);
    assert_eq!(harness.manager.cleared(), vec![5]);
}

#[test]
fn exiting_view_stays_mounted_until_its_animation_ends() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(7, LayoutAnimationType::Exiting);

    assert!(harness.pull(remove_and_delete(1, 7, 0).to_vec()).is_empty());
    assert_eq!(harness.proxy.node_state(7), Some(NodeState::Animating));

    assert_eq!(harness.drain_ui(), 1);
    assert_eq!(harness.manager.started(), vec![(7, LayoutAnimationType::Exiting)]);
    let values = harness
        .manager
        .started_values(7, LayoutAnimationType::Exiting)
        .expect("exit started");
    assert_eq!(values.current_width, 100.0);
    assert_eq!(values.target_width, 0.0);
    assert_eq!(harness.manager.cleared(), vec![7]);
    assert!(harness.proxy.is_animating(7));

    let handle = harness.handle();
    assert_eq!(handle.end_layout_animation(7, true), Some(SURFACE));
    assert_eq!(harness.observer.notified(), vec![SURFACE]);
    assert_eq!(harness.proxy.node_state(7), Some(NodeState::Dead));

    assert_eq!(harness.pull(Vec::new()), vec![remove(1, 7, 0), delete(7)]);
    assert!(harness.pull(Vec::new()).is_empty());
    assert_eq!(harness.proxy.node_state(7), None);
    assert!(harness.manager.cancelled().is_empty());
}

#[test]
fn ending_without_removal_keeps_the_view_mounted() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(7, LayoutAnimationType::Exiting);
    harness.pull(remove_and_delete(1, 7, 0).to_vec());
    harness.drain_ui();

    assert_eq!(harness.handle().end_layout_animation(7, false), None);

    assert!(harness.pull(Vec::new()).is_empty());
    assert!(!harness.proxy.is_animating(7));
    assert_eq!(harness.proxy.node_state(7), Some(NodeState::Animating));
    assert!(harness.observer.notified().is_empty());
}

#[test]
fn screen_pop_removes_descendants_without_exit_animations() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(3, LayoutAnimationType::Exiting);
    let screen = ShadowView::new(2, "RNSScreen", SURFACE);
    let batch = vec![
        remove(2, 3, 0),
        delete(3),
        ShadowViewMutation::remove(1, screen.clone(), 0),
        ShadowViewMutation::delete(screen),
    ];

    let filtered = harness.pull(batch.clone());

    assert_eq!(filtered, batch);
    assert_eq!(harness.drain_ui(), 0);
    assert!(harness.manager.started().is_empty());
    assert_eq!(harness.manager.cleared(), vec![3, 2]);
}

#[test]
fn parent_opting_out_of_exiting_disables_child_exits() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(3, LayoutAnimationType::Exiting);
    harness.manager.set_should_animate_exiting(2, false);
    let batch = vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)];

    assert_eq!(harness.pull(batch.clone()), batch);
    assert!(harness.manager.started().is_empty());
}

#[test]
fn exiting_child_keeps_its_removed_parent_mounted() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(3, LayoutAnimationType::Exiting);

    let filtered = harness.pull(vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)]);

    assert!(filtered.is_empty());
    assert_eq!(harness.proxy.node_state(2), Some(NodeState::Undefined));
    assert_eq!(harness.proxy.node_state(3), Some(NodeState::Animating));
    assert_eq!(harness.proxy.debug_tree(1), "[1]\n  [2] Undefined @0\n    [3] Animating @0\n");

    harness.drain_ui();
    harness.handle().end_layout_animation(3, true);

    assert_eq!(
        harness.pull(Vec::new()),
        vec![remove(2, 3, 0), delete(3), remove(1, 2, 0), delete(2)]
    );
    assert_eq!(harness.proxy.debug_tree(1), "(no node)\n");
}

#[test]
fn later_removal_index_counts_exiting_siblings() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(11, LayoutAnimationType::Exiting);
    assert!(harness.pull(remove_and_delete(1, 11, 1).to_vec()).is_empty());

    // The host no longer sees 11, so the sibling after it is at index 1.
    let filtered = harness.pull(remove_and_delete(1, 12, 1).to_vec());

    assert_eq!(filtered, vec![remove(1, 12, 2), delete(12)]);
}

#[test]
fn insert_next_to_an_exiting_sibling_shifts_its_index() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(11, LayoutAnimationType::Exiting);
    // Mounted under 1: [10, 11, 12]; 11 exits and stays mounted at 1.
    assert!(harness.pull(remove_and_delete(1, 11, 1).to_vec()).is_empty());
    harness.drain_ui();

    // The host sees [10, 12]: 20 goes in front and 12 leaves from index 1.
    let filtered = harness.pull(vec![insert(1, 20, 0), remove(1, 12, 1), delete(12)]);

    assert_eq!(filtered, vec![remove(1, 12, 2), delete(12), insert(1, 20, 0)]);
    // Mounted is now [20, 10, 11].
    assert_eq!(harness.proxy.debug_tree(1), "[1]\n  [11] Animating @2\n");

    harness.handle().end_layout_animation(11, true);
    assert_eq!(harness.pull(Vec::new()), vec![remove(1, 11, 2), delete(11)]);
}

#[test]
fn deleting_an_entering_view_cancels_its_animation() {
    let mut harness = ProxyHarness::new();
    harness.manager.configure(3, LayoutAnimationType::Entering);
    harness.pull(vec![insert(1, 3, 0)]);
    harness.drain_ui();
    assert!(harness.proxy.is_animating(3));

    let filtered = harness.pull(remove_and_delete(1, 3, 0).to_vec());

    assert_eq!(filtered, vec![remove(1, 3, 0), delete(3)]);
    assert!(!harness.proxy.is_animating(3));
    assert_eq!(harness.drain_ui(), 1);
    assert_eq!(harness.manager.cancelled(), vec![3]);
}
