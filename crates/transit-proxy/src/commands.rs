//! Work deferred onto the UI execution context.
//!
//! Starting an animation is decided while the proxy lock is held, but the
//! manager is only called from the UI context. Each decision becomes a typed
//! [`UiCommand`]; the scheduled task carries it together with a weak handle to
//! the proxy and does nothing if the proxy is gone by the time it runs.

use transit_core::{GeometrySnapshot, LayoutAnimationType, ShadowViewMutation, Tag, ViewSnapshot};

use crate::animation::LayoutAnimation;
use crate::proxy::ProxyInner;
use crate::tree::NodeState;

#[derive(Clone, Debug)]
pub(crate) enum UiCommand {
    StartEntering { tag: Tag, mutation: ShadowViewMutation },
    StartExiting { tag: Tag, mutation: ShadowViewMutation },
    StartLayout { tag: Tag, mutation: ShadowViewMutation },
    Cancel { tag: Tag },
}

impl UiCommand {
    pub(crate) fn tag(&self) -> Tag {
        match self {
            UiCommand::StartEntering { tag, .. }
            | UiCommand::StartExiting { tag, .. }
            | UiCommand::StartLayout { tag, .. }
            | UiCommand::Cancel { tag } => *tag,
        }
    }
}

impl ProxyInner {
    pub(crate) fn run_ui_command(&self, command: UiCommand) {
        if !self.is_alive() {
            log::trace!("dropping ui command for {} after shutdown", command.tag());
            return;
        }
        match command {
            UiCommand::StartEntering { tag, mutation } => self.start_entering(tag, mutation),
            UiCommand::StartExiting { tag, mutation } => self.start_exiting(tag, mutation),
            UiCommand::StartLayout { tag, mutation } => self.start_layout(tag, mutation),
            UiCommand::Cancel { tag } => self.manager.cancel_layout_animation(tag),
        }
    }

    fn start_entering(&self, tag: Tag, mutation: ShadowViewMutation) {
        let view = mutation.new_child;
        let window = {
            let mut state = self.state.lock();
            let animation = LayoutAnimation::new(view.clone(), view.clone(), mutation.parent_tag)
                .with_opacity(view.props.opacity());
            state.layout_animations.insert(tag, animation);
            state.surfaces.window(view.surface_id)
        };

        let values = GeometrySnapshot::entering(ViewSnapshot::new(&view, window));
        self.manager
            .start_layout_animation(tag, LayoutAnimationType::Entering, values);
    }

    fn start_exiting(&self, tag: Tag, mutation: ShadowViewMutation) {
        let surface_id = mutation.old_child.surface_id;
        let (old_view, window) = {
            let mut state = self.state.lock();
            let still_animating = state
                .tree
                .lookup(tag)
                .and_then(|id| state.tree.state(id))
                == Some(NodeState::Animating);
            if !still_animating {
                log::trace!("skipping exiting animation for {tag}, node already resolved");
                return;
            }
            let old_view = state.create_layout_animation(&mutation, tag);
            (old_view, state.surfaces.window(surface_id))
        };

        let values = GeometrySnapshot::exiting(ViewSnapshot::new(&old_view, window));
        self.manager
            .start_layout_animation(tag, LayoutAnimationType::Exiting, values);
        self.manager.clear_layout_animation_config(tag);
    }

    fn start_layout(&self, tag: Tag, mutation: ShadowViewMutation) {
        let surface_id = mutation.old_child.surface_id;
        let (old_view, window) = {
            let mut state = self.state.lock();
            let old_view = state.create_layout_animation(&mutation, tag);
            (old_view, state.surfaces.window(surface_id))
        };

        let values = GeometrySnapshot::layout(
            ViewSnapshot::new(&old_view, window),
            ViewSnapshot::new(&mutation.new_child, window),
        );
        self.manager
            .start_layout_animation(tag, LayoutAnimationType::Layout, values);
    }
}
