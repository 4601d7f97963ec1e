use std::mem;
use std::sync::Arc;

use transit_core::collections::TagMap;
use transit_core::{
    FrameUpdate, MutationKind, Props, ShadowView, ShadowViewMutation, SurfaceId, Tag,
};

use crate::animation::LayoutAnimation;
use crate::commands::UiCommand;
use crate::surface::{SurfaceManager, UpdateValues};
use crate::tree::{MutationTree, NodeId, NodeState};

/// Everything guarded by the proxy lock.
#[derive(Debug, Default)]
pub(crate) struct ProxyState {
    pub(crate) tree: MutationTree,
    pub(crate) layout_animations: TagMap<LayoutAnimation>,
    pub(crate) surfaces: SurfaceManager,
    pub(crate) dead_nodes: Vec<NodeId>,
    ui_commands: Vec<UiCommand>,
}

impl ProxyState {
    pub(crate) fn schedule(&mut self, command: UiCommand) {
        self.ui_commands.push(command);
    }

    /// Commands decided under the lock, to be dispatched once it is released.
    pub(crate) fn take_ui_commands(&mut self) -> Vec<UiCommand> {
        mem::take(&mut self.ui_commands)
    }

    /// Drops the in-flight animation of `tag` and asks the manager to stop it.
    pub(crate) fn cancel_animation(&mut self, tag: Tag) {
        if self.layout_animations.remove(&tag).is_some() {
            self.schedule(UiCommand::Cancel { tag });
        }
    }

    /// Records an exiting or layout animation for `tag` and returns the view
    /// it starts from.
    ///
    /// A retrigger starts from the view currently on screen and bumps the
    /// trigger count instead of resetting it.
    pub(crate) fn create_layout_animation(
        &mut self,
        mutation: &ShadowViewMutation,
        tag: Tag,
    ) -> ShadowView {
        let mut old_view = mutation.old_child.clone();
        let mut count = 1;
        if let Some(existing) = self.layout_animations.get(&tag) {
            old_view = existing.current_view.clone();
            count = existing.count + 1;
        }
        let final_view = if mutation.kind == MutationKind::Remove {
            mutation.old_child.clone()
        } else {
            mutation.new_child.clone()
        };
        let mut animation = LayoutAnimation::new(final_view, old_view.clone(), mutation.parent_tag);
        animation.count = count;
        self.layout_animations.insert(tag, animation);
        old_view
    }

    pub(crate) fn progress_layout_animation(
        &mut self,
        tag: Tag,
        mut style: Props,
    ) -> Option<SurfaceId> {
        let animation = self.layout_animations.get_mut(&tag)?;
        animation.restore_opacity(&mut style);
        let surface_id = animation.final_view.surface_id;
        let values = UpdateValues {
            props: Arc::new(animation.final_view.props.merged(&style)),
            frame: FrameUpdate::from_style(&style),
        };
        self.surfaces.update_map(surface_id).insert(tag, values);
        Some(surface_id)
    }

    pub(crate) fn end_layout_animation(
        &mut self,
        tag: Tag,
        should_remove: bool,
    ) -> Option<SurfaceId> {
        log::debug!("end layout animation for {tag}, should remove: {should_remove}");
        let animation = self.layout_animations.get_mut(&tag)?;
        if animation.count > 1 {
            animation.count -= 1;
            return None;
        }
        let surface_id = animation.final_view.surface_id;
        self.layout_animations.remove(&tag);
        self.surfaces.remove_update(surface_id, tag);

        if !should_remove {
            return None;
        }
        let id = self.tree.lookup(tag)?;
        if self.tree.state(id).is_none() {
            return None;
        }
        self.tree.set_state(id, NodeState::Dead);
        self.dead_nodes.push(id);
        Some(surface_id)
    }
}
