//! One pass of the proxy over a host mutation batch.
//!
//! The pass runs in four phases, all under the proxy lock:
//! 1. classify removals into the persistent mutation tree ([`removals`](crate::removals)),
//! 2. decide animated versus immediate deletions and finalize dead nodes,
//! 3. classify inserts and updates ([`enterings`](crate::enterings)),
//! 4. merge the frames written by the animation driver since the last pass.

use transit_core::collections::TagMap;
use transit_core::{LayoutAnimationsManager, ShadowViewMutation, SurfaceId, Tag};

use crate::config::ProxyConfig;
use crate::state::ProxyState;

/// Tags removed in this batch that are not deleted, mapped to the parent they
/// are inserted into (`None` until the insert is seen).
pub(crate) type MovedViews = TagMap<Option<Tag>>;

pub(crate) struct Transaction<'a> {
    pub(crate) state: &'a mut ProxyState,
    pub(crate) manager: &'a dyn LayoutAnimationsManager,
    pub(crate) config: &'a ProxyConfig,
    pub(crate) surface_id: SurfaceId,
    pub(crate) filtered: Vec<ShadowViewMutation>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(
        state: &'a mut ProxyState,
        manager: &'a dyn LayoutAnimationsManager,
        config: &'a ProxyConfig,
        surface_id: SurfaceId,
    ) -> Self {
        Self {
            state,
            manager,
            config,
            surface_id,
            filtered: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, mut mutations: Vec<ShadowViewMutation>) -> Vec<ShadowViewMutation> {
        let (moved_views, roots) = self.parse_remove_mutations(&mut mutations);
        self.handle_removals(&roots);
        self.handle_updates_and_enterings(&moved_views, mutations);
        self.add_ongoing_animations();
        self.filtered
    }

    /// Emits one Update per view whose animation driver produced a frame
    /// since the previous pass, then clears the surface's update table.
    fn add_ongoing_animations(&mut self) {
        let updates = self.state.surfaces.take_updates(self.surface_id);
        for (tag, values) in updates {
            let Some(animation) = self.state.layout_animations.get_mut(&tag) else {
                continue;
            };
            let mut new_view = animation.final_view.clone();
            new_view.props = values.props;
            values.frame.apply(&mut new_view.frame);

            self.filtered.push(ShadowViewMutation::update(
                animation.current_view.clone(),
                new_view.clone(),
                animation.parent_tag,
            ));
            animation.current_view = new_view;
        }
    }
}
