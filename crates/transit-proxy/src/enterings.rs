//! Forward pass over Create, Insert and Update mutations.

use transit_core::collections::TagMap;
use transit_core::{
    LayoutAnimationType, MutationKind, ShadowView, ShadowViewMutation, Tag, NO_TAG,
};

use crate::commands::UiCommand;
use crate::transaction::{MovedViews, Transaction};

/// Pre-update views of layout-animated tags, keyed by tag. Only lives for the
/// batch that produced them.
type ReparentingViews = TagMap<ShadowView>;

impl Transaction<'_> {
    pub(crate) fn handle_updates_and_enterings(
        &mut self,
        moved_views: &MovedViews,
        mutations: Vec<ShadowViewMutation>,
    ) {
        let mut old_views = ReparentingViews::new();
        for mutation in mutations {
            self.maybe_update_window_dimensions(&mutation);
            let tag = mutation.tag();
            match mutation.kind {
                MutationKind::Create => self.filtered.push(mutation),
                MutationKind::Insert => {
                    self.handle_insert(tag, mutation, moved_views, &mut old_views)
                }
                MutationKind::Update => {
                    self.handle_update(tag, mutation, moved_views, &mut old_views)
                }
                MutationKind::Remove | MutationKind::Delete => {}
            }
        }
    }

    fn handle_insert(
        &mut self,
        tag: Tag,
        mut mutation: ShadowViewMutation,
        moved_views: &MovedViews,
        old_views: &mut ReparentingViews,
    ) {
        let tree = &mut self.state.tree;
        tree.update_index_for_mutation(&mut mutation);
        if let Some(parent) = tree.lookup(mutation.parent_tag) {
            tree.apply_mutation_to_indices(parent, &mutation);
        }

        if let Some(&moved_to) = moved_views.get(&tag) {
            match self.state.layout_animations.get_mut(&tag) {
                Some(animation) => {
                    self.filtered.push(ShadowViewMutation::insert(
                        mutation.parent_tag,
                        animation.current_view.clone(),
                        mutation.index,
                    ));
                    if let Some(parent_tag) = moved_to {
                        animation.parent_tag = parent_tag;
                    }
                }
                None => match old_views.remove(&tag) {
                    Some(old_view) => self.filtered.push(ShadowViewMutation::insert(
                        mutation.parent_tag,
                        old_view,
                        mutation.index,
                    )),
                    None => self.filtered.push(mutation),
                },
            }
            return;
        }

        self.transfer_config_from_native_id(&mutation.new_child);
        if !self
            .manager
            .has_layout_animation(tag, LayoutAnimationType::Entering)
        {
            self.filtered.push(mutation);
            return;
        }

        log::debug!("start entering animation for {tag}");
        self.state.schedule(UiCommand::StartEntering {
            tag,
            mutation: mutation.clone(),
        });
        let hidden = mutation.new_child.clone().with_prop("opacity", 0.0);
        let update =
            ShadowViewMutation::update(mutation.new_child.clone(), hidden, mutation.parent_tag);
        self.filtered.push(mutation);
        self.filtered.push(update);
    }

    fn handle_update(
        &mut self,
        tag: Tag,
        mut mutation: ShadowViewMutation,
        moved_views: &MovedViews,
        old_views: &mut ReparentingViews,
    ) {
        let changed = has_layout_changed(&mutation);
        let tracked = self.state.layout_animations.contains_key(&tag);
        let configured = self
            .manager
            .has_layout_animation(tag, LayoutAnimationType::Layout);
        if !configured || (!changed && !tracked) {
            self.filtered.push(mutation);
            return;
        }

        if !changed {
            if let Some(animation) = self.state.layout_animations.get_mut(&tag) {
                animation.final_view = mutation.new_child;
            }
            return;
        }

        old_views.insert(tag, mutation.old_child.clone());
        if let Some(&moved_to) = moved_views.get(&tag) {
            mutation.parent_tag = moved_to.unwrap_or(NO_TAG);
        }
        if mutation.parent_tag == NO_TAG {
            log::trace!("no parent resolved for layout animation of {tag}");
            return;
        }

        log::debug!("start layout animation for {tag}");
        self.state.schedule(UiCommand::StartLayout { tag, mutation });
    }

    /// Applies the animation config registered under the view's transfer
    /// identifier, if the view declares a numeric one.
    fn transfer_config_from_native_id(&self, view: &ShadowView) {
        let Some(native_id) = view.props.string(&self.config.native_id_prop) else {
            return;
        };
        if native_id.is_empty() {
            return;
        }
        match native_id.parse::<i32>() {
            Ok(native_id) => self
                .manager
                .transfer_config_from_native_id(native_id, view.tag),
            Err(err) => log::trace!("ignoring native id {native_id:?} of {}: {err}", view.tag),
        }
    }

    fn maybe_update_window_dimensions(&mut self, mutation: &ShadowViewMutation) {
        if mutation.kind != MutationKind::Update
            || !self
                .config
                .is_root_component(&mutation.old_child.component_name)
        {
            return;
        }
        let frame = mutation.new_child.frame;
        self.state
            .surfaces
            .update_window(self.surface_id, frame.width, frame.height);
    }
}

fn has_layout_changed(mutation: &ShadowViewMutation) -> bool {
    mutation.old_child.frame != mutation.new_child.frame
}
