//! Per-surface state: window sizes and the interpolated frames written by the
//! animation driver between transactions.

use std::sync::Arc;

use indexmap::IndexMap;
use transit_core::collections::map::HashMap;
use transit_core::{FrameUpdate, Props, SurfaceId, Tag, WindowSize};

/// Latest interpolated values for one animated view.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateValues {
    pub props: Arc<Props>,
    pub frame: FrameUpdate,
}

pub type UpdateMap = IndexMap<Tag, UpdateValues>;

#[derive(Debug, Default)]
pub struct SurfaceManager {
    updates: HashMap<SurfaceId, UpdateMap>,
    windows: HashMap<SurfaceId, WindowSize>,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_map(&mut self, surface_id: SurfaceId) -> &mut UpdateMap {
        self.updates.entry(surface_id).or_default()
    }

    /// Removes and returns every pending update of `surface_id`.
    pub fn take_updates(&mut self, surface_id: SurfaceId) -> UpdateMap {
        self.updates
            .get_mut(&surface_id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn remove_update(&mut self, surface_id: SurfaceId, tag: Tag) {
        if let Some(updates) = self.updates.get_mut(&surface_id) {
            updates.shift_remove(&tag);
        }
    }

    pub fn update_window(&mut self, surface_id: SurfaceId, width: f64, height: f64) {
        self.windows
            .insert(surface_id, WindowSize::new(width, height));
    }

    /// Window of `surface_id`; unknown surfaces report a zero size.
    pub fn window(&self, surface_id: SurfaceId) -> WindowSize {
        self.windows.get(&surface_id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(opacity: f64) -> UpdateValues {
        UpdateValues {
            props: Arc::new(Props::new().with("opacity", opacity)),
            frame: FrameUpdate::default(),
        }
    }

    #[test]
    fn unknown_window_is_zero() {
        let surfaces = SurfaceManager::new();
        assert_eq!(surfaces.window(7), WindowSize::default());
    }

    #[test]
    fn take_updates_drains_in_insertion_order() {
        let mut surfaces = SurfaceManager::new();
        surfaces.update_map(1).insert(9, values(0.1));
        surfaces.update_map(1).insert(4, values(0.2));
        surfaces.update_map(2).insert(5, values(0.3));

        let drained: Vec<Tag> = surfaces.take_updates(1).keys().copied().collect();

        assert_eq!(drained, vec![9, 4]);
        assert!(surfaces.take_updates(1).is_empty());
        assert_eq!(surfaces.take_updates(2).len(), 1);
    }

    #[test]
    fn remove_update_keeps_other_tags() {
        let mut surfaces = SurfaceManager::new();
        surfaces.update_map(1).insert(9, values(0.1));
        surfaces.update_map(1).insert(4, values(0.2));
        surfaces.remove_update(1, 9);
        surfaces.remove_update(3, 9);

        let left: Vec<Tag> = surfaces.take_updates(1).keys().copied().collect();
        assert_eq!(left, vec![4]);
    }
}
