//! Structural mutations emitted by the host's per-frame tree diff.

use crate::view::ShadowView;
use crate::{SurfaceId, Tag, NO_INDEX, NO_TAG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Delete,
    Insert,
    Remove,
    Update,
}

/// One operation of a mutation batch.
///
/// `Create`/`Insert` describe their view in `new_child`, `Remove`/`Delete` in
/// `old_child`, and `Update` carries both snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowViewMutation {
    pub kind: MutationKind,
    pub parent_tag: Tag,
    pub old_child: ShadowView,
    pub new_child: ShadowView,
    pub index: i32,
}

impl ShadowViewMutation {
    pub fn create(view: ShadowView) -> Self {
        Self {
            kind: MutationKind::Create,
            parent_tag: NO_TAG,
            old_child: ShadowView::default(),
            new_child: view,
            index: NO_INDEX,
        }
    }

    pub fn delete(view: ShadowView) -> Self {
        Self {
            kind: MutationKind::Delete,
            parent_tag: NO_TAG,
            old_child: view,
            new_child: ShadowView::default(),
            index: NO_INDEX,
        }
    }

    pub fn insert(parent_tag: Tag, view: ShadowView, index: i32) -> Self {
        Self {
            kind: MutationKind::Insert,
            parent_tag,
            old_child: ShadowView::default(),
            new_child: view,
            index,
        }
    }

    pub fn remove(parent_tag: Tag, view: ShadowView, index: i32) -> Self {
        Self {
            kind: MutationKind::Remove,
            parent_tag,
            old_child: view,
            new_child: ShadowView::default(),
            index,
        }
    }

    pub fn update(old_child: ShadowView, new_child: ShadowView, parent_tag: Tag) -> Self {
        Self {
            kind: MutationKind::Update,
            parent_tag,
            old_child,
            new_child,
            index: NO_INDEX,
        }
    }

    /// Tag of the view this mutation operates on.
    pub fn tag(&self) -> Tag {
        match self.kind {
            MutationKind::Create | MutationKind::Insert => self.new_child.tag,
            MutationKind::Delete | MutationKind::Remove | MutationKind::Update => {
                self.old_child.tag
            }
        }
    }
}

/// Timing information forwarded untouched from the host commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionTelemetry {
    pub commit_start_nanos: u64,
    pub commit_end_nanos: u64,
    pub diff_nanos: u64,
    pub layout_nanos: u64,
}

/// Mutation batch ready to be applied by the host's mounting layer.
#[derive(Clone, Debug, PartialEq)]
pub struct MountingTransaction {
    pub surface_id: SurfaceId,
    pub number: u64,
    pub mutations: Vec<ShadowViewMutation>,
    pub telemetry: TransactionTelemetry,
}
