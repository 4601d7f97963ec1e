#![doc = r"Shadow view and mutation model shared by the transit layout animations proxy and its hosts."]

pub mod collections;
pub mod mutation;
pub mod platform;
pub mod runtime;
pub mod snapshot;
pub mod view;

pub use mutation::{
    MountingTransaction, MutationKind, ShadowViewMutation, TransactionTelemetry,
};
pub use platform::{
    LayoutAnimationType, LayoutAnimationsManager, SurfaceObserver, UiScheduler, UiTask,
};
pub use runtime::{ImmediateScheduler, UiQueue};
pub use snapshot::{GeometrySnapshot, ViewSnapshot, WindowSize};
pub use view::{FrameUpdate, PropValue, Props, Rect, ShadowView};

/// Host view identity.
pub type Tag = i32;
/// Identity of an independently rendered root tree.
pub type SurfaceId = i32;

/// Tag value used where a mutation has no parent (Create, Delete) or a moved
/// view's new parent has not been resolved yet.
pub const NO_TAG: Tag = -1;
/// Index value used by mutations that carry no structural index.
pub const NO_INDEX: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("node for tag {tag} is missing")]
    Missing { tag: Tag },
    #[error("node handle {index}@{generation} is stale")]
    Stale { index: u32, generation: u32 },
}
