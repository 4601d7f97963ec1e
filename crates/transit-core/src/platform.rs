//! Collaborator traits for the layout animations proxy.
//!
//! These traits let the proxy delegate animation bookkeeping, UI-thread
//! scheduling and redraw requests to the host, so the engine never depends
//! on a particular animation runtime or event loop.

use crate::snapshot::GeometrySnapshot;
use crate::{SurfaceId, Tag};

/// Work item executed on the UI execution context.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutAnimationType {
    Entering,
    Exiting,
    Layout,
}

/// Owner of per-view animation configuration and of the running animations.
///
/// Computing interpolated values is entirely the manager's business; the
/// proxy only asks whether an animation is configured, starts it with a
/// geometry snapshot and cancels it. Absence of configuration is a normal
/// answer, never an error.
pub trait LayoutAnimationsManager: Send + Sync {
    fn has_layout_animation(&self, tag: Tag, kind: LayoutAnimationType) -> bool;

    /// Whether exiting animations may run for `tag`; `default` is the value
    /// inherited from the ancestor being removed.
    fn should_animate_exiting(&self, tag: Tag, default: bool) -> bool;

    fn start_layout_animation(&self, tag: Tag, kind: LayoutAnimationType, values: GeometrySnapshot);

    fn cancel_layout_animation(&self, tag: Tag);

    fn clear_layout_animation_config(&self, tag: Tag);

    /// Moves a configuration registered under a transfer identifier onto `tag`.
    fn transfer_config_from_native_id(&self, native_id: i32, tag: Tag);
}

/// Schedules work onto the UI execution context.
///
/// Implementations must never run `task` while blocking the caller on
/// another thread; enqueueing or running it inline are both acceptable.
pub trait UiScheduler: Send + Sync {
    fn schedule_on_ui(&self, task: UiTask);
}

/// Receives redraw requests for surfaces whose animated state changed.
pub trait SurfaceObserver: Send + Sync {
    fn notify_updates(&self, surface_id: SurfaceId);
}
