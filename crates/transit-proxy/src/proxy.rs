use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use transit_core::{
    LayoutAnimationsManager, MountingTransaction, Props, ShadowViewMutation, SurfaceId,
    SurfaceObserver, Tag, TransactionTelemetry, UiScheduler,
};

use crate::animation::LayoutAnimation;
use crate::commands::UiCommand;
use crate::config::ProxyConfig;
use crate::state::ProxyState;
use crate::transaction::Transaction;
use crate::tree::NodeState;

pub(crate) struct ProxyInner {
    pub(crate) state: Mutex<ProxyState>,
    pub(crate) manager: Arc<dyn LayoutAnimationsManager>,
    scheduler: Arc<dyn UiScheduler>,
    observer: RwLock<Option<Arc<dyn SurfaceObserver>>>,
    config: ProxyConfig,
    alive: AtomicBool,
}

impl ProxyInner {
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Hands buffered commands to the UI context. Must be called without the
    /// state lock held.
    fn dispatch(self: &Arc<Self>, commands: Vec<UiCommand>) {
        for command in commands {
            let handle = ProxyHandle(Arc::downgrade(self));
            self.scheduler
                .schedule_on_ui(Box::new(move || handle.run(command)));
        }
    }

    fn pull_transaction(
        self: &Arc<Self>,
        surface_id: SurfaceId,
        number: u64,
        telemetry: TransactionTelemetry,
        mutations: Vec<ShadowViewMutation>,
    ) -> MountingTransaction {
        let (filtered, commands) = {
            let mut state = self.state.lock();
            let filtered =
                Transaction::new(&mut state, self.manager.as_ref(), &self.config, surface_id)
                    .run(mutations);
            (filtered, state.take_ui_commands())
        };
        self.dispatch(commands);
        MountingTransaction {
            surface_id,
            number,
            mutations: filtered,
            telemetry,
        }
    }

    fn progress_layout_animation(&self, tag: Tag, style: Props) -> Option<SurfaceId> {
        self.state.lock().progress_layout_animation(tag, style)
    }

    fn end_layout_animation(&self, tag: Tag, should_remove: bool) -> Option<SurfaceId> {
        self.state.lock().end_layout_animation(tag, should_remove)
    }

    fn notify_updates(&self, surface_id: SurfaceId) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.notify_updates(surface_id);
        }
    }
}

/// Rewrites host mutation batches so that views keep animating across
/// structural changes.
///
/// Every Remove whose view (or a descendant) has an exit animation is withheld
/// until [`end_layout_animation`](Self::end_layout_animation) reports the
/// animation finished; inserted views with an entering animation are mounted
/// transparent; layout changes of animated views are replaced by the frames
/// the animation driver reports through
/// [`progress_layout_animation`](Self::progress_layout_animation).
///
/// Animation starts are dispatched to the [`UiScheduler`] after the batch has
/// been processed. Scheduled work holds a [`ProxyHandle`] only and does
/// nothing once the proxy is dropped or shut down.
pub struct LayoutAnimationsProxy {
    inner: Arc<ProxyInner>,
}

impl LayoutAnimationsProxy {
    pub fn new(
        manager: Arc<dyn LayoutAnimationsManager>,
        scheduler: Arc<dyn UiScheduler>,
        config: ProxyConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ProxyInner {
                state: Mutex::new(ProxyState::default()),
                manager,
                scheduler,
                observer: RwLock::new(None),
                config,
                alive: AtomicBool::new(true),
            }),
        }
    }

    pub fn with_surface_observer(self, observer: Arc<dyn SurfaceObserver>) -> Self {
        self.set_surface_observer(Some(observer));
        self
    }

    pub fn set_surface_observer(&self, observer: Option<Arc<dyn SurfaceObserver>>) {
        *self.inner.observer.write() = observer;
    }

    pub fn handle(&self) -> ProxyHandle {
        ProxyHandle(Arc::downgrade(&self.inner))
    }

    /// Stops every handle from acting, including UI tasks already queued.
    pub fn shutdown(&self) {
        if self.inner.alive.swap(false, Ordering::AcqRel) {
            log::debug!("layout animations proxy shut down");
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    pub fn should_override_pull_transaction(&self) -> bool {
        self.inner.config.enabled
    }

    /// Filters one host batch. Returns `None` when the proxy is disabled and
    /// the host should mount the batch as is.
    pub fn pull_transaction(
        &self,
        surface_id: SurfaceId,
        number: u64,
        telemetry: TransactionTelemetry,
        mutations: Vec<ShadowViewMutation>,
    ) -> Option<MountingTransaction> {
        if !self.should_override_pull_transaction() {
            return None;
        }
        Some(
            self.inner
                .pull_transaction(surface_id, number, telemetry, mutations),
        )
    }

    /// Stores the driver's latest style for `tag`, to be mounted by the next
    /// transaction of the returned surface.
    pub fn progress_layout_animation(&self, tag: Tag, style: Props) -> Option<SurfaceId> {
        self.inner.progress_layout_animation(tag, style)
    }

    /// Ends one trigger of the animation of `tag`. Returns the surface that
    /// needs another transaction to finalize the removal, if any.
    pub fn end_layout_animation(&self, tag: Tag, should_remove: bool) -> Option<SurfaceId> {
        self.inner.end_layout_animation(tag, should_remove)
    }

    pub fn is_animating(&self, tag: Tag) -> bool {
        self.inner.state.lock().layout_animations.contains_key(&tag)
    }

    pub fn tracked_animation(&self, tag: Tag) -> Option<LayoutAnimation> {
        self.inner.state.lock().layout_animations.get(&tag).cloned()
    }

    /// State of the mutation node kept for `tag`, if the view is still mounted
    /// only because of an animation.
    pub fn node_state(&self, tag: Tag) -> Option<NodeState> {
        let state = self.inner.state.lock();
        state.tree.lookup(tag).and_then(|id| state.tree.state(id))
    }

    pub fn debug_tree(&self, tag: Tag) -> String {
        self.inner.state.lock().tree.dump_tree(tag)
    }
}

impl Drop for LayoutAnimationsProxy {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for LayoutAnimationsProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutAnimationsProxy")
            .field("config", &self.inner.config)
            .field("alive", &self.inner.is_alive())
            .finish()
    }
}

/// Non-owning handle to a [`LayoutAnimationsProxy`], used by the animation
/// driver and by scheduled UI work.
#[derive(Clone)]
pub struct ProxyHandle(Weak<ProxyInner>);

impl ProxyHandle {
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }

    /// Like [`LayoutAnimationsProxy::progress_layout_animation`], and asks the
    /// surface observer for a redraw.
    pub fn progress_layout_animation(&self, tag: Tag, style: Props) -> Option<SurfaceId> {
        let inner = self.upgrade()?;
        let surface_id = inner.progress_layout_animation(tag, style)?;
        inner.notify_updates(surface_id);
        Some(surface_id)
    }

    /// Like [`LayoutAnimationsProxy::end_layout_animation`], and asks the
    /// surface observer for a redraw.
    pub fn end_layout_animation(&self, tag: Tag, should_remove: bool) -> Option<SurfaceId> {
        let inner = self.upgrade()?;
        let surface_id = inner.end_layout_animation(tag, should_remove)?;
        inner.notify_updates(surface_id);
        Some(surface_id)
    }

    fn upgrade(&self) -> Option<Arc<ProxyInner>> {
        self.0.upgrade().filter(|inner| inner.is_alive())
    }

    fn run(&self, command: UiCommand) {
        match self.0.upgrade() {
            Some(inner) => inner.run_ui_command(command),
            None => log::trace!("dropping ui command for {}, proxy is gone", command.tag()),
        }
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProxyHandle").field(&self.is_alive()).finish()
    }
}
