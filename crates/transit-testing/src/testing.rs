use std::sync::Arc;

use parking_lot::Mutex;
use transit_core::collections::map::{HashMap, HashSet};
use transit_core::{
    GeometrySnapshot, LayoutAnimationType, LayoutAnimationsManager, MountingTransaction, Rect,
    ShadowView, ShadowViewMutation, SurfaceId, SurfaceObserver, Tag, TransactionTelemetry,
    UiQueue,
};
use transit_proxy::{LayoutAnimationsProxy, ProxyConfig, ProxyHandle};

/// Surface used by the builders below.
pub const SURFACE: SurfaceId = 1;

/// Installs `env_logger` once for the current test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn view(tag: Tag) -> ShadowView {
    ShadowView::new(tag, "View", SURFACE).with_frame(Rect::new(0.0, 0.0, 100.0, 100.0))
}

pub fn view_at(tag: Tag, frame: Rect) -> ShadowView {
    view(tag).with_frame(frame)
}

pub fn create(tag: Tag) -> ShadowViewMutation {
    ShadowViewMutation::create(view(tag))
}

pub fn insert(parent_tag: Tag, tag: Tag, index: i32) -> ShadowViewMutation {
    ShadowViewMutation::insert(parent_tag, view(tag), index)
}

pub fn remove(parent_tag: Tag, tag: Tag, index: i32) -> ShadowViewMutation {
    ShadowViewMutation::remove(parent_tag, view(tag), index)
}

pub fn delete(tag: Tag) -> ShadowViewMutation {
    ShadowViewMutation::delete(view(tag))
}

/// Remove followed by Delete, as the host emits for a view that goes away.
pub fn remove_and_delete(parent_tag: Tag, tag: Tag, index: i32) -> [ShadowViewMutation; 2] {
    [remove(parent_tag, tag, index), delete(tag)]
}

/// Call observed by a [`RecordingAnimationsManager`].
#[derive(Clone, Debug, PartialEq)]
pub enum ManagerCall {
    Start {
        tag: Tag,
        kind: LayoutAnimationType,
        values: GeometrySnapshot,
    },
    Cancel {
        tag: Tag,
    },
    ClearConfig {
        tag: Tag,
    },
    Transfer {
        native_id: i32,
        tag: Tag,
    },
}

#[derive(Default)]
struct ManagerState {
    configs: HashSet<(Tag, LayoutAnimationType)>,
    exiting: HashMap<Tag, bool>,
    native_ids: HashMap<i32, Vec<LayoutAnimationType>>,
    calls: Vec<ManagerCall>,
}

/// Animation manager with configurable answers that records every call.
///
/// Clearing the config of a tag drops every animation kind configured for it.
#[derive(Default)]
pub struct RecordingAnimationsManager {
    state: Mutex<ManagerState>,
}

impl RecordingAnimationsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, tag: Tag, kind: LayoutAnimationType) {
        self.state.lock().configs.insert((tag, kind));
    }

    pub fn set_should_animate_exiting(&self, tag: Tag, should_animate: bool) {
        self.state.lock().exiting.insert(tag, should_animate);
    }

    /// Registers a config that a view declaring `native_id` takes over.
    pub fn register_native_id(&self, native_id: i32, kind: LayoutAnimationType) {
        self.state
            .lock()
            .native_ids
            .entry(native_id)
            .or_default()
            .push(kind);
    }

    pub fn calls(&self) -> Vec<ManagerCall> {
        self.state.lock().calls.clone()
    }

    pub fn started(&self) -> Vec<(Tag, LayoutAnimationType)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ManagerCall::Start { tag, kind, .. } => Some((tag, kind)),
                _ => None,
            })
            .collect()
    }

    pub fn started_values(&self, tag: Tag, kind: LayoutAnimationType) -> Option<GeometrySnapshot> {
        self.calls().into_iter().find_map(|call| match call {
            ManagerCall::Start {
                tag: started,
                kind: started_kind,
                values,
            } if started == tag && started_kind == kind => Some(values),
            _ => None,
        })
    }

    pub fn cancelled(&self) -> Vec<Tag> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ManagerCall::Cancel { tag } => Some(tag),
                _ => None,
            })
            .collect()
    }

    pub fn cleared(&self) -> Vec<Tag> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ManagerCall::ClearConfig { tag } => Some(tag),
                _ => None,
            })
            .collect()
    }

    pub fn transfers(&self) -> Vec<(i32, Tag)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ManagerCall::Transfer { native_id, tag } => Some((native_id, tag)),
                _ => None,
            })
            .collect()
    }
}

impl LayoutAnimationsManager for RecordingAnimationsManager {
    fn has_layout_animation(&self, tag: Tag, kind: LayoutAnimationType) -> bool {
        self.state.lock().configs.contains(&(tag, kind))
    }

    fn should_animate_exiting(&self, tag: Tag, default: bool) -> bool {
        self.state
            .lock()
            .exiting
            .get(&tag)
            .copied()
            .unwrap_or(default)
    }

    fn start_layout_animation(
        &self,
        tag: Tag,
        kind: LayoutAnimationType,
        values: GeometrySnapshot,
    ) {
        self.state
            .lock()
            .calls
            .push(ManagerCall::Start { tag, kind, values });
    }

    fn cancel_layout_animation(&self, tag: Tag) {
        self.state.lock().calls.push(ManagerCall::Cancel { tag });
    }

    fn clear_layout_animation_config(&self, tag: Tag) {
        let mut state = self.state.lock();
        state.configs.retain(|(configured, _)| *configured != tag);
        state.calls.push(ManagerCall::ClearConfig { tag });
    }

    fn transfer_config_from_native_id(&self, native_id: i32, tag: Tag) {
        let mut state = self.state.lock();
        if let Some(kinds) = state.native_ids.remove(&native_id) {
            for kind in kinds {
                state.configs.insert((tag, kind));
            }
        }
        state.calls.push(ManagerCall::Transfer { native_id, tag });
    }
}

/// Surface observer that records every redraw request.
#[derive(Default)]
pub struct RecordingObserver {
    notified: Mutex<Vec<SurfaceId>>,
}

impl RecordingObserver {
    pub fn notified(&self) -> Vec<SurfaceId> {
        self.notified.lock().clone()
    }
}

impl SurfaceObserver for RecordingObserver {
    fn notify_updates(&self, surface_id: SurfaceId) {
        self.notified.lock().push(surface_id);
    }
}

/// A proxy wired to a recording manager, a queued UI context and a
/// recording observer.
pub struct ProxyHarness {
    pub proxy: LayoutAnimationsProxy,
    pub manager: Arc<RecordingAnimationsManager>,
    pub ui: Arc<UiQueue>,
    pub observer: Arc<RecordingObserver>,
    number: u64,
}

impl ProxyHarness {
    pub fn new() -> Self {
        Self::with_config(ProxyConfig::default())
    }

    pub fn with_config(config: ProxyConfig) -> Self {
        init_logging();
        let manager = Arc::new(RecordingAnimationsManager::new());
        let ui = Arc::new(UiQueue::new());
        let observer = Arc::new(RecordingObserver::default());
        let proxy = LayoutAnimationsProxy::new(manager.clone(), ui.clone(), config)
            .with_surface_observer(observer.clone());
        Self {
            proxy,
            manager,
            ui,
            observer,
            number: 0,
        }
    }

    pub fn handle(&self) -> ProxyHandle {
        self.proxy.handle()
    }

    pub fn try_pull(&mut self, mutations: Vec<ShadowViewMutation>) -> Option<MountingTransaction> {
        self.number += 1;
        self.proxy
            .pull_transaction(SURFACE, self.number, TransactionTelemetry::default(), mutations)
    }

    /// Pulls one batch on [`SURFACE`] and returns the filtered mutations.
    pub fn pull(&mut self, mutations: Vec<ShadowViewMutation>) -> Vec<ShadowViewMutation> {
        self.try_pull(mutations)
            .expect("proxy is enabled")
            .mutations
    }

    /// Runs the UI work scheduled so far.
    pub fn drain_ui(&self) -> usize {
        self.ui.drain()
    }
}

impl Default for ProxyHarness {
    fn default() -> Self {
        Self::new()
    }
}
