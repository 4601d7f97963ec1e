use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::platform::{UiScheduler, UiTask};

/// UI execution context backed by a FIFO queue.
///
/// Tasks accumulate until the owner of the UI thread calls [`UiQueue::drain`].
#[derive(Default)]
pub struct UiQueue {
    pending: Mutex<VecDeque<UiTask>>,
}

impl UiQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Runs every queued task, including tasks queued while draining.
    ///
    /// Returns the number of tasks executed.
    pub fn drain(&self) -> usize {
        let mut executed = 0;
        loop {
            let tasks: Vec<UiTask> = {
                let mut pending = self.pending.lock();
                pending.drain(..).collect()
            };
            if tasks.is_empty() {
                if executed > 0 {
                    log::trace!("drained {executed} ui tasks");
                }
                return executed;
            }
            for task in tasks {
                task();
                executed += 1;
            }
        }
    }
}

impl UiScheduler for UiQueue {
    fn schedule_on_ui(&self, task: UiTask) {
        self.pending.lock().push_back(task);
    }
}

impl fmt::Debug for UiQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Runs every task on the calling thread as soon as it is scheduled.
#[derive(Debug, Default)]
pub struct ImmediateScheduler;

impl UiScheduler for ImmediateScheduler {
    fn schedule_on_ui(&self, task: UiTask) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn queue_defers_until_drained() {
        let queue = Arc::new(UiQueue::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        queue.schedule_on_ui(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(), 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_runs_tasks_scheduled_by_tasks() {
        let queue = Arc::new(UiQueue::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let nested_queue = Arc::clone(&queue);
        let counter = Arc::clone(&runs);
        queue.schedule_on_ui(Box::new(move || {
            let counter = Arc::clone(&counter);
            nested_queue.schedule_on_ui(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(queue.drain(), 2);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn immediate_scheduler_runs_inline() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        ImmediateScheduler.schedule_on_ui(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
