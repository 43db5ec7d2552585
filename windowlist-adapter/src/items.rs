use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::element::{ItemHandle, ResizeListener, Subscription};

/// Queue of `(index, measured px)` pairs produced by item resize observers
/// and drained by the controller on its next tick.
#[derive(Clone, Debug, Default)]
pub struct MeasureQueue {
    pending: Arc<Mutex<Vec<(usize, f64)>>>,
}

impl MeasureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, index: usize, measured_px: f64) {
        self.lock().push((index, measured_px));
    }

    /// Takes everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<(usize, f64)> {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(usize, f64)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-index resize observers for the currently rendered items.
///
/// Each rendered item registers its root element here; the observer feeds
/// follow-up measurements (image loads, text reflow) into the shared queue.
/// Observers are strictly per-index: detaching one leaves the rest running.
#[derive(Debug, Default)]
pub struct ItemObservers {
    subs: HashMap<usize, Subscription>,
    queue: MeasureQueue,
}

impl ItemObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &MeasureQueue {
        &self.queue
    }

    /// Registers `handle` as the rendered element for `index`, replacing any
    /// previous observer for that index.
    ///
    /// The current rendered size is read once immediately and returned; a
    /// resize subscription keeps the record current afterwards, when the
    /// host supports one.
    pub fn attach(&mut self, index: usize, handle: &Arc<dyn ItemHandle>) -> f64 {
        self.detach(index);

        let listener: ResizeListener = {
            let queue = self.queue.clone();
            Arc::new(move |px| queue.push(index, px))
        };
        if let Some(sub) = handle.observe_resize(listener) {
            self.subs.insert(index, sub);
        }

        handle.measured_px()
    }

    /// Disconnects the observer for `index` without touching the others.
    pub fn detach(&mut self, index: usize) {
        if let Some(sub) = self.subs.remove(&index) {
            sub.disconnect();
        }
    }

    /// Releases observers whose index is no longer in range.
    pub fn prune_beyond(&mut self, count: usize) {
        self.subs.retain(|&index, _| index < count);
    }

    /// Releases every observer and drops any queued measurements.
    pub fn clear(&mut self) {
        self.subs.clear();
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}
