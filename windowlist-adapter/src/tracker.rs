use std::sync::{Arc, Mutex, PoisonError, Weak};

use windowlist::Viewport;

use crate::element::{ScrollArea, Subscription, px_to_extent, px_to_offset};

/// Latest viewport sample, shared between host listeners and `poll`.
///
/// Listeners sample eagerly at event time and only ever write here; the
/// single-threaded owner folds the cell into engine state on its next tick.
/// Every attachment gets its own cell, so a listener that outlives its
/// container writes into a cell nobody reads anymore.
#[derive(Debug, Default)]
struct ViewportCell {
    state: Mutex<CellState>,
}

#[derive(Debug, Default)]
struct CellState {
    viewport: Viewport,
    dirty: bool,
}

impl ViewportCell {
    fn set_offset(&self, offset: u64) {
        let mut state = self.lock();
        state.viewport.scroll_offset = offset;
        state.dirty = true;
    }

    fn set_height(&self, height: u32) {
        let mut state = self.lock();
        state.viewport.height = height;
        state.dirty = true;
    }

    fn take(&self) -> Option<Viewport> {
        let mut state = self.lock();
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(state.viewport)
    }

    fn snapshot(&self) -> Viewport {
        self.lock().viewport
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tracks the scroll offset and visible height of an attached container.
///
/// Dropping the tracker tears down both subscriptions, so observers are
/// always 1:1 with the tracked container: replacing a tracker unsubscribes
/// the old container before the new one is attached.
pub struct ViewportTracker {
    element: Arc<dyn ScrollArea>,
    cell: Arc<ViewportCell>,
    _scroll_sub: Subscription,
    _resize_sub: Option<Subscription>,
}

impl ViewportTracker {
    /// Attaches to `element`.
    ///
    /// Subscribes to the container's scroll signal (re-reading the offset at
    /// event time) and to resize observation for the height, then samples
    /// both values immediately rather than waiting for the first event, so
    /// the initial window is never empty. When the host has no resize
    /// observation the immediate read is the only height source.
    pub fn attach(element: Arc<dyn ScrollArea>) -> Self {
        let cell = Arc::new(ViewportCell::default());

        let scroll_sub = {
            let cell = Arc::clone(&cell);
            let weak: Weak<dyn ScrollArea> = Arc::downgrade(&element);
            element.subscribe_scroll(Arc::new(move || {
                if let Some(element) = weak.upgrade() {
                    cell.set_offset(px_to_offset(element.scroll_offset_px()));
                }
            }))
        };

        let resize_sub = {
            let cell = Arc::clone(&cell);
            element.observe_resize(Arc::new(move |px| {
                cell.set_height(px_to_extent(px));
            }))
        };

        cell.set_offset(px_to_offset(element.scroll_offset_px()));
        cell.set_height(px_to_extent(element.viewport_px()));

        Self {
            element,
            cell,
            _scroll_sub: scroll_sub,
            _resize_sub: resize_sub,
        }
    }

    pub fn element(&self) -> &Arc<dyn ScrollArea> {
        &self.element
    }

    /// Whether the host provided live resize observation, or the height is a
    /// one-shot read from attach time.
    pub fn has_resize_observation(&self) -> bool {
        self._resize_sub.is_some()
    }

    /// Drains the latest sample, if any event arrived since the last poll.
    pub fn poll(&self) -> Option<Viewport> {
        self.cell.take()
    }

    /// Current sample without consuming the dirty flag.
    pub fn viewport(&self) -> Viewport {
        self.cell.snapshot()
    }
}

impl std::fmt::Debug for ViewportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportTracker")
            .field("viewport", &self.viewport())
            .field("resize_observation", &self.has_resize_observation())
            .finish_non_exhaustive()
    }
}
